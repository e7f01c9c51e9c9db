use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

use folio_config::{ConfigLoader, FolioConfig};
use folio_core::{ContextSanitizer, RawContext, ToolContext};
use folio_runtime::ToolRegistry;

mod config;
mod context;
mod tools;

/// Folio: contextual tools for a portfolio assistant
#[derive(Parser)]
#[command(name = "folio", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to folio.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered tools and their parameters
    Tools {
        /// Output function definitions as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run one tool through the execution middleware
    Exec {
        /// Tool name, e.g. navigate_to_page
        tool: String,
        /// Arguments as a JSON object
        #[arg(short, long, default_value = "{}")]
        args: String,
        #[command(flatten)]
        context: ContextArgs,
        /// Output the raw result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a JSON array of {"tool", "arguments"} steps in order
    Chain {
        /// Path to the chain file
        file: PathBuf,
        #[command(flatten)]
        context: ContextArgs,
        /// Output the raw results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Detect the page context from a URL, chat message, referrer, or history
    Detect {
        #[arg(long)]
        url: Option<String>,
        #[arg(short, long)]
        message: Option<String>,
        #[arg(long)]
        referrer: Option<String>,
        /// Visited paths, oldest first
        #[arg(long, num_args = 1..)]
        history: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Rank tools for a context, optionally with user text and recent calls
    Suggest {
        #[command(flatten)]
        context: ContextArgs,
        /// What the user said
        #[arg(short, long)]
        text: Option<String>,
        /// Recently used tools, oldest first (enables smart recommendations)
        #[arg(long, num_args = 1..)]
        recent: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show what can be done on a page
    Guide {
        /// Page name (default: home)
        page: Option<String>,
    },
    /// Show current configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// The page context a command runs in.
#[derive(Args, Debug, Clone)]
struct ContextArgs {
    /// Current page (home, about, projects, resume, contact)
    #[arg(long, default_value = "home")]
    page: String,
    /// Current section on the page
    #[arg(long)]
    section: Option<String>,
    /// Current theme (light, dark)
    #[arg(long)]
    theme: Option<String>,
    /// Session id, also used for rate limiting
    #[arg(long, default_value = "cli")]
    session: String,
}

impl ContextArgs {
    /// Unknown values fall back the same way untrusted browser input does.
    fn to_context(&self) -> ToolContext {
        ContextSanitizer::sanitize(&RawContext {
            page: Some(self.page.clone()),
            section: self.section.clone(),
            theme: self.theme.clone(),
            session_id: Some(self.session.clone()),
            user_agent: Some(format!("folio-cli/{}", env!("CARGO_PKG_VERSION"))),
        })
    }
}

impl Cli {
    pub async fn run(self) -> folio_core::Result<()> {
        // Load config first so we can use it for log format
        let config_loader = ConfigLoader::load(self.config.as_deref())?;
        let config = config_loader.get();

        // Resolve log level: --verbose > --quiet > --log-level > config
        let configured = if config.logging.enabled {
            config.logging.level.as_str()
        } else {
            "error"
        };
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            self.log_level.as_deref().unwrap_or(configured)
        };
        init_tracing(&config, log_level);
        debug!(path = %config_loader.path().display(), "configuration loaded");

        match self.command {
            Commands::Tools { json } => tools::cmd_tools(&registry(&config)?, json),
            Commands::Exec {
                tool,
                args,
                context,
                json,
            } => tools::cmd_exec(&registry(&config)?, &tool, &args, &context.to_context(), json).await,
            Commands::Chain { file, context, json } => {
                tools::cmd_chain(&registry(&config)?, &file, &context.to_context(), json).await
            }
            Commands::Detect {
                url,
                message,
                referrer,
                history,
                json,
            } => context::cmd_detect(url, message, referrer, history, json),
            Commands::Suggest {
                context: ctx,
                text,
                recent,
                json,
            } => context::cmd_suggest(&registry(&config)?, &ctx.to_context(), text.as_deref(), &recent, json),
            Commands::Guide { page } => context::cmd_guide(page.as_deref()),
            Commands::Config { json } => config::cmd_config(&config, config_loader.path(), json),
        }
    }
}

fn init_tracing(config: &FolioConfig, log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    if config.logging.format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn registry(config: &FolioConfig) -> folio_core::Result<ToolRegistry> {
    ToolRegistry::with_builtin_tools(config)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> folio_core::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
