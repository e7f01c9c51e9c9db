//! Name-to-tool map, dispatch through the middleware, and execution history.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use folio_config::FolioConfig;
use folio_context::{SuggestionEngine, ToolSuggestion};
use folio_core::{
    ErrorCode, ExecutionConfig, FolioError, Result, Tool, ToolCall, ToolContext, ToolDefinition, ToolResult,
    ToolStats, ValidationOptions,
};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::builtin;
use crate::middleware::ExecutionMiddleware;

/// Recent calls consulted for smart recommendations.
const RECENT_USAGE_WINDOW: usize = 20;

/// One call in a chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainStep {
    pub tool: String,
    #[serde(default = "empty_args")]
    pub arguments: Value,
}

fn empty_args() -> Value {
    Value::Object(Default::default())
}

impl ChainStep {
    pub fn new(tool: impl Into<String>, arguments: Value) -> Self {
        Self {
            tool: tool.into(),
            arguments,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryStats {
    pub total_tools: usize,
    pub tools: Vec<String>,
    pub total_executions: usize,
    pub successful: usize,
    pub failed: usize,
    pub history_size: usize,
    pub per_tool: BTreeMap<String, ToolStats>,
}

pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
    middleware: ExecutionMiddleware,
    defaults: ExecutionConfig,
    history: Mutex<VecDeque<ToolCall>>,
    history_limit: usize,
    total_executions: AtomicUsize,
    successful: AtomicUsize,
}

static GLOBAL: OnceLock<ToolRegistry> = OnceLock::new();

impl ToolRegistry {
    /// An empty registry configured from `config`.
    pub fn new(config: &FolioConfig) -> Result<Self> {
        let middleware = ExecutionMiddleware::new(config)?;
        Ok(Self::with_middleware(
            middleware,
            config.execution.to_execution_config(),
            config.execution.history_limit,
        ))
    }

    pub fn with_middleware(middleware: ExecutionMiddleware, defaults: ExecutionConfig, history_limit: usize) -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
            middleware,
            defaults,
            history: Mutex::new(VecDeque::new()),
            history_limit,
            total_executions: AtomicUsize::new(0),
            successful: AtomicUsize::new(0),
        }
    }

    /// A registry preloaded with the built-in portfolio tools.
    pub fn with_builtin_tools(config: &FolioConfig) -> Result<Self> {
        let registry = Self::new(config)?;
        for tool in builtin::all(config.validation.options()) {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    /// Process-wide default: default configuration plus the built-in tools.
    pub fn global() -> &'static ToolRegistry {
        GLOBAL.get_or_init(|| {
            let config = FolioConfig::default();
            let registry = Self::with_middleware(
                ExecutionMiddleware::default(),
                config.execution.to_execution_config(),
                config.execution.history_limit,
            );
            let mut tools = registry.tools.write();
            for tool in builtin::all(ValidationOptions::default()) {
                tools.insert(tool.name().to_string(), tool);
            }
            drop(tools);
            registry
        })
    }

    pub fn middleware(&self) -> &ExecutionMiddleware {
        &self.middleware
    }

    // ── Registration ───────────────────────────────────────────

    pub fn register(&self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.name().to_string();
        let mut tools = self.tools.write();
        if tools.contains_key(&name) {
            return Err(FolioError::DuplicateTool(name));
        }
        debug!(tool = %name, "registered tool");
        tools.insert(name, tool);
        Ok(())
    }

    /// Returns the removed tool, if it was registered.
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.write().remove(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().get(name).cloned()
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.read().contains_key(name)
    }

    /// Sorted.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.read().is_empty()
    }

    // ── Execution ──────────────────────────────────────────────

    /// Dispatch one call through the middleware. Every call, including
    /// unknown tools, lands in the history.
    pub async fn execute_tool(
        &self,
        name: &str,
        args: &Value,
        context: &ToolContext,
        config: Option<&ExecutionConfig>,
    ) -> ToolResult {
        let config = config.unwrap_or(&self.defaults);
        let result = match self.get(name) {
            Some(tool) => self.middleware.execute(tool.as_ref(), args, context, config).await,
            None => self.not_found(name),
        };
        self.record(name, args, &result);
        result
    }

    /// Run steps in order, stopping after the first failure unless `config.retry` is set.
    pub async fn execute_tool_chain(
        &self,
        steps: &[ChainStep],
        context: &ToolContext,
        config: Option<&ExecutionConfig>,
    ) -> Vec<ToolResult> {
        let keep_going = config.unwrap_or(&self.defaults).retry;
        let mut results = Vec::with_capacity(steps.len());
        for (i, step) in steps.iter().enumerate() {
            let result = self.execute_tool(&step.tool, &step.arguments, context, config).await;
            let failed = !result.is_success();
            results.push(result);
            if failed && !keep_going {
                info!(step = i, tool = %step.tool, "tool chain stopped after failure");
                break;
            }
        }
        results
    }

    fn not_found(&self, name: &str) -> ToolResult {
        let names = self.tool_names();
        let mut suggestions = vec![format!("Available tools: {}", names.join(", "))];
        if let Some(closest) = closest_name(name, &names) {
            suggestions.insert(0, format!("Did you mean '{closest}'?"));
        }
        ToolResult::error(ErrorCode::ToolNotFound, format!("Tool '{name}' not found"), suggestions)
    }

    fn record(&self, name: &str, args: &Value, result: &ToolResult) {
        self.total_executions.fetch_add(1, Ordering::Relaxed);
        if result.is_success() {
            self.successful.fetch_add(1, Ordering::Relaxed);
        }
        if self.history_limit == 0 {
            return;
        }
        let mut history = self.history.lock();
        while history.len() >= self.history_limit {
            history.pop_front();
        }
        history.push_back(ToolCall::new(name, args.clone(), result.clone()));
    }

    // ── Introspection ──────────────────────────────────────────

    pub fn stats(&self) -> RegistryStats {
        let tools: Vec<Arc<dyn Tool>> = self.tools.read().values().cloned().collect();
        let per_tool = tools
            .iter()
            .filter_map(|t| t.stats().map(|s| (t.name().to_string(), s)))
            .collect();
        // successful is bumped after total, so reading it first keeps it <= total
        let successful = self.successful.load(Ordering::Relaxed);
        let total_executions = self.total_executions.load(Ordering::Relaxed);
        RegistryStats {
            total_tools: tools.len(),
            tools: self.tool_names(),
            total_executions,
            successful,
            failed: total_executions.saturating_sub(successful),
            history_size: self.history.lock().len(),
            per_tool,
        }
    }

    /// Function-call descriptors for the orchestrator, sorted by name.
    pub fn function_definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.read().values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    pub fn schemas(&self) -> BTreeMap<String, Value> {
        self.tools
            .read()
            .iter()
            .map(|(name, tool)| (name.clone(), tool.parameters().to_json_schema()))
            .collect()
    }

    /// Oldest first.
    pub fn history(&self) -> Vec<ToolCall> {
        self.history.lock().iter().cloned().collect()
    }

    /// Names of the last `n` calls, oldest first.
    pub fn recent_tool_names(&self, n: usize) -> Vec<String> {
        let history = self.history.lock();
        let skip = history.len().saturating_sub(n);
        history.iter().skip(skip).map(|c| c.name.clone()).collect()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }

    // ── Suggestions ────────────────────────────────────────────

    fn engine(&self) -> SuggestionEngine {
        SuggestionEngine::new().with_available_tools(self.tool_names())
    }

    pub fn contextual_suggestions(&self, context: &ToolContext, text: Option<&str>) -> Vec<ToolSuggestion> {
        self.engine().contextual_suggestions(context, text)
    }

    /// Contextual suggestions plus recommendations from recent usage.
    pub fn smart_recommendations(&self, context: &ToolContext, text: Option<&str>) -> Vec<ToolSuggestion> {
        let recent = self.recent_tool_names(RECENT_USAGE_WINDOW);
        self.engine().smart_recommendations(context, text, &recent)
    }
}

/// A registered name that contains, or is contained in, `name`, or shares a
/// prefix of at least four characters with it.
fn closest_name<'a>(name: &str, names: &'a [String]) -> Option<&'a str> {
    let wanted = name.to_ascii_lowercase();
    if wanted.is_empty() {
        return None;
    }
    let shared_prefix = |a: &str, b: &str| a.chars().zip(b.chars()).take_while(|(x, y)| x == y).count();
    names
        .iter()
        .find(|n| n.contains(&wanted) || wanted.contains(n.as_str()))
        .or_else(|| {
            names
                .iter()
                .map(|n| (n, shared_prefix(n, &wanted)))
                .filter(|(_, len)| *len >= 4)
                .max_by_key(|(_, len)| *len)
                .map(|(n, _)| n)
        })
        .map(String::as_str)
}
