use console::style;
use folio_context::{DetectionSources, PageContextDetector, Priority, SuggestionEngine, contextual_help_for};
use folio_core::ToolContext;
use folio_runtime::ToolRegistry;

use super::print_json;

pub(super) fn cmd_detect(
    url: Option<String>,
    message: Option<String>,
    referrer: Option<String>,
    history: Vec<String>,
    json: bool,
) -> folio_core::Result<()> {
    let sources = DetectionSources {
        url,
        chat_message: message,
        navigation_history: history,
        referrer,
    };
    let detection = PageContextDetector::new().detect_from_multiple_sources(&sources);
    if json {
        return print_json(&detection);
    }

    println!("{:<11}{}", style("Page").bold(), detection.page);
    if let Some(section) = &detection.section {
        println!("{:<11}{section}", style("Section").bold());
    }
    println!("{:<11}{:.2}", style("Confidence").bold(), detection.confidence);
    println!("{:<11}{}", style("Source").bold(), detection.source);
    for (key, value) in &detection.metadata {
        println!("  {}: {value}", style(key).dim());
    }
    Ok(())
}

pub(super) fn cmd_suggest(
    registry: &ToolRegistry,
    context: &ToolContext,
    text: Option<&str>,
    recent: &[String],
    json: bool,
) -> folio_core::Result<()> {
    let suggestions = if recent.is_empty() {
        registry.contextual_suggestions(context, text)
    } else {
        SuggestionEngine::new()
            .with_available_tools(registry.tool_names())
            .smart_recommendations(context, text, recent)
    };
    if json {
        return print_json(&suggestions);
    }

    if suggestions.is_empty() {
        println!("No suggestions for this context.");
        return Ok(());
    }
    for s in &suggestions {
        let priority = match s.priority {
            Priority::High => style(s.priority.as_str()).green(),
            Priority::Medium => style(s.priority.as_str()).yellow(),
            Priority::Low => style(s.priority.as_str()).dim(),
        };
        println!(
            "{:.2}  {:<6}  {:<18}  {}  {}",
            s.relevance,
            priority,
            s.tool,
            s.reason,
            style(&s.context).dim()
        );
    }
    Ok(())
}

pub(super) fn cmd_guide(page: Option<&str>) -> folio_core::Result<()> {
    let help = contextual_help_for(page.unwrap_or("home"));
    println!("{}", style(help.page).cyan().bold());
    println!("{}", help.description);

    let lists = [
        ("You can", help.actions),
        ("Try asking", help.questions),
        ("Where next", help.navigation_hints),
    ];
    for (title, items) in lists {
        println!();
        println!("{}", style(title).bold());
        for item in items {
            println!("  • {item}");
        }
    }
    Ok(())
}
