use std::path::Path;

use console::style;
use folio_core::{ToolAction, ToolContext, ToolResult};
use folio_runtime::{ChainStep, ToolRegistry};
use serde_json::Value;

use super::print_json;

pub(super) fn cmd_tools(registry: &ToolRegistry, json: bool) -> folio_core::Result<()> {
    let definitions = registry.function_definitions();
    if json {
        return print_json(&definitions);
    }

    for def in &definitions {
        println!("{}  {}", style(&def.name).cyan().bold(), def.description);
        let required: Vec<&str> = def.parameters["required"]
            .as_array()
            .map(|r| r.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let Some(properties) = def.parameters["properties"].as_object() else {
            continue;
        };
        for (name, schema) in properties {
            let kind = schema["type"].as_str().unwrap_or("any");
            let marker = if required.contains(&name.as_str()) { "*" } else { " " };
            let allowed = schema["enum"]
                .as_array()
                .map(|values| {
                    let values: Vec<&str> = values.iter().filter_map(Value::as_str).collect();
                    format!(" [{}]", values.join("|"))
                })
                .unwrap_or_default();
            let description = schema["description"].as_str().unwrap_or_default();
            println!(
                "   {marker} {}: {}{allowed}  {}",
                name,
                style(kind).yellow(),
                style(description).dim()
            );
        }
    }
    println!();
    println!("{} tools registered (* = required)", definitions.len());
    Ok(())
}

pub(super) async fn cmd_exec(
    registry: &ToolRegistry,
    tool: &str,
    args: &str,
    context: &ToolContext,
    json: bool,
) -> folio_core::Result<()> {
    let args: Value = serde_json::from_str(args)?;
    let result = registry.execute_tool(tool, &args, context, None).await;
    if json {
        return print_json(&result);
    }
    print_result(tool, &result)
}

pub(super) async fn cmd_chain(
    registry: &ToolRegistry,
    file: &Path,
    context: &ToolContext,
    json: bool,
) -> folio_core::Result<()> {
    let raw = std::fs::read_to_string(file)?;
    let steps: Vec<ChainStep> = serde_json::from_str(&raw)?;
    let results = registry.execute_tool_chain(&steps, context, None).await;
    if json {
        return print_json(&results);
    }

    for (i, (step, result)) in steps.iter().zip(&results).enumerate() {
        println!("{} {}", style(format!("[{}/{}]", i + 1, steps.len())).dim(), step.tool);
        print_result(&step.tool, result)?;
    }
    if results.len() < steps.len() {
        println!(
            "{}",
            style(format!("Stopped after step {}; {} step(s) skipped", results.len(), steps.len() - results.len()))
                .yellow()
        );
    }
    Ok(())
}

fn print_result(tool: &str, result: &ToolResult) -> folio_core::Result<()> {
    match result {
        ToolResult::Success { data, actions, .. } => {
            println!("{} {tool}", style("✓").green().bold());
            println!("{}", serde_json::to_string_pretty(data)?);
            for action in actions {
                println!("  {} {}", style("→").cyan(), describe_action(action));
            }
        }
        ToolResult::Failure { error } => {
            println!(
                "{} {tool}: {} {}",
                style("✗").red().bold(),
                style(error.code.as_str()).red(),
                error.message
            );
            for suggestion in &error.suggestions {
                println!("  • {suggestion}");
            }
            if let Some(fallback) = &error.fallback {
                println!("  fallback: {fallback}");
            }
        }
    }
    Ok(())
}

fn describe_action(action: &ToolAction) -> String {
    match action {
        ToolAction::Navigate { target, section } => match section {
            Some(section) => format!("navigate {target}#{section}"),
            None => format!("navigate {target}"),
        },
        ToolAction::Download { target, filename } => format!("download {filename} from {target}"),
        ToolAction::Theme { target } => format!("theme {target}"),
        ToolAction::Modal { target, .. } => format!("open {target}"),
        ToolAction::Scroll { target } => format!("scroll to {target}"),
    }
}
