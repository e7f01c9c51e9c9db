use std::path::Path;

use console::style;
use folio_config::FolioConfig;

use super::print_json;

pub(super) fn cmd_config(config: &FolioConfig, path: &Path, json: bool) -> folio_core::Result<()> {
    if json {
        return print_json(config);
    }

    let rendered = toml::to_string_pretty(config).map_err(|e| folio_core::FolioError::Config(e.to_string()))?;
    println!("{}", style(format!("# {}", path.display())).dim());
    println!("{rendered}");

    // validate() already passed during load; only warnings can remain
    if let Ok(warnings) = config.validate() {
        for w in warnings {
            eprintln!("{} {w}", style("warning:").yellow());
        }
    }
    Ok(())
}
