//! `ci-reaper list-tags <ID>`: show a machine's tags.

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::MachineInventory;
use crate::domain::TagMap;
use crate::output::json;

/// Arguments for the list-tags command.
#[derive(Args)]
pub struct ListTagsArgs {
    /// Machine id
    pub id: String,
}

/// Run `ci-reaper list-tags`.
///
/// # Errors
///
/// Returns an error if the cloud API call fails.
pub async fn run(app: &AppContext, cloud: &impl MachineInventory, args: &ListTagsArgs) -> Result<()> {
    let tags = cloud
        .list_machine_tags(&args.id)
        .await
        .with_context(|| format!("fetching tags for machine {}", args.id))?;
    if app.json {
        return json::print(&tags);
    }
    if tags.is_empty() {
        app.output.line("(no tags)");
    }
    for line in format_tags(&tags) {
        app.output.line(&line);
    }
    Ok(())
}

/// `key=value` lines in key order; string values are printed unquoted.
#[must_use]
pub fn format_tags(tags: &TagMap) -> Vec<String> {
    tags.iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => format!("{key}={s}"),
            other => format!("{key}={other}"),
        })
        .collect()
}
