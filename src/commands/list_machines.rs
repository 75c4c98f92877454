//! `ci-reaper list-machines [--id <ID>]`: show the account's machines.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::MachineInventory;
use crate::domain::Machine;
use crate::output::{OutputContext, json};

/// Arguments for the list-machines command.
#[derive(Args)]
pub struct ListMachinesArgs {
    /// Show only this machine (fetched individually)
    #[arg(long)]
    pub id: Option<String>,
}

/// Run `ci-reaper list-machines`.
///
/// # Errors
///
/// Returns an error if the cloud API call fails.
pub async fn run(
    app: &AppContext,
    cloud: &impl MachineInventory,
    args: &ListMachinesArgs,
) -> Result<()> {
    let machines = match &args.id {
        Some(id) => {
            let machine = cloud
                .get_machine(id)
                .await
                .with_context(|| format!("fetching machine {id}"))?;
            if app.json {
                return json::print(&machine);
            }
            vec![machine]
        }
        None => {
            let machines = cloud.list_machines().await.context("listing machines")?;
            if app.json {
                return json::print(&machines);
            }
            machines
        }
    };
    print_table(&app.output, &machines, Utc::now());
    Ok(())
}

fn print_table(out: &OutputContext, machines: &[Machine], now: DateTime<Utc>) {
    out.header(&format!(
        "{:<36}  {:<24}  {:<12}  {:>5}  CREATED",
        "ID", "NAME", "STATE", "AGE"
    ));
    for machine in machines {
        out.line(&format_row(machine, now));
    }
}

/// One table row: id, name, state, age in hours, creation time.
#[must_use]
pub fn format_row(machine: &Machine, now: DateTime<Utc>) -> String {
    format!(
        "{:<36}  {:<24}  {:<12}  {:>4}h  {}",
        machine.id,
        machine.name.as_deref().unwrap_or("-"),
        machine.state.as_str(),
        machine.age_hours(now),
        machine.created.format("%Y-%m-%dT%H:%M:%SZ"),
    )
}
