//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;
use crate::domain::{CloudOverrides, RunMode};
use crate::infra::config::YamlConfigStore;

/// Reclaim stale CI machines and leftover test processes
#[derive(Parser)]
#[command(
    name = "ci-reaper",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Show what would be done without deleting, killing or mailing anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Show skipped machines, debug logs and full error traces
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    #[command(flatten)]
    pub cloud: CloudArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Cloud account settings; each overrides the config file.
#[derive(Args, Default)]
pub struct CloudArgs {
    /// Cloud API base URL
    #[arg(long, global = true, env = "SDC_URL")]
    pub url: Option<String>,

    /// Cloud account name
    #[arg(long, global = true, env = "SDC_ACCOUNT")]
    pub account: Option<String>,

    /// Signing key id (fingerprint)
    #[arg(long, global = true, env = "SDC_KEY_ID")]
    pub key_id: Option<String>,

    /// Path to the RSA private key
    #[arg(long, global = true, env = "SDC_KEY_PATH")]
    pub key_path: Option<PathBuf>,
}

impl From<CloudArgs> for CloudOverrides {
    fn from(args: CloudArgs) -> Self {
        Self {
            url: args.url,
            account: args.account,
            key_id: args.key_id,
            key_path: args.key_path,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// List machines, or show one machine
    ListMachines(commands::list_machines::ListMachinesArgs),

    /// List a machine's tags
    ListTags(commands::list_tags::ListTagsArgs),

    /// Delete running machines and request deletion of stopped ones
    DeleteOldMachines(commands::delete_old_machines::DeleteOldMachinesArgs),

    /// Kill leftover local test-harness processes
    KillOldProcs(commands::kill_old_procs::KillOldProcsArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be resolved or the command fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            dry_run,
            verbose,
            json,
            no_color,
            cloud,
            command,
        } = self;

        if let Command::Version = command {
            commands::version::run(json);
            return Ok(());
        }

        let app = AppContext::new(
            AppFlags {
                output: OutputFlags { no_color, json },
                mode: RunMode { dry_run, verbose },
                cloud: cloud.into(),
            },
            &YamlConfigStore,
        )?;

        match command {
            Command::ListMachines(args) => {
                commands::list_machines::run(&app, &app.cloud()?, &args).await
            }
            Command::ListTags(args) => commands::list_tags::run(&app, &app.cloud()?, &args).await,
            Command::DeleteOldMachines(args) => {
                commands::delete_old_machines::run(&app, &args).await
            }
            Command::KillOldProcs(args) => commands::kill_old_procs::run(&app, &args).await,
            Command::Version => Ok(()),
        }
    }
}
