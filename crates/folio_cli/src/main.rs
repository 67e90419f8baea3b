//! Folio CLI
//!
//! Administrative tools for a Folio data directory. Commands take the
//! directory lock, so stop the daemon (or point at a copy) first.
//!
//! # Commands
//!
//! - `users` - List every account
//! - `info` - Show one account in detail
//! - `perm` - Change an account's permission level
//! - `verify` - Mark an account as verified
//! - `remove` - Delete an account
//! - `notify` - Send an account a notification

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Folio service administration tools.
#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the service data directory
    #[arg(global = true, short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every account
    Users,

    /// Show one account in detail
    Info {
        /// Account name or email
        account: String,
    },

    /// Change an account's permission level
    Perm {
        /// Account name
        account: String,

        /// New level: admin (a), editor (e) or contributor (c/s)
        level: String,
    },

    /// Mark an account as verified
    Verify {
        /// Account name
        account: String,
    },

    /// Delete an account
    Remove {
        /// Account name
        account: String,
    },

    /// Send an account a notification
    Notify {
        /// Recipient account name
        account: String,

        /// Notification subject line
        #[arg(short, long)]
        subject: String,

        /// Notification body text
        #[arg(short, long)]
        body: String,

        /// Severity: ignore, should or must
        #[arg(long, default_value = "ignore")]
        severity: String,

        /// Label of the attached action button
        #[arg(long, requires = "action_target")]
        action_label: Option<String>,

        /// Route the action button follows
        #[arg(long, requires = "action_label")]
        action_target: Option<String>,

        /// Delete the notification once resolved
        #[arg(long)]
        delete_on_resolve: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Users => commands::users::run(&cli.data_dir)?,
        Commands::Info { account } => commands::info::run(&cli.data_dir, &account)?,
        Commands::Perm { account, level } => {
            commands::perm::run(&cli.data_dir, &account, &level)?
        }
        Commands::Verify { account } => commands::verify::run(&cli.data_dir, &account)?,
        Commands::Remove { account } => commands::remove::run(&cli.data_dir, &account)?,
        Commands::Notify {
            account,
            subject,
            body,
            severity,
            action_label,
            action_target,
            delete_on_resolve,
        } => commands::notify::run(
            &cli.data_dir,
            &account,
            subject,
            body,
            &severity,
            action_label.zip(action_target),
            delete_on_resolve,
        )?,
    }

    Ok(())
}
