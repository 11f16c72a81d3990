use clap::{Parser, Subcommand};

/// WorkHub — command-line client for the WorkHub workspace API
#[derive(Parser)]
#[command(name = "workhub", version, about)]
pub struct Cli {
    /// Account email. Falls back to resuming with token env vars if unset.
    #[arg(long, env = "WORKHUB_EMAIL", global = true)]
    pub email: Option<String>,

    /// Account password.
    #[arg(long, env = "WORKHUB_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and print the current user
    Whoami,

    /// List workspaces
    Workspaces,

    /// List documents, optionally scoped to a workspace
    Documents {
        #[arg(long)]
        workspace: Option<String>,
    },

    /// List notifications
    Notifications {
        /// Only unread notifications
        #[arg(long)]
        unread: bool,
        /// Maximum number to fetch
        #[arg(long)]
        limit: Option<u32>,
        /// Stay connected and print notifications as they are pushed
        #[arg(long)]
        follow: bool,
    },

    /// Mark one notification as read
    MarkRead { id: String },

    /// Mark every notification as read
    MarkAllRead,
}
