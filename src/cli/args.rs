//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal, machine-friendly output
//! - `--store <provider>`: Credential storage backend
//! - `--no-interactive`: Disable prompts

use clap::{Parser, Subcommand};

use crate::store::DEFAULT_PROVIDER;

/// difyc - a terminal client for Dify chat instances
#[derive(Parser, Debug)]
#[command(name = "difyc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    /// Credential storage backend (file, keychain, memory)
    #[arg(long, global = true, default_value = DEFAULT_PROVIDER)]
    pub store: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Interactive unless `--no-interactive` or `--quiet` was given or stdin
    /// is not a terminal.
    pub fn interactive(&self) -> bool {
        if self.no_interactive || self.quiet {
            false
        } else {
            use std::io::IsTerminal;
            std::io::stdin().is_terminal()
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in through the hosted login page
    #[command(
        name = "login",
        long_about = "Sign in to a Dify instance through its hosted login page.\n\n\
            Opens the instance's sign-in page in your browser. After you complete \
            the sign-in there, the browser lands on a URL carrying your tokens; \
            paste that URL back here to finish. The command then verifies the \
            session with a test API call before declaring success.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Sign in to Dify Cloud (opens browser automatically)
    difyc login

    # Sign in without opening a browser (prints the URL instead)
    difyc login --no-browser

    # Sign in to a self-hosted instance
    difyc instance set custom --domain dify.mycompany.com
    difyc login

HOW IT WORKS:
    1. Run 'difyc login' to open the sign-in page
    2. Complete the sign-in in your browser
    3. Copy the URL of the page you land on (it ends up on /apps)
    4. Paste it at the prompt
    5. Optionally paste the session cookie header when asked"
    )]
    Login {
        /// Do not attempt to open the browser automatically
        #[arg(long)]
        no_browser: bool,
    },

    /// Show authentication and instance status
    #[command(
        name = "status",
        long_about = "Show the current session status.\n\n\
            Displays whether you are signed in, which instance is selected, and \
            how many apps are cached locally. Never prints tokens or cookies.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Human-readable status
    difyc status

    # Machine-readable status for scripting
    difyc status --quiet    # prints 'authenticated' or 'not_authenticated'"
    )]
    Status,

    /// Remove stored credentials and sign out
    #[command(
        name = "logout",
        long_about = "Sign out and remove all stored session data.\n\n\
            Deletes tokens, cookies, instance selection, and the cached apps \
            list from the credential store. Safe to run when already signed out.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Sign out
    difyc logout"
    )]
    Logout,

    /// Show or change the selected instance
    #[command(
        name = "instance",
        long_about = "Show or change which Dify instance this client talks to.\n\n\
            Two kinds of instance exist: 'cloud' (the hosted service) and \
            'custom' (a self-hosted deployment, which needs a domain). Changing \
            the instance does not sign you out, but credentials from one \
            instance will not work against another.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Show the current selection
    difyc instance

    # Select Dify Cloud
    difyc instance set cloud

    # Select a self-hosted deployment
    difyc instance set custom --domain dify.mycompany.com
    difyc instance set custom --domain https://dify.internal:8443"
    )]
    Instance {
        #[command(subcommand)]
        action: Option<InstanceAction>,
    },

    /// List the apps exposed by the instance
    #[command(
        name = "apps",
        long_about = "List the apps (assistants) your account can talk to.\n\n\
            By default this shows the locally cached list captured at login. \
            Use --refresh to fetch the current list from the instance and \
            update the cache.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Show the cached apps list
    difyc apps

    # Fetch a fresh list from the instance
    difyc apps --refresh"
    )]
    Apps {
        /// Fetch from the instance instead of the local cache
        #[arg(long)]
        refresh: bool,
    },

    /// Send a chat message
    #[command(
        name = "chat",
        long_about = "Send a message and print the answer.\n\n\
            Sends a blocking chat message to the selected instance. The first \
            message creates a conversation server-side; pass --conversation to \
            continue an existing one.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Start a new conversation
    difyc chat \"What's the refund policy?\"

    # Continue an existing conversation
    difyc chat --conversation 3f2a... \"And for digital goods?\"

    # Print the conversation id too (to continue later)
    difyc chat --show-conversation \"hello\""
    )]
    Chat {
        /// The message to send
        query: String,

        /// Continue an existing conversation by id
        #[arg(long)]
        conversation: Option<String>,

        /// Also print the conversation id of the reply
        #[arg(long)]
        show_conversation: bool,
    },

    /// List or delete conversations
    #[command(
        name = "conversations",
        long_about = "List your conversations on the instance, or delete one.\n\n\
            Conversations are listed newest first as returned by the instance.",
        after_help = "\
WORKFLOW EXAMPLES:
    # List recent conversations
    difyc conversations

    # List more of them
    difyc conversations --limit 50

    # Delete a conversation
    difyc conversations --delete 3f2a..."
    )]
    Conversations {
        /// Maximum number of conversations to list
        #[arg(long)]
        limit: Option<u32>,

        /// Delete the conversation with this id instead of listing
        #[arg(long, value_name = "ID")]
        delete: Option<String>,
    },
}

/// Instance subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum InstanceAction {
    /// Select an instance
    Set {
        /// Instance kind: "cloud" or "custom"
        kind: String,

        /// Domain of a custom instance (required for "custom")
        #[arg(long)]
        domain: Option<String>,
    },
}
