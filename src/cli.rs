//! CLI definitions for Pagesmith.

use clap::{Parser, Subcommand};

use pagesmith_browser_cdp::DEFAULT_ENDPOINT;
use pagesmith_config::ProviderKind;
use pagesmith_router::QuickAction;

/// Pagesmith CLI.
#[derive(Parser)]
#[command(name = "pagesmith")]
#[command(about = "Edit live web pages with natural-language requests")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.pagesmith/config.toml)
    #[arg(short, long, global = true, env = "PAGESMITH_CONFIG")]
    pub config: Option<String>,

    /// Browser remote debugging endpoint
    #[arg(long, default_value = DEFAULT_ENDPOINT, global = true, env = "PAGESMITH_CDP")]
    pub cdp: String,

    /// Tab to drive, numbered from 1 in the browser's listing order
    #[arg(long, global = true)]
    pub tab: Option<i64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Send a request about the active browser tab
    Run {
        /// What to do with the page
        #[arg(required = true, num_args = 1..)]
        prompt: Vec<String>,

        /// Print the raw response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a canned quick action (change-color, explain-text, summarize, ...)
    Action {
        action: QuickAction,

        /// Print the raw response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the LLM configuration end to end
    TestConnection,

    /// Send one raw JSON message and print the reply
    Message {
        /// Message such as {"type":"PING"} or {"type":"GET_SELECTION"}
        json: String,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the stored configuration
    Show,

    /// Update the stored configuration
    Set {
        /// Provider (openai, anthropic, custom)
        #[arg(long)]
        provider: Option<ProviderKind>,

        /// API key
        #[arg(long, env = "PAGESMITH_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Model name
        #[arg(long)]
        model: Option<String>,

        /// API base URL; an empty value clears it
        #[arg(long)]
        base_url: Option<String>,
    },
}
