//! CLI definitions for PageFill.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// PageFill CLI.
#[derive(Parser)]
#[command(name = "pagefill")]
#[command(about = "Fill the text fields of a browser tab with generated text")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.pagefill/config.toml)
    #[arg(short, long, env = "PAGEFILL_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Show the fillable fields of the attached tab
    Info,

    /// Fill every text field of the attached tab
    Fill {
        /// API key to use instead of the stored one
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum KeyAction {
    /// Store an API key
    Set {
        /// Gemini API key
        key: String,
    },

    /// Show whether a key is stored
    Show,
}
