use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Clip web content into a Blinko instance.
#[derive(Debug, Parser)]
#[command(name = "blinko-clip", version, about)]
pub struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, env = "BLINKO_SETTINGS", global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Save a quick note
    Note {
        /// Note text
        text: String,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Summarize page text with the routed template
    Summarize {
        #[command(flatten)]
        page: PageArgs,
        /// Save the summary to Blinko instead of printing it
        #[arg(long)]
        save: bool,
    },
    /// Save page text as-is
    Extract {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Upload an image and save a note referencing it
    Upload {
        /// File to upload
        file: PathBuf,
        /// Override the detected MIME type
        #[arg(long)]
        mime_type: Option<String>,
        /// Caption placed above the source citation
        #[arg(long, default_value = "")]
        caption: String,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Read the AI provider settings from the Blinko server
    FetchConfig {
        /// Copy them into the local settings
        #[arg(long)]
        apply: bool,
    },
    /// Show which template applies to a page URL
    Resolve {
        url: String,
    },
    #[command(subcommand)]
    Settings(SettingsCommand),
    #[command(subcommand)]
    Template(TemplateCommand),
    #[command(subcommand)]
    Rule(RuleCommand),
}

/// Where clipped content came from.
#[derive(Debug, Default, Args)]
pub struct SourceArgs {
    /// Page URL
    #[arg(long, default_value = "")]
    pub url: String,
    /// Page title
    #[arg(long, default_value = "")]
    pub title: String,
}

/// Page text, read from `--text`, `--file`, or stdin.
#[derive(Debug, Args)]
pub struct PageArgs {
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,
    #[arg(long)]
    pub file: Option<PathBuf>,
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Inspect or change stored settings
#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Print the settings record
    Show,
    /// Set one field by its stored (camelCase) name
    Set {
        key: String,
        /// JSON value; bare words are taken as strings
        value: String,
    },
    /// Restore defaults
    Reset,
}

/// Manage prompt templates
#[derive(Debug, Subcommand)]
pub enum TemplateCommand {
    List,
    Add {
        name: String,
        content: String,
    },
    Update {
        id: String,
        content: String,
    },
    Delete {
        id: String,
    },
    Activate {
        id: String,
    },
}

/// Manage domain-to-template rules
#[derive(Debug, Subcommand)]
pub enum RuleCommand {
    List,
    Add {
        /// Substring matched against the page host
        domain: String,
        template_id: String,
    },
    Delete {
        id: String,
    },
}
