use clap::{Parser, Subcommand};

use crate::commands;
use crate::config::Config;
use crate::error::Result;

/// Foxtrap - drive browser-extension tests in a disposable profile
#[derive(Parser)]
#[command(name = "foxtrap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Browser executable (overrides configuration)
    #[arg(long, env = "FOXTRAP_BROWSER", global = true)]
    pub browser: Option<String>,

    /// Window-automation executable (overrides configuration)
    #[arg(long, env = "FOXTRAP_AUTOMATION", global = true)]
    pub automation: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe the browser's version
    Probe,

    /// Launch the browser on a URL and drive it
    Open {
        /// URL to open
        url: String,

        /// Window title pattern to focus once it appears
        #[arg(long)]
        window: Option<String>,

        /// Key tokens to send after focusing; wrap literal text in <...>
        #[arg(long, requires = "window", num_args = 1..)]
        keys: Vec<String>,

        /// Extension manifest; run inside a disposable profile enabling it
        #[arg(long)]
        manifest: Option<String>,
    },

    /// Serve the fixture page over HTTPS
    Serve {
        /// Exit once the page has been served
        #[arg(long)]
        once: bool,
    },

    /// Disposable-profile helpers
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Print the extension id from a manifest
    ExtensionId {
        /// Path to install.rdf (falls back to configuration)
        #[arg(long)]
        manifest: Option<String>,
    },

    /// Write a profile tree under a directory
    Write {
        /// Directory that will act as the home directory
        dir: String,

        /// Path to install.rdf (falls back to configuration)
        #[arg(long)]
        manifest: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Probe => commands::probe::run(self),
            Commands::Open {
                url,
                window,
                keys,
                manifest,
            } => commands::open::run(self, url, window.as_deref(), keys, manifest.as_deref()),
            Commands::Serve { once } => commands::serve::run(self, *once),
            Commands::Profile { command } => commands::profile::run(self, command),
            Commands::Config { command } => commands::config::run(self, command),
        }
    }

    /// Configuration with command-line overrides applied.
    pub fn effective_config(&self) -> Result<Config> {
        let mut config = Config::load()?;
        if let Some(browser) = &self.browser {
            config.browser.executable = browser.clone();
        }
        if let Some(automation) = &self.automation {
            config.automation.executable = automation.clone();
        }
        Ok(config)
    }
}
