use anyhow::Result;
use clap::{Parser, Subcommand};

use insightdash::{cli, config, llm, web};

#[derive(Debug, Parser)]
#[command(name = "insightdash")]
#[command(about = "Natural-language business analytics dashboard")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the web dashboard
    Serve {
        /// Address to bind (default from config: 127.0.0.1:9747)
        #[arg(long)]
        addr: Option<String>,
        /// Do not open the dashboard in a browser
        #[arg(long)]
        no_browser: bool,
    },
    /// Analyze a single question and print the result
    Ask {
        /// The business question
        #[arg(trailing_var_arg = true, required = true)]
        query: Vec<String>,
        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show autocomplete suggestions for a partial question
    Suggest {
        #[arg(trailing_var_arg = true, required = true)]
        partial: Vec<String>,
    },
    /// Show query-log statistics
    Stats {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
    },
    /// Check provider, API key, config and log status
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default config file to ~/.insightdash/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `model.provider ollama`
    Set { key: String, value: String },
    /// Reset the global config file to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Serve { addr, no_browser } => {
            let cfg = config::load();
            let addr = addr.unwrap_or_else(|| cfg.server.addr.clone());
            let open = cfg.server.open_browser && !no_browser;
            let model = llm::build_model(&cfg.model);
            web::serve(cfg, model, &addr, open)
        }
        Commands::Ask { query, json } => {
            let cfg = config::load();
            let model = llm::build_model(&cfg.model);
            cli::run_ask(&cfg, model, &query.join(" "), json)
        }
        Commands::Suggest { partial } => {
            let cfg = config::load();
            cli::run_suggest(llm::build_model(&cfg.model), &partial.join(" "))
        }
        Commands::Stats { format, days } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_stats(fmt, days)
        }
        Commands::Health => cli::run_health(),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
