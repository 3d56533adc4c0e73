pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use affinity_core::config::{AppConfig, LoadOptions, LogFormat};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "affinity",
    about = "Affinity engine CLI",
    long_about = "Drive the Affinity personalization, deal-aggregation and campaign engine \
                  against a local snapshot store.",
    after_help = "Examples:\n  affinity seed\n  affinity recommend --user user-demo --limit 3\n  affinity best-deal --product prod-earbuds-anc\n  affinity launch --name \"Payday push\" --type behavioral --audience deal_hunters --product prod-earbuds-anc"
)]
pub struct Cli {
    /// Snapshot store file.
    #[arg(long, global = true, default_value = "affinity-store.json")]
    store: PathBuf,
    /// Optional config file (defaults to affinity.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Add a short processing delay to interactive commands.
    #[arg(long, global = true)]
    pace: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Write a deterministic demo catalog and user to the store")]
    Seed,
    #[command(about = "Rank the catalog for a user")]
    Recommend {
        #[arg(long)]
        user: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    #[command(name = "best-deal", about = "Cheapest verified purchase path for a product")]
    BestDeal {
        #[arg(long)]
        product: String,
    },
    #[command(name = "price-drop", about = "Check the recent price-drop heuristic for a product")]
    PriceDrop {
        #[arg(long)]
        product: String,
    },
    #[command(about = "Validate and launch a smart campaign")]
    Launch {
        #[arg(long)]
        name: String,
        #[arg(long = "type")]
        campaign_type: String,
        #[arg(long = "audience", required = true)]
        audience: Vec<String>,
        #[arg(long = "product", required = true)]
        products: Vec<String>,
    },
    #[command(about = "Apply one optimization pass to a campaign")]
    Optimize {
        #[arg(long)]
        id: String,
    },
    #[command(about = "Pause an active campaign")]
    Pause {
        #[arg(long)]
        id: String,
    },
    #[command(about = "Resume a paused campaign")]
    Resume {
        #[arg(long)]
        id: String,
    },
    #[command(about = "Complete a campaign (terminal)")]
    Complete {
        #[arg(long)]
        id: String,
    },
    #[command(about = "List the newest insights in the feed")]
    Insights {
        #[arg(long)]
        limit: Option<usize>,
    },
    #[command(about = "Dashboard rollup of catalog and campaign state")]
    Dashboard,
    #[command(about = "Show the effective configuration")]
    Config,
}

fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt().with_target(false).with_max_level(log_level);
    // A second init (tests, repeated calls) is fine to ignore.
    let result = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    let _ = result;
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(LoadOptions {
        config_path: cli.config.clone(),
        require_file: cli.config.is_some(),
    }) {
        Ok(config) => config,
        Err(error) => {
            let result = commands::CommandResult::failure(
                "config",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };
    init_logging(&config);

    let store = cli.store.as_path();
    let result = match &cli.command {
        Command::Seed => commands::seed::run(&config, store),
        Command::Recommend { user, limit } => {
            commands::pace(cli.pace).await;
            commands::recommend::run(&config, store, user, *limit)
        }
        Command::BestDeal { product } => {
            commands::pace(cli.pace).await;
            commands::deals::best_deal(&config, store, product)
        }
        Command::PriceDrop { product } => commands::deals::price_drop(&config, store, product),
        Command::Launch { name, campaign_type, audience, products } => {
            commands::campaign::launch(&config, store, name, campaign_type, audience, products)
        }
        Command::Optimize { id } => {
            commands::pace(cli.pace).await;
            commands::campaign::optimize(&config, store, id)
        }
        Command::Pause { id } => commands::campaign::pause(&config, store, id),
        Command::Resume { id } => commands::campaign::resume(&config, store, id),
        Command::Complete { id } => commands::campaign::complete(&config, store, id),
        Command::Insights { limit } => commands::insights::run(&config, store, *limit),
        Command::Dashboard => commands::dashboard::run(&config, store),
        Command::Config => commands::config::run(&config),
    };

    info!(
        command = command_name(&cli.command),
        store = %store.display(),
        exit_code = result.exit_code,
        "command finished"
    );

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Seed => "seed",
        Command::Recommend { .. } => "recommend",
        Command::BestDeal { .. } => "best-deal",
        Command::PriceDrop { .. } => "price-drop",
        Command::Launch { .. } => "launch",
        Command::Optimize { .. } => "optimize",
        Command::Pause { .. } => "pause",
        Command::Resume { .. } => "resume",
        Command::Complete { .. } => "complete",
        Command::Insights { .. } => "insights",
        Command::Dashboard => "dashboard",
        Command::Config => "config",
    }
}
