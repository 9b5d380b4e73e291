use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eventplan_common::{EventType, Language, PlanRequest, Preference};
use eventplan_core::form::{clamp_budget, clamp_guest_count};
use eventplan_core::handler::generate_plan;
use eventplan_core::{Config, GeminiAdapter};
use eventplan_web::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "eventplan")]
#[command(about = "AI event budget planner backed by Gemini")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Config file (.toml or .json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override model (e.g., gemini-1.5-flash, gemini-1.5-pro)
    #[arg(long, global = true)]
    pub model: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web planner
    Serve {
        /// Address to listen on
        #[arg(long)]
        listen: Option<SocketAddr>,
    },
    /// Generate one budget plan and print it
    Plan(PlanArgs),
}

#[derive(Debug, clap::Args)]
pub struct PlanArgs {
    /// Wedding, Birthday, Corporate or Festival
    #[arg(long, default_value = "Wedding")]
    pub event_type: EventType,
    /// Number of guests (at least 10)
    #[arg(long, default_value_t = 100)]
    pub guests: u64,
    /// City of the event
    #[arg(long, default_value = "")]
    pub location: String,
    /// Total budget in rupees (at least 10000)
    #[arg(long, default_value_t = 10_000)]
    pub budget: u64,
    /// economical, balanced or premium
    #[arg(long, default_value = "economical")]
    pub preference: Preference,
    /// Reply language
    #[arg(long, default_value = "English")]
    pub language: Language,
    /// Write the plan to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl PlanArgs {
    pub fn to_request(&self) -> PlanRequest {
        PlanRequest {
            event_type: self.event_type,
            guest_count: clamp_guest_count(self.guests),
            location: self.location.trim().to_string(),
            budget: clamp_budget(self.budget),
            preference: self.preference,
            language: self.language,
        }
    }
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if cli.debug {
        config.log_level = "debug".to_string();
    }
    init_tracing(&config.log_level, cli.debug);

    match cli.command {
        Some(Commands::Serve { listen }) => serve(config, listen).await,
        Some(Commands::Plan(args)) => plan_once(&config, &args).await,
        // Default to the web planner
        None => serve(config, None).await,
    }
}

async fn serve(mut config: Config, listen: Option<SocketAddr>) -> Result<()> {
    if let Some(listen) = listen {
        config.listen = listen;
    }
    let client = GeminiAdapter::from_config(&config)?;
    tracing::info!(model = client.model(), "using gemini model");
    let state = AppState::new(Arc::new(client)).with_session_idle_ttl(config.session_idle_ttl());
    eventplan_web::serve(config.listen, state).await
}

async fn plan_once(config: &Config, args: &PlanArgs) -> Result<()> {
    let client = GeminiAdapter::from_config(config)?;
    let request = args.to_request();
    let plan = generate_plan(&client, &request).await?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, &plan)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Plan saved to: {}", path.display());
        }
        None => println!("{plan}"),
    }
    Ok(())
}

/// `RUST_LOG` wins unless `--debug` was given; otherwise the configured level.
fn init_tracing(level: &str, force: bool) {
    let fallback = match level.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "warn" => "warn",
        "error" => "error",
        _ => "info",
    };
    let filter = if force {
        EnvFilter::new(fallback)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
