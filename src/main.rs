use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;
use url::Url;

use podhome::{
    AppConfig, AppState, DEFAULT_API_URL, FetchStrategy, GenerationEvent, NoopReporter,
    PageGenerator, PlayerQueue, ProgressReporter, SharedProgressReporter, TracingReporter,
    export_page, get_static_props, serve,
};

// Emoji with fallback for terminals without Unicode support
static MICROPHONE: Emoji<'_, '_> = Emoji("🎙️  ", "");
static SEARCH: Emoji<'_, '_> = Emoji("🔍 ", "[~] ");
static HEADPHONES: Emoji<'_, '_> = Emoji("🎧 ", "[i] ");
static PAGE: Emoji<'_, '_> = Emoji("📄 ", "[=] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");

/// Generate and serve a podcast home page from a REST API
#[derive(Parser, Debug)]
#[command(name = "podhome")]
#[command(about = "Generate and serve a podcast home page from a REST API")]
#[command(version)]
struct Args {
    /// Base URL of the API serving `episodes`
    #[arg(long, env = "PODHOME_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: Url,

    /// Request timeout in seconds
    #[arg(long, env = "PODHOME_TIMEOUT", global = true)]
    timeout: Option<u64>,

    /// Quiet mode - only warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the page once and write it to disk
    Build {
        /// Output HTML file; props.json is written next to it
        #[arg(short, long, default_value = "index.html")]
        output: PathBuf,
    },

    /// Print the page props as JSON
    Props,

    /// Serve the page over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, env = "PODHOME_BIND", default_value = "127.0.0.1:3000")]
        bind: SocketAddr,

        /// When episode data is loaded
        #[arg(long, value_enum, default_value_t = FetchStrategy::ScheduledRegeneration)]
        strategy: FetchStrategy,
    },
}

/// Spinner reporter for the one-shot build
struct SpinnerReporter {
    bar: ProgressBar,
}

impl SpinnerReporter {
    fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {wide_msg}")
        {
            bar.set_style(style);
        }
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }
}

impl ProgressReporter for SpinnerReporter {
    fn report(&self, event: GenerationEvent) {
        match event {
            GenerationEvent::FetchingEpisodes { url } => {
                self.bar
                    .set_message(format!("{SEARCH}Fetching episodes: {}", url.cyan()));
            }
            GenerationEvent::EpisodesFetched {
                total_episodes,
                latest_episodes,
            } => {
                self.bar.set_message(format!(
                    "{HEADPHONES}{} episodes, {} latest",
                    total_episodes.to_string().cyan(),
                    latest_episodes.to_string().yellow()
                ));
            }
            GenerationEvent::PageRendered { bytes } => {
                self.bar.finish_and_clear();
                println!("{PAGE}Rendered {} bytes", bytes.to_string().cyan());
            }
            GenerationEvent::RegenerationFailed { error } => {
                self.bar
                    .abandon_with_message(format!("{FAILURE}{}", error.red()));
            }
        }
    }
}

fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "podhome=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.quiet);

    let config = AppConfig {
        api_url: args.api_url,
        timeout: args.timeout.map(Duration::from_secs),
        strategy: match args.command {
            Command::Serve { strategy, .. } => strategy,
            _ => FetchStrategy::default(),
        },
    };
    let client = config
        .http_client()
        .context("Failed to create HTTP client")?;

    match args.command {
        Command::Build { output } => {
            if !args.quiet {
                println!(
                    "\n{}{} {}\n",
                    MICROPHONE,
                    "podhome".bold().magenta(),
                    "- Podcast Home Page".dimmed()
                );
            }

            let reporter: SharedProgressReporter = if args.quiet {
                NoopReporter::shared()
            } else {
                Arc::new(SpinnerReporter::new())
            };

            let generator = PageGenerator::new(
                Arc::new(client),
                config.api_url.clone(),
                config.strategy,
                reporter,
            );
            let page = generator
                .generate(Utc::now())
                .await
                .context("Failed to generate page")?;
            let result = export_page(&page, &output).context("Failed to write page")?;

            if !args.quiet {
                println!(
                    "{SUCCESS}{} {} episodes -> {}, {}\n",
                    "Build complete:".bold().green(),
                    result.episode_count.to_string().green().bold(),
                    result.html_path.display().to_string().cyan(),
                    result.props_path.display().to_string().cyan()
                );
            }
        }

        Command::Props => {
            let static_props = get_static_props(&client, &config.api_url, &NoopReporter::shared())
                .await
                .context("Failed to fetch episodes")?;
            println!("{}", serde_json::to_string_pretty(&static_props)?);
        }

        Command::Serve { bind, .. } => {
            let generator = PageGenerator::new(
                Arc::new(client),
                config.api_url.clone(),
                config.strategy,
                TracingReporter::shared(),
            );
            let state = AppState::new(generator, PlayerQueue::shared());

            serve(bind, state)
                .await
                .with_context(|| format!("Failed to serve on {bind}"))?;
        }
    }

    Ok(())
}
