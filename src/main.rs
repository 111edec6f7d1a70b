use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use foodguide::api::AppState;
use foodguide::config::LocationConfig;
use foodguide::render::render;
use foodguide::{
    CuisineCategory, FoodGuideConfig, FoodGuideError, GeminiClient, GeminiSettings, Geocoder,
    LoadingState, LocationInput, LocationResolver, RequestComposer, RestaurantSearchClient,
    SearchController, SessionView, logging, web,
};

/// Location-aware restaurant discovery powered by a maps-grounded AI model
#[derive(Parser)]
#[command(name = "foodguide")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the best-rated restaurants near a location
    #[command(alias = "s")]
    Search {
        /// Coordinates ("25.03,121.56") or a place name
        #[arg(short, long)]
        location: Option<String>,
        /// Cuisine category (see `categories`)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Search interactively, switching categories and retrying
    #[command(alias = "b")]
    Browse {
        /// Coordinates ("25.03,121.56") or a place name
        #[arg(short, long)]
        location: Option<String>,
        /// Category to start with
        #[arg(short, long)]
        category: Option<String>,
    },

    /// List the cuisine categories
    #[command(alias = "ls")]
    Categories,

    /// Serve the HTTP API
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            match err.downcast_ref::<FoodGuideError>() {
                Some(e) => eprintln!("❌ {}", e.user_message()),
                None => eprintln!("❌ {err:#}"),
            }
            debug!("Fatal error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = FoodGuideConfig::load_from_path(cli.config.clone())?;
    logging::init(&config.logging, cli.verbose)?;

    match cli.command {
        None => {
            print_hints(&config, cli.config.as_deref());
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Categories) => {
            let default = config.default_category()?;
            for category in CuisineCategory::ALL {
                let marker = if category == default { " (default)" } else { "" };
                println!("{category}{marker}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Search { location, category }) => {
            let mut controller = build_controller(&config, location, category)?
                .with_observer(print_frame);
            controller.start().await;

            if controller.session().loading_state() == LoadingState::Success {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Some(Commands::Browse { location, category }) => {
            let mut controller = build_controller(&config, location, category)?
                .with_observer(print_frame);
            controller.start().await;
            browse(&mut controller).await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Serve { port }) => {
            let state = AppState {
                client: build_client(&config)?,
            };
            web::run(port.unwrap_or(config.server.port), state).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn build_client(config: &FoodGuideConfig) -> Result<Arc<RestaurantSearchClient>> {
    let settings = GeminiSettings::from_config(&config.gemini)?;
    let gemini = GeminiClient::new(settings)?;
    let composer = RequestComposer::new(config.search.language.clone(), config.gemini.temperature);
    Ok(Arc::new(RestaurantSearchClient::new(composer, Arc::new(gemini))))
}

fn build_controller(
    config: &FoodGuideConfig,
    location: Option<String>,
    category: Option<String>,
) -> Result<SearchController<LocationResolver>> {
    let category = match category {
        Some(name) => name.parse::<CuisineCategory>()?,
        None => config.default_category()?,
    };
    let input = location_input(location.as_deref(), &config.location)?;
    let provider = LocationResolver::new(input, Geocoder::default());

    Ok(SearchController::new(build_client(config)?, provider, category))
}

/// The command-line location wins over the configured one
fn location_input(arg: Option<&str>, config: &LocationConfig) -> Result<Option<LocationInput>> {
    if let Some(arg) = arg {
        return Ok(Some(arg.parse::<LocationInput>()?));
    }
    if let Some(location) = config.fixed() {
        return Ok(Some(LocationInput::Coordinates(location)));
    }
    Ok(config.name.clone().map(LocationInput::Name))
}

async fn browse(controller: &mut SearchController<LocationResolver>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("category / [r]etry / [q]uit > ");
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next_line().await.context("Failed to read input")? else {
            break;
        };
        match line.trim() {
            "" => continue,
            "q" | "quit" => break,
            "r" | "retry" => controller.retry().await,
            name => match name.parse::<CuisineCategory>() {
                Ok(category) => controller.select_category(category).await,
                Err(e) => eprintln!("{}", e.user_message()),
            },
        }
    }

    info!("Browse session ended");
    Ok(())
}

fn print_frame(view: &SessionView<'_>) {
    println!("{}", render(view));
}

fn print_hints(config: &FoodGuideConfig, path: Option<&Path>) {
    println!("🍜 FoodGuide v{}", foodguide::VERSION);
    match path.map(Path::to_path_buf).or_else(FoodGuideConfig::get_config_path) {
        Some(path) if path.exists() => println!("Using config from: {}", path.display()),
        Some(path) => println!("No config file found (looked for {})", path.display()),
        None => println!("No config directory available; using defaults"),
    }
    println!("Log level: {}", config.logging.level);
    if config.gemini.api_key.is_none() {
        println!("⚠️  No Gemini API key. Set GEMINI_API_KEY or FOODGUIDE_GEMINI__API_KEY.");
    }
    println!();
    println!("Try: foodguide search --location \"25.03,121.56\" --category Cafe");
    println!("Run `foodguide --help` for all commands.");
}
