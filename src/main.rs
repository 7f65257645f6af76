use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use itinerary_planner::models::{AttractionSuggestion, Itinerary, TripForm};
use itinerary_planner::web::{self, AppState};
use itinerary_planner::{PlannerConfig, TripPlanner, logging};

/// AI travel itinerary planner backed by Gemini and Google Places
#[derive(Debug, Parser)]
#[command(name = "itinerary-planner", version, about)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the web form
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Suggest top attractions for a trip
    Suggest(TripArgs),
    /// Generate a day-by-day itinerary
    Itinerary {
        #[command(flatten)]
        trip: TripArgs,
        /// Attraction to cover, may be repeated
        #[arg(long = "attraction")]
        attractions: Vec<String>,
    },
}

#[derive(Debug, Args)]
struct TripArgs {
    #[arg(long)]
    destination: String,
    /// Trip length in days (1-30)
    #[arg(long, default_value = "4", allow_hyphen_values = true)]
    days: String,
    /// Low, Moderate or High
    #[arg(long, default_value = "Moderate")]
    budget: String,
    #[arg(long)]
    start_location: Option<String>,
    #[arg(long)]
    purpose: Option<String>,
    /// Comma separated preference tags
    #[arg(long, default_value = "")]
    preferences: String,
    /// First day of the trip (YYYY-MM-DD)
    #[arg(long)]
    start_date: Option<String>,
}

impl From<TripArgs> for TripForm {
    fn from(args: TripArgs) -> Self {
        TripForm {
            destination: args.destination,
            days: args.days,
            budget: args.budget,
            start_location: args.start_location.unwrap_or_default(),
            purpose: args.purpose.unwrap_or_default(),
            preferences: args.preferences,
            start_date: args.start_date.unwrap_or_default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = PlannerConfig::load_from_path(cli.config.clone())?;
    logging::init(&config.logging, cli.verbose)?;
    debug!("Loaded configuration: {:?}", cli.config);

    match cli.command {
        None => print_summary(&config, cli.config.as_ref(), cli.verbose),
        Some(Command::Serve { host, port }) => {
            let mut server = config.server.clone();
            if let Some(host) = host {
                server.host = host;
            }
            if let Some(port) = port {
                server.port = port;
            }
            let state = AppState::new(TripPlanner::from_config(&config)?)?;
            web::run(state, &server).await?;
        }
        Some(Command::Suggest(trip)) => {
            let request = TripForm::from(trip).validate()?;
            let planner = TripPlanner::from_config(&config)?;
            let suggestions = planner.suggest(&request).await?;
            print_suggestions(&suggestions);
        }
        Some(Command::Itinerary { trip, attractions }) => {
            let request = TripForm::from(trip).validate()?;
            let attractions: Vec<AttractionSuggestion> = attractions
                .into_iter()
                .enumerate()
                .map(|(i, name)| AttractionSuggestion::named(i + 1, name))
                .collect();
            let planner = TripPlanner::from_config(&config)?;
            let itinerary = planner.plan_itinerary(&request, &attractions).await?;
            print_itinerary(&itinerary);
        }
    }

    Ok(())
}

fn print_summary(config: &PlannerConfig, path: Option<&PathBuf>, verbose: bool) {
    println!("Itinerary Planner {}", itinerary_planner::VERSION);
    println!(
        "Gemini API key: {}",
        if config.llm.api_key.is_some() { "configured" } else { "missing (set GEMINI_API_KEY)" }
    );
    println!(
        "Google Places API key: {}",
        if config.places.api_key.is_some() {
            "configured"
        } else {
            "missing (set GOOGLE_PLACES_API_KEY)"
        }
    );
    println!("Run `itinerary-planner serve` to open the planner form.");

    if verbose {
        let path = path
            .cloned()
            .or_else(PlannerConfig::get_config_path)
            .map_or_else(|| "defaults".to_string(), |p| p.display().to_string());
        println!("Using config from: {path}");
        println!("Model: {}", config.llm.model);
        println!("Places lookup: {}", if config.places.enabled { "enabled" } else { "disabled" });
        println!("Listen address: {}:{}", config.server.host, config.server.port);
        println!("Log level: {}", config.logging.level);
    }
}

fn print_suggestions(suggestions: &[AttractionSuggestion]) {
    println!("Your Refined Travel Suggestions");
    for suggestion in suggestions {
        println!(
            "{}. {} [{}] {}",
            suggestion.rank, suggestion.name, suggestion.category, suggestion.description
        );
        if let Some(enrichment) = &suggestion.enrichment {
            let mut details = Vec::new();
            if let Some(address) = &enrichment.address {
                details.push(address.clone());
            }
            if let Some(rating) = enrichment.rating {
                details.push(format!("rating {rating:.1}"));
            }
            if let Some(distance) = enrichment.distance_km {
                details.push(format!("{distance:.1} km away"));
            }
            if !details.is_empty() {
                println!("   {}", details.join(" · "));
            }
        }
    }
}

fn print_itinerary(itinerary: &Itinerary) {
    println!("Your Detailed Itinerary Outline: {}", itinerary.destination);
    for day in &itinerary.days {
        match day.date {
            Some(date) => println!("Day {} ({}): {}", day.day_index, date, day.summary),
            None => println!("Day {}: {}", day.day_index, day.summary),
        }
    }
}
