use anyhow::Context;
use clap::Parser;
use slot_scout::config::{LoggingSettings, Settings};
use slot_scout::core::{CriteriaBuilder, PollLoop};
use slot_scout::models::{Manufacturer, Radius};
use slot_scout::services::{FeedClient, NominatimClient, PageClient};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "slot-scout")]
#[command(about = "Ping the location feed for open appointments in your area")]
struct Cli {
    /// Cities to restrict the search to
    #[arg(short = 'c', long, num_args = 1.., value_name = "CITY")]
    cities: Option<Vec<String>>,

    /// Home location: zipcode, address, city, etc. (requires --distance)
    #[arg(short = 'H', long, requires = "distance")]
    home: Option<String>,

    /// Maximum distance in miles from home (requires --home)
    #[arg(short = 'd', long, requires = "home", value_name = "MILES")]
    distance: Option<f64>,

    /// Zipcodes to restrict the search to
    #[arg(short = 'Z', long, num_args = 1.., value_name = "ZIP")]
    zipcodes: Option<Vec<String>>,

    /// Manufacturer to limit the search to: M = Moderna, J = Johnson, P = Pfizer
    #[arg(short = 'T', long = "type", value_name = "M|J|P")]
    manufacturer: Option<Manufacturer>,

    /// Extra configuration file layered over config/default.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the match report as JSON
    #[arg(long)]
    json: bool,
}

fn init_tracing(logging: &LoggingSettings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    match logging.format.as_str() {
        "pretty" => subscriber.pretty().init(),
        "json" => subscriber.json().init(),
        _ => subscriber.compact().init(),
    }
}

/// One-line description of the distance constraint for the console
fn radius_summary(home: &str, radius: &Radius) -> String {
    format!(
        "Looking for appointments {} miles from {} at {}",
        radius.max_miles, home, radius.home
    )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref())?;
    init_tracing(&settings.logging);

    let geocoder = NominatimClient::new(
        settings.geocoder.endpoint.clone(),
        &settings.geocoder.user_agent,
        Duration::from_secs(settings.geocoder.timeout_secs),
    )
    .context("Failed to create geocoding client")?;

    let builder = CriteriaBuilder {
        cities: cli.cities,
        zipcodes: cli.zipcodes,
        home: cli.home.clone(),
        distance_miles: cli.distance,
        category: cli.manufacturer,
    };

    let criteria = builder.build(&geocoder).await.map_err(|e| {
        error!("Invalid search criteria: {}", e);
        e
    })?;

    if let (Some(home), Some(radius)) = (&cli.home, criteria.radius()) {
        println!("{}", radius_summary(home, radius));
    }
    if let Some(manufacturer) = criteria.category() {
        println!("Limiting to {} manufacturer", manufacturer);
    }

    let feed = FeedClient::new(
        settings.feed.url.clone(),
        Duration::from_secs(settings.feed.timeout_secs),
    )
    .context("Failed to create feed client")?;
    let pages = PageClient::new(Duration::from_secs(settings.feed.page_timeout_secs))
        .context("Failed to create page client")?;

    info!("Polling {} every {:?}", feed.url(), settings.polling.interval());

    let mut poller = PollLoop::new(feed, geocoder, pages)
        .with_interval(settings.polling.interval())
        .with_backoff(settings.polling.backoff());

    let report = poller.run(&criteria).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for matched in &report.matches {
            println!("{}\n", matched);
        }
        println!(
            "Found {} location(s) after {} round(s)",
            report.matches.len(),
            report.rounds
        );
    }

    Ok(())
}
