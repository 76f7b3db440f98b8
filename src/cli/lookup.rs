//! Lookup command handlers
//!
//! One-off reverse geocode, search, geocode and device position queries
//! against the configured backends.

use crate::config::Config;
use crate::coord::{Coordinate, SearchResult, SelectedLocation};
use crate::error::{Error, Result};
use crate::geo::{GeocodeClient, Geocoder};
use crate::gps::locator_from_config;
use crate::session::geocode_with_fallback;
use clap::Args;
use serde::Serialize;

/// Options shared by every lookup command
#[derive(Args)]
pub struct LookupOptions {
    /// Geocoder backend ("nominatim" or "http")
    #[arg(long, short = 'g')]
    pub geocoder: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl LookupOptions {
    fn config(&self) -> Result<Config> {
        let mut config = Config::load()?;
        if let Some(geocoder) = &self.geocoder {
            config.set("geocoder.provider", geocoder)?;
        }
        Ok(config)
    }
}

/// Reverse command arguments
#[derive(Args)]
pub struct ReverseArgs {
    /// Latitude
    #[arg(long, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude
    #[arg(long, allow_hyphen_values = true)]
    pub lng: f64,

    #[command(flatten)]
    pub options: LookupOptions,
}

/// Search command arguments
#[derive(Args)]
pub struct SearchArgs {
    /// Free-text place query
    pub query: String,

    #[command(flatten)]
    pub options: LookupOptions,
}

/// Geocode command arguments
#[derive(Args)]
pub struct GeocodeArgs {
    /// Address text
    pub address: String,

    #[command(flatten)]
    pub options: LookupOptions,
}

/// Locate command arguments
#[derive(Args)]
pub struct LocateArgs {
    /// Print the coordinate only, without looking up its address
    #[arg(long)]
    pub no_resolve: bool,

    #[command(flatten)]
    pub options: LookupOptions,
}

/// Run the reverse command
pub async fn reverse(args: ReverseArgs) -> Result<()> {
    let config = args.options.config()?;
    let geocoder = Geocoder::from_config(&config.geocoder)?;

    let coordinate = Coordinate::new(args.lat, args.lng)?;
    let resolved = geocoder.reverse_geocode(coordinate).await?;

    print_selection(&SelectedLocation::new(coordinate, resolved), args.options.json)
}

/// Run the search command
pub async fn search(args: SearchArgs) -> Result<()> {
    let config = args.options.config()?;
    let geocoder = Geocoder::from_config(&config.geocoder)?;

    let query = args.query.trim();
    if query.chars().count() < config.search.min_query_chars {
        return Err(Error::Config(format!(
            "Query must be at least {} characters",
            config.search.min_query_chars
        )));
    }

    let results = geocoder.search_places(query).await?;

    if args.options.json {
        return print_json(&results);
    }
    if results.is_empty() {
        eprintln!("No places found for '{}'", query);
        return Ok(());
    }
    for (i, result) in results.iter().enumerate() {
        print_search_result(i + 1, result);
    }
    Ok(())
}

/// Run the geocode command
///
/// Retries once with a simplified address, then resolves the canonical
/// address at the found coordinate.
pub async fn geocode(args: GeocodeArgs) -> Result<()> {
    let config = args.options.config()?;
    let geocoder = Geocoder::from_config(&config.geocoder)?;

    let coordinate = geocode_with_fallback(&geocoder, args.address.trim()).await?;
    let resolved = geocoder.reverse_geocode(coordinate).await?;

    print_selection(&SelectedLocation::new(coordinate, resolved), args.options.json)
}

/// Run the locate command
pub async fn locate(args: LocateArgs) -> Result<()> {
    let config = args.options.config()?;
    let locator = locator_from_config(&config.gps)?;

    let coordinate = locator.locate().await?;

    if args.no_resolve {
        if args.options.json {
            return print_json(&coordinate);
        }
        println!("{}", coordinate);
        return Ok(());
    }

    let geocoder = Geocoder::from_config(&config.geocoder)?;
    let resolved = geocoder.reverse_geocode(coordinate).await?;

    print_selection(&SelectedLocation::new(coordinate, resolved), args.options.json)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| Error::Server(format!("Failed to serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}

fn print_selection(selection: &SelectedLocation, json: bool) -> Result<()> {
    if json {
        return print_json(selection);
    }

    println!("Coordinate:  {}", selection.coordinate);
    println!("Address:     {}", selection.resolved.address);
    println!("City:        {}", selection.resolved.city);
    println!("Postal code: {}", selection.resolved.postal_code);
    Ok(())
}

fn print_search_result(index: usize, result: &SearchResult) {
    match result.coordinate {
        Some(coordinate) => println!("{:>2}. {} ({})", index, result.title, coordinate),
        None => println!("{:>2}. {}", index, result.title),
    }
    if !result.description.is_empty() {
        println!("    {}", result.description);
    }
}
