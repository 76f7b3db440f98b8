//! Config command handler
//!
//! View and modify configuration settings.

use crate::config::Config;
use crate::error::Result;
use clap::Args;

/// Config command arguments
#[derive(Args)]
pub struct ConfigArgs {
    /// Configuration key (e.g., "geocoder.provider")
    pub key: Option<String>,

    /// Value to set (if not provided, shows current value)
    pub value: Option<String>,

    /// Show config file path
    #[arg(long)]
    pub path: bool,

    /// Reset config to defaults
    #[arg(long)]
    pub reset: bool,
}

/// Run the config command
pub fn run(args: ConfigArgs) -> Result<()> {
    // Show path
    if args.path {
        let path = Config::config_path()?;
        println!("{}", path.display());
        return Ok(());
    }

    // Reset config
    if args.reset {
        let config = Config::default();
        config.save()?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    let mut config = Config::load()?;

    match (&args.key, &args.value) {
        // No arguments: show all config
        (None, None) => {
            show_all_config(&config);
        }

        // Key only: show that value
        (Some(key), None) => {
            if let Some(value) = config.get(key) {
                println!("{}", value);
            } else {
                eprintln!("Unknown config key: {}", key);
                eprintln!("\nAvailable keys:");
                for k in Config::available_keys() {
                    eprintln!("  {}", k);
                }
                std::process::exit(1);
            }
        }

        // Key and value: set the value
        (Some(key), Some(value)) => {
            config.set(key, value)?;
            config.save()?;
            println!("{} = {}", key, value);
        }

        // Value without key: not valid
        (None, Some(_)) => {
            eprintln!("Error: Must specify a key to set a value");
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Display all configuration values
fn show_all_config(config: &Config) {
    println!("[geocoder]");
    println!("provider = \"{}\"", config.geocoder.provider);
    println!("nominatim_url = \"{}\"", config.geocoder.nominatim_url);
    println!("http_url = \"{}\"", config.geocoder.http_url);
    println!("timeout_secs = {}", config.geocoder.timeout_secs);
    println!("max_results = {}", config.geocoder.max_results);
    println!();

    println!("[search]");
    println!("debounce_ms = {}", config.search.debounce_ms);
    println!("min_query_chars = {}", config.search.min_query_chars);
    println!();

    println!("[gps]");
    println!("provider = \"{}\"", config.gps.provider);
    println!("timeout_secs = {}", config.gps.timeout_secs);
    println!("high_accuracy = {}", config.gps.high_accuracy);
    match (config.gps.fixed_lat, config.gps.fixed_lng) {
        (Some(lat), Some(lng)) => {
            println!("fixed_lat = {}", lat);
            println!("fixed_lng = {}", lng);
        }
        _ => println!("# fixed_lat / fixed_lng not set"),
    }
    println!();

    println!("[map]");
    println!("default_lat = {}", config.map.default_lat);
    println!("default_lng = {}", config.map.default_lng);
    println!("default_zoom = {}", config.map.default_zoom);
    println!("selected_zoom = {}", config.map.selected_zoom);
    println!();

    println!("[server]");
    println!("host = \"{}\"", config.server.host);
    println!("port = {}", config.server.port);
}
