use anyhow::Result;
use colored::Colorize;

use saferide::config::Config;

use crate::cli::ConfigCommands;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = match Config::load_from(&path) {
        Ok(config) => {
            println!("{} {}", "Config file:".bold(), path.display());
            config
        }
        Err(_) => {
            println!(
                "{} {} {}",
                "Config file:".bold(),
                path.display(),
                "(not found, using defaults)".dimmed()
            );
            Config::default()
        }
    };

    let yaml = serde_yaml::to_string(&config)?;
    if config != Config::default() {
        println!();
        print!("{yaml}");
    }

    println!();
    println!("{}", "Effective settings:".bold());
    println!("  api.base_url              {}", config.api_url());
    println!("  api.buffer_m              {}", config.buffer_m());
    println!("  api.max_alternatives      {}", config.max_alternatives());
    println!("  api.mode                  {}", config.mode());
    println!("  geocoder.base_url         {}", config.geocoder_url());
    println!("  geocoder.limit            {}", config.suggestion_limit());
    println!(
        "  autocomplete.debounce_ms  {}",
        config.debounce().as_millis()
    );
    println!("  autocomplete.min_query_len {}", config.min_query_len());
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!(
        "{} {key} = {value} {}",
        "Set".green().bold(),
        format!("({})", path.display()).dimmed()
    );
    Ok(())
}
