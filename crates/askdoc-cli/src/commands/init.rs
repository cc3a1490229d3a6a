//! Init command - create config and database.

use super::get_paths;
use anyhow::{Context, Result};
use askdoc_config::Config;
use askdoc_db::Database;
use colored::Colorize;

/// Run the init command.
pub fn run() -> Result<()> {
    let paths = get_paths()?;
    paths
        .ensure_dirs()
        .context("Failed to create application directories")?;

    if paths.config_file.exists() {
        println!(
            "{} Config already exists at {}",
            "•".yellow(),
            paths.config_file.display()
        );
    } else {
        Config::create_default_file(&paths.config_file)
            .context("Failed to write default config")?;
        println!(
            "{} Created config at {}",
            "✓".green(),
            paths.config_file.display()
        );
    }

    Database::open(&paths.database_file).context("Failed to create database")?;
    println!(
        "{} Database ready at {}",
        "✓".green(),
        paths.database_file.display()
    );

    println!();
    println!("Next steps:");
    println!("  1. Review the config: {}", paths.config_file.display());
    println!("  2. Ingest a document: askdoc ingest <path>");
    println!("  3. Ask a question:    askdoc ask \"...\"");

    Ok(())
}
