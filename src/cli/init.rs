use crate::config::Settings;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Create the prompt directories and a default config file
pub fn run(settings: &Settings, config_path: &Path) -> Result<()> {
    settings.ensure_directories()?;
    println!(
        "{}",
        format!("✓ User prompts: {}", settings.prompts_path().display()).green()
    );
    println!(
        "{}",
        format!("✓ Custom prompts: {}", settings.custom_prompts_path().display()).green()
    );

    if config_path.exists() {
        println!(
            "{}",
            format!("• Config already exists: {}", config_path.display()).yellow()
        );
    } else {
        settings.save(config_path)?;
        println!("{}", format!("✓ Config: {}", config_path.display()).green());
    }

    Ok(())
}
