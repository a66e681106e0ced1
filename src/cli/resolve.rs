use crate::config::Settings;
use crate::models::CommandPath;
use crate::resolver::Resolver;
use crate::store::FsStore;
use crate::Result;
use colored::Colorize;

/// Print the resolved instruction text for a command path
pub fn run(segments: &[String], json: bool, settings: &Settings) -> Result<()> {
    let path = CommandPath::parse(&segments.join(" "))?;
    let resolver = Resolver::new(FsStore::from_settings(settings));
    let resolved = resolver.resolve(&path)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    for warning in &resolved.warnings {
        eprintln!("{}", format!("⚠ {}", warning).yellow());
    }

    let mut summary = format!(
        "$${} ({} tier, {})",
        resolved.matched, resolved.source, resolved.strategy.as_str()
    );
    if resolved.is_fallback() {
        summary.push_str(&format!(", unmatched: {}", resolved.remainder.join(" ")));
    }
    eprintln!("{}", summary.cyan());

    println!("{}", resolved.text);
    Ok(())
}
