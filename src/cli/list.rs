use crate::config::Settings;
use crate::services::{Dispatcher, BUILTIN_COMMANDS};
use crate::store::FsStore;
use crate::Result;
use colored::Colorize;

/// List commands; `verbose` shows descriptions grouped by namespace
pub fn run(verbose: bool, settings: &Settings) -> Result<()> {
    let dispatcher = Dispatcher::new(FsStore::from_settings(settings));

    if !verbose {
        for command in dispatcher.list_commands()? {
            println!("{}", command);
        }
        return Ok(());
    }

    println!("{}", "Built-in commands:".green().bold());
    for name in BUILTIN_COMMANDS {
        println!("   • $${}", name);
    }

    println!("\n{}", "Prompt commands:".green().bold());
    for entry in dispatcher.resolver().catalog()? {
        match &entry.description {
            Some(description) => println!("   • $${} - {}", entry.name.bold(), description),
            None => println!("   • $${}", entry.name.bold()),
        }
        for sub in &entry.subcommands {
            println!("       {} {}", entry.name, sub.dimmed());
        }
    }

    Ok(())
}
