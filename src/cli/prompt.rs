//! Custom prompt CLI commands

use crate::config::Settings;
use crate::models::{CommandPath, Tier};
use crate::services::prompt_service;
use crate::store::{FsStore, PromptWriter};
use crate::Result;
use clap::Subcommand;
use colored::Colorize;

#[derive(Subcommand)]
pub enum PromptCommands {
    /// List custom prompts
    List,

    /// Show a custom prompt
    Show {
        /// Prompt name, dot-separated for nesting (e.g., "foo.bar")
        name: String,
    },

    /// Save a custom prompt (a literal \n becomes a newline)
    Save {
        /// Prompt name, dot-separated for nesting (e.g., "foo.bar")
        name: String,

        /// Instruction text
        #[arg(required = true, trailing_var_arg = true)]
        text: Vec<String>,
    },
}

pub fn run(cmd: PromptCommands, settings: &Settings) -> Result<()> {
    let store = FsStore::from_settings(settings);

    match cmd {
        PromptCommands::List => {
            let prompts = prompt_service::list_custom_prompts(&store)?;
            if prompts.is_empty() {
                println!("{}", "No custom prompts defined yet.".yellow());
            }
            for name in prompts {
                println!("{}", name);
            }
        }
        PromptCommands::Show { name } => {
            let path = CommandPath::parse(&name)?;
            match prompt_service::show_custom_prompt(&store, &path)? {
                Some(content) => println!("{}", content),
                None => anyhow::bail!(
                    "Prompt '{}' not found (expected at {})",
                    name,
                    store.location(Tier::Custom, &path)
                ),
            }
        }
        PromptCommands::Save { name, text } => {
            let path = CommandPath::parse(&name)?;
            settings.ensure_directories()?;
            let location = prompt_service::save_custom_prompt(&store, &path, &text.join(" "))?;
            println!("{}", format!("✓ Prompt '{}' saved to {}", name, location).green());
        }
    }

    Ok(())
}
