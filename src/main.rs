use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use pal::config::Settings;
use pal::Result;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Prompt dispatch layer for MCP hosts", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file (default: ~/.pal/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the instruction text a command path resolves to
    Resolve {
        /// Command path segments (e.g., "git commit")
        #[arg(required = true)]
        path: Vec<String>,

        /// Output the full resolution as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Run a $$ command line (stages joined with |, && or ;)
    Run {
        /// The command line, e.g. "git commit | review"
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,

        /// Value of $MSG
        #[arg(long)]
        msg: Option<String>,

        /// Value of $REPLY
        #[arg(long)]
        reply: Option<String>,

        /// Value of $SESSION
        #[arg(long)]
        session: Option<String>,

        /// Extra variables as NAME=value
        #[arg(long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,
    },

    /// List available commands
    List {
        /// Show descriptions and subcommands
        #[arg(short, long)]
        verbose: bool,
    },

    /// Manage custom prompts
    #[command(subcommand)]
    Prompt(pal::cli::prompt::PromptCommands),

    /// Create prompt directories and a default config
    Init,

    /// Serve MCP over stdio
    Serve,

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{}", format!("Error: failed to create tokio runtime: {}", e).red());
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run_async(cli)) {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

async fn run_async(cli: Cli) -> Result<()> {
    let config_path = match cli.config {
        Some(path) => path,
        None => Settings::config_path()?,
    };
    let settings = Settings::load(Some(&config_path))?;

    pal::logging::init(&settings.log_level);
    tracing::debug!(config = %config_path.display(), "settings loaded");

    match cli.command {
        Commands::Resolve { path, json } => {
            pal::cli::resolve::run(&path, json, &settings)?;
        }

        Commands::Run {
            command,
            msg,
            reply,
            session,
            vars,
        } => {
            let options = pal::cli::run::RunOptions {
                msg,
                reply,
                session,
                vars,
            };
            pal::cli::run::run(&pal::cli::run::join_args(&command), options, &settings)?;
        }

        Commands::List { verbose } => {
            pal::cli::list::run(verbose, &settings)?;
        }

        Commands::Prompt(cmd) => {
            pal::cli::prompt::run(cmd, &settings)?;
        }

        Commands::Init => {
            println!("{}", "🚀 Initializing PAL...".cyan());
            pal::cli::init::run(&settings, &config_path)?;
        }

        Commands::Serve => {
            pal::cli::serve::run(&settings).await?;
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "pal", &mut io::stdout());
        }
    }

    Ok(())
}
