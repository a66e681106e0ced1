use crate::config::Settings;
use crate::services::{DispatchContext, Dispatcher};
use crate::store::FsStore;
use crate::Result;
use colored::Colorize;

/// Variables supplied on the command line
#[derive(Debug, Default)]
pub struct RunOptions {
    pub msg: Option<String>,
    pub reply: Option<String>,
    pub session: Option<String>,
    /// Extra `NAME=value` pairs
    pub vars: Vec<String>,
}

/// Join shell arguments back into one command line
///
/// A single argument is the whole line. Otherwise an argument holding an
/// operator character is double-quoted, so `pal run echo "a | b"` stays one
/// stage, while standalone `|`, `&&` and `;` remain operators.
pub fn join_args(args: &[String]) -> String {
    if let [line] = args {
        return line.clone();
    }
    args.iter()
        .map(|arg| {
            let operator = matches!(arg.as_str(), "|" | "&&" | ";");
            if !operator && arg.contains(['|', ';', '&']) {
                format!("\"{}\"", arg.replace('\\', "\\\\").replace('"', "\\\""))
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a `$$` command line and print the rendered instructions
pub fn run(command_line: &str, options: RunOptions, settings: &Settings) -> Result<()> {
    let mut ctx = DispatchContext::new();
    if let Some(msg) = options.msg {
        ctx.set("MSG", msg);
    }
    if let Some(reply) = options.reply {
        ctx.set("REPLY", reply);
    }
    if let Some(session) = options.session {
        ctx.set("SESSION", session);
    }
    for pair in &options.vars {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Variable must be NAME=value, got '{}'", pair))?;
        ctx.set(name.trim(), value);
    }

    let dispatcher = Dispatcher::new(FsStore::from_settings(settings));
    let output = dispatcher.run(command_line, &ctx)?;
    println!("{}", output.text());

    if !output.success() {
        let failed = output
            .stages
            .iter()
            .filter(|s| s.status != crate::services::StageStatus::Ok)
            .count();
        eprintln!(
            "{}",
            format!("⚠ {} of {} stage(s) did not succeed", failed, output.stages.len()).yellow()
        );
    }
    Ok(())
}
