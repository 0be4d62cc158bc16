use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod assist;
mod cli;
mod commands;
mod constraints;
mod lexicon;
mod op;
mod oplog;
mod phonology;
mod project;
mod transport;

use cli::{Command, RootArgs};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = RootArgs::parse();
    match args.command {
        Command::Init(args) => commands::run_init(&args),
        Command::Repair(args) => commands::run_repair(&args),
        Command::Generate(args) => commands::run_generate(&args),
        Command::Evolve(args) => commands::run_evolve(&args),
        Command::Edit(args) => commands::run_edit(&args),
        Command::Phonology(args) => commands::run_phonology(&args),
        Command::Ipa(args) => commands::run_ipa(&args),
        Command::Gloss(args) => commands::run_gloss(&args),
    }
}
