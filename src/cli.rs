//! CLI argument parsing for the lexicon operation workflow.
//!
//! The CLI is intentionally thin: it loads project files, hands a snapshot to
//! the orchestrator, and persists whatever comes back, so the same core logic
//! can be reused elsewhere.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint for the lexicon workflow.
#[derive(Parser, Debug)]
#[command(
    name = "lexforge",
    version,
    about = "Bulk generative operations for constructed-language lexicons",
    after_help = "Commands:\n  init --project <dir>                      Bootstrap a project (lexicon + config)\n  repair --project <dir>                    Fix entries that violate project constraints\n  generate --project <dir> --count <n>      Generate new words and append them\n  evolve --project <dir>                    Apply the project's sound change rules\n  edit --project <dir> --instruction <text> Instruction-driven bulk edit\n  phonology --project <dir> --description <text>  Generate a phonology inventory\n  ipa --project <dir> --word <word>         Suggest a transcription for one word\n  gloss --project <dir> --sentence <text>   Gloss a sentence against grammar notes\n\nExamples:\n  lexforge init --project ~/conlangs/thalassic\n  lexforge repair --project ~/conlangs/thalassic\n  lexforge generate --project ~/conlangs/thalassic --count 20 --vibe \"soft, oceanic\"\n  lexforge evolve --project ~/conlangs/thalassic --json\n  lexforge ipa --project ~/conlangs/thalassic --word kava",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level workflow commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Init(InitArgs),
    Repair(RepairArgs),
    Generate(GenerateArgs),
    Evolve(EvolveArgs),
    Edit(EditArgs),
    Phonology(PhonologyArgs),
    Ipa(IpaArgs),
    Gloss(GlossArgs),
}

/// Init command inputs for bootstrapping a project.
#[derive(Parser, Debug)]
#[command(about = "Initialize a project (lexicon, constraints, rules, config)")]
pub struct InitArgs {
    /// Project root containing lexicon, constraints, rules, and config
    #[arg(long, value_name = "DIR")]
    pub project: PathBuf,

    /// Overwrite an existing lexicon.json
    #[arg(long)]
    pub force: bool,
}

/// Shared connection flags for commands that call the service.
#[derive(Parser, Debug)]
pub struct ServiceArgs {
    /// Generative service endpoint (overrides config and environment)
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Model selector forwarded to the service
    #[arg(long, value_name = "NAME")]
    pub model: Option<String>,
}

/// Repair command inputs.
#[derive(Parser, Debug)]
#[command(about = "Repair entries that violate project constraints")]
pub struct RepairArgs {
    /// Project root containing lexicon, constraints, rules, and config
    #[arg(long, value_name = "DIR")]
    pub project: PathBuf,

    #[command(flatten)]
    pub service: ServiceArgs,

    /// Emit the machine-readable JSON report
    #[arg(long)]
    pub json: bool,
}

/// Generate command inputs.
#[derive(Parser, Debug)]
#[command(about = "Generate new words and append them to the lexicon")]
pub struct GenerateArgs {
    /// Project root containing lexicon, constraints, rules, and config
    #[arg(long, value_name = "DIR")]
    pub project: PathBuf,

    /// How many words to request (clamped to 50 per dispatch)
    #[arg(long, value_name = "N", default_value_t = 10)]
    pub count: usize,

    /// Aesthetic description guiding the generation
    #[arg(long, value_name = "TEXT", default_value = "neutral")]
    pub vibe: String,

    #[command(flatten)]
    pub service: ServiceArgs,

    /// Emit the machine-readable JSON report
    #[arg(long)]
    pub json: bool,
}

/// Evolve command inputs.
#[derive(Parser, Debug)]
#[command(about = "Apply the project's ordered sound change rules to every word")]
pub struct EvolveArgs {
    /// Project root containing lexicon, constraints, rules, and config
    #[arg(long, value_name = "DIR")]
    pub project: PathBuf,

    #[command(flatten)]
    pub service: ServiceArgs,

    /// Emit the machine-readable JSON report
    #[arg(long)]
    pub json: bool,
}

/// Edit command inputs.
#[derive(Parser, Debug)]
#[command(about = "Apply an instruction-driven bulk edit to the lexicon")]
pub struct EditArgs {
    /// Project root containing lexicon, constraints, rules, and config
    #[arg(long, value_name = "DIR")]
    pub project: PathBuf,

    /// Free-text instruction describing the edit
    #[arg(long, value_name = "TEXT")]
    pub instruction: String,

    #[command(flatten)]
    pub service: ServiceArgs,

    /// Emit the machine-readable JSON report
    #[arg(long)]
    pub json: bool,
}

/// Ipa command inputs.
#[derive(Parser, Debug)]
#[command(about = "Suggest an IPA transcription for one word")]
pub struct IpaArgs {
    /// Project root containing lexicon, constraints, rules, and config
    #[arg(long, value_name = "DIR")]
    pub project: PathBuf,

    /// Word to transcribe
    #[arg(long, value_name = "WORD")]
    pub word: String,

    #[command(flatten)]
    pub service: ServiceArgs,
}

/// Gloss command inputs.
#[derive(Parser, Debug)]
#[command(about = "Gloss and analyze a sentence against grammar notes")]
pub struct GlossArgs {
    /// Project root containing lexicon, constraints, rules, and config
    #[arg(long, value_name = "DIR")]
    pub project: PathBuf,

    /// Sentence to analyze
    #[arg(long, value_name = "TEXT")]
    pub sentence: String,

    /// Free-text grammar notes guiding the analysis
    #[arg(long, value_name = "TEXT")]
    pub grammar: Option<String>,

    #[command(flatten)]
    pub service: ServiceArgs,
}

/// Phonology command inputs.
#[derive(Parser, Debug)]
#[command(about = "Generate a phonology inventory from a description")]
pub struct PhonologyArgs {
    /// Project root containing lexicon, constraints, rules, and config
    #[arg(long, value_name = "DIR")]
    pub project: PathBuf,

    /// Free-text description of the desired phonology
    #[arg(long, value_name = "TEXT")]
    pub description: String,

    #[command(flatten)]
    pub service: ServiceArgs,

    /// Emit the machine-readable JSON report
    #[arg(long)]
    pub json: bool,
}
