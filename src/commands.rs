//! Command implementations wiring project files to the orchestrator.
//!
//! Every command follows the same shape: load a snapshot of the project,
//! build the service transport, run one operation, persist the result
//! collection, and print the report. The snapshot/persist split is what keeps
//! the caller-facing model from ever observing a half-merged state.
use crate::assist;
use crate::cli::{
    EditArgs, EvolveArgs, GenerateArgs, GlossArgs, InitArgs, IpaArgs, PhonologyArgs, RepairArgs,
    ServiceArgs,
};
use crate::lexicon::LexiconEntry;
use crate::op::{OperationReport, OperationRequest, Orchestrator};
use crate::oplog::OpLog;
use crate::project::{resolve_service_config, ProjectPaths};
use crate::transport::HttpService;
use anyhow::{anyhow, Result};

pub fn run_init(args: &InitArgs) -> Result<()> {
    let paths = ProjectPaths::new(args.project.clone());
    paths.init(args.force)?;
    println!("initialized project at {}", paths.root().display());
    Ok(())
}

pub fn run_repair(args: &RepairArgs) -> Result<()> {
    let paths = ProjectPaths::new(args.project.clone());
    let lexicon = paths.load_lexicon()?;
    let constraints = paths.load_constraints()?;
    let invalid: Vec<LexiconEntry> = lexicon
        .iter()
        .filter(|entry| !constraints.is_valid(&entry.word))
        .cloned()
        .collect();

    let service = build_service(&paths, &args.service)?;
    let report = orchestrator(&paths, &service).run(
        &lexicon,
        &OperationRequest::Repair {
            invalid: &invalid,
            constraints: &constraints,
        },
    );

    finish_lexicon_op(&paths, report, args.json)
}

pub fn run_generate(args: &GenerateArgs) -> Result<()> {
    let paths = ProjectPaths::new(args.project.clone());
    let lexicon = paths.load_lexicon()?;
    let constraints = paths.load_constraints()?;

    let service = build_service(&paths, &args.service)?;
    let report = orchestrator(&paths, &service).run(
        &lexicon,
        &OperationRequest::Generate {
            count: args.count,
            vibe: &args.vibe,
            constraints: &constraints,
        },
    );

    finish_lexicon_op(&paths, report, args.json)
}

pub fn run_evolve(args: &EvolveArgs) -> Result<()> {
    let paths = ProjectPaths::new(args.project.clone());
    let lexicon = paths.load_lexicon()?;
    let rules = paths.load_rules()?;
    if rules.is_empty() {
        return Err(anyhow!(
            "no sound change rules in {}; add some before evolving",
            paths.rules_path().display()
        ));
    }

    let service = build_service(&paths, &args.service)?;
    let report = orchestrator(&paths, &service)
        .run(&lexicon, &OperationRequest::Evolve { rules: &rules });

    finish_lexicon_op(&paths, report, args.json)
}

pub fn run_edit(args: &EditArgs) -> Result<()> {
    let paths = ProjectPaths::new(args.project.clone());
    let lexicon = paths.load_lexicon()?;
    let constraints = paths.load_constraints()?;

    let service = build_service(&paths, &args.service)?;
    let report = orchestrator(&paths, &service).run(
        &lexicon,
        &OperationRequest::Edit {
            instruction: &args.instruction,
            constraints: &constraints,
        },
    );

    finish_lexicon_op(&paths, report, args.json)
}

pub fn run_phonology(args: &PhonologyArgs) -> Result<()> {
    let paths = ProjectPaths::new(args.project.clone());
    let service = build_service(&paths, &args.service)?;
    let report = orchestrator(&paths, &service).run(
        &[],
        &OperationRequest::Phonology {
            description: &args.description,
        },
    );

    if let Some(phonology) = &report.phonology {
        paths.save_phonology(phonology)?;
        println!(
            "wrote {} ({} consonants, {} vowels)",
            paths.phonology_path().display(),
            phonology.consonants.len(),
            phonology.vowels.len()
        );
    }
    print_report(&report, args.json)
}

pub fn run_ipa(args: &IpaArgs) -> Result<()> {
    let paths = ProjectPaths::new(args.project.clone());
    // The project's generated phonology (when present) is the description the
    // service transcribes against.
    let description = paths
        .load_phonology()?
        .map(|p| {
            if p.description.is_empty() {
                p.name
            } else {
                p.description
            }
        })
        .unwrap_or_else(|| "unspecified".to_string());

    let service = build_service(&paths, &args.service)?;
    let ipa = assist::suggest_ipa(&service, &args.word, &description)?;
    println!("{ipa}");
    Ok(())
}

pub fn run_gloss(args: &GlossArgs) -> Result<()> {
    let paths = ProjectPaths::new(args.project.clone());
    let service = build_service(&paths, &args.service)?;
    let grammar = args.grammar.as_deref().unwrap_or("unspecified");
    let analysis = assist::analyze_syntax(&service, &args.sentence, grammar)?;
    println!("{analysis}");
    Ok(())
}

fn build_service(paths: &ProjectPaths, args: &ServiceArgs) -> Result<HttpService> {
    let (endpoint, model) =
        resolve_service_config(paths, args.endpoint.as_deref(), args.model.as_deref())?;
    Ok(HttpService::new(endpoint, model))
}

fn orchestrator<'a>(paths: &ProjectPaths, service: &'a HttpService) -> Orchestrator<'a> {
    Orchestrator::new(service).with_oplog(OpLog::new(paths.oplog_path()))
}

/// Persist the result collection and report the outcome.
///
/// The collection is written even on partial failure (it is the merged
/// result); on fatal failure it is the original, so the write is a no-op in
/// content terms.
fn finish_lexicon_op(paths: &ProjectPaths, report: OperationReport, json: bool) -> Result<()> {
    if let Some(lexicon) = &report.lexicon {
        paths.save_lexicon(lexicon)?;
    }
    print_report(&report, json)
}

fn print_report(report: &OperationReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!(
            "{}: {} (modified: {}, chunks: {} ok / {} failed)",
            report.operation.as_str(),
            if report.success { "ok" } else { "failed" },
            report.modified_count,
            report.chunks_total - report.chunks_failed,
            report.chunks_failed
        );
        if let Some(message) = &report.message {
            println!("  note: {message}");
        }
    }

    if report.success {
        Ok(())
    } else {
        Err(anyhow!(
            "{} failed: {}",
            report.operation.as_str(),
            report.message.as_deref().unwrap_or("no usable results")
        ))
    }
}
