//! valdoc - change tracking for VAL document builders
//!
//! A CLI for inspecting the change sets the document builder would save,
//! computed from JSON snapshots of its section state.

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::pedantic))]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(missing_docs))]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]

mod cli;

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use serde::Serialize;

use valdoc::brackets;
use valdoc::builder_config::BuilderConfig;
use valdoc::display_order::{find_duplicate_display_orders, normalize_display_order};
use valdoc::snapshot;
use valdoc::{
    aggregate_all_changes, calculate_changes, BuilderSession, ChangeSummary, MemoryStore,
};

/// Main entry point for the valdoc CLI application
fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

/// Run the CLI application
fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG still applies without --verbose
    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    match cli.command {
        Commands::Changes {
            baseline,
            current,
            val_id,
            group_id,
            output,
        } => handle_changes_command(&baseline, &current, val_id, group_id, output.as_deref()),

        Commands::Plan {
            state,
            val_id,
            config,
            apply,
            output,
        } => handle_plan_command(&state, val_id, &config, apply, output.as_deref()),

        Commands::Check { state, fix } => handle_check_command(&state, fix.as_deref()),

        Commands::Render {
            state,
            config,
            strict,
        } => handle_render_command(&state, &config, strict),
    }
}

/// Handle the changes command
fn handle_changes_command(
    baseline: &Path,
    current: &Path,
    val_id: i64,
    group_id: i64,
    output: Option<&Path>,
) -> Result<()> {
    let original = snapshot::read_details(baseline)
        .with_context(|| format!("Failed to read baseline {}", baseline.display()))?;
    let edited = snapshot::read_details(current)
        .with_context(|| format!("Failed to read current details {}", current.display()))?;

    let changes = calculate_changes(val_id, group_id, Some(&original), Some(&edited));
    eprintln!("Section {}: {}", group_id, ChangeSummary::of(&changes));

    emit(&changes, output)
}

/// Handle the plan command
fn handle_plan_command(
    state: &Path,
    val_id: Option<i64>,
    config_path: &Path,
    apply: bool,
    output: Option<&Path>,
) -> Result<()> {
    let val_id = match val_id {
        Some(id) => id,
        None => {
            BuilderConfig::load(config_path)
                .with_context(|| {
                    format!(
                        "No --val-id given and failed to load {}",
                        config_path.display()
                    )
                })?
                .val_id
        }
    };

    let sections = snapshot::read_sections(state)
        .with_context(|| format!("Failed to read section state {}", state.display()))?;

    if !apply {
        let changes = aggregate_all_changes(val_id, &sections);
        eprintln!("Document {}: {}", val_id, ChangeSummary::of(&changes));
        return emit(&changes, output);
    }

    // Dry run: the store starts from the baselines the snapshot carries
    let mut store = MemoryStore::from_baselines(&sections);

    let mut session = BuilderSession::with_sections(val_id, sections);
    let outcome = session
        .save(&mut store)
        .with_context(|| format!("Failed to apply changes to document {}", val_id))?;

    eprintln!(
        "Document {}: {} across {} sections",
        val_id,
        outcome.summary,
        outcome.sections_saved.len()
    );

    emit(session.sections(), output)
}

/// Handle the check command
fn handle_check_command(state: &Path, fix: Option<&Path>) -> Result<()> {
    let mut sections = snapshot::read_sections(state)
        .with_context(|| format!("Failed to read section state {}", state.display()))?;

    let mut colliding = Vec::new();
    for (&group_id, section) in &sections {
        let Some(details) = &section.details else {
            continue;
        };
        let orders = find_duplicate_display_orders(details);
        if !orders.is_empty() {
            println!(
                "Section {}: display orders {:?} are shared by several details",
                group_id, orders
            );
            colliding.push(group_id);
        }
    }

    if colliding.is_empty() {
        println!("✓ No display order collisions");
        return Ok(());
    }

    let Some(fix_path) = fix else {
        anyhow::bail!(
            "{} section(s) have display order collisions; use --fix to renumber",
            colliding.len()
        );
    };

    for group_id in colliding {
        if let Some(details) = sections
            .get_mut(group_id)
            .and_then(|section| section.details.as_mut())
        {
            normalize_display_order(details);
        }
    }

    snapshot::write_json(fix_path, &sections)
        .with_context(|| format!("Failed to write {}", fix_path.display()))?;
    println!("✓ Wrote renumbered snapshot to {}", fix_path.display());

    Ok(())
}

/// Handle the render command
fn handle_render_command(state: &Path, config_path: &Path, strict: bool) -> Result<()> {
    let config = BuilderConfig::load(config_path)
        .with_context(|| format!("Failed to load {}", config_path.display()))?;
    let sections = snapshot::read_sections(state)
        .with_context(|| format!("Failed to read section state {}", state.display()))?;

    println!("{}", config.document_title);
    if let Some(plan) = &config.plan_name {
        println!("{}", plan);
    }

    let mut unresolved = Vec::new();
    for (&group_id, section) in &sections {
        println!("\n[section {}]", group_id);

        if let Some(markup) = &section.editor_content {
            let resolved = brackets::resolve(markup, &config.brackets);
            println!("{}", resolved.text);
            unresolved.extend(resolved.unresolved);
        }

        let Some(details) = &section.details else {
            continue;
        };
        let mut ordered: Vec<_> = details.iter().collect();
        ordered.sort_by_key(|detail| detail.display_order);
        for detail in ordered {
            let resolved = brackets::resolve(&detail.content, &config.brackets);
            println!("{}", resolved.text);
            unresolved.extend(resolved.unresolved);
        }
    }

    unresolved.sort();
    unresolved.dedup();
    if unresolved.is_empty() {
        return Ok(());
    }

    for name in &unresolved {
        log::warn!("No bracket mapping for [{}]", name);
    }
    if strict {
        anyhow::bail!("Unresolved placeholders: {}", unresolved.join(", "));
    }

    Ok(())
}

/// Print `value` as JSON to stdout, or write it to `output`
fn emit<T: Serialize + ?Sized>(value: &T, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            snapshot::write_json(path, value)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("✓ Wrote {}", path.display());
        }
        None => {
            let json = serde_json::to_string_pretty(value)?;
            writeln!(std::io::stdout().lock(), "{}", json)?;
        }
    }
    Ok(())
}
