//! Command execution. Each flow returns what it did plus the diagnostics it collected.

use crate::cli::{Commands, ReportArgs};
use anyhow::{bail, Context, Result};
use desk_common::clients::{clients_in, filter_clients, recommended_file_name};
use desk_common::normalizer::{format_table, merge_all};
use desk_common::report::{generate_report, ReportParams};
use desk_common::{CanonicalTable, Diagnostics, RawTable, SlaConfig};
use std::path::{Path, PathBuf};
use tracing::info;

/// Result of one flow
#[derive(Debug, Default)]
pub struct CommandOutput {
    /// Lines for stdout
    pub lines: Vec<String>,
    pub diagnostics: Diagnostics,
}

pub fn run(command: &Commands, config: &SlaConfig) -> Result<CommandOutput> {
    match command {
        Commands::Format { input, output } => format(input, output, config),
        Commands::Merge { inputs, output } => merge(inputs, output, config),
        Commands::Save {
            input,
            output,
            only_clients,
        } => save(input, output.as_deref(), only_clients, config),
        Commands::Clients { input } => clients(input, config),
        Commands::Report(args) => report(args, config),
    }
}

fn load_canonical(input: &Path, config: &SlaConfig) -> Result<(CanonicalTable, Diagnostics)> {
    let raw = RawTable::load(input).with_context(|| format!("reading {}", input.display()))?;
    let normalized = format_table(&raw, config);
    Ok((normalized.table, normalized.diagnostics))
}

fn save_table(table: &CanonicalTable, output: &Path) -> Result<()> {
    table
        .save(output)
        .with_context(|| format!("writing {}", output.display()))
}

fn format(input: &Path, output: &Path, config: &SlaConfig) -> Result<CommandOutput> {
    let (table, diagnostics) = load_canonical(input, config)?;
    save_table(&table, output)?;
    Ok(CommandOutput {
        lines: vec![format!("Saved {} tickets to {}", table.len(), output.display())],
        diagnostics,
    })
}

fn merge(inputs: &[PathBuf], output: &Path, config: &SlaConfig) -> Result<CommandOutput> {
    let raws = inputs
        .iter()
        .map(|p| RawTable::load(p).with_context(|| format!("reading {}", p.display())))
        .collect::<Result<Vec<_>>>()?;
    let total: usize = raws.iter().map(RawTable::len).sum();
    let merged = merge_all(&raws);
    info!("Merged {} rows into {}", total, merged.len());

    let normalized = format_table(&merged, config);
    save_table(&normalized.table, output)?;
    Ok(CommandOutput {
        lines: vec![format!(
            "Merged {} files ({} rows, {} unique) into {}",
            inputs.len(),
            total,
            normalized.table.len(),
            output.display()
        )],
        diagnostics: normalized.diagnostics,
    })
}

fn save(
    input: &Path,
    output: Option<&Path>,
    only_clients: &[String],
    config: &SlaConfig,
) -> Result<CommandOutput> {
    let (table, diagnostics) = load_canonical(input, config)?;
    let table = filter_clients(&table, only_clients);
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => match recommended_file_name(&table) {
            Some(name) => input.with_file_name(name),
            None => bail!("several clients present; pass --output or narrow --only-clients"),
        },
    };
    save_table(&table, &output)?;
    Ok(CommandOutput {
        lines: vec![format!("Saved {} tickets to {}", table.len(), output.display())],
        diagnostics,
    })
}

fn clients(input: &Path, config: &SlaConfig) -> Result<CommandOutput> {
    let (table, diagnostics) = load_canonical(input, config)?;
    let found = clients_in(&table);
    let mut lines: Vec<String> = found
        .iter()
        .map(|c| {
            let count = filter_clients(&table, std::slice::from_ref(c)).len();
            format!("{:<12} {:>6} tickets", c, count)
        })
        .collect();
    match recommended_file_name(&table) {
        Some(name) => lines.push(format!("Recommended file name: {}", name)),
        None if found.is_empty() => lines.push("No client prefixes found".to_string()),
        None => {}
    }
    Ok(CommandOutput { lines, diagnostics })
}

fn report(args: &ReportArgs, config: &SlaConfig) -> Result<CommandOutput> {
    let mut params = ReportParams::new(&args.start, &args.end, &args.output)
        .context("invalid report parameters")?;
    params.title = args.title.clone();
    params.author = args.author.clone();
    params.client = args.client.clone();
    params.save_normalized = args.save_normalized.clone();

    let (table, mut diagnostics) = load_canonical(&args.input, config)?;
    let table = filter_clients(&table, &args.only_clients);
    let resources = args
        .resources
        .clone()
        .unwrap_or_else(|| config.resource_root.clone());

    let outcome = generate_report(&table, config, &params, &resources)
        .with_context(|| format!("generating {}", args.output.display()))?;
    diagnostics.extend(outcome.diagnostics);

    let mut lines = vec![format!(
        "Wrote {} ({} tickets in range, {} artifacts)",
        outcome.output.display(),
        outcome.tickets_in_range,
        outcome.artifacts
    )];
    lines.extend(outcome.sections.iter().map(|s| format!("  section: {}", s)));
    Ok(CommandOutput { lines, diagnostics })
}
