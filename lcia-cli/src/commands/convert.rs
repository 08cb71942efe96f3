//! Convert command - characterization-factor CSV to openLCA JSON-LD package
//!
//! Loads the method catalog, extra units and bibliography named in the
//! configuration, then runs one writer session over the input table.

use crate::config::LciaConfig;
use crate::output::{Output, OutputFormat, TableDisplay};
use anyhow::{Context, Result};
use colored::Colorize;
use lcia_core::{
    to_jsonld, MemorySink, MethodCatalog, Table, UnitRegistry, WriteSummary, Writer,
    WriterContext,
};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;

/// Result of a conversion.
#[derive(Debug, Serialize)]
pub struct ConvertResult {
    pub input: String,
    /// Package path; `None` for dry runs.
    pub output: Option<String>,
    pub dry_run: bool,
    pub write_flows: bool,
    pub summary: WriteSummary,
    pub duration_ms: u64,
}

impl TableDisplay for ConvertResult {
    fn to_table(&self) -> String {
        let mut lines = Vec::new();
        match &self.output {
            Some(path) => lines.push(format!(
                "{} Wrote {} to {}",
                "SUCCESS:".green().bold(),
                self.input,
                path
            )),
            None => lines.push(format!(
                "{} Dry run of {} (nothing written)",
                "INFO:".yellow().bold(),
                self.input
            )),
        }

        let s = &self.summary;
        lines.push(format!("  {}: {}", "Rows".cyan(), s.rows));
        lines.push(format!("  {}: {}", "Methods".cyan(), s.methods));
        lines.push(format!("  {}: {}", "Indicators".cyan(), s.indicators));
        lines.push(format!("  {}: {}", "Factors".cyan(), s.factors));
        lines.push(format!("  {}: {}", "Sources".cyan(), s.sources));
        if self.write_flows {
            lines.push(format!("  {}: {}", "Flows".cyan(), s.flows_written));
        } else {
            lines.push(format!(
                "  {}: {} {}",
                "Flows".cyan(),
                s.flows,
                "(not written, use --write-flows)".dimmed()
            ));
        }
        if s.unresolved_units > 0 {
            lines.push(format!(
                "  {}: {} factor(s) without flow property",
                "Unresolved units".yellow(),
                s.unresolved_units
            ));
        }
        lines.push(format!("  {}: {}ms", "Duration".cyan(), self.duration_ms));
        lines.join("\n")
    }
}

/// Build the writer context from the configuration.
pub fn writer_context(config: &LciaConfig) -> Result<WriterContext> {
    let mut context = WriterContext::new(config.package_version());

    if let Some(path) = config.methods() {
        let catalog = MethodCatalog::from_path(&path)
            .with_context(|| format!("Failed to load method catalog {}", path.display()))?;
        tracing::debug!("Loaded {} method(s) from {}", catalog.len(), path.display());
        context = context.with_catalog(catalog);
    }

    if let Some(path) = config.units() {
        let mut units = UnitRegistry::new();
        let added = units
            .extend_from_path(&path)
            .with_context(|| format!("Failed to load units {}", path.display()))?;
        tracing::debug!("Registered {} extra unit(s) from {}", added, path.display());
        context = context.with_units(units);
    }

    if let Some(path) = config.bibliography() {
        context = context.with_bibliography(path);
    }

    Ok(context)
}

pub fn run(
    input: &str,
    output: Option<&str>,
    write_flows: bool,
    dry_run: bool,
    config: &LciaConfig,
    format: OutputFormat,
) -> Result<()> {
    let start = Instant::now();
    let write_flows = write_flows || config.write_flows();
    let context = writer_context(config)?;

    let table = Table::from_csv_path(Path::new(input))
        .with_context(|| format!("Failed to read input table {}", input))?;
    tracing::info!("Read {} row(s) from {}", table.len(), input);

    let (summary, output) = match output {
        Some(path) if !dry_run => {
            let summary = to_jsonld(&table, path, context, write_flows)
                .with_context(|| format!("Failed to write package {}", path))?;
            (summary, Some(path.to_string()))
        }
        _ if dry_run => {
            let summary = Writer::new(MemorySink::new(), context)
                .write(&table, write_flows)
                .context("Conversion failed")?;
            (summary, None)
        }
        _ => anyhow::bail!("An output path is required unless --dry-run is given"),
    };

    let result = ConvertResult {
        input: input.to_string(),
        output,
        dry_run,
        write_flows,
        summary,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    Output::new(result, format).render()
}
