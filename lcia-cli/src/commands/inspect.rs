//! Inspect command - summarize an input table before converting it
//!
//! Reports what a conversion would produce and flags problems (missing
//! columns, units without a known flow property) without writing anything.

use crate::config::LciaConfig;
use crate::output::{Output, OutputFormat, TableDisplay};
use anyhow::{Context, Result};
use colored::Colorize;
use lcia_core::table::{self as columns, Table, REQUIRED_COLUMNS};
use lcia_core::UnitRegistry;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// Per-method overview.
#[derive(Debug, Serialize)]
pub struct MethodOverview {
    pub name: String,
    pub indicators: usize,
    pub rows: usize,
    pub has_bibliography: bool,
}

#[derive(Debug, Serialize)]
pub struct InspectResult {
    pub input: String,
    pub rows: usize,
    pub missing_columns: Vec<String>,
    pub methods: Vec<MethodOverview>,
    pub flows: usize,
    /// Distinct unit strings without a known flow property.
    pub unresolved_units: Vec<String>,
}

impl TableDisplay for InspectResult {
    fn to_table(&self) -> String {
        let mut lines = vec![format!("{} {}", "Table:".bold(), self.input)];
        lines.push(format!("  {}: {}", "Rows".cyan(), self.rows));

        if !self.missing_columns.is_empty() {
            lines.push(format!(
                "  {}: {}",
                "Missing columns".red().bold(),
                self.missing_columns.join(", ")
            ));
            return lines.join("\n");
        }

        lines.push(format!("  {}: {}", "Methods".cyan(), self.methods.len()));
        for m in &self.methods {
            let bib = if m.has_bibliography {
                "bib".green()
            } else {
                "no bib".dimmed()
            };
            lines.push(format!(
                "    {} - {} indicator(s), {} row(s) [{}]",
                m.name, m.indicators, m.rows, bib
            ));
        }
        lines.push(format!("  {}: {}", "Flows".cyan(), self.flows));
        if !self.unresolved_units.is_empty() {
            lines.push(format!(
                "  {}: {}",
                "Unresolved units".yellow(),
                self.unresolved_units.join(", ")
            ));
        }
        lines.join("\n")
    }
}

/// Summarize `table` against the given unit registry and catalog check.
pub fn inspect(
    input: &str,
    table: &Table,
    units: &UnitRegistry,
    has_bibliography: impl Fn(&str) -> bool,
) -> Result<InspectResult> {
    let missing_columns: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !table.has_column(c))
        .map(|c| c.to_string())
        .collect();
    if !missing_columns.is_empty() {
        return Ok(InspectResult {
            input: input.to_string(),
            rows: table.len(),
            missing_columns,
            methods: Vec::new(),
            flows: 0,
            unresolved_units: Vec::new(),
        });
    }

    let mut methods: Vec<MethodOverview> = Vec::new();
    let mut indicators: HashSet<(&str, &str)> = HashSet::new();
    let mut flows: HashSet<(&str, &str, &str)> = HashSet::new();
    let mut unresolved: Vec<String> = Vec::new();

    for row in table.rows() {
        let method = row.get(columns::METHOD)?;
        let indicator = row.get(columns::INDICATOR)?;
        let unit = row.get(columns::UNIT)?;
        flows.insert((row.get(columns::FLOWABLE)?, row.get(columns::CONTEXT)?, unit));

        let pos = match methods.iter().position(|m| m.name == method) {
            Some(pos) => pos,
            None => {
                methods.push(MethodOverview {
                    name: method.to_string(),
                    indicators: 0,
                    rows: 0,
                    has_bibliography: has_bibliography(method),
                });
                methods.len() - 1
            }
        };
        methods[pos].rows += 1;
        if indicators.insert((method, indicator)) {
            methods[pos].indicators += 1;
        }

        if units.property_ref(unit).is_none() && !unresolved.iter().any(|u| u == unit) {
            unresolved.push(unit.to_string());
        }
    }

    Ok(InspectResult {
        input: input.to_string(),
        rows: table.len(),
        missing_columns,
        methods,
        flows: flows.len(),
        unresolved_units: unresolved,
    })
}

pub fn run(input: &str, config: &LciaConfig, format: OutputFormat) -> Result<()> {
    let context = super::convert::writer_context(config)?;
    let table = Table::from_csv_path(Path::new(input))
        .with_context(|| format!("Failed to read input table {}", input))?;

    let result = inspect(input, &table, &context.units, |m| {
        context.catalog.bib_id(m).is_some()
    })?;
    Output::new(result, format).render()
}
