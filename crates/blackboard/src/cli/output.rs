//! Output formatting utilities

use anyhow::{Context, Result};
use blackboard_diagnostics::BlackboardError;
use blackboard_model::{DataSet, Issue, IssueSeverity};
use clap::ValueEnum;
use colored::Colorize;
use std::fs;
use std::io::IsTerminal;
use std::path::Path;
use tabled::{Table, Tabled, settings::Style};

/// Output format options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tables and colored issue lists
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// When to color output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Set up color output based on user preference
pub fn setup_colors(mode: ColorMode) -> bool {
    let enabled = match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::io::stdout().is_terminal(),
    };
    colored::control::set_override(enabled);
    enabled
}

/// Format an error for display
///
/// Library errors render as diagnostics, with the outer context first.
pub fn format_error(error: &anyhow::Error) -> String {
    let Some(inner) = error.downcast_ref::<BlackboardError>() else {
        return format!("{} {:#}", "Error:".red().bold(), error);
    };
    let diagnostic = inner.to_diagnostic().render_colored();
    let context: Vec<String> = error
        .chain()
        .take_while(|cause| cause.downcast_ref::<BlackboardError>().is_none())
        .map(ToString::to_string)
        .collect();
    if context.is_empty() {
        diagnostic
    } else {
        format!("{} {}\n{}", "Error:".red().bold(), context.join(": "), diagnostic)
    }
}

/// Format a warning for display
pub fn format_warning(warning: &str) -> String {
    format!("{} {}", "Warning:".yellow().bold(), warning)
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Format one issue as a single line
pub fn format_issue(issue: &Issue) -> String {
    let severity = match issue.severity {
        IssueSeverity::Warning => issue.severity.to_string().yellow().bold(),
        IssueSeverity::ModelError | IssueSeverity::ValidationError => issue.severity.to_string().red().bold(),
    };
    match &issue.reference {
        Some(reference) => format!("{} [{}]: {}", severity, reference.cyan(), issue.message),
        None => format!("{}: {}", severity, issue.message),
    }
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        fs::write(path, content).with_context(|| format!("Failed to write output file: {}", path.display()))?;
        eprintln!("{}", format_success(&format!("Output written to {}", path.display())));
    } else {
        println!("{}", content);
    }
    Ok(())
}

#[derive(Tabled)]
struct ValueRow {
    #[tabled(rename = "Reference")]
    reference: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Stored values of a data set as a table, in protocol order
pub fn format_values_table(dataset: &DataSet) -> String {
    let rows: Vec<ValueRow> = dataset
        .values()
        .into_iter()
        .map(|entry| ValueRow {
            reference: entry.reference.clone(),
            value: if entry.value.is_null() {
                "null".to_string()
            } else {
                entry.value.to_string()
            },
        })
        .collect();

    if rows.is_empty() {
        return "(no values)".to_string();
    }
    Table::new(rows).with(Style::modern()).to_string()
}

/// Values and issues of a data set as JSON
pub fn dataset_to_json(dataset: &DataSet) -> Result<serde_json::Value> {
    let mut values = serde_json::Map::new();
    for entry in dataset.values() {
        values.insert(entry.reference.clone(), serde_json::to_value(&entry.value)?);
    }
    Ok(serde_json::json!({
        "protocol": dataset.protocol().reference,
        "culture": dataset.culture().to_string(),
        "values": values,
        "issues": serde_json::to_value(dataset.issues())?,
    }))
}

/// Render a data set in the requested format
pub fn render_dataset(dataset: &DataSet, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&dataset_to_json(dataset)?).context("Failed to serialize JSON")
        }
        OutputFormat::Text => {
            let mut lines = vec![format_values_table(dataset)];
            lines.extend(dataset.issues().iter().map(format_issue));
            Ok(lines.join("\n"))
        }
    }
}
