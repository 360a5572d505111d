//! Validate command implementation

use super::output::{self, OutputFormat};
use anyhow::Result;
use blackboard_model::storage::json;
use blackboard_model::{Issue, IssueSeverity};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Configuration for validate command
pub struct ValidateConfig {
    pub files: Vec<PathBuf>,
    pub strict: bool,
    pub format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

/// Validation result for a single protocol file
#[derive(Debug, Serialize)]
pub struct ValidationResult {
    pub file: PathBuf,
    pub protocol: Option<String>,
    pub issues: Vec<Issue>,
}

impl ValidationResult {
    fn errors(&self) -> usize {
        self.issues.iter().filter(|issue| issue.is_error()).count()
    }

    fn warnings(&self) -> usize {
        self.issues.len() - self.errors()
    }
}

/// Validate protocol files
pub async fn validate(config: ValidateConfig) -> Result<()> {
    if config.files.is_empty() {
        anyhow::bail!("No files specified for validation");
    }

    let results: Vec<ValidationResult> = config.files.iter().map(|file| validate_file(file)).collect();
    let total_errors: usize = results.iter().map(ValidationResult::errors).sum();
    let total_warnings: usize = results.iter().map(ValidationResult::warnings).sum();

    let content = match config.format {
        OutputFormat::Json => serde_json::to_string_pretty(&results)?,
        OutputFormat::Text => results.iter().map(format_result).collect::<Vec<_>>().join("\n"),
    };
    output::write_output(&content, config.output_file.as_deref())?;

    if total_errors == 0 && total_warnings == 0 {
        eprintln!(
            "{}",
            output::format_success(&format!("All {} protocol(s) validated successfully", config.files.len()))
        );
        return Ok(());
    }

    let mut summary = Vec::new();
    if total_errors > 0 {
        summary.push(format!("{} error(s)", total_errors).red().to_string());
    }
    if total_warnings > 0 {
        summary.push(format!("{} warning(s)", total_warnings).yellow().to_string());
    }

    if total_errors > 0 {
        anyhow::bail!("Validation failed: found {}", summary.join(", "));
    }
    if config.strict {
        anyhow::bail!("Validation failed in strict mode: found {}", summary.join(", "));
    }
    eprintln!("{}", output::format_warning(&format!("Found {}", summary.join(", "))));
    Ok(())
}

/// Validate a single protocol file
///
/// A file that cannot be loaded yields one model error.
pub fn validate_file(file: &Path) -> ValidationResult {
    tracing::info!(file = %file.display(), "validating");
    match json::load_file(file) {
        Ok(protocol) => ValidationResult {
            file: file.to_path_buf(),
            issues: protocol.validate_model(),
            protocol: Some(protocol.reference),
        },
        Err(error) => ValidationResult {
            file: file.to_path_buf(),
            protocol: None,
            issues: vec![Issue::new(IssueSeverity::ModelError, None, error.to_string())],
        },
    }
}

fn format_result(result: &ValidationResult) -> String {
    let status = if result.errors() == 0 {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };

    let mut lines = vec![format!("{} {}", status, result.file.display().to_string().cyan())];
    lines.extend(result.issues.iter().map(|issue| format!("  {}", output::format_issue(issue))));
    lines.join("\n")
}
