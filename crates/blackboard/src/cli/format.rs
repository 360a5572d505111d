//! Format command implementation

use super::output;
use anyhow::Result;
use blackboard_model::storage::json;
use std::path::PathBuf;

/// Configuration for format command
pub struct FormatConfig {
    pub protocol: PathBuf,
    pub in_place: bool,
    pub output_file: Option<PathBuf>,
}

/// Re-save a protocol schema in canonical form
pub async fn format(config: FormatConfig) -> Result<()> {
    let protocol = super::input::load_protocol(&config.protocol)?;

    if config.in_place {
        json::save_file(&protocol, &config.protocol)?;
        eprintln!(
            "{}",
            output::format_success(&format!("Formatted {}", config.protocol.display()))
        );
        return Ok(());
    }

    let content = json::save_to_string(&protocol)?;
    output::write_output(&content, config.output_file.as_deref())
}
