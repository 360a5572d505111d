//! Calculate command implementation

use super::input;
use super::output::{self, OutputFormat};
use anyhow::Result;
use blackboard_model::DataSet;
use std::path::PathBuf;

/// Configuration for calculate command
pub struct CalculateConfig {
    pub protocol: PathBuf,
    pub data: PathBuf,
    pub culture: Option<String>,
    pub format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

/// Validate and calculate one submission
///
/// The data set is printed even when it has errors; the command then fails.
pub async fn calculate(config: CalculateConfig) -> Result<()> {
    let dataset = calculate_dataset(&config).await?;

    let content = output::render_dataset(&dataset, config.format)?;
    output::write_output(&content, config.output_file.as_deref())?;

    let errors = dataset.issues().errors().count();
    if errors > 0 {
        anyhow::bail!("Data set contains {} error(s)", errors);
    }
    Ok(())
}

/// Load the protocol and values of a calculate run and run the pipeline
pub async fn calculate_dataset(config: &CalculateConfig) -> Result<DataSet> {
    let protocol = input::load_protocol(&config.protocol)?;
    let culture = input::parse_culture(config.culture.as_deref())?;
    let values = input::load_values(&config.data).await?;

    let mut dataset = DataSet::builder(protocol).culture(culture).build();
    input::fill_dataset(&mut dataset, values)?;
    dataset.calculate();
    tracing::info!(
        values = dataset.len(),
        issues = dataset.issues().len(),
        "calculated data set"
    );
    Ok(dataset)
}
