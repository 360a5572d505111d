//! Aggregate command implementation

use super::input;
use super::output::{self, OutputFormat};
use anyhow::{Context, Result};
use blackboard_expr::Engine;
use blackboard_model::{AggregationOptions, DataSet, DataSetAggregator};
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for aggregate command
pub struct AggregateConfig {
    pub protocol: PathBuf,
    pub files: Vec<PathBuf>,
    pub culture: Option<String>,
    pub exclude_null_from_count: bool,
    pub ignore_errors: bool,
    pub format: OutputFormat,
    pub output_file: Option<PathBuf>,
}

impl AggregateConfig {
    fn options(&self) -> AggregationOptions {
        let mut options = AggregationOptions::NONE;
        if self.exclude_null_from_count {
            options |= AggregationOptions::EXCLUDE_NULL_VALUES_FROM_COUNT;
        }
        if self.ignore_errors {
            options |= AggregationOptions::IGNORE_AGGREGATION_ERRORS;
        }
        options
    }
}

/// Aggregate submitted value files into one data set
pub async fn aggregate(config: AggregateConfig) -> Result<()> {
    let result = aggregate_files(&config).await?;

    let content = output::render_dataset(&result, config.format)?;
    output::write_output(&content, config.output_file.as_deref())?;

    let errors = result.issues().errors().count();
    if errors > 0 {
        anyhow::bail!("Aggregated data set contains {} error(s)", errors);
    }
    Ok(())
}

/// Calculate every submission and aggregate them
pub async fn aggregate_files(config: &AggregateConfig) -> Result<DataSet> {
    if config.files.is_empty() {
        anyhow::bail!("No value files specified for aggregation");
    }

    let protocol = input::load_protocol(&config.protocol)?;
    let culture = input::parse_culture(config.culture.as_deref())?;
    let engine = Arc::new(Engine::new());

    let mut datasets = Vec::with_capacity(config.files.len());
    for file in &config.files {
        let values = input::load_values(file).await?;
        let mut dataset = DataSet::builder(Arc::clone(&protocol))
            .culture(culture.clone())
            .engine(Arc::clone(&engine))
            .build();
        input::fill_dataset(&mut dataset, values).with_context(|| format!("Invalid submission: {}", file.display()))?;
        dataset.calculate();

        for issue in dataset.issues().errors() {
            eprintln!("{} {}", file.display(), output::format_issue(issue));
        }
        datasets.push(dataset);
    }

    let mut aggregator = DataSetAggregator::new(protocol)
        .with_engine(engine)
        .with_options(config.options());
    aggregator.accumulate(datasets.iter_mut())?;
    tracing::info!(datasets = datasets.len(), "accumulated submissions");

    Ok(aggregator.calculate())
}
