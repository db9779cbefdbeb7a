use std::io::Stdout;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use precol_core::sink::SinkResult;
use precol_core::{
    CanonicalRecord, Config, ExtractionPipeline, OllamaBackend, TableSink, TabularSink, XlsxSink,
};

/// Prints the rows to stdout, then saves the spreadsheet.
struct ReportSink {
    table: TableSink<Stdout>,
    xlsx: XlsxSink,
}

impl TabularSink for ReportSink {
    fn write(&mut self, records: &[CanonicalRecord]) -> SinkResult<()> {
        self.table.write(records)?;
        self.xlsx.write(records)
    }
}

/// Creates the input and output directories when missing.
pub fn prepare_dirs(config: &Config) -> Result<()> {
    for dir in [&config.input_dir, &config.output_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create directory {}", dir.display()))?;
    }
    Ok(())
}

pub async fn run(config: &Config) -> Result<()> {
    let documents = ExtractionPipeline::discover_documents(&config.input_dir).await?;
    if documents.is_empty() {
        error!("No PDFs in '{}'.", config.input_dir.display());
        return Ok(());
    }

    let backend = Arc::new(OllamaBackend::new(&config.model)?);
    let pipeline = ExtractionPipeline::from_config(config, backend)?;

    let mut sink = ReportSink {
        table: TableSink::new(std::io::stdout()),
        xlsx: XlsxSink::new(config.output_path()),
    };

    let summary = pipeline.run(&documents, &mut sink).await?;

    info!(
        "{} documents, {} without text, {} chunks sent to the model",
        summary.documents, summary.documents_without_text, summary.chunks_admitted
    );
    if summary.records > 0 {
        info!(
            "Saved {} rows to '{}'",
            summary.records,
            config.output_path().display()
        );
    }

    Ok(())
}

pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
