use crate::core::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        let started = Instant::now();
        tracing::info!("Starting ETL process...");

        // Extract
        let dataset = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} records ({} columns)",
            dataset.len(),
            dataset.headers.len()
        );

        // Transform
        let report = self.pipeline.transform(dataset).await?;
        tracing::info!("Built {} chart series", report.charts.len());

        // Load
        let output_path = self.pipeline.load(report).await?;
        tracing::info!(
            "Output saved to: {} ({} ms)",
            output_path,
            started.elapsed().as_millis()
        );

        Ok(output_path)
    }
}
