use crate::core::parser::Parser;
use crate::core::table::project;
use crate::core::{ChartReport, ConfigProvider, Dataset, OutputFormat, Pipeline, Storage};
use crate::domain::model::{ChartSeries, Table};
use crate::utils::error::{EtlError, Result};
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

const BOM: char = '\u{feff}';

pub struct ChartPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
}

impl<S: Storage, C: ConfigProvider> ChartPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn render_files(&self, report: &ChartReport) -> Result<Vec<(String, Vec<u8>)>> {
        let name = self.config.pipeline_name();
        let mut files = Vec::new();

        for format in self.config.output_formats() {
            match format {
                OutputFormat::Json => {
                    files.push((
                        format!("{}.json", name),
                        serde_json::to_vec_pretty(report)?,
                    ));
                }
                OutputFormat::Csv => {
                    for chart in &report.charts {
                        files.push((format!("{}_{}.csv", name, chart.id), series_csv(chart)?));
                    }
                    if let Some(table) = &report.table {
                        files.push((format!("{}_table.csv", name), table_csv(table)?));
                    }
                }
            }
        }

        Ok(files)
    }
}

fn series_csv(chart: &ChartSeries) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["label", "value"])?;
    for (label, value) in chart.series.iter() {
        writer.write_record([label, value.to_string().as_str()])?;
    }
    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

fn table_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| EtlError::IoError(e.into_error()))
}

fn zip_files(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, data) in files {
        zip.start_file(name.as_str(), SimpleFileOptions::default())?;
        zip.write_all(data)?;
    }
    Ok(zip.finish()?.into_inner())
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ChartPipeline<S, C> {
    async fn extract(&self) -> Result<Dataset> {
        let source = self.config.source_file();
        tracing::debug!("Reading source file: {}", source);

        // 來源讀取失敗視為空資料集，所有圖表照常輸出 (空的)
        let bytes = match self.storage.read_file(source).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("Source '{}' unavailable, using empty dataset: {}", source, e);
                return Ok(Dataset::empty());
            }
        };

        let raw = String::from_utf8_lossy(&bytes);
        let text = raw.strip_prefix(BOM).unwrap_or(&raw);
        let dataset = Parser::new(self.config.parse_mode()).parse(text);

        if dataset.is_empty() {
            tracing::warn!("Source '{}' contains no records", source);
        }

        Ok(dataset)
    }

    async fn transform(&self, data: Dataset) -> Result<ChartReport> {
        tracing::info!("Building charts from {} records", data.len());

        let plan = self.config.chart_plan();
        let charts = plan.build(&data);
        for chart in &charts {
            tracing::debug!("{}: {} points", chart.id, chart.series.len());
        }

        let table = self.config.table_spec().map(|spec| project(&data, &spec));

        Ok(ChartReport {
            name: self.config.pipeline_name().to_string(),
            page: plan.page(),
            generated_at: chrono::Utc::now(),
            record_count: data.len(),
            charts,
            table,
        })
    }

    async fn load(&self, report: ChartReport) -> Result<String> {
        let files = self.render_files(&report)?;
        if files.is_empty() {
            return Err(EtlError::ProcessingError {
                message: "no output formats selected".to_string(),
            });
        }

        let output_path = self.config.output_path();

        if self.config.compress() {
            let archive = format!("{}.zip", self.config.pipeline_name());
            tracing::debug!("Creating ZIP file with {} files", files.len());
            let zip_data = zip_files(&files)?;
            self.storage.write_file(&archive, &zip_data).await?;
            return Ok(format!("{}/{}", output_path, archive));
        }

        for (name, data) in &files {
            tracing::debug!("Writing {} ({} bytes)", name, data.len());
            self.storage.write_file(name, data).await?;
        }

        Ok(format!("{}/{}", output_path, files[0].0))
    }
}
