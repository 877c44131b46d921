pub mod cli;
pub mod toml_config;

use crate::core::charts::{ChartPlan, Page};
use crate::core::parser::ParseMode;
use crate::core::table::TableSpec;
use crate::core::{ConfigProvider, OutputFormat};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

pub const VALID_FORMATS: [&str; 2] = ["json", "csv"];

pub fn parse_formats(field: &str, formats: &[String]) -> Result<Vec<OutputFormat>> {
    formats
        .iter()
        .map(|f| match f.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(EtlError::InvalidConfigValueError {
                field: field.to_string(),
                value: other.to_string(),
                reason: format!("Unsupported format. Valid formats: {}", VALID_FORMATS.join(", ")),
            }),
        })
        .collect()
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "series-etl")]
#[command(about = "Build chart series from a CSV dataset")]
pub struct CliConfig {
    #[arg(long, default_value = "data/final_data.csv")]
    pub input: String,

    #[arg(long, default_value = ".")]
    pub source_dir: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, default_value = "dashboard")]
    pub page: Page,

    #[arg(long, default_value = "quote-aware")]
    pub parse_mode: ParseMode,

    #[arg(long, value_delimiter = ',', default_value = "json")]
    pub formats: Vec<String>,

    #[arg(long, help = "Bundle all outputs into one ZIP file")]
    pub compress: bool,

    #[arg(long, help = "Also project the facilities table")]
    pub table: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 報表名稱取自頁面
    pub fn name(&self) -> &str {
        self.page.as_str()
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn pipeline_name(&self) -> &str {
        self.name()
    }

    fn source_file(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn parse_mode(&self) -> ParseMode {
        self.parse_mode
    }

    fn chart_plan(&self) -> ChartPlan {
        ChartPlan::Page(self.page)
    }

    fn table_spec(&self) -> Option<TableSpec> {
        self.table.then(TableSpec::facilities)
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        parse_formats("formats", &self.formats).unwrap_or_default()
    }

    fn compress(&self) -> bool {
        self.compress
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("input", &self.input)?;
        validation::validate_file_extension("input", &self.input, &["csv"])?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_positive_number("formats", self.formats.len(), 1)?;
        parse_formats("formats", &self.formats)?;
        Ok(())
    }
}
