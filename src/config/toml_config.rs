use crate::config::parse_formats;
use crate::core::charts::{ChartDefinition, ChartPlan, Page};
use crate::core::parser::ParseMode;
use crate::core::table::TableSpec;
use crate::core::{ConfigProvider, OutputFormat};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["compact", "json"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub source: SourceConfig,
    pub page: Option<PageConfig>,
    #[serde(default)]
    pub charts: Vec<ChartDefinition>,
    pub table: Option<TableSpec>,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub dir: Option<String>,
    pub file: String,
    #[serde(default)]
    pub parse_mode: ParseMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    pub kind: Page,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub output_formats: Vec<String>,
    pub compress: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: Option<String>,
    /// "compact" (預設) 或 "json"
    pub format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未定義的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("pipeline.name", &self.pipeline.name)?;
        if self.source.file.trim().is_empty() {
            return Err(EtlError::MissingConfigError {
                field: "source.file".to_string(),
            });
        }
        validation::validate_file_extension("source.file", &self.source.file, &["csv"])?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_positive_number(
            "load.output_formats",
            self.load.output_formats.len(),
            1,
        )?;
        parse_formats("load.output_formats", &self.load.output_formats)?;

        let mut ids = HashSet::new();
        for chart in &self.charts {
            validation::validate_non_empty_string("charts.id", &chart.id)?;
            validation::validate_non_empty_string("charts.spec.group_column", &chart.spec.group_column)?;
            validation::validate_non_empty_string("charts.spec.value_column", &chart.spec.value_column)?;
            if let Some(limit) = chart.spec.limit {
                validation::validate_positive_number("charts.spec.limit", limit, 1)?;
            }
            if !ids.insert(chart.id.as_str()) {
                return Err(EtlError::InvalidConfigValueError {
                    field: "charts.id".to_string(),
                    value: chart.id.clone(),
                    reason: "Chart ids must be unique".to_string(),
                });
            }
        }

        if let Some(table) = &self.table {
            validation::validate_positive_number("table.columns", table.columns.len(), 1)?;
        }

        if let Some(level) = self.log_level() {
            validation::validate_one_of("monitoring.log_level", level, &LOG_LEVELS)?;
        }

        if let Some(format) = self.monitoring.as_ref().and_then(|m| m.format.as_deref()) {
            validation::validate_one_of("monitoring.format", format, &LOG_FORMATS)?;
        }

        Ok(())
    }

    pub fn source_dir(&self) -> &str {
        self.source.dir.as_deref().unwrap_or(".")
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.format.as_deref())
            .is_some_and(|f| f == "json")
    }
}

impl ConfigProvider for TomlConfig {
    fn pipeline_name(&self) -> &str {
        &self.pipeline.name
    }

    fn source_file(&self) -> &str {
        &self.source.file
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn parse_mode(&self) -> ParseMode {
        self.source.parse_mode
    }

    /// `[[charts]]` 有定義時優先，否則使用 `[page]`
    fn chart_plan(&self) -> ChartPlan {
        if self.charts.is_empty() {
            ChartPlan::Page(self.page.as_ref().map(|p| p.kind).unwrap_or_default())
        } else {
            ChartPlan::Custom(self.charts.clone())
        }
    }

    fn table_spec(&self) -> Option<TableSpec> {
        self.table.clone()
    }

    fn output_formats(&self) -> Vec<OutputFormat> {
        parse_formats("load.output_formats", &self.load.output_formats).unwrap_or_default()
    }

    fn compress(&self) -> bool {
        self.load.compress.unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
