use crate::core::charts::ChartPlan;
use crate::core::parser::ParseMode;
use crate::core::table::TableSpec;
use crate::domain::model::{ChartReport, Dataset};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 輸出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Csv,
}

pub trait ConfigProvider: Send + Sync {
    fn pipeline_name(&self) -> &str;
    fn source_file(&self) -> &str;
    fn output_path(&self) -> &str;
    fn parse_mode(&self) -> ParseMode;
    fn chart_plan(&self) -> ChartPlan;
    fn table_spec(&self) -> Option<TableSpec>;
    fn output_formats(&self) -> Vec<OutputFormat>;
    fn compress(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Dataset>;
    async fn transform(&self, data: Dataset) -> Result<ChartReport>;
    async fn load(&self, report: ChartReport) -> Result<String>;
}
