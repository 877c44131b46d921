pub use crate::app::pipelines::chart_pipeline::ChartPipeline;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::charts::{BuiltinChart, ChartDefinition, ChartPlan, Page};
    use crate::core::parser::ParseMode;
    use crate::core::table::TableSpec;
    use crate::core::{ChartReport, ConfigProvider, OutputFormat, Pipeline, Storage};
    use crate::domain::model::ChartKind;
    use crate::utils::error::{EtlError, Result};
    use std::collections::HashMap;
    use std::io::Read;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put_file(&self, path: &str, data: &str) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.as_bytes().to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        plan: ChartPlan,
        parse_mode: ParseMode,
        table: Option<TableSpec>,
        formats: Vec<OutputFormat>,
        compress: bool,
    }

    impl MockConfig {
        fn new(plan: ChartPlan) -> Self {
            Self {
                plan,
                parse_mode: ParseMode::QuoteAware,
                table: None,
                formats: vec![OutputFormat::Json],
                compress: false,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn pipeline_name(&self) -> &str {
            "report"
        }

        fn source_file(&self) -> &str {
            "final_data.csv"
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn parse_mode(&self) -> ParseMode {
            self.parse_mode
        }

        fn chart_plan(&self) -> ChartPlan {
            self.plan.clone()
        }

        fn table_spec(&self) -> Option<TableSpec> {
            self.table.clone()
        }

        fn output_formats(&self) -> Vec<OutputFormat> {
            self.formats.clone()
        }

        fn compress(&self) -> bool {
            self.compress
        }
    }

    const SAMPLE: &str = "\u{feff}월,행정동,총인구수,고령인구비율,연령,인구수_계\n\
                          01,효자동,1200,18.5,20대,300\n\
                          01,퇴계동,900,21.5,30대,250\n\
                          02,효자동,1250,19.0,20대,310\n";

    #[tokio::test]
    async fn test_extract_parses_source_and_strips_bom() {
        let storage = MockStorage::new();
        storage.put_file("final_data.csv", SAMPLE).await;
        let pipeline = ChartPipeline::new(storage, MockConfig::new(ChartPlan::default()));

        let dataset = pipeline.extract().await.unwrap();

        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.headers[0], "월");
        assert_eq!(dataset.records[1].get("행정동"), "퇴계동");
    }

    #[tokio::test]
    async fn test_missing_source_yields_empty_charts() {
        let storage = MockStorage::new();
        let pipeline = ChartPipeline::new(storage, MockConfig::new(ChartPlan::Page(Page::Dashboard)));

        let dataset = pipeline.extract().await.unwrap();
        assert!(dataset.is_empty());

        let report = pipeline.transform(dataset).await.unwrap();
        assert_eq!(report.record_count, 0);
        assert_eq!(report.charts.len(), 3);
        assert!(report.charts.iter().all(|c| c.series.is_empty()));
    }

    #[tokio::test]
    async fn test_transform_dashboard_page() {
        let storage = MockStorage::new();
        storage.put_file("final_data.csv", SAMPLE).await;
        let pipeline = ChartPipeline::new(storage, MockConfig::new(ChartPlan::Page(Page::Dashboard)));

        let dataset = pipeline.extract().await.unwrap();
        let report = pipeline.transform(dataset).await.unwrap();
        assert_eq!(report.page, Some(Page::Dashboard));

        let district = &report.charts[1];
        assert_eq!(district.id, BuiltinChart::DistrictPopulation.id());
        assert_eq!(district.series.labels, vec!["효자동", "퇴계동"]);
        assert_eq!(district.series.values, vec![1250.0, 900.0]);

        let elderly = &report.charts[2];
        assert_eq!(elderly.series.labels, vec!["01", "02"]);
        assert_eq!(elderly.series.values, vec![20.0, 19.0]);
    }

    #[tokio::test]
    async fn test_custom_chart_plan() {
        let storage = MockStorage::new();
        storage.put_file("final_data.csv", SAMPLE).await;
        let definition = ChartDefinition {
            id: "population_by_month".to_string(),
            title: "월별 인구".to_string(),
            kind: ChartKind::Bar,
            spec: crate::core::aggregate::AggregationSpec::new(
                "월",
                "총인구수",
                crate::core::aggregate::MergeStrategy::Sum,
            ),
        };
        let pipeline = ChartPipeline::new(storage, MockConfig::new(ChartPlan::Custom(vec![definition])));

        let dataset = pipeline.extract().await.unwrap();
        let report = pipeline.transform(dataset).await.unwrap();

        assert_eq!(report.page, None);
        assert_eq!(report.charts.len(), 1);
        assert_eq!(report.charts[0].series.values, vec![2100.0, 1250.0]);
    }

    #[tokio::test]
    async fn test_load_writes_json_and_csv() {
        let storage = MockStorage::new();
        storage.put_file("final_data.csv", SAMPLE).await;
        let mut config = MockConfig::new(ChartPlan::Page(Page::Dashboard));
        config.formats = vec![OutputFormat::Json, OutputFormat::Csv];
        let pipeline = ChartPipeline::new(storage.clone(), config);

        let dataset = pipeline.extract().await.unwrap();
        let report = pipeline.transform(dataset).await.unwrap();
        let output = pipeline.load(report).await.unwrap();

        assert_eq!(output, "test_output/report.json");

        let json = storage.get_file("report.json").await.unwrap();
        let parsed: ChartReport = serde_json::from_slice(&json).unwrap();
        assert_eq!(parsed.page, Some(Page::Dashboard));
        assert_eq!(parsed.charts.len(), 3);
        assert!(parsed.table.is_none());

        let csv = storage.get_file("report_age_distribution.csv").await.unwrap();
        let csv = String::from_utf8(csv).unwrap();
        assert_eq!(csv, "label,value\n20대,610\n30대,250\n");
    }

    #[tokio::test]
    async fn test_load_compressed_bundle_with_table() {
        let storage = MockStorage::new();
        storage
            .put_file("final_data.csv", "시설명,행정동\n나래원,효자동\n가람원,퇴계동\n")
            .await;
        let mut config = MockConfig::new(ChartPlan::Page(Page::Charts));
        config.formats = vec![OutputFormat::Json, OutputFormat::Csv];
        config.compress = true;
        config.table = Some(TableSpec {
            columns: vec!["시설명".into(), "행정동".into()],
            sort_by: Some("시설명".into()),
        });
        let pipeline = ChartPipeline::new(storage.clone(), config);

        let dataset = pipeline.extract().await.unwrap();
        let report = pipeline.transform(dataset).await.unwrap();
        let output = pipeline.load(report).await.unwrap();

        assert_eq!(output, "test_output/report.zip");

        let zip_data = storage.get_file("report.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        // json + 3 charts + table
        assert_eq!(archive.len(), 5);

        let mut table = String::new();
        archive
            .by_name("report_table.csv")
            .unwrap()
            .read_to_string(&mut table)
            .unwrap();
        assert_eq!(table, "시설명,행정동\n가람원,퇴계동\n나래원,효자동\n");
    }

    #[tokio::test]
    async fn test_load_without_formats_fails() {
        let storage = MockStorage::new();
        let mut config = MockConfig::new(ChartPlan::default());
        config.formats = vec![];
        let pipeline = ChartPipeline::new(storage, config);

        let report = pipeline.transform(Default::default()).await.unwrap();
        let err = pipeline.load(report).await.unwrap_err();
        assert!(matches!(err, EtlError::ProcessingError { .. }));
    }
}
