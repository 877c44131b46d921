use crate::domain::model::{Dataset, Table};
use serde::{Deserialize, Serialize};

/// 表格投影：選取欄位，並可依某一欄位遞增排序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    pub columns: Vec<String>,
    #[serde(default)]
    pub sort_by: Option<String>,
}

impl TableSpec {
    /// 노인복지시설 목록 테이블
    pub fn facilities() -> Self {
        Self {
            columns: ["유형", "시설명", "소재지", "정원", "급여 종류", "행정동"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            sort_by: Some("시설명".to_string()),
        }
    }
}

pub fn project(dataset: &Dataset, spec: &TableSpec) -> Table {
    let mut keyed: Vec<(String, Vec<String>)> = dataset
        .records
        .iter()
        .map(|record| {
            let sort_key = spec
                .sort_by
                .as_deref()
                .map(|c| record.get(c).to_string())
                .unwrap_or_default();
            let row = spec
                .columns
                .iter()
                .map(|c| record.get(c).to_string())
                .collect();
            (sort_key, row)
        })
        .collect();

    if spec.sort_by.is_some() {
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
    }

    Table {
        headers: spec.columns.clone(),
        rows: keyed.into_iter().map(|(_, row)| row).collect(),
    }
}
