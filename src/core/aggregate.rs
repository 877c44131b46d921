//! Group / merge / filter / sort / limit
//!
//! 每一種圖表都是 [`AggregationSpec`] 的一組設定，彙總本身只有 [`aggregate`] 一個實作。

use crate::core::coerce::{to_float, to_int};
use crate::domain::model::{Record, Series};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    Int,
    Float,
}

impl ValueType {
    pub fn coerce(self, raw: &str) -> f64 {
        match self {
            ValueType::Int => to_int(raw) as f64,
            ValueType::Float => to_float(raw),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    Sum,
    Max,
    Average,
}

/// 額外的納入條件；空白的 group key 一律排除，不需另外設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Filter {
    /// key 等於指定值時排除 (例如 "0")
    ExcludeKey { key: String },
    /// key 含有指定字串時排除 (例如彙總列的 "세")
    ExcludeKeyContaining { pattern: String },
    /// 值必須大於 0
    PositiveValue,
    /// 只保留該欄位等於指定值的資料列
    ColumnEquals { column: String, value: String },
}

impl Filter {
    fn accepts(&self, key: &str, value: f64, record: &Record) -> bool {
        match self {
            Filter::ExcludeKey { key: excluded } => key != excluded,
            Filter::ExcludeKeyContaining { pattern } => !key.contains(pattern.as_str()),
            Filter::PositiveValue => value > 0.0,
            Filter::ColumnEquals { column, value: expected } => record.get(column) == expected,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// 第一次出現的順序
    #[default]
    Insertion,
    /// 值由大到小，同值保留出現順序
    ValueDescending,
    /// key 以字串比較由小到大
    KeyAscending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSpec {
    pub group_column: String,
    pub value_column: String,
    #[serde(default)]
    pub value_type: ValueType,
    pub merge: MergeStrategy,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub sort: SortOrder,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl AggregationSpec {
    pub fn new(
        group_column: impl Into<String>,
        value_column: impl Into<String>,
        merge: MergeStrategy,
    ) -> Self {
        Self {
            group_column: group_column.into(),
            value_column: value_column.into(),
            value_type: ValueType::default(),
            merge,
            filters: Vec::new(),
            sort: SortOrder::default(),
            limit: None,
        }
    }

    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn includes(&self, key: &str, value: f64, record: &Record) -> bool {
        !key.trim().is_empty() && self.filters.iter().all(|f| f.accepts(key, value, record))
    }
}

enum Accumulator {
    Total(f64),
    Peak(f64),
    Samples(Vec<f64>),
}

impl Accumulator {
    fn start(merge: MergeStrategy, value: f64) -> Self {
        match merge {
            MergeStrategy::Sum => Accumulator::Total(value),
            MergeStrategy::Max => Accumulator::Peak(value),
            MergeStrategy::Average => Accumulator::Samples(vec![value]),
        }
    }

    fn merge(&mut self, value: f64) {
        match self {
            Accumulator::Total(total) => *total += value,
            Accumulator::Peak(peak) => *peak = peak.max(value),
            Accumulator::Samples(samples) => samples.push(value),
        }
    }

    fn finish(self) -> f64 {
        match self {
            Accumulator::Total(v) | Accumulator::Peak(v) => v,
            // 只有在第一次 push 時才建立，樣本數不會是 0
            Accumulator::Samples(samples) => samples.iter().sum::<f64>() / samples.len() as f64,
        }
    }
}

pub fn aggregate(records: &[Record], spec: &AggregationSpec) -> Series {
    let mut buckets: IndexMap<String, Accumulator> = IndexMap::new();
    let mut skipped = 0usize;

    for record in records {
        let key = record.get(&spec.group_column);
        let value = spec.value_type.coerce(record.get(&spec.value_column));

        if !spec.includes(key, value, record) {
            skipped += 1;
            continue;
        }

        match buckets.get_mut(key) {
            Some(acc) => acc.merge(value),
            None => {
                buckets.insert(key.to_string(), Accumulator::start(spec.merge, value));
            }
        }
    }

    let mut entries: Vec<(String, f64)> = buckets
        .into_iter()
        .map(|(key, acc)| (key, acc.finish()))
        .collect();

    match spec.sort {
        SortOrder::Insertion => {}
        SortOrder::ValueDescending => entries.sort_by(|a, b| b.1.total_cmp(&a.1)),
        SortOrder::KeyAscending => entries.sort_by(|a, b| a.0.cmp(&b.0)),
    }

    if let Some(limit) = spec.limit {
        entries.truncate(limit);
    }

    tracing::debug!(
        "Aggregated {} by {} ({:?}): {} groups, {} records skipped",
        spec.value_column,
        spec.group_column,
        spec.merge,
        entries.len(),
        skipped
    );

    entries.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::parse;

    fn records(text: &str) -> Vec<Record> {
        parse(text).records
    }

    #[test]
    fn test_sum_per_group() {
        let rows = records("k,v\na,1\nb,2\na,3\nb,4\nc,5");
        let series = aggregate(&rows, &AggregationSpec::new("k", "v", MergeStrategy::Sum));
        assert_eq!(series.labels, vec!["a", "b", "c"]);
        assert_eq!(series.values, vec![4.0, 6.0, 5.0]);
    }

    #[test]
    fn test_max_starts_from_first_value() {
        let rows = records("k,v\na,-5\na,-2\nb,-9");
        let series = aggregate(&rows, &AggregationSpec::new("k", "v", MergeStrategy::Max));
        assert_eq!(series.values, vec![-2.0, -9.0]);
    }

    #[test]
    fn test_average_of_collected_values() {
        let rows = records("k,v\na,1.5\na,2.5\na,5\nb,4");
        let spec =
            AggregationSpec::new("k", "v", MergeStrategy::Average).with_value_type(ValueType::Float);
        let series = aggregate(&rows, &spec);
        assert_eq!(series.labels, vec!["a", "b"]);
        assert_eq!(series.values, vec![3.0, 4.0]);
    }

    #[test]
    fn test_empty_key_never_creates_bucket() {
        let rows = records("k,v\n,10\n  ,20\na,1");
        let series = aggregate(&rows, &AggregationSpec::new("k", "v", MergeStrategy::Sum));
        assert_eq!(series.labels, vec!["a"]);
    }

    #[test]
    fn test_filters() {
        let rows = records("k,v,region\n0,5,x\n3세,5,x\nneg,-1,x\nok,2,x\nother,4,y");
        let spec = AggregationSpec::new("k", "v", MergeStrategy::Sum)
            .with_filter(Filter::ExcludeKey { key: "0".into() })
            .with_filter(Filter::ExcludeKeyContaining {
                pattern: "세".into(),
            })
            .with_filter(Filter::PositiveValue)
            .with_filter(Filter::ColumnEquals {
                column: "region".into(),
                value: "x".into(),
            });
        let series = aggregate(&rows, &spec);
        assert_eq!(series.labels, vec!["ok"]);
        assert_eq!(series.values, vec![2.0]);
    }

    #[test]
    fn test_value_descending_is_stable_for_ties() {
        let rows = records("k,v\nfirst,5\nbig,9\nsecond,5\nthird,5");
        let spec = AggregationSpec::new("k", "v", MergeStrategy::Max)
            .with_sort(SortOrder::ValueDescending);
        let series = aggregate(&rows, &spec);
        assert_eq!(series.labels, vec!["big", "first", "second", "third"]);
    }

    #[test]
    fn test_key_ascending_is_text_order() {
        let rows = records("m,v\n9,1\n10,1\n02,1");
        let spec =
            AggregationSpec::new("m", "v", MergeStrategy::Sum).with_sort(SortOrder::KeyAscending);
        let series = aggregate(&rows, &spec);
        assert_eq!(series.labels, vec!["02", "10", "9"]);
    }

    #[test]
    fn test_limit_truncates_after_sort() {
        let body: String = (1..=20).map(|i| format!("g{},{}\n", i, i)).collect();
        let rows = records(&format!("k,v\n{}", body));
        let spec = AggregationSpec::new("k", "v", MergeStrategy::Sum)
            .with_sort(SortOrder::ValueDescending)
            .with_limit(3);
        let series = aggregate(&rows, &spec);
        assert_eq!(series.labels, vec!["g20", "g19", "g18"]);
        assert_eq!(series.labels.len(), series.values.len());
    }

    #[test]
    fn test_missing_column_yields_empty_series() {
        let rows = records("k,v\na,1");
        let series = aggregate(
            &rows,
            &AggregationSpec::new("missing", "v", MergeStrategy::Sum),
        );
        assert!(series.is_empty());
        assert!(series.values.is_empty());
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let rows = records("k,v\nb,2\na,2\nc,7\na,1");
        let spec = AggregationSpec::new("k", "v", MergeStrategy::Sum)
            .with_sort(SortOrder::ValueDescending);
        assert_eq!(aggregate(&rows, &spec), aggregate(&rows, &spec));
    }

    #[test]
    fn test_spec_from_toml() {
        let spec: AggregationSpec = toml::from_str(
            r#"
group_column = "행정동"
value_column = "복지시설밀도"
value_type = "float"
merge = "max"
sort = "value_descending"
limit = 8
filters = [{ rule = "positive_value" }, { rule = "exclude_key", key = "합계" }]
"#,
        )
        .unwrap();
        assert_eq!(spec.merge, MergeStrategy::Max);
        assert_eq!(spec.limit, Some(8));
        assert_eq!(spec.filters.len(), 2);
        assert_eq!(spec.sort, SortOrder::ValueDescending);
    }
}
