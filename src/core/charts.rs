//! 內建圖表與頁面組合
//!
//! 五種內建圖表都只是 [`AggregationSpec`] 的設定，性別分布例外：
//! 它是兩個固定欄位的累加，不經過分組。

use crate::core::aggregate::{aggregate, AggregationSpec, Filter, MergeStrategy, SortOrder, ValueType};
use crate::core::coerce::to_int;
use crate::domain::model::{ChartKind, ChartSeries, Dataset, Series};
use serde::{Deserialize, Serialize};

pub mod columns {
    pub const AGE: &str = "연령";
    pub const POPULATION: &str = "인구수_계";
    pub const DISTRICT: &str = "행정동";
    pub const TOTAL_POPULATION: &str = "총인구수";
    pub const MONTH: &str = "월";
    pub const ELDERLY_RATIO: &str = "고령인구비율";
    pub const MALE: &str = "인구수_남";
    pub const FEMALE: &str = "인구수_여";
    pub const FACILITY_DENSITY: &str = "복지시설밀도";
}

pub const MALE_LABEL: &str = "남성";
pub const FEMALE_LABEL: &str = "여성";

pub fn age_distribution_spec() -> AggregationSpec {
    AggregationSpec::new(columns::AGE, columns::POPULATION, MergeStrategy::Sum)
        .with_filter(Filter::ExcludeKey { key: "0".into() })
        .with_filter(Filter::ExcludeKeyContaining {
            pattern: "세".into(),
        })
}

pub fn district_population_spec() -> AggregationSpec {
    AggregationSpec::new(
        columns::DISTRICT,
        columns::TOTAL_POPULATION,
        MergeStrategy::Max,
    )
    .with_filter(Filter::PositiveValue)
    .with_sort(SortOrder::ValueDescending)
    .with_limit(10)
}

pub fn elderly_ratio_spec() -> AggregationSpec {
    AggregationSpec::new(columns::MONTH, columns::ELDERLY_RATIO, MergeStrategy::Average)
        .with_value_type(ValueType::Float)
        .with_filter(Filter::PositiveValue)
        .with_sort(SortOrder::KeyAscending)
}

pub fn welfare_facility_density_spec() -> AggregationSpec {
    AggregationSpec::new(
        columns::DISTRICT,
        columns::FACILITY_DENSITY,
        MergeStrategy::Max,
    )
    .with_value_type(ValueType::Float)
    .with_filter(Filter::PositiveValue)
    .with_sort(SortOrder::ValueDescending)
    .with_limit(8)
}

pub fn age_distribution(dataset: &Dataset) -> Series {
    aggregate(&dataset.records, &age_distribution_spec())
}

pub fn district_population(dataset: &Dataset) -> Series {
    aggregate(&dataset.records, &district_population_spec())
}

pub fn elderly_ratio(dataset: &Dataset) -> Series {
    aggregate(&dataset.records, &elderly_ratio_spec())
}

pub fn welfare_facility_density(dataset: &Dataset) -> Series {
    aggregate(&dataset.records, &welfare_facility_density_spec())
}

/// 男女人數總和，固定兩筆；與 [`aggregate`] 相同以 f64 累加，不會溢位
pub fn gender_distribution(dataset: &Dataset) -> Series {
    let (male, female) = dataset.records.iter().fold((0f64, 0f64), |(m, f), record| {
        (
            m + to_int(record.get(columns::MALE)) as f64,
            f + to_int(record.get(columns::FEMALE)) as f64,
        )
    });

    Series {
        labels: vec![MALE_LABEL.to_string(), FEMALE_LABEL.to_string()],
        values: vec![male, female],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinChart {
    AgeDistribution,
    DistrictPopulation,
    ElderlyRatio,
    GenderDistribution,
    WelfareFacilityDensity,
}

impl BuiltinChart {
    pub fn id(self) -> &'static str {
        match self {
            BuiltinChart::AgeDistribution => "age_distribution",
            BuiltinChart::DistrictPopulation => "district_population",
            BuiltinChart::ElderlyRatio => "elderly_ratio",
            BuiltinChart::GenderDistribution => "gender_distribution",
            BuiltinChart::WelfareFacilityDensity => "welfare_facility_density",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            BuiltinChart::AgeDistribution => "연령대별 인구 분포",
            BuiltinChart::DistrictPopulation => "행정동별 총인구수 (상위 10개)",
            BuiltinChart::ElderlyRatio => "월별 고령인구비율 추이",
            BuiltinChart::GenderDistribution => "성별 인구 분포",
            BuiltinChart::WelfareFacilityDensity => "행정동별 복지시설 밀도 (상위 8개)",
        }
    }

    pub fn kind(self) -> ChartKind {
        match self {
            BuiltinChart::AgeDistribution => ChartKind::Pie,
            BuiltinChart::DistrictPopulation | BuiltinChart::WelfareFacilityDensity => {
                ChartKind::Bar
            }
            BuiltinChart::ElderlyRatio => ChartKind::Line,
            BuiltinChart::GenderDistribution => ChartKind::Doughnut,
        }
    }

    pub fn compute(self, dataset: &Dataset) -> Series {
        match self {
            BuiltinChart::AgeDistribution => age_distribution(dataset),
            BuiltinChart::DistrictPopulation => district_population(dataset),
            BuiltinChart::ElderlyRatio => elderly_ratio(dataset),
            BuiltinChart::GenderDistribution => gender_distribution(dataset),
            BuiltinChart::WelfareFacilityDensity => welfare_facility_density(dataset),
        }
    }

    pub fn build(self, dataset: &Dataset) -> ChartSeries {
        ChartSeries {
            id: self.id().to_string(),
            title: self.title().to_string(),
            kind: self.kind(),
            series: self.compute(dataset),
        }
    }
}

/// 一起渲染的圖表組合
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Dashboard,
    Charts,
    All,
}

impl Page {
    pub fn charts(self) -> &'static [BuiltinChart] {
        match self {
            Page::Dashboard => &[
                BuiltinChart::AgeDistribution,
                BuiltinChart::DistrictPopulation,
                BuiltinChart::ElderlyRatio,
            ],
            Page::Charts => &[
                BuiltinChart::GenderDistribution,
                BuiltinChart::WelfareFacilityDensity,
                BuiltinChart::ElderlyRatio,
            ],
            Page::All => &[
                BuiltinChart::AgeDistribution,
                BuiltinChart::DistrictPopulation,
                BuiltinChart::ElderlyRatio,
                BuiltinChart::GenderDistribution,
                BuiltinChart::WelfareFacilityDensity,
            ],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Page::Dashboard => "dashboard",
            Page::Charts => "charts",
            Page::All => "all",
        }
    }
}

impl std::str::FromStr for Page {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dashboard" => Ok(Page::Dashboard),
            "charts" => Ok(Page::Charts),
            "all" => Ok(Page::All),
            other => Err(format!("unknown page: {}", other)),
        }
    }
}

/// 設定檔自訂的圖表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDefinition {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub spec: AggregationSpec,
}

impl ChartDefinition {
    pub fn build(&self, dataset: &Dataset) -> ChartSeries {
        ChartSeries {
            id: self.id.clone(),
            title: self.title.clone(),
            kind: self.kind,
            series: aggregate(&dataset.records, &self.spec),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartPlan {
    Page(Page),
    Custom(Vec<ChartDefinition>),
}

impl Default for ChartPlan {
    fn default() -> Self {
        ChartPlan::Page(Page::default())
    }
}

impl ChartPlan {
    /// 內建頁面才有對應的頁面，自訂圖表回傳 None
    pub fn page(&self) -> Option<Page> {
        match self {
            ChartPlan::Page(page) => Some(*page),
            ChartPlan::Custom(_) => None,
        }
    }

    pub fn build(&self, dataset: &Dataset) -> Vec<ChartSeries> {
        match self {
            ChartPlan::Page(page) => page.charts().iter().map(|c| c.build(dataset)).collect(),
            ChartPlan::Custom(definitions) => definitions.iter().map(|d| d.build(dataset)).collect(),
        }
    }
}

pub fn build_page(dataset: &Dataset, page: Page) -> Vec<ChartSeries> {
    ChartPlan::Page(page).build(dataset)
}
