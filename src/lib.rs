//! CSV 資料集轉換為圖表用的 label / value 序列
//!
//! 流程：來源文字 → [`crate::core::parser`] → [`crate::core::aggregate`] (依各圖表設定) → [`crate::domain::model::ChartReport`]

pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::cli::LocalStorage;
pub use crate::core::{etl::EtlEngine, pipeline::ChartPipeline};
pub use utils::error::{EtlError, Result};
