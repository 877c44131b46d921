pub mod aggregate;
pub mod charts;
pub mod coerce;
pub mod etl;
pub mod parser;
pub mod pipeline;
pub mod table;

pub use crate::domain::model::{ChartReport, Dataset, Record, Series};
pub use crate::domain::ports::{ConfigProvider, OutputFormat, Pipeline, Storage};
pub use crate::utils::error::Result;
