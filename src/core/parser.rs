//! CSV 文字解析
//!
//! 整份輸入一次讀入記憶體。第一行一律是表頭，之後空白行略過。
//! 解析不會失敗：欄位不足補空字串，多出的欄位丟棄。

use crate::domain::model::{Dataset, Record};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const DELIMITER: char = ',';
const QUOTE: char = '"';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseMode {
    /// 雙引號內的逗號視為欄位內容，引號本身會被移除
    #[default]
    QuoteAware,
    /// 直接以逗號切割，不處理引號
    Naive,
}

impl std::str::FromStr for ParseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quote-aware" | "quoted" => Ok(ParseMode::QuoteAware),
            "naive" | "split" => Ok(ParseMode::Naive),
            other => Err(format!("unknown parse mode: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    mode: ParseMode,
}

impl Parser {
    pub fn new(mode: ParseMode) -> Self {
        Self { mode }
    }

    pub fn parse(&self, text: &str) -> Dataset {
        let mut lines = text.split('\n');

        let headers: Vec<String> = match lines.next() {
            Some(line) if !line.trim().is_empty() => line
                .split(DELIMITER)
                .map(|h| h.trim().to_string())
                .collect(),
            _ => Vec::new(),
        };

        let mut records = Vec::new();
        let mut short_rows = 0usize;

        for line in lines {
            if line.trim().is_empty() {
                continue;
            }

            let fields = self.tokenize(line);
            if fields.len() < headers.len() {
                short_rows += 1;
            }

            let mut fields = fields.into_iter();
            let data: IndexMap<String, String> = headers
                .iter()
                .map(|h| (h.clone(), fields.next().unwrap_or_default()))
                .collect();
            records.push(Record { data });
        }

        tracing::debug!(
            "Parsed {} records with {} columns ({:?} mode, {} short rows)",
            records.len(),
            headers.len(),
            self.mode,
            short_rows
        );

        Dataset { headers, records }
    }

    /// 將一行切成已 trim 的欄位
    pub fn tokenize(&self, line: &str) -> Vec<String> {
        match self.mode {
            ParseMode::Naive => line
                .split(DELIMITER)
                .map(|f| f.trim().to_string())
                .collect(),
            ParseMode::QuoteAware => tokenize_quoted(line),
        }
    }
}

fn tokenize_quoted(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            QUOTE => in_quotes = !in_quotes,
            DELIMITER if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    // 未閉合的引號在行尾自動結束
    fields.push(current.trim().to_string());

    fields
}

/// 以預設的 quote-aware 模式解析
pub fn parse(text: &str) -> Dataset {
    Parser::default().parse(text)
}

pub fn parse_with(text: &str, mode: ParseMode) -> Dataset {
    Parser::new(mode).parse(text)
}
