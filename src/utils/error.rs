use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

/// 錯誤分類，用於日誌與結束碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Io,
    Output,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::IoError(_) => ErrorCategory::Io,
            EtlError::ZipError(_) | EtlError::CsvError(_) | EtlError::SerializationError(_) => {
                ErrorCategory::Output
            }
            EtlError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Processing => ErrorSeverity::Medium,
            ErrorCategory::Output => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::ConfigValidationError { field, message } => {
                format!("設定錯誤 ({}): {}", field, message)
            }
            EtlError::InvalidConfigValueError { field, value, .. } => {
                format!("設定值無效 ({} = '{}')", field, value)
            }
            EtlError::MissingConfigError { field } => format!("缺少必要設定: {}", field),
            EtlError::IoError(e) => format!("檔案讀寫失敗: {}", e),
            EtlError::ZipError(_) => "無法建立壓縮檔".to_string(),
            EtlError::CsvError(_) => "無法寫出 CSV 檔案".to_string(),
            EtlError::SerializationError(_) => "無法序列化圖表資料".to_string(),
            EtlError::ProcessingError { message } => format!("資料處理失敗: {}", message),
        }
    }

    /// 依嚴重程度決定的結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,   // 資料處理錯誤
            ErrorSeverity::High => 1,     // 設定或輸出錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => {
                "檢查命令列參數或 TOML 設定檔的欄位與數值".to_string()
            }
            ErrorCategory::Io => "確認輸出目錄存在且具有寫入權限".to_string(),
            ErrorCategory::Output => "確認磁碟空間足夠後重新執行".to_string(),
            ErrorCategory::Processing => "以 --verbose 重新執行並檢查輸入資料".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
