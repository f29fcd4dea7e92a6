use thiserror::Error;

/// 整批匯入失敗的錯誤：檔案層級或設定層級的問題
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Spreadsheet could not be read: {message}")]
    SpreadsheetError { message: String },

    #[error("Unsupported file type '{file_name}'. Allowed extensions: csv, xls, xlsx")]
    UnsupportedFormatError { file_name: String },

    #[error("File is {size} bytes, larger than the {limit} byte upload limit")]
    FileTooLargeError { size: u64, limit: u64 },

    #[error("Upload file not found: {path}")]
    MissingFileError { path: String },

    #[error("File contains no data: {message}")]
    EmptyFileError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Upload,
    Parsing,
    Output,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ImportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ImportError::UnsupportedFormatError { .. }
            | ImportError::FileTooLargeError { .. }
            | ImportError::MissingFileError { .. } => ErrorCategory::Upload,
            ImportError::CsvError(_)
            | ImportError::SpreadsheetError { .. }
            | ImportError::EmptyFileError { .. } => ErrorCategory::Parsing,
            ImportError::ZipError(_) | ImportError::SerializationError(_) => ErrorCategory::Output,
            ImportError::ConfigError { .. }
            | ImportError::ConfigValidationError { .. }
            | ImportError::InvalidConfigValueError { .. }
            | ImportError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ImportError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Upload | ErrorCategory::Parsing => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ImportError::UnsupportedFormatError { .. } => {
                "Save the member list as .csv, .xls or .xlsx and upload it again"
            }
            ImportError::FileTooLargeError { .. } => {
                "Split the member list into smaller files and import them one by one"
            }
            ImportError::MissingFileError { .. } => "Check the --file path and try again",
            ImportError::EmptyFileError { .. } => {
                "Make sure the first row holds column headers followed by at least one member row"
            }
            ImportError::CsvError(_) | ImportError::SpreadsheetError { .. } => {
                "Open the file in a spreadsheet program, re-save it and upload again"
            }
            ImportError::ZipError(_) | ImportError::SerializationError(_) => {
                "Members were imported; re-run with --no-report if the report keeps failing"
            }
            ImportError::ConfigError { .. }
            | ImportError::ConfigValidationError { .. }
            | ImportError::InvalidConfigValueError { .. }
            | ImportError::MissingConfigError { .. } => {
                "Review the import configuration file and command line flags"
            }
            ImportError::IoError(_) => "Check file permissions and available disk space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ImportError::UnsupportedFormatError { file_name } => {
                format!("'{}' is not a supported member list file", file_name)
            }
            ImportError::FileTooLargeError { limit, .. } => {
                format!("The file exceeds the {} upload limit", format_size(*limit))
            }
            ImportError::MissingFileError { path } => format!("No file found at '{}'", path),
            ImportError::EmptyFileError { .. } => "The uploaded file has no member rows".to_string(),
            other => other.to_string(),
        }
    }
}

/// 整數 MB 顯示為 `N MB`，其餘顯示位元組數
fn format_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// 單列匯入失敗的原因，會寫入 `failed[].error`，不會中斷整批匯入
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("Row could not be read: {message}")]
    Unreadable { message: String },

    #[error("Missing required fields: {}", .fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },

    #[error("Invalid email '{value}'")]
    InvalidEmail { value: String },

    #[error("Invalid membership type '{value}'. Expected one of: ordinary, lifetime")]
    InvalidType { value: String },

    #[error("Invalid purchase date '{value}'. Accepted formats: YYYY-MM-DD, MM/DD/YYYY")]
    InvalidPurchaseDate { value: String },

    #[error("Invalid payment method '{value}'. Expected one of: upi, card, netbanking, qr")]
    InvalidPaymentMethod { value: String },

    #[error("Invalid payment amount '{value}'. Expected a non-negative number")]
    InvalidPaymentAmount { value: String },

    #[error("Duplicate email: a membership with email '{email}' already exists")]
    DuplicateEmail { email: String },

    #[error("Duplicate email: '{email}' already appears in row {first_row} of this file")]
    DuplicateInBatch { email: String, first_row: usize },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

/// 會員儲存端 (`MembershipStore`) 的錯誤
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("membership with email '{email}' already exists")]
    Duplicate { email: String },

    #[error("store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store response could not be decoded: {message}")]
    Decode { message: String },
}

impl From<StoreError> for RowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { email } => RowError::DuplicateEmail { email },
            other => RowError::Storage {
                message: other.to_string(),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
pub type StoreResult<T> = std::result::Result<T, StoreError>;
