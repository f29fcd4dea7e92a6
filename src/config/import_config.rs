use crate::domain::model::{MembershipType, PaymentMethod};
use crate::utils::error::{ImportError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
pub const NOT_SPECIFIED: &str = "Not specified";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default)]
    pub import: ImportSection,
    #[serde(default)]
    pub defaults: MemberDefaults,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSection {
    pub name: String,
    pub max_file_size_bytes: u64,
    /// 同一個檔案內重複的 email 直接判為失敗，不依賴儲存端的可見性
    pub dedupe_within_batch: bool,
}

impl Default for ImportSection {
    fn default() -> Self {
        Self {
            name: "bulk-member-import".to_string(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            dedupe_within_batch: true,
        }
    }
}

/// 選填欄位的預設值
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberDefaults {
    pub ordinary_amount: f64,
    pub lifetime_amount: f64,
    pub payment_method: PaymentMethod,
    pub place: String,
    pub unit: String,
}

impl Default for MemberDefaults {
    fn default() -> Self {
        Self {
            ordinary_amount: 500.0,
            lifetime_amount: 5000.0,
            payment_method: PaymentMethod::Upi,
            place: NOT_SPECIFIED.to_string(),
            unit: NOT_SPECIFIED.to_string(),
        }
    }
}

impl MemberDefaults {
    pub fn amount_for(&self, membership_type: MembershipType) -> f64 {
        match membership_type {
            MembershipType::Ordinary => self.ordinary_amount,
            MembershipType::Lifetime => self.lifetime_amount,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Memory,
    Http,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub r#type: StoreKind,
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub enabled: bool,
    pub output_path: String,
    pub filename: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_path: "./import-reports".to_string(),
            filename: "import_report.zip".to_string(),
        }
    }
}

impl ImportConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ImportError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ImportError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${MEMBERSHIP_API_TOKEN})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ImportError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("import.name", &self.import.name)?;
        validation::validate_positive_number(
            "import.max_file_size_bytes",
            self.import.max_file_size_bytes,
            1,
        )?;

        validation::validate_non_negative_amount(
            "defaults.ordinary_amount",
            self.defaults.ordinary_amount,
        )?;
        validation::validate_non_negative_amount(
            "defaults.lifetime_amount",
            self.defaults.lifetime_amount,
        )?;

        if self.store.r#type == StoreKind::Http {
            let endpoint = self.store.endpoint.as_deref().ok_or_else(|| {
                ImportError::MissingConfigError {
                    field: "store.endpoint".to_string(),
                }
            })?;
            validation::validate_url("store.endpoint", endpoint)?;
        }

        if let Some(timeout) = self.store.timeout_seconds {
            validation::validate_positive_number("store.timeout_seconds", timeout, 1)?;
        }

        if self.report.enabled {
            validation::validate_path("report.output_path", &self.report.output_path)?;
            validation::validate_non_empty_string("report.filename", &self.report.filename)?;
        }

        Ok(())
    }

    pub fn max_file_size(&self) -> u64 {
        self.import.max_file_size_bytes
    }

    pub fn output_path(&self) -> &str {
        &self.report.output_path
    }

    pub fn dedupe_within_batch(&self) -> bool {
        self.import.dedupe_within_batch
    }
}

impl Validate for ImportConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
