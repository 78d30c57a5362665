use crate::domain::ports::ConfigProvider;
use crate::utils::error::{MarketError, Result};
use crate::utils::validation::{validate_one_of, validate_range, validate_url, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_ITEMS_PER_PAGE: u64 = 20;
pub const DEFAULT_USER_AGENT: &str = concat!("marketplace-client/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: Option<u64>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaginationConfig {
    pub items_per_page: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
}

impl ClientConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.into(),
                timeout_seconds: None,
                user_agent: None,
            },
            pagination: PaginationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MarketError::Io)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MarketError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_URL})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MarketError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        // 驗證 API 端點
        validate_url("api.base_url", &self.api.base_url)?;

        if let Some(timeout) = self.api.timeout_seconds {
            validate_range("api.timeout_seconds", timeout, 1, 300)?;
        }

        // 驗證每頁筆數
        if let Some(per_page) = self.pagination.items_per_page {
            validate_range("pagination.items_per_page", per_page, 1, 100)?;
        }

        // 驗證日誌設定
        if let Some(format) = &self.logging.format {
            validate_one_of("logging.format", format, &["compact", "json"])?;
        }

        if let Some(level) = &self.logging.level {
            validate_one_of(
                "logging.level",
                level,
                &["trace", "debug", "info", "warn", "error"],
            )?;
        }

        Ok(())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.format.as_deref() == Some("json")
    }
}

impl ConfigProvider for ClientConfig {
    fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    fn items_per_page(&self) -> u64 {
        self.pagination.items_per_page.unwrap_or(DEFAULT_ITEMS_PER_PAGE)
    }

    fn user_agent(&self) -> &str {
        self.api.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[api]
base_url = "https://api.example.com/api"
timeout_seconds = 10
user_agent = "test-agent"

[pagination]
items_per_page = 25

[logging]
level = "debug"
format = "json"
"#;

        let config = ClientConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.api_base_url(), "https://api.example.com/api");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.items_per_page(), 25);
        assert_eq!(config.user_agent(), "test-agent");
        assert!(config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = ClientConfig::from_toml_str(
            r#"
[api]
base_url = "http://localhost:3000/api"
"#,
        )
        .unwrap();

        assert_eq!(config.request_timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECONDS));
        assert_eq!(config.items_per_page(), DEFAULT_ITEMS_PER_PAGE);
        assert!(config.user_agent().starts_with("marketplace-client/"));
        assert!(!config.json_logs());
    }

    #[test]
    fn test_missing_api_section_fails() {
        let result = ClientConfig::from_toml_str("[pagination]\nitems_per_page = 5\n");
        assert!(matches!(
            result,
            Err(MarketError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("MARKETPLACE_TEST_API_URL", "https://test.api.com");

        let config = ClientConfig::from_toml_str(
            r#"
[api]
base_url = "${MARKETPLACE_TEST_API_URL}"
"#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, "https://test.api.com");

        std::env::remove_var("MARKETPLACE_TEST_API_URL");
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::with_base_url("invalid-url");
        assert!(config.validate().is_err());

        config.api.base_url = "https://api.example.com".to_string();
        config.pagination.items_per_page = Some(0);
        assert!(config.validate().is_err());

        config.pagination.items_per_page = Some(50);
        config.logging.format = Some("xml".to_string());
        assert!(config.validate().is_err());

        config.logging.format = Some("compact".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[api]\nbase_url = \"https://api.example.com\"\n")
            .unwrap();

        let config = ClientConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.api.base_url, "https://api.example.com");
    }
}
