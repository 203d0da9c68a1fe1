use crate::adapters::surface::SurfaceKind;
use crate::core::guard::BusyPolicy;
use crate::core::screen::Variant;
use crate::core::viper::MergePolicy;
use crate::utils::error::{AppError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub screen: ScreenConfig,
    pub network: Option<NetworkConfig>,
    pub store: Option<StoreConfig>,
    #[serde(default)]
    pub parser: ParserConfig,
    pub viper: Option<ViperConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenConfig {
    #[serde(default = "default_screen_name")]
    pub name: String,
    #[serde(default)]
    pub variant: Variant,
    #[serde(default)]
    pub busy_policy: BusyPolicy,
    #[serde(default)]
    pub surface: SurfaceKind,
}

fn default_screen_name() -> String {
    "main".to_string()
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            name: default_screen_name(),
            variant: Variant::default(),
            busy_policy: BusyPolicy::default(),
            surface: SurfaceKind::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub endpoint: String,
    pub method: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

impl NetworkConfig {
    pub fn method(&self) -> &str {
        self.method.as_deref().unwrap_or("GET")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub base_path: String,
    pub key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParserKind {
    #[default]
    Constant,
    Text,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParserConfig {
    #[serde(default)]
    pub kind: ParserKind,
    /// constant parser 的輸出
    pub text: Option<String>,
    /// json parser 的 JSON pointer
    pub pointer: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViperConfig {
    #[serde(default)]
    pub merge_policy: MergePolicy,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AppError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AppError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_TOKEN})；未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AppError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn variant(&self) -> Variant {
        self.screen.variant
    }

    pub fn merge_policy(&self) -> MergePolicy {
        self.viper
            .as_ref()
            .map(|v| v.merge_policy)
            .unwrap_or_default()
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("screen.name", &self.screen.name)?;

        if let Some(network) = &self.network {
            validation::validate_url("network.endpoint", &network.endpoint)?;
            validation::validate_http_method("network.method", network.method())?;
            if let Some(timeout) = network.timeout_seconds {
                validation::validate_range("network.timeout_seconds", timeout, 1, 300)?;
            }
        }

        if let Some(store) = &self.store {
            validation::validate_path("store.base_path", &store.base_path)?;
            validation::validate_store_key("store.key", &store.key)?;
        }

        match self.parser.kind {
            ParserKind::Constant => {
                if let Some(text) = &self.parser.text {
                    validation::validate_non_empty_string("parser.text", text)?;
                }
            }
            ParserKind::Text => {}
            ParserKind::Json => {
                let pointer = self.parser.pointer.as_deref().ok_or_else(|| {
                    AppError::MissingConfigError {
                        field: "parser.pointer".to_string(),
                    }
                })?;
                validation::validate_json_pointer("parser.pointer", pointer)?;
            }
        }

        if self.viper.is_some() && self.screen.variant != Variant::Viper {
            tracing::warn!(
                "[viper] section is ignored for the {} variant",
                self.screen.variant
            );
        }

        Ok(())
    }
}
