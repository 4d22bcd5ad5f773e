use crate::config::ApiConfig;
use crate::core::ConfigProvider;
use crate::domain::model::PageBudget;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub classifier: Option<ClassifierConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

fn default_min_interval_ms() -> u64 {
    1000
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    #[serde(default)]
    pub page_budget: PageBudget,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: String,
    #[serde(default)]
    pub compress: bool,
}

fn default_output_path() -> String {
    "./output".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            compress: false,
        }
    }
}

/// 圖片語氣分類設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    pub exemplars: ExemplarPaths,
    #[serde(default = "default_min_image_bytes")]
    pub min_image_bytes: u64,
    #[serde(default = "default_threshold")]
    pub min_tone_strength: u8,
    #[serde(default = "default_threshold")]
    pub min_quality: u8,
    #[serde(default = "default_classifier_interval_ms")]
    pub min_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExemplarPaths {
    pub positive: String,
    pub negative: String,
    pub neutral: String,
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_min_image_bytes() -> u64 {
    50 * 1024
}

fn default_threshold() -> u8 {
    90
}

fn default_classifier_interval_ms() -> u64 {
    5000
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_KEY})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn classifier(&self) -> Result<&ClassifierConfig> {
        self.classifier
            .as_ref()
            .ok_or_else(|| EtlError::MissingConfigError {
                field: "classifier".to_string(),
            })
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.api.validate()?;
        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_positive_number(
            "resolver.page_budget.fallback",
            self.resolver.page_budget.fallback,
            1,
        )?;
        for (season, pages) in &self.resolver.page_budget.seasons {
            validation::validate_positive_number(
                &format!("resolver.page_budget.seasons.{}", season),
                *pages,
                1,
            )?;
        }
        if let Some(classifier) = &self.classifier {
            classifier.validate()?;
        }
        Ok(())
    }
}

impl Validate for ClassifierConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("classifier.endpoint", &self.endpoint)?;
        validation::validate_non_empty_string("classifier.model", &self.model)?;
        validation::validate_path("classifier.exemplars.positive", &self.exemplars.positive)?;
        validation::validate_path("classifier.exemplars.negative", &self.exemplars.negative)?;
        validation::validate_path("classifier.exemplars.neutral", &self.exemplars.neutral)?;
        validation::validate_range("classifier.min_tone_strength", self.min_tone_strength, 0, 100)?;
        validation::validate_range("classifier.min_quality", self.min_quality, 0, 100)?;
        if let Some(key) = &self.api_key {
            // 未替換的 ${VAR} 代表環境變數沒有設定
            if key.starts_with("${") {
                return Err(EtlError::MissingConfigError {
                    field: format!("classifier.api_key ({})", key),
                });
            }
        }
        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_config(&self) -> ApiConfig {
        self.api.clone()
    }

    fn page_budget(&self) -> PageBudget {
        self.resolver.page_budget.clone()
    }

    fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.pacing.min_interval_ms)
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn compress_output(&self) -> bool {
        self.output.compress
    }
}
