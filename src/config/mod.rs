pub mod cli;
pub mod toml_config;

use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_BASE_URL: &str = "https://www.sofascore.com/api/v1";

/// Connection settings handed to the statistics API client at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 單一驗證 header，格式為 "Header-Name: value"
    pub auth_header: Option<String>,
    /// Expected number of events per history page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_size() -> usize {
    30
}

fn default_timeout_seconds() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_header: None,
            page_size: default_page_size(),
            headers: HashMap::new(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Validate for ApiConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.base_url)?;
        validation::validate_positive_number("api.page_size", self.page_size, 1)?;
        validation::validate_positive_number(
            "api.timeout_seconds",
            self.timeout_seconds as usize,
            1,
        )?;
        if let Some(line) = &self.auth_header {
            validation::validate_header_line("api.auth_header", line)?;
        }
        Ok(())
    }
}

#[cfg(feature = "cli")]
pub use args::CliConfig;

#[cfg(feature = "cli")]
mod args {
    use super::toml_config::TomlConfig;
    use crate::domain::model::ShotmapRequest;
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate};
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "shotmap")]
    #[command(about = "Collect a player's season shots and render a shot map")]
    pub struct CliConfig {
        /// Statistics-site player identifier
        #[arg(long)]
        pub player_id: String,

        /// Player name exactly as the statistics API spells it
        #[arg(long)]
        pub player_name: String,

        /// Competition label, e.g. "Premier League 24/25"
        #[arg(long)]
        pub competition: String,

        /// Optional TOML configuration file
        #[arg(short, long)]
        pub config: Option<String>,

        #[arg(long)]
        pub base_url: Option<String>,

        /// "Header-Name: value"
        #[arg(long)]
        pub auth_header: Option<String>,

        #[arg(long)]
        pub output_path: Option<String>,

        /// Minimum gap between API requests
        #[arg(long)]
        pub min_interval_ms: Option<u64>,

        /// Bundle outputs into a single zip archive
        #[arg(long)]
        pub compress: bool,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON lines")]
        pub json_logs: bool,

        #[arg(long, help = "Show what would be requested without calling the API")]
        pub dry_run: bool,
    }

    impl CliConfig {
        pub fn request(&self) -> ShotmapRequest {
            ShotmapRequest {
                player_id: self.player_id.clone(),
                player_name: self.player_name.clone(),
                competition: self.competition.clone(),
            }
        }

        /// 命令列參數優先於設定檔
        pub fn apply_overrides(&self, config: &mut TomlConfig) {
            if let Some(base_url) = &self.base_url {
                config.api.base_url = base_url.clone();
            }
            if let Some(auth_header) = &self.auth_header {
                config.api.auth_header = Some(auth_header.clone());
            }
            if let Some(output_path) = &self.output_path {
                config.output.path = output_path.clone();
            }
            if let Some(ms) = self.min_interval_ms {
                config.pacing.min_interval_ms = ms;
            }
            if self.compress {
                config.output.compress = true;
            }
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_non_empty_string("player_id", &self.player_id)?;
            validation::validate_non_empty_string("player_name", &self.player_name)?;
            validation::validate_non_empty_string("competition", &self.competition)?;
            if let Some(base_url) = &self.base_url {
                validation::validate_url("base_url", base_url)?;
            }
            Ok(())
        }
    }

}
