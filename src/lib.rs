pub mod classify;
pub mod config;
pub mod core;
pub mod domain;
pub mod render;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, toml_config::TomlConfig, ApiConfig};
pub use crate::core::{etl::EtlEngine, pipeline::ShotmapPipeline};
pub use domain::model::{ShotRecord, ShotSummary, ShotmapRequest};
pub use render::SvgShotmapRenderer;
pub use utils::error::{EtlError, Result};
