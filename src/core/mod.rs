pub mod aggregator;
pub mod api_client;
pub mod etl;
pub mod extractor;
pub mod pipeline;
pub mod rate_limit;
pub mod resolver;

pub use crate::domain::model::{SeasonShots, ShotRecord, ShotmapArtifacts};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
