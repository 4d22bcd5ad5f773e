use crate::classify::verdict::{Tone, ToneVerdict};
use crate::config::toml_config::ClassifierConfig;
use serde::Serialize;

/// Keep/reject thresholds applied to each candidate image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreeningPolicy {
    pub min_image_bytes: u64,
    pub min_tone_strength: u8,
    pub min_quality: u8,
}

impl Default for ScreeningPolicy {
    fn default() -> Self {
        Self {
            min_image_bytes: 50 * 1024,
            min_tone_strength: 90,
            min_quality: 90,
        }
    }
}

impl From<&ClassifierConfig> for ScreeningPolicy {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            min_image_bytes: config.min_image_bytes,
            min_tone_strength: config.min_tone_strength,
            min_quality: config.min_quality,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Screening {
    Keep { tone: Tone },
    TooSmall { bytes: u64 },
    WeakTone { tone: Tone, strength: u8 },
    LowQuality { quality: u8 },
}

impl Screening {
    pub fn is_kept(&self) -> bool {
        matches!(self, Screening::Keep { .. })
    }
}

impl ScreeningPolicy {
    /// 太小的圖片不送分類器
    pub fn size_gate(&self, bytes: u64) -> Option<Screening> {
        (bytes < self.min_image_bytes).then_some(Screening::TooSmall { bytes })
    }

    /// Neutral verdicts skip the strength check; quality always applies.
    pub fn assess(&self, verdict: &ToneVerdict) -> Screening {
        if verdict.tone != Tone::Neutral && verdict.strength < self.min_tone_strength {
            return Screening::WeakTone {
                tone: verdict.tone,
                strength: verdict.strength,
            };
        }
        if verdict.quality < self.min_quality {
            return Screening::LowQuality {
                quality: verdict.quality,
            };
        }
        Screening::Keep { tone: verdict.tone }
    }
}

/// `messi-3.png` kept as Positive → `messi-3-Positive.png`
pub fn labelled_filename(file_name: &str, tone: Tone) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}-{}.{}", stem, tone, ext),
        _ => format!("{}-{}", file_name, tone),
    }
}
