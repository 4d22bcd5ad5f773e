pub mod gemini;
pub mod screening;
pub mod verdict;

pub use gemini::{Exemplars, GeminiToneClassifier};
pub use screening::{Screening, ScreeningPolicy};
pub use verdict::{Tone, ToneVerdict};

use crate::domain::ports::ToneClassifier;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "gif"];

pub fn is_supported_image(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// Per-batch counts reported by `tone_screen`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreeningReport {
    pub kept: usize,
    pub rejected: usize,
    pub failed: usize,
}

/// Size gate → classifier call → strict reply parse → threshold policy.
pub struct ToneScreener<T: ToneClassifier> {
    classifier: T,
    policy: ScreeningPolicy,
}

impl<T: ToneClassifier> ToneScreener<T> {
    pub fn new(classifier: T, policy: ScreeningPolicy) -> Self {
        Self { classifier, policy }
    }

    pub fn policy(&self) -> &ScreeningPolicy {
        &self.policy
    }

    pub async fn screen(&self, image: &[u8]) -> Result<Screening> {
        if let Some(rejected) = self.policy.size_gate(image.len() as u64) {
            return Ok(rejected);
        }

        let reply = self.classifier.classify(image).await?;
        let verdict = ToneVerdict::parse(&reply)?;
        tracing::debug!(
            "Verdict: {} (strength {}, quality {})",
            verdict.tone,
            verdict.strength,
            verdict.quality
        );

        Ok(self.policy.assess(&verdict))
    }

    /// 逐張篩選，保留的圖片以語氣重新命名複製到 `output_dir`。
    /// 單張圖片的讀寫或分類失敗只記錄，不中止整批。
    pub async fn screen_batch(&self, images: &[PathBuf], output_dir: &Path) -> ScreeningReport {
        let mut report = ScreeningReport::default();

        for path in images {
            let file_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default();

            match self.screen_file(path, file_name, output_dir).await {
                Ok(Screening::Keep { tone }) => {
                    tracing::info!("✅ {} kept as {}", file_name, tone);
                    report.kept += 1;
                }
                Ok(outcome) => {
                    tracing::info!("🗑️ {} rejected: {:?}", file_name, outcome);
                    report.rejected += 1;
                }
                Err(e) => {
                    tracing::warn!("⚠️ {} not screened: {} ({})", file_name, e, e.recovery_suggestion());
                    report.failed += 1;
                }
            }
        }

        report
    }

    async fn screen_file(&self, path: &Path, file_name: &str, output_dir: &Path) -> Result<Screening> {
        let image = tokio::fs::read(path).await?;
        let outcome = self.screen(&image).await?;
        if let Screening::Keep { tone } = outcome {
            let target = output_dir.join(screening::labelled_filename(file_name, tone));
            tokio::fs::write(&target, &image).await?;
        }
        Ok(outcome)
    }
}
