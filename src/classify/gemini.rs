use crate::config::toml_config::ClassifierConfig;
use crate::domain::ports::{RateLimiter, ToneClassifier};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const TONE_RUBRIC: &str = "\
Answer with exactly three comma-separated values: tone, tone strength (0-100), image quality (0-100).

The first three images are references: the first shows a positive image, \
the second a negative image, the third a neutral image. \
Classify only the final image.

Tone: positive if the player is smiling or celebrating, negative if the player \
looks disappointed or frustrated, otherwise neutral.
Tone strength: how closely the final image matches the chosen tone. 0 means a guess, \
100 means an unmistakable match.
Image quality: 0 for grainy, tiny or hard to read images, 100 for large, sharp images. \
Match photos on the pitch rank higher than plain backgrounds. \
Any watermark (for example \"Getty Images\") scores 0. \
Of the references, the first two are of higher quality than the third.

Reply on a single line in the form: Tone, integer, integer
where Tone is Positive, Neutral or Negative.";

/// Reference images sent ahead of every candidate.
#[derive(Debug, Clone)]
pub struct Exemplars {
    pub positive: Vec<u8>,
    pub negative: Vec<u8>,
    pub neutral: Vec<u8>,
}

impl Exemplars {
    pub async fn load(config: &ClassifierConfig) -> Result<Self> {
        Ok(Self {
            positive: tokio::fs::read(&config.exemplars.positive).await?,
            negative: tokio::fs::read(&config.exemplars.negative).await?,
            neutral: tokio::fs::read(&config.exemplars.neutral).await?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Image { inline_data: &'a InlineData },
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    text: Option<String>,
}

/// `generateContent`-style multimodal endpoint.
pub struct GeminiToneClassifier {
    client: Client,
    url: String,
    api_key: Option<String>,
    exemplars: [InlineData; 3],
    limiter: Arc<dyn RateLimiter>,
}

impl GeminiToneClassifier {
    pub fn new(config: &ClassifierConfig, exemplars: Exemplars, limiter: Arc<dyn RateLimiter>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            url: format!(
                "{}/{}:generateContent",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
            api_key: config.api_key.clone(),
            exemplars: [
                inline(&exemplars.positive),
                inline(&exemplars.negative),
                inline(&exemplars.neutral),
            ],
            limiter,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn inline(image: &[u8]) -> InlineData {
    InlineData {
        mime_type: image_mime_type(image),
        data: STANDARD.encode(image),
    }
}

/// 依檔頭判斷圖片格式，無法辨識時當作 PNG
pub fn image_mime_type(image: &[u8]) -> &'static str {
    if image.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if image.starts_with(b"GIF8") {
        "image/gif"
    } else if image.len() >= 12 && &image[0..4] == b"RIFF" && &image[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/png"
    }
}

#[async_trait]
impl ToneClassifier for GeminiToneClassifier {
    async fn classify(&self, image: &[u8]) -> Result<String> {
        let candidate = inline(image);
        let mut parts = vec![Part::Text { text: TONE_RUBRIC }];
        parts.extend(self.exemplars.iter().map(|e| Part::Image { inline_data: e }));
        parts.push(Part::Image {
            inline_data: &candidate,
        });
        let body = GenerateRequest {
            contents: vec![Content { parts }],
        };

        self.limiter.acquire().await;
        tracing::debug!("Classifying image ({} bytes) via {}", image.len(), self.url);

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("x-goog-api-key", key);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(EtlError::ClassifierError {
                message: format!("HTTP {}: {}", status.as_u16(), detail),
            });
        }

        let reply: GenerateResponse = response.json().await?;
        let text: String = reply
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect();

        if text.trim().is_empty() {
            return Err(EtlError::ClassifierError {
                message: "classifier returned no text".to_string(),
            });
        }

        Ok(text.replace('\n', ""))
    }
}
