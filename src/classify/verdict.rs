use crate::utils::error::{EtlError, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tone {
    Positive,
    Neutral,
    Negative,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tone::Positive => "Positive",
            Tone::Neutral => "Neutral",
            Tone::Negative => "Negative",
        };
        f.write_str(label)
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Positive" => Ok(Tone::Positive),
            "Neutral" => Ok(Tone::Neutral),
            "Negative" => Ok(Tone::Negative),
            other => Err(format!("unknown tone '{}'", other)),
        }
    }
}

/// Parsed `tone, strength, quality` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToneVerdict {
    pub tone: Tone,
    pub strength: u8,
    pub quality: u8,
}

impl ToneVerdict {
    /// 嚴格解析：恰好三個逗號分隔欄位、分數為 0–100 的整數，否則回傳錯誤
    pub fn parse(reply: &str) -> Result<Self> {
        let flattened = reply.replace(['\n', '\r'], "");
        let fail = |reason: String| EtlError::ClassificationParseError {
            reply: flattened.clone(),
            reason,
        };

        let fields: Vec<&str> = flattened.split(',').map(str::trim).collect();
        let [tone, strength, quality] = fields.as_slice() else {
            return Err(fail(format!("expected 3 comma-separated fields, got {}", fields.len())));
        };

        let tone = tone.parse::<Tone>().map_err(fail)?;
        let strength = parse_score("tone strength", strength).map_err(fail)?;
        let quality = parse_score("image quality", quality).map_err(fail)?;

        Ok(Self {
            tone,
            strength,
            quality,
        })
    }
}

fn parse_score(name: &str, field: &str) -> std::result::Result<u8, String> {
    let score: u8 = field
        .parse()
        .map_err(|_| format!("{} '{}' is not an integer", name, field))?;
    if score > 100 {
        return Err(format!("{} {} is above 100", name, score));
    }
    Ok(score)
}
