use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 射門結果，詞彙沿用上游 API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShotType {
    Goal,
    Miss,
    Save,
    Block,
    Post,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Situation {
    Regular,
    Assisted,
    Corner,
    SetPiece,
    FastBreak,
    FreeKick,
    Penalty,
    ThrowInSetPiece,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BodyPart {
    RightFoot,
    LeftFoot,
    Head,
    #[serde(other)]
    Other,
}

/// One attempted shot by one player in one match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShotRecord {
    pub shot_type: ShotType,
    pub situation: Situation,
    pub body_part: BodyPart,
    pub x: f64,
    pub y: f64,
    pub expected_goal_value: f64,
}

impl ShotRecord {
    pub const PITCH_MAX: f64 = 100.0;

    pub fn is_goal(&self) -> bool {
        self.shot_type == ShotType::Goal
    }

    pub fn is_penalty(&self) -> bool {
        self.situation == Situation::Penalty
    }

    /// x, y ∈ [0, 100] and xG ∈ [0, 1]
    pub fn is_within_bounds(&self) -> bool {
        (0.0..=Self::PITCH_MAX).contains(&self.x)
            && (0.0..=Self::PITCH_MAX).contains(&self.y)
            && (0.0..=1.0).contains(&self.expected_goal_value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub u64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchReference {
    pub match_id: MatchId,
    pub competition: String,
}

/// 單次執行的輸入參數
#[derive(Debug, Clone)]
pub struct ShotmapRequest {
    pub player_id: String,
    pub player_name: String,
    pub competition: String,
}

/// 每個外部呼叫的結果：成功、成功但無資料、暫時性失敗
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Fetched(T),
    Empty,
    Transient(TransientFailure),
}

impl<T> FetchOutcome<T> {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchOutcome::Transient(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientFailure {
    pub resource: String,
    pub reason: String,
}

impl fmt::Display for TransientFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.resource, self.reason)
    }
}

/// Records for a whole season, in match resolution order.
#[derive(Debug, Clone, Default)]
pub struct SeasonShots {
    pub records: Vec<ShotRecord>,
    pub matches_requested: usize,
    pub failed_matches: Vec<MatchId>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotSummary {
    pub shots: usize,
    pub goals: usize,
    pub total_xg: f64,
}

impl ShotSummary {
    /// Penalties count here even though they are left off the chart.
    pub fn from_records(records: &[ShotRecord]) -> Self {
        Self {
            shots: records.len(),
            goals: records.iter().filter(|r| r.is_goal()).count(),
            total_xg: records.iter().map(|r| r.expected_goal_value).sum(),
        }
    }

    pub fn xg_per_shot(&self) -> f64 {
        if self.shots == 0 {
            0.0
        } else {
            self.total_xg / self.shots as f64
        }
    }

    pub fn total_xg_label(&self) -> String {
        format!("{:.2}", self.total_xg)
    }

    pub fn xg_per_shot_label(&self) -> String {
        format!("{:.2}", self.xg_per_shot())
    }
}

/// Transform 階段的產出
#[derive(Debug, Clone)]
pub struct ShotmapArtifacts {
    pub request: ShotmapRequest,
    pub summary: ShotSummary,
    pub records: Vec<ShotRecord>,
    pub matches_requested: usize,
    pub failed_matches: Vec<MatchId>,
    pub svg: Vec<u8>,
}

/// How many history pages to request, keyed by the label's trailing season token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageBudget {
    #[serde(default = "PageBudget::default_seasons")]
    pub seasons: BTreeMap<String, usize>,
    #[serde(default = "PageBudget::default_fallback")]
    pub fallback: usize,
}

impl PageBudget {
    fn default_fallback() -> usize {
        10
    }

    fn default_seasons() -> BTreeMap<String, usize> {
        // 越近的賽季需要的歷史頁數越少
        BTreeMap::from([("24/25".to_string(), 2), ("23/24".to_string(), 6)])
    }

    pub fn season_token(competition: &str) -> &str {
        competition.rsplit(' ').next().unwrap_or(competition)
    }

    pub fn pages_for(&self, competition: &str) -> usize {
        self.seasons
            .get(Self::season_token(competition))
            .copied()
            .unwrap_or(self.fallback)
    }
}

impl Default for PageBudget {
    fn default() -> Self {
        Self {
            seasons: Self::default_seasons(),
            fallback: Self::default_fallback(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot(shot_type: ShotType, situation: Situation, xg: f64) -> ShotRecord {
        ShotRecord {
            shot_type,
            situation,
            body_part: BodyPart::RightFoot,
            x: 12.0,
            y: 48.5,
            expected_goal_value: xg,
        }
    }

    #[test]
    fn test_page_budget_by_trailing_token() {
        let budget = PageBudget::default();
        assert_eq!(budget.pages_for("Premier League 24/25"), 2);
        assert_eq!(budget.pages_for("UEFA Champions League 24/25"), 2);
        assert_eq!(budget.pages_for("Premier League 23/24"), 6);
        assert_eq!(budget.pages_for("Premier League 22/23"), 10);
        assert_eq!(budget.pages_for("LaLiga"), 10);
    }

    #[test]
    fn test_summary_over_five_literal_records() {
        let records = vec![
            shot(ShotType::Goal, Situation::Regular, 0.45),
            shot(ShotType::Goal, Situation::Assisted, 0.12),
            shot(ShotType::Goal, Situation::Penalty, 0.79),
            shot(ShotType::Miss, Situation::Regular, 0.05),
            shot(ShotType::Miss, Situation::Corner, 0.09),
        ];

        let summary = ShotSummary::from_records(&records);
        assert_eq!(summary.shots, 5);
        assert_eq!(summary.goals, 3);
        assert!((summary.total_xg - 1.50).abs() < 1e-9);
        assert_eq!(summary.total_xg_label(), "1.50");
        assert_eq!(summary.xg_per_shot_label(), "0.30");
        assert_eq!(records.iter().filter(|r| r.is_penalty()).count(), 1);
    }

    #[test]
    fn test_bounds_check() {
        let mut record = shot(ShotType::Save, Situation::Regular, 0.2);
        assert!(record.is_within_bounds());
        record.x = 100.5;
        assert!(!record.is_within_bounds());
        record.x = 50.0;
        record.expected_goal_value = 1.2;
        assert!(!record.is_within_bounds());
    }

    #[test]
    fn test_enum_vocabulary_from_upstream() {
        let situation: Situation = serde_json::from_str("\"set-piece\"").unwrap();
        assert_eq!(situation, Situation::SetPiece);
        let body: BodyPart = serde_json::from_str("\"left-foot\"").unwrap();
        assert_eq!(body, BodyPart::LeftFoot);
        let unknown: ShotType = serde_json::from_str("\"woodwork\"").unwrap();
        assert_eq!(unknown, ShotType::Other);
    }
}
