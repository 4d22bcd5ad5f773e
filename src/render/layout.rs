//! Pitch geometry for a vertical attacking half-pitch.
//!
//! Upstream coordinates measure `x` from the attacked goal line and `y`
//! across the pitch, both on a 0–100 scale. They are flipped (`100 - x`,
//! `100 - y`) into Opta-style coordinates before being mapped to pixels.

use crate::domain::model::ShotRecord;

/// Marker area per unit of xG, in square pixels.
pub const MARKER_AREA_PER_XG: f64 = 300.0;

const PITCH_WIDTH_M: f64 = 68.0;
const PITCH_LENGTH_M: f64 = 105.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub center: (i32, i32),
    pub radius: u32,
    pub is_goal: bool,
}

/// Pixel box the half-pitch is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchGeometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
}

impl PitchGeometry {
    pub fn new(left: f64, top: f64, width: f64) -> Self {
        Self { left, top, width }
    }

    pub fn px_per_metre(&self) -> f64 {
        self.width / PITCH_WIDTH_M
    }

    /// Half of the pitch length, in pixels.
    pub fn height(&self) -> f64 {
        PITCH_LENGTH_M / 2.0 * self.px_per_metre()
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height()
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Opta 座標 (長度 50–100, 寬度 0–100) → 像素；本方半場以外的點貼齊底線
    pub fn opta_to_px(&self, opta_x: f64, opta_y: f64) -> (i32, i32) {
        let along = ((100.0 - opta_x) / 50.0).clamp(0.0, 1.0);
        let across = (opta_y / 100.0).clamp(0.0, 1.0);
        (
            (self.left + across * self.width).round() as i32,
            (self.top + along * self.height()).round() as i32,
        )
    }

    pub fn shot_to_px(&self, record: &ShotRecord) -> (i32, i32) {
        self.opta_to_px(
            ShotRecord::PITCH_MAX - record.x,
            ShotRecord::PITCH_MAX - record.y,
        )
    }

    pub fn metres(&self, m: f64) -> f64 {
        m * self.px_per_metre()
    }
}

/// Circle radius whose area is `area` square pixels, at least one pixel.
pub fn radius_for_area(area: f64) -> u32 {
    ((area / std::f64::consts::PI).sqrt().round() as u32).max(1)
}

/// 只畫非十二碼射門；面積與 xG 成正比
pub fn markers(records: &[ShotRecord], pitch: &PitchGeometry) -> Vec<Marker> {
    records
        .iter()
        .filter(|record| !record.is_penalty())
        .map(|record| Marker {
            center: pitch.shot_to_px(record),
            radius: radius_for_area(MARKER_AREA_PER_XG * record.expected_goal_value),
            is_goal: record.is_goal(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{BodyPart, ShotType, Situation};

    fn record(shot_type: ShotType, situation: Situation, x: f64, y: f64, xg: f64) -> ShotRecord {
        ShotRecord {
            shot_type,
            situation,
            body_part: BodyPart::Head,
            x,
            y,
            expected_goal_value: xg,
        }
    }

    fn pitch() -> PitchGeometry {
        PitchGeometry::new(40.0, 330.0, 680.0)
    }

    #[test]
    fn test_geometry_keeps_metric_proportions() {
        let pitch = pitch();
        assert!((pitch.px_per_metre() - 10.0).abs() < 1e-9);
        assert!((pitch.height() - 525.0).abs() < 1e-9);
        assert!((pitch.bottom() - 855.0).abs() < 1e-9);
    }

    #[test]
    fn test_shot_coordinates_are_flipped() {
        let pitch = pitch();
        // 球門線中央
        assert_eq!(
            pitch.shot_to_px(&record(ShotType::Goal, Situation::Regular, 0.0, 50.0, 0.5)),
            (380, 330)
        );
        // x=10 → Opta 90 → 五分之一半場深
        assert_eq!(
            pitch.shot_to_px(&record(ShotType::Goal, Situation::Regular, 10.0, 25.0, 0.5)),
            (550, 435)
        );
        // 中線後方的射門貼齊底線
        assert_eq!(
            pitch.shot_to_px(&record(ShotType::Miss, Situation::Regular, 70.0, 0.0, 0.01)),
            (720, 855)
        );
    }

    #[test]
    fn test_penalties_excluded_from_markers() {
        let records = vec![
            record(ShotType::Goal, Situation::Regular, 8.0, 50.0, 0.4),
            record(ShotType::Goal, Situation::Penalty, 11.5, 50.0, 0.79),
            record(ShotType::Miss, Situation::Corner, 6.0, 48.0, 0.1),
        ];

        let markers = markers(&records, &pitch());
        assert_eq!(markers.len(), 2);
        assert!(markers[0].is_goal);
        assert!(!markers[1].is_goal);
    }

    #[test]
    fn test_marker_area_linear_in_xg() {
        // 300 * 0.5 = 150 px² → r ≈ 6.9
        assert_eq!(radius_for_area(MARKER_AREA_PER_XG * 0.5), 7);
        assert_eq!(radius_for_area(MARKER_AREA_PER_XG * 1.0), 10);
        assert_eq!(radius_for_area(0.0), 1);
    }
}
