use crate::domain::model::{ShotRecord, ShotSummary};
use crate::domain::ports::ShotmapRenderer;
use crate::render::layout::{self, PitchGeometry};
use crate::utils::error::{EtlError, Result};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle, RGBAColor, ShapeStyle};

const WIDTH: u32 = 800;
const HEIGHT: u32 = 1200;
const BACKGROUND: RGBColor = RGBColor(12, 13, 14);
const PENALTY_ARC_M: f64 = 9.15;

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;
type DrawResult = std::result::Result<(), DrawingAreaErrorKind<std::io::Error>>;

/// Season shot map: title and legends, half-pitch with one marker per
/// non-penalty shot, and a Shots / Goals / xG / xG-per-shot footer.
#[derive(Debug, Clone)]
pub struct SvgShotmapRenderer {
    pitch: PitchGeometry,
}

impl Default for SvgShotmapRenderer {
    fn default() -> Self {
        Self {
            pitch: PitchGeometry::new(60.0, 330.0, 680.0),
        }
    }
}

impl SvgShotmapRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn x_at(fraction: f64) -> i32 {
        (WIDTH as f64 * fraction).round() as i32
    }

    fn draw(&self, root: &Area, records: &[ShotRecord], player_name: &str, competition: &str) -> DrawResult {
        root.fill(&BACKGROUND)?;
        self.draw_header(root, player_name, competition)?;
        self.draw_pitch(root)?;

        for marker in layout::markers(records, &self.pitch) {
            let fill = if marker.is_goal {
                RED.mix(0.7)
            } else {
                BACKGROUND.to_rgba()
            };
            root.draw(&Circle::new(marker.center, marker.radius, filled(fill)))?;
            root.draw(&Circle::new(marker.center, marker.radius, outline(1)))?;
        }

        self.draw_footer(root, &ShotSummary::from_records(records))
    }

    fn draw_header(&self, root: &Area, player_name: &str, competition: &str) -> DrawResult {
        text(root, player_name, (Self::x_at(0.5), 60), 40.0, true, HPos::Center)?;
        text(
            root,
            &format!("All non-penalty shots in the {}", competition),
            (Self::x_at(0.5), 105),
            26.0,
            true,
            HPos::Center,
        )?;

        // 機會品質圖例：面積依序代表 xG 0.33 到 1.67
        let row = 180;
        text(root, "Low quality chance", (Self::x_at(0.23), row), 20.0, true, HPos::Center)?;
        for (fraction, area) in [(0.37, 100.0), (0.42, 200.0), (0.48, 300.0), (0.54, 400.0), (0.60, 500.0)] {
            let center = (Self::x_at(fraction), row);
            let radius = layout::radius_for_area(area);
            root.draw(&Circle::new(center, radius, filled(BACKGROUND.to_rgba())))?;
            root.draw(&Circle::new(center, radius, outline(1)))?;
        }
        text(root, "High quality chance", (Self::x_at(0.76), row), 20.0, true, HPos::Center)?;

        let row = 250;
        let radius = layout::radius_for_area(150.0);
        text(root, "Goal", (Self::x_at(0.44), row), 18.0, true, HPos::Right)?;
        root.draw(&Circle::new((Self::x_at(0.47), row), radius, filled(RED.mix(0.7))))?;
        root.draw(&Circle::new((Self::x_at(0.47), row), radius, outline(1)))?;
        root.draw(&Circle::new((Self::x_at(0.51), row), radius, filled(BACKGROUND.to_rgba())))?;
        root.draw(&Circle::new((Self::x_at(0.51), row), radius, outline(1)))?;
        text(root, "No Goal", (Self::x_at(0.54), row), 18.0, true, HPos::Left)
    }

    fn draw_pitch(&self, root: &Area) -> DrawResult {
        let pitch = &self.pitch;
        let (left, top) = (pitch.left.round() as i32, pitch.top.round() as i32);
        let (right, bottom) = (pitch.right().round() as i32, pitch.bottom().round() as i32);
        root.draw(&Rectangle::new([(left, top), (right, bottom)], outline(1)))?;

        // 大禁區、小禁區與球門 (Opta 座標)
        root.draw(&Rectangle::new(
            [pitch.opta_to_px(100.0, 21.1), pitch.opta_to_px(83.0, 78.9)],
            outline(1),
        ))?;
        root.draw(&Rectangle::new(
            [pitch.opta_to_px(100.0, 36.8), pitch.opta_to_px(94.2, 63.2)],
            outline(1),
        ))?;
        let (goal_left, _) = pitch.opta_to_px(100.0, 44.2);
        let (goal_right, _) = pitch.opta_to_px(100.0, 55.8);
        let goal_depth = pitch.metres(2.0).round() as i32;
        root.draw(&Rectangle::new([(goal_left, top - goal_depth), (goal_right, top)], outline(1)))?;

        let spot = pitch.opta_to_px(88.5, 50.0);
        root.draw(&Circle::new(spot, 2u32, filled(WHITE.to_rgba())))?;

        let radius = pitch.metres(PENALTY_ARC_M);
        let (_, box_edge) = pitch.opta_to_px(83.0, 50.0);
        let penalty_arc: Vec<(i32, i32)> = arc_points(spot, radius, 0.0, 180.0, 1.0)
            .into_iter()
            .filter(|&(_, y)| y >= box_edge)
            .collect();
        root.draw(&PathElement::new(penalty_arc, outline(1)))?;

        let centre = ((left + right) / 2, bottom);
        root.draw(&PathElement::new(arc_points(centre, radius, 180.0, 360.0, 1.0), outline(1)))?;
        root.draw(&Circle::new(centre, 2u32, filled(WHITE.to_rgba())))
    }

    fn draw_footer(&self, root: &Area, summary: &ShotSummary) -> DrawResult {
        let columns = [
            (0.225, "Shots", summary.shots.to_string()),
            (0.365, "Goals", summary.goals.to_string()),
            (0.505, "xG", summary.total_xg_label()),
            (0.645, "xG/Shot", summary.xg_per_shot_label()),
        ];

        for (fraction, label, value) in columns {
            text(root, label, (Self::x_at(fraction), 940), 28.0, true, HPos::Left)?;
            text(root, &value, (Self::x_at(fraction), 985), 22.0, false, HPos::Left)?;
        }
        Ok(())
    }
}

impl ShotmapRenderer for SvgShotmapRenderer {
    fn render(&self, records: &[ShotRecord], player_name: &str, competition: &str) -> Result<Vec<u8>> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
            self.draw(&root, records, player_name, competition)
                .map_err(render_error)?;
            root.present().map_err(render_error)?;
        }
        tracing::debug!("Rendered shot map SVG ({} bytes)", svg.len());
        Ok(svg.into_bytes())
    }
}

fn render_error(e: DrawingAreaErrorKind<std::io::Error>) -> EtlError {
    EtlError::RenderError {
        message: e.to_string(),
    }
}

fn filled(color: RGBAColor) -> ShapeStyle {
    ShapeStyle {
        color,
        filled: true,
        stroke_width: 0,
    }
}

fn outline(width: u32) -> ShapeStyle {
    ShapeStyle {
        color: WHITE.to_rgba(),
        filled: false,
        stroke_width: width,
    }
}

fn text(root: &Area, content: &str, at: (i32, i32), size: f64, bold: bool, align: HPos) -> DrawResult {
    let weight = if bold { FontStyle::Bold } else { FontStyle::Normal };
    let style = FontDesc::new(FontFamily::SansSerif, size, weight)
        .color(&WHITE)
        .pos(Pos::new(align, VPos::Center));
    root.draw(&Text::new(content.to_string(), at, style))
}

/// Points along a circle, angles in degrees measured clockwise on screen.
fn arc_points(center: (i32, i32), radius: f64, from_deg: f64, to_deg: f64, step_deg: f64) -> Vec<(i32, i32)> {
    let steps = ((to_deg - from_deg) / step_deg).ceil() as usize;
    (0..=steps)
        .map(|i| {
            let angle = (from_deg + i as f64 * step_deg).min(to_deg).to_radians();
            (
                center.0 + (radius * angle.cos()).round() as i32,
                center.1 + (radius * angle.sin()).round() as i32,
            )
        })
        .collect()
}
