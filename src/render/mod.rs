pub mod layout;
pub mod svg;

pub use svg::SvgShotmapRenderer;
