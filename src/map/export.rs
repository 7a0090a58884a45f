//! PNG export
//!
//! Builds an SVG scene of the current map (background, edges, node
//! boxes, truncated labels) and rasterizes it at 2x into PNG bytes.
//! The scene reads the same derivations the screen uses, so the export
//! always matches what the user sees.

use crate::map::graph::MindMap;
use crate::map::render;
use std::fmt::Write as _;
use std::path::PathBuf;
use thiserror::Error;

const BACKGROUND: &str = "#f3f4f6";
const STROKE_WIDTH: f64 = 4.0;
const LABEL_MAX_CHARS: usize = 20;
const FONT_SIZE: f64 = 12.0;
const RASTER_SCALE: f32 = 2.0;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("scene SVG did not parse: {0}")]
    Svg(String),
    #[error("could not allocate the output image")]
    PixmapAlloc,
    #[error("PNG encoding failed")]
    PngEncode,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Filename stem: display name lower-cased, whitespace runs become
/// underscores
pub fn file_stem(name: &str) -> String {
    let joined: Vec<&str> = name.split_whitespace().collect();
    joined.join("_").to_lowercase()
}

pub fn export_filename(name: &str) -> String {
    format!("{}.png", file_stem(name))
}

/// The export scene as an SVG document string
pub fn scene_svg(map: &MindMap) -> String {
    let canvas = map.canvas();
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">"#,
        w = canvas.width,
        h = canvas.height,
    );
    let _ = writeln!(
        svg,
        r#"  <rect width="{w:.0}" height="{h:.0}" fill="{BACKGROUND}"/>"#,
        w = canvas.width,
        h = canvas.height,
    );

    for edge in render::edge_lines(map) {
        let _ = writeln!(
            svg,
            r##"  <line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="#000000" stroke-width="{STROKE_WIDTH}"/>"##,
            edge.from.x, edge.from.y, edge.to.x, edge.to.y,
        );
    }

    for node in render::node_boxes(map) {
        let _ = writeln!(
            svg,
            r##"  <rect x="{:.1}" y="{:.1}" width="{:.0}" height="{:.0}" fill="{}" stroke="#000000" stroke-width="{STROKE_WIDTH}"/>"##,
            node.position.x,
            node.position.y,
            node.width,
            node.height,
            node.color.hex(),
        );
        let label = render::truncate_label(&node.key, LABEL_MAX_CHARS);
        let ink = if node.color.dark_label() { "#1f2937" } else { "#ffffff" };
        let anchor = node.anchor();
        let _ = writeln!(
            svg,
            r#"  <text x="{:.1}" y="{:.1}" font-size="{FONT_SIZE}" font-weight="bold" fill="{}" text-anchor="middle">{}</text>"#,
            anchor.x,
            anchor.y + FONT_SIZE * 0.35,
            ink,
            esc(&label),
        );
    }

    svg.push_str("</svg>\n");
    svg
}

/// Rasterizes the scene into PNG bytes at 2x
pub fn encode_png(map: &MindMap) -> Result<Vec<u8>, ExportError> {
    let svg = scene_svg(map);
    let mut opt = usvg::Options::default();
    // Label text uses whatever the system offers; boxes render regardless.
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "Arial".to_string();

    let tree = usvg::Tree::from_str(&svg, &opt).map_err(|e| ExportError::Svg(e.to_string()))?;
    let size = tree.size();
    let width_px = (size.width() * RASTER_SCALE).ceil().max(1.0) as u32;
    let height_px = (size.height() * RASTER_SCALE).ceil().max(1.0) as u32;
    let mut pixmap =
        tiny_skia::Pixmap::new(width_px, height_px).ok_or(ExportError::PixmapAlloc)?;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(RASTER_SCALE, RASTER_SCALE),
        &mut pixmap.as_mut(),
    );
    pixmap.encode_png().map_err(|_| ExportError::PngEncode)
}

/// Writes the PNG next to the user's other downloads; returns the path
pub fn save_png(map: &MindMap) -> Result<PathBuf, ExportError> {
    let bytes = encode_png(map)?;
    let dir = dirs::download_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(export_filename(map.name()));
    std::fs::write(&path, &bytes)?;
    tracing::info!(path = %path.display(), "exported PNG");
    Ok(path)
}

/// Escape XML special characters
fn esc(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
