use super::types::GraphNode;

/// Label font size in graph units for a weight-1 node.
pub const BASE_FONT_PX: f64 = 14.0;
/// Rough advance of one character relative to the font size.
const CHAR_WIDTH_RATIO: f64 = 0.6;

pub fn font_px(node: &GraphNode) -> f64 {
	BASE_FONT_PX * (1.0 + (node.value.max(1) as f64).log10() * 0.5)
}

/// Badge size for a label whose rendered width is `text_width`.
pub fn badge_size(text_width: f64, font_px: f64) -> (f64, f64) {
	(text_width + font_px * 0.8, font_px + font_px * 0.8)
}

/// Badge size without a canvas to measure against. Used for hit testing and
/// fitting the view, where a close estimate is enough.
pub fn estimated_size(node: &GraphNode) -> (f64, f64) {
	let font = font_px(node);
	let width = node.name.chars().count() as f64 * font * CHAR_WIDTH_RATIO;
	badge_size(width, font)
}
