use std::collections::HashMap;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::badge;
use super::controller::InteractionController;
use super::layout::LayoutEngine;

const BACKGROUND: &str = "#0f172a";
const LINK_COLOR: &str = "rgba(226, 232, 240, 0.6)";
const LABEL_COLOR: &str = "#1a1a1a";
const DESCRIPTION_COLOR: &str = "rgba(226, 232, 240, 0.85)";
const SELECTION_COLOR: &str = "#6366f1";
const PINNED_COLOR: &str = "rgba(226, 232, 240, 0.7)";

pub fn render(controller: &InteractionController, ctx: &CanvasRenderingContext2d) {
	let layout = controller.layout();
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, layout.width, layout.height);
	ctx.save();
	let t = layout.camera.transform;
	let _ = ctx.translate(t.x, t.y);
	let _ = ctx.scale(t.k, t.k);
	draw_links(layout, ctx);
	draw_nodes(controller, ctx);
	ctx.restore();
}

fn draw_links(layout: &LayoutEngine, ctx: &CanvasRenderingContext2d) {
	ctx.set_stroke_style_str(LINK_COLOR);
	ctx.set_line_width(2.0 / layout.camera.transform.k);
	layout.visit_links(|(x1, y1), (x2, y2)| {
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
		ctx.stroke();
	});
}

/// Status-colored badges with centered labels, drawn in store order so that
/// later nodes sit on top, matching hit testing.
fn draw_nodes(controller: &InteractionController, ctx: &CanvasRenderingContext2d) {
	let layout = controller.layout();
	let k = layout.camera.transform.k;
	let positions: HashMap<String, (f64, f64)> = layout
		.positions()
		.into_iter()
		.map(|(id, x, y)| (id, (x, y)))
		.collect();
	let selected = controller.selection().selected();

	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	for node in &controller.graph().nodes {
		// Nodes added since the last sync only have their stored coordinates.
		let Some((x, y)) = positions.get(&node.id).copied().or_else(|| node.position()) else {
			continue;
		};
		let font = badge::font_px(node);
		ctx.set_font(&format!("{font}px Inter, sans-serif"));
		let (w, h) = match ctx.measure_text(&node.name) {
			Ok(metrics) => badge::badge_size(metrics.width(), font),
			Err(_) => badge::estimated_size(node),
		};

		ctx.set_fill_style_str(node.fill_color());
		ctx.fill_rect(x - w / 2.0, y - h / 2.0, w, h);

		if selected == Some(node.id.as_str()) {
			ctx.set_stroke_style_str(SELECTION_COLOR);
			ctx.set_line_width(3.0 / k);
			ctx.stroke_rect(x - w / 2.0, y - h / 2.0, w, h);
		} else if layout.is_pinned(&node.id) {
			ctx.set_stroke_style_str(PINNED_COLOR);
			ctx.set_line_width(1.0 / k);
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(4.0 / k),
				&JsValue::from_f64(3.0 / k),
			));
			ctx.stroke_rect(x - w / 2.0, y - h / 2.0, w, h);
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}

		ctx.set_fill_style_str(LABEL_COLOR);
		let _ = ctx.fill_text(&node.name, x, y);

		if controller.show_descriptions() && !node.description.is_empty() {
			let small = font * 0.7;
			ctx.set_font(&format!("{small}px Inter, sans-serif"));
			ctx.set_fill_style_str(DESCRIPTION_COLOR);
			let _ = ctx.fill_text(&node.description, x, y + h / 2.0 + small);
		}
	}
}
