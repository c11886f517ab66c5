use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::assets::ImageCache;
use super::state::BubbleChart;
use super::types::{ImageSpec, RenderDescriptor, Size, TextSpec};

const BODY_ALPHA: f64 = 0.1;
const RIM_ALPHA: f64 = 0.8;
const RIM_FRACTION: f64 = 0.2;

pub fn render<T>(chart: &BubbleChart<T>, ctx: &CanvasRenderingContext2d, images: &ImageCache) {
	let config = chart.config();
	let Size { width, height } = config.wrapper_size;
	ctx.clear_rect(0.0, 0.0, width, height);
	ctx.set_fill_style_str(&config.background.to_rgba(config.background_alpha));
	ctx.fill_rect(0.0, 0.0, width, height);
	ctx.set_image_smoothing_enabled(config.antialias);

	for bubble in chart.descriptors() {
		draw_bubble(&bubble, ctx, images);
	}
}

fn draw_bubble(bubble: &RenderDescriptor, ctx: &CanvasRenderingContext2d, images: &ImageCache) {
	if bubble.scale <= 0.0 {
		return;
	}
	ctx.save();
	let _ = ctx.translate(bubble.x, bubble.y);
	let _ = ctx.scale(bubble.scale, bubble.scale);

	for ring in &bubble.strokes {
		ctx.begin_path();
		let _ = ctx.arc(0.0, 0.0, ring.radius, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(&ring.color.to_rgba(ring.alpha));
		ctx.set_line_width(ring.width);
		ctx.stroke();
	}

	ctx.begin_path();
	let _ = ctx.arc(0.0, 0.0, bubble.radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&bubble.fill_color.to_rgba(BODY_ALPHA));
	ctx.fill();
	draw_rim(bubble, ctx);

	if let Some(image) = &bubble.image {
		draw_image(image, ctx, images);
	}
	for text in &bubble.texts {
		draw_text(text, ctx);
	}
	ctx.restore();
}

// One-pixel rings fading inwards from the edge
fn draw_rim(bubble: &RenderDescriptor, ctx: &CanvasRenderingContext2d) {
	let depth = bubble.radius * RIM_FRACTION;
	ctx.set_line_width(1.0);
	let mut i = 0.0;
	while i < depth {
		let alpha = RIM_ALPHA * (1.0 - i / depth);
		ctx.begin_path();
		let _ = ctx.arc(0.0, 0.0, bubble.radius - i, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(&bubble.fill_color.to_rgba(alpha));
		ctx.stroke();
		i += 1.0;
	}
}

fn draw_image(spec: &ImageSpec, ctx: &CanvasRenderingContext2d, images: &ImageCache) {
	let Some(image) = images.get(&spec.url) else {
		return;
	};
	ctx.save();
	if let Some(mask) = spec.mask_radius {
		ctx.begin_path();
		let _ = ctx.arc(0.0, spec.y_offset, mask, 0.0, 2.0 * PI);
		ctx.clip();
	}
	let half = spec.size / 2.0;
	let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
		&image,
		-half,
		spec.y_offset - half,
		spec.size,
		spec.size,
	);
	ctx.restore();
}

fn draw_text(spec: &TextSpec, ctx: &CanvasRenderingContext2d) {
	ctx.set_font(&format!("{}px {}", spec.font_size, spec.font_family));
	ctx.set_text_align(spec.align.as_str());
	ctx.set_text_baseline("middle");
	ctx.set_fill_style_str(&spec.fill.to_hex());
	let _ = ctx.fill_text(&spec.text, 0.0, spec.y_offset);
}
