//! Canvas rendering for the graph view.
//!
//! Visibility and emphasis come from the selection reducers; this module only
//! decides how a visible element is painted. Passes, back to front:
//! 1. Background (screen space)
//! 2. Edges, then arrow heads for directed graphs (world space)
//! 3. Nodes, then rings and labels of emphasised nodes on top

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scale::{ScaleConfig, ScaledValues};
use super::state::GraphViewState;
use super::theme::{Color, Theme};
use crate::graph::GraphStore;
use crate::selection::{NodeDisplay, SelectionState};

/// Renders the complete graph to the canvas.
pub fn render(
	state: &GraphViewState,
	store: &GraphStore,
	selection: &SelectionState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let scale = ScaledValues::new(config, state.transform.k);

	draw_background(state, ctx, theme);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	draw_edges(state, store, selection, ctx, &scale, theme);
	draw_nodes(state, store, selection, ctx, &scale, theme);

	ctx.restore();
}

fn draw_background(state: &GraphViewState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let gradient = ctx.create_radial_gradient(
		state.width / 2.0,
		state.height / 2.0,
		0.0,
		state.width / 2.0,
		state.height / 2.0,
		state.width.max(state.height) * 0.8,
	);
	match gradient {
		Ok(gradient) => {
			let _ = gradient.add_color_stop(0.0, &theme.background_center.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		Err(_) => ctx.set_fill_style_str(&theme.background.to_css()),
	}
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_edges(
	state: &GraphViewState,
	store: &GraphStore,
	selection: &SelectionState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	for segment in state.edge_segments(store) {
		let edge = segment.edge;
		let display = selection.edge_display(edge);
		if display.hidden {
			continue;
		}
		let (Some(source), Some(target)) = (store.node(&edge.source), store.node(&edge.target)) else {
			continue;
		};

		let ((x1, y1), (x2, y2)) = (segment.from, segment.to);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);
		let r1 = scale.node_radius(source.size);
		let r2 = scale.node_radius(target.size);
		let arrow = if state.directed { scale.arrow_size } else { 0.0 };

		let color = Color::parse(&display.color);
		let color = color.with_alpha(color.a * theme.edge_alpha);
		ctx.set_stroke_style_str(&color.to_css());
		ctx.set_line_width(scale.edge_width * display.size.max(0.5));

		ctx.begin_path();
		ctx.move_to(x1 + ux * r1, y1 + uy * r1);
		ctx.line_to(x2 - ux * (r2 + arrow), y2 - uy * (r2 + arrow));
		ctx.stroke();

		if arrow > 0.0 {
			let (tip_x, tip_y) = (x2 - ux * r2, y2 - uy * r2);
			let (back_x, back_y) = (tip_x - ux * arrow, tip_y - uy * arrow);
			let (px, py) = (-uy * arrow * 0.5, ux * arrow * 0.5);

			ctx.set_fill_style_str(&color.to_css());
			ctx.begin_path();
			ctx.move_to(tip_x, tip_y);
			ctx.line_to(back_x + px, back_y + py);
			ctx.line_to(back_x - px, back_y - py);
			ctx.close_path();
			ctx.fill();
		}
	}
}

fn draw_nodes(
	state: &GraphViewState,
	store: &GraphStore,
	selection: &SelectionState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let mut emphasised = Vec::new();

	state.graph.visit_nodes(|node| {
		let key = &node.data.user_data.key;
		let Some(attrs) = store.node(key) else {
			return;
		};
		let display = selection.node_display(key, attrs);
		if display.hidden {
			return;
		}
		let (x, y) = (node.x() as f64, node.y() as f64);
		let radius = scale.node_radius(display.size);
		draw_node(ctx, x, y, radius, &display, theme);

		let hovered = state.hovered == Some(node.index());
		if hovered || display.highlighted || selection.selected_node.as_deref() == Some(key.as_str()) {
			emphasised.push((x, y, radius, display));
		} else if display.force_label || scale.shows_label(radius) {
			draw_label(ctx, x, y, radius, &display.label, scale, theme);
		}
	});

	for (x, y, radius, display) in emphasised {
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius + scale.ring_offset, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(&theme.ring.to_css());
		ctx.set_line_width(scale.ring_width);
		ctx.stroke();
		draw_label(ctx, x, y, radius, &display.label, scale, theme);
	}
}

fn draw_node(
	ctx: &CanvasRenderingContext2d,
	x: f64,
	y: f64,
	radius: f64,
	display: &NodeDisplay,
	theme: &Theme,
) {
	let base = Color::parse(&display.color);
	let shaded = theme
		.node_gradient
		.then(|| ctx.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius).ok())
		.flatten();

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	match shaded {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &base.lighten(0.4).to_css());
			let _ = gradient.add_color_stop(0.7, &base.to_css());
			let _ = gradient.add_color_stop(1.0, &base.darken(0.2).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&base.to_css()),
	}
	ctx.fill();
}

fn draw_label(
	ctx: &CanvasRenderingContext2d,
	x: f64,
	y: f64,
	radius: f64,
	label: &str,
	scale: &ScaledValues,
	theme: &Theme,
) {
	if label.is_empty() {
		return;
	}
	ctx.set_fill_style_str(&theme.label.to_css());
	ctx.set_font(&scale.label_font);
	let _ = ctx.fill_text(label, x + radius + 4.0 / scale.k, y + 3.0 / scale.k);
}
