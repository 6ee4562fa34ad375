//! Leptos component drawing a shared [`GraphStore`] on a canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel event
//! handlers for node dragging, panning, zooming and selection. An animation
//! loop runs via `requestAnimationFrame`; each frame syncs the simulation with
//! the store, advances the physics and repaints.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::scale::ScaleConfig;
use super::state::GraphViewState;
use super::theme::{Theme, ThemeMode};
use crate::api::wiki_article_url;
use crate::explore::{SharedGraph, lock_graph};
use crate::selection::SelectionState;

/// Pointer travel (screen pixels) that turns a press into a drag.
const CLICK_SLOP: f64 = 3.0;

/// Upper bound on one simulation step, in seconds, after a stalled frame.
const MAX_FRAME_DT: f64 = 0.05;

/// Bundles simulation state with visual configuration.
struct ViewContext {
	state: GraphViewState,
	scale: ScaleConfig,
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Pointer position relative to the canvas.
fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn open_article(wiki: &str, title: &str) {
	match wiki_article_url(wiki, title) {
		Ok(url) => {
			if let Some(window) = web_sys::window() {
				let _ = window.open_with_url_and_target(url.as_str(), "_blank");
			}
		}
		Err(e) => warn!("wiki-graph: cannot open {title:?}: {e}"),
	}
}

/// Renders an interactive view of `graph`.
///
/// Clicking a node toggles its selection in `selection`; ctrl-clicking opens
/// the article on the public wiki. The component sizes itself to its parent
/// container unless `fullscreen` is set, in which case it fills the viewport
/// and follows window resizes.
#[component]
pub fn GraphCanvas(
	graph: SharedGraph,
	selection: RwSignal<SelectionState>,
	#[prop(into)] theme: Signal<ThemeMode>,
	#[prop(into)] wiki: String,
	#[prop(default = false)] fullscreen: bool,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<ViewContext>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (context_init, animate_init, resize_cb_init, graph_init) =
		(context.clone(), animate.clone(), resize_cb.clone(), graph.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			canvas
				.parent_element()
				.map(|p| (p.client_width() as f64, p.client_height() as f64))
				.unwrap_or((800.0, 600.0))
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => return,
			},
			_ => {
				warn!("wiki-graph: canvas has no 2d context");
				return;
			}
		};

		*context_init.borrow_mut() = Some(ViewContext {
			state: GraphViewState::new(w, h),
			scale: ScaleConfig::default(),
		});

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.state.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner, graph_anim) =
			(context_init.clone(), animate_init.clone(), graph_init.clone());
		let mut last_frame = js_sys::Date::now();
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let now = js_sys::Date::now();
			let dt = ((now - last_frame) / 1000.0).clamp(0.0, MAX_FRAME_DT);
			last_frame = now;
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				let store = lock_graph(&graph_anim);
				if c.state.sync(&store, &c.scale) {
					debug!(
						"wiki-graph: view synced ({} nodes, {} edges)",
						store.node_count(),
						store.edge_count()
					);
				}
				if c.state.animation_running {
					c.state.tick(dt as f32);
				}
				let theme = Theme::for_mode(theme.get_untracked());
				selection.with_untracked(|sel| {
					render::render(&c.state, &store, sel, &ctx, &c.scale, &theme);
				});
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(window) = web_sys::window() {
					let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let (context_md, graph_md) = (context.clone(), graph.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_md.borrow_mut() {
			let pressed = c
				.state
				.node_at_position(x, y, &lock_graph(&graph_md), &c.scale)
				.map(|(idx, _)| idx);
			c.state.drag.start_x = x;
			c.state.drag.start_y = y;
			c.state.drag.moved = false;
			c.state.drag.active = true;
			c.state.drag.node_idx = pressed;
			if let Some(idx) = pressed {
				c.state.graph.visit_nodes(|node| {
					if node.index() == idx {
						c.state.drag.node_start_x = node.x();
						c.state.drag.node_start_y = node.y();
					}
				});
			} else {
				c.state.pan.active = true;
				c.state.pan.start_x = x;
				c.state.pan.start_y = y;
				c.state.pan.transform_start_x = c.state.transform.x;
				c.state.pan.transform_start_y = c.state.transform.y;
			}
		}
	};

	let (context_mm, graph_mm) = (context.clone(), graph.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			if c.state.drag.active {
				let (dx, dy) = (x - c.state.drag.start_x, y - c.state.drag.start_y);
				if (dx * dx + dy * dy).sqrt() > CLICK_SLOP {
					c.state.drag.moved = true;
				}
			} else {
				let store = lock_graph(&graph_mm);
				c.state.hovered = c
					.state
					.node_at_position(x, y, &store, &c.scale)
					.map(|(idx, _)| idx);
			}

			if let (true, Some(idx)) = (c.state.drag.moved, c.state.drag.node_idx) {
				let k = c.state.transform.k;
				let (nx, ny) = (
					c.state.drag.node_start_x + ((x - c.state.drag.start_x) / k) as f32,
					c.state.drag.node_start_y + ((y - c.state.drag.start_y) / k) as f32,
				);
				c.state.graph.visit_nodes_mut(|node| {
					if node.index() == idx {
						node.data.x = nx;
						node.data.y = ny;
						node.data.is_anchor = true;
					}
				});
			} else if c.state.pan.active {
				c.state.transform.x = c.state.pan.transform_start_x + (x - c.state.pan.start_x);
				c.state.transform.y = c.state.pan.transform_start_y + (y - c.state.pan.start_y);
			}
		}
	};

	let (context_mu, graph_mu, wiki_mu) = (context.clone(), graph.clone(), wiki.clone());
	let on_mouseup = move |ev: MouseEvent| {
		let clicked = match *context_mu.borrow_mut() {
			Some(ref mut c) => {
				let clicked = (c.state.drag.active && !c.state.drag.moved)
					.then_some(c.state.drag.node_idx)
					.flatten();
				c.state.drag = Default::default();
				c.state.pan.active = false;
				clicked.and_then(|idx| {
					let mut key = None;
					c.state.graph.visit_nodes(|node| {
						if node.index() == idx {
							key = Some(node.data.user_data.key.clone());
						}
					});
					key
				})
			}
			None => None,
		};
		let Some(key) = clicked else {
			return;
		};

		if ev.ctrl_key() {
			let label = lock_graph(&graph_mu)
				.node(&key)
				.map_or_else(|| key.clone(), |a| a.label.clone());
			open_article(&wiki_mu, &label);
			return;
		}
		let mut sel = selection.get_untracked();
		let toggled = sel.toggle(&lock_graph(&graph_mu), &key);
		match toggled {
			Ok(refresh) => {
				debug!(
					"wiki-graph: selection now {:?}, {} nodes changed",
					sel.selected_node,
					refresh.nodes.len()
				);
				selection.set(sel);
			}
			Err(e) => warn!("wiki-graph: {e}"),
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.state.drag = Default::default();
			c.state.pan.active = false;
			c.state.hovered = None;
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let scale = c.scale.clone();
			c.state.zoom_at(x, y, factor, &scale);
		}
	};

	let context_dbl = context.clone();
	let on_dblclick = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_dbl.borrow_mut() {
			c.state.reset_view();
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:dblclick=on_dblclick
			style="display: block; cursor: grab;"
		/>
	}
}
