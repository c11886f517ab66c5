use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, anyhow};
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Window};

use super::assets::ImageCache;
use super::handle::ChartHandle;
use super::render;
use super::types::{BubbleItem, Size};

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Canvas that runs a bubble chart over `data`.
///
/// Pass `chart` to keep a handle for removals, style updates and event
/// subscriptions; otherwise the component owns a default chart.
#[component]
pub fn BubbleChartCanvas(
	#[prop(into)] data: Signal<Vec<BubbleItem>>,
	#[prop(optional)] chart: Option<ChartHandle<BubbleItem>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let chart = chart.unwrap_or_default();
	let images = ImageCache::default();
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let resize_cb: FrameCallback = Rc::new(RefCell::new(None));

	let (chart_init, animate_init, resize_cb_init) =
		(chart.clone(), animate.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let layout = Layout {
			fullscreen,
			width,
			height,
		};
		if let Err(err) = mount(
			&canvas,
			layout,
			&chart_init,
			&images,
			&animate_init,
			&resize_cb_init,
		) {
			error!("bubble chart setup failed: {err:#}");
		}
	});

	let chart_data = chart.clone();
	Effect::new(move |_| {
		let items = data.get();
		chart_data.set_data(items);
	});

	let teardown = StoredValue::new_local((chart.clone(), resize_cb));
	on_cleanup(move || {
		teardown.try_with_value(|(chart, resize_cb)| {
			// a frame may already be scheduled; the loop stops itself once it
			// sees the destroyed chart
			if let (Some(window), Some(cb)) = (web_sys::window(), resize_cb.borrow_mut().take()) {
				let _ = window
					.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
			chart.destroy();
		});
	});

	let chart_mm = chart.clone();
	let on_mousemove = move |ev: MouseEvent| {
		if let Some((x, y)) = pointer_position(canvas_ref, &ev) {
			chart_mm.pointer_move(x, y);
		}
	};

	let chart_ml = chart.clone();
	let on_mouseleave = move |_: MouseEvent| {
		chart_ml.pointer_leave();
	};

	let chart_click = chart.clone();
	let on_click = move |ev: MouseEvent| {
		if let Some((x, y)) = pointer_position(canvas_ref, &ev) {
			chart_click.pointer_click(x, y);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="bubble-chart-canvas"
			on:mousemove=on_mousemove
			on:mouseleave=on_mouseleave
			on:click=on_click
			style="display: block; cursor: pointer;"
		/>
	}
}

#[derive(Clone, Copy)]
struct Layout {
	fullscreen: bool,
	width: Option<f64>,
	height: Option<f64>,
}

impl Layout {
	fn measure(&self, window: &Window, canvas: &HtmlCanvasElement) -> anyhow::Result<Size> {
		if self.fullscreen {
			let width = window.inner_width().map_err(js_error)?.as_f64();
			let height = window.inner_height().map_err(js_error)?.as_f64();
			return Ok(Size::new(width.unwrap_or(800.0), height.unwrap_or(600.0)));
		}
		let parent = canvas.parent_element();
		Ok(Size::new(
			self.width.unwrap_or_else(|| {
				parent
					.as_ref()
					.map(|p| p.client_width() as f64)
					.unwrap_or(800.0)
			}),
			self.height.unwrap_or_else(|| {
				parent
					.as_ref()
					.map(|p| p.client_height() as f64)
					.unwrap_or(600.0)
			}),
		))
	}

	fn tracks_window(&self) -> bool {
		self.fullscreen || self.width.is_none() || self.height.is_none()
	}
}

fn js_error(value: JsValue) -> anyhow::Error {
	anyhow!("{:?}", value)
}

fn mount(
	canvas: &HtmlCanvasElement,
	layout: Layout,
	chart: &ChartHandle<BubbleItem>,
	images: &ImageCache,
	animate: &FrameCallback,
	resize_cb: &FrameCallback,
) -> anyhow::Result<()> {
	let window = web_sys::window().context("no window")?;
	let size = layout.measure(&window, canvas)?;
	canvas.set_width(size.width as u32);
	canvas.set_height(size.height as u32);

	let ctx: CanvasRenderingContext2d = canvas
		.get_context("2d")
		.map_err(js_error)?
		.context("2d context unavailable")?
		.dyn_into()
		.map_err(|_| anyhow!("context is not a CanvasRenderingContext2d"))?;
	chart.initialize(size);

	if layout.tracks_window() {
		let (chart_resize, canvas_resize) = (chart.clone(), canvas.clone());
		*resize_cb.borrow_mut() = Some(Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			match layout.measure(&win, &canvas_resize) {
				Ok(size) => {
					canvas_resize.set_width(size.width as u32);
					canvas_resize.set_height(size.height as u32);
					chart_resize.handle_resize(size);
				}
				Err(err) => error!("resize failed: {err:#}"),
			}
		}));
		if let Some(ref cb) = *resize_cb.borrow() {
			window
				.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())
				.map_err(js_error)?;
		}
	}

	let (chart_anim, animate_inner, images_anim) = (chart.clone(), animate.clone(), images.clone());
	*animate.borrow_mut() = Some(Closure::new(move || {
		if chart_anim.borrow().is_destroyed() {
			// released after this callback has returned
			if let Some(cb) = animate_inner.borrow_mut().take() {
				spawn_local(async move { drop(cb) });
			}
			return;
		}
		chart_anim.tick();
		render::render(&chart_anim.borrow(), &ctx, &images_anim);
		if let Some(ref cb) = *animate_inner.borrow() {
			if let Some(win) = web_sys::window() {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}
	}));
	if let Some(ref cb) = *animate.borrow() {
		window
			.request_animation_frame(cb.as_ref().unchecked_ref())
			.map_err(js_error)?;
	}
	Ok(())
}

fn pointer_position(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}
