//! End-to-end behaviour of the bubble chart engine through its public API.

use std::cell::RefCell;
use std::rc::Rc;

use bubble_chart_canvas::{
	BubbleChart, BubbleItem, ChartEvent, ChartHandle, Color, ConfigPatch, EventKind,
	InteractionState, Size, StylePatch, StyleValue,
};
use futures::FutureExt;

fn sized_style(radius: f64) -> StylePatch<BubbleItem> {
	StylePatch {
		size: Some(StyleValue::Constant(radius)),
		..StylePatch::default()
	}
}

fn items(n: usize) -> Vec<BubbleItem> {
	(0..n)
		.map(|i| BubbleItem::new(format!("b{i}"), format!("Bubble {i}"), i as f64))
		.collect()
}

fn chart_with(n: usize, radius: f64) -> ChartHandle<BubbleItem> {
	let handle = ChartHandle::new(BubbleChart::with_seed(
		ConfigPatch::default(),
		sized_style(radius),
		42,
	));
	handle.initialize(Size::new(800.0, 600.0));
	handle.set_data(items(n));
	handle
}

fn center_of(handle: &ChartHandle<BubbleItem>, id: &str) -> (f64, f64) {
	let chart = handle.borrow();
	let body = chart.bubble(id).map(|b| *b.body()).unwrap();
	(body.x, body.y)
}

#[test]
fn bubbles_stay_inside_and_keep_moving() {
	let handle = chart_with(12, 30.0);
	for _ in 0..1000 {
		handle.tick();
	}
	let chart = handle.borrow();
	assert_eq!(chart.bubbles().len(), 12);
	for bubble in chart.bubbles() {
		let body = bubble.body();
		assert!(body.x >= body.radius - 1e-9 && body.x <= 800.0 - body.radius + 1e-9);
		assert!(body.y >= body.radius - 1e-9 && body.y <= 600.0 - body.radius + 1e-9);
		assert!(body.speed().is_finite());
	}
}

#[test]
fn click_flashes_one_bubble_and_notifies_listeners() {
	let handle = chart_with(3, 20.0);
	let clicked = Rc::new(RefCell::new(Vec::new()));
	let sink = clicked.clone();
	handle.on(EventKind::BubbleClick, move |event| {
		if let ChartEvent::BubbleClick { id, data } = event {
			sink.borrow_mut().push((id.clone(), data.name.clone()));
		}
	});

	let (x, y) = center_of(&handle, "b0");
	handle.pointer_click(x, y);
	let (x, y) = center_of(&handle, "b1");
	handle.pointer_click(x, y);

	let chart = handle.borrow();
	assert_eq!(chart.current_flashing().map(|b| b.id()), Some("b1"));
	let flashing = chart
		.bubbles()
		.iter()
		.filter(|b| b.state() == InteractionState::Flashing)
		.count();
	assert_eq!(flashing, 1);
	let ids: Vec<String> = clicked.borrow().iter().map(|(id, _)| id.clone()).collect();
	assert_eq!(ids.len(), 2);
	assert_eq!(ids[1], "b1");
}

#[test]
fn background_click_clears_flash() {
	let handle = ChartHandle::new(BubbleChart::with_seed(
		ConfigPatch::default(),
		sized_style(5.0),
		1,
	));
	handle.initialize(Size::new(400.0, 400.0));
	handle.set_data(items(1));
	let hits = Rc::new(RefCell::new(Vec::new()));
	let sink = hits.clone();
	handle.on(EventKind::CanvasClick, move |event| {
		if let ChartEvent::CanvasClick { x, y } = event {
			sink.borrow_mut().push((*x, *y));
		}
	});

	let (x, y) = center_of(&handle, "b0");
	handle.pointer_click(x, y);
	assert!(handle.borrow().current_flashing().is_some());

	// the far corner is further than any radius-5 bubble can reach
	let (bx, by) = if x < 200.0 { (399.0, 399.0) } else { (1.0, 1.0) };
	handle.pointer_click(bx, by);
	assert!(handle.borrow().current_flashing().is_none());
	assert_eq!(hits.borrow().as_slice(), &[(bx, by)]);
}

#[test]
fn removal_resolves_after_animation() {
	let handle = chart_with(2, 20.0);
	let mut removal = handle.remove_bubble("b0");
	assert_eq!(removal.try_result(), None);
	for _ in 0..25 {
		handle.tick();
	}
	assert_eq!(removal.now_or_never(), Some(true));
	assert!(handle.borrow().bubble("b0").is_none());
	assert_eq!(handle.borrow().bubbles().len(), 1);
}

#[test]
fn removing_unknown_bubble_resolves_false() {
	let handle = chart_with(1, 20.0);
	assert_eq!(handle.remove_bubble("missing").now_or_never(), Some(false));
}

#[test]
fn batch_removal_skips_unknown_ids() {
	let handle = chart_with(3, 20.0);
	let batch = handle.remove_bubbles(["b2", "nope", "b0"]);
	for _ in 0..100 {
		handle.tick();
	}
	assert_eq!(
		batch.now_or_never(),
		Some(vec!["b2".to_owned(), "b0".to_owned()])
	);
	let chart = handle.borrow();
	let left: Vec<&str> = chart.bubbles().iter().map(|b| b.id()).collect();
	assert_eq!(left, vec!["b1"]);
}

#[test]
fn empty_batch_resolves_immediately() {
	let handle = chart_with(2, 20.0);
	let batch = handle.remove_bubbles(Vec::<String>::new());
	assert_eq!(batch.now_or_never(), Some(Vec::new()));
}

#[test]
fn bubble_style_update_touches_only_that_bubble() {
	let handle = chart_with(2, 20.0);
	let updated = handle.update_bubble_style(
		"b1",
		StylePatch {
			color: Some(Color(0xff0000).into()),
			size: Some(35.0.into()),
			..StylePatch::default()
		},
	);
	assert!(updated);
	{
		let chart = handle.borrow();
		assert_eq!(chart.bubble("b1").map(|b| b.radius()), Some(35.0));
		assert_eq!(chart.bubble("b0").map(|b| b.radius()), Some(20.0));
	}
	assert!(!handle.update_bubble_style("b0", StylePatch::default()));
	assert!(!handle.update_bubble_style("zzz", sized_style(10.0)));
}

#[test]
fn shared_style_update_rebuilds_bubbles() {
	let handle = chart_with(4, 20.0);
	handle.update_style(ConfigPatch::default(), sized_style(12.0));
	let chart = handle.borrow();
	assert_eq!(chart.bubbles().len(), 4);
	assert!(chart.bubbles().iter().all(|b| b.radius() == 12.0));
}

#[test]
fn area_ratio_limits_bubble_count() {
	let config = ConfigPatch {
		area_ratio: Some(Some(0.1)),
		..ConfigPatch::default()
	};
	let handle = ChartHandle::new(BubbleChart::with_seed(config, sized_style(30.0), 3));
	handle.initialize(Size::new(400.0, 400.0));
	handle.set_data(items(20));
	// 16000 px² budget fits five discs of radius 30
	assert_eq!(handle.borrow().bubbles().len(), 5);
}

#[test]
fn hover_adds_a_ring() {
	let handle = chart_with(1, 20.0);
	let (x, y) = center_of(&handle, "b0");
	let rings = |h: &ChartHandle<BubbleItem>| h.borrow().descriptors()[0].strokes.len();
	let before = rings(&handle);
	handle.pointer_move(x, y);
	assert_eq!(
		handle.borrow().bubble("b0").map(|b| b.state()),
		Some(InteractionState::Hovered)
	);
	assert_eq!(rings(&handle), before + 1);
	handle.pointer_leave();
	assert_eq!(rings(&handle), before);
}

#[test]
fn destroy_cancels_pending_removals() {
	let handle = chart_with(2, 20.0);
	let removal = handle.remove_bubble("b0");
	let batch = handle.remove_bubbles(["b1"]);
	handle.destroy();
	assert_eq!(removal.now_or_never(), Some(false));
	assert_eq!(batch.now_or_never(), Some(Vec::new()));
	assert!(handle.borrow().bubbles().is_empty());
	handle.tick();
	assert_eq!(handle.borrow().frame(), 0);
}

#[test]
fn data_set_before_initialize_is_culled_against_the_real_bounds() {
	let config = ConfigPatch {
		area_ratio: Some(Some(0.4)),
		..ConfigPatch::default()
	};
	let handle = ChartHandle::new(BubbleChart::with_seed(config, sized_style(20.0), 8));
	handle.set_data(items(5));
	handle.initialize(Size::new(800.0, 600.0));
	assert_eq!(handle.borrow().bubbles().len(), 5);
}
