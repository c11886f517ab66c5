use std::cell::{Ref, RefCell};
use std::rc::Rc;

use super::config::ConfigPatch;
use super::events::{ChartEvent, EventKind, ListenerId};
use super::removal::{BatchRemoval, Removal};
use super::state::BubbleChart;
use super::style::StylePatch;
use super::types::{BubbleDatum, Size};

/// Shared handle to a chart, used by the canvas component and application code.
///
/// Every mutating call releases the chart borrow before delivering the events it
/// produced, so listeners are free to call back into the handle.
pub struct ChartHandle<T> {
	chart: Rc<RefCell<BubbleChart<T>>>,
}

impl<T> Clone for ChartHandle<T> {
	fn clone(&self) -> Self {
		Self {
			chart: Rc::clone(&self.chart),
		}
	}
}

impl<T: BubbleDatum> Default for ChartHandle<T> {
	fn default() -> Self {
		Self::new(BubbleChart::default())
	}
}

impl<T: BubbleDatum> ChartHandle<T> {
	/// Wrap `chart`.
	pub fn new(chart: BubbleChart<T>) -> Self {
		Self {
			chart: Rc::new(RefCell::new(chart)),
		}
	}

	/// Read access to the chart.
	pub fn borrow(&self) -> Ref<'_, BubbleChart<T>> {
		self.chart.borrow()
	}

	/// Run `f` against the chart, then deliver any events it queued.
	pub fn update<R>(&self, f: impl FnOnce(&mut BubbleChart<T>) -> R) -> R {
		let (result, bus, events) = {
			let mut chart = self.chart.borrow_mut();
			let result = f(&mut chart);
			let events = chart.take_events();
			(result, chart.events().clone(), events)
		};
		for event in &events {
			bus.emit(event);
		}
		result
	}

	/// See [`BubbleChart::initialize`].
	pub fn initialize(&self, size: Size) {
		self.update(|c| c.initialize(size));
	}

	/// See [`BubbleChart::set_data`].
	pub fn set_data(&self, items: impl IntoIterator<Item = T>) {
		self.update(|c| c.set_data(items));
	}

	/// See [`BubbleChart::update_bubble_style`].
	pub fn update_bubble_style(&self, id: &str, patch: StylePatch<T>) -> bool {
		self.update(|c| c.update_bubble_style(id, patch))
	}

	/// See [`BubbleChart::update_style`].
	pub fn update_style(&self, config: ConfigPatch, style: StylePatch<T>) {
		self.update(|c| c.update_style(config, style));
	}

	/// See [`BubbleChart::remove_bubble`].
	pub fn remove_bubble(&self, id: &str) -> Removal {
		self.update(|c| c.remove_bubble(id))
	}

	/// See [`BubbleChart::remove_bubbles`].
	pub fn remove_bubbles<I, S>(&self, ids: I) -> BatchRemoval
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.update(|c| c.remove_bubbles(ids))
	}

	/// See [`BubbleChart::handle_resize`].
	pub fn handle_resize(&self, size: Size) {
		self.update(|c| c.handle_resize(size));
	}

	/// Advance one frame.
	pub fn tick(&self) {
		self.update(|c| c.tick());
	}

	/// See [`BubbleChart::pointer_move`].
	pub fn pointer_move(&self, x: f64, y: f64) {
		self.update(|c| c.pointer_move(x, y));
	}

	/// See [`BubbleChart::pointer_leave`].
	pub fn pointer_leave(&self) {
		self.update(|c| c.pointer_leave());
	}

	/// See [`BubbleChart::pointer_click`].
	pub fn pointer_click(&self, x: f64, y: f64) {
		self.update(|c| c.pointer_click(x, y));
	}

	/// Subscribe to `kind`.
	pub fn on(&self, kind: EventKind, listener: impl Fn(&ChartEvent<T>) + 'static) -> ListenerId {
		self.chart.borrow().on(kind, listener)
	}

	/// Unsubscribe.
	pub fn off(&self, kind: EventKind, id: ListenerId) -> bool {
		self.chart.borrow().off(kind, id)
	}

	/// See [`BubbleChart::destroy`].
	pub fn destroy(&self) {
		self.update(|c| c.destroy());
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::bubble_chart::types::BubbleItem;
	use std::cell::Cell;

	#[test]
	fn listener_can_reenter_the_handle() {
		let handle: ChartHandle<BubbleItem> =
			ChartHandle::new(BubbleChart::with_seed(ConfigPatch::default(), StylePatch::default(), 9));
		handle.initialize(Size::new(300.0, 300.0));
		handle.set_data([BubbleItem::new("x", "X", 1.0)]);

		let removals = Rc::new(Cell::new(0));
		let (inner, count) = (handle.clone(), removals.clone());
		handle.on(EventKind::BubbleClick, move |event| {
			if let ChartEvent::BubbleClick { id, .. } = event {
				let _ = inner.remove_bubble(id);
				count.set(count.get() + 1);
			}
		});

		let body = *handle.borrow().bubbles()[0].body();
		handle.pointer_click(body.x, body.y);
		assert_eq!(removals.get(), 1);
		assert!(handle.borrow().bubble("x").is_some());
		for _ in 0..30 {
			handle.tick();
		}
		assert!(handle.borrow().bubble("x").is_none());
	}
}
