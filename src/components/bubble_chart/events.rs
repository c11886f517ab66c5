use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Notification published by a chart.
pub enum ChartEvent<T> {
	/// A bubble was clicked.
	BubbleClick {
		/// The clicked bubble's data.
		data: Rc<T>,
		/// The clicked bubble's id.
		id: String,
	},
	/// Empty canvas background was clicked.
	CanvasClick {
		/// Pointer x in canvas coordinates.
		x: f64,
		/// Pointer y in canvas coordinates.
		y: f64,
	},
}

impl<T> ChartEvent<T> {
	/// Which channel this event is published on.
	pub fn kind(&self) -> EventKind {
		match self {
			ChartEvent::BubbleClick { .. } => EventKind::BubbleClick,
			ChartEvent::CanvasClick { .. } => EventKind::CanvasClick,
		}
	}
}

impl<T> fmt::Debug for ChartEvent<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ChartEvent::BubbleClick { id, .. } => {
				f.debug_struct("BubbleClick").field("id", id).finish_non_exhaustive()
			}
			ChartEvent::CanvasClick { x, y } => f
				.debug_struct("CanvasClick")
				.field("x", x)
				.field("y", y)
				.finish(),
		}
	}
}

/// Event channel names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
	/// `bubble:click`
	BubbleClick,
	/// `canvas:click`
	CanvasClick,
}

impl EventKind {
	/// Wire name of the channel.
	pub fn as_str(self) -> &'static str {
		match self {
			EventKind::BubbleClick => "bubble:click",
			EventKind::CanvasClick => "canvas:click",
		}
	}
}

/// Handle returned by [`EventBus::on`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<T> = Rc<dyn Fn(&ChartEvent<T>)>;

struct Registry<T> {
	next_id: u64,
	listeners: Vec<(EventKind, ListenerId, Listener<T>)>,
}

/// Subscriber list shared between a chart and whoever dispatches its events.
///
/// Listeners run after the registry borrow is released, so a listener may
/// subscribe or unsubscribe while an event is being delivered.
pub struct EventBus<T> {
	registry: Rc<RefCell<Registry<T>>>,
}

impl<T> Clone for EventBus<T> {
	fn clone(&self) -> Self {
		Self {
			registry: Rc::clone(&self.registry),
		}
	}
}

impl<T> Default for EventBus<T> {
	fn default() -> Self {
		Self {
			registry: Rc::new(RefCell::new(Registry {
				next_id: 0,
				listeners: Vec::new(),
			})),
		}
	}
}

impl<T> EventBus<T> {
	/// Subscribe `listener` to `kind`.
	pub fn on(&self, kind: EventKind, listener: impl Fn(&ChartEvent<T>) + 'static) -> ListenerId {
		let mut registry = self.registry.borrow_mut();
		let id = ListenerId(registry.next_id);
		registry.next_id += 1;
		let listener: Listener<T> = Rc::new(listener);
		registry.listeners.push((kind, id, listener));
		id
	}

	/// Unsubscribe. Returns false if `id` was not subscribed to `kind`.
	pub fn off(&self, kind: EventKind, id: ListenerId) -> bool {
		let mut registry = self.registry.borrow_mut();
		let before = registry.listeners.len();
		registry
			.listeners
			.retain(|(k, listener_id, _)| !(*k == kind && *listener_id == id));
		registry.listeners.len() != before
	}

	/// Deliver `event` to its subscribers in subscription order.
	pub fn emit(&self, event: &ChartEvent<T>) -> usize {
		let kind = event.kind();
		let targets: Vec<Listener<T>> = self
			.registry
			.borrow()
			.listeners
			.iter()
			.filter(|(k, _, _)| *k == kind)
			.map(|(_, _, listener)| Rc::clone(listener))
			.collect();
		for listener in &targets {
			listener(event);
		}
		targets.len()
	}

	/// Number of subscribers on `kind`.
	pub fn listener_count(&self, kind: EventKind) -> usize {
		self.registry
			.borrow()
			.listeners
			.iter()
			.filter(|(k, _, _)| *k == kind)
			.count()
	}

	/// Drop every subscriber.
	pub fn clear(&self) {
		self.registry.borrow_mut().listeners.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::Cell;

	#[test]
	fn emit_reaches_only_matching_kind() {
		let bus: EventBus<()> = EventBus::default();
		let clicks = Rc::new(Cell::new(0));
		let c = clicks.clone();
		bus.on(EventKind::CanvasClick, move |_| c.set(c.get() + 1));

		let delivered = bus.emit(&ChartEvent::BubbleClick {
			data: Rc::new(()),
			id: "a".into(),
		});
		assert_eq!(delivered, 0);
		assert_eq!(bus.emit(&ChartEvent::CanvasClick { x: 1.0, y: 2.0 }), 1);
		assert_eq!(clicks.get(), 1);
	}

	#[test]
	fn off_unsubscribes_by_id() {
		let bus: EventBus<()> = EventBus::default();
		let id = bus.on(EventKind::CanvasClick, |_| {});
		assert!(!bus.off(EventKind::BubbleClick, id));
		assert!(bus.off(EventKind::CanvasClick, id));
		assert!(!bus.off(EventKind::CanvasClick, id));
		assert_eq!(bus.listener_count(EventKind::CanvasClick), 0);
	}

	#[test]
	fn listener_may_unsubscribe_itself_during_emit() {
		let bus: EventBus<()> = EventBus::default();
		let slot: Rc<Cell<Option<ListenerId>>> = Rc::new(Cell::new(None));
		let (inner_bus, inner_slot) = (bus.clone(), slot.clone());
		let id = bus.on(EventKind::CanvasClick, move |_| {
			if let Some(id) = inner_slot.get() {
				inner_bus.off(EventKind::CanvasClick, id);
			}
		});
		slot.set(Some(id));
		bus.emit(&ChartEvent::CanvasClick { x: 0.0, y: 0.0 });
		assert_eq!(bus.listener_count(EventKind::CanvasClick), 0);
	}

	#[test]
	fn kind_names() {
		assert_eq!(EventKind::BubbleClick.as_str(), "bubble:click");
		assert_eq!(EventKind::CanvasClick.as_str(), "canvas:click");
	}
}
