use std::f64::consts::PI;
use std::rc::Rc;

use futures::channel::oneshot;
use log::{debug, error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::collision::{CollisionParams, resolve_collisions};
use super::config::{ChartConfig, ConfigPatch};
use super::error::ChartError;
use super::events::{ChartEvent, EventBus, EventKind, ListenerId};
use super::node::{BubbleNode, InteractionState, NodeKey, TickOutcome, resolve_radius};
use super::removal::{BatchRemoval, Removal, RemovalBatch};
use super::style::{Merge, StyleConfig, StylePatch};
use super::types::{BubbleDatum, RenderDescriptor, Size};

/// The bubble chart engine: owns the bubbles, the shared configuration and the
/// single flashing bubble, and advances the simulation once per frame.
///
/// All operations run on the frame-driver thread; nothing here locks.
pub struct BubbleChart<T> {
	config: ChartConfig,
	style: StyleConfig<T>,
	nodes: Vec<BubbleNode<T>>,
	// items handed over before the container size is known
	pending: Vec<Rc<T>>,
	current_flashing: Option<NodeKey>,
	hovered: Option<NodeKey>,
	events: EventBus<T>,
	pending_events: Vec<ChartEvent<T>>,
	batches: Vec<RemovalBatch>,
	rng: StdRng,
	next_key: u64,
	frame: u64,
	initialized: bool,
	destroyed: bool,
}

impl<T: BubbleDatum> Default for BubbleChart<T> {
	fn default() -> Self {
		Self::new(ConfigPatch::default(), StylePatch::default())
	}
}

impl<T: BubbleDatum> BubbleChart<T> {
	/// Chart with `config` and `style` merged over the defaults.
	pub fn new(config: ConfigPatch, style: StylePatch<T>) -> Self {
		Self::with_rng(config, style, StdRng::from_entropy())
	}

	/// Like [`BubbleChart::new`] with deterministic placement.
	pub fn with_seed(config: ConfigPatch, style: StylePatch<T>, seed: u64) -> Self {
		Self::with_rng(config, style, StdRng::seed_from_u64(seed))
	}

	fn with_rng(config: ConfigPatch, style: StylePatch<T>, rng: StdRng) -> Self {
		Self {
			config: ChartConfig::default().merged(config),
			style: StyleConfig::default().merged(style),
			nodes: Vec::new(),
			pending: Vec::new(),
			current_flashing: None,
			hovered: None,
			events: EventBus::default(),
			pending_events: Vec::new(),
			batches: Vec::new(),
			rng,
			next_key: 0,
			frame: 0,
			initialized: false,
			destroyed: false,
		}
	}

	/// Set the container bounds. Items passed to [`BubbleChart::set_data`] earlier
	/// are culled and placed now.
	pub fn initialize(&mut self, size: Size) {
		if self.initialized {
			warn!("bubble chart already initialized, treating as resize");
			self.handle_resize(size);
			return;
		}
		self.config.wrapper_size = size;
		self.initialized = true;
		let pending = std::mem::take(&mut self.pending);
		if !pending.is_empty() {
			self.set_shared_data(pending);
		}
		info!("bubble chart initialized at {}x{}", size.width, size.height);
	}

	/// Replace every bubble with fresh ones built from `items`.
	pub fn set_data(&mut self, items: impl IntoIterator<Item = T>) {
		self.set_shared_data(items.into_iter().map(Rc::new).collect());
	}

	/// [`BubbleChart::set_data`] for items the caller keeps a handle to.
	///
	/// Before [`BubbleChart::initialize`] the items are only held; culling and
	/// placement need the container size.
	pub fn set_shared_data(&mut self, items: Vec<Rc<T>>) {
		if self.destroyed {
			warn!("set_data called on a destroyed bubble chart");
			return;
		}
		if !self.initialized {
			self.clear_nodes();
			debug!("holding {} items until the chart is initialized", items.len());
			self.pending = items;
			return;
		}
		let items = self.adjust_bubbles_count(items);
		self.clear_nodes();
		let mut nodes = Vec::with_capacity(items.len());
		for data in items {
			let key = self.next_key();
			nodes.push(BubbleNode::new(
				key,
				data,
				self.style.clone(),
				&self.config,
				&mut self.rng,
			));
		}
		self.nodes = nodes;
		debug!("built {} bubbles", self.nodes.len());
	}

	/// Keep the largest items whose total area fits `area_ratio` of the container.
	///
	/// Items are taken by descending area (ties keep input order) until the first
	/// one that would overflow the budget; it and everything after are dropped.
	/// Without an area ratio every item is kept.
	pub fn adjust_bubbles_count(&self, items: Vec<Rc<T>>) -> Vec<Rc<T>> {
		let Some(ratio) = self.config.area_ratio else {
			return items;
		};
		let budget = self.config.wrapper_size.area() * ratio;
		let total = items.len();

		let mut sized: Vec<(f64, Rc<T>)> = items
			.into_iter()
			.map(|item| {
				let r = resolve_radius(&self.style, &*item);
				(PI * r * r, item)
			})
			.collect();
		sized.sort_by(|a, b| b.0.total_cmp(&a.0));

		let mut used = 0.0;
		let mut kept = Vec::new();
		for (area, item) in sized {
			if used + area > budget {
				break;
			}
			used += area;
			kept.push(item);
		}
		info!(
			"Adjusted bubbles count from {} to {} (area ratio: {})",
			total,
			kept.len(),
			ratio
		);
		kept
	}

	/// Merge `patch` into one bubble's style. Returns false, logging why, if the
	/// patch is empty or no bubble has `id`.
	pub fn update_bubble_style(&mut self, id: &str, patch: StylePatch<T>) -> bool {
		match self.try_update_bubble_style(id, patch) {
			Ok(()) => true,
			Err(err @ ChartError::EmptyStyle(_)) => {
				error!("update_bubble_style: {err}");
				false
			}
			Err(err) => {
				warn!("{err}");
				false
			}
		}
	}

	fn try_update_bubble_style(&mut self, id: &str, patch: StylePatch<T>) -> Result<(), ChartError> {
		if patch.is_empty() {
			return Err(ChartError::EmptyStyle(id.to_owned()));
		}
		let config = &self.config;
		let node = self
			.nodes
			.iter_mut()
			.find(|n| !n.is_destroyed() && n.id() == id)
			.ok_or_else(|| ChartError::UnknownBubble(id.to_owned()))?;
		node.apply_style(patch, config);
		Ok(())
	}

	/// Merge into the shared configuration and default style, then rebuild every
	/// bubble from its current data.
	pub fn update_style(&mut self, config: ConfigPatch, style: StylePatch<T>) {
		if !config.is_empty() {
			self.config.merge(config);
		}
		if !style.is_empty() {
			self.style.merge(style);
		}
		if !self.nodes.is_empty() {
			self.rebuild();
		}
	}

	fn rebuild(&mut self) {
		if !self.initialized {
			return;
		}
		let data: Vec<Rc<T>> = self.nodes.iter().map(|n| Rc::clone(n.data())).collect();
		self.set_shared_data(data);
	}

	/// Start the removal animation of the bubble with `id`.
	///
	/// The returned future resolves to `true` on the frame the bubble is detached,
	/// or right away to `false` if there is no such bubble.
	pub fn remove_bubble(&mut self, id: &str) -> Removal {
		let (done, removal) = Removal::pending();
		match self.begin_removal(id, Some(done)) {
			Ok(_) => removal,
			Err(err) => {
				warn!("{err}");
				Removal::resolved(false)
			}
		}
	}

	/// Remove `ids` one after another, each starting when the previous finished.
	/// Resolves to the ids that existed and were removed.
	pub fn remove_bubbles<I, S>(&mut self, ids: I) -> BatchRemoval
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let (batch, handle) = RemovalBatch::new(ids.into_iter().map(Into::into).collect());
		if self.destroyed {
			error!("remove_bubbles called on a destroyed bubble chart");
			batch.finish();
		} else {
			self.advance_batch(batch);
		}
		handle
	}

	fn begin_removal(
		&mut self,
		id: &str,
		done: Option<oneshot::Sender<bool>>,
	) -> Result<NodeKey, ChartError> {
		let found = self
			.nodes
			.iter()
			.filter(|n| !n.is_destroyed() && n.id() == id)
			.find(|n| n.state() != InteractionState::Removing)
			.map(|n| n.key());
		let Some(key) = found else {
			return Err(if self.nodes.iter().any(|n| n.id() == id) {
				ChartError::AlreadyRemoving(id.to_owned())
			} else {
				ChartError::UnknownBubble(id.to_owned())
			});
		};

		if self.current_flashing == Some(key) {
			self.set_flashing(None);
		}
		if self.hovered == Some(key) {
			self.hovered = None;
		}
		if let Some(node) = self.node_mut(key) {
			node.start_removal(done);
		}
		Ok(key)
	}

	fn advance_batch(&mut self, mut batch: RemovalBatch) {
		while let Some(id) = batch.queue.pop_front() {
			match self.begin_removal(&id, None) {
				Ok(key) => {
					batch.current = Some((key, id));
					self.batches.push(batch);
					return;
				}
				Err(err) => warn!("{err}"),
			}
		}
		batch.finish();
	}

	fn on_node_destroyed(&mut self, key: NodeKey) {
		if self.hovered == Some(key) {
			self.hovered = None;
		}
		let Some(pos) = self
			.batches
			.iter()
			.position(|b| matches!(&b.current, Some((k, _)) if *k == key))
		else {
			return;
		};
		let mut batch = self.batches.swap_remove(pos);
		if let Some((_, id)) = batch.current.take() {
			batch.removed.push(id);
		}
		self.advance_batch(batch);
	}

	/// Clamp every bubble into the new container bounds.
	pub fn handle_resize(&mut self, size: Size) {
		self.config.wrapper_size = size;
		for node in &mut self.nodes {
			node.handle_resize(size);
		}
	}

	/// Advance one frame: tick every bubble, detach finished removals, then run
	/// one collision pass and keep everything inside the container.
	pub fn tick(&mut self) {
		if self.destroyed {
			return;
		}
		self.frame += 1;
		let mut finished = Vec::new();
		for node in self.nodes.iter_mut() {
			if node.tick(&self.config) == TickOutcome::Destroyed {
				finished.push(node.key());
			}
		}
		if !finished.is_empty() {
			self.nodes.retain(|n| !n.is_destroyed());
			for key in finished {
				self.on_node_destroyed(key);
			}
		}
		resolve_collisions(&mut self.nodes, &CollisionParams::from(&self.config));
		// separation may nudge a bubble past a wall
		let bounds = self.config.wrapper_size;
		for node in &mut self.nodes {
			node.body.clamp_within(bounds);
		}
	}

	/// Pointer moved to `(x, y)`: update which bubble is hovered.
	pub fn pointer_move(&mut self, x: f64, y: f64) {
		let hit = self.node_at(x, y);
		if hit == self.hovered {
			return;
		}
		if let Some(prev) = self.hovered.take() {
			if let Some(node) = self.node_mut(prev) {
				node.pointer_leave();
			}
		}
		if let Some(key) = hit {
			if let Some(node) = self.node_mut(key) {
				node.pointer_enter();
			}
		}
		self.hovered = hit;
	}

	/// Pointer left the canvas.
	pub fn pointer_leave(&mut self) {
		if let Some(prev) = self.hovered.take() {
			if let Some(node) = self.node_mut(prev) {
				node.pointer_leave();
			}
		}
	}

	/// Click at `(x, y)`: flash the bubble under the pointer, or clear the flash
	/// if the background was hit.
	pub fn pointer_click(&mut self, x: f64, y: f64) {
		match self.node_at(x, y) {
			Some(key) => {
				self.click_bubble(key);
			}
			None => self.background_click(x, y),
		}
	}

	/// Click on a bubble: make it the only flashing one and queue a bubble click.
	pub fn click_bubble(&mut self, key: NodeKey) -> bool {
		let Some((id, data)) = self
			.node(key)
			.filter(|n| n.state() != InteractionState::Removing)
			.map(|n| (n.id().to_owned(), Rc::clone(n.data())))
		else {
			return false;
		};
		self.set_flashing(Some(key));
		self.pending_events.push(ChartEvent::BubbleClick { data, id });
		true
	}

	/// Click on empty background: stop any flash and queue a canvas click.
	pub fn background_click(&mut self, x: f64, y: f64) {
		self.set_flashing(None);
		self.pending_events.push(ChartEvent::CanvasClick { x, y });
	}

	/// Topmost live bubble under `(x, y)`. Removing bubbles let clicks through.
	pub fn node_at(&self, x: f64, y: f64) -> Option<NodeKey> {
		self.nodes
			.iter()
			.rev()
			.filter(|n| !n.is_destroyed() && n.state() != InteractionState::Removing)
			.find(|n| n.contains(x, y))
			.map(|n| n.key())
	}

	/// Stop every flash, drop all bubbles and subscribers. Further frames are ignored.
	pub fn destroy(&mut self) {
		if self.destroyed {
			return;
		}
		self.clear_nodes();
		self.pending.clear();
		self.destroyed = true;
		self.events.clear();
		self.pending_events.clear();
		debug!("bubble chart destroyed after {} frames", self.frame);
	}

	fn clear_nodes(&mut self) {
		self.set_flashing(None);
		self.hovered = None;
		for batch in std::mem::take(&mut self.batches) {
			batch.finish();
		}
		self.nodes.clear();
	}
}

impl<T> BubbleChart<T> {
	/// Make `key` the flashing bubble, clearing the previous one first.
	fn set_flashing(&mut self, key: Option<NodeKey>) {
		if let Some(prev) = self.current_flashing.take() {
			if let Some(node) = self.node_mut(prev) {
				node.stop_flashing();
			}
		}
		if let Some(key) = key {
			if let Some(node) = self.node_mut(key) {
				if node.start_flashing() {
					self.current_flashing = Some(key);
				}
			}
		}
	}

	fn next_key(&mut self) -> NodeKey {
		self.next_key += 1;
		NodeKey(self.next_key)
	}

	fn node_mut(&mut self, key: NodeKey) -> Option<&mut BubbleNode<T>> {
		self.nodes.iter_mut().find(|n| n.key() == key)
	}

	/// Bubble by chart-local key.
	pub fn node(&self, key: NodeKey) -> Option<&BubbleNode<T>> {
		self.nodes.iter().find(|n| n.key() == key)
	}

	/// First live bubble with `id`.
	pub fn bubble(&self, id: &str) -> Option<&BubbleNode<T>> {
		self.nodes.iter().find(|n| !n.is_destroyed() && n.id() == id)
	}

	/// Bubbles in draw order.
	pub fn bubbles(&self) -> &[BubbleNode<T>] {
		&self.nodes
	}

	/// The flashing bubble, if any.
	pub fn current_flashing(&self) -> Option<&BubbleNode<T>> {
		self.current_flashing.and_then(|key| self.node(key))
	}

	/// Active configuration.
	pub fn config(&self) -> &ChartConfig {
		&self.config
	}

	/// Default style for new bubbles.
	pub fn style(&self) -> &StyleConfig<T> {
		&self.style
	}

	/// Frames simulated so far.
	pub fn frame(&self) -> u64 {
		self.frame
	}

	/// True after [`BubbleChart::initialize`].
	pub fn is_initialized(&self) -> bool {
		self.initialized
	}

	/// True after [`BubbleChart::destroy`].
	pub fn is_destroyed(&self) -> bool {
		self.destroyed
	}

	/// Render descriptors in draw order.
	pub fn descriptors(&self) -> Vec<RenderDescriptor> {
		self.nodes
			.iter()
			.filter(|n| !n.is_destroyed())
			.map(|n| n.descriptor(&self.config))
			.collect()
	}

	/// The subscriber list events are delivered to.
	pub fn events(&self) -> &EventBus<T> {
		&self.events
	}

	/// Subscribe to `kind`.
	pub fn on(&self, kind: EventKind, listener: impl Fn(&ChartEvent<T>) + 'static) -> ListenerId {
		self.events.on(kind, listener)
	}

	/// Unsubscribe.
	pub fn off(&self, kind: EventKind, id: ListenerId) -> bool {
		self.events.off(kind, id)
	}

	/// Events queued since the last call, oldest first.
	pub fn take_events(&mut self) -> Vec<ChartEvent<T>> {
		std::mem::take(&mut self.pending_events)
	}

	/// Deliver queued events to subscribers. Listeners must not reach back into
	/// this chart through a shared borrow; see `ChartHandle` for that case.
	pub fn flush_events(&mut self) -> usize {
		let events = self.take_events();
		for event in &events {
			self.events.emit(event);
		}
		events.len()
	}
}
