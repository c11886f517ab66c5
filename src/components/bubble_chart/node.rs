use std::f64::consts::TAU;
use std::rc::Rc;

use futures::channel::oneshot;
use rand::prelude::*;

use super::config::{ChartConfig, HOVER_RING_GAP, REMOVAL_EPSILON, REMOVAL_STEP};
use super::physics::Body;
use super::style::{Merge, StyleConfig, StylePatch, TextRule, resolve};
use super::types::{Color, ImageSpec, RenderDescriptor, Size, StrokeSpec, TextSpec};

/// Identity of a bubble within one chart, unique even when data ids repeat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub(crate) u64);

/// Interaction state of a bubble. `Removing` is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InteractionState {
	/// Drifting, no highlight.
	#[default]
	Idle,
	/// Pointer is over the bubble.
	Hovered,
	/// Pulsing ring after a click.
	Flashing,
	/// Shrinking away.
	Removing,
}

/// What a tick did to a bubble's lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
	/// Still in the collection.
	Alive,
	/// The removal animation finished on this tick.
	Destroyed,
}

/// One simulated bubble bound to a data item.
pub struct BubbleNode<T> {
	key: NodeKey,
	id: String,
	data: Rc<T>,
	style: StyleConfig<T>,
	pub(crate) body: Body,
	state: InteractionState,
	flash_time: u32,
	flash_alpha: f64,
	removal_progress: f64,
	destroyed: bool,
	on_removed: Option<oneshot::Sender<bool>>,
	color: Color,
	texts: Vec<TextSpec>,
	image: Option<ImageSpec>,
}

impl<T> BubbleNode<T> {
	/// Build a bubble at a random spot inside the container, drifting at the
	/// configured initial speed in a random direction.
	pub fn new(
		key: NodeKey,
		data: Rc<T>,
		style: StyleConfig<T>,
		config: &ChartConfig,
		rng: &mut impl Rng,
	) -> Self {
		let id = style.id.resolve(&data);
		let radius = resolve_radius(&style, &*data);
		let Size { width, height } = config.wrapper_size;
		let (u, v): (f64, f64) = (rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0));
		let angle = rng.gen_range(0.0..TAU);
		let mut body = Body {
			x: u * (width - radius * 4.0) + radius * 2.0,
			y: v * (height - radius * 4.0) + radius * 2.0,
			vx: angle.cos() * config.initial_speed,
			vy: angle.sin() * config.initial_speed,
			radius,
		};
		body.clamp_within(config.wrapper_size);

		let mut node = Self {
			key,
			id,
			color: style.color.resolve(&data),
			data,
			style,
			body,
			state: InteractionState::Idle,
			flash_time: 0,
			flash_alpha: 0.0,
			removal_progress: 1.0,
			destroyed: false,
			on_removed: None,
			texts: Vec::new(),
			image: None,
		};
		node.rebuild_texts(config);
		node.rebuild_image(config);
		node
	}

	/// Merge `patch` into this bubble's style and regenerate whatever it touches.
	///
	/// Text is rebuilt when a label patch is present or the radius changed; the
	/// image likewise. The color is always re-resolved.
	pub fn apply_style(&mut self, patch: StylePatch<T>, config: &ChartConfig) {
		let touches_size = patch.size.is_some();
		let touches_text = patch.main_text.is_some() || patch.sub_text.is_some();
		let touches_image = patch.image.is_some();
		self.style.merge(patch);

		let mut radius_changed = false;
		if touches_size {
			let radius = resolve_radius(&self.style, &*self.data);
			radius_changed = radius != self.body.radius;
			self.body.radius = radius;
		}
		self.color = self.style.color.resolve(&self.data);
		if touches_text || radius_changed {
			self.rebuild_texts(config);
		}
		if touches_image || radius_changed {
			self.rebuild_image(config);
		}
	}

	/// Render descriptor for the current frame.
	pub fn descriptor(&self, config: &ChartConfig) -> RenderDescriptor {
		let radius = self.body.radius;
		let mut strokes = Vec::new();

		if self.state == InteractionState::Hovered {
			let hover = &self.style.hover;
			if hover.enabled.resolve(&self.data) {
				strokes.push(StrokeSpec {
					radius: radius + HOVER_RING_GAP,
					width: hover.stroke.width.resolve(&self.data),
					color: hover.stroke.color.resolve(&self.data),
					alpha: hover.stroke.alpha.resolve(&self.data),
				});
			}
		}
		if self.state == InteractionState::Flashing {
			strokes.push(StrokeSpec {
				radius: radius + config.flash_stroke_width / 2.0,
				width: config.flash_stroke_width,
				color: self.color,
				alpha: self.flash_alpha,
			});
		}

		RenderDescriptor {
			x: self.body.x,
			y: self.body.y,
			radius,
			fill_color: self.color,
			strokes,
			texts: self.texts.clone(),
			image: self.image.clone(),
			scale: self.drawn_scale(),
		}
	}

	fn rebuild_texts(&mut self, config: &ChartConfig) {
		self.texts.clear();
		let radius = self.body.radius;
		if radius <= config.min_text_display_size {
			return;
		}
		for rule in [&self.style.main_text, &self.style.sub_text] {
			if let Some(spec) = text_spec(rule, &*self.data, radius) {
				self.texts.push(spec);
			}
		}
	}

	fn rebuild_image(&mut self, config: &ChartConfig) {
		let rule = &self.style.image;
		let data = &*self.data;
		self.image = resolve(rule.url.as_ref(), data).map(|url| {
			let radius = self.body.radius;
			let layout = &rule.layout;
			let clip = layout.clip_circular.resolve(data);
			if radius <= config.min_text_display_size {
				let size = radius * 1.2;
				ImageSpec {
					url,
					size,
					y_offset: 0.0,
					mask_radius: clip.then_some(size / 2.0),
				}
			} else {
				ImageSpec {
					url,
					size: radius * layout.relative_size.resolve(data),
					y_offset: radius * layout.y_offset.resolve(data),
					mask_radius: clip.then(|| radius * layout.mask_radius.resolve(data)),
				}
			}
		});
	}
}

pub(crate) fn resolve_radius<T>(style: &StyleConfig<T>, data: &T) -> f64 {
	let radius = style.size.resolve(data);
	if radius.is_finite() { radius.max(0.0) } else { 0.0 }
}

fn text_spec<T>(rule: &TextRule<T>, data: &T, radius: f64) -> Option<TextSpec> {
	let text = resolve(rule.text.as_ref(), data)?;
	let layout = &rule.layout;
	Some(TextSpec {
		text,
		font_size: radius * layout.relative_size.resolve(data),
		font_family: layout.font_family.resolve(data),
		fill: layout.fill.resolve(data),
		align: layout.align.resolve(data),
		y_offset: radius * layout.y_offset.resolve(data),
	})
}

impl<T> BubbleNode<T> {
	/// Chart-local identity.
	pub fn key(&self) -> NodeKey {
		self.key
	}

	/// Identifier resolved from the style at creation.
	pub fn id(&self) -> &str {
		&self.id
	}

	/// The bound data item.
	pub fn data(&self) -> &Rc<T> {
		&self.data
	}

	/// Physics state.
	pub fn body(&self) -> &Body {
		&self.body
	}

	/// Current radius.
	pub fn radius(&self) -> f64 {
		self.body.radius
	}

	/// Current interaction state.
	pub fn state(&self) -> InteractionState {
		self.state
	}

	/// Frames spent flashing since the last click.
	pub fn flash_time(&self) -> u32 {
		self.flash_time
	}

	/// Remaining scale of the removal animation, 1 until removal starts.
	pub fn removal_progress(&self) -> f64 {
		self.removal_progress
	}

	/// True once the removal animation finished.
	pub fn is_destroyed(&self) -> bool {
		self.destroyed
	}

	/// Laid-out labels; empty for small bubbles.
	pub fn texts(&self) -> &[TextSpec] {
		&self.texts
	}

	/// Laid-out image, if any.
	pub fn image(&self) -> Option<&ImageSpec> {
		self.image.as_ref()
	}

	/// True if `(x, y)` lies inside the drawn circle, hover and removal scale included.
	pub fn contains(&self, x: f64, y: f64) -> bool {
		let (dx, dy) = (x - self.body.x, y - self.body.y);
		(dx * dx + dy * dy).sqrt() < self.body.radius * self.drawn_scale()
	}

	fn drawn_scale(&self) -> f64 {
		match self.state {
			InteractionState::Removing => self.removal_progress,
			InteractionState::Hovered if self.style.hover.enabled.resolve(&self.data) => {
				self.style.hover.scale.resolve(&self.data)
			}
			_ => 1.0,
		}
	}

	/// Pointer entered. Ignored while flashing or removing.
	pub fn pointer_enter(&mut self) {
		if self.state == InteractionState::Idle {
			self.state = InteractionState::Hovered;
		}
	}

	/// Pointer left. Only clears the hover highlight.
	pub fn pointer_leave(&mut self) {
		if self.state == InteractionState::Hovered {
			self.state = InteractionState::Idle;
		}
	}

	/// Enter (or restart) the flashing state. Returns false for a removing bubble.
	///
	/// The chart is responsible for clearing any other flashing bubble first.
	pub(crate) fn start_flashing(&mut self) -> bool {
		if self.state == InteractionState::Removing {
			return false;
		}
		self.state = InteractionState::Flashing;
		self.flash_time = 0;
		self.flash_alpha = 0.0;
		true
	}

	pub(crate) fn stop_flashing(&mut self) {
		if self.state == InteractionState::Flashing {
			self.state = InteractionState::Idle;
			self.flash_alpha = 0.0;
		}
	}

	/// Stop drifting and start shrinking. `done` fires with `true` once the
	/// animation completes. Returns false if the bubble is already removing.
	pub(crate) fn start_removal(&mut self, done: Option<oneshot::Sender<bool>>) -> bool {
		if self.state == InteractionState::Removing {
			return false;
		}
		self.state = InteractionState::Removing;
		self.removal_progress = 1.0;
		self.body.vx = 0.0;
		self.body.vy = 0.0;
		self.on_removed = done;
		true
	}

	/// Advance one frame: drift and bounce, pulse the flash ring, shrink.
	pub fn tick(&mut self, config: &ChartConfig) -> TickOutcome {
		if self.destroyed {
			return TickOutcome::Destroyed;
		}
		match self.state {
			InteractionState::Removing => {
				self.removal_progress = (self.removal_progress - REMOVAL_STEP).max(0.0);
				if self.removal_progress <= REMOVAL_EPSILON {
					self.removal_progress = 0.0;
					self.destroyed = true;
					if let Some(done) = self.on_removed.take() {
						let _ = done.send(true);
					}
					return TickOutcome::Destroyed;
				}
			}
			InteractionState::Flashing => {
				self.advance(config.wrapper_size);
				self.flash_time = self.flash_time.wrapping_add(1);
				self.flash_alpha = config.flash_alpha(self.flash_time);
			}
			InteractionState::Idle | InteractionState::Hovered => {
				self.advance(config.wrapper_size);
			}
		}
		TickOutcome::Alive
	}

	/// Pull the bubble inside new container bounds.
	pub fn handle_resize(&mut self, bounds: Size) {
		self.body.clamp_within(bounds);
	}

	fn advance(&mut self, bounds: Size) {
		self.body.integrate();
		self.body.bounce_within(bounds);
	}
}
