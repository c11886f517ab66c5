//! Style rules whose fields are either constants or functions of the bound data.
//!
//! Every rule has a matching `*Patch` type with all fields optional. Applying a
//! patch through [`Merge`] walks the known shape recursively: nested rules are
//! merged field by field, leaves are replaced outright.

use std::fmt;
use std::rc::Rc;

use super::types::{BubbleDatum, Color, TextAlign};

/// A style field: a constant, or a function of the data item.
pub enum StyleValue<T, V> {
	/// Same value for every item.
	Constant(V),
	/// Computed from the item each time it is resolved.
	Derived(Rc<dyn Fn(&T) -> V>),
}

impl<T, V: Clone> StyleValue<T, V> {
	/// Wrap a closure as a derived value.
	pub fn derived(f: impl Fn(&T) -> V + 'static) -> Self {
		StyleValue::Derived(Rc::new(f))
	}

	/// Value for `data`. Derived values are recomputed on every call.
	pub fn resolve(&self, data: &T) -> V {
		match self {
			StyleValue::Constant(v) => v.clone(),
			StyleValue::Derived(f) => f(data),
		}
	}
}

/// Resolve an optional field. An absent field resolves to `None`.
pub fn resolve<T, V: Clone>(style: Option<&StyleValue<T, V>>, data: &T) -> Option<V> {
	style.map(|s| s.resolve(data))
}

impl<T, V> From<V> for StyleValue<T, V> {
	fn from(value: V) -> Self {
		StyleValue::Constant(value)
	}
}

impl<T, V: Clone> Clone for StyleValue<T, V> {
	fn clone(&self) -> Self {
		match self {
			StyleValue::Constant(v) => StyleValue::Constant(v.clone()),
			StyleValue::Derived(f) => StyleValue::Derived(Rc::clone(f)),
		}
	}
}

impl<T, V: PartialEq> PartialEq for StyleValue<T, V> {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(StyleValue::Constant(a), StyleValue::Constant(b)) => a == b,
			(StyleValue::Derived(a), StyleValue::Derived(b)) => Rc::ptr_eq(a, b),
			_ => false,
		}
	}
}

impl<T, V: fmt::Debug> fmt::Debug for StyleValue<T, V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			StyleValue::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
			StyleValue::Derived(_) => f.write_str("Derived(..)"),
		}
	}
}

/// Structural merge of a partial override into a configuration shape.
pub trait Merge {
	/// The partial override.
	type Patch;

	/// Apply `patch` in place.
	fn merge(&mut self, patch: Self::Patch);

	/// Copy of `self` with `patch` applied.
	fn merged(&self, patch: Self::Patch) -> Self
	where
		Self: Clone,
	{
		let mut out = self.clone();
		out.merge(patch);
		out
	}
}

pub(crate) fn replace<V>(slot: &mut V, value: Option<V>) {
	if let Some(value) = value {
		*slot = value;
	}
}

pub(crate) fn merge_nested<M: Merge>(slot: &mut M, patch: Option<M::Patch>) {
	if let Some(patch) = patch {
		slot.merge(patch);
	}
}

/// Appearance rules for one kind of bubble.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleConfig<T> {
	/// Bubble identifier, resolved once at creation.
	pub id: StyleValue<T, String>,
	/// Radius.
	pub size: StyleValue<T, f64>,
	/// Body and flash ring color.
	pub color: StyleValue<T, Color>,
	/// Optional image.
	pub image: ImageRule<T>,
	/// Main label.
	pub main_text: TextRule<T>,
	/// Secondary label.
	pub sub_text: TextRule<T>,
	/// Hover highlight.
	pub hover: HoverRule<T>,
}

impl<T: BubbleDatum> Default for StyleConfig<T> {
	fn default() -> Self {
		Self {
			id: StyleValue::derived(|d: &T| d.id()),
			size: 40.0.into(),
			color: Color(0x4ecdc4).into(),
			image: ImageRule {
				url: None,
				layout: ImageLayout {
					relative_size: 0.4.into(),
					y_offset: (-0.5).into(),
					mask_radius: 0.18.into(),
					clip_circular: false.into(),
				},
			},
			main_text: TextRule {
				text: Some(StyleValue::derived(|d: &T| d.label())),
				layout: TextLayout {
					relative_size: 0.5.into(),
					y_offset: 0.0.into(),
					..TextLayout::default()
				},
			},
			sub_text: TextRule {
				text: Some(StyleValue::derived(|d: &T| d.value_label())),
				layout: TextLayout {
					relative_size: 0.3.into(),
					y_offset: 0.5.into(),
					..TextLayout::default()
				},
			},
			hover: HoverRule {
				enabled: true.into(),
				stroke: StrokeRule {
					width: 3.0.into(),
					color: Color::WHITE.into(),
					alpha: 0.8.into(),
				},
				scale: 1.0.into(),
			},
		}
	}
}

/// Partial override for [`StyleConfig`].
#[derive(Clone, Debug, PartialEq)]
pub struct StylePatch<T> {
	/// Replaces the id rule.
	pub id: Option<StyleValue<T, String>>,
	/// Replaces the size rule.
	pub size: Option<StyleValue<T, f64>>,
	/// Replaces the color rule.
	pub color: Option<StyleValue<T, Color>>,
	/// Merged into the image rule.
	pub image: Option<ImagePatch<T>>,
	/// Merged into the main label rule.
	pub main_text: Option<TextPatch<T>>,
	/// Merged into the secondary label rule.
	pub sub_text: Option<TextPatch<T>>,
	/// Merged into the hover rule.
	pub hover: Option<HoverPatch<T>>,
}

impl<T> Default for StylePatch<T> {
	fn default() -> Self {
		Self {
			id: None,
			size: None,
			color: None,
			image: None,
			main_text: None,
			sub_text: None,
			hover: None,
		}
	}
}

impl<T> StylePatch<T> {
	/// True when no top-level field is set.
	pub fn is_empty(&self) -> bool {
		self.id.is_none()
			&& self.size.is_none()
			&& self.color.is_none()
			&& self.image.is_none()
			&& self.main_text.is_none()
			&& self.sub_text.is_none()
			&& self.hover.is_none()
	}
}

impl<T> Merge for StyleConfig<T> {
	type Patch = StylePatch<T>;

	fn merge(&mut self, patch: StylePatch<T>) {
		replace(&mut self.id, patch.id);
		replace(&mut self.size, patch.size);
		replace(&mut self.color, patch.color);
		merge_nested(&mut self.image, patch.image);
		merge_nested(&mut self.main_text, patch.main_text);
		merge_nested(&mut self.sub_text, patch.sub_text);
		merge_nested(&mut self.hover, patch.hover);
	}
}

/// Image shown inside the bubble. No image is drawn while `url` is `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageRule<T> {
	/// Image source.
	pub url: Option<StyleValue<T, String>>,
	/// Placement relative to the radius.
	pub layout: ImageLayout<T>,
}

/// Image placement, in multiples of the bubble radius.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageLayout<T> {
	/// Edge length.
	pub relative_size: StyleValue<T, f64>,
	/// Vertical offset of the image center.
	pub y_offset: StyleValue<T, f64>,
	/// Circular mask radius.
	pub mask_radius: StyleValue<T, f64>,
	/// Whether to clip the image to a circle.
	pub clip_circular: StyleValue<T, bool>,
}

/// Partial override for [`ImageRule`].
#[derive(Clone, Debug, PartialEq)]
pub struct ImagePatch<T> {
	/// `Some(None)` removes the image.
	pub url: Option<Option<StyleValue<T, String>>>,
	/// Merged into the layout.
	pub layout: Option<ImageLayoutPatch<T>>,
}

impl<T> Default for ImagePatch<T> {
	fn default() -> Self {
		Self {
			url: None,
			layout: None,
		}
	}
}

impl<T> Merge for ImageRule<T> {
	type Patch = ImagePatch<T>;

	fn merge(&mut self, patch: ImagePatch<T>) {
		replace(&mut self.url, patch.url);
		merge_nested(&mut self.layout, patch.layout);
	}
}

/// Partial override for [`ImageLayout`].
#[derive(Clone, Debug, PartialEq)]
pub struct ImageLayoutPatch<T> {
	/// Replaces the edge length.
	pub relative_size: Option<StyleValue<T, f64>>,
	/// Replaces the vertical offset.
	pub y_offset: Option<StyleValue<T, f64>>,
	/// Replaces the mask radius.
	pub mask_radius: Option<StyleValue<T, f64>>,
	/// Replaces the clip flag.
	pub clip_circular: Option<StyleValue<T, bool>>,
}

impl<T> Default for ImageLayoutPatch<T> {
	fn default() -> Self {
		Self {
			relative_size: None,
			y_offset: None,
			mask_radius: None,
			clip_circular: None,
		}
	}
}

impl<T> Merge for ImageLayout<T> {
	type Patch = ImageLayoutPatch<T>;

	fn merge(&mut self, patch: ImageLayoutPatch<T>) {
		replace(&mut self.relative_size, patch.relative_size);
		replace(&mut self.y_offset, patch.y_offset);
		replace(&mut self.mask_radius, patch.mask_radius);
		replace(&mut self.clip_circular, patch.clip_circular);
	}
}

/// A label inside the bubble. Nothing is drawn while `text` is `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRule<T> {
	/// Label contents.
	pub text: Option<StyleValue<T, String>>,
	/// Font and placement.
	pub layout: TextLayout<T>,
}

/// Label font and placement; sizes are multiples of the bubble radius.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLayout<T> {
	/// Font size.
	pub relative_size: StyleValue<T, f64>,
	/// Vertical offset of the baseline center.
	pub y_offset: StyleValue<T, f64>,
	/// Text color.
	pub fill: StyleValue<T, Color>,
	/// Horizontal alignment.
	pub align: StyleValue<T, TextAlign>,
	/// Font family.
	pub font_family: StyleValue<T, String>,
}

impl<T> Default for TextLayout<T> {
	fn default() -> Self {
		Self {
			relative_size: 0.5.into(),
			y_offset: 0.0.into(),
			fill: Color::WHITE.into(),
			align: TextAlign::Center.into(),
			font_family: String::from("Arial").into(),
		}
	}
}

/// Partial override for [`TextRule`].
#[derive(Clone, Debug, PartialEq)]
pub struct TextPatch<T> {
	/// `Some(None)` hides the label.
	pub text: Option<Option<StyleValue<T, String>>>,
	/// Merged into the layout.
	pub layout: Option<TextLayoutPatch<T>>,
}

impl<T> Default for TextPatch<T> {
	fn default() -> Self {
		Self {
			text: None,
			layout: None,
		}
	}
}

impl<T> Merge for TextRule<T> {
	type Patch = TextPatch<T>;

	fn merge(&mut self, patch: TextPatch<T>) {
		replace(&mut self.text, patch.text);
		merge_nested(&mut self.layout, patch.layout);
	}
}

/// Partial override for [`TextLayout`].
#[derive(Clone, Debug, PartialEq)]
pub struct TextLayoutPatch<T> {
	/// Replaces the font size.
	pub relative_size: Option<StyleValue<T, f64>>,
	/// Replaces the vertical offset.
	pub y_offset: Option<StyleValue<T, f64>>,
	/// Replaces the color.
	pub fill: Option<StyleValue<T, Color>>,
	/// Replaces the alignment.
	pub align: Option<StyleValue<T, TextAlign>>,
	/// Replaces the font family.
	pub font_family: Option<StyleValue<T, String>>,
}

impl<T> Default for TextLayoutPatch<T> {
	fn default() -> Self {
		Self {
			relative_size: None,
			y_offset: None,
			fill: None,
			align: None,
			font_family: None,
		}
	}
}

impl<T> Merge for TextLayout<T> {
	type Patch = TextLayoutPatch<T>;

	fn merge(&mut self, patch: TextLayoutPatch<T>) {
		replace(&mut self.relative_size, patch.relative_size);
		replace(&mut self.y_offset, patch.y_offset);
		replace(&mut self.fill, patch.fill);
		replace(&mut self.align, patch.align);
		replace(&mut self.font_family, patch.font_family);
	}
}

/// Highlight drawn while the pointer is over a bubble.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverRule<T> {
	/// Whether hovering changes the look at all.
	pub enabled: StyleValue<T, bool>,
	/// Ring drawn just outside the body.
	pub stroke: StrokeRule<T>,
	/// Scale applied while hovered.
	pub scale: StyleValue<T, f64>,
}

/// A stroked ring.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeRule<T> {
	/// Line width.
	pub width: StyleValue<T, f64>,
	/// Line color.
	pub color: StyleValue<T, Color>,
	/// Line alpha.
	pub alpha: StyleValue<T, f64>,
}

/// Partial override for [`HoverRule`].
#[derive(Clone, Debug, PartialEq)]
pub struct HoverPatch<T> {
	/// Replaces the enabled flag.
	pub enabled: Option<StyleValue<T, bool>>,
	/// Merged into the ring.
	pub stroke: Option<StrokePatch<T>>,
	/// Replaces the scale.
	pub scale: Option<StyleValue<T, f64>>,
}

impl<T> Default for HoverPatch<T> {
	fn default() -> Self {
		Self {
			enabled: None,
			stroke: None,
			scale: None,
		}
	}
}

impl<T> Merge for HoverRule<T> {
	type Patch = HoverPatch<T>;

	fn merge(&mut self, patch: HoverPatch<T>) {
		replace(&mut self.enabled, patch.enabled);
		merge_nested(&mut self.stroke, patch.stroke);
		replace(&mut self.scale, patch.scale);
	}
}

/// Partial override for [`StrokeRule`].
#[derive(Clone, Debug, PartialEq)]
pub struct StrokePatch<T> {
	/// Replaces the width.
	pub width: Option<StyleValue<T, f64>>,
	/// Replaces the color.
	pub color: Option<StyleValue<T, Color>>,
	/// Replaces the alpha.
	pub alpha: Option<StyleValue<T, f64>>,
}

impl<T> Default for StrokePatch<T> {
	fn default() -> Self {
		Self {
			width: None,
			color: None,
			alpha: None,
		}
	}
}

impl<T> Merge for StrokeRule<T> {
	type Patch = StrokePatch<T>;

	fn merge(&mut self, patch: StrokePatch<T>) {
		replace(&mut self.width, patch.width);
		replace(&mut self.color, patch.color);
		replace(&mut self.alpha, patch.alpha);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::bubble_chart::types::BubbleItem;

	fn item(name: &str) -> BubbleItem {
		BubbleItem::new("a", name, 3.0)
	}

	#[test]
	fn constant_resolves_to_itself_for_any_data() {
		let style: StyleValue<BubbleItem, f64> = 5.0.into();
		assert_eq!(style.resolve(&item("x")), 5.0);
		assert_eq!(style.resolve(&item("y")), 5.0);
	}

	#[test]
	fn derived_reads_the_data() {
		let style = StyleValue::derived(|d: &BubbleItem| d.name.clone());
		assert_eq!(style.resolve(&item("x")), "x");
	}

	#[test]
	fn absent_field_resolves_to_none() {
		let style: Option<StyleValue<BubbleItem, String>> = None;
		assert_eq!(resolve(style.as_ref(), &item("x")), None);
	}

	#[test]
	fn merging_empty_patch_is_identity() {
		let base = StyleConfig::<BubbleItem>::default();
		let merged = base.merged(StylePatch::default());
		assert!(merged == base);
	}

	#[test]
	fn nested_merge_keeps_untouched_siblings() {
		let base = StyleConfig::<BubbleItem>::default();
		let merged = base.merged(StylePatch {
			hover: Some(HoverPatch {
				stroke: Some(StrokePatch {
					width: Some(6.0.into()),
					..StrokePatch::default()
				}),
				..HoverPatch::default()
			}),
			..StylePatch::default()
		});
		let data = item("x");
		assert_eq!(merged.hover.stroke.width.resolve(&data), 6.0);
		assert_eq!(merged.hover.stroke.alpha.resolve(&data), 0.8);
		assert_eq!(merged.hover.stroke.color.resolve(&data), Color::WHITE);
		assert!(merged.hover.enabled.resolve(&data));
	}

	#[test]
	fn leaf_override_replaces_function_with_constant() {
		let base = StyleConfig::<BubbleItem>::default();
		let merged = base.merged(StylePatch {
			main_text: Some(TextPatch {
				text: Some(Some(String::from("fixed").into())),
				..TextPatch::default()
			}),
			..StylePatch::default()
		});
		let text = resolve(merged.main_text.text.as_ref(), &item("x"));
		assert_eq!(text.as_deref(), Some("fixed"));
	}

	#[test]
	fn nullable_leaf_can_be_cleared() {
		let base = StyleConfig::<BubbleItem>::default();
		let merged = base.merged(StylePatch {
			sub_text: Some(TextPatch {
				text: Some(None),
				..TextPatch::default()
			}),
			..StylePatch::default()
		});
		assert!(merged.sub_text.text.is_none());
		assert!(merged.main_text.text.is_some());
	}

	#[test]
	fn patch_emptiness_is_top_level() {
		assert!(StylePatch::<BubbleItem>::default().is_empty());
		let patch = StylePatch::<BubbleItem> {
			image: Some(ImagePatch::default()),
			..StylePatch::default()
		};
		assert!(!patch.is_empty());
	}
}
