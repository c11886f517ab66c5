use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlImageElement;

use super::error::ChartError;

enum ImageSlot {
	Loading(HtmlImageElement),
	Ready(HtmlImageElement),
	Failed,
}

/// Bubble images keyed by URL. Loads start on first request; a failed load is
/// logged once and the URL is never retried.
#[derive(Clone, Default)]
pub struct ImageCache {
	slots: Rc<RefCell<HashMap<String, ImageSlot>>>,
}

impl ImageCache {
	/// The image for `url` if it finished loading.
	pub fn get(&self, url: &str) -> Option<HtmlImageElement> {
		let mut slots = self.slots.borrow_mut();
		match slots.get(url) {
			Some(ImageSlot::Ready(image)) => return Some(image.clone()),
			Some(ImageSlot::Loading(_) | ImageSlot::Failed) => return None,
			None => {}
		}
		let slot = match self.load(url) {
			Ok(image) => ImageSlot::Loading(image),
			Err(err) => {
				error!("{err}");
				ImageSlot::Failed
			}
		};
		slots.insert(url.to_owned(), slot);
		None
	}

	fn load(&self, url: &str) -> Result<HtmlImageElement, ChartError> {
		let image = HtmlImageElement::new().map_err(|_| ChartError::ImageLoad {
			url: url.to_owned(),
		})?;

		let (slots, key) = (self.slots.clone(), url.to_owned());
		let onload = Closure::once_into_js(move || {
			let mut slots = slots.borrow_mut();
			if let Some(slot) = slots.get_mut(&key) {
				let ready = match slot {
					ImageSlot::Loading(image) => Some(image.clone()),
					_ => None,
				};
				if let Some(image) = ready {
					*slot = ImageSlot::Ready(image);
				}
			}
		});

		let (slots, key) = (self.slots.clone(), url.to_owned());
		let onerror = Closure::once_into_js(move || {
			error!("{}", ChartError::ImageLoad { url: key.clone() });
			slots.borrow_mut().insert(key, ImageSlot::Failed);
		});

		image.set_onload(Some(onload.unchecked_ref::<js_sys::Function>()));
		image.set_onerror(Some(onerror.unchecked_ref::<js_sys::Function>()));
		image.set_src(url);
		Ok(image)
	}
}
