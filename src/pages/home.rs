use leptos::prelude::*;
use leptos::task::spawn_local;
use log::info;

use crate::components::bubble_chart::{
	BubbleChart, BubbleChartCanvas, BubbleItem, ChartEvent, ChartHandle, Color, ConfigPatch,
	EventKind, HoverPatch, StylePatch, StyleValue,
};

const PALETTE: [u32; 6] = [0x4ecdc4, 0xff6b6b, 0xffd93d, 0x6a4c93, 0x1982c4, 0x8ac926];

/// Sample items with varied sizes and colors.
fn generate_sample_data(n: usize) -> Vec<BubbleItem> {
	(0..n)
		.map(|i| BubbleItem {
			size: Some(24.0 + rand_simple(i) * 40.0),
			color: Some(Color(PALETTE[i % PALETTE.len()])),
			..BubbleItem::new(format!("b{i}"), format!("Item {i}"), (rand_simple(i + 7) * 100.0).round())
		})
		.collect()
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

fn demo_chart() -> ChartHandle<BubbleItem> {
	let style = StylePatch {
		size: Some(StyleValue::derived(|d: &BubbleItem| d.size.unwrap_or(40.0))),
		color: Some(StyleValue::derived(|d: &BubbleItem| {
			d.color.unwrap_or(Color(PALETTE[0]))
		})),
		hover: Some(HoverPatch {
			scale: Some(1.1.into()),
			..HoverPatch::default()
		}),
		..StylePatch::default()
	};
	let config = ConfigPatch {
		area_ratio: Some(Some(0.4)),
		..ConfigPatch::default()
	};
	ChartHandle::new(BubbleChart::new(config, style))
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let data = RwSignal::new(generate_sample_data(30));
	let chart = demo_chart();
	let (last_click, set_last_click) = signal(String::from("Click a bubble to remove it"));

	let remover = chart.clone();
	chart.on(EventKind::BubbleClick, move |event| {
		let ChartEvent::BubbleClick { id, .. } = event else {
			return;
		};
		info!("bubble:click {id}");
		set_last_click.set(format!("Removing {id}"));
		let (removal, id) = (remover.remove_bubble(id), id.clone());
		spawn_local(async move {
			let removed = removal.await;
			info!("removal of {id} finished: {removed}");
			set_last_click.set(format!("{id} removed: {removed}"));
		});
	});
	chart.on(EventKind::CanvasClick, |event| {
		if let ChartEvent::CanvasClick { x, y } = event {
			info!("canvas:click at ({x:.0}, {y:.0})");
		}
	});

	// the boundary's children must be Send, so the Rc-based handle stays local
	let chart = StoredValue::new_local(chart);

	let on_recolor = move |_| {
		let Some(first) = data.with_untracked(|items| items.first().map(|i| i.id.clone())) else {
			return;
		};
		let patch = StylePatch {
			color: Some(Color(0xffffff).into()),
			..StylePatch::default()
		};
		chart.with_value(|chart| chart.update_bubble_style(&first, patch));
	};

	let on_remove_batch = move |_| {
		let Some(removal) = chart.try_with_value(|chart| {
			let ids: Vec<String> = chart
				.borrow()
				.bubbles()
				.iter()
				.take(3)
				.map(|b| b.id().to_owned())
				.collect();
			chart.remove_bubbles(ids)
		}) else {
			return;
		};
		spawn_local(async move {
			let removed = removal.await;
			set_last_click.set(format!("Removed {}", removed.join(", ")));
		});
	};

	let on_reset = move |_| data.set(generate_sample_data(30));

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-chart">
				<BubbleChartCanvas data=data chart=chart.get_value() fullscreen=true />
				<div class="chart-overlay">
					<h1>"Bubble Chart"</h1>
					<p class="subtitle">{last_click}</p>
					<button on:click=on_recolor>"Recolor first"</button>
					<button on:click=on_remove_batch>"Remove three"</button>
					<button on:click=on_reset>"Reset"</button>
				</div>
			</div>
		</ErrorBoundary>
	}
}
