use leptos::prelude::*;

use crate::components::diagram::{
	AnchorSpec, ConnectionSpec, DiagramCanvas, NodeSpec, SceneData, VibrationParams,
};

/// Node id, label and resting position of the built-in chain.
const NODES: &[(&str, &str, f64, f64)] = &[
	("p", "P", 40.0, 110.0),
	("a", "A", 130.0, 60.0),
	("r1", "R", 220.0, 150.0),
	("t", "T", 310.0, 60.0),
	("i", "I", 400.0, 150.0),
	("e", "E", 490.0, 60.0),
	("r2", "R", 580.0, 150.0),
];

/// `(from, to, from_anchor, to_anchor)`
const CONNECTIONS: &[(&str, &str, usize, usize)] = &[
	("p", "a", 0, 0),
	("a", "r1", 1, 0),
	("r1", "t", 1, 0),
	("t", "i", 1, 0),
	("i", "e", 1, 0),
	("e", "r2", 1, 0),
];

const ATTENTION_NODE: &str = "p";
const ATTENTION_DELAY_MS: u64 = 1000;

/// Built-in scene. The first node only has its right-hand anchor; every
/// other node has a left (0) and right (1) anchor.
fn default_scene() -> SceneData {
	let left = AnchorSpec { cx: 0.0, cy: 20.0 };
	let right = AnchorSpec { cx: 40.0, cy: 20.0 };

	let nodes = NODES
		.iter()
		.enumerate()
		.map(|(i, &(id, label, x, y))| NodeSpec {
			id: id.into(),
			label: Some(label.into()),
			transform: format!("translate({x},{y})"),
			anchors: if i == 0 {
				vec![right.clone()]
			} else {
				vec![left.clone(), right.clone()]
			},
			draggable: true,
		})
		.collect();

	let connections = CONNECTIONS
		.iter()
		.map(|&(from, to, from_anchor, to_anchor)| ConnectionSpec {
			from: from.into(),
			to: to.into(),
			from_anchor,
			to_anchor,
		})
		.collect();

	SceneData {
		nodes,
		connections,
		attention: Some(ATTENTION_NODE.into()),
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
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

			<div class="diagram-page">
				<DiagramCanvas
					data={default_scene()}
					vibration=VibrationParams::default()
					start_delay_ms=ATTENTION_DELAY_MS
				/>
				<p class="subtitle">"Drag the letters around. The lines follow."</p>
			</div>
		</ErrorBoundary>
	}
}
