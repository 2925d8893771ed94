use leptos::prelude::*;

use super::geometry::format_translate;
use super::state::{DiagramState, LineSegment};

pub const NODE_SIZE: f64 = 40.0;
const ANCHOR_RADIUS: f64 = 3.0;

/// Node group: body, label and anchor markers, positioned by its translation.
pub fn node_view(state: RwSignal<DiagramState>, idx: usize) -> impl IntoView {
	let (id, label, anchors, draggable) = state.with_untracked(|s| {
		let node = &s.nodes()[idx];
		(
			node.id.clone(),
			node.label.clone().unwrap_or_default(),
			node.anchors.clone(),
			node.draggable,
		)
	});
	let transform = move || {
		state.with(|s| {
			s.translation(idx)
				.map(format_translate)
				.unwrap_or_default()
		})
	};
	let half = (NODE_SIZE / 2.0).to_string();
	let class = if draggable { "node draggable" } else { "node" };

	view! {
		<g id=id class=class transform=transform>
			<rect
				class="node-body"
				width={NODE_SIZE.to_string()}
				height={NODE_SIZE.to_string()}
				rx="6"
			/>
			<text class="node-label" x={half.clone()} y=half>
				{label}
			</text>
			{anchors
				.into_iter()
				.map(|a| {
					view! {
						<circle
							class="anchor"
							cx={a.cx.to_string()}
							cy={a.cy.to_string()}
							r={ANCHOR_RADIUS.to_string()}
						/>
					}
				})
				.collect_view()}
		</g>
	}
}

/// Connector line bound to the synchronized endpoints of connection `idx`.
pub fn line_view(state: RwSignal<DiagramState>, idx: usize) -> impl IntoView {
	let id = state.with_untracked(|s| s.connections()[idx].line_id.clone());
	let coord = move |pick: fn(&LineSegment) -> f64| {
		move || {
			state.with(|s| {
				s.lines()
					.get(idx)
					.map(pick)
					.unwrap_or_default()
					.to_string()
			})
		}
	};

	view! {
		<line
			id=id
			class="connector"
			x1={coord(|l| l.from.x)}
			y1={coord(|l| l.from.y)}
			x2={coord(|l| l.to.x)}
			y2={coord(|l| l.to.y)}
		/>
	}
}
