use std::collections::HashMap;

use log::{debug, info};

use super::animation::{AttentionAnimator, FrameStep, VibrationParams};
use super::error::SceneError;
use super::geometry::{Point, parse_translate, resolve_anchor};
use super::pointer::PointerKind;
use super::types::{AnchorSpec, SceneData};

#[derive(Clone, Debug)]
pub struct Node {
	pub id: String,
	pub label: Option<String>,
	pub translation: Point,
	pub anchors: Vec<AnchorSpec>,
	pub draggable: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnchorRef {
	pub node: usize,
	pub anchor: usize,
}

#[derive(Clone, Debug)]
pub struct Connection {
	/// Element id of the rendered line, `line-{from}{to}`.
	pub line_id: String,
	pub from: AnchorRef,
	pub to: AnchorRef,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LineSegment {
	pub from: Point,
	pub to: Point,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DragSession {
	#[default]
	Idle,
	Dragging {
		node: usize,
		/// Pointer position minus node translation at drag start.
		offset: Point,
		kind: PointerKind,
	},
}

/// Diagram controller context: node positions, the static connection list,
/// the line endpoints derived from them, and transient interaction state.
#[derive(Clone, Debug)]
pub struct DiagramState {
	nodes: Vec<Node>,
	connections: Vec<Connection>,
	lines: Vec<LineSegment>,
	drag: DragSession,
	attention: Option<AttentionAnimator>,
}

impl DiagramState {
	pub fn new(data: &SceneData, vibration: VibrationParams) -> Result<Self, SceneError> {
		let mut id_to_idx = HashMap::new();
		let mut nodes = Vec::with_capacity(data.nodes.len());

		for spec in &data.nodes {
			if id_to_idx.insert(spec.id.clone(), nodes.len()).is_some() {
				return Err(SceneError::DuplicateNode(spec.id.clone()));
			}
			nodes.push(Node {
				id: spec.id.clone(),
				label: spec.label.clone(),
				translation: parse_translate(&spec.transform),
				anchors: spec.anchors.clone(),
				draggable: spec.draggable,
			});
		}

		let mut connections: Vec<Connection> = Vec::with_capacity(data.connections.len());
		for link in &data.connections {
			let lookup = |id: &String| {
				id_to_idx
					.get(id)
					.copied()
					.ok_or_else(|| SceneError::UnknownNode {
						connection: format!("{}-{}", link.from, link.to),
						id: id.clone(),
					})
			};
			let line_id = format!("line-{}{}", link.from, link.to);
			if connections.iter().any(|c| c.line_id == line_id) {
				return Err(SceneError::DuplicateLine(line_id));
			}
			connections.push(Connection {
				line_id,
				from: AnchorRef {
					node: lookup(&link.from)?,
					anchor: link.from_anchor,
				},
				to: AnchorRef {
					node: lookup(&link.to)?,
					anchor: link.to_anchor,
				},
			});
		}

		let attention = match &data.attention {
			Some(id) => {
				let idx = id_to_idx
					.get(id)
					.copied()
					.ok_or_else(|| SceneError::UnknownAttentionNode(id.clone()))?;
				Some(AttentionAnimator::new(idx, vibration))
			}
			None => None,
		};

		let mut state = Self {
			lines: vec![LineSegment::default(); connections.len()],
			nodes,
			connections,
			drag: DragSession::Idle,
			attention,
		};
		state.sync_all_lines();
		Ok(state)
	}

	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	pub fn connections(&self) -> &[Connection] {
		&self.connections
	}

	/// Rendered endpoints, parallel to [`Self::connections`].
	pub fn lines(&self) -> &[LineSegment] {
		&self.lines
	}

	pub fn drag(&self) -> DragSession {
		self.drag
	}

	pub fn node_index(&self, id: &str) -> Option<usize> {
		self.nodes.iter().position(|n| n.id == id)
	}

	pub fn translation(&self, idx: usize) -> Option<Point> {
		self.nodes.get(idx).map(|n| n.translation)
	}

	pub fn anchor_position(&self, anchor: AnchorRef) -> Option<Point> {
		let node = self.nodes.get(anchor.node)?;
		Some(resolve_anchor(node.translation, &node.anchors, anchor.anchor))
	}

	/// Moves a node and re-derives every line. The only way node positions
	/// change, so lines can never lag behind.
	pub fn set_node_position(&mut self, idx: usize, position: Point) -> bool {
		let Some(node) = self.nodes.get_mut(idx) else {
			return false;
		};
		node.translation = position;
		self.sync_all_lines();
		true
	}

	pub fn sync_all_lines(&mut self) {
		for i in 0..self.connections.len() {
			let conn = &self.connections[i];
			let segment = LineSegment {
				from: self.anchor_position(conn.from).unwrap_or_default(),
				to: self.anchor_position(conn.to).unwrap_or_default(),
			};
			self.lines[i] = segment;
		}
	}

	/// Starts (or takes over) the drag session for `node_id`. `pointer` is in
	/// diagram-local coordinates.
	pub fn begin_drag(&mut self, node_id: &str, pointer: Point, kind: PointerKind) -> bool {
		let Some(idx) = self.node_index(node_id) else {
			return false;
		};
		let node = &self.nodes[idx];
		if !node.draggable {
			return false;
		}
		let offset = pointer - node.translation;

		if let Some(anim) = self.attention.as_mut() {
			if anim.node == idx && anim.is_running() && anim.cancel() {
				info!("Attention animation on `{node_id}` cancelled by drag");
			}
		}

		debug!("Drag start on `{node_id}` ({kind:?})");
		self.drag = DragSession::Dragging {
			node: idx,
			offset,
			kind,
		};
		true
	}

	pub fn drag_to(&mut self, pointer: Point) -> bool {
		let DragSession::Dragging { node, offset, .. } = self.drag else {
			return false;
		};
		self.set_node_position(node, pointer - offset)
	}

	/// Returns the kind of the session that ended, if one was active.
	pub fn end_drag(&mut self) -> Option<PointerKind> {
		match std::mem::take(&mut self.drag) {
			DragSession::Dragging { node, kind, .. } => {
				debug!("Drag end on `{}`", self.nodes[node].id);
				Some(kind)
			}
			DragSession::Idle => None,
		}
	}

	/// Drops all transient state when the canvas goes away: ends any drag and
	/// stops the attention animation. Returns the kind of the ended drag.
	pub fn detach(&mut self) -> Option<PointerKind> {
		if let Some(anim) = self.attention.as_mut() {
			anim.cancel();
		}
		self.end_drag()
	}

	/// Moves the attention animation from pending to running, recording the
	/// node's current position as the rest position. Skipped when the node is
	/// being dragged.
	pub fn start_attention(&mut self) -> bool {
		let drag = self.drag;
		let Some(anim) = self.attention.as_mut() else {
			return false;
		};
		let idx = anim.node;
		let id = &self.nodes[idx].id;
		if matches!(drag, DragSession::Dragging { node, .. } if node == idx) {
			anim.cancel();
			info!("Attention animation on `{id}` skipped, node is being dragged");
			return false;
		}
		let started = anim.start(self.nodes[idx].translation);
		if started {
			info!("Attention animation started on `{id}`");
		}
		started
	}

	/// Applies one animation frame. Returns whether another frame is wanted.
	pub fn attention_frame(&mut self, timestamp_ms: f64) -> bool {
		let Some(anim) = self.attention.as_mut() else {
			return false;
		};
		let idx = anim.node;
		match anim.step(timestamp_ms) {
			FrameStep::Move(p) => self.set_node_position(idx, p),
			FrameStep::Finish(p) => {
				self.set_node_position(idx, p);
				info!("Attention animation finished on `{}`", self.nodes[idx].id);
				false
			}
			FrameStep::Idle => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::super::animation::AttentionPhase;
	use super::super::types::{ConnectionSpec, NodeSpec};
	use super::*;

	fn node(id: &str, transform: &str, anchors: &[(f64, f64)]) -> NodeSpec {
		NodeSpec {
			id: id.into(),
			label: None,
			transform: transform.into(),
			anchors: anchors
				.iter()
				.map(|&(cx, cy)| AnchorSpec { cx, cy })
				.collect(),
			draggable: true,
		}
	}

	fn link(from: &str, to: &str, from_anchor: usize, to_anchor: usize) -> ConnectionSpec {
		ConnectionSpec {
			from: from.into(),
			to: to.into(),
			from_anchor,
			to_anchor,
		}
	}

	fn pa_scene() -> SceneData {
		SceneData {
			nodes: vec![
				node("p", "translate(0,0)", &[(10.0, 10.0)]),
				node("a", "translate(50,0)", &[(0.0, 10.0), (40.0, 10.0)]),
				node("r", "translate(120,0)", &[(0.0, 10.0)]),
			],
			connections: vec![link("p", "a", 0, 0), link("a", "r", 1, 0)],
			attention: Some("p".into()),
		}
	}

	fn build(data: &SceneData) -> DiagramState {
		DiagramState::new(data, VibrationParams::default()).unwrap()
	}

	#[test]
	fn lines_are_synced_on_construction() {
		let state = build(&pa_scene());
		assert_eq!(
			state.lines()[0],
			LineSegment {
				from: Point::new(10.0, 10.0),
				to: Point::new(50.0, 10.0),
			}
		);
		assert_eq!(
			state.lines()[1],
			LineSegment {
				from: Point::new(90.0, 10.0),
				to: Point::new(120.0, 10.0),
			}
		);
		assert_eq!(state.connections()[0].line_id, "line-pa");
	}

	#[test]
	fn anchor_position_matches_translation_plus_offset() {
		let state = build(&pa_scene());
		let a = state.node_index("a").unwrap();
		assert_eq!(
			state.anchor_position(AnchorRef { node: a, anchor: 1 }),
			Some(Point::new(90.0, 10.0))
		);
		assert_eq!(
			state.anchor_position(AnchorRef { node: a, anchor: 9 }),
			state.anchor_position(AnchorRef { node: a, anchor: 0 })
		);
	}

	#[test]
	fn malformed_transform_places_node_at_origin() {
		let mut data = pa_scene();
		data.nodes[1].transform = "matrix(1 0 0 1 5 5)".into();
		let state = build(&data);
		assert_eq!(state.translation(1), Some(Point::ZERO));
		assert_eq!(state.lines()[0].to, Point::new(0.0, 10.0));
	}

	#[test]
	fn sync_is_idempotent() {
		let mut state = build(&pa_scene());
		state.set_node_position(1, Point::new(33.3, -7.1));
		let first = state.lines().to_vec();
		state.sync_all_lines();
		assert_eq!(state.lines(), first.as_slice());
	}

	#[test]
	fn set_node_position_updates_touching_lines() {
		let mut state = build(&pa_scene());
		assert!(state.set_node_position(1, Point::new(60.0, 20.0)));
		assert_eq!(state.lines()[0].from, Point::new(10.0, 10.0));
		assert_eq!(state.lines()[0].to, Point::new(60.0, 30.0));
		assert_eq!(state.lines()[1].from, Point::new(100.0, 30.0));
		assert!(!state.set_node_position(99, Point::ZERO));
	}

	#[test]
	fn drag_moves_node_by_pointer_delta() {
		let mut state = build(&pa_scene());
		let grab = Point::new(55.0, 8.0);
		assert!(state.begin_drag("a", grab, PointerKind::Mouse));
		assert!(state.drag_to(grab.offset(20.0, 5.0)));

		assert_eq!(state.translation(1), Some(Point::new(70.0, 5.0)));
		assert_eq!(state.lines()[0].to, Point::new(70.0, 15.0));
		assert_eq!(state.lines()[1].from, Point::new(110.0, 15.0));
	}

	#[test]
	fn drag_end_keeps_last_position() {
		let mut state = build(&pa_scene());
		state.begin_drag("r", Point::new(125.0, 5.0), PointerKind::Touch);
		state.drag_to(Point::new(130.0, 10.0));
		state.drag_to(Point::new(200.0, 90.0));
		assert_eq!(state.end_drag(), Some(PointerKind::Touch));

		assert_eq!(state.drag(), DragSession::Idle);
		assert_eq!(state.translation(2), Some(Point::new(195.0, 85.0)));
		assert_eq!(state.lines()[1].to, Point::new(195.0, 95.0));
		assert!(!state.drag_to(Point::new(0.0, 0.0)));
		assert_eq!(state.translation(2), Some(Point::new(195.0, 85.0)));
		assert_eq!(state.end_drag(), None);
	}

	#[test]
	fn new_drag_start_takes_over_session() {
		let mut state = build(&pa_scene());
		state.begin_drag("a", Point::new(50.0, 0.0), PointerKind::Mouse);
		state.begin_drag("r", Point::new(120.0, 0.0), PointerKind::Touch);
		state.drag_to(Point::new(130.0, 0.0));

		assert_eq!(state.translation(1), Some(Point::new(50.0, 0.0)));
		assert_eq!(state.translation(2), Some(Point::new(130.0, 0.0)));
		assert!(matches!(
			state.drag(),
			DragSession::Dragging {
				node: 2,
				kind: PointerKind::Touch,
				..
			}
		));
	}

	#[test]
	fn non_draggable_and_unknown_nodes_do_not_start_drag() {
		let mut data = pa_scene();
		data.nodes[2].draggable = false;
		let mut state = build(&data);
		assert!(!state.begin_drag("r", Point::ZERO, PointerKind::Mouse));
		assert!(!state.begin_drag("zzz", Point::ZERO, PointerKind::Mouse));
		assert_eq!(state.drag(), DragSession::Idle);
	}

	#[test]
	fn rejects_bad_configuration() {
		let mut dup = pa_scene();
		dup.nodes.push(node("a", "translate(0,0)", &[]));
		assert_eq!(
			DiagramState::new(&dup, VibrationParams::default()).unwrap_err(),
			SceneError::DuplicateNode("a".into())
		);

		let mut unknown = pa_scene();
		unknown.connections.push(link("a", "ghost", 0, 0));
		assert_eq!(
			DiagramState::new(&unknown, VibrationParams::default()).unwrap_err(),
			SceneError::UnknownNode {
				connection: "a-ghost".into(),
				id: "ghost".into(),
			}
		);

		let mut target = pa_scene();
		target.attention = Some("ghost".into());
		assert_eq!(
			DiagramState::new(&target, VibrationParams::default()).unwrap_err(),
			SceneError::UnknownAttentionNode("ghost".into())
		);
	}

	#[test]
	fn rejects_colliding_line_ids() {
		let mut data = pa_scene();
		data.nodes.push(node("ab", "translate(0,0)", &[(0.0, 0.0)]));
		data.nodes.push(node("bc", "translate(0,0)", &[(0.0, 0.0)]));
		data.nodes.push(node("c", "translate(0,0)", &[(0.0, 0.0)]));
		data.connections.push(link("a", "bc", 0, 0));
		data.connections.push(link("ab", "c", 0, 0));
		assert_eq!(
			DiagramState::new(&data, VibrationParams::default()).unwrap_err(),
			SceneError::DuplicateLine("line-abc".into())
		);
	}

	#[test]
	fn detach_ends_drag_and_stops_attention() {
		let mut state = build(&pa_scene());
		state.start_attention();
		state.attention_frame(0.0);
		state.begin_drag("a", Point::new(50.0, 0.0), PointerKind::Touch);

		assert_eq!(state.detach(), Some(PointerKind::Touch));
		assert_eq!(state.drag(), DragSession::Idle);
		assert!(!state.attention_frame(16.0));
		assert!(!state.start_attention());
		assert_eq!(state.detach(), None);
	}

	#[test]
	fn attention_runs_and_returns_to_origin() {
		let mut state = build(&pa_scene());
		assert!(!state.attention_frame(0.0));
		assert!(state.start_attention());
		assert!(!state.start_attention());

		assert!(state.attention_frame(500.0));
		assert_eq!(state.translation(0), Some(Point::ZERO));
		assert!(state.attention_frame(550.0));
		let moved = state.translation(0).unwrap();
		assert_eq!(moved.x, 0.0);
		assert_ne!(moved.y, 0.0);
		assert_eq!(state.lines()[0].from, Point::new(10.0, 10.0 + moved.y));

		assert!(!state.attention_frame(1100.0));
		assert_eq!(state.translation(0), Some(Point::ZERO));
		assert_eq!(state.lines()[0].from, Point::new(10.0, 10.0));
		assert_eq!(
			state.attention.as_ref().map(AttentionAnimator::phase),
			Some(AttentionPhase::Done)
		);
	}

	#[test]
	fn dragging_animated_node_cancels_attention() {
		let mut state = build(&pa_scene());
		state.start_attention();
		state.attention_frame(0.0);
		state.begin_drag("p", Point::new(2.0, 2.0), PointerKind::Mouse);
		state.drag_to(Point::new(12.0, 32.0));

		assert!(!state.attention_frame(16.0));
		assert_eq!(state.translation(0), Some(Point::new(10.0, 30.0)));
	}

	#[test]
	fn dragging_other_node_leaves_attention_running() {
		let mut state = build(&pa_scene());
		state.start_attention();
		state.begin_drag("a", Point::new(50.0, 0.0), PointerKind::Mouse);
		assert!(state.attention_frame(0.0));
		assert!(state.attention.as_ref().unwrap().is_running());
	}

	#[test]
	fn attention_skipped_while_target_is_dragged() {
		let mut state = build(&pa_scene());
		state.begin_drag("p", Point::ZERO, PointerKind::Touch);
		assert!(!state.start_attention());
		assert!(!state.attention_frame(0.0));
	}

	#[test]
	fn attention_origin_is_recorded_at_start() {
		let mut state = build(&pa_scene());
		state.set_node_position(0, Point::new(40.0, 40.0));
		state.start_attention();
		state.attention_frame(0.0);
		state.attention_frame(100.0);
		state.attention_frame(700.0);
		assert_eq!(state.translation(0), Some(Point::new(40.0, 40.0)));
	}
}
