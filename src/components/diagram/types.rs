/// Local attachment point on a node, relative to the node's origin.
#[derive(Clone, Debug, PartialEq)]
pub struct AnchorSpec {
	pub cx: f64,
	pub cy: f64,
}

#[derive(Clone, Debug)]
pub struct NodeSpec {
	pub id: String,
	pub label: Option<String>,
	/// Transform attribute text, e.g. `translate(40,120)`.
	pub transform: String,
	pub anchors: Vec<AnchorSpec>,
	pub draggable: bool,
}

#[derive(Clone, Debug)]
pub struct ConnectionSpec {
	pub from: String,
	pub to: String,
	pub from_anchor: usize,
	pub to_anchor: usize,
}

#[derive(Clone, Debug, Default)]
pub struct SceneData {
	pub nodes: Vec<NodeSpec>,
	pub connections: Vec<ConnectionSpec>,
	/// Node that vibrates once after load.
	pub attention: Option<String>,
}
