use thiserror::Error;

/// Configuration problems found while building a [`super::DiagramState`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
	#[error("node id `{0}` is declared more than once")]
	DuplicateNode(String),
	#[error("connection {connection} references unknown node `{id}`")]
	UnknownNode { connection: String, id: String },
	#[error("connections share the line id `{0}`")]
	DuplicateLine(String),
	#[error("attention target `{0}` is not a declared node")]
	UnknownAttentionNode(String),
}
