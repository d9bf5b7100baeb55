use core::{
	fmt::{self, Debug, Display},
	hash::Hash,
};

/// Kind tag of a tree node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum NodeKind {
	Element,
	Text,
	Comment,
	Cdata,
	Document,
	Fragment,
}
impl NodeKind {
	/// Whether nodes of this kind own children.
	#[must_use]
	pub fn is_parent(self) -> bool {
		matches!(self, NodeKind::Element | NodeKind::Document | NodeKind::Fragment)
	}
}

/// Typed properties of form-state elements, distinct from their attributes.
///
/// The `Default*` variants are the declared state; the plain variants are the
/// live state, which drifts from the default once a user edits the control.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Property {
	Value,
	Checked,
	Selected,
	Indeterminate,
	Disabled,
	DefaultValue,
	DefaultChecked,
	DefaultSelected,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PropertyValue {
	Text(String),
	Flag(bool),
}
impl PropertyValue {
	#[must_use]
	pub fn as_text(&self) -> Option<&str> {
		match self {
			PropertyValue::Text(text) => Some(text),
			PropertyValue::Flag(_) => None,
		}
	}

	#[must_use]
	pub fn as_flag(&self) -> Option<bool> {
		match self {
			PropertyValue::Text(_) => None,
			PropertyValue::Flag(flag) => Some(*flag),
		}
	}
}

/// Failure surfaced by the underlying tree primitive, e.g. detaching a node
/// that has no parent or anchoring on a node that is not a child.
#[derive(Debug)]
pub struct HostError(String);
impl HostError {
	#[must_use]
	pub fn new(message: impl Into<String>) -> Self {
		Self(message.into())
	}
}
impl Display for HostError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "host primitive error: {}", self.0)
	}
}
impl std::error::Error for HostError {}

/// The markup parser produced no usable root, or the wrong number of roots.
#[derive(Debug)]
pub struct ParseError(String);
impl ParseError {
	#[must_use]
	pub fn new(message: impl Into<String>) -> Self {
		Self(message.into())
	}
}
impl Display for ParseError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "markup parse error: {}", self.0)
	}
}
impl std::error::Error for ParseError {}

/// The tree capability set the morph engine is written against.
///
/// Handles are cheap to clone and compare by *identity*: two handles are
/// equal exactly when they designate the same node, and hashing follows the
/// same discipline. Accessors take `&self`; implementations are expected to
/// use interior mutability, so a handle held by an observer callback stays
/// valid across mutations.
///
/// Mutating operations report host failures as [`HostError`]; the engine
/// propagates them without attempting recovery mid-walk.
pub trait Dom {
	type Node: Clone + Eq + Hash + Debug;

	fn kind(&self, node: &Self::Node) -> NodeKind;

	/// Lowercased tag of an element; empty for non-elements.
	fn local_name(&self, node: &Self::Node) -> String;

	fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

	/// Snapshot of the ordered child list.
	fn children(&self, parent: &Self::Node) -> Vec<Self::Node>;

	/// Snapshot of the ordered `(name, value)` attribute list.
	fn attributes(&self, element: &Self::Node) -> Vec<(String, String)>;

	fn get_attribute(&self, element: &Self::Node, name: &str) -> Option<String>;

	fn has_attribute(&self, element: &Self::Node, name: &str) -> bool {
		self.get_attribute(element, name).is_some()
	}

	fn set_attribute(&self, element: &Self::Node, name: &str, value: &str) -> Result<(), HostError>;

	fn remove_attribute(&self, element: &Self::Node, name: &str) -> Result<(), HostError>;

	/// `None` when the node does not carry the property.
	fn get_property(&self, node: &Self::Node, property: Property) -> Option<PropertyValue>;

	fn set_property(&self, node: &Self::Node, property: Property, value: PropertyValue) -> Result<(), HostError>;

	/// Textual value of text/comment/CDATA nodes.
	fn text_value(&self, node: &Self::Node) -> Option<String>;

	fn set_text_value(&self, node: &Self::Node, value: &str) -> Result<(), HostError>;

	/// Inserts `node` before `anchor` under `parent`; appends when `anchor`
	/// is `None`. A node already attached elsewhere is detached first.
	fn insert_before(&self, parent: &Self::Node, node: &Self::Node, anchor: Option<&Self::Node>) -> Result<(), HostError>;

	/// Whether [`Dom::move_before`] preserves node state. Queried once per
	/// morph call; when `false` the engine falls back to `insert_before`.
	fn has_move_before(&self) -> bool {
		false
	}

	/// State-preserving reposition of `node` when it is already a child of
	/// `parent`. The default delegates to `insert_before`.
	fn move_before(&self, parent: &Self::Node, node: &Self::Node, anchor: Option<&Self::Node>) -> Result<(), HostError> {
		self.insert_before(parent, node, anchor)
	}

	/// Detaches `node` from its parent.
	fn remove(&self, node: &Self::Node) -> Result<(), HostError>;

	/// Structural equality: kind, local name, attributes irrespective of
	/// order, text values and children. Never identity.
	fn deep_equal(&self, a: &Self::Node, b: &Self::Node) -> bool;

	/// Deep copy, used when reference nodes must not leave their tree.
	fn clone_deep(&self, node: &Self::Node) -> Self::Node;

	/// Parses markup into the (possibly empty) child list of a fragment.
	fn parse_fragment(&self, markup: &str) -> Result<Vec<Self::Node>, ParseError>;
}
