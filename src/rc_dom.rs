//! Bundled reference implementation of the tree capability set: reference-
//! counted nodes with identity-compared handles, `scraper`-based parsing and
//! markup serialization for debugging and assertions.

#![allow(clippy::module_name_repetitions)]

use crate::dom::{Dom, HostError, NodeKind, ParseError, Property, PropertyValue};
use core::{
	cell::RefCell,
	fmt::{self, Debug},
	hash::{Hash, Hasher},
	ptr,
};
use ego_tree;
use scraper::{Html, Node as ParsedNode};
use std::rc::{Rc, Weak};
use tracing::instrument;

const VOID_ELEMENTS: &[&str] = &["area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr"];
const FORM_STATE_ELEMENTS: &[&str] = &["input", "option", "select", "textarea"];

/// Identity-compared handle to a shared node.
///
/// Equality and hashing follow the allocation, never the content, so a
/// handle keeps designating "its" node across moves and mutations.
#[derive(Clone)]
pub struct Handle(Rc<RcNode>);

pub struct RcNode {
	data: NodeData,
	parent: RefCell<Weak<RcNode>>,
	children: RefCell<Vec<Handle>>,
}

enum NodeData {
	Document,
	Fragment,
	Element {
		name: String,
		attributes: RefCell<Vec<(String, String)>>,
		form: RefCell<FormState>,
	},
	Text(RefCell<String>),
	Comment(RefCell<String>),
	Cdata(RefCell<String>),
}

/// Live form-control overrides. Defaults are derived from the attribute map
/// (and, for text areas, the text content) at read time, so an element with
/// no overrides is never dirty.
#[derive(Clone, Default)]
struct FormState {
	value: Option<String>,
	checked: Option<bool>,
	selected: Option<bool>,
	indeterminate: Option<bool>,
	disabled: Option<bool>,
	default_value: Option<String>,
	default_checked: Option<bool>,
	default_selected: Option<bool>,
}

impl PartialEq for Handle {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}
impl Eq for Handle {}
impl Hash for Handle {
	fn hash<H: Hasher>(&self, state: &mut H) {
		ptr::hash(Rc::as_ptr(&self.0), state);
	}
}
impl Debug for Handle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.0.data {
			NodeData::Document => write!(f, "#document"),
			NodeData::Fragment => write!(f, "#fragment"),
			NodeData::Element { name, .. } => write!(f, "<{name}>"),
			NodeData::Text(value) => write!(f, "#text({:?})", &*value.borrow()),
			NodeData::Comment(value) => write!(f, "#comment({:?})", &*value.borrow()),
			NodeData::Cdata(value) => write!(f, "#cdata({:?})", &*value.borrow()),
		}
	}
}

impl Handle {
	#[must_use]
	pub fn new_document() -> Self {
		Self::with_data(NodeData::Document)
	}

	#[must_use]
	pub fn new_fragment() -> Self {
		Self::with_data(NodeData::Fragment)
	}

	#[must_use]
	pub fn new_element(name: &str, attributes: &[(&str, &str)]) -> Self {
		Self::element_from(
			name.to_ascii_lowercase(),
			attributes.iter().map(|&(name, value)| (name.to_owned(), value.to_owned())).collect(),
		)
	}

	#[must_use]
	pub fn new_text(value: &str) -> Self {
		Self::with_data(NodeData::Text(RefCell::new(value.to_owned())))
	}

	#[must_use]
	pub fn new_comment(value: &str) -> Self {
		Self::with_data(NodeData::Comment(RefCell::new(value.to_owned())))
	}

	#[must_use]
	pub fn new_cdata(value: &str) -> Self {
		Self::with_data(NodeData::Cdata(RefCell::new(value.to_owned())))
	}

	fn with_data(data: NodeData) -> Self {
		Self(Rc::new(RcNode {
			data,
			parent: RefCell::new(Weak::new()),
			children: RefCell::new(Vec::new()),
		}))
	}

	fn element_from(name: String, attributes: Vec<(String, String)>) -> Self {
		Self::with_data(NodeData::Element {
			name,
			attributes: RefCell::new(attributes),
			form: RefCell::new(FormState::default()),
		})
	}

	/// Detaches `child` from wherever it is and appends it here.
	pub fn append(&self, child: &Handle) {
		child.detach();
		*child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
		self.0.children.borrow_mut().push(child.clone());
	}

	fn detach(&self) {
		if let Some(parent) = self.0.parent.borrow().upgrade() {
			parent.children.borrow_mut().retain(|sibling| !Rc::ptr_eq(&sibling.0, &self.0));
		}
		*self.0.parent.borrow_mut() = Weak::new();
	}

	/// Serializes the subtree to markup.
	#[must_use]
	pub fn to_html(&self) -> String {
		let mut out = String::new();
		self.write_html(&mut out);
		out
	}

	fn write_html(&self, out: &mut String) {
		match &self.0.data {
			NodeData::Document | NodeData::Fragment => {
				for child in self.0.children.borrow().iter() {
					child.write_html(out);
				}
			}
			NodeData::Element { name, attributes, .. } => {
				out.push('<');
				out.push_str(name);
				for (attr_name, attr_value) in attributes.borrow().iter() {
					out.push(' ');
					out.push_str(attr_name);
					out.push_str("=\"");
					out.push_str(&escape_attribute(attr_value));
					out.push('"');
				}
				out.push('>');
				if !VOID_ELEMENTS.contains(&name.as_str()) {
					for child in self.0.children.borrow().iter() {
						child.write_html(out);
					}
					out.push_str("</");
					out.push_str(name);
					out.push('>');
				}
			}
			NodeData::Text(value) => out.push_str(&escape_text(&value.borrow())),
			NodeData::Comment(value) => {
				out.push_str("<!--");
				out.push_str(&value.borrow());
				out.push_str("-->");
			}
			NodeData::Cdata(value) => {
				out.push_str("<![CDATA[");
				out.push_str(&value.borrow());
				out.push_str("]]>");
			}
		}
	}

	fn form(&self) -> Option<(&str, &RefCell<FormState>)> {
		match &self.0.data {
			NodeData::Element { name, form, .. } if FORM_STATE_ELEMENTS.contains(&name.as_str()) => Some((name, form)),
			_ => None,
		}
	}

	fn attribute(&self, name: &str) -> Option<String> {
		match &self.0.data {
			NodeData::Element { attributes, .. } => attributes.borrow().iter().find(|(attr_name, _)| attr_name == name).map(|(_, value)| value.clone()),
			_ => None,
		}
	}

	fn derived_default_value(&self, name: &str) -> String {
		if name == "textarea" {
			let mut text = String::new();
			for child in self.0.children.borrow().iter() {
				if let NodeData::Text(value) = &child.0.data {
					text.push_str(&value.borrow());
				}
			}
			text
		} else {
			self.attribute("value").unwrap_or_default()
		}
	}
}

fn escape_attribute(value: &str) -> String {
	value.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_text(value: &str) -> String {
	value.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn position(children: &[Handle], node: &Handle) -> Option<usize> {
	children.iter().position(|child| child == node)
}

fn deep_equal_nodes(a: &Handle, b: &Handle) -> bool {
	match (&a.0.data, &b.0.data) {
		(NodeData::Element { name: left, attributes: attrs_left, .. }, NodeData::Element { name: right, attributes: attrs_right, .. }) => {
			left == right && attributes_equal(&attrs_left.borrow(), &attrs_right.borrow()) && children_equal(a, b)
		}
		(NodeData::Text(left), NodeData::Text(right)) | (NodeData::Comment(left), NodeData::Comment(right)) | (NodeData::Cdata(left), NodeData::Cdata(right)) => {
			*left.borrow() == *right.borrow()
		}
		(NodeData::Document, NodeData::Document) | (NodeData::Fragment, NodeData::Fragment) => children_equal(a, b),
		_ => false,
	}
}

// Order-insensitive; the builder and the parser both keep names unique.
fn attributes_equal(a: &[(String, String)], b: &[(String, String)]) -> bool {
	a.len() == b.len() && a.iter().all(|(name, value)| b.iter().any(|(other_name, other_value)| other_name == name && other_value == value))
}

fn children_equal(a: &Handle, b: &Handle) -> bool {
	let left = a.0.children.borrow();
	let right = b.0.children.borrow();
	left.len() == right.len() && left.iter().zip(right.iter()).all(|(x, y)| deep_equal_nodes(x, y))
}

fn clone_node_deep(node: &Handle) -> Handle {
	let copy = match &node.0.data {
		NodeData::Document => Handle::new_document(),
		NodeData::Fragment => Handle::new_fragment(),
		NodeData::Element { name, attributes, form } => {
			let copy = Handle::element_from(name.clone(), attributes.borrow().clone());
			if let NodeData::Element { form: copied, .. } = &copy.0.data {
				*copied.borrow_mut() = form.borrow().clone();
			}
			copy
		}
		NodeData::Text(value) => Handle::new_text(&value.borrow()),
		NodeData::Comment(value) => Handle::new_comment(&value.borrow()),
		NodeData::Cdata(value) => Handle::new_cdata(&value.borrow()),
	};
	for child in node.0.children.borrow().iter() {
		copy.append(&clone_node_deep(child));
	}
	copy
}

#[instrument(skip_all)]
fn convert_children(parent: ego_tree::NodeRef<'_, ParsedNode>) -> Vec<Handle> {
	parent.children().filter_map(convert_node).collect()
}

fn convert_node(node: ego_tree::NodeRef<'_, ParsedNode>) -> Option<Handle> {
	match node.value() {
		ParsedNode::Element(element) => {
			let handle = Handle::element_from(
				element.name().to_owned(),
				element.attrs().map(|(name, value)| (name.to_owned(), value.to_owned())).collect(),
			);
			for child in convert_children(node) {
				handle.append(&child);
			}
			Some(handle)
		}
		ParsedNode::Text(text) => Some(Handle::new_text(&text.text)),
		ParsedNode::Comment(comment) => Some(Handle::new_comment(&comment.comment)),
		// Doctypes and processing instructions have no counterpart here.
		_ => None,
	}
}

/// The bundled [`Dom`] implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct RcDom;
impl RcDom {
	#[must_use]
	pub fn new() -> Self {
		Self
	}

	/// Parses a whole document; the returned handle is the document node.
	#[instrument(skip(self, markup))]
	pub fn parse_document(&self, markup: &str) -> Result<Handle, ParseError> {
		let parsed = Html::parse_document(markup);
		let document = Handle::new_document();
		for child in convert_children(parsed.tree.root()) {
			document.append(&child);
		}
		Ok(document)
	}
}

impl Dom for RcDom {
	type Node = Handle;

	fn kind(&self, node: &Handle) -> NodeKind {
		match &node.0.data {
			NodeData::Document => NodeKind::Document,
			NodeData::Fragment => NodeKind::Fragment,
			NodeData::Element { .. } => NodeKind::Element,
			NodeData::Text(_) => NodeKind::Text,
			NodeData::Comment(_) => NodeKind::Comment,
			NodeData::Cdata(_) => NodeKind::Cdata,
		}
	}

	fn local_name(&self, node: &Handle) -> String {
		match &node.0.data {
			NodeData::Element { name, .. } => name.clone(),
			_ => String::new(),
		}
	}

	fn parent(&self, node: &Handle) -> Option<Handle> {
		node.0.parent.borrow().upgrade().map(Handle)
	}

	fn children(&self, parent: &Handle) -> Vec<Handle> {
		parent.0.children.borrow().clone()
	}

	fn attributes(&self, element: &Handle) -> Vec<(String, String)> {
		match &element.0.data {
			NodeData::Element { attributes, .. } => attributes.borrow().clone(),
			_ => Vec::new(),
		}
	}

	fn get_attribute(&self, element: &Handle, name: &str) -> Option<String> {
		element.attribute(name)
	}

	fn set_attribute(&self, element: &Handle, name: &str, value: &str) -> Result<(), HostError> {
		match &element.0.data {
			NodeData::Element { attributes, .. } => {
				let mut attributes = attributes.borrow_mut();
				if let Some((_, existing)) = attributes.iter_mut().find(|(attr_name, _)| attr_name == name) {
					value.clone_into(existing);
				} else {
					attributes.push((name.to_owned(), value.to_owned()));
				}
				Ok(())
			}
			_ => Err(HostError::new(format!("cannot set attribute {name:?} on a non-element"))),
		}
	}

	fn remove_attribute(&self, element: &Handle, name: &str) -> Result<(), HostError> {
		match &element.0.data {
			NodeData::Element { attributes, .. } => {
				attributes.borrow_mut().retain(|(attr_name, _)| attr_name != name);
				Ok(())
			}
			_ => Err(HostError::new(format!("cannot remove attribute {name:?} from a non-element"))),
		}
	}

	fn get_property(&self, node: &Handle, property: Property) -> Option<PropertyValue> {
		let (name, form) = node.form()?;
		let form = form.borrow();
		Some(match property {
			Property::Value => PropertyValue::Text(form.value.clone().unwrap_or_else(|| form.default_value.clone().unwrap_or_else(|| node.derived_default_value(name)))),
			Property::DefaultValue => PropertyValue::Text(form.default_value.clone().unwrap_or_else(|| node.derived_default_value(name))),
			Property::Checked => PropertyValue::Flag(form.checked.unwrap_or_else(|| form.default_checked.unwrap_or_else(|| node.attribute("checked").is_some()))),
			Property::DefaultChecked => PropertyValue::Flag(form.default_checked.unwrap_or_else(|| node.attribute("checked").is_some())),
			Property::Selected => PropertyValue::Flag(form.selected.unwrap_or_else(|| form.default_selected.unwrap_or_else(|| node.attribute("selected").is_some()))),
			Property::DefaultSelected => PropertyValue::Flag(form.default_selected.unwrap_or_else(|| node.attribute("selected").is_some())),
			Property::Indeterminate => PropertyValue::Flag(form.indeterminate.unwrap_or(false)),
			Property::Disabled => PropertyValue::Flag(form.disabled.unwrap_or_else(|| node.attribute("disabled").is_some())),
		})
	}

	fn set_property(&self, node: &Handle, property: Property, value: PropertyValue) -> Result<(), HostError> {
		let Some((_, form)) = node.form() else {
			return Err(HostError::new(format!("node carries no {property:?} property")));
		};
		let mut form = form.borrow_mut();
		match (property, value) {
			(Property::Value, PropertyValue::Text(text)) => form.value = Some(text),
			(Property::DefaultValue, PropertyValue::Text(text)) => form.default_value = Some(text),
			(Property::Checked, PropertyValue::Flag(flag)) => form.checked = Some(flag),
			(Property::DefaultChecked, PropertyValue::Flag(flag)) => form.default_checked = Some(flag),
			(Property::Selected, PropertyValue::Flag(flag)) => form.selected = Some(flag),
			(Property::DefaultSelected, PropertyValue::Flag(flag)) => form.default_selected = Some(flag),
			(Property::Indeterminate, PropertyValue::Flag(flag)) => form.indeterminate = Some(flag),
			(Property::Disabled, PropertyValue::Flag(flag)) => form.disabled = Some(flag),
			(property, value) => return Err(HostError::new(format!("type mismatch assigning {value:?} to {property:?}"))),
		}
		Ok(())
	}

	fn text_value(&self, node: &Handle) -> Option<String> {
		match &node.0.data {
			NodeData::Text(value) | NodeData::Comment(value) | NodeData::Cdata(value) => Some(value.borrow().clone()),
			_ => None,
		}
	}

	fn set_text_value(&self, node: &Handle, value: &str) -> Result<(), HostError> {
		match &node.0.data {
			NodeData::Text(existing) | NodeData::Comment(existing) | NodeData::Cdata(existing) => {
				value.clone_into(&mut existing.borrow_mut());
				Ok(())
			}
			_ => Err(HostError::new("cannot set text on a non-textual node")),
		}
	}

	fn insert_before(&self, parent: &Handle, node: &Handle, anchor: Option<&Handle>) -> Result<(), HostError> {
		if !self.kind(parent).is_parent() {
			return Err(HostError::new("insertion target cannot own children"));
		}
		if node == parent {
			return Err(HostError::new("cannot insert a node into itself"));
		}
		node.detach();
		let mut children = parent.0.children.borrow_mut();
		let slot = match anchor {
			None => children.len(),
			Some(anchor) => position(&children, anchor).ok_or_else(|| HostError::new("anchor is not a child of the parent"))?,
		};
		children.insert(slot, node.clone());
		drop(children);
		*node.0.parent.borrow_mut() = Rc::downgrade(&parent.0);
		Ok(())
	}

	fn has_move_before(&self) -> bool {
		true
	}

	fn move_before(&self, parent: &Handle, node: &Handle, anchor: Option<&Handle>) -> Result<(), HostError> {
		let attached_here = self.parent(node).is_some_and(|current| current == *parent);
		if !attached_here {
			return self.insert_before(parent, node, anchor);
		}
		let mut children = parent.0.children.borrow_mut();
		let mut slot = match anchor {
			None => children.len(),
			Some(anchor) => position(&children, anchor).ok_or_else(|| HostError::new("anchor is not a child of the parent"))?,
		};
		let from = position(&children, node).ok_or_else(|| HostError::new("node is not a child of the parent"))?;
		children.remove(from);
		if from < slot {
			slot -= 1;
		}
		children.insert(slot, node.clone());
		Ok(())
	}

	fn remove(&self, node: &Handle) -> Result<(), HostError> {
		if node.0.parent.borrow().upgrade().is_none() {
			return Err(HostError::new("cannot remove a node that has no parent"));
		}
		node.detach();
		Ok(())
	}

	fn deep_equal(&self, a: &Handle, b: &Handle) -> bool {
		deep_equal_nodes(a, b)
	}

	fn clone_deep(&self, node: &Handle) -> Handle {
		clone_node_deep(node)
	}

	#[instrument(skip(self, markup))]
	fn parse_fragment(&self, markup: &str) -> Result<Vec<Handle>, ParseError> {
		let parsed = Html::parse_fragment(markup);
		let root = parsed.tree.root();
		// html5ever wraps fragment contents in a synthetic <html> element.
		let container = root
			.children()
			.find(|child| matches!(child.value(), ParsedNode::Element(element) if element.name() == "html"));
		Ok(match container {
			Some(html) => convert_children(html),
			None => convert_children(root),
		})
	}
}
