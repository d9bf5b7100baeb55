//! The morph engine: pairs a current tree with a reference tree, updates
//! attributes and form state in place, matches children in seven passes and
//! commits the reordering with the minimum number of moves.

use crate::{
	dom::{Dom, HostError, NodeKind, ParseError, Property, PropertyValue},
	id_index::IdIndex,
	lis,
	options::MorphOptions,
};
use core::fmt::{self, Display};
use log::{debug, trace, warn};

/// Marker attribute the pre-pass sets on named form controls whose live
/// state differs from their declared defaults. Observers may read it; the
/// attribute morpher strips it from every element it visits. Elements the
/// morph never visits keep it.
pub const DIRTY_ATTRIBUTE: &str = "morphlex-dirty";

const FORM_STATE_ELEMENTS: &[&str] = &["input", "option", "select", "textarea"];
const STABLE_ATTRIBUTES: &[&str] = &["name", "href", "src"];

#[derive(Debug)]
pub enum MorphError {
	Parse(ParseError),
	/// `morph_inner` was invoked on something other than a matching element
	/// pair, or its markup argument did not parse to a single element.
	InvalidInnerMorph(String),
	Host(HostError),
}
impl Display for MorphError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			MorphError::Parse(error) => Display::fmt(error, f),
			MorphError::InvalidInnerMorph(message) => write!(f, "invalid inner morph: {message}"),
			MorphError::Host(error) => Display::fmt(error, f),
		}
	}
}
impl std::error::Error for MorphError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			MorphError::Parse(error) => Some(error),
			MorphError::InvalidInnerMorph(_) => None,
			MorphError::Host(error) => Some(error),
		}
	}
}
impl From<ParseError> for MorphError {
	fn from(error: ParseError) -> Self {
		MorphError::Parse(error)
	}
}
impl From<HostError> for MorphError {
	fn from(error: HostError) -> Self {
		MorphError::Host(error)
	}
}

/// The reference side of a morph call: one node, a flat ordered sequence,
/// or markup still to be parsed.
#[derive(Debug)]
pub enum Reference<'a, N> {
	Node(&'a N),
	Sequence(&'a [N]),
	Markup(&'a str),
}
impl<'a, N> From<&'a N> for Reference<'a, N> {
	fn from(node: &'a N) -> Self {
		Reference::Node(node)
	}
}
impl<'a, N> From<&'a [N]> for Reference<'a, N> {
	fn from(nodes: &'a [N]) -> Self {
		Reference::Sequence(nodes)
	}
}
impl<'a, N> From<&'a Vec<N>> for Reference<'a, N> {
	fn from(nodes: &'a Vec<N>) -> Self {
		Reference::Sequence(nodes)
	}
}
impl<'a, N> From<&'a str> for Reference<'a, N> {
	fn from(markup: &'a str) -> Self {
		Reference::Markup(markup)
	}
}

/// Morphs `from` in place until it matches the reference.
///
/// An empty reference removes `from` (subject to veto). A sequence of two or
/// more nodes morphs `from` against the first and inserts copies of the rest
/// immediately after it.
///
/// # Errors
/// [`MorphError::Parse`] when a markup reference cannot be parsed,
/// [`MorphError::Host`] when the tree primitive fails mid-walk. Earlier
/// mutations are not rolled back.
pub fn morph<'a, D: Dom>(dom: &D, from: &D::Node, to: impl Into<Reference<'a, D::Node>>, options: &MorphOptions<D::Node>) -> Result<(), MorphError>
where
	D::Node: 'a,
{
	Morpher::new(dom, options).run(from, &to.into())
}

/// Morphs only the children of `from` against the children of the reference
/// element, leaving the outer element's attributes untouched.
///
/// # Errors
/// [`MorphError::InvalidInnerMorph`] unless both sides are a matching
/// element pair (markup must parse to exactly one element); otherwise as
/// [`morph`].
pub fn morph_inner<'a, D: Dom>(dom: &D, from: &D::Node, to: impl Into<Reference<'a, D::Node>>, options: &MorphOptions<D::Node>) -> Result<(), MorphError>
where
	D::Node: 'a,
{
	Morpher::new(dom, options).run_inner(from, &to.into())
}

/// Morphs the root element of one document against the root element of
/// another.
///
/// # Errors
/// [`MorphError::Parse`] when either document has no root element;
/// otherwise as [`morph`].
pub fn morph_document<D: Dom>(dom: &D, from: &D::Node, to: &D::Node, options: &MorphOptions<D::Node>) -> Result<(), MorphError> {
	let from_root = root_element(dom, from).ok_or_else(|| ParseError::new("current document has no root element"))?;
	let to_root = root_element(dom, to).ok_or_else(|| ParseError::new("reference document has no root element"))?;
	Morpher::new(dom, options).run(&from_root, &Reference::Node(&to_root))
}

fn root_element<D: Dom>(dom: &D, document: &D::Node) -> Option<D::Node> {
	dom.children(document).into_iter().find(|child| dom.kind(child) == NodeKind::Element)
}

/// Matcher pool classification of a child node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Slot {
	Element,
	Node,
	Whitespace,
}

#[derive(Clone, Copy, Debug)]
enum MatchPass {
	ElementEquality,
	ExactId,
	IdSetOverlap,
	StableAttribute,
	TagName,
	NodeEquality,
	SameKind,
}
impl MatchPass {
	const ALL: [MatchPass; 7] = [
		MatchPass::ElementEquality,
		MatchPass::ExactId,
		MatchPass::IdSetOverlap,
		MatchPass::StableAttribute,
		MatchPass::TagName,
		MatchPass::NodeEquality,
		MatchPass::SameKind,
	];
}

/// Child-descent work items. `Leave` fires `after_node_visited` once the
/// pair's whole subtree has been processed.
enum Frame<N> {
	Visit(N, N),
	Leave(N, N),
}

/// Per-call state; discarded when the call returns.
struct Morpher<'m, D: Dom> {
	dom: &'m D,
	options: &'m MorphOptions<D::Node>,
	id_index: IdIndex<D::Node>,
	use_move_before: bool,
	work: Vec<Frame<D::Node>>,
}

impl<'m, D: Dom> Morpher<'m, D> {
	fn new(dom: &'m D, options: &'m MorphOptions<D::Node>) -> Self {
		Self {
			dom,
			options,
			id_index: IdIndex::new(),
			use_move_before: dom.has_move_before(),
			work: Vec::new(),
		}
	}

	fn run(mut self, from: &D::Node, reference: &Reference<'_, D::Node>) -> Result<(), MorphError> {
		let nodes = self.resolve(reference)?;
		match nodes.as_slice() {
			[] => {
				trace!("Empty reference; removing {from:?}.");
				self.remove_node(from)
			}
			[to] => {
				self.prepare(from, to)?;
				self.run_pair(from, to)
			}
			[to, rest @ ..] => {
				self.prepare(from, to)?;
				self.run_pair(from, to)?;
				self.insert_trailing(from, rest)
			}
		}
	}

	fn run_inner(mut self, from: &D::Node, reference: &Reference<'_, D::Node>) -> Result<(), MorphError> {
		let to = match reference {
			Reference::Node(node) => (*node).clone(),
			Reference::Sequence(nodes) => match nodes {
				[single] => single.clone(),
				_ => return Err(MorphError::InvalidInnerMorph(format!("expected exactly one reference element, got {}", nodes.len()))),
			},
			Reference::Markup(markup) => {
				let mut nodes = self.dom.parse_fragment(markup)?;
				if nodes.len() != 1 {
					return Err(MorphError::InvalidInnerMorph(format!("markup must parse to exactly one element, got {} nodes", nodes.len())));
				}
				nodes.remove(0)
			}
		};
		if !self.is_matching_pair(from, &to) {
			return Err(MorphError::InvalidInnerMorph(format!("{from:?} and {to:?} are not a matching element pair")));
		}
		self.prepare(from, &to)?;
		self.morph_children(from, &to)?;
		self.drain()
	}

	fn resolve(&self, reference: &Reference<'_, D::Node>) -> Result<Vec<D::Node>, MorphError> {
		Ok(match reference {
			Reference::Node(node) => vec![(*node).clone()],
			Reference::Sequence(nodes) => nodes.to_vec(),
			Reference::Markup(markup) => self.dom.parse_fragment(markup)?,
		})
	}

	/// Builds the per-call ID index over both trees and flags dirty form
	/// controls, before the first mutation.
	fn prepare(&mut self, from: &D::Node, to: &D::Node) -> Result<(), MorphError> {
		self.id_index.populate(self.dom, from);
		self.id_index.populate(self.dom, to);
		self.flag_dirty_form_state(from)?;
		Ok(())
	}

	fn run_pair(&mut self, from: &D::Node, to: &D::Node) -> Result<(), MorphError> {
		self.work.push(Frame::Visit(from.clone(), to.clone()));
		self.drain()
	}

	fn drain(&mut self) -> Result<(), MorphError> {
		while let Some(frame) = self.work.pop() {
			match frame {
				Frame::Visit(from, to) => self.visit_pair(&from, &to)?,
				Frame::Leave(from, to) => self.options.notify_visited(&from, &to),
			}
		}
		Ok(())
	}

	fn visit_pair(&mut self, from: &D::Node, to: &D::Node) -> Result<(), MorphError> {
		if from == to {
			trace!("Skipping self-pair.");
			return Ok(());
		}
		if self.dom.deep_equal(from, to) {
			trace!("Skipping deeply equal pair {from:?}.");
			return Ok(());
		}
		if !self.options.approves_visit(from, to) {
			trace!("Visit of {from:?} vetoed.");
			return Ok(());
		}
		self.work.push(Frame::Leave(from.clone(), to.clone()));
		if self.is_matching_pair(from, to) {
			trace!("Morphing pair {from:?}.");
			self.morph_matching(from, to)
		} else {
			self.replace_or_retext(from, to)
		}
	}

	fn is_matching_pair(&self, a: &D::Node, b: &D::Node) -> bool {
		if self.dom.kind(a) != NodeKind::Element || self.dom.kind(b) != NodeKind::Element {
			return false;
		}
		let name = self.dom.local_name(a);
		name == self.dom.local_name(b) && (name != "input" || self.input_type(a) == self.input_type(b))
	}

	fn input_type(&self, element: &D::Node) -> String {
		self.dom
			.get_attribute(element, "type")
			.filter(|value| !value.is_empty())
			.map_or_else(|| "text".to_owned(), |value| value.to_ascii_lowercase())
	}

	fn morph_matching(&mut self, from: &D::Node, to: &D::Node) -> Result<(), MorphError> {
		self.morph_attributes(from, to)?;
		if self.dom.local_name(from) == "textarea" {
			self.morph_text_area(from, to)
		} else if !self.dom.children(from).is_empty() || !self.dom.children(to).is_empty() {
			self.morph_children(from, to)
		} else {
			Ok(())
		}
	}

	/// Same non-element kind: copy the reference text. Anything else:
	/// replace `from` with a deep copy of `to`, which commits only when both
	/// the removal and the addition are approved.
	fn replace_or_retext(&mut self, from: &D::Node, to: &D::Node) -> Result<(), MorphError> {
		let kind = self.dom.kind(from);
		if kind == self.dom.kind(to) && kind != NodeKind::Element {
			if let (Some(current), Some(reference)) = (self.dom.text_value(from), self.dom.text_value(to)) {
				if current != reference {
					trace!("Updating {kind:?} text.");
					self.dom.set_text_value(from, &reference)?;
				}
				return Ok(());
			}
		}
		let Some(parent) = self.dom.parent(from) else {
			return Err(HostError::new("cannot replace a node that has no parent").into());
		};
		if self.options.approves_removal(from) && self.options.approves_addition(&parent, to, Some(from)) {
			trace!("Replacing {from:?} with a copy of {to:?}.");
			let replacement = self.dom.clone_deep(to);
			self.dom.insert_before(&parent, &replacement, Some(from))?;
			self.options.notify_added(&replacement);
			self.dom.remove(from)?;
			self.options.notify_removed(from);
		} else {
			trace!("Replacement of {from:?} vetoed.");
		}
		Ok(())
	}

	/// Forward pass adds and updates from the reference in order; backward
	/// pass removes extras in reverse current order. Form-state attributes
	/// also reconcile the live property, honoring `preserve_changes`.
	fn morph_attributes(&mut self, from: &D::Node, to: &D::Node) -> Result<(), MorphError> {
		if self.dom.has_attribute(from, DIRTY_ATTRIBUTE) {
			// Engine bookkeeping; fires no attribute hooks.
			self.dom.remove_attribute(from, DIRTY_ATTRIBUTE)?;
		}
		let name = self.dom.local_name(from);
		for (attr_name, attr_value) in self.dom.attributes(to) {
			match attr_name.as_str() {
				"value" if name == "input" => self.sync_live_text(from, &attr_value)?,
				"checked" if name == "input" => self.sync_live_flag(from, Property::Checked, Property::DefaultChecked)?,
				"selected" if name == "option" => self.sync_live_flag(from, Property::Selected, Property::DefaultSelected)?,
				_ => {}
			}
			let previous = self.dom.get_attribute(from, &attr_name);
			if previous.as_deref() != Some(attr_value.as_str()) {
				if self.options.approves_attribute(from, &attr_name, Some(&attr_value)) {
					self.dom.set_attribute(from, &attr_name, &attr_value)?;
					self.options.notify_attribute(from, &attr_name, previous.as_deref());
				} else {
					trace!("Update of attribute {attr_name:?} vetoed on {from:?}.");
				}
			}
		}
		for (attr_name, attr_value) in self.dom.attributes(from).into_iter().rev() {
			if self.dom.has_attribute(to, &attr_name) {
				continue;
			}
			match attr_name.as_str() {
				"checked" if name == "input" => self.clear_live_flag(from, Property::Checked, Property::DefaultChecked)?,
				"selected" if name == "option" => self.clear_live_flag(from, Property::Selected, Property::DefaultSelected)?,
				_ => {}
			}
			if self.options.approves_attribute(from, &attr_name, None) {
				self.dom.remove_attribute(from, &attr_name)?;
				self.options.notify_attribute(from, &attr_name, Some(&attr_value));
			} else {
				trace!("Removal of attribute {attr_name:?} vetoed on {from:?}.");
			}
		}
		Ok(())
	}

	fn sync_live_text(&self, element: &D::Node, reference_value: &str) -> Result<(), HostError> {
		let Some(live) = self.dom.get_property(element, Property::Value) else {
			return Ok(());
		};
		if live.as_text() != Some(reference_value) && (!self.options.preserve_changes || !self.live_text_dirty(element)) {
			self.dom.set_property(element, Property::Value, PropertyValue::Text(reference_value.to_owned()))?;
		}
		Ok(())
	}

	fn sync_live_flag(&self, element: &D::Node, live: Property, default: Property) -> Result<(), HostError> {
		let Some(current) = self.dom.get_property(element, live).and_then(|value| value.as_flag()) else {
			return Ok(());
		};
		if !current && (!self.options.preserve_changes || !self.live_flag_dirty(element, live, default)) {
			self.dom.set_property(element, live, PropertyValue::Flag(true))?;
		}
		Ok(())
	}

	fn clear_live_flag(&self, element: &D::Node, live: Property, default: Property) -> Result<(), HostError> {
		let Some(current) = self.dom.get_property(element, live).and_then(|value| value.as_flag()) else {
			return Ok(());
		};
		if self.options.preserve_changes && self.live_flag_dirty(element, live, default) {
			return Ok(());
		}
		if current {
			self.dom.set_property(element, live, PropertyValue::Flag(false))?;
		}
		Ok(())
	}

	fn live_text_dirty(&self, element: &D::Node) -> bool {
		self.dom.get_property(element, Property::Value) != self.dom.get_property(element, Property::DefaultValue)
	}

	fn live_flag_dirty(&self, element: &D::Node, live: Property, default: Property) -> bool {
		match (self.dom.get_property(element, live), self.dom.get_property(element, default)) {
			(Some(current), Some(declared)) => current != declared,
			_ => false,
		}
	}

	/// Replaces the text-area's textual content (re-seeding its default
	/// value) and resets the live value unless dirty state is preserved.
	/// Leaf handling: no structural hooks fire here.
	fn morph_text_area(&mut self, from: &D::Node, to: &D::Node) -> Result<(), MorphError> {
		let reference_children = self.dom.children(to);
		let reference_text: String = reference_children
			.iter()
			.filter(|child| self.dom.kind(child) == NodeKind::Text)
			.filter_map(|child| self.dom.text_value(child))
			.collect();
		let was_dirty = self.live_text_dirty(from);

		trace!("Morphing <textarea> content.");
		let current_children = self.dom.children(from);
		let single_text = current_children.len() == 1 && self.dom.kind(&current_children[0]) == NodeKind::Text;
		if single_text && !reference_text.is_empty() {
			if self.dom.text_value(&current_children[0]).as_deref() != Some(reference_text.as_str()) {
				self.dom.set_text_value(&current_children[0], &reference_text)?;
			}
		} else {
			self.replace_text_area_content(from, &current_children, &reference_children, &reference_text)?;
		}

		self.dom.set_property(from, Property::DefaultValue, PropertyValue::Text(reference_text.clone()))?;
		if !(self.options.preserve_changes && was_dirty) {
			self.dom.set_property(from, Property::Value, PropertyValue::Text(reference_text))?;
		}
		Ok(())
	}

	fn replace_text_area_content(&self, from: &D::Node, current_children: &[D::Node], reference_children: &[D::Node], reference_text: &str) -> Result<(), HostError> {
		for child in current_children {
			self.dom.remove(child)?;
		}
		if reference_text.is_empty() {
			return Ok(());
		}
		if let Some(text_node) = reference_children.iter().find(|child| self.dom.kind(child) == NodeKind::Text) {
			let copy = self.dom.clone_deep(text_node);
			self.dom.set_text_value(&copy, reference_text)?;
			self.dom.insert_before(from, &copy, None)?;
		}
		Ok(())
	}

	fn morph_children(&mut self, from: &D::Node, to: &D::Node) -> Result<(), MorphError> {
		if !self.options.approves_children(from) {
			trace!("Child phase vetoed for {from:?}.");
			return Ok(());
		}
		let current = self.dom.children(from);
		let reference = self.dom.children(to);
		let matched = self.match_children(&current, &reference);
		self.commit_children(from, &current, &reference, &matched)?;
		self.options.notify_children(from);
		Ok(())
	}

	/// Seven stable passes over the unmatched pools; within a pass every
	/// still-unmatched reference child takes the first acceptable candidate
	/// in pool order.
	fn match_children(&self, current: &[D::Node], reference: &[D::Node]) -> Vec<Option<usize>> {
		let candidate_slots: Vec<Slot> = current.iter().map(|node| self.classify(node)).collect();
		let reference_slots: Vec<Slot> = reference.iter().map(|node| self.classify(node)).collect();
		let mut matched: Vec<Option<usize>> = vec![None; reference.len()];
		let mut taken = vec![false; current.len()];
		for pass in MatchPass::ALL {
			let mut matched_in_pass = 0_usize;
			for (j, slot) in matched.iter_mut().enumerate() {
				if slot.is_some() {
					continue;
				}
				for (i, candidate) in current.iter().enumerate() {
					if taken[i] {
						continue;
					}
					if self.pass_accepts(pass, candidate, candidate_slots[i], &reference[j], reference_slots[j]) {
						*slot = Some(i);
						taken[i] = true;
						matched_in_pass += 1;
						break;
					}
				}
			}
			if matched_in_pass > 0 {
				trace!("Matched {matched_in_pass} child(ren) in {pass:?} pass.");
			}
		}
		debug!(
			"Matched {}/{} reference children against {} candidate(s).",
			matched.iter().flatten().count(),
			reference.len(),
			current.len()
		);
		matched
	}

	fn classify(&self, node: &D::Node) -> Slot {
		match self.dom.kind(node) {
			NodeKind::Element => Slot::Element,
			NodeKind::Text if self.dom.text_value(node).is_some_and(|text| text.chars().all(|c| c.is_ascii_whitespace())) => Slot::Whitespace,
			_ => Slot::Node,
		}
	}

	fn pass_accepts(&self, pass: MatchPass, candidate: &D::Node, candidate_slot: Slot, reference: &D::Node, reference_slot: Slot) -> bool {
		let both_elements = candidate_slot == Slot::Element && reference_slot == Slot::Element;
		match pass {
			MatchPass::ElementEquality => both_elements && self.dom.deep_equal(candidate, reference),
			MatchPass::ExactId => {
				both_elements
					&& self.dom.local_name(candidate) == self.dom.local_name(reference)
					&& matches!(
						(self.dom.get_attribute(candidate, "id"), self.dom.get_attribute(reference, "id")),
						(Some(left), Some(right)) if !left.is_empty() && left == right
					)
			}
			MatchPass::IdSetOverlap => both_elements && self.id_index.overlap(candidate, reference),
			MatchPass::StableAttribute => {
				both_elements
					&& self.dom.local_name(candidate) == self.dom.local_name(reference)
					&& STABLE_ATTRIBUTES.iter().any(|key| {
						matches!(
							(self.dom.get_attribute(candidate, key), self.dom.get_attribute(reference, key)),
							(Some(left), Some(right)) if !left.is_empty() && left == right
						)
					})
			}
			MatchPass::TagName => {
				both_elements && {
					let name = self.dom.local_name(candidate);
					name == self.dom.local_name(reference) && (name != "input" || self.input_type(candidate) == self.input_type(reference))
				}
			}
			MatchPass::NodeEquality => candidate_slot != Slot::Element && reference_slot != Slot::Element && self.dom.deep_equal(candidate, reference),
			// Whitespace on either side never matches by kind alone.
			MatchPass::SameKind => candidate_slot == Slot::Node && reference_slot == Slot::Node && self.dom.kind(candidate) == self.dom.kind(reference),
		}
	}

	/// Removes unmatched candidates, then walks the reference order moving
	/// only nodes outside the longest increasing subsequence of matched
	/// indices. Matched pairs are queued onto the work stack.
	fn commit_children(&mut self, parent: &D::Node, current: &[D::Node], reference: &[D::Node], matched: &[Option<usize>]) -> Result<(), MorphError> {
		let mut is_kept = vec![false; current.len()];
		for index in matched.iter().flatten() {
			is_kept[*index] = true;
		}
		for (candidate, kept) in current.iter().zip(&is_kept) {
			if !kept {
				self.remove_node(candidate)?;
			}
		}

		let fixed = lis::fixed_points(matched);
		let mut insertion_point = self.dom.children(parent).first().cloned();
		let mut queued: Vec<(D::Node, D::Node)> = Vec::new();
		let mut moves = 0_usize;
		for (j, slot) in matched.iter().enumerate() {
			match slot {
				Some(i) => {
					let node = &current[*i];
					if !fixed[j] && insertion_point.as_ref() != Some(node) {
						trace!("Moving {node:?} into place.");
						self.relocate(parent, node, insertion_point.as_ref())?;
						moves += 1;
					}
					queued.push((node.clone(), reference[j].clone()));
					insertion_point = self.next_sibling(node);
				}
				None => {
					// The copy lands right before the insertion point, so
					// the anchor itself stays valid for the next position.
					self.add_node(parent, &reference[j], insertion_point.as_ref())?;
				}
			}
		}
		if moves > 0 {
			debug!("Committed {moves} move(s) under {parent:?}.");
		}
		for (from, to) in queued.into_iter().rev() {
			self.work.push(Frame::Visit(from, to));
		}
		Ok(())
	}

	fn relocate(&self, parent: &D::Node, node: &D::Node, anchor: Option<&D::Node>) -> Result<(), HostError> {
		if self.use_move_before {
			self.dom.move_before(parent, node, anchor)
		} else {
			self.dom.insert_before(parent, node, anchor)
		}
	}

	fn next_sibling(&self, node: &D::Node) -> Option<D::Node> {
		let parent = self.dom.parent(node)?;
		let children = self.dom.children(&parent);
		let index = children.iter().position(|child| child == node)?;
		children.into_iter().nth(index + 1)
	}

	fn add_node(&mut self, parent: &D::Node, reference_node: &D::Node, insertion_point: Option<&D::Node>) -> Result<(), MorphError> {
		if self.options.approves_addition(parent, reference_node, insertion_point) {
			trace!("Inserting a copy of {reference_node:?}.");
			let copy = self.dom.clone_deep(reference_node);
			self.dom.insert_before(parent, &copy, insertion_point)?;
			self.options.notify_added(&copy);
		} else {
			trace!("Addition of {reference_node:?} vetoed.");
		}
		Ok(())
	}

	fn remove_node(&mut self, node: &D::Node) -> Result<(), MorphError> {
		if self.options.approves_removal(node) {
			trace!("Removing {node:?}.");
			self.dom.remove(node)?;
			self.options.notify_removed(node);
		} else {
			trace!("Removal of {node:?} vetoed.");
		}
		Ok(())
	}

	fn insert_trailing(&mut self, from: &D::Node, rest: &[D::Node]) -> Result<(), MorphError> {
		let Some(parent) = self.dom.parent(from) else {
			warn!("No parent to insert {} trailing reference node(s) after {from:?}.", rest.len());
			return Ok(());
		};
		let anchor = self.next_sibling(from);
		for node in rest {
			self.add_node(&parent, node, anchor.as_ref())?;
		}
		Ok(())
	}

	/// Marks named form controls whose live state drifted from the declared
	/// defaults, before any mutation. Engine bookkeeping; no hooks.
	fn flag_dirty_form_state(&self, root: &D::Node) -> Result<(), HostError> {
		let mut pending = vec![root.clone()];
		let mut flagged = 0_usize;
		while let Some(node) = pending.pop() {
			if self.dom.kind(&node) == NodeKind::Element {
				let name = self.dom.local_name(&node);
				if FORM_STATE_ELEMENTS.contains(&name.as_str()) && self.dom.get_attribute(&node, "name").is_some_and(|value| !value.is_empty()) {
					let dirty = self.live_text_dirty(&node)
						|| self.live_flag_dirty(&node, Property::Checked, Property::DefaultChecked)
						|| self.live_flag_dirty(&node, Property::Selected, Property::DefaultSelected);
					if dirty {
						self.dom.set_attribute(&node, DIRTY_ATTRIBUTE, "")?;
						flagged += 1;
					}
				}
			}
			if self.dom.kind(&node).is_parent() {
				pending.extend(self.dom.children(&node));
			}
		}
		if flagged > 0 {
			debug!("Flagged {flagged} dirty form control(s).");
		}
		Ok(())
	}
}
