use crate::{
	dom::{Dom, NodeKind},
	id_set::IdSet,
};
use core::hash::Hash;
use hashbrown::HashMap;
use log::trace;

/// Per-call index mapping each node to the set of non-empty IDs found in its
/// descendant subtree (inclusive). Nodes whose subtree contributes no ID have
/// no entry. Built once per morph call, then only queried.
pub struct IdIndex<N: Eq + Hash>(HashMap<N, IdSet>);
impl<N: Clone + Eq + Hash> IdIndex<N> {
	pub fn new() -> Self {
		Self(HashMap::new())
	}

	/// Indexes the subtree under `root`: every element carrying a non-empty
	/// ID contributes that ID to its own set and to the set of each ancestor
	/// up to and including `root`. Duplicate IDs collapse; no uniqueness
	/// check is made.
	pub fn populate<D: Dom<Node = N>>(&mut self, dom: &D, root: &N) {
		let mut pending = vec![root.clone()];
		while let Some(node) = pending.pop() {
			if dom.kind(&node) == NodeKind::Element {
				if let Some(id) = dom.get_attribute(&node, "id") {
					if !id.is_empty() {
						self.credit_ancestors(dom, root, &node, &id);
					}
				}
			}
			if dom.kind(&node).is_parent() {
				pending.extend(dom.children(&node));
			}
		}
		trace!(
			"Indexed subtree: {} node(s) carry descendant IDs; the root set holds {}.",
			self.0.len(),
			self.0.get(root).map_or(0, IdSet::len)
		);
	}

	fn credit_ancestors<D: Dom<Node = N>>(&mut self, dom: &D, root: &N, node: &N, id: &str) {
		let mut current = node.clone();
		loop {
			self.0.entry(current.clone()).or_insert_with(IdSet::new).insert(id);
			if current == *root {
				break;
			}
			match dom.parent(&current) {
				Some(parent) => current = parent,
				None => break,
			}
		}
	}

	pub fn get(&self, node: &N) -> Option<&IdSet> {
		self.0.get(node)
	}

	/// Whether both nodes have an entry and the two sets intersect.
	pub fn overlap(&self, a: &N, b: &N) -> bool {
		match (self.0.get(a), self.0.get(b)) {
			(Some(left), Some(right)) => left.intersects(right),
			_ => false,
		}
	}
}
