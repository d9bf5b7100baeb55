//! Per-call configuration: form-state policy and the observer/veto hooks.

/// Options for a single morph call.
///
/// Every callback is nullable; an absent `before_*` behaves as if it
/// returned `true`, an absent `after_*` as a no-op. A `before_*` returning
/// `false` cancels the gated mutation and its `after_*` counterpart.
///
/// Callbacks run synchronously while the engine walks the tree. They may
/// read the tree, but must not start another morph on an overlapping
/// subtree; queue such work and run it after the outer call returns.
#[allow(clippy::type_complexity)]
pub struct MorphOptions<N> {
	/// Keep dirty form-control state (live value differing from its
	/// declared default) through attribute and text-area morphing.
	pub preserve_changes: bool,
	pub before_node_visited: Option<Box<dyn Fn(&N, &N) -> bool>>,
	pub after_node_visited: Option<Box<dyn Fn(&N, &N)>>,
	/// `(parent, reference_node, insertion_point)`.
	pub before_node_added: Option<Box<dyn Fn(&N, &N, Option<&N>) -> bool>>,
	pub after_node_added: Option<Box<dyn Fn(&N)>>,
	pub before_node_removed: Option<Box<dyn Fn(&N) -> bool>>,
	pub after_node_removed: Option<Box<dyn Fn(&N)>>,
	/// `(element, name, new_value)`; `None` is a removal.
	pub before_attribute_updated: Option<Box<dyn Fn(&N, &str, Option<&str>) -> bool>>,
	/// `(element, name, previous_value)`.
	pub after_attribute_updated: Option<Box<dyn Fn(&N, &str, Option<&str>)>>,
	pub before_children_visited: Option<Box<dyn Fn(&N) -> bool>>,
	pub after_children_visited: Option<Box<dyn Fn(&N)>>,
}

impl<N> Default for MorphOptions<N> {
	fn default() -> Self {
		Self {
			preserve_changes: false,
			before_node_visited: None,
			after_node_visited: None,
			before_node_added: None,
			after_node_added: None,
			before_node_removed: None,
			after_node_removed: None,
			before_attribute_updated: None,
			after_attribute_updated: None,
			before_children_visited: None,
			after_children_visited: None,
		}
	}
}

impl<N> MorphOptions<N> {
	pub(crate) fn approves_visit(&self, from: &N, to: &N) -> bool {
		self.before_node_visited.as_ref().map_or(true, |hook| hook(from, to))
	}

	pub(crate) fn notify_visited(&self, from: &N, to: &N) {
		if let Some(hook) = &self.after_node_visited {
			hook(from, to);
		}
	}

	pub(crate) fn approves_addition(&self, parent: &N, node: &N, insertion_point: Option<&N>) -> bool {
		self.before_node_added.as_ref().map_or(true, |hook| hook(parent, node, insertion_point))
	}

	pub(crate) fn notify_added(&self, node: &N) {
		if let Some(hook) = &self.after_node_added {
			hook(node);
		}
	}

	pub(crate) fn approves_removal(&self, node: &N) -> bool {
		self.before_node_removed.as_ref().map_or(true, |hook| hook(node))
	}

	pub(crate) fn notify_removed(&self, node: &N) {
		if let Some(hook) = &self.after_node_removed {
			hook(node);
		}
	}

	pub(crate) fn approves_attribute(&self, element: &N, name: &str, new_value: Option<&str>) -> bool {
		self.before_attribute_updated.as_ref().map_or(true, |hook| hook(element, name, new_value))
	}

	pub(crate) fn notify_attribute(&self, element: &N, name: &str, previous: Option<&str>) {
		if let Some(hook) = &self.after_attribute_updated {
			hook(element, name, previous);
		}
	}

	pub(crate) fn approves_children(&self, parent: &N) -> bool {
		self.before_children_visited.as_ref().map_or(true, |hook| hook(parent))
	}

	pub(crate) fn notify_children(&self, parent: &N) {
		if let Some(hook) = &self.after_children_visited {
			hook(parent);
		}
	}
}
