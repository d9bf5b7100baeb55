/// Sorted small-vector set of element IDs.
///
/// ID sets are tiny and queried only for membership-style intersection, so a
/// sorted `Vec` with a merge walk beats hashing here.
pub struct IdSet(Vec<String>);
impl IdSet {
	pub fn new() -> Self {
		Self(Vec::new())
	}

	pub fn insert(&mut self, id: &str) {
		if let Err(slot) = self.0.binary_search_by(|existing| existing.as_str().cmp(id)) {
			self.0.insert(slot, id.to_owned());
		}
	}

	/// Whether the two sets share at least one member.
	pub fn intersects(&self, other: &Self) -> bool {
		let (mut left, mut right) = (self.0.iter(), other.0.iter());
		let (mut a, mut b) = (left.next(), right.next());
		while let (Some(x), Some(y)) = (a, b) {
			match x.cmp(y) {
				core::cmp::Ordering::Less => a = left.next(),
				core::cmp::Ordering::Greater => b = right.next(),
				core::cmp::Ordering::Equal => return true,
			}
		}
		false
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}
}
