/// Longest strictly-increasing subsequence over the defined entries of a
/// matched-index sequence.
///
/// Absent positions are skipped, not treated as zero. The result flags, per
/// input position, whether that position belongs to the subsequence — these
/// are the reorder walk's fixed points; everything matched but unflagged
/// must move.
pub fn fixed_points(sequence: &[Option<usize>]) -> Vec<bool> {
	// Patience sort with binary search; `previous` keeps the chain links
	// needed to read the subsequence back out.
	let entries: Vec<(usize, usize)> = sequence
		.iter()
		.enumerate()
		.filter_map(|(position, slot)| slot.map(|value| (position, value)))
		.collect();

	let mut tails: Vec<usize> = Vec::new();
	let mut previous: Vec<Option<usize>> = vec![None; entries.len()];
	for (entry, &(_, value)) in entries.iter().enumerate() {
		let slot = tails.partition_point(|&tail| entries[tail].1 < value);
		if slot > 0 {
			previous[entry] = Some(tails[slot - 1]);
		}
		if slot == tails.len() {
			tails.push(entry);
		} else {
			tails[slot] = entry;
		}
	}

	let mut fixed = vec![false; sequence.len()];
	let mut chain = tails.last().copied();
	while let Some(entry) = chain {
		fixed[entries[entry].0] = true;
		chain = previous[entry];
	}
	fixed
}
