use morphlex::{diff, dom::Dom, options::MorphOptions, rc_dom::Handle};

use support_::{child_ids, child_local_names, init_logging, parse_one, text_of, CountingDom, Recorder};

fn identified_list(dom: &CountingDom, order: &[&str]) -> Handle {
	let items: String = order.iter().map(|id| format!(r#"<li id="{id}">{id}</li>"#)).collect();
	parse_one(dom, &format!("<ul>{items}</ul>"))
}

#[test]
fn reversing_preserves_identity_with_four_moves() {
	init_logging();
	let dom = CountingDom::new();
	let current = identified_list(&dom, &["1", "2", "3", "4", "5"]);
	let original = dom.children(&current);
	let reference = identified_list(&dom, &["5", "4", "3", "2", "1"]);

	diff::morph(&dom, &current, &reference, &MorphOptions::default()).unwrap();

	assert_eq!(child_ids(&dom, &current), ["5", "4", "3", "2", "1"]);
	let after = dom.children(&current);
	for (node, expected) in after.iter().zip(original.iter().rev()) {
		assert_eq!(node, expected, "node identity must survive the reversal");
	}
	// LIS of [4,3,2,1,0] has length 1, so 5 - 1 = 4 moves.
	assert_eq!(dom.moves.get(), 4);
	assert_eq!(dom.inserts.get(), 0);
	assert_eq!(dom.removals.get(), 0);
}

#[test]
fn partial_reorder_moves_only_the_stray() {
	init_logging();
	let dom = CountingDom::new();
	let current = identified_list(&dom, &["1", "2", "3", "4", "5"]);
	let reference = identified_list(&dom, &["1", "2", "4", "5", "3"]);

	diff::morph(&dom, &current, &reference, &MorphOptions::default()).unwrap();

	assert_eq!(child_ids(&dom, &current), ["1", "2", "4", "5", "3"]);
	assert_eq!(dom.moves.get(), 1);
}

#[test]
fn identical_order_emits_zero_moves() {
	init_logging();
	let dom = CountingDom::new();
	let current = identified_list(&dom, &["1", "2", "3"]);
	let reference = identified_list(&dom, &["1", "2", "3"]);

	diff::morph(&dom, &current, &reference, &MorphOptions::default()).unwrap();

	assert_eq!(dom.moves.get(), 0);
	assert_eq!(dom.inserts.get(), 0);
	assert_eq!(dom.removals.get(), 0);
}

#[test]
fn removing_the_middle_item() {
	init_logging();
	let dom = CountingDom::new();
	let current = parse_one(&dom, "<ul><li>A</li><li>B</li><li>C</li></ul>");
	let original = dom.children(&current);
	let reference = parse_one(&dom, "<ul><li>A</li><li>C</li></ul>");
	let recorder = Recorder::new();

	diff::morph(&dom, &current, &reference, &recorder.options()).unwrap();

	assert_eq!(recorder.removed(), vec![original[1].clone()]);
	assert_eq!(dom.children(&current), vec![original[0].clone(), original[2].clone()]);
	assert!(recorder.added().is_empty());
}

#[test]
fn morphing_against_a_deep_clone_is_idempotent() {
	init_logging();
	let dom = CountingDom::new();
	let current = parse_one(&dom, r#"<div id="root"><ul><li id="1">one</li><li id="2">two</li></ul><p class="note">hi</p></div>"#);
	let reference = dom.clone_deep(&current);
	let recorder = Recorder::new();

	diff::morph(&dom, &current, &reference, &recorder.options()).unwrap();

	assert_eq!(dom.moves.get(), 0);
	assert_eq!(dom.inserts.get(), 0);
	assert_eq!(dom.removals.get(), 0);
	assert!(recorder.is_empty(), "no mutation events for an identical reference");
}

#[test]
fn new_reference_children_are_inserted_as_copies() {
	init_logging();
	let dom = CountingDom::new();
	let current = identified_list(&dom, &["a"]);
	let kept = dom.children(&current)[0].clone();
	let reference = identified_list(&dom, &["b", "a"]);
	let recorder = Recorder::new();

	diff::morph(&dom, &current, &reference, &recorder.options()).unwrap();

	assert_eq!(child_ids(&dom, &current), ["b", "a"]);
	assert_eq!(dom.children(&current)[1], kept);
	assert_eq!(recorder.added().len(), 1);
	// The insertion is a deep copy, never the reference node itself.
	assert_ne!(recorder.added()[0], dom.children(&reference)[0]);
	assert_eq!(dom.moves.get(), 0);
}

#[test]
fn mixed_edit_reaches_reference_shape() {
	init_logging();
	let dom = CountingDom::new();
	let current = parse_one(&dom, r#"<div><p id="x">p</p><span id="y">s</span><b id="z">b</b></div>"#);
	let reference = parse_one(&dom, r#"<div><b id="z">b</b><em>new</em><p id="x">p</p></div>"#);

	diff::morph(&dom, &current, &reference, &MorphOptions::default()).unwrap();

	assert_eq!(child_local_names(&dom, &current), ["b", "em", "p"]);
	assert_eq!(child_ids(&dom, &current), ["z", "", "x"]);
	assert_eq!(dom.removals.get(), 1);
}

#[test]
fn current_whitespace_is_removable() {
	init_logging();
	let dom = CountingDom::new();
	let current = parse_one(&dom, "<ul> <li>A</li> </ul>");
	let reference = parse_one(&dom, "<ul><li>A</li></ul>");

	diff::morph(&dom, &current, &reference, &MorphOptions::default()).unwrap();

	assert_eq!(dom.children(&current).len(), 1);
	assert_eq!(child_local_names(&dom, &current), ["li"]);
}

#[test]
fn reference_whitespace_is_created() {
	init_logging();
	let dom = CountingDom::new();
	let current = parse_one(&dom, "<ul><li>A</li></ul>");
	let reference = parse_one(&dom, "<ul> <li>A</li> </ul>");

	diff::morph(&dom, &current, &reference, &MorphOptions::default()).unwrap();

	assert_eq!(dom.children(&current).len(), 3);
}

#[test]
fn containers_match_through_descendant_id_sets() {
	init_logging();
	let dom = CountingDom::new();
	let current = parse_one(&dom, r#"<div><section><p id="a">one</p></section><section><p id="b">two</p></section></div>"#);
	let sections = dom.children(&current);
	let reference = parse_one(&dom, r#"<div><section><p id="b">TWO</p></section><section><p id="a">ONE</p></section></div>"#);

	diff::morph(&dom, &current, &reference, &MorphOptions::default()).unwrap();

	let after = dom.children(&current);
	assert_eq!(after, vec![sections[1].clone(), sections[0].clone()], "sections swap without losing identity");
	assert_eq!(text_of(&dom, &dom.children(&after[0])[0]), "TWO");
	assert_eq!(text_of(&dom, &dom.children(&after[1])[0]), "ONE");
	assert_eq!(dom.moves.get(), 1);
}

#[test]
fn anchors_match_through_stable_href() {
	init_logging();
	let dom = CountingDom::new();
	let current = parse_one(&dom, r#"<div><a href="/one">1</a><a href="/two">2</a></div>"#);
	let anchors = dom.children(&current);
	let reference = parse_one(&dom, r#"<div><a href="/two">B</a><a href="/one">A</a></div>"#);

	diff::morph(&dom, &current, &reference, &MorphOptions::default()).unwrap();

	let after = dom.children(&current);
	assert_eq!(after, vec![anchors[1].clone(), anchors[0].clone()]);
	assert_eq!(text_of(&dom, &after[0]), "B");
	assert_eq!(text_of(&dom, &after[1]), "A");
}

#[test]
fn relocation_falls_back_to_insert_before() {
	init_logging();
	let dom = CountingDom::without_move_before();
	let current = identified_list(&dom, &["1", "2", "3", "4", "5"]);
	let reference = identified_list(&dom, &["5", "4", "3", "2", "1"]);

	diff::morph(&dom, &current, &reference, &MorphOptions::default()).unwrap();

	assert_eq!(child_ids(&dom, &current), ["5", "4", "3", "2", "1"]);
	assert_eq!(dom.moves.get(), 0);
	assert_eq!(dom.inserts.get(), 4);
}
