use morphlex::{diff, dom::Dom, options::MorphOptions, rc_dom::RcDom};

use support_::{child_local_names, init_logging, parse_one, text_of, Event, Recorder};

#[test]
fn vetoing_the_visit_skips_the_whole_pair() {
	init_logging();
	let dom = RcDom::new();
	let list = parse_one(&dom, "<ul><li>A</li></ul>");
	let before = list.to_html();
	let recorder = Recorder::new();
	let mut options = recorder.options();
	options.before_node_visited = Some(Box::new(|_, _| false));

	diff::morph(&dom, &list, "<ul><li>B</li><li>C</li></ul>", &options).unwrap();

	assert_eq!(list.to_html(), before);
	assert_eq!(recorder.visits(), 0, "a vetoed visit fires no after hook");
}

#[test]
fn vetoed_removal_keeps_the_node() {
	init_logging();
	let dom = RcDom::new();
	let list = parse_one(&dom, "<ul><li>A</li><li>B</li><li>C</li></ul>");
	let original = dom.children(&list);
	let recorder = Recorder::new();
	let mut options = recorder.options();
	options.before_node_removed = Some(Box::new(|_| false));

	diff::morph(&dom, &list, "<ul><li>A</li><li>C</li></ul>", &options).unwrap();

	assert_eq!(dom.children(&list), original, "the survivor stays where it was");
	assert!(recorder.removed().is_empty());
}

#[test]
fn vetoed_addition_is_skipped() {
	init_logging();
	let dom = RcDom::new();
	let list = parse_one(&dom, r#"<ul><li id="a">A</li></ul>"#);
	let recorder = Recorder::new();
	let mut options = recorder.options();
	options.before_node_added = Some(Box::new(|_, _, _| false));

	diff::morph(&dom, &list, r#"<ul><li id="b">B</li><li id="a">A</li></ul>"#, &options).unwrap();

	assert_eq!(dom.children(&list).len(), 1);
	assert!(recorder.added().is_empty());
}

#[test]
fn vetoed_attribute_update_is_left_untouched() {
	init_logging();
	let dom = RcDom::new();
	let element = parse_one(&dom, r#"<div class="old" data-keep="1"></div>"#);
	let recorder = Recorder::new();
	let mut options = recorder.options();
	options.before_attribute_updated = Some(Box::new(|_, name, _| name != "class"));

	diff::morph(&dom, &element, r#"<div class="new" data-keep="2"></div>"#, &options).unwrap();

	assert_eq!(dom.get_attribute(&element, "class").as_deref(), Some("old"));
	assert_eq!(dom.get_attribute(&element, "data-keep").as_deref(), Some("2"));
	assert_eq!(recorder.attribute_updates(), 1);
}

#[test]
fn vetoed_attribute_removal_is_left_untouched() {
	init_logging();
	let dom = RcDom::new();
	let element = parse_one(&dom, r#"<div class="keep"></div>"#);
	let mut options = MorphOptions::default();
	options.before_attribute_updated = Some(Box::new(|_, _, new_value| new_value.is_some()));

	diff::morph(&dom, &element, r#"<div id="fresh"></div>"#, &options).unwrap();

	assert_eq!(dom.get_attribute(&element, "class").as_deref(), Some("keep"));
	assert_eq!(dom.get_attribute(&element, "id").as_deref(), Some("fresh"));
}

#[test]
fn replacement_is_cancelled_when_the_addition_is_vetoed() {
	init_logging();
	let dom = RcDom::new();
	let container = parse_one(&dom, "<div><span></span></div>");
	let span = dom.children(&container)[0].clone();
	let recorder = Recorder::new();
	let mut options = recorder.options();
	options.before_node_added = Some(Box::new(|_, _, _| false));

	diff::morph(&dom, &span, "<p></p>", &options).unwrap();

	assert_eq!(dom.children(&container), vec![span]);
	assert!(recorder.added().is_empty());
	assert!(recorder.removed().is_empty(), "a half-approved replacement mutates nothing");
}

#[test]
fn replacement_is_cancelled_when_the_removal_is_vetoed() {
	init_logging();
	let dom = RcDom::new();
	let container = parse_one(&dom, "<div><span></span></div>");
	let span = dom.children(&container)[0].clone();
	let recorder = Recorder::new();
	let mut options = recorder.options();
	options.before_node_removed = Some(Box::new(|_| false));

	diff::morph(&dom, &span, "<p></p>", &options).unwrap();

	assert_eq!(dom.children(&container), vec![span]);
	assert!(recorder.added().is_empty());
	assert!(recorder.removed().is_empty());
}

#[test]
fn vetoing_the_child_phase_keeps_children_but_morphs_attributes() {
	init_logging();
	let dom = RcDom::new();
	let list = parse_one(&dom, r#"<ul class="old"><li>A</li></ul>"#);
	let original = dom.children(&list);
	let recorder = Recorder::new();
	let mut options = recorder.options();
	options.before_children_visited = Some(Box::new(|_| false));

	diff::morph(&dom, &list, r#"<ul class="new"><li>B</li><li>C</li></ul>"#, &options).unwrap();

	assert_eq!(dom.get_attribute(&list, "class").as_deref(), Some("new"));
	assert_eq!(dom.children(&list), original);
	assert!(!recorder.events().iter().any(|event| matches!(event, Event::ChildrenVisited(_))));
}

#[test]
fn visit_notifications_are_post_order() {
	init_logging();
	let dom = RcDom::new();
	let container = parse_one(&dom, r#"<div><p id="p">old</p></div>"#);
	let paragraph = dom.children(&container)[0].clone();
	let recorder = Recorder::new();

	diff::morph(&dom, &container, r#"<div><p id="p">new</p></div>"#, &recorder.options()).unwrap();

	assert_eq!(text_of(&dom, &paragraph), "new");
	let visited: Vec<_> = recorder
		.events()
		.into_iter()
		.filter_map(|event| match event {
			Event::Visited(node) => Some(node),
			_ => None,
		})
		.collect();
	let position = |node| visited.iter().position(|seen| *seen == node);
	assert!(position(paragraph) < position(container), "children complete before their parent's after hook");
}

#[test]
fn children_veto_still_reaches_shape_elsewhere() {
	init_logging();
	let dom = RcDom::new();
	let container = parse_one(&dom, "<div><ul><li>A</li></ul><p>x</p></div>");
	let list = dom.children(&container)[0].clone();
	let veto_target = list.clone();
	let mut options = MorphOptions::default();
	options.before_children_visited = Some(Box::new(move |parent| *parent != veto_target));

	diff::morph(&dom, &container, "<div><ul><li>B</li></ul><p>y</p></div>", &options).unwrap();

	assert_eq!(child_local_names(&dom, &container), ["ul", "p"]);
	assert_eq!(text_of(&dom, &list), "");
	assert_eq!(text_of(&dom, &dom.children(&container)[1]), "y");
	let item = dom.children(&list)[0].clone();
	assert_eq!(text_of(&dom, &item), "A", "the vetoed list keeps its children");
}
