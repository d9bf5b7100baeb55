#![doc(html_root_url = "https://docs.rs/morphlex/0.1.0")]
#![warn(clippy::pedantic)]
#![allow(clippy::single_match_else)]

//! In-place markup-tree morphing: transforms a *current* tree until its
//! structure and attributes match a *reference* tree, preserving node
//! identity and emitting the minimum number of moves. See [`diff::morph`].

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

mod id_index;
mod id_set;
mod lis;

pub mod diff;
pub mod dom;
pub mod options;
pub mod rc_dom;
