//! The expression engine behind the derivation workspace.
//!
//! This crate consumes the canonical tree produced by `stepmath-parser` and provides everything
//! needed to display, address, and transform it:
//!
//! - [`canonical`] assigns content-derived stable ids to every node;
//! - [`mathml`] serializes trees to Content MathML (and back) and renders the annotated
//!   Presentation MathML used by the display layer;
//! - [`address`] resolves stable ids back to subtrees and splices replacements;
//! - [`rewrite`] applies algebraic operations to a subtree, optionally mirrored across both
//!   sides of a relation.
//!
//! Every function here is pure: trees are immutable, and each operation returns a new tree or an
//! error value.

pub mod address;
pub mod canonical;
pub mod mathml;
pub mod rewrite;

pub use address::{find_and_replace_by_id, find_node_by_id};
pub use canonical::{canonical_signature, canonicalize};
pub use mathml::{content::{decode_content, encode_content}, presentation::render_presentation};
pub use rewrite::{apply_rewrite, MirrorMode, Operation, OpKind};
