//! Data shapes exchanged with the engine's external collaborators.
//!
//! The rewrite-options service receives the current content form plus a selected node id and
//! answers with candidate rewrites; the session layer persists a linear history of steps. Both
//! speak camelCase JSON.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use stepmath_engine::decode_content;
use stepmath_parser::ast::Expr;

/// A request for the rewrite options applicable to a selected subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteOptionsRequest {
    /// The content form of the whole current expression.
    #[serde(rename = "contentMathML")]
    pub content_form: String,

    /// The stable id of the selected node, in hex.
    pub selected_node_id: String,
}

/// One candidate rewrite offered for a selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewriteOption {
    /// An opaque identifier for the option.
    pub id: String,

    /// The human-readable label shown when choosing between options.
    pub label: String,

    /// The name of the rule this option applies, recorded on the resulting step.
    pub rule_name: String,

    /// The replacement subtree, in content form.
    #[serde(rename = "replacementContentMathML")]
    pub replacement_content: String,

    /// The replacement subtree, in presentation form.
    #[serde(rename = "replacementPresentationMathML")]
    pub replacement_presentation: String,
}

impl RewriteOption {
    /// Decodes the replacement content form back into a subtree, ready for splicing.
    pub fn replacement_expr(&self) -> Result<Expr, Error> {
        decode_content(&self.replacement_content).map_err(Error::from)
    }
}

/// The ordered list of options answered by the rewrite-options service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewriteOptionsResponse {
    pub options: Vec<RewriteOption>,
}

/// One entry in the append-only derivation history.
///
/// The engine's obligation is that `content_form` and `presentation_form` were derived from one
/// another in a single pass; the session layer owns everything else about persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    /// An opaque identifier for the step.
    pub id: String,

    /// The step this one was derived from, if any.
    pub parent_id: Option<String>,

    /// The content form of the step's expression.
    pub content_form: String,

    /// The presentation form of the step's expression.
    pub presentation_form: String,

    /// The stable id of the node selected when the step was created.
    pub selection: Option<String>,

    /// The name of the rule whose application produced this step.
    pub applied_rule_name: Option<String>,
}
