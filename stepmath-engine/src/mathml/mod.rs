//! Serialization of expression trees to and from MathML.
//!
//! The [`content`] module handles the machine-oriented Content MathML encoding used for
//! persistence and interchange; the [`presentation`] module renders the display-oriented
//! Presentation MathML whose elements are annotated with stable node ids.

pub mod content;
pub mod error;
pub mod presentation;

/// The namespace every emitted `<math>` element is qualified with.
pub const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";

/// Returns the dedicated Content MathML operator tag for a recognized function name.
///
/// Unrecognized functions are encoded with a `<ci>` operator head carrying the name instead.
pub fn known_func_tag(name: &str) -> Option<&'static str> {
    match name {
        "sin" => Some("sin"),
        "cos" => Some("cos"),
        _ => None,
    }
}

/// Escapes text for use in markup content or attribute values.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Reverses [`escape_text`], tolerating the apostrophe entity as well.
pub fn unescape_text(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
