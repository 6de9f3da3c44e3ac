//! `@font-face` generation
//!
//! Turns a list of [`FontFamily`] values into CSS text. One block is produced
//! per variant, in declaration order, and blocks are separated by a blank line:
//!
//! ```text
//! @font-face {
//!   font-family: "My Font";
//!   font-weight: 700;
//!   src: local("MyFont"), url(/assets/a.woff2) format("woff2");
//! }
//! ```
//!
//! Descriptor values are written verbatim. Nothing here validates CSS.

use crate::types::{CssValue, FontFamily, FontVariant};
use std::path::Path;
use tracing::info;

/// Descriptors that are spelled with a `font-` prefix inside `@font-face`
const FONT_PREFIXED: &[&str] = &[
    "weight",
    "display",
    "stretch",
    "style",
    "variant",
    "variation-settings",
    "feature-settings",
];

/// Map a file path to its `format()` hint based on the extension
///
/// Extensions compare case-insensitively: fonts copied off case-insensitive
/// filesystems often arrive as `FONT.WOFF2`, and browsers need the hint either
/// way.
pub fn infer_format(path: &str) -> Option<&'static str> {
    let extension = Path::new(path).extension()?.to_str()?.to_ascii_lowercase();

    match extension.as_str() {
        "woff" => Some("woff"),
        "woff2" => Some("woff2"),
        "ttf" => Some("truetype"),
        "otf" => Some("opentype"),
        "eot" => Some("embedded-opentype"),
        "svg" | "svgz" => Some("svg"),
        _ => None,
    }
}

/// Wrap names containing whitespace in double quotes
///
/// This is a heuristic, not CSS identifier escaping.
pub fn quote_family_name(name: &str) -> String {
    if name.chars().any(char::is_whitespace) {
        format!("\"{}\"", name)
    } else {
        name.to_string()
    }
}

/// Convert `camelCase`, `snake_case` or `spaced words` to `kebab-case`
pub fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower_or_digit = false;

    for ch in name.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            prev_lower_or_digit = false;
        } else if ch.is_uppercase() {
            if prev_lower_or_digit && !out.ends_with('-') {
                out.push('-');
            }
            out.extend(ch.to_lowercase());
            prev_lower_or_digit = false;
        } else {
            out.push(ch);
            prev_lower_or_digit = ch.is_lowercase() || ch.is_ascii_digit();
        }
    }

    out.trim_end_matches('-').to_string()
}

/// CSS property name for a descriptor key
pub fn property_name(key: &str) -> String {
    let kebab = kebab_case(key);
    if FONT_PREFIXED.contains(&kebab.as_str()) {
        format!("font-{}", kebab)
    } else {
        kebab
    }
}

fn property_line(key: &str, value: &CssValue) -> String {
    format!("  {}: {};", property_name(key), value)
}

fn url_term(base: &str, path: &str, explicit_format: Option<&str>) -> String {
    match explicit_format.or_else(|| infer_format(path)) {
        Some(format) => format!("url({}{}) format(\"{}\")", base, path, format),
        None => format!("url({}{})", base, path),
    }
}

/// Build the `@font-face` block for one variant
pub fn font_face_block(family_name: &str, local_terms: &[String], variant: &FontVariant, base: &str) -> String {
    let mut lines = Vec::with_capacity(variant.properties().len() + 4);
    lines.push("@font-face {".to_string());
    lines.push(format!("  font-family: {};", family_name));

    for (key, value) in variant.properties() {
        lines.push(property_line(key, value));
    }

    let src = local_terms
        .iter()
        .cloned()
        .chain(
            variant
                .sources()
                .iter()
                .map(|path| url_term(base, path, variant.format())),
        )
        .collect::<Vec<_>>()
        .join(", ");
    lines.push(format!("  src: {};", src));
    lines.push("}".to_string());

    lines.join("\n")
}

/// Generate CSS for every variant of every family
///
/// `base` is prepended to each source path inside `url()`.
pub fn build_font_face_declarations(fonts: &[FontFamily], verbose: bool, base: &str) -> String {
    let mut blocks = Vec::new();

    for font_family in fonts {
        let family_name = quote_family_name(&font_family.family);
        let local_terms: Vec<String> = font_family
            .local_names()
            .map(|name| format!("local(\"{}\")", name))
            .collect();

        let before = blocks.len();
        blocks.extend(
            font_family
                .variants
                .iter()
                .map(|variant| font_face_block(&family_name, &local_terms, variant, base)),
        );

        if verbose {
            info!(
                "[fob-fonts] [{}] Generated {} @font-face declarations.",
                font_family.family,
                blocks.len() - before
            );
        }
    }

    blocks.join("\n\n")
}
