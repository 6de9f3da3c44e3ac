//! Font family and variant model
//!
//! These types mirror the shape users write in `fonts.toml` / JSON config:
//!
//! ```toml
//! [[fonts]]
//! family = "Inter"
//! local = "Inter"
//!
//! [[fonts.variants]]
//! src = ["fonts/Inter-Regular.woff2", "fonts/Inter-Regular.woff"]
//! weight = 400
//! display = "swap"
//! ```
//!
//! Descriptor keys other than `src` and `format` are kept in the order they
//! were written and become `@font-face` properties.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value that may be given either as a single item or as a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(value) => std::slice::from_ref(value),
            OneOrMany::Many(values) => values,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<'a, T> IntoIterator for &'a OneOrMany<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<&str> for OneOrMany<String> {
    fn from(value: &str) -> Self {
        OneOrMany::One(value.to_string())
    }
}

impl From<String> for OneOrMany<String> {
    fn from(value: String) -> Self {
        OneOrMany::One(value)
    }
}

impl From<Vec<String>> for OneOrMany<String> {
    fn from(values: Vec<String>) -> Self {
        OneOrMany::Many(values)
    }
}

impl From<Vec<&str>> for OneOrMany<String> {
    fn from(values: Vec<&str>) -> Self {
        OneOrMany::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for OneOrMany<String> {
    fn from(values: [&str; N]) -> Self {
        OneOrMany::Many(values.iter().map(|v| v.to_string()).collect())
    }
}

/// A descriptor value, written into CSS verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CssValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for CssValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CssValue::Integer(value) => write!(f, "{}", value),
            CssValue::Float(value) => write!(f, "{}", value),
            CssValue::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for CssValue {
    fn from(value: &str) -> Self {
        CssValue::Text(value.to_string())
    }
}

impl From<String> for CssValue {
    fn from(value: String) -> Self {
        CssValue::Text(value)
    }
}

impl From<i64> for CssValue {
    fn from(value: i64) -> Self {
        CssValue::Integer(value)
    }
}

impl From<i32> for CssValue {
    fn from(value: i32) -> Self {
        CssValue::Integer(value.into())
    }
}

impl From<u16> for CssValue {
    fn from(value: u16) -> Self {
        CssValue::Integer(value.into())
    }
}

impl From<f64> for CssValue {
    fn from(value: f64) -> Self {
        CssValue::Float(value)
    }
}

/// Generates chainable setters for the descriptors `@font-face` understands.
macro_rules! descriptor_setters {
    ($($(#[$doc:meta])* $method:ident => $key:literal),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $method(self, value: impl Into<CssValue>) -> Self {
                self.with_property($key, value)
            }
        )*
    };
}

macro_rules! impl_descriptor_setters {
    () => {
        descriptor_setters! {
            /// `font-weight`
            with_weight => "weight",
            /// `font-display`
            with_display => "display",
            /// `font-stretch`
            with_stretch => "stretch",
            /// `font-style`
            with_style => "style",
            /// `font-variant`
            with_variant => "variant",
            /// `font-variation-settings`
            with_variation_settings => "variationSettings",
            /// `font-feature-settings`
            with_feature_settings => "featureSettings",
            /// `ascent-override`
            with_ascent_override => "ascentOverride",
            /// `descent-override`
            with_descent_override => "descentOverride",
            /// `line-gap-override`
            with_line_gap_override => "lineGapOverride",
            /// `unicode-range`
            with_unicode_range => "unicodeRange",
            /// `size-adjust`
            with_size_adjust => "sizeAdjust",
        }
    };
}

/// Everything about a variant except its sources
///
/// This is what a discovery mapping function returns for each matched file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontDescriptors {
    /// Explicit `format()` hint, overriding extension inference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Descriptor name -> value, in insertion order
    #[serde(flatten)]
    pub properties: IndexMap<String, CssValue>,
}

impl FontDescriptors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Set an arbitrary descriptor. Re-setting a key keeps its original position.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<CssValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    impl_descriptor_setters!();
}

/// One loadable face of a family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontVariant {
    /// Source path or paths, relative to the build root
    pub src: OneOrMany<String>,

    #[serde(flatten)]
    pub descriptors: FontDescriptors,
}

impl FontVariant {
    pub fn new(src: impl Into<OneOrMany<String>>) -> Self {
        Self {
            src: src.into(),
            descriptors: FontDescriptors::default(),
        }
    }

    /// Build a variant from discovered descriptors and a single matched path
    pub fn from_descriptors(src: impl Into<OneOrMany<String>>, descriptors: FontDescriptors) -> Self {
        Self {
            src: src.into(),
            descriptors,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.descriptors.format = Some(format.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<CssValue>) -> Self {
        self.descriptors.properties.insert(name.into(), value.into());
        self
    }

    impl_descriptor_setters!();

    /// Explicit format hint, ignoring empty strings
    ///
    /// An empty `format` (what a blank field in a config file deserializes
    /// to) counts as unset, so the hint falls back to the file extension
    /// instead of silently dropping `format()`.
    pub fn format(&self) -> Option<&str> {
        self.descriptors
            .format
            .as_deref()
            .filter(|format| !format.is_empty())
    }

    pub fn properties(&self) -> &IndexMap<String, CssValue> {
        &self.descriptors.properties
    }

    pub fn sources(&self) -> &[String] {
        self.src.as_slice()
    }
}

/// A named group of variants sharing one `font-family` value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontFamily {
    pub family: String,

    /// Names for `local()` terms, shared by every variant of the family
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<OneOrMany<String>>,

    #[serde(default)]
    pub variants: Vec<FontVariant>,
}

impl FontFamily {
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            local: None,
            variants: Vec::new(),
        }
    }

    pub fn with_local(mut self, local: impl Into<OneOrMany<String>>) -> Self {
        self.local = Some(local.into());
        self
    }

    pub fn with_variant(mut self, variant: FontVariant) -> Self {
        self.variants.push(variant);
        self
    }

    /// Non-empty `local()` names
    pub fn local_names(&self) -> impl Iterator<Item = &str> {
        self.local
            .iter()
            .flat_map(|local| local.iter())
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    /// Every source path of every variant, in declaration order
    pub fn source_paths(&self) -> impl Iterator<Item = &str> {
        self.variants
            .iter()
            .flat_map(|variant| variant.sources().iter())
            .map(String::as_str)
    }
}
