//! Host bundler seam
//!
//! The plugin never talks to a bundler directly. Hosts hand it a
//! [`ResolvedConfig`], an [`AssetEmitter`] during bundle generation, and splice
//! the returned [`HtmlTagDescriptor`]s into the document head.

use crate::error::{FontsError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::{Path, PathBuf};

/// The parts of the host's resolved build configuration the plugin needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    /// Project root; font paths and discovery patterns are relative to it
    pub root: PathBuf,

    /// Public base URL prepended to every emitted asset reference
    #[serde(default = "default_base")]
    pub base: String,

    /// Production builds emit assets; development builds inline CSS
    #[serde(default)]
    pub is_production: bool,
}

fn default_base() -> String {
    "/".to_string()
}

impl ResolvedConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base: default_base(),
            is_production: false,
        }
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    pub fn production(mut self, is_production: bool) -> Self {
        self.is_production = is_production;
        self
    }
}

/// Opaque handle returned by the host when an asset is emitted
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceId(String);

impl ReferenceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Asset contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSource {
    Bytes(Vec<u8>),
    Text(String),
}

impl AssetSource {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            AssetSource::Bytes(bytes) => bytes,
            AssetSource::Text(text) => text.as_bytes(),
        }
    }
}

/// A `type: asset` registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedAsset {
    /// Suggested file name; the host decides the final one
    pub name: String,
    pub source: AssetSource,
}

/// Host asset pipeline, available only in production builds
pub trait AssetEmitter {
    /// Register an asset and return a reference to it
    fn emit_file(&mut self, asset: EmittedAsset) -> Result<ReferenceId>;

    /// Final output file name for a previously emitted asset
    fn get_file_name(&self, reference: &ReferenceId) -> Result<String>;
}

/// An asset held by [`HashedAssetEmitter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputAsset {
    pub file_name: String,
    pub original_name: String,
    pub source: AssetSource,
}

/// In-memory asset pipeline with content-hashed names
///
/// Names follow `[assets_dir]/[stem]-[hash8].[ext]`. Emitting the same name
/// with identical content returns the same file name. Hosts that own their
/// output directory can iterate [`HashedAssetEmitter::assets`] and write them.
#[derive(Debug, Clone)]
pub struct HashedAssetEmitter {
    assets_dir: String,
    assets: IndexMap<ReferenceId, OutputAsset>,
}

impl HashedAssetEmitter {
    pub fn new(assets_dir: impl Into<String>) -> Self {
        Self {
            assets_dir: assets_dir.into().trim_matches('/').to_string(),
            assets: IndexMap::new(),
        }
    }

    pub fn assets(&self) -> impl Iterator<Item = &OutputAsset> {
        self.assets.values()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Look up an emitted asset by its final file name
    pub fn asset(&self, file_name: &str) -> Option<&OutputAsset> {
        self.assets.values().find(|asset| asset.file_name == file_name)
    }

    fn file_name_for(&self, name: &str, hash: &str) -> String {
        let path = Path::new(name);
        let stem = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("asset");
        let hash_short = &hash[..8.min(hash.len())];

        let file = match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => format!("{}-{}.{}", stem, hash_short, ext),
            None => format!("{}-{}", stem, hash_short),
        };

        if self.assets_dir.is_empty() {
            file
        } else {
            format!("{}/{}", self.assets_dir, file)
        }
    }
}

impl Default for HashedAssetEmitter {
    fn default() -> Self {
        Self::new("assets")
    }
}

fn hash_content(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

impl AssetEmitter for HashedAssetEmitter {
    fn emit_file(&mut self, asset: EmittedAsset) -> Result<ReferenceId> {
        if asset.name.is_empty() {
            return Err(FontsError::emit(asset.name, "asset name is empty"));
        }

        let hash = hash_content(asset.source.as_bytes());
        let file_name = self.file_name_for(&asset.name, &hash);
        let reference = ReferenceId::new(file_name.clone());

        self.assets
            .entry(reference.clone())
            .or_insert_with(|| OutputAsset {
                file_name,
                original_name: asset.name,
                source: asset.source,
            });

        Ok(reference)
    }

    fn get_file_name(&self, reference: &ReferenceId) -> Result<String> {
        self.assets
            .get(reference)
            .map(|asset| asset.file_name.clone())
            .ok_or_else(|| FontsError::UnknownReference {
                reference: reference.to_string(),
            })
    }
}

/// A tag to splice into the document `<head>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HtmlTagDescriptor {
    pub tag: String,

    /// Attributes in render order; a `None` value renders as a bare attribute
    #[serde(default)]
    pub attrs: IndexMap<String, Option<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<String>,
}

impl HtmlTagDescriptor {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: IndexMap::new(),
            children: None,
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), Some(value.into()));
        self
    }

    pub fn with_flag(mut self, name: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), None);
        self
    }

    pub fn with_children(mut self, children: impl Into<String>) -> Self {
        self.children = Some(children.into());
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(|value| value.as_deref())
    }

    /// Render as markup. `link` and `meta` are void elements.
    pub fn to_html(&self) -> String {
        let mut out = format!("<{}", self.tag);
        for (name, value) in &self.attrs {
            match value {
                Some(value) => out.push_str(&format!(" {}=\"{}\"", name, escape_attr(value))),
                None => out.push_str(&format!(" {}", name)),
            }
        }
        out.push('>');

        if !matches!(self.tag.as_str(), "link" | "meta") {
            if let Some(children) = &self.children {
                out.push_str(children);
            }
            out.push_str(&format!("</{}>", self.tag));
        }

        out
    }
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// The three lifecycle callbacks a host drives, in order
pub trait FontsHooks: Send + Sync {
    fn name(&self) -> &'static str;

    /// Capture the resolved build configuration
    fn config_resolved(&self, config: ResolvedConfig) -> Result<()>;

    /// Emit assets; production builds only
    fn generate_bundle(&self, emitter: &mut dyn AssetEmitter) -> Result<()>;

    /// Tags to inject into the HTML entry point
    fn transform_index_html(&self) -> Result<Vec<HtmlTagDescriptor>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_config_defaults() {
        let config = ResolvedConfig::new("/project");
        assert_eq!(config.base, "/");
        assert!(!config.is_production);
    }

    #[test]
    fn hashed_names_keep_stem_and_extension() {
        let mut emitter = HashedAssetEmitter::default();
        let reference = emitter
            .emit_file(EmittedAsset {
                name: "Inter-Regular.woff2".to_string(),
                source: AssetSource::Bytes(vec![1, 2, 3]),
            })
            .unwrap();

        let file_name = emitter.get_file_name(&reference).unwrap();
        assert!(file_name.starts_with("assets/Inter-Regular-"));
        assert!(file_name.ends_with(".woff2"));
        assert_eq!(file_name.len(), "assets/Inter-Regular-".len() + 8 + ".woff2".len());
    }

    #[test]
    fn identical_content_is_deduplicated() {
        let mut emitter = HashedAssetEmitter::new("");
        let asset = EmittedAsset {
            name: "fonts.css".to_string(),
            source: AssetSource::Text("body {}".to_string()),
        };

        let first = emitter.emit_file(asset.clone()).unwrap();
        let second = emitter.emit_file(asset).unwrap();
        assert_eq!(first, second);
        assert_eq!(emitter.len(), 1);
        assert!(!emitter.get_file_name(&first).unwrap().contains('/'));
    }

    #[test]
    fn unknown_reference_is_an_error() {
        let emitter = HashedAssetEmitter::default();
        let err = emitter.get_file_name(&ReferenceId::new("nope")).unwrap_err();
        assert!(matches!(err, FontsError::UnknownReference { .. }));
    }

    #[test]
    fn renders_void_and_content_tags() {
        let link = HtmlTagDescriptor::new("link")
            .with_attr("rel", "preload")
            .with_attr("href", "/a.woff2")
            .with_flag("crossorigin");
        assert_eq!(
            link.to_html(),
            "<link rel=\"preload\" href=\"/a.woff2\" crossorigin>"
        );

        let style = HtmlTagDescriptor::new("style")
            .with_attr("type", "text/css")
            .with_children("\na {}\n");
        assert_eq!(style.to_html(), "<style type=\"text/css\">\na {}\n</style>");
    }

    #[test]
    fn escapes_attribute_values() {
        let tag = HtmlTagDescriptor::new("link").with_attr("href", "/a\"b&c.css");
        assert_eq!(tag.to_html(), "<link href=\"/a&quot;b&amp;c.css\">");
    }
}
