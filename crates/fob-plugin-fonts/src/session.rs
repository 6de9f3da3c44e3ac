//! Per-build state
//!
//! A [`BuildSession`] is created when the host resolves its configuration and
//! carries the options, the (possibly resolved) font list, and the emitted CSS
//! file name through the remaining hooks.
//!
//! ```text
//! Configured ──generate_bundle (production)──▶ AssetsResolved
//!     │                                              │
//!     └──────────transform_index_html────────────────┴──▶ HtmlInjected
//! ```

use crate::config::PluginOptions;
use crate::css::{build_font_face_declarations, infer_format};
use crate::error::{FontsError, Result};
use crate::host::{AssetEmitter, AssetSource, EmittedAsset, HtmlTagDescriptor, ResolvedConfig};
use crate::types::{FontFamily, FontVariant, OneOrMany};
use path_clean::PathClean;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Name of the consolidated stylesheet asset
pub const CSS_ASSET_NAME: &str = "fonts.css";

/// Where a session is in the build lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Configured,
    AssetsResolved,
    HtmlInjected,
}

/// Options, config and font list for a single build
#[derive(Debug, Clone)]
pub struct BuildSession {
    options: PluginOptions,
    config: ResolvedConfig,
    fonts: Vec<FontFamily>,
    css_file_name: Option<String>,
    state: SessionState,
}

impl BuildSession {
    /// Start a session from finalized options
    pub fn new(options: PluginOptions, config: ResolvedConfig) -> Self {
        let fonts = options.fonts.clone();
        Self {
            options,
            config,
            fonts,
            css_file_name: None,
            state: SessionState::Configured,
        }
    }

    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    /// Current font list; paths are output file names after asset resolution
    pub fn fonts(&self) -> &[FontFamily] {
        &self.fonts
    }

    pub fn css_file_name(&self) -> Option<&str> {
        self.css_file_name.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// CSS for the current font list
    pub fn css(&self) -> String {
        build_font_face_declarations(&self.fonts, self.options.verbose, &self.config.base)
    }

    /// Emit font files (and `fonts.css` when enabled) through the host
    ///
    /// Development builds have no asset pipeline, so this does nothing there.
    pub fn generate_bundle(&mut self, emitter: &mut dyn AssetEmitter) -> Result<()> {
        if !self.config.is_production {
            debug!("[fob-fonts] Skipping asset emission outside production");
            return Ok(());
        }

        self.fonts = resolve_assets(&self.fonts, &self.config.root, emitter, self.options.verbose)?;

        if self.options.emit_css {
            let source = self.css();
            let reference = emitter.emit_file(EmittedAsset {
                name: CSS_ASSET_NAME.to_string(),
                source: AssetSource::Text(source),
            })?;
            let file_name = emitter.get_file_name(&reference)?;

            if self.options.verbose {
                info!("[fob-fonts] Emitted {}", file_name);
            }
            self.css_file_name = Some(file_name);
        }

        self.state = SessionState::AssetsResolved;
        Ok(())
    }

    /// Tags for the HTML entry point
    ///
    /// Production builds with an emitted stylesheet get a `<link>` plus one
    /// preload per font file; everything else gets an inline `<style>`.
    pub fn transform_index_html(&mut self) -> Vec<HtmlTagDescriptor> {
        self.state = SessionState::HtmlInjected;

        if self.fonts.is_empty() {
            return Vec::new();
        }

        let linked = self
            .css_file_name
            .as_deref()
            .filter(|_| self.options.emit_css && self.config.is_production);

        match linked {
            Some(css_file_name) => {
                if self.options.verbose {
                    info!("[fob-fonts] Added <link> to index.html.");
                }

                let mut tags = vec![HtmlTagDescriptor::new("link")
                    .with_attr("rel", "stylesheet")
                    .with_attr("href", self.public_url(css_file_name))];

                tags.extend(
                    self.fonts
                        .iter()
                        .flat_map(|family| family.source_paths())
                        .map(|path| self.preload_tag(path)),
                );
                tags
            }
            None => {
                let css = self.css();
                if self.options.verbose {
                    info!("[fob-fonts] Added <style> tag to index.html.");
                    info!("{}", css);
                }

                vec![HtmlTagDescriptor::new("style")
                    .with_attr("type", "text/css")
                    .with_children(format!("\n{}\n", css))]
            }
        }
    }

    fn public_url(&self, file_name: &str) -> String {
        format!("{}{}", self.config.base, file_name)
    }

    fn preload_tag(&self, path: &str) -> HtmlTagDescriptor {
        let mut tag = HtmlTagDescriptor::new("link")
            .with_attr("rel", "preload")
            .with_attr("href", self.public_url(path))
            .with_attr("as", "font");

        if let Some(mime) = font_mime_type(path) {
            tag = tag.with_attr("type", mime);
        }

        tag.with_flag("crossorigin")
    }
}

/// MIME type for a font file, when the format is known
pub fn font_mime_type(path: &str) -> Option<&'static str> {
    match infer_format(path)? {
        "woff" => Some("font/woff"),
        "woff2" => Some("font/woff2"),
        "truetype" => Some("font/ttf"),
        "opentype" => Some("font/otf"),
        "embedded-opentype" => Some("application/vnd.ms-fontobject"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

/// Emit every font source and return families whose paths are output names
///
/// Sources are resolved against `root`, read, and registered under their base
/// file name. The first missing or unreadable file aborts the whole step.
pub fn resolve_assets(
    fonts: &[FontFamily],
    root: &Path,
    emitter: &mut dyn AssetEmitter,
    verbose: bool,
) -> Result<Vec<FontFamily>> {
    let mut resolved = Vec::with_capacity(fonts.len());

    for family in fonts {
        let mut variants = Vec::with_capacity(family.variants.len());

        for variant in &family.variants {
            let mut src = Vec::with_capacity(variant.sources().len());
            for source in variant.sources() {
                src.push(emit_font(&family.family, root, source, emitter, verbose)?);
            }

            variants.push(FontVariant {
                src: OneOrMany::Many(src),
                descriptors: variant.descriptors.clone(),
            });
        }

        resolved.push(FontFamily {
            family: family.family.clone(),
            local: family.local.clone(),
            variants,
        });
    }

    Ok(resolved)
}

fn resolve_source(root: &Path, source: &str) -> PathBuf {
    root.join(source).clean()
}

fn emit_font(
    family: &str,
    root: &Path,
    source: &str,
    emitter: &mut dyn AssetEmitter,
    verbose: bool,
) -> Result<String> {
    let resolved = resolve_source(root, source);
    let name = resolved
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.to_string());

    let bytes = std::fs::read(&resolved).map_err(|e| FontsError::read_font(resolved.clone(), e))?;
    let reference = emitter.emit_file(EmittedAsset {
        name,
        source: AssetSource::Bytes(bytes),
    })?;
    let output = emitter.get_file_name(&reference)?;

    if verbose {
        info!("[fob-fonts] [{}] Emitted {}", family, output);
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HashedAssetEmitter;
    use std::fs;
    use tempfile::TempDir;

    fn fonts() -> Vec<FontFamily> {
        vec![FontFamily::new("My Font")
            .with_local("MyFont")
            .with_variant(FontVariant::new("fonts/a.woff2").with_weight(700))]
    }

    fn root_with_font() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("fonts")).unwrap();
        fs::write(dir.path().join("fonts/a.woff2"), b"wOF2").unwrap();
        dir
    }

    #[test]
    fn resolve_assets_returns_new_paths_without_mutating_input() {
        let dir = root_with_font();
        let input = fonts();
        let mut emitter = HashedAssetEmitter::default();

        let resolved = resolve_assets(&input, dir.path(), &mut emitter, false).unwrap();

        assert_eq!(input[0].variants[0].sources(), ["fonts/a.woff2"]);
        let output = &resolved[0].variants[0].sources()[0];
        assert!(output.starts_with("assets/a-"));
        assert_eq!(emitter.asset(output).unwrap().original_name, "a.woff2");
        assert_eq!(resolved[0].variants[0].properties(), input[0].variants[0].properties());
    }

    #[test]
    fn resolve_assets_fails_on_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut emitter = HashedAssetEmitter::default();

        let err = resolve_assets(&fonts(), dir.path(), &mut emitter, false).unwrap_err();
        assert!(matches!(err, FontsError::ReadFont { .. }));
        assert!(emitter.is_empty());
    }

    #[test]
    fn resolve_source_normalizes_parent_segments() {
        let resolved = resolve_source(Path::new("/project/web"), "../fonts/a.woff2");
        assert_eq!(resolved, PathBuf::from("/project/fonts/a.woff2"));
    }

    #[test]
    fn development_session_skips_emission() {
        let options = PluginOptions::new().with_fonts(fonts());
        let mut session = BuildSession::new(options, ResolvedConfig::new("/nowhere"));
        let mut emitter = HashedAssetEmitter::default();

        session.generate_bundle(&mut emitter).unwrap();
        assert!(emitter.is_empty());
        assert_eq!(session.state(), SessionState::Configured);
        assert_eq!(session.fonts()[0].variants[0].sources(), ["fonts/a.woff2"]);
    }

    #[test]
    fn production_session_without_css_inlines_resolved_paths() {
        let dir = root_with_font();
        let options = PluginOptions::new().with_fonts(fonts()).with_emit_css(false);
        let config = ResolvedConfig::new(dir.path()).production(true);
        let mut session = BuildSession::new(options, config);
        let mut emitter = HashedAssetEmitter::default();

        session.generate_bundle(&mut emitter).unwrap();
        assert_eq!(emitter.len(), 1);
        assert!(session.css_file_name().is_none());

        let tags = session.transform_index_html();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].tag, "style");
        assert!(tags[0].children.as_deref().unwrap().contains("url(/assets/a-"));
        assert_eq!(session.state(), SessionState::HtmlInjected);
    }

    #[test]
    fn empty_font_list_injects_nothing() {
        let mut session = BuildSession::new(PluginOptions::new(), ResolvedConfig::new("/"));
        assert!(session.transform_index_html().is_empty());
    }

    #[test]
    fn mime_types_follow_formats() {
        assert_eq!(font_mime_type("a.woff2"), Some("font/woff2"));
        assert_eq!(font_mime_type("a.ttf"), Some("font/ttf"));
        assert_eq!(font_mime_type("a.bin"), None);
    }
}
