//! Plugin options
//!
//! Options can be built in code, parsed from TOML/JSON, or produced by an
//! [`OptionsFactory`] once the build root is known.

use crate::discovery::FontsContext;
use crate::error::{FontsError, Result};
use crate::types::FontFamily;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Build-wide configuration for the fonts plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginOptions {
    /// Font families to process
    #[serde(default)]
    pub fonts: Vec<FontFamily>,

    /// Emit a `fonts.css` asset and link to it in production builds.
    ///
    /// When `false`, or in development, CSS is inlined in a `<style>` tag.
    #[serde(default = "default_emit_css")]
    pub emit_css: bool,

    /// Log every emitted asset and generated declaration
    #[serde(default)]
    pub verbose: bool,
}

fn default_emit_css() -> bool {
    true
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            fonts: Vec::new(),
            emit_css: default_emit_css(),
            verbose: false,
        }
    }
}

impl PluginOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(mut self, family: FontFamily) -> Self {
        self.fonts.push(family);
        self
    }

    pub fn with_fonts(mut self, families: impl IntoIterator<Item = FontFamily>) -> Self {
        self.fonts.extend(families);
        self
    }

    pub fn with_emit_css(mut self, enabled: bool) -> Self {
        self.emit_css = enabled;
        self
    }

    pub fn with_verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// Parse options from TOML text; missing fields take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| FontsError::invalid_config(format!("Invalid TOML: {}", e)))
    }

    /// Parse options from JSON text; missing fields take their defaults
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| FontsError::invalid_config(format!("Invalid JSON: {}", e)))
    }

    /// Load options from a `.toml` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let parse: fn(&str) -> Result<Self> = match extension.as_deref() {
            Some("toml") => Self::from_toml_str,
            Some("json") => Self::from_json_str,
            _ => {
                return Err(FontsError::UnsupportedConfigFormat {
                    path: path.to_path_buf(),
                })
            }
        };

        let content = std::fs::read_to_string(path)?;
        let options = parse(&content)?;
        debug!(
            "[fob-fonts] Loaded {} font families from {}",
            options.fonts.len(),
            path.display()
        );
        Ok(options)
    }

    /// Reject variants that have no sources
    pub fn validate(&self) -> Result<()> {
        for family in &self.fonts {
            if family.variants.iter().any(|variant| variant.src.is_empty()) {
                return Err(FontsError::EmptySource {
                    family: family.family.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Produces options once the host root is known
pub type OptionsFactory = Box<dyn Fn(&FontsContext) -> Result<PluginOptions> + Send + Sync>;

/// What the user handed to the plugin
pub enum UserOptions {
    Static(PluginOptions),
    Factory(OptionsFactory),
}

impl UserOptions {
    /// Finalize options for a build rooted at `context`
    pub fn resolve(&self, context: &FontsContext) -> Result<PluginOptions> {
        let options = match self {
            UserOptions::Static(options) => options.clone(),
            UserOptions::Factory(factory) => factory(context)?,
        };
        options.validate()?;
        Ok(options)
    }
}

impl std::fmt::Debug for UserOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserOptions::Static(options) => f.debug_tuple("Static").field(options).finish(),
            UserOptions::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

impl From<PluginOptions> for UserOptions {
    fn from(options: PluginOptions) -> Self {
        UserOptions::Static(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FontVariant, OneOrMany};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_emit_css_quietly() {
        let options = PluginOptions::default();
        assert!(options.fonts.is_empty());
        assert!(options.emit_css);
        assert!(!options.verbose);
    }

    #[test]
    fn toml_fills_in_defaults() {
        let options = PluginOptions::from_toml_str(
            r#"
[[fonts]]
family = "My Font"
local = "MyFont"

[[fonts.variants]]
src = "a.woff2"
weight = 700
display = "swap"
"#,
        )
        .unwrap();

        assert!(options.emit_css);
        assert!(!options.verbose);
        assert_eq!(options.fonts.len(), 1);

        let variant = &options.fonts[0].variants[0];
        assert_eq!(variant.sources(), ["a.woff2"]);
        let keys: Vec<&str> = variant.properties().keys().map(String::as_str).collect();
        assert_eq!(keys, ["weight", "display"]);
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let options = PluginOptions::from_json_str(
            r#"{"emitCss": false, "verbose": true, "fonts": []}"#,
        )
        .unwrap();
        assert!(!options.emit_css);
        assert!(options.verbose);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = PluginOptions::from_toml_str("fonts = 3").unwrap_err();
        assert!(matches!(err, FontsError::InvalidConfig { .. }));
    }

    #[test]
    fn load_dispatches_on_extension() {
        let dir = TempDir::new().unwrap();
        let toml_path = dir.path().join("fonts.toml");
        fs::write(&toml_path, "verbose = true\n").unwrap();
        assert!(PluginOptions::load(&toml_path).unwrap().verbose);

        let yaml_path = dir.path().join("fonts.yaml");
        fs::write(&yaml_path, "verbose: true\n").unwrap();
        let err = PluginOptions::load(&yaml_path).unwrap_err();
        assert!(matches!(err, FontsError::UnsupportedConfigFormat { .. }));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = PluginOptions::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, FontsError::Io(_)));
    }

    #[test]
    fn validate_rejects_empty_sources() {
        let options = PluginOptions::new().with_font(
            FontFamily::new("Inter").with_variant(FontVariant::new(OneOrMany::Many(vec![]))),
        );
        let err = options.validate().unwrap_err();
        assert!(matches!(err, FontsError::EmptySource { family } if family == "Inter"));
    }

    #[test]
    fn factory_receives_the_build_root() {
        let user: UserOptions = UserOptions::Factory(Box::new(|context: &FontsContext| {
            Ok(PluginOptions::new().with_verbose(context.root().ends_with("project")))
        }));

        let options = user.resolve(&FontsContext::new("/tmp/project")).unwrap();
        assert!(options.verbose);
        assert!(options.emit_css);
    }
}
