//! Fob plugin for self-hosted web fonts
//!
//! This plugin copies font files into the build output, generates matching
//! `@font-face` rules, and injects them into the HTML entry point. It is driven
//! by three host hooks:
//!
//! - `config_resolved`: finalize options against the resolved build root
//! - `generate_bundle`: emit font assets and a single `fonts.css` (production)
//! - `transform_index_html`: `<link>` + preloads in production, inline
//!   `<style>` in development or when CSS emission is disabled
//!
//! ## Architecture
//!
//! ```text
//! PluginOptions ─▶ config_resolved ─▶ BuildSession
//!                                        │
//!          generate_bundle ◀─────────────┤  resolve_assets → fonts.css
//!                                        │
//!     transform_index_html ◀─────────────┘  HtmlTagDescriptor[]
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fob_plugin_fonts::{
//!     FobFontsPlugin, FontFamily, FontVariant, FontsHooks, HashedAssetEmitter, PluginOptions,
//!     ResolvedConfig,
//! };
//!
//! # fn example() -> fob_plugin_fonts::Result<()> {
//! let plugin = FobFontsPlugin::new(PluginOptions::new().with_font(
//!     FontFamily::new("My Font")
//!         .with_local("MyFont")
//!         .with_variant(FontVariant::new("fonts/a.woff2").with_weight(700)),
//! ));
//!
//! plugin.config_resolved(ResolvedConfig::new(".").production(true))?;
//! let mut emitter = HashedAssetEmitter::default();
//! plugin.generate_bundle(&mut emitter)?;
//! let tags = plugin.transform_index_html()?;
//! # Ok(())
//! # }
//! ```

use parking_lot::Mutex;
use tracing::debug;

mod config;
pub mod css;
mod discovery;
mod error;
mod host;
mod session;
mod types;

pub use config::{OptionsFactory, PluginOptions, UserOptions};
pub use css::build_font_face_declarations;
pub use discovery::{FamilyFromFiles, FontsContext};
pub use error::{FontsError, Result};
pub use host::{
    AssetEmitter, AssetSource, EmittedAsset, FontsHooks, HashedAssetEmitter, HtmlTagDescriptor,
    OutputAsset, ReferenceId, ResolvedConfig,
};
pub use session::{BuildSession, CSS_ASSET_NAME, SessionState, resolve_assets};
pub use types::{CssValue, FontDescriptors, FontFamily, FontVariant, OneOrMany};

/// Fonts plugin
///
/// Holds the user's options and, once `config_resolved` has run, the session
/// for the current build. Calling `config_resolved` again starts a new session.
#[derive(Debug)]
pub struct FobFontsPlugin {
    user_options: UserOptions,
    session: Mutex<Option<BuildSession>>,
}

impl FobFontsPlugin {
    /// Create a plugin from static options
    pub fn new(options: PluginOptions) -> Self {
        Self {
            user_options: options.into(),
            session: Mutex::new(None),
        }
    }

    /// Create a plugin whose options are computed once the build root is known
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use fob_plugin_fonts::{FamilyFromFiles, FobFontsPlugin, FontDescriptors, PluginOptions};
    ///
    /// let plugin = FobFontsPlugin::with_factory(|context| {
    ///     let inter = context.family_from_files(
    ///         FamilyFromFiles::new("Inter", "fonts/Inter-*.woff2")
    ///             .with_variants(|_| FontDescriptors::new().with_display("swap")),
    ///     )?;
    ///     Ok(PluginOptions::new().with_font(inter))
    /// });
    /// ```
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn(&FontsContext) -> Result<PluginOptions> + Send + Sync + 'static,
    {
        Self {
            user_options: UserOptions::Factory(Box::new(factory)),
            session: Mutex::new(None),
        }
    }

    /// State of the current build, if configured
    pub fn state(&self) -> Option<SessionState> {
        self.session.lock().as_ref().map(BuildSession::state)
    }

    /// Snapshot of the current session
    pub fn session(&self) -> Option<BuildSession> {
        self.session.lock().clone()
    }

    fn with_session<T>(
        &self,
        hook: &'static str,
        f: impl FnOnce(&mut BuildSession) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self.session.lock();
        let session = guard
            .as_mut()
            .ok_or_else(|| FontsError::not_configured(hook))?;
        f(session)
    }
}

impl FontsHooks for FobFontsPlugin {
    fn name(&self) -> &'static str {
        "fob-fonts"
    }

    fn config_resolved(&self, config: ResolvedConfig) -> Result<()> {
        // A failed configuration must not leave the previous build usable.
        *self.session.lock() = None;

        let context = FontsContext::new(config.root.clone());
        let options = self.user_options.resolve(&context)?;

        debug!(
            "[fob-fonts] Configured {} font families (emit_css: {}, production: {})",
            options.fonts.len(),
            options.emit_css,
            config.is_production
        );

        *self.session.lock() = Some(BuildSession::new(options, config));
        Ok(())
    }

    fn generate_bundle(&self, emitter: &mut dyn AssetEmitter) -> Result<()> {
        self.with_session("generate_bundle", |session| session.generate_bundle(emitter))
    }

    fn transform_index_html(&self) -> Result<Vec<HtmlTagDescriptor>> {
        self.with_session("transform_index_html", |session| {
            Ok(session.transform_index_html())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_name() {
        let plugin = FobFontsPlugin::new(PluginOptions::default());
        assert_eq!(plugin.name(), "fob-fonts");
        assert!(plugin.state().is_none());
    }

    #[test]
    fn test_hooks_require_configuration() {
        let plugin = FobFontsPlugin::new(PluginOptions::default());
        let mut emitter = HashedAssetEmitter::default();

        let err = plugin.generate_bundle(&mut emitter).unwrap_err();
        assert!(matches!(err, FontsError::NotConfigured { hook: "generate_bundle" }));

        let err = plugin.transform_index_html().unwrap_err();
        assert!(matches!(
            err,
            FontsError::NotConfigured {
                hook: "transform_index_html"
            }
        ));
    }

    #[test]
    fn test_config_resolved_starts_session() {
        let plugin = FobFontsPlugin::new(PluginOptions::default());
        plugin
            .config_resolved(ResolvedConfig::new("/project"))
            .unwrap();
        assert_eq!(plugin.state(), Some(SessionState::Configured));
        assert!(plugin.session().unwrap().options().emit_css);
    }

    #[test]
    fn test_factory_errors_propagate() {
        let plugin = FobFontsPlugin::with_factory(|_| Err(FontsError::invalid_config("boom")));
        let err = plugin
            .config_resolved(ResolvedConfig::new("/project"))
            .unwrap_err();
        assert!(matches!(err, FontsError::InvalidConfig { .. }));
        assert!(plugin.state().is_none());
    }
}
