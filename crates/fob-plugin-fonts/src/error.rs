//! Error types for the fonts plugin

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for fonts plugin operations.
pub type Result<T> = std::result::Result<T, FontsError>;

/// Errors that can occur while configuring the plugin or emitting font assets
#[derive(Error, Debug, Diagnostic)]
pub enum FontsError {
    /// A build hook ran before `config_resolved`
    #[error("[fob-fonts] Configuration not resolved (hook: {hook})")]
    #[diagnostic(
        code(fob::fonts::not_configured),
        help("The host must call config_resolved before generate_bundle or transform_index_html")
    )]
    NotConfigured { hook: &'static str },

    /// A variant was configured without any source files
    #[error("Font family '{family}' has a variant with no source files")]
    #[diagnostic(
        code(fob::fonts::empty_source),
        help("Every variant needs at least one `src` path")
    )]
    EmptySource { family: String },

    /// A font file could not be read from disk
    #[error("Failed to read font file {}: {source}", .path.display())]
    #[diagnostic(
        code(fob::fonts::read_failed),
        help("Font paths are resolved relative to the build root")
    )]
    ReadFont {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A discovery pattern could not be compiled
    #[error("Invalid font pattern '{pattern}': {message}")]
    #[diagnostic(code(fob::fonts::invalid_pattern))]
    InvalidPattern { pattern: String, message: String },

    /// Walking the file system for a discovery pattern failed
    #[error("Font discovery failed: {message}")]
    #[diagnostic(code(fob::fonts::discovery_failed))]
    Discovery { message: String },

    /// The host asset pipeline rejected an emitted asset
    #[error("Failed to emit asset '{name}': {message}")]
    #[diagnostic(code(fob::fonts::emit_failed))]
    Emit { name: String, message: String },

    /// The host returned no file name for an asset reference
    #[error("Unknown asset reference: {reference}")]
    #[diagnostic(code(fob::fonts::unknown_reference))]
    UnknownReference { reference: String },

    /// Plugin options could not be parsed
    #[error("Invalid fonts configuration: {message}")]
    #[diagnostic(
        code(fob::fonts::invalid_config),
        help("Check the `fonts`, `emitCss` and `verbose` fields")
    )]
    InvalidConfig { message: String },

    /// Plugin options were loaded from a file with an unknown extension
    #[error("Unsupported configuration format: {}", .path.display())]
    #[diagnostic(
        code(fob::fonts::unsupported_format),
        help("Use a .toml or .json file")
    )]
    UnsupportedConfigFormat { path: PathBuf },

    /// I/O error
    #[error("I/O error: {0}")]
    #[diagnostic(code(fob::fonts::io))]
    Io(#[from] std::io::Error),
}

impl FontsError {
    pub fn not_configured(hook: &'static str) -> Self {
        Self::NotConfigured { hook }
    }

    pub fn read_font(path: PathBuf, source: std::io::Error) -> Self {
        Self::ReadFont { path, source }
    }

    pub fn emit(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Emit {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether this error came from calling a hook out of order
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_configured_names_the_hook() {
        let err = FontsError::not_configured("generate_bundle");
        assert!(err.is_not_configured());
        assert_eq!(
            err.to_string(),
            "[fob-fonts] Configuration not resolved (hook: generate_bundle)"
        );
    }

    #[test]
    fn read_font_includes_path() {
        let err = FontsError::read_font(
            PathBuf::from("/fonts/missing.woff2"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        let message = err.to_string();
        assert!(message.contains("/fonts/missing.woff2"));
        assert!(!err.is_not_configured());
    }
}
