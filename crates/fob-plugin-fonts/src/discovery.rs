//! Build a font family from files matched on disk
//!
//! A [`FontsContext`] is handed to an options factory once the host has
//! resolved its root directory, so patterns can be written relative to the
//! project:
//!
//! ```rust,no_run
//! use fob_plugin_fonts::{FamilyFromFiles, FontDescriptors, FontsContext};
//!
//! # fn example() -> fob_plugin_fonts::Result<()> {
//! let context = FontsContext::new("/path/to/project");
//! let family = context.family_from_files(
//!     FamilyFromFiles::new("Inter", "fonts/Inter-*.woff2").with_variants(|path| {
//!         let weight = if path.contains("Bold") { 700 } else { 400 };
//!         FontDescriptors::new().with_weight(weight)
//!     }),
//! )?;
//! # Ok(())
//! # }
//! ```

use crate::error::{FontsError, Result};
use crate::types::{FontDescriptors, FontFamily, FontVariant, OneOrMany};
use glob::{MatchOptions, Pattern};
use indexmap::IndexSet;
use path_clean::PathClean;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

type VariantMapper = Box<dyn Fn(&str) -> FontDescriptors + Send + Sync>;

/// Options for [`FontsContext::family_from_files`]
pub struct FamilyFromFiles {
    pub family: String,
    pub local: Option<OneOrMany<String>>,

    /// Patterns relative to the root; a leading `!` excludes matches
    pub include: OneOrMany<String>,

    variants: VariantMapper,
}

impl FamilyFromFiles {
    pub fn new(family: impl Into<String>, include: impl Into<OneOrMany<String>>) -> Self {
        Self {
            family: family.into(),
            local: None,
            include: include.into(),
            variants: Box::new(|_| FontDescriptors::default()),
        }
    }

    pub fn with_local(mut self, local: impl Into<OneOrMany<String>>) -> Self {
        self.local = Some(local.into());
        self
    }

    /// Map each matched path to the descriptors of its variant
    ///
    /// The matched path always becomes the variant's `src`.
    pub fn with_variants<F>(mut self, mapper: F) -> Self
    where
        F: Fn(&str) -> FontDescriptors + Send + Sync + 'static,
    {
        self.variants = Box::new(mapper);
        self
    }
}

impl fmt::Debug for FamilyFromFiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FamilyFromFiles")
            .field("family", &self.family)
            .field("local", &self.local)
            .field("include", &self.include)
            .finish_non_exhaustive()
    }
}

/// Discovery helper bound to the resolved build root
#[derive(Debug, Clone)]
pub struct FontsContext {
    root: PathBuf,
}

impl FontsContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Glob the include patterns and produce one variant per matched file
    pub fn family_from_files(&self, options: FamilyFromFiles) -> Result<FontFamily> {
        let matched = self.match_files(options.include.as_slice())?;

        debug!(
            "[fob-fonts] [{}] Matched {} files",
            options.family,
            matched.len()
        );

        let variants = matched
            .into_iter()
            .map(|path| {
                let descriptors = (options.variants)(&path);
                FontVariant::from_descriptors(path, descriptors)
            })
            .collect();

        Ok(FontFamily {
            family: options.family,
            local: options.local,
            variants,
        })
    }

    /// Matched files relative to the root, `/`-separated, deduplicated
    pub fn match_files(&self, patterns: &[String]) -> Result<Vec<String>> {
        let (negated, positive): (Vec<&String>, Vec<&String>) =
            patterns.iter().partition(|pattern| pattern.starts_with('!'));

        let exclusions = negated
            .into_iter()
            .map(|pattern| {
                let body = normalize_pattern(&pattern[1..]);
                Pattern::new(body).map_err(|e| FontsError::InvalidPattern {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let options = MatchOptions {
            require_literal_separator: true,
            ..MatchOptions::default()
        };

        let root = self.absolute_root()?;
        let mut matched = IndexSet::new();
        for pattern in positive {
            for path in glob_pattern(&root, pattern, options)? {
                if exclusions
                    .iter()
                    .any(|exclusion| exclusion.matches_with(&path, options))
                {
                    continue;
                }
                matched.insert(path);
            }
        }

        Ok(matched.into_iter().collect())
    }

    /// Root the globs are anchored at; an empty root is the working directory
    fn absolute_root(&self) -> Result<PathBuf> {
        let root = if self.root.as_os_str().is_empty() {
            Path::new(".")
        } else {
            self.root.as_path()
        };
        Ok(std::path::absolute(root)?.clean())
    }
}

// `root` must be absolute: glob drops a leading `./` from what it yields, so a
// relative root would never strip back off the matches.
fn glob_pattern(root: &Path, pattern: &str, options: MatchOptions) -> Result<Vec<String>> {
    let root_text = root.to_string_lossy();
    let full = format!(
        "{}/{}",
        Pattern::escape(root_text.trim_end_matches(['/', '\\'])),
        normalize_pattern(pattern)
    );

    let entries = glob::glob_with(&full, options).map_err(|e| FontsError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| FontsError::Discovery {
            message: e.to_string(),
        })?;
        if !path.is_file() {
            continue;
        }
        match relative_to(&path, root) {
            Some(relative) => paths.push(relative),
            None => debug!("[fob-fonts] Skipping {} outside {}", path.display(), root.display()),
        }
    }

    Ok(paths)
}

fn normalize_pattern(pattern: &str) -> &str {
    pattern.trim_start_matches("./")
}

fn relative_to(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    (!parts.is_empty()).then(|| parts.join("/"))
}
