//! wikigit configuration (`wikigit.toml`).
//!
//! Every field has a default, so a missing file is not an error. Command-line
//! flags override whatever the file says.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use wikigit_git::RefName;

use crate::commit::Committer;
use crate::render::RendererKind;
use crate::replay::{RenderErrorPolicy, ReplaySettings};
use crate::scaffold::Scaffold;

/// File name looked up in the current directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "wikigit.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WikigitConfig {
    /// Destination repository settings.
    #[serde(default)]
    pub repo: RepoConfig,

    /// Renderer selection and failure policy.
    #[serde(default)]
    pub render: RenderConfig,

    /// Fixed entries seeded before the first revision.
    #[serde(default)]
    pub scaffold: ScaffoldConfig,

    /// Committer identity for replayed commits (default: the revision author).
    #[serde(default)]
    pub committer: Option<CommitterConfig>,
}

// ---------------------------------------------------------------------------
// RepoConfig
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoConfig {
    /// Branch the commit chain is written to (default: `"main"`).
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Create the destination without a working directory.
    #[serde(default)]
    pub bare: bool,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            branch: default_branch(),
            bare: false,
        }
    }
}

fn default_branch() -> String {
    "main".to_owned()
}

// ---------------------------------------------------------------------------
// RenderConfig
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Markup dialect of the revision content.
    #[serde(default)]
    pub renderer: RendererKind,

    /// Append the original markup to each document as a trailing comment.
    #[serde(default)]
    pub embed_source: bool,

    /// What a recoverable render failure does to the run.
    #[serde(default)]
    pub on_render_error: RenderErrorPolicy,
}

// ---------------------------------------------------------------------------
// ScaffoldConfig
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScaffoldConfig {
    /// Title of the page the root pointer redirects to.
    #[serde(default = "default_main_page")]
    pub main_page: String,

    /// Replacement for the built-in page template.
    #[serde(default)]
    pub template: Option<String>,
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            main_page: default_main_page(),
            template: None,
        }
    }
}

fn default_main_page() -> String {
    "Main Page".to_owned()
}

// ---------------------------------------------------------------------------
// CommitterConfig
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommitterConfig {
    pub name: String,
    pub email: String,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// A configuration file could not be read, parsed, or validated.
#[derive(Debug)]
pub struct ConfigError {
    /// File the problem was found in (or would have been loaded from).
    pub path: PathBuf,
    /// Human-readable description.
    pub detail: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "config error in {}: {}\n  To fix: correct the file, or remove it to use defaults.",
            self.path.display(),
            self.detail
        )
    }
}

impl std::error::Error for ConfigError {}

impl WikigitConfig {
    /// Load configuration.
    ///
    /// With an explicit `path` the file must exist. Without one,
    /// [`DEFAULT_CONFIG_FILE`] in the current directory is used if present,
    /// otherwise all defaults apply.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => Self::parse(&text).map_err(|detail| ConfigError { path, detail }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError {
                path,
                detail: e.to_string(),
            }),
        }
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    /// Returns the parser's message on malformed TOML or unknown fields.
    pub fn parse(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| e.to_string())
    }

    /// Engine settings derived from this configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the branch name is not usable as a ref.
    pub fn replay_settings(&self) -> Result<ReplaySettings, ConfigError> {
        let branch = RefName::branch(&self.repo.branch).map_err(|e| ConfigError {
            path: PathBuf::from(DEFAULT_CONFIG_FILE),
            detail: format!("repo.branch: {e}"),
        })?;

        let mut scaffold = Scaffold::new(&self.scaffold.main_page);
        if let Some(template) = &self.scaffold.template {
            scaffold = scaffold.with_template(template);
        }

        Ok(ReplaySettings {
            branch,
            committer: self.committer.as_ref().map(|c| Committer {
                name: c.name.clone(),
                email: c.email.clone(),
            }),
            embed_source: self.render.embed_source,
            on_render_error: self.render.on_render_error,
            scaffold,
            bare: self.repo.bare,
        })
    }
}
