//! Configuration for the chat application.
//!
//! Two layers: command-line arguments parsed via `arrrg`, and the rc file
//! at `~/.dashscoperc` that persists the API key, selected model, and
//! verbose flag between sessions. The rc file is loaded once at startup
//! and rewritten wholesale after each mutating command; the last writer
//! wins.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use arrrg_derive::CommandLine;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Model;

/// Command-line arguments for the dashscope-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Path to the rc file.
    #[arrrg(optional, "Path to the rc file (default: ~/.dashscoperc)", "PATH")]
    pub rc: Option<String>,

    /// Model to use, overriding the rc file for this session.
    #[arrrg(optional, "Model to use (e.g. qwen-turbo)", "MODEL")]
    pub model: Option<String>,

    /// Print token usage after each turn.
    #[arrrg(flag, "Print token usage after each turn")]
    pub verbose: bool,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// The persisted contents of the rc file.
///
/// All fields are optional on disk; first-run setup fills in whatever is
/// missing. The legacy `app_key` spelling of the credential is accepted
/// on load and rewritten as `api_key` on the next save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RcConfig {
    /// The DashScope API key.
    #[serde(default, alias = "app_key", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// The selected model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<Model>,

    /// Whether verbose token reporting is enabled.
    #[serde(default)]
    pub verbose: bool,
}

impl RcConfig {
    /// The default rc file location, `~/.dashscoperc`.
    pub fn default_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".dashscoperc"))
            .ok_or_else(|| Error::unknown("could not determine the home directory"))
    }

    /// Loads the rc file, returning defaults if it does not exist yet.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = match fs::read_to_string(path.as_ref()) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(Error::io("failed to read rc file", err)),
        };
        serde_yaml::from_str(&contents)
            .map_err(|err| Error::serialization("failed to parse rc file", Some(Box::new(err))))
    }

    /// Saves the whole rc file, replacing any previous contents.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = serde_yaml::to_string(self)
            .map_err(|err| Error::serialization("failed to serialize rc file", Some(Box::new(err))))?;
        fs::write(path.as_ref(), contents).map_err(|err| Error::io("failed to write rc file", err))
    }
}

/// Resolved configuration for a chat session.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// The model to use for generating responses.
    pub model: Model,

    /// Whether to print token usage after each turn.
    pub verbose: bool,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a config for the given model with verbose off and color on.
    pub fn new(model: Model) -> Self {
        Self {
            model,
            verbose: false,
            use_color: true,
        }
    }

    /// Sets the verbose flag.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KnownModel;

    #[test]
    fn rc_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let rc = RcConfig::load(dir.path().join("nonexistent")).unwrap();
        assert_eq!(rc, RcConfig::default());
    }

    #[test]
    fn rc_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashscoperc");

        let rc = RcConfig {
            api_key: Some("sk-test".to_string()),
            model: Some(Model::Known(KnownModel::QwenMax)),
            verbose: true,
        };
        rc.save(&path).unwrap();

        let loaded = RcConfig::load(&path).unwrap();
        assert_eq!(loaded, rc);
    }

    #[test]
    fn rc_accepts_legacy_app_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashscoperc");
        fs::write(&path, "app_key: sk-legacy\nmodel: qwen-turbo\n").unwrap();

        let loaded = RcConfig::load(&path).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("sk-legacy"));
        assert_eq!(loaded.model, Some(Model::Known(KnownModel::QwenTurbo)));
        assert!(!loaded.verbose);

        // Saving rewrites the canonical spelling.
        loaded.save(&path).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("api_key"));
        assert!(!contents.contains("app_key"));
    }

    #[test]
    fn custom_model_roundtrips_through_rc() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashscoperc");

        let rc = RcConfig {
            api_key: None,
            model: Some(Model::Custom("belle-llama-13b-2m-v1".to_string())),
            verbose: false,
        };
        rc.save(&path).unwrap();

        let loaded = RcConfig::load(&path).unwrap();
        assert_eq!(
            loaded.model,
            Some(Model::Custom("belle-llama-13b-2m-v1".to_string()))
        );
    }

    #[test]
    fn chat_config_builder() {
        let config = ChatConfig::new(Model::Known(KnownModel::QwenPlus))
            .with_verbose(true)
            .without_color();
        assert_eq!(config.model, Model::Known(KnownModel::QwenPlus));
        assert!(config.verbose);
        assert!(!config.use_color);
    }
}
