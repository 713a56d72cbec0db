//! Repository configuration.

use serde::{Deserialize, Serialize};

use crate::error::{RepoError, RepoResult};

const FILENAME_PLACEHOLDER: &str = "{filename}";

/// Tunables for a [`Repository`](crate::Repository).
///
/// Loadable from TOML; missing keys take their default values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepoConfig {
    /// Name of the branch created by `init`.
    pub default_branch: String,
    /// How many times a write retries after losing a head race.
    pub max_commit_retries: u32,
    /// Reject empty file content instead of storing an empty blob.
    pub forbid_empty_content: bool,
    /// Message used by `add_file`; `{filename}` is replaced by the file name.
    pub message_template: String,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            default_branch: "main".into(),
            max_commit_retries: 64,
            forbid_empty_content: false,
            message_template: "Update {filename}".into(),
        }
    }
}

impl RepoConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> RepoResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| RepoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> RepoResult<String> {
        toml::to_string(self).map_err(|e| RepoError::Config(e.to_string()))
    }

    /// Check that the configuration can be used to open a repository.
    pub fn validate(&self) -> RepoResult<()> {
        pvc_refs::validate_branch_name(&self.default_branch)
            .map_err(|e| RepoError::Config(e.to_string()))?;
        if self.max_commit_retries == 0 {
            return Err(RepoError::Config(
                "max_commit_retries must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The commit message `add_file` uses for `filename`.
    pub fn render_message(&self, filename: &str) -> String {
        self.message_template.replace(FILENAME_PLACEHOLDER, filename)
    }
}
