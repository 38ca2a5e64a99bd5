use super::GitCommand;
use anyhow::{Context, Result};

impl GitCommand {
    /// Set a git config value
    pub fn config_set(&self, key: &str, value: &str) -> Result<()> {
        self.run(&["config", key, value], "config")?;
        Ok(())
    }

    /// Unset a git config value
    pub fn config_unset(&self, key: &str) -> Result<()> {
        self.run(&["config", "--unset", key], "config --unset")?;
        Ok(())
    }

    /// Get a git config value from the current repository (respects local + global config)
    pub fn config_get(&self, key: &str) -> Result<Option<String>> {
        let output = self
            .command()
            .args(["config", "--get", key])
            .output()
            .context("Failed to execute git config command")?;

        if output.status.success() {
            let value = String::from_utf8(output.stdout)
                .context("Failed to parse git config output")?
                .trim()
                .to_string();
            Ok(Some(value))
        } else {
            // Exit code 1 means the key was not found, which is not an error
            Ok(None)
        }
    }
}

/// Config key holding the free-text description of a branch.
pub(crate) fn description_key(branch: &str) -> String {
    format!("branch.{branch}.description")
}
