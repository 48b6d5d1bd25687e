//! Exporting variables into the running CI build.

use std::process::Command;
#[cfg(test)]
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use tracing::debug;

/// Sink for environment variables of the current build.
pub trait EnvExporter {
    fn export(&self, key: &str, value: &str) -> Result<()>;
}

/// Exports through `envman add`, making values visible to later steps.
#[derive(Debug, Clone)]
pub struct EnvmanExporter {
    program: String,
}

impl Default for EnvmanExporter {
    fn default() -> Self {
        Self {
            program: "envman".to_string(),
        }
    }
}

impl EnvmanExporter {
    #[cfg(test)]
    fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl EnvExporter for EnvmanExporter {
    fn export(&self, key: &str, value: &str) -> Result<()> {
        debug!(key, value, "exporting");
        let output = Command::new(&self.program)
            .args(["add", "--key", key, "--value", value])
            .output()
            .with_context(|| format!("failed to run {}", self.program))?;

        if !output.status.success() {
            bail!(
                "{} add --key {} failed: {}",
                self.program,
                key,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}

/// Collects exports in memory.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryExporter {
    exported: Mutex<Vec<(String, String)>>,
}

#[cfg(test)]
impl MemoryExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every export, in order.
    pub fn exported(&self) -> Vec<(String, String)> {
        self.exported.lock().unwrap().clone()
    }

    /// The last value exported for `key`.
    pub fn get(&self, key: &str) -> Option<String> {
        self.exported
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}

#[cfg(test)]
impl EnvExporter for MemoryExporter {
    fn export(&self, key: &str, value: &str) -> Result<()> {
        self.exported
            .lock()
            .unwrap()
            .push((key.to_string(), value.to_string()));
        Ok(())
    }
}
