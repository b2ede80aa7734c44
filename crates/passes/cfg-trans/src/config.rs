//! Oracle checks described in TOML.
//!
//! ```toml
//! [[check]]
//! name = "loop-shape"
//! description = "Loop header branches to body and exit"
//! function = "main"
//! blocks = 4
//! edges = """
//! (trans
//!   (edge (for.cond) (for.body))
//!   (edge (for.cond) (for.end)))
//! """
//! ```

use crate::oracle::OracleError;
use crate::pass::CfgTransPass;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read check file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid check file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("check '{name}' has an invalid oracle: {source}")]
    Oracle {
        name: String,
        #[source]
        source: OracleError,
    },
}

/// One configured check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Function to check; every function when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    /// Expected number of basic blocks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<usize>,
    /// Prefix stripped from every atom of `edges`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigil: Option<char>,
    /// The `(trans ...)` literal.
    pub edges: String,
}

impl CheckConfig {
    pub fn to_pass(&self) -> CfgTransPass {
        let description = self
            .description
            .clone()
            .unwrap_or_else(|| format!("Oracle check {}", self.name));
        let mut pass = CfgTransPass::new(self.name.as_str(), description, self.edges.as_str());
        if let Some(function) = &self.function {
            pass = pass.with_function(function.as_str());
        }
        if let Some(blocks) = self.blocks {
            pass = pass.with_block_count(blocks);
        }
        if let Some(sigil) = self.sigil {
            pass = pass.with_sigil(sigil);
        }
        pass
    }
}

/// A file of `[[check]]` tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFile {
    #[serde(rename = "check", default)]
    pub checks: Vec<CheckConfig>,
}

impl CheckFile {
    /// Parses a check file and decodes every oracle in it.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let file: CheckFile = toml::from_str(text)?;
        file.validate()?;
        Ok(file)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for check in &self.checks {
            check
                .to_pass()
                .expectation()
                .map_err(|source| ConfigError::Oracle {
                    name: check.name.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    pub fn passes(&self) -> Vec<CfgTransPass> {
        self.checks.iter().map(CheckConfig::to_pass).collect()
    }
}
