//! JSON bundle descriptions.
//!
//! Real bundles come from a front-end; this format lets tests and the CLI
//! describe a CFG directly:
//!
//! ```json
//! {
//!   "name": "demo",
//!   "functions": [{
//!     "name": "main",
//!     "blocks": [
//!       { "name": "entry", "successors": ["exit"] },
//!       { "name": "exit", "statements": ["ret"] }
//!     ]
//!   }]
//! }
//! ```

use crate::{Bundle, BundleBuilder, IrError, LoadError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Serializable description of a bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleSpec {
    pub name: String,
    #[serde(default)]
    pub functions: Vec<FunctionSpec>,
}

/// Serializable description of a function body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionSpec {
    pub name: String,
    /// Entry block name; the first block when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    #[serde(default)]
    pub blocks: Vec<BlockSpec>,
}

/// Serializable description of a basic block and its outgoing edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statements: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub successors: Vec<String>,
}

impl BundleSpec {
    /// Builds the IR. Blocks are declared before edges are resolved, so
    /// successors may refer to blocks declared later.
    pub fn build(&self) -> Result<Bundle, IrError> {
        let mut builder = BundleBuilder::new(self.name.as_str());
        for function in &self.functions {
            builder.function(function.name.as_str(), |code| {
                for block in &function.blocks {
                    let r = code.block(block.name.as_str())?;
                    for statement in &block.statements {
                        code.statement(r, statement.as_str());
                    }
                }
                for block in &function.blocks {
                    for successor in &block.successors {
                        code.edge_by_name(&block.name, successor)?;
                    }
                }
                if let Some(entry) = &function.entry {
                    let r = code
                        .find(entry)
                        .ok_or_else(|| IrError::NotFound(entry.clone()))?;
                    code.entry(r);
                }
                Ok(())
            })?;
        }
        Ok(builder.build())
    }

    /// Describes an existing bundle.
    pub fn from_bundle(bundle: &Bundle) -> Self {
        let functions = bundle
            .functions()
            .iter()
            .map(|function| {
                let body = function.body();
                let blocks = body
                    .blocks()
                    .iter()
                    .map(|block| BlockSpec {
                        name: block.name().to_string(),
                        statements: block
                            .statements()
                            .iter()
                            .map(|s| s.text().to_string())
                            .collect(),
                        successors: body
                            .successors(block.block_ref())
                            .map(|s| s.name().to_string())
                            .collect(),
                    })
                    .collect();
                FunctionSpec {
                    name: function.name().to_string(),
                    entry: body.entry().map(|b| b.name().to_string()),
                    blocks,
                }
            })
            .collect();
        Self {
            name: bundle.name().to_string(),
            functions,
        }
    }
}

impl Bundle {
    /// Loads a bundle from a JSON description.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        let spec: BundleSpec = serde_json::from_str(text)?;
        Ok(spec.build()?)
    }

    /// Loads a bundle from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}
