//! Catalogue of bundled RDDL domains.
//!
//! A [`DomainRegistry`] is built once (usually from a directory holding
//! `all.json` and one `<id>.rddl` file per domain) and passed by reference
//! to whatever needs domain lookup.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::env::RddlEnv;
use crate::error::{RddlError, Result};
use crate::model::ModelCompiler;

/// Name of the metadata index inside a domain directory.
pub const INDEX_FILE: &str = "all.json";

/// Metadata describing one registered domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainInfo {
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub description: String,
}

/// Domain ids mapped to metadata and `.rddl` source files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainRegistry {
    dir: PathBuf,
    domains: BTreeMap<String, DomainInfo>,
}

impl DomainRegistry {
    /// Parses an `all.json` index; `.rddl` files are looked up in `dir`.
    pub fn from_json_str(json: &str, dir: impl Into<PathBuf>) -> Result<Self> {
        let domains: BTreeMap<String, DomainInfo> = serde_json::from_str(json)?;
        Ok(Self {
            dir: dir.into(),
            domains,
        })
    }

    /// Loads `dir/all.json`.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let json = fs::read_to_string(dir.join(INDEX_FILE))?;
        let registry = Self::from_json_str(&json, dir)?;
        debug!(dir = %dir.display(), domains = registry.len(), "domain registry loaded");
        Ok(registry)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Registered domain ids in sorted order.
    pub fn list(&self) -> Vec<&str> {
        self.domains.keys().map(String::as_str).collect()
    }

    pub fn info(&self, id: &str) -> Result<&DomainInfo> {
        self.domains
            .get(id)
            .ok_or_else(|| RddlError::DomainNotFound(id.to_string()))
    }

    /// Resolves `rddl` to a source file.
    ///
    /// An existing file path is returned unchanged; otherwise `rddl` is
    /// treated as a domain id and `<dir>/<id>.rddl` must exist.
    pub fn resolve(&self, rddl: &str) -> Result<PathBuf> {
        let direct = PathBuf::from(rddl);
        if direct.is_file() {
            return Ok(direct);
        }
        let bundled = self.dir.join(format!("{}.rddl", rddl));
        if bundled.is_file() {
            Ok(bundled)
        } else {
            Err(RddlError::DomainNotFound(rddl.to_string()))
        }
    }

    /// Reads the raw RDDL source of `rddl`.
    pub fn read_model(&self, rddl: &str) -> Result<String> {
        Ok(fs::read_to_string(self.resolve(rddl)?)?)
    }

    /// Compiles `rddl` with `compiler` and wraps it in an environment.
    pub fn make_env<C: ModelCompiler>(&self, rddl: &str, compiler: &C) -> Result<RddlEnv<C::Model>> {
        let source = self.read_model(rddl)?;
        let model = compiler.compile(&source)?;
        RddlEnv::new(model)
    }
}
