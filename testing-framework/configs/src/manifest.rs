use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse manifest {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// User-authored description of a testnet, before any resolution or checks.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Manifest {
    /// Testnet name; taken from the file stem when loaded from disk without
    /// one.
    pub name: String,
    /// CIDR block every node address must belong to.
    #[serde(alias = "ip")]
    pub network: String,
    pub initial_height: Option<u64>,
    pub initial_state: HashMap<String, String>,
    /// Height (as text) to node name to voting power.
    pub validator_updates: HashMap<String, HashMap<String, u8>>,
    pub nodes: HashMap<String, ManifestNode>,
}

/// Per-node section of a manifest. `None` means the field was left out.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ManifestNode {
    #[serde(alias = "ip")]
    pub address: String,
    pub proxy_port: Option<u16>,
    pub start_at: Option<u64>,
    pub fast_sync: Option<String>,
    pub database: Option<String>,
    pub abci_protocol: Option<String>,
    pub privval_protocol: Option<String>,
    pub persist_interval: Option<u64>,
    pub retain_blocks: Option<u64>,
}

impl Manifest {
    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ManifestError> {
        let contents = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut manifest = Self::from_yaml(&contents).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if manifest.name.is_empty() {
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                manifest.name = stem.to_owned();
            }
        }

        debug!(
            path = %path.display(),
            name = manifest.name,
            nodes = manifest.nodes.len(),
            "loaded testnet manifest"
        );

        Ok(manifest)
    }
}
