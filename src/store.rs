//! Persistence boundary for raw graphs.
//!
//! The compiler never touches a store. Stores exist so a UI shell can keep
//! graphs for re-editing; two reference implementations ship with the crate.

use crate::error::StoreError;
use crate::graph::Graph;
use ahash::AHashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// One row of [`FlowStore::list`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowSummary {
    pub id: String,
    pub name: String,
    pub updated_at: DateTime<Utc>,
}

/// A stored graph together with its bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFlow {
    pub id: String,
    pub name: String,
    pub updated_at: DateTime<Utc>,
    pub graph: Graph,
}

impl StoredFlow {
    fn summary(&self) -> FlowSummary {
        FlowSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            updated_at: self.updated_at,
        }
    }
}

pub trait FlowStore {
    /// Creates a flow when `id` is `None`, otherwise overwrites the existing
    /// one. Last writer wins. Returns the flow id.
    fn save(&mut self, id: Option<&str>, name: &str, graph: &Graph) -> Result<String, StoreError>;

    /// The flow's name and its graph, tagged with the flow id.
    fn load(&self, id: &str) -> Result<(String, Graph), StoreError>;

    /// All flows, most recently updated first.
    fn list(&self) -> Result<Vec<FlowSummary>, StoreError>;

    fn delete(&mut self, id: &str) -> Result<(), StoreError>;
}

fn new_flow_id() -> String {
    Uuid::new_v4().to_string()
}

fn sort_summaries(summaries: &mut [FlowSummary]) {
    summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
}

fn stored(id: String, name: &str, graph: &Graph) -> StoredFlow {
    let mut graph = graph.clone().with_id(&id);
    graph.name = name.to_string();
    StoredFlow {
        graph,
        id,
        name: name.to_string(),
        updated_at: Utc::now(),
    }
}

#[derive(Debug, Default)]
pub struct MemoryFlowStore {
    flows: AHashMap<String, StoredFlow>,
}

impl MemoryFlowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

impl FlowStore for MemoryFlowStore {
    fn save(&mut self, id: Option<&str>, name: &str, graph: &Graph) -> Result<String, StoreError> {
        let id = match id {
            Some(id) if self.flows.contains_key(id) => id.to_string(),
            Some(id) => return Err(StoreError::NotFound(id.to_string())),
            None => new_flow_id(),
        };
        self.flows.insert(id.clone(), stored(id.clone(), name, graph));
        debug!(flow_id = %id, name, "Saved flow in memory");
        Ok(id)
    }

    fn load(&self, id: &str) -> Result<(String, Graph), StoreError> {
        self.flows
            .get(id)
            .map(|flow| (flow.name.clone(), flow.graph.clone()))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn list(&self) -> Result<Vec<FlowSummary>, StoreError> {
        let mut summaries: Vec<FlowSummary> = self.flows.values().map(StoredFlow::summary).collect();
        sort_summaries(&mut summaries);
        Ok(summaries)
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        self.flows
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

/// Keeps one pretty-printed JSON file per flow, named `<id>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryFlowStore {
    root: PathBuf,
}

impl DirectoryFlowStore {
    /// Opens (and creates if needed) a store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            path: root.display().to_string(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        // Ids are file stems; anything that could leave the root is unknown.
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(self.root.join(format!("{}.json", id)))
    }

    fn read(&self, path: &Path, id: &str) -> Result<StoredFlow, StoreError> {
        let json = fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(id.to_string())
            } else {
                StoreError::Io {
                    path: path.display().to_string(),
                    source,
                }
            }
        })?;
        serde_json::from_str(&json).map_err(|e| StoreError::Serialization {
            id: id.to_string(),
            message: e.to_string(),
        })
    }

    fn write(&self, flow: &StoredFlow) -> Result<(), StoreError> {
        let path = self.path_for(&flow.id)?;
        let json = serde_json::to_string_pretty(flow).map_err(|e| StoreError::Serialization {
            id: flow.id.clone(),
            message: e.to_string(),
        })?;
        fs::write(&path, json).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

impl FlowStore for DirectoryFlowStore {
    fn save(&mut self, id: Option<&str>, name: &str, graph: &Graph) -> Result<String, StoreError> {
        let id = match id {
            Some(id) => {
                if !self.path_for(id)?.exists() {
                    return Err(StoreError::NotFound(id.to_string()));
                }
                id.to_string()
            }
            None => new_flow_id(),
        };
        self.write(&stored(id.clone(), name, graph))?;
        debug!(flow_id = %id, name, root = %self.root.display(), "Saved flow to disk");
        Ok(id)
    }

    fn load(&self, id: &str) -> Result<(String, Graph), StoreError> {
        let path = self.path_for(id)?;
        let flow = self.read(&path, id)?;
        Ok((flow.name, flow.graph))
    }

    fn list(&self) -> Result<Vec<FlowSummary>, StoreError> {
        let io_error = |source| StoreError::Io {
            path: self.root.display().to_string(),
            source,
        };
        let mut summaries = Vec::new();
        for entry in fs::read_dir(&self.root).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            summaries.push(self.read(&path, id)?.summary());
        }
        sort_summaries(&mut summaries);
        Ok(summaries)
    }

    fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let path = self.path_for(id)?;
        fs::remove_file(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(id.to_string())
            } else {
                StoreError::Io {
                    path: path.display().to_string(),
                    source,
                }
            }
        })
    }
}
