// Streaming service catalog
//
// Reads an OBS-style `services.json` (`{"services": [...]}`) into a list of
// named destinations with their ingest servers. The file location is always
// supplied by the caller.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ConfigError;

/// One ingest server of a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamingServer {
    pub name: String,
    pub url: String,
}

/// A streaming destination such as "YouTube - RTMPS".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamingService {
    pub name: String,
    /// Listed among the popular services.
    pub common: bool,
    pub stream_key_link: Option<String>,
    pub servers: Vec<StreamingServer>,
    pub supported_video_codecs: Vec<String>,
}

#[derive(Deserialize)]
struct CatalogFile {
    services: Vec<Value>,
}

fn str_field(obj: &Value, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

impl StreamingService {
    /// Parse one service entry. Servers missing a name or URL are dropped;
    /// the whole service is dropped when it has no name or no servers left.
    fn parse(obj: &Value) -> Option<Self> {
        let name = str_field(obj, "name")?;

        let servers: Vec<StreamingServer> = obj
            .get("servers")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|server| {
                Some(StreamingServer {
                    name: str_field(server, "name")?,
                    url: str_field(server, "url")?,
                })
            })
            .collect();
        if servers.is_empty() {
            return None;
        }

        let supported_video_codecs = obj
            .get("supported video codecs")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect();

        Some(Self {
            name,
            common: obj.get("common").and_then(Value::as_bool).unwrap_or(false),
            stream_key_link: str_field(obj, "stream_key_link"),
            servers,
            supported_video_codecs,
        })
    }
}

/// Services loaded from one catalog file, in file order.
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    services: Vec<StreamingService>,
    index: HashMap<String, usize>,
}

impl ServiceCatalog {
    /// Load and filter a catalog file.
    ///
    /// Fails when the file is unreadable, is not JSON, has no `services`
    /// array, or contains no usable service.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let catalog_err = |reason: String| ConfigError::ServiceCatalog {
            path: PathBuf::from(path),
            reason,
        };

        let raw = std::fs::read(path).map_err(|e| catalog_err(e.to_string()))?;
        let file: CatalogFile =
            serde_json::from_slice(&raw).map_err(|e| catalog_err(e.to_string()))?;

        let catalog = Self::from_entries(&file.services);
        if catalog.is_empty() {
            return Err(catalog_err("no usable services".into()));
        }
        Ok(catalog)
    }

    fn from_entries(entries: &[Value]) -> Self {
        let mut catalog = Self::default();
        for service in entries.iter().filter_map(StreamingService::parse) {
            // A later entry with the same name wins lookups.
            catalog
                .index
                .insert(service.name.clone(), catalog.services.len());
            catalog.services.push(service);
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn common_names(&self) -> Vec<&str> {
        self.services
            .iter()
            .filter(|s| s.common)
            .map(|s| s.name.as_str())
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&StreamingService> {
        self.index.get(name).and_then(|&i| self.services.get(i))
    }

    pub fn services(&self) -> &[StreamingService] {
        &self.services
    }
}
