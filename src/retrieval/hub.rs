//! Hugging Face Hub access
//!
//! Thin wrapper over the hf-hub sync API. Downloads are content-addressed
//! into the hub's own cache, so repeated runs reuse existing artifacts
//! instead of re-downloading.

use std::collections::HashSet;
use std::path::PathBuf;

use hf_hub::api::sync::{Api, ApiRepo};
use hf_hub::{Cache, Repo, RepoType};

use crate::errors::{CheckError, Result};

/// Hub client bound to the default cache location
pub struct HubClient {
    api: Api,
    cache_dir: PathBuf,
}

impl HubClient {
    /// Create a hub client. Fails if the cache directory cannot be set up.
    pub fn new() -> Result<Self> {
        let api = Api::new()?;
        let cache_dir = Cache::default().path().clone();
        Ok(Self { api, cache_dir })
    }

    /// Where downloaded artifacts land
    pub fn cache_dir(&self) -> &PathBuf {
        &self.cache_dir
    }

    /// Handle to a model repository on the hub
    pub fn model_repo(&self, model_id: &str) -> ApiRepo {
        self.api.repo(Repo::new(model_id.to_string(), RepoType::Model))
    }

    /// Download the model weights, resolving a sharded layout through
    /// `model.safetensors.index.json` when a single `model.safetensors`
    /// is not present.
    pub fn fetch_weights(&self, repo: &ApiRepo) -> Result<Vec<PathBuf>> {
        match repo.get("model.safetensors") {
            Ok(path) => Ok(vec![path]),
            Err(_) => fetch_sharded_weights(repo),
        }
    }
}

fn fetch_sharded_weights(repo: &ApiRepo) -> Result<Vec<PathBuf>> {
    let index_path = repo.get("model.safetensors.index.json")?;
    let index: serde_json::Value = serde_json::from_reader(std::fs::File::open(index_path)?)?;

    let weight_map = index
        .get("weight_map")
        .and_then(|v| v.as_object())
        .ok_or_else(|| {
            CheckError::capability("model weights", "safetensors index has no weight_map")
        })?;

    let shards = shard_files(weight_map);
    shards
        .iter()
        .map(|file| repo.get(file).map_err(CheckError::from))
        .collect()
}

/// Distinct shard filenames referenced by a safetensors weight map
fn shard_files(weight_map: &serde_json::Map<String, serde_json::Value>) -> Vec<String> {
    let mut files: HashSet<String> = HashSet::new();
    for value in weight_map.values() {
        if let Some(file) = value.as_str() {
            files.insert(file.to_string());
        }
    }
    let mut files: Vec<String> = files.into_iter().collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shard_files_dedup_and_sort() {
        let json = serde_json::json!({
            "layer.0.weight": "model-00002-of-00002.safetensors",
            "layer.0.bias": "model-00001-of-00002.safetensors",
            "layer.1.weight": "model-00001-of-00002.safetensors",
        });
        let map = json.as_object().unwrap();

        let files = shard_files(map);
        assert_eq!(
            files,
            vec![
                "model-00001-of-00002.safetensors".to_string(),
                "model-00002-of-00002.safetensors".to_string(),
            ]
        );
    }

    #[test]
    fn test_shard_files_empty_map() {
        let json = serde_json::json!({});
        assert!(shard_files(json.as_object().unwrap()).is_empty());
    }

    #[test]
    #[ignore] // Integration test - requires network access
    fn test_hub_client_creation() {
        let client = HubClient::new().expect("Failed to create hub client");
        assert!(client.cache_dir().as_os_str().len() > 0);
    }
}
