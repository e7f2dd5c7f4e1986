//! Key/value configuration as set through CFG-VALSET and read back with CFG-VALGET

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::{default_key_values, CfgValGetRequest, CfgValGetResponse, KeyId, KeyValuePair};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    values: BTreeMap<KeyId, KeyValuePair>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::from_pairs(default_key_values())
    }
}

impl ConfigStore {
    pub fn from_pairs(pairs: impl IntoIterator<Item = KeyValuePair>) -> Self {
        Self {
            values: pairs.into_iter().map(|kv| (kv.key(), kv)).collect(),
        }
    }

    pub fn get(&self, key: KeyId) -> Option<&KeyValuePair> {
        self.values.get(&key)
    }

    pub fn get_u64(&self, key: KeyId) -> Option<u64> {
        self.get(key).map(KeyValuePair::value_u64)
    }

    /// Store every pair, replacing earlier values of the same key
    pub fn apply(&mut self, pairs: &[KeyValuePair]) {
        for kv in pairs {
            debug!("Config {} = {}", kv.key(), kv.value_u64());
            self.values.insert(kv.key(), kv.clone());
        }
    }

    /// Answer a VALGET request; `None` if any requested key is unknown
    pub fn lookup(&self, request: &CfgValGetRequest) -> Option<CfgValGetResponse> {
        let mut values = Vec::with_capacity(request.keys.len());
        for key in &request.keys {
            match self.values.get(key) {
                Some(kv) => values.push(kv.clone()),
                None => {
                    warn!("CFG-VALGET for unknown key {}", key);
                    return None;
                },
            }
        }
        Some(CfgValGetResponse {
            layer: request.layer,
            position: request.position,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
