//! Optional session-scoped caches: bounded maps with FIFO eviction by
//! insertion order and TTL-based staleness. Both caches wrap semantic
//! queries; neither is required for correctness, only for avoiding
//! repeated round trips to the semantic analyzer within one session.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

fn default_max_size() -> usize {
    100
}

fn default_ttl_ms() -> u64 {
    60_000
}

fn default_enabled() -> bool {
    true
}

/// Shared cache configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    #[serde(default = "default_max_size")]
    pub max_size: usize,
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl CacheConfig {
    pub fn semantic_query_defaults() -> Self {
        CacheConfig {
            max_size: 100,
            ttl_ms: 60_000,
            enabled: true,
        }
    }

    pub fn rename_validation_defaults() -> Self {
        CacheConfig {
            max_size: 50,
            ttl_ms: 30_000,
            enabled: true,
        }
    }
}

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

/// A bounded, FIFO-evicting, TTL-staling cache keyed by `String`.
struct BoundedCache<V> {
    config: CacheConfig,
    entries: HashMap<String, Entry<V>>,
    insertion_order: Vec<String>,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl<V: Clone> BoundedCache<V> {
    fn new(config: CacheConfig) -> Self {
        BoundedCache {
            config,
            entries: HashMap::new(),
            insertion_order: Vec::new(),
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    fn get(&mut self, key: &str) -> Option<V> {
        if !self.config.enabled {
            return None;
        }
        if let Some(entry) = self.entries.get(key) {
            if entry.inserted_at.elapsed() <= Duration::from_millis(self.config.ttl_ms) {
                self.hits += 1;
                return Some(entry.value.clone());
            }
        }
        self.misses += 1;
        None
    }

    fn store(&mut self, key: String, value: V) {
        if !self.config.enabled {
            return;
        }
        if !self.entries.contains_key(&key) {
            if self.insertion_order.len() >= self.config.max_size {
                let oldest = self.insertion_order.remove(0);
                self.entries.remove(&oldest);
                self.evictions += 1;
            }
            self.insertion_order.push(key.clone());
        }
        self.entries.insert(
            key,
            Entry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    fn invalidate(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.insertion_order.retain(|k| k != key);
        }
    }

    fn invalidate_matching(&mut self, mut predicate: impl FnMut(&str) -> bool) {
        let to_remove: Vec<String> = self
            .entries
            .keys()
            .filter(|k| predicate(k))
            .cloned()
            .collect();
        for key in to_remove {
            self.invalidate(&key);
        }
    }

    fn invalidate_all(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Memoizes `getSymbolOccurrences`, `getFileSymbols`, `getDependents`, and
/// `hasSymbol` lookups for one refactoring session.
pub struct SemanticQueryCache {
    occurrences: BoundedCache<Vec<crate::collaborators::Occurrence>>,
    file_symbols: BoundedCache<Vec<String>>,
    dependents: BoundedCache<Vec<crate::collaborators::DependentEdge>>,
    has_symbol: BoundedCache<bool>,
}

impl SemanticQueryCache {
    pub fn new(config: CacheConfig) -> Self {
        SemanticQueryCache {
            occurrences: BoundedCache::new(config),
            file_symbols: BoundedCache::new(config),
            dependents: BoundedCache::new(config),
            has_symbol: BoundedCache::new(config),
        }
    }

    pub fn get_occurrences(&mut self, bare_name: &str) -> Option<Vec<crate::collaborators::Occurrence>> {
        self.occurrences.get(bare_name)
    }

    pub fn store_occurrences(&mut self, bare_name: &str, value: Vec<crate::collaborators::Occurrence>) {
        self.occurrences.store(bare_name.to_string(), value);
    }

    pub fn get_file_symbols(&mut self, path: &str) -> Option<Vec<String>> {
        self.file_symbols.get(path)
    }

    pub fn store_file_symbols(&mut self, path: &str, value: Vec<String>) {
        self.file_symbols.store(path.to_string(), value);
    }

    pub fn get_dependents(&mut self, key: &str) -> Option<Vec<crate::collaborators::DependentEdge>> {
        self.dependents.get(key)
    }

    pub fn store_dependents(&mut self, key: &str, value: Vec<crate::collaborators::DependentEdge>) {
        self.dependents.store(key.to_string(), value);
    }

    pub fn get_has_symbol(&mut self, symbol_id: &str) -> Option<bool> {
        self.has_symbol.get(symbol_id)
    }

    pub fn store_has_symbol(&mut self, symbol_id: &str, value: bool) {
        self.has_symbol.store(symbol_id.to_string(), value);
    }

    pub fn invalidate_all(&mut self) {
        self.occurrences.invalidate_all();
        self.file_symbols.invalidate_all();
        self.dependents.invalidate_all();
        self.has_symbol.invalidate_all();
    }

    /// Drop file-symbol entries for `path`, existence/occurrence entries
    /// for its symbols, and dependents entries keyed by any of them.
    pub fn invalidate_file(&mut self, path: &str, symbols_in_file: &[String]) {
        self.file_symbols.invalidate(path);
        for symbol_id in symbols_in_file {
            self.has_symbol.invalidate(symbol_id);
            self.dependents.invalidate(symbol_id);
            if let Ok(parsed) = crate::ids::parse_symbol_id(symbol_id) {
                self.occurrences.invalidate(parsed.bare_name());
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            occurrences_len: self.occurrences.len(),
            file_symbols_len: self.file_symbols.len(),
            dependents_len: self.dependents.len(),
            has_symbol_len: self.has_symbol.len(),
            evictions: self.occurrences.evictions
                + self.file_symbols.evictions
                + self.dependents.evictions
                + self.has_symbol.evictions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub occurrences_len: usize,
    pub file_symbols_len: usize,
    pub dependents_len: usize,
    pub has_symbol_len: usize,
    pub evictions: u64,
}

/// Memoizes `validateRenameRequest(symbolId, newName)` results, keyed by
/// `symbolId + "::" + newName`.
pub struct RenameValidationCache<V> {
    cache: BoundedCache<V>,
}

impl<V: Clone> RenameValidationCache<V> {
    pub fn new(config: CacheConfig) -> Self {
        RenameValidationCache {
            cache: BoundedCache::new(config),
        }
    }

    fn key(symbol_id: &str, new_name: &str) -> String {
        format!("{symbol_id}::{new_name}")
    }

    pub fn get(&mut self, symbol_id: &str, new_name: &str) -> Option<V> {
        self.cache.get(&Self::key(symbol_id, new_name))
    }

    pub fn store(&mut self, symbol_id: &str, new_name: &str, value: V) {
        self.cache.store(Self::key(symbol_id, new_name), value);
    }

    pub fn invalidate(&mut self, symbol_id: &str, new_name: &str) {
        self.cache.invalidate(&Self::key(symbol_id, new_name));
    }

    /// Invalidate every cached validation whose key starts with
    /// `symbol_id_prefix::`.
    pub fn invalidate_symbol(&mut self, symbol_id_prefix: &str) {
        let prefix = format!("{symbol_id_prefix}::");
        self.cache.invalidate_matching(|k| k.starts_with(&prefix));
    }

    pub fn invalidate_all(&mut self) {
        self.cache.invalidate_all();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.len() == 0
    }
}
