use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;
use xf_core::{CompileOptions, CompileOutput, FormBundle, ItextError, Language};
use xf_itext::{build_language_table, collect_column_names, compile_itext, effective_default_language};

pub fn parse_bundle(source: &str) -> Result<FormBundle, ItextError> {
    serde_json::from_str(source)
        .map_err(|error| ItextError::new("BUNDLE_INVALID", error.to_string()))
}

pub fn compile_form(
    bundle: &FormBundle,
    options: &CompileOptions,
) -> Result<CompileOutput, ItextError> {
    compile_itext(bundle, options)
}

pub fn compile_form_from_json(
    source: &str,
    options: &CompileOptions,
) -> Result<CompileOutput, ItextError> {
    let bundle = parse_bundle(source)?;
    compile_itext(&bundle, options)
}

pub fn list_languages(bundle: &FormBundle, options: &CompileOptions) -> Vec<Language> {
    let columns = collect_column_names(bundle);
    build_language_table(
        columns.iter().map(String::as_str),
        effective_default_language(bundle, options),
    )
    .languages()
    .to_vec()
}

#[derive(Serialize)]
struct HashInput<'a> {
    bundle: &'a FormBundle,
    options: &'a CompileOptions,
}

pub fn content_hash(bundle: &FormBundle, options: &CompileOptions) -> Result<String, ItextError> {
    let encoded = serde_json::to_vec(&HashInput { bundle, options })
        .map_err(|error| ItextError::new("BUNDLE_INVALID", error.to_string()))?;
    let mut hasher = Sha256::new();
    hasher.update(&encoded);
    Ok(hex::encode(hasher.finalize()))
}

pub const DEFAULT_CACHE_CAPACITY: usize = 64;

#[derive(Debug)]
pub struct CachedCompiler {
    entries: HashMap<String, Arc<CompileOutput>>,
    insertion_order: VecDeque<String>,
    capacity: usize,
    hits: usize,
    misses: usize,
}

impl Default for CachedCompiler {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl CachedCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            insertion_order: VecDeque::with_capacity(capacity),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    pub fn compile(
        &mut self,
        bundle: &FormBundle,
        options: &CompileOptions,
    ) -> Result<Arc<CompileOutput>, ItextError> {
        let key = content_hash(bundle, options)?;
        if let Some(cached) = self.entries.get(&key) {
            self.hits += 1;
            debug!(key = %key, "itext cache hit");
            return Ok(Arc::clone(cached));
        }

        self.misses += 1;
        let output = Arc::new(compile_itext(bundle, options)?);
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.insertion_order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            debug!(key = %oldest, "itext cache eviction");
        }
        self.insertion_order.push_back(key.clone());
        self.entries.insert(key, Arc::clone(&output));
        Ok(output)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.insertion_order.clear();
    }
}
