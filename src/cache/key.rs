//! Cache Key Module
//!
//! Derives deterministic store keys from an endpoint and its request parameters.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cache::CACHE_PREFIX;

/// Request parameters, ordered by name.
pub type Params = BTreeMap<String, String>;

/// Builds a [`Params`] map from `(name, value)` pairs.
pub fn params<I, K, V>(pairs: I) -> Params
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

// == Cache Key ==
/// Store key of one cached response.
///
/// Layout: `<prefix><endpoint>_<name:value|name:value...>` with parameter
/// names in lexicographic order, so insertion order never matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives the key for `endpoint` called with `params`.
    pub fn derive(endpoint: &str, params: &Params) -> Self {
        let param_string = params
            .iter()
            .map(|(name, value)| format!("{}:{}", name, value))
            .collect::<Vec<_>>()
            .join("|");
        Self(format!("{}{}_{}", CACHE_PREFIX, endpoint, param_string))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
