//! Layered service configuration.
//!
//! YAML layers are merged in order (earlier = base, later = override) into a
//! canonical JSON document, hashed, then decoded into [`ServiceConfig`].
//! Secrets never live in the YAML: the database URL is referenced by env var
//! NAME and resolved through [`secrets::resolve_database_url`].

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::fs;
use std::net::SocketAddr;

pub mod secrets;

pub use secrets::{resolve_database_url, DatabaseUrl};

/// Env var that overrides `/daemon/addr`.
pub const ENV_DAEMON_ADDR: &str = "LGS_DAEMON_ADDR";

/// Default env var NAME holding the Postgres connection string.
pub const DEFAULT_DB_URL_ENV: &str = "LGS_DATABASE_URL";

/// Known secret-like prefixes. A leaf string value starting with one of these
/// aborts loading with CONFIG_SECRET_DETECTED.
const SECRET_PREFIXES: &[&str] = &[
    "sk-",
    "sk_live",
    "sk_test",
    "AKIA",
    "-----BEGIN",
    "ghp_",
    "glpat-",
    "xoxb-",
];

/// JSON-pointer prefixes that [`ServiceConfig`] actually reads.
const CONSUMED_PREFIXES: &[&str] = &["/daemon", "/db", "/submit"];

// ---------------------------------------------------------------------------
// Typed config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Listen address, e.g. "127.0.0.1:8899".
    pub addr: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8899".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// Env var NAME holding the connection string (never the URL itself).
    pub url_env: String,
    pub max_connections: u32,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url_env: DEFAULT_DB_URL_ENV.to_string(),
            max_connections: 10,
        }
    }
}

/// Bounded retry for result submission on serialization conflicts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 25,
            max_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub daemon: DaemonConfig,
    pub db: DbConfig,
    pub submit: SubmitConfig,
}

impl ServiceConfig {
    /// Decode the merged document, then validate ranges.
    pub fn from_loaded(loaded: &LoadedConfig) -> Result<Self> {
        let cfg: ServiceConfig = serde_json::from_value(loaded.config_json.clone())
            .context("config does not match ServiceConfig shape")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load layered YAML files; with no paths, built-in defaults are used.
    pub fn load(paths: &[&str]) -> Result<(Self, LoadedConfig)> {
        let loaded = load_layered_yaml(paths)?;
        let cfg = Self::from_loaded(&loaded)?;
        Ok((cfg, loaded))
    }

    pub fn validate(&self) -> Result<()> {
        if self.submit.max_attempts == 0 {
            bail!("CONFIG_INVALID: /submit/max_attempts must be >= 1");
        }
        if self.submit.max_attempts > 10 {
            bail!("CONFIG_INVALID: /submit/max_attempts must be <= 10");
        }
        if self.submit.base_delay_ms > self.submit.max_delay_ms {
            bail!("CONFIG_INVALID: /submit/base_delay_ms exceeds /submit/max_delay_ms");
        }
        if self.db.max_connections == 0 {
            bail!("CONFIG_INVALID: /db/max_connections must be >= 1");
        }
        if self.db.url_env.trim().is_empty() {
            bail!("CONFIG_INVALID: /db/url_env must name an env var");
        }
        self.daemon_addr_from(&self.daemon.addr)?;
        Ok(())
    }

    /// Listen address, honouring `LGS_DAEMON_ADDR` when set.
    pub fn daemon_addr(&self) -> Result<SocketAddr> {
        match std::env::var(ENV_DAEMON_ADDR) {
            Ok(v) if !v.trim().is_empty() => self.daemon_addr_from(v.trim()),
            _ => self.daemon_addr_from(&self.daemon.addr),
        }
    }

    fn daemon_addr_from(&self, raw: &str) -> Result<SocketAddr> {
        raw.parse()
            .with_context(|| format!("CONFIG_INVALID: daemon addr is not host:port: {raw}"))
    }
}

// ---------------------------------------------------------------------------
// Layered loading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        // An empty document parses as null; treat it as "no overrides".
        if v_yaml.is_null() {
            continue;
        }
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    enforce_no_secret_literals(&merged)?;

    let canonical_json = serde_json::to_string(&merged).context("canonical json serialize failed")?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// Unused keys
// ---------------------------------------------------------------------------

/// Leaf pointers present in the config that [`ServiceConfig`] never reads,
/// sorted. Typos such as `/submit/max_atempts` show up here.
pub fn unused_leaf_pointers(config_json: &Value) -> Vec<String> {
    let mut leaves: Vec<String> = Vec::new();
    collect_leaf_pointers(config_json, "", &mut leaves);

    let mut unused: BTreeSet<String> = BTreeSet::new();
    'leaf: for lp in leaves {
        for cp in CONSUMED_PREFIXES {
            if is_prefix_pointer(cp, &lp) {
                continue 'leaf;
            }
        }
        unused.insert(lp);
    }
    unused.into_iter().collect()
}

/// "/a/b" consumes "/a/b" and "/a/b/c" but NOT "/a/bc".
fn is_prefix_pointer(prefix: &str, leaf: &str) -> bool {
    if leaf == prefix {
        return true;
    }
    leaf.strip_prefix(prefix)
        .map(|rest| rest.starts_with('/'))
        .unwrap_or(false)
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) if !map.is_empty() => {
            for (k, vv) in map.iter() {
                let next = format!("{}/{}", prefix, k.replace('~', "~0").replace('/', "~1"));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) if !arr.is_empty() => {
            for (i, vv) in arr.iter().enumerate() {
                collect_leaf_pointers(vv, &format!("{}/{}", prefix, i), out);
            }
        }
        _ => {
            if !prefix.is_empty() {
                out.push(prefix.to_string());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Secret guard
// ---------------------------------------------------------------------------

fn enforce_no_secret_literals(v: &Value) -> Result<()> {
    let mut leaves = Vec::new();
    collect_leaf_pointers(v, "", &mut leaves);

    for ptr in leaves {
        if let Some(s) = v.pointer(&ptr).and_then(Value::as_str) {
            if looks_like_secret(s) {
                bail!("CONFIG_SECRET_DETECTED leaf={} value=REDACTED", ptr);
            }
        }
    }
    Ok(())
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    if secrets::is_connection_url(t) {
        return true;
    }
    if t.len() < 8 {
        return false;
    }
    SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
}
