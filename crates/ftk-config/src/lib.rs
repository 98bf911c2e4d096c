//! ftk-config
//!
//! Station master-data loading.
//!
//! Architectural decisions:
//! - Layered YAML: earlier documents are base, later documents override,
//!   merged deeply so a site file can override a single price
//! - The effective config is canonicalized (key-sorted, compact JSON) and
//!   hashed, so two runs can prove they reconciled under the same master
//!   data
//! - Literal secret-looking values abort the load; credentials never
//!   belong in station files
//! - Typed deserialization rejects unknown keys, then boundary validation
//!   checks physical ranges before anything reaches the engine
//! - Error messages carry stable uppercase codes for operators to grep

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs;

use ftk_schemas::{FuelType, Meter, MeterKind, Micros, Role, Station, Tank, User};

/// Known secret-like prefixes.  If any leaf string value in the effective
/// config starts with one of these, the load aborts with
/// CONFIG_SECRET_DETECTED.
const SECRET_PREFIXES: &[&str] = &[
    "sk-",        // OpenAI / Stripe style
    "sk_live",    // Stripe live
    "sk_test",    // Stripe test
    "AKIA",       // AWS access key ID
    "-----BEGIN", // PEM private keys
    "ghp_",       // GitHub PAT
    "gho_",       // GitHub OAuth
    "glpat-",     // GitLab PAT
    "xoxb-",      // Slack bot token
    "xoxp-",      // Slack user token
];

// ---------------------------------------------------------------------------
// Layered YAML loading
// ---------------------------------------------------------------------------

/// Merged, canonicalized raw config.
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
    // Merge YAML docs in order: earlier docs are base, later docs override.
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    enforce_no_secret_literals(&merged)?;

    let canonical_json = canonicalize_json(&merged)?;
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

/// Key-sorted compact JSON, so the hash does not depend on YAML key order.
fn canonicalize_json(v: &Value) -> Result<String> {
    let sorted = sort_keys(v);
    serde_json::to_string(&sorted).context("canonical json serialize failed")
}

fn sort_keys(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().cloned().collect();
            keys.sort();
            let mut new = serde_json::Map::new();
            for k in keys {
                new.insert(k.clone(), sort_keys(&map[&k]));
            }
            Value::Object(new)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_keys).collect()),
        _ => v.clone(),
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn enforce_no_secret_literals(v: &Value) -> Result<()> {
    let mut leaves = Vec::new();
    collect_leaf_pointers(v, "", &mut leaves);

    for ptr in leaves {
        if let Some(val) = v.pointer(&ptr) {
            if let Some(s) = val.as_str() {
                if looks_like_secret(s) {
                    bail!("CONFIG_SECRET_DETECTED leaf={} value=REDACTED", ptr);
                }
            }
        }
    }
    Ok(())
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    if t.len() < 8 {
        return false;
    }
    SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) => {
            for (k, vv) in map.iter() {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) => {
            for (i, vv) in arr.iter().enumerate() {
                let next = format!("{}/{}", prefix, i);
                collect_leaf_pointers(vv, &next, out);
            }
        }
        _ => {
            let p = if prefix.is_empty() {
                "/".to_string()
            } else {
                prefix.to_string()
            };
            out.push(p);
        }
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

// ---------------------------------------------------------------------------
// Typed station config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StationCfg {
    name: String,
    tanks: Vec<TankCfg>,
    meters: Vec<MeterCfg>,
    #[serde(default)]
    users: Vec<UserCfg>,
    /// Pump prices in dollars per litre, keyed by grade.
    prices: BTreeMap<FuelType, f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TankCfg {
    id: String,
    name: String,
    fuel: FuelType,
    capacity_litres: f64,
    current_volume_litres: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MeterCfg {
    id: String,
    name: String,
    kind: MeterKind,
    last_reading: f64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UserCfg {
    id: String,
    name: String,
    role: Role,
}

/// Validated station plus the provenance of its config.
#[derive(Debug, Clone)]
pub struct LoadedStation {
    pub station: Station,
    pub config_hash: String,
    pub canonical_json: String,
}

/// Load, merge, validate and type a station from layered YAML files.
pub fn load_station(paths: &[&str]) -> Result<LoadedStation> {
    let loaded = load_layered_yaml(paths)?;
    station_from_config(loaded)
}

/// Same as [`load_station`] but over in-memory YAML documents.
pub fn load_station_from_strings(yaml_docs: &[&str]) -> Result<LoadedStation> {
    let loaded = load_layered_yaml_from_strings(yaml_docs)?;
    station_from_config(loaded)
}

fn station_from_config(loaded: LoadedConfig) -> Result<LoadedStation> {
    let cfg: StationCfg = serde_json::from_value(loaded.config_json.clone())
        .context("station config does not match the expected shape")?;
    let station = validate_station(cfg)?;
    Ok(LoadedStation {
        station,
        config_hash: loaded.config_hash,
        canonical_json: loaded.canonical_json,
    })
}

fn validate_station(cfg: StationCfg) -> Result<Station> {
    if cfg.name.trim().is_empty() {
        bail!("CONFIG_STATION_NAME station name must not be empty");
    }

    let mut ids: BTreeSet<&str> = BTreeSet::new();
    for t in &cfg.tanks {
        if !ids.insert(&t.id) {
            bail!("CONFIG_DUP_ID tank id {} appears more than once", t.id);
        }
        if !t.capacity_litres.is_finite() || t.capacity_litres <= 0.0 {
            bail!(
                "CONFIG_TANK_RANGE tank={} capacity_litres={} must be a positive number",
                t.id,
                t.capacity_litres
            );
        }
        if !t.current_volume_litres.is_finite()
            || t.current_volume_litres < 0.0
            || t.current_volume_litres > t.capacity_litres
        {
            bail!(
                "CONFIG_TANK_RANGE tank={} current_volume_litres={} outside 0..={}",
                t.id,
                t.current_volume_litres,
                t.capacity_litres
            );
        }
    }

    let mut ids: BTreeSet<&str> = BTreeSet::new();
    for m in &cfg.meters {
        if !ids.insert(&m.id) {
            bail!("CONFIG_DUP_ID meter id {} appears more than once", m.id);
        }
        if !m.last_reading.is_finite() || m.last_reading < 0.0 {
            bail!(
                "CONFIG_METER_READING meter={} last_reading={} must be a non-negative number",
                m.id,
                m.last_reading
            );
        }
    }

    let mut ids: BTreeSet<&str> = BTreeSet::new();
    for u in &cfg.users {
        if !ids.insert(&u.id) {
            bail!("CONFIG_DUP_ID user id {} appears more than once", u.id);
        }
    }

    for (fuel, price) in &cfg.prices {
        if !price.is_finite() || *price <= 0.0 {
            bail!(
                "CONFIG_PRICE_INVALID grade={} price={} must be a positive dollar amount",
                fuel,
                price
            );
        }
    }

    Ok(Station {
        name: cfg.name,
        tanks: cfg
            .tanks
            .into_iter()
            .map(|t| Tank::new(t.id, t.name, t.fuel, t.capacity_litres, t.current_volume_litres))
            .collect(),
        meters: cfg
            .meters
            .into_iter()
            .map(|m| Meter::new(m.id, m.name, m.kind, m.last_reading))
            .collect(),
        users: cfg
            .users
            .into_iter()
            .map(|u| User::new(u.id, u.name, u.role))
            .collect(),
        prices: cfg
            .prices
            .into_iter()
            .map(|(fuel, dollars)| (fuel, Micros::from_dollars(dollars)))
            .collect(),
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
