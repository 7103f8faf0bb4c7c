//! Backup and mirror file formats.
//!
//! A backup is `{ "version": 1, "exportedAt": <timestamp>, "tweets": [Item...] }`.
//! A mirror (the read-only published copy) is a bare `[Item...]` array.

use crate::{Error, Item, RawItem, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

pub const BACKUP_VERSION: u64 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub version: u64,
    pub exported_at: DateTime<Utc>,
    pub tweets: Vec<Item>,
}

impl Backup {
    pub fn new(items: &[Item], now: DateTime<Utc>) -> Self {
        Self {
            version: BACKUP_VERSION,
            exported_at: now,
            tweets: items.to_vec(),
        }
    }
}

/// Items that survived validation, plus how many entries were dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedImport {
    pub items: Vec<Item>,
    pub rejected: usize,
}

pub fn write_backup(path: &Path, items: &[Item], now: DateTime<Utc>) -> Result<()> {
    let backup = Backup::new(items, now);
    fs::write(path, serde_json::to_string_pretty(&backup)?)?;
    Ok(())
}

pub fn write_mirror(path: &Path, items: &[Item]) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(items)?)?;
    Ok(())
}

pub fn read_backup(path: &Path, now: DateTime<Utc>) -> Result<ParsedImport> {
    parse_backup(&fs::read_to_string(path)?, now)
}

pub fn read_mirror(path: &Path, now: DateTime<Utc>) -> Result<ParsedImport> {
    parse_mirror(&fs::read_to_string(path)?, now)
}

/// Validates a backup document. Entries without a string id are rejected one
/// by one; the whole file only fails when its envelope is wrong or nothing
/// survives.
pub fn parse_backup(text: &str, now: DateTime<Utc>) -> Result<ParsedImport> {
    let doc: Value = serde_json::from_str(text)?;
    let version = doc.get("version").filter(|v| !is_falsy(v));
    let tweets = doc.get("tweets").and_then(Value::as_array);
    let (version, tweets) = match (version, tweets) {
        (Some(v), Some(t)) => (v, t),
        _ => return Err(Error::InvalidBackup("expected version and tweets array".into())),
    };
    match version.as_u64() {
        Some(BACKUP_VERSION) => {}
        Some(other) => return Err(Error::UnsupportedVersion(other)),
        None => return Err(Error::InvalidBackup(format!("bad version {version}"))),
    }
    let parsed = normalize_all(tweets, now);
    if parsed.items.is_empty() {
        return Err(Error::NoValidItems);
    }
    Ok(parsed)
}

/// Accepts either a bare array or the wrapped backup shape.
pub fn parse_mirror(text: &str, now: DateTime<Utc>) -> Result<ParsedImport> {
    let doc: Value = serde_json::from_str(text)?;
    let entries = match &doc {
        Value::Array(a) => a,
        Value::Object(o) => match o.get("tweets") {
            Some(Value::Array(a)) => a,
            _ => return Err(Error::InvalidBackup("invalid data format".into())),
        },
        _ => return Err(Error::InvalidBackup("invalid data format".into())),
    };
    Ok(normalize_all(entries, now))
}

fn normalize_all(values: &[Value], now: DateTime<Utc>) -> ParsedImport {
    let mut out = ParsedImport::default();
    for v in values {
        match RawItem::from_value(v.clone()).and_then(|raw| raw.normalize(now)) {
            Ok(item) => out.items.push(item),
            Err(e) => {
                tracing::debug!(error = %e, "rejected imported entry");
                out.rejected += 1;
            }
        }
    }
    out
}

fn is_falsy(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
