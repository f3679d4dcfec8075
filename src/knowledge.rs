//! Knowledge base — the static SimPhy API reference embedded in every prompt.
//!
//! Loaded once at startup and shared read-only behind an `Arc`. The
//! pretty-printed rendering is computed at construction so every request
//! embeds the byte-identical dump.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::{error, info};

use crate::error::AppError;

#[derive(Debug)]
pub struct KnowledgeBase {
    value: Value,
    rendered: String,
}

impl KnowledgeBase {
    /// Read and parse a JSON knowledge-base file. A missing or malformed file
    /// is an error; there is no empty fallback.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let parsed = fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))
            .and_then(|raw| {
                serde_json::from_str::<Value>(&raw)
                    .map_err(|e| format!("parse error in {}: {e}", path.display()))
            });

        match parsed {
            Ok(value) => {
                let kb = Self::from_value(value);
                info!(path = %path.display(), entries = kb.entries(), "knowledge base loaded");
                Ok(kb)
            }
            Err(msg) => {
                error!(path = %path.display(), "failed to load knowledge base: {msg}");
                Err(AppError::KnowledgeBase(msg))
            }
        }
    }

    pub fn from_value(value: Value) -> Self {
        // Serializing a `Value` cannot fail; fall back to the compact form anyway.
        let rendered = serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string());
        Self { value, rendered }
    }

    /// Two-space indented JSON, key order as in the source file.
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Top-level concept count: object keys, array items, or 1 for a scalar.
    pub fn entries(&self) -> usize {
        match &self.value {
            Value::Object(map) => map.len(),
            Value::Array(items) => items.len(),
            _ => 1,
        }
    }
}
