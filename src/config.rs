//! Plain-text `key: value` stores with defaults and unique filenames.
//!
//! Each store lives at `<location>/<name>.txt`. Values that parse entirely as
//! a float land in the float namespace, everything else is kept as a trimmed
//! string.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Extension every store is written with.
const EXTENSION: &str = "txt";
/// Base name used when a store has no name of its own.
const FALLBACK_NAME: &str = "DEFAULT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    #[error("failed to delete {path}: {source}")]
    Delete { path: PathBuf, source: io::Error },
}

/// Defaults and file location shared by every store of one kind.
#[derive(Debug, Clone, Default)]
pub struct ConfigSchema {
    location: PathBuf,
    default_name: String,
    floats: BTreeMap<String, f32>,
    strings: BTreeMap<String, String>,
}

impl ConfigSchema {
    pub fn new(location: impl Into<PathBuf>, default_name: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            default_name: default_name.into(),
            ..Self::default()
        }
    }

    pub fn with_float(mut self, key: &str, value: f32) -> Self {
        self.floats.insert(key.to_string(), value);
        self
    }

    pub fn with_string(mut self, key: &str, value: &str) -> Self {
        self.strings.insert(key.to_string(), value.to_string());
        self
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    pub fn default_string(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }

    /// Path for a store whose file stem is `stem`.
    pub fn path_for(&self, stem: &str) -> PathBuf {
        self.location.join(format!("{stem}.{EXTENSION}"))
    }

    /// First free path for `name`: `name.txt`, then `name-1.txt`, `name-2.txt`...
    fn unique_path(&self, name: &str) -> PathBuf {
        let name = if name.is_empty() { FALLBACK_NAME } else { name };
        let base = self.path_for(name);
        if !base.exists() {
            return base;
        }
        (1..)
            .map(|n| self.path_for(&format!("{name}-{n}")))
            .find(|p| !p.exists())
            .unwrap_or(base)
    }
}

/// One persisted store.
#[derive(Debug, Clone)]
pub struct Configs {
    schema: ConfigSchema,
    /// Base name without the uniqueness suffix.
    name: String,
    path: PathBuf,
    floats: BTreeMap<String, f32>,
    strings: BTreeMap<String, String>,
}

impl Configs {
    /// New store from the schema defaults, saved under a fresh unique name.
    pub fn create(schema: &ConfigSchema) -> Result<Self, ConfigError> {
        let mut configs = Self::inherit(schema);
        configs.path = schema.unique_path(&configs.name);
        configs.save()?;
        Ok(configs)
    }

    /// Load `<location>/<stem>.txt` over the schema defaults.
    ///
    /// A missing file leaves the defaults in place; the store keeps the path so
    /// a later save creates it.
    pub fn load(schema: &ConfigSchema, stem: &str) -> Result<Self, ConfigError> {
        let mut configs = Self::inherit(schema);
        configs.name = strip_unique_suffix(stem).to_string();
        configs.path = schema.path_for(stem);

        match fs::read_to_string(&configs.path) {
            Ok(text) => configs.parse(&text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!("Config {} not found, using defaults", configs.path.display());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: configs.path,
                    source,
                })
            }
        }
        Ok(configs)
    }

    /// Copy of this store saved under a new unique name.
    pub fn duplicate(&self) -> Result<Self, ConfigError> {
        let mut copy = self.clone();
        copy.path = self.schema.unique_path(&copy.name);
        copy.save()?;
        Ok(copy)
    }

    fn inherit(schema: &ConfigSchema) -> Self {
        Self {
            schema: schema.clone(),
            name: schema.default_name.clone(),
            path: PathBuf::new(),
            floats: schema.floats.clone(),
            strings: schema.strings.clone(),
        }
    }

    /// Merge `key: value` lines into the store, later lines winning.
    pub fn parse(&mut self, text: &str) {
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let (key, value) = line.split_once(':').unwrap_or((line, ""));
            let key = key.trim();
            let value = value.trim();

            match parse_float(value) {
                Some(f) => self.set_float(key, f),
                None => self.set_string(key, value),
            }
        }
    }

    /// Floats first, then strings, one `key: value` per line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.floats {
            out.push_str(&format!("{key}: {value}\n"));
        }
        for (key, value) in &self.strings {
            out.push_str(&format!("{key}: {value}\n"));
        }
        out
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir).map_err(|source| ConfigError::Write {
                    path: self.path.clone(),
                    source,
                })?;
            }
        }
        fs::write(&self.path, self.to_text()).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Rename the backing file: the old file is removed and the store is saved
    /// under the first free path for `name`.
    pub fn rename(&mut self, name: &str) -> Result<(), ConfigError> {
        self.remove_file()?;
        self.name = name.to_string();
        self.path = self.schema.unique_path(name);
        self.save()
    }

    /// Remove the backing file.
    pub fn delete(self) -> Result<(), ConfigError> {
        self.remove_file()
    }

    fn remove_file(&self) -> Result<(), ConfigError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ConfigError::Delete {
                path: self.path.clone(),
                source,
            }),
        }
    }

    pub fn float(&self, key: &str) -> Option<f32> {
        self.floats.get(key).copied()
    }

    pub fn string(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }

    pub fn set_float(&mut self, key: &str, value: f32) {
        self.strings.remove(key);
        self.floats.insert(key.to_string(), value);
    }

    pub fn set_string(&mut self, key: &str, value: &str) {
        self.floats.remove(key);
        self.strings.insert(key.to_string(), value.to_string());
    }

    pub fn floats(&self) -> &BTreeMap<String, f32> {
        &self.floats
    }

    pub fn strings(&self) -> &BTreeMap<String, String> {
        &self.strings
    }

    pub fn schema(&self) -> &ConfigSchema {
        &self.schema
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// A value is a float only if the whole trimmed text is a finite number.
fn parse_float(value: &str) -> Option<f32> {
    let starts_numeric = value
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.'));
    if !starts_numeric {
        return None;
    }
    value.parse::<f32>().ok().filter(|f| f.is_finite())
}

/// `"SOOTY-3"` → `"SOOTY"`; stems without a numeric suffix are unchanged.
fn strip_unique_suffix(stem: &str) -> &str {
    match stem.rsplit_once('-') {
        Some((base, n)) if !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()) => base,
        _ => stem,
    }
}
