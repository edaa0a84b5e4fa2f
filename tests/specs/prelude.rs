//! Test helpers for behavioral specifications.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Placeholder substituted for values that change every run
pub const VOLATILE: &str = "<volatile>";

/// Scratch directory for one spec
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    /// Write a file, creating parent directories
    pub fn file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Sorted names of the files directly under `relative`
    pub fn list(&self, relative: &str) -> Vec<String> {
        let mut names: Vec<_> = std::fs::read_dir(self.join(relative))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }
}

pub fn read_json(path: &Path) -> Value {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()));
    serde_json::from_str(&text).unwrap()
}

/// Replace every value stored under one of `keys`, at any depth, with
/// [`VOLATILE`] (nulls are kept so "unset" stays visible).
pub fn mask(mut value: Value, keys: &[&str]) -> Value {
    mask_in_place(&mut value, keys);
    value
}

fn mask_in_place(value: &mut Value, keys: &[&str]) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if keys.contains(&key.as_str()) && !child.is_null() {
                    *child = Value::String(VOLATILE.to_string());
                } else {
                    mask_in_place(child, keys);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(|item| mask_in_place(item, keys)),
        _ => {}
    }
}

/// JSON comparison with a readable diff on failure
pub fn assert_json_eq(actual: &Value, expected: &Value) {
    similar_asserts::assert_eq!(actual, expected);
}
