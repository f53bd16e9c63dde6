use serde_json::{Map, Value};

use dotkit_core::{DotkitError, Result};

/// A Taskwarrior task as exported to hooks.
///
/// Wraps the raw JSON object so attributes this crate doesn't know about
/// (UDAs, annotations, ...) pass through untouched and in their original
/// order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Task(Map<String, Value>);

impl Task {
    pub fn parse(line: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(line.trim()) {
            Ok(Value::Object(map)) => Ok(Task(map)),
            Ok(other) => Err(DotkitError::Hook(format!(
                "expected a JSON object, got {}",
                kind_of(&other)
            ))),
            Err(e) => Err(DotkitError::Hook(format!("invalid task JSON: {e}"))),
        }
    }

    /// Single-line JSON, as Taskwarrior expects on stdout.
    pub fn to_json(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn set_str(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), Value::String(value.to_string()));
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn description(&self) -> &str {
        self.get_str("description").unwrap_or_default()
    }

    pub fn status(&self) -> Option<&str> {
        self.get_str("status")
    }

    /// Whether the task is currently running (has a `start` timestamp).
    pub fn is_started(&self) -> bool {
        self.has("start")
    }

    pub fn tags(&self) -> Vec<&str> {
        match self.0.get("tags") {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags().contains(&tag)
    }

    /// Add `tag` if missing. Returns whether the task changed.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        if self.has_tag(tag) {
            return false;
        }
        let mut tags: Vec<Value> = self
            .tags()
            .into_iter()
            .map(|t| Value::String(t.to_string()))
            .collect();
        tags.push(Value::String(tag.to_string()));
        self.0.insert("tags".into(), Value::Array(tags));
        true
    }

    /// Remove every tag in `drop`. Returns the tags actually removed.
    ///
    /// An emptied tag list is removed altogether.
    pub fn remove_tags(&mut self, drop: &[String]) -> Vec<String> {
        let current: Vec<String> = self.tags().into_iter().map(str::to_string).collect();
        let (removed, kept): (Vec<String>, Vec<String>) =
            current.into_iter().partition(|t| drop.contains(t));
        if removed.is_empty() {
            return removed;
        }
        if kept.is_empty() {
            self.0.remove("tags");
        } else {
            self.0.insert(
                "tags".into(),
                Value::Array(kept.into_iter().map(Value::String).collect()),
            );
        }
        removed
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
