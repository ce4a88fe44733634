//! Node value container with change detection

use serde::Serialize;

/// Current value of a node: absent until first written, then exactly one of
/// string, int, or float.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Slot {
    #[default]
    Absent,
    String(String),
    Int(i32),
    Float(f32),
}

/// A node's current value with change-detecting setters
///
/// Setters report whether the stored value actually changed: writing the
/// same tag with equal contents returns `false`, anything else (including a
/// tag transition carrying "the same" number) returns `true`. The decoder
/// uses that report to suppress duplicate events.
///
/// Reads coerce across tags: numbers render as decimal strings, strings
/// parse as numbers (0 on parse failure), and an absent value reads as
/// `""` / `0` / `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NodeData {
    value: Slot,
}

impl NodeData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self {
            value: Slot::String(s.into()),
        }
    }

    pub fn from_i32(i: i32) -> Self {
        Self {
            value: Slot::Int(i),
        }
    }

    pub fn from_f32(f: f32) -> Self {
        Self {
            value: Slot::Float(f),
        }
    }

    pub fn is_absent(&self) -> bool {
        self.value == Slot::Absent
    }

    pub fn has_string(&self) -> bool {
        matches!(self.value, Slot::String(_))
    }

    pub fn has_int(&self) -> bool {
        matches!(self.value, Slot::Int(_))
    }

    pub fn has_float(&self) -> bool {
        matches!(self.value, Slot::Float(_))
    }

    /// Store a string value; returns whether the stored value changed
    pub fn set_string(&mut self, s: impl Into<String>) -> bool {
        let s = s.into();
        let changed = !matches!(&self.value, Slot::String(prev) if *prev == s);
        self.value = Slot::String(s);
        changed
    }

    /// Store an integer value; returns whether the stored value changed
    pub fn set_int(&mut self, i: i32) -> bool {
        let changed = !matches!(self.value, Slot::Int(prev) if prev == i);
        self.value = Slot::Int(i);
        changed
    }

    /// Store a float value; returns whether the stored value changed
    pub fn set_float(&mut self, f: f32) -> bool {
        let changed = !matches!(self.value, Slot::Float(prev) if prev == f);
        self.value = Slot::Float(f);
        changed
    }

    /// Reset to the absent state
    pub fn clear(&mut self) {
        self.value = Slot::Absent;
    }

    pub fn get_string(&self) -> String {
        match &self.value {
            Slot::Absent => String::new(),
            Slot::String(s) => s.clone(),
            Slot::Int(i) => i.to_string(),
            Slot::Float(f) => f.to_string(),
        }
    }

    pub fn get_int(&self) -> i32 {
        match &self.value {
            Slot::Absent => 0,
            Slot::String(s) => parse_int(s),
            Slot::Int(i) => *i,
            Slot::Float(f) => *f as i32,
        }
    }

    pub fn get_float(&self) -> f32 {
        match &self.value {
            Slot::Absent => 0.0,
            Slot::String(s) => s.trim().parse().unwrap_or(0.0),
            Slot::Int(i) => *i as f32,
            Slot::Float(f) => *f,
        }
    }
}

fn parse_int(s: &str) -> i32 {
    let s = s.trim();
    s.parse::<i32>()
        .unwrap_or_else(|_| s.parse::<f32>().map(|f| f as i32).unwrap_or(0))
}

impl std::fmt::Display for NodeData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.get_string())
    }
}
