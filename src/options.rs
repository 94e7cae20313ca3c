//! # Compile Options
//!
//! Settings that shape the generated script without changing what it does.
//! Hosts usually load these from JSON alongside the graph; every field has
//! a default so a partial (or empty) object is accepted.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Indent unit for nested statement bodies
    pub indent: String,
    /// Written into the header docstring when set. Left unset by default
    /// so identical graphs produce identical scripts.
    pub timestamp: Option<String>,
    /// Emit `name = None` for every variable before the first statement
    pub declare_variables: bool,
    /// Title line of the header docstring
    pub program_title: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            timestamp: None,
            declare_variables: true,
            program_title: "SmartX Enhanced Automation Code".to_string(),
        }
    }
}

impl CompileOptions {
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let options = CompileOptions::from_json(r#"{ "indent": "  " }"#).unwrap();
        assert_eq!(options.indent, "  ");
        assert!(options.declare_variables);
        assert_eq!(options.timestamp, None);
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(CompileOptions::from_json("{}").unwrap(), CompileOptions::default());
    }
}
