use std::fmt;

use serde::{Deserialize, Serialize};

const FALLBACK_ID: &str = "board";

/// Sanitized identifier distinguishing one board from another in a session.
///
/// Only `[A-Za-z0-9_]` survive; every run of other characters collapses to a
/// single underscore.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WidgetId(String);

impl WidgetId {
    pub fn sanitize(raw: &str) -> Self {
        let mut out = String::with_capacity(raw.len());
        let mut in_run = false;
        for c in raw.trim().chars() {
            if c.is_ascii_alphanumeric() || c == '_' {
                out.push(c);
                in_run = false;
            } else if !in_run {
                out.push('_');
                in_run = true;
            }
        }

        if out.is_empty() {
            out.push_str(FALLBACK_ID);
        }
        Self(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for WidgetId {
    fn default() -> Self {
        Self(FALLBACK_ID.to_owned())
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
