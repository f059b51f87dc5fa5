use std::fmt;

use serde::{Deserialize, Serialize};

/// How much shape checking `record` applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Store any parseable JSON as-is.
    #[default]
    Permissive,
    /// Only page-view and duration records are stored.
    Strict,
}

impl Strictness {
    pub fn from_flag(strict: bool) -> Self {
        if strict {
            Strictness::Strict
        } else {
            Strictness::Permissive
        }
    }

    pub fn is_strict(self) -> bool {
        matches!(self, Strictness::Strict)
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Strictness::Permissive => "permissive",
            Strictness::Strict => "strict",
        };
        f.write_str(label)
    }
}
