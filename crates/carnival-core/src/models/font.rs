//! Typographic style for the editor surface.
//!
//! Purely a session-local preference: it is never written to the note.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontChoice {
    #[default]
    Sans,
    Serif,
    Mono,
}

impl FontChoice {
    pub const ALL: [Self; 3] = [Self::Sans, Self::Serif, Self::Mono];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Sans => "sans",
            Self::Serif => "serif",
            Self::Mono => "mono",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sans => "Sans",
            Self::Serif => "Serif",
            Self::Mono => "Mono",
        }
    }

    /// Style class applied to the title and document surfaces.
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Sans => "font-sans",
            Self::Serif => "font-serif",
            Self::Mono => "font-mono",
        }
    }
}

impl fmt::Display for FontChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FontChoice {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim();
        Self::ALL
            .into_iter()
            .find(|font| font.id().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("Unknown font '{needle}' (expected sans, serif, or mono)"))
    }
}
