//! Navigation targets shared by every screen.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::models::NoteId;

/// Browser tab title for a route whose note could not be loaded.
pub const NOT_FOUND_TITLE: &str = "Note not found | Congenial Carnival";

/// Fallback tab title when the lookup itself failed.
pub const FALLBACK_TITLE: &str = "Note";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    /// Note list, the home screen
    List,
    /// Creation flow
    New,
    Edit(NoteId),
}

impl Route {
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::List => "/".to_string(),
            Self::New => "/new".to_string(),
            Self::Edit(id) => format!("/{id}"),
        }
    }

    /// Parse a path produced by [`Route::path`]. Unknown paths yield `None`.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim();
        let path = path.split(['?', '#']).next().unwrap_or_default();
        match path.trim_end_matches('/') {
            "" => Some(Self::List),
            "/login" => Some(Self::Login),
            "/new" => Some(Self::New),
            other => other
                .strip_prefix('/')
                .filter(|segment| !segment.contains('/'))
                .and_then(|segment| segment.parse().ok())
                .map(Self::Edit),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| Error::InvalidInput(format!("Unknown route '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "0190f5a2-7c3e-7d41-9a55-5b1f0c2d3e4f";

    #[test]
    fn paths_render() {
        let id: NoteId = ID.parse().unwrap();
        assert_eq!(Route::Login.path(), "/login");
        assert_eq!(Route::List.path(), "/");
        assert_eq!(Route::New.path(), "/new");
        assert_eq!(Route::Edit(id).to_string(), format!("/{ID}"));
    }

    #[test]
    fn parse_accepts_rendered_paths() {
        let id: NoteId = ID.parse().unwrap();
        for route in [Route::Login, Route::List, Route::New, Route::Edit(id)] {
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
        assert_eq!(Route::parse("/new/"), Some(Route::New));
        assert_eq!(Route::parse("/?tab=all"), Some(Route::List));
    }

    #[test]
    fn parse_rejects_unknown_paths() {
        assert_eq!(Route::parse("/settings"), None);
        assert_eq!(Route::parse(&format!("/{ID}/extra")), None);
        assert!("/nope".parse::<Route>().is_err());
    }
}
