//! Navigation routes for the list/detail flow.

use crate::model::note::NoteId;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

const LIST_PATH: &str = "main";

static DETAIL_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^note/(-?\d+)$").expect("valid detail route regex"));

/// Logical destination exposed to the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Note list.
    List,
    /// Detail screen for one note.
    Detail { note_id: NoteId },
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::List => LIST_PATH.to_string(),
            Self::Detail { note_id } => format!("note/{note_id}"),
        }
    }

    /// Parses `main` or `note/{id}`. Anything else is not a route.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.trim().trim_matches('/');
        if path == LIST_PATH {
            return Some(Self::List);
        }
        let caps = DETAIL_PATH_RE.captures(path)?;
        let note_id = caps.get(1)?.as_str().parse().ok()?;
        Some(Self::Detail { note_id })
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::Route;

    #[test]
    fn paths_parse_back_to_routes() {
        assert_eq!(Route::parse("main"), Some(Route::List));
        assert_eq!(
            Route::parse(&Route::Detail { note_id: 12 }.path()),
            Some(Route::Detail { note_id: 12 })
        );
        assert_eq!(Route::parse("/note/3/"), Some(Route::Detail { note_id: 3 }));
    }

    #[test]
    fn unknown_or_malformed_paths_are_rejected() {
        assert_eq!(Route::parse("settings"), None);
        assert_eq!(Route::parse("note/"), None);
        assert_eq!(Route::parse("note/abc"), None);
        assert_eq!(Route::parse("note/99999999999999999999999"), None);
    }
}
