//! File-oriented key parsing for build tooling
//!
//! Maps a key onto a directory/file/property layout, e.g.
//! `orders:meal.orderComponent.title`. These rules differ from the runtime
//! rules in [`crate::key`] (dots become directories, bare keys land in a
//! `global` file) and the two parsers are not interchangeable.

use crate::error::{I18nError, I18nResult};
use crate::key::normalize;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File used for keys without any colon.
pub const GLOBAL_FILE: &str = "global";

/// File used for a bare single-segment key.
pub const COMMON_FILE: &str = "common";

/// Structured location of a key in a translation file tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedKey {
    /// Directory segments, outermost first.
    pub directories: Vec<String>,
    /// File stem; never empty.
    pub file: String,
    /// Property path inside the file.
    pub property_path: Vec<String>,
    /// The key as given, before normalization.
    pub original_key: String,
}

impl ParsedKey {
    /// Relative path of the file holding this key, without extension.
    pub fn file_path(&self) -> PathBuf {
        let mut path: PathBuf = self.directories.iter().collect();
        path.push(&self.file);
        path
    }

    /// Dotted property path (`user.profile.name`).
    pub fn property(&self) -> String {
        self.property_path.join(".")
    }
}

/// Parser implementing the tooling-side key layout rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathKeyParser;

impl PathKeyParser {
    /// Creates a parser.
    pub const fn new() -> Self {
        Self
    }

    /// Parses `key` into directories, file and property path.
    ///
    /// # Errors
    ///
    /// Returns [`I18nError::InvalidKey`] when nothing remains after
    /// normalization, or when a segment is empty (`a:.b`).
    pub fn parse(&self, key: &str) -> I18nResult<ParsedKey> {
        let normalized = normalize(key);
        if normalized.is_empty() {
            return Err(I18nError::InvalidKey {
                key: key.to_string(),
                reason: "key is empty after normalization".to_string(),
            });
        }

        let mut directories: Vec<String> = normalized.split(':').map(str::to_string).collect();
        let last = directories.pop().unwrap_or_default();
        let colon_count = directories.len();
        let dot_parts: Vec<String> = last.split('.').map(str::to_string).collect();

        if directories.iter().chain(&dot_parts).any(String::is_empty) {
            return Err(I18nError::InvalidKey {
                key: key.to_string(),
                reason: "key contains an empty segment".to_string(),
            });
        }

        let (file, property_path) = match (colon_count, dot_parts.len()) {
            // `auth:login`: the last directory is the file.
            (colons, 1) if colons > 0 => {
                let file = directories.pop().unwrap_or_default();
                (file, dot_parts)
            }
            // `login`
            (0, 1) => (COMMON_FILE.to_string(), dot_parts),
            // `user.profile.name`: every dot segment is a property.
            (0, _) => (GLOBAL_FILE.to_string(), dot_parts),
            // `orders:meal.title` and `orders:meal.user.profile.name`
            (1, _) => {
                let mut parts = dot_parts.into_iter();
                let file = parts.next().unwrap_or_default();
                (file, parts.collect())
            }
            // `app:features:meal.orderComponent.title`
            (_, n) => {
                let mut parts = dot_parts;
                let property = parts.split_off(n - 1);
                let file = parts.pop().unwrap_or_default();
                directories.extend(parts);
                (file, property)
            }
        };

        Ok(ParsedKey {
            directories,
            file,
            property_path,
            original_key: key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_bare_key_goes_to_common() {
        let parsed = PathKeyParser::new().parse("login").unwrap();
        assert!(parsed.directories.is_empty());
        assert_eq!(parsed.file, "common");
        assert_eq!(parsed.property_path, strings(&["login"]));
    }

    #[test]
    fn test_dotted_key_without_colon_goes_to_global() {
        let parsed = PathKeyParser::new().parse("user.profile.name").unwrap();
        assert!(parsed.directories.is_empty());
        assert_eq!(parsed.file, "global");
        assert_eq!(parsed.property_path, strings(&["user", "profile", "name"]));
    }

    #[test]
    fn test_single_segment_after_colon() {
        let parsed = PathKeyParser::new().parse("auth:login").unwrap();
        assert!(parsed.directories.is_empty());
        assert_eq!(parsed.file, "auth");
        assert_eq!(parsed.property_path, strings(&["login"]));

        let parsed = PathKeyParser::new().parse("app:auth:login").unwrap();
        assert_eq!(parsed.directories, strings(&["app"]));
        assert_eq!(parsed.file, "auth");
    }

    #[test]
    fn test_one_colon() {
        let parsed = PathKeyParser::new().parse("orders:meal.title").unwrap();
        assert_eq!(parsed.directories, strings(&["orders"]));
        assert_eq!(parsed.file, "meal");
        assert_eq!(parsed.property_path, strings(&["title"]));

        let parsed = PathKeyParser::new()
            .parse("orders:meal.user.profile.name")
            .unwrap();
        assert_eq!(parsed.file, "meal");
        assert_eq!(parsed.property_path, strings(&["user", "profile", "name"]));
        assert_eq!(parsed.property(), "user.profile.name");
    }

    #[test]
    fn test_several_colons() {
        let parsed = PathKeyParser::new()
            .parse("app:features:orders:meal.orderComponent.title")
            .unwrap();
        assert_eq!(
            parsed.directories,
            strings(&["app", "features", "orders", "meal"])
        );
        assert_eq!(parsed.file, "orderComponent");
        assert_eq!(parsed.property_path, strings(&["title"]));
        assert_eq!(
            parsed.file_path(),
            PathBuf::from("app/features/orders/meal/orderComponent")
        );

        let parsed = PathKeyParser::new().parse("a:b:file.prop").unwrap();
        assert_eq!(parsed.directories, strings(&["a", "b"]));
        assert_eq!(parsed.file, "file");
    }

    #[test]
    fn test_original_key_is_preserved() {
        let parsed = PathKeyParser::new().parse("  orders::meal..title ").unwrap();
        assert_eq!(parsed.original_key, "  orders::meal..title ");
        assert_eq!(parsed.file, "meal");
    }

    #[test]
    fn test_invalid_keys() {
        assert!(matches!(
            PathKeyParser::new().parse("  ::.. "),
            Err(I18nError::InvalidKey { .. })
        ));
        assert!(matches!(
            PathKeyParser::new().parse("a:.b"),
            Err(I18nError::InvalidKey { .. })
        ));
    }
}
