//! Breakpoint types.
//!
//! A breakpoint is a named viewport condition bound to a query expression.
//! The query is opaque here: it is handed to the environment evaluator as-is.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::casing;
use crate::error::{ConfigError, MediaResult, ValidationError};

fn identifier() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex is valid"))
}

/// A validated breakpoint identifier.
///
/// Names must be usable to synthesize flag names (`is<Capitalized>`), so only
/// ASCII identifiers are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BreakpointName(String);

impl BreakpointName {
    /// Validates and wraps a breakpoint name.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::EmptyBreakpointName);
        }
        if !identifier().is_match(&name) {
            return Err(ValidationError::InvalidBreakpointName { name });
        }
        Ok(Self(name))
    }

    /// The raw name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derived flag name, e.g. `isMobile`.
    #[must_use]
    pub fn flag_name(&self) -> String {
        casing::flag_name(&self.0)
    }

    /// Class name, e.g. `media-mobile`.
    #[must_use]
    pub fn class_name(&self) -> String {
        casing::class_name(&self.0)
    }
}

impl TryFrom<String> for BreakpointName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BreakpointName> for String {
    fn from(value: BreakpointName) -> Self {
        value.0
    }
}

impl AsRef<str> for BreakpointName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for BreakpointName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl fmt::Display for BreakpointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A breakpoint: name plus query expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakpoint {
    /// Unique identifier within a service.
    pub name: BreakpointName,
    /// Query expression understood by the environment evaluator.
    pub query: String,
}

impl Breakpoint {
    /// Validates both parts.
    pub fn new(name: impl Into<String>, query: impl Into<String>) -> MediaResult<Self> {
        let name = BreakpointName::new(name)?;
        let query = query.into();
        if query.trim().is_empty() {
            return Err(ValidationError::EmptyQuery {
                name: name.to_string(),
            }
            .into());
        }
        Ok(Self { name, query })
    }
}

/// Ordered name -> query table.
///
/// Serialized as a JSON object. Document order is preserved and becomes the
/// registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BreakpointTable {
    entries: Vec<Breakpoint>,
}

impl BreakpointTable {
    /// Creates an empty table.
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// The conventional responsive set.
    #[must_use]
    pub fn standard() -> Self {
        let entries = [
            ("mobile", "(max-width: 767px)"),
            ("tablet", "(min-width: 768px) and (max-width: 991px)"),
            ("desktop", "(min-width: 992px) and (max-width: 1200px)"),
            ("jumbo", "(min-width: 1201px)"),
        ]
        .into_iter()
        .map(|(name, query)| Breakpoint {
            name: BreakpointName(name.to_string()),
            query: query.to_string(),
        })
        .collect();
        Self { entries }
    }

    /// Builds a table from `(name, query)` pairs, keeping their order.
    pub fn from_pairs<I, N, Q>(pairs: I) -> MediaResult<Self>
    where
        I: IntoIterator<Item = (N, Q)>,
        N: Into<String>,
        Q: Into<String>,
    {
        let mut table = Self::new();
        for (name, query) in pairs {
            table.insert(Breakpoint::new(name, query)?)?;
        }
        Ok(table)
    }

    /// Appends a breakpoint. Names must be unique.
    pub fn insert(&mut self, breakpoint: Breakpoint) -> Result<(), ConfigError> {
        if self.contains(breakpoint.name.as_str()) {
            return Err(ConfigError::DuplicateBreakpoint {
                name: breakpoint.name.to_string(),
            });
        }
        self.entries.push(breakpoint);
        Ok(())
    }

    /// Whether `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Looks up a breakpoint by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Breakpoint> {
        self.entries.iter().find(|b| b.name == *name)
    }

    /// Iterates in table order.
    pub fn iter(&self) -> std::slice::Iter<'_, Breakpoint> {
        self.entries.iter()
    }

    /// Number of breakpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a BreakpointTable {
    type Item = &'a Breakpoint;
    type IntoIter = std::slice::Iter<'a, Breakpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for BreakpointTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for b in &self.entries {
            map.serialize_entry(b.name.as_str(), &b.query)?;
        }
        map.end()
    }
}

struct TableVisitor;

impl<'de> Visitor<'de> for TableVisitor {
    type Value = BreakpointTable;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of breakpoint name to query expression")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        use serde::de::Error;

        let mut table = BreakpointTable::new();
        while let Some((name, query)) = access.next_entry::<String, String>()? {
            let breakpoint = Breakpoint::new(name, query).map_err(A::Error::custom)?;
            table.insert(breakpoint).map_err(A::Error::custom)?;
        }
        Ok(table)
    }
}

impl<'de> Deserialize<'de> for BreakpointTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TableVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_rejects_empty_and_non_identifiers() {
        assert_eq!(BreakpointName::new(""), Err(ValidationError::EmptyBreakpointName));
        assert!(matches!(
            BreakpointName::new("small screen"),
            Err(ValidationError::InvalidBreakpointName { .. })
        ));
        assert!(matches!(
            BreakpointName::new("2xl"),
            Err(ValidationError::InvalidBreakpointName { .. })
        ));
        assert!(BreakpointName::new("mobileLandscape").is_ok());
        assert!(BreakpointName::new("tablet_portrait").is_ok());
    }

    #[test]
    fn breakpoint_rejects_blank_query() {
        let err = Breakpoint::new("mobile", "   ").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn table_rejects_duplicates() {
        let mut table = BreakpointTable::new();
        table.insert(Breakpoint::new("mobile", "(max-width: 767px)").unwrap()).unwrap();
        let err = table
            .insert(Breakpoint::new("mobile", "(max-width: 500px)").unwrap())
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateBreakpoint {
                name: "mobile".to_string()
            }
        );
        assert_eq!(table.get("mobile").unwrap().query, "(max-width: 767px)");
    }

    #[test]
    fn table_json_preserves_document_order() {
        let json = r#"{"zeta": "(min-width: 1px)", "alpha": "(min-width: 2px)", "mid": "(min-width: 3px)"}"#;
        let table: BreakpointTable = serde_json::from_str(json).unwrap();
        let names: Vec<&str> = table.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);

        let back = serde_json::to_string(&table).unwrap();
        assert_eq!(
            back,
            r#"{"zeta":"(min-width: 1px)","alpha":"(min-width: 2px)","mid":"(min-width: 3px)"}"#
        );
    }

    #[test]
    fn table_json_rejects_invalid_names() {
        let json = r#"{"big screen": "(min-width: 1px)"}"#;
        assert!(serde_json::from_str::<BreakpointTable>(json).is_err());
    }

    #[test]
    fn standard_table_order() {
        let names: Vec<String> = BreakpointTable::standard()
            .iter()
            .map(|b| b.name.to_string())
            .collect();
        assert_eq!(names, vec!["mobile", "tablet", "desktop", "jumbo"]);
    }
}
