//! Read-only view over nested JSON objects.

use std::fmt;
use std::ops::Deref;

use serde::Serialize;
use serde_json::{Map, Value};

/// A nested object field of a resource, with dotted-path access.
///
/// Path segments are object keys; a numeric segment indexes into an array.
/// `Deref`s to the underlying JSON map, so all map methods are available.
///
/// # Example
///
/// ```rust
/// use merchantos_api::rest::Mapping;
/// use serde_json::json;
///
/// let shops = Mapping::new(json!({
///     "ItemShop": [
///         {"shopID": "0", "qoh": "12"},
///         {"shopID": "1", "qoh": "3"}
///     ]
/// }).as_object().unwrap().clone());
///
/// assert_eq!(shops.path("ItemShop.1.qoh"), Some(&json!("3")));
/// assert_eq!(shops.get_str("missing"), None);
/// assert!(shops.contains_key("ItemShop"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Mapping(Map<String, Value>);

impl Mapping {
    /// Wraps a JSON object.
    #[must_use]
    pub const fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Looks up a dotted path such as `"Prices.ItemPrice.0.amount"`.
    #[must_use]
    pub fn path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Looks up a dotted path and returns it as a string slice.
    #[must_use]
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.path(path).and_then(Value::as_str)
    }

    /// Looks up a dotted path that holds a nested object and wraps it.
    #[must_use]
    pub fn mapping(&self, path: &str) -> Option<Self> {
        self.path(path)
            .and_then(Value::as_object)
            .map(|map| Self(map.clone()))
    }

    /// Returns the underlying JSON map.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl Deref for Mapping {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Mapping> for Value {
    fn from(mapping: Mapping) -> Self {
        Self::Object(mapping.0)
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}
