//! Query filters passed through to the API.
//!
//! The server encodes comparisons inside the value: `">=,2013-08-27T00:00:00+00:00"`
//! means "greater than or equal to". [`FilterSet`] does not interpret these
//! values; the helpers only format them.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp format the API expects in filters.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S+00:00";

/// An opaque key/value query, sent as form-encoded query parameters.
///
/// Keys are kept in sorted order so the resulting URLs are deterministic.
///
/// # Example
///
/// ```rust
/// use merchantos_api::rest::FilterSet;
///
/// let filters = FilterSet::new()
///     .gte("timeStamp", "2013-08-27T00:00:00+00:00")
///     .gt("checkedIn", "0")
///     .with("load_relations", "all");
///
/// assert_eq!(filters.get("checkedIn"), Some(">,0"));
/// assert_eq!(filters.get("load_relations"), Some("all"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
    params: BTreeMap<String, String>,
}

impl FilterSet {
    /// Creates an empty filter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a raw parameter, replacing any previous value for `key`.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a raw parameter in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Adds an equality filter (`=,value`).
    #[must_use]
    pub fn equals(self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.operator(key, "=", value.as_ref())
    }

    /// Adds a greater-than filter (`>,value`).
    #[must_use]
    pub fn gt(self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.operator(key, ">", value.as_ref())
    }

    /// Adds a greater-than-or-equal filter (`>=,value`).
    #[must_use]
    pub fn gte(self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.operator(key, ">=", value.as_ref())
    }

    /// Adds a less-than filter (`<,value`).
    #[must_use]
    pub fn lt(self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.operator(key, "<", value.as_ref())
    }

    /// Adds a less-than-or-equal filter (`<=,value`).
    #[must_use]
    pub fn lte(self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.operator(key, "<=", value.as_ref())
    }

    /// Matches records whose `field` is at or after `since`.
    ///
    /// ```rust
    /// use chrono::{TimeZone, Utc};
    /// use merchantos_api::rest::FilterSet;
    ///
    /// let since = Utc.with_ymd_and_hms(2012, 12, 19, 16, 1, 15).unwrap();
    /// let filters = FilterSet::new().since("timeStamp", since);
    /// assert_eq!(filters.get("timeStamp"), Some(">=,2012-12-19T16:01:15+00:00"));
    /// ```
    #[must_use]
    pub fn since(self, field: impl Into<String>, since: DateTime<Utc>) -> Self {
        let stamp = since.format(TIMESTAMP_FORMAT).to_string();
        self.gte(field, stamp)
    }

    fn operator(self, key: impl Into<String>, op: &str, value: &str) -> Self {
        self.with(key, format!("{op},{value}"))
    }

    /// Returns a copy of `self` with every entry of `other` applied on top.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        merged
            .params
            .extend(other.params.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns `true` if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns the parameters as a plain map.
    #[must_use]
    pub const fn query_dict(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_operators_prefix_the_value() {
        let filters = FilterSet::new()
            .equals("shopID", "0")
            .lt("qoh", "5")
            .lte("price", "9.99");

        assert_eq!(filters.get("shopID"), Some("=,0"));
        assert_eq!(filters.get("qoh"), Some("<,5"));
        assert_eq!(filters.get("price"), Some("<=,9.99"));
    }

    #[test]
    fn test_since_formats_utc_timestamp() {
        let since = Utc.with_ymd_and_hms(2013, 8, 27, 0, 0, 0).unwrap();
        let filters = FilterSet::new().since("createTime", since);
        assert_eq!(
            filters.get("createTime"),
            Some(">=,2013-08-27T00:00:00+00:00")
        );
    }

    #[test]
    fn test_merge_prefers_other() {
        let defaults = FilterSet::new().with("load_relations", "all").with("limit", "10");
        let caller = FilterSet::new().with("limit", "5");

        let merged = defaults.merge(&caller);
        assert_eq!(merged.get("limit"), Some("5"));
        assert_eq!(merged.get("load_relations"), Some("all"));
    }

    #[test]
    fn test_collects_from_pairs() {
        let filters: FilterSet = [("orderID", "7")].into_iter().collect();
        assert_eq!(filters.get("orderID"), Some("7"));
        assert!(!filters.is_empty());
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let filters = FilterSet::new().with("a", "1");
        assert_eq!(serde_json::to_string(&filters).unwrap(), r#"{"a":"1"}"#);
    }
}
