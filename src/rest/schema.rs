//! Declared resource types and the registry that maps names to them.
//!
//! A [`ResourceType`] is the schema a [`ResourceObject`](crate::rest::ResourceObject)
//! consults when reading and writing attributes: which fields are read-only,
//! which are writable, and which hold nested resources.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use merchantos_api::rest::{ResourceRegistry, ResourceType, SubResource};
//!
//! let note = Arc::new(ResourceType::new("Note"));
//! let item = ResourceType::new("Item")
//!     .read_only(["itemID", "timeStamp"])
//!     .writable(["description", "upc"])
//!     .sub_resource("Note", SubResource::single(note));
//!
//! let mut registry = ResourceRegistry::new();
//! registry.register(item);
//!
//! assert!(registry.lookup("Item").is_read_only("itemID"));
//! // Unregistered names fall back to a generic type
//! assert_eq!(registry.lookup("Vendor").name(), "Vendor");
//! ```

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use crate::rest::FilterSet;

/// How a field holding a nested resource is realized.
#[derive(Clone, Debug)]
pub struct SubResource {
    kind: Arc<ResourceType>,
    single: bool,
}

impl SubResource {
    /// A field holding exactly one nested resource, fetched with a single GET.
    #[must_use]
    pub const fn single(kind: Arc<ResourceType>) -> Self {
        Self { kind, single: true }
    }

    /// A field holding a list of nested resources, fetched by enumeration.
    #[must_use]
    pub const fn collection(kind: Arc<ResourceType>) -> Self {
        Self {
            kind,
            single: false,
        }
    }

    /// Returns the nested resource type.
    #[must_use]
    pub const fn kind(&self) -> &Arc<ResourceType> {
        &self.kind
    }

    /// Returns `true` for a single nested object.
    #[must_use]
    pub const fn is_single(&self) -> bool {
        self.single
    }
}

/// Schema of one resource type.
///
/// An empty writable set means every attribute that is not read-only may be
/// written.
#[derive(Clone, Debug, Default)]
pub struct ResourceType {
    name: String,
    read_only: BTreeSet<String>,
    writable: BTreeSet<String>,
    sub_resources: HashMap<String, SubResource>,
    filters: FilterSet,
}

impl ResourceType {
    /// Creates a generic type: nothing read-only, everything writable, no
    /// nested resources.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Declares read-only attributes.
    #[must_use]
    pub fn read_only<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.read_only.extend(names.into_iter().map(Into::into));
        self
    }

    /// Declares writable attributes. Once declared, writes to anything else
    /// are dropped.
    #[must_use]
    pub fn writable<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.writable.extend(names.into_iter().map(Into::into));
        self
    }

    /// Declares that `field` holds a nested resource.
    #[must_use]
    pub fn sub_resource(mut self, field: impl Into<String>, binding: SubResource) -> Self {
        self.sub_resources.insert(field.into(), binding);
        self
    }

    /// Sets the filters offered for this type.
    #[must_use]
    pub fn filters(mut self, filters: FilterSet) -> Self {
        self.filters = filters;
        self
    }

    /// Returns the type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if `field` is declared read-only.
    #[must_use]
    pub fn is_read_only(&self, field: &str) -> bool {
        self.read_only.contains(field)
    }

    /// Returns `true` if a write to `field` is recorded for saving.
    #[must_use]
    pub fn accepts_write(&self, field: &str) -> bool {
        self.writable.is_empty() || self.writable.contains(field)
    }

    /// Returns the nested resource binding for `field`, if declared.
    #[must_use]
    pub fn sub_resource_for(&self, field: &str) -> Option<&SubResource> {
        self.sub_resources.get(field)
    }

    /// Returns every declared nested resource binding.
    #[must_use]
    pub const fn sub_resources(&self) -> &HashMap<String, SubResource> {
        &self.sub_resources
    }

    /// Returns the filters offered for this type.
    #[must_use]
    pub const fn filter_set(&self) -> &FilterSet {
        &self.filters
    }
}

/// Maps resource names to their declared types.
///
/// Names without a registration resolve to a generic [`ResourceType`].
#[derive(Clone, Debug, Default)]
pub struct ResourceRegistry {
    types: HashMap<String, Arc<ResourceType>>,
}

impl ResourceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type under its own name, replacing any earlier one.
    pub fn register(&mut self, kind: ResourceType) -> Arc<ResourceType> {
        let kind = Arc::new(kind);
        self.types.insert(kind.name().to_string(), Arc::clone(&kind));
        kind
    }

    /// Returns the registered type for `name`, or a generic one.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Arc<ResourceType> {
        self.types
            .get(name)
            .cloned()
            .unwrap_or_else(|| Arc::new(ResourceType::new(name)))
    }

    /// Returns `true` if `name` has a registered type.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_type_accepts_every_write() {
        let kind = ResourceType::new("Vendor");
        assert!(kind.accepts_write("name"));
        assert!(!kind.is_read_only("name"));
        assert!(kind.sub_resources().is_empty());
    }

    #[test]
    fn test_declared_writable_set_restricts_writes() {
        let kind = ResourceType::new("Item").writable(["description"]);
        assert!(kind.accepts_write("description"));
        assert!(!kind.accepts_write("upc"));
    }

    #[test]
    fn test_sub_resource_bindings_are_exposed() {
        let line = Arc::new(ResourceType::new("SaleLine"));
        let kind = ResourceType::new("Sale")
            .sub_resource("SaleLines", SubResource::collection(line));

        let binding = kind.sub_resource_for("SaleLines").unwrap();
        assert!(!binding.is_single());
        assert_eq!(binding.kind().name(), "SaleLine");
        assert!(kind.sub_resource_for("Customer").is_none());
    }

    #[test]
    fn test_registry_falls_back_to_generic_type() {
        let mut registry = ResourceRegistry::new();
        registry.register(ResourceType::new("Item").read_only(["itemID"]));

        assert!(registry.contains("Item"));
        assert!(registry.lookup("Item").is_read_only("itemID"));

        assert!(!registry.contains("Shop"));
        let generic = registry.lookup("Shop");
        assert_eq!(generic.name(), "Shop");
        assert!(!generic.is_read_only("shopID"));
    }
}
