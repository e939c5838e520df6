//! Declared point-of-sale resources.
//!
//! [`default_registry`] preloads the resources most integrations touch. Their
//! identifiers and server-maintained timestamps are read-only, and the fields
//! that hold nested resources are bound so they inflate on first read:
//!
//! | Resource                  | Nested resources                                |
//! |---------------------------|-------------------------------------------------|
//! | `Item`                    | `Note` (single)                                 |
//! | `Customer`                | `Contact`, `Note` (single)                      |
//! | `Sale`                    | `Customer` (single), `SaleLines` (collection)   |
//! | `Order`                   | `Vendor` (single), `OrderLines` (collection)    |
//! | all others                | none                                            |
//!
//! Any other name resolves to a generic type through
//! [`ResourceRegistry::lookup`].
//!
//! # Example
//!
//! ```rust
//! use merchantos_api::rest::resources::default_registry;
//!
//! let registry = default_registry();
//! let sale = registry.lookup("Sale");
//!
//! assert!(sale.is_read_only("saleID"));
//! assert!(!sale.sub_resource_for("SaleLines").unwrap().is_single());
//! ```

use std::sync::Arc;

use crate::rest::{FilterSet, ResourceRegistry, ResourceType, SubResource};

/// Fields the server maintains on every record.
const TIMESTAMPS: [&str; 2] = ["createTime", "timeStamp"];

/// Declares a resource whose identifier and timestamps are read-only.
fn resource(name: &str) -> ResourceType {
    let id = crate::rest::identifier_field(name);
    ResourceType::new(name).read_only(std::iter::once(id).chain(TIMESTAMPS.map(String::from)))
}

/// Returns a registry preloaded with the common point-of-sale resources.
#[must_use]
pub fn default_registry() -> ResourceRegistry {
    let mut registry = ResourceRegistry::new();

    let note = Arc::new(ResourceType::new("Note"));
    let contact = Arc::new(ResourceType::new("Contact"));

    registry.register(resource("Account"));
    registry.register(resource("Shop"));
    registry.register(resource("Category").filters(FilterSet::new().with("orderby", "name")));
    registry.register(
        resource("Item")
            .read_only(["systemSku"])
            .sub_resource("Note", SubResource::single(Arc::clone(&note)))
            .filters(FilterSet::new().equals("archived", "false")),
    );

    let customer = registry.register(
        resource("Customer")
            .sub_resource("Contact", SubResource::single(contact))
            .sub_resource("Note", SubResource::single(note)),
    );
    let sale_line = registry.register(resource("SaleLine"));
    registry.register(
        resource("Sale")
            .read_only(["completeTime"])
            .sub_resource("Customer", SubResource::single(customer))
            .sub_resource("SaleLines", SubResource::collection(sale_line))
            .filters(FilterSet::new().equals("completed", "true")),
    );

    let vendor = registry.register(resource("Vendor"));
    let order_line = registry.register(resource("OrderLine"));
    registry.register(
        resource("Order")
            .sub_resource("Vendor", SubResource::single(vendor))
            .sub_resource("OrderLines", SubResource::collection(order_line)),
    );

    registry.register(resource("InventoryCountReconcile"));

    registry
}
