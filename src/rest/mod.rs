//! Resource object model for the point-of-sale API.
//!
//! This module sits on top of [`Connection`](crate::clients::Connection) and
//! turns JSON payloads into live objects:
//!
//! - **[`ResourceAccessor`]**: finds, creates, counts and enumerates one
//!   collection
//! - **[`SubResourceAccessor`]**: the same for a collection reached through a
//!   parent object's reference
//! - **[`ResourceObject`]**: one record, with lazy attribute resolution,
//!   buffered writes, `save` and `delete`
//! - **[`ResourceType`] / [`ResourceRegistry`]**: the declared schema of each
//!   resource (read-only fields, writable fields, nested resources)
//! - **[`FilterSet`]**: query filters passed through to the server
//! - **[`Mapping`]**: dotted-path view over nested objects
//! - **[`ResourceError`]**: errors of this layer
//!
//! # Example
//!
//! ```rust,ignore
//! use merchantos_api::rest::{EnumerateParams, FilterSet};
//!
//! let items = client.resource("Item");
//!
//! // One record
//! let mut item = items.find("56936", &FilterSet::new()).await?;
//! item.set("description", "Blue mug, large")?;
//! item.save().await?;
//!
//! // Every record updated since a date, 100 per request
//! let query = FilterSet::new().gte("timeStamp", "2013-08-27T00:00:00+00:00");
//! let mut pages = items.enumerate(EnumerateParams::new().query(query));
//! while let Some(item) = pages.next().await {
//!     println!("{}", item?.url());
//! }
//! ```

mod accessor;
mod errors;
mod filters;
mod mapping;
mod object;
pub mod resources;
mod schema;

pub use accessor::{
    EnumerateParams, ResourceAccessor, ResourcePages, SubResourceAccessor, MAX_PAGE_SIZE,
};
pub use errors::ResourceError;
pub use filters::FilterSet;
pub use mapping::Mapping;
pub use object::{identifier_field, Attribute, Field, ParentRef, ResourceObject};
pub use schema::{ResourceRegistry, ResourceType, SubResource};
