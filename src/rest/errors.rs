//! Resource-level error types.
//!
//! This module contains [`ResourceError`], which extends the connection's
//! [`HttpError`] with the failures of the resource object model: unknown
//! attributes, writes to read-only attributes and payloads that cannot be
//! materialized.
//!
//! # Example
//!
//! ```rust,ignore
//! use merchantos_api::rest::ResourceError;
//!
//! match items.find("12", &FilterSet::new()).await {
//!     Ok(item) => println!("Found: {item}"),
//!     Err(ResourceError::NotFound { resource, id }) => {
//!         println!("{resource} with id {id} not found");
//!     }
//!     Err(e) => println!("Transport failure: {e}"),
//! }
//! ```

use crate::clients::HttpError;
use thiserror::Error;

/// Error type for resource operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The resource does not exist: the server answered 404, 204, or an
    /// envelope without the resource's payload.
    #[error("{resource} with id {id} not found")]
    NotFound {
        /// The resource name (e.g., "Item").
        resource: String,
        /// The id that was requested.
        id: String,
    },

    /// The attribute is not part of the realized fields.
    #[error("{name} not available")]
    AttributeNotAvailable {
        /// The attribute that was read.
        name: String,
    },

    /// The attribute is declared read-only.
    #[error("Attempt to assign to a read-only property '{name}'")]
    ReadOnly {
        /// The attribute that was written.
        name: String,
    },

    /// The payload lacks the identifier field the instance URL is built from.
    #[error("{resource} payload has no '{field}' field")]
    MissingIdentifier {
        /// The resource name.
        resource: String,
        /// The expected identifier field (e.g., "itemID").
        field: String,
    },

    /// The payload is not a JSON object.
    #[error("{resource} payload is not an object: {payload}")]
    InvalidPayload {
        /// The resource name.
        resource: String,
        /// The offending payload.
        payload: String,
    },

    /// A sub-resource reference is neither a path nor a mapping with a
    /// `resource` key.
    #[error("Invalid sub-resource reference for '{field}': {reference}")]
    InvalidReference {
        /// The field holding the reference.
        field: String,
        /// The offending reference.
        reference: String,
    },

    /// An HTTP-level error occurred.
    #[error(transparent)]
    Http(#[from] HttpError),
}

impl ResourceError {
    /// Returns `true` when the failure means "absent" rather than "broken".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// Verify ResourceError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceError>();
};
