//! Authentication types for the MerchantOS API client.
//!
//! The point-of-sale API uses HTTP Basic authentication: the credential is
//! the base64 encoding of `user:token`, sent on every request.
//!
//! # Example
//!
//! ```rust
//! use merchantos_api::{ApiToken, UserId};
//! use merchantos_api::auth::BasicCredentials;
//!
//! let credentials = BasicCredentials::new(
//!     &UserId::new("user").unwrap(),
//!     &ApiToken::new("token").unwrap(),
//! );
//!
//! assert_eq!(credentials.header_value(), "Basic dXNlcjp0b2tlbg==");
//! ```

mod credentials;

pub use credentials::BasicCredentials;
