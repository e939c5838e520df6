//! Entry point tying configuration, connection and resource registry together.

use std::sync::Arc;

use crate::clients::{Connection, HttpError};
use crate::config::ClientConfig;
use crate::rest::resources::default_registry;
use crate::rest::{ResourceAccessor, ResourceRegistry};

/// Client for one MerchantOS account.
///
/// Holds the shared [`Connection`] and the [`ResourceRegistry`] accessors
/// are typed from. Cloning is cheap; clones share the connection.
///
/// # Example
///
/// ```rust,ignore
/// use merchantos_api::{ApiClient, ApiHost, ApiToken, ClientConfig, UserId};
/// use merchantos_api::rest::FilterSet;
///
/// let config = ClientConfig::builder()
///     .host(ApiHost::new("api.merchantos.com")?)
///     .user_id(UserId::new("joey@example.com")?)
///     .api_token(ApiToken::new("apikey")?)
///     .build()?;
///
/// let client = ApiClient::connect(&config).await?;
/// let count = client.resource("Item").get_count(&FilterSet::new()).await?;
/// println!("{} has {count} items", client.account_id());
/// ```
#[derive(Clone, Debug)]
pub struct ApiClient {
    connection: Arc<Connection>,
    registry: Arc<ResourceRegistry>,
}

// Verify ApiClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ApiClient>();
};

impl ApiClient {
    /// Connects to the account the credentials belong to, using the
    /// [default registry](default_registry).
    ///
    /// # Errors
    ///
    /// Returns the [`HttpError`] of the account bootstrap request.
    pub async fn connect(config: &ClientConfig) -> Result<Self, HttpError> {
        Self::connect_with_registry(config, default_registry()).await
    }

    /// Connects with a caller-supplied registry.
    ///
    /// # Errors
    ///
    /// Returns the [`HttpError`] of the account bootstrap request.
    pub async fn connect_with_registry(
        config: &ClientConfig,
        registry: ResourceRegistry,
    ) -> Result<Self, HttpError> {
        let connection = Connection::initialize(config).await?;
        Ok(Self::with_registry(connection, registry))
    }

    /// Wraps an already opened connection.
    #[must_use]
    pub fn with_registry(connection: Connection, registry: ResourceRegistry) -> Self {
        Self {
            connection: Arc::new(connection),
            registry: Arc::new(registry),
        }
    }

    /// Returns an accessor for the collection named `name`.
    ///
    /// Unregistered names get a generic accessor.
    #[must_use]
    pub fn resource(&self, name: &str) -> ResourceAccessor {
        ResourceAccessor::new(self.registry.lookup(name), Arc::clone(&self.connection))
    }

    /// Returns the shared connection.
    #[must_use]
    pub const fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    /// Returns the registry accessors are typed from.
    #[must_use]
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Returns the account id resolved at connect time.
    #[must_use]
    pub fn account_id(&self) -> &str {
        self.connection.account_id()
    }
}
