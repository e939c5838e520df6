//! Typed access to one API collection.
//!
//! A [`ResourceAccessor`] pairs a resource name with its collection path and
//! declared [`ResourceType`]. It finds, creates, counts and enumerates
//! instances; each payload it receives becomes a [`ResourceObject`].
//!
//! [`SubResourceAccessor`] is the same thing for a collection reached through
//! a parent object's reference.
//!
//! # Enumeration
//!
//! [`ResourceAccessor::enumerate`] returns a lazy [`ResourcePages`] cursor.
//! Pages are requested with `offset`/`limit` query parameters, one page at a
//! time, until the server answers with an empty response or the caller's
//! limit is reached.
//!
//! ```rust,ignore
//! let sales = client.resource("Sale");
//! let mut pages = sales.enumerate(
//!     EnumerateParams::new()
//!         .limit(250)
//!         .query(FilterSet::new().gte("timeStamp", "2013-08-27T00:00:00+00:00")),
//! );
//!
//! while let Some(sale) = pages.next().await {
//!     let sale = sale?;
//!     println!("{}", sale.url());
//! }
//! ```

use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::clients::{Connection, HttpError};
use crate::rest::object::{ParentRef, ResourceObject};
use crate::rest::{FilterSet, ResourceError, ResourceType, SubResource};

/// Largest page the API serves.
pub const MAX_PAGE_SIZE: usize = 100;

/// Accessor for one collection path.
#[derive(Clone, Debug)]
pub struct ResourceAccessor {
    name: String,
    path: String,
    kind: Arc<ResourceType>,
    connection: Arc<Connection>,
    parent: Option<ParentRef>,
}

impl ResourceAccessor {
    /// Creates an accessor for a top-level collection. The path is the
    /// resource name.
    #[must_use]
    pub fn new(kind: Arc<ResourceType>, connection: Arc<Connection>) -> Self {
        let name = kind.name().to_string();
        tracing::debug!("Resource accessor for {}", name);
        Self {
            path: name.clone(),
            name,
            kind,
            connection,
            parent: None,
        }
    }

    /// Returns the resource name; also the key payloads are found under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the collection path, relative to the account root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the declared type.
    #[must_use]
    pub const fn kind(&self) -> &Arc<ResourceType> {
        &self.kind
    }

    /// Returns the filters offered for this resource.
    #[must_use]
    pub fn filters(&self) -> FilterSet {
        self.kind.filter_set().clone()
    }

    /// Returns the declared nested resources, keyed by field name.
    #[must_use]
    pub fn get_subresources(&self) -> Vec<(&str, &SubResource)> {
        let mut bindings: Vec<_> = self
            .kind
            .sub_resources()
            .iter()
            .map(|(field, binding)| (field.as_str(), binding))
            .collect();
        bindings.sort_by_key(|(field, _)| *field);
        bindings
    }

    fn instance_path(&self, id: &str) -> String {
        if id.is_empty() {
            self.path.clone()
        } else {
            format!("{}/{}", self.path, id)
        }
    }

    fn materialize(&self, payload: Value) -> Result<ResourceObject, ResourceError> {
        ResourceObject::new(
            Arc::clone(&self.connection),
            &self.path,
            &self.name,
            Arc::clone(&self.kind),
            payload,
            self.parent.clone(),
        )
    }

    fn not_found(&self, id: &str) -> ResourceError {
        ResourceError::NotFound {
            resource: self.name.clone(),
            id: id.to_string(),
        }
    }

    /// Fetches one instance. An empty `id` fetches the collection path itself.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] on 404, 204 or a response without
    /// the resource's payload, and the connection's error for any other
    /// failure.
    pub async fn find(
        &self,
        id: &str,
        query: &FilterSet,
    ) -> Result<ResourceObject, ResourceError> {
        let path = self.instance_path(id);
        match self
            .connection
            .get(&path, query.query_dict(), Some(self.name.as_str()))
            .await
        {
            Ok(payload) => self.materialize(payload),
            Err(e) if e.is_empty_response() || e.is_not_found() => Err(self.not_found(id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetches one instance, or `None` if it cannot be fetched.
    ///
    /// Failures other than "not found" are logged before being discarded; use
    /// [`find`](Self::find) to inspect them.
    pub async fn get(&self, id: &str, query: &FilterSet) -> Option<ResourceObject> {
        match self.find(id, query).await {
            Ok(object) => Some(object),
            Err(e) if e.is_not_found() => {
                tracing::debug!("{}", e);
                None
            }
            Err(e) => {
                tracing::warn!("Fetching {} {} failed: {}", self.name, id, e);
                None
            }
        }
    }

    /// Creates an instance from `properties`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] if the response holds no payload for
    /// the resource, and the connection's error for any other failure.
    pub async fn try_create(
        &self,
        properties: &Map<String, Value>,
    ) -> Result<ResourceObject, ResourceError> {
        tracing::info!("Creating {}", self.name);
        match self
            .connection
            .create(&self.path, properties, Some(self.name.as_str()))
            .await
        {
            Ok(payload) => self.materialize(payload),
            Err(e) if e.is_empty_response() || e.is_not_found() => Err(self.not_found("")),
            Err(e) => Err(e.into()),
        }
    }

    /// Creates an instance from `properties`, or returns `None` if the server
    /// did not hand one back.
    pub async fn create(&self, properties: &Map<String, Value>) -> Option<ResourceObject> {
        match self.try_create(properties).await {
            Ok(object) => Some(object),
            Err(e) => {
                tracing::warn!("Creating {} failed: {}", self.name, e);
                None
            }
        }
    }

    /// Returns the number of instances matching `query`.
    ///
    /// # Errors
    ///
    /// Returns the connection's error, or [`ResourceError::InvalidPayload`]
    /// if the count is not a non-negative integer.
    pub async fn get_count(&self, query: &FilterSet) -> Result<u64, ResourceError> {
        let path = format!("{}/count", self.path);
        let count = self
            .connection
            .get(&path, query.query_dict(), Some("count"))
            .await?;

        let parsed = match &count {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| ResourceError::InvalidPayload {
            resource: self.name.clone(),
            payload: count.to_string(),
        })
    }

    /// Starts a lazy enumeration of the collection.
    #[must_use]
    pub fn enumerate(&self, params: EnumerateParams) -> ResourcePages {
        ResourcePages::new(self.clone(), params)
    }
}

/// Accessor for a collection reached through a parent object.
///
/// The reference is either a path string (`"Item/56936/Note"`) or a mapping
/// with a `resource` key holding one. It may name a collection or a single
/// instance (`"Customer/3"`). Payloads are found under the bound type's name;
/// an unnamed type falls back to the last path segment.
#[derive(Clone, Debug)]
pub struct SubResourceAccessor {
    inner: ResourceAccessor,
}

impl SubResourceAccessor {
    /// Creates an accessor from the raw reference stored in `field`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidReference`] if the reference holds no
    /// usable path.
    pub fn new(
        kind: Arc<ResourceType>,
        field: &str,
        reference: &Value,
        connection: Arc<Connection>,
        parent: ParentRef,
    ) -> Result<Self, ResourceError> {
        let path = match reference {
            Value::String(path) => Some(path.as_str()),
            Value::Object(map) => map.get("resource").and_then(Value::as_str),
            _ => None,
        }
        .map(|path| path.trim_matches('/'))
        .filter(|path| !path.is_empty())
        .ok_or_else(|| ResourceError::InvalidReference {
            field: field.to_string(),
            reference: reference.to_string(),
        })?;

        let name = if kind.name().is_empty() {
            path.rsplit('/').next().unwrap_or(path).to_string()
        } else {
            kind.name().to_string()
        };
        tracing::debug!("Sub-resource accessor {} at {}", name, path);

        Ok(Self {
            inner: ResourceAccessor {
                name,
                path: path.to_string(),
                kind,
                connection,
                parent: Some(parent),
            },
        })
    }

    /// Returns the object the reference was read from.
    #[must_use]
    pub fn parent(&self) -> Option<&ParentRef> {
        self.inner.parent.as_ref()
    }

    /// Unwraps the plain accessor.
    #[must_use]
    pub fn into_inner(self) -> ResourceAccessor {
        self.inner
    }
}

impl Deref for SubResourceAccessor {
    type Target = ResourceAccessor;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// Parameters of an enumeration.
///
/// # Example
///
/// ```rust
/// use merchantos_api::rest::{EnumerateParams, FilterSet};
///
/// let params = EnumerateParams::new()
///     .start(200)
///     .limit(30)
///     .query(FilterSet::new().with("load_relations", "all"));
///
/// assert_eq!(params.effective_page_size(), 30);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumerateParams {
    /// Offset of the first item.
    pub start: usize,
    /// Maximum number of items; `0` means no limit.
    pub limit: usize,
    /// Caller filters; their `offset` and `limit` win over the pager's.
    pub query: FilterSet,
    /// Requested page size; capped at [`MAX_PAGE_SIZE`].
    pub page_size: usize,
}

impl Default for EnumerateParams {
    fn default() -> Self {
        Self {
            start: 0,
            limit: 0,
            query: FilterSet::new(),
            page_size: MAX_PAGE_SIZE,
        }
    }
}

impl EnumerateParams {
    /// Creates parameters for a full enumeration from offset 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the offset of the first item.
    #[must_use]
    pub const fn start(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    /// Caps the number of items yielded.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the caller filters.
    #[must_use]
    pub fn query(mut self, query: FilterSet) -> Self {
        self.query = query;
        self
    }

    /// Sets the requested page size.
    #[must_use]
    pub const fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Returns the page size actually requested: the requested size, capped
    /// at [`MAX_PAGE_SIZE`] and at the limit, and never below 1.
    #[must_use]
    pub fn effective_page_size(&self) -> usize {
        let mut size = self.page_size.clamp(1, MAX_PAGE_SIZE);
        if self.limit > 0 {
            size = size.min(self.limit);
        }
        size
    }
}

/// Lazy cursor over an enumeration.
///
/// Each call to [`next`](Self::next) yields one item, fetching the next page
/// only when the current one is used up. Once the cursor returns `None` it
/// stays exhausted.
#[derive(Debug)]
pub struct ResourcePages {
    accessor: ResourceAccessor,
    query: FilterSet,
    offset: usize,
    page_size: usize,
    /// Items still allowed by the caller's limit; `None` when unlimited.
    remaining: Option<usize>,
    page: VecDeque<Value>,
    finished: bool,
}

impl ResourcePages {
    fn new(accessor: ResourceAccessor, params: EnumerateParams) -> Self {
        let page_size = params.effective_page_size();
        Self {
            accessor,
            query: params.query,
            offset: params.start,
            page_size,
            remaining: (params.limit > 0).then_some(params.limit),
            page: VecDeque::new(),
            finished: false,
        }
    }

    /// Yields the next item, or `None` when the enumeration is done.
    ///
    /// A transport failure is yielded once as an error and ends the
    /// enumeration. A payload that cannot be materialized is yielded as an
    /// error without ending it.
    #[allow(clippy::should_implement_trait)]
    pub async fn next(&mut self) -> Option<Result<ResourceObject, ResourceError>> {
        loop {
            if self.remaining == Some(0) {
                return None;
            }

            if let Some(raw) = self.page.pop_front() {
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                }
                return Some(self.accessor.materialize(raw));
            }

            if self.finished {
                return None;
            }

            match self.fetch_page().await {
                Ok(items) if items.is_empty() => self.finished = true,
                Ok(items) => {
                    self.offset += self.page_size;
                    self.page = items.into();
                }
                Err(e) if e.is_empty_response() => {
                    tracing::debug!(
                        "Enumeration of {} ended at offset {}",
                        self.accessor.path,
                        self.offset
                    );
                    self.finished = true;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e.into()));
                }
            }
        }
    }

    async fn fetch_page(&self) -> Result<Vec<Value>, HttpError> {
        let query = FilterSet::new()
            .with("offset", self.offset.to_string())
            .with("limit", self.page_size.to_string())
            .merge(&self.query);

        let payload = self
            .accessor
            .connection
            .get(&self.accessor.path, query.query_dict(), Some(self.accessor.name.as_str()))
            .await?;

        Ok(match payload {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            single => vec![single],
        })
    }

    /// Drains the cursor into a list.
    ///
    /// # Errors
    ///
    /// Returns the first error yielded.
    pub async fn collect(mut self) -> Result<Vec<ResourceObject>, ResourceError> {
        let mut objects = Vec::new();
        while let Some(object) = self.next().await {
            objects.push(object?);
        }
        Ok(objects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApiHost, ApiToken, ClientConfig, UserId};
    use serde_json::json;

    fn connection() -> Arc<Connection> {
        let config = ClientConfig::builder()
            .host(ApiHost::new("api.merchantos.com").unwrap())
            .user_id(UserId::new("user").unwrap())
            .api_token(ApiToken::new("token").unwrap())
            .build()
            .unwrap();
        Arc::new(Connection::with_account_id(&config, "1"))
    }

    fn parent() -> ParentRef {
        ParentRef {
            resource: "Item".to_string(),
            url: "Item/5".to_string(),
        }
    }

    #[test]
    fn test_page_size_defaults_to_maximum() {
        assert_eq!(EnumerateParams::new().effective_page_size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_page_size_is_capped_by_limit_and_maximum() {
        assert_eq!(EnumerateParams::new().limit(30).effective_page_size(), 30);
        assert_eq!(EnumerateParams::new().page_size(500).effective_page_size(), 100);
        assert_eq!(
            EnumerateParams::new().page_size(20).limit(30).effective_page_size(),
            20
        );
    }

    #[test]
    fn test_zero_page_size_is_clamped_to_one() {
        assert_eq!(EnumerateParams::new().page_size(0).effective_page_size(), 1);
    }

    #[test]
    fn test_top_level_accessor_uses_name_as_path() {
        let accessor = ResourceAccessor::new(Arc::new(ResourceType::new("Item")), connection());
        assert_eq!(accessor.name(), "Item");
        assert_eq!(accessor.path(), "Item");
        assert_eq!(accessor.instance_path("12"), "Item/12");
        assert_eq!(accessor.instance_path(""), "Item");
    }

    #[test]
    fn test_sub_resource_accessor_reads_path_reference() {
        let accessor = SubResourceAccessor::new(
            Arc::new(ResourceType::new("Note")),
            "Note",
            &json!("Item/5/Note"),
            connection(),
            parent(),
        )
        .unwrap();

        assert_eq!(accessor.path(), "Item/5/Note");
        assert_eq!(accessor.name(), "Note");
        assert_eq!(accessor.parent(), Some(&parent()));
    }

    #[test]
    fn test_sub_resource_accessor_reads_mapping_reference() {
        let accessor = SubResourceAccessor::new(
            Arc::new(ResourceType::new("SaleLine")),
            "SaleLines",
            &json!({"resource": "Sale/9/SaleLine"}),
            connection(),
            parent(),
        )
        .unwrap();

        assert_eq!(accessor.path(), "Sale/9/SaleLine");
        assert_eq!(accessor.name(), "SaleLine");
    }

    #[test]
    fn test_sub_resource_accessor_keys_by_bound_type_for_instance_path() {
        let accessor = SubResourceAccessor::new(
            Arc::new(ResourceType::new("Customer")),
            "Customer",
            &json!({"resource": "Customer/3"}),
            connection(),
            parent(),
        )
        .unwrap();

        assert_eq!(accessor.path(), "Customer/3");
        assert_eq!(accessor.name(), "Customer");
    }

    #[test]
    fn test_unnamed_type_keys_by_last_path_segment() {
        let accessor = SubResourceAccessor::new(
            Arc::new(ResourceType::default()),
            "Notes",
            &json!("Item/5/Note"),
            connection(),
            parent(),
        )
        .unwrap();

        assert_eq!(accessor.name(), "Note");
    }

    #[test]
    fn test_sub_resource_accessor_rejects_unusable_reference() {
        let result = SubResourceAccessor::new(
            Arc::new(ResourceType::new("Note")),
            "Note",
            &json!({"noteID": "3"}),
            connection(),
            parent(),
        );
        assert!(matches!(
            result,
            Err(ResourceError::InvalidReference { field, .. }) if field == "Note"
        ));
    }

    #[test]
    fn test_sub_resource_listing_is_sorted() {
        let note = Arc::new(ResourceType::new("Note"));
        let kind = ResourceType::new("Item")
            .sub_resource("Note", SubResource::single(Arc::clone(&note)))
            .sub_resource("ItemComponents", SubResource::collection(note));
        let accessor = ResourceAccessor::new(Arc::new(kind), connection());

        let fields: Vec<&str> = accessor.get_subresources().into_iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["ItemComponents", "Note"]);
    }
}
