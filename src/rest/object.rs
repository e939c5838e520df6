//! Materialized resource instances.
//!
//! A [`ResourceObject`] is one record returned by the API. It keeps the
//! server's fields, a buffer of local writes, and the instance URL derived
//! from its identifier.
//!
//! # Reading Attributes
//!
//! [`ResourceObject::get`] resolves a name in this order:
//!
//! 1. A pending local write always wins.
//! 2. A name the server did not send fails with
//!    [`ResourceError::AttributeNotAvailable`].
//! 3. `null` is returned as-is.
//! 4. A declared sub-resource still holding its raw `resource` reference is
//!    inflated (one GET for a single object, an enumeration for a collection)
//!    and the result replaces the reference. Records the server embedded
//!    directly were already realized when the object was built.
//! 5. Any other nested object is wrapped in a [`Mapping`] once.
//!
//! Steps 4 and 5 are the only transitions a field ever makes, and each
//! happens at most once.
//!
//! # Writing Attributes
//!
//! [`ResourceObject::set`] buffers writes until [`ResourceObject::save`].
//! Read-only attributes are rejected; attributes outside a declared writable
//! set are accepted but never recorded.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut item = items.find("56936", &FilterSet::new()).await?;
//!
//! let description = item.get("description").await?.as_str().map(str::to_owned);
//! item.set("description", "Blue mug, large")?;
//! item.save().await?;
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::clients::Connection;
use crate::rest::accessor::{EnumerateParams, SubResourceAccessor};
use crate::rest::{FilterSet, Mapping, ResourceError, ResourceType, SubResource};

/// Returns the identifier field for a resource name: `Item` -> `itemID`.
#[must_use]
pub fn identifier_field(resource_name: &str) -> String {
    let mut chars = resource_name.chars();
    chars.next().map_or_else(
        || "ID".to_string(),
        |first| format!("{}{}ID", first.to_lowercase(), chars.as_str()),
    )
}

/// Returns `true` for a sub-resource reference: a mapping naming its path
/// under `resource`.
fn is_reference(map: &Map<String, Value>) -> bool {
    map.get("resource").is_some_and(Value::is_string)
}

/// The object a nested resource was realized from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParentRef {
    /// The parent's resource name.
    pub resource: String,
    /// The parent's instance URL.
    pub url: String,
}

/// State of one realized field.
#[derive(Clone, Debug)]
pub enum Field {
    /// A plain value as the server sent it, including `null`.
    Value(Value),
    /// A nested object, wrapped for dotted-path access.
    Mapping(Mapping),
    /// A declared sub-resource that still holds its raw reference.
    Unresolved(Map<String, Value>),
    /// An inflated single sub-resource; `None` if it could not be fetched.
    Resource(Option<Box<ResourceObject>>),
    /// An inflated sub-resource collection, in server order.
    Resources(Vec<ResourceObject>),
}

impl Field {
    fn to_value(&self) -> Value {
        match self {
            Self::Value(value) => value.clone(),
            Self::Mapping(mapping) => Value::Object((**mapping).clone()),
            Self::Unresolved(reference) => Value::Object(reference.clone()),
            Self::Resource(resource) => resource
                .as_ref()
                .map_or(Value::Null, |resource| resource.to_value()),
            Self::Resources(resources) => {
                Value::Array(resources.iter().map(ResourceObject::to_value).collect())
            }
        }
    }

    fn as_attribute(&self) -> Attribute<'_> {
        match self {
            Self::Value(value) => Attribute::Value(value),
            Self::Mapping(mapping) => Attribute::Mapping(mapping),
            Self::Unresolved(reference) => Attribute::Reference(reference),
            Self::Resource(resource) => Attribute::Resource(resource.as_deref()),
            Self::Resources(resources) => Attribute::Resources(resources),
        }
    }
}

/// A resolved attribute, borrowed from its object.
#[derive(Clone, Copy, Debug)]
pub enum Attribute<'a> {
    /// A plain value or a pending write.
    Value(&'a Value),
    /// A nested object.
    Mapping(&'a Mapping),
    /// A raw sub-resource reference that could not be inflated.
    Reference(&'a Map<String, Value>),
    /// A single sub-resource.
    Resource(Option<&'a ResourceObject>),
    /// A sub-resource collection.
    Resources(&'a [ResourceObject]),
}

impl<'a> Attribute<'a> {
    /// Returns the plain value, if this is one.
    #[must_use]
    pub const fn as_value(&self) -> Option<&'a Value> {
        match *self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the value as a string slice, if it is a JSON string.
    #[must_use]
    pub fn as_str(&self) -> Option<&'a str> {
        self.as_value().and_then(Value::as_str)
    }

    /// Returns `true` for a JSON `null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.as_value().is_some_and(Value::is_null)
    }

    /// Returns the nested mapping, if this is one.
    #[must_use]
    pub const fn as_mapping(&self) -> Option<&'a Mapping> {
        match *self {
            Self::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    /// Returns the single sub-resource, if this is one that was found.
    #[must_use]
    pub const fn as_resource(&self) -> Option<&'a ResourceObject> {
        match *self {
            Self::Resource(resource) => resource,
            _ => None,
        }
    }

    /// Returns the sub-resource collection, if this is one.
    #[must_use]
    pub const fn as_resources(&self) -> Option<&'a [ResourceObject]> {
        match *self {
            Self::Resources(resources) => Some(resources),
            _ => None,
        }
    }
}

/// What reading a field requires before it can be returned.
enum Step {
    Ready,
    Wrap,
    Inflate(Value),
}

/// A realized resource instance.
#[derive(Clone, Debug)]
pub struct ResourceObject {
    name: String,
    kind: Arc<ResourceType>,
    fields: BTreeMap<String, Field>,
    updates: Map<String, Value>,
    url: String,
    connection: Arc<Connection>,
    parent: Option<ParentRef>,
}

impl ResourceObject {
    /// Materializes a payload returned for the collection at `collection_path`.
    ///
    /// The instance URL is `{collection_path}/{id}`, where the id is read
    /// from the field named by [`identifier_field`].
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidPayload`] if the payload is not an
    /// object and [`ResourceError::MissingIdentifier`] if it has no usable id.
    pub fn new(
        connection: Arc<Connection>,
        collection_path: &str,
        name: &str,
        kind: Arc<ResourceType>,
        payload: Value,
        parent: Option<ParentRef>,
    ) -> Result<Self, ResourceError> {
        let Value::Object(payload) = payload else {
            return Err(ResourceError::InvalidPayload {
                resource: name.to_string(),
                payload: payload.to_string(),
            });
        };

        let id_field = identifier_field(name);
        let id = match payload.get(&id_field) {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => {
                return Err(ResourceError::MissingIdentifier {
                    resource: name.to_string(),
                    field: id_field,
                })
            }
        };

        // A reference may already name the instance, e.g. `Customer/3`.
        let url = if collection_path.contains('/')
            && collection_path.rsplit('/').next() == Some(id.as_str())
        {
            collection_path.to_string()
        } else {
            format!("{collection_path}/{id}")
        };
        tracing::debug!("Resource Object URL: {}", url);

        let mut object = Self {
            name: name.to_string(),
            kind,
            fields: BTreeMap::new(),
            updates: Map::new(),
            url,
            connection,
            parent,
        };
        object.fields = object.realize(payload);
        Ok(object)
    }

    /// Sorts a payload into field cells.
    ///
    /// A declared sub-resource holding a `resource` reference starts
    /// unresolved. One that embeds its record (as `load_relations` does) is
    /// realized in place with the bound type; if that fails it stays a plain
    /// value and is wrapped on first read.
    fn realize(&self, payload: Map<String, Value>) -> BTreeMap<String, Field> {
        payload
            .into_iter()
            .map(|(key, value)| {
                let field = match (self.kind.sub_resource_for(&key), value) {
                    (Some(_), Value::Object(reference)) if is_reference(&reference) => {
                        Field::Unresolved(reference)
                    }
                    (Some(binding), Value::Object(embedded)) => self.embed(binding, embedded),
                    (_, other) => Field::Value(other),
                };
                (key, field)
            })
            .collect()
    }

    /// Realizes a sub-resource the server embedded instead of referencing.
    fn embed(&self, binding: &SubResource, embedded: Map<String, Value>) -> Field {
        let kind = binding.kind();
        let realize_one = |record: Value| {
            Self::new(
                Arc::clone(&self.connection),
                kind.name(),
                kind.name(),
                Arc::clone(kind),
                record,
                Some(self.as_parent()),
            )
        };

        if binding.is_single() {
            return match realize_one(Value::Object(embedded.clone())) {
                Ok(object) => Field::Resource(Some(Box::new(object))),
                Err(e) => {
                    tracing::debug!("Embedded {} kept as a mapping: {}", kind.name(), e);
                    Field::Value(Value::Object(embedded))
                }
            };
        }

        // Collections embed as `{ "<Name>": [...] }`, or a bare object for one entry.
        let records = match embedded.get(kind.name()) {
            Some(Value::Array(items)) => items.clone(),
            Some(single @ Value::Object(_)) => vec![single.clone()],
            _ => return Field::Value(Value::Object(embedded)),
        };
        let realized: Result<Vec<_>, _> = records.into_iter().map(realize_one).collect();
        match realized {
            Ok(objects) => Field::Resources(objects),
            Err(e) => {
                tracing::debug!("Embedded {} kept as a mapping: {}", kind.name(), e);
                Field::Value(Value::Object(embedded))
            }
        }
    }

    /// Returns the resource name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    #[must_use]
    pub const fn kind(&self) -> &Arc<ResourceType> {
        &self.kind
    }

    /// Returns the instance URL, e.g. `Item/56936`.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the id portion of the instance URL.
    #[must_use]
    pub fn id(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or_default()
    }

    /// Returns the object this one was realized from, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<&ParentRef> {
        self.parent.as_ref()
    }

    /// Returns the writes that [`save`](Self::save) would send.
    #[must_use]
    pub const fn pending_updates(&self) -> &Map<String, Value> {
        &self.updates
    }

    /// Returns the current state of a realized field without resolving it.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Reads an attribute, inflating or wrapping it on first access.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::AttributeNotAvailable`] if the server sent no
    /// such field, and any error raised while enumerating a sub-resource
    /// collection.
    pub async fn get(&mut self, name: &str) -> Result<Attribute<'_>, ResourceError> {
        if self.updates.contains_key(name) {
            return self
                .updates
                .get(name)
                .map(Attribute::Value)
                .ok_or_else(|| Self::not_available(name));
        }

        self.resolve(name).await?;

        self.fields
            .get(name)
            .map(Field::as_attribute)
            .ok_or_else(|| Self::not_available(name))
    }

    /// Moves a field to its realized state.
    async fn resolve(&mut self, name: &str) -> Result<(), ResourceError> {
        let step = match self.fields.get(name) {
            None => return Err(Self::not_available(name)),
            Some(Field::Unresolved(reference)) => Step::Inflate(Value::Object(reference.clone())),
            Some(Field::Value(Value::Object(_))) => Step::Wrap,
            Some(_) => Step::Ready,
        };

        match step {
            Step::Ready => {}
            Step::Wrap => {
                if let Some(field) = self.fields.get_mut(name) {
                    let inner = match field {
                        Field::Value(Value::Object(map)) => Some(std::mem::take(map)),
                        _ => None,
                    };
                    if let Some(map) = inner {
                        *field = Field::Mapping(Mapping::new(map));
                    }
                }
            }
            Step::Inflate(reference) => {
                let field = self.inflate(name, &reference).await?;
                self.fields.insert(name.to_string(), field);
            }
        }

        Ok(())
    }

    /// Fetches a declared sub-resource from its raw reference.
    async fn inflate(&self, name: &str, reference: &Value) -> Result<Field, ResourceError> {
        let Some(binding) = self.kind.sub_resource_for(name) else {
            return Ok(Field::Value(reference.clone()));
        };

        let accessor = SubResourceAccessor::new(
            Arc::clone(binding.kind()),
            name,
            reference,
            Arc::clone(&self.connection),
            self.as_parent(),
        )?;
        tracing::debug!("Inflating {} of {} from {}", name, self.url, accessor.path());

        if binding.is_single() {
            let resource = accessor.get("", &FilterSet::new()).await;
            Ok(Field::Resource(resource.map(Box::new)))
        } else {
            let resources = accessor.enumerate(EnumerateParams::default()).collect().await?;
            Ok(Field::Resources(resources))
        }
    }

    /// Buffers a write until [`save`](Self::save).
    ///
    /// A write to an attribute outside a declared writable set is accepted
    /// but dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ReadOnly`] if the attribute is declared
    /// read-only.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ResourceError> {
        if self.kind.is_read_only(name) {
            return Err(ResourceError::ReadOnly {
                name: name.to_string(),
            });
        }

        if !self.kind.accepts_write(name) {
            tracing::debug!("{} is not writable on {}; write dropped", name, self.name);
            return Ok(());
        }

        self.updates.insert(name.to_string(), value.into());
        Ok(())
    }

    /// Sends the pending writes and replaces every realized field with the
    /// server's response.
    ///
    /// Fields the server does not echo back are gone afterwards. Does nothing
    /// when there are no pending writes.
    ///
    /// # Errors
    ///
    /// Returns the connection's error if the PUT fails, and
    /// [`ResourceError::InvalidPayload`] if the response is not an object. In
    /// both cases the pending writes are kept.
    pub async fn save(&mut self) -> Result<(), ResourceError> {
        if self.updates.is_empty() {
            return Ok(());
        }

        tracing::info!("Updating {}", self.url);
        let response = self.connection.update(&self.url, &self.updates).await?;
        let payload = self.unwrap_envelope(response)?;

        self.updates.clear();
        self.fields = self.realize(payload);
        Ok(())
    }

    /// Takes the record out of a `{ "<Name>": {...} }` envelope when present.
    fn unwrap_envelope(&self, response: Value) -> Result<Map<String, Value>, ResourceError> {
        let Value::Object(mut body) = response else {
            return Err(ResourceError::InvalidPayload {
                resource: self.name.clone(),
                payload: response.to_string(),
            });
        };

        if let Some(Value::Object(_)) = body.get(&self.name) {
            if let Some(Value::Object(record)) = body.remove(&self.name) {
                return Ok(record);
            }
        }
        Ok(body)
    }

    /// Deletes this instance on the server and returns the decoded response.
    ///
    /// # Errors
    ///
    /// Returns the connection's error if the DELETE fails.
    pub async fn delete(&self) -> Result<Value, ResourceError> {
        tracing::info!("Deleting {}", self.url);
        Ok(self.connection.delete(&self.url).await?)
    }

    /// Returns the realized fields as JSON, with inflated sub-resources
    /// rendered in place. Pending writes are not included.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(key, field)| (key.clone(), field.to_value()))
                .collect(),
        )
    }

    fn as_parent(&self) -> ParentRef {
        ParentRef {
            resource: self.name.clone(),
            url: self.url.clone(),
        }
    }

    fn not_available(name: &str) -> ResourceError {
        ResourceError::AttributeNotAvailable {
            name: name.to_string(),
        }
    }
}

impl fmt::Display for ResourceObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_value())
    }
}
