//! Schema cache keyed by shape name.
//!
//! A shape is built and validated once; later registrations of the same
//! shape return the cached `Arc<Schema>` without rebuilding it. Published
//! schemas are immutable, so encoding never takes the registry lock.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::descriptor::FieldSpec;
use crate::error::SchemaError;
use crate::schema::{Schema, SchemaBuilder, SchemaDocument};

/// A Rust type that declares its own wire schema.
///
/// ```
/// use protobuffy::{FieldSource, FieldSpec, FieldValue, ProtoShape, WireCategory};
///
/// struct Ping {
///     seq: u32,
/// }
///
/// impl ProtoShape for Ping {
///     const SHAPE: &'static str = "Ping";
///
///     fn declare_fields() -> Vec<FieldSpec> {
///         vec![FieldSpec::new("seq", 1, WireCategory::UInt32)]
///     }
/// }
///
/// impl FieldSource for Ping {
///     fn field(&self, name: &str) -> Option<FieldValue<'_>> {
///         match name {
///             "seq" => Some(self.seq.into()),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait ProtoShape {
    const SHAPE: &'static str;

    /// Fields in declaration order, which is also wire order.
    fn declare_fields() -> Vec<FieldSpec>;
}

#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<HashMap<String, Arc<Schema>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry, created on first use.
    pub fn global() -> &'static SchemaRegistry {
        static GLOBAL: OnceLock<SchemaRegistry> = OnceLock::new();
        GLOBAL.get_or_init(SchemaRegistry::new)
    }

    // Writers only ever insert whole entries, so a poisoned map is still
    // consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Schema>>> {
        self.schemas.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Schema>>> {
        self.schemas.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, shape: &str) -> Option<Arc<Schema>> {
        self.read().get(shape).cloned()
    }

    pub fn contains(&self, shape: &str) -> bool {
        self.read().contains_key(shape)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Registered shape names, sorted.
    pub fn shapes(&self) -> Vec<String> {
        let mut shapes: Vec<String> = self.read().keys().cloned().collect();
        shapes.sort();
        shapes
    }

    /// Build, validate and cache the builder's schema, or return the schema
    /// already cached under the same shape name.
    pub fn register(&self, builder: SchemaBuilder) -> Result<Arc<Schema>, SchemaError> {
        if let Some(cached) = self.get(builder.shape()) {
            log::trace!("registry: cache hit for '{}'", builder.shape());
            return Ok(cached);
        }
        let schema = builder.build().map_err(|err| {
            log::warn!("registry: rejected schema: {err}");
            err
        })?;
        Ok(self.publish(schema))
    }

    /// Like [`register`](Self::register), but `declare` only runs when the
    /// shape is not cached yet.
    pub fn register_with<F>(&self, shape: &str, declare: F) -> Result<Arc<Schema>, SchemaError>
    where
        F: FnOnce() -> Vec<FieldSpec>,
    {
        if let Some(cached) = self.get(shape) {
            log::trace!("registry: cache hit for '{shape}'");
            return Ok(cached);
        }
        self.register(SchemaBuilder::new(shape).fields(declare()))
    }

    /// Schema of a [`ProtoShape`] type, registering it on first use.
    pub fn schema_of<T: ProtoShape>(&self) -> Result<Arc<Schema>, SchemaError> {
        self.register_with(T::SHAPE, T::declare_fields)
    }

    /// Register every schema declared in a TOML [`SchemaDocument`], in
    /// document order. Stops at the first invalid schema; schemas before it
    /// stay registered.
    pub fn register_toml(&self, source: &str) -> Result<Vec<Arc<Schema>>, SchemaError> {
        let document = SchemaDocument::from_toml_str(source)?;
        document
            .schemas
            .into_iter()
            .map(|definition| self.register(definition.into_builder()))
            .collect()
    }

    // A concurrent registration of the same shape may have won the race
    // between our lookup and the write lock; the first published schema
    // stays authoritative.
    fn publish(&self, schema: Schema) -> Arc<Schema> {
        let mut schemas = self.write();
        if let Some(existing) = schemas.get(schema.shape()) {
            return Arc::clone(existing);
        }
        log::debug!("registry: registered '{}' with {} fields", schema.shape(), schema.len());
        let schema = Arc::new(schema);
        schemas.insert(schema.shape().to_string(), Arc::clone(&schema));
        schema
    }
}
