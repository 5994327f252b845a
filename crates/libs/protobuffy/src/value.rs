//! Source instances: how the encoder reads field values.
//!
//! A type becomes encodable by implementing [`FieldSource`]. Returning
//! `None` marks the field as absent, which is different from a zero value:
//! absent fields produce no bytes at all.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::schema::Schema;

/// Read access to the named fields of one instance.
pub trait FieldSource {
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

/// A borrowed field value. Numeric variants are converted to the field's
/// declared category at encode time.
#[derive(Clone)]
pub enum FieldValue<'a> {
    Signed(i64),
    Unsigned(u64),
    Bool(bool),
    Float(f32),
    Double(f64),
    Str(&'a str),
    Bytes(&'a [u8]),
    /// Nested message: its own schema plus the instance to read from.
    Message(&'a Schema, &'a dyn FieldSource),
    /// Elements of a repeated field.
    List(Vec<FieldValue<'a>>),
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signed(v) => f.debug_tuple("Signed").field(v).finish(),
            Self::Unsigned(v) => f.debug_tuple("Unsigned").field(v).finish(),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Double(v) => f.debug_tuple("Double").field(v).finish(),
            Self::Str(v) => f.debug_tuple("Str").field(v).finish(),
            Self::Bytes(v) => f.debug_tuple("Bytes").field(v).finish(),
            Self::Message(schema, _) => f.debug_tuple("Message").field(&schema.shape()).finish(),
            Self::List(v) => f.debug_tuple("List").field(v).finish(),
        }
    }
}

macro_rules! field_value_from {
    ($($ty:ty => $variant:ident via $conv:ty;)*) => {
        $(
            impl From<$ty> for FieldValue<'_> {
                fn from(value: $ty) -> Self {
                    Self::$variant(<$conv>::from(value))
                }
            }
        )*
    };
}

field_value_from! {
    i8 => Signed via i64;
    i16 => Signed via i64;
    i32 => Signed via i64;
    i64 => Signed via i64;
    u8 => Unsigned via u64;
    u16 => Unsigned via u64;
    u32 => Unsigned via u64;
    u64 => Unsigned via u64;
    bool => Bool via bool;
    f32 => Float via f32;
    f64 => Double via f64;
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(value: &'a str) -> Self {
        Self::Str(value)
    }
}

impl<'a> From<&'a String> for FieldValue<'a> {
    fn from(value: &'a String) -> Self {
        Self::Str(value)
    }
}

impl<'a> From<&'a [u8]> for FieldValue<'a> {
    fn from(value: &'a [u8]) -> Self {
        Self::Bytes(value)
    }
}

macro_rules! field_value_from_slice {
    ($($ty:ty),*) => {
        $(
            impl<'a> From<&'a [$ty]> for FieldValue<'a> {
                fn from(values: &'a [$ty]) -> Self {
                    Self::List(values.iter().map(|&v| v.into()).collect())
                }
            }
        )*
    };
}

field_value_from_slice!(i8, i16, i32, i64, u16, u32, u64, bool, f32, f64);

/// Owned value stored in a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicitly absent; reads as `None`.
    Null,
    Signed(i64),
    Unsigned(u64),
    Bool(bool),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
    Message(Arc<Schema>, Box<Record>),
    List(Vec<Value>),
}

impl Value {
    pub fn message(schema: Arc<Schema>, record: Record) -> Self {
        Self::Message(schema, Box::new(record))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrowed view; `None` for [`Value::Null`]. Null list elements are
    /// dropped, so a repeated field encodes only its non-null elements.
    pub fn as_field(&self) -> Option<FieldValue<'_>> {
        Some(match self {
            Self::Null => return None,
            Self::Signed(v) => FieldValue::Signed(*v),
            Self::Unsigned(v) => FieldValue::Unsigned(*v),
            Self::Bool(v) => FieldValue::Bool(*v),
            Self::Float(v) => FieldValue::Float(*v),
            Self::Double(v) => FieldValue::Double(*v),
            Self::String(v) => FieldValue::Str(v),
            Self::Bytes(v) => FieldValue::Bytes(v),
            Self::Message(schema, record) => FieldValue::Message(schema, &**record),
            Self::List(items) => {
                let elements: Vec<_> = items.iter().filter_map(Value::as_field).collect();
                if elements.len() < items.len() {
                    log::trace!(
                        "value: dropped {} null list element(s)",
                        items.len() - elements.len()
                    );
                }
                FieldValue::List(elements)
            }
        })
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident via $conv:ty;)*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(<$conv>::from(value))
                }
            }
        )*
    };
}

value_from! {
    i8 => Signed via i64;
    i16 => Signed via i64;
    i32 => Signed via i64;
    i64 => Signed via i64;
    u8 => Unsigned via u64;
    u16 => Unsigned via u64;
    u32 => Unsigned via u64;
    u64 => Unsigned via u64;
    bool => Bool via bool;
    f32 => Float via f32;
    f64 => Double via f64;
    String => String via String;
    &str => String via String;
    Vec<u8> => Bytes via Vec<u8>;
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// Dynamic instance: field name to owned value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: HashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Record::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FieldSource for Record {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        self.values.get(name).and_then(Value::as_field)
    }
}
