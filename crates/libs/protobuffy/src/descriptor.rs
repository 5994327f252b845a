//! Field metadata: wire types, categories and per-field descriptors.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// Largest field number the wire format can carry.
pub const MAX_FIELD_NUMBER: u32 = (1 << 29) - 1;

/// Low three bits of a tag. Group types (3, 4) are not supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

/// Declared type of a field, which selects its payload encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WireCategory {
    Int32,
    Int64,
    UInt32,
    UInt64,
    SInt32,
    SInt64,
    Enum,
    Bool,
    Fixed64,
    SFixed64,
    Double,
    Fixed32,
    SFixed32,
    Float,
    String,
    Bytes,
    Message,
}

impl WireCategory {
    pub const ALL: [WireCategory; 17] = [
        Self::Int32,
        Self::Int64,
        Self::UInt32,
        Self::UInt64,
        Self::SInt32,
        Self::SInt64,
        Self::Enum,
        Self::Bool,
        Self::Fixed64,
        Self::SFixed64,
        Self::Double,
        Self::Fixed32,
        Self::SFixed32,
        Self::Float,
        Self::String,
        Self::Bytes,
        Self::Message,
    ];

    pub fn wire_type(self) -> WireType {
        match self {
            Self::Int32
            | Self::Int64
            | Self::UInt32
            | Self::UInt64
            | Self::SInt32
            | Self::SInt64
            | Self::Enum
            | Self::Bool => WireType::Varint,
            Self::Fixed64 | Self::SFixed64 | Self::Double => WireType::Fixed64,
            Self::String | Self::Bytes | Self::Message => WireType::LengthDelimited,
            Self::Fixed32 | Self::SFixed32 | Self::Float => WireType::Fixed32,
        }
    }

    /// Scalars may be packed; length-delimited categories may not.
    pub fn is_packable(self) -> bool {
        self.wire_type() != WireType::LengthDelimited
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::SInt32 => "sint32",
            Self::SInt64 => "sint64",
            Self::Enum => "enum",
            Self::Bool => "bool",
            Self::Fixed64 => "fixed64",
            Self::SFixed64 => "sfixed64",
            Self::Double => "double",
            Self::Fixed32 => "fixed32",
            Self::SFixed32 => "sfixed32",
            Self::Float => "float",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for WireCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WireCategory {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| SchemaError::UnknownWireCategory(s.to_string()))
    }
}

impl TryFrom<String> for WireCategory {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WireCategory> for String {
    fn from(category: WireCategory) -> Self {
        category.as_str().to_string()
    }
}

/// Immutable metadata for one schema field.
///
/// Built only by [`SchemaBuilder`](crate::SchemaBuilder), which checks the
/// field number range and packing rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub(crate) name: String,
    pub(crate) number: u32,
    pub(crate) category: WireCategory,
    pub(crate) required: bool,
    pub(crate) repeated: bool,
    pub(crate) packed: bool,
}

impl FieldDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn category(&self) -> WireCategory {
        self.category
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_repeated(&self) -> bool {
        self.repeated
    }

    pub fn is_packed(&self) -> bool {
        self.packed
    }

    /// Wire type of the field as a whole. Packed fields are length-delimited
    /// whatever their element category.
    pub fn wire_type(&self) -> WireType {
        if self.packed {
            WireType::LengthDelimited
        } else {
            self.category.wire_type()
        }
    }

    /// `(number << 3) | wire_type`.
    pub fn tag(&self) -> u32 {
        (self.number << 3) | self.wire_type() as u32
    }
}

/// One declared field, as handed to registration: name, number, category
/// and modifiers. Fields are required and singular unless marked otherwise.
/// Repeated fields are never required; a missing list is an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    pub name: String,
    pub number: u32,
    #[serde(rename = "type")]
    pub category: WireCategory,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub repeated: bool,
    #[serde(default)]
    pub packed: bool,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, number: u32, category: WireCategory) -> Self {
        Self {
            name: name.into(),
            number,
            category,
            optional: false,
            repeated: false,
            packed: false,
        }
    }

    /// Build from a textual type name such as `"sint64"`.
    pub fn parse(name: impl Into<String>, number: u32, type_name: &str) -> Result<Self, SchemaError> {
        Ok(Self::new(name, number, type_name.parse()?))
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    /// Repeated scalar with packed encoding. Implies `repeated`.
    pub fn packed(mut self) -> Self {
        self.repeated = true;
        self.packed = true;
        self
    }
}
