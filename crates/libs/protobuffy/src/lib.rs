//! # protobuffy
//!
//! Schema-driven Protocol Buffers wire encoder.
//!
//! A schema is declared once as an ordered list of fields, validated and
//! cached in a [`SchemaRegistry`], then used by a [`WireEncoder`] to turn
//! instances into canonical protobuf bytes. Output is byte-identical to what
//! standard protobuf encoders produce for the same field values. Decoding is
//! not provided.
//!
//! ## Wire Format
//!
//! ```text
//! [tag varint][payload] [tag varint][payload] ...
//!  (number << 3) | wire_type
//!
//!  wire type 0  varint          int32 int64 uint32 uint64 sint32 sint64 enum bool
//!  wire type 1  64-bit LE       fixed64 sfixed64 double
//!  wire type 2  len + bytes     string bytes message packed-repeated
//!  wire type 5  32-bit LE       fixed32 sfixed32 float
//! ```
//!
//! ## Example
//!
//! ```rust
//! use protobuffy::{FieldSpec, Record, SchemaBuilder, SchemaRegistry, WireCategory, WireEncoder};
//!
//! let registry = SchemaRegistry::new();
//! let schema = registry
//!     .register(
//!         SchemaBuilder::new("Test")
//!             .field(FieldSpec::new("a", 1, WireCategory::Int32))
//!             .field(FieldSpec::new("b", 2, WireCategory::String))
//!             .field(FieldSpec::new("c", 3, WireCategory::String).optional()),
//!     )
//!     .unwrap();
//!
//! let instance = Record::new().with("a", 300).with("b", "hello").with("c", "world");
//! let bytes = WireEncoder::default().encode(&schema, &instance).unwrap();
//! assert_eq!(&bytes.as_slice()[..3], &[0x08, 0xAC, 0x02]);
//! ```

pub mod buffer;
pub mod config;
pub mod descriptor;
pub mod encoder;
pub mod error;
pub mod registry;
pub mod schema;
pub mod value;
pub mod varint;

pub use buffer::DynamicBuffer;
pub use config::{EncoderConfig, MissingFieldPolicy};
pub use descriptor::{FieldDescriptor, FieldSpec, WireCategory, WireType};
pub use encoder::WireEncoder;
pub use error::{BufferError, EncodeError, Error, SchemaError};
pub use registry::{ProtoShape, SchemaRegistry};
pub use schema::{Schema, SchemaBuilder, SchemaDefinition, SchemaDocument};
pub use value::{FieldSource, FieldValue, Record, Value};
