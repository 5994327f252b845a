//! Schema-driven wire encoder.
//!
//! Fields are written in schema order as `tag varint` followed by a payload
//! chosen by the field's [`WireCategory`]. Absent fields produce no bytes.
//! Length-delimited payloads whose size is not known up front (nested
//! messages, packed lists) are encoded into a scratch buffer first and then
//! copied behind their length prefix.

use crate::buffer::DynamicBuffer;
use crate::config::{EncoderConfig, MissingFieldPolicy};
use crate::descriptor::{FieldDescriptor, WireCategory};
use crate::error::{EncodeError, Error};
use crate::registry::{ProtoShape, SchemaRegistry};
use crate::schema::Schema;
use crate::value::{FieldSource, FieldValue};
use crate::varint::{write_int_varint, write_sint_varint, write_uint_varint, write_varint32};

/// Starting capacity of scratch buffers for nested and packed payloads.
const SCRATCH_CAPACITY: usize = 64;

/// Stateless encoder; holds only its configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct WireEncoder {
    config: EncoderConfig,
}

impl WireEncoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Encode `instance` into a fresh buffer.
    pub fn encode(
        &self,
        schema: &Schema,
        instance: &dyn FieldSource,
    ) -> Result<DynamicBuffer, EncodeError> {
        let mut buf = DynamicBuffer::try_with_capacity(self.config.initial_capacity)?;
        self.encode_into(schema, instance, &mut buf)?;
        Ok(buf)
    }

    /// Encode `instance` after whatever `buf` already holds.
    pub fn encode_into(
        &self,
        schema: &Schema,
        instance: &dyn FieldSource,
        buf: &mut DynamicBuffer,
    ) -> Result<(), EncodeError> {
        let start = buf.position();
        self.encode_fields(schema.fields(), instance, buf)?;
        log::trace!("encoder: '{}' -> {} bytes", schema.shape(), buf.position() - start);
        Ok(())
    }

    /// Encode against a bare descriptor sequence.
    pub fn encode_fields(
        &self,
        fields: &[FieldDescriptor],
        instance: &dyn FieldSource,
        buf: &mut DynamicBuffer,
    ) -> Result<(), EncodeError> {
        for field in fields {
            match instance.field(field.name()) {
                Some(value) => self.encode_field(field, value, buf)?,
                None if field.is_required()
                    && self.config.missing_required == MissingFieldPolicy::Reject =>
                {
                    return Err(EncodeError::MissingRequired { field: field.name().to_string() });
                }
                None => {}
            }
        }
        Ok(())
    }

    /// Encode and return only the written bytes.
    pub fn encode_to_vec(
        &self,
        schema: &Schema,
        instance: &dyn FieldSource,
    ) -> Result<Vec<u8>, EncodeError> {
        Ok(self.encode(schema, instance)?.into_vec())
    }

    /// Look up (or register) the schema of `T` in `registry`, then encode.
    pub fn encode_shape<T>(
        &self,
        registry: &SchemaRegistry,
        instance: &T,
    ) -> Result<DynamicBuffer, Error>
    where
        T: ProtoShape + FieldSource,
    {
        let schema = registry.schema_of::<T>()?;
        Ok(self.encode(&schema, instance)?)
    }

    fn encode_field(
        &self,
        field: &FieldDescriptor,
        value: FieldValue<'_>,
        buf: &mut DynamicBuffer,
    ) -> Result<(), EncodeError> {
        match (field.is_packed(), field.is_repeated(), value) {
            (true, _, FieldValue::List(items)) => self.encode_packed(field, &items, buf),
            (true, _, single) => self.encode_packed(field, &[single], buf),
            (false, true, FieldValue::List(items)) => {
                for item in items {
                    self.encode_tagged(field, item, buf)?;
                }
                Ok(())
            }
            (false, false, FieldValue::List(_)) => Err(mismatch(field)),
            (false, _, single) => self.encode_tagged(field, single, buf),
        }
    }

    fn encode_tagged(
        &self,
        field: &FieldDescriptor,
        value: FieldValue<'_>,
        buf: &mut DynamicBuffer,
    ) -> Result<(), EncodeError> {
        write_varint32(buf, field.tag())?;
        self.write_payload(field, value, buf)
    }

    fn encode_packed(
        &self,
        field: &FieldDescriptor,
        items: &[FieldValue<'_>],
        buf: &mut DynamicBuffer,
    ) -> Result<(), EncodeError> {
        if items.is_empty() {
            return Ok(());
        }
        let mut scratch = DynamicBuffer::try_with_capacity(SCRATCH_CAPACITY)?;
        for item in items {
            self.write_payload(field, item.clone(), &mut scratch)?;
        }
        write_varint32(buf, field.tag())?;
        write_length_delimited(buf, scratch.as_slice())
    }

    fn write_payload(
        &self,
        field: &FieldDescriptor,
        value: FieldValue<'_>,
        buf: &mut DynamicBuffer,
    ) -> Result<(), EncodeError> {
        match field.category() {
            WireCategory::Int32 | WireCategory::Int64 | WireCategory::Enum => {
                write_int_varint(buf, as_i64(field, &value)?)?;
            }
            WireCategory::UInt32 | WireCategory::UInt64 => {
                write_uint_varint(buf, as_u64(field, &value)?)?;
            }
            WireCategory::SInt32 | WireCategory::SInt64 => {
                write_sint_varint(buf, as_i64(field, &value)?)?;
            }
            WireCategory::Bool => buf.write_u8(u8::from(as_bool(field, &value)?))?,
            WireCategory::Fixed64 | WireCategory::SFixed64 => {
                let bits = as_u64(field, &value)?;
                buf.write_u32_le(bits as u32)?;
                buf.write_u32_le((bits >> 32) as u32)?;
            }
            WireCategory::Double => buf.write_f64_le(as_f64(field, &value)?)?,
            WireCategory::Fixed32 => buf.write_u32_le(as_u64(field, &value)? as u32)?,
            WireCategory::SFixed32 => buf.write_i32_le(as_i64(field, &value)? as i32)?,
            WireCategory::Float => buf.write_f32_le(as_f64(field, &value)? as f32)?,
            WireCategory::String => match value {
                FieldValue::Str(s) => {
                    write_uint_varint(buf, s.len() as u64)?;
                    buf.write_str(s)?;
                }
                _ => return Err(mismatch(field)),
            },
            WireCategory::Bytes => match value {
                FieldValue::Bytes(bytes) => write_length_delimited(buf, bytes)?,
                FieldValue::Str(s) => write_length_delimited(buf, s.as_bytes())?,
                _ => return Err(mismatch(field)),
            },
            WireCategory::Message => match value {
                FieldValue::Message(schema, source) => {
                    let mut scratch = DynamicBuffer::try_with_capacity(SCRATCH_CAPACITY)?;
                    self.encode_fields(schema.fields(), source, &mut scratch)?;
                    write_length_delimited(buf, scratch.as_slice())?;
                }
                _ => return Err(mismatch(field)),
            },
        }
        Ok(())
    }
}

fn write_length_delimited(buf: &mut DynamicBuffer, payload: &[u8]) -> Result<(), EncodeError> {
    write_uint_varint(buf, payload.len() as u64)?;
    buf.write_bytes(payload)?;
    Ok(())
}

fn mismatch(field: &FieldDescriptor) -> EncodeError {
    EncodeError::TypeMismatch { field: field.name().to_string(), category: field.category() }
}

// Numeric values convert like dynamically typed numbers: floats truncate
// toward zero, signed and unsigned reinterpret as two's complement.

fn as_i64(field: &FieldDescriptor, value: &FieldValue<'_>) -> Result<i64, EncodeError> {
    match *value {
        FieldValue::Signed(v) => Ok(v),
        FieldValue::Unsigned(v) => Ok(v as i64),
        FieldValue::Bool(v) => Ok(i64::from(v)),
        FieldValue::Float(v) => Ok(v as i64),
        FieldValue::Double(v) => Ok(v as i64),
        _ => Err(mismatch(field)),
    }
}

fn as_u64(field: &FieldDescriptor, value: &FieldValue<'_>) -> Result<u64, EncodeError> {
    match *value {
        FieldValue::Unsigned(v) => Ok(v),
        _ => as_i64(field, value).map(|v| v as u64),
    }
}

fn as_f64(field: &FieldDescriptor, value: &FieldValue<'_>) -> Result<f64, EncodeError> {
    match *value {
        FieldValue::Double(v) => Ok(v),
        FieldValue::Float(v) => Ok(f64::from(v)),
        FieldValue::Signed(v) => Ok(v as f64),
        FieldValue::Unsigned(v) => Ok(v as f64),
        _ => Err(mismatch(field)),
    }
}

fn as_bool(field: &FieldDescriptor, value: &FieldValue<'_>) -> Result<bool, EncodeError> {
    match *value {
        FieldValue::Bool(v) => Ok(v),
        FieldValue::Signed(v) => Ok(v != 0),
        FieldValue::Unsigned(v) => Ok(v != 0),
        _ => Err(mismatch(field)),
    }
}
