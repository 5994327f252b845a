//! Ordered descriptor sequences and the declarative front ends that build them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::descriptor::{FieldDescriptor, FieldSpec, MAX_FIELD_NUMBER};
use crate::error::SchemaError;

/// The descriptor sequence of one schema shape, in declaration order.
///
/// Declaration order is the wire order. Field numbers are unique and lie in
/// `1..=MAX_FIELD_NUMBER`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    shape: String,
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    pub fn builder(shape: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(shape)
    }

    pub fn shape(&self) -> &str {
        &self.shape
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_by_number(&self, number: u32) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.number == number)
    }
}

/// Collects [`FieldSpec`]s in declaration order and validates them into a
/// [`Schema`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    shape: String,
    specs: Vec<FieldSpec>,
}

impl SchemaBuilder {
    pub fn new(shape: impl Into<String>) -> Self {
        Self { shape: shape.into(), specs: Vec::new() }
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn fields(mut self, specs: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.specs.extend(specs);
        self
    }

    pub fn shape(&self) -> &str {
        &self.shape
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        let mut seen: HashMap<u32, usize> = HashMap::with_capacity(self.specs.len());
        let mut fields = Vec::with_capacity(self.specs.len());

        for spec in self.specs {
            if spec.number == 0 || spec.number > MAX_FIELD_NUMBER {
                return Err(SchemaError::InvalidFieldNumber { field: spec.name, number: spec.number });
            }
            if spec.packed && !spec.repeated {
                return Err(SchemaError::InvalidModifier {
                    field: spec.name,
                    reason: "packed requires repeated",
                });
            }
            if spec.packed && !spec.category.is_packable() {
                return Err(SchemaError::InvalidModifier {
                    field: spec.name,
                    reason: "only scalar categories can be packed",
                });
            }
            if let Some(&index) = seen.get(&spec.number) {
                let first: &FieldDescriptor = &fields[index];
                return Err(SchemaError::RegistrationConflict {
                    shape: self.shape,
                    number: spec.number,
                    first: first.name.clone(),
                    second: spec.name,
                });
            }

            seen.insert(spec.number, fields.len());
            fields.push(FieldDescriptor {
                name: spec.name,
                number: spec.number,
                category: spec.category,
                required: !spec.optional && !spec.repeated,
                repeated: spec.repeated,
                packed: spec.packed,
            });
        }

        Ok(Schema { shape: self.shape, fields })
    }
}

/// A TOML document declaring any number of schemas:
///
/// ```toml
/// [[schema]]
/// name = "Reading"
///
/// [[schema.field]]
/// name = "sensor"
/// number = 1
/// type = "string"
///
/// [[schema.field]]
/// name = "samples"
/// number = 2
/// type = "sint32"
/// packed = true
/// repeated = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    #[serde(rename = "schema", default)]
    pub schemas: Vec<SchemaDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDefinition {
    pub name: String,
    #[serde(rename = "field", default)]
    pub fields: Vec<FieldSpec>,
}

impl SchemaDocument {
    pub fn from_toml_str(source: &str) -> Result<Self, SchemaError> {
        Ok(toml::from_str(source)?)
    }
}

impl SchemaDefinition {
    pub fn into_builder(self) -> SchemaBuilder {
        SchemaBuilder::new(self.name).fields(self.fields)
    }
}
