use serde::{Deserialize, Serialize};

use crate::buffer::DEFAULT_CAPACITY;

/// What to do when a required field has no value.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissingFieldPolicy {
    /// Skip the field, exactly like an absent optional field.
    #[default]
    Omit,
    /// Abort the encode call with `EncodeError::MissingRequired`.
    Reject,
}

/// Encoder settings.
///
/// ```toml
/// missing_required = "reject"
/// initial_capacity = 256
/// ```
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EncoderConfig {
    pub missing_required: MissingFieldPolicy,
    /// Capacity of buffers the encoder allocates itself.
    pub initial_capacity: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self { missing_required: MissingFieldPolicy::Omit, initial_capacity: DEFAULT_CAPACITY }
    }
}

impl EncoderConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    pub fn with_missing_required(mut self, policy: MissingFieldPolicy) -> Self {
        self.missing_required = policy;
        self
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}
