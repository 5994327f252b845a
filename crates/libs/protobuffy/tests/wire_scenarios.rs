use std::sync::Arc;

use protobuffy::{
    DynamicBuffer, EncodeError, Error, FieldSource, FieldSpec, FieldValue, ProtoShape, Record,
    SchemaBuilder, SchemaError, SchemaRegistry, Value, WireCategory, WireEncoder,
};

const FULL: [u8; 17] = [
    0x08, 0xAC, 0x02, // a = 300
    0x12, 0x05, b'h', b'e', b'l', b'l', b'o', // b = "hello"
    0x1A, 0x05, b'w', b'o', b'r', b'l', b'd', // c = "world"
];

struct Test {
    a: i32,
    b: String,
    c: Option<String>,
}

impl Test {
    fn new() -> Self {
        Self { a: 300, b: "hello".into(), c: Some("world".into()) }
    }
}

impl ProtoShape for Test {
    const SHAPE: &'static str = "wire_scenarios::Test";

    fn declare_fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("a", 1, WireCategory::Int32),
            FieldSpec::new("b", 2, WireCategory::String),
            FieldSpec::new("c", 3, WireCategory::String).optional(),
        ]
    }
}

impl FieldSource for Test {
    fn field(&self, name: &str) -> Option<FieldValue<'_>> {
        match name {
            "a" => Some(self.a.into()),
            "b" => Some((&self.b).into()),
            "c" => self.c.as_ref().map(Into::into),
            _ => None,
        }
    }
}

#[test]
fn typed_instance_encodes_known_bytes() {
    let registry = SchemaRegistry::new();
    let bytes = WireEncoder::default().encode_shape(&registry, &Test::new()).expect("encode");
    assert_eq!(bytes.as_slice(), FULL);
}

#[test]
fn null_optional_field_drops_only_its_segment() {
    let registry = SchemaRegistry::new();
    let encoder = WireEncoder::default();
    let full = encoder.encode_shape(&registry, &Test::new()).expect("encode full");
    let mut partial = Test::new();
    partial.c = None;
    let partial = encoder.encode_shape(&registry, &partial).expect("encode partial");
    assert_eq!(partial.as_slice(), &full.as_slice()[..10]);
}

#[test]
fn record_instance_matches_typed_instance() {
    let registry = SchemaRegistry::new();
    let schema = registry.schema_of::<Test>().expect("register");
    let record = Record::new().with("a", 300).with("b", "hello").with("c", "world");
    let bytes = WireEncoder::default().encode_to_vec(&schema, &record).expect("encode");
    assert_eq!(bytes, FULL);
}

#[test]
fn absent_middle_field_keeps_later_tags() {
    let registry = SchemaRegistry::new();
    let schema = registry.schema_of::<Test>().expect("register");
    let record = Record::new().with("a", 300).with("b", Value::Null).with("c", "world");
    let bytes = WireEncoder::default().encode_to_vec(&schema, &record).expect("encode");
    assert_eq!(bytes, [&FULL[..3], &FULL[10..]].concat());
}

#[test]
fn repeated_encodes_reuse_the_cached_schema() {
    let registry = SchemaRegistry::new();
    let encoder = WireEncoder::default();
    for _ in 0..1000 {
        let bytes = encoder.encode_shape(&registry, &Test::new()).expect("encode");
        assert_eq!(bytes.as_slice(), FULL);
    }
    assert_eq!(registry.len(), 1);
}

#[test]
fn caller_supplied_buffer_is_grown_and_returned() {
    let registry = SchemaRegistry::new();
    let schema = registry.schema_of::<Test>().expect("register");
    let mut buf = DynamicBuffer::from_storage(vec![0u8; 4]);
    WireEncoder::default().encode_into(&schema, &Test::new(), &mut buf).expect("encode");
    assert_eq!(buf.capacity(), 32);
    assert_eq!(buf.into_vec(), FULL);
}

#[test]
fn nested_messages_from_toml_schemas() {
    let registry = SchemaRegistry::new();
    registry
        .register_toml(
            r#"
            [[schema]]
            name = "Point"

            [[schema.field]]
            name = "x"
            number = 1
            type = "sint32"

            [[schema.field]]
            name = "y"
            number = 2
            type = "sint32"

            [[schema]]
            name = "Path"

            [[schema.field]]
            name = "label"
            number = 1
            type = "string"
            optional = true

            [[schema.field]]
            name = "points"
            number = 2
            type = "message"
            repeated = true

            [[schema.field]]
            name = "weights"
            number = 3
            type = "float"
            repeated = true
            packed = true
            "#,
        )
        .expect("register toml");

    let point = registry.get("Point").expect("point schema");
    let path = registry.get("Path").expect("path schema");
    let at = |x: i32, y: i32| {
        Value::message(Arc::clone(&point), Record::new().with("x", x).with("y", y))
    };
    let record = Record::new()
        .with("points", Value::List(vec![at(1, -1), at(0, 64)]))
        .with("weights", Value::List(vec![0.5f32.into()]));

    let bytes = WireEncoder::default().encode_to_vec(&path, &record).expect("encode");
    assert_eq!(
        bytes,
        [
            0x12, 0x04, 0x08, 0x02, 0x10, 0x01, // points[0] = {x: 1, y: -1}
            0x12, 0x05, 0x08, 0x00, 0x10, 0x80, 0x01, // points[1] = {x: 0, y: 64}
            0x1A, 0x04, 0x00, 0x00, 0x00, 0x3F, // weights = [0.5]
        ]
    );
}

#[test]
fn duplicate_field_numbers_fail_registration() {
    struct Clash;

    impl ProtoShape for Clash {
        const SHAPE: &'static str = "wire_scenarios::Clash";

        fn declare_fields() -> Vec<FieldSpec> {
            vec![
                FieldSpec::new("a", 1, WireCategory::Int32),
                FieldSpec::new("b", 1, WireCategory::Int64),
            ]
        }
    }

    impl FieldSource for Clash {
        fn field(&self, _name: &str) -> Option<FieldValue<'_>> {
            None
        }
    }

    let registry = SchemaRegistry::new();
    let err = WireEncoder::default().encode_shape(&registry, &Clash).expect_err("must fail");
    assert!(matches!(err, Error::Schema(SchemaError::RegistrationConflict { number: 1, .. })));
    assert!(registry.is_empty());
}

#[test]
fn unknown_type_name_is_reported() {
    let err = FieldSpec::parse("g", 1, "group").expect_err("groups are unsupported");
    assert_eq!(err.to_string(), "unknown protobuf type: group");
}

#[test]
fn global_registry_serves_typed_shapes() {
    let first = SchemaRegistry::global().schema_of::<Test>().expect("register");
    let again = SchemaRegistry::global()
        .register(SchemaBuilder::new(Test::SHAPE))
        .expect("cached");
    assert!(Arc::ptr_eq(&first, &again));
}

#[test]
fn encode_errors_surface_through_error() {
    let registry = SchemaRegistry::new();
    let schema = registry.schema_of::<Test>().expect("register");
    let record = Record::new().with("a", "not a number");
    assert!(matches!(
        WireEncoder::default().encode(&schema, &record),
        Err(EncodeError::TypeMismatch { category: WireCategory::Int32, .. })
    ));
}
