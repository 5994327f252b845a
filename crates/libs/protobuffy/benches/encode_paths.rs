use criterion::{black_box, criterion_group, criterion_main, Criterion};
use protobuffy::{
    DynamicBuffer, FieldSpec, Record, Schema, SchemaBuilder, Value, WireCategory, WireEncoder,
};

fn sample_schema() -> Schema {
    SchemaBuilder::new("Test")
        .field(FieldSpec::new("a", 1, WireCategory::Int32))
        .field(FieldSpec::new("b", 2, WireCategory::String))
        .field(FieldSpec::new("c", 3, WireCategory::String).optional())
        .field(FieldSpec::new("d", 4, WireCategory::SInt64).packed())
        .build()
        .expect("sample schema must build")
}

fn sample_record() -> Record {
    Record::new()
        .with("a", 300)
        .with("b", "hello")
        .with("c", "world")
        .with("d", Value::List((-64i64..64).map(Value::from).collect()))
}

fn bench_encode_fresh_buffer(c: &mut Criterion) {
    let schema = sample_schema();
    let record = sample_record();
    let encoder = WireEncoder::default();
    c.bench_function("protobuffy/encode_fresh_buffer", |b| {
        b.iter(|| {
            let bytes = encoder.encode(black_box(&schema), black_box(&record)).expect("encode");
            black_box(bytes);
        });
    });
}

fn bench_encode_reused_buffer(c: &mut Criterion) {
    let schema = sample_schema();
    let record = sample_record();
    let encoder = WireEncoder::default();
    let mut buf = DynamicBuffer::new();
    c.bench_function("protobuffy/encode_reused_buffer", |b| {
        b.iter(|| {
            buf.reset();
            encoder.encode_into(black_box(&schema), black_box(&record), &mut buf).expect("encode");
            black_box(buf.position());
        });
    });
}

criterion_group!(benches, bench_encode_fresh_buffer, bench_encode_reused_buffer);
criterion_main!(benches);
