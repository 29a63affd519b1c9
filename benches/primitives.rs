extern crate avrow;

#[macro_use]
extern crate criterion;

use criterion::Criterion;

use avrow::from_value;
use avrow::DatumReader;
use avrow::DatumWriter;
use avrow::Schema;
use std::str::FromStr;

fn criterion_benchmark(c: &mut Criterion) {
    // Write benchmarks
    c.bench_function("write_null", |b| {
        let schema = Schema::from_str(r##"{"type": "null" }"##).unwrap();
        let writer = DatumWriter::new(&schema);

        b.iter(|| {
            for _ in 0..100_000 {
                writer.write(()).unwrap();
            }
        });
    });

    c.bench_function("write_boolean", |b| {
        let schema = Schema::from_str(r##"{"type": "boolean" }"##).unwrap();
        let writer = DatumWriter::new(&schema);

        b.iter(|| {
            for i in 0..100_000 {
                writer.write(i % 2 == 0).unwrap();
            }
        });
    });

    c.bench_function("write_int", |b| {
        let schema = Schema::from_str(r##"{"type": "int" }"##).unwrap();
        let writer = DatumWriter::new(&schema);

        b.iter(|| {
            for _ in 0..100_000 {
                writer.write(45).unwrap();
            }
        });
    });

    c.bench_function("write_long", |b| {
        let schema = Schema::from_str(r##"{"type": "long" }"##).unwrap();
        let writer = DatumWriter::new(&schema);

        b.iter(|| {
            for _ in 0..100_000 {
                writer.write(45i64).unwrap();
            }
        });
    });

    c.bench_function("write_float", |b| {
        let schema = Schema::from_str(r##"{"type": "float" }"##).unwrap();
        let writer = DatumWriter::new(&schema);

        b.iter(|| {
            for _ in 0..100_000 {
                writer.write(45.0f32).unwrap();
            }
        });
    });

    c.bench_function("write_double", |b| {
        let schema = Schema::from_str(r##"{"type": "double" }"##).unwrap();
        let writer = DatumWriter::new(&schema);

        b.iter(|| {
            for _ in 0..100_000 {
                writer.write(45.0f64).unwrap();
            }
        });
    });

    c.bench_function("write_bytes", |b| {
        let schema = Schema::from_str(r##"{"type": "bytes" }"##).unwrap();
        let writer = DatumWriter::new(&schema);

        b.iter(|| {
            for _ in 0..100_000 {
                let v = vec![0u8, 1, 2, 3];
                writer.write(v).unwrap();
            }
        });
    });

    c.bench_function("write_string", |b| {
        let schema = Schema::from_str(r##"{"type": "string" }"##).unwrap();
        let writer = DatumWriter::new(&schema);

        b.iter(|| {
            for _ in 0..100_000 {
                writer.write("hello").unwrap();
            }
        });
    });

    // Read benchmarks
    c.bench_function("avro_read_bytes_from_vec", |b| {
        let schema = Schema::from_str(r##"{"type": "bytes" }"##).unwrap();
        let writer = DatumWriter::new(&schema);
        let avro_data = writer.write(vec![0u8, 1, 2, 3, 4, 5]).unwrap();
        let reader = DatumReader::new(&schema);

        b.iter(|| {
            for _ in 0..100_000 {
                let value = reader.read(&avro_data).unwrap();
                let _: Vec<u8> = from_value(&value).unwrap();
            }
        });
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
