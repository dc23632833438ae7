use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use entity_registry::{EntityRegistry, EntityType, InMemoryRecordStore, RegistryConfig};

const FIRST: [&str; 8] = ["Sarah", "Lisa", "David", "Maria", "James", "Aiko", "Omar", "Priya"];
const LAST: [&str; 8] = ["Chen", "Chang", "Park", "Garcia", "Smith", "Tanaka", "Haddad", "Rao"];

fn make_registry(records: usize) -> EntityRegistry<InMemoryRecordStore> {
    let store = InMemoryRecordStore::new();
    for i in 0..records {
        let name = format!("{} {} {i}", FIRST[i % FIRST.len()], LAST[(i / FIRST.len()) % LAST.len()]);
        store
            .insert(
                format!("/vault/people/{name}.md"),
                format!("---\naliases:\n  - {} alias {i}\n---\n", FIRST[i % FIRST.len()]),
            )
            .unwrap();
    }
    let registry = EntityRegistry::new(RegistryConfig::new("/vault"), store).unwrap();
    registry.scan();
    registry
}

fn bench_lookup_tiers(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution/find");
    group.throughput(Throughput::Elements(1));

    for records in [100usize, 1_000] {
        let registry = make_registry(records);

        group.bench_with_input(BenchmarkId::new("exact", records), &registry, |b, r| {
            b.iter(|| r.find(black_box("Dr. Sarah Chen 0"), Some(EntityType::Person)));
        });
        group.bench_with_input(BenchmarkId::new("variant", records), &registry, |b, r| {
            b.iter(|| r.find(black_box("Sarah Q. Chen 0"), Some(EntityType::Person)));
        });
        group.bench_with_input(BenchmarkId::new("fuzzy_miss", records), &registry, |b, r| {
            b.iter(|| r.find(black_box("Unknown Person Entirely"), Some(EntityType::Person)));
        });
    }

    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let registry = make_registry(1_000);
    c.bench_function("resolution/scan_1000", |b| {
        b.iter(|| black_box(registry.scan()));
    });
}

criterion_group!(resolution, bench_lookup_tiers, bench_scan);
criterion_main!(resolution);
