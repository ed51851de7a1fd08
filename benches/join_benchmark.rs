use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geo::{polygon, MultiPolygon};
use parcel_districts::config::WardSource;
use parcel_districts::lookup::{parse_address, AddressIndex, AddressLookup};
use parcel_districts::models::{AddressRecord, District, Parcel};
use parcel_districts::processors::AddressBuilder;
use parcel_districts::spatial::{DistrictIndex, SpatialJoiner};

fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
    MultiPolygon(vec![polygon![
        (x: x0, y: y0),
        (x: x0 + size, y: y0),
        (x: x0 + size, y: y0 + size),
        (x: x0, y: y0 + size),
        (x: x0, y: y0),
    ]])
}

// A 4x4 grid of districts covering a 10 000 ft square
fn create_districts() -> DistrictIndex {
    let size = 2500.0;
    let districts = (0..16)
        .map(|i| {
            let (col, row) = ((i % 4) as f64, (i / 4) as f64);
            District::new(
                Some((i + 1).to_string()),
                Some(format!("{}", i % 8 + 1)),
                square(col * size, row * size, size),
            )
        })
        .collect();
    DistrictIndex::new(districts)
}

// Small lots on a regular grid, some falling outside the districts
fn create_parcels(count: usize) -> Vec<Parcel> {
    let per_row = (count as f64).sqrt().ceil() as usize;
    let spacing = 11_000.0 / per_row as f64;

    (0..count)
        .map(|i| Parcel {
            street_number: Some((100 + i).to_string()),
            street_name: Some(format!("STREET {} ST", i % 50)),
            ward: None,
            geometry: Some(square(
                (i % per_row) as f64 * spacing,
                (i / per_row) as f64 * spacing,
                spacing * 0.5,
            )),
        })
        .collect()
}

fn bench_spatial_join(c: &mut Criterion) {
    let index = create_districts();
    let mut group = c.benchmark_group("spatial_join");

    for count in [1_000, 10_000, 50_000] {
        let parcels = create_parcels(count);

        for workers in [1, 4] {
            let joiner = SpatialJoiner::new(workers);
            group.bench_with_input(
                BenchmarkId::new(format!("workers_{}", workers), count),
                &parcels,
                |b, parcels| b.iter(|| joiner.join(black_box(parcels), &index, None)),
            );
        }
    }

    group.finish();
}

fn bench_address_building(c: &mut Criterion) {
    let index = create_districts();
    let parcels = create_parcels(10_000);
    let matches = SpatialJoiner::new(4)
        .join(&parcels, &index, None)
        .expect("join failed");
    let builder = AddressBuilder::new(WardSource::District);

    c.bench_function("build_address_records", |b| {
        b.iter(|| builder.build(black_box(&parcels), &matches, &index))
    });
}

fn bench_address_lookup(c: &mut Criterion) {
    let records: Vec<AddressRecord> = (0..20_000)
        .map(|i| {
            AddressRecord::new(
                (100 + i % 400).to_string(),
                format!("STREET {} AVE", i / 400),
                Some((i % 5 + 1).to_string()),
                Some((i % 20 + 1).to_string()),
            )
        })
        .collect();
    let lookup = AddressLookup::new(vec![AddressIndex::from_records(&records)]);
    let exact = parse_address("250 Street 12 Avenue").expect("valid address");
    let fuzzy = parse_address("250 Stret 12 Av").expect("valid address");

    c.bench_function("lookup_exact", |b| b.iter(|| lookup.lookup(black_box(&exact))));
    c.bench_function("lookup_fuzzy", |b| b.iter(|| lookup.lookup(black_box(&fuzzy))));
}

criterion_group!(
    benches,
    bench_spatial_join,
    bench_address_building,
    bench_address_lookup
);
criterion_main!(benches);
