use criterion::{Criterion, black_box, criterion_group, criterion_main};

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

use kardex_catalog::{CatalogStore, InMemoryCatalog, ProductVariant, Warehouse};
use kardex_core::TenantId;
use kardex_engine::{
    EntryLine, EntryRequest, ExitLine, ExitRequest, InMemoryInventoryStore, LedgerEngine, LotSpec,
};

struct Bench {
    engine: LedgerEngine<InMemoryCatalog, InMemoryInventoryStore>,
    tenant: TenantId,
    warehouse: kardex_core::WarehouseId,
    variant: kardex_core::VariantId,
}

fn setup() -> Bench {
    let catalog = InMemoryCatalog::new();
    let tenant = TenantId::new();
    let warehouse = Warehouse::new(tenant, "Central", "CEN").unwrap();
    let variant = ProductVariant::new(tenant, "Beans", "Beans 1kg", "BEAN-1", false).unwrap();
    catalog.insert_warehouse(warehouse.clone()).unwrap();
    catalog.insert_variant(variant.clone()).unwrap();

    Bench {
        engine: LedgerEngine::new(catalog, InMemoryInventoryStore::new()),
        tenant,
        warehouse: warehouse.id,
        variant: variant.id,
    }
}

fn entry_request(b: &Bench, quantity: i64, lot_code: Option<String>) -> EntryRequest {
    let lot = match lot_code {
        Some(code) => LotSpec::New {
            code,
            expiry: chrono::NaiveDate::from_ymd_opt(2027, 1, 1),
        },
        None => LotSpec::None,
    };
    EntryRequest {
        warehouse_id: b.warehouse,
        reference: "PO".to_string(),
        occurred_at: Utc.timestamp_opt(1_750_000_000, 0).unwrap(),
        recorded_by: None,
        lines: vec![EntryLine {
            variant_id: b.variant,
            lot,
            quantity,
            unit_cost: dec!(7.25),
        }],
    }
}

fn bench_entry_recording(c: &mut Criterion) {
    let mut group = c.benchmark_group("entry_recording");
    group.sample_size(400);

    // Growing kardex history on a single bucket key.
    group.bench_function("single_bucket_wac_update", |b| {
        let bench = setup();
        b.iter(|| {
            bench
                .engine
                .record_entry(bench.tenant, black_box(entry_request(&bench, 10, None)))
                .unwrap();
        });
    });

    group.finish();
}

fn bench_exit_fifo(c: &mut Criterion) {
    let mut group = c.benchmark_group("exit_fifo");
    group.sample_size(200);

    // Exits fanning out over many dated lots.
    group.bench_function("drain_across_32_lots", |b| {
        let bench = setup();
        for i in 0..32u32 {
            bench
                .engine
                .record_entry(
                    bench.tenant,
                    entry_request(&bench, 1_000_000, Some(format!("LOT-{i:03}"))),
                )
                .unwrap();
        }
        b.iter(|| {
            bench
                .engine
                .record_exit(
                    bench.tenant,
                    black_box(ExitRequest {
                        warehouse_id: bench.warehouse,
                        reference: "INV".to_string(),
                        occurred_at: Utc.timestamp_opt(1_750_000_100, 0).unwrap(),
                        recorded_by: None,
                        lines: vec![ExitLine {
                            variant_id: bench.variant,
                            lot_id: None,
                            quantity: 16,
                            sale_price: dec!(12.00),
                        }],
                    }),
                )
                .unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_entry_recording, bench_exit_fifo);
criterion_main!(benches);
