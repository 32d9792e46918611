use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use shipkit_core::{InventoryUnitId, OrderId, ShipmentId, VariantId};
use shipkit_infra::{
    InMemoryAddressBook, InMemoryChargeStore, InMemoryInventoryStore, InMemoryOrder,
    InMemoryShipmentStore, ShipmentService,
};
use shipkit_shipping::manifest;
use shipkit_shipping::number;
use shipkit_shipping::{InventoryUnit, Shipment, ShipmentTransition, ShippingSettings};
use std::sync::Arc;

/// `units` inventory units spread across `variants` variants.
fn units(units: usize, variants: usize) -> Vec<InventoryUnit> {
    let order = OrderId::new();
    let shipment = ShipmentId::new();
    let variant_ids: Vec<VariantId> = (0..variants).map(|_| VariantId::new()).collect();
    (0..units)
        .map(|i| InventoryUnit {
            id: InventoryUnitId::new(),
            order_id: order,
            variant_id: variant_ids[i % variants],
            shipment_id: Some(shipment),
        })
        .collect()
}

fn bench_manifest_grouping(c: &mut Criterion) {
    let mut group = c.benchmark_group("manifest_grouping");

    for size in [10, 100, 1000].iter() {
        let allocated = units(*size, 8);
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("units", size), &allocated, |b, allocated| {
            b.iter(|| black_box(manifest::manifest(black_box(allocated))));
        });
    }

    group.finish();
}

fn bench_number_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("number_generation");
    let settings = ShippingSettings::default();

    // Each iteration claims a fresh number, so the registry keeps growing.
    group.bench_function("claim_into_registry", |b| {
        let registry = InMemoryShipmentStore::new();
        let mut rng = StdRng::seed_from_u64(7);
        b.iter(|| {
            number::generate(&mut rng, &registry, ShipmentId::new(), &settings).unwrap();
        });
    });

    group.bench_function("candidate_only", |b| {
        let mut rng = StdRng::seed_from_u64(7);
        b.iter(|| black_box(number::candidate(&mut rng, &settings)));
    });

    group.finish();
}

fn bench_create_and_ship(c: &mut Criterion) {
    let mut group = c.benchmark_group("shipment_lifecycle");

    group.bench_function("create_then_ship", |b| {
        let shipments = Arc::new(InMemoryShipmentStore::new());
        let charges = Arc::new(InMemoryChargeStore::new());
        let service = ShipmentService::new(
            shipments.clone(),
            charges.clone(),
            Arc::new(InMemoryInventoryStore::new()),
            Arc::new(InMemoryAddressBook::new()),
            ShippingSettings::default(),
        );

        b.iter(|| {
            let mut order = InMemoryOrder::new(OrderId::new(), shipments.clone(), charges.clone());
            order.complete_checkout(0);
            let shipment = Shipment::new(ShipmentId::new(), order_id(&order))
                .with_inventory_units(units(3, 2));
            let mut created = service.create(shipment, &mut order, Utc::now()).unwrap();
            service
                .fire(&mut created, ShipmentTransition::Ship, &mut order, Utc::now())
                .unwrap();
            black_box(created);
        });
    });

    group.finish();
}

fn order_id(order: &InMemoryOrder) -> OrderId {
    use shipkit_shipping::Order;
    order.id()
}

criterion_group!(
    benches,
    bench_manifest_grouping,
    bench_number_generation,
    bench_create_and_ship
);
criterion_main!(benches);
