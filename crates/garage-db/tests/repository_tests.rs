// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use garage_app::ELECTRIC_FUEL;
use garage_db::{Store, VehicleRepository};
use garage_testkit::{VehicleFaker, sample_vehicle};

fn repository() -> Result<VehicleRepository> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    VehicleRepository::new(store)
}

#[tokio::test]
async fn live_views_start_from_existing_rows() -> Result<()> {
    let store = Store::open_memory()?;
    store.bootstrap()?;
    store.insert_vehicle(&sample_vehicle("Tata", ELECTRIC_FUEL))?;
    store.insert_vehicle(&sample_vehicle("Hero", "Petrol"))?;

    let repository = VehicleRepository::new(store)?;
    assert_eq!(repository.observe_all().borrow().len(), 2);
    assert_eq!(*repository.observe_count().borrow(), 2);
    assert_eq!(*repository.observe_electric_count().borrow(), 1);
    Ok(())
}

#[tokio::test]
async fn observers_see_inserts_without_resubscribing() -> Result<()> {
    let repository = repository()?;
    let mut all = repository.observe_all();
    let mut count = repository.observe_count();
    let mut electric = repository.observe_electric_count();

    let first = repository
        .insert(sample_vehicle("Honda", "Petrol"))
        .await?;
    all.changed().await?;
    count.changed().await?;
    assert_eq!(all.borrow_and_update()[0].id, first);
    assert_eq!(*count.borrow_and_update(), 1);
    assert!(!electric.has_changed()?);

    let second = repository
        .insert(sample_vehicle("Tata", ELECTRIC_FUEL))
        .await?;
    all.changed().await?;
    electric.changed().await?;
    let ids: Vec<_> = all.borrow_and_update().iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![second, first]);
    assert_eq!(*count.borrow_and_update(), 2);
    assert_eq!(*electric.borrow_and_update(), 1);
    Ok(())
}

#[tokio::test]
async fn inserting_n_vehicles_counts_n() -> Result<()> {
    let repository = repository()?;
    let mut faker = VehicleFaker::new(21);
    let fleet = faker.fleet(12);
    let expected_electric = fleet.iter().filter(|v| v.fuel == ELECTRIC_FUEL).count();

    for vehicle in fleet {
        repository.insert(vehicle).await?;
    }

    assert_eq!(*repository.observe_count().borrow(), 12);
    assert_eq!(*repository.observe_electric_count().borrow(), expected_electric);
    assert_eq!(repository.read(|store| store.vehicle_count())?, 12);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_inserts_are_all_applied() -> Result<()> {
    let repository = repository()?;
    let mut handles = Vec::new();
    for seed in 0..16_u64 {
        let repository = repository.clone();
        handles.push(tokio::spawn(async move {
            let vehicle = VehicleFaker::new(seed + 100).vehicle();
            repository.insert(vehicle).await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await??);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 16);

    let all = repository.observe_all();
    let vehicles = all.borrow();
    assert_eq!(vehicles.len(), 16);
    assert!(vehicles.windows(2).all(|pair| pair[0].id > pair[1].id));
    Ok(())
}

#[tokio::test]
async fn observe_all_matches_store_order() -> Result<()> {
    let repository = repository()?;
    repository.insert(sample_vehicle("Suzuki", "Petrol")).await?;
    repository.insert(sample_vehicle("Yamaha", "Petrol")).await?;

    let live = repository.observe_all().borrow().clone();
    let stored = repository.read(|store| store.list_vehicles())?;
    assert_eq!(live, stored);
    assert_eq!(live[0].brand, "Yamaha");
    Ok(())
}
