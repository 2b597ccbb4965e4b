// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use garage_app::{NewVehicle, Vehicle, VehicleId};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tracing::debug;

use crate::Store;

/// The list and both counts, read together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiveVehicles {
    pub vehicles: Vec<Vehicle>,
    pub total: usize,
    pub electric: usize,
}

/// Store access with live views.
///
/// Every committed insert re-reads the list and both counts under the store
/// lock and publishes them, so receivers never see a half-applied write.
#[derive(Clone)]
pub struct VehicleRepository {
    inner: Arc<Inner>,
}

struct Inner {
    store: Mutex<Store>,
    vehicles: watch::Sender<Vec<Vehicle>>,
    total: watch::Sender<usize>,
    electric: watch::Sender<usize>,
}

impl VehicleRepository {
    /// Wraps a bootstrapped store and seeds the live views from its contents.
    pub fn new(store: Store) -> Result<Self> {
        let initial = store.snapshot()?;
        let (vehicles, _) = watch::channel(initial.vehicles);
        let (total, _) = watch::channel(initial.total);
        let (electric, _) = watch::channel(initial.electric);
        Ok(Self {
            inner: Arc::new(Inner {
                store: Mutex::new(store),
                vehicles,
                total,
                electric,
            }),
        })
    }

    /// All vehicles, newest first.
    pub fn observe_all(&self) -> watch::Receiver<Vec<Vehicle>> {
        self.inner.vehicles.subscribe()
    }

    pub fn observe_count(&self) -> watch::Receiver<usize> {
        self.inner.total.subscribe()
    }

    pub fn observe_electric_count(&self) -> watch::Receiver<usize> {
        self.inner.electric.subscribe()
    }

    /// Inserts on the blocking pool and resolves once observers have been
    /// handed the new values.
    pub async fn insert(&self, vehicle: NewVehicle) -> Result<VehicleId> {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.insert_and_publish(&vehicle))
            .await
            .map_err(|error| anyhow!("vehicle insert task failed: {error}"))?
    }

    /// Runs a read against the store while holding the store lock.
    pub fn read<T>(&self, f: impl FnOnce(&Store) -> Result<T>) -> Result<T> {
        let store = self.inner.lock_store()?;
        f(&store)
    }
}

impl Inner {
    fn lock_store(&self) -> Result<MutexGuard<'_, Store>> {
        self.store
            .lock()
            .map_err(|_| anyhow!("vehicle store lock poisoned by an earlier panic"))
    }

    fn insert_and_publish(&self, vehicle: &NewVehicle) -> Result<VehicleId> {
        let store = self.lock_store()?;
        let id = store.insert_vehicle(vehicle)?;
        let snapshot = store.snapshot()?;
        self.publish(snapshot);
        debug!(id = id.get(), "published vehicles after insert");
        Ok(id)
    }

    fn publish(&self, snapshot: LiveVehicles) {
        self.vehicles.send_replace(snapshot.vehicles);
        self.total.send_if_modified(|total| replace_if_changed(total, snapshot.total));
        self.electric
            .send_if_modified(|electric| replace_if_changed(electric, snapshot.electric));
    }
}

fn replace_if_changed(slot: &mut usize, value: usize) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}
