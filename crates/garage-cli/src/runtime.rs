// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use garage_app::catalog::{self, FILTER_BRANDS, FORM_BRANDS, FUEL_TYPES, MODELS};
use garage_app::{
    FilterCommand, FilterEvent, FilterSelection, HomeUiState, Vehicle, VehicleField, VehicleForm,
    VehicleId, current_year, now_millis,
};
use garage_db::VehicleRepository;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

pub const DEFAULT_SUBSCRIPTION_GRACE: Duration = Duration::from_secs(5);

/// Home screen state: the live vehicle list combined with the filter sheet.
///
/// One pipeline task feeds every subscriber. It starts on the first
/// [`HomeViewModel::ui_state`] call and stops once nobody has been
/// subscribed for the grace period; the last state it produced is kept.
pub struct HomeViewModel {
    repository: VehicleRepository,
    filters: watch::Sender<FilterSelection>,
    shared: Arc<PipelineShared>,
}

struct PipelineShared {
    state: watch::Sender<HomeUiState>,
    task: Mutex<Option<JoinHandle<()>>>,
    grace: Duration,
}

impl HomeViewModel {
    pub fn new(repository: VehicleRepository, grace: Duration) -> Self {
        let (filters, _) = watch::channel(FilterSelection::default());
        let (state, _) = watch::channel(HomeUiState::default());
        Self {
            repository,
            filters,
            shared: Arc::new(PipelineShared {
                state,
                task: Mutex::new(None),
                grace,
            }),
        }
    }

    pub fn brands(&self) -> &'static [&'static str] {
        &FILTER_BRANDS
    }

    pub fn fuel_types(&self) -> &'static [&'static str] {
        &FUEL_TYPES
    }

    /// Subscribes to the presented state. Must be called inside a tokio runtime.
    pub fn ui_state(&self) -> Result<watch::Receiver<HomeUiState>> {
        let handle = Handle::try_current().context("home state needs a running tokio runtime")?;
        let mut task = self.shared.lock_task();
        let receiver = self.shared.state.subscribe();
        if task.as_ref().is_none_or(JoinHandle::is_finished) {
            debug!("starting home state pipeline");
            *task = Some(handle.spawn(run_pipeline(
                Arc::clone(&self.shared),
                self.repository.observe_all(),
                self.repository.observe_count(),
                self.repository.observe_electric_count(),
                self.filters.subscribe(),
            )));
        }
        Ok(receiver)
    }

    /// The presented state for the current inputs, computed directly from the
    /// live values without subscribing.
    pub fn snapshot(&self) -> HomeUiState {
        HomeUiState::derive(
            &self.repository.observe_all().borrow(),
            *self.repository.observe_count().borrow(),
            *self.repository.observe_electric_count().borrow(),
            &self.filters.borrow(),
        )
    }

    pub fn is_running(&self) -> bool {
        self.shared
            .lock_task()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    pub fn filters(&self) -> FilterSelection {
        self.filters.borrow().clone()
    }

    pub fn update_brand_filter(&self, brand: &str, selected: bool) -> Vec<FilterEvent> {
        self.dispatch(FilterCommand::ToggleBrand {
            brand: brand.to_owned(),
            selected,
        })
    }

    pub fn update_fuel_filter(&self, fuel: &str, selected: bool) -> Vec<FilterEvent> {
        self.dispatch(FilterCommand::ToggleFuel {
            fuel: fuel.to_owned(),
            selected,
        })
    }

    pub fn clear_filters(&self) -> Vec<FilterEvent> {
        self.dispatch(FilterCommand::Clear)
    }

    fn dispatch(&self, command: FilterCommand) -> Vec<FilterEvent> {
        let mut events = Vec::new();
        self.filters.send_if_modified(|filters| {
            events = filters.dispatch(command);
            !events.is_empty()
        });
        events
    }
}

impl PipelineShared {
    fn lock_task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        match self.task.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Clears the task slot when nobody is subscribed. Holding the slot lock
    /// here and in `ui_state` keeps a new subscriber from missing a restart.
    fn release_if_unobserved(&self) -> bool {
        let mut task = self.lock_task();
        if self.state.receiver_count() > 0 {
            return false;
        }
        task.take();
        true
    }
}

async fn run_pipeline(
    shared: Arc<PipelineShared>,
    mut vehicles: watch::Receiver<Vec<Vehicle>>,
    mut total: watch::Receiver<usize>,
    mut electric: watch::Receiver<usize>,
    mut filters: watch::Receiver<FilterSelection>,
) {
    // Armed while nobody is subscribed. Inputs keep flowing until it fires.
    let grace_deadline = tokio::time::sleep(shared.grace);
    tokio::pin!(grace_deadline);
    let mut grace_armed = false;
    let mut dirty = true;

    loop {
        if grace_armed && shared.state.receiver_count() > 0 {
            grace_armed = false;
        }
        if dirty {
            let state = HomeUiState::derive(
                &vehicles.borrow_and_update(),
                *total.borrow_and_update(),
                *electric.borrow_and_update(),
                &filters.borrow_and_update(),
            );
            shared.state.send_replace(state);
            dirty = false;
        }

        tokio::select! {
            changed = vehicles.changed() => if changed.is_err() { break } else { dirty = true },
            changed = total.changed() => if changed.is_err() { break } else { dirty = true },
            changed = electric.changed() => if changed.is_err() { break } else { dirty = true },
            changed = filters.changed() => if changed.is_err() { break } else { dirty = true },
            () = shared.state.closed(), if !grace_armed => {
                grace_deadline.as_mut().reset(Instant::now() + shared.grace);
                grace_armed = true;
            }
            () = &mut grace_deadline, if grace_armed => {
                if shared.release_if_unobserved() {
                    debug!("home state pipeline stopped after grace period");
                    return;
                }
                grace_armed = false;
            }
        }
    }
    shared.release_if_unobserved();
    debug!("home state pipeline inputs closed");
}

/// Add-vehicle screen: the form holder plus the choice lists it offers.
pub struct AddVehicleViewModel {
    repository: VehicleRepository,
    form: watch::Sender<VehicleForm>,
}

impl AddVehicleViewModel {
    pub fn new(repository: VehicleRepository) -> Self {
        let (form, _) = watch::channel(VehicleForm::new());
        Self { repository, form }
    }

    pub fn ui_state(&self) -> watch::Receiver<VehicleForm> {
        self.form.subscribe()
    }

    pub fn form(&self) -> VehicleForm {
        self.form.borrow().clone()
    }

    pub fn is_form_valid(&self) -> bool {
        self.form.borrow().is_valid()
    }

    pub fn update(&self, field: VehicleField, value: impl Into<String>) {
        let value = value.into();
        self.form.send_modify(|form| form.update(field, value));
    }

    pub fn brands(&self) -> &'static [&'static str] {
        &FORM_BRANDS
    }

    pub fn fuel_types(&self) -> &'static [&'static str] {
        &FUEL_TYPES
    }

    pub fn models(&self) -> &'static [&'static str] {
        &MODELS
    }

    pub fn years(&self) -> Vec<String> {
        catalog::purchase_years(current_year())
    }

    /// Stamps the current time on the form values, inserts them, and calls
    /// `on_success` once the row is committed.
    pub async fn save(&self, on_success: impl FnOnce(VehicleId)) -> Result<VehicleId> {
        let form = self.form();
        form.validate()?;
        let id = self
            .repository
            .insert(form.to_new_vehicle(now_millis()))
            .await?;
        on_success(id);
        Ok(id)
    }
}
