// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod repository;

pub use repository::{LiveVehicles, VehicleRepository};

use anyhow::{Context, Result, anyhow, bail};
use garage_app::{ELECTRIC_FUEL, NewVehicle, Vehicle, VehicleId};
use rusqlite::{Connection, params};
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const APP_NAME: &str = "garage";
pub const SCHEMA_VERSION: i64 = 2;

const VEHICLE_COLUMNS: &[&str] = &[
    "id",
    "model",
    "brand",
    "number",
    "fuel",
    "year",
    "owner_name",
    "purchase_timestamp",
];

const COUNT_ALL_SQL: &str = "SELECT COUNT(*) FROM vehicles";
const COUNT_BY_FUEL_SQL: &str = "SELECT COUNT(*) FROM vehicles WHERE fuel = ?";

const SCHEMA_SQL: &str = "
CREATE TABLE vehicles (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  model TEXT NOT NULL,
  brand TEXT NOT NULL,
  number TEXT NOT NULL,
  fuel TEXT NOT NULL,
  year TEXT NOT NULL,
  owner_name TEXT NOT NULL,
  purchase_timestamp INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_vehicles_fuel ON vehicles (fuel);
";

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let printable = path.to_string_lossy().to_string();
        validate_db_path(&printable)?;
        let conn = Connection::open(path)
            .with_context(|| format!("open database at {}", path.display()))?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory database")?;
        configure_connection(&conn)?;
        Ok(Self { conn })
    }

    pub fn raw_connection(&self) -> &Connection {
        &self.conn
    }

    /// Creates the schema, or recreates it when the stored one is stale.
    /// Upgrades discard existing rows.
    pub fn bootstrap(&self) -> Result<()> {
        if table_exists(&self.conn, "vehicles")? {
            let version = user_version(&self.conn)?;
            let missing = missing_columns(&self.conn, "vehicles", VEHICLE_COLUMNS)?;
            if version == SCHEMA_VERSION && missing.is_empty() {
                return Ok(());
            }
            warn!(
                found_version = version,
                expected_version = SCHEMA_VERSION,
                missing_columns = %missing.join(", "),
                "vehicle schema is stale; discarding existing rows"
            );
            self.conn
                .execute_batch("DROP INDEX IF EXISTS idx_vehicles_fuel; DROP TABLE vehicles;")
                .context("drop stale vehicles table")?;
        }

        self.conn
            .execute_batch(SCHEMA_SQL)
            .context("create schema")?;
        self.conn
            .pragma_update(None, "user_version", SCHEMA_VERSION)
            .context("record schema version")?;
        info!(version = SCHEMA_VERSION, "created vehicle schema");
        Ok(())
    }

    pub fn insert_vehicle(&self, vehicle: &NewVehicle) -> Result<VehicleId> {
        self.conn
            .execute(
                "
                INSERT OR REPLACE INTO vehicles (
                  model, brand, number, fuel, year, owner_name, purchase_timestamp
                ) VALUES (?, ?, ?, ?, ?, ?, ?)
                ",
                params![
                    vehicle.model,
                    vehicle.brand,
                    vehicle.number,
                    vehicle.fuel,
                    vehicle.year,
                    vehicle.owner_name,
                    vehicle.purchase_timestamp,
                ],
            )
            .context("insert vehicle")?;

        let id = VehicleId::new(self.conn.last_insert_rowid());
        debug!(id = id.get(), brand = %vehicle.brand, fuel = %vehicle.fuel, "inserted vehicle");
        Ok(id)
    }

    /// Writes a vehicle under its existing id, replacing any row with that id.
    pub fn replace_vehicle(&self, vehicle: &Vehicle) -> Result<()> {
        if vehicle.id.get() <= 0 {
            bail!(
                "vehicle id must be positive to replace a row, got {}",
                vehicle.id.get()
            );
        }
        self.conn
            .execute(
                "
                INSERT OR REPLACE INTO vehicles (
                  id, model, brand, number, fuel, year, owner_name, purchase_timestamp
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ",
                params![
                    vehicle.id.get(),
                    vehicle.model,
                    vehicle.brand,
                    vehicle.number,
                    vehicle.fuel,
                    vehicle.year,
                    vehicle.owner_name,
                    vehicle.purchase_timestamp,
                ],
            )
            .with_context(|| format!("replace vehicle {}", vehicle.id))?;
        Ok(())
    }

    /// All vehicles, newest insertion first.
    pub fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
        list_vehicles(&self.conn)
    }

    pub fn vehicle_count(&self) -> Result<usize> {
        count_rows(&self.conn, COUNT_ALL_SQL, None).context("count vehicles")
    }

    pub fn electric_count(&self) -> Result<usize> {
        count_rows(
            &self.conn,
            COUNT_BY_FUEL_SQL,
            Some(ELECTRIC_FUEL),
        )
        .context("count electric vehicles")
    }

    /// Reads the list and both counts inside one transaction so they agree.
    pub fn snapshot(&self) -> Result<LiveVehicles> {
        let tx = self
            .conn
            .unchecked_transaction()
            .context("begin snapshot transaction")?;
        let snapshot = LiveVehicles {
            vehicles: list_vehicles(&tx)?,
            total: count_rows(&tx, COUNT_ALL_SQL, None)
                .context("count vehicles")?,
            electric: count_rows(
                &tx,
                COUNT_BY_FUEL_SQL,
                Some(ELECTRIC_FUEL),
            )
            .context("count electric vehicles")?,
        };
        tx.commit().context("end snapshot transaction")?;
        Ok(snapshot)
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("GARAGE_DB_PATH") {
        return Ok(PathBuf::from(override_path));
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set GARAGE_DB_PATH to a writable database path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join("garage.db"))
}

pub fn validate_db_path(path: &str) -> Result<()> {
    if path.is_empty() {
        bail!("database path must not be empty");
    }
    if path == ":memory:" {
        return Ok(());
    }

    if let Some(index) = path.find("://")
        && index > 0
    {
        let scheme = &path[..index];
        if scheme.chars().all(char::is_alphabetic) {
            bail!(
                "database path {path:?} looks like a URI ({scheme}://); pass a filesystem path instead"
            );
        }
    }

    if path.starts_with("file:") {
        bail!("database path {path:?} uses file: URI syntax; pass a plain filesystem path");
    }

    if path.contains('?') {
        bail!(
            "database path {path:?} contains '?'; remove query parameters and use a plain file path"
        );
    }

    Ok(())
}

fn list_vehicles(conn: &Connection) -> Result<Vec<Vehicle>> {
    let mut stmt = conn
        .prepare(
            "
            SELECT
              id, model, brand, number, fuel, year, owner_name, purchase_timestamp
            FROM vehicles
            ORDER BY id DESC
            ",
        )
        .context("prepare vehicles query")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Vehicle {
                id: VehicleId::new(row.get(0)?),
                model: row.get(1)?,
                brand: row.get(2)?,
                number: row.get(3)?,
                fuel: row.get(4)?,
                year: row.get(5)?,
                owner_name: row.get(6)?,
                purchase_timestamp: row.get(7)?,
            })
        })
        .context("query vehicles")?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .context("collect vehicles")
}

fn count_rows(conn: &Connection, sql: &str, arg: Option<&str>) -> Result<usize> {
    let value: i64 = match arg {
        Some(arg) => conn.query_row(sql, params![arg], |row| row.get(0))?,
        None => conn.query_row(sql, [], |row| row.get(0))?,
    };
    usize::try_from(value).context("convert row count")
}

fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists = conn
        .query_row(
            "
            SELECT EXISTS(
              SELECT 1
              FROM sqlite_master
              WHERE type = 'table' AND name = ?
            )
            ",
            params![table],
            |row| row.get::<_, i64>(0),
        )
        .with_context(|| format!("check table existence for {table}"))?;
    Ok(exists == 1)
}

fn missing_columns(conn: &Connection, table: &str, required: &[&str]) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({table})"))
        .with_context(|| format!("inspect columns for {table}"))?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .with_context(|| format!("query column info for {table}"))?;
    let present = rows
        .collect::<rusqlite::Result<BTreeSet<_>>>()
        .with_context(|| format!("collect columns for {table}"))?;

    Ok(required
        .iter()
        .filter(|column| !present.contains(**column))
        .map(|column| (*column).to_owned())
        .collect())
}

fn user_version(conn: &Connection) -> Result<i64> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .context("read schema version")
}

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )
    .context("configure sqlite pragmas")
}
