//! PostgreSQL backend.
//!
//! The run is synchronous, so the store owns a current-thread runtime and a
//! single connection and blocks on every statement.

use sqlx::postgres::{PgConnectOptions, PgRow};
use sqlx::query_builder::Separated;
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder, Row, Transaction};
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

use super::{GridStore, StoreTransaction};
use crate::config::DatabaseConfig;
use crate::error::{GridSimError, Result};
use crate::grid::{Generator, GeneratorKind, GridMetadata, PowerLine, Region, Substation};
use crate::records::{RecordSet, TargetTable};

/// Postgres caps bind parameters per statement at `u16::MAX`.
const MAX_BIND_PARAMS: usize = 65_535;

const TRUNCATE_TARGETS: &str = "TRUNCATE TABLE LoadMeasurements, GenerationMeasurements, \
                                Alerts, WeatherReports, EnergyPricing, LineMeasurements CASCADE";

const SELECT_REGIONS: &str = "SELECT region_id FROM Regions ORDER BY region_id";
const SELECT_SUBSTATIONS: &str = "SELECT substation_id, capacity_mw::float8 AS capacity_mw, \
                                  region_id FROM Substations ORDER BY substation_id";
const SELECT_GENERATORS: &str = "SELECT generator_id, generator_type, \
                                 max_output_mw::float8 AS max_output_mw \
                                 FROM Generators ORDER BY generator_id";
const SELECT_LINES: &str =
    "SELECT line_id, max_load_mw::float8 AS max_load_mw FROM PowerLines ORDER BY line_id";

pub struct PgStore {
    runtime: Runtime,
    conn: PgConnection,
}

impl PgStore {
    /// Connects using the environment-supplied settings.
    ///
    /// # Errors
    ///
    /// Returns a connection failure if the runtime cannot start or the
    /// server is unreachable.
    pub fn connect(config: &DatabaseConfig) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| GridSimError::connection("start async runtime", e))?;
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.name)
            .username(&config.user)
            .password(&config.password);
        let conn = runtime
            .block_on(PgConnection::connect_with(&options))
            .map_err(|e| {
                GridSimError::connection(
                    &format!("connect to {}:{}/{}", config.host, config.port, config.name),
                    e,
                )
            })?;
        info!(host = %config.host, port = config.port, database = %config.name, "connected to postgres");
        Ok(Self { runtime, conn })
    }
}

impl GridStore for PgStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn begin(&mut self) -> Result<Box<dyn StoreTransaction + '_>> {
        let tx = self
            .runtime
            .block_on(self.conn.begin())
            .map_err(|e| GridSimError::connection("begin transaction", e))?;
        Ok(Box::new(PgTransaction {
            runtime: &self.runtime,
            tx,
        }))
    }
}

struct PgTransaction<'a> {
    runtime: &'a Runtime,
    tx: Transaction<'a, Postgres>,
}

impl PgTransaction<'_> {
    fn fetch(&mut self, sql: &str) -> Result<Vec<PgRow>> {
        self.runtime
            .block_on(sqlx::query(sql).fetch_all(&mut *self.tx))
            .map_err(|e| GridSimError::metadata(sql, e))
    }

    /// Multi-row inserts, split so no statement exceeds the bind limit.
    fn insert_rows<T>(
        &mut self,
        table: TargetTable,
        rows: &[T],
        mut push_row: impl FnMut(&mut Separated<'_, '_, Postgres, &'static str>, &T),
    ) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let columns = table.columns();
        let chunk_rows = MAX_BIND_PARAMS / columns.len();
        for chunk in rows.chunks(chunk_rows) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
                "INSERT INTO {} ({}) ",
                table.name(),
                columns.join(", ")
            ));
            builder.push_values(chunk, |mut b, row| push_row(&mut b, row));
            self.runtime
                .block_on(builder.build().execute(&mut *self.tx))
                .map_err(|e| GridSimError::write(&format!("insert into {table}"), e))?;
        }
        debug!(%table, rows = rows.len(), "inserted");
        Ok(())
    }
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> Result<T>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(name)
        .map_err(|e| GridSimError::metadata(&format!("decode column {name}"), e))
}

impl StoreTransaction for PgTransaction<'_> {
    fn truncate_targets(&mut self) -> Result<()> {
        self.runtime
            .block_on(sqlx::query(TRUNCATE_TARGETS).execute(&mut *self.tx))
            .map_err(|e| GridSimError::write("truncate target tables", e))?;
        Ok(())
    }

    fn load_metadata(&mut self) -> Result<GridMetadata> {
        let regions = self
            .fetch(SELECT_REGIONS)?
            .iter()
            .map(|r| Ok(Region { id: column(r, "region_id")? }))
            .collect::<Result<Vec<_>>>()?;
        let substations = self
            .fetch(SELECT_SUBSTATIONS)?
            .iter()
            .map(|r| {
                Ok(Substation {
                    id: column(r, "substation_id")?,
                    capacity_mw: column(r, "capacity_mw")?,
                    region_id: column(r, "region_id")?,
                    profile: None,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let generators = self
            .fetch(SELECT_GENERATORS)?
            .iter()
            .map(|r| {
                let type_name: String = column(r, "generator_type")?;
                Ok(Generator {
                    id: column(r, "generator_id")?,
                    kind: GeneratorKind::from_type_name(&type_name),
                    max_output_mw: column(r, "max_output_mw")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let lines = self
            .fetch(SELECT_LINES)?
            .iter()
            .map(|r| {
                Ok(PowerLine {
                    id: column(r, "line_id")?,
                    max_load_mw: column(r, "max_load_mw")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(GridMetadata {
            regions,
            substations,
            generators,
            lines,
        })
    }

    fn insert(&mut self, rows: &RecordSet) -> Result<()> {
        self.insert_rows(TargetTable::WeatherReports, &rows.weather, |b, r| {
            b.push_bind(r.timestamp)
                .push_bind(r.region_id)
                .push_bind(r.temperature)
                .push_bind(r.conditions.as_str());
        })?;
        self.insert_rows(TargetTable::EnergyPricing, &rows.prices, |b, r| {
            b.push_bind(r.timestamp)
                .push_bind(r.region_id)
                .push_bind(r.price_per_mwh);
        })?;
        self.insert_rows(TargetTable::LoadMeasurements, &rows.loads, |b, r| {
            b.push_bind(r.timestamp)
                .push_bind(r.actual_load_mw)
                .push_bind(r.substation_id);
        })?;
        self.insert_rows(TargetTable::GenerationMeasurements, &rows.generation, |b, r| {
            b.push_bind(r.timestamp)
                .push_bind(r.actual_generation_mw)
                .push_bind(r.generator_id);
        })?;
        self.insert_rows(TargetTable::LineMeasurements, &rows.lines, |b, r| {
            b.push_bind(r.timestamp)
                .push_bind(r.actual_load_mw)
                .push_bind(r.line_id);
        })?;
        self.insert_rows(TargetTable::Alerts, &rows.alerts, |b, r| {
            b.push_bind(r.timestamp)
                .push_bind(r.alert_type.as_str())
                .push_bind(r.description.clone())
                .push_bind(r.substation_id)
                .push_bind(r.status.as_str());
        })
    }

    fn commit(self: Box<Self>) -> Result<()> {
        let PgTransaction { runtime, tx } = *self;
        runtime
            .block_on(tx.commit())
            .map_err(|e| GridSimError::write("commit", e))
    }

    fn rollback(self: Box<Self>) -> Result<()> {
        let PgTransaction { runtime, tx } = *self;
        runtime
            .block_on(tx.rollback())
            .map_err(|e| GridSimError::write("rollback", e))
    }
}

