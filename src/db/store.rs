//! SQLite database store implementation.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use super::models::*;
use crate::probe::Event;

/// Database error types.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Migration error: {0}")]
    Migration(String),
    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

/// Thread-safe database store.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Create a new store with the given database path.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init()?;
        Ok(store)
    }

    /// Initialize the database with migrations.
    fn init(&self) -> Result<(), DbError> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(include_str!("../../migrations/000001_init.up.sql"))
            .map_err(|e| DbError::Migration(format!("Migration 1 failed: {}", e)))?;

        Ok(())
    }

    // --- Host records ---

    /// Add a new host record and return its ID.
    pub fn add_host(&self, host: &mut Host) -> Result<i64, DbError> {
        if host.options.probe_count == 0 {
            host.options.probe_count = 5;
        }

        let ips = serde_json::to_string(&host.ip_addresses)
            .map_err(|e| DbError::Corrupt(format!("ip list: {}", e)))?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO hosts (name, item_kind, ip_addresses, prefer_name_over_ip, suppress_healthy_events, probe_count) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                host.name,
                host.item_kind.as_str(),
                ips,
                host.options.prefer_name_over_ip,
                host.options.suppress_healthy_events,
                host.options.probe_count,
            ],
        )?;
        let id = conn.last_insert_rowid();
        host.id = id;
        Ok(id)
    }

    /// Get a host record by ID, or None if no record exists.
    pub fn get_host(&self, id: i64) -> Result<Option<Host>, DbError> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT id, name, item_kind, ip_addresses, prefer_name_over_ip, suppress_healthy_events, probe_count FROM hosts WHERE id = ?1",
                params![id],
                map_host_row,
            )
            .optional()?;

        Ok(row)
    }

    /// Get all host records.
    pub fn get_hosts(&self) -> Result<Vec<Host>, DbError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, name, item_kind, ip_addresses, prefer_name_over_ip, suppress_healthy_events, probe_count FROM hosts ORDER BY id",
        )?;

        let hosts = stmt
            .query_map([], map_host_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(hosts)
    }

    // --- Event sink ---

    /// Persist a batch of events in a single transaction.
    pub fn add_events(&self, events: &[Event]) -> Result<(), DbError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO events (host_id, name, severity, date, content) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for event in events {
                stmt.execute(params![
                    event.host_id,
                    event.name.as_str(),
                    event.severity.as_i64(),
                    event.date.to_rfc3339(),
                    event.content,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Number of stored events, for observability and tests.
    pub fn count_events(&self) -> Result<i64, DbError> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn map_host_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Host> {
    let kind: String = row.get(2)?;
    let ips_json: String = row.get(3)?;
    let ip_addresses: Vec<String> = serde_json::from_str(&ips_json).unwrap_or_default();

    Ok(Host {
        id: row.get(0)?,
        name: row.get(1)?,
        item_kind: ItemKind::from_str(&kind),
        ip_addresses,
        options: HostOptions {
            prefer_name_over_ip: row.get(4)?,
            suppress_healthy_events: row.get(5)?,
            probe_count: row.get(6)?,
        },
    })
}
