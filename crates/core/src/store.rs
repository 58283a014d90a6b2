//! SQLite-backed spot storage with a live view of its contents.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tokio::sync::watch;

use crate::error::{Result, SpotError};
use crate::model::{NewSpot, Spot};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS spots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        latitude REAL NOT NULL,
        longitude REAL NOT NULL,
        image_uri TEXT NOT NULL,
        created_at INTEGER NOT NULL
    );
";

const SELECT_SPOTS: &str =
    "SELECT id, title, latitude, longitude, image_uri, created_at FROM spots";

/// Every write republishes the full list, so watchers always see a
/// consistent snapshot of the table.
pub struct SpotStore {
    conn: Mutex<Connection>,
    changes: watch::Sender<Vec<Spot>>,
}

impl SpotStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        let initial = query_all(&conn)?;
        tracing::debug!(count = initial.len(), "opened spot store");

        let (changes, _) = watch::channel(initial);
        Ok(Self {
            conn: Mutex::new(conn),
            changes,
        })
    }

    fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| SpotError::Persistence("spot store lock poisoned".into()))
    }

    pub fn insert(&self, spot: NewSpot) -> Result<Spot> {
        let conn = self.connection()?;
        let created_at_ms = chrono::Utc::now().timestamp_millis();

        conn.execute(
            "INSERT INTO spots (title, latitude, longitude, image_uri, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                spot.title,
                spot.latitude,
                spot.longitude,
                spot.image_uri,
                created_at_ms
            ],
        )?;

        let inserted = Spot {
            id: conn.last_insert_rowid(),
            title: spot.title,
            latitude: spot.latitude,
            longitude: spot.longitude,
            image_uri: spot.image_uri,
            created_at_ms,
        };
        tracing::info!(id = inserted.id, "inserted spot");

        self.publish(&conn)?;
        Ok(inserted)
    }

    /// Removing an id that is not stored is a no-op.
    pub fn delete(&self, id: i64) -> Result<()> {
        let conn = self.connection()?;
        let removed = conn.execute("DELETE FROM spots WHERE id = ?1", params![id])?;

        if removed == 0 {
            tracing::debug!(id, "delete matched no spot");
            return Ok(());
        }

        tracing::info!(id, "deleted spot");
        self.publish(&conn)
    }

    pub fn get(&self, id: i64) -> Result<Option<Spot>> {
        let conn = self.connection()?;
        let spot = conn
            .query_row(&format!("{SELECT_SPOTS} WHERE id = ?1"), params![id], spot_from_row)
            .optional()?;
        Ok(spot)
    }

    pub fn all(&self) -> Result<Vec<Spot>> {
        query_all(&*self.connection()?)
    }

    /// Current list first, then one item per committed change.
    pub fn watch(&self) -> BoxStream<'static, Vec<Spot>> {
        let receiver = self.changes.subscribe();

        stream::unfold((receiver, true), |(mut receiver, first)| async move {
            if !first && receiver.changed().await.is_err() {
                return None;
            }
            let spots = receiver.borrow_and_update().clone();
            Some((spots, (receiver, false)))
        })
        .boxed()
    }

    fn publish(&self, conn: &Connection) -> Result<()> {
        let spots = query_all(conn)?;
        self.changes.send_replace(spots);
        Ok(())
    }
}

fn query_all(conn: &Connection) -> Result<Vec<Spot>> {
    let mut statement = conn.prepare(&format!("{SELECT_SPOTS} ORDER BY id"))?;
    let spots = statement
        .query_map([], spot_from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(spots)
}

fn spot_from_row(row: &Row<'_>) -> rusqlite::Result<Spot> {
    Ok(Spot {
        id: row.get(0)?,
        title: row.get(1)?,
        latitude: row.get(2)?,
        longitude: row.get(3)?,
        image_uri: row.get(4)?,
        created_at_ms: row.get(5)?,
    })
}
