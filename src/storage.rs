use std::{fmt::Display, future::Future};

use anyhow::Context;
use log::{debug, info, warn};
use sqlx::{
    mysql::{MySqlConnectOptions, MySqlConnection},
    Connection,
};

use crate::{config::DatabaseConfig, utils::preview};

pub const INSERT_QUERY: &str = "INSERT INTO mytable (column1, column2) VALUES (?, ?)";

/// Value stored in the second column of every row
pub const RECORD_TAG: &str = "Another Value";

/// One row to be written, values are bound in declaration order
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Record {
    pub payload: String,
    pub tag: String,
}

impl Record {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            tag: RECORD_TAG.to_string(),
        }
    }

    /// Parameters in the order of the placeholders in [`INSERT_QUERY`]
    pub fn params(&self) -> [&str; 2] {
        [self.payload.as_str(), self.tag.as_str()]
    }
}

pub struct Database<'a> {
    config: &'a DatabaseConfig,
}

impl<'a> Database<'a> {
    pub fn new(config: &'a DatabaseConfig) -> Self {
        Self { config }
    }

    /// Empty host or user keep the driver defaults (`localhost`, `root`)
    fn connect_options(&self) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .port(self.config.port)
            .password(self.config.password.expose())
            .database(&self.config.name);
        if !self.config.host.is_empty() {
            options = options.host(&self.config.host);
        }
        if !self.config.user.is_empty() {
            options = options.username(&self.config.user);
        }
        options
    }

    /// Opens a connection, inserts and commits `record` then closes the connection
    pub fn insert(&self, record: &Record) -> anyhow::Result<()> {
        info!("Saving record to database: {}", preview(&record.payload));
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to create async runtime")?;
        rt.block_on(self.do_insert(record))
    }

    async fn do_insert(&self, record: &Record) -> anyhow::Result<()> {
        debug!(
            "Connecting to database {:?} on {}:{} as {:?}",
            self.config.name, self.config.host, self.config.port, self.config.user
        );
        let mut conn = MySqlConnection::connect_with(&self.connect_options())
            .await
            .context("Failed to connect to database")?;

        // Connection exists from here on and is closed whatever the insert outcome
        let result = Self::insert_and_commit(&mut conn, record).await;
        close_after(result, conn.close()).await
    }

    async fn insert_and_commit(conn: &mut MySqlConnection, record: &Record) -> anyhow::Result<()> {
        let mut tx = conn.begin().await.context("Failed to start transaction")?;
        let [payload, tag] = record.params();
        let done = sqlx::query(INSERT_QUERY)
            .bind(payload)
            .bind(tag)
            .execute(&mut *tx)
            .await
            .context("Failed to insert record")?;
        tx.commit().await.context("Failed to commit insert")?;
        info!("Record saved ({} row affected)", done.rows_affected());
        Ok(())
    }
}

/// Awaits `close` then hands back `result`, a close failure is only logged
async fn close_after<T, F, E>(result: anyhow::Result<T>, close: F) -> anyhow::Result<T>
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    if let Err(e) = close.await {
        warn!("Failed to cleanly close database connection: {e}");
    }
    result
}
