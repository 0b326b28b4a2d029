use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dash_core::{
    Connector, FilterSpec, ListenerSet, NumericSpec, Row, TableSchema, TableSpec, Value,
};
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::Table;
use crate::config::DataConfig;
use crate::fetch::{RemoteFetcher, RemoteOperation, RemoteRequest};
use crate::DataError;

/// A table whose rows live on a remote server.
///
/// Nothing is cached locally: every row, value or numeric-spec request goes
/// through the fetcher. Filtering happens server side.
pub struct RemoteTable {
    schema: TableSchema,
    connector: Connector,
    fetcher: Arc<dyn RemoteFetcher>,
    filter_header: String,
    listeners: ListenerSet,
    /// Poll timer, present while polling
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl RemoteTable {
    /// Create a remote table, starting its poll timer when the connector asks
    /// for one and the configuration allows it
    pub fn new(
        schema: TableSchema,
        connector: Connector,
        fetcher: Arc<dyn RemoteFetcher>,
        config: &DataConfig,
    ) -> Self {
        let table = Self {
            schema,
            connector,
            fetcher,
            filter_header: config.remote.filter_header.clone(),
            listeners: ListenerSet::new(),
            poller: Mutex::new(None),
        };

        let interval = table.connector.interval_secs();
        if config.polling.should_poll(interval) {
            if let Some(secs) = interval {
                match Duration::try_from_secs_f64(secs) {
                    Ok(period) if !period.is_zero() => table.start_polling(period),
                    _ => warn!(
                        "Poll interval {} is not a usable duration, table '{}' will not poll",
                        secs, table.schema.name
                    ),
                }
            }
        }

        table
    }

    pub fn connector(&self) -> &Connector {
        &self.connector
    }

    pub fn is_polling(&self) -> bool {
        self.poller.lock().is_some()
    }

    /// Notify listeners every `period`. The poll itself fetches nothing.
    fn start_polling(&self, period: Duration) {
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(
                    "No async runtime available, table '{}' will not poll",
                    self.schema.name
                );
                return;
            }
        };

        let listeners = self.listeners.clone();
        let name = self.schema.name.clone();
        info!("Polling table '{}' every {:?}", name, period);

        let task = handle.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                listeners.notify(&name);
            }
        });

        if let Some(previous) = self.poller.lock().replace(task) {
            previous.abort();
        }
    }

    /// Request skeleton carrying the table and dashboard headers
    fn request(&self, operation: RemoteOperation) -> RemoteRequest {
        let request = RemoteRequest::new(&self.connector.url, operation)
            .header("Table-Name", self.schema.name.clone());

        match &self.connector.dashboard_name {
            Some(dashboard) => request.header("Dashboard-Name", dashboard.clone()),
            None => request,
        }
    }

    async fn send(&self, request: RemoteRequest) -> Result<Value, DataError> {
        debug!("Remote request {} for table '{}'", request.url, self.schema.name);
        self.fetcher.fetch(request).await
    }
}

#[async_trait]
impl Table for RemoteTable {
    fn schema(&self) -> &TableSchema {
        &self.schema
    }

    async fn rows(&self) -> Result<Vec<Row>, DataError> {
        self.filtered_rows(None).await
    }

    async fn filtered_rows(&self, filter: Option<&FilterSpec>) -> Result<Vec<Row>, DataError> {
        let mut request = self.request(RemoteOperation::GetFilteredRows);
        if let Some(spec) = filter {
            request = request.header(self.filter_header.clone(), serde_json::to_string(spec)?);
        }

        let body = self.send(request).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn all_values(&self, column: &str) -> Result<Vec<Value>, DataError> {
        let request = self
            .request(RemoteOperation::GetAllValues)
            .query("column_name", column);

        let body = self.send(request).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn numeric_spec(&self, column: &str) -> Result<Option<NumericSpec>, DataError> {
        let request = self
            .request(RemoteOperation::GetNumericSpec)
            .query("column_name", column);

        let body = self.send(request).await?;
        Ok(serde_json::from_value(body)?)
    }

    fn listeners(&self) -> &ListenerSet {
        &self.listeners
    }

    fn to_record(&self) -> TableSpec {
        TableSpec::remote(self.schema.columns.clone(), self.connector.clone())
    }

    fn stop_polling(&self) {
        if let Some(task) = self.poller.lock().take() {
            info!("Stopped polling table '{}'", self.schema.name);
            task.abort();
        }
    }
}

impl Drop for RemoteTable {
    fn drop(&mut self) {
        if let Some(task) = self.poller.get_mut().take() {
            task.abort();
        }
    }
}
