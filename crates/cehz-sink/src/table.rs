//! REST client for the table service's insert-or-replace operation.

use std::time::Duration;

use reqwest::{Client, Url};

use cehz_core::{Record, SinkConfig};

use crate::entity::{dedup_by_row_key, TableEntity, PARTITION_KEY};
use crate::error::SinkError;

const ODATA_VERSION: &str = "3.0";
const SERVICE_VERSION: &str = "2019-02-02";

/// Outcome of one batch write. `failed` counts entities whose individual
/// write was rejected or lost in transit; those are logged, never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertSummary {
    pub written: usize,
    pub failed: usize,
}

/// Writer for one table in a remote table-store account, authenticated by
/// a SAS token appended to every entity URL.
pub struct TableSink {
    client: Client,
    endpoint: Url,
    table: String,
    sas_token: String,
}

impl TableSink {
    /// Creates a sink for the configured account endpoint and table.
    ///
    /// # Errors
    ///
    /// - [`SinkError::InvalidEndpoint`] if the configured endpoint is not a
    ///   usable URL base, caught before any write is attempted.
    /// - [`SinkError::Http`] if the underlying `reqwest::Client` cannot be
    ///   constructed.
    pub fn new(config: &SinkConfig, timeout_secs: u64) -> Result<Self, SinkError> {
        let endpoint = Url::parse(config.endpoint.trim_end_matches('/')).map_err(|e| {
            SinkError::InvalidEndpoint {
                endpoint: config.endpoint.clone(),
                reason: e.to_string(),
            }
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(SinkError::InvalidEndpoint {
                endpoint: config.endpoint.clone(),
                reason: "endpoint cannot be a URL base".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            table: config.table.clone(),
            sas_token: config.sas_token.clone(),
        })
    }

    /// Upserts every record as one entity, best effort: a failed entity
    /// write is logged and counted but does not stop the batch. Duplicate
    /// row keys within the batch are collapsed to the first occurrence
    /// before writing.
    pub async fn upsert_batch(&self, records: &[Record]) -> UpsertSummary {
        let entities = dedup_by_row_key(records.iter().map(TableEntity::from).collect());

        let mut written = 0;
        let mut failed = 0;
        for entity in &entities {
            match self.upsert_entity(entity).await {
                Ok(()) => written += 1,
                Err(e) => {
                    tracing::warn!(row_key = %entity.row_key, error = %e, "entity write failed");
                    failed += 1;
                }
            }
        }

        tracing::info!(written, failed, "table upsert batch complete");
        UpsertSummary { written, failed }
    }

    /// PUT one entity with insert-or-replace semantics: an existing entity
    /// under the same key is overwritten, so re-runs are idempotent.
    async fn upsert_entity(&self, entity: &TableEntity) -> Result<(), SinkError> {
        let url = self.entity_url(&entity.row_key);
        let response = self
            .client
            .put(url)
            .header("accept", "application/json;odata=nometadata")
            .header("x-ms-version", SERVICE_VERSION)
            .header("dataserviceversion", ODATA_VERSION)
            .json(entity)
            .send()
            .await?;
        response.error_for_status()?;
        Ok(())
    }

    /// Entity address in OData key syntax:
    /// `{endpoint}/{table}(PartitionKey='…',RowKey='…')?{sas}`.
    /// Single quotes inside the key are doubled per OData literal rules.
    fn entity_url(&self, row_key: &str) -> Url {
        let escaped = row_key.replace('\'', "''");
        let segment = format!("{}(PartitionKey='{PARTITION_KEY}',RowKey='{escaped}')", self.table);

        let mut url = self.endpoint.clone();
        // checked in `new`: the endpoint is a valid base
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&segment);
        }
        url.set_query(Some(&self.sas_token));
        url
    }
}
