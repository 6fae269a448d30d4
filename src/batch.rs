use crate::auth::{Credentials, TokenProvider};
use crate::catalog::{CatalogClient, ProductRecord};
use crate::config::Settings;
use crate::criteria::SearchCriteria;
use crate::error::{BatchError, DownloadError};
use crate::query::build_filter;
use crate::session::DownloadSession;
use crate::sink::ProductSink;
use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DownloadOutcome {
    Downloaded {
        identifier: String,
        path: PathBuf,
        bytes: u64,
    },
    Skipped {
        identifier: String,
        path: PathBuf,
    },
    Failed {
        identifier: String,
        reason: String,
    },
}

impl DownloadOutcome {
    pub fn identifier(&self) -> &str {
        match self {
            Self::Downloaded { identifier, .. }
            | Self::Skipped { identifier, .. }
            | Self::Failed { identifier, .. } => identifier,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Downloaded { .. })
    }
}

/// What a batch run did, one outcome per catalog record in catalog order.
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct BatchReport {
    /// Records returned by the catalog.
    pub found: usize,
    /// The catalog's own count of matches, which may exceed one page.
    pub catalog_total: usize,
    pub outcomes: Vec<DownloadOutcome>,
}

impl BatchReport {
    pub fn is_empty(&self) -> bool {
        self.found == 0
    }

    pub fn downloaded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DownloadOutcome::Skipped { .. }))
            .count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DownloadOutcome::Failed { .. }))
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let report: Self = serde_json::from_str(&content)?;
        Ok(report)
    }

    pub fn write<P: AsRef<Path>>(self: &Self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Runs search, authentication and sequential downloads for one set of
/// criteria. Only catalog and authentication failures end a run early; a
/// product that fails to download is recorded and the next one is attempted.
pub struct BatchDownloader<S> {
    client: Client,
    settings: Settings,
    sink: S,
}

impl<S: ProductSink> BatchDownloader<S> {
    pub fn new(settings: Settings, sink: S) -> Self {
        Self {
            client: Client::new(),
            settings,
            sink,
        }
    }

    pub async fn run(
        &self,
        criteria: &SearchCriteria,
        credentials: &Credentials,
    ) -> Result<BatchReport, BatchError> {
        let endpoints = &self.settings.endpoints;

        let filter = build_filter(criteria);
        let catalog = CatalogClient::new(self.client.clone(), endpoints.catalog.clone());
        let results = catalog.search(&filter).await?;

        if results.is_empty() {
            info!("No data found");
            return Ok(BatchReport {
                catalog_total: results.total,
                ..BatchReport::default()
            });
        }
        info!("Total tiles found: {}", results.len());

        let tokens = TokenProvider::new(self.client.clone(), endpoints.identity.clone());
        let token = tokens.authenticate(credentials).await?;
        let session = DownloadSession::new(&token, endpoints.clone(), self.settings.max_redirects)
            .map_err(BatchError::Session)?;

        let mut outcomes = Vec::with_capacity(results.len());
        for record in &results.records {
            outcomes.push(self.download(&session, record).await);
        }

        Ok(BatchReport {
            found: results.len(),
            catalog_total: results.total,
            outcomes,
        })
    }

    async fn download(&self, session: &DownloadSession, record: &ProductRecord) -> DownloadOutcome {
        let identifier = record.identifier.clone();

        if self.settings.skip_existing {
            if let Some(path) = self.sink.existing(&identifier) {
                info!("Output file already exists for {}", record.name);
                return DownloadOutcome::Skipped { identifier, path };
            }
        }

        match self.try_download(session, record).await {
            Ok((path, bytes)) => {
                info!("Downloaded {}", record.name);
                DownloadOutcome::Downloaded {
                    identifier,
                    path,
                    bytes,
                }
            }
            Err(e) => {
                warn!("Problem downloading {}: {}", record.name, e);
                DownloadOutcome::Failed {
                    identifier,
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn try_download(
        &self,
        session: &DownloadSession,
        record: &ProductRecord,
    ) -> Result<(PathBuf, u64), DownloadError> {
        let bytes = session.fetch(&record.id).await?;
        let path = self.sink.write(&record.identifier, &bytes)?;
        Ok((path, bytes.len() as u64))
    }
}
