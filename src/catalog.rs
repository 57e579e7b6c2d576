//! Trace sources: the embedded sample, JSON files, and a read-only HTTP listing endpoint.
//!
//! A source yields a ranked list of [TraceRecord]s; the catalog only selects one of them.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::{LoadError, SourceError};
use crate::types::{Trace, TraceRecord};

/// Sample 4-node, 4-round trace shipped with the crate.
pub const SAMPLE_TRACE_JSON: &str = include_str!("../fixtures/sample_trace.json");

/// Name under which the embedded sample is listed.
pub const SAMPLE_TRACE_NAME: &str = "sample";

/// Parses and validates the embedded sample trace.
pub fn sample_trace() -> Result<Trace, LoadError> {
  Trace::from_json(SAMPLE_TRACE_JSON)
}

/// Listing entry before its trace is validated.
#[derive(Debug, Deserialize)]
struct RecordWire {
  name: String,
  #[serde(default)]
  description: String,
  trace: serde_json::Value,
}

/// Parses a listing body: either an array of `{name, description, trace}` records or a single
/// bare trace, which is listed under `fallback_name`.
#[instrument(level = "trace", skip(json))]
pub fn parse_listing(json: &str, fallback_name: &str) -> Result<Vec<TraceRecord>, LoadError> {
  let value: serde_json::Value = serde_json::from_str(json)?;
  if value.is_array() {
    let wires: Vec<RecordWire> = serde_json::from_value(value)?;
    return wires
      .into_iter()
      .map(|w| {
        Ok(TraceRecord {
          name: w.name,
          description: w.description,
          trace: Trace::from_value(w.trace)?,
        })
      })
      .collect();
  }
  Ok(vec![TraceRecord {
    name: fallback_name.to_string(),
    description: String::new(),
    trace: Trace::from_value(value)?,
  }])
}

/// Provider of complete traces.
#[async_trait]
pub trait TraceSource: Send + Sync {
  /// Ranked records, best first.
  async fn list(&self) -> Result<Vec<TraceRecord>, SourceError>;

  /// Human-readable origin, for logs.
  fn describe(&self) -> String;
}

/// The sample trace compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSource;

#[async_trait]
impl TraceSource for EmbeddedSource {
  async fn list(&self) -> Result<Vec<TraceRecord>, SourceError> {
    Ok(vec![TraceRecord {
      name: SAMPLE_TRACE_NAME.to_string(),
      description: "4 nodes, node 4 corrupt, decides true after 4 rounds".to_string(),
      trace: sample_trace()?,
    }])
  }

  fn describe(&self) -> String {
    "embedded sample".to_string()
  }
}

/// A JSON file holding a listing or a single trace.
#[derive(Debug, Clone)]
pub struct FileSource {
  path: PathBuf,
}

impl FileSource {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

#[async_trait]
impl TraceSource for FileSource {
  async fn list(&self) -> Result<Vec<TraceRecord>, SourceError> {
    let json = tokio::fs::read_to_string(&self.path)
      .await
      .map_err(LoadError::from)?;
    let fallback = self
      .path
      .file_stem()
      .map(|s| s.to_string_lossy().into_owned())
      .unwrap_or_else(|| "trace".to_string());
    Ok(parse_listing(&json, &fallback)?)
  }

  fn describe(&self) -> String {
    format!("file {}", self.path.display())
  }
}

/// Read-only listing endpoint returning a JSON array of records.
#[derive(Debug, Clone)]
pub struct HttpSource {
  client: reqwest::Client,
  url: String,
}

impl HttpSource {
  pub fn new(url: impl Into<String>) -> Self {
    Self {
      client: reqwest::Client::new(),
      url: url.into(),
    }
  }
}

#[async_trait]
impl TraceSource for HttpSource {
  #[instrument(level = "trace", skip(self), fields(url = %self.url))]
  async fn list(&self) -> Result<Vec<TraceRecord>, SourceError> {
    let body = self
      .client
      .get(&self.url)
      .send()
      .await?
      .error_for_status()?
      .text()
      .await?;
    Ok(parse_listing(&body, "remote")?)
  }

  fn describe(&self) -> String {
    format!("endpoint {}", self.url)
  }
}

/// Ranked, validated traces from one source.
#[derive(Debug, Clone)]
pub struct TraceCatalog {
  records: Vec<TraceRecord>,
}

impl TraceCatalog {
  /// Lists `source`; an empty listing is an error since there is nothing to play.
  pub async fn load(source: &dyn TraceSource) -> Result<Self, SourceError> {
    let records = source.list().await?;
    info!(source = %source.describe(), traces = records.len(), "trace catalog loaded");
    Self::from_records(records)
  }

  pub fn from_records(records: Vec<TraceRecord>) -> Result<Self, SourceError> {
    if records.is_empty() {
      return Err(SourceError::EmptyCatalog);
    }
    Ok(Self { records })
  }

  pub fn records(&self) -> &[TraceRecord] {
    &self.records
  }

  /// The record named `name`, or the top-ranked one when `name` is `None`.
  pub fn select(&self, name: Option<&str>) -> Result<&TraceRecord, SourceError> {
    match name {
      Some(name) => self
        .records
        .iter()
        .find(|r| r.name == name)
        .ok_or_else(|| SourceError::TraceNotFound {
          name: name.to_string(),
        }),
      None => self.records.first().ok_or(SourceError::EmptyCatalog),
    }
  }
}
