use crate::config::api::ApiConfig;
use crate::core::fetch;
use crate::core::{Pipeline, Record, Storage, TransformResult};
use crate::utils::error::{MrlError, Result};
use reqwest::Client;
use std::collections::HashSet;

pub const PRODUCTS_FILE: &str = "eu_products.csv";
pub const SUBSTANCES_FILE: &str = "eu_pesticides.csv";

const PARENT_ID_FIELD: &str = "product_parent_id";

/// Which reference data set a pipeline run builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Products,
    Substances,
}

impl ReferenceKind {
    pub fn file_name(&self) -> &'static str {
        match self {
            ReferenceKind::Products => PRODUCTS_FILE,
            ReferenceKind::Substances => SUBSTANCES_FILE,
        }
    }

    fn endpoint<'a>(&self, config: &'a ApiConfig) -> &'a str {
        match self {
            ReferenceKind::Products => &config.products_url,
            ReferenceKind::Substances => &config.substances_url,
        }
    }

    fn params(&self, config: &ApiConfig) -> Vec<(String, String)> {
        match self {
            ReferenceKind::Products => config.product_params(),
            ReferenceKind::Substances => config.base_params(),
        }
    }
}

/// Builds one local reference cache file from the EU datalake:
/// extract = paginated fetch, transform = coercion + pipe-delimited
/// CSV, load = overwrite the cache file through `Storage`.
pub struct ReferencePipeline<S: Storage> {
    storage: S,
    config: ApiConfig,
    client: Client,
    kind: ReferenceKind,
}

impl<S: Storage> ReferencePipeline<S> {
    pub fn new(storage: S, config: ApiConfig, kind: ReferenceKind) -> Result<Self> {
        let client = fetch::build_client(&config)?;
        Ok(Self {
            storage,
            config,
            client,
            kind,
        })
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for ReferencePipeline<S> {
    async fn extract(&self) -> Result<Vec<Record>> {
        let endpoint = self.kind.endpoint(&self.config);
        tracing::debug!("Fetching reference data from: {}", endpoint);
        fetch::fetch_all_pages(&self.client, endpoint, &self.kind.params(&self.config)).await
    }

    async fn transform(&self, mut data: Vec<Record>) -> Result<TransformResult> {
        if self.kind == ReferenceKind::Products {
            coerce_parent_ids(&mut data);
        }

        let headers = column_order(&data);
        let csv_output = to_pipe_delimited(&headers, &data)?;

        Ok(TransformResult {
            record_count: data.len(),
            csv_output,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let file_name = self.kind.file_name();
        self.storage
            .write_file(file_name, result.csv_output.as_bytes())
            .await?;
        Ok(file_name.to_string())
    }
}

/// Missing or null parent ids become 0; fractional values from JSON
/// number coercion are truncated to integers.
fn coerce_parent_ids(records: &mut [Record]) {
    for record in records.iter_mut() {
        let parent = record
            .data
            .get(PARENT_ID_FIELD)
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0);
        record.data.insert(
            PARENT_ID_FIELD.to_string(),
            serde_json::Value::from(parent as i64),
        );
    }
}

/// Union of field names across all records, in first-seen order. The
/// API's own field order becomes the cache column order; fields that
/// only appear in later records are appended as encountered.
fn column_order(records: &[Record]) -> Vec<String> {
    let mut columns = Vec::new();
    let mut seen = HashSet::new();
    for record in records {
        for key in record.data.keys() {
            if seen.insert(key.clone()) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

fn to_pipe_delimited(headers: &[String], records: &[Record]) -> Result<String> {
    if headers.is_empty() {
        tracing::warn!("No records fetched, writing empty cache file");
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'|')
        .from_writer(Vec::new());

    writer.write_record(headers)?;
    for record in records {
        writer.write_record(headers.iter().map(|h| cell(record.data.get(h))))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| MrlError::ProcessingError {
            message: format!("CSV buffer error: {}", e),
        })?;

    String::from_utf8(bytes).map_err(|e| MrlError::ProcessingError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}

fn cell(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
