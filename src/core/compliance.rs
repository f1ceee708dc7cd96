use crate::config::api::ApiConfig;
use crate::core::reference::{PRODUCTS_FILE, SUBSTANCES_FILE};
use crate::core::{fetch, mrl, Storage};
use crate::domain::model::{ComplianceReport, MrlValue, Verdict};
use crate::utils::error::{MrlError, Result};
use reqwest::Client;

/// A reference cache file loaded into memory: header row plus string
/// rows. No uniqueness is enforced; lookups are first-match-wins.
pub struct ReferenceTable {
    headers: Vec<String>,
    rows: Vec<csv::StringRecord>,
}

impl ReferenceTable {
    pub fn from_pipe_delimited(bytes: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().delimiter(b'|').from_reader(bytes);
        let headers = reader.headers()?.iter().map(String::from).collect();
        let rows = reader
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { headers, rows })
    }

    fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| MrlError::ProcessingError {
                message: format!("Column '{}' missing from cache file", name),
            })
    }

    /// First row whose name column contains the query as a
    /// case-insensitive substring; returns that row's id column.
    pub fn find_id(&self, name_column: &str, id_column: &str, query: &str) -> Result<Option<String>> {
        let name_idx = self.column(name_column)?;
        let id_idx = self.column(id_column)?;
        let needle = query.to_lowercase();

        Ok(self
            .rows
            .iter()
            .find(|row| {
                row.get(name_idx)
                    .map(|name| name.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
            .and_then(|row| row.get(id_idx).map(String::from)))
    }
}

/// Resolves free-text product and substance names against the local
/// reference cache and checks a measured residue value against the
/// applicable EU MRL.
pub struct ComplianceChecker<S: Storage> {
    storage: S,
    config: ApiConfig,
    client: Client,
}

impl<S: Storage> ComplianceChecker<S> {
    pub fn new(storage: S, config: ApiConfig) -> Result<Self> {
        let client = fetch::build_client(&config)?;
        Ok(Self {
            storage,
            config,
            client,
        })
    }

    async fn load_table(&self, file_name: &str) -> Result<ReferenceTable> {
        let bytes = self.storage.read_file(file_name).await?;
        ReferenceTable::from_pipe_delimited(&bytes)
    }

    pub async fn resolve_product(&self, product_name: &str) -> Result<String> {
        let products = self.load_table(PRODUCTS_FILE).await?;
        products
            .find_id("product_name", "product_id", product_name)?
            .ok_or_else(|| MrlError::NotFound {
                kind: "Product",
                name: product_name.to_string(),
            })
    }

    pub async fn resolve_substance(&self, substance_name: &str) -> Result<String> {
        let substances = self.load_table(SUBSTANCES_FILE).await?;
        substances
            .find_id("substance_name", "substance_id", substance_name)?
            .ok_or_else(|| MrlError::NotFound {
                kind: "Substance",
                name: substance_name.to_string(),
            })
    }

    /// Returns `Ok(None)` when the EU database holds no applicable MRL
    /// rule for the resolved pair; no verdict can be produced then.
    pub async fn check(
        &self,
        product_name: &str,
        substance_name: &str,
        measured: f64,
    ) -> Result<Option<ComplianceReport>> {
        let product_id = self.resolve_product(product_name).await?;
        let substance_id = self.resolve_substance(substance_name).await?;
        tracing::debug!(
            "Resolved product '{}' -> {}, substance '{}' -> {}",
            product_name,
            product_id,
            substance_name,
            substance_id
        );

        let rules =
            mrl::lookup_applicable(&self.client, &self.config, &product_id, &substance_id).await?;

        let Some(rule) = rules.first() else {
            tracing::warn!(
                "No MRL data found for product '{}' and substance '{}'",
                product_name,
                substance_name
            );
            return Ok(None);
        };
        tracing::info!(
            "MRL data found for product '{}' and substance '{}'",
            product_name,
            substance_name
        );

        let reference = rule.get_str("mrl_value").unwrap_or_default().to_string();
        let limit = MrlValue::parse(&reference);
        let verdict = if limit.permits(measured) {
            Verdict::Conforme
        } else {
            Verdict::NonConforme
        };

        Ok(Some(ComplianceReport {
            verdict,
            product_id,
            substance_id,
            reference,
            limit,
            measured,
        }))
    }
}
