use crate::utils::error::{MrlError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const HEADERS: [(&str, &str); 2] = [
    ("Content-Type", "application/json"),
    ("Cache-Control", "no-cache"),
];

const BASE_URL_PRODUCTS: &str =
    "https://api.datalake.sante.service.ec.europa.eu/sante/pesticides/pesticide_residues_products";
const BASE_URL_SUBSTANCES: &str =
    "https://api.datalake.sante.service.ec.europa.eu/sante/pesticides/active_substances";
const BASE_URL_PRODUCT_MRLS: &str =
    "https://api.datalake.sante.service.ec.europa.eu/sante/pesticides/product-current-mrl-all-residues";
const BASE_URL_MRLS: &str =
    "https://api.datalake.sante.service.ec.europa.eu/sante/pesticides/pesticide_residues_mrls";

/// Endpoints and fixed request parameters for the EU Sante datalake.
///
/// Constructed once at startup (defaults or a TOML override) and passed
/// explicitly into each component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub products_url: String,
    pub substances_url: String,
    pub product_mrls_url: String,
    pub mrls_url: String,
    pub language: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            products_url: BASE_URL_PRODUCTS.to_string(),
            substances_url: BASE_URL_SUBSTANCES.to_string(),
            product_mrls_url: BASE_URL_PRODUCT_MRLS.to_string(),
            mrls_url: BASE_URL_MRLS.to_string(),
            language: "en".to_string(),
            timeout_seconds: 30,
        }
    }
}

impl ApiConfig {
    /// Load an endpoint override from a TOML file. Missing fields fall
    /// back to the built-in EU endpoints.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MrlError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| MrlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` placeholders with environment variable values.
    /// Unset variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    /// Parameters shared by every endpoint.
    pub fn base_params(&self) -> Vec<(String, String)> {
        vec![
            ("format".to_string(), "json".to_string()),
            ("api-version".to_string(), "v2.0".to_string()),
        ]
    }

    /// Product listing adds a language filter on top of the base set.
    pub fn product_params(&self) -> Vec<(String, String)> {
        let mut params = self.base_params();
        params.push(("language".to_string(), self.language.clone()));
        params
    }

    pub fn mrl_params(&self, product_id: &str, substance_id: &str) -> Vec<(String, String)> {
        let mut params = self.base_params();
        params.push((
            "pesticide_residue_id".to_string(),
            substance_id.to_string(),
        ));
        params.push(("product_id".to_string(), product_id.to_string()));
        params
    }

    pub fn product_mrl_params(&self, product_id: &str) -> Vec<(String, String)> {
        let mut params = self.base_params();
        params.push(("product_id".to_string(), product_id.to_string()));
        params
    }
}

impl Validate for ApiConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("products_url", &self.products_url)?;
        validation::validate_url("substances_url", &self.substances_url)?;
        validation::validate_url("product_mrls_url", &self.product_mrls_url)?;
        validation::validate_url("mrls_url", &self.mrls_url)?;
        validation::validate_non_empty_string("language", &self.language)?;
        validation::validate_positive_number("timeout_seconds", self.timeout_seconds, 1)?;
        Ok(())
    }
}
