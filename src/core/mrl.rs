use crate::config::api::ApiConfig;
use crate::core::fetch::{self, with_headers};
use crate::domain::model::Record;
use crate::utils::error::Result;
use reqwest::Client;
use serde::Deserialize;

const APPLICABLE: &str = "Applicable";

#[derive(Debug, Deserialize)]
struct MrlResponse {
    #[serde(default)]
    value: Vec<Record>,
}

fn applicable_only(records: Vec<Record>) -> Vec<Record> {
    records
        .into_iter()
        .filter(|r| r.get_str("applicability_text") == Some(APPLICABLE))
        .collect()
}

/// Retrieve the MRL rules in force for a (product id, substance id)
/// pair, filtered to those currently applicable. A single GET; the
/// endpoint does not paginate rule lookups.
pub async fn lookup_applicable(
    client: &Client,
    config: &ApiConfig,
    product_id: &str,
    substance_id: &str,
) -> Result<Vec<Record>> {
    let params = config.mrl_params(product_id, substance_id);
    let response = with_headers(client.get(&config.mrls_url).query(&params))
        .send()
        .await?
        .error_for_status()?;

    let payload: MrlResponse = response.json().await?;
    Ok(applicable_only(payload.value))
}

/// Every applicable MRL rule currently in force for one product,
/// across all residues. Paginated.
pub async fn product_mrls(
    client: &Client,
    config: &ApiConfig,
    product_id: &str,
) -> Result<Vec<Record>> {
    let params = config.product_mrl_params(product_id);
    let records = fetch::fetch_all_pages(client, &config.product_mrls_url, &params).await?;
    Ok(applicable_only(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn test_config(server: &MockServer) -> ApiConfig {
        ApiConfig {
            mrls_url: server.url("/mrls"),
            product_mrls_url: server.url("/product-mrls"),
            ..ApiConfig::default()
        }
    }

    #[tokio::test]
    async fn test_lookup_filters_to_applicable_rules() {
        let server = MockServer::start();

        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/mrls")
                .query_param("format", "json")
                .query_param("api-version", "v2.0")
                .query_param("pesticide_residue_id", "456")
                .query_param("product_id", "123");
            then.status(200).json_body(serde_json::json!({
                "value": [
                    {"mrl_value": "0.05", "applicability_text": "Applicable"},
                    {"mrl_value": "0.10", "applicability_text": "Not applicable"},
                    {"mrl_value": "0.02*", "applicability_text": "Applicable"}
                ]
            }));
        });

        let client = Client::new();
        let rules = lookup_applicable(&client, &test_config(&server), "123", "456")
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].get_str("mrl_value").unwrap(), "0.05");
        assert_eq!(rules[1].get_str("mrl_value").unwrap(), "0.02*");
    }

    #[tokio::test]
    async fn test_lookup_returns_empty_when_nothing_applies() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(GET).path("/mrls");
            then.status(200).json_body(serde_json::json!({
                "value": [
                    {"mrl_value": "0.10", "applicability_text": "Not applicable"}
                ]
            }));
        });

        let client = Client::new();
        let rules = lookup_applicable(&client, &test_config(&server), "123", "456")
            .await
            .unwrap();

        assert!(rules.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_http_error_propagates() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(GET).path("/mrls");
            then.status(404);
        });

        let client = Client::new();
        let result = lookup_applicable(&client, &test_config(&server), "123", "456").await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_product_mrls_paginates_and_filters() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(GET)
                .path("/product-mrls")
                .query_param("product_id", "42");
            then.status(200).json_body(serde_json::json!({
                "value": [
                    {"pesticide_residue_name": "Glyphosate", "mrl_value": "0.1", "applicability_text": "Applicable"}
                ],
                "nextLink": server.url("/product-mrls-page2")
            }));
        });

        server.mock(|when, then| {
            when.method(GET).path("/product-mrls-page2");
            then.status(200).json_body(serde_json::json!({
                "value": [
                    {"pesticide_residue_name": "Captan", "mrl_value": "0.3", "applicability_text": "Not applicable"},
                    {"pesticide_residue_name": "Dithiocarbamates", "mrl_value": "5", "applicability_text": "Applicable"}
                ]
            }));
        });

        let client = Client::new();
        let rules = product_mrls(&client, &test_config(&server), "42")
            .await
            .unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].get_str("pesticide_residue_name").unwrap(), "Glyphosate");
        assert_eq!(rules[1].get_str("pesticide_residue_name").unwrap(), "Dithiocarbamates");
    }
}
