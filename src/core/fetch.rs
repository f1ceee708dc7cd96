use crate::config::api::{ApiConfig, HEADERS};
use crate::domain::model::Record;
use crate::utils::error::Result;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use std::time::Duration;

/// One page of an EU datalake response. A missing `value` array is
/// treated as an empty page.
#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    value: Vec<Record>,
    #[serde(rename = "nextLink")]
    next_link: Option<String>,
}

pub fn build_client(config: &ApiConfig) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .build()?;
    Ok(client)
}

pub(crate) fn with_headers(request: RequestBuilder) -> RequestBuilder {
    HEADERS
        .iter()
        .fold(request, |req, (name, value)| req.header(*name, *value))
}

/// Fetch every record from a paginated endpoint.
///
/// Issues a GET with the given query parameters, appends the `value`
/// array, then follows `nextLink` (parameters already embedded) until
/// it is absent. Any non-success status aborts the whole fetch.
pub async fn fetch_all_pages(
    client: &Client,
    url: &str,
    params: &[(String, String)],
) -> Result<Vec<Record>> {
    let mut all_items = Vec::new();
    let mut request = client.get(url).query(params);

    loop {
        let response = with_headers(request).send().await?.error_for_status()?;
        let page: Page = response.json().await?;
        all_items.extend(page.value);

        match page.next_link {
            Some(next) => {
                tracing::debug!("Following nextLink: {}", next);
                request = client.get(&next);
            }
            None => break,
        }
    }

    Ok(all_items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn test_params() -> Vec<(String, String)> {
        vec![
            ("format".to_string(), "json".to_string()),
            ("api-version".to_string(), "v2.0".to_string()),
        ]
    }

    #[tokio::test]
    async fn test_single_page_without_next_link() {
        let server = MockServer::start();

        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/products")
                .query_param("format", "json")
                .query_param("api-version", "v2.0")
                .header("Content-Type", "application/json")
                .header("Cache-Control", "no-cache");
            then.status(200).json_body(serde_json::json!({
                "value": [
                    {"product_id": 1, "product_name": "Apples"},
                    {"product_id": 2, "product_name": "Pears"}
                ]
            }));
        });

        let client = Client::new();
        let records = fetch_all_pages(&client, &server.url("/products"), &test_params())
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].data.get("product_id").unwrap().as_i64().unwrap(),
            1
        );
        assert_eq!(records[1].get_str("product_name").unwrap(), "Pears");
    }

    #[tokio::test]
    async fn test_pagination_concatenates_pages_in_order() {
        let server = MockServer::start();

        let page1 = server.mock(|when, then| {
            when.method(GET).path("/products").query_param("format", "json");
            then.status(200).json_body(serde_json::json!({
                "value": [{"product_id": 1}, {"product_id": 2}],
                "nextLink": server.url("/products-page2")
            }));
        });

        let page2 = server.mock(|when, then| {
            when.method(GET).path("/products-page2");
            then.status(200).json_body(serde_json::json!({
                "value": [{"product_id": 3}],
                "nextLink": server.url("/products-page3")
            }));
        });

        let page3 = server.mock(|when, then| {
            when.method(GET).path("/products-page3");
            then.status(200).json_body(serde_json::json!({
                "value": [{"product_id": 4}, {"product_id": 5}]
            }));
        });

        let client = Client::new();
        let records = fetch_all_pages(&client, &server.url("/products"), &test_params())
            .await
            .unwrap();

        page1.assert();
        page2.assert();
        page3.assert();

        let ids: Vec<i64> = records
            .iter()
            .map(|r| r.data.get("product_id").unwrap().as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_missing_value_array_yields_empty_result() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(GET).path("/products");
            then.status(200).json_body(serde_json::json!({}));
        });

        let client = Client::new();
        let records = fetch_all_pages(&client, &server.url("/products"), &test_params())
            .await
            .unwrap();

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_http_error_aborts_fetch() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(GET).path("/products");
            then.status(500);
        });

        let client = Client::new();
        let result = fetch_all_pages(&client, &server.url("/products"), &test_params()).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_http_error_on_later_page_aborts_fetch() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(GET).path("/products");
            then.status(200).json_body(serde_json::json!({
                "value": [{"product_id": 1}],
                "nextLink": server.url("/products-page2")
            }));
        });

        server.mock(|when, then| {
            when.method(GET).path("/products-page2");
            then.status(503);
        });

        let client = Client::new();
        let result = fetch_all_pages(&client, &server.url("/products"), &test_params()).await;

        assert!(result.is_err());
    }
}
