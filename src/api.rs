//! Client for the Figma variables REST endpoints.
//!
//! [`VariablesApi`] is what the import sequence talks to; [`FigmaClient`] is
//! the real implementation.

use std::future::Future;

use figma_tokens_core::VariablesPayload;
use indexmap::IndexMap;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::Deserialize;

use crate::{config::Credentials, error::ApiError};

/// The two calls an import makes.
pub trait VariablesApi: Send + Sync {
    /// `GET /files/{file_key}/variables/local`.
    fn fetch_existing_variables(
        &self,
    ) -> impl Future<Output = Result<LocalVariables, ApiError>> + Send;

    /// `POST /files/{file_key}/variables` with every collection, mode and variable at once.
    fn publish_variables(
        &self,
        payload: &VariablesPayload,
    ) -> impl Future<Output = Result<PublishResponse, ApiError>> + Send;
}

/// The parts of the local variables response the import looks at.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalVariables {
    #[serde(default)]
    pub meta: LocalVariablesMeta,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalVariablesMeta {
    #[serde(default)]
    pub variables: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    pub variable_collections: IndexMap<String, RemoteCollection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteCollection {
    #[serde(default)]
    pub name: String,
}

impl LocalVariables {
    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.meta
            .variable_collections
            .values()
            .map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PublishResponse {
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub error: Option<bool>,
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
}

impl PublishResponse {
    /// Figma confirms a bulk update with `status: 200` and a `meta` object.
    pub fn acknowledged(&self) -> bool {
        self.status == Some(200) || self.meta.is_some()
    }
}

/// Figma REST client bound to one file.
pub struct FigmaClient {
    credentials: Credentials,
    http: Client,
}

impl FigmaClient {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_http_client(credentials, Client::new())
    }

    pub fn with_http_client(credentials: Credentials, http: Client) -> Self {
        Self { credentials, http }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/files/{}/{path}",
            self.credentials.api_base.trim_end_matches('/'),
            self.credentials.file_key
        )
    }

    /// Check the HTTP response for errors and return the body text on failure.
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if resp.status().is_success() {
            Ok(resp)
        } else {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(status, "Figma API error");
            Err(ApiError::Status { status, body })
        }
    }
}

impl VariablesApi for FigmaClient {
    async fn fetch_existing_variables(&self) -> Result<LocalVariables, ApiError> {
        let url = self.url("variables/local");
        tracing::debug!(%url, "reading local variables");
        let resp = self
            .http
            .get(&url)
            .header("X-Figma-Token", &self.credentials.token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        resp.json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn publish_variables(
        &self,
        payload: &VariablesPayload,
    ) -> Result<PublishResponse, ApiError> {
        let url = self.url("variables");
        tracing::debug!(
            %url,
            collections = payload.variable_collections.len(),
            modes = payload.variable_modes.len(),
            variables = payload.variables.len(),
            "publishing variables"
        );
        // `.json()` sets the JSON content type.
        let resp = self
            .http
            .post(&url)
            .header("X-Figma-Token", &self.credentials.token)
            .json(payload)
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        resp.json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use figma_tokens_core::{build_payload, TokenDocument};
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    use super::*;
    use crate::config::DEFAULT_API_BASE;

    fn http_response(status_line: &str, content_type: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    /// Accepts one connection on 127.0.0.1, answers with `response` and
    /// yields the raw request it received.
    async fn serve_once(response: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
                if let Some(end) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&request[..end]).to_ascii_lowercase();
                    let length = head
                        .lines()
                        .find_map(|line| line.strip_prefix("content-length:"))
                        .and_then(|value| value.trim().parse::<usize>().ok())
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8(request).unwrap()
        });
        (format!("http://{addr}/v1"), handle)
    }

    fn split_request(request: &str) -> (String, &str) {
        let (head, body) = request.split_once("\r\n\r\n").unwrap();
        (head.to_ascii_lowercase(), body)
    }

    fn client(api_base: &str) -> FigmaClient {
        FigmaClient::with_http_client(
            Credentials {
                token: "figd_test".to_string(),
                file_key: "FILE123".to_string(),
                api_base: api_base.to_string(),
            },
            Client::builder().no_proxy().build().unwrap(),
        )
    }

    #[test]
    fn endpoint_urls() {
        let figma = client(DEFAULT_API_BASE);
        assert_eq!(
            figma.url("variables/local"),
            "https://api.figma.com/v1/files/FILE123/variables/local"
        );
        assert_eq!(
            client("http://localhost:8080/v1/").url("variables"),
            "http://localhost:8080/v1/files/FILE123/variables"
        );
    }

    #[test]
    fn local_variables_are_read_leniently() {
        let existing: LocalVariables = serde_json::from_str(
            r#"{
                "status": 200,
                "error": false,
                "meta": {
                    "variables": { "VariableID:1:2": { "name": "carbon/50" } },
                    "variableCollections": {
                        "VariableCollectionId:1:1": { "name": "CarbonS/Primitives", "modes": [] }
                    }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(existing.meta.variables.len(), 1);
        assert_eq!(existing.collection_names().collect::<Vec<_>>(), ["CarbonS/Primitives"]);

        let empty: LocalVariables = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.collection_names().count(), 0);
    }

    #[test]
    fn publish_acknowledgement() {
        let ok: PublishResponse =
            serde_json::from_str(r#"{"status":200,"error":false,"meta":{"tempIdToRealId":{}}}"#).unwrap();
        assert!(ok.acknowledged());
        let meta_only: PublishResponse = serde_json::from_str(r#"{"meta":{}}"#).unwrap();
        assert!(meta_only.acknowledged());
        let bare: PublishResponse = serde_json::from_str("{}").unwrap();
        assert!(!bare.acknowledged());
    }

    #[tokio::test]
    async fn rejected_scope_check_carries_status_and_body() {
        let (api_base, server) =
            serve_once(http_response("403 Forbidden", "text/plain", "Invalid scope")).await;
        let err = client(&api_base).fetch_existing_variables().await.unwrap_err();

        match err {
            ApiError::Status { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "Invalid scope");
            }
            other => panic!("unexpected {other:?}"),
        }
        let request = server.await.unwrap();
        assert!(
            request.starts_with("GET /v1/files/FILE123/variables/local HTTP/1.1\r\n"),
            "{request}"
        );
        let (head, _) = split_request(&request);
        assert!(head.contains("x-figma-token: figd_test"), "{head}");
        assert!(head.contains("content-type: application/json"), "{head}");
    }

    #[tokio::test]
    async fn existing_variables_are_parsed() {
        let body = r#"{"status":200,"error":false,"meta":{"variables":{},"variableCollections":{"VariableCollectionId:1:1":{"name":"CarbonS/Radius"}}}}"#;
        let (api_base, server) =
            serve_once(http_response("200 OK", "application/json", body)).await;
        let existing = client(&api_base).fetch_existing_variables().await.unwrap();

        assert_eq!(existing.collection_names().collect::<Vec<_>>(), ["CarbonS/Radius"]);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn publish_posts_the_whole_payload() {
        let payload = build_payload(&TokenDocument::builtin().unwrap()).unwrap();
        let (api_base, server) = serve_once(http_response(
            "200 OK",
            "application/json",
            r#"{"status":200,"error":false,"meta":{"tempIdToRealId":{}}}"#,
        ))
        .await;
        let response = client(&api_base).publish_variables(&payload).await.unwrap();
        assert!(response.acknowledged());

        let request = server.await.unwrap();
        assert!(
            request.starts_with("POST /v1/files/FILE123/variables HTTP/1.1\r\n"),
            "{request}"
        );
        let (head, body) = split_request(&request);
        assert!(head.contains("x-figma-token: figd_test"), "{head}");
        assert!(head.contains("content-type: application/json"), "{head}");

        let sent: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(sent["variableCollections"].as_array().unwrap().len(), 4);
        assert_eq!(sent["variableModes"].as_array().unwrap().len(), 5);
        assert_eq!(sent["variables"].as_array().unwrap().len(), 130);
        assert_eq!(sent, serde_json::to_value(&payload).unwrap());
    }

    #[tokio::test]
    async fn rejected_publish_carries_status_and_body() {
        let payload = build_payload(&TokenDocument::builtin().unwrap()).unwrap();
        let (api_base, server) = serve_once(http_response(
            "400 Bad Request",
            "application/json",
            r#"{"status":400,"error":true,"message":"Duplicate variable name"}"#,
        ))
        .await;
        let err = client(&api_base).publish_variables(&payload).await.unwrap_err();

        assert!(
            matches!(&err, ApiError::Status { status: 400, body } if body.contains("Duplicate variable name")),
            "{err:?}"
        );
        server.await.unwrap();
    }
}
