use std::time::Duration;

use reqwest::Client;

use crate::contract::{ResetResponse, StatusResponse};

use super::error::TransportError;

/// The two calls the polling protocol makes against a job server.
#[allow(async_fn_in_trait)]
pub trait JobApi {
    async fn reset(&self) -> Result<ResetResponse, TransportError>;
    async fn status(&self) -> Result<StatusResponse, TransportError>;
}

/// [`JobApi`] over HTTP + JSON.
#[derive(Debug, Clone)]
pub struct HttpJobApi {
    client: Client,
    base_url: String,
}

impl HttpJobApi {
    /// `request_timeout` bounds each individual request, independent of the
    /// polling session's overall timeout.
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, TransportError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        let client = Client::builder()
            .connect_timeout(request_timeout)
            .timeout(request_timeout)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        Err(TransportError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

impl JobApi for HttpJobApi {
    async fn reset(&self) -> Result<ResetResponse, TransportError> {
        let response = self.client.post(self.url("/reset")).send().await?;
        let body = Self::check(response).await?.json::<ResetResponse>().await?;
        Ok(body)
    }

    async fn status(&self) -> Result<StatusResponse, TransportError> {
        let response = self.client.get(self.url("/status")).send().await?;
        let body = Self::check(response).await?.json::<StatusResponse>().await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::contract::JobState;

    fn api(server: &MockServer) -> HttpJobApi {
        HttpJobApi::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let api = HttpJobApi::new("http://localhost:3000/", Duration::from_secs(5)).unwrap();
        assert_eq!(api.base_url(), "http://localhost:3000");
        assert_eq!(api.url("/status"), "http://localhost:3000/status");
    }

    #[tokio::test]
    async fn reset_posts_and_decodes_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reset"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "message": "Server reset successfully" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let body = api(&server).reset().await.unwrap();
        assert_eq!(body.message, "Server reset successfully");
    }

    #[tokio::test]
    async fn status_decodes_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "result": "completed" })),
            )
            .mount(&server)
            .await;

        let body = api(&server).status().await.unwrap();
        assert_eq!(body.result, JobState::Completed);
    }

    #[tokio::test]
    async fn non_success_status_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        match api(&server).status().await {
            Err(TransportError::Status { status, message }) => {
                assert_eq!(status, 500);
                assert_eq!(message, "boom");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "result": "running" })),
            )
            .mount(&server)
            .await;

        let err = api(&server).status().await.unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));
    }

    #[tokio::test]
    async fn slow_response_hits_request_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "result": "pending" }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let api = HttpJobApi::new(&server.uri(), Duration::from_millis(50)).unwrap();
        match api.status().await {
            Err(TransportError::Network(e)) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        // Bind then drop to get a port with nothing listening.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = HttpJobApi::new(&format!("http://{addr}"), Duration::from_secs(1)).unwrap();
        let err = api.reset().await.unwrap_err();
        assert!(matches!(err, TransportError::Network(_)));
    }
}
