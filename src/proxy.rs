//! Same-origin passthrough to the document-QA backend.
//!
//! The browser only ever talks to this host; upload and chat requests are
//! replayed against `DOCQA_BACKEND_URL` with the caller's cookie so the
//! backend sees the same session.

use anyhow::Context;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use url::Url;

use crate::config::HostConfig;

/// Multipart overhead on top of the largest accepted file.
pub const REQUEST_BODY_LIMIT: usize = crate::validation::MAX_FILE_SIZE as usize + 2 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct ProxyClient {
    http: reqwest::Client,
    backend: Url,
}

impl ProxyClient {
    pub fn new(config: &HostConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.proxy_timeout)
            .build()
            .context("building proxy http client")?;
        Ok(Self {
            http,
            backend: config.backend_url.clone(),
        })
    }

    pub fn upstream_url(&self, uri: &Uri) -> anyhow::Result<Url> {
        let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        self.backend
            .join(path_and_query)
            .with_context(|| format!("joining {path_and_query} onto {}", self.backend))
    }

    async fn forward(&self, uri: &Uri, headers: &HeaderMap, body: Bytes) -> anyhow::Result<Response> {
        let url = self.upstream_url(uri)?;
        tracing::debug!(upstream = %url, bytes = body.len(), "forwarding");

        let upstream = self
            .http
            .post(url.clone())
            .headers(forwarded_headers(headers))
            .body(body)
            .send()
            .await
            .with_context(|| format!("sending to {url}"))?;
        let status = upstream.status();
        let reply_headers = reply_headers(upstream.headers());
        let bytes = upstream
            .bytes()
            .await
            .with_context(|| format!("reading reply from {url}"))?;
        tracing::info!(upstream = %url, status = status.as_u16(), "upstream replied");

        let mut response = Response::new(Body::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = reply_headers;
        Ok(response)
    }
}

fn forwarded_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::new();
    for name in [header::CONTENT_TYPE, header::COOKIE, header::ACCEPT] {
        for value in headers.get_all(&name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}

fn reply_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::new();
    for name in [header::CONTENT_TYPE, header::SET_COOKIE] {
        for value in headers.get_all(&name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}

/// Same body shape the backend uses for its own failures.
pub fn bad_gateway(message: &str) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "status": "error", "message": message })),
    )
        .into_response()
}

/// Handler for `POST /app/upload` and `POST /app/chat`.
pub async fn forward_request(
    State(proxy): State<ProxyClient>,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match proxy.forward(&uri, &headers, body).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!("proxy failure: {e:#}");
            bad_gateway("The document service is unavailable. Please try again.")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::time::Duration;

    fn client(base: &str) -> ProxyClient {
        ProxyClient::new(&HostConfig {
            backend_url: Url::parse(base).unwrap(),
            proxy_timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn upstream_keeps_path_and_query() {
        let proxy = client("http://127.0.0.1:5000");
        let uri: Uri = "/app/chat?debug=1".parse().unwrap();
        assert_eq!(
            proxy.upstream_url(&uri).unwrap().as_str(),
            "http://127.0.0.1:5000/app/chat?debug=1"
        );
    }

    #[test]
    fn upstream_replaces_backend_path() {
        let proxy = client("http://backend.internal:8080/ignored/");
        let uri: Uri = "/app/upload".parse().unwrap();
        assert_eq!(
            proxy.upstream_url(&uri).unwrap().as_str(),
            "http://backend.internal:8080/app/upload"
        );
    }

    #[test]
    fn only_session_and_content_headers_are_forwarded() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::COOKIE, HeaderValue::from_static("session=abc"));
        headers.insert(header::HOST, HeaderValue::from_static("localhost:3000"));
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer x"));

        let out = forwarded_headers(&headers);
        assert_eq!(out.len(), 2);
        assert_eq!(out.get(header::COOKIE).unwrap(), "session=abc");
        assert!(out.get(header::HOST).is_none());
    }

    #[test]
    fn every_set_cookie_comes_back() {
        let mut headers = HeaderMap::new();
        headers.append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::SET_COOKIE, HeaderValue::from_static("b=2"));
        headers.insert(header::SERVER, HeaderValue::from_static("werkzeug"));

        let out = reply_headers(&headers);
        assert_eq!(out.get_all(header::SET_COOKIE).iter().count(), 2);
        assert!(out.get(header::SERVER).is_none());
    }

    #[test]
    fn gateway_errors_use_backend_error_shape() {
        let response = bad_gateway("down");
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
