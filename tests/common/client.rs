//! Test HTTP client.
//!
//! Speaks the binding protocol against a controller and returns
//! `(status, body)` pairs for assertions.

use bindery_proto::{BindingStatus, USER_ID_HEADER};
use serde_json::Value;

/// A test client, optionally carrying a caller identity.
pub struct TestClient {
    http: reqwest::Client,
    base: String,
    user: Option<String>,
}

impl TestClient {
    pub fn new(base: &str, user: Option<&str>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_string(),
            user: user.map(String::from),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base, path.trim_start_matches('/'));
        let request = self.http.request(method, url);
        match &self.user {
            Some(user) => request.header(USER_ID_HEADER, user),
            None => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> anyhow::Result<(u16, Value)> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        Ok((status, body))
    }

    pub async fn get(&self, path: &str) -> anyhow::Result<(u16, Value)> {
        self.send(self.request(reqwest::Method::GET, path)).await
    }

    pub async fn post(&self, path: &str) -> anyhow::Result<(u16, Value)> {
        self.send(self.request(reqwest::Method::POST, path)).await
    }

    pub async fn bind(&self) -> anyhow::Result<(u16, Value)> {
        self.post("user/bind").await
    }

    pub async fn unbind(&self) -> anyhow::Result<(u16, Value)> {
        self.post("user/unbind").await
    }

    /// `GET /user`, decoded.
    pub async fn status(&self) -> anyhow::Result<BindingStatus> {
        let (code, body) = self.get("user").await?;
        anyhow::ensure!(code == 200, "status query returned {code}: {body}");
        Ok(serde_json::from_value(body)?)
    }
}
