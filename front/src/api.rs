use eyre::{eyre, WrapErr};
use mint_api::v1::{CreateTodo, Todo};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use uuid::Uuid;

pub const API_URL_VAR: &str = "MINT_API_URL";
pub const DEFAULT_API_URL: &str = "http://localhost:4000";

/// Thin wrapper over the four todo endpoints.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if base_url.ends_with('/') {
            base_url.pop();
        }

        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Resolves the base url from `MINT_API_URL`, falling back to localhost.
    pub fn from_env() -> Self {
        let base_url = std::env::var(API_URL_VAR).unwrap_or_else(|_| String::from(DEFAULT_API_URL));
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn list_todos(&self) -> eyre::Result<Vec<Todo>> {
        let response = self.http.get(self.url("/api/todos")).send().await?;
        expect_body(response).await
    }

    pub async fn create_todo(&self, title: &str) -> eyre::Result<Todo> {
        let body = CreateTodo {
            title: title.to_owned(),
        };

        let response = (self.http.post(self.url("/api/todos")))
            .json(&body)
            .send()
            .await?;

        expect_body(response).await
    }

    pub async fn toggle_todo(&self, id: Uuid) -> eyre::Result<Todo> {
        let response = (self.http.patch(self.url(&format!("/api/todos/{id}/toggle"))))
            .send()
            .await?;

        expect_body(response).await
    }

    pub async fn delete_todo(&self, id: Uuid) -> eyre::Result<()> {
        let response = (self.http.delete(self.url(&format!("/api/todos/{id}"))))
            .send()
            .await?;

        handle_response::<serde::de::IgnoredAny>(response).await?;

        Ok(())
    }
}

/// Turns a response into its decoded body.
///
/// Non-2xx responses fail with the body text, or the status reason when the
/// body is empty. A 204 yields `None`.
pub async fn handle_response<T: DeserializeOwned>(response: Response) -> eyre::Result<Option<T>> {
    let status = response.status();

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();

        let message = match text.is_empty() {
            true => status.canonical_reason().unwrap_or("Request failed").to_owned(),
            false => text,
        };

        return Err(eyre!(message));
    }

    if status == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let body = response.json().await.wrap_err("Malformed response body")?;
    Ok(Some(body))
}

async fn expect_body<T: DeserializeOwned>(response: Response) -> eyre::Result<T> {
    handle_response(response)
        .await?
        .ok_or_else(|| eyre!("Empty response body"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_one_trailing_slash() {
        assert_eq!(ApiClient::new("http://api.example/").base_url(), "http://api.example");
        assert_eq!(ApiClient::new("http://api.example").base_url(), "http://api.example");
    }

    #[test]
    fn builds_urls_from_base() {
        let client = ApiClient::new("https://api.example/");
        assert_eq!(client.url("/api/todos"), "https://api.example/api/todos");
    }
}
