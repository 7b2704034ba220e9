//! Typed HTTP client for the parts of the server the offline mirror needs:
//! the actor roster and the show list.

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server rejected request: {0}")]
    Api(String),
}

/// Envelope every server response arrives in.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActorDto {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShowDto {
    pub id: i64,
    pub date: String,
    pub show_time: String,
}

pub struct ApiClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            http: reqwest::Client::new(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ClientError> {
        let envelope: Envelope<T> = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.token)
            .send()
            .await?
            .json()
            .await?;

        match (envelope.success, envelope.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(ClientError::Api(envelope.message)),
        }
    }

    pub async fn fetch_actors(&self) -> Result<Vec<ActorDto>, ClientError> {
        self.get_json("/api/users?role=actor").await
    }

    pub async fn fetch_shows(&self) -> Result<Vec<ShowDto>, ClientError> {
        self.get_json("/api/shows").await
    }
}
