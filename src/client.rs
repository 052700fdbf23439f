use std::fs;
use std::path::Path;

use reqwest::blocking::Client;
use thiserror::Error;

use crate::browser::ProjectRepository;
use crate::model::{GenerationRequest, GenerationResult, PersistedProject};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned status {0}")]
    Status(u16),
    #[error("could not save file: {0}")]
    Io(#[from] std::io::Error),
}

/// The external service that turns a submitted project into downloadable
/// documents. A trait so the form can be driven by a fake in tests.
pub trait GenerationBackend {
    fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, ClientError>;
}

pub struct GenerationClient {
    base_url: String,
    http: Client,
}

impl GenerationClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        GenerationClient {
            base_url: base_url.into(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches one generated artifact and writes it to `dest`, creating
    /// parent directories as needed.
    pub fn download_artifact(&self, url: &str, dest: &Path) -> Result<(), ClientError> {
        let response = self.http.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        let bytes = response.bytes()?;
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, &bytes)?;
        Ok(())
    }
}

impl GenerationBackend for GenerationClient {
    fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, ClientError> {
        let url = format!("{}/generate", self.base_url.trim_end_matches('/'));
        let response = self.http.post(&url).json(request).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        Ok(response.json::<GenerationResult>()?)
    }
}

/// PostgREST-style read of the externally owned `projects` collection,
/// newest first. The client owns no schema and no write path.
pub struct HttpProjectRepository {
    rest_url: String,
    api_key: String,
    http: Client,
}

impl HttpProjectRepository {
    pub fn new(rest_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        HttpProjectRepository {
            rest_url: rest_url.into(),
            api_key: api_key.into(),
            http: Client::new(),
        }
    }
}

impl ProjectRepository for HttpProjectRepository {
    fn list_projects(&self) -> Result<Vec<PersistedProject>, ClientError> {
        let url = format!("{}/rest/v1/projects", self.rest_url.trim_end_matches('/'));
        let response = self
            .http
            .get(&url)
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }
        Ok(response.json::<Vec<PersistedProject>>()?)
    }
}
