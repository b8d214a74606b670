//! Career classification endpoint client.
//!
//! Wire format: `POST { "answers": [[f64; 5]] }` →
//! `{ "career_field": "..." }` or `{ "error": "..." }`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::assessment::features::FeatureVector;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("classifier returned status {0}")]
    Status(u16),

    #[error("classifier reported: {0}")]
    Rejected(String),

    #[error("classifier response had neither career_field nor error")]
    Malformed,
}

#[async_trait]
pub trait CareerClassifier: Send + Sync {
    async fn classify(&self, features: &FeatureVector) -> Result<String, ClassifierError>;
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    answers: [&'a [f64]; 1],
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    career_field: Option<String>,
    error: Option<String>,
}

impl ClassifyResponse {
    fn into_label(self) -> Result<String, ClassifierError> {
        if let Some(label) = self.career_field.filter(|l| !l.trim().is_empty()) {
            return Ok(label.trim().to_string());
        }
        match self.error {
            Some(message) => Err(ClassifierError::Rejected(message)),
            None => Err(ClassifierError::Malformed),
        }
    }
}

#[derive(Clone)]
pub struct HttpCareerClassifier {
    client: Client,
    url: String,
}

impl HttpCareerClassifier {
    pub fn new(client: Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl CareerClassifier for HttpCareerClassifier {
    async fn classify(&self, features: &FeatureVector) -> Result<String, ClassifierError> {
        let body = ClassifyRequest {
            answers: [features.as_slice()],
        };
        let response = self.client.post(&self.url).json(&body).send().await?;

        let status = response.status();
        // The endpoint reports bad input as 4xx with an `error` body, so only
        // give up on the body for server errors.
        if status.is_server_error() {
            return Err(ClassifierError::Status(status.as_u16()));
        }

        let parsed: ClassifyResponse = response.json().await?;
        debug!("Classifier responded with status {status}");
        parsed.into_label()
    }
}
