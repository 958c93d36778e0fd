use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{Endpoint, PredictionService, ServiceError};
use crate::config::PredictionServiceConfig;
use crate::workforce::domain::{
    AttritionPrediction, EmployeeProfile, PerformancePrediction, RetentionPrediction,
};
use crate::workforce::import::BulkUpload;

const UPLOAD_FILE_NAME: &str = "employees.csv";

/// reqwest-backed client. Attrition lives on its own host; performance and retention share one.
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    client: Client,
    attrition_url: String,
    performance_url: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    predictions: Vec<T>,
}

impl HttpPredictionClient {
    pub fn new(config: &PredictionServiceConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            attrition_url: config.attrition_url.clone(),
            performance_url: config.performance_url.clone(),
        })
    }

    fn url(&self, endpoint: Endpoint) -> String {
        let base = match endpoint {
            Endpoint::Attrition | Endpoint::AttritionBulk => &self.attrition_url,
            _ => &self.performance_url,
        };
        format!("{base}{}", endpoint.path())
    }

    async fn post_profile<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        profile: &EmployeeProfile,
    ) -> Result<T, ServiceError> {
        debug!(endpoint = endpoint.path(), "posting profile");
        let response = self
            .client
            .post(self.url(endpoint))
            .json(profile)
            .send()
            .await
            .map_err(|err| transport(endpoint, err))?;
        decode(endpoint, response).await
    }

    async fn post_upload<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        upload: &BulkUpload,
    ) -> Result<Vec<T>, ServiceError> {
        debug!(endpoint = endpoint.path(), rows = upload.len(), "posting upload");
        let part = Part::bytes(upload.bytes().to_vec())
            .file_name(UPLOAD_FILE_NAME)
            .mime_str("text/csv")
            .map_err(|err| transport(endpoint, err))?;
        let form = Form::new().part("file", part);
        let response = self
            .client
            .post(self.url(endpoint))
            .multipart(form)
            .send()
            .await
            .map_err(|err| transport(endpoint, err))?;
        let envelope: Envelope<T> = decode(endpoint, response).await?;
        Ok(envelope.predictions)
    }
}

fn transport(endpoint: Endpoint, err: reqwest::Error) -> ServiceError {
    ServiceError::Transport {
        endpoint,
        message: err.to_string(),
    }
}

async fn decode<T: DeserializeOwned>(
    endpoint: Endpoint,
    response: Response,
) -> Result<T, ServiceError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ServiceError::Status {
            endpoint,
            status: status.as_u16(),
            status_text: status
                .canonical_reason()
                .unwrap_or("Server Error")
                .to_string(),
        });
    }
    let body = response
        .bytes()
        .await
        .map_err(|err| transport(endpoint, err))?;
    serde_json::from_slice(&body).map_err(|err| ServiceError::Decode {
        endpoint,
        message: err.to_string(),
    })
}

#[async_trait]
impl PredictionService for HttpPredictionClient {
    async fn predict_attrition(
        &self,
        profile: &EmployeeProfile,
    ) -> Result<AttritionPrediction, ServiceError> {
        self.post_profile(Endpoint::Attrition, profile).await
    }

    async fn predict_performance(
        &self,
        profile: &EmployeeProfile,
    ) -> Result<PerformancePrediction, ServiceError> {
        self.post_profile(Endpoint::Performance, profile).await
    }

    async fn predict_retention(
        &self,
        profile: &EmployeeProfile,
    ) -> Result<RetentionPrediction, ServiceError> {
        self.post_profile(Endpoint::Retention, profile).await
    }

    async fn predict_attrition_bulk(
        &self,
        upload: &BulkUpload,
    ) -> Result<Vec<AttritionPrediction>, ServiceError> {
        self.post_upload(Endpoint::AttritionBulk, upload).await
    }

    async fn predict_performance_bulk(
        &self,
        upload: &BulkUpload,
    ) -> Result<Vec<PerformancePrediction>, ServiceError> {
        self.post_upload(Endpoint::PerformanceBulk, upload).await
    }

    async fn predict_retention_bulk(
        &self,
        upload: &BulkUpload,
    ) -> Result<Vec<RetentionPrediction>, ServiceError> {
        self.post_upload(Endpoint::RetentionBulk, upload).await
    }
}
