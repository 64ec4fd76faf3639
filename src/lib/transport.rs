use std::time::Duration;

use log::info;
use reqwest::Client;

use crate::error::TransportError;

/// A fully built schedule request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRequest {
    pub url: String,
    pub query: Vec<(&'static str, String)>,
    pub timeout: Duration,
}

/// A trait, necessary for every entity that will be used for getting the schedule page.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Performs the GET request and returns the response body.
    /// A non-success status must be reported as an error.
    async fn execute(&self, request: &ScheduleRequest) -> Result<String, TransportError>;
}

/// Allows to use Client for getting the schedule page via requests to isu.uust.ru.
impl Transport for Client {
    async fn execute(&self, request: &ScheduleRequest) -> Result<String, TransportError> {
        info!("Requesting {} with {:?}", request.url, request.query);
        let response = self
            .get(&request.url)
            .query(&request.query)
            .timeout(request.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }

        Ok(response.text().await?)
    }
}
