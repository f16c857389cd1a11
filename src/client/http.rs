//! Cliente HTTP (reqwest) de la API de flota

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::{ClientError, ClientResult, FleetApi};
use crate::dto::{
    AssignDriverRequest, AssignTruckRequest, AssignmentOutcome, DriverRequest, DriverTypeRequest,
    GradeKey, GradeSheet, HealthResponse, NewSafetyEvent, SafetyCategoryRequest,
    SafetyEventUpdate, ScorecardMetricRequest, TruckRequest,
};
use crate::models::{
    Driver, DriverStats, DriverType, SafetyCategory, SafetyEvent, ScoreCardEvent, ScoreCardItem,
    Snapshot, Truck, TruckHistoryEvent,
};
use crate::utils::errors::ErrorResponse;

/// Cliente HTTP contra un servidor `driver_safety`
pub struct HttpFleetApi {
    client: Client,
    base_url: String,
}

impl HttpFleetApi {
    /// `base_url` sin el sufijo `/api`, p. ej. `http://localhost:8080`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }
        serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn send_unit(&self, request: RequestBuilder) -> ClientResult<()> {
        self.send::<serde_json::Value>(request).await.map(|_| ())
    }
}

/// Error de API a partir de una respuesta no exitosa
fn api_error(status: StatusCode, body: &[u8]) -> ClientError {
    let message = match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(error) => error.message,
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            if text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                text
            }
        }
    };
    log::warn!("⚠️ API respondió {}: {}", status, message);
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl FleetApi for HttpFleetApi {
    async fn health(&self) -> ClientResult<HealthResponse> {
        self.send(self.client.get(self.url("/healthz"))).await
    }

    async fn bootstrap(&self) -> ClientResult<Snapshot> {
        self.send(self.client.get(self.url("/bootstrap"))).await
    }

    async fn create_driver(&self, request: &DriverRequest) -> ClientResult<Driver> {
        self.send(self.client.post(self.url("/drivers")).json(request))
            .await
    }

    async fn update_driver(&self, driver_id: i32, request: &DriverRequest) -> ClientResult<Driver> {
        let url = self.url(&format!("/drivers/{}", driver_id));
        self.send(self.client.put(url).json(request)).await
    }

    async fn delete_driver(&self, driver_id: i32) -> ClientResult<()> {
        let url = self.url(&format!("/drivers/{}", driver_id));
        self.send_unit(self.client.delete(url)).await
    }

    async fn driver_stats(&self, driver_id: i32) -> ClientResult<DriverStats> {
        let url = self.url(&format!("/drivers/{}/stats", driver_id));
        self.send(self.client.get(url)).await
    }

    async fn assign_truck(
        &self,
        driver_id: i32,
        truck_id: Option<i32>,
    ) -> ClientResult<AssignmentOutcome> {
        let url = self.url(&format!("/drivers/{}/assign-truck", driver_id));
        self.send(self.client.post(url).json(&AssignTruckRequest { truck_id }))
            .await
    }

    async fn create_truck(&self, request: &TruckRequest) -> ClientResult<Truck> {
        self.send(self.client.post(self.url("/trucks")).json(request))
            .await
    }

    async fn update_truck(&self, truck_id: i32, request: &TruckRequest) -> ClientResult<Truck> {
        let url = self.url(&format!("/trucks/{}", truck_id));
        self.send(self.client.put(url).json(request)).await
    }

    async fn delete_truck(&self, truck_id: i32) -> ClientResult<()> {
        let url = self.url(&format!("/trucks/{}", truck_id));
        self.send_unit(self.client.delete(url)).await
    }

    async fn truck_history(&self, truck_id: i32) -> ClientResult<Vec<TruckHistoryEvent>> {
        let url = self.url(&format!("/trucks/{}/history", truck_id));
        self.send(self.client.get(url)).await
    }

    async fn assign_driver(
        &self,
        truck_id: i32,
        driver_id: Option<i32>,
    ) -> ClientResult<AssignmentOutcome> {
        let url = self.url(&format!("/trucks/{}/assign-driver", truck_id));
        self.send(self.client.post(url).json(&AssignDriverRequest { driver_id }))
            .await
    }

    async fn create_driver_type(&self, request: &DriverTypeRequest) -> ClientResult<DriverType> {
        self.send(self.client.post(self.url("/driver-types")).json(request))
            .await
    }

    async fn update_driver_type(
        &self,
        driver_type_id: i32,
        request: &DriverTypeRequest,
    ) -> ClientResult<DriverType> {
        let url = self.url(&format!("/driver-types/{}", driver_type_id));
        self.send(self.client.put(url).json(request)).await
    }

    async fn delete_driver_type(&self, driver_type_id: i32) -> ClientResult<()> {
        let url = self.url(&format!("/driver-types/{}", driver_type_id));
        self.send_unit(self.client.delete(url)).await
    }

    async fn create_safety_category(
        &self,
        request: &SafetyCategoryRequest,
    ) -> ClientResult<SafetyCategory> {
        self.send(self.client.post(self.url("/safety-categories")).json(request))
            .await
    }

    async fn update_safety_category(
        &self,
        category_id: i32,
        request: &SafetyCategoryRequest,
    ) -> ClientResult<SafetyCategory> {
        let url = self.url(&format!("/safety-categories/{}", category_id));
        self.send(self.client.put(url).json(request)).await
    }

    async fn delete_safety_category(&self, category_id: i32) -> ClientResult<()> {
        let url = self.url(&format!("/safety-categories/{}", category_id));
        self.send_unit(self.client.delete(url)).await
    }

    async fn create_scorecard_metric(
        &self,
        request: &ScorecardMetricRequest,
    ) -> ClientResult<ScoreCardItem> {
        self.send(self.client.post(self.url("/scorecard-metrics")).json(request))
            .await
    }

    async fn update_scorecard_metric(
        &self,
        sc_category_id: i32,
        request: &ScorecardMetricRequest,
    ) -> ClientResult<ScoreCardItem> {
        let url = self.url(&format!("/scorecard-metrics/{}", sc_category_id));
        self.send(self.client.put(url).json(request)).await
    }

    async fn delete_scorecard_metric(&self, sc_category_id: i32) -> ClientResult<()> {
        let url = self.url(&format!("/scorecard-metrics/{}", sc_category_id));
        self.send_unit(self.client.delete(url)).await
    }

    async fn create_safety_event(&self, event: &NewSafetyEvent) -> ClientResult<SafetyEvent> {
        self.send(self.client.post(self.url("/safety-events")).json(event))
            .await
    }

    async fn update_safety_event(
        &self,
        safety_event_id: i32,
        update: &SafetyEventUpdate,
    ) -> ClientResult<SafetyEvent> {
        let url = self.url(&format!("/safety-events/{}", safety_event_id));
        self.send(self.client.put(url).json(update)).await
    }

    async fn delete_safety_event(&self, safety_event_id: i32) -> ClientResult<()> {
        let url = self.url(&format!("/safety-events/{}", safety_event_id));
        self.send_unit(self.client.delete(url)).await
    }

    async fn grade_sheet(&self, key: GradeKey) -> ClientResult<Option<GradeSheet>> {
        let request = self.client.get(self.url("/scorecard-grades")).query(&key);
        match self.send(request).await {
            Ok(sheet) => Ok(Some(sheet)),
            Err(ClientError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn save_grades(&self, sheet: &GradeSheet) -> ClientResult<Vec<ScoreCardEvent>> {
        self.send(self.client.put(self.url("/scorecard-grades")).json(sheet))
            .await
    }

    async fn delete_grades(&self, key: GradeKey) -> ClientResult<u64> {
        let request = self.client.delete(self.url("/scorecard-grades")).query(&key);
        let body: serde_json::Value = self.send(request).await?;
        Ok(body
            .get("removed")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_prefers_server_message() {
        let body = br#"{"error":"Bad Request","message":"Truck with id '9' does not exist","code":"BAD_REQUEST"}"#;
        match api_error(StatusCode::BAD_REQUEST, body) {
            ClientError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Truck with id '9' does not exist");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_api_error_falls_back_to_reason() {
        match api_error(StatusCode::BAD_GATEWAY, b"") {
            ClientError::Api { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_url_joins_api_prefix() {
        let api = HttpFleetApi::new("http://localhost:8080/", Duration::from_secs(5)).unwrap();
        assert_eq!(api.url("/drivers/3"), "http://localhost:8080/api/drivers/3");
    }
}
