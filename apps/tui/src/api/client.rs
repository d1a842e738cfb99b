use crate::api::{build_url, ApiError, DateRange};
use crate::domain::{ClusterBoundaries, FeatureCollection};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const HEATMAP_PATH: &str = "api/heatmap";
const TRAIN_PATH: &str = "api/train/";
const PREDICT_PATH: &str = "api/predict/";
const BOUNDARIES_PATH: &str = "api/boundaries/";

/// Body of the backend's non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the forecast backend. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    base_url: String,
    client: reqwest::Client,
}

impl ForecastClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        // Validate eagerly so a bad base url fails at startup, not on first poll
        let params: [(&str, &str); 0] = [];
        build_url(base_url, "", &params)?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Transport {
                endpoint: base_url.to_string(),
                source,
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn heatmap_url(&self, range: &DateRange) -> Result<Url, ApiError> {
        build_url(&self.base_url, HEATMAP_PATH, &range.query_params())
    }

    /// Forecast points for the given calendar dates.
    pub async fn heatmap(&self, range: &DateRange) -> Result<FeatureCollection, ApiError> {
        let url = self.heatmap_url(range)?;
        self.request_json(Method::GET, url).await
    }

    /// Asks the backend to retrain its model. The body is only logged.
    pub async fn train(&self) -> Result<serde_json::Value, ApiError> {
        let url = self.endpoint(TRAIN_PATH)?;
        self.request_json(Method::POST, url).await
    }

    /// Asks the backend to regenerate its predictions.
    pub async fn predict(&self) -> Result<serde_json::Value, ApiError> {
        let url = self.endpoint(PREDICT_PATH)?;
        self.request_json(Method::GET, url).await
    }

    pub async fn boundaries(&self) -> Result<ClusterBoundaries, ApiError> {
        let url = self.endpoint(BOUNDARIES_PATH)?;
        self.request_json(Method::GET, url).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let params: [(&str, &str); 0] = [];
        build_url(&self.base_url, path, &params)
    }

    async fn request_json<T: DeserializeOwned>(&self, method: Method, url: Url) -> Result<T, ApiError> {
        let endpoint = url.path().to_string();
        tracing::debug!(%method, %url, "sending request");

        let response = self
            .client
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|source| ApiError::Transport {
            endpoint: endpoint.clone(),
            source,
        })?;

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body).map_or_else(
                |_| {
                    status
                        .canonical_reason()
                        .unwrap_or("unexpected status")
                        .to_string()
                },
                |error| error.error,
            );
            return Err(ApiError::Status {
                endpoint,
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(|source| ApiError::Decode { endpoint, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ClusterId;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> Result<ForecastClient, ApiError> {
        ForecastClient::new(&server.uri(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn heatmap_sends_date_params_and_decodes_features() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/heatmap"))
            .and(query_param("start_date", "2025-03-09"))
            .and(query_param("end_date", "2025-03-16"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "geometry": { "type": "Point", "coordinates": [-80.8, 35.2] },
                        "properties": { "time": 1_741_478_400_000_i64, "volume": 2.5, "cluster_id": 3 }
                    },
                    {
                        "type": "Feature",
                        "geometry": { "type": "Point", "coordinates": [-80.7, 35.3] },
                        "properties": { "time": 1_741_564_800_000_i64, "volume": 1.0, "cluster_id": 1 }
                    }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let range = DateRange::parse("2025-03-09", "2025-03-16")?;
        let collection = client.heatmap(&range).await?;

        assert_eq!(collection.len(), 2);
        assert_eq!(collection.features[0].cluster_id(), &ClusterId::Number(3));
        assert_eq!(collection.features[1].volume(), 1.0);
        Ok(())
    }

    #[tokio::test]
    async fn status_errors_carry_backend_message() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/heatmap"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": "No prediction data found. Please run /predict first."
            })))
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let range = DateRange::parse("2025-03-09", "2025-03-10")?;
        let error = client.heatmap(&range).await.err();

        match error {
            Some(ApiError::Status { status, message, .. }) => {
                assert_eq!(status, 404);
                assert!(message.starts_with("No prediction data found"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/heatmap"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let range = DateRange::parse("2025-03-09", "2025-03-10")?;
        assert!(matches!(
            client.heatmap(&range).await,
            Err(ApiError::Decode { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn train_posts_and_predict_gets() -> Result<(), Box<dyn std::error::Error>> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/train/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Model training completed successfully."
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/predict/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Predictions completed and saved successfully."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server)?;
        let trained = client.train().await?;
        let predicted = client.predict().await?;
        assert_eq!(trained["message"], "Model training completed successfully.");
        assert_eq!(predicted["message"], "Predictions completed and saved successfully.");
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() -> Result<(), Box<dyn std::error::Error>> {
        // Nothing listens on the discard port
        let client = ForecastClient::new("http://127.0.0.1:9", Duration::from_secs(2))?;
        let range = DateRange::parse("2025-03-09", "2025-03-10")?;
        assert!(matches!(
            client.heatmap(&range).await,
            Err(ApiError::Transport { .. })
        ));
        Ok(())
    }

    #[test]
    fn base_url_is_normalised() -> Result<(), ApiError> {
        let client = ForecastClient::new("http://127.0.0.1:8000///", Duration::from_secs(1))?;
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
        let range = DateRange::parse("2025-03-09", "2025-03-10")?;
        assert_eq!(
            client.heatmap_url(&range)?.as_str(),
            "http://127.0.0.1:8000/api/heatmap?start_date=2025-03-09&end_date=2025-03-10"
        );
        Ok(())
    }
}
