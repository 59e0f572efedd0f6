use crate::config::RoadsConfig;
use crate::gps::GpsSample;
use anyhow::Result;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors from one snap-to-roads call. Always recovered locally by the
/// session into the uncorrected-track fallback, never surfaced further up.
#[derive(Debug, Error)]
pub enum RoadsError {
    /// The transport signalled a timeout
    #[error("Timeout")]
    Timeout,

    /// The service rejected the API key's quota (status 402)
    #[error("API Key Limited.")]
    RateLimited,

    /// Missing body or an empty snapped-point list
    #[error("Points not found.")]
    PointsNotFound,

    /// Any other transport outcome
    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for RoadsError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RoadsError::Timeout
        } else {
            RoadsError::Transport(e.to_string())
        }
    }
}

/// Wire model of a snap-to-roads response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnappedPointsResponse {
    #[serde(default)]
    pub snapped_points: Vec<SnappedPoint>,
}

/// One corrected point returned by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnappedPoint {
    pub location: SnappedLocation,
    /// Back-reference to the sample this point was derived from; absent for
    /// points the service interpolated
    #[serde(default)]
    pub original_index: Option<usize>,
    /// Opaque place identifier, not used by reconciliation
    #[serde(default)]
    pub place_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnappedLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Seam over the roads call so session orchestration is testable offline
#[async_trait::async_trait]
pub trait SnapService: Send + Sync {
    async fn snap(&self, samples: &[GpsSample]) -> Result<Vec<SnappedPoint>, RoadsError>;
}

/// HTTP client for the roads correction service
pub struct RoadsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RoadsClient {
    /// Build a client with the per-request timeout from config.
    pub fn from_config(config: &RoadsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait::async_trait]
impl SnapService for RoadsClient {
    async fn snap(&self, samples: &[GpsSample]) -> Result<Vec<SnappedPoint>, RoadsError> {
        let path = path_query(samples);
        let url = format!("{}/v1/snapToRoads", self.base_url);

        debug!(points = samples.len(), "requesting snapped points");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("path", path.as_str()),
                ("interpolate", "true"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        // A timeout can also hit while the body is read; keep it in the
        // Timeout bucket rather than folding it into a missing body.
        let body = match response.json::<SnappedPointsResponse>().await {
            Ok(body) => Some(body),
            Err(e) if e.is_timeout() => return Err(RoadsError::Timeout),
            Err(e) => {
                debug!("failed to decode snapped-points body: {e}");
                None
            }
        };

        classify(status, body)
    }
}

/// Encode the full sample sequence as one path query: `lat,lng` pairs in
/// capture order joined by `|`, no coordinate omitted.
pub fn path_query(samples: &[GpsSample]) -> String {
    samples
        .iter()
        .map(|s| format!("{},{}", s.latitude, s.longitude))
        .collect::<Vec<_>>()
        .join("|")
}

/// Classify one response into the error taxonomy.
///
/// Order matters: quota rejection first, then missing/empty points, then the
/// successful-status check, then everything else.
fn classify(
    status: StatusCode,
    body: Option<SnappedPointsResponse>,
) -> Result<Vec<SnappedPoint>, RoadsError> {
    if status == StatusCode::PAYMENT_REQUIRED {
        return Err(RoadsError::RateLimited);
    }

    let points = body.map(|b| b.snapped_points).unwrap_or_default();
    if points.is_empty() {
        return Err(RoadsError::PointsNotFound);
    }

    if status.is_success() {
        Ok(points)
    } else {
        Err(RoadsError::Transport(format!("unexpected status {status}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gps::GpsSample;

    fn sample(index: usize, latitude: f64, longitude: f64) -> GpsSample {
        GpsSample {
            latitude,
            longitude,
            altitude: 0.0,
            bearing: 0.0,
            speed: 0.0,
            timestamp_ms: 0,
            index,
        }
    }

    fn response(points: Vec<SnappedPoint>) -> SnappedPointsResponse {
        SnappedPointsResponse {
            snapped_points: points,
        }
    }

    fn point(lat: f64, lng: f64, original_index: Option<usize>) -> SnappedPoint {
        SnappedPoint {
            location: SnappedLocation {
                latitude: lat,
                longitude: lng,
            },
            original_index,
            place_id: None,
        }
    }

    #[test]
    fn path_query_joins_pairs_with_delimiter() {
        let samples = vec![sample(0, 35.1, 139.1), sample(1, 35.2, 139.2)];
        assert_eq!(path_query(&samples), "35.1,139.1|35.2,139.2");
    }

    #[test]
    fn path_query_single_sample_has_no_delimiter() {
        let samples = vec![sample(0, 35.1, 139.1)];
        assert_eq!(path_query(&samples), "35.1,139.1");
    }

    #[test]
    fn path_query_empty_is_empty() {
        assert_eq!(path_query(&[]), "");
    }

    #[test]
    fn classify_quota_rejection() {
        let result = classify(StatusCode::PAYMENT_REQUIRED, None);
        assert!(matches!(result, Err(RoadsError::RateLimited)));
        assert_eq!(
            RoadsError::RateLimited.to_string(),
            "API Key Limited."
        );
    }

    #[test]
    fn classify_missing_body() {
        let result = classify(StatusCode::OK, None);
        assert!(matches!(result, Err(RoadsError::PointsNotFound)));
        assert_eq!(RoadsError::PointsNotFound.to_string(), "Points not found.");
    }

    #[test]
    fn classify_empty_point_list() {
        let result = classify(StatusCode::OK, Some(response(vec![])));
        assert!(matches!(result, Err(RoadsError::PointsNotFound)));
    }

    #[test]
    fn classify_success_returns_points() {
        let body = response(vec![point(35.1, 139.1, Some(0))]);
        let points = classify(StatusCode::OK, Some(body)).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].original_index, Some(0));
    }

    #[test]
    fn classify_unexpected_status_with_points() {
        let body = response(vec![point(35.1, 139.1, None)]);
        let result = classify(StatusCode::INTERNAL_SERVER_ERROR, Some(body));
        assert!(matches!(result, Err(RoadsError::Transport(_))));
    }

    #[test]
    fn timeout_display_matches_taxonomy() {
        assert_eq!(RoadsError::Timeout.to_string(), "Timeout");
    }

    #[tokio::test]
    async fn stalled_body_classifies_as_timeout() {
        use crate::config::RoadsConfig;
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // Send the status line and headers, then stall mid-body so the
        // timeout fires during the body read, not during send.
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf).await;
            let _ = stream
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\n{")
                .await;
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let client = RoadsClient::from_config(&RoadsConfig {
            base_url: format!("http://{addr}"),
            api_key: String::new(),
            timeout_secs: 1,
        })
        .unwrap();

        let result = client.snap(&[sample(0, 35.1, 139.1)]).await;
        assert!(matches!(result, Err(RoadsError::Timeout)));
        server.abort();
    }

    #[test]
    fn response_parses_camel_case_wire_names() {
        let json = r#"{
            "snappedPoints": [
                {
                    "location": {"latitude": 35.1, "longitude": 139.1},
                    "originalIndex": 2,
                    "placeId": "ChIJ"
                },
                {
                    "location": {"latitude": 35.2, "longitude": 139.2}
                }
            ]
        }"#;
        let parsed: SnappedPointsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.snapped_points.len(), 2);
        assert_eq!(parsed.snapped_points[0].original_index, Some(2));
        assert_eq!(parsed.snapped_points[0].place_id.as_deref(), Some("ChIJ"));
        assert_eq!(parsed.snapped_points[1].original_index, None);
    }
}
