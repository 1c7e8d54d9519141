use crate::domain::{LocationRecord, SubmittedTimestamp};
use crate::http::AppState;
use crate::http::api_error::ApiError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tracing::{info, instrument, warn};

#[derive(Debug, Deserialize)]
pub struct LocationSubmission {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    timestamp: Option<SubmittedTimestamp>,
}

#[derive(Debug, Serialize)]
pub struct SaveLocationResponse {
    success: bool,
    count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<LocationRecord>,
}

#[instrument(skip_all)]
pub async fn save_location(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    payload: Result<Json<LocationSubmission>, JsonRejection>,
) -> Result<Json<SaveLocationResponse>, ApiError> {
    let Json(submission) = payload.map_err(|rejection| {
        warn!("⚠️ Rejected location: {}", rejection.body_text());
        ApiError::MalformedPayload(rejection.body_text())
    })?;

    if let Some(bounds) = state.config.bounding_box() {
        if !bounds.contains(submission.latitude, submission.longitude) {
            #[rustfmt::skip]
            warn!("⚠️ Rejected location ({}, {}), outside {}", submission.latitude, submission.longitude, bounds);
            return Err(ApiError::OutsideBoundingBox {
                latitude: submission.latitude,
                longitude: submission.longitude,
                bounds: *bounds,
            });
        }
    }

    let mut record = match submission.timestamp {
        Some(timestamp) => LocationRecord::new(submission.latitude, submission.longitude, timestamp.into_inner()),
        None => LocationRecord::received_now(submission.latitude, submission.longitude),
    };
    if state.config.routes().capture_source_address() {
        record = record.with_source_address(peer.ip().to_string());
    }

    let count = state.store.append(record.clone()).await?;
    info!("📍 Stored location ({}, {}), {} in total", record.latitude, record.longitude, count);

    Ok(Json(SaveLocationResponse {
        success: true,
        count,
        location: state.config.routes().echo_record().then_some(record),
    }))
}

#[cfg(test)]
mod tests {
    use crate::app_config::AppConfigBuilder;
    use crate::domain::BoundingBox;
    use crate::http::test_server::{spawn, spawn_with_store};
    use crate::store::{JsonFileStoreHandle, LocationStore, MemoryStore};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;
    use rstest::rstest;
    use serde_json::{Value, json};
    use std::error::Error;
    use std::sync::Arc;
    use tempfile::tempdir;
    use test_log::test;

    #[test(tokio::test)]
    async fn stores_a_location_and_returns_the_count() -> Result<(), Box<dyn Error>> {
        let server = spawn(AppConfigBuilder::new().build()).await;

        let response = server
            .client
            .post(server.url("/api/save-location"))
            .json(&json!({"latitude": 35.6895, "longitude": 139.6917}))
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.json::<Value>().await?, json!({"success": true, "count": 1}));

        let records = server.store.list().await?;
        assert_eq!(records.len(), 1);
        assert_eq!((records[0].latitude, records[0].longitude), (35.6895, 139.6917));
        assert_eq!(records[0].source_address, None);
        Ok(())
    }

    #[test(tokio::test)]
    async fn every_submission_grows_the_store_by_one() -> Result<(), Box<dyn Error>> {
        let server = spawn(AppConfigBuilder::new().build()).await;

        for (i, (latitude, longitude)) in [(35.0, 139.0), (43.0, 141.3), (-33.9, 151.2)].into_iter().enumerate() {
            let body: Value = server
                .client
                .post(server.url("/api/save-location"))
                .json(&json!({"latitude": latitude, "longitude": longitude}))
                .send()
                .await?
                .json()
                .await?;

            assert_eq!(body["count"], json!(i + 1));
            let records = server.store.list().await?;
            assert_eq!(records.len(), i + 1);
            assert_eq!(records.last().map(|r| (r.latitude, r.longitude)), Some((latitude, longitude)));
        }
        Ok(())
    }

    #[test(tokio::test)]
    async fn keeps_a_client_supplied_timestamp() -> Result<(), Box<dyn Error>> {
        let server = spawn(AppConfigBuilder::new().build()).await;

        server
            .client
            .post(server.url("/api/save-location"))
            .json(&json!({"latitude": 35.0, "longitude": 139.0, "timestamp": "2025-03-01T18:30:00+09:00"}))
            .send()
            .await?
            .error_for_status()?;

        let records = server.store.list().await?;
        assert_eq!(records[0].timestamp, Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap());
        Ok(())
    }

    #[test(tokio::test)]
    async fn assigns_a_timestamp_when_the_client_sends_none() -> Result<(), Box<dyn Error>> {
        let server = spawn(AppConfigBuilder::new().build()).await;
        let before = Utc::now() - chrono::Duration::seconds(1);

        server
            .client
            .post(server.url("/api/save-location"))
            .json(&json!({"latitude": 35.0, "longitude": 139.0, "timestamp": null}))
            .send()
            .await?
            .error_for_status()?;

        let records = server.store.list().await?;
        assert!(records[0].timestamp >= before);
        assert!(records[0].timestamp <= Utc::now());
        Ok(())
    }

    #[rstest]
    #[case::missing_latitude(json!({"longitude": 139.6917}))]
    #[case::missing_longitude(json!({"latitude": 35.6895}))]
    #[case::latitude_as_text(json!({"latitude": "35.6895", "longitude": 139.6917}))]
    #[case::longitude_null(json!({"latitude": 35.6895, "longitude": null}))]
    #[case::invalid_timestamp(json!({"latitude": 35.6895, "longitude": 139.6917, "timestamp": "last tuesday"}))]
    #[case::plain_text(json!("35.6895,139.6917"))]
    #[tokio::test]
    async fn rejects_an_invalid_submission_without_touching_the_store(#[case] body: Value) -> Result<(), Box<dyn Error>> {
        let server = spawn(AppConfigBuilder::new().build()).await;

        let response = server.client.post(server.url("/api/save-location")).json(&body).send().await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await?;
        assert_eq!(body["success"], json!(false));
        assert!(body["error"].as_str().is_some_and(|e| !e.is_empty()));
        assert!(server.store.list().await?.is_empty());
        Ok(())
    }

    #[test(tokio::test)]
    async fn rejects_malformed_json() -> Result<(), Box<dyn Error>> {
        let server = spawn(AppConfigBuilder::new().build()).await;

        let response = server
            .client
            .post(server.url("/api/save-location"))
            .header("content-type", "application/json")
            .body("{\"latitude\": 35.6895,")
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(server.store.list().await?.is_empty());
        Ok(())
    }

    #[test(tokio::test)]
    async fn rejects_a_body_without_json_content_type() -> Result<(), Box<dyn Error>> {
        let server = spawn(AppConfigBuilder::new().build()).await;

        let response = server
            .client
            .post(server.url("/api/save-location"))
            .body(r#"{"latitude": 35.6895, "longitude": 139.6917}"#)
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(server.store.list().await?.is_empty());
        Ok(())
    }

    #[rstest]
    #[case::southern_edge(20.0, 139.0, StatusCode::OK)]
    #[case::northern_edge(46.0, 139.0, StatusCode::OK)]
    #[case::western_edge(35.0, 122.0, StatusCode::OK)]
    #[case::eastern_edge(35.0, 154.0, StatusCode::OK)]
    #[case::tokyo(35.6895, 139.6917, StatusCode::OK)]
    #[case::just_south(19.999, 139.0, StatusCode::BAD_REQUEST)]
    #[case::just_east(35.0, 154.001, StatusCode::BAD_REQUEST)]
    #[case::amsterdam(52.3676, 4.9041, StatusCode::BAD_REQUEST)]
    #[tokio::test]
    async fn applies_the_bounding_box(#[case] latitude: f64, #[case] longitude: f64, #[case] expected: StatusCode) -> Result<(), Box<dyn Error>> {
        let server = spawn(AppConfigBuilder::new().bounding_box(BoundingBox::JAPAN).build()).await;

        let response = server
            .client
            .post(server.url("/api/save-location"))
            .json(&json!({"latitude": latitude, "longitude": longitude}))
            .send()
            .await?;

        assert_eq!(response.status(), expected);
        let stored = server.store.list().await?.len();
        assert_eq!(stored, if expected == StatusCode::OK { 1 } else { 0 });
        Ok(())
    }

    #[test(tokio::test)]
    async fn explains_a_bounding_box_rejection() -> Result<(), Box<dyn Error>> {
        let server = spawn(AppConfigBuilder::new().bounding_box(BoundingBox::JAPAN).build()).await;

        let body: Value = server
            .client
            .post(server.url("/api/save-location"))
            .json(&json!({"latitude": 52.3676, "longitude": 4.9041}))
            .send()
            .await?
            .json()
            .await?;

        assert_eq!(
            body,
            json!({
                "success": false,
                "error": "location (52.3676, 4.9041) is outside the accepted area: latitude 20 to 46, longitude 122 to 154",
            })
        );
        Ok(())
    }

    #[test(tokio::test)]
    async fn records_the_source_address_when_enabled() -> Result<(), Box<dyn Error>> {
        let server = spawn(AppConfigBuilder::new().capture_source_address(true).build()).await;

        server
            .client
            .post(server.url("/api/save-location"))
            .json(&json!({"latitude": 35.0, "longitude": 139.0, "sourceAddress": "198.51.100.1"}))
            .send()
            .await?
            .error_for_status()?;

        let records = server.store.list().await?;
        assert_eq!(records[0].source_address.as_deref(), Some("127.0.0.1"));
        Ok(())
    }

    #[test(tokio::test)]
    async fn echoes_the_stored_record_when_enabled() -> Result<(), Box<dyn Error>> {
        let server = spawn(AppConfigBuilder::new().echo_record(true).build()).await;

        let body: Value = server
            .client
            .post(server.url("/api/save-location"))
            .json(&json!({"latitude": 35.0, "longitude": 139.0, "timestamp": "2025-03-01T09:30:00Z"}))
            .send()
            .await?
            .json()
            .await?;

        assert_eq!(
            body,
            json!({
                "success": true,
                "count": 1,
                "location": {"latitude": 35.0, "longitude": 139.0, "timestamp": "2025-03-01T09:30:00Z"},
            })
        );
        Ok(())
    }

    #[test(tokio::test)]
    async fn honours_the_api_prefix() -> Result<(), Box<dyn Error>> {
        let server = spawn(AppConfigBuilder::new().api_prefix("").build()).await;

        let prefixed = server
            .client
            .post(server.url("/api/save-location"))
            .json(&json!({"latitude": 35.0, "longitude": 139.0}))
            .send()
            .await?;
        let bare = server
            .client
            .post(server.url("/save-location"))
            .json(&json!({"latitude": 35.0, "longitude": 139.0}))
            .send()
            .await?;

        assert_eq!(prefixed.status(), StatusCode::NOT_FOUND);
        assert_eq!(bare.status(), StatusCode::OK);
        Ok(())
    }

    #[test(tokio::test)]
    async fn reports_a_store_failure_without_the_path() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("locations.json");
        std::fs::write(&path, "not json")?;
        let store: Arc<dyn LocationStore> = Arc::new(JsonFileStoreHandle::spawn(&path, 4));
        let server = spawn_with_store(AppConfigBuilder::new().build(), store).await;

        let response = server
            .client
            .post(server.url("/api/save-location"))
            .json(&json!({"latitude": 35.0, "longitude": 139.0}))
            .send()
            .await?;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = response.json().await?;
        assert_eq!(body["success"], json!(false));
        let error = body["error"].as_str().unwrap_or_default();
        assert!(error.starts_with("location store is corrupt"));
        assert!(!error.contains(&*dir.path().to_string_lossy()));
        assert_eq!(std::fs::read_to_string(&path)?, "not json");
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_submissions_are_all_stored() -> Result<(), Box<dyn Error>> {
        let dir = tempdir()?;
        let store: Arc<dyn LocationStore> = Arc::new(JsonFileStoreHandle::spawn(dir.path().join("locations.json"), 8));
        let server = spawn_with_store(AppConfigBuilder::new().build(), store).await;

        let requests = (0..40).map(|i| {
            server
                .client
                .post(server.url("/api/save-location"))
                .json(&json!({"latitude": 30.0 + i as f64 / 10.0, "longitude": 135.0}))
                .send()
        });
        for response in futures::future::join_all(requests).await {
            assert_eq!(response?.status(), StatusCode::OK);
        }

        assert_eq!(server.store.list().await?.len(), 40);
        Ok(())
    }

    #[test(tokio::test)]
    async fn works_against_the_memory_store() -> Result<(), Box<dyn Error>> {
        let store: Arc<dyn LocationStore> = Arc::new(MemoryStore::default());
        let server = spawn_with_store(AppConfigBuilder::new().build(), store).await;

        let body: Value = server
            .client
            .post(server.url("/api/save-location"))
            .json(&json!({"latitude": 35.0, "longitude": 139.0}))
            .send()
            .await?
            .json()
            .await?;

        assert_eq!(body, json!({"success": true, "count": 1}));
        Ok(())
    }
}
