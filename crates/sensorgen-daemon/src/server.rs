//! Web server setup and routing

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::api;
use crate::config::TlsConfig;
use crate::state::AppState;

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/sensors", get(api::list_sensors))
        .route("/api/sensors/{id}", get(api::get_sensor))
        .route("/api/categories", get(api::list_categories))
        .route("/api/firmware", post(api::generate_firmware))
        .route("/api/firmware/download", post(api::download_firmware))
        .route("/api/wiring", post(api::wiring_guide))
        .route("/api/device-id", post(api::new_device_id))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve the API on `bind`, over TLS when `tls` is set
pub async fn run(state: Arc<AppState>, bind: &str, tls: Option<&TlsConfig>) -> Result<()> {
    if let Some(tls) = tls {
        tls.check_files()?;
    }
    info!(sensors = state.registry.len(), "Serving sensor catalog");
    let app = router(state);

    match tls {
        Some(tls) => serve_tls(app, bind, tls).await,
        None => serve_plain(app, bind).await,
    }
}

async fn serve_plain(app: Router, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!(address = %bind, protocol = "HTTP", "Starting web server");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn serve_tls(app: Router, bind: &str, tls: &TlsConfig) -> Result<()> {
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", bind))?;
    let rustls = RustlsConfig::from_pem_file(&tls.cert, &tls.key)
        .await
        .with_context(|| format!("Failed to load TLS material from {}", tls.cert))?;

    info!(address = %bind, protocol = "HTTPS", cert = %tls.cert, "Starting web server");
    axum_server::bind_rustls(addr, rustls)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState::new(Config::default()).unwrap())
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_list_sensors_filtered() {
        let response = app().oneshot(get("/api/sensors?category=gas")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let sensors: Value = serde_json::from_str(&body_string(response).await).unwrap();
        let ids: Vec<&str> = sensors
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["mq2", "mq135"]);
    }

    #[tokio::test]
    async fn test_list_sensors_bad_category() {
        let response = app().oneshot(get("/api/sensors?category=plasma")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_sensor() {
        let response = app().oneshot(get("/api/sensors/dht11")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let sensor: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(sensor["label"], "DHT11 Temp & Humidity");
        assert_eq!(sensor["category"], "environmental");

        let response = app().oneshot(get("/api/sensors/nope")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_categories() {
        let response = app().oneshot(get("/api/categories")).await.unwrap();
        let categories: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(categories[0]["category"], "environmental");
        assert_eq!(categories[0]["count"], 6);
    }

    #[tokio::test]
    async fn test_generate_firmware() {
        let body = r#"{"device_id": "MACHINE-TEST01", "sensors": ["dht11", "mq2", "bogus"]}"#;
        let response = app().oneshot(post_json("/api/firmware", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));

        let source = body_string(response).await;
        assert!(source.contains("#define DEVICE_ID \"MACHINE-TEST01\""));
        assert!(source.contains("#define WIFI_SSID \"YOUR_WIFI_SSID\""));
        assert!(source.contains("dht.begin();"));
    }

    #[tokio::test]
    async fn test_generate_from_toggle_map() {
        let body = r#"{"device_id": "MACHINE-TEST01", "sensors": {"dht11": true, "mq2": true}}"#;
        let response = app().oneshot(post_json("/api/firmware", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let source = body_string(response).await;
        let dht = source.find("    // DHT11 Temp & Humidity\n").unwrap();
        let mq2 = source.find("    // MQ-2 Smoke/LPG/CO\n").unwrap();
        assert!(dht < mq2);
    }

    #[tokio::test]
    async fn test_explicit_real_mode_beats_configured_simulation() {
        let mut config = Config::default();
        config.generator.simulation = true;
        let app = router(AppState::new(config).unwrap());

        let body = r#"{"device_id": "D1", "sensors": ["mq2"], "simulation": false}"#;
        let response = app.oneshot(post_json("/api/firmware", body)).await.unwrap();
        let source = body_string(response).await;
        assert!(!source.contains("(SIMULATION)"));
        assert!(source.contains("mq2Raw = analogRead(MQ2_PIN);"));
    }

    #[tokio::test]
    async fn test_download_firmware() {
        let body = r#"{"device_id": "MACHINE-TEST01", "sensors": ["pir"], "simulation": true}"#;
        let response = app()
            .oneshot(post_json("/api/firmware/download", body))
            .await
            .unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"esp32_MACHINE-TEST01.ino\""
        );
        let source = body_string(response).await;
        assert!(source.contains("motion = random(0, 2);"));
    }

    #[tokio::test]
    async fn test_generate_rejects_malformed_body() {
        let response = app()
            .oneshot(post_json("/api/firmware", r#"{"sensors": 5}"#))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_wiring() {
        let body = r#"{"device_id": "D1", "sensors": ["hc_sr04"]}"#;
        let response = app().oneshot(post_json("/api/wiring", body)).await.unwrap();
        let guide: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(guide["entries"][0]["id"], "hc_sr04");
        assert_eq!(guide["entries"][0]["pins"][2]["pin"], "Trig");
    }

    #[tokio::test]
    async fn test_missing_tls_files_fail_before_binding() {
        let dir = tempfile::tempdir().unwrap();
        let cert = dir.path().join("cert.pem");
        std::fs::write(&cert, "not really a certificate").unwrap();

        let tls = TlsConfig {
            cert: cert.to_string_lossy().into_owned(),
            key: dir.path().join("key.pem").to_string_lossy().into_owned(),
        };
        let state = AppState::new(Config::default()).unwrap();
        let err = run(state, "127.0.0.1:0", Some(&tls)).await.unwrap_err();
        assert!(err.to_string().starts_with("TLS key file not found"));

        let tls = TlsConfig {
            cert: "/nonexistent/cert.pem".to_string(),
            key: "/nonexistent/key.pem".to_string(),
        };
        let err = tls.check_files().unwrap_err();
        assert!(err.to_string().contains("certificate"));
    }

    #[tokio::test]
    async fn test_new_device_id() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/device-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert!(value["device_id"].as_str().unwrap().starts_with("MACHINE-"));
    }
}
