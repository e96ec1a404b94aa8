use crate::config::Config;
use crate::constants;
use crate::error::GeocoderError;
use crate::export;
use crate::pipeline::{format_duration, GeocodePipeline, PipelineOutcome};
use crate::reader;
use crate::session::{ReviewSession, SessionStore};
use crate::types::{GeocodeApi, GeocodedRecord};
use axum::{
    extract::{Multipart, Path},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Extension, Router,
};
use hyper::Server;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
use uuid::Uuid;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Shared handler context: configuration plus the geocoder pipeline runs use.
pub struct AppContext {
    pub config: Config,
    pub geocoder: Arc<dyn GeocodeApi>,
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn error_response(status: StatusCode, message: String) -> ApiError {
    (status, Json(json!({ "error": message })))
}

fn map_error(e: GeocoderError) -> ApiError {
    let status = match &e {
        GeocoderError::SchemaMismatch(_) | GeocoderError::UnsupportedFileType(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        GeocoderError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, e.to_string())
}

async fn fetch_session(
    store: &Arc<dyn SessionStore>,
    id: Uuid,
) -> Result<ReviewSession, ApiError> {
    store
        .get_session(id)
        .await
        .map_err(map_error)?
        .ok_or_else(|| map_error(GeocoderError::SessionNotFound(id)))
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "base-geocoder",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Prometheus exposition of the pipeline metrics
async fn metrics() -> impl IntoResponse {
    match METRICS_HANDLE.get() {
        Some(handle) => handle.render().into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed",
        )
            .into_response(),
    }
}

/// Accept a spreadsheet upload, validate its columns, and open a session.
/// Returns the row count and duration estimate so the reviewer can decide
/// whether to proceed with geocoding.
async fn create_session(
    Extension(store): Extension<Arc<dyn SessionStore>>,
    Extension(context): Extension<Arc<AppContext>>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() == Some("file") {
            let file_name = field.file_name().unwrap_or("upload.csv").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| error_response(StatusCode::BAD_REQUEST, e.to_string()))?;
            upload = Some((file_name, bytes.to_vec()));
        }
    }
    let (file_name, bytes) = upload.ok_or_else(|| {
        error_response(
            StatusCode::BAD_REQUEST,
            "missing \"file\" multipart field".to_string(),
        )
    })?;

    let records = reader::read_records(&file_name, &bytes).map_err(map_error)?;
    let min_delay = Duration::from_secs(context.config.geocoding.min_delay_seconds);
    let estimate = GeocodePipeline::estimate_duration(records.len(), min_delay);

    let mut session = ReviewSession::new(file_name, records);
    store.create_session(&mut session).await.map_err(map_error)?;
    info!(
        "Opened session {:?} for {} with {} rows",
        session.id,
        session.source_name,
        session.original.len()
    );

    Ok(Json(json!({
        "session_id": session.id,
        "rows": session.original.len(),
        "estimated_duration": format_duration(estimate),
    })))
}

async fn session_summary(
    Path(id): Path<Uuid>,
    Extension(store): Extension<Arc<dyn SessionStore>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = fetch_session(&store, id).await?;
    Ok(Json(json!({
        "session_id": id,
        "source_name": session.source_name,
        "rows": session.original.len(),
        "geocoded": session.geocoded.is_some(),
        "created_at": session.created_at,
    })))
}

/// Run the geocoding pipeline over the session's original records and store
/// the outcome for review.
async fn run_geocoding(
    Path(id): Path<Uuid>,
    Extension(store): Extension<Arc<dyn SessionStore>>,
    Extension(context): Extension<Arc<AppContext>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut session = fetch_session(&store, id).await?;

    let min_delay = Duration::from_secs(context.config.geocoding.min_delay_seconds);
    let pipeline = GeocodePipeline::new(context.geocoder.clone(), min_delay);
    let PipelineOutcome {
        total_records,
        resolved,
        dropped,
        flagged,
        records,
        duration_seconds,
        ..
    } = pipeline.run(session.original.clone()).await;

    session.geocoded = Some(records);
    store.update_session(&session).await.map_err(map_error)?;

    Ok(Json(json!({
        "session_id": id,
        "total_records": total_records,
        "resolved": resolved,
        "dropped": dropped,
        "flagged": flagged,
        "duration_seconds": duration_seconds,
    })))
}

/// Current dataset for review: geocoded rows once the pipeline has run,
/// otherwise the rows as uploaded. The mean coordinate seeds the map view.
async fn get_records(
    Path(id): Path<Uuid>,
    Extension(store): Extension<Arc<dyn SessionStore>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session = fetch_session(&store, id).await?;
    let body = match &session.geocoded {
        Some(records) => json!({
            "geocoded": true,
            "records": records,
            "center": map_center(records),
        }),
        None => json!({
            "geocoded": false,
            "records": session.original,
        }),
    };
    Ok(Json(body))
}

/// Reviewer edits replace the geocoded dataset wholesale and are
/// authoritative for export.
async fn replace_records(
    Path(id): Path<Uuid>,
    Extension(store): Extension<Arc<dyn SessionStore>>,
    Json(records): Json<Vec<GeocodedRecord>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut session = fetch_session(&store, id).await?;

    let rows = records.len();
    session.geocoded = Some(records);
    store.update_session(&session).await.map_err(map_error)?;

    Ok(Json(json!({ "session_id": id, "rows": rows })))
}

async fn export_csv(
    Path(id): Path<Uuid>,
    Extension(store): Extension<Arc<dyn SessionStore>>,
) -> Result<impl IntoResponse, ApiError> {
    let session = fetch_session(&store, id).await?;

    let bytes = match &session.geocoded {
        Some(records) => export::geocoded_to_csv(records),
        None => export::records_to_csv(&session.original),
    }
    .map_err(map_error)?;

    let headers = [
        (
            header::CONTENT_TYPE,
            "text/csv; charset=utf-8".to_string(),
        ),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", constants::EXPORT_FILE_NAME),
        ),
    ];
    Ok((headers, bytes))
}

/// Mean coordinate of the dataset, used by map clients as the initial
/// viewport center. None for an empty dataset.
fn map_center(records: &[GeocodedRecord]) -> Option<serde_json::Value> {
    if records.is_empty() {
        return None;
    }
    let count = records.len() as f64;
    let latitude = records.iter().map(|r| r.latitude).sum::<f64>() / count;
    let longitude = records.iter().map(|r| r.longitude).sum::<f64>() / count;
    Some(json!({ "latitude": latitude, "longitude": longitude }))
}

/// Create the HTTP review surface with all routes
pub fn create_server(store: Arc<dyn SessionStore>, context: Arc<AppContext>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(session_summary))
        .route("/sessions/:id/geocode", post(run_geocoding))
        .route(
            "/sessions/:id/records",
            get(get_records).put(replace_records),
        )
        .route("/sessions/:id/export", get(export_csv))
        .layer(Extension(store))
        .layer(Extension(context))
        .layer(ServiceBuilder::new().layer(cors))
}

/// Install the Prometheus recorder backing the /metrics endpoint. Safe to
/// call once per process.
pub fn init_metrics() {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
        }
        Err(e) => error!("Failed to install Prometheus recorder: {}", e),
    }
}

/// Start the HTTP server on the specified port
pub async fn start_server(
    store: Arc<dyn SessionStore>,
    context: Arc<AppContext>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    init_metrics();
    let app = create_server(store, context);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    println!("🚀 HTTP review surface on http://localhost:{port}");
    println!("💚 Health check: http://localhost:{port}/health");
    println!("📈 Metrics:      http://localhost:{port}/metrics");

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coordinates, LocationRecord};

    fn geocoded(latitude: f64, longitude: f64) -> GeocodedRecord {
        GeocodedRecord::new(
            LocationRecord {
                base_name: "Base".to_string(),
                location_text: "Somewhere".to_string(),
                state: "WA".to_string(),
                subdescription: String::new(),
                image_number: "1".to_string(),
                branch: "Army".to_string(),
                follow_up: false,
            },
            Coordinates {
                latitude,
                longitude,
            },
        )
    }

    #[test]
    fn map_center_is_the_mean_coordinate() {
        let records = vec![geocoded(40.0, -100.0), geocoded(50.0, -110.0)];
        let center = map_center(&records).unwrap();
        assert_eq!(center["latitude"], 45.0);
        assert_eq!(center["longitude"], -105.0);
    }

    #[test]
    fn map_center_of_empty_dataset_is_none() {
        assert!(map_center(&[]).is_none());
    }
}
