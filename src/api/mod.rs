//! API module for warehouse assignment and delivery estimates
//!
//! Provides the REST interface over the shared LogisticsService.

pub mod handlers;
pub mod service;

pub use service::LogisticsService;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Largest accepted upload (inventory CSV or pest image)
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub fn create_rest_router(service: Arc<LogisticsService>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/api/v1/health", get(handlers::health))
        // Registry
        .route("/api/v1/districts", get(handlers::get_districts))
        // Warehouses
        .route("/api/v1/warehouses/candidates", get(handlers::get_candidates))
        .route("/api/v1/warehouses/assign", post(handlers::assign_warehouses))
        // Delivery estimate
        .route("/api/v1/logistics", post(handlers::estimate_delivery))
        // Pest advisory
        .route("/api/v1/pests/:pest/remedy", get(handlers::get_remedy))
        .route("/api/v1/pests/classify", post(handlers::classify_pest))
        // State and middleware
        .with_state(service)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::{read_model, WarehouseArtifacts};
    use crate::districts::DistrictRegistry;
    use crate::logistics::LogisticsRates;
    use crate::pests::{PestClassifierClient, RemedyBook};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    // Two warehouses; centroids sit where scaled distance vectors of
    // eastern and western districts land.
    const BUNDLE: &str = r#"{
        "scaler": {"mean": [300.0, 300.0], "scale": [200.0, 200.0]},
        "model": {"centroids": [[-1.5, 0.0], [0.0, -1.5]]},
        "warehouses": [
            {"District": "Kathmandu", "Latitude": 27.7103, "Longitude": 85.3222},
            {"District": "Kaski", "Latitude": 28.2622, "Longitude": 84.0167}
        ]
    }"#;

    fn service(with_model: bool) -> LogisticsService {
        let mut service = LogisticsService::new(DistrictRegistry::nepal(), LogisticsRates::default())
            .with_remedies(
                RemedyBook::from_csv_reader("pestname,remedy\nTermite,Flood the field\n".as_bytes())
                    .unwrap(),
            );
        if with_model {
            let model = read_model(BUNDLE.as_bytes()).unwrap();
            let artifacts = WarehouseArtifacts::new(model, Some(DistrictRegistry::nepal())).unwrap();
            service = service.with_artifacts(artifacts);
        }
        service
    }

    fn app(with_model: bool) -> Router {
        create_rest_router(Arc::new(service(with_model)))
    }

    /// Serve a canned classifier reply on an ephemeral port
    async fn spawn_classifier(status: StatusCode, reply: Value) -> String {
        let stub = Router::new().route(
            "/predict",
            post(move |_image: axum::body::Bytes| {
                let reply = reply.clone();
                async move { (status, axum::Json(reply)) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, stub).await.unwrap();
        });
        format!("http://{}/predict", addr)
    }

    async fn classify_with(status: StatusCode, reply: Value) -> axum::response::Response {
        let url = spawn_classifier(status, reply).await;
        let service = service(false).with_classifier(PestClassifierClient::new(url).unwrap());
        create_rest_router(Arc::new(service))
            .oneshot(
                Request::post("/api/v1/pests/classify")
                    .header(header::CONTENT_TYPE, "image/jpeg")
                    .body(Body::from(vec![0xFFu8, 0xD8, 0xFF, 0xE0]))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn multipart_request(field: &str, filename: &str, content: &str) -> Request<Body> {
        let boundary = "XBOUNDARYX";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"; filename=\"{n}\"\r\n\
             Content-Type: text/csv\r\n\r\n{c}\r\n--{b}--\r\n",
            b = boundary,
            f = field,
            n = filename,
            c = content
        );
        Request::builder()
            .method("POST")
            .uri("/api/v1/warehouses/assign")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn form_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/logistics")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(false)
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["model_loaded"], false);
    }

    #[tokio::test]
    async fn test_districts_sorted() {
        let response = app(false)
            .oneshot(Request::get("/api/v1/districts").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        let names = body.as_array().unwrap();
        assert_eq!(names.len(), 72);
        assert_eq!(names[0], "Achham");
    }

    #[tokio::test]
    async fn test_logistics_estimate() {
        let response = app(false)
            .oneshot(form_request(
                "delivery_district=Kathmandu&product_quantity=5&product_weight=20",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["nearest_warehouse"], "Lalitpur");
        assert_eq!(body["cost_breakdown"]["weight_cost"], 200.0);
        assert_eq!(body["cost_breakdown"]["quantity_cost"], 25.0);
        assert_eq!(body["route_details"]["destination"]["district"], "Kathmandu");
    }

    #[tokio::test]
    async fn test_logistics_rejects_non_numeric() {
        let response = app(false)
            .oneshot(form_request(
                "delivery_district=Kaski&product_quantity=lots&product_weight=1",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("product_quantity"));
    }

    #[tokio::test]
    async fn test_logistics_requires_district() {
        let response = app(false)
            .oneshot(form_request("product_quantity=1&product_weight=1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_assign_upload() {
        let csv = "District,Quantity\nJhapa,10\nIlam,4\nKaski,8\nMustang,2\nAtlantis,1\n";
        let response = app(true)
            .oneshot(multipart_request("inventory_file", "stock.csv", csv))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["show_prediction"], true);
        assert_eq!(body["summary"]["rows_in"], 5);
        assert_eq!(body["summary"]["rows_dropped"], 1);
        let warehouses = body["warehouses"].as_array().unwrap();
        assert_eq!(warehouses.len(), 2);
    }

    #[tokio::test]
    async fn test_assign_without_model_is_server_error() {
        let response = app(false)
            .oneshot(multipart_request("inventory_file", "stock.csv", "District\nKaski\n"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_assign_rejects_wrong_extension() {
        let response = app(true)
            .oneshot(multipart_request("inventory_file", "stock.png", "District\nKaski\n"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_assign_missing_field() {
        let response = app(true)
            .oneshot(multipart_request("other", "stock.csv", "District\nKaski\n"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "No file part");
    }

    #[tokio::test]
    async fn test_assign_without_district_column() {
        let response = app(true)
            .oneshot(multipart_request("inventory_file", "stock.csv", "Crop,Quantity\nRice,3\n"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_remedy_lookup() {
        let response = app(false)
            .oneshot(Request::get("/api/v1/pests/termite/remedy").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["remedy"], "Flood the field");
    }

    #[tokio::test]
    async fn test_classify_without_endpoint() {
        let response = app(false)
            .oneshot(
                Request::post("/api/v1/pests/classify")
                    .header(header::CONTENT_TYPE, "image/jpeg")
                    .body(Body::from(vec![0xFFu8, 0xD8, 0xFF]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_classify_returns_prediction_and_remedy() {
        let response =
            classify_with(StatusCode::OK, json!({"pest_type": "termite", "confidence": 92.5})).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["prediction"]["pest_type"], "termite");
        assert_eq!(body["prediction"]["confidence"], 92.5);
        assert_eq!(body["remedy"], "Flood the field");
    }

    #[tokio::test]
    async fn test_classify_upstream_failure_is_bad_gateway() {
        let response =
            classify_with(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "model crashed"})).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_classify_rejects_out_of_range_confidence() {
        let response =
            classify_with(StatusCode::OK, json!({"pest_type": "termite", "confidence": 140.0})).await;
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert!(body["error"].as_str().unwrap().contains("confidence"));
    }

    #[tokio::test]
    async fn test_classify_rejects_empty_image() {
        let url = spawn_classifier(StatusCode::OK, json!({"pest_type": "x", "confidence": 1.0})).await;
        let service = service(false).with_classifier(PestClassifierClient::new(url).unwrap());
        let response = create_rest_router(Arc::new(service))
            .oneshot(Request::post("/api/v1/pests/classify").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_logistics_rejects_oversized_weight() {
        let response = app(false)
            .oneshot(form_request(
                "delivery_district=Kaski&product_quantity=1&product_weight=1e308",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
