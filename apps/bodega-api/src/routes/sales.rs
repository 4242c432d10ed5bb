//! # Sale Handlers
//!
//! Thin adapters between JSON bodies and the sale engine. Status labels
//! in the path are parsed before the body is looked at, so an unknown
//! status is reported as such even when the body is also malformed.
//!
//! Amounts in bodies are integer minor units (cents).

use std::str::FromStr;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use bodega_core::{
    ClientTotals, IssueDocument, LineRequest, SaleMetadata, SaleRequest, SaleStatus,
};
use bodega_db::DEFAULT_HISTORY_LIMIT;

use crate::error::ApiError;
use crate::AppState;

/// Upper bound for `?limit=` on history queries.
pub const MAX_HISTORY_LIMIT: i64 = 500;

// =============================================================================
// Request Bodies
// =============================================================================

/// One product line as sent by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductLine {
    pub stock_item_id: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub total: i64,
}

/// Body of create and update requests.
#[derive(Debug, Clone, Deserialize)]
pub struct SaleBody {
    pub warehouse_id: String,
    pub client_id: String,
    pub products: Vec<ProductLine>,
    pub amount_total_products: i64,
    pub price_subtotal: i64,
    pub price_final: i64,
    #[serde(default)]
    pub type_emission: Option<String>,
    #[serde(default)]
    pub observation: Option<String>,
    #[serde(default)]
    pub name_companies: Option<String>,
}

impl SaleBody {
    fn into_request(self, status: SaleStatus) -> SaleRequest {
        SaleRequest {
            warehouse_id: self.warehouse_id,
            client_id: self.client_id,
            lines: self
                .products
                .into_iter()
                .map(|p| LineRequest {
                    stock_item_id: p.stock_item_id,
                    quantity: p.quantity,
                    unit_price_cents: p.unit_price,
                    line_total_cents: p.total,
                })
                .collect(),
            totals: ClientTotals {
                amount_total_products: self.amount_total_products,
                price_subtotal_cents: self.price_subtotal,
                price_final_cents: self.price_final,
            },
            status,
            metadata: SaleMetadata {
                type_emission: self.type_emission,
                observation: self.observation,
                name_companies: self.name_companies,
            },
        }
    }
}

/// Body of a document emission.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueDocumentBody {
    pub type_emission: String,
    #[serde(default)]
    pub observation: Option<String>,
    #[serde(default)]
    pub name_companies: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<i64>,
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/sales/{status}`
pub async fn create_sale(
    State(state): State<AppState>,
    Path(status): Path<String>,
    body: Result<Json<SaleBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let status = SaleStatus::from_str(&status)?;
    let Json(body) = body?;

    let summary = state.orders.create_sale(body.into_request(status)).await?;

    Ok((StatusCode::CREATED, Json(summary)))
}

/// `PUT /api/sales/{sale_id}/{status}`
pub async fn update_sale(
    State(state): State<AppState>,
    Path((sale_id, status)): Path<(String, String)>,
    body: Result<Json<SaleBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let status = SaleStatus::from_str(&status)?;
    let Json(body) = body?;

    let sale = state
        .orders
        .update_sale(&sale_id, body.into_request(status))
        .await?;

    Ok(Json(json!({ "id": sale.id })))
}

/// `PUT /api/companies/{company_id}/sales/{folio}/document`
pub async fn issue_document(
    State(state): State<AppState>,
    Path((company_id, folio)): Path<(String, String)>,
    body: Result<Json<IssueDocumentBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let folio: i64 = folio
        .trim()
        .parse()
        .map_err(|_| ApiError::validation(format!("Invalid folio: '{}'", folio)))?;
    let Json(body) = body?;

    let issued = state
        .orders
        .issue_document(
            &company_id,
            folio,
            IssueDocument {
                type_emission: body.type_emission,
                observation: body.observation,
                name_companies: body.name_companies,
            },
        )
        .await?;

    Ok(Json(issued))
}

/// `GET /api/sales/{sale_id}`
pub async fn get_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let sale = state
        .db
        .sales()
        .get_with_lines(&sale_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sale", &sale_id))?;

    Ok(Json(sale))
}

/// `DELETE /api/sales/{sale_id}`
pub async fn delete_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.orders.delete_sale(&sale_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/companies/{company_id}/sales?limit=N`
pub async fn company_history(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let rows = state.db.sales().company_history(&company_id, limit).await?;

    Ok(Json(rows))
}

// =============================================================================
// Router Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use bodega_db::{Database, DbConfig, EngineSettings, NewClient, NewStockItem};

    use crate::{build_router, AppState};

    struct TestApp {
        db: Database,
        router: Router,
        company_id: String,
        warehouse_id: String,
        client_id: String,
        /// 10 units on hand.
        s: String,
    }

    impl TestApp {
        async fn new() -> Self {
            let db = Database::new(DbConfig::in_memory()).await.unwrap();
            let directory = db.directory();

            let company = directory.create_company("Ferretería Sur").await.unwrap();
            let warehouse = directory.create_warehouse(&company.id, "Central").await.unwrap();
            let client = directory
                .create_client(NewClient {
                    tax_id: Some("76.123.456-7".to_string()),
                    business_name: Some("Constructora Andes SpA".to_string()),
                    ..NewClient::named("Constructora Andes")
                })
                .await
                .unwrap();
            let s = db
                .stock()
                .create(NewStockItem {
                    warehouse_id: warehouse.id.clone(),
                    sku: "S".to_string(),
                    title: "Tornillo".to_string(),
                    price_cents: 500,
                    available_quantity: 10,
                })
                .await
                .unwrap();

            let router = build_router(AppState::new(db.clone(), EngineSettings::default()));

            TestApp {
                db,
                router,
                company_id: company.id,
                warehouse_id: warehouse.id,
                client_id: client.id,
                s: s.id,
            }
        }

        fn body(&self, quantity: i64) -> Value {
            json!({
                "warehouse_id": self.warehouse_id,
                "client_id": self.client_id,
                "products": [{
                    "stock_item_id": self.s,
                    "quantity": quantity,
                    "unit_price": 500,
                    "total": 500 * quantity,
                }],
                "amount_total_products": quantity,
                "price_subtotal": 500 * quantity,
                "price_final": 595 * quantity,
            })
        }

        async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(match body {
                    Some(body) => Body::from(body.to_string()),
                    None => Body::empty(),
                })
                .unwrap();

            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }

        async fn available(&self) -> i64 {
            self.db
                .stock()
                .get_by_id(&self.s)
                .await
                .unwrap()
                .unwrap()
                .available_quantity
        }
    }

    #[tokio::test]
    async fn test_pending_then_issued_then_oversized_update() {
        let app = TestApp::new().await;

        let (status, created) = app
            .send("POST", "/api/sales/Pendiente", Some(app.body(4)))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "Pendiente");
        assert_eq!(created["folio"], 1);
        assert_eq!(created["warehouse_name"], "Central");
        assert_eq!(app.available().await, 10);

        let id = created["id"].as_str().unwrap().to_string();

        let (status, updated) = app
            .send("PUT", &format!("/api/sales/{id}/Emitido"), Some(app.body(4)))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], id.as_str());
        assert_eq!(app.available().await, 6);

        let (status, err) = app
            .send("PUT", &format!("/api/sales/{id}/Emitido"), Some(app.body(20)))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(err["code"], "INSUFFICIENT_STOCK");
        assert_eq!(err["details"]["requested"], 20);
        assert_eq!(err["details"]["available"], 6);
        assert_eq!(app.available().await, 6);

        let (status, sale) = app.send("GET", &format!("/api/sales/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sale["status"], "Emitido");
        assert_eq!(sale["lines"][0]["quantity"], 4);
    }

    #[tokio::test]
    async fn test_unknown_status_is_bad_request() {
        let app = TestApp::new().await;

        let (status, err) = app
            .send("POST", "/api/sales/Anulado", Some(app.body(1)))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["code"], "INVALID_STATUS");

        // Status wins over a broken body
        let (status, err) = app
            .send("POST", "/api/sales/Anulado", Some(json!({ "products": 3 })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["code"], "INVALID_STATUS");
        assert_eq!(app.available().await, 10);
    }

    #[tokio::test]
    async fn test_update_with_unknown_status_changes_nothing() {
        let app = TestApp::new().await;

        let (_, created) = app
            .send("POST", "/api/sales/Emitido", Some(app.body(3)))
            .await;
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(app.available().await, 7);

        let (status, err) = app
            .send("PUT", &format!("/api/sales/{id}/bogus"), Some(app.body(9)))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["code"], "INVALID_STATUS");

        let (_, sale) = app.send("GET", &format!("/api/sales/{id}"), None).await;
        assert_eq!(sale["status"], "Emitido");
        assert_eq!(sale["lines"].as_array().unwrap().len(), 1);
        assert_eq!(sale["lines"][0]["quantity"], 3);
        assert_eq!(app.available().await, 7);
    }

    #[tokio::test]
    async fn test_malformed_body_is_validation_error() {
        let app = TestApp::new().await;

        let (status, err) = app
            .send("POST", "/api/sales/Emitido", Some(json!({ "warehouse_id": 7 })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["code"], "VALIDATION_ERROR");

        let mut empty = app.body(1);
        empty["products"] = json!([]);
        let (status, err) = app.send("POST", "/api/sales/Emitido", Some(empty)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["code"], "VALIDATION_ERROR");
        assert_eq!(app.available().await, 10);
    }

    #[tokio::test]
    async fn test_backward_transition_conflicts() {
        let app = TestApp::new().await;

        let (_, created) = app
            .send("POST", "/api/sales/Finalizado", Some(app.body(2)))
            .await;
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(app.available().await, 8);

        let (status, err) = app
            .send("PUT", &format!("/api/sales/{id}/Pendiente"), Some(app.body(2)))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(err["code"], "INVALID_TRANSITION");
        assert_eq!(app.available().await, 8);
    }

    #[tokio::test]
    async fn test_issue_invoice_document() {
        let app = TestApp::new().await;

        let (_, created) = app
            .send("POST", "/api/sales/Pendiente", Some(app.body(3)))
            .await;
        let folio = created["folio"].as_i64().unwrap();
        let uri = format!("/api/companies/{}/sales/{folio}/document", app.company_id);

        let (status, issued) = app
            .send("PUT", &uri, Some(json!({ "type_emission": "factura" })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(issued["sale"]["status"], "Emitido");
        assert_eq!(issued["client_billing"]["tax_id"], "76.123.456-7");
        assert_eq!(app.available().await, 7);

        let (status, err) = app
            .send("PUT", &uri, Some(json!({ "type_emission": "boleta" })))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(err["code"], "ALREADY_ISSUED");

        let bad_folio = format!("/api/companies/{}/sales/abc/document", app.company_id);
        let (status, err) = app
            .send("PUT", &bad_folio, Some(json!({ "type_emission": "boleta" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_delete_releases_and_hides_sale() {
        let app = TestApp::new().await;

        let (_, created) = app
            .send("POST", "/api/sales/Emitido", Some(app.body(5)))
            .await;
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(app.available().await, 5);

        let (status, _) = app.send("DELETE", &format!("/api/sales/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(app.available().await, 10);

        let (status, err) = app.send("GET", &format!("/api/sales/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err["code"], "NOT_FOUND");

        let (status, _) = app.send("DELETE", &format!("/api/sales/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_company_history_newest_first() {
        let app = TestApp::new().await;

        for qty in [1, 2, 3] {
            let (status, _) = app
                .send("POST", "/api/sales/Pendiente", Some(app.body(qty)))
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let uri = format!("/api/companies/{}/sales?limit=2", app.company_id);
        let (status, rows) = app.send("GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);

        let rows = rows.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["folio"], 3);
        assert_eq!(rows[1]["folio"], 2);
        assert_eq!(rows[0]["client_name"], "Constructora Andes");
        assert_eq!(rows[0]["warehouse_name"], "Central");
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new().await;

        let (status, body) = app.send("GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["migrations"]["applied"], body["migrations"]["total"]);
    }
}
