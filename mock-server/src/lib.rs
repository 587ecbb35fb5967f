use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Header the tunnelling service checks before skipping its interstitial.
pub const TUNNEL_BYPASS_HEADER: &str = "ngrok-skip-browser-warning";

const INTERSTITIAL: &str =
    "<!DOCTYPE html><html><body><h1>You are about to visit this site</h1></body></html>";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Body of POST and PUT. PUT replaces the whole record.
#[derive(Deserialize)]
pub struct ProductInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Products in insertion order.
pub type Db = Arc<RwLock<Vec<Product>>>;

type Rejection = (StatusCode, String);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Vec::new()));
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", put(update_product).delete(delete_product))
        .with_state(db)
        .layer(TraceLayer::new_for_http())
}

/// `app()` behind a simulated tunnel: requests without the bypass header get
/// the HTML interstitial with a 200, like the real service does.
pub fn app_behind_tunnel() -> Router {
    app().layer(middleware::from_fn(tunnel_interstitial))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

async fn tunnel_interstitial(request: Request, next: Next) -> Response {
    if request.headers().contains_key(TUNNEL_BYPASS_HEADER) {
        return next.run(request).await;
    }
    tracing::debug!(uri = %request.uri(), "serving tunnel interstitial");
    Html(INTERSTITIAL).into_response()
}

fn validate(input: &ProductInput) -> Result<String, Rejection> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "name is required".to_string()));
    }
    Ok(name.to_string())
}

fn not_found(id: &str) -> Rejection {
    (StatusCode::NOT_FOUND, format!("product {id} not found"))
}

async fn list_products(State(db): State<Db>) -> Json<Vec<Product>> {
    Json(db.read().await.clone())
}

async fn create_product(
    State(db): State<Db>,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>), Rejection> {
    let name = validate(&input)?;
    let product = Product {
        id: Uuid::new_v4().to_string(),
        name,
        price: input.price,
        description: input.description,
        image: input.image,
    };
    db.write().await.push(product.clone());
    tracing::info!(id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update_product(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>, Rejection> {
    let name = validate(&input)?;
    let mut products = db.write().await;
    let product = products
        .iter_mut()
        .find(|product| product.id == id)
        .ok_or_else(|| not_found(&id))?;
    product.name = name;
    product.price = input.price;
    product.description = input.description;
    product.image = input.image;
    Ok(Json(product.clone()))
}

async fn delete_product(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<StatusCode, Rejection> {
    let mut products = db.write().await;
    let index = products
        .iter()
        .position(|product| product.id == id)
        .ok_or_else(|| not_found(&id))?;
    products.remove(index);
    Ok(StatusCode::NO_CONTENT)
}
