use axum::Json;
use serde_json::{json, Value};

pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "matricula",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn health_check() -> &'static str {
    "OK"
}
