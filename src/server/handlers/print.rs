//! Print handlers.

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::error::BridgeError;
use crate::receipt::ReceiptContent;

use super::super::extract::ApiJson;
use super::super::response::ApiResult;
use super::super::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintRequest {
    #[serde(default)]
    pub text: Option<String>,
    /// Spooler queue to use ahead of the automatic choice
    #[serde(default)]
    pub printer_name: Option<String>,
}

fn success(message: String) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": message,
    }))
}

/// POST /api/print - plain text through the full fallback chain.
pub async fn print(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<PrintRequest>,
) -> ApiResult<Json<Value>> {
    let text = req
        .text
        .filter(|t| !t.is_empty())
        .ok_or_else(|| BridgeError::InvalidInput("Text field is required".into()))?;

    let message = state.service.print_plain(&text, req.printer_name).await?;
    Ok(success(message))
}

#[derive(Debug, Deserialize)]
pub struct ReceiptRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Line items; numbers and other scalars are printed as-is
    #[serde(default)]
    pub items: Option<Vec<Value>>,
}

impl ReceiptRequest {
    fn into_content(self) -> ReceiptContent {
        let items = self
            .items
            .unwrap_or_default()
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();
        ReceiptContent::new(self.title, self.text, items)
    }
}

/// POST /api/print/receipt - formatted receipt.
pub async fn receipt(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ReceiptRequest>,
) -> ApiResult<Json<Value>> {
    let content = req.into_content();
    let message = state.service.print_formatted(&content).await?;
    Ok(success(message))
}

/// POST /api/print/test - fixed self-test page.
pub async fn test(State(state): State<Arc<AppState>>) -> ApiResult<Json<Value>> {
    let message = state.service.print_test().await?;
    Ok(success(message))
}
