//! Webhook ingress endpoint

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};

use crate::error::{AppError, Result};
use crate::metrics::WebhookMetrics;
use crate::server::AppState;

use super::models::{WebhookRequest, WebhookResponse};

/// POST /webhook/{host} - render the host's template and relay it to every chat
#[tracing::instrument(name = "http.webhook", skip_all, fields(host = %host))]
pub async fn receive_webhook(
    State(state): State<AppState>,
    Path(host): Path<String>,
    body: Bytes,
) -> Result<Json<WebhookResponse>> {
    // Parsed by hand so a missing content type is not rejected
    let request: WebhookRequest =
        serde_json::from_slice(&body).map_err(|e| AppError::InvalidPayload(e.to_string()))?;

    let resolved = state.dispatcher.registry().lookup_host(&host).is_some();
    WebhookMetrics::record_received(resolved.then_some(host.as_str()));

    let message_type = request.message_type().to_string();
    let payload = request.into_payload(&host);

    let report = state
        .dispatcher
        .dispatch(&host, &message_type, &payload)
        .await?;

    Ok(Json(WebhookResponse {
        status: "Message sent successfully".to_string(),
        host,
        message_type,
        delivered_to: report.delivered_to,
    }))
}
