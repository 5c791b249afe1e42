//! Card processor endpoints: PaymentIntent creation, purchase confirmation
//! and the webhook receiver.

use academy_core::error::CoreError;
use academy_core::types::DbId;
use academy_payments::webhook::parse_event;
use academy_payments::{IntentRequest, WebhookEvent};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::optional_json;
use crate::purchase::{self, PurchasableItem, PurchaseRecord};
use crate::response::{DataResponse, MessageResponse};
use crate::state::AppState;

const SIGNATURE_HEADER: &str = "stripe-signature";

/// Body of the confirm-payment endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub payment_intent_id: Option<String>,
}

/// What the client needs to complete a card payment.
#[derive(Debug, Serialize)]
pub struct PaymentIntentResponse {
    pub client_secret: Option<String>,
    pub publishable_key: Option<String>,
}

/// Create a PaymentIntent for `item` on behalf of `user_id`.
pub(crate) async fn start_intent(
    state: &AppState,
    user_id: DbId,
    item: &PurchasableItem,
) -> AppResult<Json<DataResponse<PaymentIntentResponse>>> {
    let processor = state.processor.as_deref().ok_or_else(|| {
        AppError::Core(CoreError::Internal("Stripe not configured on server.".into()))
    })?;

    if item.is_free() {
        return Err(AppError::BadRequest(format!(
            "This {} is free.",
            item.kind().as_str()
        )));
    }

    let request = IntentRequest {
        kind: item.kind(),
        item_id: item.id(),
        item_title: item.title().to_string(),
        user_id,
        amount_cents: item.price_cents(),
    };
    let intent = processor
        .create_intent(&request)
        .await
        .map_err(|e| AppError::InternalError(format!("PaymentIntent creation failed: {e}")))?;

    tracing::info!(
        user_id,
        item_id = item.id(),
        kind = item.kind().as_str(),
        payment_reference = %intent.id,
        "PaymentIntent created"
    );

    Ok(Json(DataResponse {
        data: PaymentIntentResponse {
            client_secret: intent.client_secret,
            publishable_key: state.stripe_publishable_key.clone(),
        },
    }))
}

/// Confirm a purchase from a raw (possibly empty) request body.
pub(crate) async fn confirm_from_body(
    state: &AppState,
    user_id: DbId,
    item: &PurchasableItem,
    body: &Bytes,
) -> AppResult<(StatusCode, Json<DataResponse<PurchaseRecord>>)> {
    let input: ConfirmPaymentRequest = optional_json(body)?;
    let (status, record) =
        purchase::confirm(state, user_id, item, input.payment_intent_id.as_deref()).await?;
    Ok((status, Json(DataResponse { data: record })))
}

/// POST /api/v1/payments/webhook
///
/// Reads the raw body so the signature can be checked over the exact bytes.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let event = parse_event(
        &body,
        signature,
        state.stripe_webhook_secret.as_deref(),
        chrono::Utc::now().timestamp(),
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "Rejected webhook delivery");
        AppError::BadRequest(format!("Invalid webhook: {e}"))
    })?;

    match event {
        WebhookEvent::Payment(notice) => {
            let activated = purchase::reconcile_notice(&state, &notice).await?;
            tracing::info!(
                user_id = notice.user_id,
                item_id = notice.item_id,
                kind = notice.kind.as_str(),
                activated,
                "Webhook payment reconciled"
            );
        }
        WebhookEvent::Ignored { event_type } => {
            tracing::debug!(%event_type, "Ignoring webhook event");
        }
    }

    Ok(Json(DataResponse {
        data: MessageResponse::new("Webhook received."),
    }))
}
