// handlers/protected/payments.rs - checkout and payment history

use axum::extract::State;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::{Checkout, Payment, PaymentType, Settlement};
use crate::error::ApiError;
use crate::handlers::validate::FieldErrors;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ValidJson};
use crate::services::CheckoutService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub property_id: Option<Uuid>,
    /// `rent` or `purchase`
    pub action: Option<String>,
    pub amount: Option<Decimal>,
    pub phone_number: Option<String>,
}

fn parse_action(action: &str) -> Option<PaymentType> {
    match action.trim().to_ascii_lowercase().as_str() {
        "rent" => Some(PaymentType::Rent),
        "purchase" => Some(PaymentType::Purchase),
        _ => None,
    }
}

/// POST /api/payments
pub async fn create(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    ValidJson(body): ValidJson<PaymentRequest>,
) -> ApiResult<Settlement> {
    let payment_type = body.action.as_deref().and_then(parse_action);
    let phone_number = body.phone_number.filter(|p| !p.trim().is_empty());

    let mut errors = FieldErrors::new();
    if let Some(amount) = body.amount {
        errors.money("amount", amount);
    }
    errors
        .check("property_id", body.property_id.is_some(), "property_id is required")
        .check("action", payment_type.is_some(), "action must be 'rent' or 'purchase'")
        .check("amount", body.amount.is_some(), "amount is required")
        .check(
            "phone_number",
            phone_number
                .as_deref()
                .map(|p| p.chars().all(|c| c.is_ascii_digit() || c == '+'))
                .unwrap_or(true),
            "phone_number must contain only digits",
        )
        .finish("Invalid payment")?;

    let (Some(property_id), Some(payment_type), Some(amount)) = (body.property_id, payment_type, body.amount) else {
        return Err(ApiError::bad_request("Invalid payment"));
    };

    let checkout = Checkout { property_id, payer_id: claims.sub, payment_type, amount };
    let settlement = CheckoutService::new(state.store.as_ref(), state.transfers.as_ref(), &state.currency)
        .run(checkout, phone_number)
        .await?;

    Ok(ApiResponse::created(settlement))
}

/// GET /api/payments - caller's payments, newest first
pub async fn history(State(state): State<AppState>, AuthUser(claims): AuthUser) -> ApiResult<Vec<Payment>> {
    let payments = state.store.list_payments_by_user(claims.sub).await?;
    Ok(ApiResponse::success(payments))
}
