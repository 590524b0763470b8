//! Order confirmation route handler.

use axum::{
    extract::{Path, Query},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tillpoint_core::OrderId;

use super::Success;
use crate::actions::checkout::clear_checkout;
use crate::error::Result;
use crate::middleware::SessionContext;
use crate::paths;

/// Query string of the confirmation page.
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmationQuery {
    /// Set only on the first visit, straight after the order was placed.
    #[serde(rename = "orderPlaced")]
    pub order_placed: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub order_id: OrderId,
}

/// Order confirmation.
///
/// Arriving with the order-placed marker clears the visitor's checkout and
/// redirects to the same page without the marker, so a reload never clears
/// anything twice.
#[instrument(skip_all, fields(order_id = %order_id))]
pub async fn confirmation(
    ctx: SessionContext,
    Path((_locale, order_id)): Path<(String, String)>,
    Query(query): Query<ConfirmationQuery>,
) -> Result<Response> {
    let order_id = OrderId::new(order_id);

    if query.order_placed.is_some() {
        clear_checkout(&ctx).await;
        let href = paths::order_confirmation(ctx.locale, &order_id, false);
        return Ok(Redirect::to(&href).into_response());
    }

    Ok(Success::new(Confirmation { order_id }).into_response())
}
