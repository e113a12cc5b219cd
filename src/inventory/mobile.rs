//! Endpoints used by the handheld scanners on the line.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use time::OffsetDateTime;
use tracing::{info, instrument, warn};

use super::{
    dto::{MobileRemoveRequest, PackingQuery, ReportRequest},
    repo::Decrement,
    repo_types::InventoryItem,
    report::{archive, build_report},
    services::{build_packing_list, PackingEntry},
};
use crate::{
    auth::CurrentUser,
    envelope::Envelope,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn mobile_routes() -> Router<AppState> {
    Router::new()
        .route("/mobile/sequences/list", get(packing_list))
        .route("/mobile/sequences/remove", post(scan_unit))
        .route("/mobile/sequences/report", post(packing_report))
}

#[instrument(skip(state, _user))]
pub async fn packing_list(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(q): Query<PackingQuery>,
) -> ApiResult<Envelope<Vec<PackingEntry>>> {
    let packing = q
        .packing
        .ok_or_else(|| ApiError::bad_request("packing is required"))?;
    let items = InventoryItem::list_by_packing(&state.db, packing).await?;
    Ok(Envelope::ok(
        "Inventory fetched successfully",
        build_packing_list(items),
    ))
}

/// Take one unit off an item on behalf of the scanning employee.
#[instrument(skip_all)]
pub async fn scan_unit(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<MobileRemoveRequest>,
) -> ApiResult<Envelope<InventoryItem>> {
    let outcome =
        InventoryItem::decrement(&state.db, payload.packing_id, &user.employee_id).await?;
    let item = scanned_item(outcome)?;
    info!(
        item_id = %item.id,
        employee_id = %user.employee_id,
        remaining = item.quantity,
        "unit scanned"
    );
    Ok(Envelope::ok("Packing updated", item))
}

fn scanned_item(outcome: Decrement) -> ApiResult<InventoryItem> {
    match outcome {
        Decrement::Updated(item) => Ok(item),
        Decrement::Exhausted => Err(ApiError::Conflict("Packing already complete".into())),
        Decrement::NotFound => Err(ApiError::not_found("Packing not found")),
    }
}

/// Render the kit report as base64 PDF, archiving a copy when a reports dir is configured.
#[instrument(skip_all)]
pub async fn packing_report(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ReportRequest>,
) -> ApiResult<Envelope<String>> {
    let packing = payload.packing_id;
    let items = InventoryItem::list_by_packing(&state.db, packing).await?;
    let report = build_report(packing, &items, OffsetDateTime::now_utc())?;

    if let Some(dir) = &state.config.reports_dir {
        match archive(dir, packing, &report).await {
            Ok(path) => info!(path = %path.display(), "report archived"),
            Err(e) => warn!(error = %e, packing, "report archive failed"),
        }
    }

    info!(
        user_id = %user.id,
        packing,
        kind = report.kind.label(),
        "report generated"
    );
    Ok(Envelope::ok(
        "Report generated successfully",
        STANDARD.encode(&report.pdf),
    ))
}
