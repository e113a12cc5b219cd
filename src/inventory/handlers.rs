use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use bytes::Bytes;
use tracing::{info, instrument};

use super::{
    dto::{
        AddSequenceRequest, ImportSummary, ListQuery, RemoveQuery, TruncateQuery,
        UpdateSequenceRequest, WeekQuery,
    },
    export::{
        attachment_disposition, build_workbook, Column, ALL_COLUMNS, WEEK_COLUMNS, XLSX_CONTENT_TYPE,
    },
    import::{parse_workbook, week_from_filename},
    repo_types::{InventoryItem, TruncateOutcome},
    services::{group_by_week, WeekGroup},
};
use crate::{
    auth::{AdminUser, CurrentUser},
    envelope::Envelope,
    error::{ApiError, ApiResult},
    state::AppState,
};

const IMPORT_BODY_LIMIT: usize = 20 * 1024 * 1024; // 20MB

/// Week labels that belong to the dedicated line export.
const LINE_EXPORT_WEEKS: &[&str] = &["Boa", "Viper"];

pub fn sequence_routes() -> Router<AppState> {
    Router::new()
        .route("/sequences/list", get(list_sequences))
        .route("/sequences/weeks", get(list_weeks))
        .route("/sequences/update", put(update_sequence))
        .route("/sequences/remove", delete(remove_sequence))
        .route("/sequences/week", get(export_week))
        .route("/sequences/export", get(export_all))
        .route("/sequences/truncate/week", delete(truncate_week))
}

pub fn line_routes() -> Router<AppState> {
    Router::new()
        .route("/boa/add", post(add_sequence))
        .route("/boa/export", get(export_line_weeks))
        .route(
            "/boa/import",
            post(import_sequences).layer(DefaultBodyLimit::max(IMPORT_BODY_LIMIT)),
        )
}

// --- panel ---

#[instrument(skip(state, _user))]
pub async fn list_sequences(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(q): Query<ListQuery>,
) -> ApiResult<Envelope<Vec<InventoryItem>>> {
    let week = q.week.as_deref().map(str::trim).filter(|w| !w.is_empty());
    let items = InventoryItem::list(&state.db, week).await?;
    Ok(Envelope::ok("Inventory fetched successfully", items))
}

#[instrument(skip_all)]
pub async fn list_weeks(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> ApiResult<Envelope<Vec<WeekGroup>>> {
    let items = InventoryItem::list(&state.db, None).await?;
    Ok(Envelope::ok("Inventory fetched successfully", group_by_week(items)))
}

#[instrument(skip_all)]
pub async fn update_sequence(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdateSequenceRequest>,
) -> ApiResult<Envelope<InventoryItem>> {
    payload.patch.validate()?;

    let item = InventoryItem::update(&state.db, payload.id, &payload.patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Sequence not found"))?;

    info!(user_id = %user.id, item_id = %item.id, "sequence updated");
    Ok(Envelope::ok("Inventory updated successfully", item))
}

#[instrument(skip(state, user))]
pub async fn remove_sequence(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(q): Query<RemoveQuery>,
) -> ApiResult<Envelope<()>> {
    if InventoryItem::delete(&state.db, q.packing_id).await? == 0 {
        return Err(ApiError::not_found("Sequence not found"));
    }
    info!(user_id = %user.id, item_id = %q.packing_id, "sequence removed");
    Ok(Envelope::message("Sequence removed"))
}

#[instrument(skip(state, admin))]
pub async fn truncate_week(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(q): Query<TruncateQuery>,
) -> ApiResult<Envelope<TruncateOutcome>> {
    let week = q.week.trim();
    if week.is_empty() {
        return Err(ApiError::bad_request("Week is required"));
    }

    let outcome = InventoryItem::truncate_week(&state.db, week, q.save_backup).await?;
    info!(
        admin_id = %admin.id,
        week,
        archived = outcome.archived,
        deleted = outcome.deleted,
        "week truncated"
    );
    Ok(Envelope::ok("Inventory truncated", outcome))
}

// --- exports ---

#[instrument(skip(state, _user))]
pub async fn export_week(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Query(q): Query<WeekQuery>,
) -> ApiResult<Response> {
    let week = q.week.trim();
    if week.is_empty() {
        return Err(ApiError::bad_request("Week is required"));
    }
    let items = InventoryItem::list(&state.db, Some(week)).await?;
    xlsx_response(week, WEEK_COLUMNS, &items)
}

#[instrument(skip_all)]
pub async fn export_all(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> ApiResult<Response> {
    let items = InventoryItem::list(&state.db, None).await?;
    xlsx_response("TMP-Inventory", ALL_COLUMNS, &items)
}

#[instrument(skip_all)]
pub async fn export_line_weeks(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
) -> ApiResult<Response> {
    let items = InventoryItem::list_by_week_containing(&state.db, LINE_EXPORT_WEEKS).await?;
    xlsx_response("Viper & Boa", WEEK_COLUMNS, &items)
}

fn xlsx_response(name: &str, columns: &[Column], items: &[InventoryItem]) -> ApiResult<Response> {
    let bytes = build_workbook(name, columns, items)?;
    let disposition = HeaderValue::from_str(&attachment_disposition(name))
        .map_err(|e| ApiError::Internal(e.into()))?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

// --- line ---

#[instrument(skip_all)]
pub async fn add_sequence(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<AddSequenceRequest>,
) -> ApiResult<Envelope<InventoryItem>> {
    let new = payload.into_new_item()?;
    let item = InventoryItem::create(&state.db, &new).await?;
    info!(user_id = %user.id, item_id = %item.id, week = %item.week, "sequence added");
    Ok(Envelope::ok("Successfully added", item))
}

/// POST /boa/import (multipart, field `files`)
#[instrument(skip(state, user, mp))]
pub async fn import_sequences(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    mut mp: Multipart,
) -> ApiResult<Envelope<ImportSummary<InventoryItem>>> {
    let mut upload: Option<(String, Bytes)> = None;
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        let name = field.name().unwrap_or_default();
        if name == "files" || name == "files[]" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            upload = Some((file_name, data));
            break;
        }
    }

    let Some((file_name, data)) = upload else {
        return Err(ApiError::bad_request("files is required"));
    };
    if data.is_empty() {
        return Err(ApiError::bad_request("File is empty"));
    }

    let week = week_from_filename(&file_name);
    if week.is_empty() {
        return Err(ApiError::bad_request("File name is required"));
    }

    let rows = parse_workbook(&data, &week)
        .map_err(|e| ApiError::bad_request(format!("Invalid spreadsheet: {e:#}")))?;
    if rows.is_empty() {
        return Err(ApiError::bad_request("File is empty"));
    }

    let items = InventoryItem::create_many(&state.db, &rows).await?;
    info!(user_id = %user.id, %week, rows = items.len(), "sequences imported");
    Ok(Envelope::ok(
        "File uploaded successfully",
        ImportSummary { week, items },
    ))
}
