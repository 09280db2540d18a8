//! Monthly rent workbench routes.
//!
//! Every route addresses one company and month. The first request opens a workbench by
//! fetching the month from the database; later requests work on the cached workbench until
//! it is closed or goes idle.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use rentbook_core::rents::{
    NewPayable, NewReceivable, Payable, PayableEdit, ReceivableEdit, RentPeriod, RentScope,
    SaveReport, ToggleOutcome, Unoccupied, WorkbenchView,
};
use rentbook_shared::AppError;
use rentbook_shared::types::{CompanyId, PayableId, PropertyId};

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::workbenches::{SharedWorkbench, WorkbenchKey};

const BASE: &str = "/companies/{company_id}/rents/{year}/{month}";

/// Creates the rent workbench routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(BASE, get(get_workbench).delete(close_workbench))
        .route(&format!("{BASE}/refresh"), post(refresh))
        .route(&format!("{BASE}/discard"), post(discard))
        .route(&format!("{BASE}/sync"), post(sync))
        .route(&format!("{BASE}/save"), post(save))
        .route(
            &format!("{BASE}/properties/{{property_id}}/receivables"),
            post(add_receivable),
        )
        .route(
            &format!("{BASE}/properties/{{property_id}}/receivables/{{index}}"),
            patch(edit_receivable).delete(remove_receivable),
        )
        .route(
            &format!("{BASE}/properties/{{property_id}}/payables/{{index}}"),
            patch(edit_payable),
        )
        .route(&format!("{BASE}/payables"), post(create_payables))
        .route(&format!("{BASE}/payables/{{payable_id}}"), delete(delete_payable))
        .route(
            &format!("{BASE}/properties/{{property_id}}/unoccupied/toggle"),
            post(toggle_unoccupied),
        )
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Company and month addressed by a route.
#[derive(Debug, Deserialize)]
pub struct PeriodPath {
    /// Company.
    pub company_id: CompanyId,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
}

/// A property within the addressed month.
#[derive(Debug, Deserialize)]
pub struct PropertyPath {
    /// Company.
    pub company_id: CompanyId,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// Property.
    pub property_id: PropertyId,
}

/// A row of a property within the addressed month.
#[derive(Debug, Deserialize)]
pub struct RowPath {
    /// Company.
    pub company_id: CompanyId,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// Property.
    pub property_id: PropertyId,
    /// Position of the row within the property.
    pub index: usize,
}

/// A payable within the addressed month.
#[derive(Debug, Deserialize)]
pub struct PayablePath {
    /// Company.
    pub company_id: CompanyId,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// Payable.
    pub payable_id: PayableId,
}

/// Request body for a manual receivable.
#[derive(Debug, Deserialize)]
pub struct AddReceivableRequest {
    /// Tenant or charge name.
    pub name: String,
    /// Amount owed.
    pub amount_due: Decimal,
    /// Amount already paid.
    #[serde(default)]
    pub amount_paid: Decimal,
    /// Due date; must fall inside the month.
    pub due_date: NaiveDate,
    /// Date fully paid.
    #[serde(default)]
    pub paid_by: Option<NaiveDate>,
}

/// Input for a single payable.
#[derive(Debug, Deserialize)]
pub struct PayableInput {
    /// Property the expense belongs to.
    pub property_id: PropertyId,
    /// Expense name.
    pub name: String,
    /// Amount.
    pub amount: Decimal,
    /// Date paid; must fall inside the month.
    pub date: NaiveDate,
    /// Payment method.
    pub payment_method: String,
    /// Free-form detail.
    #[serde(default)]
    pub detail: Option<String>,
}

/// Request body for creating payables in bulk.
#[derive(Debug, Deserialize)]
pub struct CreatePayablesRequest {
    /// Payables to create.
    pub payables: Vec<PayableInput>,
}

/// Response for a save.
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    /// Per-row outcomes.
    pub report: SaveReport,
    /// Workbench after the save.
    pub view: WorkbenchView,
}

/// Response for a bulk payable create.
#[derive(Debug, Serialize)]
pub struct CreatePayablesResponse {
    /// Created payables with their ids.
    pub created: Vec<Payable>,
    /// Workbench after the create.
    pub view: WorkbenchView,
}

/// Response for an unoccupied toggle.
#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    /// `marked`, `cleared` or `refused`.
    pub outcome: &'static str,
    /// The new marker when one was created.
    pub marker: Option<Unoccupied>,
    /// Workbench after the toggle.
    pub view: WorkbenchView,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn workbench_key(company_id: CompanyId, year: i32, month: u32) -> ApiResult<WorkbenchKey> {
    Ok((company_id, RentPeriod::new(year, month)?))
}

/// Returns the open workbench for a company and month, fetching it on first use.
async fn open_workbench(state: &AppState, key: WorkbenchKey) -> ApiResult<SharedWorkbench> {
    let (company_id, period) = key;
    let properties = state.properties();
    let rents = state.rents.clone();

    state
        .workbenches
        .get_or_open(key, async move {
            if !properties.company_exists(company_id).await? {
                return Err(ApiError(AppError::NotFound(format!("company {company_id}"))));
            }
            let scope = RentScope::new(company_id, period, properties.list_active(company_id).await?);
            let workbench = rents.open(scope).await?;
            info!(company_id = %company_id, period = %period, "Opened rent workbench");
            Ok::<_, ApiError>(workbench)
        })
        .await
}

fn validate_payable(input: &PayableInput) -> ApiResult<()> {
    if input.name.trim().is_empty() {
        return Err(AppError::Validation("payable name is required".to_string()).into());
    }
    if input.amount < Decimal::ZERO {
        return Err(AppError::Validation(format!("payable '{}' has a negative amount", input.name)).into());
    }
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

async fn get_workbench(
    State(state): State<AppState>,
    Path(path): Path<PeriodPath>,
) -> ApiResult<Json<WorkbenchView>> {
    let key = workbench_key(path.company_id, path.year, path.month)?;
    let workbench = open_workbench(&state, key).await?;
    let view = workbench.lock().await.view();
    Ok(Json(view))
}

async fn close_workbench(
    State(state): State<AppState>,
    Path(path): Path<PeriodPath>,
) -> ApiResult<StatusCode> {
    let key = workbench_key(path.company_id, path.year, path.month)?;
    state.workbenches.close(&key).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn refresh(
    State(state): State<AppState>,
    Path(path): Path<PeriodPath>,
) -> ApiResult<Json<WorkbenchView>> {
    let key = workbench_key(path.company_id, path.year, path.month)?;
    let workbench = open_workbench(&state, key).await?;
    let mut workbench = workbench.lock().await;
    state.rents.refresh(&mut workbench).await?;
    Ok(Json(workbench.view()))
}

async fn discard(
    State(state): State<AppState>,
    Path(path): Path<PeriodPath>,
) -> ApiResult<Json<WorkbenchView>> {
    let key = workbench_key(path.company_id, path.year, path.month)?;
    let workbench = open_workbench(&state, key).await?;
    let mut workbench = workbench.lock().await;
    workbench.discard_edits();
    Ok(Json(workbench.view()))
}

async fn sync(
    State(state): State<AppState>,
    Path(path): Path<PeriodPath>,
) -> ApiResult<Json<WorkbenchView>> {
    let key = workbench_key(path.company_id, path.year, path.month)?;
    let workbench = open_workbench(&state, key).await?;
    let mut workbench = workbench.lock().await;
    let roster = state
        .tenants()
        .roster(&workbench.scope().property_ids())
        .await?;
    workbench.sync(&roster);
    Ok(Json(workbench.view()))
}

async fn save(
    State(state): State<AppState>,
    Path(path): Path<PeriodPath>,
) -> ApiResult<Json<SaveResponse>> {
    let key = workbench_key(path.company_id, path.year, path.month)?;
    let workbench = open_workbench(&state, key).await?;
    let mut workbench = workbench.lock_owned().await;
    let rents = state.rents.clone();

    // Detached so a dropped request cannot stop a save between its writes and the re-fetch.
    let response = tokio::spawn(async move {
        let report = rents.save(&mut workbench).await;
        SaveResponse {
            report,
            view: workbench.view(),
        }
    })
    .await
    .map_err(|e| ApiError(AppError::Internal(format!("save task failed: {e}"))))?;

    Ok(Json(response))
}

async fn add_receivable(
    State(state): State<AppState>,
    Path(path): Path<PropertyPath>,
    Json(request): Json<AddReceivableRequest>,
) -> ApiResult<(StatusCode, Json<WorkbenchView>)> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("receivable name is required".to_string()).into());
    }
    let key = workbench_key(path.company_id, path.year, path.month)?;
    if !key.1.window().contains(request.due_date) {
        return Err(AppError::Validation(format!(
            "due date {} is outside {}",
            request.due_date, key.1
        ))
        .into());
    }
    let workbench = open_workbench(&state, key).await?;
    let mut workbench = workbench.lock().await;
    workbench.add_receivable(NewReceivable {
        property_id: path.property_id,
        amount_paid: request.amount_paid,
        amount_due: request.amount_due,
        due_date: request.due_date,
        paid_by: request.paid_by,
        name: request.name,
    })?;
    Ok((StatusCode::CREATED, Json(workbench.view())))
}

async fn edit_receivable(
    State(state): State<AppState>,
    Path(path): Path<RowPath>,
    Json(edit): Json<ReceivableEdit>,
) -> ApiResult<Json<WorkbenchView>> {
    let key = workbench_key(path.company_id, path.year, path.month)?;
    let workbench = open_workbench(&state, key).await?;
    let mut workbench = workbench.lock().await;
    workbench.edit_receivable(path.property_id, path.index, &edit)?;
    Ok(Json(workbench.view()))
}

async fn remove_receivable(
    State(state): State<AppState>,
    Path(path): Path<RowPath>,
) -> ApiResult<Json<WorkbenchView>> {
    let key = workbench_key(path.company_id, path.year, path.month)?;
    let workbench = open_workbench(&state, key).await?;
    let mut workbench = workbench.lock().await;
    state
        .rents
        .remove_receivable(&mut workbench, path.property_id, path.index)
        .await?;
    Ok(Json(workbench.view()))
}

async fn edit_payable(
    State(state): State<AppState>,
    Path(path): Path<RowPath>,
    Json(edit): Json<PayableEdit>,
) -> ApiResult<Json<WorkbenchView>> {
    let key = workbench_key(path.company_id, path.year, path.month)?;
    let workbench = open_workbench(&state, key).await?;
    let mut workbench = workbench.lock().await;
    workbench.edit_payable(path.property_id, path.index, &edit)?;
    Ok(Json(workbench.view()))
}

async fn create_payables(
    State(state): State<AppState>,
    Path(path): Path<PeriodPath>,
    Json(request): Json<CreatePayablesRequest>,
) -> ApiResult<(StatusCode, Json<CreatePayablesResponse>)> {
    for input in &request.payables {
        validate_payable(input)?;
    }
    let key = workbench_key(path.company_id, path.year, path.month)?;
    let workbench = open_workbench(&state, key).await?;
    let mut workbench = workbench.lock().await;

    let rows = request
        .payables
        .into_iter()
        .map(|p| NewPayable {
            property_id: p.property_id,
            name: p.name,
            amount: p.amount,
            date: p.date,
            payment_method: p.payment_method,
            detail: p.detail,
        })
        .collect();
    let created = state.rents.create_payables(&mut workbench, rows).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatePayablesResponse {
            created,
            view: workbench.view(),
        }),
    ))
}

async fn delete_payable(
    State(state): State<AppState>,
    Path(path): Path<PayablePath>,
) -> ApiResult<Json<WorkbenchView>> {
    let key = workbench_key(path.company_id, path.year, path.month)?;
    let workbench = open_workbench(&state, key).await?;
    let mut workbench = workbench.lock().await;
    if !state.rents.delete_payable(&mut workbench, path.payable_id).await? {
        return Err(AppError::NotFound(format!("payable {}", path.payable_id)).into());
    }
    Ok(Json(workbench.view()))
}

async fn toggle_unoccupied(
    State(state): State<AppState>,
    Path(path): Path<PropertyPath>,
) -> ApiResult<Json<ToggleResponse>> {
    let key = workbench_key(path.company_id, path.year, path.month)?;
    let workbench = open_workbench(&state, key).await?;
    let mut workbench = workbench.lock().await;

    let tenant_count = state.tenants().count_for_property(path.property_id).await?;
    let tenant_count = usize::try_from(tenant_count)
        .map_err(|e| ApiError(AppError::Internal(e.to_string())))?;
    let outcome = state
        .rents
        .toggle_unoccupied(&mut workbench, path.property_id, tenant_count)
        .await?;

    let (outcome, marker) = match outcome {
        ToggleOutcome::Marked(marker) => ("marked", Some(marker)),
        ToggleOutcome::Cleared => ("cleared", None),
        ToggleOutcome::Refused => ("refused", None),
    };
    Ok(Json(ToggleResponse {
        outcome,
        marker,
        view: workbench.view(),
    }))
}
