//! Sales view endpoints
//!
//! Each endpoint runs cached fetch → aggregate → chart-ready JSON. ERP
//! failures degrade to empty series with a `notice` the page can show;
//! the dashboard never answers 5xx for an unreachable ERP.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::analytics::{self, aging, profit};
use crate::erp::ErpError;
use crate::error::ApiResult;
use crate::AppState;

/// Optional year selector shared by the year-axis views
#[derive(Debug, Deserialize)]
pub struct YearParams {
    pub year: Option<i32>,
}

impl YearParams {
    fn year_or_current(&self) -> i32 {
        self.year.unwrap_or_else(|| Utc::now().year())
    }
}

/// Unwrap a fetch, folding a failure into empty rows plus a notice
fn rows_or_empty<T>(result: Result<Vec<T>, ErpError>, notice: &mut Option<String>) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(e) => {
            warn!("ERP fetch failed: {}", e);
            if notice.is_none() {
                *notice = Some(format!("ERP unavailable: {}", e));
            }
            Vec::new()
        }
    }
}

/// GET /api/sales/monthly
pub async fn sales_monthly(
    State(state): State<AppState>,
    Query(params): Query<YearParams>,
) -> ApiResult<Json<MonthlyResponse>> {
    let year = params.year_or_current();
    let mut notice = None;
    let invoices = rows_or_empty(state.invoices().await, &mut notice);

    let view = analytics::revenue_by_month(&invoices, &state.goals, year);
    Ok(Json(MonthlyResponse { view, notice }))
}

#[derive(Debug, Serialize)]
pub struct MonthlyResponse {
    #[serde(flatten)]
    pub view: analytics::MonthlyRevenue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// GET /api/sales/by-product
pub async fn sales_by_product(
    State(state): State<AppState>,
) -> ApiResult<Json<TotalsResponse>> {
    let mut notice = None;
    let lines = rows_or_empty(state.invoice_lines().await, &mut notice);
    let products = rows_or_empty(state.products().await, &mut notice);

    let rows = analytics::revenue_by_product(&lines, &products);
    let (labels, totals): (Vec<String>, Vec<f64>) =
        rows.into_iter().map(|r| (r.label, r.total)).unzip();
    Ok(Json(TotalsResponse {
        labels,
        totals,
        notice,
    }))
}

#[derive(Debug, Serialize)]
pub struct TotalsResponse {
    pub labels: Vec<String>,
    pub totals: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// GET /api/sales/by-customer
pub async fn sales_by_customer(
    State(state): State<AppState>,
) -> ApiResult<Json<CustomersResponse>> {
    let mut notice = None;
    let invoices = rows_or_empty(state.invoices().await, &mut notice);
    let partners = rows_or_empty(state.partners().await, &mut notice);

    let customers = analytics::revenue_by_customer(&invoices, &partners);
    Ok(Json(CustomersResponse { customers, notice }))
}

#[derive(Debug, Serialize)]
pub struct CustomersResponse {
    pub customers: Vec<analytics::CustomerRevenue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// GET /api/sales/aging
pub async fn receivable_aging(State(state): State<AppState>) -> ApiResult<Json<AgingResponse>> {
    let mut notice = None;
    let invoices = rows_or_empty(state.invoices().await, &mut notice);

    let view = aging::receivable_aging(&invoices, Utc::now().date_naive());
    Ok(Json(AgingResponse { view, notice }))
}

#[derive(Debug, Serialize)]
pub struct AgingResponse {
    #[serde(flatten)]
    pub view: aging::AgingView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// GET /api/sales/profit
pub async fn profit_by_plan(
    State(state): State<AppState>,
    Query(params): Query<YearParams>,
) -> ApiResult<Json<ProfitResponse>> {
    let year = params.year_or_current();
    let mut notice = None;
    let lines = rows_or_empty(state.invoice_lines().await, &mut notice);
    let invoices = rows_or_empty(state.invoices().await, &mut notice);
    let accounts = rows_or_empty(state.analytic_accounts().await, &mut notice);

    let view = profit::profit_by_plan(&lines, &invoices, &accounts, year);
    Ok(Json(ProfitResponse { view, notice }))
}

#[derive(Debug, Serialize)]
pub struct ProfitResponse {
    #[serde(flatten)]
    pub view: profit::ProfitView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}
