//! fg-dash library - sales analytics dashboard service
//!
//! Read-only views over ERP invoicing data: monthly revenue against
//! goals, revenue by product and by customer, receivable aging, and
//! profit by analytic plan. ERP reads sit behind a TTL cache.

use axum::Router;
use std::sync::Arc;
use std::time::Duration;

pub mod analytics;
pub mod api;
pub mod cache;
pub mod erp;
pub mod error;
pub mod goals;

use cache::TtlCache;
use erp::{AnalyticAccount, ErpClient, ErpError, Invoice, InvoiceLine, Partner, Product};
use goals::MonthlyGoal;

/// One TTL cache slot per ERP collection
pub struct Caches {
    pub invoices: TtlCache<Vec<Invoice>>,
    pub lines: TtlCache<Vec<InvoiceLine>>,
    pub partners: TtlCache<Vec<Partner>>,
    pub products: TtlCache<Vec<Product>>,
    pub accounts: TtlCache<Vec<AnalyticAccount>>,
}

impl Caches {
    pub fn new(ttl: Duration) -> Self {
        Self {
            invoices: TtlCache::new(ttl),
            lines: TtlCache::new(ttl),
            partners: TtlCache::new(ttl),
            products: TtlCache::new(ttl),
            accounts: TtlCache::new(ttl),
        }
    }
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// ERP JSON-RPC client
    pub erp: Arc<ErpClient>,
    /// TTL caches over the ERP fetchers
    pub caches: Arc<Caches>,
    /// Monthly sales targets, loaded at startup (empty when absent)
    pub goals: Arc<Vec<MonthlyGoal>>,
}

impl AppState {
    pub fn new(erp: ErpClient, cache_ttl: Duration, goals: Vec<MonthlyGoal>) -> Self {
        Self {
            erp: Arc::new(erp),
            caches: Arc::new(Caches::new(cache_ttl)),
            goals: Arc::new(goals),
        }
    }

    /// Cached invoice headers
    pub async fn invoices(&self) -> Result<Vec<Invoice>, ErpError> {
        if let Some(rows) = self.caches.invoices.get().await {
            return Ok(rows);
        }
        let rows = self.erp.fetch_invoices().await?;
        self.caches.invoices.put(rows.clone()).await;
        Ok(rows)
    }

    /// Cached invoice lines
    pub async fn invoice_lines(&self) -> Result<Vec<InvoiceLine>, ErpError> {
        if let Some(rows) = self.caches.lines.get().await {
            return Ok(rows);
        }
        let rows = self.erp.fetch_invoice_lines().await?;
        self.caches.lines.put(rows.clone()).await;
        Ok(rows)
    }

    /// Cached customers
    pub async fn partners(&self) -> Result<Vec<Partner>, ErpError> {
        if let Some(rows) = self.caches.partners.get().await {
            return Ok(rows);
        }
        let rows = self.erp.fetch_partners().await?;
        self.caches.partners.put(rows.clone()).await;
        Ok(rows)
    }

    /// Cached products
    pub async fn products(&self) -> Result<Vec<Product>, ErpError> {
        if let Some(rows) = self.caches.products.get().await {
            return Ok(rows);
        }
        let rows = self.erp.fetch_products().await?;
        self.caches.products.put(rows.clone()).await;
        Ok(rows)
    }

    /// Cached analytic accounts
    pub async fn analytic_accounts(&self) -> Result<Vec<AnalyticAccount>, ErpError> {
        if let Some(rows) = self.caches.accounts.get().await {
            return Ok(rows);
        }
        let rows = self.erp.fetch_analytic_accounts().await?;
        self.caches.accounts.put(rows.clone()).await;
        Ok(rows)
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;
    use tower_http::trace::TraceLayer;

    Router::new()
        .route("/", get(api::serve_index))
        .route("/api/sales/monthly", get(api::sales_monthly))
        .route("/api/sales/by-product", get(api::sales_by_product))
        .route("/api/sales/by-customer", get(api::sales_by_customer))
        .route("/api/sales/aging", get(api::receivable_aging))
        .route("/api/sales/profit", get(api::profit_by_plan))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
