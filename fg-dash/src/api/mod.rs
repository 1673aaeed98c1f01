//! HTTP API handlers for fg-dash

pub mod health;
pub mod ui;
pub mod views;

pub use health::health_routes;
pub use ui::serve_index;
pub use views::{
    profit_by_plan, receivable_aging, sales_by_customer, sales_by_product, sales_monthly,
};
