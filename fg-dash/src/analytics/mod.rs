//! Sales aggregation views
//!
//! Pure group/sum passes over fetched ERP rows. Every view recomputes
//! from the full row sets; rows are small enough that nothing here is
//! incremental.

pub mod aging;
pub mod profit;

use crate::erp::{Invoice, InvoiceLine, Partner, Product};
use crate::goals::{goal_for, MonthlyGoal};
use serde::Serialize;
use std::collections::HashMap;

/// Month-number axis labels, January first
pub const MONTH_LABELS: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Revenue per month for one year, with optional goal targets
#[derive(Debug, Serialize)]
pub struct MonthlyRevenue {
    pub year: i32,
    pub labels: Vec<&'static str>,
    pub revenue: Vec<f64>,
    /// One target per month, or absent when the goals workbook has none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals: Option<Vec<f64>>,
}

/// Group invoice totals onto the 1..=12 month axis of `year`
pub fn revenue_by_month(invoices: &[Invoice], goals: &[MonthlyGoal], year: i32) -> MonthlyRevenue {
    let mut revenue = vec![0.0; 12];
    for invoice in invoices {
        if let Some((inv_year, month)) = invoice.invoice_month() {
            if inv_year == year {
                revenue[(month - 1) as usize] += invoice.amount_total;
            }
        }
    }

    let targets: Vec<Option<f64>> = (1..=12).map(|m| goal_for(goals, year, m)).collect();
    let goals_series = if targets.iter().any(|t| t.is_some()) {
        Some(targets.into_iter().map(|t| t.unwrap_or(0.0)).collect())
    } else {
        None
    };

    MonthlyRevenue {
        year,
        labels: MONTH_LABELS.to_vec(),
        revenue,
        goals: goals_series,
    }
}

/// One labelled total, largest first in every view that uses it
#[derive(Debug, Serialize, PartialEq)]
pub struct NamedTotal {
    pub label: String,
    pub total: f64,
}

/// Revenue per product from invoice lines
pub fn revenue_by_product(lines: &[InvoiceLine], products: &[Product]) -> Vec<NamedTotal> {
    let names: HashMap<i64, &str> = products.iter().map(|p| (p.id, p.name.as_str())).collect();

    let mut totals: HashMap<String, f64> = HashMap::new();
    for line in lines {
        let label = match &line.product_id {
            Some(product) => names
                .get(&product.id)
                .map(|n| n.to_string())
                .unwrap_or_else(|| product.name.clone()),
            None => "Sin producto".to_string(),
        };
        *totals.entry(label).or_insert(0.0) += line.price_subtotal;
    }

    sorted_totals(totals)
}

/// Revenue per customer, annotated with the customer's region
#[derive(Debug, Serialize, PartialEq)]
pub struct CustomerRevenue {
    pub customer: String,
    pub region: String,
    pub total: f64,
}

/// Revenue per customer from invoice headers
pub fn revenue_by_customer(invoices: &[Invoice], partners: &[Partner]) -> Vec<CustomerRevenue> {
    let regions: HashMap<i64, &str> = partners
        .iter()
        .filter_map(|p| {
            p.state_id
                .as_ref()
                .map(|state| (p.id, state.name.as_str()))
        })
        .collect();

    let mut totals: HashMap<String, (String, f64)> = HashMap::new();
    for invoice in invoices {
        let Some(partner) = &invoice.partner_id else {
            continue;
        };
        let region = regions
            .get(&partner.id)
            .map(|r| r.to_string())
            .unwrap_or_else(|| "Sin región".to_string());
        let entry = totals
            .entry(partner.name.clone())
            .or_insert_with(|| (region, 0.0));
        entry.1 += invoice.amount_total;
    }

    let mut rows: Vec<CustomerRevenue> = totals
        .into_iter()
        .map(|(customer, (region, total))| CustomerRevenue {
            customer,
            region,
            total,
        })
        .collect();
    rows.sort_by(|a, b| b.total.total_cmp(&a.total).then(a.customer.cmp(&b.customer)));
    rows
}

fn sorted_totals(totals: HashMap<String, f64>) -> Vec<NamedTotal> {
    let mut rows: Vec<NamedTotal> = totals
        .into_iter()
        .map(|(label, total)| NamedTotal { label, total })
        .collect();
    rows.sort_by(|a, b| b.total.total_cmp(&a.total).then(a.label.cmp(&b.label)));
    rows
}
