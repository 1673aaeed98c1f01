//! Profit by analytic plan, pivoted onto the month axis

use super::MONTH_LABELS;
use crate::erp::{AnalyticAccount, Invoice, InvoiceLine};
use serde::Serialize;
use std::collections::HashMap;

/// One analytic plan's monthly series
#[derive(Debug, Serialize, PartialEq)]
pub struct PlanSeries {
    pub plan: String,
    /// Twelve entries, January first
    pub monthly: Vec<f64>,
}

/// Plan-by-month pivot for one year
#[derive(Debug, Serialize)]
pub struct ProfitView {
    pub year: i32,
    pub labels: Vec<&'static str>,
    pub plans: Vec<PlanSeries>,
}

/// Pivot line subtotals into plan rows and month columns
///
/// The month comes from the parent invoice; lines whose invoice is not in
/// `invoices` (or has no date) are unplaceable and skipped. Plan names
/// resolve through `accounts`, falling back to the reference's display
/// name; lines without an analytic account group under "Sin plan".
pub fn profit_by_plan(
    lines: &[InvoiceLine],
    invoices: &[Invoice],
    accounts: &[AnalyticAccount],
    year: i32,
) -> ProfitView {
    let months: HashMap<i64, (i32, u32)> = invoices
        .iter()
        .filter_map(|inv| inv.invoice_month().map(|ym| (inv.id, ym)))
        .collect();
    let plan_names: HashMap<i64, &str> = accounts.iter().map(|a| (a.id, a.name.as_str())).collect();

    let mut pivot: HashMap<String, Vec<f64>> = HashMap::new();
    for line in lines {
        let Some(invoice) = &line.invoice_id else {
            continue;
        };
        let Some((inv_year, month)) = months.get(&invoice.id).copied() else {
            continue;
        };
        if inv_year != year {
            continue;
        }
        let plan = match &line.account_analytic_id {
            Some(account) => plan_names
                .get(&account.id)
                .map(|n| n.to_string())
                .unwrap_or_else(|| account.name.clone()),
            None => "Sin plan".to_string(),
        };
        let series = pivot.entry(plan).or_insert_with(|| vec![0.0; 12]);
        series[(month - 1) as usize] += line.price_subtotal;
    }

    let mut plans: Vec<PlanSeries> = pivot
        .into_iter()
        .map(|(plan, monthly)| PlanSeries { plan, monthly })
        .collect();
    plans.sort_by(|a, b| {
        let total_a: f64 = a.monthly.iter().sum();
        let total_b: f64 = b.monthly.iter().sum();
        total_b.total_cmp(&total_a).then(a.plan.cmp(&b.plan))
    });

    ProfitView {
        year,
        labels: MONTH_LABELS.to_vec(),
        plans,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::erp::ManyRef;
    use serde_json::json;

    fn invoice(id: i64, date: &str) -> Invoice {
        serde_json::from_value(json!({
            "id": id, "date_invoice": date, "state": "paid"
        }))
        .unwrap()
    }

    fn line(invoice_id: i64, plan: Option<i64>, subtotal: f64) -> InvoiceLine {
        InvoiceLine {
            id: 0,
            invoice_id: Some(ManyRef {
                id: invoice_id,
                name: String::new(),
            }),
            product_id: None,
            account_analytic_id: plan.map(|id| ManyRef {
                id,
                name: format!("ref {}", id),
            }),
            quantity: 1.0,
            price_subtotal: subtotal,
        }
    }

    fn accounts() -> Vec<AnalyticAccount> {
        vec![
            AnalyticAccount {
                id: 1,
                name: "Obra Norte".to_string(),
            },
            AnalyticAccount {
                id: 2,
                name: "Obra Sur".to_string(),
            },
        ]
    }

    #[test]
    fn pivot_places_subtotals_by_plan_and_month() {
        let invoices = vec![
            invoice(1, "2024-01-15"),
            invoice(2, "2024-02-15"),
            invoice(3, "2023-02-15"), // other year
        ];
        let lines = vec![
            line(1, Some(1), 100.0),
            line(2, Some(1), 40.0),
            line(2, Some(2), 300.0),
            line(3, Some(2), 999.0), // other year, skipped
            line(1, None, 5.0),
        ];

        let view = profit_by_plan(&lines, &invoices, &accounts(), 2024);
        assert_eq!(view.labels[1], "Febrero");
        assert_eq!(view.plans[0].plan, "Obra Sur");
        assert_eq!(view.plans[0].monthly[1], 300.0);
        assert_eq!(view.plans[1].plan, "Obra Norte");
        assert_eq!(view.plans[1].monthly[0], 100.0);
        assert_eq!(view.plans[1].monthly[1], 40.0);
        assert_eq!(view.plans[2].plan, "Sin plan");
    }

    #[test]
    fn unknown_account_falls_back_to_reference_name() {
        let invoices = vec![invoice(1, "2024-01-15")];
        let lines = vec![line(1, Some(77), 50.0)];

        let view = profit_by_plan(&lines, &invoices, &accounts(), 2024);
        assert_eq!(view.plans[0].plan, "ref 77");
    }

    #[test]
    fn lines_without_a_known_invoice_are_skipped() {
        let invoices = vec![invoice(1, "2024-01-15")];
        let lines = vec![line(99, Some(1), 100.0)];

        let view = profit_by_plan(&lines, &invoices, &accounts(), 2024);
        assert!(view.plans.is_empty());
    }
}
