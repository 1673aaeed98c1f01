//! Receivable aging ladder

use crate::erp::Invoice;
use chrono::NaiveDate;
use serde::Serialize;

/// Fixed aging buckets, oldest debt last
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgingBucket {
    NotYetDue,
    UpTo30,
    UpTo60,
    UpTo90,
    Over90,
}

impl AgingBucket {
    pub const ALL: [AgingBucket; 5] = [
        AgingBucket::NotYetDue,
        AgingBucket::UpTo30,
        AgingBucket::UpTo60,
        AgingBucket::UpTo90,
        AgingBucket::Over90,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AgingBucket::NotYetDue => "Por Vencer",
            AgingBucket::UpTo30 => "0-30",
            AgingBucket::UpTo60 => "31-60",
            AgingBucket::UpTo90 => "61-90",
            AgingBucket::Over90 => "+90",
        }
    }

    /// Bucket for a number of days past due; zero or negative is not yet due
    pub fn for_days_overdue(days: i64) -> AgingBucket {
        match days {
            d if d <= 0 => AgingBucket::NotYetDue,
            1..=30 => AgingBucket::UpTo30,
            31..=60 => AgingBucket::UpTo60,
            61..=90 => AgingBucket::UpTo90,
            _ => AgingBucket::Over90,
        }
    }
}

/// Outstanding residual per aging bucket
#[derive(Debug, Serialize)]
pub struct AgingView {
    pub labels: Vec<&'static str>,
    pub amounts: Vec<f64>,
}

/// Group open residual amounts into the aging ladder as of `today`
///
/// Invoices without a due date fall back to the invoice date; ones with
/// neither are unplaceable and skipped.
pub fn receivable_aging(invoices: &[Invoice], today: NaiveDate) -> AgingView {
    let mut amounts = vec![0.0; AgingBucket::ALL.len()];
    for invoice in invoices {
        if invoice.state != "open" || invoice.residual <= 0.0 {
            continue;
        }
        let Some(due) = invoice.due_date().or_else(|| invoice.invoice_date()) else {
            continue;
        };
        let days = (today - due).num_days();
        let bucket = AgingBucket::for_days_overdue(days);
        let index = AgingBucket::ALL
            .iter()
            .position(|b| *b == bucket)
            .unwrap_or(0);
        amounts[index] += invoice.residual;
    }

    AgingView {
        labels: AgingBucket::ALL.iter().map(|b| b.label()).collect(),
        amounts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ladder_boundaries() {
        assert_eq!(AgingBucket::for_days_overdue(-5), AgingBucket::NotYetDue);
        assert_eq!(AgingBucket::for_days_overdue(0), AgingBucket::NotYetDue);
        assert_eq!(AgingBucket::for_days_overdue(1), AgingBucket::UpTo30);
        assert_eq!(AgingBucket::for_days_overdue(30), AgingBucket::UpTo30);
        assert_eq!(AgingBucket::for_days_overdue(31), AgingBucket::UpTo60);
        assert_eq!(AgingBucket::for_days_overdue(60), AgingBucket::UpTo60);
        assert_eq!(AgingBucket::for_days_overdue(61), AgingBucket::UpTo90);
        assert_eq!(AgingBucket::for_days_overdue(90), AgingBucket::UpTo90);
        assert_eq!(AgingBucket::for_days_overdue(91), AgingBucket::Over90);
        assert_eq!(AgingBucket::for_days_overdue(365), AgingBucket::Over90);
    }

    fn open_invoice(id: i64, due: &str, residual: f64) -> Invoice {
        serde_json::from_value(json!({
            "id": id,
            "date_due": due,
            "residual": residual,
            "state": "open"
        }))
        .unwrap()
    }

    #[test]
    fn residuals_group_by_bucket() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let invoices = vec![
            open_invoice(1, "2024-07-15", 100.0), // not yet due
            open_invoice(2, "2024-06-15", 50.0),  // 15 days
            open_invoice(3, "2024-06-10", 25.0),  // 20 days
            open_invoice(4, "2024-01-01", 10.0),  // far past
        ];

        let view = receivable_aging(&invoices, today);
        assert_eq!(view.labels, vec!["Por Vencer", "0-30", "31-60", "61-90", "+90"]);
        assert_eq!(view.amounts[0], 100.0);
        assert_eq!(view.amounts[1], 75.0);
        assert_eq!(view.amounts[4], 10.0);
    }

    #[test]
    fn paid_and_dateless_invoices_are_excluded() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let paid: Invoice = serde_json::from_value(json!({
            "id": 1, "date_due": "2024-01-01", "residual": 0.0, "state": "paid"
        }))
        .unwrap();
        let dateless: Invoice = serde_json::from_value(json!({
            "id": 2, "date_due": false, "date_invoice": false,
            "residual": 40.0, "state": "open"
        }))
        .unwrap();

        let view = receivable_aging(&[paid, dateless], today);
        assert!(view.amounts.iter().all(|a| *a == 0.0));
    }
}
