//! Typed rows for the ERP collections the dashboard reads
//!
//! Odoo's `search_read` returns `false` for empty scalar fields and
//! `[id, "Display Name"]` pairs for many2one references, so every optional
//! field needs a lenient deserializer.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A many2one reference: record id plus display name
#[derive(Debug, Clone, PartialEq)]
pub struct ManyRef {
    pub id: i64,
    pub name: String,
}

/// Deserialize Odoo's `[id, name]` / `false` many2one encoding
pub fn de_many_ref<'de, D>(deserializer: D) -> Result<Option<ManyRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) if items.len() == 2 => Some(ManyRef {
            id: items[0].as_i64().unwrap_or(0),
            name: items[1].as_str().unwrap_or_default().to_string(),
        }),
        _ => None,
    })
}

/// Deserialize Odoo's `false`-means-empty string encoding
pub fn de_falsy_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    })
}

/// Customer invoice header (`account.invoice`)
#[derive(Debug, Clone, Deserialize)]
pub struct Invoice {
    pub id: i64,
    #[serde(default, deserialize_with = "de_falsy_string")]
    pub number: Option<String>,
    #[serde(default, deserialize_with = "de_many_ref")]
    pub partner_id: Option<ManyRef>,
    #[serde(default, deserialize_with = "de_falsy_string")]
    pub date_invoice: Option<String>,
    #[serde(default, deserialize_with = "de_falsy_string")]
    pub date_due: Option<String>,
    #[serde(default)]
    pub amount_total: f64,
    #[serde(default)]
    pub residual: f64,
    #[serde(default)]
    pub state: String,
}

impl Invoice {
    pub fn invoice_date(&self) -> Option<NaiveDate> {
        parse_date(self.date_invoice.as_deref()?)
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        parse_date(self.date_due.as_deref()?)
    }

    /// (year, month) of the invoice date
    pub fn invoice_month(&self) -> Option<(i32, u32)> {
        use chrono::Datelike;
        self.invoice_date().map(|d| (d.year(), d.month()))
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Invoice line (`account.invoice.line`)
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceLine {
    pub id: i64,
    #[serde(default, deserialize_with = "de_many_ref")]
    pub invoice_id: Option<ManyRef>,
    #[serde(default, deserialize_with = "de_many_ref")]
    pub product_id: Option<ManyRef>,
    #[serde(default, deserialize_with = "de_many_ref")]
    pub account_analytic_id: Option<ManyRef>,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub price_subtotal: f64,
}

/// Customer (`res.partner`)
#[derive(Debug, Clone, Deserialize)]
pub struct Partner {
    pub id: i64,
    pub name: String,
    /// Region/state reference; the region mapping for by-customer revenue
    #[serde(default, deserialize_with = "de_many_ref")]
    pub state_id: Option<ManyRef>,
}

/// Product (`product.product`)
#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default, rename = "type")]
    pub product_type: String,
}

/// Analytic account (`account.analytic.account`)
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticAccount {
    pub id: i64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn many_ref_parses_pair_and_false() {
        let invoice: Invoice = serde_json::from_str(
            r#"{
                "id": 7,
                "number": "INV/2024/0007",
                "partner_id": [42, "Distribuidora Sol"],
                "date_invoice": "2024-03-15",
                "date_due": false,
                "amount_total": 1500.5,
                "residual": 200.0,
                "state": "open"
            }"#,
        )
        .unwrap();

        let partner = invoice.partner_id.as_ref().unwrap();
        assert_eq!(partner.id, 42);
        assert_eq!(partner.name, "Distribuidora Sol");
        assert_eq!(invoice.date_due, None);
        assert_eq!(invoice.invoice_month(), Some((2024, 3)));
    }

    #[test]
    fn falsy_strings_become_none() {
        let invoice: Invoice = serde_json::from_str(
            r#"{ "id": 1, "number": false, "state": "open" }"#,
        )
        .unwrap();
        assert_eq!(invoice.number, None);
        assert_eq!(invoice.amount_total, 0.0);
        assert_eq!(invoice.invoice_date(), None);
    }

    #[test]
    fn product_type_field_is_renamed() {
        let product: Product =
            serde_json::from_str(r#"{ "id": 3, "name": "Cemento", "type": "product" }"#).unwrap();
        assert_eq!(product.product_type, "product");
    }

    #[test]
    fn malformed_date_is_none() {
        let invoice: Invoice = serde_json::from_str(
            r#"{ "id": 1, "date_invoice": "15/03/2024", "state": "open" }"#,
        )
        .unwrap();
        assert_eq!(invoice.invoice_date(), None);
    }
}
