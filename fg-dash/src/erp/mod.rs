//! ERP JSON-RPC client
//!
//! Read-only Odoo-style access: every call authenticates with
//! `common.login` (no session reuse), then issues a domain-filtered
//! `search_read` with an explicit field projection through
//! `object.execute_kw`. This system never writes to the ERP.

pub mod records;

use fg_common::config::ErpConfig;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

pub use records::{AnalyticAccount, Invoice, InvoiceLine, ManyRef, Partner, Product};

/// ERP client errors
#[derive(Debug, Error)]
pub enum ErpError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("HTTP error {0}: {1}")]
    HttpError(u16, String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Authentication failed for database {0}")]
    AuthFailed(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// JSON-RPC 2.0 call envelope
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: CallParams<'a>,
    id: u32,
}

#[derive(Debug, Serialize)]
struct CallParams<'a> {
    service: &'a str,
    method: &'a str,
    args: Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// ERP JSON-RPC client
pub struct ErpClient {
    http_client: reqwest::Client,
    config: ErpConfig,
}

impl ErpClient {
    pub fn new(config: ErpConfig) -> Result<Self, ErpError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ErpError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// One raw JSON-RPC call against the `/jsonrpc` endpoint
    async fn call(&self, service: &str, method: &str, args: Value) -> Result<Value, ErpError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method: "call",
            params: CallParams {
                service,
                method,
                args,
            },
            id: 1,
        };

        let url = format!("{}/jsonrpc", self.config.url.trim_end_matches('/'));
        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ErpError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ErpError::HttpError(status.as_u16(), error_text));
        }

        let body: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| ErpError::ParseError(e.to_string()))?;

        if let Some(error) = body.error {
            let detail = error
                .data
                .as_ref()
                .and_then(|d| d.get("message"))
                .and_then(|m| m.as_str())
                .unwrap_or(&error.message)
                .to_string();
            return Err(ErpError::RpcError(detail));
        }

        body.result
            .ok_or_else(|| ErpError::ParseError("Response carried no result".to_string()))
    }

    /// Authenticate and return the user id
    ///
    /// Called once per read; the ERP contract here does not reuse sessions.
    async fn login(&self) -> Result<i64, ErpError> {
        let result = self
            .call(
                "common",
                "login",
                json!([self.config.db, self.config.username, self.config.password]),
            )
            .await?;

        // Odoo answers `false` for bad credentials
        result
            .as_i64()
            .ok_or_else(|| ErpError::AuthFailed(self.config.db.clone()))
    }

    /// Domain-filtered read with an explicit field projection
    pub async fn search_read(
        &self,
        model: &str,
        domain: Value,
        fields: &[&str],
    ) -> Result<Vec<Value>, ErpError> {
        let uid = self.login().await?;

        let result = self
            .call(
                "object",
                "execute_kw",
                json!([
                    self.config.db,
                    uid,
                    self.config.password,
                    model,
                    "search_read",
                    [domain],
                    { "fields": fields }
                ]),
            )
            .await?;

        match result {
            Value::Array(rows) => Ok(rows),
            other => Err(ErpError::ParseError(format!(
                "search_read returned non-array: {}",
                other
            ))),
        }
    }

    /// Customer invoices (open and paid) for the configured company
    pub async fn fetch_invoices(&self) -> Result<Vec<Invoice>, ErpError> {
        let rows = self
            .search_read(
                "account.invoice",
                json!([
                    ["type", "=", "out_invoice"],
                    ["state", "in", ["open", "paid"]],
                    ["company_id", "=", self.config.company_id]
                ]),
                &[
                    "number",
                    "partner_id",
                    "date_invoice",
                    "date_due",
                    "amount_total",
                    "residual",
                    "state",
                ],
            )
            .await?;
        Ok(deserialize_rows(rows, "account.invoice"))
    }

    /// Customer invoice lines for the configured company
    pub async fn fetch_invoice_lines(&self) -> Result<Vec<InvoiceLine>, ErpError> {
        let rows = self
            .search_read(
                "account.invoice.line",
                json!([["company_id", "=", self.config.company_id]]),
                &[
                    "invoice_id",
                    "product_id",
                    "account_analytic_id",
                    "quantity",
                    "price_subtotal",
                ],
            )
            .await?;
        Ok(deserialize_rows(rows, "account.invoice.line"))
    }

    /// Customers, with their region reference
    pub async fn fetch_partners(&self) -> Result<Vec<Partner>, ErpError> {
        let rows = self
            .search_read(
                "res.partner",
                json!([["customer", "=", true]]),
                &["name", "state_id"],
            )
            .await?;
        Ok(deserialize_rows(rows, "res.partner"))
    }

    /// Products, with their type
    pub async fn fetch_products(&self) -> Result<Vec<Product>, ErpError> {
        let rows = self
            .search_read("product.product", json!([]), &["name", "type"])
            .await?;
        Ok(deserialize_rows(rows, "product.product"))
    }

    /// Analytic accounts (profit plans)
    pub async fn fetch_analytic_accounts(&self) -> Result<Vec<AnalyticAccount>, ErpError> {
        let rows = self
            .search_read("account.analytic.account", json!([]), &["name"])
            .await?;
        Ok(deserialize_rows(rows, "account.analytic.account"))
    }
}

/// Deserialize rows leniently, dropping (and logging) malformed ones
fn deserialize_rows<T: serde::de::DeserializeOwned>(rows: Vec<Value>, model: &str) -> Vec<T> {
    let total = rows.len();
    let parsed: Vec<T> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Dropping malformed {} row: {}", model, e);
                None
            }
        })
        .collect();
    if parsed.len() < total {
        warn!("{}: kept {}/{} rows", model, parsed.len(), total);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_envelope_has_jsonrpc_shape() {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method: "call",
            params: CallParams {
                service: "common",
                method: "login",
                args: json!(["db", "user", "pass"]),
            },
            id: 1,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["method"], "call");
        assert_eq!(value["params"]["service"], "common");
        assert_eq!(value["params"]["args"][2], "pass");
    }

    #[test]
    fn response_error_is_detected() {
        let body: JsonRpcResponse = serde_json::from_str(
            r#"{
                "jsonrpc": "2.0",
                "id": 1,
                "error": {
                    "message": "Odoo Server Error",
                    "data": { "message": "Access denied" }
                }
            }"#,
        )
        .unwrap();

        let error = body.error.unwrap();
        assert_eq!(error.message, "Odoo Server Error");
        assert_eq!(error.data.unwrap()["message"], "Access denied");
    }

    #[test]
    fn malformed_rows_are_dropped_not_fatal() {
        let rows = vec![
            json!({ "id": 1, "name": "Cliente A", "state_id": [5, "San José"] }),
            json!({ "name": "sin id" }),
        ];
        let parsed: Vec<Partner> = deserialize_rows(rows, "res.partner");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].name, "Cliente A");
        assert_eq!(parsed[0].state_id.as_ref().unwrap().name, "San José");
    }

    #[test]
    fn client_creation() {
        assert!(ErpClient::new(ErpConfig::default()).is_ok());
    }
}
