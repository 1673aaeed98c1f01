//! Gemini API client
//!
//! JSON-constrained completions over the `generateContent` REST endpoint,
//! used for two things: geocoding a street address to approximate
//! coordinates, and extracting structured listings from pasted free text.
//!
//! Both callers treat any failure (network, HTTP status, malformed JSON,
//! missing keys) as "no answer" and continue with sentinel data.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::Province;

const GEMINI_BASE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";
const RATE_LIMIT_MS: u64 = 1500; // fixed inter-call delay for bulk operations

/// Gemini client errors
#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Empty response from model")]
    EmptyResponse,
}

/// Geocoding result
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// One listing extracted from free text
#[derive(Debug, Clone, Deserialize)]
pub struct ParsedListing {
    pub name: String,
    pub province: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Deserialize)]
struct ListingExtraction {
    #[serde(default)]
    restaurants: Vec<ParsedListing>,
}

// Request/response wire shapes for generateContent

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: String,
}

/// Enforces the fixed inter-call delay between model calls
struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval: Duration::from_millis(min_interval_ms),
        }
    }

    async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Gemini rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}

/// Gemini API client
pub struct GeminiClient {
    http_client: reqwest::Client,
    rate_limiter: Arc<RateLimiter>,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Result<Self, GeminiError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| GeminiError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: Arc::new(RateLimiter::new(RATE_LIMIT_MS)),
            api_key,
        })
    }

    /// Approximate coordinates for an address within a province
    ///
    /// No validation of the returned range beyond the caller's zero-check.
    pub async fn suggest_coordinates(
        &self,
        address: &str,
        province: Province,
    ) -> Result<GeoPoint, GeminiError> {
        let prompt = format!(
            "Give me the approximate latitude and longitude for {}, {}, Costa Rica. \
             Return ONLY JSON: {{ \"lat\": number, \"lng\": number }}",
            address, province
        );

        let text = self.complete_json(prompt).await?;
        serde_json::from_str(&text).map_err(|e| GeminiError::ParseError(e.to_string()))
    }

    /// Extract structured listings from pasted free text
    ///
    /// Provinces come back as free text and are normalized by the caller.
    pub async fn parse_listing_text(&self, raw_text: &str) -> Result<Vec<ParsedListing>, GeminiError> {
        let prompt = format!(
            "Extract restaurant info from the text below. Normalize provinces to one of: \
             San José, Alajuela, Cartago, Heredia, Guanacaste, Puntarenas, Limón. \
             Return JSON schema: \
             {{ \"restaurants\": [ {{ \"name\": str, \"province\": str, \"address\": str }} ] }}\n\
             Text: {}",
            raw_text
        );

        let text = self.complete_json(prompt).await?;
        let extraction: ListingExtraction =
            serde_json::from_str(&text).map_err(|e| GeminiError::ParseError(e.to_string()))?;
        Ok(extraction.restaurants)
    }

    /// One JSON-constrained completion; returns the raw text of the first part
    async fn complete_json(&self, prompt: String) -> Result<String, GeminiError> {
        self.rate_limiter.wait().await;

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                response_mime_type: "application/json".to_string(),
            },
        };

        let url = format!("{}?key={}", GEMINI_BASE_URL, self.api_key);
        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| GeminiError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GeminiError::ApiError(status.as_u16(), error_text));
        }

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::ParseError(e.to_string()))?;

        body.candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or(GeminiError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        assert!(GeminiClient::new("test_key".to_string()).is_ok());
    }

    #[test]
    fn request_serializes_with_camel_case_config() {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: "hola".to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.1,
                response_mime_type: "application/json".to_string(),
            },
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"contents\""));
        assert!(json.contains("\"generationConfig\""));
        assert!(json.contains("\"responseMimeType\":\"application/json\""));
    }

    #[test]
    fn response_text_extracts_from_first_candidate() {
        let json = r#"{
            "candidates": [{
                "content": {
                    "parts": [{ "text": "{\"lat\": 9.93, \"lng\": -84.08}" }]
                }
            }]
        }"#;

        let response: GeminiResponse = serde_json::from_str(json).unwrap();
        let text = &response.candidates[0].content.parts[0].text;
        let point: GeoPoint = serde_json::from_str(text).unwrap();
        assert_eq!(point, GeoPoint { lat: 9.93, lng: -84.08 });
    }

    #[test]
    fn extraction_tolerates_missing_restaurants_key() {
        let extraction: ListingExtraction = serde_json::from_str("{}").unwrap();
        assert!(extraction.restaurants.is_empty());
    }

    #[test]
    fn extraction_parses_listing_rows() {
        let json = r#"{
            "restaurants": [
                { "name": "Soda Tica", "province": "Heredia", "address": "del parque 200m" },
                { "name": "Bar X", "province": "limon" }
            ]
        }"#;

        let extraction: ListingExtraction = serde_json::from_str(json).unwrap();
        assert_eq!(extraction.restaurants.len(), 2);
        assert_eq!(extraction.restaurants[0].name, "Soda Tica");
        // address is optional in the model output
        assert_eq!(extraction.restaurants[1].address, "");
    }

    #[tokio::test]
    async fn rate_limiter_spaces_out_calls() {
        let limiter = RateLimiter::new(50);

        let start = Instant::now();
        for _ in 0..3 {
            limiter.wait().await;
        }
        let elapsed = start.elapsed();

        // Two enforced gaps of 50ms
        assert!(elapsed >= Duration::from_millis(100));
    }
}
