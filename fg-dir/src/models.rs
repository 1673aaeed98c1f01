//! Domain models for the restaurant directory

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The seven Costa Rican provinces
///
/// Closed set: every listing belongs to exactly one province. Serialized
/// with the Spanish display names used throughout the UI and the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Province {
    #[serde(rename = "San José")]
    SanJose,
    #[serde(rename = "Alajuela")]
    Alajuela,
    #[serde(rename = "Cartago")]
    Cartago,
    #[serde(rename = "Heredia")]
    Heredia,
    #[serde(rename = "Guanacaste")]
    Guanacaste,
    #[serde(rename = "Puntarenas")]
    Puntarenas,
    #[serde(rename = "Limón")]
    Limon,
}

impl Province {
    pub const ALL: [Province; 7] = [
        Province::SanJose,
        Province::Alajuela,
        Province::Cartago,
        Province::Heredia,
        Province::Guanacaste,
        Province::Puntarenas,
        Province::Limon,
    ];

    /// Display name (accented, as shown in the UI)
    pub fn name(&self) -> &'static str {
        match self {
            Province::SanJose => "San José",
            Province::Alajuela => "Alajuela",
            Province::Cartago => "Cartago",
            Province::Heredia => "Heredia",
            Province::Guanacaste => "Guanacaste",
            Province::Puntarenas => "Puntarenas",
            Province::Limon => "Limón",
        }
    }

    /// Lenient parse: case-insensitive and accent-insensitive
    ///
    /// The LLM returns province names as free text, so "san jose",
    /// "SAN JOSÉ" and "San José" must all resolve to the same variant.
    pub fn parse(input: &str) -> Option<Province> {
        let normalized = normalize(input);
        Province::ALL
            .iter()
            .copied()
            .find(|p| normalize(p.name()) == normalized)
    }
}

impl std::fmt::Display for Province {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Province {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Province::parse(s).ok_or_else(|| format!("Unknown province: {}", s))
    }
}

/// Lowercase and strip the accents that occur in province names
fn normalize(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            _ => c,
        })
        .collect()
}

/// One blacklisted restaurant
///
/// `lat`/`lng` of 0.0 is the "location unknown" sentinel: such records
/// never appear as map markers but always appear in list views and counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    pub name: String,
    pub province: Province,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub added_at: DateTime<Utc>,
}

impl Listing {
    /// Create a listing with a fresh unique identifier
    pub fn new(
        name: impl Into<String>,
        province: Province,
        address: impl Into<String>,
        lat: f64,
        lng: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            province,
            address: address.into(),
            lat,
            lng,
            added_at: Utc::now(),
        }
    }

    /// Whether this record carries real coordinates (not the sentinel)
    pub fn has_location(&self) -> bool {
        self.lat != 0.0 && self.lng != 0.0
    }
}

/// Read-only filter over the working set
///
/// Province equality AND case-insensitive substring over name/address.
/// The two predicates are independent, so filter order never matters.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub province: Option<Province>,
    pub query: Option<String>,
}

impl ListingFilter {
    pub fn matches(&self, listing: &Listing) -> bool {
        if let Some(province) = self.province {
            if listing.province != province {
                return false;
            }
        }
        if let Some(query) = &self.query {
            let needle = query.to_lowercase();
            if needle.is_empty() {
                return true;
            }
            return listing.name.to_lowercase().contains(&needle)
                || listing.address.to_lowercase().contains(&needle);
        }
        true
    }

    /// Apply the filter to a working set, preserving order
    pub fn apply<'a>(&self, listings: &'a [Listing]) -> Vec<&'a Listing> {
        listings.iter().filter(|l| self.matches(l)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Listing> {
        vec![
            Listing::new("Soda La Esquina", Province::SanJose, "Avenida Central", 0.0, 0.0),
            Listing::new("Marisquería El Puerto", Province::Puntarenas, "Frente al muelle", 9.97, -84.83),
            Listing::new("Restaurante Central", Province::Heredia, "Barrio Fátima", 9.99, -84.11),
        ]
    }

    #[test]
    fn province_parse_is_accent_and_case_insensitive() {
        assert_eq!(Province::parse("san jose"), Some(Province::SanJose));
        assert_eq!(Province::parse("SAN JOSÉ"), Some(Province::SanJose));
        assert_eq!(Province::parse("Limon"), Some(Province::Limon));
        assert_eq!(Province::parse("  Heredia "), Some(Province::Heredia));
        assert_eq!(Province::parse("Texas"), None);
    }

    #[test]
    fn province_serde_uses_display_names() {
        let json = serde_json::to_string(&Province::Limon).unwrap();
        assert_eq!(json, "\"Limón\"");
        let back: Province = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Province::Limon);
    }

    #[test]
    fn new_listing_gets_unique_ids() {
        let a = Listing::new("A", Province::Cartago, "x", 0.0, 0.0);
        let b = Listing::new("B", Province::Cartago, "x", 0.0, 0.0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn sentinel_coordinates_are_not_a_location() {
        let listings = sample();
        assert!(!listings[0].has_location());
        assert!(listings[1].has_location());
    }

    #[test]
    fn filter_matches_name_or_address_case_insensitively() {
        let listings = sample();
        let filter = ListingFilter {
            province: None,
            query: Some("CENTRAL".to_string()),
        };
        let hits = filter.apply(&listings);
        // Matches "Avenida Central" (address) and "Restaurante Central" (name)
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn filter_predicates_commute() {
        let listings = sample();
        let by_province = ListingFilter {
            province: Some(Province::Heredia),
            query: None,
        };
        let by_query = ListingFilter {
            province: None,
            query: Some("central".to_string()),
        };

        let province_then_query: Vec<Uuid> = by_province
            .apply(&listings)
            .into_iter()
            .filter(|l| by_query.matches(l))
            .map(|l| l.id)
            .collect();
        let query_then_province: Vec<Uuid> = by_query
            .apply(&listings)
            .into_iter()
            .filter(|l| by_province.matches(l))
            .map(|l| l.id)
            .collect();

        assert_eq!(province_then_query, query_then_province);
        assert_eq!(province_then_query, vec![listings[2].id]);
    }

    #[test]
    fn empty_filter_keeps_everything_in_order() {
        let listings = sample();
        let filter = ListingFilter::default();
        let hits = filter.apply(&listings);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].id, listings[0].id);
        assert_eq!(hits[2].id, listings[2].id);
    }
}
