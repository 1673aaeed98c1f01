//! Edit/delete reconciliation for the admin table editor
//!
//! The admin edits a *filtered* view of the working set, so the edited rows
//! that come back cover only what was shown. Reconciliation applies those
//! edits to the full working set without touching records that were
//! filtered out of view: a record can only be deleted if it was visible in
//! the edit session.

use crate::models::{Listing, Province};
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashSet;
use uuid::Uuid;

/// One row returned by the table editor
///
/// Rows inserted by the editor arrive with a null `id`; a fresh identifier
/// is assigned during reconciliation.
#[derive(Debug, Clone, Deserialize)]
pub struct EditedRow {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub province: Province,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub lng: f64,
}

/// Result of applying an edit session to the working set
#[derive(Debug)]
pub struct EditOutcome {
    /// The updated working set
    pub master: Vec<Listing>,
    /// Identifiers removed (always a subset of the shown ids)
    pub deleted_ids: Vec<Uuid>,
    /// Final values of every edited row, for keyed store writes
    pub upserts: Vec<Listing>,
    /// How many upserts replaced an existing record
    pub updated: usize,
    /// How many upserts appended a new record
    pub added: usize,
}

/// Apply a user's in-place edits and deletions back onto the full working set
///
/// `shown_ids` is the set of identifiers that was visible in the editor
/// before editing. Deletions are scoped to that set: an id the editor never
/// saw is untouched no matter what `edited` contains.
///
/// Untouched records keep their position, edited records are replaced in
/// place, and new rows are appended in order.
pub fn apply_edits(
    mut master: Vec<Listing>,
    shown_ids: &HashSet<Uuid>,
    edited: Vec<EditedRow>,
) -> EditOutcome {
    let remaining_ids: HashSet<Uuid> = edited.iter().filter_map(|row| row.id).collect();

    // Built from master, so a stale shown_ids entry that no longer matches
    // any record cannot reach the changeset
    let deleted_ids: Vec<Uuid> = master
        .iter()
        .map(|l| l.id)
        .filter(|id| shown_ids.contains(id) && !remaining_ids.contains(id))
        .collect();

    master.retain(|l| !deleted_ids.contains(&l.id));

    let mut upserts = Vec::with_capacity(edited.len());
    let mut updated = 0;
    let mut added = 0;

    for row in edited {
        let existing = row
            .id
            .and_then(|id| master.iter_mut().find(|l| l.id == id));

        match existing {
            Some(listing) => {
                listing.name = row.name;
                listing.province = row.province;
                listing.address = row.address;
                listing.lat = row.lat;
                listing.lng = row.lng;
                // added_at is not editable; the original timestamp survives
                upserts.push(listing.clone());
                updated += 1;
            }
            None => {
                let listing = Listing {
                    id: row.id.unwrap_or_else(Uuid::new_v4),
                    name: row.name,
                    province: row.province,
                    address: row.address,
                    lat: row.lat,
                    lng: row.lng,
                    added_at: Utc::now(),
                };
                upserts.push(listing.clone());
                master.push(listing);
                added += 1;
            }
        }
    }

    EditOutcome {
        master,
        deleted_ids,
        upserts,
        updated,
        added,
    }
}
