//! Movement insights: headline counts, list filtering and pagination for the
//! security and admin insight views.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::assignment::needs_assignment;
use crate::edit_window::{edit_state_at, EditAction, EditPolicy, EditState};
use crate::error::CoreError;
use crate::movement::{GateType, MovementRecord};
use crate::types::Timestamp;

/// Default number of rows per insights page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Largest page size a caller may request.
pub const MAX_PAGE_SIZE: usize = 200;

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Headline counts over a list of movements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InsightsStats {
    pub gate_in_count: usize,
    pub gate_out_count: usize,
    pub total_movements: usize,
    pub unique_vehicles: usize,
    /// Records whose action is `complete_required`.
    pub needs_completion: usize,
    pub pending_assignment: usize,
    pub assigned: usize,
}

impl InsightsStats {
    pub fn from_records_at(records: &[MovementRecord], now: Timestamp, policy: &EditPolicy) -> Self {
        Self::from_evaluated(
            records
                .iter()
                .map(|r| (r, edit_state_at(r, now, policy))),
        )
    }

    /// Counts over records whose edit state is already known.
    pub fn from_evaluated<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = (&'a MovementRecord, EditState)>,
    {
        let mut stats = Self::default();
        let mut vehicles = HashSet::new();
        for (record, state) in records {
            stats.total_movements += 1;
            match record.movement_type {
                GateType::GateIn => stats.gate_in_count += 1,
                GateType::GateOut => stats.gate_out_count += 1,
            }
            vehicles.insert(record.vehicle_no.as_str());
            if state.action() == EditAction::CompleteRequired {
                stats.needs_completion += 1;
            }
            if needs_assignment(record) {
                stats.pending_assignment += 1;
            }
        }
        stats.unique_vehicles = vehicles.len();
        stats.assigned = stats.total_movements - stats.pending_assignment;
        stats
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Date range and vehicle filter for the movement list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementFilter {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub vehicle_no: Option<String>,
}

impl MovementFilter {
    /// Blank vehicle filters are dropped; an inverted range is rejected.
    pub fn validate(self) -> Result<Self, CoreError> {
        if let (Some(from), Some(to)) = (self.from_date, self.to_date) {
            if from > to {
                return Err(CoreError::Validation(format!(
                    "From date {from} is after to date {to}"
                )));
            }
        }
        let vehicle_no = self
            .vehicle_no
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        Ok(Self { vehicle_no, ..self })
    }

    /// Whether `record` passes the filter. Date bounds are inclusive and a
    /// record with an unparseable date fails any date bound. The vehicle
    /// filter is a case-insensitive substring match.
    pub fn matches(&self, record: &MovementRecord) -> bool {
        if self.from_date.is_some() || self.to_date.is_some() {
            let Some(date) = record.record_date() else {
                return false;
            };
            if self.from_date.is_some_and(|from| date < from) {
                return false;
            }
            if self.to_date.is_some_and(|to| date > to) {
                return false;
            }
        }
        match &self.vehicle_no {
            Some(v) => record
                .vehicle_no
                .to_uppercase()
                .contains(&v.trim().to_uppercase()),
            None => true,
        }
    }

    pub fn apply<'a>(&self, records: &'a [MovementRecord]) -> Vec<&'a MovementRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// One page of a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, after clamping.
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    /// At least 1, even for an empty list.
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Validate a requested page size.
pub fn validate_page_size(per_page: usize) -> Result<usize, CoreError> {
    if (1..=MAX_PAGE_SIZE).contains(&per_page) {
        Ok(per_page)
    } else {
        Err(CoreError::Validation(format!(
            "Page size must be between 1 and {MAX_PAGE_SIZE}, got {per_page}"
        )))
    }
}

/// Slice `items` into the requested 1-based page, clamping the page number
/// into `1..=total_pages`.
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Result<Page<T>, CoreError> {
    let per_page = validate_page_size(per_page)?;
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * per_page;
    let end = (start + per_page).min(total_items);
    let items = items.get(start..end).map(<[T]>::to_vec).unwrap_or_default();

    Ok(Page {
        items,
        page,
        per_page,
        total_items,
        total_pages,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::DOC_TYPE_PENDING_ASSIGNMENT;
    use crate::movement::tests::{record, with_operational_data};
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 1, 11, 12, 0, 0).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    // -- Stats --

    #[test]
    fn stats_for_empty_list_are_zero() {
        let s = InsightsStats::from_records_at(&[], now(), &EditPolicy::default());
        assert_eq!(s, InsightsStats::default());
    }

    #[test]
    fn stats_count_each_dimension() {
        let fresh_incomplete = record("GE-1", "2025-01-11", "10:00:00");
        let mut fresh_out = with_operational_data(record("GE-2", "2025-01-11", "11:00:00"));
        fresh_out.movement_type = GateType::GateOut;
        let mut pending = record("GE-3", "2025-01-01", "10:00:00");
        pending.vehicle_no = "KA01CD5678".to_string();
        pending.document_type = Some(DOC_TYPE_PENDING_ASSIGNMENT.to_string());

        let s = InsightsStats::from_records_at(
            &[fresh_incomplete, fresh_out, pending],
            now(),
            &EditPolicy::default(),
        );
        assert_eq!(s.gate_in_count, 2);
        assert_eq!(s.gate_out_count, 1);
        assert_eq!(s.total_movements, 3);
        assert_eq!(s.unique_vehicles, 2);
        // The expired pending record is view-only, not complete_required.
        assert_eq!(s.needs_completion, 1);
        assert_eq!(s.pending_assignment, 1);
        assert_eq!(s.assigned, 2);
    }

    // -- Filter --

    #[test]
    fn filter_rejects_inverted_range() {
        let f = MovementFilter {
            from_date: Some(date("2025-01-10")),
            to_date: Some(date("2025-01-09")),
            vehicle_no: None,
        };
        assert_matches!(f.validate(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn filter_drops_blank_vehicle() {
        let f = MovementFilter {
            vehicle_no: Some("   ".to_string()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(f.vehicle_no, None);
    }

    #[test]
    fn filter_date_bounds_are_inclusive() {
        let f = MovementFilter {
            from_date: Some(date("2025-01-10")),
            to_date: Some(date("2025-01-10")),
            vehicle_no: None,
        };
        assert!(f.matches(&record("GE-1", "2025-01-10", "23:59:59")));
        assert!(!f.matches(&record("GE-2", "2025-01-11", "00:00:00")));
        assert!(!f.matches(&record("GE-3", "2025-01-09", "12:00:00")));
        assert!(!f.matches(&record("GE-4", "bad", "12:00:00")));
    }

    #[test]
    fn filter_vehicle_is_case_insensitive_substring() {
        let f = MovementFilter {
            vehicle_no: Some("ab12".to_string()),
            ..Default::default()
        };
        assert!(f.matches(&record("GE-1", "2025-01-10", "08:00:00")));

        let f = MovementFilter {
            vehicle_no: Some("ZZ".to_string()),
            ..Default::default()
        };
        let records = vec![record("GE-1", "2025-01-10", "08:00:00")];
        assert!(f.apply(&records).is_empty());
    }

    #[test]
    fn empty_filter_matches_everything() {
        let f = MovementFilter::default();
        assert!(f.matches(&record("GE-1", "garbage", "garbage")));
    }

    // -- Pagination --

    #[test]
    fn paginate_middle_page() {
        let items: Vec<u32> = (1..=45).collect();
        let page = paginate(&items, 2, 20).unwrap();
        assert_eq!(page.items.first(), Some(&21));
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_previous());
        assert!(page.has_next());
    }

    #[test]
    fn paginate_last_page_is_partial() {
        let items: Vec<u32> = (1..=45).collect();
        let page = paginate(&items, 3, 20).unwrap();
        assert_eq!(page.items, vec![41, 42, 43, 44, 45]);
        assert!(!page.has_next());
    }

    #[test]
    fn paginate_clamps_page_number() {
        let items: Vec<u32> = (1..=45).collect();
        assert_eq!(paginate(&items, 0, 20).unwrap().page, 1);
        assert_eq!(paginate(&items, 99, 20).unwrap().page, 3);
    }

    #[test]
    fn paginate_empty_list_has_one_empty_page() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, 5, 20).unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn paginate_rejects_bad_page_size() {
        let items = vec![1];
        assert_matches!(paginate(&items, 1, 0), Err(CoreError::Validation(_)));
        assert_matches!(paginate(&items, 1, MAX_PAGE_SIZE + 1), Err(CoreError::Validation(_)));
    }
}
