//! Operator-attention ordering of movement records.

use std::cmp::Reverse;

use chrono::Utc;

use crate::edit_window::{EditAssessment, EditPolicy};
use crate::movement::MovementRecord;
use crate::types::Timestamp;

/// Ordering key for an assessed record: priority rank, then parseable
/// before unparseable, then youngest first. Unparseable timestamps sink to
/// the end of their priority bucket.
pub fn edit_priority_key(assessment: &EditAssessment) -> (u8, Reverse<bool>, i64) {
    let rank = assessment.state.priority().rank();
    match assessment.age {
        Some(age) => (rank, Reverse(true), age.num_milliseconds()),
        None => (rank, Reverse(false), 0),
    }
}

/// Sort `records` in place: most urgent first, newest first within equal
/// urgency. Stable, so records tied on both keys keep their input order.
pub fn sort_by_edit_priority_at(records: &mut [MovementRecord], now: Timestamp, policy: &EditPolicy) {
    records.sort_by_cached_key(|r| edit_priority_key(&EditAssessment::at(r, now, policy)));
}

/// Sort against the wall clock with the default policy.
pub fn sort_by_edit_priority(records: &mut [MovementRecord]) {
    sort_by_edit_priority_at(records, Utc::now(), &EditPolicy::default());
}
