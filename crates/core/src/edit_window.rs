//! Edit-window classification for movement records.
//!
//! Every call recomputes the state from the record and the supplied `now`;
//! nothing is cached or persisted, so a record silently moves to `Expired`
//! as the clock advances.
//!
//! Evaluation order is fixed: the age gate first, then server access, then
//! operational-data completeness.

use chrono::{Duration, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::movement::MovementRecord;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Operational data may be amended for this many hours after creation.
pub const EDIT_WINDOW_HOURS: i64 = 24;

/// Largest configurable edit window (one week).
pub const MAX_EDIT_WINDOW_HOURS: i64 = 168;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Time parameters for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditPolicy {
    /// Inclusive: a record exactly this old is still editable.
    pub edit_window: Duration,
    /// Offset of the wall-clock `date`/`time` stored on records.
    pub site_offset: FixedOffset,
}

impl Default for EditPolicy {
    fn default() -> Self {
        Self {
            edit_window: Duration::hours(EDIT_WINDOW_HOURS),
            site_offset: Utc.fix(),
        }
    }
}

impl EditPolicy {
    /// Build a policy from raw configuration values.
    pub fn new(edit_window_hours: i64, utc_offset_minutes: i32) -> Result<Self, CoreError> {
        if !(1..=MAX_EDIT_WINDOW_HOURS).contains(&edit_window_hours) {
            return Err(CoreError::Validation(format!(
                "Edit window must be between 1 and {MAX_EDIT_WINDOW_HOURS} hours, got {edit_window_hours}"
            )));
        }
        let site_offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                CoreError::Validation(format!("Invalid UTC offset: {utc_offset_minutes} minutes"))
            })?;
        Ok(Self {
            edit_window: Duration::hours(edit_window_hours),
            site_offset,
        })
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Classification state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditState {
    /// Older than the edit window.
    Expired,
    /// Fresh, but the server denies editing.
    NoAccess,
    /// Fresh and editable, operational data missing.
    CompleteRequired,
    /// Fresh and editable, operational data present.
    EditOptional,
}

/// Operator urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    None,
}

impl Priority {
    /// Ascending rank is descending urgency.
    pub fn rank(&self) -> u8 {
        match self {
            Self::High => 1,
            Self::Medium => 2,
            Self::None => 3,
        }
    }
}

/// What the operator can do with the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditAction {
    CompleteRequired,
    EditOptional,
    NoAccess,
    ViewOnly,
}

impl EditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompleteRequired => "complete_required",
            Self::EditOptional => "edit_optional",
            Self::NoAccess => "no_access",
            Self::ViewOnly => "view_only",
        }
    }
}

impl EditState {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::CompleteRequired | Self::EditOptional)
    }

    pub fn priority(&self) -> Priority {
        match self {
            Self::CompleteRequired => Priority::High,
            Self::EditOptional => Priority::Medium,
            Self::Expired | Self::NoAccess => Priority::None,
        }
    }

    pub fn action(&self) -> EditAction {
        match self {
            Self::Expired => EditAction::ViewOnly,
            Self::NoAccess => EditAction::NoAccess,
            Self::CompleteRequired => EditAction::CompleteRequired,
            Self::EditOptional => EditAction::EditOptional,
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classification handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditClassification {
    pub state: EditState,
    pub enabled: bool,
    pub priority: Priority,
    pub action: EditAction,
}

impl From<EditState> for EditClassification {
    fn from(state: EditState) -> Self {
        Self {
            state,
            enabled: state.is_enabled(),
            priority: state.priority(),
            action: state.action(),
        }
    }
}

/// Age of `record` at `now`. `None` means the timestamp did not parse and
/// the record must be treated as infinitely old.
pub fn record_age_at(
    record: &MovementRecord,
    now: Timestamp,
    policy: &EditPolicy,
) -> Option<Duration> {
    match record.created_at(policy.site_offset) {
        Some(created) => Some(now - created),
        None => {
            tracing::warn!(
                gate_entry_no = %record.gate_entry_no,
                date = %record.date,
                time = %record.time,
                "Unparseable record timestamp, treating as expired"
            );
            None
        }
    }
}

/// Whether `age` falls inside the (inclusive) edit window.
pub fn is_within_window(age: Option<Duration>, policy: &EditPolicy) -> bool {
    age.is_some_and(|a| a <= policy.edit_window)
}

/// Classification state of `record` at `now`.
pub fn edit_state_at(record: &MovementRecord, now: Timestamp, policy: &EditPolicy) -> EditState {
    EditAssessment::at(record, now, policy).state
}

/// Classification state given an already computed age.
fn state_for_age(
    record: &MovementRecord,
    age: Option<Duration>,
    policy: &EditPolicy,
) -> EditState {
    if !is_within_window(age, policy) {
        EditState::Expired
    } else if !record.can_edit {
        EditState::NoAccess
    } else if !record.is_operational_data_complete() {
        EditState::CompleteRequired
    } else {
        EditState::EditOptional
    }
}

/// A record's age and state, computed once and reused for classification,
/// remaining time and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditAssessment {
    /// `None` when the timestamp did not parse.
    pub age: Option<Duration>,
    pub state: EditState,
}

impl EditAssessment {
    pub fn at(record: &MovementRecord, now: Timestamp, policy: &EditPolicy) -> Self {
        let age = record_age_at(record, now, policy);
        Self {
            age,
            state: state_for_age(record, age, policy),
        }
    }

    pub fn classification(&self) -> EditClassification {
        self.state.into()
    }

    pub fn time_remaining(&self, policy: &EditPolicy) -> Option<Duration> {
        remaining_for_age(self.age, policy)
    }
}

/// Full classification of `record` at `now`.
pub fn classify_at(
    record: &MovementRecord,
    now: Timestamp,
    policy: &EditPolicy,
) -> EditClassification {
    edit_state_at(record, now, policy).into()
}

/// Classify against the wall clock with the default policy.
pub fn classify(record: &MovementRecord) -> EditClassification {
    classify_at(record, Utc::now(), &EditPolicy::default())
}

/// Remaining edit window, `None` once expired.
pub fn time_remaining_at(
    record: &MovementRecord,
    now: Timestamp,
    policy: &EditPolicy,
) -> Option<Duration> {
    remaining_for_age(record_age_at(record, now, policy), policy)
}

fn remaining_for_age(age: Option<Duration>, policy: &EditPolicy) -> Option<Duration> {
    let age = age?;
    if age > policy.edit_window {
        return None;
    }
    Some(policy.edit_window - age.max(Duration::zero()))
}

/// Format a remaining duration as `"{h}h {m}m"`.
pub fn format_time_remaining(remaining: Duration) -> String {
    let hours = remaining.num_hours();
    let minutes = remaining.num_minutes() - hours * 60;
    format!("{hours}h {minutes}m")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::tests::{record, with_operational_data};
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 1, 11, 12, 0, 0).unwrap()
    }

    /// A record created `age` before [`now`].
    fn aged(age: Duration) -> MovementRecord {
        let created = now() - age;
        record(
            "GE-1",
            &created.format("%Y-%m-%d").to_string(),
            &created.format("%H:%M:%S").to_string(),
        )
    }

    // -- Policy --

    #[test]
    fn default_policy_is_24_hours_utc() {
        let p = EditPolicy::default();
        assert_eq!(p.edit_window, Duration::hours(24));
        assert_eq!(p.site_offset.local_minus_utc(), 0);
    }

    #[test]
    fn policy_rejects_bad_values() {
        assert_matches!(EditPolicy::new(0, 0), Err(CoreError::Validation(_)));
        assert_matches!(EditPolicy::new(169, 0), Err(CoreError::Validation(_)));
        assert_matches!(EditPolicy::new(24, 24 * 60), Err(CoreError::Validation(_)));
        assert!(EditPolicy::new(24, 330).is_ok());
    }

    // -- Boundary --

    #[test]
    fn exactly_24_hours_is_inside_window() {
        let r = with_operational_data(aged(Duration::hours(24)));
        let c = classify_at(&r, now(), &EditPolicy::default());
        assert_eq!(c.state, EditState::EditOptional);
    }

    #[test]
    fn one_second_past_24_hours_is_expired() {
        let r = with_operational_data(aged(Duration::hours(24) + Duration::seconds(1)));
        let c = classify_at(&r, now(), &EditPolicy::default());
        assert_eq!(c.state, EditState::Expired);
        assert!(!c.enabled);
        assert_eq!(c.action, EditAction::ViewOnly);
    }

    // -- States --

    #[test]
    fn fresh_incomplete_record_requires_completion() {
        let mut r = aged(Duration::hours(23) + Duration::minutes(59));
        r.driver_name = Some("  ".to_string());
        r.km_reading = Some("45210".to_string());
        r.loader_names = Some("Suresh".to_string());
        let c = classify_at(&r, now(), &EditPolicy::default());
        assert_eq!(c.state, EditState::CompleteRequired);
        assert!(c.enabled);
        assert_eq!(c.priority, Priority::High);
        assert_eq!(c.action, EditAction::CompleteRequired);
    }

    #[test]
    fn fresh_complete_record_is_optional() {
        let r = with_operational_data(aged(Duration::hours(2)));
        let c = classify_at(&r, now(), &EditPolicy::default());
        assert_eq!(c.state, EditState::EditOptional);
        assert!(c.enabled);
        assert_eq!(c.priority, Priority::Medium);
    }

    #[test]
    fn server_denial_wins_over_completeness() {
        for r in [aged(Duration::hours(1)), with_operational_data(aged(Duration::hours(1)))] {
            let mut r = r;
            r.can_edit = false;
            let c = classify_at(&r, now(), &EditPolicy::default());
            assert_eq!(c.state, EditState::NoAccess);
            assert!(!c.enabled);
            assert_eq!(c.priority, Priority::None);
        }
    }

    #[test]
    fn expiry_wins_over_server_permission() {
        let mut r = with_operational_data(aged(Duration::hours(25)));
        r.can_edit = true;
        let c = classify_at(&r, now(), &EditPolicy::default());
        assert_eq!(c.state, EditState::Expired);
        assert!(!c.enabled);
    }

    #[test]
    fn expired_and_denied_is_expired() {
        let mut r = aged(Duration::hours(30));
        r.can_edit = false;
        assert_eq!(edit_state_at(&r, now(), &EditPolicy::default()), EditState::Expired);
    }

    #[test]
    fn unparseable_timestamp_is_expired() {
        let r = with_operational_data(record("GE-1", "not-a-date", "08:00:00"));
        let c = classify_at(&r, now(), &EditPolicy::default());
        assert_eq!(c.state, EditState::Expired);
        assert!(record_age_at(&r, now(), &EditPolicy::default()).is_none());
    }

    #[test]
    fn future_record_is_inside_window() {
        let r = aged(-Duration::minutes(5));
        assert_eq!(edit_state_at(&r, now(), &EditPolicy::default()), EditState::CompleteRequired);
    }

    #[test]
    fn classification_is_idempotent() {
        let r = aged(Duration::hours(3));
        let p = EditPolicy::default();
        assert_eq!(classify_at(&r, now(), &p), classify_at(&r, now(), &p));
    }

    #[test]
    fn site_offset_shifts_the_window() {
        // Stored 17:00 local at +05:30 is 11:30 UTC, half an hour before now.
        let r = record("GE-1", "2025-01-11", "17:00:00");
        let ist = EditPolicy::new(24, 330).unwrap();
        assert_eq!(
            record_age_at(&r, now(), &ist),
            Some(Duration::minutes(30))
        );
    }

    #[test]
    fn shorter_window_expires_sooner() {
        let r = aged(Duration::hours(9));
        let p = EditPolicy::new(8, 0).unwrap();
        assert_eq!(edit_state_at(&r, now(), &p), EditState::Expired);
    }

    // -- Priority --

    #[test]
    fn priority_ranks_ascend_with_decreasing_urgency() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::None.rank());
    }

    #[test]
    fn classification_serializes_snake_case() {
        let json = serde_json::to_value(EditClassification::from(EditState::CompleteRequired)).unwrap();
        assert_eq!(json["state"], "complete_required");
        assert_eq!(json["priority"], "high");
        assert_eq!(json["action"], "complete_required");
        assert_eq!(json["enabled"], true);
    }

    // -- Time remaining --

    #[test]
    fn time_remaining_counts_down() {
        let r = aged(Duration::hours(20) + Duration::minutes(15));
        let left = time_remaining_at(&r, now(), &EditPolicy::default()).unwrap();
        assert_eq!(left, Duration::hours(3) + Duration::minutes(45));
        assert_eq!(format_time_remaining(left), "3h 45m");
    }

    #[test]
    fn time_remaining_none_when_expired() {
        let r = aged(Duration::hours(25));
        assert!(time_remaining_at(&r, now(), &EditPolicy::default()).is_none());
    }

    #[test]
    fn time_remaining_capped_for_future_records() {
        let r = aged(-Duration::hours(1));
        assert_eq!(
            time_remaining_at(&r, now(), &EditPolicy::default()),
            Some(Duration::hours(24))
        );
    }

    #[test]
    fn assessment_agrees_with_per_call_functions() {
        let policy = EditPolicy::default();
        for r in [
            aged(Duration::hours(2)),
            with_operational_data(aged(Duration::hours(23))),
            aged(Duration::hours(30)),
            record("GE-1", "2025-01-11", ""),
        ] {
            let a = EditAssessment::at(&r, now(), &policy);
            assert_eq!(a.state, edit_state_at(&r, now(), &policy));
            assert_eq!(a.classification(), classify_at(&r, now(), &policy));
            assert_eq!(a.time_remaining(&policy), time_remaining_at(&r, now(), &policy));
        }
    }

    #[test]
    fn format_truncates_seconds() {
        assert_eq!(format_time_remaining(Duration::seconds(59)), "0h 0m");
        assert_eq!(format_time_remaining(Duration::minutes(125) + Duration::seconds(30)), "2h 5m");
    }
}
