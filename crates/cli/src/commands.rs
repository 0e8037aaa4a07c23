//! Command implementations. Each takes already-loaded inputs and an explicit
//! `now` and returns a serialisable report; printing is left to the binary.

use serde::Serialize;

use gatepass_core::assignment::{
    can_assign_at, can_assign_in, needs_assignment, UnassignedDocumentQuery,
};
use gatepass_core::edit_window::{format_time_remaining, EditAssessment, EditClassification};
use gatepass_core::insights::{paginate, InsightsStats, MovementFilter, Page};
use gatepass_core::movement::{GateType, MovementRecord, VehicleStatus};
use gatepass_core::operational::OperationalSummary;
use gatepass_core::priority::edit_priority_key;
use gatepass_core::roles::{can_access_admin, can_access_security};
use gatepass_core::sequence::gate_sequence_error;
use gatepass_core::session::{decode_claims, CurrentUser};
use gatepass_core::types::Timestamp;

use crate::config::CliConfig;

// ---------------------------------------------------------------------------
// check-sequence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceCheck {
    pub gate_type: GateType,
    pub allowed: bool,
    pub reason: Option<String>,
}

pub fn check_sequence(status: Option<&VehicleStatus>, gate_type: GateType) -> SequenceCheck {
    let reason = gate_sequence_error(status, gate_type);
    SequenceCheck {
        gate_type,
        allowed: reason.is_none(),
        reason,
    }
}

// ---------------------------------------------------------------------------
// classify
// ---------------------------------------------------------------------------

/// A record together with everything the list view needs to render it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedRecord {
    #[serde(flatten)]
    pub record: MovementRecord,
    pub classification: EditClassification,
    pub time_remaining: Option<String>,
    pub needs_assignment: bool,
    pub can_assign: bool,
}

/// Sort by edit priority and classify every record. Each record's
/// timestamp is evaluated once.
pub fn classify_records(
    records: Vec<MovementRecord>,
    now: Timestamp,
    config: &CliConfig,
) -> Vec<ClassifiedRecord> {
    let policy = &config.policy;
    let mut assessed: Vec<(MovementRecord, EditAssessment)> = records
        .into_iter()
        .map(|record| {
            let assessment = EditAssessment::at(&record, now, policy);
            (record, assessment)
        })
        .collect();
    assessed.sort_by_key(|(_, assessment)| edit_priority_key(assessment));

    assessed
        .into_iter()
        .map(|(record, assessment)| {
            let needs_assignment = needs_assignment(&record);
            ClassifiedRecord {
                classification: assessment.classification(),
                time_remaining: assessment.time_remaining(policy).map(format_time_remaining),
                needs_assignment,
                can_assign: needs_assignment && can_assign_in(assessment.state),
                record,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub filter: MovementFilter,
    pub stats: InsightsStats,
    pub page: Page<ClassifiedRecord>,
}

/// Filter, count and page the movement list.
pub fn stats_report(
    records: Vec<MovementRecord>,
    filter: MovementFilter,
    page: usize,
    now: Timestamp,
    config: &CliConfig,
) -> anyhow::Result<StatsReport> {
    let filter = filter.validate()?;
    let filtered: Vec<MovementRecord> = records
        .into_iter()
        .filter(|r| filter.matches(r))
        .collect();

    let classified = classify_records(filtered, now, config);
    let stats = InsightsStats::from_evaluated(
        classified
            .iter()
            .map(|c| (&c.record, c.classification.state)),
    );
    let page = paginate(&classified, page, config.page_size)?;

    tracing::info!(
        total = stats.total_movements,
        needs_completion = stats.needs_completion,
        pending_assignment = stats.pending_assignment,
        page = page.page,
        total_pages = page.total_pages,
        "Computed movement insights"
    );

    Ok(StatsReport {
        filter,
        stats,
        page,
    })
}

// ---------------------------------------------------------------------------
// summary
// ---------------------------------------------------------------------------

pub fn operational_summary(records: &[MovementRecord]) -> OperationalSummary {
    OperationalSummary::from_records(records)
}

// ---------------------------------------------------------------------------
// assignments
// ---------------------------------------------------------------------------

/// A manual entry still waiting for a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingAssignment {
    pub gate_entry_no: String,
    pub vehicle_no: String,
    pub document_type: Option<String>,
    pub can_assign: bool,
    /// Document search to run; absent once the edit window has closed.
    pub query: Option<UnassignedDocumentQuery>,
}

pub fn pending_assignments(
    records: &[MovementRecord],
    now: Timestamp,
    config: &CliConfig,
) -> Vec<PendingAssignment> {
    records
        .iter()
        .filter(|r| needs_assignment(r))
        .map(|r| {
            let can_assign = can_assign_at(r, now, &config.policy);
            let query = if can_assign {
                UnassignedDocumentQuery::new(&r.vehicle_no, config.assignment_lookback_hours)
                    .map_err(|e| {
                        tracing::warn!(
                            gate_entry_no = %r.gate_entry_no,
                            error = %e,
                            "Cannot build document search"
                        );
                    })
                    .ok()
            } else {
                None
            };
            PendingAssignment {
                gate_entry_no: r.gate_entry_no.clone(),
                vehicle_no: r.vehicle_no.clone(),
                document_type: r.document_type.clone(),
                can_assign,
                query,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// whoami
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WhoAmI {
    pub user: Option<CurrentUser>,
    pub expired: bool,
    pub can_access_admin: bool,
    pub can_access_security: bool,
}

pub fn whoami(token: &str, now: Timestamp) -> anyhow::Result<WhoAmI> {
    let claims = decode_claims(token)?;
    let user = CurrentUser::from_claims_at(claims, now);
    let roles = user.as_ref().map(|u| u.roles.as_slice()).unwrap_or_default();
    Ok(WhoAmI {
        expired: user.is_none(),
        can_access_admin: can_access_admin(roles),
        can_access_security: can_access_security(roles),
        user,
    })
}
