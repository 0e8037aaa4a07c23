//! Gate policy engine for the gate-entry workflow.
//!
//! Pure, synchronous rules over backend movement records and vehicle status
//! payloads: gate sequence checks, edit-window classification, priority
//! ordering, document assignment, plus the form and session rules the client
//! applies before calling the backend. Nothing here performs I/O. The `*_at`
//! functions take `now` and an [`edit_window::EditPolicy`]; their unsuffixed
//! wrappers use the wall clock and the default policy.

pub mod accounts;
pub mod assignment;
pub mod edit_window;
pub mod error;
pub mod gate_entry;
pub mod insights;
pub mod movement;
pub mod operational;
pub mod priority;
pub mod raw_material;
pub mod roles;
pub mod sequence;
pub mod session;
pub mod types;
