//! Shared primitive types used across the scheduling core.

/// A stable, unique identifier for a person on the roster.
pub type PersonId = String;

/// A stable, unique identifier for a duty slot.
pub type SlotId = String;

/// A role or capability tag, e.g. `commander`, `soldier`, `total_soldiers`.
pub type Role = String;

/// Submission index of a rotation trial. Also the trial's RNG stream index.
pub type TrialIndex = u64;
