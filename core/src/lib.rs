//! Duty rotation scheduling core.
//!
//! Two engines over one domain model:
//!   - `ranking` ranks eligible candidates for one slot role and commits
//!     the caller's pick (interactive).
//!   - `rotation` builds a whole-campaign roster from many randomized
//!     trials (batch), optionally followed by `slack::fill_slack`.
//!
//! `template::expand_templates` produces the daily slots the ranker and
//! `continuity::carry_forward` work on.
//!
//! The core performs no I/O beyond `PolicyConfig::load`.

pub mod calendar;
pub mod config;
pub mod continuity;
pub mod error;
pub mod model;
pub mod ranking;
pub mod requirement;
pub mod rng;
pub mod roles;
pub mod roster;
pub mod rotation;
pub mod slack;
pub mod template;
pub mod types;
pub mod vacation;
