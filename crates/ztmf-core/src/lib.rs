//! Core view models for the Zero Trust Maturity Framework (ZTMF) toolkit.
//!
//! Everything here is pure and synchronous: score trends, maturity tiers,
//! display formatting, pillar/function sequencing for the questionnaire,
//! the guarded wizard state machine, form and decommission validation, and
//! the time-boxed cache used for reference data. This crate performs no I/O
//! and knows nothing about the REST backend; `ztmf-client` feeds it data.

pub mod cache;
pub mod decommission;
pub mod error;
pub mod form;
pub mod format;
pub mod history;
pub mod maturity;
pub mod model;
pub mod sequence;
pub mod trend;
pub mod wizard;

pub use cache::{DATACALL_CACHE_TTL, TimedCache};
pub use error::CoreError;
pub use decommission::DecommissionRequest;
pub use format::format_score;
pub use form::SystemForm;
pub use history::ScoreHistory;
pub use maturity::{Maturity, Tier, maturity};
pub use sequence::{PILLAR_FUNCTION_MAP, PillarGroup, Sequence};
pub use trend::{Direction, Trend, trend};
pub use wizard::{Decision, Nav, Step, Wizard};
