//! Apply orchestration for the NB36 credit card demo.
//!
//! The [`apply`] module submits an applicant to the decisioning endpoint once,
//! derives the four checks shown during the apply flow, and assembles the
//! report bundle that callers render or export.

pub mod apply;
pub mod config;
pub mod error;
pub mod telemetry;
