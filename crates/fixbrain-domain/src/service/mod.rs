//! Domain services

pub mod decision;
pub mod validation;

pub use decision::{DecisionPolicy, PassThroughPolicy};
pub use validation::{validate_diagnosis, RawDiagnosis};
