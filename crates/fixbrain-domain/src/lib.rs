//! Domain layer - agent state model and the reasoning/decision services

pub mod model;
pub mod service;
