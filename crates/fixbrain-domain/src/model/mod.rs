//! Domain models

mod agent_state;

pub use agent_state::{AgentState, Hypothesis, Observation, Phase};
