//! Controller layer: UI events, workflow state, input validation and command orchestration.

pub mod events;
pub mod orchestration;
pub mod state;
pub mod validation;
pub mod workflow;

pub use workflow::{HandlerTable, WorkflowController};
