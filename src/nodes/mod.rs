mod executor;
mod node;

pub use executor::FixedRateExecutor;
pub use node::{Error, Node, NodeContext, NodeManager, StepResult};
