use chrono::TimeDelta;
use std::sync::Arc;
use thiserror::Error;

use crate::{core::time::Clock, parameters::ParameterMap, telemetry::TelemetryService};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Error creating node '{0}': {1}")]
    NodeInstantiation(String, #[source] Box<dyn std::error::Error + Send + Sync>),
}

pub enum StepResult {
    Continue,
    Stop,
}

/// A unit of periodic work. `step` is invoked once per executor tick, in
/// registration order, and must not block.
pub trait Node {
    fn step(&mut self, i: usize, dt: TimeDelta, clock: &dyn Clock) -> anyhow::Result<StepResult>;
}

pub struct NodeManager {
    telemetry: TelemetryService,
    parameters: Arc<ParameterMap>,
    nodes: Vec<(String, Box<dyn Node + Send>)>,
}

impl NodeManager {
    pub fn new(telemetry: TelemetryService, parameters: ParameterMap) -> Self {
        NodeManager {
            telemetry,
            parameters: Arc::new(parameters),
            nodes: vec![],
        }
    }

    pub fn add_node<F>(&mut self, name: &str, creator: F) -> Result<(), Error>
    where
        F: FnOnce(
            NodeContext,
        )
            -> Result<Box<dyn Node + Send>, Box<dyn std::error::Error + Send + Sync>>,
    {
        let context = NodeContext::new(self.telemetry.clone(), self.parameters.clone());

        let node = creator(context)
            .map_err(|e| Error::NodeInstantiation(name.to_string(), e))?;

        self.nodes.push((name.to_string(), node));

        Ok(())
    }

    pub fn nodes_mut(&mut self) -> &mut [(String, Box<dyn Node + Send>)] {
        &mut self.nodes
    }

    pub fn parameters(&self) -> Arc<ParameterMap> {
        self.parameters.clone()
    }

    pub fn telemetry(&self) -> &TelemetryService {
        &self.telemetry
    }
}

#[derive(Debug, Clone)]
pub struct NodeContext {
    telemetry: TelemetryService,
    parameters: Arc<ParameterMap>,
}

impl NodeContext {
    fn new(telemetry: TelemetryService, parameters: Arc<ParameterMap>) -> Self {
        Self {
            telemetry,
            parameters,
        }
    }

    pub fn telemetry(&self) -> &TelemetryService {
        &self.telemetry
    }

    pub fn parameters(&self) -> &ParameterMap {
        &self.parameters
    }
}
