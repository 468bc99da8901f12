use anyhow::Result;
use chrono::TimeDelta;
use log::trace;

use crate::{
    core::time::{Clock, Timestamp},
    estimator::{
        algorithm::Estimator,
        config::EstimatorConfig,
        datatypes::{
            AirspeedSample, BaroSample, EstimatorOutput, GpsSample, ImuSample, StateEstimate,
            StatusSample,
        },
        ingest::SensorIngestor,
        publisher::build_state,
    },
    nodes::{Node, NodeContext, StepResult},
    telemetry::{TelemetryDispatcher, TelemetryReceiver, TelemetrySender, Timestamped},
    utils::capacity::Capacity::Unbounded,
};

/// The aggregation node. Sole owner of the input snapshot: each tick drains
/// every sensor channel through the ingestor, runs the estimator once (only
/// while armed), clears the GPS edge flag and publishes the state record.
pub struct EstimatorNode {
    rx_gps: TelemetryReceiver<GpsSample>,
    rx_imu: TelemetryReceiver<ImuSample>,
    rx_baro: TelemetryReceiver<BaroSample>,
    rx_airspeed: TelemetryReceiver<AirspeedSample>,
    rx_status: TelemetryReceiver<StatusSample>,

    tx_state: TelemetrySender<StateEstimate>,

    ingestor: SensorIngestor,
    estimator: Box<dyn Estimator + Send>,
}

impl EstimatorNode {
    pub fn new(ctx: NodeContext, estimator: Box<dyn Estimator + Send>) -> Result<Self> {
        let config = EstimatorConfig::from_parameters(ctx.parameters())?;

        let telemetry = ctx.telemetry();

        Ok(Self {
            rx_gps: telemetry.subscribe(&config.gps_topic, Unbounded)?,
            rx_imu: telemetry.subscribe(&config.imu_topic, Unbounded)?,
            rx_baro: telemetry.subscribe(&config.baro_topic, Unbounded)?,
            rx_airspeed: telemetry.subscribe(&config.airspeed_topic, Unbounded)?,
            rx_status: telemetry.subscribe(&config.status_topic, Unbounded)?,

            tx_state: telemetry.publish(&config.state_topic)?,

            ingestor: SensorIngestor::new(config.params),
            estimator,
        })
    }

    fn drain_sensors(&mut self) {
        while let Ok(Timestamped(_, s)) = self.rx_imu.try_recv() {
            self.ingestor.handle_imu(&s);
        }

        while let Ok(Timestamped(_, s)) = self.rx_baro.try_recv() {
            self.ingestor.handle_baro(&s);
        }

        while let Ok(Timestamped(_, s)) = self.rx_airspeed.try_recv() {
            self.ingestor.handle_airspeed(&s);
        }

        while let Ok(Timestamped(_, s)) = self.rx_status.try_recv() {
            self.ingestor.handle_status(&s);
        }

        while let Ok(Timestamped(_, s)) = self.rx_gps.try_recv() {
            self.ingestor.handle_gps(&s);
        }
    }
}

impl Node for EstimatorNode {
    fn step(&mut self, i: usize, _dt: TimeDelta, clock: &dyn Clock) -> Result<StepResult> {
        self.drain_sensors();

        let output = if self.ingestor.armed() {
            self.estimator
                .estimate(self.ingestor.params(), self.ingestor.input())
        } else {
            EstimatorOutput::default()
        };

        // Cleared whether or not this tick's estimate observed it
        self.ingestor.end_of_tick();

        let state = build_state(&output, self.ingestor.origin().copied());

        trace!("Step {i}: published state, armed={}", self.ingestor.armed());

        self.tx_state.send(Timestamp::now(clock), state);

        Ok(StepResult::Continue)
    }
}
