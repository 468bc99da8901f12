use std::{env, fs, path::Path};

use anyhow::{Context, Result};
use log::info;

use skylark::{
    estimator::{EstimatorConfig, EstimatorNode, PassthroughEstimator},
    nodes::{FixedRateExecutor, NodeManager},
    parameters,
    telemetry::TelemetryService,
};

fn main() -> Result<()> {
    // Default log level to "info"
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    pretty_env_logger::init();

    let params_path = Path::new("config/params.toml");
    info!("Reading parameters from '{}'", params_path.display());

    let params_toml = fs::read_to_string(params_path)
        .with_context(|| format!("Cannot read '{}'", params_path.display()))?;
    let params = parameters::parse_string(&params_toml)?;

    let config = EstimatorConfig::from_parameters(&params)?;
    let period = config.period();

    info!(
        "Estimator running at {} Hz (period {} us)",
        config.update_rate_hz,
        period.num_microseconds().unwrap_or(0)
    );

    let ts = TelemetryService::default();
    let mut nm = NodeManager::new(ts, params);

    nm.add_node("estimator", |ctx| {
        Ok(Box::new(EstimatorNode::new(
            ctx,
            Box::new(PassthroughEstimator),
        )?))
    })?;

    FixedRateExecutor::run_blocking(nm, period)
}
