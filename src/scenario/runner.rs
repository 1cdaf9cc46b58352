//! 场景流水线
//!
//! 校验参数 -> 构建拓扑 -> 安装业务 -> 运行 -> 归并统计。
//! 任何一步出错都终止本次运行，不产生部分结果。

use tracing::info;

use super::builder::{self, ScenarioWorld};
use super::config::{ScenarioConfig, ScenarioOptions};
use super::profile::RadioProfile;
use super::reducer::{self, AggregateReport};
use super::report::Report;
use super::traffic::{self, TrafficHandles};
use crate::api::SimApi;
use crate::error::{ScenarioError, SimError};
use crate::flowmon::FlowStats;
use crate::lte::LteSim;

/// 一次运行的全部结果
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub config: ScenarioConfig,
    pub profile: RadioProfile,
    pub world: ScenarioWorld,
    pub traffic: TrafficHandles,
    pub flows: Vec<FlowStats>,
    pub aggregate: AggregateReport,
}

impl RunOutcome {
    pub fn report(&self) -> Report<'_> {
        Report::new(&self.config, &self.aggregate)
    }
}

/// 在给定仿真器上执行完整流水线
pub fn execute<A: SimApi>(config: &ScenarioConfig, api: &mut A) -> Result<RunOutcome, SimError> {
    info!(
        n_ues = config.n_ues,
        n_enbs = config.n_enbs,
        tech = %config.tech,
        area_size = config.area_size,
        sim_time = config.sim_time,
        "开始仿真"
    );
    let profile = RadioProfile::for_technology(config.tech);
    let world = builder::build(api, config, &profile)?;
    let traffic = traffic::install(api, &world, config)?;
    api.install_flow_monitor()?;

    api.run_until(config.sim_end())?;

    api.check_for_lost_packets()?;
    let flows = api.flow_stats()?;
    let aggregate = reducer::reduce(&flows, config.sim_time, config.verbose);

    Ok(RunOutcome {
        config: config.clone(),
        profile,
        world,
        traffic,
        flows,
        aggregate,
    })
}

/// 先校验，通过之后才由 `factory` 创建仿真器
pub fn run_with<A, F>(options: &ScenarioOptions, factory: F) -> Result<RunOutcome, ScenarioError>
where
    A: SimApi,
    F: FnOnce(&ScenarioConfig) -> A,
{
    let config = options.validate()?;
    let mut api = factory(&config);
    Ok(execute(&config, &mut api)?)
}

pub fn run(options: &ScenarioOptions) -> Result<RunOutcome, ScenarioError> {
    run_with(options, |config| LteSim::new(config.seed))
}
