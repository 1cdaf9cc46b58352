//! 业务流量
//!
//! 远端主机上一个 UDP 接收端，每个终端一个恒定速率 UDP 发送端，
//! 全部发往同一个接收端。接收端比发送端早 0.4s 开始监听。

use std::net::SocketAddrV4;

use tracing::{info, warn};

use super::builder::ScenarioWorld;
use super::config::ScenarioConfig;
use crate::api::{SimApi, UdpSourceParams};
use crate::error::SimError;
use crate::net::AppId;
use crate::sim::SimTime;

pub const SINK_PORT: u16 = 1234;
pub const SINK_START: SimTime = SimTime(100_000_000);
pub const SOURCE_START: SimTime = SimTime(500_000_000);
/// 实际上不限包数
pub const MAX_PACKETS: u32 = u32::MAX;
/// 超过这个总发包率时给出警告
pub const OFFERED_LOAD_WARN_PPS: f64 = 1_000_000.0;

#[derive(Debug, Clone)]
pub struct TrafficHandles {
    pub sink: AppId,
    pub sources: Vec<AppId>,
}

/// 所有终端合计的发包率（packets/s）
pub fn offered_load_pps(n_ues: u32, packet_interval: f64) -> f64 {
    f64::from(n_ues) / packet_interval
}

pub fn install<A: SimApi>(
    api: &mut A,
    world: &ScenarioWorld,
    config: &ScenarioConfig,
) -> Result<TrafficHandles, SimError> {
    let stop = config.sim_end();
    let load = offered_load_pps(config.n_ues, config.packet_interval);
    if load > OFFERED_LOAD_WARN_PPS {
        warn!(
            load_pps = load,
            limit_pps = OFFERED_LOAD_WARN_PPS,
            "offered load is extreme; the run may take very long"
        );
    }

    let sink = api.install_udp_sink(world.remote_host, SINK_PORT)?;
    api.schedule_app_window(sink, SINK_START, stop)?;

    let remote = SocketAddrV4::new(world.remote_address, SINK_PORT);
    let params = UdpSourceParams {
        packet_size: config.packet_size,
        interval: SimTime::from_secs_f64(config.packet_interval),
        max_packets: MAX_PACKETS,
    };
    let mut sources = Vec::with_capacity(world.endpoints.len());
    for &ue in &world.endpoints {
        let app = api.install_udp_source(ue, remote, params)?;
        api.schedule_app_window(app, SOURCE_START, stop)?;
        sources.push(app);
    }
    info!(sources = sources.len(), %remote, load_pps = load, "业务已安装");

    Ok(TrafficHandles { sink, sources })
}
