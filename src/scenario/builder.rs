//! 拓扑构建
//!
//! EPC 网关 + 远端主机（点对点回传）+ 网格基站 + 随机游走的终端。
//! 所有对象都由仿真器持有，这里只保存句柄。

use std::net::Ipv4Addr;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use super::config::{AttachPolicy, ScenarioConfig};
use super::layout::{GridLayout, random_endpoint_positions};
use super::profile::RadioProfile;
use crate::api::SimApi;
use crate::error::SimError;
use crate::lte::{MobilityModel, Rectangle, UE_SUBNET, Vector3};
use crate::net::{DeviceId, Ipv4Prefix, NodeId};

/// 网关与远端主机之间的子网
pub const INTERNET_SUBNET: Ipv4Prefix = Ipv4Prefix::from_const(Ipv4Addr::new(1, 0, 0, 0), 8);
/// 终端步行速度范围（米/秒）
pub const UE_SPEED_MIN: f64 = 0.5;
pub const UE_SPEED_MAX: f64 = 2.0;

/// 构建好的仿真世界句柄
#[derive(Debug, Clone)]
pub struct ScenarioWorld {
    pub pgw: NodeId,
    pub remote_host: NodeId,
    pub remote_address: Ipv4Addr,
    pub cells: Vec<NodeId>,
    pub cell_devices: Vec<DeviceId>,
    pub cell_positions: Vec<Vector3>,
    pub endpoints: Vec<NodeId>,
    pub endpoint_devices: Vec<DeviceId>,
    pub endpoint_addresses: Vec<Ipv4Addr>,
}

#[tracing::instrument(
    skip_all,
    fields(tech = %config.tech, n_ues = config.n_ues, n_enbs = config.n_enbs)
)]
pub fn build<A: SimApi>(
    api: &mut A,
    config: &ScenarioConfig,
    profile: &RadioProfile,
) -> Result<ScenarioWorld, SimError> {
    let pgw = api.create_gateway()?;

    // 远端主机经点对点回传接到网关
    let remote_host = api.create_node()?;
    api.install_ip_stack(&[remote_host])?;
    let [pgw_dev, remote_dev] = api.create_p2p_link(
        pgw,
        remote_host,
        profile.backhaul_rate_bps,
        profile.backhaul_delay,
    )?;
    let addrs = api.assign_ipv4(&[pgw_dev, remote_dev], INTERNET_SUBNET)?;
    let remote_address = addrs
        .get(1)
        .copied()
        .ok_or(SimError::NoAddress(remote_host))?;
    api.add_static_route(remote_host, UE_SUBNET, remote_dev)?;
    debug!(%remote_address, delay = %profile.backhaul_delay, "远端主机已接入");

    // 基站：固定位置，网格排列
    let cells = api.create_nodes(usize::from(config.n_enbs))?;
    let grid = GridLayout::new(config.n_enbs, config.area_size);
    let cell_positions = grid.positions(config.n_enbs);
    for (&node, &position) in cells.iter().zip(&cell_positions) {
        api.install_mobility(node, MobilityModel::ConstantPosition { position })?;
        info!(?node, x = position.x, y = position.y, z = position.z, "基站位置");
    }

    // 终端：均匀撒点，区域内随机游走
    let endpoints = api.create_nodes(config.n_ues as usize)?;
    let bounds = Rectangle::centered_square(config.area_size);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let starts = random_endpoint_positions(config.n_ues, config.area_size, &mut rng);
    for (&node, &start) in endpoints.iter().zip(&starts) {
        api.install_mobility(
            node,
            MobilityModel::random_walk(start, bounds, UE_SPEED_MIN, UE_SPEED_MAX),
        )?;
    }

    let cell_devices = api.install_cell_devices(&cells, profile.cell_bandwidth())?;
    let endpoint_devices = api.install_endpoint_devices(&endpoints)?;
    api.install_ip_stack(&endpoints)?;
    let endpoint_addresses = api.assign_endpoint_ipv4(&endpoint_devices)?;
    let gateway = api.endpoint_default_gateway()?;
    for &ue in &endpoints {
        api.set_default_route(ue, gateway)?;
    }

    match config.attach_policy() {
        AttachPolicy::StrongestSignal => api.attach(&endpoint_devices)?,
        AttachPolicy::Fixed(i) => {
            let cell = *cell_devices
                .get(usize::from(i))
                .ok_or(SimError::NoCells)?;
            for &ue in &endpoint_devices {
                api.attach_to(ue, cell)?;
            }
        }
    }
    info!(
        cells = cells.len(),
        endpoints = endpoints.len(),
        rows = grid.rows,
        cols = grid.cols,
        "拓扑构建完成"
    );

    Ok(ScenarioWorld {
        pgw,
        remote_host,
        remote_address,
        cells,
        cell_devices,
        cell_positions,
        endpoints,
        endpoint_devices,
        endpoint_addresses,
    })
}
