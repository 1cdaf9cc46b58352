//! 仿真器能力接口
//!
//! 场景构建只通过 `SimApi` 操作仿真器：所有对象都由仿真器持有，
//! 调用方拿到的是不透明句柄。`crate::lte::LteSim` 是它的实现。

use std::net::{Ipv4Addr, SocketAddrV4};

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::flowmon::FlowStats;
use crate::lte::{MobilityModel, Vector3};
use crate::net::{AppId, DeviceId, Ipv4Prefix, NodeId};
use crate::sim::SimTime;

/// 基站带宽（资源块个数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellBandwidth {
    pub dl_rb: u16,
    pub ul_rb: u16,
}

/// UDP 恒定速率源参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UdpSourceParams {
    /// UDP 负载长度
    pub packet_size: u32,
    pub interval: SimTime,
    pub max_packets: u32,
}

pub trait SimApi {
    fn create_nodes(&mut self, n: usize) -> Result<Vec<NodeId>, SimError>;

    fn create_node(&mut self) -> Result<NodeId, SimError> {
        let nodes = self.create_nodes(1)?;
        nodes.first().copied().ok_or(SimError::NodeCountMismatch {
            requested: 1,
            created: nodes.len(),
        })
    }

    fn install_mobility(&mut self, node: NodeId, model: MobilityModel) -> Result<(), SimError>;
    fn set_position(&mut self, node: NodeId, position: Vector3) -> Result<(), SimError>;
    /// 当前仿真时刻的位置
    fn position(&mut self, node: NodeId) -> Result<Vector3, SimError>;

    /// 创建 EPC 分组网关节点
    fn create_gateway(&mut self) -> Result<NodeId, SimError>;
    fn install_cell_devices(
        &mut self,
        nodes: &[NodeId],
        bandwidth: CellBandwidth,
    ) -> Result<Vec<DeviceId>, SimError>;
    fn install_endpoint_devices(&mut self, nodes: &[NodeId]) -> Result<Vec<DeviceId>, SimError>;
    /// 每个终端接入参考信号最强的小区
    fn attach(&mut self, endpoints: &[DeviceId]) -> Result<(), SimError>;
    fn attach_to(&mut self, endpoint: DeviceId, cell: DeviceId) -> Result<(), SimError>;
    fn serving_cell(&self, endpoint: DeviceId) -> Result<Option<DeviceId>, SimError>;

    fn create_p2p_link(
        &mut self,
        a: NodeId,
        b: NodeId,
        rate_bps: u64,
        delay: SimTime,
    ) -> Result<[DeviceId; 2], SimError>;
    fn install_ip_stack(&mut self, nodes: &[NodeId]) -> Result<(), SimError>;
    /// 从 `subnet` 的第一个主机地址开始依次分配
    fn assign_ipv4(
        &mut self,
        devices: &[DeviceId],
        subnet: Ipv4Prefix,
    ) -> Result<Vec<Ipv4Addr>, SimError>;
    /// 从 EPC 终端地址池分配
    fn assign_endpoint_ipv4(&mut self, devices: &[DeviceId]) -> Result<Vec<Ipv4Addr>, SimError>;
    fn endpoint_default_gateway(&self) -> Result<Ipv4Addr, SimError>;
    fn set_default_route(&mut self, node: NodeId, gateway: Ipv4Addr) -> Result<(), SimError>;
    fn add_static_route(
        &mut self,
        node: NodeId,
        network: Ipv4Prefix,
        egress: DeviceId,
    ) -> Result<(), SimError>;

    fn install_udp_sink(&mut self, node: NodeId, port: u16) -> Result<AppId, SimError>;
    fn install_udp_source(
        &mut self,
        node: NodeId,
        remote: SocketAddrV4,
        params: UdpSourceParams,
    ) -> Result<AppId, SimError>;
    fn schedule_app_window(
        &mut self,
        app: AppId,
        start: SimTime,
        stop: SimTime,
    ) -> Result<(), SimError>;

    fn install_flow_monitor(&mut self) -> Result<(), SimError>;
    /// 唯一的挂起点：推进仿真到 `until`
    fn run_until(&mut self, until: SimTime) -> Result<(), SimError>;
    fn check_for_lost_packets(&mut self) -> Result<(), SimError>;
    fn flow_stats(&self) -> Result<Vec<FlowStats>, SimError>;
}
