//! `SimApi` 的实现
//!
//! `LteSim` 持有仿真器与网络世界。一个实例只走一遍
//! 构建 -> 运行 -> 读取统计：运行之后再构建或再次运行会返回 `AlreadyRan`，
//! 运行之前读取统计返回 `NotRun`。需要重来就新建一个实例。

use std::net::{Ipv4Addr, SocketAddrV4};

use tracing::{debug, info};

use super::cell::{EnbDevice, UeDevice};
use super::epc::{Epc, S1U_DATA_RATE_BPS, S1U_DELAY};
use super::mobility::{Mobility, MobilityModel, Vector3};
use crate::api::{CellBandwidth, SimApi, UdpSourceParams};
use crate::app::{App, AppStart, AppStop, UdpSink, UdpSource};
use crate::error::SimError;
use crate::flowmon::{FlowMonitor, FlowStats};
use crate::net::{AddressPool, AppId, Device, DeviceId, Ipv4Prefix, NetWorld, Network, NodeId};
use crate::sim::{SimTime, Simulator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Building,
    Ran,
}

pub struct LteSim {
    sim: Simulator,
    world: NetWorld,
    phase: Phase,
}

impl LteSim {
    /// `seed` 决定终端随机游走的轨迹
    pub fn new(seed: u64) -> Self {
        Self {
            sim: Simulator::default(),
            world: NetWorld::new(Network::with_seed(seed)),
            phase: Phase::Building,
        }
    }

    pub fn network(&self) -> &Network {
        &self.world.net
    }

    pub fn now(&self) -> SimTime {
        self.sim.now()
    }

    pub fn executed_events(&self) -> u64 {
        self.sim.executed_events()
    }

    fn building(&self) -> Result<&Network, SimError> {
        match self.phase {
            Phase::Building => Ok(&self.world.net),
            Phase::Ran => Err(SimError::AlreadyRan),
        }
    }

    fn building_mut(&mut self) -> Result<&mut Network, SimError> {
        match self.phase {
            Phase::Building => Ok(&mut self.world.net),
            Phase::Ran => Err(SimError::AlreadyRan),
        }
    }

    fn finished(&self) -> Result<&Network, SimError> {
        match self.phase {
            Phase::Building => Err(SimError::NotRun),
            Phase::Ran => Ok(&self.world.net),
        }
    }

    /// 装无线设备的节点需要位置，且一个节点只能装一个无线设备
    fn check_radio_node(net: &Network, node: NodeId) -> Result<(), SimError> {
        let n = net.node(node)?;
        if n.mobility.is_none() {
            return Err(SimError::NoMobility(node));
        }
        let has_radio = n
            .devices()
            .iter()
            .any(|d| matches!(net.devices[d.0], Device::Enb(_) | Device::Ue(_)));
        if has_radio {
            return Err(SimError::RadioDeviceExists(node));
        }
        Ok(())
    }
}

/// 每个节点独立的随机数种子
fn mobility_seed(base: u64, node: NodeId) -> u64 {
    base.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(node.0 as u64)
}

impl SimApi for LteSim {
    fn create_nodes(&mut self, n: usize) -> Result<Vec<NodeId>, SimError> {
        let net = self.building_mut()?;
        Ok((0..n)
            .map(|_| {
                let name = format!("node{}", net.node_count());
                net.add_node(name)
            })
            .collect())
    }

    fn install_mobility(&mut self, node: NodeId, model: MobilityModel) -> Result<(), SimError> {
        let now = self.sim.now();
        let net = self.building_mut()?;
        let mobility = Mobility::install(model, now, mobility_seed(net.seed, node))?;
        net.node_mut(node)?.mobility = Some(mobility);
        Ok(())
    }

    fn set_position(&mut self, node: NodeId, position: Vector3) -> Result<(), SimError> {
        let now = self.sim.now();
        let net = self.building_mut()?;
        net.node_mut(node)?
            .mobility
            .as_mut()
            .ok_or(SimError::NoMobility(node))?
            .set_position(position, now);
        Ok(())
    }

    fn position(&mut self, node: NodeId) -> Result<Vector3, SimError> {
        let now = self.sim.now();
        let net = &mut self.world.net;
        net.node(node)?;
        net.position_of(node, now).ok_or(SimError::NoMobility(node))
    }

    fn create_gateway(&mut self) -> Result<NodeId, SimError> {
        let net = self.building_mut()?;
        if net.epc.is_some() {
            return Err(SimError::GatewayExists);
        }
        let pgw = net.add_node("pgw");
        net.install_ip_stack(pgw)?;
        net.epc = Some(Epc::new(pgw));
        debug!(?pgw, "EPC 网关已创建");
        Ok(pgw)
    }

    fn install_cell_devices(
        &mut self,
        nodes: &[NodeId],
        bandwidth: CellBandwidth,
    ) -> Result<Vec<DeviceId>, SimError> {
        let net = self.building_mut()?;
        let pgw = net.epc.as_ref().ok_or(SimError::NoGateway)?.pgw();
        if bandwidth.dl_rb == 0 || bandwidth.ul_rb == 0 {
            return Err(SimError::ZeroBandwidth);
        }
        for &node in nodes {
            Self::check_radio_node(net, node)?;
        }

        let mut devices = Vec::with_capacity(nodes.len());
        for &node in nodes {
            let cell_id = net.cell_devices().len() as u16 + 1;
            let s1u = net.connect(node, pgw, S1U_DELAY, S1U_DATA_RATE_BPS);
            let dev = net.add_device(Device::Enb(EnbDevice::new(node, cell_id, bandwidth, s1u)));
            debug!(?node, cell_id, ?bandwidth, "基站设备已安装");
            devices.push(dev);
        }
        Ok(devices)
    }

    fn install_endpoint_devices(&mut self, nodes: &[NodeId]) -> Result<Vec<DeviceId>, SimError> {
        let net = self.building_mut()?;
        for &node in nodes {
            Self::check_radio_node(net, node)?;
        }
        let mut imsi = net.ue_device_count() as u64;
        Ok(nodes
            .iter()
            .map(|&node| {
                imsi += 1;
                net.add_device(Device::Ue(UeDevice::new(node, imsi)))
            })
            .collect())
    }

    fn attach(&mut self, endpoints: &[DeviceId]) -> Result<(), SimError> {
        let now = self.sim.now();
        let net = self.building_mut()?;
        for &ue in endpoints {
            let cell = net.strongest_cell(ue, now)?;
            net.attach_ue(ue, cell)?;
        }
        Ok(())
    }

    fn attach_to(&mut self, endpoint: DeviceId, cell: DeviceId) -> Result<(), SimError> {
        self.building_mut()?.attach_ue(endpoint, cell)
    }

    fn serving_cell(&self, endpoint: DeviceId) -> Result<Option<DeviceId>, SimError> {
        match self.world.net.device(endpoint)? {
            Device::Ue(ue) => Ok(ue.serving()),
            _ => Err(SimError::WrongDeviceKind {
                device: endpoint,
                expected: "endpoint",
            }),
        }
    }

    fn create_p2p_link(
        &mut self,
        a: NodeId,
        b: NodeId,
        rate_bps: u64,
        delay: SimTime,
    ) -> Result<[DeviceId; 2], SimError> {
        self.building_mut()?.add_p2p_link(a, b, rate_bps, delay)
    }

    fn install_ip_stack(&mut self, nodes: &[NodeId]) -> Result<(), SimError> {
        let net = self.building_mut()?;
        for &node in nodes {
            net.install_ip_stack(node)?;
        }
        Ok(())
    }

    fn assign_ipv4(
        &mut self,
        devices: &[DeviceId],
        subnet: Ipv4Prefix,
    ) -> Result<Vec<Ipv4Addr>, SimError> {
        let net = self.building_mut()?;
        let mut pool = AddressPool::new(subnet);
        let mut addrs = Vec::with_capacity(devices.len());
        for &dev in devices {
            let addr = pool.allocate()?;
            net.assign_address(dev, addr, subnet)?;
            addrs.push(addr);
        }
        Ok(addrs)
    }

    fn assign_endpoint_ipv4(&mut self, devices: &[DeviceId]) -> Result<Vec<Ipv4Addr>, SimError> {
        let net = self.building_mut()?;
        let mut addrs = Vec::with_capacity(devices.len());
        for &dev in devices {
            if !matches!(net.device(dev)?, Device::Ue(_)) {
                return Err(SimError::WrongDeviceKind {
                    device: dev,
                    expected: "endpoint",
                });
            }
            let addr = net
                .epc
                .as_mut()
                .ok_or(SimError::NoGateway)?
                .allocate_ue_address()?;
            net.assign_address(dev, addr, super::UE_SUBNET)?;
            addrs.push(addr);
        }
        Ok(addrs)
    }

    fn endpoint_default_gateway(&self) -> Result<Ipv4Addr, SimError> {
        self.world
            .net
            .epc
            .as_ref()
            .map(Epc::default_gateway)
            .ok_or(SimError::NoGateway)
    }

    fn set_default_route(&mut self, node: NodeId, gateway: Ipv4Addr) -> Result<(), SimError> {
        let net = self.building_mut()?;
        let egress = net
            .node(node)?
            .ipv4()
            .ok_or(SimError::NoIpStack(node))?
            .routes
            .connected_egress(gateway)
            .ok_or(SimError::NoRouteToGateway { node, gateway })?;
        net.ipv4_mut(node)?.routes.set_default_route(gateway, egress);
        Ok(())
    }

    fn add_static_route(
        &mut self,
        node: NodeId,
        network: Ipv4Prefix,
        egress: DeviceId,
    ) -> Result<(), SimError> {
        let net = self.building_mut()?;
        if net.device(egress)?.node() != node {
            return Err(SimError::ForeignDevice {
                node,
                device: egress,
            });
        }
        net.ipv4_mut(node)?.routes.add_network_route(network, egress, None);
        Ok(())
    }

    fn install_udp_sink(&mut self, node: NodeId, port: u16) -> Result<AppId, SimError> {
        let net = self.building_mut()?;
        let n = net.node(node)?;
        if n.ipv4().is_none() {
            return Err(SimError::NoIpStack(node));
        }
        if n.apps.iter().any(|a| net.apps[a.0].listens_on(port)) {
            return Err(SimError::PortInUse { node, port });
        }
        net.add_app(node, App::Sink(UdpSink::new(node, port)))
    }

    fn install_udp_source(
        &mut self,
        node: NodeId,
        remote: SocketAddrV4,
        params: UdpSourceParams,
    ) -> Result<AppId, SimError> {
        if params.packet_size == 0 {
            return Err(SimError::EmptyPayload);
        }
        if params.interval == SimTime::ZERO {
            return Err(SimError::ZeroInterval);
        }
        let net = self.building_mut()?;
        let addr = net
            .node(node)?
            .ipv4()
            .ok_or(SimError::NoIpStack(node))?
            .primary_address()
            .ok_or(SimError::NoAddress(node))?;
        let port = net.node_mut(node)?.allocate_port();
        let local = SocketAddrV4::new(addr, port);
        net.add_app(node, App::Source(UdpSource::new(node, local, remote, params)))
    }

    fn schedule_app_window(
        &mut self,
        app: AppId,
        start: SimTime,
        stop: SimTime,
    ) -> Result<(), SimError> {
        self.building()?.app(app)?;
        if start >= stop {
            return Err(SimError::InvalidAppWindow { start, stop });
        }
        self.sim.schedule(start, AppStart { app });
        self.sim.schedule(stop, AppStop { app });
        Ok(())
    }

    fn install_flow_monitor(&mut self) -> Result<(), SimError> {
        let net = self.building_mut()?;
        net.monitor.get_or_insert_with(FlowMonitor::default);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn run_until(&mut self, until: SimTime) -> Result<(), SimError> {
        self.building()?;
        self.phase = Phase::Ran;
        self.sim.run_until(until, &mut self.world);
        let stats = &self.world.net.stats;
        info!(
            sent = stats.sent_pkts,
            delivered = stats.delivered_pkts,
            dropped = stats.dropped_pkts,
            events = self.sim.executed_events(),
            "运行结束"
        );
        Ok(())
    }

    fn check_for_lost_packets(&mut self) -> Result<(), SimError> {
        self.finished()?;
        let now = self.sim.now();
        self.world
            .net
            .monitor
            .as_mut()
            .ok_or(SimError::NoFlowMonitor)?
            .check_for_lost_packets(now);
        Ok(())
    }

    fn flow_stats(&self) -> Result<Vec<FlowStats>, SimError> {
        Ok(self
            .finished()?
            .monitor
            .as_ref()
            .ok_or(SimError::NoFlowMonitor)?
            .flow_stats())
    }
}
