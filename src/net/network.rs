//! 网络 arena
//!
//! `Network` 独占所有仿真对象：节点、链路、设备、应用与 flow monitor。
//! 外部只通过 `NodeId`/`DeviceId`/`AppId`/`LinkId` 句柄访问它们。

use std::net::Ipv4Addr;

use super::deliver_packet::DeliverPacket;
use super::device::{Device, P2pDevice};
use super::id::{AppId, DeviceId, LinkId, NodeId};
use super::ipv4::Ipv4Prefix;
use super::link::Link;
use super::link_ready::LinkReady;
use super::node::{Interface, Ipv4Stack, Node};
use super::packet::Packet;
use super::stats::Stats;
use crate::app::App;
use crate::error::SimError;
use crate::flowmon::{DropReason, FlowMonitor};
use crate::lte::Epc;
use crate::queue::PacketQueue;
use crate::sim::{SimTime, Simulator};
use tracing::{debug, trace};

/// 网络拓扑与其上全部对象
#[derive(Debug, Default)]
pub struct Network {
    pub(crate) nodes: Vec<Node>,
    pub(crate) links: Vec<Link>,
    pub(crate) devices: Vec<Device>,
    /// 基站设备，按安装顺序
    cells: Vec<DeviceId>,
    ue_devices: usize,
    pub(crate) apps: Vec<App>,
    pub(crate) epc: Option<Epc>,
    pub(crate) monitor: Option<FlowMonitor>,
    /// 移动性随机数的基础种子
    pub(crate) seed: u64,
    next_pkt_id: u64,
    pub stats: Stats,
}

impl Network {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// 添加节点
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(id, name));
        id
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, SimError> {
        self.nodes.get(id.0).ok_or(SimError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SimError> {
        self.nodes.get_mut(id.0).ok_or(SimError::UnknownNode(id))
    }

    pub fn device(&self, id: DeviceId) -> Result<&Device, SimError> {
        self.devices.get(id.0).ok_or(SimError::UnknownDevice(id))
    }

    pub(crate) fn device_mut(&mut self, id: DeviceId) -> Result<&mut Device, SimError> {
        self.devices.get_mut(id.0).ok_or(SimError::UnknownDevice(id))
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.0)
    }

    pub fn app(&self, id: AppId) -> Result<&App, SimError> {
        self.apps.get(id.0).ok_or(SimError::UnknownApp(id))
    }

    pub(crate) fn app_mut(&mut self, id: AppId) -> Result<&mut App, SimError> {
        self.apps.get_mut(id.0).ok_or(SimError::UnknownApp(id))
    }

    pub(crate) fn add_device(&mut self, device: Device) -> DeviceId {
        let id = DeviceId(self.devices.len());
        let node = device.node();
        match &device {
            Device::Enb(_) => self.cells.push(id),
            Device::Ue(_) => self.ue_devices += 1,
            Device::P2p(_) => {}
        }
        self.devices.push(device);
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.devices.push(id);
        }
        id
    }

    /// 所有基站设备，按安装顺序
    pub(crate) fn cell_devices(&self) -> &[DeviceId] {
        &self.cells
    }

    pub(crate) fn ue_device_count(&self) -> usize {
        self.ue_devices
    }

    pub(crate) fn add_app(&mut self, node: NodeId, app: App) -> Result<AppId, SimError> {
        let id = AppId(self.apps.len());
        self.node_mut(node)?.apps.push(id);
        self.apps.push(app);
        Ok(id)
    }

    /// 创建一条单向链路
    pub(crate) fn connect(
        &mut self,
        from: NodeId,
        to: NodeId,
        latency: SimTime,
        bandwidth_bps: u64,
    ) -> LinkId {
        let id = LinkId(self.links.len());
        self.links.push(Link::new(from, to, latency, bandwidth_bps));
        id
    }

    /// 点对点信道：两条反向链路 + 两端各一个网卡
    pub fn add_p2p_link(
        &mut self,
        a: NodeId,
        b: NodeId,
        bandwidth_bps: u64,
        latency: SimTime,
    ) -> Result<[DeviceId; 2], SimError> {
        self.node(a)?;
        self.node(b)?;
        if bandwidth_bps == 0 {
            return Err(SimError::ZeroDataRate);
        }
        let ab = self.connect(a, b, latency, bandwidth_bps);
        let ba = self.connect(b, a, latency, bandwidth_bps);
        let dev_a = self.add_device(Device::P2p(P2pDevice {
            node: a,
            peer: b,
            link: ab,
        }));
        let dev_b = self.add_device(Device::P2p(P2pDevice {
            node: b,
            peer: a,
            link: ba,
        }));
        debug!(?a, ?b, bandwidth_bps, latency = %latency, "点对点链路已创建");
        Ok([dev_a, dev_b])
    }

    pub fn install_ip_stack(&mut self, node: NodeId) -> Result<(), SimError> {
        let n = self.node_mut(node)?;
        if n.ipv4.is_none() {
            n.ipv4 = Some(Ipv4Stack::default());
        }
        Ok(())
    }

    pub(crate) fn ipv4_mut(&mut self, node: NodeId) -> Result<&mut Ipv4Stack, SimError> {
        self.node_mut(node)?
            .ipv4
            .as_mut()
            .ok_or(SimError::NoIpStack(node))
    }

    /// 给设备配置地址，并加入对应的直连路由
    pub(crate) fn assign_address(
        &mut self,
        device: DeviceId,
        addr: Ipv4Addr,
        prefix: Ipv4Prefix,
    ) -> Result<(), SimError> {
        let node = self.device(device)?.node();
        let stack = self.ipv4_mut(node)?;
        stack.interfaces.push(Interface {
            addr,
            prefix,
            device,
        });
        stack.routes.add_network_route(prefix, device, None);
        trace!(?node, ?device, %addr, %prefix, "地址已分配");
        Ok(())
    }

    pub(crate) fn next_packet_id(&mut self) -> u64 {
        let id = self.next_pkt_id;
        self.next_pkt_id = self.next_pkt_id.wrapping_add(1);
        id
    }

    /// 源节点 IP 层发出 packet（flow monitor 从这里开始跟踪）
    pub(crate) fn ip_send(&mut self, node: NodeId, pkt: Packet, sim: &mut Simulator) {
        self.stats.sent_pkts += 1;
        if let Some(m) = &mut self.monitor {
            m.report_first_tx(&pkt, sim.now());
        }
        self.ip_forward(node, pkt, sim);
    }

    /// 查路由表选择出口设备
    fn ip_forward(&mut self, node: NodeId, pkt: Packet, sim: &mut Simulator) {
        let egress = self.nodes[node.0]
            .ipv4
            .as_ref()
            .and_then(|s| s.routes.lookup(*pkt.dst.ip()))
            .map(|r| r.egress);
        match egress {
            Some(dev) => self.transmit(dev, pkt, sim),
            None => {
                debug!(?node, dst = %pkt.dst, "无路由，丢弃");
                self.drop_packet(pkt, DropReason::NoRoute, sim.now());
            }
        }
    }

    /// 通过设备发出 packet
    pub(crate) fn transmit(&mut self, device: DeviceId, pkt: Packet, sim: &mut Simulator) {
        let link = match &self.devices[device.0] {
            Device::P2p(d) => Some(d.link),
            Device::Enb(d) => Some(d.s1u),
            Device::Ue(_) => None,
        };
        match link {
            Some(link) => self.send_on_link(link, pkt, sim),
            None => self.radio_uplink(device, pkt, sim),
        }
    }

    /// 入链路队列；链路空闲则立即开始发送
    pub(crate) fn send_on_link(&mut self, link_id: LinkId, pkt: Packet, sim: &mut Simulator) {
        let link = &mut self.links[link_id.0];
        if let Err(pkt) = link.queue.enqueue(pkt) {
            debug!(?link_id, "链路队列溢出");
            self.drop_packet(pkt, DropReason::QueueOverflow, sim.now());
            return;
        }
        if !link.busy {
            self.start_link_tx(link_id, sim);
        }
    }

    fn start_link_tx(&mut self, link_id: LinkId, sim: &mut Simulator) {
        let link = &mut self.links[link_id.0];
        let Some(pkt) = link.queue.dequeue() else {
            return;
        };
        let depart = sim.now().saturating_add(link.tx_time(pkt.size_bytes));
        let arrive = depart.saturating_add(link.latency);
        let to = link.to;
        link.busy = true;
        trace!(
            ?link_id,
            pkt_id = pkt.id,
            depart = ?depart,
            arrive = ?arrive,
            "开始序列化发送"
        );

        sim.schedule(depart, LinkReady { link_id });
        sim.schedule(arrive, DeliverPacket { to, pkt });
    }

    /// 链路完成一次发送后继续发送队列中的下一个 packet
    pub(crate) fn on_link_ready(&mut self, link_id: LinkId, sim: &mut Simulator) {
        self.links[link_id.0].busy = false;
        self.start_link_tx(link_id, sim);
    }

    /// packet 到达节点
    pub(crate) fn deliver(&mut self, to: NodeId, pkt: Packet, sim: &mut Simulator) {
        // 基站：上行 packet 直接走 S1-U 隧道
        if let Some(s1u) = self.enb_uplink_of(to) {
            self.report_forwarding(&pkt, sim.now());
            self.send_on_link(s1u, pkt, sim);
            return;
        }

        let local = match &self.nodes[to.0].ipv4 {
            Some(stack) => stack.owns(*pkt.dst.ip()),
            None => {
                self.drop_packet(pkt, DropReason::NoIpStack, sim.now());
                return;
            }
        };
        if local {
            self.local_deliver(to, pkt, sim.now());
        } else {
            self.report_forwarding(&pkt, sim.now());
            self.ip_forward(to, pkt, sim);
        }
    }

    fn enb_uplink_of(&self, node: NodeId) -> Option<LinkId> {
        self.nodes[node.0]
            .devices
            .iter()
            .find_map(|d| match &self.devices[d.0] {
                Device::Enb(enb) => Some(enb.s1u),
                _ => None,
            })
    }

    fn report_forwarding(&mut self, pkt: &Packet, now: SimTime) {
        if let Some(m) = &mut self.monitor {
            m.report_forwarding(pkt, now);
        }
    }

    /// 目的节点 IP 层交付，再按端口交给 UDP 应用
    fn local_deliver(&mut self, node: NodeId, pkt: Packet, now: SimTime) {
        self.stats.delivered_pkts += 1;
        self.stats.delivered_bytes += u64::from(pkt.size_bytes);
        if let Some(m) = &mut self.monitor {
            m.report_last_rx(&pkt, now);
        }

        let port = pkt.dst.port();
        let sink = self.nodes[node.0]
            .apps
            .iter()
            .copied()
            .find(|a| self.apps[a.0].listens_on(port));
        match sink {
            Some(app) => self.apps[app.0].on_receive(&pkt),
            None => trace!(?node, port, "没有监听该端口的应用"),
        }
    }

    pub(crate) fn drop_packet(&mut self, pkt: Packet, reason: DropReason, now: SimTime) {
        self.stats.dropped_pkts += 1;
        self.stats.dropped_bytes += u64::from(pkt.size_bytes);
        if let Some(m) = &mut self.monitor {
            m.report_drop(&pkt, reason, now);
        }
    }

    /// 节点当前位置；没有移动性模型时返回 None
    pub(crate) fn position_of(
        &mut self,
        node: NodeId,
        now: SimTime,
    ) -> Option<crate::lte::Vector3> {
        self.nodes
            .get_mut(node.0)?
            .mobility
            .as_mut()
            .map(|m| m.position_at(now))
    }
}
