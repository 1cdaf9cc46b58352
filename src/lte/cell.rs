//! 基站与终端无线设备
//!
//! 每个基站一条共享上行信道：接入终端的 packet 按到达顺序排队，
//! 依次占用空口，在 TTI 边界交给基站节点，再经 S1-U 送往网关。

use tracing::{debug, trace};

use super::radio;
use crate::api::CellBandwidth;
use crate::error::SimError;
use crate::flowmon::DropReason;
use crate::net::{DeliverPacket, Device, DeviceId, LinkId, NetWorld, Network, NodeId, Packet};
use crate::queue::{DropTailQueue, PacketQueue};
use crate::sim::{Event, SimTime, Simulator, World};

/// 每个接入终端为基站增加的 RLC 缓存
pub const RLC_BUFFER_BYTES_PER_UE: u64 = 10 * 1024;

/// 基站无线设备
#[derive(Debug)]
pub struct EnbDevice {
    pub node: NodeId,
    pub cell_id: u16,
    pub dl_bandwidth_rb: u16,
    pub ul_bandwidth_rb: u16,
    /// 到网关的 S1-U 链路
    pub s1u: LinkId,
    queue: DropTailQueue,
    busy: bool,
    attached: Vec<DeviceId>,
}

impl EnbDevice {
    pub(crate) fn new(node: NodeId, cell_id: u16, bandwidth: CellBandwidth, s1u: LinkId) -> Self {
        Self {
            node,
            cell_id,
            dl_bandwidth_rb: bandwidth.dl_rb,
            ul_bandwidth_rb: bandwidth.ul_rb,
            s1u,
            queue: DropTailQueue::new(0),
            busy: false,
            attached: Vec::new(),
        }
    }

    /// 已接入的终端设备
    pub fn attached(&self) -> &[DeviceId] {
        &self.attached
    }

    pub fn queued_packets(&self) -> usize {
        self.queue.len()
    }

    pub fn buffer_bytes(&self) -> u64 {
        self.queue.capacity_bytes()
    }
}

/// 终端无线设备
#[derive(Debug, Clone)]
pub struct UeDevice {
    pub node: NodeId,
    pub imsi: u64,
    serving: Option<DeviceId>,
}

impl UeDevice {
    pub(crate) fn new(node: NodeId, imsi: u64) -> Self {
        Self {
            node,
            imsi,
            serving: None,
        }
    }

    pub fn serving(&self) -> Option<DeviceId> {
        self.serving
    }
}

/// 事件：基站上行信道发送完一个 packet，开始下一个。
#[derive(Debug)]
pub struct CellReady {
    pub cell: DeviceId,
}

impl Event for CellReady {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let CellReady { cell } = *self;
        NetWorld::net_of(world).on_cell_ready(cell, sim);
    }
}

impl Network {
    /// 终端经无线上行发送：进入服务小区的共享信道队列
    pub(crate) fn radio_uplink(&mut self, device: DeviceId, pkt: Packet, sim: &mut Simulator) {
        let serving = match &self.devices[device.0] {
            Device::Ue(ue) => ue.serving,
            _ => None,
        };
        let Some(cell) = serving else {
            debug!(?device, "终端未接入小区，丢弃");
            self.drop_packet(pkt, DropReason::NotAttached, sim.now());
            return;
        };

        let (accepted, idle) = match &mut self.devices[cell.0] {
            Device::Enb(enb) => (enb.queue.enqueue(pkt), !enb.busy),
            _ => (Err(pkt), false),
        };
        if let Err(pkt) = accepted {
            debug!(?cell, "基站上行缓存溢出");
            self.drop_packet(pkt, DropReason::QueueOverflow, sim.now());
            return;
        }
        if idle {
            self.start_uplink_tx(cell, sim);
        }
    }

    fn start_uplink_tx(&mut self, cell: DeviceId, sim: &mut Simulator) {
        let now = sim.now();
        loop {
            let (pkt, enb_node, ul_rb) = match &mut self.devices[cell.0] {
                Device::Enb(enb) => match enb.queue.dequeue() {
                    Some(pkt) => (pkt, enb.node, enb.ul_bandwidth_rb),
                    None => return,
                },
                _ => return,
            };

            let Some(se) = self.uplink_efficiency(pkt.origin, enb_node, ul_rb, now) else {
                trace!(?cell, pkt_id = pkt.id, "终端超出覆盖范围");
                self.drop_packet(pkt, DropReason::RadioOutage, now);
                continue;
            };

            // 数据到达终端缓存后要等上行授权才能发送
            let start = now.max(pkt.created_at.saturating_add(radio::UL_GRANT_DELAY));
            let end = start.saturating_add(radio::airtime(pkt.size_bytes, ul_rb, se));
            let deliver_at = radio::next_tti_boundary(end);
            if let Device::Enb(enb) = &mut self.devices[cell.0] {
                enb.busy = true;
            }
            trace!(
                ?cell,
                pkt_id = pkt.id,
                se,
                start = ?start,
                deliver_at = ?deliver_at,
                "上行发送"
            );

            sim.schedule(end, CellReady { cell });
            sim.schedule(deliver_at, DeliverPacket { to: enb_node, pkt });
            return;
        }
    }

    pub(crate) fn on_cell_ready(&mut self, cell: DeviceId, sim: &mut Simulator) {
        if let Some(Device::Enb(enb)) = self.devices.get_mut(cell.0) {
            enb.busy = false;
        }
        self.start_uplink_tx(cell, sim);
    }

    fn uplink_efficiency(
        &mut self,
        ue_node: NodeId,
        enb_node: NodeId,
        ul_rb: u16,
        now: SimTime,
    ) -> Option<f64> {
        let ue = self.position_of(ue_node, now)?;
        let enb = self.position_of(enb_node, now)?;
        radio::spectral_efficiency(radio::uplink_snr_db(ue.distance(&enb), ul_rb))
    }

    /// 选择参考信号最强的小区；强度相同取安装顺序靠前者
    pub(crate) fn strongest_cell(
        &mut self,
        ue: DeviceId,
        now: SimTime,
    ) -> Result<DeviceId, SimError> {
        let ue_node = match self.device(ue)? {
            Device::Ue(d) => d.node,
            _ => {
                return Err(SimError::WrongDeviceKind {
                    device: ue,
                    expected: "endpoint",
                });
            }
        };
        let ue_pos = self
            .position_of(ue_node, now)
            .ok_or(SimError::NoMobility(ue_node))?;

        let mut best: Option<(DeviceId, f64)> = None;
        for i in 0..self.cell_devices().len() {
            let cell = self.cell_devices()[i];
            let enb_node = self.devices[cell.0].node();
            let enb_pos = self
                .position_of(enb_node, now)
                .ok_or(SimError::NoMobility(enb_node))?;
            let rsrp = radio::rsrp_dbm(ue_pos.distance(&enb_pos));
            match best {
                Some((_, b)) if b >= rsrp => {}
                _ => best = Some((cell, rsrp)),
            }
        }
        best.map(|(cell, _)| cell).ok_or(SimError::NoCells)
    }

    /// 把终端接入指定小区；已接入其他小区时先切换出来
    pub(crate) fn attach_ue(&mut self, ue: DeviceId, cell: DeviceId) -> Result<(), SimError> {
        if !matches!(self.device(cell)?, Device::Enb(_)) {
            return Err(SimError::WrongDeviceKind {
                device: cell,
                expected: "cell",
            });
        }
        let previous = match self.device_mut(ue)? {
            Device::Ue(d) => d.serving.replace(cell),
            _ => {
                return Err(SimError::WrongDeviceKind {
                    device: ue,
                    expected: "endpoint",
                });
            }
        };
        if previous == Some(cell) {
            return Ok(());
        }
        if let Some(Device::Enb(old)) = previous.and_then(|p| self.devices.get_mut(p.0)) {
            old.attached.retain(|d| *d != ue);
        }
        if let Device::Enb(enb) = &mut self.devices[cell.0] {
            enb.attached.push(ue);
            enb.queue.grow(RLC_BUFFER_BYTES_PER_UE);
            debug!(?ue, cell_id = enb.cell_id, attached = enb.attached.len(), "终端接入小区");
        }
        Ok(())
    }
}
