//! UDP 接收端

use crate::net::{NodeId, Packet};

/// 绑定一个端口，只在活动期间计数
#[derive(Debug, Clone)]
pub struct UdpSink {
    node: NodeId,
    port: u16,
    active: bool,
    received_packets: u64,
    received_bytes: u64,
    /// 见过的最大序号
    highest_seq: Option<u32>,
}

impl UdpSink {
    pub(crate) fn new(node: NodeId, port: u16) -> Self {
        Self {
            node,
            port,
            active: false,
            received_packets: 0,
            received_bytes: 0,
            highest_seq: None,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn received_packets(&self) -> u64 {
        self.received_packets
    }

    /// UDP 负载字节数
    pub fn received_bytes(&self) -> u64 {
        self.received_bytes
    }

    pub fn highest_seq(&self) -> Option<u32> {
        self.highest_seq
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub(crate) fn receive(&mut self, pkt: &Packet) {
        if !self.active {
            return;
        }
        self.received_packets += 1;
        self.received_bytes += u64::from(pkt.payload_bytes());
        self.highest_seq = Some(self.highest_seq.map_or(pkt.seq, |s| s.max(pkt.seq)));
    }
}
