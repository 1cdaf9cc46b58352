//! 恒定速率 UDP 发送端

use std::net::SocketAddrV4;

use crate::api::UdpSourceParams;
use crate::net::NodeId;

/// 启动时立即发第一个 packet，之后每隔 `interval` 发一个，
/// 最多 `max_packets` 个，停止时刻之后不再发送。
#[derive(Debug, Clone)]
pub struct UdpSource {
    node: NodeId,
    local: SocketAddrV4,
    remote: SocketAddrV4,
    params: UdpSourceParams,
    active: bool,
    /// 每次启动或停止加一，让过期的发送事件失效
    generation: u64,
    sent: u32,
}

impl UdpSource {
    pub(crate) fn new(
        node: NodeId,
        local: SocketAddrV4,
        remote: SocketAddrV4,
        params: UdpSourceParams,
    ) -> Self {
        Self {
            node,
            local,
            remote,
            params,
            active: false,
            generation: 0,
            sent: 0,
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn local(&self) -> SocketAddrV4 {
        self.local
    }

    pub fn remote(&self) -> SocketAddrV4 {
        self.remote
    }

    pub fn params(&self) -> &UdpSourceParams {
        &self.params
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn sent_packets(&self) -> u32 {
        self.sent
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn set_active(&mut self, active: bool) -> u64 {
        self.active = active;
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// 本次发送能否进行；可以则占用一个序号
    pub(crate) fn take_seq(&mut self, generation: u64) -> Option<u32> {
        if !self.active || generation != self.generation || self.sent >= self.params.max_packets {
            return None;
        }
        let seq = self.sent;
        self.sent += 1;
        Some(seq)
    }

    pub(crate) fn has_more(&self) -> bool {
        self.sent < self.params.max_packets
    }
}
