//! 数据包类型
//!
//! 只建模 IPv4 + UDP：五元组、IP 层总长度与发送时刻。

use std::net::SocketAddrV4;

use super::id::NodeId;
use crate::sim::SimTime;

pub const IPV4_HEADER_BYTES: u32 = 20;
pub const UDP_HEADER_BYTES: u32 = 8;
pub const PROTO_UDP: u8 = 17;

/// 网络数据包
#[derive(Debug, Clone)]
pub struct Packet {
    pub id: u64,
    pub src: SocketAddrV4,
    pub dst: SocketAddrV4,
    pub protocol: u8,
    /// IP 层总长度（含 IP/UDP 头）
    pub size_bytes: u32,
    /// 应用层序号
    pub seq: u32,
    /// 源节点 IP 层发出时刻
    pub created_at: SimTime,
    /// 源节点（无线上行需要它的位置）
    pub origin: NodeId,
}

impl Packet {
    pub fn udp(
        id: u64,
        src: SocketAddrV4,
        dst: SocketAddrV4,
        payload_bytes: u32,
        seq: u32,
        created_at: SimTime,
        origin: NodeId,
    ) -> Self {
        Self {
            id,
            src,
            dst,
            protocol: PROTO_UDP,
            size_bytes: payload_bytes.saturating_add(IPV4_HEADER_BYTES + UDP_HEADER_BYTES),
            seq,
            created_at,
            origin,
        }
    }

    /// UDP 负载长度
    pub fn payload_bytes(&self) -> u32 {
        self.size_bytes
            .saturating_sub(IPV4_HEADER_BYTES + UDP_HEADER_BYTES)
    }
}
