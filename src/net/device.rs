//! 网络设备
//!
//! 节点通过设备接入链路：点对点网卡、基站无线设备、终端无线设备。

use super::id::{LinkId, NodeId};
use crate::lte::{EnbDevice, UeDevice};

/// 点对点网卡：持有本端的出方向链路
#[derive(Debug, Clone)]
pub struct P2pDevice {
    pub node: NodeId,
    pub peer: NodeId,
    pub link: LinkId,
}

#[derive(Debug)]
pub enum Device {
    P2p(P2pDevice),
    Enb(EnbDevice),
    Ue(UeDevice),
}

impl Device {
    pub fn node(&self) -> NodeId {
        match self {
            Device::P2p(d) => d.node,
            Device::Enb(d) => d.node,
            Device::Ue(d) => d.node,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Device::P2p(_) => "point-to-point",
            Device::Enb(_) => "cell",
            Device::Ue(_) => "endpoint",
        }
    }
}
