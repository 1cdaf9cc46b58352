//! 节点
//!
//! 节点本身没有行为，只是设备、IPv4 协议栈、应用与移动性的容器。
//! 装有基站设备的节点把上行 packet 经 S1-U 隧道转发给网关；
//! 其余节点按 IPv4 规则本地交付或查路由转发。

use std::net::Ipv4Addr;

use super::id::{AppId, DeviceId, NodeId};
use super::ipv4::Ipv4Prefix;
use super::routing::RoutingTable;
use crate::lte::mobility::Mobility;

/// 第一个临时端口
pub const FIRST_EPHEMERAL_PORT: u16 = 49153;

/// 绑定在某个设备上的 IPv4 地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub addr: Ipv4Addr,
    pub prefix: Ipv4Prefix,
    pub device: DeviceId,
}

/// IPv4 协议栈
#[derive(Debug, Default, Clone)]
pub struct Ipv4Stack {
    pub interfaces: Vec<Interface>,
    pub routes: RoutingTable,
}

impl Ipv4Stack {
    pub fn owns(&self, addr: Ipv4Addr) -> bool {
        self.interfaces.iter().any(|i| i.addr == addr)
    }

    /// 第一个配置的地址，作为 UDP 源地址
    pub fn primary_address(&self) -> Option<Ipv4Addr> {
        self.interfaces.first().map(|i| i.addr)
    }

    pub fn address_on(&self, device: DeviceId) -> Option<Ipv4Addr> {
        self.interfaces
            .iter()
            .find(|i| i.device == device)
            .map(|i| i.addr)
    }
}

#[derive(Debug)]
pub struct Node {
    id: NodeId,
    name: String,
    pub(crate) mobility: Option<Mobility>,
    pub(crate) ipv4: Option<Ipv4Stack>,
    pub(crate) devices: Vec<DeviceId>,
    pub(crate) apps: Vec<AppId>,
    next_port: u16,
}

impl Node {
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            mobility: None,
            ipv4: None,
            devices: Vec::new(),
            apps: Vec::new(),
            next_port: FIRST_EPHEMERAL_PORT,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn devices(&self) -> &[DeviceId] {
        &self.devices
    }

    pub fn ipv4(&self) -> Option<&Ipv4Stack> {
        self.ipv4.as_ref()
    }

    /// 分配临时端口；用尽后回绕
    pub(crate) fn allocate_port(&mut self) -> u16 {
        let port = self.next_port;
        self.next_port = if port == u16::MAX {
            FIRST_EPHEMERAL_PORT
        } else {
            port + 1
        };
        port
    }
}
