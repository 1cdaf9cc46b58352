//! 静态路由表
//!
//! 每个带 IPv4 协议栈的节点持有一张路由表，按最长前缀匹配选择出口设备。
//! 直连路由在分配地址时自动加入；默认路由与静态网络路由由场景显式安装。

use std::net::Ipv4Addr;

use super::id::DeviceId;
use super::ipv4::Ipv4Prefix;

/// 一条路由
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub prefix: Ipv4Prefix,
    pub egress: DeviceId,
    /// 下一跳网关；直连路由为 None
    pub gateway: Option<Ipv4Addr>,
}

#[derive(Debug, Default, Clone)]
pub struct RoutingTable {
    routes: Vec<Route>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// 加入网络路由；同前缀的旧路由被替换。
    pub fn add_network_route(
        &mut self,
        prefix: Ipv4Prefix,
        egress: DeviceId,
        gateway: Option<Ipv4Addr>,
    ) {
        self.routes.retain(|r| r.prefix != prefix);
        self.routes.push(Route {
            prefix,
            egress,
            gateway,
        });
    }

    /// 设置默认路由（`0.0.0.0/0`），替换已有的默认路由。
    pub fn set_default_route(&mut self, gateway: Ipv4Addr, egress: DeviceId) {
        self.add_network_route(Ipv4Prefix::ANY, egress, Some(gateway));
    }

    pub fn default_route(&self) -> Option<&Route> {
        self.routes.iter().find(|r| r.prefix.is_default())
    }

    /// 最长前缀匹配；等长时先加入者优先。
    pub fn lookup(&self, dst: Ipv4Addr) -> Option<&Route> {
        let mut best: Option<&Route> = None;
        for r in self.routes.iter().filter(|r| r.prefix.contains(dst)) {
            match best {
                Some(b) if b.prefix.prefix_len() >= r.prefix.prefix_len() => {}
                _ => best = Some(r),
            }
        }
        best
    }

    /// 查找与 `addr` 直连的出口设备（用于确定到网关的接口）。
    pub fn connected_egress(&self, addr: Ipv4Addr) -> Option<DeviceId> {
        self.routes
            .iter()
            .filter(|r| r.gateway.is_none() && !r.prefix.is_default())
            .filter(|r| r.prefix.contains(addr))
            .max_by_key(|r| r.prefix.prefix_len())
            .map(|r| r.egress)
    }
}
