//! EPC 核心网
//!
//! 只建模分组网关（PGW）：基站经 S1-U 链路把上行 packet 交给它，
//! 它再按自己的路由表转发到外部网络。终端地址从 `7.0.0.0/8` 分配。

use std::net::Ipv4Addr;

use crate::error::SimError;
use crate::net::{AddressPool, Ipv4Prefix, NodeId};
use crate::sim::SimTime;

/// 终端地址池
pub const UE_SUBNET: Ipv4Prefix = Ipv4Prefix::from_const(Ipv4Addr::new(7, 0, 0, 0), 8);
/// 终端的默认网关（PGW 在终端子网上的地址）
pub const UE_DEFAULT_GATEWAY: Ipv4Addr = Ipv4Addr::new(7, 0, 0, 1);
pub const S1U_DATA_RATE_BPS: u64 = 10_000_000_000;
pub const S1U_DELAY: SimTime = SimTime::ZERO;

#[derive(Debug, Clone)]
pub struct Epc {
    pgw: NodeId,
    ue_pool: AddressPool,
}

impl Epc {
    pub fn new(pgw: NodeId) -> Self {
        Self {
            pgw,
            // 7.0.0.1 留给网关
            ue_pool: AddressPool::starting_at(UE_SUBNET, 2),
        }
    }

    pub fn pgw(&self) -> NodeId {
        self.pgw
    }

    pub fn default_gateway(&self) -> Ipv4Addr {
        UE_DEFAULT_GATEWAY
    }

    pub(crate) fn allocate_ue_address(&mut self) -> Result<Ipv4Addr, SimError> {
        self.ue_pool.allocate()
    }
}
