//! 无线配置
//!
//! 两种技术用同一个 LTE 模型；"5G" 只是更宽的带宽加更快的回传。

use serde::{Deserialize, Serialize};

use super::config::Technology;
use crate::api::CellBandwidth;
use crate::sim::SimTime;

pub const BACKHAUL_RATE_BPS: u64 = 10_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioProfile {
    pub dl_bandwidth_rb: u16,
    pub ul_bandwidth_rb: u16,
    /// 网关到远端主机链路的时延
    pub backhaul_delay: SimTime,
    pub backhaul_rate_bps: u64,
}

impl RadioProfile {
    pub fn for_technology(tech: Technology) -> Self {
        match tech {
            Technology::FourG => Self {
                dl_bandwidth_rb: 50,
                ul_bandwidth_rb: 50,
                backhaul_delay: SimTime::from_millis(10),
                backhaul_rate_bps: BACKHAUL_RATE_BPS,
            },
            Technology::FiveG => Self {
                dl_bandwidth_rb: 100,
                ul_bandwidth_rb: 100,
                backhaul_delay: SimTime::from_millis(2),
                backhaul_rate_bps: BACKHAUL_RATE_BPS,
            },
        }
    }

    pub fn cell_bandwidth(&self) -> CellBandwidth {
        CellBandwidth {
            dl_rb: self.dl_bandwidth_rb,
            ul_rb: self.ul_bandwidth_rb,
        }
    }
}
