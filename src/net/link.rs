//! 点对点链路
//!
//! 单向链路：带宽、传播时延与一个尾丢弃出口队列。

use super::id::NodeId;
use crate::queue::{DropTailQueue, mem_from_pkt};
use crate::sim::SimTime;

/// 点对点设备默认队列长度（packets）
pub const P2P_QUEUE_PKTS: u64 = 100;

/// 网络链路
#[derive(Debug)]
pub struct Link {
    pub from: NodeId,
    pub to: NodeId,
    pub latency: SimTime,
    pub bandwidth_bps: u64,
    /// 正在序列化发送一个 packet
    pub busy: bool,
    pub queue: DropTailQueue,
}

impl Link {
    /// 创建新链路
    pub fn new(from: NodeId, to: NodeId, latency: SimTime, bandwidth_bps: u64) -> Self {
        Self {
            from,
            to,
            latency,
            bandwidth_bps,
            busy: false,
            queue: DropTailQueue::new(mem_from_pkt(P2P_QUEUE_PKTS)),
        }
    }

    /// 发送 `bytes` 所需的序列化时间：ceil(bytes*8 / bps) 秒 -> 纳秒
    pub(crate) fn tx_time(&self, bytes: u32) -> SimTime {
        if self.bandwidth_bps == 0 {
            return SimTime(u64::MAX / 4);
        }
        let bits = u128::from(bytes) * 8;
        let bps = u128::from(self.bandwidth_bps);
        let nanos = (bits * 1_000_000_000 + (bps - 1)) / bps;
        SimTime(nanos.min(u128::from(u64::MAX)) as u64)
    }
}
