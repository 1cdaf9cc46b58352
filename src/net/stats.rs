//! 网络层计数器（与 flow monitor 无关，始终启用）。

/// 网络统计信息
#[derive(Debug, Default, Clone)]
pub struct Stats {
    pub sent_pkts: u64,
    pub delivered_pkts: u64,
    pub delivered_bytes: u64,
    pub dropped_pkts: u64,
    pub dropped_bytes: u64,
}
