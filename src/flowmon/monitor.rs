//! 每 flow 统计
//!
//! 源节点 IP 层发出时开始跟踪一个 packet，目的节点 IP 层交付时结束跟踪。
//! 被丢弃的 packet 立即计为丢失；迟迟没有进展的 packet 由
//! `check_for_lost_packets` 判定为丢失。

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::classifier::{FiveTuple, FlowId, Ipv4FlowClassifier};
use crate::net::Packet;
use crate::sim::SimTime;

/// 超过这个时间没有任何进展的 packet 视为丢失
pub const DEFAULT_MAX_PER_HOP_DELAY: SimTime = SimTime(10_000_000_000);

/// 丢包原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DropReason {
    /// 出口队列或基站缓存已满
    QueueOverflow,
    /// 终端不在任何小区的覆盖范围内
    RadioOutage,
    /// 终端尚未接入小区
    NotAttached,
    /// 路由表没有匹配项
    NoRoute,
    /// 节点没有 IPv4 协议栈
    NoIpStack,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DropReason::QueueOverflow => "queue-overflow",
            DropReason::RadioOutage => "radio-outage",
            DropReason::NotAttached => "not-attached",
            DropReason::NoRoute => "no-route",
            DropReason::NoIpStack => "no-ip-stack",
        };
        f.write_str(s)
    }
}

/// 一个 flow 的统计量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowStats {
    pub flow_id: FlowId,
    pub tuple: FiveTuple,
    pub tx_packets: u64,
    pub tx_bytes: u64,
    pub rx_packets: u64,
    pub rx_bytes: u64,
    pub lost_packets: u64,
    /// 所有已接收 packet 的端到端时延之和
    pub delay_sum: SimTime,
    /// 相邻两个已接收 packet 的时延差绝对值之和
    pub jitter_sum: SimTime,
    pub time_first_tx: Option<SimTime>,
    pub time_last_tx: Option<SimTime>,
    pub time_first_rx: Option<SimTime>,
    pub time_last_rx: Option<SimTime>,
    pub packets_dropped: BTreeMap<DropReason, u64>,
    #[serde(skip)]
    last_delay: Option<SimTime>,
}

impl FlowStats {
    pub fn new(flow_id: FlowId, tuple: FiveTuple) -> Self {
        Self {
            flow_id,
            tuple,
            tx_packets: 0,
            tx_bytes: 0,
            rx_packets: 0,
            rx_bytes: 0,
            lost_packets: 0,
            delay_sum: SimTime::ZERO,
            jitter_sum: SimTime::ZERO,
            time_first_tx: None,
            time_last_tx: None,
            time_first_rx: None,
            time_last_rx: None,
            packets_dropped: BTreeMap::new(),
            last_delay: None,
        }
    }

    fn record_rx(&mut self, size_bytes: u32, delay: SimTime, now: SimTime) {
        if self.rx_packets > 0 {
            if let Some(last) = self.last_delay {
                self.jitter_sum = self.jitter_sum.saturating_add(delay.abs_diff(last));
            }
        }
        self.last_delay = Some(delay);
        self.delay_sum = self.delay_sum.saturating_add(delay);
        self.rx_packets += 1;
        self.rx_bytes += u64::from(size_bytes);
        self.time_first_rx.get_or_insert(now);
        self.time_last_rx = Some(now);
    }
}

#[derive(Debug, Clone, Copy)]
struct TrackedPacket {
    flow_id: FlowId,
    first_seen: SimTime,
    last_seen: SimTime,
}

#[derive(Debug, Clone)]
pub struct FlowMonitor {
    classifier: Ipv4FlowClassifier,
    flows: BTreeMap<FlowId, FlowStats>,
    tracked: HashMap<u64, TrackedPacket>,
    max_per_hop_delay: SimTime,
}

impl Default for FlowMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PER_HOP_DELAY)
    }
}

impl FlowMonitor {
    pub fn new(max_per_hop_delay: SimTime) -> Self {
        Self {
            classifier: Ipv4FlowClassifier::default(),
            flows: BTreeMap::new(),
            tracked: HashMap::new(),
            max_per_hop_delay,
        }
    }

    pub fn classifier(&self) -> &Ipv4FlowClassifier {
        &self.classifier
    }

    /// 仍在网络中、尚未定论的 packet 数
    pub fn in_flight(&self) -> usize {
        self.tracked.len()
    }

    pub fn report_first_tx(&mut self, pkt: &Packet, now: SimTime) {
        let (flow_id, new) = self.classifier.classify(pkt);
        if new {
            debug!(flow_id, tuple = ?FiveTuple::of(pkt), "新 flow");
        }
        let stats = self
            .flows
            .entry(flow_id)
            .or_insert_with(|| FlowStats::new(flow_id, FiveTuple::of(pkt)));
        stats.tx_packets += 1;
        stats.tx_bytes += u64::from(pkt.size_bytes);
        stats.time_first_tx.get_or_insert(now);
        stats.time_last_tx = Some(now);

        self.tracked.insert(
            pkt.id,
            TrackedPacket {
                flow_id,
                first_seen: now,
                last_seen: now,
            },
        );
    }

    pub fn report_forwarding(&mut self, pkt: &Packet, now: SimTime) {
        if let Some(t) = self.tracked.get_mut(&pkt.id) {
            t.last_seen = now;
        }
    }

    pub fn report_last_rx(&mut self, pkt: &Packet, now: SimTime) {
        let Some(t) = self.tracked.remove(&pkt.id) else {
            return;
        };
        if let Some(stats) = self.flows.get_mut(&t.flow_id) {
            stats.record_rx(pkt.size_bytes, now.saturating_sub(t.first_seen), now);
        }
    }

    pub fn report_drop(&mut self, pkt: &Packet, reason: DropReason, _now: SimTime) {
        let Some(t) = self.tracked.remove(&pkt.id) else {
            return;
        };
        if let Some(stats) = self.flows.get_mut(&t.flow_id) {
            stats.lost_packets += 1;
            *stats.packets_dropped.entry(reason).or_default() += 1;
        }
    }

    /// 把超过 `max_per_hop_delay` 没有进展的 packet 判为丢失
    pub fn check_for_lost_packets(&mut self, now: SimTime) {
        let max = self.max_per_hop_delay;
        let mut lost = 0u64;
        let flows = &mut self.flows;
        self.tracked.retain(|_, t| {
            if now.saturating_sub(t.last_seen) > max {
                if let Some(stats) = flows.get_mut(&t.flow_id) {
                    stats.lost_packets += 1;
                }
                lost += 1;
                false
            } else {
                true
            }
        });
        debug!(lost, in_flight = self.tracked.len(), "检查超时丢包");
    }

    /// 所有 flow 的统计，按 flow id 升序
    pub fn flow_stats(&self) -> Vec<FlowStats> {
        self.flows.values().cloned().collect()
    }
}
