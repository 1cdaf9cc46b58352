//! 统计归并
//!
//! 把每个 flow 的统计归并成一份总报告。时延与抖动先按秒累加，
//! 求平均之后再换算成毫秒。
//!
//! 抖动的分母是全局接收包数减一，而不是各 flow 的 `rx - 1` 之和；
//! flow 很多而每个 flow 包数很少时，这个平均值会偏小。

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::flowmon::FlowStats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub flows: usize,
    pub mean_delay_ms: f64,
    pub jitter_ms: f64,
    pub throughput_mbps: f64,
    pub loss_rate_pct: f64,
    pub rx_packets: u64,
    pub lost_packets: u64,
}

/// `rx_bytes` 在 `sim_time` 秒内对应的吞吐量（Mbps）
pub fn throughput_mbps(rx_bytes: u64, sim_time: f64) -> f64 {
    (rx_bytes as f64 * 8.0) / (sim_time * 1e6)
}

/// `verbose` 为真时每个 flow 输出一行 `info!`
pub fn reduce(flows: &[FlowStats], sim_time: f64, verbose: bool) -> AggregateReport {
    let mut total_delay = 0.0;
    let mut total_jitter = 0.0;
    let mut rx_packets: u64 = 0;
    let mut rx_bytes: u64 = 0;
    let mut lost_packets: u64 = 0;

    for f in flows {
        let delay_s = f.delay_sum.as_secs_f64();
        if verbose {
            let flow_delay_ms = if f.rx_packets > 0 {
                delay_s / f.rx_packets as f64 * 1000.0
            } else {
                0.0
            };
            info!(
                flow_id = f.flow_id,
                src = %f.tuple.source_address,
                dst = %f.tuple.destination_address,
                throughput_mbps = throughput_mbps(f.rx_bytes, sim_time),
                mean_delay_ms = flow_delay_ms,
                rx_packets = f.rx_packets,
                lost_packets = f.lost_packets,
                "flow"
            );
        }

        total_delay += delay_s;
        // 单包 flow 没有抖动
        if f.rx_packets > 1 {
            total_jitter += f.jitter_sum.as_secs_f64();
        }
        rx_packets += f.rx_packets;
        rx_bytes += f.rx_bytes;
        lost_packets += f.lost_packets;
    }

    let mut report = AggregateReport {
        flows: flows.len(),
        mean_delay_ms: 0.0,
        jitter_ms: 0.0,
        throughput_mbps: 0.0,
        loss_rate_pct: 0.0,
        rx_packets,
        lost_packets,
    };
    if rx_packets > 0 {
        report.mean_delay_ms = total_delay / rx_packets as f64 * 1000.0;
        if rx_packets > 1 {
            report.jitter_ms = total_jitter / (rx_packets - 1) as f64 * 1000.0;
        }
        report.throughput_mbps = throughput_mbps(rx_bytes, sim_time);
    }
    let offered = rx_packets + lost_packets;
    if offered > 0 {
        report.loss_rate_pct = lost_packets as f64 * 100.0 / offered as f64;
    }
    report
}
