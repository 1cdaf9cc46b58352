//! 无线链路预算
//!
//! 自由空间（Friis）路径损耗 + 热噪声得到 SNR，再按带 BER 间隙的
//! Shannon 公式换算成频谱效率。频谱效率决定一个 packet 占用多少空口时间，
//! 上行数据在空口发送结束后的第一个 TTI 边界交给基站。

use crate::sim::SimTime;

/// 上行载频（Hz）
pub const UL_CARRIER_HZ: f64 = 1.93e9;
/// 下行载频（Hz），用于接入时的参考信号强度
pub const DL_CARRIER_HZ: f64 = 2.12e9;
pub const UE_TX_POWER_DBM: f64 = 10.0;
pub const ENB_TX_POWER_DBM: f64 = 30.0;
pub const ENB_NOISE_FIGURE_DB: f64 = 5.0;
pub const THERMAL_NOISE_DBM_PER_HZ: f64 = -174.0;
/// 一个资源块的带宽
pub const RB_BANDWIDTH_HZ: f64 = 180e3;
pub const TTI: SimTime = SimTime(1_000_000);
/// 从数据到达终端缓存到获得上行授权的时延
pub const UL_GRANT_DELAY: SimTime = SimTime(4_000_000);
/// 目标误码率，决定 Shannon 公式的 SNR 间隙
pub const TARGET_BER: f64 = 0.00005;
/// 最低调制编码方式对应的频谱效率，低于它视为无覆盖
pub const MIN_SPECTRAL_EFFICIENCY: f64 = 0.15;
/// 最高调制编码方式对应的频谱效率
pub const MAX_SPECTRAL_EFFICIENCY: f64 = 5.5547;

const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Friis 路径损耗（dB）。距离小于三个波长时按三个波长计算。
pub fn friis_path_loss_db(distance_m: f64, carrier_hz: f64) -> f64 {
    let lambda = SPEED_OF_LIGHT / carrier_hz;
    let d = distance_m.max(3.0 * lambda);
    20.0 * (4.0 * std::f64::consts::PI * d / lambda).log10()
}

/// `rbs` 个资源块上的噪声功率（dBm）
pub fn noise_power_dbm(rbs: u16, noise_figure_db: f64) -> f64 {
    let bw = f64::from(rbs.max(1)) * RB_BANDWIDTH_HZ;
    THERMAL_NOISE_DBM_PER_HZ + 10.0 * bw.log10() + noise_figure_db
}

/// 上行 SNR（dB）：终端以全功率占满 `rbs` 个资源块
pub fn uplink_snr_db(distance_m: f64, rbs: u16) -> f64 {
    UE_TX_POWER_DBM
        - friis_path_loss_db(distance_m, UL_CARRIER_HZ)
        - noise_power_dbm(rbs, ENB_NOISE_FIGURE_DB)
}

/// 下行参考信号接收功率（dBm），用于选择最强小区
pub fn rsrp_dbm(distance_m: f64) -> f64 {
    ENB_TX_POWER_DBM - friis_path_loss_db(distance_m, DL_CARRIER_HZ)
}

/// 频谱效率（bit/s/Hz）；低于最低档返回 None（无覆盖）
pub fn spectral_efficiency(snr_db: f64) -> Option<f64> {
    let gap = -(5.0 * TARGET_BER).ln() / 1.5;
    let snr = 10f64.powf(snr_db / 10.0);
    let se = (1.0 + snr / gap).log2();
    if se < MIN_SPECTRAL_EFFICIENCY {
        return None;
    }
    Some(se.min(MAX_SPECTRAL_EFFICIENCY))
}

/// 占满 `rbs` 个资源块时的速率（bit/s）
pub fn data_rate_bps(rbs: u16, spectral_efficiency: f64) -> f64 {
    f64::from(rbs) * RB_BANDWIDTH_HZ * spectral_efficiency
}

/// 发送 `bytes` 占用的空口时间，至少 1ns
pub fn airtime(bytes: u32, rbs: u16, spectral_efficiency: f64) -> SimTime {
    let rate = data_rate_bps(rbs.max(1), spectral_efficiency);
    let nanos = (f64::from(bytes) * 8.0 / rate * 1e9).ceil();
    SimTime(nanos as u64).max(SimTime(1))
}

/// 不早于 `t` 的下一个 TTI 边界
pub fn next_tti_boundary(t: SimTime) -> SimTime {
    SimTime(t.0.div_ceil(TTI.0).saturating_mul(TTI.0))
}
