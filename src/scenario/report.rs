//! 结果报告
//!
//! 固定格式的文本块，写到标准输出。浮点数按 `%g`（6 位有效数字）输出。

use std::fmt;

use super::config::{ScenarioConfig, Variant};
use super::reducer::AggregateReport;

/// 与 C 的 `%g` 相同：6 位有效数字，去掉末尾的零
pub fn format_general(v: f64) -> String {
    const PRECISION: i32 = 6;
    if v.is_nan() {
        return "nan".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if v == 0.0 {
        return if v.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // 先按科学计数法舍入，再由舍入后的指数决定格式
    let sci = format!("{:.*e}", (PRECISION - 1) as usize, v);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);

    if exp < -4 || exp >= PRECISION {
        let mantissa = trim_fraction(mantissa);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    } else {
        let decimals = (PRECISION - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{v:.decimals$}")).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// 一次运行的完整报告
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub config: &'a ScenarioConfig,
    pub aggregate: &'a AggregateReport,
}

impl<'a> Report<'a> {
    pub fn new(config: &'a ScenarioConfig, aggregate: &'a AggregateReport) -> Self {
        Self { config, aggregate }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.config;
        let a = self.aggregate;
        let g = format_general;

        let footer = match c.variant {
            Variant::SingleCell => {
                writeln!(f, "================ RESULTADOS ({}) ================", c.tech)?;
                writeln!(f, "Usuarios (UEs):            {}", c.n_ues)?;
                "=".repeat(50)
            }
            Variant::MultiCell => {
                writeln!(
                    f,
                    "================ RESULTADOS MULTI-CELULA ({}) ================",
                    c.tech
                )?;
                writeln!(f, "Usuarios (UEs):            {}", c.n_ues)?;
                writeln!(f, "eNodeBs (células):         {}", c.n_enbs)?;
                writeln!(
                    f,
                    "Area da cidade (m):        {} x {}",
                    g(c.area_size),
                    g(c.area_size)
                )?;
                "=".repeat(64)
            }
        };
        writeln!(f, "Tempo de simulacao (s):    {}", g(c.sim_time))?;
        writeln!(f, "Atraso medio (ms):         {}", g(a.mean_delay_ms))?;
        writeln!(f, "Jitter medio (ms):         {}", g(a.jitter_ms))?;
        writeln!(f, "Throughput total (Mbps):   {}", g(a.throughput_mbps))?;
        writeln!(f, "Taxa de perda (%):         {}", g(a.loss_rate_pct))?;
        writeln!(f, "Pacotes recebidos:         {}", a.rx_packets)?;
        writeln!(f, "Pacotes perdidos:          {}", a.lost_packets)?;
        writeln!(f, "{footer}")
    }
}
