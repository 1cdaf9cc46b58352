//! 场景参数
//!
//! `ScenarioOptions` 是命令行给出的原始参数，`validate` 之后得到不可变的
//! `ScenarioConfig`。校验在创建任何仿真对象之前完成。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::SimTime;

/// 无线接入技术
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Technology {
    #[serde(rename = "4g")]
    FourG,
    #[serde(rename = "5g")]
    FiveG,
}

impl Technology {
    pub fn as_str(&self) -> &'static str {
        match self {
            Technology::FourG => "4g",
            Technology::FiveG => "5g",
        }
    }
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Technology {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "4g" => Ok(Technology::FourG),
            "5g" => Ok(Technology::FiveG),
            other => Err(ConfigError::UnknownTechnology(other.to_string())),
        }
    }
}

/// 场景形态：决定接入策略与报告格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    SingleCell,
    MultiCell,
}

/// 终端如何选择小区
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttachPolicy {
    /// 参考信号最强的小区
    StrongestSignal,
    /// 全部接入第 i 个小区
    Fixed(u16),
}

/// 未校验的场景参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOptions {
    pub variant: Variant,
    pub n_ues: u32,
    pub n_enbs: u16,
    /// 秒
    pub sim_time: f64,
    pub tech: String,
    /// 正方形城市区域边长（米）
    pub area_size: f64,
    /// 秒
    pub packet_interval: f64,
    pub packet_size: u32,
    pub verbose: bool,
    pub seed: u64,
}

impl ScenarioOptions {
    pub fn single_cell() -> Self {
        Self {
            variant: Variant::SingleCell,
            n_ues: 50,
            n_enbs: 1,
            sim_time: 30.0,
            tech: "4g".to_string(),
            area_size: 1000.0,
            packet_interval: 0.1,
            packet_size: 200,
            verbose: true,
            seed: 1,
        }
    }

    pub fn multi_cell() -> Self {
        Self {
            variant: Variant::MultiCell,
            n_ues: 100,
            n_enbs: 4,
            sim_time: 60.0,
            tech: "4g".to_string(),
            area_size: 2000.0,
            packet_interval: 0.02,
            packet_size: 200,
            verbose: true,
            seed: 1,
        }
    }

    pub fn validate(&self) -> Result<ScenarioConfig, ConfigError> {
        let tech: Technology = self.tech.parse()?;
        if self.n_ues == 0 {
            return Err(ConfigError::NoEndpoints);
        }
        if self.n_enbs == 0 {
            return Err(ConfigError::NoCells);
        }
        // NaN 也会被拒绝
        if !(self.sim_time > 0.5 && self.sim_time.is_finite()) {
            return Err(ConfigError::SimTimeTooShort(self.sim_time));
        }
        if !(self.area_size > 0.0 && self.area_size.is_finite()) {
            return Err(ConfigError::InvalidArea(self.area_size));
        }
        if !(self.packet_interval > 0.0 && self.packet_interval.is_finite()) {
            return Err(ConfigError::InvalidPacketInterval(self.packet_interval));
        }
        if self.packet_size == 0 {
            return Err(ConfigError::EmptyPacket);
        }
        Ok(ScenarioConfig {
            variant: self.variant,
            n_ues: self.n_ues,
            n_enbs: self.n_enbs,
            sim_time: self.sim_time,
            tech,
            area_size: self.area_size,
            packet_interval: self.packet_interval,
            packet_size: self.packet_size,
            verbose: self.verbose,
            seed: self.seed,
        })
    }
}

/// 校验过的场景参数，构建之后不再改变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub variant: Variant,
    pub n_ues: u32,
    pub n_enbs: u16,
    pub sim_time: f64,
    pub tech: Technology,
    pub area_size: f64,
    pub packet_interval: f64,
    pub packet_size: u32,
    pub verbose: bool,
    pub seed: u64,
}

impl ScenarioConfig {
    pub fn attach_policy(&self) -> AttachPolicy {
        match self.variant {
            Variant::SingleCell => AttachPolicy::Fixed(0),
            Variant::MultiCell => AttachPolicy::StrongestSignal,
        }
    }

    pub fn sim_end(&self) -> SimTime {
        SimTime::from_secs_f64(self.sim_time)
    }
}
