//! 城市蜂窝场景
//!
//! 把少量参数变成一个完整的仿真世界：网关与远端主机、网格基站、
//! 随机游走的终端、UDP 业务，运行后把每个 flow 的统计归并成一份报告。

pub mod builder;
pub mod config;
pub mod layout;
pub mod profile;
pub mod reducer;
pub mod report;
pub mod runner;
pub mod traffic;

pub use builder::{ScenarioWorld, build};
pub use config::{AttachPolicy, ScenarioConfig, ScenarioOptions, Technology, Variant};
pub use layout::GridLayout;
pub use profile::RadioProfile;
pub use reducer::{AggregateReport, reduce};
pub use report::{Report, format_general};
pub use runner::{RunOutcome, execute, run, run_with};
pub use traffic::TrafficHandles;
