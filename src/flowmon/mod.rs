//! Flow monitor
//!
//! 以五元组区分 flow，统计每个 flow 的收发、时延、抖动与丢包。

mod classifier;
mod monitor;

pub use classifier::{FiveTuple, FlowId, Ipv4FlowClassifier};
pub use monitor::{DEFAULT_MAX_PER_HOP_DELAY, DropReason, FlowMonitor, FlowStats};
