//! 世界 trait

use super::simulator::Simulator;
use std::any::Any;

/// 仿真世界：事件通过 `as_any_mut` 向下转型取得具体状态（例如蜂窝网络）。
pub trait World: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// 每个事件执行完后调用一次。
    fn on_tick(&mut self, _sim: &mut Simulator) {}
}
