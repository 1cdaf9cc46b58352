//! 事件 trait

use super::simulator::Simulator;
use super::world::World;

/// 可被调度执行的事件。
///
/// `self: Box<Self>` 让事件在执行时取回自身所有权（例如把 packet move 给下一跳）。
pub trait Event: 'static {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World);
}
