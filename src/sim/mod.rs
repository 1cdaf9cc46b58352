//! 仿真核心模块
//!
//! 离散事件仿真内核：仿真时间、事件、世界与仿真器。
//! 同一时刻的事件按调度顺序执行。

mod event;
mod scheduled_event;
mod simulator;
mod time;
mod world;

pub use event::Event;
pub use scheduled_event::ScheduledEvent;
pub use simulator::Simulator;
pub use time::SimTime;
pub use world::World;
