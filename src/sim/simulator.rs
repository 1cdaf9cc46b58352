//! 仿真器
//!
//! 定义事件驱动仿真器，维护当前时间与事件队列。

use super::event::Event;
use super::scheduled_event::ScheduledEvent;
use super::time::SimTime;
use super::world::World;
use std::collections::BinaryHeap;
use tracing::{debug, info, trace};

/// 事件驱动仿真器：维护当前时间与事件队列。
#[derive(Default)]
pub struct Simulator {
    now: SimTime,
    next_seq: u64,
    executed: u64,
    q: BinaryHeap<ScheduledEvent>,
}

impl Simulator {
    /// 获取当前仿真时间
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 已执行的事件总数
    pub fn executed_events(&self) -> u64 {
        self.executed
    }

    /// 队列中尚未执行的事件数
    pub fn pending_events(&self) -> usize {
        self.q.len()
    }

    /// 调度事件在指定时间执行。早于当前时间的请求按当前时间处理。
    pub fn schedule<E: Event>(&mut self, at: SimTime, ev: E) {
        let at = at.max(self.now);
        let seq = self.next_seq;
        trace!(now = ?self.now, seq, schedule_at = ?at, "调度事件");

        self.next_seq = self.next_seq.wrapping_add(1);
        self.q.push(ScheduledEvent {
            at,
            seq,
            ev: Box::new(ev),
        });
    }

    /// 在当前时间之后 `delay` 调度事件
    pub fn schedule_in<E: Event>(&mut self, delay: SimTime, ev: E) {
        let at = self.now.saturating_add(delay);
        self.schedule(at, ev);
    }

    /// 运行直到事件队列为空或到达 `until`（含恰好在 `until` 的事件）。
    #[tracing::instrument(skip(self, world))]
    pub fn run_until(&mut self, until: SimTime, world: &mut dyn World) {
        info!(queue_size = self.q.len(), "▶️  开始运行仿真");
        let start_count = self.executed;

        while self.q.peek().is_some_and(|top| top.at <= until) {
            let Some(item) = self.q.pop() else {
                break;
            };
            self.dispatch(item, world);
        }
        self.now = self.now.max(until);

        info!(
            total_events = self.executed - start_count,
            final_time = %self.now,
            remaining_queue = self.q.len(),
            "✅ 仿真完成"
        );
    }

    /// 运行所有事件直到队列为空。
    pub fn run(&mut self, world: &mut dyn World) {
        while let Some(item) = self.q.pop() {
            self.dispatch(item, world);
        }
        debug!(final_time = ?self.now, events = self.executed, "事件队列已清空");
    }

    fn dispatch(&mut self, item: ScheduledEvent, world: &mut dyn World) {
        self.executed += 1;
        self.now = item.at;
        trace!(now = ?self.now, seq = item.seq, remaining_queue = self.q.len(), "执行事件");
        item.ev.execute(self, world);
        world.on_tick(self);
    }
}
