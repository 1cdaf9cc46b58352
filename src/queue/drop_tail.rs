//! DropTail（尾丢弃）队列
//!
//! 容量按字节计；放不下的新 packet 原样退回给调用方。

use std::collections::VecDeque;

use crate::net::Packet;

use super::PacketQueue;

#[derive(Debug)]
pub struct DropTailQueue {
    max_bytes: u64,
    cur_bytes: u64,
    q: VecDeque<Packet>,
}

impl DropTailQueue {
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            cur_bytes: 0,
            q: VecDeque::new(),
        }
    }

    /// 扩容（例如基站每接入一个终端就多一份 RLC 缓存）。
    pub fn grow(&mut self, extra_bytes: u64) {
        self.max_bytes = self.max_bytes.saturating_add(extra_bytes);
    }
}

impl PacketQueue for DropTailQueue {
    fn enqueue(&mut self, pkt: Packet) -> Result<(), Packet> {
        let sz = u64::from(pkt.size_bytes);
        if self.cur_bytes.saturating_add(sz) > self.max_bytes {
            return Err(pkt);
        }
        self.cur_bytes += sz;
        self.q.push_back(pkt);
        Ok(())
    }

    fn dequeue(&mut self) -> Option<Packet> {
        let pkt = self.q.pop_front()?;
        self.cur_bytes = self.cur_bytes.saturating_sub(u64::from(pkt.size_bytes));
        Some(pkt)
    }

    fn len(&self) -> usize {
        self.q.len()
    }

    fn bytes(&self) -> u64 {
        self.cur_bytes
    }

    fn capacity_bytes(&self) -> u64 {
        self.max_bytes
    }
}
