//! 五元组分类器

use std::collections::HashMap;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::net::Packet;

pub type FlowId = u32;

/// (源地址, 目的地址, 源端口, 目的端口, 协议)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FiveTuple {
    pub source_address: Ipv4Addr,
    pub destination_address: Ipv4Addr,
    pub source_port: u16,
    pub destination_port: u16,
    pub protocol: u8,
}

impl FiveTuple {
    pub fn of(pkt: &Packet) -> Self {
        Self {
            source_address: *pkt.src.ip(),
            destination_address: *pkt.dst.ip(),
            source_port: pkt.src.port(),
            destination_port: pkt.dst.port(),
            protocol: pkt.protocol,
        }
    }
}

/// flow id 从 1 开始，按首个 packet 出现的顺序分配
#[derive(Debug, Default, Clone)]
pub struct Ipv4FlowClassifier {
    ids: HashMap<FiveTuple, FlowId>,
    tuples: Vec<FiveTuple>,
}

impl Ipv4FlowClassifier {
    /// 返回 (flow id, 是否新 flow)
    pub fn classify(&mut self, pkt: &Packet) -> (FlowId, bool) {
        let tuple = FiveTuple::of(pkt);
        if let Some(&id) = self.ids.get(&tuple) {
            return (id, false);
        }
        self.tuples.push(tuple);
        let id = self.tuples.len() as FlowId;
        self.ids.insert(tuple, id);
        (id, true)
    }

    pub fn find_flow(&self, id: FlowId) -> Option<FiveTuple> {
        let idx = usize::try_from(id).ok()?.checked_sub(1)?;
        self.tuples.get(idx).copied()
    }

    pub fn flow_count(&self) -> usize {
        self.tuples.len()
    }
}
