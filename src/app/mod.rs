//! UDP 应用
//!
//! 远端主机上的 UDP 接收端，与每个终端上的恒定速率 UDP 发送端。
//! 应用只在启动与停止之间工作，窗口由 `AppStart`/`AppStop` 事件驱动。

mod events;
mod udp_sink;
mod udp_source;

pub use events::{AppStart, AppStop, UdpSend};
pub use udp_sink::UdpSink;
pub use udp_source::UdpSource;

use crate::net::{NodeId, Packet};

#[derive(Debug, Clone)]
pub enum App {
    Sink(UdpSink),
    Source(UdpSource),
}

impl App {
    pub fn node(&self) -> NodeId {
        match self {
            App::Sink(s) => s.node(),
            App::Source(s) => s.node(),
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            App::Sink(s) => s.is_active(),
            App::Source(s) => s.is_active(),
        }
    }

    pub fn as_sink(&self) -> Option<&UdpSink> {
        match self {
            App::Sink(s) => Some(s),
            App::Source(_) => None,
        }
    }

    pub fn as_source(&self) -> Option<&UdpSource> {
        match self {
            App::Source(s) => Some(s),
            App::Sink(_) => None,
        }
    }

    pub(crate) fn listens_on(&self, port: u16) -> bool {
        matches!(self, App::Sink(s) if s.port() == port)
    }

    pub(crate) fn on_receive(&mut self, pkt: &Packet) {
        if let App::Sink(s) = self {
            s.receive(pkt);
        }
    }
}
