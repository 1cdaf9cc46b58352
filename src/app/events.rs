//! 应用事件

use tracing::{debug, trace};

use super::App;
use crate::net::{AppId, NetWorld, Network, Packet};
use crate::sim::{Event, Simulator, World};

/// 事件：应用开始工作
#[derive(Debug)]
pub struct AppStart {
    pub app: AppId,
}

/// 事件：应用停止工作
#[derive(Debug)]
pub struct AppStop {
    pub app: AppId,
}

/// 事件：发送端发出下一个 packet
#[derive(Debug)]
pub struct UdpSend {
    pub app: AppId,
    pub generation: u64,
}

impl Event for AppStart {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        NetWorld::net_of(world).start_app(self.app, sim);
    }
}

impl Event for AppStop {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        NetWorld::net_of(world).stop_app(self.app, sim);
    }
}

impl Event for UdpSend {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let UdpSend { app, generation } = *self;
        NetWorld::net_of(world).udp_send(app, generation, sim);
    }
}

impl Network {
    pub(crate) fn start_app(&mut self, app: AppId, sim: &mut Simulator) {
        let Ok(a) = self.app_mut(app) else {
            return;
        };
        match a {
            App::Sink(s) => s.set_active(true),
            App::Source(s) => {
                let generation = s.set_active(true);
                sim.schedule(sim.now(), UdpSend { app, generation });
            }
        }
        debug!(?app, now = %sim.now(), "应用启动");
    }

    pub(crate) fn stop_app(&mut self, app: AppId, sim: &mut Simulator) {
        let Ok(a) = self.app_mut(app) else {
            return;
        };
        match a {
            App::Sink(s) => s.set_active(false),
            App::Source(s) => {
                s.set_active(false);
            }
        }
        debug!(?app, now = %sim.now(), "应用停止");
    }

    pub(crate) fn udp_send(&mut self, app: AppId, generation: u64, sim: &mut Simulator) {
        let now = sim.now();
        let Ok(App::Source(src)) = self.app_mut(app) else {
            return;
        };
        let Some(seq) = src.take_seq(generation) else {
            return;
        };
        let (node, local, remote, params) = (src.node(), src.local(), src.remote(), *src.params());
        let more = src.has_more();
        debug_assert_eq!(src.generation(), generation);

        let id = self.next_packet_id();
        let pkt = Packet::udp(id, local, remote, params.packet_size, seq, now, node);
        trace!(?app, seq, pkt_id = id, "UDP 发送");
        self.ip_send(node, pkt, sim);

        if more {
            sim.schedule_in(params.interval, UdpSend { app, generation });
        }
    }
}
