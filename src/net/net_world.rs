//! 网络世界实现
//!
//! 定义网络仿真的世界（World）实现，持有网络 arena。

use super::network::Network;
use crate::sim::World;
use std::any::Any;

/// 默认的网络世界实现：持有 Network。
#[derive(Debug, Default)]
pub struct NetWorld {
    pub net: Network,
}

impl NetWorld {
    pub fn new(net: Network) -> Self {
        Self { net }
    }

    /// 事件处理时从 `dyn World` 取回网络
    pub(crate) fn net_of(world: &mut dyn World) -> &mut Network {
        &mut world
            .as_any_mut()
            .downcast_mut::<NetWorld>()
            .expect("world must be NetWorld")
            .net
    }
}

impl World for NetWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
