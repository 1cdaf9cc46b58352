//! 网络模拟模块
//!
//! 节点、设备、点对点链路、IPv4 寻址与路由，以及驱动它们的事件。

mod deliver_packet;
mod device;
mod id;
mod ipv4;
mod link;
mod link_ready;
mod net_world;
mod network;
mod node;
mod packet;
mod routing;
mod stats;

pub use deliver_packet::DeliverPacket;
pub use device::{Device, P2pDevice};
pub use id::{AppId, DeviceId, LinkId, NodeId};
pub use ipv4::{AddressPool, Ipv4Prefix, ParsePrefixError};
pub use link::{Link, P2P_QUEUE_PKTS};
pub use link_ready::LinkReady;
pub use net_world::NetWorld;
pub use network::Network;
pub use node::{FIRST_EPHEMERAL_PORT, Interface, Ipv4Stack, Node};
pub use packet::{IPV4_HEADER_BYTES, PROTO_UDP, Packet, UDP_HEADER_BYTES};
pub use routing::{Route, RoutingTable};
pub use stats::Stats;
