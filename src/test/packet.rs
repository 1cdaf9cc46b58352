use std::net::{Ipv4Addr, SocketAddrV4};

use crate::flowmon::FiveTuple;
use crate::net::{IPV4_HEADER_BYTES, NodeId, PROTO_UDP, Packet, UDP_HEADER_BYTES};
use crate::sim::SimTime;

fn addr(a: u8, b: u8, c: u8, d: u8, port: u16) -> SocketAddrV4 {
    SocketAddrV4::new(Ipv4Addr::new(a, b, c, d), port)
}

#[test]
fn udp_packet_size_includes_ip_and_udp_headers() {
    let pkt = Packet::udp(
        7,
        addr(7, 0, 0, 2, 49153),
        addr(1, 0, 0, 2, 1234),
        200,
        3,
        SimTime::from_millis(500),
        NodeId(4),
    );
    assert_eq!(pkt.protocol, PROTO_UDP);
    assert_eq!(pkt.size_bytes, 200 + IPV4_HEADER_BYTES + UDP_HEADER_BYTES);
    assert_eq!(pkt.size_bytes, 228);
    assert_eq!(pkt.payload_bytes(), 200);
    assert_eq!(pkt.seq, 3);
    assert_eq!(pkt.origin, NodeId(4));
}

#[test]
fn five_tuple_is_taken_from_packet_addresses() {
    let pkt = Packet::udp(
        1,
        addr(7, 0, 0, 9, 49160),
        addr(1, 0, 0, 2, 1234),
        10,
        0,
        SimTime::ZERO,
        NodeId(0),
    );
    let t = FiveTuple::of(&pkt);
    assert_eq!(t.source_address, Ipv4Addr::new(7, 0, 0, 9));
    assert_eq!(t.destination_address, Ipv4Addr::new(1, 0, 0, 2));
    assert_eq!(t.source_port, 49160);
    assert_eq!(t.destination_port, 1234);
    assert_eq!(t.protocol, PROTO_UDP);
}
