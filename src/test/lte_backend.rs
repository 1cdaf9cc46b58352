use std::net::{Ipv4Addr, SocketAddrV4};

use crate::api::{CellBandwidth, SimApi, UdpSourceParams};
use crate::error::SimError;
use crate::flowmon::DropReason;
use crate::lte::{LteSim, MobilityModel, RLC_BUFFER_BYTES_PER_UE, Rectangle, Vector3};
use crate::net::{AppId, Device, DeviceId, Ipv4Prefix, NodeId};
use crate::sim::SimTime;

const BW: CellBandwidth = CellBandwidth {
    dl_rb: 50,
    ul_rb: 50,
};

struct Mini {
    api: LteSim,
    remote: NodeId,
    remote_addr: Ipv4Addr,
    cells: Vec<DeviceId>,
    ues: Vec<NodeId>,
    ue_devs: Vec<DeviceId>,
}

fn fixed(api: &mut LteSim, position: Vector3) -> NodeId {
    let node = api.create_node().expect("node");
    api.install_mobility(node, MobilityModel::ConstantPosition { position })
        .expect("mobility");
    node
}

/// 网关 + 远端主机（10ms 回传）+ 固定位置的基站与终端，终端尚未接入
fn mini(cells: &[Vector3], ues: &[Vector3]) -> Mini {
    let mut api = LteSim::new(1);
    let pgw = api.create_gateway().expect("pgw");
    let remote = api.create_node().expect("remote");
    api.install_ip_stack(&[remote]).expect("stack");
    let [pgw_dev, remote_dev] = api
        .create_p2p_link(pgw, remote, 10_000_000_000, SimTime::from_millis(10))
        .expect("link");
    let subnet: Ipv4Prefix = "1.0.0.0/8".parse().expect("prefix");
    let addrs = api.assign_ipv4(&[pgw_dev, remote_dev], subnet).expect("addrs");
    api.add_static_route(remote, "7.0.0.0/8".parse().expect("prefix"), remote_dev)
        .expect("route");

    let cell_nodes: Vec<NodeId> = cells.iter().map(|&p| fixed(&mut api, p)).collect();
    let ue_nodes: Vec<NodeId> = ues.iter().map(|&p| fixed(&mut api, p)).collect();
    let cell_devs = api.install_cell_devices(&cell_nodes, BW).expect("cells");
    let ue_devs = api.install_endpoint_devices(&ue_nodes).expect("ues");
    api.install_ip_stack(&ue_nodes).expect("stack");
    api.assign_endpoint_ipv4(&ue_devs).expect("ue addrs");
    let gw = api.endpoint_default_gateway().expect("gw");
    for &ue in &ue_nodes {
        api.set_default_route(ue, gw).expect("default route");
    }

    Mini {
        api,
        remote,
        remote_addr: addrs[1],
        cells: cell_devs,
        ues: ue_nodes,
        ue_devs,
    }
}

fn start_traffic(
    m: &mut Mini,
    interval: SimTime,
    start: SimTime,
    stop: SimTime,
) -> (AppId, Vec<AppId>) {
    let sink = m.api.install_udp_sink(m.remote, 1234).expect("sink");
    m.api.schedule_app_window(sink, SimTime::ZERO, stop).expect("window");
    let params = UdpSourceParams {
        packet_size: 200,
        interval,
        max_packets: u32::MAX,
    };
    let remote = SocketAddrV4::new(m.remote_addr, 1234);
    let sources = m
        .ues
        .clone()
        .into_iter()
        .map(|ue| {
            let app = m.api.install_udp_source(ue, remote, params).expect("source");
            m.api.schedule_app_window(app, start, stop).expect("window");
            app
        })
        .collect();
    m.api.install_flow_monitor().expect("monitor");
    (sink, sources)
}

#[test]
fn endpoint_addresses_come_from_epc_pool() {
    let m = mini(
        &[Vector3::new(0.0, 0.0, 30.0)],
        &[Vector3::new(10.0, 0.0, 1.5), Vector3::new(20.0, 0.0, 1.5)],
    );
    let net = m.api.network();
    let a0 = net.node(m.ues[0]).expect("ue").ipv4().and_then(|s| s.primary_address());
    let a1 = net.node(m.ues[1]).expect("ue").ipv4().and_then(|s| s.primary_address());
    assert_eq!(a0, Some(Ipv4Addr::new(7, 0, 0, 2)));
    assert_eq!(a1, Some(Ipv4Addr::new(7, 0, 0, 3)));
    assert_eq!(m.remote_addr, Ipv4Addr::new(1, 0, 0, 2));
    assert_eq!(m.api.endpoint_default_gateway(), Ok(Ipv4Addr::new(7, 0, 0, 1)));
}

#[test]
fn attach_picks_strongest_cell_and_breaks_ties_by_index() {
    let mut m = mini(
        &[
            Vector3::new(-500.0, 0.0, 30.0),
            Vector3::new(500.0, 0.0, 30.0),
        ],
        &[
            Vector3::new(400.0, 10.0, 1.5),
            Vector3::new(-420.0, -5.0, 1.5),
            Vector3::new(0.0, 0.0, 1.5),
        ],
    );
    m.api.attach(&m.ue_devs.clone()).expect("attach");
    assert_eq!(m.api.serving_cell(m.ue_devs[0]), Ok(Some(m.cells[1])));
    assert_eq!(m.api.serving_cell(m.ue_devs[1]), Ok(Some(m.cells[0])));
    assert_eq!(m.api.serving_cell(m.ue_devs[2]), Ok(Some(m.cells[0])));

    let Device::Enb(enb) = m.api.network().device(m.cells[0]).expect("cell") else {
        panic!("cell device expected");
    };
    assert_eq!(enb.attached().len(), 2);
    assert_eq!(enb.buffer_bytes(), 2 * RLC_BUFFER_BYTES_PER_UE);
}

#[test]
fn reattaching_moves_endpoint_between_cells() {
    let mut m = mini(
        &[Vector3::new(0.0, 0.0, 30.0), Vector3::new(100.0, 0.0, 30.0)],
        &[Vector3::new(10.0, 0.0, 1.5)],
    );
    m.api.attach_to(m.ue_devs[0], m.cells[0]).expect("attach");
    m.api.attach_to(m.ue_devs[0], m.cells[1]).expect("attach");
    assert_eq!(m.api.serving_cell(m.ue_devs[0]), Ok(Some(m.cells[1])));
    let Device::Enb(old) = m.api.network().device(m.cells[0]).expect("cell") else {
        panic!("cell device expected");
    };
    assert!(old.attached().is_empty());
}

#[test]
fn attach_rejects_wrong_device_kinds() {
    let mut m = mini(&[Vector3::new(0.0, 0.0, 30.0)], &[Vector3::new(10.0, 0.0, 1.5)]);
    assert_eq!(
        m.api.attach_to(m.cells[0], m.cells[0]),
        Err(SimError::WrongDeviceKind {
            device: m.cells[0],
            expected: "endpoint"
        })
    );
    assert_eq!(
        m.api.attach_to(m.ue_devs[0], m.ue_devs[0]),
        Err(SimError::WrongDeviceKind {
            device: m.ue_devs[0],
            expected: "cell"
        })
    );
    assert!(matches!(
        m.api.serving_cell(m.cells[0]),
        Err(SimError::WrongDeviceKind { .. })
    ));
}

#[test]
fn radio_devices_need_gateway_mobility_and_bandwidth() {
    let mut api = LteSim::new(1);
    let bare = api.create_node().expect("node");
    assert_eq!(api.install_cell_devices(&[bare], BW), Err(SimError::NoGateway));

    api.create_gateway().expect("pgw");
    assert_eq!(api.create_gateway(), Err(SimError::GatewayExists));
    assert_eq!(api.install_cell_devices(&[bare], BW), Err(SimError::NoMobility(bare)));
    assert_eq!(
        api.install_endpoint_devices(&[bare]),
        Err(SimError::NoMobility(bare))
    );

    let placed = fixed(&mut api, Vector3::new(0.0, 0.0, 30.0));
    let no_downlink = CellBandwidth { dl_rb: 0, ..BW };
    assert_eq!(
        api.install_cell_devices(&[placed], no_downlink),
        Err(SimError::ZeroBandwidth)
    );
    api.install_cell_devices(&[placed], BW).expect("cell");
    assert_eq!(
        api.install_endpoint_devices(&[placed]),
        Err(SimError::RadioDeviceExists(placed))
    );
}

#[test]
fn routing_and_application_setup_errors() {
    let mut m = mini(&[Vector3::new(0.0, 0.0, 30.0)], &[Vector3::new(10.0, 0.0, 1.5)]);
    let gw = Ipv4Addr::new(7, 0, 0, 1);
    assert_eq!(
        m.api.set_default_route(m.remote, gw),
        Err(SimError::NoRouteToGateway {
            node: m.remote,
            gateway: gw
        })
    );
    assert!(matches!(
        m.api.add_static_route(m.remote, Ipv4Prefix::ANY, m.ue_devs[0]),
        Err(SimError::ForeignDevice { .. })
    ));

    m.api.install_udp_sink(m.remote, 1234).expect("sink");
    assert_eq!(
        m.api.install_udp_sink(m.remote, 1234),
        Err(SimError::PortInUse {
            node: m.remote,
            port: 1234
        })
    );
    let sink2 = m.api.install_udp_sink(m.remote, 1235).expect("sink");
    let t = SimTime::from_secs(1);
    assert_eq!(
        m.api.schedule_app_window(sink2, t, t),
        Err(SimError::InvalidAppWindow {
            start: t,
            stop: t
        })
    );

    let remote = SocketAddrV4::new(m.remote_addr, 1234);
    let params = UdpSourceParams {
        packet_size: 0,
        interval: SimTime::from_millis(100),
        max_packets: 1,
    };
    assert_eq!(
        m.api.install_udp_source(m.ues[0], remote, params),
        Err(SimError::EmptyPayload)
    );
    let params = UdpSourceParams {
        packet_size: 10,
        interval: SimTime::ZERO,
        max_packets: 1,
    };
    assert_eq!(
        m.api.install_udp_source(m.ues[0], remote, params),
        Err(SimError::ZeroInterval)
    );
}

#[test]
fn phases_are_enforced() {
    let mut m = mini(&[Vector3::new(0.0, 0.0, 30.0)], &[Vector3::new(10.0, 0.0, 1.5)]);
    m.api.install_flow_monitor().expect("monitor");
    assert_eq!(m.api.flow_stats(), Err(SimError::NotRun));
    assert_eq!(m.api.check_for_lost_packets(), Err(SimError::NotRun));

    m.api.run_until(SimTime::from_secs(1)).expect("run");
    assert_eq!(m.api.now(), SimTime::from_secs(1));
    assert_eq!(m.api.run_until(SimTime::from_secs(2)), Err(SimError::AlreadyRan));
    assert_eq!(m.api.create_nodes(1), Err(SimError::AlreadyRan));
    assert_eq!(m.api.attach(&[]), Err(SimError::AlreadyRan));
    assert_eq!(m.api.flow_stats(), Ok(Vec::new()));
}

#[test]
fn stats_without_flow_monitor_fail() {
    let mut api = LteSim::new(1);
    api.run_until(SimTime::from_millis(1)).expect("run");
    assert_eq!(api.flow_stats(), Err(SimError::NoFlowMonitor));
}

#[test]
fn uplink_packets_reach_the_remote_host() {
    let mut m = mini(&[Vector3::new(0.0, 0.0, 30.0)], &[Vector3::new(50.0, 0.0, 1.5)]);
    m.api.attach_to(m.ue_devs[0], m.cells[0]).expect("attach");
    let (sink, sources) = start_traffic(
        &mut m,
        SimTime::from_millis(100),
        SimTime::from_millis(500),
        SimTime::from_millis(1500),
    );
    m.api.run_until(SimTime::from_secs(2)).expect("run");
    m.api.check_for_lost_packets().expect("check");

    let net = m.api.network();
    let src = net.app(sources[0]).expect("app").as_source().expect("source");
    assert_eq!(src.sent_packets(), 10);
    assert_eq!(src.local().port(), 49153);
    let received = net.app(sink).expect("app").as_sink().expect("sink");
    assert_eq!(received.received_packets(), 10);
    assert_eq!(received.received_bytes(), 10 * 200);
    assert_eq!(received.highest_seq(), Some(9));

    let flows = m.api.flow_stats().expect("stats");
    assert_eq!(flows.len(), 1);
    let f = &flows[0];
    assert_eq!(f.tx_packets, 10);
    assert_eq!(f.rx_packets, 10);
    assert_eq!(f.lost_packets, 0);
    assert_eq!(f.tuple.source_address, Ipv4Addr::new(7, 0, 0, 2));
    assert_eq!(f.tuple.destination_port, 1234);
    // 上行授权 + TTI 对齐约 5ms，回传 10ms
    let mean_ms = f.delay_sum.as_millis_f64() / 10.0;
    assert!((15.0..15.1).contains(&mean_ms), "mean delay {mean_ms}ms");
}

#[test]
fn unattached_endpoint_loses_everything() {
    let mut m = mini(&[Vector3::new(0.0, 0.0, 30.0)], &[Vector3::new(50.0, 0.0, 1.5)]);
    start_traffic(
        &mut m,
        SimTime::from_millis(100),
        SimTime::from_millis(500),
        SimTime::from_millis(1000),
    );
    m.api.run_until(SimTime::from_secs(1)).expect("run");
    let f = &m.api.flow_stats().expect("stats")[0];
    assert_eq!(f.rx_packets, 0);
    assert_eq!(f.lost_packets, 5);
    assert_eq!(f.packets_dropped.get(&DropReason::NotAttached), Some(&5));
}

#[test]
fn endpoint_out_of_coverage_is_dropped() {
    let mut m = mini(
        &[Vector3::new(0.0, 0.0, 30.0)],
        &[Vector3::new(80_000.0, 0.0, 1.5)],
    );
    m.api.attach(&m.ue_devs.clone()).expect("attach");
    start_traffic(
        &mut m,
        SimTime::from_millis(100),
        SimTime::from_millis(500),
        SimTime::from_millis(1000),
    );
    m.api.run_until(SimTime::from_secs(1)).expect("run");
    let f = &m.api.flow_stats().expect("stats")[0];
    assert_eq!(f.rx_packets, 0);
    assert_eq!(f.packets_dropped.get(&DropReason::RadioOutage), Some(&5));
}

#[test]
fn cell_buffer_overflows_under_burst() {
    let mut m = mini(&[Vector3::new(0.0, 0.0, 30.0)], &[Vector3::new(20.0, 0.0, 1.5)]);
    m.api.attach_to(m.ue_devs[0], m.cells[0]).expect("attach");
    start_traffic(
        &mut m,
        SimTime::from_micros(1),
        SimTime::from_millis(500),
        SimTime::from_millis(501),
    );
    m.api.run_until(SimTime::from_secs(1)).expect("run");
    let f = &m.api.flow_stats().expect("stats")[0];
    assert_eq!(f.tx_packets, 1000);
    assert!(f.rx_packets > 0);
    let overflow = f.packets_dropped.get(&DropReason::QueueOverflow).copied().unwrap_or(0);
    assert!(overflow > 0);
    assert_eq!(f.rx_packets + f.lost_packets, 1000);
}

#[test]
fn walking_endpoint_position_changes_over_time() {
    let mut api = LteSim::new(5);
    let ue = api.create_node().expect("node");
    let start = Vector3::new(0.0, 0.0, 1.5);
    api.install_mobility(
        ue,
        MobilityModel::random_walk(start, Rectangle::centered_square(100.0), 0.5, 2.0),
    )
    .expect("mobility");
    assert_eq!(api.position(ue), Ok(start));
    api.set_position(ue, Vector3::new(10.0, 10.0, 1.5)).expect("set");
    assert_eq!(api.position(ue), Ok(Vector3::new(10.0, 10.0, 1.5)));

    api.run_until(SimTime::from_secs(20)).expect("run");
    let p = api.position(ue).expect("position");
    assert_ne!(p, Vector3::new(10.0, 10.0, 1.5));
    assert!(Rectangle::centered_square(100.0).contains(&p));
}

#[test]
fn large_endpoint_set_attaches_to_nearest_cells() {
    let cells: Vec<Vector3> = (0..16u32)
        .map(|i| {
            let (row, col) = (f64::from(i / 4), f64::from(i % 4));
            Vector3::new(-750.0 + col * 500.0, -750.0 + row * 500.0, 30.0)
        })
        .collect();
    // 终端放在网格点上，避免与两个小区等距
    let ues: Vec<Vector3> = (0..3000u32)
        .map(|i| {
            let x = -990.0 + f64::from(i % 60) * 33.1;
            let y = -990.0 + f64::from(i / 60) * 39.7;
            Vector3::new(x, y, 1.5)
        })
        .collect();
    let mut m = mini(&cells, &ues);
    m.api.attach(&m.ue_devs).expect("attach");

    let mut per_cell = vec![0usize; cells.len()];
    for (dev, pos) in m.ue_devs.iter().zip(&ues) {
        let nearest = cells
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.distance(pos).total_cmp(&b.distance(pos)))
            .map(|(i, _)| i)
            .expect("cells");
        assert_eq!(m.api.serving_cell(*dev), Ok(Some(m.cells[nearest])));
        per_cell[nearest] += 1;
    }
    for (i, &cell) in m.cells.iter().enumerate() {
        let Device::Enb(enb) = m.api.network().device(cell).expect("cell") else {
            panic!("cell device expected");
        };
        assert_eq!(enb.attached().len(), per_cell[i]);
        assert_eq!(enb.cell_id, i as u16 + 1);
    }

    let Device::Ue(last) = m.api.network().device(m.ue_devs[2999]).expect("ue") else {
        panic!("endpoint device expected");
    };
    assert_eq!(last.imsi, 3000);
}
