use crate::error::SimError;
use crate::lte::mobility::Mobility;
use crate::lte::{MobilityModel, Rectangle, Vector3};
use crate::sim::SimTime;

fn walk(start: Vector3, side: f64) -> MobilityModel {
    MobilityModel::random_walk(start, Rectangle::centered_square(side), 0.5, 2.0)
}

#[test]
fn constant_position_never_moves() {
    let p = Vector3::new(1.0, 2.0, 30.0);
    let model = MobilityModel::ConstantPosition { position: p };
    let mut m = Mobility::install(model, SimTime::ZERO, 1).expect("install");
    assert_eq!(m.position_at(SimTime::ZERO), p);
    assert_eq!(m.position_at(SimTime::from_secs(100)), p);
}

#[test]
fn random_walk_stays_in_bounds_and_respects_speed() {
    let start = Vector3::new(95.0, -95.0, 1.5);
    let mut m = Mobility::install(walk(start, 200.0), SimTime::ZERO, 42).expect("install");
    let bounds = Rectangle::centered_square(200.0);

    let mut prev = m.position_at(SimTime::ZERO);
    assert_eq!(prev, start);
    for step in 1..=600 {
        let p = m.position_at(SimTime::from_millis(step * 500));
        assert!(bounds.contains(&p), "{p:?} left the bounds");
        assert_eq!(p.z, 1.5);
        // 0.5s 内最多走 1m（反射只会缩短位移）
        assert!(prev.distance(&p) <= 1.0 + 1e-6);
        prev = p;
    }
    assert_ne!(prev, start);
}

#[test]
fn random_walk_is_reproducible_for_same_seed() {
    let start = Vector3::new(0.0, 0.0, 1.5);
    let mut a = Mobility::install(walk(start, 1000.0), SimTime::ZERO, 7).expect("install");
    let mut b = Mobility::install(walk(start, 1000.0), SimTime::ZERO, 7).expect("install");
    let mut c = Mobility::install(walk(start, 1000.0), SimTime::ZERO, 8).expect("install");
    let t = SimTime::from_secs(30);
    assert_eq!(a.position_at(t), b.position_at(t));
    assert_ne!(a.position_at(t), c.position_at(t));
}

#[test]
fn invalid_walk_parameters_are_rejected() {
    let bounds = Rectangle::centered_square(100.0);
    let outside = MobilityModel::random_walk(Vector3::new(80.0, 0.0, 1.5), bounds, 0.5, 2.0);
    assert!(matches!(
        Mobility::install(outside, SimTime::ZERO, 1),
        Err(SimError::InvalidMobility(_))
    ));

    let reversed = MobilityModel::random_walk(Vector3::default(), bounds, 2.0, 0.5);
    assert!(matches!(
        Mobility::install(reversed, SimTime::ZERO, 1),
        Err(SimError::InvalidMobility(_))
    ));

    let empty = MobilityModel::random_walk(
        Vector3::default(),
        Rectangle::centered_square(f64::NAN),
        0.5,
        2.0,
    );
    assert!(matches!(
        Mobility::install(empty, SimTime::ZERO, 1),
        Err(SimError::InvalidMobility(_))
    ));
}

#[test]
fn set_position_on_walk_is_reflected_into_bounds() {
    let mut m = Mobility::install(walk(Vector3::new(0.0, 0.0, 1.5), 100.0), SimTime::ZERO, 3)
        .expect("install");
    m.set_position(Vector3::new(60.0, -55.0, 1.5), SimTime::from_secs(1));
    let p = m.position_at(SimTime::from_secs(1));
    assert!((p.x - 40.0).abs() < 1e-9);
    assert!((p.y + 45.0).abs() < 1e-9);
}

#[test]
fn distance_is_euclidean_in_three_dimensions() {
    let a = Vector3::new(0.0, 0.0, 30.0);
    let b = Vector3::new(3.0, 4.0, 30.0);
    assert_eq!(a.distance(&b), 5.0);
    assert!((a.distance(&Vector3::new(0.0, 0.0, 1.5)) - 28.5).abs() < 1e-12);
}
