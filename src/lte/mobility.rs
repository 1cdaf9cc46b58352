//! 移动性模型
//!
//! 基站使用固定位置；终端在矩形区域内做二维随机游走。
//! 游走按需推进：查询某一时刻的位置时才补齐到该时刻为止的各段路径。

use std::f64::consts::PI;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::sim::SimTime;

/// 三维坐标（米）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Vector3) -> f64 {
        let (dx, dy, dz) = (self.x - other.x, self.y - other.y, self.z - other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// 轴对齐矩形（闭区间）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Rectangle {
    /// 以原点为中心、边长 `side` 的正方形
    pub fn centered_square(side: f64) -> Self {
        let half = side / 2.0;
        Self {
            x_min: -half,
            x_max: half,
            y_min: -half,
            y_max: half,
        }
    }

    pub fn contains(&self, p: &Vector3) -> bool {
        p.x >= self.x_min && p.x <= self.x_max && p.y >= self.y_min && p.y <= self.y_max
    }

    fn is_valid(&self) -> bool {
        self.x_min.is_finite()
            && self.x_max.is_finite()
            && self.y_min.is_finite()
            && self.y_max.is_finite()
            && self.x_min <= self.x_max
            && self.y_min <= self.y_max
    }

    /// 把越界点镜像回矩形内（凸区域，线段端点镜像后整段仍在区域内）。
    fn reflect(&self, mut p: Vector3) -> Vector3 {
        p.x = reflect_axis(p.x, self.x_min, self.x_max);
        p.y = reflect_axis(p.y, self.y_min, self.y_max);
        p
    }
}

fn reflect_axis(mut v: f64, lo: f64, hi: f64) -> f64 {
    if hi <= lo {
        return lo;
    }
    // 单段步长远小于区域边长时，循环最多执行一两次
    loop {
        if v < lo {
            v = 2.0 * lo - v;
        } else if v > hi {
            v = 2.0 * hi - v;
        } else {
            return v;
        }
    }
}

/// 安装到节点上的移动性模型描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MobilityModel {
    ConstantPosition {
        position: Vector3,
    },
    /// 每走完 `leg_distance` 米重新抽取速度与方向
    RandomWalk2d {
        start: Vector3,
        bounds: Rectangle,
        speed_min: f64,
        speed_max: f64,
        leg_distance: f64,
    },
}

impl MobilityModel {
    pub const DEFAULT_LEG_DISTANCE: f64 = 1.0;

    pub fn random_walk(start: Vector3, bounds: Rectangle, speed_min: f64, speed_max: f64) -> Self {
        MobilityModel::RandomWalk2d {
            start,
            bounds,
            speed_min,
            speed_max,
            leg_distance: Self::DEFAULT_LEG_DISTANCE,
        }
    }
}

/// 节点上的移动性状态
#[derive(Debug, Clone)]
pub(crate) enum Mobility {
    Constant(Vector3),
    Walk(RandomWalk),
}

impl Mobility {
    pub(crate) fn install(model: MobilityModel, now: SimTime, seed: u64) -> Result<Self, SimError> {
        match model {
            MobilityModel::ConstantPosition { position } => Ok(Mobility::Constant(position)),
            MobilityModel::RandomWalk2d {
                start,
                bounds,
                speed_min,
                speed_max,
                leg_distance,
            } => {
                if !bounds.is_valid() {
                    return Err(SimError::InvalidMobility("walk bounds are empty or not finite"));
                }
                if !bounds.contains(&start) {
                    return Err(SimError::InvalidMobility("walk start lies outside its bounds"));
                }
                if !(speed_min > 0.0 && speed_min <= speed_max && speed_max.is_finite()) {
                    return Err(SimError::InvalidMobility("walk speed range must be positive"));
                }
                if !(leg_distance > 0.0 && leg_distance.is_finite()) {
                    return Err(SimError::InvalidMobility("walk leg distance must be positive"));
                }
                Ok(Mobility::Walk(RandomWalk::new(
                    start,
                    bounds,
                    (speed_min, speed_max),
                    leg_distance,
                    now,
                    seed,
                )))
            }
        }
    }

    pub(crate) fn position_at(&mut self, now: SimTime) -> Vector3 {
        match self {
            Mobility::Constant(p) => *p,
            Mobility::Walk(w) => w.position_at(now),
        }
    }

    pub(crate) fn set_position(&mut self, position: Vector3, now: SimTime) {
        match self {
            Mobility::Constant(p) => *p = position,
            Mobility::Walk(w) => w.restart(w.bounds.reflect(position), now),
        }
    }
}

/// 二维随机游走（高度不变）
#[derive(Debug, Clone)]
pub(crate) struct RandomWalk {
    bounds: Rectangle,
    speed: (f64, f64),
    leg_distance: f64,
    from: Vector3,
    to: Vector3,
    t0: SimTime,
    t1: SimTime,
    rng: StdRng,
}

impl RandomWalk {
    fn new(
        start: Vector3,
        bounds: Rectangle,
        speed: (f64, f64),
        leg_distance: f64,
        now: SimTime,
        seed: u64,
    ) -> Self {
        let mut w = Self {
            bounds,
            speed,
            leg_distance,
            from: start,
            to: start,
            t0: now,
            t1: now,
            rng: StdRng::seed_from_u64(seed),
        };
        w.next_leg();
        w
    }

    fn restart(&mut self, position: Vector3, now: SimTime) {
        self.from = position;
        self.to = position;
        self.t0 = now;
        self.t1 = now;
        self.next_leg();
    }

    /// 从当前段终点出发抽取下一段
    fn next_leg(&mut self) {
        let speed = if self.speed.0 < self.speed.1 {
            self.rng.gen_range(self.speed.0..=self.speed.1)
        } else {
            self.speed.0
        };
        let heading = self.rng.gen_range(0.0..2.0 * PI);
        let start = self.to;
        let target = Vector3::new(
            start.x + self.leg_distance * heading.cos(),
            start.y + self.leg_distance * heading.sin(),
            start.z,
        );
        let duration = SimTime::from_secs_f64(self.leg_distance / speed).max(SimTime(1));
        self.from = start;
        self.to = self.bounds.reflect(target);
        self.t0 = self.t1;
        self.t1 = self.t0.saturating_add(duration);
    }

    fn position_at(&mut self, now: SimTime) -> Vector3 {
        while now >= self.t1 {
            self.next_leg();
        }
        if now <= self.t0 {
            return self.from;
        }
        let frac = (now.0 - self.t0.0) as f64 / (self.t1.0 - self.t0.0) as f64;
        Vector3::new(
            self.from.x + (self.to.x - self.from.x) * frac,
            self.from.y + (self.to.y - self.from.y) * frac,
            self.from.z,
        )
    }
}
