//! 错误类型
//!
//! `SimError` 来自仿真引擎（构建或运行阶段），`ConfigError` 来自参数校验，
//! `ScenarioError` 是场景流水线对外暴露的统一错误。

use std::net::Ipv4Addr;

use thiserror::Error;

use crate::net::{AppId, DeviceId, Ipv4Prefix, NodeId};
use crate::sim::SimTime;

/// 仿真引擎返回的错误。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("simulator created {created} nodes, {requested} requested")]
    NodeCountMismatch { requested: usize, created: usize },
    #[error("unknown device {0:?}")]
    UnknownDevice(DeviceId),
    #[error("unknown application {0:?}")]
    UnknownApp(AppId),
    #[error("device {device:?} is not a {expected} device")]
    WrongDeviceKind {
        device: DeviceId,
        expected: &'static str,
    },
    #[error("node {0:?} already carries a radio device")]
    RadioDeviceExists(NodeId),
    #[error("node {0:?} has no mobility model")]
    NoMobility(NodeId),
    #[error("invalid mobility model: {0}")]
    InvalidMobility(&'static str),
    #[error("node {0:?} has no IPv4 stack")]
    NoIpStack(NodeId),
    #[error("node {0:?} has no IPv4 address")]
    NoAddress(NodeId),
    #[error("address pool {0} exhausted")]
    AddressPoolExhausted(Ipv4Prefix),
    #[error("node {node:?} has no interface on the subnet of gateway {gateway}")]
    NoRouteToGateway { node: NodeId, gateway: Ipv4Addr },
    #[error("device {device:?} does not belong to node {node:?}")]
    ForeignDevice { node: NodeId, device: DeviceId },
    #[error("EPC gateway has not been created")]
    NoGateway,
    #[error("EPC gateway already exists")]
    GatewayExists,
    #[error("no cell device has been installed")]
    NoCells,
    #[error("link data rate must be positive")]
    ZeroDataRate,
    #[error("cell bandwidth must be at least one resource block")]
    ZeroBandwidth,
    #[error("UDP port {port} already bound on node {node:?}")]
    PortInUse { node: NodeId, port: u16 },
    #[error("invalid application window [{start}, {stop}]")]
    InvalidAppWindow { start: SimTime, stop: SimTime },
    #[error("UDP packet size must be positive")]
    EmptyPayload,
    #[error("UDP send interval must be positive")]
    ZeroInterval,
    #[error("flow monitor is not installed")]
    NoFlowMonitor,
    #[error("the simulation has already run")]
    AlreadyRan,
    #[error("the simulation has not run yet")]
    NotRun,
}

/// 场景参数校验错误。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid value for --tech: {0:?} (use 4g or 5g)")]
    UnknownTechnology(String),
    #[error("nUes must be at least 1")]
    NoEndpoints,
    #[error("nEnbs must be at least 1")]
    NoCells,
    #[error("simTime must be greater than 0.5 s (got {0})")]
    SimTimeTooShort(f64),
    #[error("areaSize must be positive (got {0})")]
    InvalidArea(f64),
    #[error("packetInterval must be positive (got {0})")]
    InvalidPacketInterval(f64),
    #[error("packetSize must be positive")]
    EmptyPacket,
}

/// 场景流水线错误：任何一种都会终止本次运行。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScenarioError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    #[error("simulator failure: {0}")]
    Simulator(#[from] SimError),
}

impl ScenarioError {
    /// 进程退出码：配置错误为 2，仿真器错误为 1。
    pub fn exit_code(&self) -> u8 {
        match self {
            ScenarioError::InvalidConfig(_) => 2,
            ScenarioError::Simulator(_) => 1,
        }
    }
}
