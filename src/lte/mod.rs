//! 蜂窝接入模块
//!
//! 基站与终端的无线设备、EPC 网关、移动性与无线链路预算，
//! 以及把它们组装成完整仿真器的 `LteSim`。

mod backend;
mod cell;
mod epc;
pub(crate) mod mobility;
pub mod radio;

pub use backend::LteSim;
pub use cell::{CellReady, EnbDevice, RLC_BUFFER_BYTES_PER_UE, UeDevice};
pub use epc::{Epc, S1U_DATA_RATE_BPS, S1U_DELAY, UE_DEFAULT_GATEWAY, UE_SUBNET};
pub use mobility::{MobilityModel, Rectangle, Vector3};
