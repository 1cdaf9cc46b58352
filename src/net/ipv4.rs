//! IPv4 地址前缀与顺序地址分配

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::SimError;

/// 网络前缀，例如 `7.0.0.0/8`。主机位总是被清零。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ipv4Prefix {
    network: Ipv4Addr,
    len: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParsePrefixError {
    #[error("missing '/' in prefix {0:?}")]
    MissingLength(String),
    #[error("invalid address in prefix {0:?}")]
    BadAddress(String),
    #[error("invalid prefix length in {0:?}")]
    BadLength(String),
}

impl Ipv4Prefix {
    /// 默认路由 `0.0.0.0/0`
    pub const ANY: Ipv4Prefix = Ipv4Prefix {
        network: Ipv4Addr::UNSPECIFIED,
        len: 0,
    };

    /// `len > 32` 时返回 None。
    pub fn new(addr: Ipv4Addr, len: u8) -> Option<Self> {
        if len > 32 {
            return None;
        }
        let network = Ipv4Addr::from(u32::from(addr) & mask_bits(len));
        Some(Self { network, len })
    }

    /// 常量构造；`len` 超过 32 时按 32 处理。
    pub const fn from_const(addr: Ipv4Addr, len: u8) -> Self {
        let len = if len > 32 { 32 } else { len };
        Self {
            network: Ipv4Addr::from_bits(addr.to_bits() & mask_bits(len)),
            len,
        }
    }

    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    pub fn prefix_len(&self) -> u8 {
        self.len
    }

    pub fn is_default(&self) -> bool {
        self.len == 0
    }

    pub fn mask(&self) -> Ipv4Addr {
        Ipv4Addr::from(mask_bits(self.len))
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & mask_bits(self.len) == u32::from(self.network)
    }

    /// 可分配的主机数（不含网络地址与广播地址）。
    pub fn host_count(&self) -> u64 {
        match self.len {
            31 | 32 => 0,
            len => (1u64 << (32 - len)) - 2,
        }
    }

    /// 第 `n` 个主机地址（从 1 开始）。
    pub fn host(&self, n: u32) -> Option<Ipv4Addr> {
        if n == 0 || u64::from(n) > self.host_count() {
            return None;
        }
        Some(Ipv4Addr::from(u32::from(self.network) + n))
    }
}

const fn mask_bits(len: u8) -> u32 {
    if len == 0 { 0 } else { u32::MAX << (32 - len) }
}

impl fmt::Display for Ipv4Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.len)
    }
}

impl FromStr for Ipv4Prefix {
    type Err = ParsePrefixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, len) = s
            .split_once('/')
            .ok_or_else(|| ParsePrefixError::MissingLength(s.to_string()))?;
        let addr: Ipv4Addr = addr
            .parse()
            .map_err(|_| ParsePrefixError::BadAddress(s.to_string()))?;
        let len: u8 = len
            .parse()
            .map_err(|_| ParsePrefixError::BadLength(s.to_string()))?;
        Ipv4Prefix::new(addr, len).ok_or_else(|| ParsePrefixError::BadLength(s.to_string()))
    }
}

/// 顺序地址池：从 `first_host` 开始依次分配。
#[derive(Debug, Clone)]
pub struct AddressPool {
    prefix: Ipv4Prefix,
    next_host: u32,
}

impl AddressPool {
    pub fn new(prefix: Ipv4Prefix) -> Self {
        Self::starting_at(prefix, 1)
    }

    pub fn starting_at(prefix: Ipv4Prefix, first_host: u32) -> Self {
        Self {
            prefix,
            next_host: first_host.max(1),
        }
    }

    pub fn prefix(&self) -> Ipv4Prefix {
        self.prefix
    }

    pub fn allocate(&mut self) -> Result<Ipv4Addr, SimError> {
        let addr = self
            .prefix
            .host(self.next_host)
            .ok_or(SimError::AddressPoolExhausted(self.prefix))?;
        self.next_host += 1;
        Ok(addr)
    }
}
