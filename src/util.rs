use std::net::{IpAddr, Ipv4Addr};

const COLLECTOR_PORT: &str = "COLLECTOR_PORT";

const DEFAULT_PORT: u16 = 5000;

pub fn get_default_port() -> u16 {
    DEFAULT_PORT
}

/// Port override from the environment, if set and valid
pub fn get_port() -> Option<u16> {
    std::env::var(COLLECTOR_PORT)
        .ok()
        .and_then(|port| port.parse().ok())
}

const COLLECTOR_ADDR: &str = "COLLECTOR_ADDR";

const DEFAULT_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

pub fn get_default_addr() -> IpAddr {
    DEFAULT_ADDR
}

/// Bind address override from the environment, if set and valid
pub fn get_addr() -> Option<IpAddr> {
    std::env::var(COLLECTOR_ADDR)
        .ok()
        .and_then(|addr| addr.parse().ok())
}
