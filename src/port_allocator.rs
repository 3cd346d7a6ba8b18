use std::net::{Ipv4Addr, SocketAddrV4, TcpListener};

use crate::{
    error::{DesktopError, DesktopResult},
    PORT_SCAN_SPAN,
};

/// Whether `127.0.0.1:port` can be bound right now. The test listener is
/// dropped before returning, so another process may still grab the port.
pub(crate) fn is_loopback_port_free(port: u16) -> bool {
    TcpListener::bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, port)).is_ok()
}

/// First bindable port in `preferred..=preferred + PORT_SCAN_SPAN`, falling
/// back to any unused port the OS hands out.
pub(crate) fn allocate_port(preferred: u16) -> DesktopResult<u16> {
    allocate_port_with(preferred, is_loopback_port_free, portpicker::pick_unused_port)
}

fn allocate_port_with<P, F>(preferred: u16, mut is_free: P, fallback: F) -> DesktopResult<u16>
where
    P: FnMut(u16) -> bool,
    F: FnOnce() -> Option<u16>,
{
    let preferred = preferred.max(1);
    let last = preferred.saturating_add(PORT_SCAN_SPAN);
    if let Some(port) = (preferred..=last).find(|port| is_free(*port)) {
        return Ok(port);
    }

    fallback()
        .filter(|port| is_free(*port))
        .ok_or(DesktopError::PortUnavailable { preferred })
}
