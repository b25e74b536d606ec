use crate::system;

/// Platform capability table, probed once at startup. Everything that
/// used to be an inline platform check reads from here instead.
#[derive(Clone, Copy, Debug)]
pub struct Capabilities {
    /// Desktop notifications can carry a stop action.
    pub notification_actions: bool,
    /// The network stack can mark the tunnel as a metered transport.
    pub metered_transport: bool,
    /// A TUN device can be opened (VPN mode preflight).
    pub tun_device: bool,
    /// Privilege elevation is available for VPN mode.
    pub elevation: bool,
}

pub fn probe() -> Capabilities {
    let capabilities = Capabilities {
        notification_actions: system::check_notification_actions(),
        metered_transport: system::check_metered_transport(),
        tun_device: system::check_tun_device(),
        elevation: system::check_elevation(),
    };
    log::info!(
        "[capabilities] notification_actions={}, metered_transport={}, tun_device={}, elevation={}",
        capabilities.notification_actions,
        capabilities.metered_transport,
        capabilities.tun_device,
        capabilities.elevation,
    );
    capabilities
}
