use crate::{
    capabilities::Capabilities, keys::SettingKey, service_state::ServiceState, store::ServiceMode,
};

/// Which gate applies while the service is running. ConnectionAffecting
/// controls lock whenever the service is not stopped; VpnOnly controls
/// additionally require the VPN service mode.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ControlTier {
    ConnectionAffecting,
    VpnOnly,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ControlKind {
    Toggle,
    TextField,
    PortField,
    IntervalField,
    Selector,
}

#[derive(Clone, Copy, Debug)]
pub struct ControlBinding {
    pub key: SettingKey,
    pub kind: ControlKind,
    pub tier: ControlTier,
}

const fn binding(key: SettingKey, kind: ControlKind, tier: ControlTier) -> ControlBinding {
    ControlBinding { key, kind, tier }
}

pub const CONTROL_BINDINGS: &[ControlBinding] = &[
    binding(
        SettingKey::AutostartOnBoot,
        ControlKind::Toggle,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::ReconnectOnResume,
        ControlKind::Toggle,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::ServiceMode,
        ControlKind::Selector,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::SpeedInterval,
        ControlKind::IntervalField,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::SocksPort,
        ControlKind::PortField,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::RequireHttp,
        ControlKind::Toggle,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::HttpPort,
        ControlKind::PortField,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::AllowLanAccess,
        ControlKind::Toggle,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::ShowStopButton,
        ControlKind::Toggle,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::SecurityNotices,
        ControlKind::Toggle,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::ShowDirectSpeed,
        ControlKind::Toggle,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::Ipv6Route,
        ControlKind::Selector,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::PreferIpv6,
        ControlKind::Toggle,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::DomainStrategy,
        ControlKind::Selector,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::DomainMatcher,
        ControlKind::Selector,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::TrafficSniffing,
        ControlKind::Toggle,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::EnableMux,
        ControlKind::Toggle,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::EnableMuxForAll,
        ControlKind::Toggle,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::MuxConcurrency,
        ControlKind::PortField,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::TcpKeepAliveInterval,
        ControlKind::IntervalField,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::BypassLan,
        ControlKind::Toggle,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::ForceNativeEngine,
        ControlKind::Toggle,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::RemoteDns,
        ControlKind::TextField,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::EnableLocalDns,
        ControlKind::Toggle,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::LocalDnsPort,
        ControlKind::PortField,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::DirectDns,
        ControlKind::TextField,
        ControlTier::ConnectionAffecting,
    ),
    binding(
        SettingKey::MeteredHint,
        ControlKind::Toggle,
        ControlTier::VpnOnly,
    ),
    binding(
        SettingKey::ProxyApps,
        ControlKind::Toggle,
        ControlTier::VpnOnly,
    ),
];

pub struct ControlState {
    pub binding: ControlBinding,
    pub enabled: bool,
    pub visible: bool,
}

/// Enabled and visibility flags for the whole control set. Visibility is
/// static, decided once at construction; enabled flags follow the
/// service state through [`ControlStates::apply_service_state`].
pub struct ControlStates {
    controls: Vec<ControlState>,
}

impl ControlStates {
    pub fn new(mode: ServiceMode, expert_mode: bool, capabilities: &Capabilities) -> Self {
        let mut controls = Vec::with_capacity(CONTROL_BINDINGS.len());
        for binding in CONTROL_BINDINGS {
            // No metered transport support: the control is removed from
            // the set entirely, not merely hidden.
            if binding.key == SettingKey::MeteredHint && !capabilities.metered_transport {
                continue;
            }

            let visible = match binding.key {
                SettingKey::DomainMatcher | SettingKey::ForceNativeEngine => expert_mode,
                SettingKey::ShowStopButton => capabilities.notification_actions,
                _ => true,
            };

            let enabled = match binding.tier {
                ControlTier::ConnectionAffecting => true,
                ControlTier::VpnOnly => mode.is_vpn(),
            };

            controls.push(ControlState {
                binding: *binding,
                enabled,
                visible,
            });
        }

        Self { controls }
    }

    pub fn apply_service_state(&mut self, state: &ServiceState, mode: ServiceMode) {
        let stopped = state.is_stopped();
        for control in &mut self.controls {
            control.enabled = match control.binding.tier {
                ControlTier::ConnectionAffecting => stopped,
                ControlTier::VpnOnly => mode.is_vpn() && stopped,
            };
        }
    }

    pub fn contains(&self, key: SettingKey) -> bool {
        self.controls.iter().any(|control| control.binding.key == key)
    }

    pub fn is_enabled(&self, key: SettingKey) -> bool {
        self.controls
            .iter()
            .find(|control| control.binding.key == key)
            .is_some_and(|control| control.enabled)
    }

    pub fn is_visible(&self, key: SettingKey) -> bool {
        self.controls
            .iter()
            .find(|control| control.binding.key == key)
            .is_some_and(|control| control.visible)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControlState> {
        self.controls.iter()
    }

    #[cfg(test)]
    fn enabled_snapshot(&self) -> Vec<(SettingKey, bool)> {
        self.controls
            .iter()
            .map(|control| (control.binding.key, control.enabled))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_capabilities() -> Capabilities {
        Capabilities {
            notification_actions: true,
            metered_transport: true,
            tun_device: true,
            elevation: true,
        }
    }

    fn connection_affecting_keys() -> Vec<SettingKey> {
        CONTROL_BINDINGS
            .iter()
            .filter(|binding| binding.tier == ControlTier::ConnectionAffecting)
            .map(|binding| binding.key)
            .collect()
    }

    #[test]
    fn running_states_lock_every_connection_affecting_control() {
        for state in [
            ServiceState::Starting,
            ServiceState::Connected,
            ServiceState::Stopping,
        ] {
            let mut controls = ControlStates::new(ServiceMode::Vpn, true, &full_capabilities());
            controls.apply_service_state(&state, ServiceMode::Vpn);
            for key in connection_affecting_keys() {
                assert!(
                    !controls.is_enabled(key),
                    "{key:?} must be locked while {state:?}"
                );
            }
            assert!(!controls.is_enabled(SettingKey::ProxyApps));
            assert!(!controls.is_enabled(SettingKey::MeteredHint));
        }
    }

    #[test]
    fn stopped_unlocks_tier_one_and_gates_vpn_only_on_mode() {
        let mut controls = ControlStates::new(ServiceMode::Vpn, true, &full_capabilities());
        controls.apply_service_state(&ServiceState::Stopped, ServiceMode::Vpn);
        for key in connection_affecting_keys() {
            assert!(controls.is_enabled(key), "{key:?} must unlock when stopped");
        }
        assert!(controls.is_enabled(SettingKey::ProxyApps));
        assert!(controls.is_enabled(SettingKey::MeteredHint));

        controls.apply_service_state(&ServiceState::Stopped, ServiceMode::Proxy);
        assert!(controls.is_enabled(SettingKey::SocksPort));
        assert!(!controls.is_enabled(SettingKey::ProxyApps));
        assert!(!controls.is_enabled(SettingKey::MeteredHint));
    }

    #[test]
    fn failed_unlocks_like_stopped() {
        let mut controls = ControlStates::new(ServiceMode::Vpn, false, &full_capabilities());
        controls.apply_service_state(&ServiceState::Connected, ServiceMode::Vpn);
        controls.apply_service_state(&ServiceState::Failed("exited (1)".into()), ServiceMode::Vpn);
        assert!(controls.is_enabled(SettingKey::SocksPort));
        assert!(controls.is_enabled(SettingKey::ProxyApps));
    }

    #[test]
    fn reapplying_the_same_state_is_idempotent() {
        let mut controls = ControlStates::new(ServiceMode::Vpn, true, &full_capabilities());
        controls.apply_service_state(&ServiceState::Connected, ServiceMode::Vpn);
        let first = controls.enabled_snapshot();
        controls.apply_service_state(&ServiceState::Connected, ServiceMode::Vpn);
        assert_eq!(first, controls.enabled_snapshot());

        controls.apply_service_state(&ServiceState::Stopped, ServiceMode::Proxy);
        let unlocked = controls.enabled_snapshot();
        controls.apply_service_state(&ServiceState::Stopped, ServiceMode::Proxy);
        assert_eq!(unlocked, controls.enabled_snapshot());
    }

    #[test]
    fn expert_controls_hide_without_expert_mode() {
        let plain = ControlStates::new(ServiceMode::Vpn, false, &full_capabilities());
        assert!(!plain.is_visible(SettingKey::DomainMatcher));
        assert!(!plain.is_visible(SettingKey::ForceNativeEngine));
        assert!(plain.is_visible(SettingKey::DomainStrategy));

        let expert = ControlStates::new(ServiceMode::Vpn, true, &full_capabilities());
        assert!(expert.is_visible(SettingKey::DomainMatcher));
        assert!(expert.is_visible(SettingKey::ForceNativeEngine));
    }

    #[test]
    fn missing_capabilities_hide_or_remove_their_controls() {
        let capabilities = Capabilities {
            notification_actions: false,
            metered_transport: false,
            tun_device: true,
            elevation: true,
        };
        let controls = ControlStates::new(ServiceMode::Vpn, true, &capabilities);

        // Stop button is hidden but still part of the set.
        assert!(controls.contains(SettingKey::ShowStopButton));
        assert!(!controls.is_visible(SettingKey::ShowStopButton));

        // Metered hint is removed outright.
        assert!(!controls.contains(SettingKey::MeteredHint));
        assert!(!controls.is_enabled(SettingKey::MeteredHint));
    }

    #[test]
    fn initial_enabled_state_follows_service_mode() {
        let vpn = ControlStates::new(ServiceMode::Vpn, false, &full_capabilities());
        assert!(vpn.is_enabled(SettingKey::ProxyApps));

        let proxy = ControlStates::new(ServiceMode::Proxy, false, &full_capabilities());
        assert!(!proxy.is_enabled(SettingKey::ProxyApps));
        assert!(proxy.is_enabled(SettingKey::SocksPort));
    }
}
