use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::keys::SettingKey;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ServiceMode {
    Vpn,
    Proxy,
}

impl ServiceMode {
    pub fn is_vpn(self) -> bool {
        matches!(self, Self::Vpn)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Vpn => "VPN",
            Self::Proxy => "Proxy only",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vpn => "vpn",
            Self::Proxy => "proxy",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "proxy" => Self::Proxy,
            _ => Self::Vpn,
        }
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct SettingsFile {
    #[serde(default)]
    pub autostart_on_boot: bool,
    #[serde(default)]
    pub reconnect_on_resume: bool,
    #[serde(default = "default_service_mode")]
    pub service_mode: String,
    #[serde(default = "default_speed_interval")]
    pub speed_interval: u32,
    #[serde(default = "default_socks_port")]
    pub socks_port: u16,
    #[serde(default)]
    pub require_http: bool,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default)]
    pub allow_lan_access: bool,
    #[serde(default = "default_true")]
    pub show_stop_button: bool,
    #[serde(default = "default_true")]
    pub security_notices: bool,
    #[serde(default)]
    pub show_direct_speed: bool,
    #[serde(default = "default_ipv6_route")]
    pub ipv6_route: String,
    #[serde(default)]
    pub prefer_ipv6: bool,
    #[serde(default = "default_domain_strategy")]
    pub domain_strategy: String,
    #[serde(default = "default_domain_matcher")]
    pub domain_matcher: String,
    #[serde(default = "default_true")]
    pub traffic_sniffing: bool,
    #[serde(default)]
    pub enable_mux: bool,
    #[serde(default)]
    pub enable_mux_for_all: bool,
    #[serde(default = "default_mux_concurrency")]
    pub mux_concurrency: u16,
    #[serde(default = "default_tcp_keep_alive_interval")]
    pub tcp_keep_alive_interval: u32,
    #[serde(default = "default_true")]
    pub bypass_lan: bool,
    #[serde(default)]
    pub force_native_engine: bool,
    #[serde(default = "default_remote_dns")]
    pub remote_dns: String,
    #[serde(default)]
    pub enable_local_dns: bool,
    #[serde(default = "default_local_dns_port")]
    pub local_dns_port: u16,
    #[serde(default = "default_direct_dns")]
    pub direct_dns: String,
    #[serde(default)]
    pub metered_hint: bool,
    #[serde(default)]
    pub proxy_apps: bool,
    #[serde(default)]
    pub proxied_app_list: Vec<String>,
    #[serde(default)]
    pub expert_mode: bool,
}

fn default_true() -> bool {
    true
}

fn default_service_mode() -> String {
    "vpn".into()
}

fn default_speed_interval() -> u32 {
    1
}

fn default_socks_port() -> u16 {
    2080
}

fn default_http_port() -> u16 {
    9080
}

fn default_ipv6_route() -> String {
    "enable".into()
}

fn default_domain_strategy() -> String {
    "as_is".into()
}

fn default_domain_matcher() -> String {
    "hybrid".into()
}

fn default_mux_concurrency() -> u16 {
    8
}

fn default_tcp_keep_alive_interval() -> u32 {
    15
}

fn default_remote_dns() -> String {
    "tls://8.8.8.8".into()
}

fn default_local_dns_port() -> u16 {
    6450
}

fn default_direct_dns() -> String {
    "system".into()
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            autostart_on_boot: false,
            reconnect_on_resume: false,
            service_mode: default_service_mode(),
            speed_interval: default_speed_interval(),
            socks_port: default_socks_port(),
            require_http: false,
            http_port: default_http_port(),
            allow_lan_access: false,
            show_stop_button: true,
            security_notices: true,
            show_direct_speed: false,
            ipv6_route: default_ipv6_route(),
            prefer_ipv6: false,
            domain_strategy: default_domain_strategy(),
            domain_matcher: default_domain_matcher(),
            traffic_sniffing: true,
            enable_mux: false,
            enable_mux_for_all: false,
            mux_concurrency: default_mux_concurrency(),
            tcp_keep_alive_interval: default_tcp_keep_alive_interval(),
            bypass_lan: true,
            force_native_engine: false,
            remote_dns: default_remote_dns(),
            enable_local_dns: false,
            local_dns_port: default_local_dns_port(),
            direct_dns: default_direct_dns(),
            metered_hint: false,
            proxy_apps: false,
            proxied_app_list: Vec::new(),
            expert_mode: false,
        }
    }
}

/// Key-value store over the persisted settings file. The `dirty` flag
/// records changes the running service has not picked up yet; it is not
/// persisted.
pub struct SettingsStore {
    path: PathBuf,
    values: SettingsFile,
    dirty: bool,
}

impl SettingsStore {
    pub fn store_file_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("driftgate")
            .join("driftgate-ui.toml")
    }

    pub fn load() -> Self {
        Self::load_from(Self::store_file_path())
    }

    pub fn load_from(path: PathBuf) -> Self {
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(values) => {
                    log::info!("[store] loaded from {}", path.display());
                    values
                }
                Err(error) => {
                    log::warn!("[store] failed to parse {}: {error}", path.display());
                    SettingsFile::default()
                }
            },
            Err(_) => {
                log::info!("[store] no settings file at {}, using defaults", path.display());
                SettingsFile::default()
            }
        };

        Self {
            path,
            values,
            dirty: false,
        }
    }

    pub fn save(&self) {
        if let Some(parent) = self.path.parent()
            && let Err(error) = std::fs::create_dir_all(parent)
        {
            log::warn!(
                "[store] failed to create settings directory {}: {error}",
                parent.display()
            );
        }
        match toml::to_string_pretty(&self.values) {
            Ok(content) => {
                if let Err(error) = std::fs::write(&self.path, content) {
                    log::warn!("[store] failed to write {}: {error}", self.path.display());
                }
            }
            Err(error) => {
                log::warn!("[store] failed to serialize settings: {error}");
            }
        }
    }

    pub fn values(&self) -> &SettingsFile {
        &self.values
    }

    pub fn dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn service_mode(&self) -> ServiceMode {
        ServiceMode::parse(&self.values.service_mode)
    }

    pub fn set_service_mode(&mut self, mode: ServiceMode) -> bool {
        if self.service_mode() == mode {
            return false;
        }
        self.values.service_mode = mode.as_str().to_string();
        self.dirty = true;
        true
    }

    pub fn bool_value(&self, key: SettingKey) -> bool {
        match key {
            SettingKey::AutostartOnBoot => self.values.autostart_on_boot,
            SettingKey::ReconnectOnResume => self.values.reconnect_on_resume,
            SettingKey::RequireHttp => self.values.require_http,
            SettingKey::AllowLanAccess => self.values.allow_lan_access,
            SettingKey::ShowStopButton => self.values.show_stop_button,
            SettingKey::SecurityNotices => self.values.security_notices,
            SettingKey::ShowDirectSpeed => self.values.show_direct_speed,
            SettingKey::PreferIpv6 => self.values.prefer_ipv6,
            SettingKey::TrafficSniffing => self.values.traffic_sniffing,
            SettingKey::EnableMux => self.values.enable_mux,
            SettingKey::EnableMuxForAll => self.values.enable_mux_for_all,
            SettingKey::BypassLan => self.values.bypass_lan,
            SettingKey::ForceNativeEngine => self.values.force_native_engine,
            SettingKey::EnableLocalDns => self.values.enable_local_dns,
            SettingKey::MeteredHint => self.values.metered_hint,
            SettingKey::ProxyApps => self.values.proxy_apps,
            _ => {
                log::warn!("[store] {} is not a boolean key", key.as_str());
                false
            }
        }
    }

    pub fn set_bool(&mut self, key: SettingKey, value: bool) -> bool {
        let slot = match key {
            SettingKey::AutostartOnBoot => &mut self.values.autostart_on_boot,
            SettingKey::ReconnectOnResume => &mut self.values.reconnect_on_resume,
            SettingKey::RequireHttp => &mut self.values.require_http,
            SettingKey::AllowLanAccess => &mut self.values.allow_lan_access,
            SettingKey::ShowStopButton => &mut self.values.show_stop_button,
            SettingKey::SecurityNotices => &mut self.values.security_notices,
            SettingKey::ShowDirectSpeed => &mut self.values.show_direct_speed,
            SettingKey::PreferIpv6 => &mut self.values.prefer_ipv6,
            SettingKey::TrafficSniffing => &mut self.values.traffic_sniffing,
            SettingKey::EnableMux => &mut self.values.enable_mux,
            SettingKey::EnableMuxForAll => &mut self.values.enable_mux_for_all,
            SettingKey::BypassLan => &mut self.values.bypass_lan,
            SettingKey::ForceNativeEngine => &mut self.values.force_native_engine,
            SettingKey::EnableLocalDns => &mut self.values.enable_local_dns,
            SettingKey::MeteredHint => &mut self.values.metered_hint,
            SettingKey::ProxyApps => &mut self.values.proxy_apps,
            _ => {
                log::warn!("[store] {} is not a boolean key", key.as_str());
                return false;
            }
        };
        if *slot == value {
            return false;
        }
        *slot = value;
        self.dirty = true;
        true
    }

    pub fn port_value(&self, key: SettingKey) -> u16 {
        match key {
            SettingKey::SocksPort => self.values.socks_port,
            SettingKey::HttpPort => self.values.http_port,
            SettingKey::LocalDnsPort => self.values.local_dns_port,
            SettingKey::MuxConcurrency => self.values.mux_concurrency,
            _ => {
                log::warn!("[store] {} is not a port key", key.as_str());
                0
            }
        }
    }

    pub fn set_port(&mut self, key: SettingKey, value: u16) -> bool {
        let slot = match key {
            SettingKey::SocksPort => &mut self.values.socks_port,
            SettingKey::HttpPort => &mut self.values.http_port,
            SettingKey::LocalDnsPort => &mut self.values.local_dns_port,
            SettingKey::MuxConcurrency => &mut self.values.mux_concurrency,
            _ => {
                log::warn!("[store] {} is not a port key", key.as_str());
                return false;
            }
        };
        if *slot == value {
            return false;
        }
        *slot = value;
        self.dirty = true;
        true
    }

    pub fn seconds_value(&self, key: SettingKey) -> u32 {
        match key {
            SettingKey::SpeedInterval => self.values.speed_interval,
            SettingKey::TcpKeepAliveInterval => self.values.tcp_keep_alive_interval,
            _ => {
                log::warn!("[store] {} is not an interval key", key.as_str());
                0
            }
        }
    }

    pub fn set_seconds(&mut self, key: SettingKey, value: u32) -> bool {
        let slot = match key {
            SettingKey::SpeedInterval => &mut self.values.speed_interval,
            SettingKey::TcpKeepAliveInterval => &mut self.values.tcp_keep_alive_interval,
            _ => {
                log::warn!("[store] {} is not an interval key", key.as_str());
                return false;
            }
        };
        if *slot == value {
            return false;
        }
        *slot = value;
        self.dirty = true;
        true
    }

    pub fn string_value(&self, key: SettingKey) -> String {
        match key {
            SettingKey::ServiceMode => self.values.service_mode.clone(),
            SettingKey::Ipv6Route => self.values.ipv6_route.clone(),
            SettingKey::DomainStrategy => self.values.domain_strategy.clone(),
            SettingKey::DomainMatcher => self.values.domain_matcher.clone(),
            SettingKey::RemoteDns => self.values.remote_dns.clone(),
            SettingKey::DirectDns => self.values.direct_dns.clone(),
            _ => {
                log::warn!("[store] {} is not a string key", key.as_str());
                String::new()
            }
        }
    }

    pub fn set_string(&mut self, key: SettingKey, value: &str) -> bool {
        let slot = match key {
            SettingKey::ServiceMode => &mut self.values.service_mode,
            SettingKey::Ipv6Route => &mut self.values.ipv6_route,
            SettingKey::DomainStrategy => &mut self.values.domain_strategy,
            SettingKey::DomainMatcher => &mut self.values.domain_matcher,
            SettingKey::RemoteDns => &mut self.values.remote_dns,
            SettingKey::DirectDns => &mut self.values.direct_dns,
            _ => {
                log::warn!("[store] {} is not a string key", key.as_str());
                return false;
            }
        };
        if *slot == value {
            return false;
        }
        *slot = value.to_string();
        self.dirty = true;
        true
    }

    pub fn expert_mode(&self) -> bool {
        self.values.expert_mode
    }

    pub fn proxied_app_list(&self) -> &[String] {
        &self.values.proxied_app_list
    }

    pub fn set_proxied_app_list(&mut self, list: Vec<String>) -> bool {
        if self.values.proxied_app_list == list {
            return false;
        }
        self.values.proxied_app_list = list;
        self.dirty = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn in_memory_store() -> SettingsStore {
        SettingsStore {
            path: PathBuf::from("unused.toml"),
            values: SettingsFile::default(),
            dirty: false,
        }
    }

    #[test]
    fn defaults_fill_every_field() {
        let values = SettingsFile::default();
        assert_eq!(values.socks_port, 2080);
        assert_eq!(values.http_port, 9080);
        assert_eq!(values.local_dns_port, 6450);
        assert_eq!(values.mux_concurrency, 8);
        assert!(values.show_stop_button);
        assert!(values.bypass_lan);
        assert!(!values.expert_mode);
        assert_eq!(ServiceMode::parse(&values.service_mode), ServiceMode::Vpn);
    }

    #[test]
    fn setters_mark_dirty_only_on_change() {
        let mut store = in_memory_store();
        assert!(!store.dirty());

        store.set_bool(SettingKey::EnableMux, false);
        assert!(!store.dirty(), "writing the current value is not a change");

        store.set_bool(SettingKey::EnableMux, true);
        assert!(store.dirty());

        store.clear_dirty();
        store.set_port(SettingKey::SocksPort, 2080);
        assert!(!store.dirty());
        store.set_port(SettingKey::SocksPort, 1080);
        assert!(store.dirty());
    }

    #[test]
    fn service_mode_round_trips_through_string_storage() {
        let mut store = in_memory_store();
        store.set_service_mode(ServiceMode::Proxy);
        assert_eq!(store.service_mode(), ServiceMode::Proxy);
        assert!(store.dirty());

        // Unknown strings fall back to VPN, matching parse().
        store.set_string(SettingKey::ServiceMode, "carrier-pigeon");
        assert_eq!(store.service_mode(), ServiceMode::Vpn);
    }

    #[test]
    fn typed_accessors_read_through_their_keys() {
        let store = in_memory_store();
        assert!(!store.bool_value(SettingKey::EnableMux));
        assert_eq!(store.port_value(SettingKey::LocalDnsPort), 6450);
        assert_eq!(store.seconds_value(SettingKey::TcpKeepAliveInterval), 15);
        assert_eq!(store.string_value(SettingKey::DomainMatcher), "hybrid");

        // A key of the wrong type never panics, it falls back.
        assert!(!store.bool_value(SettingKey::SocksPort));
        assert_eq!(store.port_value(SettingKey::EnableMux), 0);
    }

    #[test]
    fn missing_file_loads_defaults_and_is_clean() {
        let store = SettingsStore::load_from(PathBuf::from("does/not/exist.toml"));
        assert!(!store.dirty());
        assert_eq!(store.port_value(SettingKey::SocksPort), 2080);
    }

    #[test]
    fn settings_file_round_trips_through_toml() {
        let mut values = SettingsFile::default();
        values.require_http = true;
        values.http_port = 8118;
        values.proxied_app_list = vec!["firefox".into(), "curl".into()];

        let serialized = toml::to_string_pretty(&values).expect("serialize");
        let restored: SettingsFile = toml::from_str(&serialized).expect("parse");
        assert!(restored.require_http);
        assert_eq!(restored.http_port, 8118);
        assert_eq!(restored.proxied_app_list, vec!["firefox", "curl"]);
    }
}
