use serde::Serialize;

use crate::store::{ServiceMode, SettingsFile};

const LOOPBACK_BIND: &str = "127.0.0.1";
const LAN_BIND: &str = "0.0.0.0";

#[derive(Serialize)]
pub struct CoreConfiguration {
    pub loglevel: String,
    pub engine: String,
    pub tcp_keep_alive_interval: u32,
    pub speed_report_interval: u32,
    pub dns: DnsConfiguration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mux: Option<MuxConfiguration>,
    pub route: RouteConfiguration,
    pub inbounds: InboundConfiguration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpn: Option<VpnConfiguration>,
}

#[derive(Serialize)]
pub struct DnsConfiguration {
    pub remote: String,
    pub direct: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_port: Option<u16>,
}

#[derive(Serialize)]
pub struct MuxConfiguration {
    pub concurrency: u16,
    pub for_all: bool,
}

#[derive(Serialize)]
pub struct RouteConfiguration {
    pub ipv6: String,
    pub prefer_ipv6: bool,
    pub bypass_lan: bool,
    pub domain_strategy: String,
    pub domain_matcher: String,
    pub traffic_sniffing: bool,
}

#[derive(Serialize)]
pub struct InboundConfiguration {
    pub socks: SocksInbound,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpInbound>,
}

#[derive(Serialize)]
pub struct SocksInbound {
    pub address: String,
}

#[derive(Serialize)]
pub struct HttpInbound {
    pub address: String,
}

#[derive(Serialize)]
pub struct VpnConfiguration {
    pub metered: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub proxied_apps: Vec<String>,
}

impl CoreConfiguration {
    pub fn from_settings(values: &SettingsFile, mode: ServiceMode) -> Self {
        let bind = if values.allow_lan_access {
            LAN_BIND
        } else {
            LOOPBACK_BIND
        };

        log::debug!(
            "[core_config] mode={}, bind={}, socks={}, http={}, mux={}",
            mode.as_str(),
            bind,
            values.socks_port,
            values.require_http,
            values.enable_mux,
        );

        let vpn = mode.is_vpn().then(|| VpnConfiguration {
            metered: values.metered_hint,
            proxied_apps: if values.proxy_apps {
                values.proxied_app_list.clone()
            } else {
                Vec::new()
            },
        });

        Self {
            loglevel: "info".into(),
            engine: if values.force_native_engine {
                "native".into()
            } else {
                "default".into()
            },
            tcp_keep_alive_interval: values.tcp_keep_alive_interval,
            speed_report_interval: values.speed_interval,
            dns: DnsConfiguration {
                remote: values.remote_dns.clone(),
                direct: values.direct_dns.clone(),
                local_port: values.enable_local_dns.then_some(values.local_dns_port),
            },
            mux: values.enable_mux.then(|| MuxConfiguration {
                concurrency: values.mux_concurrency,
                for_all: values.enable_mux_for_all,
            }),
            route: RouteConfiguration {
                ipv6: values.ipv6_route.clone(),
                prefer_ipv6: values.prefer_ipv6,
                bypass_lan: values.bypass_lan,
                domain_strategy: values.domain_strategy.clone(),
                domain_matcher: values.domain_matcher.clone(),
                traffic_sniffing: values.traffic_sniffing,
            },
            inbounds: InboundConfiguration {
                socks: SocksInbound {
                    address: format!("{bind}:{}", values.socks_port),
                },
                http: values.require_http.then(|| HttpInbound {
                    address: format!("{bind}:{}", values.http_port),
                }),
            },
            vpn,
        }
    }

    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self)
            .map_err(|error| format!("Failed to serialize core configuration: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_inbound_appears_only_when_required() {
        let mut values = SettingsFile::default();
        let configuration = CoreConfiguration::from_settings(&values, ServiceMode::Proxy);
        assert!(configuration.inbounds.http.is_none());

        values.require_http = true;
        let configuration = CoreConfiguration::from_settings(&values, ServiceMode::Proxy);
        assert_eq!(
            configuration.inbounds.http.map(|http| http.address),
            Some("127.0.0.1:9080".into())
        );
    }

    #[test]
    fn lan_access_switches_the_bind_address() {
        let mut values = SettingsFile::default();
        values.allow_lan_access = true;
        let configuration = CoreConfiguration::from_settings(&values, ServiceMode::Proxy);
        assert_eq!(configuration.inbounds.socks.address, "0.0.0.0:2080");
    }

    #[test]
    fn vpn_section_appears_only_in_vpn_mode() {
        let mut values = SettingsFile::default();
        values.proxy_apps = true;
        values.proxied_app_list = vec!["firefox".into()];

        let proxy = CoreConfiguration::from_settings(&values, ServiceMode::Proxy);
        assert!(proxy.vpn.is_none());

        let vpn = CoreConfiguration::from_settings(&values, ServiceMode::Vpn)
            .vpn
            .expect("vpn section");
        assert_eq!(vpn.proxied_apps, vec!["firefox"]);
    }

    #[test]
    fn disabled_toggles_drop_their_sections_from_the_toml() {
        let values = SettingsFile::default();
        let rendered = CoreConfiguration::from_settings(&values, ServiceMode::Proxy)
            .to_toml()
            .expect("serialize");
        assert!(!rendered.contains("[mux]"));
        assert!(!rendered.contains("local_port"));
        assert!(rendered.contains("[inbounds.socks]"));
    }
}
