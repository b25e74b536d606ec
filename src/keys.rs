#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum SettingKey {
    AutostartOnBoot,
    ReconnectOnResume,
    ServiceMode,
    SpeedInterval,
    SocksPort,
    RequireHttp,
    HttpPort,
    AllowLanAccess,
    ShowStopButton,
    SecurityNotices,
    ShowDirectSpeed,
    Ipv6Route,
    PreferIpv6,
    DomainStrategy,
    DomainMatcher,
    TrafficSniffing,
    EnableMux,
    EnableMuxForAll,
    MuxConcurrency,
    TcpKeepAliveInterval,
    BypassLan,
    ForceNativeEngine,
    RemoteDns,
    EnableLocalDns,
    LocalDnsPort,
    DirectDns,
    MeteredHint,
    ProxyApps,
}

impl SettingKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AutostartOnBoot => "autostart_on_boot",
            Self::ReconnectOnResume => "reconnect_on_resume",
            Self::ServiceMode => "service_mode",
            Self::SpeedInterval => "speed_interval",
            Self::SocksPort => "socks_port",
            Self::RequireHttp => "require_http",
            Self::HttpPort => "http_port",
            Self::AllowLanAccess => "allow_lan_access",
            Self::ShowStopButton => "show_stop_button",
            Self::SecurityNotices => "security_notices",
            Self::ShowDirectSpeed => "show_direct_speed",
            Self::Ipv6Route => "ipv6_route",
            Self::PreferIpv6 => "prefer_ipv6",
            Self::DomainStrategy => "domain_strategy",
            Self::DomainMatcher => "domain_matcher",
            Self::TrafficSniffing => "traffic_sniffing",
            Self::EnableMux => "enable_mux",
            Self::EnableMuxForAll => "enable_mux_for_all",
            Self::MuxConcurrency => "mux_concurrency",
            Self::TcpKeepAliveInterval => "tcp_keep_alive_interval",
            Self::BypassLan => "bypass_lan",
            Self::ForceNativeEngine => "force_native_engine",
            Self::RemoteDns => "remote_dns",
            Self::EnableLocalDns => "enable_local_dns",
            Self::LocalDnsPort => "local_dns_port",
            Self::DirectDns => "direct_dns",
            Self::MeteredHint => "metered_hint",
            Self::ProxyApps => "proxy_apps",
        }
    }
}
