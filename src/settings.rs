use std::{cell::RefCell, collections::HashMap, rc::Rc};

use gpui::{
    App, Context, Div, Entity, EventEmitter, FocusHandle, Focusable, MouseButton, Window, div,
    prelude::*, px,
};

use crate::{
    capabilities::Capabilities,
    components::*,
    controls::ControlStates,
    keys::SettingKey,
    service_state::{Registration, ServiceState, ServiceStateHub},
    store::{ServiceMode, SettingsStore},
    text_input::{InputFormat, TextInput},
    theme::*,
};

pub const IPV6_ROUTE_OPTIONS: &[(&str, &str)] = &[
    ("disable", "Off"),
    ("enable", "On"),
    ("prefer", "Prefer"),
    ("only", "Only"),
];

pub const DOMAIN_STRATEGY_OPTIONS: &[(&str, &str)] = &[
    ("as_is", "As is"),
    ("prefer_domain", "Prefer domain"),
    ("prefer_ip", "Prefer IP"),
];

pub const DOMAIN_MATCHER_OPTIONS: &[(&str, &str)] = &[("hybrid", "Hybrid"), ("linear", "Linear")];

/// Navigation requests raised by the settings screen; the hosting view
/// decides what to show.
pub enum SettingsEvent {
    OpenAppSelection,
}

/// The settings surface: one control per [`SettingKey`], bound to the
/// shared store, with enabled flags driven by the service state hub.
pub struct SettingsScreen {
    store: Rc<RefCell<SettingsStore>>,
    hub: Rc<RefCell<ServiceStateHub>>,
    controls: ControlStates,
    registration: Option<Registration>,
    incoming: Rc<RefCell<Option<ServiceState>>>,
    proxy_apps_checked: bool,
    socks_port_input: Entity<TextInput>,
    http_port_input: Entity<TextInput>,
    local_dns_port_input: Entity<TextInput>,
    mux_concurrency_input: Entity<TextInput>,
    speed_interval_input: Entity<TextInput>,
    keep_alive_input: Entity<TextInput>,
    remote_dns_input: Entity<TextInput>,
    direct_dns_input: Entity<TextInput>,
    toggle_focus_handles: HashMap<SettingKey, FocusHandle>,
    mode_focus_handles: [FocusHandle; 2],
    ipv6_focus_handles: [FocusHandle; 4],
    domain_strategy_focus_handles: [FocusHandle; 3],
    domain_matcher_focus_handles: [FocusHandle; 2],
    focus_handle: FocusHandle,
}

impl EventEmitter<SettingsEvent> for SettingsScreen {}

impl SettingsScreen {
    pub fn new(
        store: Rc<RefCell<SettingsStore>>,
        hub: Rc<RefCell<ServiceStateHub>>,
        capabilities: &Capabilities,
        context: &mut Context<Self>,
    ) -> Self {
        let (mode, expert_mode, proxy_apps_checked) = {
            let store = store.borrow();
            (
                store.service_mode(),
                store.expert_mode(),
                store.bool_value(SettingKey::ProxyApps),
            )
        };
        let controls = ControlStates::new(mode, expert_mode, capabilities);

        let seed_port = |key| store.borrow().port_value(key).to_string();
        let seed_seconds = |key| store.borrow().seconds_value(key).to_string();
        let seed_string = |key| store.borrow().string_value(key);

        let socks_port_input = TextInput::new(
            context,
            "2080",
            InputFormat::Port,
            Some(&seed_port(SettingKey::SocksPort)),
        );
        let http_port_input = TextInput::new(
            context,
            "9080",
            InputFormat::Port,
            Some(&seed_port(SettingKey::HttpPort)),
        );
        let local_dns_port_input = TextInput::new(
            context,
            "6450",
            InputFormat::Port,
            Some(&seed_port(SettingKey::LocalDnsPort)),
        );
        let mux_concurrency_input = TextInput::new(
            context,
            "8",
            InputFormat::Port,
            Some(&seed_port(SettingKey::MuxConcurrency)),
        );
        let speed_interval_input = TextInput::new(
            context,
            "1",
            InputFormat::Integer,
            Some(&seed_seconds(SettingKey::SpeedInterval)),
        );
        let keep_alive_input = TextInput::new(
            context,
            "15",
            InputFormat::Integer,
            Some(&seed_seconds(SettingKey::TcpKeepAliveInterval)),
        );
        let remote_dns_input = TextInput::new(
            context,
            "tls://8.8.8.8",
            InputFormat::Text,
            Some(&seed_string(SettingKey::RemoteDns)),
        );
        let direct_dns_input = TextInput::new(
            context,
            "system",
            InputFormat::Text,
            Some(&seed_string(SettingKey::DirectDns)),
        );

        let mut toggle_focus_handles = HashMap::new();
        for control in controls.iter() {
            toggle_focus_handles.insert(control.binding.key, context.focus_handle());
        }

        Self {
            store,
            hub,
            controls,
            registration: None,
            incoming: Rc::new(RefCell::new(None)),
            proxy_apps_checked,
            socks_port_input,
            http_port_input,
            local_dns_port_input,
            mux_concurrency_input,
            speed_interval_input,
            keep_alive_input,
            remote_dns_input,
            direct_dns_input,
            toggle_focus_handles,
            mode_focus_handles: std::array::from_fn(|_| context.focus_handle()),
            ipv6_focus_handles: std::array::from_fn(|_| context.focus_handle()),
            domain_strategy_focus_handles: std::array::from_fn(|_| context.focus_handle()),
            domain_matcher_focus_handles: std::array::from_fn(|_| context.focus_handle()),
            focus_handle: context.focus_handle(),
        }
    }

    /// Takes the hub slot, replays the current state into the control
    /// set and refreshes the list-backed per-app checkbox.
    pub fn on_activate(&mut self, context: &mut Context<Self>) {
        let incoming = self.incoming.clone();
        let registration = self.hub.borrow_mut().register(Box::new(move |state| {
            *incoming.borrow_mut() = Some(state);
        }));
        self.registration = Some(registration);

        let current = self.hub.borrow().current();
        self.apply_service_state(&current);

        self.proxy_apps_checked = self.store.borrow().bool_value(SettingKey::ProxyApps);
        context.notify();
    }

    /// Releases the hub slot. Safe when never activated; a stale token
    /// never evicts a listener registered after us.
    pub fn on_deactivate(&mut self) {
        if let Some(registration) = self.registration.take() {
            self.hub.borrow_mut().unregister(registration);
        }
    }

    fn apply_service_state(&mut self, state: &ServiceState) {
        let mode = self.store.borrow().service_mode();
        self.controls.apply_service_state(state, mode);
    }

    fn drain_incoming(&mut self) {
        if let Some(state) = self.incoming.borrow_mut().take() {
            log::debug!("[settings] applying service state: {}", state.label());
            self.apply_service_state(&state);
        }
    }

    fn toggle_setting(&mut self, key: SettingKey, context: &mut Context<Self>) {
        if !self.controls.is_enabled(key) {
            return;
        }

        let new_value = {
            let mut store = self.store.borrow_mut();
            let new_value = !store.bool_value(key);
            store.set_bool(key, new_value);
            store.save();
            new_value
        };

        if key == SettingKey::ProxyApps {
            self.proxy_apps_checked = new_value;
            if new_value {
                self.store.borrow_mut().mark_dirty();
            }
            context.emit(SettingsEvent::OpenAppSelection);
        }
        context.notify();
    }

    fn select_service_mode(&mut self, mode: ServiceMode, context: &mut Context<Self>) {
        if !self.controls.is_enabled(SettingKey::ServiceMode) {
            return;
        }
        let changed = self.store.borrow_mut().set_service_mode(mode);
        if changed {
            self.store.borrow().save();
            // VPN-only controls follow the mode immediately.
            let current = self.hub.borrow().current();
            self.apply_service_state(&current);
        }
        context.notify();
    }

    fn select_string_option(&mut self, key: SettingKey, value: &str, context: &mut Context<Self>) {
        if !self.controls.is_enabled(key) {
            return;
        }
        if self.store.borrow_mut().set_string(key, value) {
            self.store.borrow().save();
        }
        context.notify();
    }

    fn sync_inputs(&mut self, context: &mut Context<Self>) {
        let socks_port = self.socks_port_input.read(context).text();
        let http_port = self.http_port_input.read(context).text();
        let local_dns_port = self.local_dns_port_input.read(context).text();
        let mux_concurrency = self.mux_concurrency_input.read(context).text();
        let speed_interval = self.speed_interval_input.read(context).text();
        let keep_alive = self.keep_alive_input.read(context).text();
        let remote_dns = self.remote_dns_input.read(context).text();
        let direct_dns = self.direct_dns_input.read(context).text();

        let mut store = self.store.borrow_mut();
        let mut changed = false;
        changed |= sync_port(&mut store, SettingKey::SocksPort, &socks_port);
        changed |= sync_port(&mut store, SettingKey::HttpPort, &http_port);
        changed |= sync_port(&mut store, SettingKey::LocalDnsPort, &local_dns_port);
        changed |= sync_port(&mut store, SettingKey::MuxConcurrency, &mux_concurrency);
        changed |= sync_seconds(&mut store, SettingKey::SpeedInterval, &speed_interval);
        changed |= sync_seconds(&mut store, SettingKey::TcpKeepAliveInterval, &keep_alive);
        changed |= sync_string(&mut store, SettingKey::RemoteDns, &remote_dns);
        changed |= sync_string(&mut store, SettingKey::DirectDns, &direct_dns);
        if changed {
            store.save();
        }
    }

    fn refresh_input_locks(&mut self, context: &mut Context<Self>) {
        let locks = [
            (SettingKey::SocksPort, self.socks_port_input.clone()),
            (SettingKey::HttpPort, self.http_port_input.clone()),
            (SettingKey::LocalDnsPort, self.local_dns_port_input.clone()),
            (
                SettingKey::MuxConcurrency,
                self.mux_concurrency_input.clone(),
            ),
            (SettingKey::SpeedInterval, self.speed_interval_input.clone()),
            (
                SettingKey::TcpKeepAliveInterval,
                self.keep_alive_input.clone(),
            ),
            (SettingKey::RemoteDns, self.remote_dns_input.clone()),
            (SettingKey::DirectDns, self.direct_dns_input.clone()),
        ];
        for (key, input) in locks {
            let locked = !self.controls.is_enabled(key);
            input.update(context, |input, _| input.disabled = locked);
        }
    }

    fn render_toggle_row(
        &self,
        key: SettingKey,
        text: &str,
        context: &mut Context<Self>,
    ) -> Option<Div> {
        if !self.controls.contains(key) || !self.controls.is_visible(key) {
            return None;
        }
        let locked = !self.controls.is_enabled(key);
        let value = if key == SettingKey::ProxyApps {
            self.proxy_apps_checked
        } else {
            self.store.borrow().bool_value(key)
        };
        let focus_handle = self.toggle_focus_handles.get(&key)?;
        Some(toggle(
            text,
            value,
            locked,
            focus_handle,
            context.listener(move |this, _, _, context| this.toggle_setting(key, context)),
        ))
    }

    fn render_mode_selector(&self, context: &mut Context<Self>) -> Div {
        let mode = self.store.borrow().service_mode();
        let locked = !self.controls.is_enabled(SettingKey::ServiceMode);
        selector(
            "Service mode",
            selector_row()
                .child(
                    selector_option(
                        ServiceMode::Vpn.label(),
                        mode == ServiceMode::Vpn,
                        locked,
                        &self.mode_focus_handles[0],
                    )
                    .on_mouse_up(
                        MouseButton::Left,
                        context.listener(|this, _, _, context| {
                            this.select_service_mode(ServiceMode::Vpn, context);
                        }),
                    ),
                )
                .child(
                    selector_option(
                        ServiceMode::Proxy.label(),
                        mode == ServiceMode::Proxy,
                        locked,
                        &self.mode_focus_handles[1],
                    )
                    .on_mouse_up(
                        MouseButton::Left,
                        context.listener(|this, _, _, context| {
                            this.select_service_mode(ServiceMode::Proxy, context);
                        }),
                    ),
                ),
        )
    }

    fn render_string_selector(
        &self,
        key: SettingKey,
        text: &str,
        options: &'static [(&'static str, &'static str)],
        focus_handles: &[FocusHandle],
        context: &mut Context<Self>,
    ) -> Option<Div> {
        if !self.controls.is_visible(key) {
            return None;
        }
        let current = self.store.borrow().string_value(key);
        let locked = !self.controls.is_enabled(key);
        let mut row = selector_row();
        for (option_index, (value, option_label)) in options.iter().enumerate() {
            row = row.child(
                selector_option(
                    option_label,
                    current == *value,
                    locked,
                    &focus_handles[option_index],
                )
                .on_mouse_up(
                    MouseButton::Left,
                    context.listener(move |this, _, _, context| {
                        this.select_string_option(key, value, context);
                    }),
                ),
            );
        }
        Some(selector(text, row))
    }

    fn render_general_section(&self, context: &mut Context<Self>) -> Div {
        let mut section = section_column().child(section_title("General"));
        if let Some(row) =
            self.render_toggle_row(SettingKey::AutostartOnBoot, "Start on boot", context)
        {
            section = section.child(row);
        }
        if let Some(row) = self.render_toggle_row(
            SettingKey::ReconnectOnResume,
            "Reconnect after resume",
            context,
        ) {
            section = section.child(row);
        }
        section = section.child(self.render_mode_selector(context));
        section = section.child(field("Speed refresh interval (seconds)", &self.speed_interval_input));
        if let Some(row) =
            self.render_toggle_row(SettingKey::ShowStopButton, "Stop button on notification", context)
        {
            section = section.child(row);
        }
        if let Some(row) =
            self.render_toggle_row(SettingKey::SecurityNotices, "Security notices", context)
        {
            section = section.child(row);
        }
        if let Some(row) =
            self.render_toggle_row(SettingKey::ShowDirectSpeed, "Show direct speed", context)
        {
            section = section.child(row);
        }
        section
    }

    fn render_inbound_section(&self, context: &mut Context<Self>) -> Div {
        let mut section = section_column().child(section_title("Inbound"));
        section = section.child(field("SOCKS port", &self.socks_port_input));
        if let Some(row) =
            self.render_toggle_row(SettingKey::RequireHttp, "HTTP inbound", context)
        {
            section = section.child(row);
        }
        section = section.child(field("HTTP port", &self.http_port_input));
        if let Some(row) =
            self.render_toggle_row(SettingKey::AllowLanAccess, "Allow LAN access", context)
        {
            section = section.child(row);
        }
        section
    }

    fn render_routing_section(&self, context: &mut Context<Self>) -> Div {
        let mut section = section_column().child(section_title("Routing"));
        if let Some(row) = self.render_string_selector(
            SettingKey::Ipv6Route,
            "IPv6 route",
            IPV6_ROUTE_OPTIONS,
            &self.ipv6_focus_handles,
            context,
        ) {
            section = section.child(row);
        }
        if let Some(row) = self.render_toggle_row(SettingKey::PreferIpv6, "Prefer IPv6", context) {
            section = section.child(row);
        }
        if let Some(row) = self.render_string_selector(
            SettingKey::DomainStrategy,
            "Domain strategy",
            DOMAIN_STRATEGY_OPTIONS,
            &self.domain_strategy_focus_handles,
            context,
        ) {
            section = section.child(row);
        }
        if let Some(row) = self.render_string_selector(
            SettingKey::DomainMatcher,
            "Domain matcher",
            DOMAIN_MATCHER_OPTIONS,
            &self.domain_matcher_focus_handles,
            context,
        ) {
            section = section.child(row);
        }
        if let Some(row) =
            self.render_toggle_row(SettingKey::TrafficSniffing, "Traffic sniffing", context)
        {
            section = section.child(row);
        }
        if let Some(row) = self.render_toggle_row(SettingKey::BypassLan, "Bypass LAN", context) {
            section = section.child(row);
        }
        section
    }

    fn render_mux_section(&self, context: &mut Context<Self>) -> Div {
        let mut section = section_column().child(section_title("Multiplexing"));
        if let Some(row) = self.render_toggle_row(SettingKey::EnableMux, "Enable mux", context) {
            section = section.child(row);
        }
        if let Some(row) =
            self.render_toggle_row(SettingKey::EnableMuxForAll, "Mux for all connections", context)
        {
            section = section.child(row);
        }
        section = section.child(field("Mux concurrency", &self.mux_concurrency_input));
        section = section.child(field("TCP keep-alive interval (seconds)", &self.keep_alive_input));
        section
    }

    fn render_dns_section(&self, context: &mut Context<Self>) -> Div {
        let mut section = section_column().child(section_title("DNS"));
        section = section.child(field("Remote DNS", &self.remote_dns_input));
        if let Some(row) =
            self.render_toggle_row(SettingKey::EnableLocalDns, "Local DNS resolver", context)
        {
            section = section.child(row);
        }
        section = section.child(field("Local DNS port", &self.local_dns_port_input));
        section = section.child(field("Direct DNS", &self.direct_dns_input));
        section
    }

    fn render_advanced_section(&self, context: &mut Context<Self>) -> Option<Div> {
        let engine_row =
            self.render_toggle_row(SettingKey::ForceNativeEngine, "Force native engine", context);
        engine_row.map(|row| section_column().child(section_title("Advanced")).child(row))
    }

    fn render_vpn_section(&self, context: &mut Context<Self>) -> Option<Div> {
        let metered_row =
            self.render_toggle_row(SettingKey::MeteredHint, "Treat tunnel as metered", context);
        let proxy_apps_row =
            self.render_toggle_row(SettingKey::ProxyApps, "Per-app proxy", context);

        if metered_row.is_none() && proxy_apps_row.is_none() {
            return None;
        }

        let mut section = section_column().child(section_title("VPN"));
        if let Some(row) = metered_row {
            section = section.child(row);
        }
        if let Some(row) = proxy_apps_row {
            section = section.child(row);
        }
        Some(section)
    }
}

fn section_column() -> Div {
    div().flex().flex_col().gap(px(GAP_SMALL)).w_full()
}

fn sync_port(store: &mut SettingsStore, key: SettingKey, text: &str) -> bool {
    match text.parse::<u16>() {
        Ok(value) if value >= 1 => store.set_port(key, value),
        _ => false,
    }
}

fn sync_seconds(store: &mut SettingsStore, key: SettingKey, text: &str) -> bool {
    match text.parse::<u32>() {
        Ok(value) => store.set_seconds(key, value),
        _ => false,
    }
}

fn sync_string(store: &mut SettingsStore, key: SettingKey, text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return false;
    }
    store.set_string(key, trimmed)
}

impl Render for SettingsScreen {
    fn render(&mut self, _window: &mut Window, context: &mut Context<Self>) -> impl IntoElement {
        self.drain_incoming();
        self.sync_inputs(context);
        self.refresh_input_locks(context);

        let mut column = div()
            .key_context("SettingsScreen")
            .track_focus(&self.focus_handle)
            .flex()
            .flex_col()
            .w_full()
            .gap(px(GAP_MEDIUM))
            .child(self.render_general_section(context))
            .child(self.render_inbound_section(context))
            .child(self.render_routing_section(context))
            .child(self.render_mux_section(context))
            .child(self.render_dns_section(context));

        if let Some(section) = self.render_advanced_section(context) {
            column = column.child(section);
        }
        if let Some(section) = self.render_vpn_section(context) {
            column = column.child(section);
        }
        column
    }
}

impl Focusable for SettingsScreen {
    fn focus_handle(&self, _: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}
