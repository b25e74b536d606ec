use std::{cell::RefCell, path::PathBuf, rc::Rc};

use gpui::{
    App, Context, Entity, FocusHandle, Focusable, MouseButton, MouseUpEvent, ScrollHandle,
    Subscription, Window, actions, div, prelude::*, px, rgb,
};

use crate::{
    app_select::{AppSelectEvent, AppSelectScreen},
    capabilities::Capabilities,
    components::*,
    core_config::CoreConfiguration,
    log_panel::LogPanel,
    service::ServiceController,
    service_state::{ServiceState, ServiceStateHub},
    settings::{SettingsEvent, SettingsScreen},
    store::SettingsStore,
    theme::*,
};

actions!(driftgate, [StartService, StopService, Quit]);

enum ActiveScreen {
    Settings,
    AppSelection,
}

pub struct AppInitialization {
    pub store: SettingsStore,
    pub capabilities: Capabilities,
    pub binary_path: String,
    pub binary_found: bool,
    pub configuration_path: PathBuf,
    pub log_panel: Entity<LogPanel>,
}

pub struct DriftgateApp {
    store: Rc<RefCell<SettingsStore>>,
    hub: Rc<RefCell<ServiceStateHub>>,
    controller: ServiceController,
    capabilities: Capabilities,
    service_state: ServiceState,
    status_detail: String,
    active_screen: ActiveScreen,
    settings_screen: Entity<SettingsScreen>,
    app_select_screen: Entity<AppSelectScreen>,
    log_panel: Entity<LogPanel>,
    log_scroll_handle: ScrollHandle,
    screen_scroll_handle: ScrollHandle,
    service_button_focus_handle: FocusHandle,
    focus_handle: FocusHandle,
    poll_tick: u32,
    _subscriptions: Vec<Subscription>,
}

impl DriftgateApp {
    pub fn new(initialization: AppInitialization, context: &mut Context<Self>) -> Self {
        let store = Rc::new(RefCell::new(initialization.store));
        let hub = Rc::new(RefCell::new(ServiceStateHub::new()));
        let capabilities = initialization.capabilities;

        let settings_screen = {
            let store = store.clone();
            let hub = hub.clone();
            context.new(|screen_context| {
                let mut screen = SettingsScreen::new(store, hub, &capabilities, screen_context);
                screen.on_activate(screen_context);
                screen
            })
        };
        let app_select_screen = {
            let store = store.clone();
            context.new(|screen_context| AppSelectScreen::new(store, screen_context))
        };

        let subscriptions = vec![
            context.subscribe(&settings_screen, |this, _, event, context| match event {
                SettingsEvent::OpenAppSelection => this.open_app_selection(context),
            }),
            context.subscribe(&app_select_screen, |this, _, event, context| match event {
                AppSelectEvent::Close => this.close_app_selection(context),
            }),
        ];

        Self {
            store,
            hub,
            controller: ServiceController::new(
                initialization.binary_path,
                initialization.binary_found,
                initialization.configuration_path,
            ),
            capabilities,
            service_state: ServiceState::Stopped,
            status_detail: String::new(),
            active_screen: ActiveScreen::Settings,
            settings_screen,
            app_select_screen,
            log_panel: initialization.log_panel,
            log_scroll_handle: ScrollHandle::new(),
            screen_scroll_handle: ScrollHandle::new(),
            service_button_focus_handle: context.focus_handle(),
            focus_handle: context.focus_handle(),
            poll_tick: 0,
            _subscriptions: subscriptions,
        }
    }

    pub fn configuration_directory() -> PathBuf {
        let directory = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("driftgate");
        if let Err(error) = std::fs::create_dir_all(&directory) {
            log::warn!(
                "[configuration] failed to create configuration directory {}: {error}",
                directory.display()
            );
        }
        directory
    }

    /// Publishes the new state on the UI thread and pokes the settings
    /// screen so its listener inbox is drained on the next frame.
    fn publish_state(&mut self, state: ServiceState, context: &mut Context<Self>) {
        log::info!("[state] {} → {}", self.service_state.label(), state.label());
        self.service_state = state.clone();
        self.hub.borrow_mut().publish(state);
        self.settings_screen
            .update(context, |_, screen_context| screen_context.notify());
        context.notify();
    }

    fn open_app_selection(&mut self, context: &mut Context<Self>) {
        self.settings_screen
            .update(context, |screen, _| screen.on_deactivate());
        self.active_screen = ActiveScreen::AppSelection;
        context.notify();
    }

    fn close_app_selection(&mut self, context: &mut Context<Self>) {
        self.active_screen = ActiveScreen::Settings;
        self.settings_screen
            .update(context, |screen, screen_context| {
                screen.on_activate(screen_context);
            });
        context.notify();
    }

    fn start_service(&mut self, _: &StartService, _window: &mut Window, context: &mut Context<Self>) {
        if !self.service_state.is_stopped() {
            return;
        }

        let mode = self.store.borrow().service_mode();
        log::info!("━━━ START (mode={}) ━━━", mode.label());

        if mode.is_vpn() && !self.capabilities.tun_device {
            self.status_detail = "/dev/net/tun not found. Load the tun kernel module:\n  \
                 sudo modprobe tun"
                .into();
            self.publish_state(ServiceState::Failed("TUN device not available".into()), context);
            return;
        }

        if mode.is_vpn() && !self.capabilities.elevation {
            self.status_detail = "pkexec is required for VPN mode (root privileges needed).\n\
                 Install polkit or switch to proxy-only mode."
                .into();
            self.publish_state(ServiceState::Failed("pkexec not found".into()), context);
            return;
        }

        let configuration_toml = {
            let store = self.store.borrow();
            match CoreConfiguration::from_settings(store.values(), mode).to_toml() {
                Ok(rendered) => rendered,
                Err(error) => {
                    drop(store);
                    self.status_detail = error.clone();
                    self.publish_state(ServiceState::Failed(error), context);
                    return;
                }
            }
        };

        match self.controller.start(&configuration_toml, mode.is_vpn()) {
            Ok(()) => {
                self.store.borrow_mut().clear_dirty();
                self.status_detail = String::new();
                self.publish_state(ServiceState::Starting, context);
            }
            Err(message) => {
                log::warn!("[service] start failed: {message}");
                self.status_detail = message;
                self.publish_state(ServiceState::Failed("Start failed".into()), context);
            }
        }
    }

    fn stop_service(&mut self, _: &StopService, _window: &mut Window, context: &mut Context<Self>) {
        if !self.service_state.is_running() || matches!(self.service_state, ServiceState::Stopping)
        {
            return;
        }
        log::info!("━━━ STOP ━━━");
        self.controller.stop();
        self.status_detail = String::new();
        self.publish_state(ServiceState::Stopping, context);
    }

    fn on_service_button_click(
        &mut self,
        _: &MouseUpEvent,
        window: &mut Window,
        context: &mut Context<Self>,
    ) {
        if self.service_state.is_busy() {
            return;
        }
        if self.service_state.is_running() {
            self.stop_service(&StopService, window, context);
        } else {
            self.start_service(&StartService, window, context);
        }
    }

    fn poll_service(&mut self, context: &mut Context<Self>) {
        self.poll_tick = self.poll_tick.wrapping_add(1);
        if !self.poll_tick.is_multiple_of(4) {
            context.notify();
            return;
        }

        if let Some(next) = self.controller.poll(&self.service_state) {
            match &next {
                ServiceState::Connected => {
                    self.status_detail = self.connected_detail();
                }
                ServiceState::Failed(reason) => {
                    if self.status_detail.is_empty() {
                        self.status_detail = reason.clone();
                    }
                }
                ServiceState::Stopped => {
                    self.status_detail = String::new();
                }
                _ => {}
            }
            self.publish_state(next, context);
            return;
        }
        context.notify();
    }

    fn connected_detail(&self) -> String {
        let store = self.store.borrow();
        let values = store.values();
        let bind = if values.allow_lan_access {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        };

        let mut detail = if store.service_mode().is_vpn() {
            "VPN tunnel active (system-wide)".to_string()
        } else {
            format!("SOCKS5 proxy on {bind}:{}", values.socks_port)
        };
        if values.require_http {
            detail.push_str(&format!("\nHTTP proxy on {bind}:{}", values.http_port));
        }
        if store.service_mode().is_vpn() && values.proxy_apps {
            detail.push_str(&format!(
                "\nPer-app proxy: {} programs",
                values.proxied_app_list.len()
            ));
        }
        detail
    }

    fn quit(&mut self, _: &Quit, _window: &mut Window, context: &mut Context<Self>) {
        log::info!("[quit] shutting down");
        self.controller.shutdown();
        context.quit();
    }

    fn render_titlebar(&self, context: &mut Context<Self>) -> impl IntoElement {
        div()
            .flex()
            .flex_row()
            .items_center()
            .w_full()
            .h(px(TITLEBAR_HEIGHT))
            .bg(rgb(TITLEBAR_BACKGROUND))
            .child(titlebar_title("Driftgate").on_mouse_down(
                MouseButton::Left,
                context.listener(|_, _, window, _| window.start_window_move()),
            ))
            .child(titlebar_close().on_mouse_up(
                MouseButton::Left,
                context.listener(|this, _, window, context| this.quit(&Quit, window, context)),
            ))
    }

    fn render_status(&self) -> impl IntoElement {
        let state_label_text = self.service_state.label();
        let state_color = self.service_state.color();
        let detail = self.status_detail.clone();
        let restart_pending = self.store.borrow().dirty() && self.service_state.is_running();

        div()
            .flex()
            .flex_col()
            .gap(px(GAP_EXTRA_SMALL))
            .px(px(PADDING_INPUT_HORIZONTAL))
            .child(
                div()
                    .flex()
                    .flex_row()
                    .items_center()
                    .gap(px(GAP_SMALL))
                    .child(status_dot(state_color))
                    .child(status_label(state_label_text, state_color)),
            )
            .when(!detail.is_empty(), |element| {
                element.child(status_detail(detail))
            })
            .when(restart_pending, |element| {
                element.child(status_detail(
                    "Configuration changed; restart the service to apply.".into(),
                ))
            })
    }
}

impl Render for DriftgateApp {
    fn render(&mut self, _window: &mut Window, context: &mut Context<Self>) -> impl IntoElement {
        if self.service_state.is_running() {
            self.poll_service(context);
        }

        {
            let lines = self.controller.log_lines();
            let changed = self
                .log_panel
                .update(context, |panel, _| panel.set_lines(&lines));
            if changed {
                self.log_scroll_handle.scroll_to_bottom();
            }
        }

        let busy = self.service_state.is_busy();
        let (button_label, button_background, button_hover_background) = match self.service_state {
            ServiceState::Connected | ServiceState::Stopping => {
                ("Stop service", BUTTON_DANGER, BUTTON_DANGER_HOVER)
            }
            _ => ("Start service", BUTTON_PRIMARY, BUTTON_HOVER),
        };

        div()
            .key_context("DriftgateApp")
            .track_focus(&self.focus_handle(context))
            .on_action(context.listener(Self::start_service))
            .on_action(context.listener(Self::stop_service))
            .on_action(context.listener(Self::quit))
            .flex()
            .flex_col()
            .size_full()
            .bg(rgb(SURFACE))
            .child(self.render_titlebar(context))
            .child(
                div()
                    .flex()
                    .flex_row()
                    .flex_1()
                    .overflow_hidden()
                    .child(
                        div()
                            .id("screen-scroll")
                            .flex()
                            .flex_col()
                            .w(px(LEFT_COLUMN_WIDTH))
                            .flex_shrink_0()
                            .overflow_y_scroll()
                            .track_scroll(&self.screen_scroll_handle)
                            .border_r_1()
                            .border_color(rgb(BORDER))
                            .px(px(PADDING_COLUMN))
                            .pb(px(PADDING_COLUMN))
                            .pt(px(PADDING_COLUMN_TOP))
                            .child(match self.active_screen {
                                ActiveScreen::Settings => div().child(self.settings_screen.clone()),
                                ActiveScreen::AppSelection => {
                                    div().child(self.app_select_screen.clone())
                                }
                            }),
                    )
                    .child(
                        div()
                            .flex()
                            .flex_col()
                            .flex_1()
                            .overflow_hidden()
                            .px(px(PADDING_COLUMN))
                            .pb(px(PADDING_COLUMN))
                            .pt(px(PADDING_COLUMN_TOP))
                            .gap(px(GAP_MEDIUM))
                            .child(
                                button_action(
                                    button_label,
                                    button_background,
                                    button_hover_background,
                                    busy,
                                    &self.service_button_focus_handle,
                                )
                                .when(!busy, |element| {
                                    element.on_mouse_up(
                                        MouseButton::Left,
                                        context.listener(Self::on_service_button_click),
                                    )
                                }),
                            )
                            .child(self.render_status())
                            .child(
                                div()
                                    .flex()
                                    .flex_col()
                                    .flex_1()
                                    .overflow_hidden()
                                    .gap(px(GAP_EXTRA_SMALL))
                                    .child(label("Core log"))
                                    .child(
                                        log_container()
                                            .track_scroll(&self.log_scroll_handle)
                                            .child(self.log_panel.clone()),
                                    ),
                            ),
                    ),
            )
    }
}

impl Focusable for DriftgateApp {
    fn focus_handle(&self, _: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

impl Drop for DriftgateApp {
    fn drop(&mut self) {
        log::info!("[drop] DriftgateApp shutting down");
        self.controller.shutdown();
    }
}
