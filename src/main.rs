mod app;
mod app_select;
mod capabilities;
mod components;
mod controls;
mod core_config;
mod keys;
mod log_panel;
mod process_log;
mod service;
mod service_state;
mod settings;
mod store;
mod system;
mod text_input;
mod theme;

use gpui::{
    Application, Bounds, KeyBinding, WindowBackgroundAppearance, WindowBounds, WindowOptions,
    prelude::*, px, size,
};

use crate::{
    app::{AppInitialization, DriftgateApp, Quit, StartService, StopService},
    log_panel::LogPanel,
    store::SettingsStore,
    text_input::{
        Backspace, Copy, Cut, Delete, End, Home, Left, Paste, Right, SelectAll, SelectLeft,
        SelectRight, TextInput,
    },
    theme::{WINDOW_HEIGHT, WINDOW_WIDTH},
};

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("driftgate_ui=info"),
    )
    .init();

    log::info!(
        "driftgate-ui v{} starting (RUST_LOG={})",
        env!("CARGO_PKG_VERSION"),
        std::env::var("RUST_LOG").unwrap_or_else(|_| "<default: info>".into()),
    );

    log::info!(
        "[env] XDG_CURRENT_DESKTOP={}, XDG_SESSION_TYPE={}, DISPLAY={}, WAYLAND_DISPLAY={}",
        std::env::var("XDG_CURRENT_DESKTOP").unwrap_or_default(),
        std::env::var("XDG_SESSION_TYPE").unwrap_or_default(),
        std::env::var("DISPLAY").unwrap_or_default(),
        std::env::var("WAYLAND_DISPLAY").unwrap_or_default(),
    );

    let (binary_path, binary_found) = system::find_core_binary();
    log::info!(
        "[startup] core binary: {} (found={})",
        binary_path,
        binary_found,
    );

    if binary_found && let Some(error) = system::check_binary_works(&binary_path, false) {
        log::warn!("[startup] binary check issue: {error}");
    }

    let capabilities = capabilities::probe();
    let store = SettingsStore::load();

    Application::new().run(move |context| {
        let bounds = Bounds::centered(None, size(px(WINDOW_WIDTH), px(WINDOW_HEIGHT)), context);

        bind_keys(context);

        let configuration_path = DriftgateApp::configuration_directory().join("core.toml");
        log::info!(
            "[startup] core configuration path: {}",
            configuration_path.display()
        );

        let window = context.open_window(
            WindowOptions {
                window_bounds: Some(WindowBounds::Windowed(bounds)),
                titlebar: None,
                window_background: WindowBackgroundAppearance::Opaque,
                ..Default::default()
            },
            |_, context| {
                let log_panel = context.new(LogPanel::new);

                context.new(|context| {
                    DriftgateApp::new(
                        AppInitialization {
                            store,
                            capabilities,
                            binary_path,
                            binary_found,
                            configuration_path,
                            log_panel,
                        },
                        context,
                    )
                })
            },
        );

        match window {
            Ok(window) => {
                if let Err(error) = window.update(context, |view, window, context| {
                    let handle = view.focus_handle(context);
                    window.focus(&handle, context);
                    context.activate(true);
                }) {
                    log::error!("[startup] failed to initialize application window: {error}");
                    context.quit();
                    return;
                }

                context.on_action(|_: &Quit, context| context.quit());
            }
            Err(error) => {
                log::error!("[startup] failed to open application window: {error}");
                context.quit();
            }
        }
    });
}

fn bind_keys(context: &mut gpui::App) {
    context.bind_keys([
        KeyBinding::new("backspace", Backspace, Some("TextInput")),
        KeyBinding::new("delete", Delete, Some("TextInput")),
        KeyBinding::new("left", Left, Some("TextInput")),
        KeyBinding::new("right", Right, Some("TextInput")),
        KeyBinding::new("shift-left", SelectLeft, Some("TextInput")),
        KeyBinding::new("shift-right", SelectRight, Some("TextInput")),
        KeyBinding::new("home", Home, Some("TextInput")),
        KeyBinding::new("end", End, Some("TextInput")),
        KeyBinding::new("cmd-a", SelectAll, Some("TextInput")),
        KeyBinding::new("cmd-v", Paste, Some("TextInput")),
        KeyBinding::new("cmd-c", Copy, Some("TextInput")),
        KeyBinding::new("cmd-x", Cut, Some("TextInput")),
        KeyBinding::new("ctrl-a", SelectAll, Some("TextInput")),
        KeyBinding::new("ctrl-v", Paste, Some("TextInput")),
        KeyBinding::new("ctrl-c", Copy, Some("TextInput")),
        KeyBinding::new("ctrl-x", Cut, Some("TextInput")),
    ]);

    context.bind_keys([
        KeyBinding::new("enter", StartService, Some("DriftgateApp")),
        KeyBinding::new("ctrl-.", StopService, Some("DriftgateApp")),
        KeyBinding::new("cmd-q", Quit, Some("DriftgateApp")),
        KeyBinding::new("ctrl-q", Quit, Some("DriftgateApp")),
    ]);
}
