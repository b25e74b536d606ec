use std::{cell::RefCell, rc::Rc};

use gpui::{
    App, Context, Entity, EventEmitter, FocusHandle, Focusable, MouseButton, Window, div,
    prelude::*, px, rgb,
};

use crate::{
    components::*,
    store::SettingsStore,
    text_input::{InputFormat, TextInput},
    theme::*,
};

pub enum AppSelectEvent {
    Close,
}

pub struct AppSelectScreen {
    store: Rc<RefCell<SettingsStore>>,
    name_input: Entity<TextInput>,
    row_focus_handles: Vec<FocusHandle>,
    remove_focus_handles: Vec<FocusHandle>,
    add_focus_handle: FocusHandle,
    back_focus_handle: FocusHandle,
    focus_handle: FocusHandle,
}

impl AppSelectScreen {
    pub fn new(store: Rc<RefCell<SettingsStore>>, context: &mut Context<Self>) -> Self {
        let name_input = TextInput::new(context, "firefox", InputFormat::Text, None);
        let row_count = store.borrow().proxied_app_list().len();

        Self {
            store,
            name_input,
            row_focus_handles: (0..row_count).map(|_| context.focus_handle()).collect(),
            remove_focus_handles: (0..row_count).map(|_| context.focus_handle()).collect(),
            add_focus_handle: context.focus_handle(),
            back_focus_handle: context.focus_handle(),
            focus_handle: context.focus_handle(),
        }
    }

    fn sync_row_focus_handles(&mut self, context: &mut Context<Self>) {
        let row_count = self.store.borrow().proxied_app_list().len();
        while self.row_focus_handles.len() < row_count {
            self.row_focus_handles.push(context.focus_handle());
            self.remove_focus_handles.push(context.focus_handle());
        }
        self.row_focus_handles.truncate(row_count);
        self.remove_focus_handles.truncate(row_count);
    }

    fn add_app(&mut self, context: &mut Context<Self>) {
        let name = self.name_input.read(context).text().trim().to_string();
        if name.is_empty() {
            return;
        }

        let changed = {
            let mut store = self.store.borrow_mut();
            let mut list = store.proxied_app_list().to_vec();
            if list.iter().any(|entry| *entry == name) {
                false
            } else {
                list.push(name.clone());
                store.set_proxied_app_list(list)
            }
        };

        if changed {
            log::info!("[app_select] added: {name}");
            self.store.borrow().save();
            self.name_input.update(context, |input, _| input.set_text(""));
            self.sync_row_focus_handles(context);
        }
        context.notify();
    }

    fn remove_app(&mut self, index: usize, context: &mut Context<Self>) {
        let removed = {
            let mut store = self.store.borrow_mut();
            let mut list = store.proxied_app_list().to_vec();
            if index >= list.len() {
                return;
            }
            let removed = list.remove(index);
            store.set_proxied_app_list(list);
            removed
        };

        log::info!("[app_select] removed: {removed}");
        self.store.borrow().save();
        self.sync_row_focus_handles(context);
        context.notify();
    }

    fn close(&mut self, context: &mut Context<Self>) {
        context.emit(AppSelectEvent::Close);
    }
}

impl EventEmitter<AppSelectEvent> for AppSelectScreen {}

impl Render for AppSelectScreen {
    fn render(&mut self, _window: &mut Window, context: &mut Context<Self>) -> impl IntoElement {
        self.sync_row_focus_handles(context);
        let app_names = self.store.borrow().proxied_app_list().to_vec();

        let mut list = div()
            .flex()
            .flex_col()
            .gap(px(GAP_EXTRA_SMALL))
            .w_full();

        if app_names.is_empty() {
            list = list.child(
                div()
                    .px(px(PADDING_INPUT_HORIZONTAL))
                    .text_size(px(TEXT_SIZE_SMALL))
                    .text_color(rgb(TEXT_DIM))
                    .child("No programs selected; everything is proxied."),
            );
        }

        for (app_index, name) in app_names.iter().enumerate() {
            list = list.child(
                div()
                    .flex()
                    .flex_row()
                    .gap(px(GAP_SMALL))
                    .w_full()
                    .child(list_item(name, false, &self.row_focus_handles[app_index]))
                    .child(
                        div().w(px(APP_ROW_BUTTON_WIDTH)).flex_shrink_0().child(
                            button_ghost("Remove", false, &self.remove_focus_handles[app_index])
                                .on_mouse_up(
                                    MouseButton::Left,
                                    context.listener(move |this, _, _, context| {
                                        this.remove_app(app_index, context);
                                    }),
                                ),
                        ),
                    ),
            );
        }

        div()
            .key_context("AppSelectScreen")
            .track_focus(&self.focus_handle)
            .flex()
            .flex_col()
            .w_full()
            .gap(px(GAP_MEDIUM))
            .child(section_title("Proxied programs"))
            .child(list)
            .child(
                div()
                    .flex()
                    .flex_row()
                    .gap(px(GAP_SMALL))
                    .w_full()
                    .child(field("Program name", &self.name_input))
                    .child(
                        div()
                            .w(px(APP_ROW_BUTTON_WIDTH))
                            .flex_shrink_0()
                            .flex()
                            .flex_col()
                            .justify_end()
                            .child(
                                button_ghost("Add", false, &self.add_focus_handle).on_mouse_up(
                                    MouseButton::Left,
                                    context.listener(|this, _, _, context| {
                                        this.add_app(context);
                                    }),
                                ),
                            ),
                    ),
            )
            .child(
                button_action(
                    "Back to settings",
                    BUTTON_PRIMARY,
                    BUTTON_HOVER,
                    false,
                    &self.back_focus_handle,
                )
                .on_mouse_up(
                    MouseButton::Left,
                    context.listener(|this, _, _, context| this.close(context)),
                ),
            )
    }
}

impl Focusable for AppSelectScreen {
    fn focus_handle(&self, _: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}
