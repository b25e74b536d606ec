use gpui::{App, Context, FocusHandle, Focusable, Window, div, prelude::*, px, rgb};

use crate::theme::*;

pub struct LogPanel {
    focus_handle: FocusHandle,
    lines: Vec<String>,
}

impl LogPanel {
    pub fn new(context: &mut Context<Self>) -> Self {
        Self {
            focus_handle: context.focus_handle(),
            lines: Vec::new(),
        }
    }

    pub fn set_lines(&mut self, lines: &[String]) -> bool {
        if lines == self.lines.as_slice() {
            return false;
        }
        self.lines = lines.to_vec();
        true
    }
}

impl Render for LogPanel {
    fn render(&mut self, _window: &mut Window, _context: &mut Context<Self>) -> impl IntoElement {
        let mut panel = div()
            .key_context("LogPanel")
            .track_focus(&self.focus_handle)
            .flex()
            .flex_col()
            .w_full()
            .text_size(px(TEXT_SIZE_EXTRA_SMALL))
            .line_height(px(LINE_HEIGHT_EXTRA_SMALL));

        if self.lines.is_empty() {
            return panel.child(
                div()
                    .text_color(rgb(LOG_PLACEHOLDER))
                    .child("Core output appears here once the service starts."),
            );
        }

        panel = panel.text_color(rgb(LOG_TEXT));
        for line in &self.lines {
            panel = panel.child(div().w_full().child(line.clone()));
        }
        panel
    }
}

impl Focusable for LogPanel {
    fn focus_handle(&self, _: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}
