const MAX_LOG_LINES: usize = 500;

pub enum LogLineEvent {
    Ready,
    StartupError,
    RuntimeError,
    Normal,
}

/// Classifies one line of driftgate_core output. Before the core reports
/// ready, any error line is treated as a startup failure; afterwards the
/// same vocabulary only counts as a runtime error.
pub fn classify_log_line(line: &str, already_ready: bool) -> LogLineEvent {
    let lower = line.to_lowercase();

    if lower.contains("tunnel established")
        || lower.contains("core started")
        || (lower.contains("inbound") && lower.contains("listening"))
        || (lower.contains("socks") && lower.contains("listening"))
    {
        return LogLineEvent::Ready;
    }

    let looks_like_error = lower.starts_with("error:")
        || lower.contains("fatal")
        || lower.contains("failed to")
        || lower.contains("permission denied")
        || lower.contains("address already in use")
        || lower.contains("bind error")
        || lower.contains("failed to open tun");

    if looks_like_error && !lower.contains("retrying") {
        return if already_ready {
            LogLineEvent::RuntimeError
        } else {
            LogLineEvent::StartupError
        };
    }

    LogLineEvent::Normal
}

pub struct ProcessLog {
    pub lines: Vec<String>,
    pub ready: bool,
    pub startup_error: Option<String>,
    pub runtime_error: Option<String>,
}

impl ProcessLog {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            ready: false,
            startup_error: None,
            runtime_error: None,
        }
    }

    pub fn reset(&mut self) {
        self.lines.clear();
        self.ready = false;
        self.startup_error = None;
        self.runtime_error = None;
    }

    pub fn push_line(&mut self, line: String) {
        match classify_log_line(&line, self.ready) {
            LogLineEvent::Ready => {
                if !self.ready {
                    log::info!("[detect] core ready: {line}");
                }
                self.ready = true;
            }
            LogLineEvent::StartupError => {
                log::warn!("[detect] startup error: {line}");
                if self.startup_error.is_none() {
                    self.startup_error = Some(line.clone());
                }
            }
            LogLineEvent::RuntimeError => {
                if self.runtime_error.is_none() {
                    log::warn!("[detect] runtime error: {line}");
                    self.runtime_error = Some(line.clone());
                }
            }
            LogLineEvent::Normal => {}
        }

        self.lines.push(line);
        if self.lines.len() > MAX_LOG_LINES {
            self.lines.remove(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readiness_lines_flip_the_ready_flag() {
        let mut log = ProcessLog::new();
        log.push_line("INFO socks inbound listening on 127.0.0.1:2080".into());
        assert!(log.ready);
        assert!(log.startup_error.is_none());
    }

    #[test]
    fn error_before_ready_is_a_startup_error() {
        let mut log = ProcessLog::new();
        log.push_line("error: address already in use (0.0.0.0:2080)".into());
        assert!(!log.ready);
        assert_eq!(
            log.startup_error.as_deref(),
            Some("error: address already in use (0.0.0.0:2080)")
        );
    }

    #[test]
    fn error_after_ready_is_a_runtime_error() {
        let mut log = ProcessLog::new();
        log.push_line("tunnel established".into());
        log.push_line("failed to resolve upstream, retrying".into());
        assert!(log.runtime_error.is_none(), "retry lines are not errors");
        log.push_line("failed to resolve upstream".into());
        assert!(log.startup_error.is_none());
        assert!(log.runtime_error.is_some());
    }

    #[test]
    fn buffer_is_bounded() {
        let mut log = ProcessLog::new();
        for index in 0..(MAX_LOG_LINES + 25) {
            log.push_line(format!("line {index}"));
        }
        assert_eq!(log.lines.len(), MAX_LOG_LINES);
        assert_eq!(log.lines.first().map(String::as_str), Some("line 25"));
    }
}
