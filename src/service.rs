use std::{
    fs,
    io::{BufRead, BufReader, Write},
    path::PathBuf,
    process::{Child, Command, Stdio},
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use crate::{process_log::ProcessLog, service_state::ServiceState, system::run_silent};

const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(3);

/// Spawns and supervises the external driftgate_core process. All
/// methods run on the UI thread; the stdout/stderr readers and the kill
/// helper are the only background threads, and they communicate through
/// the shared [`ProcessLog`].
pub struct ServiceController {
    binary_path: String,
    binary_found: bool,
    configuration_path: PathBuf,
    child_process: Option<Child>,
    process_log: Arc<Mutex<ProcessLog>>,
    log_file: Option<Arc<Mutex<fs::File>>>,
    stopping_since: Option<Instant>,
}

impl ServiceController {
    pub fn new(binary_path: String, binary_found: bool, configuration_path: PathBuf) -> Self {
        Self {
            binary_path,
            binary_found,
            configuration_path,
            child_process: None,
            process_log: Arc::new(Mutex::new(ProcessLog::new())),
            log_file: None,
            stopping_since: None,
        }
    }

    pub fn log_lines(&self) -> Vec<String> {
        self.process_log
            .lock()
            .map(|locked_log| locked_log.lines.clone())
            .unwrap_or_default()
    }

    pub fn start(&mut self, configuration_toml: &str, needs_elevation: bool) -> Result<(), String> {
        if !self.binary_found {
            return Err(format!(
                "Could not find '{}' in PATH or standard locations.",
                self.binary_path
            ));
        }

        if let Some(child) = self.child_process.take() {
            Self::kill_child_background(child);
        }

        std::fs::write(&self.configuration_path, configuration_toml).map_err(|error| {
            format!(
                "Failed to write {}: {error}",
                self.configuration_path.display()
            )
        })?;

        self.log_file = self.create_session_log_file();
        if let Ok(mut locked_log) = self.process_log.lock() {
            locked_log.reset();
        }
        self.stopping_since = None;

        let spawn_result = if needs_elevation {
            log::info!(
                "[service] spawning: pkexec {} -c {}",
                self.binary_path,
                self.configuration_path.display(),
            );
            Command::new("pkexec")
                .arg(&self.binary_path)
                .arg("-c")
                .arg(&self.configuration_path)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
        } else {
            log::info!(
                "[service] spawning: {} -c {}",
                self.binary_path,
                self.configuration_path.display(),
            );
            Command::new(&self.binary_path)
                .arg("-c")
                .arg(&self.configuration_path)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
        };

        match spawn_result {
            Ok(mut child) => {
                log::info!("[service] core started (pid={})", child.id());
                self.start_log_reader(&mut child);
                self.child_process = Some(child);
                Ok(())
            }
            Err(error) => Err(format!("Could not start driftgate_core: {error}")),
        }
    }

    pub fn stop(&mut self) {
        if let Some(ref child) = self.child_process {
            Self::send_terminate_signal(child);
            self.stopping_since = Some(Instant::now());
        }
    }

    /// Advances the supervised process and reports the next service
    /// state, if it changed. Called from the UI thread poll loop.
    pub fn poll(&mut self, current: &ServiceState) -> Option<ServiceState> {
        if let Some(status) = self.try_reap_child() {
            self.child_process = None;
            self.stopping_since = None;

            if matches!(current, ServiceState::Stopping) {
                log::info!("[service] core exited during stop: {status}");
                return Some(ServiceState::Stopped);
            }
            if status.success() {
                return Some(ServiceState::Stopped);
            }

            let code = status
                .code()
                .map(|exit_code| exit_code.to_string())
                .unwrap_or_else(|| "signal".into());
            log::warn!("[service] core exited unexpectedly ({code})");
            return Some(ServiceState::Failed(format!("Exited ({code})")));
        }

        match current {
            ServiceState::Starting => self.poll_starting(),
            ServiceState::Stopping => self.poll_stopping(),
            _ => None,
        }
    }

    fn poll_starting(&mut self) -> Option<ServiceState> {
        let (ready, startup_error) = match self.process_log.lock() {
            Ok(locked_log) => (locked_log.ready, locked_log.startup_error.clone()),
            Err(_) => return None,
        };

        if let Some(error) = startup_error {
            if let Some(child) = self.child_process.take() {
                Self::kill_child_background(child);
            }
            return Some(ServiceState::Failed(error));
        }

        ready.then_some(ServiceState::Connected)
    }

    fn poll_stopping(&mut self) -> Option<ServiceState> {
        let timed_out = self
            .stopping_since
            .is_some_and(|since| since.elapsed() >= GRACEFUL_SHUTDOWN_TIMEOUT);
        if !timed_out {
            return None;
        }

        log::warn!("[service] stop timeout, forcing kill");
        if let Some(child) = self.child_process.take() {
            Self::kill_child_background(child);
        }
        self.stopping_since = None;
        Some(ServiceState::Stopped)
    }

    pub fn shutdown(&mut self) {
        if let Some(child) = self.child_process.take() {
            Self::kill_child_background(child);
        }
    }

    fn try_reap_child(&mut self) -> Option<std::process::ExitStatus> {
        if let Some(ref mut child) = self.child_process
            && let Ok(Some(status)) = child.try_wait()
        {
            log::debug!("[service] core exited with status: {status}");
            return Some(status);
        }
        None
    }

    fn send_terminate_signal(child: &Child) {
        let pid_string = child.id().to_string();
        if run_silent("kill", &["-INT", &pid_string]) {
            log::info!("[service] sent SIGINT to pid={pid_string}");
        } else {
            log::info!("[service] SIGINT failed for pid={pid_string}, trying pkexec");
            std::thread::spawn(move || {
                run_silent("pkexec", &["kill", "-INT", &pid_string]);
            });
        }
    }

    fn kill_child_background(mut child: Child) {
        let pid_string = child.id().to_string();
        std::thread::spawn(move || {
            if run_silent("kill", &["-INT", &pid_string]) {
                log::info!("[service] sent SIGINT to pid={pid_string}");
            } else {
                run_silent("pkexec", &["kill", "-INT", &pid_string]);
            }

            let poll_interval = Duration::from_millis(100);
            let poll_count = GRACEFUL_SHUTDOWN_TIMEOUT.as_millis() / poll_interval.as_millis();

            for attempt in 0..poll_count {
                if let Ok(Some(status)) = child.try_wait() {
                    log::info!(
                        "[service] core exited gracefully (attempt {attempt}, status={status})"
                    );
                    return;
                }
                std::thread::sleep(poll_interval);
            }

            log::warn!("[service] graceful shutdown timed out for pid={pid_string}");
            if child.kill().is_err() {
                run_silent("pkexec", &["kill", "-KILL", &pid_string]);
            }
            match child.wait() {
                Ok(status) => log::info!("[service] core reaped: {status}"),
                Err(error) => log::warn!("[service] core wait error: {error}"),
            }
        });
    }

    fn create_session_log_file(&self) -> Option<Arc<Mutex<fs::File>>> {
        let logs_directory = self
            .configuration_path
            .parent()
            .map(|parent| parent.join("logs"))?;

        if let Err(error) = fs::create_dir_all(&logs_directory) {
            log::warn!("[logs] failed to create log directory: {error}");
            return None;
        }

        let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
        let log_path = logs_directory.join(format!("{timestamp}.log"));

        match fs::File::create(&log_path) {
            Ok(file) => {
                log::info!("[logs] session log: {}", log_path.display());
                Some(Arc::new(Mutex::new(file)))
            }
            Err(error) => {
                log::warn!("[logs] failed to create log file: {error}");
                None
            }
        }
    }

    fn start_log_reader(&self, child: &mut Child) {
        if let Some(stderr) = child.stderr.take() {
            Self::spawn_reader(stderr, self.process_log.clone(), self.log_file.clone());
        } else {
            log::warn!("[logs] no stderr pipe from core");
        }
        if let Some(stdout) = child.stdout.take() {
            Self::spawn_reader(stdout, self.process_log.clone(), self.log_file.clone());
        }
    }

    fn spawn_reader(
        stream: impl std::io::Read + Send + 'static,
        shared_log: Arc<Mutex<ProcessLog>>,
        log_file: Option<Arc<Mutex<fs::File>>>,
    ) {
        std::thread::spawn(move || {
            let reader = BufReader::new(stream);
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        if let Some(ref log_file) = log_file
                            && let Ok(mut file) = log_file.lock()
                            && let Err(error) = writeln!(file, "{line}")
                        {
                            log::warn!("[logs] failed to write session log line: {error}");
                        }
                        let Ok(mut locked_log) = shared_log.lock() else {
                            break;
                        };
                        locked_log.push_line(line);
                    }
                    Err(error) => {
                        log::trace!("[logs] core reader ended: {error}");
                        break;
                    }
                }
            }
        });
    }
}

impl Drop for ServiceController {
    fn drop(&mut self) {
        self.shutdown();
    }
}
