use std::process::{Command, Stdio};

pub fn run_silent_with_output(program: &str, arguments: &[&str]) -> (bool, String) {
    log::debug!("[cmd] {} {}", program, arguments.join(" "));
    match Command::new(program)
        .args(arguments)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
    {
        Ok(output) => {
            let success = output.status.success();
            let stdout = String::from_utf8_lossy(&output.stdout).to_string();
            if !success {
                log::debug!(
                    "[cmd] FAILED (exit {}): {} {}",
                    output.status.code().unwrap_or(-1),
                    program,
                    arguments.join(" "),
                );
            }
            (success, stdout)
        }
        Err(error) => {
            log::debug!("[cmd] spawn error for {}: {}", program, error);
            (false, error.to_string())
        }
    }
}

pub fn run_silent(program: &str, arguments: &[&str]) -> bool {
    run_silent_with_output(program, arguments).0
}

pub fn find_core_binary() -> (String, bool) {
    let candidates = [
        "driftgate_core",
        "/opt/driftgate/driftgate_core",
        "/usr/local/bin/driftgate_core",
        "/usr/bin/driftgate_core",
    ];

    for candidate in &candidates {
        if let Ok(output) = Command::new("which").arg(candidate).output()
            && output.status.success()
        {
            let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
            log::info!("[binary] found via which: {candidate} → {path}");
            return (path, true);
        }
        if std::path::Path::new(candidate).exists() {
            log::info!("[binary] found on disk: {candidate}");
            return (candidate.to_string(), true);
        }
    }

    log::warn!("[binary] driftgate_core not found in search paths");
    ("driftgate_core".to_string(), false)
}

pub fn check_tun_device() -> bool {
    match std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open("/dev/net/tun")
    {
        Ok(_) => {
            log::debug!("[preflight] /dev/net/tun is available");
            true
        }
        Err(error) => {
            log::warn!("[preflight] /dev/net/tun not available: {error}");
            false
        }
    }
}

pub fn check_elevation() -> bool {
    let (success, _) = run_silent_with_output("which", &["pkexec"]);
    if success {
        log::debug!("[preflight] pkexec is available");
    } else {
        log::warn!("[preflight] pkexec not found, VPN mode needs root privileges");
    }
    success
}

pub fn check_notification_actions() -> bool {
    let (success, _) = run_silent_with_output("which", &["notify-send"]);
    if !success {
        log::info!("[preflight] notify-send not found, notification actions unavailable");
    }
    success
}

pub fn check_metered_transport() -> bool {
    let (success, _) = run_silent_with_output("which", &["nmcli"]);
    if !success {
        log::info!("[preflight] NetworkManager not found, metered transport hint unavailable");
    }
    success
}

pub fn check_binary_works(binary: &str, needs_root: bool) -> Option<String> {
    if needs_root {
        log::debug!("[preflight] skipping elevated binary check (would prompt for auth)");
        return None;
    }

    log::debug!("[preflight] testing binary: {binary} --help");

    match Command::new(binary)
        .arg("--help")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
    {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            let first_line = stdout
                .lines()
                .chain(stderr.lines())
                .next()
                .unwrap_or("(no output)");
            log::info!("[preflight] binary OK: {first_line}");
            None
        }
        Err(error) => {
            let message = format!("Cannot run '{binary}': {error}");
            log::error!("[preflight] {message}");
            Some(message)
        }
    }
}
