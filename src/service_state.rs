use crate::theme::{COLOR_GREEN, COLOR_RED, COLOR_YELLOW, TEXT_DIM};

#[derive(Clone, PartialEq, Debug)]
pub enum ServiceState {
    Stopped,
    Starting,
    Connected,
    Stopping,
    Failed(String),
}

impl ServiceState {
    pub fn label(&self) -> String {
        match self {
            Self::Stopped => "Stopped".into(),
            Self::Starting => "Starting…".into(),
            Self::Connected => "Connected".into(),
            Self::Stopping => "Stopping…".into(),
            Self::Failed(message) => format!("Failed: {message}"),
        }
    }

    pub fn color(&self) -> u32 {
        match self {
            Self::Stopped => TEXT_DIM,
            Self::Starting => COLOR_YELLOW,
            Self::Connected => COLOR_GREEN,
            Self::Stopping => COLOR_YELLOW,
            Self::Failed(_) => COLOR_RED,
        }
    }

    // Failed means nothing is running, so controls unlock exactly as
    // for Stopped.
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped | Self::Failed(_))
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Starting | Self::Stopping)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Starting | Self::Connected | Self::Stopping)
    }
}

/// Token returned by [`ServiceStateHub::register`]. Unregistration is
/// honored only for the token that currently holds the slot.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Registration(u64);

pub type StateListener = Box<dyn FnMut(ServiceState)>;

/// Single-slot observer registry for service run-state updates. At most
/// one listener is installed system-wide; registering replaces the
/// previous slot, and publishing happens on the UI thread only.
pub struct ServiceStateHub {
    current: ServiceState,
    listener: Option<(Registration, StateListener)>,
    next_registration: u64,
}

impl ServiceStateHub {
    pub fn new() -> Self {
        Self {
            current: ServiceState::Stopped,
            listener: None,
            next_registration: 0,
        }
    }

    pub fn current(&self) -> ServiceState {
        self.current.clone()
    }

    pub fn register(&mut self, listener: StateListener) -> Registration {
        let registration = Registration(self.next_registration);
        self.next_registration += 1;
        if let Some((previous, _)) = self.listener.replace((registration, listener)) {
            log::debug!(
                "[state_hub] listener {previous:?} replaced by {registration:?}"
            );
        }
        registration
    }

    pub fn unregister(&mut self, registration: Registration) {
        match self.listener {
            Some((active, _)) if active == registration => {
                self.listener = None;
            }
            _ => {
                // Stale or repeated token: the active slot stays intact.
                log::trace!("[state_hub] ignoring unregister for {registration:?}");
            }
        }
    }

    pub fn publish(&mut self, state: ServiceState) {
        self.current = state.clone();
        if let Some((_, ref mut listener)) = self.listener {
            listener(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    fn recording_listener(received: &Rc<RefCell<Vec<ServiceState>>>) -> StateListener {
        let received = received.clone();
        Box::new(move |state| received.borrow_mut().push(state))
    }

    #[test]
    fn publish_reaches_registered_listener() {
        let received = Rc::new(RefCell::new(Vec::new()));
        let mut hub = ServiceStateHub::new();
        hub.register(recording_listener(&received));

        hub.publish(ServiceState::Starting);
        hub.publish(ServiceState::Connected);

        assert_eq!(
            *received.borrow(),
            vec![ServiceState::Starting, ServiceState::Connected]
        );
        assert_eq!(hub.current(), ServiceState::Connected);
    }

    #[test]
    fn register_replaces_previous_slot() {
        let first = Rc::new(RefCell::new(Vec::new()));
        let second = Rc::new(RefCell::new(Vec::new()));
        let mut hub = ServiceStateHub::new();
        hub.register(recording_listener(&first));
        hub.register(recording_listener(&second));

        hub.publish(ServiceState::Connected);

        assert!(first.borrow().is_empty());
        assert_eq!(*second.borrow(), vec![ServiceState::Connected]);
    }

    #[test]
    fn stale_unregister_keeps_active_listener() {
        let received = Rc::new(RefCell::new(Vec::new()));
        let mut hub = ServiceStateHub::new();
        let stale = hub.register(Box::new(|_| {}));
        let active = hub.register(recording_listener(&received));

        hub.unregister(stale);
        hub.publish(ServiceState::Starting);
        assert_eq!(*received.borrow(), vec![ServiceState::Starting]);

        hub.unregister(active);
        hub.unregister(active);
        hub.publish(ServiceState::Stopped);
        assert_eq!(*received.borrow(), vec![ServiceState::Starting]);
    }

    #[test]
    fn current_tracks_publishes_without_listener() {
        let mut hub = ServiceStateHub::new();
        assert_eq!(hub.current(), ServiceState::Stopped);
        hub.publish(ServiceState::Failed("exited".into()));
        assert!(hub.current().is_stopped());
    }
}
