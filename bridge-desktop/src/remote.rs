//! In-memory remote command center.
//!
//! Desktop builds have no lock screen; this keeps command registrations in
//! memory so media-key integrations (or tests) can fire them via [`send`].
//!
//! [`send`]: InMemoryRemoteCommandCenter::send

use bridge_traits::remote::{
    RemoteCommandCenter, RemoteCommandEvent, RemoteCommandHandler, RemoteCommandKind,
    RemoteCommandStatus,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

struct CommandEntry {
    targets: Vec<RemoteCommandHandler>,
    enabled: bool,
    preferred_intervals: Vec<Duration>,
}

impl Default for CommandEntry {
    fn default() -> Self {
        // Host commands start enabled with no targets.
        Self {
            targets: Vec::new(),
            enabled: true,
            preferred_intervals: Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct InMemoryRemoteCommandCenter {
    commands: Mutex<HashMap<RemoteCommandKind, CommandEntry>>,
}

impl InMemoryRemoteCommandCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_count(&self, command: RemoteCommandKind) -> usize {
        self.commands
            .lock()
            .get(&command)
            .map_or(0, |entry| entry.targets.len())
    }

    pub fn is_enabled(&self, command: RemoteCommandKind) -> bool {
        self.commands
            .lock()
            .get(&command)
            .map_or(true, |entry| entry.enabled)
    }

    pub fn preferred_intervals(&self, command: RemoteCommandKind) -> Vec<Duration> {
        self.commands
            .lock()
            .get(&command)
            .map(|entry| entry.preferred_intervals.clone())
            .unwrap_or_default()
    }

    /// Dispatch `event` to the registered targets, like a host would on a
    /// media-key press. Returns `None` when the command is disabled or has no
    /// targets; otherwise the status of the last target invoked.
    pub fn send(&self, event: RemoteCommandEvent) -> Option<RemoteCommandStatus> {
        let targets = {
            let commands = self.commands.lock();
            let entry = commands.get(&event.command)?;
            if !entry.enabled {
                debug!(command = %event.command, "Dropping event for disabled command");
                return None;
            }
            entry.targets.clone()
        };

        // Targets run without the lock held so they may reconfigure the center.
        targets.iter().map(|target| target(event)).last()
    }
}

impl std::fmt::Debug for InMemoryRemoteCommandCenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let commands = self.commands.lock();
        let mut map = f.debug_map();
        for (kind, entry) in commands.iter() {
            map.entry(kind, &(entry.targets.len(), entry.enabled));
        }
        map.finish()
    }
}

impl RemoteCommandCenter for InMemoryRemoteCommandCenter {
    fn remove_targets(&self, command: RemoteCommandKind) {
        if let Some(entry) = self.commands.lock().get_mut(&command) {
            entry.targets.clear();
        }
    }

    fn add_target(&self, command: RemoteCommandKind, handler: RemoteCommandHandler) {
        self.commands
            .lock()
            .entry(command)
            .or_default()
            .targets
            .push(handler);
    }

    fn set_enabled(&self, command: RemoteCommandKind, enabled: bool) {
        self.commands.lock().entry(command).or_default().enabled = enabled;
    }

    fn set_preferred_intervals(&self, command: RemoteCommandKind, intervals: &[Duration]) {
        if !command.is_skip() {
            return;
        }
        self.commands
            .lock()
            .entry(command)
            .or_default()
            .preferred_intervals = intervals.to_vec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_handler(counter: Arc<AtomicUsize>) -> RemoteCommandHandler {
        Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            RemoteCommandStatus::Success
        })
    }

    #[test]
    fn test_send_invokes_registered_targets() {
        let center = InMemoryRemoteCommandCenter::new();
        let counter = Arc::new(AtomicUsize::new(0));
        center.add_target(RemoteCommandKind::Play, counting_handler(counter.clone()));

        let status = center.send(RemoteCommandEvent::new(RemoteCommandKind::Play));

        assert_eq!(status, Some(RemoteCommandStatus::Success));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disabled_commands_keep_targets_but_do_not_dispatch() {
        let center = InMemoryRemoteCommandCenter::new();
        let counter = Arc::new(AtomicUsize::new(0));
        center.add_target(RemoteCommandKind::Pause, counting_handler(counter.clone()));
        center.set_enabled(RemoteCommandKind::Pause, false);

        assert_eq!(center.send(RemoteCommandEvent::new(RemoteCommandKind::Pause)), None);
        assert_eq!(center.target_count(RemoteCommandKind::Pause), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_preferred_intervals_only_apply_to_skip_commands() {
        let center = InMemoryRemoteCommandCenter::new();
        let ten = [Duration::from_secs(10)];
        center.set_preferred_intervals(RemoteCommandKind::SkipForward, &ten);
        center.set_preferred_intervals(RemoteCommandKind::Play, &ten);

        assert_eq!(
            center.preferred_intervals(RemoteCommandKind::SkipForward),
            ten.to_vec()
        );
        assert!(center.preferred_intervals(RemoteCommandKind::Play).is_empty());
    }

    #[test]
    fn test_remove_targets_clears_only_that_command() {
        let center = InMemoryRemoteCommandCenter::new();
        let counter = Arc::new(AtomicUsize::new(0));
        center.add_target(RemoteCommandKind::Play, counting_handler(counter.clone()));
        center.add_target(RemoteCommandKind::Pause, counting_handler(counter));

        center.remove_targets(RemoteCommandKind::Play);

        assert_eq!(center.target_count(RemoteCommandKind::Play), 0);
        assert_eq!(center.target_count(RemoteCommandKind::Pause), 1);
    }
}
