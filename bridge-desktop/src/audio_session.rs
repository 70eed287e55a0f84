//! Desktop audio session.
//!
//! Desktop platforms have no process-wide audio arbitration, so this session
//! only records what the core asked for. Interruptions and route changes can
//! be injected with [`DesktopAudioSession::post`].

use async_trait::async_trait;
use bridge_traits::{
    audio_session::{AudioSession, AudioSessionCategory, AudioSessionMode, AudioSessionNotification},
    error::{BridgeError, Result},
};
use parking_lot::Mutex;
use tokio::sync::broadcast;

const NOTIFICATION_BUFFER: usize = 16;

#[derive(Debug, Default)]
struct SessionState {
    category: Option<(AudioSessionCategory, AudioSessionMode)>,
    active: bool,
    activations: usize,
    deactivations: usize,
}

#[derive(Debug)]
pub struct DesktopAudioSession {
    state: Mutex<SessionState>,
    notifications: broadcast::Sender<AudioSessionNotification>,
    reject_category: bool,
    reject_reactivation: bool,
}

impl DesktopAudioSession {
    pub fn new() -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_BUFFER);
        Self {
            state: Mutex::new(SessionState::default()),
            notifications,
            reject_category: false,
            reject_reactivation: false,
        }
    }

    /// A session whose `set_category` always fails.
    pub fn rejecting_category() -> Self {
        Self {
            reject_category: true,
            ..Self::new()
        }
    }

    /// A session that activates once and refuses every later activation,
    /// as when another app keeps the audio hardware after an interruption.
    pub fn rejecting_reactivation() -> Self {
        Self {
            reject_reactivation: true,
            ..Self::new()
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().active
    }

    pub fn category(&self) -> Option<(AudioSessionCategory, AudioSessionMode)> {
        self.state.lock().category
    }

    pub fn deactivation_count(&self) -> usize {
        self.state.lock().deactivations
    }

    /// Deliver a notification to every subscriber. Returns how many received it.
    pub fn post(&self, notification: AudioSessionNotification) -> usize {
        self.notifications.send(notification).unwrap_or(0)
    }
}

impl Default for DesktopAudioSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioSession for DesktopAudioSession {
    async fn set_category(
        &self,
        category: AudioSessionCategory,
        mode: AudioSessionMode,
    ) -> Result<()> {
        if self.reject_category {
            return Err(BridgeError::OperationFailed(format!(
                "category {:?} not supported",
                category
            )));
        }
        self.state.lock().category = Some((category, mode));
        Ok(())
    }

    async fn set_active(&self, active: bool) -> Result<()> {
        let mut state = self.state.lock();
        if active {
            if self.reject_reactivation && state.activations > 0 {
                return Err(BridgeError::OperationFailed(
                    "audio session cannot be reactivated".to_string(),
                ));
            }
            state.activations += 1;
        } else if state.active {
            state.deactivations += 1;
        }
        state.active = active;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AudioSessionNotification> {
        self.notifications.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::audio_session::InterruptionNotice;

    #[tokio::test]
    async fn test_records_category_and_activation() {
        let session = DesktopAudioSession::new();
        session
            .set_category(AudioSessionCategory::Playback, AudioSessionMode::MoviePlayback)
            .await
            .unwrap();
        session.set_active(true).await.unwrap();
        assert!(session.is_active());

        session.set_active(false).await.unwrap();
        assert!(!session.is_active());
        assert_eq!(session.deactivation_count(), 1);
        assert_eq!(
            session.category(),
            Some((AudioSessionCategory::Playback, AudioSessionMode::MoviePlayback))
        );
    }

    #[tokio::test]
    async fn test_rejecting_session_fails_set_category() {
        let session = DesktopAudioSession::rejecting_category();
        let result = session
            .set_category(AudioSessionCategory::Playback, AudioSessionMode::Default)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_rejecting_reactivation_allows_first_activation_only() {
        let session = DesktopAudioSession::rejecting_reactivation();
        session.set_active(true).await.unwrap();

        let result = session.set_active(true).await;
        assert!(matches!(result, Err(BridgeError::OperationFailed(_))));
        // The first activation still holds.
        assert!(session.is_active());

        session.set_active(false).await.unwrap();
        assert!(session.set_active(true).await.is_err());
        assert!(!session.is_active());
    }

    #[tokio::test]
    async fn test_post_reaches_subscribers() {
        let session = DesktopAudioSession::new();
        let mut rx = session.subscribe();
        let notice = AudioSessionNotification::Interruption(InterruptionNotice::Began);

        assert_eq!(session.post(notice), 1);
        assert_eq!(rx.recv().await.unwrap(), notice);
    }
}
