//! In-memory now-playing info center.

use bridge_traits::now_playing::{NowPlayingInfo, NowPlayingInfoCenter};
use parking_lot::Mutex;

#[derive(Debug, Default)]
pub struct InMemoryNowPlayingCenter {
    info: Mutex<Option<NowPlayingInfo>>,
    writes: Mutex<usize>,
}

impl InMemoryNowPlayingCenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the info was replaced (including clears).
    pub fn write_count(&self) -> usize {
        *self.writes.lock()
    }
}

impl NowPlayingInfoCenter for InMemoryNowPlayingCenter {
    fn now_playing_info(&self) -> Option<NowPlayingInfo> {
        self.info.lock().clone()
    }

    fn set_now_playing_info(&self, info: Option<NowPlayingInfo>) {
        *self.info.lock() = info;
        *self.writes.lock() += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stores_and_clears_info() {
        let center = InMemoryNowPlayingCenter::new();
        assert!(center.now_playing_info().is_none());

        center.set_now_playing_info(Some(NowPlayingInfo {
            title: Some("Elephants Dream".into()),
            ..Default::default()
        }));
        assert_eq!(
            center.now_playing_info().and_then(|i| i.title),
            Some("Elephants Dream".to_string())
        );

        center.set_now_playing_info(None);
        assert!(center.now_playing_info().is_none());
        assert_eq!(center.write_count(), 2);
    }
}
