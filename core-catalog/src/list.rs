//! List-screen model.

use crate::models::Video;

/// Text shown for one list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRow {
    pub title: String,
    pub detail: String,
}

impl From<&Video> for VideoRow {
    fn from(video: &Video) -> Self {
        Self {
            title: video.title.clone(),
            detail: format!("{} \n\n {}", video.description, video.subtitle),
        }
    }
}

/// Videos backing the list screen, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoList {
    videos: Vec<Video>,
}

impl VideoList {
    pub fn new(videos: Vec<Video>) -> Self {
        Self { videos }
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    /// Bounds-checked access; out of range yields `None`.
    pub fn get(&self, index: usize) -> Option<&Video> {
        self.videos.get(index)
    }

    pub fn row(&self, index: usize) -> Option<VideoRow> {
        self.get(index).map(VideoRow::from)
    }

    pub fn rows(&self) -> impl Iterator<Item = VideoRow> + '_ {
        self.videos.iter().map(VideoRow::from)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Video> {
        self.videos.iter()
    }
}

impl From<Vec<Video>> for VideoList {
    fn from(videos: Vec<Video>) -> Self {
        Self::new(videos)
    }
}
