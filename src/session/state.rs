/// Identifiers accumulated by a session's workflow.
///
/// Only successful operations write here. Ids are set once (or appended),
/// except cover photo ids which a later upload replaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowState {
    pub(crate) media_set_id: Option<String>,
    pub(crate) book_id: Option<String>,
    pub(crate) comment_ids: Vec<String>,
    pub(crate) photo_ids: Vec<String>,
    pub(crate) front_cover_photo_id: Option<String>,
    pub(crate) back_cover_photo_id: Option<String>,
    pub(crate) preview_url: Option<String>,
}

impl WorkflowState {
    /// Media-set (book draft) id from `bmscreate/init`.
    pub fn media_set_id(&self) -> Option<&str> {
        self.media_set_id.as_deref()
    }

    /// Book id from `bookcreate/publish`.
    pub fn book_id(&self) -> Option<&str> {
        self.book_id.as_deref()
    }

    /// Comment ids in the order they were added.
    pub fn comment_ids(&self) -> &[String] {
        &self.comment_ids
    }

    /// Photo ids in the order they were added. Cover photos are not included.
    pub fn photo_ids(&self) -> &[String] {
        &self.photo_ids
    }

    pub fn front_cover_photo_id(&self) -> Option<&str> {
        self.front_cover_photo_id.as_deref()
    }

    pub fn back_cover_photo_id(&self) -> Option<&str> {
        self.back_cover_photo_id.as_deref()
    }

    /// Last preview URL returned by `book/preview`.
    pub fn preview_url(&self) -> Option<&str> {
        self.preview_url.as_deref()
    }
}
