//! Per-operation option sets.
//!
//! Each struct lists an operation's required fields as plain values and its
//! optional fields as `Option`s. Required text fields must be non-empty.
//! The media-set id may be left out, in which case the session's current id
//! is used; if the session has none either, the call fails before any
//! network I/O.

use std::path::PathBuf;
use std::str::FromStr;

use crate::endpoints::Endpoint;
use crate::error::ContractError;
use crate::transport::Params;

/// Fail unless `value` has non-whitespace content.
pub(crate) fn require(
    operation: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ContractError> {
    if value.trim().is_empty() {
        Err(ContractError::MissingField { operation, field })
    } else {
        Ok(())
    }
}

/// Pick the explicit media-set id, falling back to the session's.
pub(crate) fn resolve_media_set_id(
    operation: &'static str,
    explicit: Option<&str>,
    current: Option<&str>,
) -> Result<String, ContractError> {
    let id = explicit.or(current).unwrap_or_default();
    require(operation, "bmsId", id)?;
    Ok(id.to_string())
}

// =============================================================================
// Chapters
// =============================================================================

/// One chapter of a book draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    pub text: String,
}

impl Chapter {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}

/// Chapters of a new media set.
///
/// The two forms are encoded differently on the wire: a single chapter is
/// sent as `chapterTitle`/`chapterText`, a sequence as `chapterTitle1`,
/// `chapterText1`, `chapterTitle2`, ... A sequence of one still gets the
/// `1` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chapters {
    Single(Chapter),
    Many(Vec<Chapter>),
}

impl Chapters {
    pub fn is_empty(&self) -> bool {
        match self {
            Chapters::Single(_) => false,
            Chapters::Many(chapters) => chapters.is_empty(),
        }
    }

    pub(crate) fn append_to(&self, params: &mut Params) {
        match self {
            Chapters::Single(chapter) => {
                params.insert("chapterTitle", chapter.title.as_str());
                params.insert("chapterText", chapter.text.as_str());
            }
            Chapters::Many(chapters) => {
                for (i, chapter) in chapters.iter().enumerate() {
                    let n = i + 1;
                    params.insert(format!("chapterTitle{}", n), chapter.title.as_str());
                    params.insert(format!("chapterText{}", n), chapter.text.as_str());
                }
            }
        }
    }
}

impl From<Chapter> for Chapters {
    fn from(chapter: Chapter) -> Self {
        Chapters::Single(chapter)
    }
}

impl From<Vec<Chapter>> for Chapters {
    fn from(chapters: Vec<Chapter>) -> Self {
        Chapters::Many(chapters)
    }
}

// =============================================================================
// Comments
// =============================================================================

/// Options of `bms/addComment`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentOptions {
    pub media_set_id: Option<String>,
    pub title: String,
    pub text: String,
    pub chapter_number: u32,
    pub owner_name: String,
    pub time: Option<String>,
    pub comment_id: Option<String>,
}

impl CommentOptions {
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        chapter_number: u32,
        owner_name: impl Into<String>,
    ) -> Self {
        Self {
            media_set_id: None,
            title: title.into(),
            text: text.into(),
            chapter_number,
            owner_name: owner_name.into(),
            time: None,
            comment_id: None,
        }
    }

    pub fn media_set_id(mut self, id: impl Into<String>) -> Self {
        self.media_set_id = Some(id.into());
        self
    }

    pub fn time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn comment_id(mut self, id: impl Into<String>) -> Self {
        self.comment_id = Some(id.into());
        self
    }

    pub(crate) fn to_params(&self, current: Option<&str>) -> Result<Params, ContractError> {
        let operation = Endpoint::AddComment.operation();
        let media_set_id = resolve_media_set_id(operation, self.media_set_id.as_deref(), current)?;
        require(operation, "commentTitle", &self.title)?;
        require(operation, "commentText", &self.text)?;
        require(operation, "ownerName", &self.owner_name)?;

        let mut params = Params::new()
            .with("bmsId", media_set_id)
            .with("commentTitle", self.title.as_str())
            .with("commentText", self.text.as_str())
            .with("chapterNumber", self.chapter_number.to_string())
            .with("ownerName", self.owner_name.as_str());
        params.insert_opt("time", self.time.as_deref());
        params.insert_opt("commentId", self.comment_id.as_deref());
        Ok(params)
    }
}

// =============================================================================
// Photos
// =============================================================================

/// Optional fields shared by both ways of adding a photo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoDetails {
    pub time: Option<String>,
    pub caption: Option<String>,
    pub photo_id: Option<String>,
    pub photo_ordinal: Option<u32>,
}

impl PhotoDetails {
    fn append_to(&self, params: &mut Params) {
        params.insert_opt("time", self.time.as_deref());
        params.insert_opt("caption", self.caption.as_deref());
        params.insert_opt("photoId", self.photo_id.as_deref());
        params.insert_opt("photoOrdinal", self.photo_ordinal.map(|n| n.to_string()));
    }
}

/// Options of `bms/addPhoto` with a photo the service downloads itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUrlOptions {
    pub media_set_id: Option<String>,
    pub file_url: String,
    pub owner_name: String,
    pub details: PhotoDetails,
}

impl PhotoUrlOptions {
    pub fn new(file_url: impl Into<String>, owner_name: impl Into<String>) -> Self {
        Self {
            media_set_id: None,
            file_url: file_url.into(),
            owner_name: owner_name.into(),
            details: PhotoDetails::default(),
        }
    }

    pub fn media_set_id(mut self, id: impl Into<String>) -> Self {
        self.media_set_id = Some(id.into());
        self
    }

    pub fn details(mut self, details: PhotoDetails) -> Self {
        self.details = details;
        self
    }

    pub(crate) fn to_params(&self, current: Option<&str>) -> Result<Params, ContractError> {
        let operation = Endpoint::AddPhoto.operation();
        let media_set_id = resolve_media_set_id(operation, self.media_set_id.as_deref(), current)?;
        require(operation, "url", &self.file_url)?;
        require(operation, "ownerName", &self.owner_name)?;

        let mut params = Params::new()
            .with("bmsId", media_set_id)
            .with("url", self.file_url.as_str())
            .with("ownerName", self.owner_name.as_str());
        self.details.append_to(&mut params);
        Ok(params)
    }
}

/// Options of a photo uploaded from a local file.
///
/// Used by `bms/addPhoto` and both cover endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUploadOptions {
    pub media_set_id: Option<String>,
    pub file_path: PathBuf,
    pub file_mime: String,
    pub owner_name: String,
    pub details: PhotoDetails,
}

impl PhotoUploadOptions {
    pub fn new(
        file_path: impl Into<PathBuf>,
        file_mime: impl Into<String>,
        owner_name: impl Into<String>,
    ) -> Self {
        Self {
            media_set_id: None,
            file_path: file_path.into(),
            file_mime: file_mime.into(),
            owner_name: owner_name.into(),
            details: PhotoDetails::default(),
        }
    }

    pub fn media_set_id(mut self, id: impl Into<String>) -> Self {
        self.media_set_id = Some(id.into());
        self
    }

    pub fn details(mut self, details: PhotoDetails) -> Self {
        self.details = details;
        self
    }

    /// Text fields of the upload; the file itself travels as a separate part.
    pub(crate) fn to_params(
        &self,
        operation: &'static str,
        current: Option<&str>,
    ) -> Result<Params, ContractError> {
        let media_set_id = resolve_media_set_id(operation, self.media_set_id.as_deref(), current)?;
        let file_name = self.file_path.to_string_lossy();
        require(operation, "file_name", &file_name)?;
        require(operation, "file_mime", &self.file_mime)?;
        require(operation, "ownerName", &self.owner_name)?;

        let mut params = Params::new()
            .with("bmsId", media_set_id)
            .with("file_name", file_name.to_string())
            .with("file_mime", self.file_mime.as_str())
            .with("ownerName", self.owner_name.as_str());
        self.details.append_to(&mut params);
        Ok(params)
    }
}

// =============================================================================
// Covers
// =============================================================================

/// Which cover a photo is set on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cover {
    Front,
    Back,
}

impl Cover {
    pub(crate) fn endpoint(self) -> Endpoint {
        match self {
            Cover::Front => Endpoint::SetFrontCoverPhoto,
            Cover::Back => Endpoint::SetBackCoverPhoto,
        }
    }
}

impl FromStr for Cover {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "front" => Ok(Cover::Front),
            "back" => Ok(Cover::Back),
            _ => Err(ContractError::InvalidCover(s.to_string())),
        }
    }
}

// =============================================================================
// Dedication
// =============================================================================

/// Options of `bookcreate/setDedication`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedicationOptions {
    pub media_set_id: Option<String>,
    pub dedication_text: String,
}

impl DedicationOptions {
    pub fn new(dedication_text: impl Into<String>) -> Self {
        Self {
            media_set_id: None,
            dedication_text: dedication_text.into(),
        }
    }

    pub fn media_set_id(mut self, id: impl Into<String>) -> Self {
        self.media_set_id = Some(id.into());
        self
    }

    pub(crate) fn to_params(&self, current: Option<&str>) -> Result<Params, ContractError> {
        let operation = Endpoint::BookSetDedication.operation();
        let media_set_id = resolve_media_set_id(operation, self.media_set_id.as_deref(), current)?;
        require(operation, "dedicationText", &self.dedication_text)?;

        Ok(Params::new()
            .with("bmsId", media_set_id)
            .with("dedicationText", self.dedication_text.as_str()))
    }
}
