//! Book manifests: the whole workflow described in one JSON file.
//!
//! ```json
//! {
//!   "title": "Summer 2010",
//!   "owner_name": "Joe",
//!   "chapters": [{ "title": "Arrival", "text": "We got there late." }],
//!   "comments": [{ "title": "Nice", "text": "What a view", "chapter_number": 1 }],
//!   "photos": [
//!     { "url": "http://examp.le/beach.jpg", "caption": "Beach" },
//!     { "path": "photos/dinner.jpg" }
//!   ],
//!   "front_cover": { "path": "photos/cover.jpg" },
//!   "dedication": "For Ann"
//! }
//! ```
//!
//! Relative photo paths are resolved against the manifest's directory. A
//! missing MIME type is guessed from the file extension.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ContractError, Result, TransportError};
use crate::session::{
    Chapter, Chapters, CommentOptions, Cover, DedicationOptions, PhotoDetails, PhotoUploadOptions,
    PhotoUrlOptions, Session, DEFAULT_THEME,
};
use crate::transport::Transport;

const MANIFEST_OPERATION: &str = "manifest";

/// A complete book to create.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookManifest {
    pub title: String,
    pub owner_name: String,
    pub chapters: Vec<ChapterEntry>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub comments: Vec<CommentEntry>,
    #[serde(default)]
    pub photos: Vec<PhotoEntry>,
    #[serde(default)]
    pub front_cover: Option<FileEntry>,
    #[serde(default)]
    pub back_cover: Option<FileEntry>,
    #[serde(default)]
    pub dedication: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChapterEntry {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommentEntry {
    pub title: String,
    pub text: String,
    pub chapter_number: u32,
    #[serde(default)]
    pub time: Option<String>,
}

/// Local file plus optional MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub mime: Option<String>,
}

/// A photo, either fetched by the service or uploaded from disk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PhotoEntry {
    Url {
        url: String,
        #[serde(default)]
        caption: Option<String>,
        #[serde(default)]
        time: Option<String>,
    },
    File {
        path: PathBuf,
        #[serde(default)]
        mime: Option<String>,
        #[serde(default)]
        caption: Option<String>,
        #[serde(default)]
        time: Option<String>,
    },
}

/// Ids produced by running a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishedBook {
    pub media_set_id: String,
    pub book_id: String,
    pub preview_url: String,
    pub comment_ids: Vec<String>,
    pub photo_ids: Vec<String>,
    pub front_cover_photo_id: Option<String>,
    pub back_cover_photo_id: Option<String>,
}

impl BookManifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Read and parse a manifest file.
    pub async fn load(path: &Path) -> Result<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| TransportError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::from_json(&json).map_err(|e| {
            ContractError::InvalidManifest {
                path: path.display().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// One chapter is sent in the unnumbered form, several in the numbered one.
    pub fn chapters(&self) -> Chapters {
        let mut chapters: Vec<Chapter> = self
            .chapters
            .iter()
            .map(|c| Chapter::new(c.title.as_str(), c.text.as_str()))
            .collect();

        if chapters.len() == 1 {
            Chapters::Single(chapters.remove(0))
        } else {
            Chapters::Many(chapters)
        }
    }

    /// Run the whole workflow, from draft creation to preview URL.
    ///
    /// Stops at the first failure; the session keeps whatever ids were
    /// assigned up to that point.
    pub async fn publish<T: Transport>(
        &self,
        session: &mut Session<T>,
        base_dir: &Path,
    ) -> Result<PublishedBook> {
        if self.chapters.is_empty() {
            return Err(ContractError::MissingField {
                operation: MANIFEST_OPERATION,
                field: "chapters",
            }
            .into());
        }

        let theme = self.theme.as_deref().unwrap_or(DEFAULT_THEME);
        let media_set_id = session
            .create_media_set_with_theme(&self.title, self.chapters(), theme)
            .await?;
        session.publish_media_set(&media_set_id).await?;

        for comment in &self.comments {
            let mut options = CommentOptions::new(
                comment.title.as_str(),
                comment.text.as_str(),
                comment.chapter_number,
                self.owner_name.as_str(),
            )
            .media_set_id(media_set_id.as_str());
            options.time = comment.time.clone();
            session.add_comment(&options).await?;
        }

        for photo in &self.photos {
            match photo {
                PhotoEntry::Url { url, caption, time } => {
                    let details = PhotoDetails {
                        caption: caption.clone(),
                        time: time.clone(),
                        ..Default::default()
                    };
                    let options = PhotoUrlOptions::new(url.as_str(), self.owner_name.as_str())
                        .media_set_id(media_set_id.as_str())
                        .details(details);
                    session.add_photo_by_url(&options).await?;
                }
                PhotoEntry::File {
                    path,
                    mime,
                    caption,
                    time,
                } => {
                    let details = PhotoDetails {
                        caption: caption.clone(),
                        time: time.clone(),
                        ..Default::default()
                    };
                    let options = self
                        .upload_options(base_dir, path, mime.as_deref(), &media_set_id)
                        .details(details);
                    session.add_photo_by_handle(&options).await?;
                }
            }
        }

        for (cover, entry) in [
            (Cover::Front, &self.front_cover),
            (Cover::Back, &self.back_cover),
        ] {
            if let Some(entry) = entry {
                let options = self.upload_options(
                    base_dir,
                    &entry.path,
                    entry.mime.as_deref(),
                    &media_set_id,
                );
                session.set_cover_photo(cover, &options).await?;
            }
        }

        session.publish_media_set_contents(&media_set_id).await?;
        session.book_create_init(&media_set_id).await?;

        if let Some(dedication) = &self.dedication {
            let options =
                DedicationOptions::new(dedication.as_str()).media_set_id(media_set_id.as_str());
            session.book_set_dedication(&options).await?;
        }

        let book_id = session.book_create_publish(&media_set_id).await?;
        let preview_url = session.book_preview(&media_set_id, &book_id).await?;

        info!(
            media_set_id = %media_set_id,
            book_id = %book_id,
            "Book created from manifest"
        );

        let state = session.state();
        Ok(PublishedBook {
            media_set_id,
            book_id,
            preview_url,
            comment_ids: state.comment_ids().to_vec(),
            photo_ids: state.photo_ids().to_vec(),
            front_cover_photo_id: state.front_cover_photo_id().map(str::to_string),
            back_cover_photo_id: state.back_cover_photo_id().map(str::to_string),
        })
    }

    fn upload_options(
        &self,
        base_dir: &Path,
        path: &Path,
        mime: Option<&str>,
        media_set_id: &str,
    ) -> PhotoUploadOptions {
        let path = base_dir.join(path);
        let mime = mime
            .map(str::to_string)
            .unwrap_or_else(|| guess_mime(&path));
        PhotoUploadOptions::new(path, mime, self.owner_name.as_str()).media_set_id(media_set_id)
    }
}

/// MIME type from the file extension, `application/octet-stream` when unknown.
pub fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
