//! Audio tag writing and cover art preparation.

use id3::frame::{Picture, PictureType};
use id3::{ErrorKind, Tag, TagLike, Version};
use image::ColorType;
use image::codecs::jpeg::JpegEncoder;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Longest edge of embedded cover art, in pixels.
pub const MAX_COVER_EDGE: u32 = 800;

const COVER_QUALITY: u8 = 90;
const COVER_MIME: &str = "image/jpeg";

/// Errors raised while writing tags.
#[derive(Error, Debug)]
pub enum TagError {
    /// The file to tag does not exist.
    #[error("File to tag not found: '{path}'")]
    MissingFile {
        /// The missing path.
        path: PathBuf,
    },

    /// Existing tags could not be read.
    #[error("Failed to read tags from '{path}': {source}")]
    Read {
        /// The file being tagged.
        path: PathBuf,
        /// The underlying tag error.
        source: id3::Error,
    },

    /// Tags could not be written.
    #[error("Failed to write tags to '{path}': {source}")]
    Write {
        /// The file being tagged.
        path: PathBuf,
        /// The underlying tag error.
        source: id3::Error,
    },
}

/// Errors raised while preparing cover art.
#[derive(Error, Debug)]
pub enum CoverError {
    /// The thumbnail is not a decodable image.
    #[error("Failed to decode thumbnail: {0}")]
    Decode(#[source] image::ImageError),

    /// The resized cover could not be encoded.
    #[error("Failed to encode cover: {0}")]
    Encode(#[source] image::ImageError),
}

/// Metadata written into an audio file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackTags {
    /// Song title.
    pub title: String,
    /// Artist, when the title named one.
    pub artist: Option<String>,
    /// Album label.
    pub album: String,
    /// JPEG front cover.
    pub cover: Option<Vec<u8>>,
}

/// Writes tags into a media file.
pub trait TagWriter: Send + Sync + std::fmt::Debug {
    /// Applies `tags` to the file at `path`, keeping unrelated existing tags.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or its tags cannot be written.
    fn apply_tags(&self, path: &Path, tags: &TrackTags) -> Result<(), TagError>;
}

/// [`TagWriter`] producing ID3v2.4 tags.
#[derive(Debug, Clone, Copy, Default)]
pub struct Id3TagWriter;

impl TagWriter for Id3TagWriter {
    fn apply_tags(&self, path: &Path, tags: &TrackTags) -> Result<(), TagError> {
        if !path.is_file() {
            return Err(TagError::MissingFile {
                path: path.to_path_buf(),
            });
        }

        let mut tag = match Tag::read_from_path(path) {
            Ok(tag) => tag,
            Err(e) if matches!(e.kind, ErrorKind::NoTag) => Tag::new(),
            Err(e) => {
                return Err(TagError::Read {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        tag.set_title(tags.title.as_str());
        if let Some(artist) = &tags.artist {
            tag.set_artist(artist.as_str());
        }
        tag.set_album(tags.album.as_str());

        if let Some(cover) = &tags.cover {
            tag.remove_picture_by_type(PictureType::CoverFront);
            tag.add_frame(Picture {
                mime_type: COVER_MIME.to_string(),
                picture_type: PictureType::CoverFront,
                description: "Cover".to_string(),
                data: cover.clone(),
            });
        }

        tag.write_to_path(path, Version::Id3v24).map_err(|e| TagError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Converts thumbnail bytes into cover art.
///
/// Images whose longer edge exceeds [`MAX_COVER_EDGE`] are scaled down with
/// their aspect ratio kept. The result is an RGB baseline JPEG at quality 90.
///
/// # Errors
///
/// Returns an error if the bytes are not a supported image format.
pub fn prepare_cover(thumbnail: &[u8]) -> Result<Vec<u8>, CoverError> {
    let image = image::load_from_memory(thumbnail).map_err(CoverError::Decode)?;
    let image = if image.width() > MAX_COVER_EDGE || image.height() > MAX_COVER_EDGE {
        image.thumbnail(MAX_COVER_EDGE, MAX_COVER_EDGE)
    } else {
        image
    };

    let rgb = image.to_rgb8();
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, COVER_QUALITY)
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
        .map_err(CoverError::Encode)?;
    Ok(jpeg)
}
