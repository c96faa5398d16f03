//! Media rules for posts
//!
//! Every post must carry an image. These checks run before any request is
//! sent so that malformed posts never reach the remote service.

use std::path::Path;

use crate::model::{Message, PostContent};
use crate::ports::GraphError;

const MEDIA_REQUIRED: &str = "Instagram requires media for all posts. Please provide an image.";

/// Where an image reference points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRef<'a> {
    /// Public `http://` or `https://` URL
    Remote(&'a str),
    /// Existing file on the local filesystem
    LocalFile(&'a Path),
}

pub fn is_remote_url(image: &str) -> bool {
    image.starts_with("http://") || image.starts_with("https://")
}

/// Classify an image reference, returning `None` when it is empty or points
/// at a local path that does not exist
pub fn classify_image(image: &str) -> Option<ImageRef<'_>> {
    if image.is_empty() {
        return None;
    }
    if is_remote_url(image) {
        return Some(ImageRef::Remote(image));
    }
    let path = Path::new(image);
    path.exists().then_some(ImageRef::LocalFile(path))
}

/// Resolve an image reference to the public URL sent as `image_url`
///
/// URLs pass through untouched. Local files need an external upload step
/// which this crate does not provide.
pub fn public_url(image: &str) -> Result<&str, GraphError> {
    match classify_image(image) {
        Some(ImageRef::Remote(url)) => Ok(url),
        Some(ImageRef::LocalFile(path)) => Err(GraphError::UnsupportedLocalFile(
            path.display().to_string(),
        )),
        None => Err(GraphError::InvalidInput(
            "Invalid image path. Must be a public URL or existing local file path.".to_string(),
        )),
    }
}

/// First non-empty caption across a carousel
pub fn carousel_caption(messages: &[Message]) -> Option<&str> {
    messages
        .iter()
        .map(Message::content)
        .find(|content| !content.is_empty())
}

/// Check that every message in a post carries a usable image
pub fn validate_post(content: &PostContent) -> Result<(), GraphError> {
    match content {
        PostContent::Single(message) => {
            if classify_image(message.image()).is_none() {
                return Err(GraphError::MediaRequired(MEDIA_REQUIRED.to_string()));
            }
        }
        PostContent::Carousel(messages) => {
            for (index, message) in messages.iter().enumerate() {
                if classify_image(message.image()).is_none() {
                    return Err(GraphError::MediaRequired(format!(
                        "All messages must have valid images for carousel posts (item {} has none)",
                        index + 1
                    )));
                }
            }
            if messages.is_empty() {
                return Err(GraphError::MediaRequired(
                    "No valid images found for carousel post".to_string(),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_remote_urls() {
        assert_eq!(
            classify_image("https://example.com/a.jpg"),
            Some(ImageRef::Remote("https://example.com/a.jpg"))
        );
        assert_eq!(
            classify_image("http://example.com/a.jpg"),
            Some(ImageRef::Remote("http://example.com/a.jpg"))
        );
        // Prefix check is case sensitive and scheme-exact
        assert_eq!(classify_image("ftp://example.com/a.jpg"), None);
        assert_eq!(classify_image(""), None);
    }

    #[test]
    fn test_classify_local_files() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_string_lossy().to_string();

        assert_eq!(
            classify_image(&path),
            Some(ImageRef::LocalFile(file.path()))
        );
        assert_eq!(classify_image("/no/such/image.png"), None);
    }

    #[test]
    fn test_public_url_rejects_local_files() {
        assert_eq!(
            public_url("https://cdn.example.com/x.png").unwrap(),
            "https://cdn.example.com/x.png"
        );

        let file = tempfile::NamedTempFile::new().unwrap();
        let err = public_url(&file.path().to_string_lossy()).unwrap_err();
        assert!(matches!(err, GraphError::UnsupportedLocalFile(_)));

        let err = public_url("missing.jpg").unwrap_err();
        assert!(matches!(err, GraphError::InvalidInput(_)));
    }

    #[test]
    fn test_carousel_caption_takes_first_non_empty() {
        let messages = vec![
            Message::new().with_image("https://a"),
            Message::new().with_content("B").with_image("https://b"),
            Message::new().with_content("C").with_image("https://c"),
        ];
        assert_eq!(carousel_caption(&messages), Some("B"));

        let blank = vec![Message::new(), Message::new()];
        assert_eq!(carousel_caption(&blank), None);
    }

    #[test]
    fn test_validate_post() {
        let single = PostContent::Single(Message::new().with_image("https://a"));
        assert!(validate_post(&single).is_ok());

        let no_image = PostContent::Single(Message::new().with_content("text only"));
        assert!(matches!(
            validate_post(&no_image),
            Err(GraphError::MediaRequired(_))
        ));

        let empty = PostContent::Carousel(vec![]);
        assert!(matches!(
            validate_post(&empty),
            Err(GraphError::MediaRequired(_))
        ));

        let one_bad = PostContent::Carousel(vec![
            Message::new().with_image("https://a"),
            Message::new().with_image("/no/such/file.jpg"),
        ]);
        let err = validate_post(&one_bad).unwrap_err();
        assert!(err.to_string().contains("item 2"));
    }
}
