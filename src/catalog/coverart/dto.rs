//! Cover Art Archive listing shapes.
//!
//! Only what the artwork step reports is modeled: image URLs, the front
//! flag and thumbnails.
//!
//! API Reference: https://wiki.musicbrainz.org/Cover_Art_Archive/API

use serde::Deserialize;

/// `/release-group/{id}` listing
#[derive(Debug, Clone, Deserialize)]
pub struct CoverArtResponse {
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    #[serde(default)]
    pub front: bool,
    /// Full-size image URL
    pub image: String,
    #[serde(default)]
    pub thumbnails: Thumbnails,
}

/// Thumbnail URLs keyed by pixel size
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Thumbnails {
    #[serde(rename = "250")]
    pub small: Option<String>,
    #[serde(rename = "500")]
    pub large: Option<String>,
}

#[cfg(test)]
mod contract_tests {
    use super::*;

    #[test]
    fn test_listing_ignores_unmodeled_fields() {
        let json = r#"{
            "images": [{
                "front": true,
                "back": false,
                "types": ["Front"],
                "image": "http://coverartarchive.org/release/abc/123.jpg",
                "thumbnails": {
                    "250": "http://coverartarchive.org/release/abc/123-250.jpg",
                    "500": "http://coverartarchive.org/release/abc/123-500.jpg",
                    "small": "http://coverartarchive.org/release/abc/123-250.jpg"
                },
                "approved": true,
                "id": 123
            }],
            "release": "https://musicbrainz.org/release/abc"
        }"#;

        let listing: CoverArtResponse = serde_json::from_str(json).unwrap();

        let image = &listing.images[0];
        assert!(image.front);
        assert!(image.thumbnails.large.as_deref().is_some_and(|t| t.ends_with("-500.jpg")));
    }

    #[test]
    fn test_sparse_image() {
        let json = r#"{"images": [{"image": "http://example.com/back.jpg", "back": true}]}"#;

        let listing: CoverArtResponse = serde_json::from_str(json).unwrap();

        let image = &listing.images[0];
        assert!(!image.front);
        assert!(image.thumbnails.small.is_none());
    }
}
