use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GalleryMetadata {
    pub last_image: String,
    pub last_updated: String,
    pub uploaded_by: String,
    pub total_images: usize,
}
