pub const PLACEHOLDER_IMAGE_URL: &str = "https://via.placeholder.com/500x750?text=No+Image";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageSize {
    #[default]
    Thumbnail,
    Full,
}

impl ImageSize {
    pub fn as_path(&self) -> &'static str {
        match self {
            ImageSize::Thumbnail => "w500",
            ImageSize::Full => "original",
        }
    }
}

/// Resolve an image path against the static image host.
pub fn image_url(base: &str, path: Option<&str>, size: ImageSize) -> String {
    match path.map(str::trim).filter(|p| !p.is_empty()) {
        Some(path) => format!(
            "{}/{}{}",
            base.trim_end_matches('/'),
            size.as_path(),
            path
        ),
        None => PLACEHOLDER_IMAGE_URL.to_string(),
    }
}
