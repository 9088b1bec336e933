//! Public URL construction shared by catalog adapters.

use catalog_products::Product;

use super::r#trait::ImageSize;

/// Suffix the platform appends to generated thumbnail files.
const THUMBNAIL_SUFFIX: &str = "-150x150";

/// Base URLs of the storefront and its media library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrls {
    site_url: String,
    media_url: String,
}

impl SiteUrls {
    pub fn new(site_url: impl Into<String>, media_url: impl Into<String>) -> Self {
        Self {
            site_url: trim_slash(site_url.into()),
            media_url: trim_slash(media_url.into()),
        }
    }

    /// Media library under the default uploads directory of `site_url`.
    pub fn with_default_media(site_url: impl Into<String>) -> Self {
        let site_url = trim_slash(site_url.into());
        let media_url = format!("{site_url}/wp-content/uploads");
        Self { site_url, media_url }
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub fn media_url(&self) -> &str {
        &self.media_url
    }

    /// Pretty permalink when the product has a slug, query-string form otherwise.
    pub fn permalink(&self, product: &Product) -> String {
        if product.slug.is_empty() {
            format!("{}/?p={}", self.site_url, product.id)
        } else {
            format!("{}/product/{}/", self.site_url, product.slug)
        }
    }

    /// URL of an uploaded file (relative to the uploads directory) at `size`.
    pub fn attachment_url(&self, file: &str, size: ImageSize) -> String {
        let file = file.trim_start_matches('/');
        match size {
            ImageSize::Full => format!("{}/{}", self.media_url, file),
            ImageSize::Thumbnail => format!("{}/{}", self.media_url, thumbnail_file(file)),
        }
    }
}

fn trim_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

fn thumbnail_file(file: &str) -> String {
    let name_start = file.rfind('/').map(|i| i + 1).unwrap_or(0);
    match file[name_start..].rfind('.') {
        Some(dot) if dot > 0 => {
            let dot = name_start + dot;
            format!("{}{}{}", &file[..dot], THUMBNAIL_SUFFIX, &file[dot..])
        }
        _ => format!("{file}{THUMBNAIL_SUFFIX}"),
    }
}
