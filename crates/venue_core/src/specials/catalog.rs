//! Specials catalog maintenance.
//!
//! # Responsibility
//! - Extract candidate flyer image URLs from a saved social page.
//! - Store downloaded flyers under their local `special{n}.jpg` names.
//! - Produce and write the site's `specials.json` catalog.
//!
//! # Invariants
//! - Extraction is deterministic: first occurrences win, order preserved.
//! - Icon-sized variants (`p50x50`, `s50x50`) are never selected.
//! - The catalog is only written when a full set of images was found and
//!   every flyer was saved locally.

use crate::model::special::SpecialOffer;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Number of flyers shown in the specials grid.
pub const CATALOG_SIZE: usize = 3;

static SCONTENT_IMAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https:(?:\\/|/){2}scontent[^\s"']+\.jpg[^\s"']*"#)
        .expect("valid scontent image regex")
});

const ICON_SIZE_MARKERS: [&str; 2] = ["p50x50", "s50x50"];
const IMAGES_DIR_NAME: &str = "images";

/// Catalog extraction/write failure.
#[derive(Debug)]
pub enum CatalogError {
    NotEnoughImages { found: usize, required: usize },
    Download { url: String, reason: String },
    Io(std::io::Error),
    Encode(serde_json::Error),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotEnoughImages { found, required } => write!(
                f,
                "found {found} flyer image(s), need {required} to update the catalog"
            ),
            Self::Download { url, reason } => {
                write!(f, "flyer download failed for {url}: {reason}")
            }
            Self::Io(err) => write!(f, "catalog io failed: {err}"),
            Self::Encode(err) => write!(f, "catalog encoding failed: {err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotEnoughImages { .. } | Self::Download { .. } => None,
            Self::Io(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Finds up to `CATALOG_SIZE` flyer image URLs in raw page HTML.
pub fn extract_image_urls(html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for found in SCONTENT_IMAGE_RE.find_iter(html) {
        let url = found.as_str().replace("\\/", "/").replace("&amp;", "&");
        if ICON_SIZE_MARKERS.iter().any(|marker| url.contains(marker)) {
            continue;
        }
        if seen.insert(url.clone()) {
            urls.push(url);
        }
        if urls.len() == CATALOG_SIZE {
            break;
        }
    }
    urls
}

/// Catalog pointing at the locally stored flyer images.
pub fn default_catalog() -> Vec<SpecialOffer> {
    vec![
        SpecialOffer::new("/images/special1.jpg", "Weekly Special", "Limited Offer"),
        SpecialOffer::new("/images/special2.jpg", "Fresh Cut", "Butcher's Choice"),
        SpecialOffer::new("/images/special3.jpg", "Deal of the Week", "Don't Miss Out"),
    ]
}

/// Local file names flyer downloads are stored under, in catalog order.
pub fn local_image_names() -> Vec<String> {
    (1..=CATALOG_SIZE)
        .map(|index| format!("special{index}.jpg"))
        .collect()
}

/// Checks that extraction produced a full catalog's worth of images.
pub fn require_full_set(urls: &[String]) -> Result<(), CatalogError> {
    if urls.len() < CATALOG_SIZE {
        return Err(CatalogError::NotEnoughImages {
            found: urls.len(),
            required: CATALOG_SIZE,
        });
    }
    Ok(())
}

/// Directory flyers are stored in for a catalog written to `catalog_path`.
///
/// The catalog lives in `<root>/data/`, images in `<root>/images/`.
pub fn images_dir_for(catalog_path: &Path) -> PathBuf {
    catalog_path
        .parent()
        .and_then(Path::parent)
        .map_or_else(|| PathBuf::from(IMAGES_DIR_NAME), |root| root.join(IMAGES_DIR_NAME))
}

/// Downloads every flyer in `urls` and then writes the default catalog.
///
/// `fetch` returns the image bytes for one URL. The first failed download
/// aborts the refresh and leaves `catalog_path` untouched. Returns the saved
/// image paths in catalog order.
pub fn refresh_catalog<F>(
    urls: &[String],
    catalog_path: &Path,
    mut fetch: F,
) -> Result<Vec<PathBuf>, CatalogError>
where
    F: FnMut(&str) -> Result<Vec<u8>, CatalogError>,
{
    require_full_set(urls)?;
    let images_dir = images_dir_for(catalog_path);
    std::fs::create_dir_all(&images_dir)?;

    let mut saved = Vec::with_capacity(CATALOG_SIZE);
    for (url, name) in urls.iter().take(CATALOG_SIZE).zip(local_image_names()) {
        let bytes = fetch(url).inspect_err(|err| {
            warn!("event=catalog_download module=specials status=error file={name} error={err}");
        })?;
        let target = images_dir.join(&name);
        std::fs::write(&target, bytes)?;
        info!("event=catalog_download module=specials status=ok file={name}");
        saved.push(target);
    }

    write_catalog(catalog_path, &default_catalog())?;
    Ok(saved)
}

/// Serializes records as 4-space indented JSON.
pub fn encode_catalog(records: &[SpecialOffer]) -> Result<String, CatalogError> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    records.serialize(&mut serializer)?;
    String::from_utf8(out).map_err(|err| {
        CatalogError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err))
    })
}

/// Writes `records` to `path`, creating parent directories.
pub fn write_catalog(path: impl AsRef<Path>, records: &[SpecialOffer]) -> Result<(), CatalogError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, encode_catalog(records)?)?;
    info!(
        "event=catalog_write module=specials status=ok records={}",
        records.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        default_catalog, encode_catalog, extract_image_urls, images_dir_for, require_full_set,
        CatalogError,
    };
    use std::path::{Path, PathBuf};
    use crate::specials::parse_specials;

    #[test]
    fn extracts_unescaped_unique_urls_in_order() {
        let html = r#"
            <img src="https://scontent.xx.fbcdn.net/v/a.jpg?x=1&amp;y=2">
            "uri":"https:\/\/scontent.xx.fbcdn.net\/v\/b.jpg?stp=dst"
            <img src="https://scontent.xx.fbcdn.net/v/a.jpg?x=1&amp;y=2">
        "#;
        let urls = extract_image_urls(html);
        assert_eq!(
            urls,
            vec![
                "https://scontent.xx.fbcdn.net/v/a.jpg?x=1&y=2".to_string(),
                "https://scontent.xx.fbcdn.net/v/b.jpg?stp=dst".to_string(),
            ]
        );
    }

    #[test]
    fn skips_icon_sized_variants_and_caps_at_three() {
        let html = [
            "https://scontent.x/p50x50/icon.jpg",
            "https://scontent.x/1.jpg",
            "https://scontent.x/s50x50/icon.jpg",
            "https://scontent.x/2.jpg",
            "https://scontent.x/3.jpg",
            "https://scontent.x/4.jpg",
        ]
        .join(" ");
        let urls = extract_image_urls(&html);
        assert_eq!(urls.len(), 3);
        assert!(urls.iter().all(|url| !url.contains("50x50")));
        assert!(urls[0].ends_with("1.jpg"));
    }

    #[test]
    fn require_full_set_rejects_short_extraction() {
        let err = require_full_set(&["https://scontent.x/1.jpg".to_string()])
            .expect_err("one image is not enough");
        assert!(matches!(
            err,
            CatalogError::NotEnoughImages {
                found: 1,
                required: 3
            }
        ));
    }

    #[test]
    fn encoded_default_catalog_round_trips_through_loader() {
        let encoded = encode_catalog(&default_catalog()).expect("encode catalog");
        assert!(encoded.contains("\n    {"));
        let decoded = parse_specials(&encoded).expect("loader accepts catalog");
        assert_eq!(decoded, default_catalog());
    }

    #[test]
    fn images_dir_sits_beside_data_dir() {
        assert_eq!(
            images_dir_for(Path::new("public/data/specials.json")),
            PathBuf::from("public/images")
        );
        assert_eq!(
            images_dir_for(Path::new("specials.json")),
            PathBuf::from("images")
        );
    }
}
