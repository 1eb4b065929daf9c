//! Gallery listings: a curated in-memory selection and an on-demand
//! directory scan.

use std::path::Path;

use tokio::fs;
use tracing::{debug, warn};

use atelier_shared::constants::GALLERY_EXTENSIONS;
use atelier_shared::protocol::{GalleryImage, GalleryResponse};

/// (file name, title, category)
const CURATED: &[(&str, &str, &str)] = &[
    ("abendlicht.jpg", "Abendlicht", "Malerei"),
    ("stille-wasser.jpg", "Stille Wasser", "Malerei"),
    ("faltung-i.jpg", "Faltung I", "Druckgrafik"),
    ("faltung-ii.jpg", "Faltung II", "Druckgrafik"),
    ("nordwand.jpg", "Nordwand", "Fotografie"),
    ("hafenkran.jpg", "Hafenkran", "Fotografie"),
    ("kreidezeit.jpg", "Kreidezeit", "Zeichnung"),
    ("rost-und-blau.jpg", "Rost und Blau", "Malerei"),
    ("linienstudie.jpg", "Linienstudie", "Zeichnung"),
    ("morgennebel.jpg", "Morgennebel", "Fotografie"),
    ("schichten.jpg", "Schichten", "Mischtechnik"),
    ("gegenlicht.jpg", "Gegenlicht", "Fotografie"),
    ("ockerfeld.jpg", "Ockerfeld", "Malerei"),
    ("schattenriss.jpg", "Schattenriss", "Druckgrafik"),
    ("salzwiesen.jpg", "Salzwiesen", "Fotografie"),
    ("spuren.jpg", "Spuren", "Mischtechnik"),
];

pub fn curated_images(url_prefix: &str) -> Vec<GalleryImage> {
    CURATED
        .iter()
        .enumerate()
        .map(|(i, (file, title, category))| GalleryImage {
            id: i as u32 + 1,
            src: format!("{url_prefix}/{file}"),
            title: title.to_string(),
            category: category.to_string(),
        })
        .collect()
}

/// First `limit` curated images plus the size of the full list.
pub fn featured(url_prefix: &str, limit: usize) -> GalleryResponse {
    let all = curated_images(url_prefix);
    let total = all.len();
    GalleryResponse {
        success: true,
        images: all.into_iter().take(limit).collect(),
        total,
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            GALLERY_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// List image files in `dir` as URL paths under `url_prefix`, sorted by
/// file name. A missing or unreadable directory yields an empty list.
pub async fn scan_dir(dir: &Path, url_prefix: &str) -> Vec<String> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Gallery directory not readable");
            return Vec::new();
        }
    };

    let mut names = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                let path = entry.path();
                let is_file = entry
                    .file_type()
                    .await
                    .map(|t| t.is_file())
                    .unwrap_or(false);
                if !is_file || !has_image_extension(&path) {
                    continue;
                }
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "Failed to read gallery entry");
                break;
            }
        }
    }

    names.sort();
    debug!(path = %dir.display(), count = names.len(), "Scanned gallery directory");

    names
        .into_iter()
        .map(|name| format!("{}/{}", url_prefix.trim_end_matches('/'), name))
        .collect()
}
