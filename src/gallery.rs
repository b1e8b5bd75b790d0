//! Gallery items and the enumerator that builds them once at startup.

use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::files::collect_images;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    pub index: usize,
    pub image_url: String,
    pub caption: String,
}

/// One source before indexing. `caption` is `None` when the source gave none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub image_url: String,
    pub caption: Option<String>,
}

/// Parse a manifest of `SOURCE<TAB>CAPTION` lines.
///
/// Blank lines and lines starting with `#` are skipped. Relative sources are
/// resolved against `base`.
pub fn parse_manifest(text: &str, base: &Path, origin: &Path) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for (n, raw) in text.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        let (source, caption) = match line.split_once('\t') {
            Some((s, c)) => (s.trim(), Some(c.trim())),
            None => (line.trim(), None),
        };
        if source.is_empty() {
            return Err(Error::MissingSource {
                path: origin.to_path_buf(),
                line: n + 1,
            });
        }
        entries.push(Entry {
            image_url: resolve_source(source, base),
            caption: caption.filter(|c| !c.is_empty()).map(str::to_owned),
        });
    }
    Ok(entries)
}

fn resolve_source(source: &str, base: &Path) -> String {
    let path = Path::new(source.strip_prefix("file://").unwrap_or(source));
    if path.is_absolute() {
        source.to_owned()
    } else {
        base.join(path).to_string_lossy().into_owned()
    }
}

pub fn read_manifest(path: &Path) -> Result<Vec<Entry>> {
    let text = fs::read_to_string(path).map_err(|source| Error::Manifest {
        path: path.to_path_buf(),
        source,
    })?;
    let base = path.parent().unwrap_or(Path::new(""));
    let entries = parse_manifest(&text, base, path)?;
    log::info!("Manifest {:?}: {} entries", path, entries.len());
    Ok(entries)
}

/// Filesystem path behind an image url, if it has one.
pub fn source_path(image_url: &str) -> &Path {
    Path::new(image_url.strip_prefix("file://").unwrap_or(image_url))
}

/// EXIF `ImageDescription`, if the file carries a non-blank one.
fn exif_description(path: &Path) -> Option<String> {
    let file = fs::File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = match exif::Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(e) => {
            log::debug!("No EXIF in {:?}: {}", path, e);
            return None;
        }
    };
    let field = exif.get_field(exif::Tag::ImageDescription, exif::In::PRIMARY)?;
    match &field.value {
        exif::Value::Ascii(parts) => {
            let text = parts
                .iter()
                .map(|p| String::from_utf8_lossy(p).trim().to_owned())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            (!text.is_empty()).then_some(text)
        }
        _ => None,
    }
}

fn file_stem_caption(image_url: &str) -> String {
    source_path(image_url)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| image_url.to_owned())
}

/// Caption for an entry that brought none of its own.
pub fn fallback_caption(image_url: &str) -> String {
    exif_description(source_path(image_url)).unwrap_or_else(|| file_stem_caption(image_url))
}

/// Assign contiguous indices and fill in missing captions.
pub fn index_entries(entries: Vec<Entry>) -> Vec<GalleryItem> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let caption = entry
                .caption
                .unwrap_or_else(|| fallback_caption(&entry.image_url));
            GalleryItem {
                index,
                image_url: entry.image_url,
                caption,
            }
        })
        .collect()
}

/// Which sources make up the gallery.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub manifest: Option<PathBuf>,
    pub paths: Vec<PathBuf>,
    pub recursive: bool,
    pub follow_links: bool,
}

/// Enumerate the gallery: manifest entries first, then scanned paths.
pub fn enumerate(sources: &Sources) -> Result<Arc<[GalleryItem]>> {
    let mut entries = match &sources.manifest {
        Some(path) => read_manifest(path)?,
        None => Vec::new(),
    };
    entries.extend(
        collect_images(&sources.paths, sources.recursive, sources.follow_links)
            .into_iter()
            .map(|p| Entry {
                image_url: p.to_string_lossy().into_owned(),
                caption: None,
            }),
    );
    if entries.is_empty() {
        return Err(Error::EmptyGallery);
    }
    Ok(index_entries(entries).into())
}
