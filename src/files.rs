use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tga", "tiff", "tif", "webp", "ico", "pnm", "pbm",
    "pgm", "ppm", "pam", "dds", "hdr", "exr", "ff", "qoi",
];

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// Resolve the command-line paths into an ordered list of image files.
///
/// Files are kept in argument order. Each directory contributes its own
/// images sorted by name, followed by its subdirectories (sorted) when
/// `recursive` is set.
pub fn collect_images(paths: &[PathBuf], recursive: bool, follow_links: bool) -> Vec<PathBuf> {
    let start_time = Instant::now();
    let mut found = Vec::new();

    for path in paths {
        if !follow_links && is_symlink(path) {
            log::debug!("Skipping symlink {:?}", path);
            continue;
        }
        if path.is_dir() {
            scan_dir(path, recursive, follow_links, &mut found);
        } else if path.is_file() && is_image_file(path) {
            found.push(path.clone());
        } else {
            log::warn!("Ignoring {:?}: not an image file or directory", path);
        }
    }

    log::info!(
        "Scan complete in {:.2}s. Found {} images.",
        start_time.elapsed().as_secs_f64(),
        found.len()
    );
    found
}

fn scan_dir(dir: &Path, recursive: bool, follow_links: bool, dest: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Cannot read {:?}: {}", dir, e);
            return;
        }
    };
    let mut files = Vec::new();
    let mut subdirs = Vec::new();

    for entry in entries.filter_map(|e| e.ok()) {
        let Ok(ft) = entry.file_type() else { continue };
        if ft.is_symlink() && !follow_links {
            continue;
        }

        let p = entry.path();
        if p.is_file() && is_image_file(&p) {
            files.push(p);
        } else if recursive && p.is_dir() {
            subdirs.push(p);
        }
    }

    files.sort();
    if !files.is_empty() {
        log::debug!("Scanning {:?}... ({} images)", dir, files.len());
    }
    dest.extend(files);

    if recursive {
        subdirs.sort();
        for sub in subdirs {
            scan_dir(&sub, true, follow_links, dest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn touch(path: &Path) {
        File::create(path).unwrap();
    }

    #[test]
    fn recognizes_extensions_case_insensitively() {
        assert!(is_image_file(Path::new("a/b/photo.JPG")));
        assert!(is_image_file(Path::new("x.webp")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("no_extension")));
    }

    #[test]
    fn directory_scan_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("c.png"));
        touch(&dir.path().join("a.jpg"));
        touch(&dir.path().join("b.txt"));
        fs::create_dir(dir.path().join("sub")).unwrap();
        touch(&dir.path().join("sub").join("z.gif"));

        let flat = collect_images(&[dir.path().to_path_buf()], false, false);
        let names: Vec<_> = flat
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.jpg", "c.png"]);

        let deep = collect_images(&[dir.path().to_path_buf()], true, false);
        assert_eq!(deep.len(), 3);
        assert!(deep[2].ends_with("sub/z.gif"));
    }

    #[test]
    fn explicit_files_keep_argument_order() {
        let dir = tempfile::tempdir().unwrap();
        let b = dir.path().join("b.png");
        let a = dir.path().join("a.png");
        touch(&a);
        touch(&b);
        let missing = dir.path().join("missing.png");

        let found = collect_images(&[b.clone(), missing, a.clone()], false, false);
        assert_eq!(found, vec![b, a]);
    }
}
