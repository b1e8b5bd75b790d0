use image::GenericImageView;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use winit::event_loop::EventLoopProxy;

use crate::gallery::{source_path, GalleryItem};

// ---------------------------------------------------------------------------
// Decoded image data
// ---------------------------------------------------------------------------

pub struct DecodedImage {
    pub rgba_bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

fn decode_image(path: &Path, target_size: Option<(u32, u32)>) -> Result<DecodedImage, String> {
    let img = image::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let img = match target_size {
        Some((w, h)) => img.thumbnail(w, h),
        None => img,
    };
    let (width, height) = img.dimensions();
    Ok(DecodedImage {
        rgba_bytes: img.to_rgba8().into_raw(),
        width,
        height,
    })
}

// ---------------------------------------------------------------------------
// Load state (shared between UI and worker threads via Mutex + Condvar)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Work {
    /// The lightbox's current image source.
    Full(String),
    Thumbnail(usize),
}

pub struct LoadState {
    /// Source the lightbox is showing, if any.
    pub wanted: Option<String>,
    full: Option<(String, Arc<DecodedImage>)>,
    pub errors: HashMap<String, String>,
    pub thumbnails: HashMap<usize, Arc<DecodedImage>>,
    pub thumbnail_errors: HashSet<usize>,
    pub in_progress: HashSet<Work>,
    /// First item visible in the grid; thumbnails are decoded from here on.
    pub first_visible: usize,
    item_count: usize,
    pub thumb_size: u32,
}

pub type SharedState = Arc<(Mutex<LoadState>, Condvar)>;

pub fn lock(shared: &SharedState) -> MutexGuard<'_, LoadState> {
    shared.0.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LoadState {
    pub fn new(item_count: usize, thumb_size: u32) -> Self {
        Self {
            wanted: None,
            full: None,
            errors: HashMap::new(),
            thumbnails: HashMap::new(),
            thumbnail_errors: HashSet::new(),
            in_progress: HashSet::new(),
            first_visible: 0,
            item_count,
            thumb_size,
        }
    }

    /// Point the full-size slot at `src`. An empty source releases it.
    /// Returns true if the wanted source changed.
    pub fn request(&mut self, src: &str) -> bool {
        let wanted = (!src.is_empty()).then(|| src.to_owned());
        if wanted == self.wanted {
            return false;
        }
        self.full = None;
        self.wanted = wanted;
        true
    }

    /// The decoded image for the wanted source, once it is ready.
    pub fn current(&self) -> Option<Arc<DecodedImage>> {
        let wanted = self.wanted.as_ref()?;
        match &self.full {
            Some((src, img)) if src == wanted => Some(Arc::clone(img)),
            _ => None,
        }
    }

    pub fn current_error(&self) -> Option<&str> {
        self.errors.get(self.wanted.as_ref()?).map(String::as_str)
    }

    pub fn thumbnail(&self, idx: usize) -> Option<Arc<DecodedImage>> {
        self.thumbnails.get(&idx).cloned()
    }

    fn thumbnail_pending(&self, idx: usize) -> bool {
        !self.thumbnails.contains_key(&idx)
            && !self.thumbnail_errors.contains(&idx)
            && !self.in_progress.contains(&Work::Thumbnail(idx))
    }

    /// Next job: the wanted full image first, then thumbnails starting at
    /// the first visible item and wrapping around.
    pub fn find_work(&self) -> Option<Work> {
        if let Some(src) = &self.wanted {
            let work = Work::Full(src.clone());
            if self.current().is_none()
                && !self.errors.contains_key(src)
                && !self.in_progress.contains(&work)
            {
                return Some(work);
            }
        }

        let start = self.first_visible.min(self.item_count);
        (start..self.item_count)
            .chain(0..start)
            .find(|&idx| self.thumbnail_pending(idx))
            .map(Work::Thumbnail)
    }

    pub fn finish(&mut self, work: Work, result: Result<DecodedImage, String>) {
        self.in_progress.remove(&work);
        match (work, result) {
            (Work::Full(src), Ok(decoded)) => {
                // Only the wanted source is kept.
                if self.wanted.as_ref() == Some(&src) {
                    self.full = Some((src, Arc::new(decoded)));
                }
            }
            (Work::Full(src), Err(e)) => {
                self.errors.insert(src, e);
            }
            (Work::Thumbnail(idx), Ok(decoded)) => {
                self.thumbnails.insert(idx, Arc::new(decoded));
            }
            (Work::Thumbnail(idx), Err(_)) => {
                self.thumbnail_errors.insert(idx);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// User event for waking the UI from worker threads
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum UserEvent {
    ImageReady(String),
    ThumbnailReady(usize),
}

// ---------------------------------------------------------------------------
// Background decode workers
// ---------------------------------------------------------------------------

pub fn spawn_decode_workers(
    shared: SharedState,
    items: Arc<[GalleryItem]>,
    proxy: EventLoopProxy<UserEvent>,
    num_threads: usize,
) {
    for _ in 0..num_threads {
        let shared = Arc::clone(&shared);
        let items = Arc::clone(&items);
        let proxy = proxy.clone();
        thread::spawn(move || loop {
            let (work, thumb_size) = {
                let mut state = lock(&shared);
                loop {
                    if let Some(work) = state.find_work() {
                        state.in_progress.insert(work.clone());
                        break (work, state.thumb_size);
                    }
                    state = shared.1.wait(state).unwrap_or_else(PoisonError::into_inner);
                }
            };

            let result = match &work {
                Work::Full(src) => decode_image(source_path(src), None),
                Work::Thumbnail(idx) => match items.get(*idx) {
                    Some(item) => decode_image(
                        source_path(&item.image_url),
                        Some((thumb_size, thumb_size)),
                    ),
                    None => Err(format!("no item {}", idx)),
                },
            };
            if let Err(e) = &result {
                log::debug!("[loader] {:?} failed: {}", work, e);
            }

            let event = match &work {
                Work::Full(src) => UserEvent::ImageReady(src.clone()),
                Work::Thumbnail(idx) => UserEvent::ThumbnailReady(*idx),
            };
            {
                let mut state = lock(&shared);
                state.finish(work, result);
                shared.1.notify_all();
            }
            // The event loop is gone once the window closes.
            if proxy.send_event(event).is_err() {
                break;
            }
        });
    }
}
