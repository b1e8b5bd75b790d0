//! The gallery lightbox widget, independent of any windowing toolkit.
//!
//! [`Lightbox`] owns the item list, the current [`Selection`] and an
//! [`Overlay`] model: the plain attributes a display surface needs to draw
//! the lightbox (image source, caption, control enablement, visibility,
//! focus). Every external input is a [`Stimulus`] fed to
//! [`Lightbox::dispatch`]; the binding then redraws from [`Lightbox::overlay`].
//!
//! Closing is two-step. [`Lightbox::close`] flips the overlay to hidden right
//! away so the styling layer can fade it out, and schedules a finalize step
//! `transition` later that clears the content. The owner must call
//! [`Lightbox::tick`] when [`Lightbox::next_deadline`] passes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::gallery::GalleryItem;

pub mod swipe;
pub mod timer;

use swipe::{SwipeTracker, DEFAULT_SWIPE_THRESHOLD};
use timer::{TimerHandle, Timers};

/// Length of the show/hide transition the finalize step waits for.
pub const DEFAULT_TRANSITION: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

impl Direction {
    pub fn offset(self) -> isize {
        match self {
            Direction::Backward => -1,
            Direction::Forward => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Closed,
    OpenAt(usize),
}

impl Selection {
    pub fn index(self) -> Option<usize> {
        match self {
            Selection::Closed => None,
            Selection::OpenAt(i) => Some(i),
        }
    }

    /// Non-wrapping move within `len` items. `None` when closed or at the edge.
    pub fn step(self, direction: Direction, len: usize) -> Option<Selection> {
        let current = self.index()?;
        let next = current.checked_add_signed(direction.offset())?;
        (next < len).then_some(Selection::OpenAt(next))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Closed,
    Open,
    /// Hidden, waiting for the finalize step.
    Closing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Close,
    Prev,
    Next,
}

/// The exact element an overlay activation landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The dimmed backdrop itself.
    Background,
    /// The image, caption, or anything inside their container.
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stimulus {
    Item(usize),
    Control(Control),
    Overlay(Target),
    Key(Key),
    /// Horizontal touch position in logical pixels, image area only.
    TouchStart { x: f64 },
    TouchEnd { x: f64 },
}

/// What the binding should do after a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Response {
    /// The overlay model changed; redraw.
    pub changed: bool,
    /// Skip the surface's default action for this input (e.g. scrolling).
    pub prevent_default: bool,
}

/// How overlapping close timers are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClosePolicy {
    /// One pending finalize at most. Reopening cancels it; closing twice is a no-op.
    #[default]
    Replace,
    /// Every close schedules its own finalize and nothing cancels it, so a
    /// finalize can clear an overlay that was reopened in the meantime.
    Unguarded,
}

/// Display attributes written by the widget and read by the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub image_src: String,
    pub caption: String,
    pub prev_disabled: bool,
    pub next_disabled: bool,
    /// Drives the styling layer's fade.
    pub hidden: bool,
    pub aria_hidden: bool,
    /// Background content must not scroll.
    pub scroll_locked: bool,
    pub image_opacity: f32,
    pub caption_opacity: f32,
    pub focus: Option<Control>,
}

impl Default for Overlay {
    fn default() -> Self {
        Self {
            image_src: String::new(),
            caption: String::new(),
            prev_disabled: false,
            next_disabled: false,
            hidden: true,
            aria_hidden: true,
            scroll_locked: false,
            image_opacity: 1.0,
            caption_opacity: 1.0,
            focus: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    pub transition: Duration,
    pub swipe_threshold: f64,
    pub close_policy: ClosePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transition: DEFAULT_TRANSITION,
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            close_policy: ClosePolicy::default(),
        }
    }
}

pub struct Lightbox {
    items: Arc<[GalleryItem]>,
    selection: Selection,
    phase: Phase,
    overlay: Overlay,
    timers: Timers,
    /// Finalize step owned by the `Replace` policy.
    finalize: Option<TimerHandle>,
    swipe: SwipeTracker,
    config: Config,
}

impl Lightbox {
    pub fn new(items: Arc<[GalleryItem]>, config: Config) -> Self {
        Self {
            items,
            selection: Selection::Closed,
            phase: Phase::Closed,
            overlay: Overlay::default(),
            timers: Timers::new(),
            finalize: None,
            swipe: SwipeTracker::new(config.swipe_threshold),
            config,
        }
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn transition(&self) -> Duration {
        self.config.transition
    }

    pub fn is_open(&self) -> bool {
        self.phase == Phase::Open
    }

    /// Shows `items[index]` and updates control enablement.
    /// Returns false (and changes nothing) when `index` is out of range.
    pub fn render(&mut self, index: usize) -> bool {
        let Some(item) = self.items.get(index) else {
            return false;
        };
        self.overlay.image_src.clone_from(&item.image_url);
        self.overlay.caption.clone_from(&item.caption);
        self.selection = Selection::OpenAt(index);
        self.overlay.prev_disabled = index == 0;
        self.overlay.next_disabled = index + 1 == self.items.len();
        true
    }

    pub fn open(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        if self.config.close_policy == ClosePolicy::Replace {
            match self.phase {
                Phase::Open => return false,
                Phase::Closing => {
                    if let Some(handle) = self.finalize.take() {
                        self.timers.cancel(handle);
                        log::debug!("[lightbox] reopen cancels pending finalize");
                    }
                }
                Phase::Closed => {}
            }
        }

        self.render(index);
        self.overlay.image_opacity = 1.0;
        self.overlay.caption_opacity = 1.0;
        self.overlay.hidden = false;
        self.overlay.aria_hidden = false;
        self.overlay.scroll_locked = true;
        self.overlay.focus = Some(Control::Close);
        self.phase = Phase::Open;
        log::debug!("[lightbox] open at {}", index);
        true
    }

    /// Hides the overlay now and schedules the finalize step.
    pub fn close(&mut self, now: Instant) -> Option<TimerHandle> {
        if self.config.close_policy == ClosePolicy::Replace && self.phase != Phase::Open {
            return None;
        }
        self.overlay.hidden = true;
        self.phase = Phase::Closing;
        let handle = self.timers.schedule(now, self.config.transition);
        if self.config.close_policy == ClosePolicy::Replace {
            self.finalize = Some(handle);
        }
        log::debug!(
            "[lightbox] close, finalize in {}ms",
            self.config.transition.as_millis()
        );
        Some(handle)
    }

    pub fn navigate(&mut self, direction: Direction) -> bool {
        match self.selection.step(direction, self.items.len()) {
            Some(Selection::OpenAt(next)) => self.render(next),
            _ => false,
        }
    }

    /// Runs finalize steps that are due. Returns true if any ran.
    pub fn tick(&mut self, now: Instant) -> bool {
        let due = self.timers.take_due(now);
        let mut ran = false;
        for handle in due {
            if self.config.close_policy == ClosePolicy::Replace {
                if self.finalize != Some(handle) {
                    continue;
                }
                self.finalize = None;
            }
            self.finish_close();
            ran = true;
        }
        ran
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    fn finish_close(&mut self) {
        self.overlay.aria_hidden = true;
        self.overlay.scroll_locked = false;
        self.selection = Selection::Closed;
        self.overlay.image_src.clear();
        self.overlay.image_opacity = 1.0;
        self.overlay.caption_opacity = 1.0;
        self.overlay.focus = None;
        self.swipe.reset();
        if self.phase == Phase::Closing {
            self.phase = Phase::Closed;
        }
        log::debug!("[lightbox] finalized");
    }

    pub fn dispatch(&mut self, stimulus: Stimulus, now: Instant) -> Response {
        let mut response = Response::default();
        match stimulus {
            Stimulus::Item(index) => response.changed = self.open(index),
            Stimulus::Control(Control::Close) => response.changed = self.close(now).is_some(),
            Stimulus::Control(control @ (Control::Prev | Control::Next)) => {
                let direction = if control == Control::Prev {
                    Direction::Backward
                } else {
                    Direction::Forward
                };
                let moved = self.navigate(direction);
                let had_focus = self.overlay.focus.take().is_some();
                response.changed = moved || had_focus;
            }
            Stimulus::Overlay(Target::Background) => response.changed = self.close(now).is_some(),
            Stimulus::Overlay(Target::Content) => {}
            Stimulus::Key(key) => {
                if !self.is_open() {
                    return response;
                }
                match key {
                    Key::Escape => response.changed = self.close(now).is_some(),
                    Key::ArrowLeft => {
                        response.prevent_default = true;
                        response.changed = self.navigate(Direction::Backward);
                    }
                    Key::ArrowRight => {
                        response.prevent_default = true;
                        response.changed = self.navigate(Direction::Forward);
                    }
                    Key::Other => {}
                }
            }
            Stimulus::TouchStart { x } => {
                if self.selection != Selection::Closed {
                    self.swipe.begin(x);
                }
            }
            Stimulus::TouchEnd { x } => {
                if self.selection != Selection::Closed {
                    if let Some(direction) = self.swipe.end(x) {
                        response.changed = self.navigate(direction);
                    }
                }
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    fn items(n: usize) -> Arc<[GalleryItem]> {
        (0..n)
            .map(|i| GalleryItem {
                index: i,
                image_url: format!("img/{i}.jpg"),
                caption: format!("Photo {i}"),
            })
            .collect()
    }

    fn lightbox(n: usize) -> Lightbox {
        Lightbox::new(items(n), Config::default())
    }

    fn unguarded(n: usize) -> Lightbox {
        let config = Config {
            close_policy: ClosePolicy::Unguarded,
            ..Config::default()
        };
        Lightbox::new(items(n), config)
    }

    #[test]
    fn starts_closed_and_hidden() {
        let lb = lightbox(3);
        assert_eq!(lb.selection(), Selection::Closed);
        assert_eq!(lb.phase(), Phase::Closed);
        assert!(lb.overlay().hidden);
        assert!(lb.overlay().aria_hidden);
        assert!(!lb.overlay().scroll_locked);
        assert!(lb.overlay().image_src.is_empty());
    }

    #[test]
    fn open_shows_each_item() {
        for i in 0..4 {
            let mut lb = lightbox(4);
            assert!(lb.open(i));
            let o = lb.overlay();
            assert_eq!(lb.selection(), Selection::OpenAt(i));
            assert_eq!(o.image_src, format!("img/{i}.jpg"));
            assert_eq!(o.caption, format!("Photo {i}"));
            assert!(!o.hidden);
            assert!(!o.aria_hidden);
            assert!(o.scroll_locked);
            assert_eq!(o.focus, Some(Control::Close));
        }
    }

    #[test]
    fn open_out_of_range_changes_nothing() {
        let mut lb = lightbox(2);
        assert!(!lb.open(2));
        assert_eq!(lb.overlay(), &Overlay::default());
        assert_eq!(lb.phase(), Phase::Closed);
    }

    #[test]
    fn controls_disable_at_the_ends() {
        let mut lb = lightbox(5);
        lb.render(0);
        assert!(lb.overlay().prev_disabled);
        assert!(!lb.overlay().next_disabled);
        lb.render(4);
        assert!(!lb.overlay().prev_disabled);
        assert!(lb.overlay().next_disabled);
        for i in 1..4 {
            lb.render(i);
            assert!(!lb.overlay().prev_disabled);
            assert!(!lb.overlay().next_disabled);
        }
    }

    #[test]
    fn single_item_disables_both_controls() {
        let mut lb = lightbox(1);
        lb.render(0);
        assert!(lb.overlay().prev_disabled);
        assert!(lb.overlay().next_disabled);
    }

    #[test]
    fn render_out_of_range_is_ignored() {
        let mut lb = lightbox(3);
        lb.render(1);
        let before = lb.overlay().clone();
        assert!(!lb.render(3));
        assert!(!lb.render(usize::MAX));
        assert_eq!(lb.overlay(), &before);
        assert_eq!(lb.selection(), Selection::OpenAt(1));
    }

    #[test]
    fn navigation_does_not_wrap() {
        let mut lb = lightbox(3);
        lb.open(0);
        assert!(!lb.navigate(Direction::Backward));
        assert_eq!(lb.selection(), Selection::OpenAt(0));
        assert!(lb.navigate(Direction::Forward));
        assert!(lb.navigate(Direction::Forward));
        assert_eq!(lb.selection(), Selection::OpenAt(2));
        assert!(!lb.navigate(Direction::Forward));
        assert_eq!(lb.selection(), Selection::OpenAt(2));
        assert!(lb.is_open());
    }

    #[test]
    fn step_is_pure() {
        assert_eq!(Selection::Closed.step(Direction::Forward, 5), None);
        assert_eq!(
            Selection::OpenAt(3).step(Direction::Forward, 5),
            Some(Selection::OpenAt(4))
        );
        assert_eq!(Selection::OpenAt(4).step(Direction::Forward, 5), None);
        assert_eq!(Selection::OpenAt(0).step(Direction::Backward, 5), None);
    }

    #[test]
    fn inputs_are_ignored_while_closed() {
        let t0 = Instant::now();
        let mut lb = lightbox(3);
        assert!(!lb.navigate(Direction::Forward));
        for stimulus in [
            Stimulus::Key(Key::ArrowRight),
            Stimulus::Key(Key::ArrowLeft),
            Stimulus::Key(Key::Escape),
            Stimulus::TouchStart { x: 300.0 },
            Stimulus::TouchEnd { x: 100.0 },
        ] {
            assert_eq!(lb.dispatch(stimulus, t0), Response::default());
        }
        assert_eq!(lb.selection(), Selection::Closed);
        assert_eq!(lb.overlay(), &Overlay::default());
    }

    #[test]
    fn close_hides_now_and_finalizes_after_transition() {
        let t0 = Instant::now();
        let mut lb = lightbox(3);
        lb.open(1);
        assert!(lb.close(t0).is_some());

        assert!(lb.overlay().hidden);
        assert!(!lb.overlay().aria_hidden);
        assert_eq!(lb.phase(), Phase::Closing);
        assert_eq!(lb.next_deadline(), Some(t0 + 300 * MS));

        assert!(!lb.tick(t0 + 299 * MS));
        assert_eq!(lb.selection(), Selection::OpenAt(1));
        assert!(lb.overlay().scroll_locked);

        assert!(lb.tick(t0 + 300 * MS));
        let o = lb.overlay();
        assert_eq!(lb.selection(), Selection::Closed);
        assert_eq!(lb.phase(), Phase::Closed);
        assert!(o.image_src.is_empty());
        assert!(o.aria_hidden);
        assert!(!o.scroll_locked);
        assert_eq!(o.image_opacity, 1.0);
        assert_eq!(o.caption_opacity, 1.0);
        assert_eq!(o.focus, None);
    }

    #[test]
    fn close_while_closed_is_a_no_op() {
        let t0 = Instant::now();
        let mut lb = lightbox(3);
        assert!(lb.close(t0).is_none());
        lb.open(0);
        lb.close(t0);
        assert!(lb.close(t0 + 10 * MS).is_none());
        assert_eq!(lb.next_deadline(), Some(t0 + 300 * MS));
    }

    #[test]
    fn swipe_threshold_and_direction() {
        let t0 = Instant::now();
        let mut lb = lightbox(5);
        lb.open(2);

        lb.dispatch(Stimulus::TouchStart { x: 400.0 }, t0);
        let r = lb.dispatch(Stimulus::TouchEnd { x: 351.0 }, t0);
        assert!(!r.changed);
        assert_eq!(lb.selection(), Selection::OpenAt(2));

        lb.dispatch(Stimulus::TouchStart { x: 400.0 }, t0);
        let r = lb.dispatch(Stimulus::TouchEnd { x: 340.0 }, t0);
        assert!(r.changed);
        assert!(!r.prevent_default);
        assert_eq!(lb.selection(), Selection::OpenAt(3));

        lb.dispatch(Stimulus::TouchStart { x: 340.0 }, t0);
        lb.dispatch(Stimulus::TouchEnd { x: 400.0 }, t0);
        assert_eq!(lb.selection(), Selection::OpenAt(2));
    }

    #[test]
    fn arrows_navigate_and_suppress_default() {
        let t0 = Instant::now();
        let mut lb = lightbox(3);
        lb.open(1);

        let r = lb.dispatch(Stimulus::Key(Key::ArrowLeft), t0);
        assert_eq!(r, Response { changed: true, prevent_default: true });
        assert_eq!(lb.selection(), Selection::OpenAt(0));

        // Still suppressed at the edge, even though nothing moves.
        let r = lb.dispatch(Stimulus::Key(Key::ArrowLeft), t0);
        assert_eq!(r, Response { changed: false, prevent_default: true });

        let r = lb.dispatch(Stimulus::Key(Key::Other), t0);
        assert_eq!(r, Response::default());
    }

    #[test]
    fn prev_and_next_controls_drop_focus() {
        let t0 = Instant::now();
        let mut lb = lightbox(3);
        lb.open(0);
        assert_eq!(lb.overlay().focus, Some(Control::Close));

        let r = lb.dispatch(Stimulus::Control(Control::Next), t0);
        assert!(r.changed);
        assert_eq!(lb.selection(), Selection::OpenAt(1));
        assert_eq!(lb.overlay().focus, None);

        lb.dispatch(Stimulus::Control(Control::Prev), t0);
        assert_eq!(lb.selection(), Selection::OpenAt(0));
    }

    #[test]
    fn only_background_activation_closes() {
        let t0 = Instant::now();
        let mut lb = lightbox(3);
        lb.open(1);

        let r = lb.dispatch(Stimulus::Overlay(Target::Content), t0);
        assert!(!r.changed);
        assert!(lb.is_open());

        let r = lb.dispatch(Stimulus::Overlay(Target::Background), t0);
        assert!(r.changed);
        assert!(lb.overlay().hidden);
        assert_eq!(lb.phase(), Phase::Closing);
    }

    #[test]
    fn browse_then_escape() {
        let t0 = Instant::now();
        let mut lb = lightbox(5);

        lb.dispatch(Stimulus::Item(2), t0);
        assert_eq!(lb.overlay().caption, "Photo 2");
        assert_eq!(lb.overlay().image_src, "img/2.jpg");
        assert!(!lb.overlay().prev_disabled);
        assert!(!lb.overlay().next_disabled);

        lb.dispatch(Stimulus::Key(Key::ArrowRight), t0);
        assert_eq!(lb.selection(), Selection::OpenAt(3));
        assert_eq!(lb.overlay().caption, "Photo 3");

        let t1 = t0 + 50 * MS;
        lb.dispatch(Stimulus::Key(Key::Escape), t1);
        assert!(lb.overlay().hidden);

        lb.tick(t1 + 300 * MS);
        assert_eq!(lb.selection(), Selection::Closed);
    }

    #[test]
    fn keys_are_ignored_while_fading_out() {
        let t0 = Instant::now();
        let mut lb = lightbox(5);
        lb.open(2);
        lb.close(t0);
        let r = lb.dispatch(Stimulus::Key(Key::ArrowRight), t0 + 10 * MS);
        assert_eq!(r, Response::default());
        assert_eq!(lb.selection(), Selection::OpenAt(2));
    }

    #[test]
    fn reopen_during_fade_cancels_finalize() {
        let t0 = Instant::now();
        let mut lb = lightbox(5);
        lb.open(1);
        lb.close(t0);
        assert!(lb.open(3));
        assert_eq!(lb.next_deadline(), None);

        assert!(!lb.tick(t0 + 400 * MS));
        assert!(lb.is_open());
        assert_eq!(lb.selection(), Selection::OpenAt(3));
        assert_eq!(lb.overlay().image_src, "img/3.jpg");
        assert!(lb.overlay().scroll_locked);
    }

    #[test]
    fn open_while_open_is_ignored() {
        let t0 = Instant::now();
        let mut lb = lightbox(5);
        lb.open(1);
        assert!(!lb.dispatch(Stimulus::Item(4), t0).changed);
        assert_eq!(lb.selection(), Selection::OpenAt(1));
    }

    #[test]
    fn unguarded_finalize_clobbers_a_reopen() {
        let t0 = Instant::now();
        let mut lb = unguarded(5);
        lb.open(1);
        lb.close(t0);
        lb.open(3);
        assert_eq!(lb.next_deadline(), Some(t0 + 300 * MS));

        assert!(lb.tick(t0 + 300 * MS));
        // Overlay still shown, but its content and selection are gone.
        assert!(!lb.overlay().hidden);
        assert_eq!(lb.phase(), Phase::Open);
        assert_eq!(lb.selection(), Selection::Closed);
        assert!(lb.overlay().image_src.is_empty());
        assert!(!lb.overlay().scroll_locked);
        assert!(!lb.navigate(Direction::Forward));
    }

    #[test]
    fn unguarded_double_close_schedules_twice() {
        let t0 = Instant::now();
        let mut lb = unguarded(3);
        lb.open(0);
        assert!(lb.close(t0).is_some());
        assert!(lb.close(t0 + 50 * MS).is_some());

        assert!(lb.tick(t0 + 300 * MS));
        assert_eq!(lb.phase(), Phase::Closed);
        assert_eq!(lb.next_deadline(), Some(t0 + 350 * MS));
        assert!(lb.tick(t0 + 350 * MS));
        assert_eq!(lb.next_deadline(), None);
    }

    #[test]
    fn custom_transition_length() {
        let t0 = Instant::now();
        let config = Config {
            transition: 120 * MS,
            ..Config::default()
        };
        let mut lb = Lightbox::new(items(2), config);
        lb.open(0);
        lb.close(t0);
        assert!(!lb.tick(t0 + 119 * MS));
        assert!(lb.tick(t0 + 120 * MS));
    }
}
