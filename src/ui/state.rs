use std::time::{Duration, Instant};

use winit::dpi::PhysicalPosition;
use winit::event::TouchPhase;

use crate::lightbox::{Control, Lightbox, Response, Stimulus};
use crate::loader::{lock, SharedState};
use crate::ui::layout::{line_height, Grid, Hit, OverlayLayout, Rect, PAD};
use crate::ui::render::{
    blit_scaled, draw_text, draw_text_centered, fade, fill_rect, fit_into, rgb, stroke_rect,
    BG_COLOR,
};
use crate::ui::transition::Fade;

/// Redraw interval while a fade is running.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);
/// Largest movement, in logical pixels, for a touch to count as a tap.
const TAP_SLOP: f64 = 10.0;

const WHITE: (u8, u8, u8, u8) = (255, 255, 255, 255);
const MUTED: (u8, u8, u8, u8) = (170, 170, 170, 255);
const ERROR: (u8, u8, u8, u8) = (255, 80, 80, 255);
const BACKDROP: (u8, u8, u8, u8) = (0, 0, 0, 220);
const BUTTON: (u8, u8, u8, u8) = (255, 255, 255, 40);
const FOCUS_RING: (u8, u8, u8, u8) = (90, 160, 255, 255);

/// What the event loop should do after handling its events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    Redraw,
    At(Instant),
    Idle,
}

struct TouchTrack {
    id: u64,
    start: PhysicalPosition<f64>,
    last: PhysicalPosition<f64>,
    /// Began inside the lightbox image area, so it feeds the swipe recognizer.
    in_image: bool,
}

// ---------------------------------------------------------------------------
// Gallery state
// ---------------------------------------------------------------------------

pub struct GalleryState {
    pub lightbox: Lightbox,
    pub shared: SharedState,
    /// Styling layer bound to the overlay's hidden flag.
    pub fade: Fade,
    pub scroll_y: f32,
    pub mouse_pos: (f64, f64),
    pub text_scale: u32,
    pub thumb_size: u32,
    pub fb_size: (u32, u32),
    /// When the next frame is due: set on every state change and, while the
    /// fade runs, one frame interval after each drawn frame.
    next_frame: Option<Instant>,
    active_touch: Option<TouchTrack>,
}

impl GalleryState {
    pub fn new(lightbox: Lightbox, shared: SharedState, text_scale: u32, thumb_size: u32) -> Self {
        let fade = Fade::new(lightbox.transition(), !lightbox.overlay().hidden);
        Self {
            lightbox,
            shared,
            fade,
            scroll_y: 0.0,
            mouse_pos: (0.0, 0.0),
            text_scale: text_scale.max(1),
            thumb_size: thumb_size.max(16),
            fb_size: (1, 1),
            next_frame: None,
            active_touch: None,
        }
    }

    pub fn grid(&self) -> Grid {
        Grid::new(
            self.fb_size.0,
            self.thumb_size,
            self.text_scale,
            self.lightbox.items().len(),
        )
    }

    pub fn overlay_layout(&self) -> OverlayLayout {
        OverlayLayout::new(self.fb_size.0, self.fb_size.1, self.text_scale)
    }

    /// Whether pointer input goes to the overlay rather than the grid.
    pub fn overlay_active(&self) -> bool {
        !self.lightbox.overlay().hidden
    }

    pub fn dispatch(&mut self, stimulus: Stimulus, now: Instant) -> Response {
        let response = self.lightbox.dispatch(stimulus, now);
        if response.changed {
            self.sync(now);
        }
        response
    }

    /// Run due lightbox timers. Returns true if a redraw is needed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let ran = self.lightbox.tick(now);
        if ran {
            self.sync(now);
        }
        ran
    }

    /// Push the overlay model to the styling layer and the image loader.
    fn sync(&mut self, now: Instant) {
        self.next_frame = Some(now);
        let overlay = self.lightbox.overlay();
        self.fade.set_shown(!overlay.hidden, now);
        let mut state = lock(&self.shared);
        if state.request(&overlay.image_src) {
            self.shared.1.notify_all();
        }
    }

    /// Translate an activation at window coordinates into a stimulus.
    pub fn activate(&mut self, x: f64, y: f64, now: Instant) -> Response {
        let stimulus = if self.overlay_active() {
            Some(self.overlay_layout().hit(x, y).stimulus())
        } else {
            self.grid().item_at(x, y, self.scroll_y).map(Stimulus::Item)
        };
        match stimulus {
            Some(s) => self.dispatch(s, now),
            None => Response::default(),
        }
    }

    pub fn hit_image_area(&self, x: f64, y: f64) -> bool {
        self.overlay_active() && self.overlay_layout().hit(x, y) == Hit::ImageArea
    }

    /// Track one touch point. Only touches that begin in the image area feed
    /// the swipe recognizer, in logical pixels. A touch that barely moves is
    /// a click. Returns true if a redraw is needed.
    pub fn touch(
        &mut self,
        id: u64,
        phase: TouchPhase,
        location: PhysicalPosition<f64>,
        scale_factor: f64,
        now: Instant,
    ) -> bool {
        let scale = scale_factor.max(f64::EPSILON);
        match phase {
            TouchPhase::Started => {
                if self.active_touch.is_some() {
                    return false;
                }
                let in_image = self.hit_image_area(location.x, location.y);
                self.active_touch = Some(TouchTrack {
                    id,
                    start: location,
                    last: location,
                    in_image,
                });
                if in_image {
                    self.dispatch(Stimulus::TouchStart { x: location.x / scale }, now);
                }
                false
            }
            TouchPhase::Moved => {
                let Some(track) = self.active_touch.as_mut().filter(|t| t.id == id) else {
                    return false;
                };
                let dy = (track.last.y - location.y) as f32;
                track.last = location;
                !self.overlay_active() && self.scroll_by(dy)
            }
            TouchPhase::Ended => {
                let Some(track) = self.active_touch.take_if(|t| t.id == id) else {
                    return false;
                };
                let mut changed = false;
                if track.in_image {
                    changed |= self
                        .dispatch(Stimulus::TouchEnd { x: location.x / scale }, now)
                        .changed;
                }
                let moved = (location.x - track.start.x).hypot(location.y - track.start.y) / scale;
                if moved < TAP_SLOP {
                    changed |= self.activate(location.x, location.y, now).changed;
                }
                changed
            }
            TouchPhase::Cancelled => {
                let _ = self.active_touch.take_if(|t| t.id == id);
                false
            }
        }
    }

    /// Scroll the grid. Ignored while the lightbox holds the scroll lock.
    pub fn scroll_by(&mut self, dy: f32) -> bool {
        if self.lightbox.overlay().scroll_locked {
            return false;
        }
        let grid = self.grid();
        let target = (self.scroll_y + dy).clamp(0.0, grid.max_scroll(self.fb_size.1));
        if target == self.scroll_y {
            return false;
        }
        self.scroll_y = target;
        self.update_visible(&grid);
        true
    }

    pub fn scroll_to_end(&mut self, end: bool) -> bool {
        let dy = if end { f32::MAX / 2.0 } else { -f32::MAX / 2.0 };
        self.scroll_by(dy)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.fb_size = (width.max(1), height.max(1));
        let grid = self.grid();
        self.scroll_y = self.scroll_y.min(grid.max_scroll(self.fb_size.1));
        self.update_visible(&grid);
    }

    /// Whether grid item `idx` is currently drawn on screen.
    pub fn item_on_screen(&self, idx: usize) -> bool {
        if self.overlay_active() {
            return false;
        }
        let cell = self.grid().cell_rect(idx, self.scroll_y);
        cell.y < self.fb_size.1 as i32 && cell.y + (cell.h as i32) > 0
    }

    fn update_visible(&self, grid: &Grid) {
        let first = grid.first_visible(self.scroll_y);
        let mut state = lock(&self.shared);
        if state.first_visible != first {
            state.first_visible = first;
            self.shared.1.notify_all();
        }
    }

    /// Run due timers, then decide whether to draw now or when to wake up.
    pub fn poll(&mut self, now: Instant) -> Wake {
        self.tick(now);
        if self.next_frame.is_some_and(|when| when <= now) {
            self.next_frame = None;
            return Wake::Redraw;
        }
        match (self.next_frame, self.lightbox.next_deadline()) {
            (Some(a), Some(b)) => Wake::At(a.min(b)),
            (a, b) => a.or(b).map_or(Wake::Idle, Wake::At),
        }
    }

    // -----------------------------------------------------------------------
    // Drawing
    // -----------------------------------------------------------------------

    pub fn render(&mut self, frame: &mut [u32], fb_w: u32, fb_h: u32, now: Instant) {
        frame.fill(rgb(BG_COLOR[0], BG_COLOR[1], BG_COLOR[2]));
        self.render_grid(frame, fb_w, fb_h);
        if self.fade.is_visible(now) {
            self.render_overlay(frame, fb_w, fb_h, now);
        }
        self.next_frame = self
            .fade
            .is_animating(now)
            .then(|| now + FRAME_INTERVAL);
    }

    fn render_grid(&self, frame: &mut [u32], fb_w: u32, fb_h: u32) {
        let grid = self.grid();
        let hovered = if self.overlay_active() {
            None
        } else {
            grid.item_at(self.mouse_pos.0, self.mouse_pos.1, self.scroll_y)
        };
        let state = lock(&self.shared);
        let scale = self.text_scale;

        for item in self.lightbox.items() {
            let cell = grid.cell_rect(item.index, self.scroll_y);
            if cell.y > fb_h as i32 || cell.y + (cell.h as i32) < 0 {
                continue;
            }
            let thumb_area = Rect::new(cell.x, cell.y, grid.thumb, grid.thumb);
            fill_rect(frame, fb_w, fb_h, thumb_area, (0, 0, 0, 90));

            if let Some(thumb) = state.thumbnail(item.index) {
                let (x0, y0, s) = fit_into(thumb.width, thumb.height, thumb_area, 1.0);
                blit_scaled(
                    frame, fb_w, fb_h,
                    &thumb.rgba_bytes, thumb.width, thumb.height,
                    x0, y0, s, 1.0,
                );
            } else if state.thumbnail_errors.contains(&item.index) {
                draw_text_centered(frame, fb_w, fb_h, "?", thumb_area, scale, ERROR);
            }

            if hovered == Some(item.index) {
                stroke_rect(frame, fb_w, fb_h, thumb_area, 2, WHITE);
            }

            let caption_area = Rect::new(
                cell.x,
                cell.y + grid.thumb as i32,
                cell.w,
                line_height(scale),
            );
            draw_text_centered(frame, fb_w, fb_h, &item.caption, caption_area, scale, MUTED);
        }
    }

    fn render_overlay(&self, frame: &mut [u32], fb_w: u32, fb_h: u32, now: Instant) {
        let alpha = self.fade.value(now);
        let shrink = self.fade.scale(now);
        let overlay = self.lightbox.overlay();
        let layout = self.overlay_layout();
        let scale = self.text_scale;

        fill_rect(frame, fb_w, fb_h, Rect::new(0, 0, fb_w, fb_h), fade(BACKDROP, alpha));

        // Image
        if !overlay.image_src.is_empty() {
            let state = lock(&self.shared);
            if let Some(img) = state.current() {
                let (x0, y0, s) = fit_into(img.width, img.height, layout.image_area, shrink);
                blit_scaled(
                    frame, fb_w, fb_h,
                    &img.rgba_bytes, img.width, img.height,
                    x0, y0, s,
                    alpha * overlay.image_opacity,
                );
            } else if let Some(err) = state.current_error() {
                let msg = format!("Could not load: {}", err);
                draw_text_centered(frame, fb_w, fb_h, &msg, layout.image_area, scale, fade(ERROR, alpha));
            } else {
                draw_text_centered(frame, fb_w, fb_h, "Loading...", layout.image_area, scale, fade(WHITE, alpha));
            }
        }

        // Caption
        draw_text_centered(
            frame, fb_w, fb_h,
            &overlay.caption,
            layout.caption,
            scale,
            fade(WHITE, alpha * overlay.caption_opacity),
        );

        // Position counter
        if let Some(idx) = self.lightbox.selection().index() {
            let counter = format!("{} / {}", idx + 1, self.lightbox.items().len());
            draw_text(frame, fb_w, fb_h, &counter, PAD as i32, PAD as i32, scale, fade(MUTED, alpha));
        }

        // Controls
        for (control, glyph, disabled) in [
            (Control::Close, "x", false),
            (Control::Prev, "<", overlay.prev_disabled),
            (Control::Next, ">", overlay.next_disabled),
        ] {
            let rect = layout.control(control);
            let strength = if disabled { alpha * 0.3 } else { alpha };
            fill_rect(frame, fb_w, fb_h, rect, fade(BUTTON, strength));
            draw_text_centered(frame, fb_w, fb_h, glyph, rect, scale, fade(WHITE, strength));
            if overlay.focus == Some(control) {
                stroke_rect(frame, fb_w, fb_h, rect, 2, fade(FOCUS_RING, alpha));
            }
        }
    }
}
