//! Geometry of the thumbnail grid and the lightbox overlay, plus hit-testing.

use crate::lightbox::{Control, Stimulus, Target};

/// Gap between grid cells and around overlay controls.
pub const PAD: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x as f64
            && py >= self.y as f64
            && px < self.x as f64 + self.w as f64
            && py < self.y as f64 + self.h as f64
    }

    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.w as f32 / 2.0,
            self.y as f32 + self.h as f32 / 2.0,
        )
    }
}

/// Height of one line of the 5x7 bitmap font at `text_scale`, with padding.
pub fn line_height(text_scale: u32) -> u32 {
    7 * text_scale + 8
}

// ---------------------------------------------------------------------------
// Thumbnail grid
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub cols: u32,
    pub thumb: u32,
    pub caption_h: u32,
    pub margin_x: i32,
    pub item_count: usize,
}

impl Grid {
    pub fn new(fb_w: u32, thumb: u32, text_scale: u32, item_count: usize) -> Self {
        let stride = thumb + PAD;
        let cols = (fb_w.saturating_sub(PAD) / stride).max(1);
        let used = cols * stride - PAD;
        Self {
            cols,
            thumb,
            caption_h: line_height(text_scale),
            margin_x: (fb_w.saturating_sub(used) / 2) as i32,
            item_count,
        }
    }

    fn stride_x(&self) -> u32 {
        self.thumb + PAD
    }

    fn stride_y(&self) -> u32 {
        self.thumb + self.caption_h + PAD
    }

    pub fn rows(&self) -> u32 {
        (self.item_count as u32).div_ceil(self.cols)
    }

    /// Thumbnail plus caption area of item `idx`, in window coordinates.
    pub fn cell_rect(&self, idx: usize, scroll_y: f32) -> Rect {
        let col = idx as u32 % self.cols;
        let row = idx as u32 / self.cols;
        Rect::new(
            self.margin_x + (col * self.stride_x()) as i32,
            PAD as i32 + (row * self.stride_y()) as i32 - scroll_y as i32,
            self.thumb,
            self.thumb + self.caption_h,
        )
    }

    pub fn content_height(&self) -> u32 {
        PAD + self.rows() * self.stride_y()
    }

    pub fn max_scroll(&self, view_h: u32) -> f32 {
        self.content_height().saturating_sub(view_h) as f32
    }

    pub fn row_step(&self) -> f32 {
        self.stride_y() as f32
    }

    pub fn first_visible(&self, scroll_y: f32) -> usize {
        let row = (scroll_y.max(0.0) / self.stride_y() as f32) as usize;
        (row * self.cols as usize).min(self.item_count)
    }

    pub fn item_at(&self, x: f64, y: f64, scroll_y: f32) -> Option<usize> {
        let gx = x - self.margin_x as f64;
        let gy = y - PAD as f64 + scroll_y as f64;
        if gx < 0.0 || gy < 0.0 {
            return None;
        }
        let col = (gx / self.stride_x() as f64) as u32;
        let row = (gy / self.stride_y() as f64) as u32;
        if col >= self.cols {
            return None;
        }
        let idx = (row * self.cols + col) as usize;
        if idx >= self.item_count {
            return None;
        }
        self.cell_rect(idx, scroll_y).contains(x, y).then_some(idx)
    }
}

// ---------------------------------------------------------------------------
// Overlay
// ---------------------------------------------------------------------------

/// What an activation inside the overlay landed on, topmost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Control(Control),
    ImageArea,
    Caption,
    /// Inside the content box but on neither image nor caption.
    Content,
    Background,
}

impl Hit {
    pub fn stimulus(self) -> Stimulus {
        match self {
            Hit::Control(c) => Stimulus::Control(c),
            Hit::Background => Stimulus::Overlay(Target::Background),
            Hit::ImageArea | Hit::Caption | Hit::Content => Stimulus::Overlay(Target::Content),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayLayout {
    pub content: Rect,
    pub image_area: Rect,
    pub caption: Rect,
    pub close: Rect,
    pub prev: Rect,
    pub next: Rect,
}

impl OverlayLayout {
    pub fn new(fb_w: u32, fb_h: u32, text_scale: u32) -> Self {
        let button = 7 * text_scale + 2 * PAD;
        let side = button + 2 * PAD;
        let caption_h = line_height(text_scale) + PAD;

        let content = Rect::new(
            side as i32,
            side as i32,
            fb_w.saturating_sub(2 * side).max(1),
            fb_h.saturating_sub(2 * side).max(1),
        );
        let image_h = content.h.saturating_sub(caption_h).max(1);
        let image_area = Rect::new(content.x, content.y, content.w, image_h);
        let caption = Rect::new(
            content.x,
            content.y + image_h as i32,
            content.w,
            content.h - image_h,
        );

        let right = fb_w.saturating_sub(PAD + button) as i32;
        let mid = (fb_h / 2).saturating_sub(button / 2) as i32;
        Self {
            content,
            image_area,
            caption,
            close: Rect::new(right, PAD as i32, button, button),
            prev: Rect::new(PAD as i32, mid, button, button),
            next: Rect::new(right, mid, button, button),
        }
    }

    pub fn control(&self, control: Control) -> Rect {
        match control {
            Control::Close => self.close,
            Control::Prev => self.prev,
            Control::Next => self.next,
        }
    }

    pub fn hit(&self, x: f64, y: f64) -> Hit {
        for control in [Control::Close, Control::Prev, Control::Next] {
            if self.control(control).contains(x, y) {
                return Hit::Control(control);
            }
        }
        if self.image_area.contains(x, y) {
            Hit::ImageArea
        } else if self.caption.contains(x, y) {
            Hit::Caption
        } else if self.content.contains(x, y) {
            Hit::Content
        } else {
            Hit::Background
        }
    }
}
