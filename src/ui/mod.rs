use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;
use softbuffer::Surface;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, Touch, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

use crate::lightbox::{Key as LightboxKey, Phase, Response, Stimulus};
use crate::loader::UserEvent;
use crate::ui::state::{GalleryState, Wake};

pub mod layout;
pub mod render;
pub mod state;
pub mod transition;

/// Pixels per wheel line.
const LINE_SCROLL: f32 = 60.0;

fn lightbox_key(key: &Key) -> LightboxKey {
    match key {
        Key::Named(NamedKey::Escape) => LightboxKey::Escape,
        Key::Named(NamedKey::ArrowLeft) => LightboxKey::ArrowLeft,
        Key::Named(NamedKey::ArrowRight) => LightboxKey::ArrowRight,
        _ => LightboxKey::Other,
    }
}

// ---------------------------------------------------------------------------
// Application handler (winit 0.30 style)
// ---------------------------------------------------------------------------

pub struct App {
    pub state: GalleryState,
    pub window: Option<Arc<Window>>,
    pub context: Option<softbuffer::Context<Arc<Window>>>,
    pub surface: Option<Surface<Arc<Window>, Arc<Window>>>,
}

impl App {
    pub fn new(state: GalleryState) -> Self {
        Self {
            state,
            window: None,
            context: None,
            surface: None,
        }
    }

    fn request_redraw(&self) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }

    fn scale_factor(&self) -> f64 {
        self.window.as_ref().map(|w| w.scale_factor()).unwrap_or(1.0)
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), String> {
        let attrs = Window::default_attributes()
            .with_title("lightbox")
            .with_inner_size(LogicalSize::new(1280u32, 720u32));
        let window = Arc::new(event_loop.create_window(attrs).map_err(|e| e.to_string())?);
        let context = softbuffer::Context::new(Arc::clone(&window)).map_err(|e| e.to_string())?;
        let surface = Surface::new(&context, Arc::clone(&window)).map_err(|e| e.to_string())?;

        self.window = Some(window);
        self.context = Some(context);
        self.surface = Some(surface);
        if let Some(size) = self.window.as_ref().map(|w| w.inner_size()) {
            self.resize(size);
        }
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        let w = size.width.max(1);
        let h = size.height.max(1);
        if let (Some(surface), Some(nw), Some(nh)) =
            (self.surface.as_mut(), NonZeroU32::new(w), NonZeroU32::new(h))
        {
            if let Err(e) = surface.resize(nw, nh) {
                log::error!("Failed to resize surface: {}", e);
            }
        }
        self.state.resize(w, h);
    }

    /// Default handling for keys the lightbox did not claim.
    fn default_key_action(&mut self, key: &Key, event_loop: &ActiveEventLoop) -> bool {
        let page = self.state.fb_size.1 as f32 * 0.9;
        let row = self.state.grid().row_step();
        match key {
            Key::Named(NamedKey::ArrowDown) => self.state.scroll_by(row),
            Key::Named(NamedKey::ArrowUp) => self.state.scroll_by(-row),
            Key::Named(NamedKey::PageDown) => self.state.scroll_by(page),
            Key::Named(NamedKey::PageUp) => self.state.scroll_by(-page),
            Key::Named(NamedKey::Home) => self.state.scroll_to_end(false),
            Key::Named(NamedKey::End) => self.state.scroll_to_end(true),
            Key::Character(s) if s.as_str() == "q" && self.state.lightbox.phase() == Phase::Closed => {
                event_loop.exit();
                false
            }
            _ => false,
        }
    }
}

impl ApplicationHandler<UserEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            log::error!("Failed to create window: {}", e);
            event_loop.exit();
            return;
        }
        self.request_redraw();
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: UserEvent) {
        match event {
            UserEvent::ImageReady(src) => {
                if self.state.lightbox.overlay().image_src == src {
                    log::debug!("[ui] image ready: {}", src);
                    self.request_redraw();
                }
            }
            UserEvent::ThumbnailReady(idx) => {
                if self.state.item_on_screen(idx) {
                    self.request_redraw();
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let now = Instant::now();
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                self.resize(size);
                self.request_redraw();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                let Response {
                    changed,
                    prevent_default,
                } = self
                    .state
                    .dispatch(Stimulus::Key(lightbox_key(&event.logical_key)), now);
                let acted = !prevent_default && self.default_key_action(&event.logical_key, event_loop);
                if changed || acted {
                    self.request_redraw();
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left && state == ElementState::Released {
                    let (x, y) = self.state.mouse_pos;
                    if self.state.activate(x, y, now).changed {
                        self.request_redraw();
                    }
                }
            }

            WindowEvent::CursorMoved {
                position: PhysicalPosition { x, y },
                ..
            } => {
                self.state.mouse_pos = (x, y);
                if !self.state.overlay_active() {
                    // Hover highlight
                    self.request_redraw();
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => -y * LINE_SCROLL,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => -(y as f32),
                };
                if self.state.scroll_by(dy) {
                    self.request_redraw();
                }
            }

            WindowEvent::Touch(Touch { id, phase, location, .. }) => {
                let scale = self.scale_factor();
                if self.state.touch(id, phase, location, scale, now) {
                    self.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => {
                self.state.tick(now);
                let Some(ref window) = self.window else {
                    return;
                };
                let size = window.inner_size();
                let fb_w = size.width.max(1);
                let fb_h = size.height.max(1);
                if let Some(ref mut surface) = self.surface {
                    match surface.buffer_mut() {
                        Ok(mut buffer) => {
                            self.state.render(&mut buffer, fb_w, fb_h, now);
                            if let Err(e) = buffer.present() {
                                log::error!("Failed to present frame: {}", e);
                            }
                        }
                        Err(e) => log::error!("Failed to get frame buffer: {}", e),
                    }
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        match self.state.poll(Instant::now()) {
            Wake::Redraw => {
                self.request_redraw();
                event_loop.set_control_flow(ControlFlow::Wait);
            }
            Wake::At(when) => event_loop.set_control_flow(ControlFlow::WaitUntil(when)),
            Wake::Idle => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}
