use log::error;
use std::sync::Arc;
use std::time::Duration;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

/// Poll-style windowing host. The renderer contract is pump-based
/// (`poll_events` / `should_close`), so instead of handing the thread to
/// the event loop we pump it with a zero timeout once per call. The window
/// itself is created on the first pump, inside `resumed`.
pub struct WindowHost {
    event_loop: EventLoop<()>,
    app: HostApp,
}

struct HostApp {
    title: String,
    size: (u32, u32),
    window: Option<Arc<Window>>,
    close_requested: bool,
    resized: Option<(u32, u32)>,
}

impl ApplicationHandler for HostApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(PhysicalSize::new(self.size.0, self.size.1));
        match event_loop.create_window(attrs) {
            Ok(window) => self.window = Some(Arc::new(window)),
            Err(err) => {
                error!("window creation failed: {err}");
                self.close_requested = true;
            }
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.close_requested = true,
            WindowEvent::Resized(size) => self.resized = Some((size.width, size.height)),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Escape)
                {
                    self.close_requested = true;
                }
            }
            _ => {}
        }
    }
}

impl WindowHost {
    pub fn create(width: u32, height: u32, title: &str) -> Option<Self> {
        let event_loop = match EventLoop::new() {
            Ok(event_loop) => event_loop,
            Err(err) => {
                error!("event loop creation failed: {err}");
                return None;
            }
        };
        let mut host = Self {
            event_loop,
            app: HostApp {
                title: title.to_owned(),
                size: (width.max(1), height.max(1)),
                window: None,
                close_requested: false,
                resized: None,
            },
        };
        // Pump until `resumed` has fired and created the window; some
        // platforms need more than one roundtrip.
        for _ in 0..10 {
            host.pump();
            if host.app.window.is_some() || host.app.close_requested {
                break;
            }
        }
        if host.app.window.is_none() {
            error!("window was not created by the event loop");
            return None;
        }
        Some(host)
    }

    pub fn pump(&mut self) {
        use winit::platform::pump_events::EventLoopExtPumpEvents;
        let _ = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.app);
    }

    pub fn window(&self) -> Option<Arc<Window>> {
        self.app.window.clone()
    }

    pub fn close_requested(&self) -> bool {
        self.app.close_requested
    }

    pub fn take_resize(&mut self) -> Option<(u32, u32)> {
        self.app.resized.take()
    }
}
