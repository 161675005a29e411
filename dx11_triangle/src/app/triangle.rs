use std::path::PathBuf;

use super::{KeyAction, Sample, VK_ESCAPE};
use crate::graphics::{Backend, Error, GraphicsContext};

/// The one-triangle sample: a [`GraphicsContext`] plus the window it draws to.
pub struct TriangleApp<B: Backend> {
    graphics: GraphicsContext<B>,
    title: String,
    frames: u64,
}

impl<B: Backend> TriangleApp<B> {
    pub fn new(backend: B, shader_dir: impl Into<PathBuf>, use_warp_device: bool) -> Self {
        let mut title = String::from("Active Window");
        if use_warp_device {
            title.push_str(" (WARP)");
        }
        TriangleApp {
            graphics: GraphicsContext::new(backend, shader_dir),
            title,
            frames: 0,
        }
    }

    pub fn graphics(&self) -> &GraphicsContext<B> {
        &self.graphics
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl<B: Backend> Sample for TriangleApp<B> {
    type Window = B::Window;

    fn title(&self) -> String {
        self.title.clone()
    }

    fn bind_to_window(&mut self, window: B::Window, width: u32, height: u32) -> Result<(), Error> {
        self.graphics.initialize(window, width, height)
    }

    fn render(&mut self) -> Result<(), Error> {
        self.graphics.render_frame()?;
        self.frames += 1;
        Ok(())
    }

    fn on_key_down(&mut self, key: u8) -> KeyAction {
        if key == VK_ESCAPE {
            KeyAction::ConfirmExit
        } else {
            KeyAction::None
        }
    }

    fn on_destroy(&mut self) {
        log::info!("shutting down after {} frames", self.frames);
        self.graphics.shutdown();
    }
}
