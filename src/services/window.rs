//! Window surface driven by a remote front-end

use std::sync::Mutex;

use serde::Serialize;
use tracing::{debug, error};

use super::WindowSurface;
use crate::state::{Opacity, Point, Rect, ViewMode};

const FULL_SIZE: (i32, i32) = (700, 560);
const TIMER_SIZE: (i32, i32) = (380, 240);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowStatus {
    pub pointer: Point,
    pub bounds: Rect,
    pub opacity: Opacity,
    pub alpha: f32,
    pub view_mode: ViewMode,
}

/// Pointer and bounds are reported by the front-end; opacity and view mode
/// are recorded here for it to apply.
pub struct RemoteWindow {
    status: Mutex<WindowStatus>,
}

impl RemoteWindow {
    pub fn new() -> Self {
        Self {
            status: Mutex::new(WindowStatus {
                pointer: Point::default(),
                bounds: Rect { x: 0, y: 0, width: FULL_SIZE.0, height: FULL_SIZE.1 },
                opacity: Opacity::Visible,
                alpha: Opacity::Visible.alpha(),
                view_mode: ViewMode::Full,
            }),
        }
    }

    pub fn status(&self) -> Option<WindowStatus> {
        self.status.lock().ok().map(|s| *s)
    }

    pub fn report_pointer(&self, pointer: Point) {
        self.update(|s| s.pointer = pointer);
    }

    pub fn report_bounds(&self, bounds: Rect) {
        self.update(|s| s.bounds = bounds);
    }

    fn update<F>(&self, updater: F)
    where
        F: FnOnce(&mut WindowStatus),
    {
        match self.status.lock() {
            Ok(mut status) => updater(&mut status),
            Err(e) => error!("Failed to lock window status: {}", e),
        }
    }
}

impl Default for RemoteWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowSurface for RemoteWindow {
    fn pointer(&self) -> Point {
        self.status().map(|s| s.pointer).unwrap_or_default()
    }

    fn bounds(&self) -> Rect {
        self.status().map(|s| s.bounds).unwrap_or_default()
    }

    fn set_opacity(&self, opacity: Opacity) {
        self.update(|s| {
            s.opacity = opacity;
            s.alpha = opacity.alpha();
        });
    }

    fn set_view_mode(&self, mode: ViewMode) {
        let (width, height) = match mode {
            ViewMode::Full => FULL_SIZE,
            ViewMode::TimerCompact => TIMER_SIZE,
        };
        self.update(|s| {
            // Resize around the current centre
            let center = s.bounds.center();
            s.bounds = Rect {
                x: center.x - width / 2,
                y: center.y - height / 2,
                width,
                height,
            };
            s.view_mode = mode;
        });
        debug!("Window view mode set to {:?}", mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_mode_resizes_around_center() {
        let window = RemoteWindow::new();
        window.report_bounds(Rect { x: 100, y: 100, width: 700, height: 560 });

        window.set_view_mode(ViewMode::TimerCompact);
        let status = window.status().unwrap();
        assert_eq!(status.bounds, Rect { x: 260, y: 260, width: 380, height: 240 });
        assert_eq!(status.view_mode, ViewMode::TimerCompact);

        window.set_view_mode(ViewMode::Full);
        assert_eq!(window.bounds(), Rect { x: 100, y: 100, width: 700, height: 560 });
    }

    #[test]
    fn opacity_is_recorded() {
        let window = RemoteWindow::new();
        window.set_opacity(Opacity::Hidden);
        let status = window.status().unwrap();
        assert_eq!(status.opacity, Opacity::Hidden);
        assert_eq!(status.alpha, 0.0);
    }
}
