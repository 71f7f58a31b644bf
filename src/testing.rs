//! In-crate mock collaborators for tests

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use tokio::time::Instant;

use crate::{
    services::{Clock, Dialogs, ShutdownAction, WindowSurface},
    state::{Opacity, Point, Rect, ViewMode},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCall {
    Schedule(u64),
    Cancel,
}

pub struct MockShutdown {
    fail_schedule: bool,
    fail_cancel: bool,
    calls: Mutex<Vec<ShutdownCall>>,
}

impl MockShutdown {
    pub fn new() -> Self {
        Self {
            fail_schedule: false,
            fail_cancel: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_schedule() -> Self {
        Self {
            fail_schedule: true,
            ..Self::new()
        }
    }

    pub fn failing_cancel() -> Self {
        Self {
            fail_cancel: true,
            ..Self::new()
        }
    }

    pub fn calls(&self) -> Vec<ShutdownCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ShutdownAction for MockShutdown {
    async fn schedule(&self, seconds: u64) -> Result<(), String> {
        self.calls.lock().unwrap().push(ShutdownCall::Schedule(seconds));
        if self.fail_schedule {
            return Err("access denied".to_string());
        }
        Ok(())
    }

    async fn cancel(&self) -> Result<(), String> {
        self.calls.lock().unwrap().push(ShutdownCall::Cancel);
        if self.fail_cancel {
            return Err("no shutdown pending".to_string());
        }
        Ok(())
    }
}

/// Answers every confirmation the same way and records what was shown
pub struct MockDialogs {
    answer: bool,
    confirms: Mutex<Vec<String>>,
    infos: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl MockDialogs {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            confirms: Mutex::new(Vec::new()),
            infos: Mutex::new(Vec::new()),
            errors: Mutex::new(Vec::new()),
        }
    }

    pub fn confirm_titles(&self) -> Vec<String> {
        self.confirms.lock().unwrap().clone()
    }

    pub fn infos(&self) -> Vec<String> {
        self.infos.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dialogs for MockDialogs {
    async fn confirm(&self, title: &str, _message: &str) -> bool {
        self.confirms.lock().unwrap().push(title.to_string());
        self.answer
    }

    async fn notify_info(&self, title: &str, _message: &str) {
        self.infos.lock().unwrap().push(title.to_string());
    }

    async fn notify_error(&self, title: &str, _message: &str) {
        self.errors.lock().unwrap().push(title.to_string());
    }
}

pub struct MockWindow {
    pointer: Mutex<Point>,
    bounds: Rect,
    opacity: Mutex<Vec<Opacity>>,
    view_modes: Mutex<Vec<ViewMode>>,
}

impl MockWindow {
    pub fn new() -> Self {
        Self {
            pointer: Mutex::new(Point { x: 100, y: 100 }),
            bounds: Rect { x: 0, y: 0, width: 700, height: 560 },
            opacity: Mutex::new(Vec::new()),
            view_modes: Mutex::new(Vec::new()),
        }
    }

    pub fn move_pointer(&self, pointer: Point) {
        *self.pointer.lock().unwrap() = pointer;
    }

    pub fn last_opacity(&self) -> Option<Opacity> {
        self.opacity.lock().unwrap().last().copied()
    }

    pub fn opacity_writes(&self) -> usize {
        self.opacity.lock().unwrap().len()
    }

    pub fn view_modes(&self) -> Vec<ViewMode> {
        self.view_modes.lock().unwrap().clone()
    }
}

impl WindowSurface for MockWindow {
    fn pointer(&self) -> Point {
        *self.pointer.lock().unwrap()
    }

    fn bounds(&self) -> Rect {
        self.bounds
    }

    fn set_opacity(&self, opacity: Opacity) {
        self.opacity.lock().unwrap().push(opacity);
    }

    fn set_view_mode(&self, mode: ViewMode) {
        self.view_modes.lock().unwrap().push(mode);
    }
}

/// Wall clock pinned to 21:00:00 at creation that advances with tokio time,
/// so paused-time tests see a consistent "now"
pub struct TestClock {
    base: DateTime<Local>,
    started: Instant,
}

impl TestClock {
    pub fn new() -> Self {
        Self {
            base: Local.with_ymd_and_hms(2024, 3, 9, 21, 0, 0).unwrap(),
            started: Instant::now(),
        }
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Local> {
        let elapsed = chrono::Duration::from_std(self.started.elapsed()).unwrap();
        self.base + elapsed
    }
}
