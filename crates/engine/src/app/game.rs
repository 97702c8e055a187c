use std::collections::BTreeSet;

use tracing::{debug, info};

use super::rendering::{Background, Surface};
use super::scene::{Scene, SceneCommand, SceneRuntime, SceneWorld};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}

#[derive(Debug, Default)]
pub struct FrameQueue {
    next: u64,
    pending: BTreeSet<FrameHandle>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> impl Iterator<Item = FrameHandle> + '_ {
        self.pending.iter().copied()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn take_due(&mut self) -> Option<FrameHandle> {
        self.pending.pop_first()
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next);
        self.next = self.next.saturating_add(1);
        self.pending.insert(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.remove(&handle);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Drives one active scene frame by frame. At most one frame request is
/// outstanding at any time, and only that request is honoured.
pub struct Game<S: FrameScheduler> {
    scheduler: S,
    runtime: SceneRuntime,
    background: Background,
    state: LoopState,
    pending: Option<FrameHandle>,
    frames_run: u64,
}

impl<S: FrameScheduler> Game<S> {
    pub fn new(scheduler: S, scene: Box<dyn Scene>) -> Self {
        Self::with_background(scheduler, scene, Background::default())
    }

    pub fn with_background(mut scheduler: S, scene: Box<dyn Scene>, background: Background) -> Self {
        let runtime = SceneRuntime::activate(scene, background.clone());
        info!(
            scene = runtime.scene.name(),
            entity_count = runtime.world.entity_count(),
            "scene_created"
        );
        let pending = Some(scheduler.request_frame());
        Self {
            scheduler,
            runtime,
            background,
            state: LoopState::Running,
            pending,
            frames_run: 0,
        }
    }

    pub fn on_frame(&mut self, handle: FrameHandle, surface: &mut dyn Surface) -> bool {
        if self.pending != Some(handle) {
            debug!(handle = handle.0, "stale_frame_ignored");
            return false;
        }
        self.scheduler.cancel_frame(handle);
        self.pending = None;

        match self.runtime.update(surface.size()) {
            SceneCommand::None => {}
            SceneCommand::ChangeScene(scene) => self.change_scene(scene),
            SceneCommand::Stop => {
                self.stop();
            }
        }
        self.runtime.render(surface);
        self.frames_run = self.frames_run.saturating_add(1);

        if self.state == LoopState::Running && self.pending.is_none() {
            self.pending = Some(self.scheduler.request_frame());
        }
        true
    }

    /// Returns false only when a frame request is already outstanding.
    pub fn start(&mut self) -> bool {
        if self.state == LoopState::Running && self.pending.is_some() {
            return false;
        }
        self.state = LoopState::Running;
        self.pending = Some(self.scheduler.request_frame());
        info!(frames_run = self.frames_run, "loop_started");
        true
    }

    pub fn stop(&mut self) -> bool {
        if self.state == LoopState::Stopped {
            return false;
        }
        self.state = LoopState::Stopped;
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel_frame(handle);
        }
        info!(frames_run = self.frames_run, "loop_stopped");
        true
    }

    pub fn change_scene(&mut self, scene: Box<dyn Scene>) {
        let previous = self.runtime.scene.name().to_string();
        self.runtime = SceneRuntime::activate(scene, self.background.clone());
        info!(
            from = %previous,
            to = self.runtime.scene.name(),
            entity_count = self.runtime.world.entity_count(),
            "scene_changed"
        );
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn frames_run(&self) -> u64 {
        self.frames_run
    }

    pub fn scene_name(&self) -> &str {
        self.runtime.scene.name()
    }

    pub fn world(&self) -> &SceneWorld {
        &self.runtime.world
    }

    pub fn world_mut(&mut self) -> &mut SceneWorld {
        &mut self.runtime.world
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn set_background(&mut self, background: Background) {
        self.runtime.world.set_background(background.clone());
        self.background = background;
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }
}
