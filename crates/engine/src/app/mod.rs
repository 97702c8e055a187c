mod game;
mod group;
mod input;
mod loop_runner;
mod metrics;
mod object;
mod physics;
mod rendering;
mod scene;
#[cfg(test)]
mod test_support;

pub use game::{FrameHandle, FrameQueue, FrameScheduler, Game, LoopState};
pub use group::{Group, GroupId};
pub use input::{ActionStates, InputAction, InputHandle, KeyboardController};
pub use loop_runner::{run_app, AppError, LoopConfig, BACKGROUND_ENV_VAR};
pub use object::{Appearance, EntityId, GameObject, InputController, ObjectArena, SolidRect};
pub use physics::{anchor_within, crosses_walls, overlaps, CollisionTarget, Physics, Scope};
pub use rendering::{
    Background, Color, ColorParseError, FrameSurface, ImageCache, Renderer, Surface, SurfaceSize,
};
pub use scene::{Node, Scene, SceneCommand, SceneWorld};
