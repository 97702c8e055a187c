use pico_engine::{Color, InputAction, InputHandle, LoopConfig};
use rand::Rng;

use super::config::Tuning;

mod game_over;
mod play;
mod title;

pub(crate) use game_over::GameOverScene;
pub(crate) use play::PlayScene;
pub(crate) use title::TitleScene;

const SHIP_COLOR: Color = Color([0x4c, 0xc9, 0xf0, 0xff]);
const METEOR_COLOR: Color = Color([0xb0, 0x6a, 0x3b, 0xff]);
const PLANET_COLOR: Color = Color([0x2e, 0x8b, 0x57, 0xff]);
const PIP_COLOR: Color = Color::WHITE;
const PIP_SIZE: f32 = 6.0;
const PIP_GAP: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Playfield {
    pub(crate) width: f32,
    pub(crate) height: f32,
}

impl Playfield {
    pub(crate) fn from_config(config: &LoopConfig) -> Self {
        Self {
            width: config.surface_width.max(1) as f32,
            height: config.surface_height.max(1) as f32,
        }
    }
}

/// Everything a scene needs to build the next one.
#[derive(Debug, Clone)]
pub(crate) struct SceneContext {
    pub(crate) input: InputHandle,
    pub(crate) tuning: Tuning,
    pub(crate) playfield: Playfield,
    pub(crate) seed: u64,
}

/// Edge detector for the fire key. Starts disarmed so a press held over from
/// the previous scene does not count.
#[derive(Debug, Default)]
pub(crate) struct FireLatch {
    armed: bool,
}

impl FireLatch {
    pub(crate) fn pressed(&mut self, input: &InputHandle) -> bool {
        if !input.is_down(InputAction::Fire) {
            self.armed = true;
            return false;
        }
        let fired = self.armed;
        self.armed = false;
        fired
    }
}

/// Inclusive on both ends.
pub(crate) fn random_int(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    let low = min.ceil() as i64;
    let high = max.floor() as i64;
    if high <= low {
        return low as f32;
    }
    rng.gen_range(low..=high) as f32
}

/// Top-left x of pip `index` in a row of pips starting at `origin_x`.
pub(crate) fn pip_x(origin_x: f32, index: u32) -> f32 {
    origin_x + index as f32 * (PIP_SIZE + PIP_GAP)
}
