use pico_engine::{GameObject, Group, Scene, SceneCommand, SceneWorld, SolidRect};

use super::{pip_x, FireLatch, PlayScene, SceneContext, PIP_COLOR, PIP_GAP, PIP_SIZE};

const PIPS_PER_ROW: u32 = 20;

/// Shows the final score as rows of pips until fire is pressed again.
pub(crate) struct GameOverScene {
    context: SceneContext,
    score: u32,
    fire: FireLatch,
}

impl GameOverScene {
    pub(crate) fn new(context: SceneContext, score: u32) -> Self {
        Self {
            context,
            score,
            fire: FireLatch::default(),
        }
    }
}

impl Scene for GameOverScene {
    fn create(&mut self, world: &mut SceneWorld) {
        let field = self.context.playfield;
        let row_width = pip_x(0.0, PIPS_PER_ROW) - PIP_GAP;
        let origin_x = ((field.width - row_width) / 2.0).max(0.0);
        let origin_y = field.height / 3.0;

        let mut pips = Group::new();
        for index in 0..self.score {
            let column = index % PIPS_PER_ROW;
            let row = index / PIPS_PER_ROW;
            let id = world.spawn(
                GameObject::new(
                    pip_x(origin_x, column),
                    origin_y + row as f32 * (PIP_SIZE + PIP_GAP),
                    PIP_SIZE,
                    PIP_SIZE,
                )
                .with_appearance(SolidRect(PIP_COLOR)),
            );
            pips.push(id);
        }
        let pips = world.spawn_group(pips);
        world.add(pips);
    }

    fn update(&mut self, _world: &mut SceneWorld) -> SceneCommand {
        if !self.fire.pressed(&self.context.input) {
            return SceneCommand::None;
        }
        SceneCommand::ChangeScene(Box::new(PlayScene::new(self.context.clone())))
    }

    fn name(&self) -> &str {
        "game_over"
    }
}
