use pico_engine::{GameObject, Group, Scene, SceneCommand, SceneWorld, SolidRect};
use tracing::info;

use super::{FireLatch, PlayScene, SceneContext, PLANET_COLOR, SHIP_COLOR};

pub(crate) struct TitleScene {
    context: SceneContext,
    fire: FireLatch,
}

impl TitleScene {
    pub(crate) fn new(context: SceneContext) -> Self {
        Self {
            context,
            fire: FireLatch::default(),
        }
    }
}

impl Scene for TitleScene {
    fn create(&mut self, world: &mut SceneWorld) {
        let field = self.context.playfield;
        let planet = world.spawn(
            GameObject::new(0.0, field.height * 0.75, field.width, field.height * 0.25)
                .with_appearance(SolidRect(PLANET_COLOR)),
        );
        let ship = world.spawn(
            GameObject::new(field.width / 2.0 - 8.0, field.height / 2.0, 16.0, 10.0)
                .with_appearance(SolidRect(SHIP_COLOR)),
        );
        let backdrop = world.spawn_group(Group::with_members([planet, ship]));
        world.add(backdrop);
    }

    fn update(&mut self, _world: &mut SceneWorld) -> SceneCommand {
        if !self.fire.pressed(&self.context.input) {
            return SceneCommand::None;
        }
        info!("run_started");
        SceneCommand::ChangeScene(Box::new(PlayScene::new(self.context.clone())))
    }

    fn name(&self) -> &str {
        "title"
    }
}
