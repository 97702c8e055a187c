use std::cell::RefCell;
use std::rc::Rc;

use pico_engine::{
    Appearance, EntityId, GameObject, Group, InputController, KeyboardController, Scene,
    SceneCommand, SceneWorld, Scope, SolidRect, Surface,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use super::{
    pip_x, random_int, GameOverScene, Playfield, SceneContext, METEOR_COLOR, PIP_COLOR, PIP_SIZE,
    SHIP_COLOR,
};

const SHIP_WIDTH: f32 = 16.0;
const SHIP_HEIGHT: f32 = 10.0;
const SHIP_FLOOR_GAP: f32 = 12.0;
const METEOR_SIZE: f32 = 10.0;
const MAX_PIPS: u32 = 12;

/// Shared by the play scene, its collision callbacks and the score display.
#[derive(Debug)]
pub(crate) struct PlayState {
    pub(crate) rng: StdRng,
    pub(crate) playfield: Playfield,
    pub(crate) score: u32,
    pub(crate) hit: bool,
}

impl PlayState {
    fn new(seed: u64, playfield: Playfield) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            playfield,
            score: 0,
            hit: false,
        }
    }
}

struct Fall {
    speed: f32,
}

impl InputController for Fall {
    fn update(&mut self, object: &mut GameObject) {
        object.y += self.speed;
    }
}

struct ScorePips(Scope<PlayState>);

impl Appearance for ScorePips {
    fn draw(&self, object: &GameObject, surface: &mut dyn Surface) {
        let score = self.0.borrow().score;
        surface.set_fill_style(PIP_COLOR);
        for index in 0..score.min(MAX_PIPS) {
            surface.fill_rect(pip_x(object.x, index), object.y, PIP_SIZE, PIP_SIZE);
        }
    }
}

fn mark_hit(state: &mut PlayState, _a: &mut GameObject, _b: &mut GameObject) {
    state.hit = true;
}

fn keep_ship_inside(state: &mut PlayState, ship: &mut GameObject) {
    let field = state.playfield;
    // The right edge counts as a wall on contact, so stay one pixel clear of it.
    ship.x = ship.x.clamp(0.0, (field.width - ship.width - 1.0).max(0.0));
    ship.y = ship.y.clamp(0.0, (field.height - ship.height).max(0.0));
}

fn respawn_meteor(state: &mut PlayState, meteor: &mut GameObject) {
    if meteor.y + meteor.height > state.playfield.height {
        state.score = state.score.saturating_add(1);
    }
    meteor.y = 0.0;
    meteor.x = random_int(
        &mut state.rng,
        0.0,
        state.playfield.width - meteor.width - 1.0,
    );
}

pub(crate) struct PlayScene {
    context: SceneContext,
    state: Scope<PlayState>,
}

impl PlayScene {
    pub(crate) fn new(context: SceneContext) -> Self {
        let state = PlayState::new(context.seed, context.playfield);
        Self {
            context,
            state: Rc::new(RefCell::new(state)),
        }
    }

    pub(crate) fn state(&self) -> Scope<PlayState> {
        Rc::clone(&self.state)
    }
}

impl Scene for PlayScene {
    fn create(&mut self, world: &mut SceneWorld) {
        let field = self.context.playfield;
        let tuning = self.context.tuning;

        let ship = world.spawn(
            GameObject::new(
                field.width / 2.0 - SHIP_WIDTH / 2.0,
                field.height - SHIP_HEIGHT - SHIP_FLOOR_GAP,
                SHIP_WIDTH,
                SHIP_HEIGHT,
            )
            .with_input(KeyboardController::new(
                self.context.input.clone(),
                tuning.ship_speed,
            ))
            .with_appearance(SolidRect(SHIP_COLOR)),
        );
        world.add(ship);

        let mut meteors = Group::new();
        {
            let mut state = self.state.borrow_mut();
            for _ in 0..tuning.meteor_count {
                let x = random_int(&mut state.rng, 0.0, field.width - METEOR_SIZE - 1.0);
                let y = random_int(&mut state.rng, 0.0, field.height / 2.0);
                let id = world.spawn(
                    GameObject::new(x, y, METEOR_SIZE, METEOR_SIZE)
                        .with_input(Fall {
                            speed: tuning.meteor_speed,
                        })
                        .with_appearance(SolidRect(METEOR_COLOR)),
                );
                meteors.push(id);
            }
        }
        let member_ids: Vec<EntityId> = meteors.members().collect();
        let meteors = world.spawn_group(meteors);
        // Grouped objects are visited by both traversals, so meteors fall at
        // twice their per-update speed.
        world.add(meteors);

        // The overlap test is one-sided; register both directions.
        world.on_collide(ship, meteors, &self.state, mark_hit);
        for id in member_ids {
            world.on_collide(id, ship, &self.state, mark_hit);
            world.on_collide_walls(id, &self.state, respawn_meteor);
        }
        world.on_collide_walls(ship, &self.state, keep_ship_inside);

        let score = world.spawn(
            GameObject::new(4.0, 4.0, 0.0, 0.0).with_appearance(ScorePips(self.state())),
        );
        world.add(score);
    }

    fn update(&mut self, _world: &mut SceneWorld) -> SceneCommand {
        let mut state = self.state.borrow_mut();
        if !state.hit {
            return SceneCommand::None;
        }
        info!(score = state.score, "run_ended");
        let mut context = self.context.clone();
        context.seed = state.rng.gen();
        SceneCommand::ChangeScene(Box::new(GameOverScene::new(context, state.score)))
    }

    fn name(&self) -> &str {
        "play"
    }
}
