use std::fmt;

use tracing::debug;

use super::group::{Group, GroupArena, GroupId};
use super::object::{EntityId, GameObject, ObjectArena};
use super::physics::{CollisionTarget, Physics, Scope};
use super::rendering::{Background, Surface, SurfaceSize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    Entity(EntityId),
    Group(GroupId),
}

impl From<EntityId> for Node {
    fn from(id: EntityId) -> Self {
        Node::Entity(id)
    }
}

impl From<GroupId> for Node {
    fn from(id: GroupId) -> Self {
        Node::Group(id)
    }
}

pub enum SceneCommand {
    None,
    ChangeScene(Box<dyn Scene>),
    Stop,
}

impl fmt::Debug for SceneCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneCommand::None => f.write_str("None"),
            SceneCommand::ChangeScene(scene) => {
                f.debug_tuple("ChangeScene").field(&scene.name()).finish()
            }
            SceneCommand::Stop => f.write_str("Stop"),
        }
    }
}

#[derive(Debug, Default)]
pub struct SceneWorld {
    objects: ObjectArena,
    children: Vec<EntityId>,
    groups: GroupArena,
    group_order: Vec<GroupId>,
    physics: Physics,
    background: Background,
}

impl SceneWorld {
    pub fn new(background: Background) -> Self {
        Self {
            background,
            ..Self::default()
        }
    }

    pub fn spawn(&mut self, object: GameObject) -> EntityId {
        self.objects.insert(object)
    }

    pub fn spawn_group(&mut self, group: Group) -> GroupId {
        self.groups.insert(group)
    }

    pub fn despawn(&mut self, id: EntityId) -> bool {
        if self.objects.remove(id).is_none() {
            return false;
        }
        self.children.retain(|child| *child != id);
        true
    }

    /// Adding a group copies its current members into the flat list; later
    /// membership changes do not reach it.
    pub fn add(&mut self, node: impl Into<Node>) {
        match node.into() {
            Node::Entity(id) => self.children.push(id),
            Node::Group(group_id) => {
                let Some(group) = self.groups.get(group_id) else {
                    debug!(group = group_id.0, "add_ignored_unknown_group");
                    return;
                };
                self.children.extend(group.members());
                self.group_order.push(group_id);
            }
        }
    }

    pub fn on_collide<T, F>(
        &mut self,
        a: EntityId,
        b: impl Into<Node>,
        scope: &Scope<T>,
        callback: F,
    ) where
        T: 'static,
        F: FnMut(&mut T, &mut GameObject, &mut GameObject) + 'static,
    {
        let b = b.into();
        if !self.objects.contains(a) {
            debug!(entity = a.0, target = ?b, "collision_registration_ignored");
            return;
        }
        let target = match b {
            Node::Entity(id) if self.objects.contains(id) => CollisionTarget::Single(id),
            Node::Group(group_id) => match self.groups.get(group_id) {
                Some(group) => CollisionTarget::Composite(group),
                None => {
                    debug!(entity = a.0, target = ?b, "collision_registration_ignored");
                    return;
                }
            },
            Node::Entity(_) => {
                debug!(entity = a.0, target = ?b, "collision_registration_ignored");
                return;
            }
        };
        self.physics.on_collide(a, target, scope, callback);
    }

    pub fn on_collide_walls<T, F>(&mut self, a: EntityId, scope: &Scope<T>, callback: F)
    where
        T: 'static,
        F: FnMut(&mut T, &mut GameObject) + 'static,
    {
        if !self.objects.contains(a) {
            debug!(entity = a.0, "collision_registration_ignored");
            return;
        }
        self.physics.on_collide_walls(a, scope, callback);
    }

    pub fn update(&mut self, bounds: SurfaceSize) {
        for id in &self.children {
            if let Some(object) = self.objects.get_mut(*id) {
                object.update();
            }
        }
        for group_id in &self.group_order {
            if let Some(group) = self.groups.get(*group_id) {
                group.update(&mut self.objects);
            }
        }
        self.physics.update(&mut self.objects, bounds);
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        self.render_background(surface);
        for id in &self.children {
            if let Some(object) = self.objects.get(*id) {
                object.render(surface);
            }
        }
        for group_id in &self.group_order {
            if let Some(group) = self.groups.get(*group_id) {
                group.render(&self.objects, surface);
            }
        }
    }

    fn render_background(&self, surface: &mut dyn Surface) {
        let width = surface.width() as f32;
        let height = surface.height() as f32;
        match &self.background {
            Background::Color(color) => {
                surface.clear_rect(0.0, 0.0, width, height);
                surface.set_fill_style(*color);
                surface.fill_rect(0.0, 0.0, width, height);
            }
            Background::Image(source) => surface.draw_image(source, 0.0, 0.0, width, height),
        }
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn set_background(&mut self, background: Background) {
        self.background = background;
    }

    pub fn object(&self, id: EntityId) -> Option<&GameObject> {
        self.objects.get(id)
    }

    pub fn object_mut(&mut self, id: EntityId) -> Option<&mut GameObject> {
        self.objects.get_mut(id)
    }

    pub fn objects(&self) -> &ObjectArena {
        &self.objects
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id)
    }

    pub fn group_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.groups.get_mut(id)
    }

    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    pub fn groups(&self) -> &[GroupId] {
        &self.group_order
    }

    pub fn physics(&self) -> &Physics {
        &self.physics
    }

    pub fn entity_count(&self) -> usize {
        self.objects.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

pub trait Scene {
    fn create(&mut self, _world: &mut SceneWorld) {}

    fn update(&mut self, _world: &mut SceneWorld) -> SceneCommand {
        SceneCommand::None
    }

    fn name(&self) -> &str {
        "scene"
    }
}

pub(crate) struct SceneRuntime {
    pub(crate) scene: Box<dyn Scene>,
    pub(crate) world: SceneWorld,
}

impl SceneRuntime {
    pub(crate) fn activate(mut scene: Box<dyn Scene>, background: Background) -> Self {
        let mut world = SceneWorld::new(background);
        scene.create(&mut world);
        Self { scene, world }
    }

    pub(crate) fn update(&mut self, bounds: SurfaceSize) -> SceneCommand {
        self.world.update(bounds);
        self.scene.update(&mut self.world)
    }

    pub(crate) fn render(&self, surface: &mut dyn Surface) {
        self.world.render(surface);
    }
}
