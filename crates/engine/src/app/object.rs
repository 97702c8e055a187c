use std::fmt;

use super::rendering::{Color, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

/// Per-frame hook attached to a single object. Receives the object it is
/// attached to and may move it or rewrite its command.
pub trait InputController {
    fn update(&mut self, object: &mut GameObject);
}

/// Draws an object onto a surface.
pub trait Appearance {
    fn draw(&self, object: &GameObject, surface: &mut dyn Surface);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolidRect(pub Color);

impl Appearance for SolidRect {
    fn draw(&self, object: &GameObject, surface: &mut dyn Surface) {
        surface.set_fill_style(self.0);
        surface.fill_rect(object.x, object.y, object.width, object.height);
    }
}

#[derive(Default)]
pub struct GameObject {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub command: String,
    input: Option<Box<dyn InputController>>,
    appearance: Option<Box<dyn Appearance>>,
}

impl GameObject {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_input(mut self, controller: impl InputController + 'static) -> Self {
        self.input = Some(Box::new(controller));
        self
    }

    pub fn with_appearance(mut self, appearance: impl Appearance + 'static) -> Self {
        self.appearance = Some(Box::new(appearance));
        self
    }

    pub fn set_input(&mut self, controller: Option<Box<dyn InputController>>) {
        self.input = controller;
    }

    pub fn set_appearance(&mut self, appearance: Option<Box<dyn Appearance>>) {
        self.appearance = appearance;
    }

    pub fn has_input(&self) -> bool {
        self.input.is_some()
    }

    pub fn update(&mut self) {
        let Some(mut controller) = self.input.take() else {
            return;
        };
        controller.update(self);
        // A controller may install its own replacement while running.
        if self.input.is_none() {
            self.input = Some(controller);
        }
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        if let Some(appearance) = &self.appearance {
            appearance.draw(self, surface);
        }
    }
}

impl fmt::Debug for GameObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameObject")
            .field("x", &self.x)
            .field("y", &self.y)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("command", &self.command)
            .field("has_input", &self.input.is_some())
            .field("has_appearance", &self.appearance.is_some())
            .finish()
    }
}

#[derive(Debug, Default)]
pub(crate) struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

#[derive(Debug)]
struct ArenaEntry {
    id: EntityId,
    object: GameObject,
}

/// Single owner of every object in a scene. Ids are never reused and entries
/// stay sorted by id, so lookups are a binary search.
#[derive(Debug, Default)]
pub struct ObjectArena {
    allocator: EntityIdAllocator,
    entries: Vec<ArenaEntry>,
}

impl ObjectArena {
    pub fn insert(&mut self, object: GameObject) -> EntityId {
        let id = self.allocator.allocate();
        self.entries.push(ArenaEntry { id, object });
        id
    }

    pub fn remove(&mut self, id: EntityId) -> Option<GameObject> {
        let index = self.index_of(id)?;
        Some(self.entries.remove(index).object)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: EntityId) -> Option<&GameObject> {
        self.index_of(id).map(|index| &self.entries[index].object)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut GameObject> {
        self.index_of(id)
            .map(move |index| &mut self.entries[index].object)
    }

    /// Two distinct live objects borrowed mutably at once.
    pub fn pair_mut(
        &mut self,
        a: EntityId,
        b: EntityId,
    ) -> Option<(&mut GameObject, &mut GameObject)> {
        if a == b {
            return None;
        }
        let index_a = self.index_of(a)?;
        let index_b = self.index_of(b)?;
        if index_a < index_b {
            let (left, right) = self.entries.split_at_mut(index_b);
            Some((&mut left[index_a].object, &mut right[0].object))
        } else {
            let (left, right) = self.entries.split_at_mut(index_a);
            Some((&mut right[0].object, &mut left[index_b].object))
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entries
            .binary_search_by_key(&id.0, |entry| entry.id.0)
            .ok()
    }
}
