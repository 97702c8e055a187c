use super::object::{EntityId, ObjectArena};
use super::rendering::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub u64);

/// Ordered view over objects owned elsewhere. `x`/`y` are nominal and are not
/// applied to members.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub x: f32,
    pub y: f32,
    slots: Vec<Option<EntityId>>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_members(members: impl IntoIterator<Item = EntityId>) -> Self {
        Self {
            slots: members.into_iter().map(Some).collect(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, id: EntityId) {
        self.slots.push(Some(id));
    }

    /// Empties the first slot holding `id`; later slots keep their positions.
    pub fn vacate(&mut self, id: EntityId) -> bool {
        match self.slots.iter_mut().find(|slot| **slot == Some(id)) {
            Some(slot) => {
                *slot = None;
                true
            }
            None => false,
        }
    }

    pub fn members(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.slots.iter().flatten().copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn update(&self, objects: &mut ObjectArena) {
        for id in self.members() {
            if let Some(object) = objects.get_mut(id) {
                object.update();
            }
        }
    }

    pub fn render(&self, objects: &ObjectArena, surface: &mut dyn Surface) {
        for id in self.members() {
            if let Some(object) = objects.get(id) {
                object.render(surface);
            }
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct GroupArena {
    next: u64,
    entries: Vec<(GroupId, Group)>,
}

impl GroupArena {
    pub(crate) fn insert(&mut self, group: Group) -> GroupId {
        let id = GroupId(self.next);
        self.next = self.next.saturating_add(1);
        self.entries.push((id, group));
        id
    }

    pub(crate) fn get(&self, id: GroupId) -> Option<&Group> {
        self.entries
            .iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, group)| group)
    }

    pub(crate) fn get_mut(&mut self, id: GroupId) -> Option<&mut Group> {
        self.entries
            .iter_mut()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, group)| group)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
