use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::group::Group;
use super::object::{EntityId, GameObject, ObjectArena};
use super::rendering::SurfaceSize;

pub type Scope<T> = Rc<RefCell<T>>;

type PairCallback = Rc<RefCell<dyn FnMut(&mut GameObject, &mut GameObject)>>;
type WallCallback = Box<dyn FnMut(&mut GameObject)>;

#[derive(Debug, Clone, Copy)]
pub enum CollisionTarget<'g> {
    Single(EntityId),
    Composite(&'g Group),
}

struct PairEntry {
    a: EntityId,
    b: EntityId,
    callback: PairCallback,
}

struct WallEntry {
    a: EntityId,
    callback: WallCallback,
}

/// Two registries evaluated once per frame: object-vs-object and
/// object-vs-surface-bounds. Entries are never removed and never deduplicated.
#[derive(Default)]
pub struct Physics {
    pair_entries: Vec<PairEntry>,
    wall_entries: Vec<WallEntry>,
}

impl Physics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group targets expand to their members at registration time.
    pub fn on_collide<T, F>(
        &mut self,
        a: EntityId,
        target: CollisionTarget<'_>,
        scope: &Scope<T>,
        callback: F,
    ) where
        T: 'static,
        F: FnMut(&mut T, &mut GameObject, &mut GameObject) + 'static,
    {
        let scope = Rc::clone(scope);
        let mut callback = callback;
        let shared: PairCallback = Rc::new(RefCell::new(
            move |object_a: &mut GameObject, object_b: &mut GameObject| {
                callback(&mut *scope.borrow_mut(), object_a, object_b);
            },
        ));

        match target {
            CollisionTarget::Single(b) => self.pair_entries.push(PairEntry {
                a,
                b,
                callback: shared,
            }),
            CollisionTarget::Composite(group) => {
                for b in group.members() {
                    self.pair_entries.push(PairEntry {
                        a,
                        b,
                        callback: Rc::clone(&shared),
                    });
                }
            }
        }
    }

    pub fn on_collide_walls<T, F>(&mut self, a: EntityId, scope: &Scope<T>, callback: F)
    where
        T: 'static,
        F: FnMut(&mut T, &mut GameObject) + 'static,
    {
        let scope = Rc::clone(scope);
        let mut callback = callback;
        self.wall_entries.push(WallEntry {
            a,
            callback: Box::new(move |object: &mut GameObject| {
                callback(&mut *scope.borrow_mut(), object);
            }),
        });
    }

    pub fn update(&mut self, objects: &mut ObjectArena, bounds: SurfaceSize) {
        for entry in &self.pair_entries {
            let qualifies = match (objects.get(entry.a), objects.get(entry.b)) {
                (Some(a), Some(b)) => overlaps(a, b, bounds),
                _ => false,
            };
            if !qualifies {
                continue;
            }
            if let Some((a, b)) = objects.pair_mut(entry.a, entry.b) {
                let mut callback = entry.callback.borrow_mut();
                (*callback)(a, b);
            }
        }

        for entry in &mut self.wall_entries {
            let Some(a) = objects.get_mut(entry.a) else {
                continue;
            };
            if crosses_walls(a, bounds) {
                (entry.callback)(a);
            }
        }
    }

    pub fn pair_entry_count(&self) -> usize {
        self.pair_entries.len()
    }

    pub fn wall_entry_count(&self) -> usize {
        self.wall_entries.len()
    }
}

impl fmt::Debug for Physics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Physics")
            .field("pair_entries", &self.pair_entries.len())
            .field("wall_entries", &self.wall_entries.len())
            .finish()
    }
}

pub fn anchor_within(object: &GameObject, bounds: SurfaceSize) -> bool {
    object.x >= 0.0 && object.x <= bounds.width && object.y >= 0.0 && object.y <= bounds.height
}

/// Directional overlap test: `a`'s right edge must fall strictly inside `b`'s
/// horizontal span, and both anchors must sit on the surface. Swapping the
/// arguments can change the result.
pub fn overlaps(a: &GameObject, b: &GameObject, bounds: SurfaceSize) -> bool {
    anchor_within(a, bounds)
        && anchor_within(b, bounds)
        && a.x + a.width > b.x
        && a.x + a.width < b.x + b.width
        && a.y + a.height > b.y
        && a.y < b.y + b.height
}

/// The right edge counts as crossed on equality; the other edges do not.
pub fn crosses_walls(a: &GameObject, bounds: SurfaceSize) -> bool {
    a.y < 0.0 || a.y + a.height > bounds.height || a.x < 0.0 || a.x + a.width >= bounds.width
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: SurfaceSize = SurfaceSize {
        width: 100.0,
        height: 100.0,
    };

    #[derive(Debug, Default)]
    struct HitLog {
        pairs: Vec<(f32, f32)>,
        walls: Vec<f32>,
    }

    fn scope() -> Scope<HitLog> {
        Rc::new(RefCell::new(HitLog::default()))
    }

    fn record_pair(log: &mut HitLog, a: &mut GameObject, b: &mut GameObject) {
        log.pairs.push((a.x, b.x));
    }

    fn record_wall(log: &mut HitLog, a: &mut GameObject) {
        log.walls.push(a.x);
    }

    #[test]
    fn overlap_fires_for_a_approaching_from_top_left() {
        let mut objects = ObjectArena::default();
        let a = objects.insert(GameObject::new(0.0, 0.0, 10.0, 10.0));
        let b = objects.insert(GameObject::new(5.0, 5.0, 10.0, 10.0));
        let log = scope();
        let mut physics = Physics::new();
        physics.on_collide(a, CollisionTarget::Single(b), &log, record_pair);

        physics.update(&mut objects, BOUNDS);

        assert_eq!(log.borrow().pairs, vec![(0.0, 5.0)]);
    }

    #[test]
    fn swapped_overlap_check_is_evaluated_independently() {
        let mut objects = ObjectArena::default();
        let a = objects.insert(GameObject::new(0.0, 0.0, 10.0, 10.0));
        let b = objects.insert(GameObject::new(5.0, 5.0, 10.0, 10.0));
        let log = scope();
        let mut physics = Physics::new();
        physics.on_collide(b, CollisionTarget::Single(a), &log, record_pair);

        physics.update(&mut objects, BOUNDS);

        // b's right edge (15) is not inside a's span (0..10).
        assert!(log.borrow().pairs.is_empty());
        let (oa, ob) = (objects.get(a).expect("a"), objects.get(b).expect("b"));
        assert!(overlaps(oa, ob, BOUNDS));
        assert!(!overlaps(ob, oa, BOUNDS));
    }

    #[test]
    fn negative_anchor_exempts_pair_even_when_rectangles_intersect() {
        let mut objects = ObjectArena::default();
        let a = objects.insert(GameObject::new(-1.0, 5.0, 10.0, 10.0));
        let b = objects.insert(GameObject::new(5.0, 5.0, 10.0, 10.0));
        let log = scope();
        let mut physics = Physics::new();
        physics.on_collide(a, CollisionTarget::Single(b), &log, record_pair);

        physics.update(&mut objects, BOUNDS);

        assert!(log.borrow().pairs.is_empty());
    }

    #[test]
    fn target_anchor_off_surface_exempts_pair() {
        let mut objects = ObjectArena::default();
        let a = objects.insert(GameObject::new(0.0, 0.0, 10.0, 10.0));
        let above = objects.insert(GameObject::new(5.0, -1.0, 10.0, 10.0));
        let edge = objects.insert(GameObject::new(95.0, 5.0, 10.0, 10.0));
        let past_right = objects.insert(GameObject::new(101.0, 5.0, 10.0, 10.0));
        let log = scope();
        let mut physics = Physics::new();
        physics.on_collide(a, CollisionTarget::Single(above), &log, record_pair);
        physics.on_collide(edge, CollisionTarget::Single(past_right), &log, record_pair);

        physics.update(&mut objects, BOUNDS);

        assert!(log.borrow().pairs.is_empty());
        let (oa, ob) = (
            objects.get(a).expect("a"),
            objects.get(above).expect("above"),
        );
        // The rectangles do meet once the anchor gate is ignored.
        assert!(oa.x + oa.width > ob.x && oa.y < ob.y + ob.height);
        assert!(!overlaps(oa, ob, BOUNDS));
    }

    #[test]
    fn anchor_on_far_edge_is_still_inside() {
        let at_edge = GameObject::new(100.0, 100.0, 1.0, 1.0);
        let past_edge = GameObject::new(100.5, 0.0, 1.0, 1.0);
        assert!(anchor_within(&at_edge, BOUNDS));
        assert!(!anchor_within(&past_edge, BOUNDS));
    }

    #[test]
    fn left_wall_triggers_on_negative_x() {
        let mut objects = ObjectArena::default();
        let a = objects.insert(GameObject::new(-1.0, 5.0, 10.0, 10.0));
        let log = scope();
        let mut physics = Physics::new();
        physics.on_collide_walls(a, &log, record_wall);

        physics.update(&mut objects, BOUNDS);

        assert_eq!(log.borrow().walls, vec![-1.0]);
    }

    #[test]
    fn right_wall_triggers_on_edge_equality_only_from_that_side() {
        let mut objects = ObjectArena::default();
        let touching = objects.insert(GameObject::new(90.0, 5.0, 10.0, 10.0));
        let inside = objects.insert(GameObject::new(89.0, 5.0, 10.0, 10.0));
        let log = scope();
        let mut physics = Physics::new();
        physics.on_collide_walls(touching, &log, record_wall);
        physics.on_collide_walls(inside, &log, record_wall);

        physics.update(&mut objects, BOUNDS);

        assert_eq!(log.borrow().walls, vec![90.0]);
    }

    #[test]
    fn bottom_wall_uses_strict_comparison() {
        let flush = GameObject::new(5.0, 90.0, 10.0, 10.0);
        let over = GameObject::new(5.0, 90.5, 10.0, 10.0);
        let above = GameObject::new(5.0, -0.5, 10.0, 10.0);
        assert!(!crosses_walls(&flush, BOUNDS));
        assert!(crosses_walls(&over, BOUNDS));
        assert!(crosses_walls(&above, BOUNDS));
    }

    #[test]
    fn duplicate_registration_fires_twice_per_frame() {
        let mut objects = ObjectArena::default();
        let a = objects.insert(GameObject::new(0.0, 0.0, 10.0, 10.0));
        let b = objects.insert(GameObject::new(5.0, 5.0, 10.0, 10.0));
        let log = scope();
        let mut physics = Physics::new();
        physics.on_collide(a, CollisionTarget::Single(b), &log, record_pair);
        physics.on_collide(a, CollisionTarget::Single(b), &log, record_pair);

        physics.update(&mut objects, BOUNDS);

        assert_eq!(log.borrow().pairs.len(), 2);
        assert_eq!(physics.pair_entry_count(), 2);
    }

    #[test]
    fn composite_target_expands_to_current_members_only() {
        let mut objects = ObjectArena::default();
        let a = objects.insert(GameObject::new(0.0, 0.0, 10.0, 10.0));
        let first = objects.insert(GameObject::new(5.0, 5.0, 10.0, 10.0));
        let second = objects.insert(GameObject::new(8.0, 0.0, 10.0, 10.0));
        let late = objects.insert(GameObject::new(6.0, 1.0, 10.0, 10.0));
        let mut group = Group::with_members([first, second]);
        let log = scope();
        let mut physics = Physics::new();
        physics.on_collide(a, CollisionTarget::Composite(&group), &log, record_pair);
        group.push(late);

        physics.update(&mut objects, BOUNDS);

        assert_eq!(physics.pair_entry_count(), 2);
        assert_eq!(log.borrow().pairs, vec![(0.0, 5.0), (0.0, 8.0)]);
    }

    #[test]
    fn callbacks_run_in_registration_order_and_may_move_objects() {
        let mut objects = ObjectArena::default();
        let a = objects.insert(GameObject::new(0.0, 0.0, 10.0, 10.0));
        let b = objects.insert(GameObject::new(5.0, 5.0, 10.0, 10.0));
        let log = scope();
        let mut physics = Physics::new();
        physics.on_collide(a, CollisionTarget::Single(b), &log, |log: &mut HitLog, _a, b| {
            log.pairs.push((-1.0, b.x));
            b.x = 50.0;
        });
        physics.on_collide(a, CollisionTarget::Single(b), &log, record_pair);

        physics.update(&mut objects, BOUNDS);

        // The second entry sees the moved object and no longer qualifies.
        assert_eq!(log.borrow().pairs, vec![(-1.0, 5.0)]);
        assert_eq!(objects.get(b).map(|object| object.x), Some(50.0));
    }

    #[test]
    fn entries_for_removed_objects_are_skipped() {
        let mut objects = ObjectArena::default();
        let a = objects.insert(GameObject::new(-5.0, 0.0, 10.0, 10.0));
        let b = objects.insert(GameObject::new(5.0, 5.0, 10.0, 10.0));
        let log = scope();
        let mut physics = Physics::new();
        physics.on_collide(a, CollisionTarget::Single(b), &log, record_pair);
        physics.on_collide_walls(a, &log, record_wall);
        objects.remove(a);

        physics.update(&mut objects, BOUNDS);

        let log = log.borrow();
        assert!(log.pairs.is_empty());
        assert!(log.walls.is_empty());
    }

    #[test]
    fn self_pair_never_qualifies() {
        let mut objects = ObjectArena::default();
        let a = objects.insert(GameObject::new(10.0, 10.0, 10.0, 10.0));
        let log = scope();
        let mut physics = Physics::new();
        physics.on_collide(a, CollisionTarget::Single(a), &log, record_pair);

        physics.update(&mut objects, BOUNDS);

        assert!(log.borrow().pairs.is_empty());
    }
}
