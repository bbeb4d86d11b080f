//! Contact transitions and the listener registry.
//!
//! Each tick's ray hits are folded into a [`ContactSet`] (one entry per collider) and
//! diffed against the previous tick's set:
//! - present in both: `Stay`
//! - present only now: `Enter`
//! - present only before: `Exit`
//!
//! Enters and Stays come first, in contact-set order, followed by Exits in the order
//! the previous tick saw them.

use std::rc::Rc;

use log::debug;

use crate::collision::{ColliderId, RayHit};
use crate::controller::Controller;

/// A contact transition for one collider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CollisionEvent {
    Enter(RayHit),
    Stay(RayHit),
    /// Carries the last hit seen for the collider.
    Exit(RayHit),
}

impl CollisionEvent {
    #[inline]
    pub fn hit(&self) -> &RayHit {
        match self {
            CollisionEvent::Enter(hit) | CollisionEvent::Stay(hit) | CollisionEvent::Exit(hit) => {
                hit
            }
        }
    }

    #[inline]
    pub fn collider(&self) -> ColliderId {
        self.hit().collider
    }
}

/// Observer of a controller. Every callback defaults to doing nothing.
///
/// Callbacks receive the controller read-only; a listener cannot register or remove
/// listeners while being notified.
pub trait ControllerListener {
    /// A jump was performed.
    fn on_jump(&self, _controller: &Controller) {}

    /// A ray hit something. Fired for every hit, before the per-axis clamp, and purely
    /// observational.
    fn on_pre_collision(&self, _controller: &Controller, _hit: &RayHit) {}

    /// Fired once per distinct collider after the entity has moved.
    fn on_post_collision(&self, _controller: &Controller, _hit: &RayHit) {}

    /// Enter, stay or exit for one collider.
    fn on_collision(&self, _controller: &Controller, _event: &CollisionEvent) {}
}

/// Hits deduplicated by collider, first hit wins, in ray order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContactSet {
    contacts: Vec<RayHit>,
}

impl ContactSet {
    pub fn from_hits(hits: &[RayHit]) -> Self {
        let mut set = Self::default();
        for hit in hits {
            set.insert(*hit);
        }
        set
    }

    /// Insert a hit unless its collider is already present. Returns whether it was added.
    pub fn insert(&mut self, hit: RayHit) -> bool {
        if self.contains(hit.collider) {
            return false;
        }
        self.contacts.push(hit);
        true
    }

    #[inline]
    pub fn contains(&self, collider: ColliderId) -> bool {
        self.contacts.iter().any(|c| c.collider == collider)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &RayHit> {
        self.contacts.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

/// Owns the listener registry and last tick's contacts.
#[derive(Default)]
pub struct CollisionEventDispatcher {
    listeners: Vec<Rc<dyn ControllerListener>>,
    contacts: ContactSet,
}

impl CollisionEventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Returns `false` if it was already registered.
    pub fn add_listener(&mut self, listener: Rc<dyn ControllerListener>) -> bool {
        if self.listeners.iter().any(|l| Rc::ptr_eq(l, &listener)) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Unregister a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&mut self, listener: &Rc<dyn ControllerListener>) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| !Rc::ptr_eq(l, listener));
        self.listeners.len() != before
    }

    #[inline]
    pub fn listeners(&self) -> &[Rc<dyn ControllerListener>] {
        &self.listeners
    }

    /// Contacts recorded by the most recent `diff`.
    #[inline]
    pub fn contacts(&self) -> &ContactSet {
        &self.contacts
    }

    /// Replace the recorded contacts with `current` and return the transitions.
    pub fn diff(&mut self, current: ContactSet) -> Vec<CollisionEvent> {
        let previous = std::mem::replace(&mut self.contacts, current);

        let mut events = Vec::with_capacity(self.contacts.len() + previous.len());
        for hit in self.contacts.iter() {
            if previous.contains(hit.collider) {
                events.push(CollisionEvent::Stay(*hit));
            } else {
                debug!("collision enter {:?}", hit.collider);
                events.push(CollisionEvent::Enter(*hit));
            }
        }
        for hit in previous.iter() {
            if !self.contacts.contains(hit.collider) {
                debug!("collision exit {:?}", hit.collider);
                events.push(CollisionEvent::Exit(*hit));
            }
        }
        events
    }
}

impl std::fmt::Debug for CollisionEventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollisionEventDispatcher")
            .field("listeners", &self.listeners.len())
            .field("contacts", &self.contacts)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::Vec3;

    fn hit(id: u64, distance: f32) -> RayHit {
        RayHit {
            collider: ColliderId(id),
            point: Vec3::zeros(),
            normal: Vec3::y(),
            distance,
        }
    }

    fn kinds(events: &[CollisionEvent]) -> Vec<(&'static str, u64)> {
        events
            .iter()
            .map(|e| {
                let kind = match e {
                    CollisionEvent::Enter(_) => "enter",
                    CollisionEvent::Stay(_) => "stay",
                    CollisionEvent::Exit(_) => "exit",
                };
                (kind, e.collider().0)
            })
            .collect()
    }

    struct Nobody;
    impl ControllerListener for Nobody {}

    #[test]
    fn contact_set_keeps_the_first_hit_per_collider() {
        let set = ContactSet::from_hits(&[hit(1, 0.5), hit(2, 0.7), hit(1, 0.2)]);

        assert_eq!(set.len(), 2);
        let distances: Vec<_> = set.iter().map(|h| h.distance).collect();
        assert_eq!(distances, vec![0.5, 0.7]);
    }

    #[test]
    fn enter_then_stays_then_one_exit() {
        let mut dispatcher = CollisionEventDispatcher::new();
        let mut all = Vec::new();

        for _ in 0..3 {
            // Two rays report the same collider each tick.
            all.extend(dispatcher.diff(ContactSet::from_hits(&[hit(5, 0.1), hit(5, 0.2)])));
        }
        all.extend(dispatcher.diff(ContactSet::default()));
        all.extend(dispatcher.diff(ContactSet::default()));

        assert_eq!(
            kinds(&all),
            vec![("enter", 5), ("stay", 5), ("stay", 5), ("exit", 5)]
        );
    }

    #[test]
    fn exits_are_dispatched_after_enters_and_stays() {
        let mut dispatcher = CollisionEventDispatcher::new();
        dispatcher.diff(ContactSet::from_hits(&[hit(1, 0.1), hit(2, 0.1)]));

        let events = dispatcher.diff(ContactSet::from_hits(&[hit(3, 0.1), hit(2, 0.1)]));

        assert_eq!(kinds(&events), vec![("enter", 3), ("stay", 2), ("exit", 1)]);
    }

    #[test]
    fn listener_registration_is_idempotent() {
        let mut dispatcher = CollisionEventDispatcher::new();
        let listener: Rc<dyn ControllerListener> = Rc::new(Nobody);
        let other: Rc<dyn ControllerListener> = Rc::new(Nobody);

        assert!(dispatcher.add_listener(listener.clone()));
        assert!(!dispatcher.add_listener(listener.clone()));
        assert_eq!(dispatcher.listeners().len(), 1);

        assert!(!dispatcher.remove_listener(&other));
        assert!(dispatcher.remove_listener(&listener));
        assert!(!dispatcher.remove_listener(&listener));
        assert!(dispatcher.listeners().is_empty());
    }
}
