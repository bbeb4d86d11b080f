//! The controller facade: one instance per moving entity.
//!
//! A tick runs, in order:
//! 1. integrate gravity and the jump cooldown into the velocity
//! 2. displacement = velocity * dt
//! 3. reset the state snapshot
//! 4. cast the ray fan and resolve the displacement (pre-collision callbacks fire here)
//! 5. clamp the displacement per axis by `max_velocity * dt`
//! 6. translate the entity
//! 7. replace the velocity with the realized one
//! 8. diff contacts against the previous tick and dispatch events
//!
//! A tick with `dt == 0` stops after step 1. The state, the contacts and the
//! position stay as the previous tick left them and no callbacks fire.

use std::ops::{Deref, DerefMut};
use std::rc::Rc;
use std::sync::Arc;

use log::{error, trace, warn};

use crate::collision::{
    CollisionResolver, CollisionWorld, RayHit, ResolveStrategy, Vec3, clamp_displacement,
};
use crate::constants::{DIST_EPS, FLAT_SLOPE_EPS_DEG};
use crate::error::ControllerError;
use crate::events::{CollisionEventDispatcher, ContactSet, ControllerListener};
use crate::motion::MotionIntegrator;
use crate::profile::{ParameterProfile, ProfileSlot};
use crate::settings::ControllerSettings;
use crate::state::ControllerState;

#[derive(Debug)]
pub struct Controller {
    enabled: bool,
    position: Vec3,
    last_displacement: Vec3,
    profiles: ProfileSlot,
    motion: MotionIntegrator,
    resolver: CollisionResolver,
    state: ControllerState,
    dispatcher: CollisionEventDispatcher,
}

impl Controller {
    /// Validate the configuration and build an enabled controller at the origin.
    pub fn try_new(
        settings: ControllerSettings,
        default_profile: Arc<ParameterProfile>,
    ) -> Result<Self, ControllerError> {
        settings.validate()?;
        default_profile.validate()?;
        Ok(Self::assemble(settings, default_profile, true))
    }

    /// Like [`Controller::try_new`], but an invalid configuration yields a disabled
    /// controller whose ticks do nothing instead of an error.
    pub fn new(settings: ControllerSettings, default_profile: Arc<ParameterProfile>) -> Self {
        match Self::try_new(settings, default_profile.clone()) {
            Ok(controller) => controller,
            Err(err) => {
                error!("controller disabled: {err}");
                Self::assemble(settings, default_profile, false)
            }
        }
    }

    fn assemble(
        settings: ControllerSettings,
        default_profile: Arc<ParameterProfile>,
        enabled: bool,
    ) -> Self {
        Self {
            enabled,
            position: Vec3::zeros(),
            last_displacement: Vec3::zeros(),
            profiles: ProfileSlot::new(default_profile),
            motion: MotionIntegrator::new(),
            resolver: CollisionResolver::new(settings),
            state: ControllerState::default(),
            dispatcher: CollisionEventDispatcher::new(),
        }
    }

    /// Swap the resolve strategy, keeping the settings.
    pub fn with_strategy(mut self, strategy: Box<dyn ResolveStrategy>) -> Self {
        self.resolver = CollisionResolver::with_strategy(*self.resolver.settings(), strategy);
        self
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn settings(&self) -> &ControllerSettings {
        self.resolver.settings()
    }

    #[inline]
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.motion.velocity()
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Teleport the entity. Contacts and velocity are left alone.
    pub fn set_position(&mut self, position: Vec3) {
        if position.iter().all(|c| c.is_finite()) {
            self.position = position;
        } else {
            warn!("set_position ignored non-finite position {position:?}");
        }
    }

    /// Translation applied by the most recent tick.
    #[inline]
    pub fn last_displacement(&self) -> Vec3 {
        self.last_displacement
    }

    // ---------- parameters ----------

    /// The override when set, the default otherwise.
    #[inline]
    pub fn active_parameters(&self) -> &Arc<ParameterProfile> {
        self.profiles.active()
    }

    #[inline]
    pub fn default_parameters(&self) -> &Arc<ParameterProfile> {
        self.profiles.default_profile()
    }

    #[inline]
    pub fn parameter_override(&self) -> Option<&Arc<ParameterProfile>> {
        self.profiles.override_profile()
    }

    /// Install or clear the override. An invalid profile is rejected and the current
    /// override is kept.
    pub fn set_parameter_override(
        &mut self,
        profile: Option<Arc<ParameterProfile>>,
    ) -> Result<(), ControllerError> {
        if let Some(profile) = &profile {
            profile.validate()?;
        }
        self.profiles.set_override(profile);
        Ok(())
    }

    /// Install `profile` as the override until the returned guard drops, then put back
    /// whatever override was there before.
    pub fn override_scope(
        &mut self,
        profile: Arc<ParameterProfile>,
    ) -> Result<OverrideScope<'_>, ControllerError> {
        profile.validate()?;
        let previous = self.profiles.set_override(Some(profile));
        Ok(OverrideScope {
            controller: self,
            previous: Some(previous),
        })
    }

    // ---------- forces ----------
    // A disabled controller ignores all of these.

    pub fn add_force(&mut self, force: Vec3) {
        if self.enabled {
            self.motion.add_force(force);
        }
    }

    pub fn set_force(&mut self, force: Vec3) {
        if self.enabled {
            self.motion.set_force(force);
        }
    }

    pub fn set_horizontal_force(&mut self, x: f32) {
        if self.enabled {
            self.motion.set_horizontal_force(x);
        }
    }

    pub fn set_vertical_force(&mut self, y: f32) {
        if self.enabled {
            self.motion.set_vertical_force(y);
        }
    }

    pub fn add_impulse(&mut self, impulse: Vec3) {
        if self.enabled {
            let profile = Arc::clone(self.profiles.active());
            self.motion.add_impulse(impulse, &profile);
        }
    }

    /// Accelerate toward `direction * max_speed` under the active profile's policy.
    pub fn steer(&mut self, direction: Vec3, dt: f32) {
        if self.enabled {
            let profile = Arc::clone(self.profiles.active());
            self.motion.steer(direction, &profile, &self.state, dt);
        }
    }

    #[inline]
    pub fn can_move(&self) -> bool {
        self.motion.can_move(self.profiles.active(), &self.state)
    }

    #[inline]
    pub fn can_jump(&self) -> bool {
        self.enabled && self.motion.can_jump(self.profiles.active(), &self.state)
    }

    /// Jump if allowed, notifying listeners. Returns whether the jump happened.
    pub fn jump(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        let profile = Arc::clone(self.profiles.active());
        if !self.motion.jump(&profile, &self.state) {
            return false;
        }
        for listener in self.dispatcher.listeners() {
            listener.on_jump(self);
        }
        true
    }

    // ---------- listeners ----------

    pub fn add_listener(&mut self, listener: Rc<dyn ControllerListener>) -> bool {
        self.dispatcher.add_listener(listener)
    }

    pub fn remove_listener(&mut self, listener: &Rc<dyn ControllerListener>) -> bool {
        self.dispatcher.remove_listener(listener)
    }

    /// Contacts touched by the most recent tick, one per collider.
    #[inline]
    pub fn contacts(&self) -> &ContactSet {
        self.dispatcher.contacts()
    }

    // ---------- tick ----------

    /// Advance one fixed step. Negative or non-finite `dt` is treated as 0, which
    /// pauses the entity without touching its footing.
    pub fn tick(&mut self, world: &dyn CollisionWorld, dt: f32) {
        if !self.enabled {
            return;
        }
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            warn!("tick called with dt = {dt}, treating as 0");
            0.0
        };
        let profile = Arc::clone(self.profiles.active());

        self.motion.integrate(&profile, dt);
        if profile.z_clamp {
            self.motion.clamp_to_plane();
        }
        if dt == 0.0 {
            // Paused: keep last tick's snapshot and contacts, dispatch nothing.
            self.last_displacement = Vec3::zeros();
            trace!("paused tick at {:?}", self.position);
            return;
        }

        let mut displacement = self.motion.velocity() * dt;
        self.state.reset();

        let hits = self.resolver.resolve(
            world,
            self.position,
            profile.gravity,
            &mut displacement,
            &mut self.state,
        );
        self.notify_pre_collision(&hits);

        displacement = clamp_displacement(displacement, profile.max_velocity, dt);
        if profile.z_clamp {
            displacement.z = 0.0;
        }

        self.position += displacement;
        self.last_displacement = displacement;
        self.motion.set_realized(displacement, dt);

        self.derive_state(world, &profile);
        trace!(
            "tick dt={dt:.4} pos={:?} vel={:?} grounded={} sliding={}",
            self.position,
            self.motion.velocity(),
            self.state.is_grounded,
            self.state.is_sliding
        );

        let events = self.dispatcher.diff(ContactSet::from_hits(&hits));
        for listener in self.dispatcher.listeners() {
            for contact in self.dispatcher.contacts().iter() {
                listener.on_post_collision(self, contact);
            }
            for event in &events {
                listener.on_collision(self, event);
            }
        }
    }

    fn notify_pre_collision(&self, hits: &[RayHit]) {
        for listener in self.dispatcher.listeners() {
            for hit in hits {
                listener.on_pre_collision(self, hit);
            }
        }
    }

    /// Fill the fields that depend on the realized velocity rather than on single hits.
    fn derive_state(&mut self, world: &dyn CollisionWorld, profile: &ParameterProfile) {
        let state = &mut self.state;

        if let Some(ground) = state.grounded_object {
            state.platform_velocity = world.collider_velocity(ground);
        }
        state.is_on_slope = state.is_grounded && state.ground_angle > FLAT_SLOPE_EPS_DEG;

        if !state.is_grounded {
            let along_gravity = self.motion.velocity().dot(&profile.gravity);
            state.is_falling = along_gravity > DIST_EPS;
            state.is_flying = state.is_airborne() && along_gravity < -DIST_EPS;
        }
    }
}

/// Restores the previous parameter override when dropped.
///
/// Derefs to the controller, so the scoped profile is in effect for everything done
/// through the guard.
#[derive(Debug)]
pub struct OverrideScope<'a> {
    controller: &'a mut Controller,
    previous: Option<Option<Arc<ParameterProfile>>>,
}

impl Deref for OverrideScope<'_> {
    type Target = Controller;

    fn deref(&self) -> &Controller {
        self.controller
    }
}

impl DerefMut for OverrideScope<'_> {
    fn deref_mut(&mut self) -> &mut Controller {
        self.controller
    }
}

impl Drop for OverrideScope<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.controller.profiles.set_override(previous);
        }
    }
}
