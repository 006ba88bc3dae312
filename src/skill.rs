//! Stasis prison: a multi-stage pillar VFX sequence.
//!
//! Timeline started by [`StasisPrisonSkill::init_vfx`]:
//!
//! 1. Pillars are reset to the origin color and lifted by `height`; the
//!    summon sound plays.
//! 2. One by one, after `pillar_step_delay` unscaled seconds each, a pillar
//!    drops back into place and plays its explosion animation once.
//! 3. When the last pillar lands the thunder flash appears, the damage
//!    trigger message is published and the under surface fades in.
//! 4. After `duration` the flash is removed and pillars and under surface
//!    fade out; `fade_out_time` later the effect returns to its pool.
//!
//! Every suspension point is bound to the effect's [`CancelScope`].
//! Destroying the effect (or dropping it) abandons all pending stages.
//! Stage callbacks only hold weak references to the effect, so dropping it
//! frees it even if the host never ticks the scheduler again.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use glam::Vec3;
use log::{debug, warn};

use crate::animation::{PlayOptions, SpriteAnimator};
use crate::color::Color;
use crate::config::SkillConfig;
use crate::render::{ObjectRenderer, SurfaceHandle};
use crate::scheduler::Scheduler;
use crate::services::{AudioService, MessageBus, ObjectId, ObjectPool, StartTriggerDamageMessage};
use crate::time::{CancelScope, CancellationToken, FrameTime};
use crate::tween::Tweener;

/// Pillar color right after summoning.
const ORIGIN_COLOR: Color = Color::WHITE;

/// Explosion animator bound to a world sprite.
pub type ExplosionAnimator = Rc<RefCell<SpriteAnimator<ObjectRenderer>>>;

/// Host facilities the effect schedules its work on.
#[derive(Clone)]
pub struct SkillContext {
    pub scheduler: Scheduler,
    pub tweener: Tweener,
    pub audio: Rc<dyn AudioService>,
    pub pool: Rc<dyn ObjectPool>,
    pub messenger: Rc<dyn MessageBus<StartTriggerDamageMessage>>,
}

/// Renderables making up one stasis prison instance.
pub struct SkillRig {
    pub pillars: Vec<SurfaceHandle>,
    pub explosions: Vec<ExplosionAnimator>,
    pub under: SurfaceHandle,
    pub thunder: SurfaceHandle,
}

struct Shared {
    object: ObjectId,
    rig: SkillRig,
    config: SkillConfig,
    ctx: SkillContext,
    explosion_animations: RefCell<Vec<Option<String>>>,
    duration: Cell<f32>,
}

/// A pooled stasis prison effect.
pub struct StasisPrisonSkill {
    shared: Rc<Shared>,
    scope: CancelScope,
}

impl StasisPrisonSkill {
    pub fn new(object: ObjectId, rig: SkillRig, config: SkillConfig, ctx: SkillContext) -> Self {
        Self {
            shared: Rc::new(Shared {
                object,
                rig,
                config,
                ctx,
                explosion_animations: RefCell::new(Vec::new()),
                duration: Cell::new(0.0),
            }),
            scope: CancelScope::new(),
        }
    }

    pub fn object(&self) -> ObjectId {
        self.shared.object
    }

    pub fn rig(&self) -> &SkillRig {
        &self.shared.rig
    }

    /// Start the effect; the flash stays up for `duration` seconds.
    ///
    /// Calling this again abandons a run still in progress.
    pub fn init_vfx(&mut self, duration: f32) {
        self.scope = CancelScope::new();
        let shared = &self.shared;
        shared.duration.set(duration.max(0.0));

        shared.rig.under.set_active(false);
        shared.rig.under.set_alpha(0.0);
        shared.rig.thunder.set_active(false);
        shared.enable_explosions(false);
        shared.init_explosion_animations();

        debug!("stasis prison {:?}: start ({}s)", shared.object, duration);
        Shared::generate_pillars(shared, &self.scope.token());
    }

    /// Advance the explosion animators by one host frame.
    ///
    /// The scheduler and tweener in the [`SkillContext`] are ticked by the
    /// host separately.
    pub fn update(&self, time: FrameTime) {
        for explosion in &self.shared.rig.explosions {
            explosion.borrow_mut().update(time);
        }
    }

    /// Destroy the effect, cancelling every pending stage.
    pub fn destroy(self) {
        debug!("stasis prison {:?}: destroyed", self.shared.object);
    }
}

impl Shared {
    fn enable_explosions(&self, enable: bool) {
        for explosion in &self.rig.explosions {
            explosion.borrow().renderer().surface().set_active(enable);
        }
    }

    fn init_explosion_animations(&self) {
        let names = self
            .rig
            .explosions
            .iter()
            .map(|e| e.borrow().animations().first().map(|a| a.name.clone()))
            .collect();
        *self.explosion_animations.borrow_mut() = names;
    }

    fn generate_pillars(this: &Rc<Self>, token: &CancellationToken) {
        this.fade_pillars_in(ORIGIN_COLOR);
        let targets = this.set_pillars_position();
        this.play_sound(&this.config.sound_summon, token);
        Self::drop_pillar(this, 0, Rc::new(targets), token.clone());
    }

    /// Lift every pillar by `height`, returning the positions they drop to.
    fn set_pillars_position(&self) -> Vec<Vec3> {
        self.rig
            .pillars
            .iter()
            .map(|pillar| {
                let end = pillar.position();
                pillar.set_position(end + Vec3::Y * self.config.height);
                end
            })
            .collect()
    }

    fn drop_pillar(this: &Rc<Self>, index: usize, targets: Rc<Vec<Vec3>>, token: CancellationToken) {
        if index >= this.rig.pillars.len() {
            return;
        }
        let weak = Rc::downgrade(this);
        let scheduler = &this.ctx.scheduler;
        scheduler.delay(this.config.pillar_step_delay, true, &token.clone(), move || {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let pillar = &shared.rig.pillars[index];
            let is_last = index + 1 == shared.rig.pillars.len();
            let landed: Weak<Shared> = Rc::downgrade(&shared);
            let landed_token = token.clone();
            let tween = pillar
                .move_tween(targets[index], shared.config.pillar_move_duration)
                .ignore_time_scale()
                .with_cancellation(&token)
                .on_complete(move || {
                    let Some(landed) = landed.upgrade() else {
                        return;
                    };
                    Shared::play_explosion(&landed, index, &landed_token);
                    if is_last {
                        Shared::play_vfx(&landed, &landed_token);
                    }
                });
            shared.ctx.tweener.start(tween);
            Self::drop_pillar(&shared, index + 1, targets, token);
        });
    }

    fn play_explosion(this: &Rc<Self>, index: usize, token: &CancellationToken) {
        let Some(explosion) = this.rig.explosions.get(index) else {
            return;
        };
        let Some(name) = this.explosion_animations.borrow().get(index).cloned().flatten() else {
            warn!("stasis prison {:?}: explosion {} has no animation", this.object, index);
            return;
        };

        explosion.borrow().renderer().surface().set_active(true);
        let played = explosion
            .borrow_mut()
            .play(&name, PlayOptions::default().one_shot());
        if let Err(err) = played {
            warn!("stasis prison {:?}: {}", this.object, err);
            explosion.borrow().renderer().surface().set_active(false);
            return;
        }

        let watched = explosion.clone();
        let finished = explosion.clone();
        this.ctx.scheduler.wait_until(
            move || !watched.borrow().is_playing(),
            token,
            move || finished.borrow().renderer().surface().set_active(false),
        );
    }

    fn play_vfx(this: &Rc<Self>, token: &CancellationToken) {
        debug!("stasis prison {:?}: landed", this.object);
        this.ctx.messenger.publish(StartTriggerDamageMessage);
        Self::play_thunder_effect(this, token);
        this.fade_under(true, token);
    }

    fn play_thunder_effect(this: &Rc<Self>, token: &CancellationToken) {
        this.rig.thunder.set_active(true);
        this.play_sound(&this.config.sound_zap, token);

        let weak = Rc::downgrade(this);
        let remove_token = token.clone();
        this.ctx.scheduler.delay(this.duration.get(), true, token, move || {
            if let Some(shared) = weak.upgrade() {
                Shared::remove_vfx(&shared, &remove_token);
            }
        });
    }

    fn remove_vfx(this: &Rc<Self>, token: &CancellationToken) {
        debug!("stasis prison {:?}: fading out", this.object);
        this.rig.thunder.set_active(false);
        this.fade_pillars_out(this.config.fade_out_color, token);
        this.fade_under(false, token);

        let weak = Rc::downgrade(this);
        this.ctx.scheduler.delay(this.config.fade_out_time, true, token, move || {
            if let Some(shared) = weak.upgrade() {
                debug!("stasis prison {:?}: returned to pool", shared.object);
                shared.ctx.pool.remove(shared.object);
            }
        });
    }

    fn fade_pillars_in(&self, color: Color) {
        for pillar in &self.rig.pillars {
            pillar.set_color(color);
        }
    }

    fn fade_pillars_out(&self, color: Color, token: &CancellationToken) {
        let time = self.config.fade_out_time;
        for pillar in &self.rig.pillars {
            let tweener = &self.ctx.tweener;
            tweener.start(
                pillar
                    .color_tween(color, time)
                    .ignore_time_scale()
                    .with_cancellation(token),
            );
            tweener.start(
                pillar
                    .fade_tween(0.0, time)
                    .ignore_time_scale()
                    .with_cancellation(token),
            );
        }
    }

    fn fade_under(&self, fade_in: bool, token: &CancellationToken) {
        let under = &self.rig.under;
        under.set_active(true);
        let alpha = if fade_in { 1.0 } else { 0.0 };
        self.ctx.tweener.start(
            under
                .fade_tween(alpha, self.config.fade_out_time)
                .ignore_time_scale()
                .with_cancellation(token),
        );
    }

    fn play_sound(&self, name: &str, token: &CancellationToken) {
        if !name.is_empty() {
            self.ctx.audio.play_sound_effect(name, token);
        }
    }
}
