//! Renderer adapters binding animation frames to on-screen surfaces.
//!
//! A [`Surface`] is the platform-agnostic state of one renderable: the sprite
//! it shows, its vertex color (alpha included), a material tint, its size and
//! position. Hosts read surfaces when drawing; this crate only writes them.
//!
//! Two adapters implement [`FrameRenderer`]:
//! - [`ImageRenderer`] – a UI image that also resizes to the sprite
//! - [`ObjectRenderer`] – a world-space sprite

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use glam::Vec3;

use crate::color::Color;
use crate::data::Sprite;
use crate::tween::{Tween, TweenTarget, Tweener};

/// Completion callback for fades.
pub type Callback = Box<dyn FnOnce()>;

/// State of a single renderable.
#[derive(Clone, Debug)]
pub struct Surface {
    target: TweenTarget,
    /// Sprite currently shown, if any
    pub sprite: Option<Sprite>,
    /// Vertex color; its alpha is what fades animate
    pub color: Color,
    /// Material tint (hit flash color)
    pub tint: Color,
    /// Display size
    pub size: (f32, f32),
    /// World or canvas position
    pub position: Vec3,
    /// Whether the owning object is active
    pub active: bool,
}

impl Default for Surface {
    fn default() -> Self {
        Self {
            target: TweenTarget::next(),
            sprite: None,
            color: Color::WHITE,
            tint: Color::CLEAR,
            size: (0.0, 0.0),
            position: Vec3::ZERO,
            active: true,
        }
    }
}

/// Shared, single-threaded handle to a [`Surface`].
///
/// Tweens hold clones of the handle and write into it as they advance.
#[derive(Clone, Debug, Default)]
pub struct SurfaceHandle(Rc<RefCell<Surface>>);

impl SurfaceHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(position: Vec3) -> Self {
        let handle = Self::new();
        handle.set_position(position);
        handle
    }

    /// Tween target identifying this surface.
    pub fn target(&self) -> TweenTarget {
        self.0.borrow().target
    }

    /// Borrow the full surface state.
    pub fn get(&self) -> Ref<'_, Surface> {
        self.0.borrow()
    }

    pub fn sprite_name(&self) -> Option<String> {
        self.0.borrow().sprite.as_ref().map(|s| s.name.clone())
    }

    pub fn set_sprite(&self, sprite: Option<Sprite>) {
        self.0.borrow_mut().sprite = sprite;
    }

    pub fn color(&self) -> Color {
        self.0.borrow().color
    }

    pub fn set_color(&self, color: Color) {
        self.0.borrow_mut().color = color;
    }

    pub fn alpha(&self) -> f32 {
        self.0.borrow().color.a
    }

    pub fn set_alpha(&self, alpha: f32) {
        self.0.borrow_mut().color.a = alpha;
    }

    pub fn tint(&self) -> Color {
        self.0.borrow().tint
    }

    pub fn set_tint(&self, tint: Color) {
        self.0.borrow_mut().tint = tint;
    }

    pub fn size(&self) -> (f32, f32) {
        self.0.borrow().size
    }

    pub fn set_size(&self, size: (f32, f32)) {
        self.0.borrow_mut().size = size;
    }

    pub fn position(&self) -> Vec3 {
        self.0.borrow().position
    }

    pub fn set_position(&self, position: Vec3) {
        self.0.borrow_mut().position = position;
    }

    pub fn is_active(&self) -> bool {
        self.0.borrow().active
    }

    pub fn set_active(&self, active: bool) {
        self.0.borrow_mut().active = active;
    }

    /// Tween the alpha from its current value to `alpha`.
    pub fn fade_tween(&self, alpha: f32, duration: f32) -> Tween {
        let from = self.alpha();
        let surface = self.clone();
        Tween::float(from, alpha, duration, move |a| surface.set_alpha(a))
            .with_target(self.target())
    }

    /// Tween the RGB channels towards `color`, leaving alpha to fades.
    pub fn color_tween(&self, color: Color, duration: f32) -> Tween {
        let from = self.color();
        let surface = self.clone();
        Tween::new(duration, move |t| {
            let mixed = from.lerp(color, t);
            let alpha = surface.alpha();
            surface.set_color(mixed.with_alpha(alpha));
        })
        .with_target(self.target())
    }

    /// Tween the position from where it is now to `to`.
    pub fn move_tween(&self, to: Vec3, duration: f32) -> Tween {
        let from = self.position();
        let surface = self.clone();
        Tween::new(duration, move |t| surface.set_position(from.lerp(to, t)))
            .with_target(self.target())
    }
}

/// The contract every renderer adapter fulfils.
pub trait FrameRenderer {
    /// Set the material tint color.
    fn tint_color(&mut self, color: Color);

    /// Fade alpha to 0. Duration ≤ 0 applies immediately and calls back
    /// synchronously.
    fn fade_out(&mut self, duration: f32, on_completed: Option<Callback>);

    /// Fade alpha to 1. Duration ≤ 0 applies immediately and calls back
    /// synchronously.
    fn fade_in(&mut self, duration: f32, on_completed: Option<Callback>);

    /// Show `sprite` on the surface.
    fn show_frame(&mut self, sprite: &Sprite);

    /// Detach the sprite from the surface.
    fn clear_renderer(&mut self);
}

/// Shared fade logic: kill in-flight tweens on the surface, then either
/// snap or start a new fade tween.
fn fade(
    surface: &SurfaceHandle,
    tweener: &Tweener,
    alpha: f32,
    duration: f32,
    on_completed: Option<Callback>,
) {
    tweener.kill(surface.target());
    if duration > 0.0 {
        let mut tween = surface.fade_tween(alpha, duration);
        if let Some(callback) = on_completed {
            tween = tween.on_complete(callback);
        }
        tweener.start(tween);
    } else {
        surface.set_alpha(alpha);
        if let Some(callback) = on_completed {
            callback();
        }
    }
}

/// Adapter for UI images. Resizes the surface to the sprite's native size.
#[derive(Clone)]
pub struct ImageRenderer {
    image: SurfaceHandle,
    tweener: Tweener,
}

impl ImageRenderer {
    pub fn new(image: SurfaceHandle, tweener: Tweener) -> Self {
        Self { image, tweener }
    }

    pub fn surface(&self) -> &SurfaceHandle {
        &self.image
    }
}

impl FrameRenderer for ImageRenderer {
    fn tint_color(&mut self, color: Color) {
        self.image.set_tint(color);
    }

    fn fade_out(&mut self, duration: f32, on_completed: Option<Callback>) {
        fade(&self.image, &self.tweener, 0.0, duration, on_completed);
    }

    fn fade_in(&mut self, duration: f32, on_completed: Option<Callback>) {
        fade(&self.image, &self.tweener, 1.0, duration, on_completed);
    }

    fn show_frame(&mut self, sprite: &Sprite) {
        self.image.set_size(sprite.ui_size());
        self.image.set_sprite(Some(sprite.clone()));
    }

    fn clear_renderer(&mut self) {
        self.image.set_sprite(None);
    }
}

/// Adapter for world-space sprites.
#[derive(Clone)]
pub struct ObjectRenderer {
    sprite_renderer: SurfaceHandle,
    tweener: Tweener,
}

impl ObjectRenderer {
    pub fn new(sprite_renderer: SurfaceHandle, tweener: Tweener) -> Self {
        Self {
            sprite_renderer,
            tweener,
        }
    }

    pub fn surface(&self) -> &SurfaceHandle {
        &self.sprite_renderer
    }
}

impl FrameRenderer for ObjectRenderer {
    fn tint_color(&mut self, color: Color) {
        self.sprite_renderer.set_tint(color);
    }

    fn fade_out(&mut self, duration: f32, on_completed: Option<Callback>) {
        fade(&self.sprite_renderer, &self.tweener, 0.0, duration, on_completed);
    }

    fn fade_in(&mut self, duration: f32, on_completed: Option<Callback>) {
        fade(&self.sprite_renderer, &self.tweener, 1.0, duration, on_completed);
    }

    fn show_frame(&mut self, sprite: &Sprite) {
        self.sprite_renderer.set_sprite(Some(sprite.clone()));
    }

    fn clear_renderer(&mut self) {
        self.sprite_renderer.set_sprite(None);
    }
}
