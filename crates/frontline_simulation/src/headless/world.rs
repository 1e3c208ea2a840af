//! HeadlessWorld: in-memory сцена для headless прогонов и тестов
//!
//! Реализует все collaborator traits поверх одного `WorldState`:
//! - тела (с владельцем, стороной, bounds) и спрайты, которые за ними следуют
//! - снаряды: линейный полёт, lifetime, попадание в тело чужой стороны
//! - one-shot анимации с фиксированной длительностью
//! - реестр юнитов и очередь снятых со сцены
//!
//! Все handle'ы держат `Arc<Mutex<WorldState>>` + ключ. После destroy
//! запись удаляется, дальнейшие вызовы через handle: no-op.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bevy::math::Vec2;

use crate::behaviour::Millis;
use crate::combat::{BulletSpawn, ProjectileKind};
use crate::error::ConfigError;
use crate::logger;
use crate::scene::{
    ActorId, ActorRegistry, AssetLoader, Bounds, BulletFactory, PhysicsBody, PhysicsSprite,
    SpatialIndex, Side, Stage, Visual,
};

/// Параметры headless сцены
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessSettings {
    pub ground_y: f32,
    /// Ширина поля боя (для расстановки)
    pub width: f32,
    /// Размер кадра для текстур без явного размера
    pub default_frame: Vec2,
    /// Размеры кадров по ключу текстуры
    pub frames: BTreeMap<String, Vec2>,
    /// Длительность one-shot анимации (ms)
    pub animation_ms: Millis,
}

impl HeadlessSettings {
    /// Поле боя должно иметь положительную ширину (расстановка берёт от неё доли)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width > 0.0) {
            return Err(ConfigError::NonPositive { field: "width", value: self.width });
        }
        Ok(())
    }
}

impl Default for HeadlessSettings {
    fn default() -> Self {
        let mut frames = BTreeMap::new();
        // После scale 0.5 танк 48x40: нижняя кромка ровно на земле
        frames.insert("tank".to_string(), Vec2::new(96.0, 80.0));
        frames.insert("explode".to_string(), Vec2::new(64.0, 64.0));

        Self {
            ground_y: 600.0,
            width: 1600.0,
            default_frame: Vec2::new(32.0, 32.0),
            frames,
            animation_ms: 800,
        }
    }
}

#[derive(Debug, Clone)]
struct BodyState {
    owner: ActorId,
    center: Vec2,
    size: Vec2,
    velocity: Vec2,
    enabled: bool,
    allow_gravity: bool,
}

#[derive(Debug, Clone)]
struct Playback {
    listener: ActorId,
    remaining_ms: Millis,
}

#[derive(Debug, Clone)]
struct SpriteState {
    texture: String,
    position: Vec2,
    frame: Vec2,
    scale: Vec2,
    depth: i32,
    flip_x: bool,
    visible: bool,
    /// Спрайт следует за телом (physics sprite)
    body: Option<u32>,
    playback: Option<Playback>,
}

/// Снаряд в полёте
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bullet {
    pub side: Side,
    pub position: Vec2,
    pub velocity: Vec2,
    pub kind: ProjectileKind,
    pub age_ms: Millis,
    pub lifetime_ms: Millis,
}

/// Попадание, найденное сценой (доставляется юниту батлом)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulletHit {
    pub target: ActorId,
    pub kind: ProjectileKind,
}

#[derive(Debug, Default)]
struct WorldState {
    next_actor: u32,
    next_key: u32,
    actors: BTreeMap<ActorId, Side>,
    bodies: BTreeMap<u32, BodyState>,
    sprites: BTreeMap<u32, SpriteState>,
    bullets: Vec<Bullet>,
    textures: BTreeSet<String>,
    deregistered: Vec<ActorId>,
}

impl WorldState {
    fn key(&mut self) -> u32 {
        let key = self.next_key;
        self.next_key += 1;
        key
    }

    fn body_of(&self, owner: ActorId) -> Option<&BodyState> {
        self.bodies.values().find(|body| body.owner == owner)
    }
}

fn lock(state: &Mutex<WorldState>) -> MutexGuard<'_, WorldState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory сцена (clone = ещё один handle на то же состояние)
#[derive(Clone)]
pub struct HeadlessWorld {
    state: Arc<Mutex<WorldState>>,
    settings: Arc<HeadlessSettings>,
}

impl Default for HeadlessWorld {
    fn default() -> Self {
        Self::new(HeadlessSettings::default())
    }
}

impl HeadlessWorld {
    pub fn new(settings: HeadlessSettings) -> Self {
        Self {
            state: Arc::new(Mutex::new(WorldState::default())),
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &HeadlessSettings {
        &self.settings
    }

    fn frame_of(&self, texture: &str) -> Vec2 {
        self.settings.frames.get(texture).copied().unwrap_or(self.settings.default_frame)
    }

    fn sprite_handle(&self, key: u32) -> HeadlessSprite {
        HeadlessSprite {
            state: self.state.clone(),
            key,
            animation_ms: self.settings.animation_ms,
        }
    }

    fn check_loaded(&self, state: &WorldState, texture: &str) {
        if !state.textures.contains(texture) {
            logger::log_warning(&format!("HeadlessWorld: texture '{}' used before preload", texture));
        }
    }

    /// Двигает тела и снаряды на `dt_ms`, снаряды с истёкшим lifetime удаляются
    pub fn integrate(&self, dt_ms: Millis) {
        let dt = dt_ms as f32 / 1000.0;
        let mut state = lock(&self.state);

        for body in state.bodies.values_mut() {
            if body.enabled {
                body.center += body.velocity * dt;
            }
        }

        let WorldState { bodies, sprites, bullets, .. } = &mut *state;
        for sprite in sprites.values_mut() {
            if let Some(body) = sprite.body.and_then(|key| bodies.get(&key)) {
                sprite.position = body.center;
            }
        }

        bullets.retain_mut(|bullet| {
            bullet.position += bullet.velocity * dt;
            bullet.age_ms += dt_ms;
            bullet.age_ms < bullet.lifetime_ms
        });
    }

    /// Снаряды, влетевшие в включённое тело враждебной стороны.
    /// Каждый снаряд попадает максимум в одно тело и исчезает.
    pub fn collect_hits(&self) -> Vec<BulletHit> {
        let mut state = lock(&self.state);
        let WorldState { actors, bodies, bullets, .. } = &mut *state;

        let mut hits = Vec::new();
        bullets.retain(|bullet| {
            let target = bodies.values().find(|body| {
                body.enabled
                    && actors.get(&body.owner).is_some_and(|side| side.is_hostile_to(bullet.side))
                    && Bounds::from_center(body.center, body.size).contains(bullet.position)
            });

            match target {
                Some(body) => {
                    hits.push(BulletHit { target: body.owner, kind: bullet.kind });
                    false
                }
                None => true,
            }
        });
        hits
    }

    /// Продвигает one-shot анимации, возвращает слушателей доигравших
    pub fn advance_animations(&self, dt_ms: Millis) -> Vec<ActorId> {
        let mut state = lock(&self.state);
        let mut completed = Vec::new();

        for sprite in state.sprites.values_mut() {
            let Some(playback) = sprite.playback.as_mut() else {
                continue;
            };
            playback.remaining_ms = playback.remaining_ms.saturating_sub(dt_ms);
            if playback.remaining_ms == 0 {
                completed.push(playback.listener);
                sprite.playback = None;
            }
        }
        completed
    }

    /// Забирает юниты, снятые со сцены с прошлого вызова
    pub fn drain_deregistered(&self) -> Vec<ActorId> {
        std::mem::take(&mut lock(&self.state).deregistered)
    }

    pub fn bullets(&self) -> Vec<Bullet> {
        lock(&self.state).bullets.clone()
    }

    pub fn is_registered(&self, id: ActorId) -> bool {
        lock(&self.state).actors.contains_key(&id)
    }

    pub fn registered_count(&self) -> usize {
        lock(&self.state).actors.len()
    }

    pub fn body_bounds(&self, id: ActorId) -> Option<Bounds> {
        lock(&self.state).body_of(id).map(|body| Bounds::from_center(body.center, body.size))
    }

    pub fn sprite_count(&self) -> usize {
        lock(&self.state).sprites.len()
    }

    pub fn is_loaded(&self, texture: &str) -> bool {
        lock(&self.state).textures.contains(texture)
    }

    /// Отдельный loader-handle для preload hook
    pub fn loader(&self) -> HeadlessLoader {
        HeadlessLoader { state: self.state.clone() }
    }
}

impl SpatialIndex for HeadlessWorld {
    /// Направление не сужает выборку: headless карта сканирует симметрично
    /// по горизонтали от центра `origin`.
    fn objects_from(
        &self,
        origin: ActorId,
        side: Side,
        _direction: f32,
        range: f32,
        filter: &dyn Fn(&Bounds) -> bool,
    ) -> Vec<ActorId> {
        if !side.is_owned() {
            return Vec::new();
        }
        let state = lock(&self.state);
        let Some(origin_x) = state.body_of(origin).map(|body| body.center.x) else {
            return Vec::new();
        };

        state
            .bodies
            .values()
            .filter(|body| body.enabled && body.owner != origin)
            .filter(|body| state.actors.get(&body.owner).is_some_and(|s| s.sign() == side.sign()))
            .filter(|body| (body.center.x - origin_x).abs() <= range)
            .filter(|body| filter(&Bounds::from_center(body.center, body.size)))
            .map(|body| body.owner)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl BulletFactory for HeadlessWorld {
    fn create_bullet(&self, bullet: BulletSpawn) {
        lock(&self.state).bullets.push(Bullet {
            side: bullet.side,
            position: bullet.position,
            velocity: bullet.velocity,
            kind: bullet.kind,
            age_ms: 0,
            lifetime_ms: bullet.lifetime_ms,
        });
    }
}

impl Stage for HeadlessWorld {
    fn add_physics_sprite(&self, owner: ActorId, texture: &str, position: Vec2) -> PhysicsSprite {
        let frame = self.frame_of(texture);
        let mut state = lock(&self.state);
        self.check_loaded(&state, texture);

        let body_key = state.key();
        state.bodies.insert(
            body_key,
            BodyState {
                owner,
                center: position,
                size: frame,
                velocity: Vec2::ZERO,
                enabled: true,
                allow_gravity: true,
            },
        );

        let sprite_key = state.key();
        state.sprites.insert(sprite_key, new_sprite(texture, position, frame, Some(body_key)));

        PhysicsSprite {
            visual: Box::new(self.sprite_handle(sprite_key)),
            body: Box::new(HeadlessBody { state: self.state.clone(), key: body_key }),
        }
    }

    fn add_sprite(&self, texture: &str, position: Vec2) -> Box<dyn Visual> {
        let frame = self.frame_of(texture);
        let mut state = lock(&self.state);
        self.check_loaded(&state, texture);

        let key = state.key();
        state.sprites.insert(key, new_sprite(texture, position, frame, None));
        Box::new(self.sprite_handle(key))
    }

    fn ground_y(&self) -> f32 {
        self.settings.ground_y
    }
}

impl ActorRegistry for HeadlessWorld {
    fn register(&self, side: Side) -> ActorId {
        let mut state = lock(&self.state);
        let id = ActorId(state.next_actor);
        state.next_actor += 1;
        state.actors.insert(id, side);
        id
    }

    fn deregister(&self, id: ActorId) {
        let mut state = lock(&self.state);
        if state.actors.remove(&id).is_some() {
            state.deregistered.push(id);
        } else {
            logger::log_warning(&format!("HeadlessWorld: deregister of unknown actor {:?}", id));
        }
    }
}

fn new_sprite(texture: &str, position: Vec2, frame: Vec2, body: Option<u32>) -> SpriteState {
    SpriteState {
        texture: texture.to_string(),
        position,
        frame,
        scale: Vec2::ONE,
        depth: 0,
        flip_x: false,
        visible: true,
        body,
        playback: None,
    }
}

/// Preload hook headless сцены
pub struct HeadlessLoader {
    state: Arc<Mutex<WorldState>>,
}

impl AssetLoader for HeadlessLoader {
    fn load_image(&mut self, key: &str, path: &str) {
        let mut state = lock(&self.state);
        if !state.textures.insert(key.to_string()) {
            logger::log_warning(&format!("HeadlessWorld: texture '{}' preloaded twice", key));
        }
        logger::log(&format!("HeadlessWorld: loaded '{}' from {}", key, path));
    }
}

struct HeadlessBody {
    state: Arc<Mutex<WorldState>>,
    key: u32,
}

impl HeadlessBody {
    fn with<R>(&self, default: R, f: impl FnOnce(&mut BodyState) -> R) -> R {
        match lock(&self.state).bodies.get_mut(&self.key) {
            Some(body) => f(body),
            None => default,
        }
    }
}

impl PhysicsBody for HeadlessBody {
    fn velocity_x(&self) -> f32 {
        self.with(0.0, |body| body.velocity.x)
    }

    fn set_velocity_x(&mut self, velocity_x: f32) {
        self.with((), |body| body.velocity.x = velocity_x);
    }

    fn is_enabled(&self) -> bool {
        self.with(false, |body| body.enabled)
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.with((), |body| body.enabled = enabled);
    }

    fn set_allow_gravity(&mut self, allow: bool) {
        // Гравитацию headless сцена не моделирует, флаг только хранится
        self.with((), |body| body.allow_gravity = allow);
    }

    fn bounds(&self) -> Bounds {
        self.with(Bounds::from_center(Vec2::ZERO, Vec2::ZERO), |body| {
            Bounds::from_center(body.center, body.size)
        })
    }

    fn destroy(&mut self) {
        lock(&self.state).bodies.remove(&self.key);
    }
}

struct HeadlessSprite {
    state: Arc<Mutex<WorldState>>,
    key: u32,
    animation_ms: Millis,
}

impl HeadlessSprite {
    fn with<R>(&self, default: R, f: impl FnOnce(&mut SpriteState) -> R) -> R {
        match lock(&self.state).sprites.get_mut(&self.key) {
            Some(sprite) => f(sprite),
            None => default,
        }
    }
}

impl Visual for HeadlessSprite {
    fn position(&self) -> Vec2 {
        self.with(Vec2::ZERO, |sprite| sprite.position)
    }

    fn set_scale(&mut self, x: f32, y: f32) {
        let mut state = lock(&self.state);
        let WorldState { sprites, bodies, .. } = &mut *state;
        let Some(sprite) = sprites.get_mut(&self.key) else {
            return;
        };
        sprite.scale = Vec2::new(x, y);
        // Как в arcade physics: тело масштабируется вместе со спрайтом
        if let Some(body) = sprite.body.and_then(|key| bodies.get_mut(&key)) {
            body.size = sprite.frame * sprite.scale;
        }
    }

    fn set_depth(&mut self, depth: i32) {
        self.with((), |sprite| sprite.depth = depth);
    }

    fn set_flip_x(&mut self, flip: bool) {
        self.with((), |sprite| sprite.flip_x = flip);
    }

    fn set_visible(&mut self, visible: bool) {
        self.with((), |sprite| sprite.visible = visible);
    }

    fn play_once(&mut self, animation: &str, listener: ActorId) {
        let remaining_ms = self.animation_ms;
        self.with((), |sprite| {
            if sprite.texture != animation {
                logger::log_warning(&format!(
                    "HeadlessSprite: animation '{}' on texture '{}'",
                    animation, sprite.texture
                ));
            }
            sprite.playback = Some(Playback { listener, remaining_ms });
        });
    }

    fn destroy(&mut self) {
        lock(&self.state).sprites.remove(&self.key);
    }
}
