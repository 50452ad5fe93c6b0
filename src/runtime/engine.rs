//! The real-time runtime: a state machine over a compiled description.
//!
//! Frame order is fixed: input is applied, dynamic entities integrate,
//! collisions resolve, rules evaluate on every contact, then the
//! timer ticks. Rendering is a pure read of the current frame. The
//! engine never panics on a description because the compile pipeline
//! normalizes and validates everything before it gets here.

use serde::Serialize;

use crate::runtime::input::{
    DragGesture, InputEvent, InputState, GRAB_RADIUS, KEYBOARD_ACCEL, PROJECTILE_SPEED, REST_SPEED,
};
use crate::runtime::physics;
use crate::runtime::rules::{player_contact, projectile_contact, ContactOutcome, RuleSet};
use crate::schema::bounds;
use crate::schema::capability::{CameraMode, ControlScheme, EntityKind, RenderShape};
use crate::schema::description::Description;
use crate::schema::entity::{Collider, Entity, Render, Vec2};

/// Seconds of invulnerability after a damaging contact, so one brush
/// against a hazard costs one life, not one per frame.
const DAMAGE_COOLDOWN: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStatus {
    Idle,
    Running,
    Paused,
    Won,
    Lost,
}

/// Everything a HUD needs about the current game state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub status: EngineStatus,
    pub score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lives: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<f32>,
    pub strokes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Aim line drawn while a drag gesture is in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimOverlay {
    pub from: Vec2,
    pub to: Vec2,
}

/// One frame's worth of drawable state, borrowed from the engine.
#[derive(Debug)]
pub struct RenderFrame<'a> {
    pub entities: &'a [Entity],
    pub aim: Option<AimOverlay>,
    /// Where a following camera should center, when the world asks
    /// for one.
    pub camera_focus: Option<Vec2>,
}

pub type StateListener = Box<dyn FnMut(&StateSnapshot)>;

type NotifyKey = (
    EngineStatus,
    u32,
    Option<u32>,
    u32,
    Option<i64>,
    Option<String>,
);

/// A contact's consequence, gathered during the read-only scan and
/// applied after it.
enum Hit {
    Player { other: usize, outcome: ContactOutcome },
    Projectile { projectile: usize, other: usize },
}

pub struct Engine {
    description: Description,
    entities: Vec<Entity>,
    rules: RuleSet,
    status: EngineStatus,
    score: u32,
    lives: Option<u32>,
    time_remaining: Option<f32>,
    strokes: u32,
    message: Option<String>,
    input: InputState,
    drag: Option<DragGesture>,
    damage_cooldown: f32,
    spawn_counter: u32,
    disposed: bool,
    listener: Option<StateListener>,
    last_notified: Option<NotifyKey>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("description", &self.description.id)
            .field("status", &self.status)
            .field("entities", &self.entities.len())
            .field("score", &self.score)
            .finish()
    }
}

impl Engine {
    /// Build an engine over a compiled description. The description is
    /// kept untouched so `reset` can restore the initial layout.
    pub fn new(description: Description) -> Self {
        let rules = RuleSet::from_rules(&description.rules);
        let entities = description.entities.clone();
        let mut engine = Self {
            status: EngineStatus::Idle,
            score: 0,
            lives: rules.starting_lives,
            time_remaining: rules.timer_seconds,
            strokes: 0,
            message: None,
            input: InputState::default(),
            drag: None,
            damage_cooldown: 0.0,
            spawn_counter: 0,
            disposed: false,
            listener: None,
            last_notified: None,
            entities,
            rules,
            description,
        };
        engine.message = engine
            .description
            .ui
            .messages
            .as_ref()
            .and_then(|m| m.start.clone());
        engine
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn set_on_state_change(&mut self, listener: StateListener) {
        self.listener = Some(listener);
    }

    pub fn status(&self) -> EngineStatus {
        self.status
    }

    pub fn get_state(&self) -> StateSnapshot {
        StateSnapshot {
            status: self.status,
            score: self.score,
            lives: self.lives,
            time_remaining: self.time_remaining,
            strokes: self.strokes,
            message: self.message.clone(),
        }
    }

    /// Idle or paused → running. Anything else is a no-op.
    pub fn start(&mut self) {
        if self.disposed {
            return;
        }
        if matches!(self.status, EngineStatus::Idle | EngineStatus::Paused) {
            self.status = EngineStatus::Running;
            self.message = None;
            self.notify();
        }
    }

    /// Running → paused.
    pub fn pause(&mut self) {
        if self.disposed || self.status != EngineStatus::Running {
            return;
        }
        self.status = EngineStatus::Paused;
        self.notify();
    }

    /// Restore the initial layout and counters and return to idle.
    /// Works from any state, including won and lost.
    pub fn reset(&mut self) {
        if self.disposed {
            return;
        }
        self.entities = self.description.entities.clone();
        self.score = 0;
        self.strokes = 0;
        self.lives = self.rules.starting_lives;
        self.time_remaining = self.rules.timer_seconds;
        self.drag = None;
        self.damage_cooldown = 0.0;
        self.spawn_counter = 0;
        self.input.clear();
        self.status = EngineStatus::Idle;
        self.message = self
            .description
            .ui
            .messages
            .as_ref()
            .and_then(|m| m.start.clone());
        self.notify();
    }

    /// Release everything the engine holds. Safe to call any number of
    /// times; every other method becomes a no-op afterwards.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.listener = None;
        self.entities.clear();
        self.status = EngineStatus::Idle;
    }

    /// Feed one raw input event through the active control scheme.
    /// The first qualifying event while idle also starts the game.
    pub fn handle_input(&mut self, event: InputEvent) {
        if self.disposed || matches!(self.status, EngineStatus::Won | EngineStatus::Lost) {
            return;
        }
        self.input.apply(event);

        match self.description.controls.scheme {
            ControlScheme::KeyboardMove => {
                if matches!(event, InputEvent::KeyDown(_)) && self.status == EngineStatus::Idle {
                    self.start();
                }
            }
            ControlScheme::DragLaunch => self.handle_drag(event),
            ControlScheme::AimShoot => {
                if let InputEvent::PointerDown(at) = event {
                    if self.status == EngineStatus::Idle {
                        self.start();
                    }
                    if self.status == EngineStatus::Running {
                        self.shoot_toward(at);
                    }
                }
            }
            ControlScheme::ClickPlace => {
                if let InputEvent::PointerDown(at) = event {
                    if self.status == EngineStatus::Idle {
                        self.start();
                    }
                    if self.status == EngineStatus::Running {
                        self.place_at(at);
                    }
                }
            }
            ControlScheme::Unknown => {}
        }
    }

    /// Advance the simulation. Only runs while `Running`; `dt` is in
    /// seconds and non-positive values are ignored.
    pub fn step(&mut self, dt: f32) {
        if self.disposed || self.status != EngineStatus::Running || !(dt > 0.0) {
            return;
        }

        self.apply_keyboard(dt);
        self.integrate(dt);
        self.expire_projectiles();
        self.resolve_solids();
        self.evaluate_contacts();
        self.tick_timer(dt);
        self.damage_cooldown = (self.damage_cooldown - dt).max(0.0);
        self.notify();
    }

    /// Pure read of the drawable frame: entities, the aim line of an
    /// in-progress drag, and the follow-camera focus.
    pub fn render_frame(&self) -> RenderFrame<'_> {
        let aim = self.drag.as_ref().and_then(|drag| {
            self.player_index().map(|i| {
                let from = self.entities[i].position;
                let pull = drag.launch_velocity();
                AimOverlay {
                    from,
                    to: Vec2::new(from.x + pull.x * 0.25, from.y + pull.y * 0.25),
                }
            })
        });
        let camera_focus = if self.description.world.camera.mode == CameraMode::Follow {
            self.player_index().map(|i| self.entities[i].position)
        } else {
            None
        };
        RenderFrame {
            entities: &self.entities,
            aim,
            camera_focus,
        }
    }

    fn player_index(&self) -> Option<usize> {
        self.entities.iter().position(|e| e.has_tag("player"))
    }

    fn handle_drag(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerDown(at) => {
                if self.status == EngineStatus::Idle {
                    self.start();
                }
                if self.status != EngineStatus::Running {
                    return;
                }
                if let Some(i) = self.player_index() {
                    let player = &self.entities[i];
                    let dx = at.x - player.position.x;
                    let dy = at.y - player.position.y;
                    let near = dx * dx + dy * dy <= GRAB_RADIUS * GRAB_RADIUS;
                    if near && player.velocity.length() <= REST_SPEED {
                        self.drag = Some(DragGesture {
                            origin: at,
                            current: at,
                        });
                    }
                }
            }
            InputEvent::PointerMove(at) => {
                if let Some(drag) = self.drag.as_mut() {
                    drag.current = at;
                }
            }
            InputEvent::PointerUp(at) => {
                if let Some(mut drag) = self.drag.take() {
                    drag.current = at;
                    let launch = drag.launch_velocity();
                    if let Some(i) = self.player_index() {
                        if launch.length() > f32::EPSILON {
                            self.entities[i].velocity = launch;
                            self.strokes += 1;
                            self.notify();
                        }
                    }
                }
            }
            InputEvent::KeyDown(_) | InputEvent::KeyUp(_) => {}
        }
    }

    fn shoot_toward(&mut self, at: Vec2) {
        if self.entities.len() >= bounds::MAX_ENTITIES {
            return;
        }
        let Some(i) = self.player_index() else { return };
        let from = self.entities[i].position;
        let dx = at.x - from.x;
        let dy = at.y - from.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len < f32::EPSILON {
            return;
        }
        self.spawn_counter += 1;
        self.entities.push(Entity {
            id: format!("shot_{}", self.spawn_counter),
            kind: EntityKind::Projectile,
            position: from,
            velocity: Vec2::new(dx / len * PROJECTILE_SPEED, dy / len * PROJECTILE_SPEED),
            size: Vec2::new(8.0, 8.0),
            rotation: 0.0,
            render: Render::shape(RenderShape::Circle, "#ffd166"),
            // Sensor: hits are resolved by the rule scan, not the
            // solid response (a fresh shot overlaps its shooter).
            collider: Collider {
                collider_type: crate::schema::capability::ColliderType::Circle,
                is_static: false,
                is_sensor: true,
            },
            tags: vec!["projectile".to_string()],
        });
    }

    fn place_at(&mut self, at: Vec2) {
        if self.entities.len() >= bounds::MAX_ENTITIES {
            return;
        }
        self.spawn_counter += 1;
        self.entities.push(Entity {
            id: format!("placed_{}", self.spawn_counter),
            kind: EntityKind::Decor,
            position: at,
            velocity: Vec2::default(),
            size: Vec2::new(18.0, 18.0),
            rotation: 0.0,
            render: Render::emoji("🌱"),
            collider: Collider::sensor_circle(),
            tags: vec!["placed".to_string()],
        });
        let points = self.rules.score_points.unwrap_or(1);
        self.add_score(points);
    }

    fn apply_keyboard(&mut self, dt: f32) {
        if self.description.controls.scheme != ControlScheme::KeyboardMove {
            return;
        }
        let v = self.input.move_vector();
        if v.x == 0.0 && v.y == 0.0 {
            return;
        }
        if let Some(i) = self.player_index() {
            let player = &mut self.entities[i];
            player.velocity.x += v.x * KEYBOARD_ACCEL * dt;
            player.velocity.y += v.y * KEYBOARD_ACCEL * dt;
        }
    }

    fn integrate(&mut self, dt: f32) {
        let world = self.description.world.size;
        let physics = self.description.world.physics.clone();
        for entity in &mut self.entities {
            physics::integrate(entity, &physics, world, dt);
        }
    }

    /// Projectiles die at the world edge instead of ricocheting
    /// forever.
    fn expire_projectiles(&mut self) {
        let world = self.description.world.size;
        self.entities.retain(|e| {
            if e.kind != EntityKind::Projectile {
                return true;
            }
            let (min_x, min_y, max_x, max_y) = e.aabb();
            min_x > 0.5 && min_y > 0.5 && max_x < world.x - 0.5 && max_y < world.y - 0.5
        });
    }

    /// Physical response between solid colliders: dynamic pairs swap
    /// velocities, dynamic-vs-static bounces at the world restitution.
    /// Sensors never alter velocity.
    fn resolve_solids(&mut self) {
        let restitution = self.description.world.physics.restitution;
        let n = self.entities.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (head, tail) = self.entities.split_at_mut(j);
                let a = &mut head[i];
                let b = &mut tail[0];
                if a.collider.is_sensor || b.collider.is_sensor {
                    continue;
                }
                if a.collider.is_static && b.collider.is_static {
                    continue;
                }
                if !physics::overlaps(a, b) {
                    continue;
                }
                match (a.collider.is_static, b.collider.is_static) {
                    (false, false) => physics::swap_velocities(a, b),
                    (false, true) => physics::bounce_off_static(a, b, restitution),
                    (true, false) => physics::bounce_off_static(b, a, restitution),
                    (true, true) => unreachable!(),
                }
            }
        }
    }

    /// Rule evaluation over every contact involving the player or a
    /// projectile, gathered read-only and applied afterwards.
    fn evaluate_contacts(&mut self) {
        let player_index = self.player_index();
        let mut hits: Vec<Hit> = Vec::new();

        if let Some(pi) = player_index {
            let player = &self.entities[pi];
            let speed = player.velocity.length();
            for (i, other) in self.entities.iter().enumerate() {
                if i == pi || other.kind == EntityKind::Projectile {
                    continue;
                }
                if !physics::overlaps(player, other) {
                    continue;
                }
                let outcome = player_contact(&self.rules, other, speed);
                if outcome != ContactOutcome::None {
                    hits.push(Hit::Player { other: i, outcome });
                }
            }
        }

        for (pi, projectile) in self.entities.iter().enumerate() {
            if projectile.kind != EntityKind::Projectile {
                continue;
            }
            for (i, other) in self.entities.iter().enumerate() {
                if i == pi || other.has_tag("player") || other.kind == EntityKind::Projectile {
                    continue;
                }
                if !physics::overlaps(projectile, other) {
                    continue;
                }
                if let ContactOutcome::Collect { .. } = projectile_contact(&self.rules, other) {
                    hits.push(Hit::Projectile {
                        projectile: pi,
                        other: i,
                    });
                }
            }
        }

        let mut removals: Vec<usize> = Vec::new();
        for hit in hits {
            match hit {
                Hit::Player { other, outcome } => match outcome {
                    ContactOutcome::Collect { points } => {
                        removals.push(other);
                        self.add_score(points);
                    }
                    ContactOutcome::Damage => self.take_damage(),
                    ContactOutcome::Goal => self.win(),
                    ContactOutcome::None => {}
                },
                Hit::Projectile { projectile, other } => {
                    removals.push(projectile);
                    removals.push(other);
                    self.add_score(self.rules.score_points.unwrap_or(1));
                }
            }
        }
        removals.sort_unstable();
        removals.dedup();
        for i in removals.into_iter().rev() {
            self.entities.remove(i);
        }
    }

    fn add_score(&mut self, points: u32) {
        if !matches!(self.status, EngineStatus::Running) {
            return;
        }
        self.score += points;
        if let Some(target) = self.rules.win_score_target {
            if self.score >= target {
                self.win();
            }
        }
    }

    fn take_damage(&mut self) {
        if self.damage_cooldown > 0.0 || self.status != EngineStatus::Running {
            return;
        }
        self.damage_cooldown = DAMAGE_COOLDOWN;
        if let Some(lives) = self.lives.as_mut() {
            *lives = lives.saturating_sub(1);
            if *lives == 0 {
                self.lose();
            }
        }
    }

    fn tick_timer(&mut self, dt: f32) {
        if self.status != EngineStatus::Running {
            return;
        }
        if let Some(remaining) = self.time_remaining.as_mut() {
            *remaining = (*remaining - dt).max(0.0);
            if *remaining == 0.0 {
                self.lose();
            }
        }
    }

    fn win(&mut self) {
        if self.status != EngineStatus::Running {
            return;
        }
        self.status = EngineStatus::Won;
        self.message = Some(
            self.description
                .ui
                .messages
                .as_ref()
                .and_then(|m| m.win.clone())
                .unwrap_or_else(|| "You win!".to_string()),
        );
        log::debug!("engine: won '{}'", self.description.id);
    }

    fn lose(&mut self) {
        if self.status != EngineStatus::Running {
            return;
        }
        self.status = EngineStatus::Lost;
        self.message = Some(
            self.description
                .ui
                .messages
                .as_ref()
                .and_then(|m| m.lose.clone())
                .unwrap_or_else(|| "Game over".to_string()),
        );
        log::debug!("engine: lost '{}'", self.description.id);
    }

    /// Invoke the listener when anything HUD-visible changed. Timer
    /// changes only count at whole-second granularity.
    fn notify(&mut self) {
        let key: NotifyKey = (
            self.status,
            self.score,
            self.lives,
            self.strokes,
            self.time_remaining.map(|t| t.ceil() as i64),
            self.message.clone(),
        );
        if self.last_notified.as_ref() == Some(&key) {
            return;
        }
        self.last_notified = Some(key);
        if self.listener.is_some() {
            let snapshot = self.get_state();
            if let Some(listener) = self.listener.as_mut() {
                listener(&snapshot);
            }
        }
    }
}
