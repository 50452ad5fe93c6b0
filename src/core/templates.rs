//! Template registry — the fixed catalog of named game generators.
//!
//! Templates are plain data records: an id, capability requirements,
//! and two pure functions. `build_base` is a function of the seed
//! alone; `apply_modifiers` folds an `Intent` into a built description
//! without ever removing anything below the template minimum. Same
//! seed, same output, byte for byte — reproducibility is a contract
//! here, not an optimization.

use rand::rngs::StdRng;
use rand::Rng;
use rustc_hash::FxHashMap;
use serde_json::json;

use crate::core::seed::rng_for;
use crate::schema::bounds;
use crate::schema::capability::{
    CameraMode, Category, ControlScheme, EntityKind, RenderShape, RuleType, WorldMode,
};
use crate::schema::description::{
    Asset, Camera, Controls, Description, HudElement, PhysicsParams, Ui, UiMessages, World,
};
use crate::schema::entity::{Collider, Entity, Render, Vec2};
use crate::schema::intent::{Difficulty, Intent, Pace};
use crate::schema::rule::{params, Rule};

/// RNG stream ids, so base building and modifier application draw from
/// independent deterministic sequences.
const STREAM_BASE: u64 = 0;
const STREAM_MODIFIERS: u64 = 1;

/// A template-mandated entity: the repairer re-injects one of these if
/// the candidate description lost it.
#[derive(Debug, Clone, Copy)]
pub struct RequiredEntity {
    pub kind: EntityKind,
    pub tag: Option<&'static str>,
}

/// A named generator in the registry. Both functions are pure and
/// deterministic in their arguments.
#[derive(Clone, Copy)]
pub struct TemplateDefinition {
    pub id: &'static str,
    pub category: Category,
    pub world_mode: WorldMode,
    pub required_entities: &'static [RequiredEntity],
    pub required_controls: ControlScheme,
    pub required_rules: &'static [RuleType],
    pub build_base: fn(u32) -> Description,
    pub apply_modifiers: fn(&Description, &Intent, u32) -> Description,
}

impl std::fmt::Debug for TemplateDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateDefinition")
            .field("id", &self.id)
            .field("category", &self.category)
            .field("world_mode", &self.world_mode)
            .finish()
    }
}

/// Immutable registry of all known templates, keyed by id. Built once;
/// `get` falls back to the default template for unknown ids.
#[derive(Debug)]
pub struct TemplateRegistry {
    templates: FxHashMap<&'static str, TemplateDefinition>,
    default_id: &'static str,
}

impl TemplateRegistry {
    /// The standard catalog.
    pub fn standard() -> Self {
        let mut templates = FxHashMap::default();
        for def in [
            MINI_GOLF,
            DODGE_ARENA,
            RUNNER,
            SHOOTER,
            PLACEMENT,
            ARCADE,
        ] {
            templates.insert(def.id, def);
        }
        Self {
            templates,
            default_id: "arcade",
        }
    }

    /// Lookup by id, falling back to the default template.
    pub fn get(&self, id: &str) -> &TemplateDefinition {
        self.templates
            .get(id)
            .unwrap_or_else(|| &self.templates[self.default_id])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.templates.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

// ---------------------------------------------------------------------------
// Shared builder helpers
// ---------------------------------------------------------------------------

const WALL_THICKNESS: f32 = 16.0;

fn wall(id: &str, position: Vec2, size: Vec2) -> Entity {
    Entity {
        id: id.to_string(),
        kind: EntityKind::Wall,
        position,
        velocity: Vec2::default(),
        size,
        rotation: 0.0,
        render: Render::shape(RenderShape::Rect, "#3a3f4b"),
        collider: Collider::static_rect(),
        tags: vec!["wall".to_string(), "boundary".to_string()],
    }
}

/// Boundary walls just inside the world edges, tiled into segments so
/// every wall entity stays within the entity size cap.
fn boundary_walls(world: Vec2) -> Vec<Entity> {
    let t = WALL_THICKNESS;
    let mut walls = Vec::new();
    edge_walls(&mut walls, "wall_top", true, t * 0.5, world);
    edge_walls(&mut walls, "wall_bottom", true, world.y - t * 0.5, world);
    edge_walls(&mut walls, "wall_left", false, t * 0.5, world);
    edge_walls(&mut walls, "wall_right", false, world.x - t * 0.5, world);
    walls
}

fn edge_walls(out: &mut Vec<Entity>, prefix: &str, horizontal: bool, cross: f32, world: Vec2) {
    let length = if horizontal { world.x } else { world.y };
    let pieces = (length / bounds::ENTITY_SIZE_MAX).ceil().max(1.0);
    let span = length / pieces;
    for i in 0..pieces as usize {
        let along = span * (i as f32 + 0.5);
        let (position, size) = if horizontal {
            (Vec2::new(along, cross), Vec2::new(span, WALL_THICKNESS))
        } else {
            (Vec2::new(cross, along), Vec2::new(WALL_THICKNESS, span))
        };
        out.push(wall(&format!("{}_{}", prefix, i), position, size));
    }
}

/// Seed-stable position inside the playable area.
fn place_within(rng: &mut StdRng, world: Vec2, margin: f32) -> Vec2 {
    Vec2::new(
        rng.gen_range(margin..world.x - margin),
        rng.gen_range(margin..world.y - margin),
    )
}

fn pick<'a>(rng: &mut StdRng, options: &'a [&'a str]) -> &'a str {
    options[rng.gen_range(0..options.len())]
}

fn base_ui(hud: &[(&str, &str)]) -> Ui {
    Ui {
        hud: hud
            .iter()
            .map(|(element, label)| HudElement::new(element, label))
            .collect(),
        messages: Some(UiMessages {
            start: Some("Ready?".to_string()),
            win: Some("You win!".to_string()),
            lose: Some("Game over".to_string()),
        }),
    }
}

fn description_shell(
    template_id: &str,
    seed: u32,
    title: String,
    blurb: &str,
    category: Category,
    world: World,
    controls: ControlScheme,
) -> Description {
    Description {
        id: format!("{}_{:08x}", template_id, seed),
        title,
        category,
        description: blurb.to_string(),
        assets: Vec::new(),
        world,
        entities: Vec::new(),
        rules: Vec::new(),
        controls: Controls::for_scheme(controls),
        ui: Ui::default(),
    }
}

// ---------------------------------------------------------------------------
// Mini golf
// ---------------------------------------------------------------------------

const MINI_GOLF: TemplateDefinition = TemplateDefinition {
    id: "mini_golf",
    category: Category::Golf,
    world_mode: WorldMode::TopDown,
    required_entities: &[
        RequiredEntity {
            kind: EntityKind::Ball,
            tag: Some("player"),
        },
        RequiredEntity {
            kind: EntityKind::Cup,
            tag: Some("goal"),
        },
    ],
    required_controls: ControlScheme::DragLaunch,
    required_rules: &[RuleType::WinOnGoal],
    build_base: build_mini_golf,
    apply_modifiers: apply_standard_modifiers,
};

fn build_mini_golf(seed: u32) -> Description {
    let mut rng = rng_for(seed, STREAM_BASE);
    let size = Vec2::new(800.0, 600.0);
    let title = format!(
        "{} {}",
        pick(&mut rng, &["Putt", "Fairway", "Clubhouse", "Rolling"]),
        pick(&mut rng, &["Haven", "Drift", "Greens", "Challenge"])
    );

    let world = World {
        size,
        mode: WorldMode::TopDown,
        physics: PhysicsParams {
            gravity: Vec2::default(),
            friction: 0.985,
            restitution: 0.8,
            time_step: bounds::DEFAULT_TIME_STEP,
        },
        camera: Camera::default(),
    };

    let mut desc = description_shell(
        "mini_golf",
        seed,
        title,
        "Drag to aim, release to putt. Sink the ball to win.",
        Category::Golf,
        world,
        ControlScheme::DragLaunch,
    );

    desc.entities = boundary_walls(size);

    // Ball on the left third, cup on the right third.
    let ball_pos = Vec2::new(
        rng.gen_range(80.0..size.x * 0.33),
        rng.gen_range(80.0..size.y - 80.0),
    );
    desc.entities.push(Entity {
        id: "ball".to_string(),
        kind: EntityKind::Ball,
        position: ball_pos,
        velocity: Vec2::default(),
        size: Vec2::new(14.0, 14.0),
        rotation: 0.0,
        render: Render::shape(RenderShape::Circle, "#f5f5f5"),
        collider: Collider::solid_circle(),
        tags: vec!["player".to_string(), "ball".to_string()],
    });

    let cup_pos = Vec2::new(
        rng.gen_range(size.x * 0.66..size.x - 80.0),
        rng.gen_range(80.0..size.y - 80.0),
    );
    desc.entities.push(Entity {
        id: "cup".to_string(),
        kind: EntityKind::Cup,
        position: cup_pos,
        velocity: Vec2::default(),
        size: Vec2::new(22.0, 22.0),
        rotation: 0.0,
        render: Render::shape(RenderShape::Circle, "#15181d"),
        collider: Collider::sensor_circle(),
        tags: vec!["goal".to_string(), "cup".to_string()],
    });

    let bumper_count = rng.gen_range(3..=5);
    for i in 0..bumper_count {
        desc.entities.push(Entity {
            id: format!("bumper_{}", i),
            kind: EntityKind::Bumper,
            position: place_within(&mut rng, size, 120.0),
            velocity: Vec2::default(),
            size: Vec2::new(32.0, 32.0),
            rotation: 0.0,
            render: Render::shape(RenderShape::Circle, "#e8554d"),
            collider: Collider {
                collider_type: crate::schema::capability::ColliderType::Circle,
                is_static: true,
                is_sensor: false,
            },
            tags: vec!["bumper".to_string()],
        });
    }

    let sand_count = rng.gen_range(1..=2);
    for i in 0..sand_count {
        desc.entities.push(Entity {
            id: format!("sand_{}", i),
            kind: EntityKind::Hazard,
            position: place_within(&mut rng, size, 140.0),
            velocity: Vec2::default(),
            size: Vec2::new(64.0, 48.0),
            rotation: 0.0,
            render: Render::shape(RenderShape::Rect, "#d9c27a"),
            collider: Collider {
                collider_type: crate::schema::capability::ColliderType::Rect,
                is_static: true,
                is_sensor: true,
            },
            tags: vec!["hazard".to_string(), "sand".to_string()],
        });
    }

    desc.rules = vec![Rule::new(RuleType::WinOnGoal)
        .with_param(params::TARGET_TAG, json!("goal"))
        .with_param(params::MAX_SPEED, json!(40.0))];
    desc.ui = base_ui(&[("strokes", "Strokes")]);
    desc
}

// ---------------------------------------------------------------------------
// Dodge arena
// ---------------------------------------------------------------------------

const DODGE_ARENA: TemplateDefinition = TemplateDefinition {
    id: "dodge_arena",
    category: Category::Dodge,
    world_mode: WorldMode::TopDown,
    required_entities: &[
        RequiredEntity {
            kind: EntityKind::Player,
            tag: Some("player"),
        },
        RequiredEntity {
            kind: EntityKind::Hazard,
            tag: None,
        },
        RequiredEntity {
            kind: EntityKind::Pickup,
            tag: None,
        },
    ],
    required_controls: ControlScheme::KeyboardMove,
    required_rules: &[RuleType::Score, RuleType::WinOnScore, RuleType::LoseOnLives],
    build_base: build_dodge_arena,
    apply_modifiers: apply_standard_modifiers,
};

fn build_dodge_arena(seed: u32) -> Description {
    let mut rng = rng_for(seed, STREAM_BASE);
    let size = Vec2::new(800.0, 600.0);
    let title = format!(
        "{} {}",
        pick(&mut rng, &["Hazard", "Panic", "Whirl", "Scatter"]),
        pick(&mut rng, &["Arena", "Pit", "Gauntlet", "Floor"])
    );

    let world = World {
        size,
        mode: WorldMode::TopDown,
        physics: PhysicsParams {
            gravity: Vec2::default(),
            friction: 0.90,
            restitution: 0.9,
            time_step: bounds::DEFAULT_TIME_STEP,
        },
        camera: Camera::default(),
    };

    let mut desc = description_shell(
        "dodge_arena",
        seed,
        title,
        "Weave between hazards and grab every star.",
        Category::Dodge,
        world,
        ControlScheme::KeyboardMove,
    );

    desc.entities = boundary_walls(size);
    desc.entities.push(Entity {
        id: "player".to_string(),
        kind: EntityKind::Player,
        position: Vec2::new(size.x * 0.5, size.y * 0.5),
        velocity: Vec2::default(),
        size: Vec2::new(22.0, 22.0),
        rotation: 0.0,
        render: Render::shape(RenderShape::Circle, "#58c4dd"),
        collider: Collider::solid_circle(),
        tags: vec!["player".to_string()],
    });

    let hazard_count = rng.gen_range(5..=8);
    for i in 0..hazard_count {
        let speed = rng.gen_range(60.0..160.0);
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        desc.entities.push(Entity {
            id: format!("hazard_{}", i),
            kind: EntityKind::Hazard,
            position: place_within(&mut rng, size, 90.0),
            velocity: Vec2::new(angle.cos() * speed, angle.sin() * speed),
            size: Vec2::new(26.0, 26.0),
            rotation: 0.0,
            render: Render::shape(RenderShape::Diamond, "#e8554d"),
            collider: Collider::solid_circle(),
            tags: vec!["hazard".to_string()],
        });
    }

    let pickup_count = rng.gen_range(5..=7);
    for i in 0..pickup_count {
        desc.entities.push(Entity {
            id: format!("star_{}", i),
            kind: EntityKind::Pickup,
            position: place_within(&mut rng, size, 70.0),
            velocity: Vec2::default(),
            size: Vec2::new(18.0, 18.0),
            rotation: 0.0,
            render: Render::shape(RenderShape::Star, "#f4d35e"),
            collider: Collider::sensor_circle(),
            tags: vec!["pickup".to_string(), "star".to_string()],
        });
    }

    desc.rules = vec![
        Rule::new(RuleType::Score).with_param(params::POINTS, json!(1)),
        Rule::new(RuleType::WinOnScore).with_param(params::TARGET, json!(5)),
        Rule::new(RuleType::LoseOnLives).with_param(params::LIVES, json!(3)),
    ];
    desc.ui = base_ui(&[("score", "Stars"), ("lives", "Lives")]);
    desc
}

// ---------------------------------------------------------------------------
// Runner (side view)
// ---------------------------------------------------------------------------

const RUNNER: TemplateDefinition = TemplateDefinition {
    id: "runner",
    category: Category::Runner,
    world_mode: WorldMode::SideView,
    required_entities: &[
        RequiredEntity {
            kind: EntityKind::Player,
            tag: Some("player"),
        },
        RequiredEntity {
            kind: EntityKind::Goal,
            tag: Some("goal"),
        },
    ],
    required_controls: ControlScheme::KeyboardMove,
    required_rules: &[RuleType::WinOnGoal, RuleType::LoseOnLives],
    build_base: build_runner,
    apply_modifiers: apply_standard_modifiers,
};

fn build_runner(seed: u32) -> Description {
    let mut rng = rng_for(seed, STREAM_BASE);
    let size = Vec2::new(1200.0, 600.0);
    let title = format!(
        "{} {}",
        pick(&mut rng, &["Long", "Breakneck", "Morning", "Last"]),
        pick(&mut rng, &["Run", "Sprint", "Trail", "Stretch"])
    );

    let world = World {
        size,
        mode: WorldMode::SideView,
        physics: PhysicsParams {
            gravity: Vec2::new(0.0, 1100.0),
            friction: 0.96,
            restitution: 0.05,
            time_step: bounds::DEFAULT_TIME_STEP,
        },
        camera: Camera {
            mode: CameraMode::Follow,
            target_id: Some("player".to_string()),
        },
    };

    let mut desc = description_shell(
        "runner",
        seed,
        title,
        "Race to the flag. Spikes cost a life.",
        Category::Runner,
        world,
        ControlScheme::KeyboardMove,
    );

    desc.entities = boundary_walls(size);
    let ground_y = size.y - WALL_THICKNESS - 16.0;

    desc.entities.push(Entity {
        id: "player".to_string(),
        kind: EntityKind::Player,
        position: Vec2::new(70.0, ground_y),
        velocity: Vec2::default(),
        size: Vec2::new(24.0, 32.0),
        rotation: 0.0,
        render: Render::shape(RenderShape::Rect, "#58c4dd"),
        collider: Collider {
            collider_type: crate::schema::capability::ColliderType::Rect,
            is_static: false,
            is_sensor: false,
        },
        tags: vec!["player".to_string()],
    });

    desc.entities.push(Entity {
        id: "finish".to_string(),
        kind: EntityKind::Goal,
        position: Vec2::new(size.x - 60.0, ground_y),
        velocity: Vec2::default(),
        size: Vec2::new(26.0, 48.0),
        rotation: 0.0,
        render: Render::emoji("🚩"),
        collider: Collider {
            collider_type: crate::schema::capability::ColliderType::Rect,
            is_static: true,
            is_sensor: true,
        },
        tags: vec!["goal".to_string(), "finish".to_string()],
    });

    // Platforms stepping across the level.
    let platform_count = rng.gen_range(3..=5);
    for i in 0..platform_count {
        let x = size.x * (0.2 + 0.6 * (i as f32 + 0.5) / platform_count as f32)
            + rng.gen_range(-40.0..40.0);
        let y = rng.gen_range(size.y * 0.45..size.y * 0.75);
        desc.entities.push(Entity {
            id: format!("platform_{}", i),
            kind: EntityKind::Wall,
            position: Vec2::new(x, y),
            velocity: Vec2::default(),
            size: Vec2::new(rng.gen_range(90.0..150.0), 16.0),
            rotation: 0.0,
            render: Render::shape(RenderShape::Rect, "#6b7b5e"),
            collider: Collider::static_rect(),
            tags: vec!["wall".to_string(), "platform".to_string()],
        });
    }

    let spike_count = rng.gen_range(3..=6);
    for i in 0..spike_count {
        desc.entities.push(Entity {
            id: format!("spike_{}", i),
            kind: EntityKind::Hazard,
            position: Vec2::new(rng.gen_range(size.x * 0.2..size.x * 0.85), ground_y + 6.0),
            velocity: Vec2::default(),
            size: Vec2::new(20.0, 20.0),
            rotation: 0.0,
            render: Render::shape(RenderShape::Triangle, "#e8554d"),
            collider: Collider {
                collider_type: crate::schema::capability::ColliderType::Rect,
                is_static: true,
                is_sensor: true,
            },
            tags: vec!["hazard".to_string(), "spike".to_string()],
        });
    }

    let coin_count = rng.gen_range(4..=8);
    for i in 0..coin_count {
        desc.entities.push(Entity {
            id: format!("coin_{}", i),
            kind: EntityKind::Pickup,
            position: Vec2::new(
                rng.gen_range(size.x * 0.15..size.x * 0.9),
                rng.gen_range(size.y * 0.35..ground_y - 30.0),
            ),
            velocity: Vec2::default(),
            size: Vec2::new(16.0, 16.0),
            rotation: 0.0,
            render: Render::shape(RenderShape::Circle, "#f4d35e"),
            collider: Collider::sensor_circle(),
            tags: vec!["pickup".to_string(), "coin".to_string()],
        });
    }

    desc.rules = vec![
        Rule::new(RuleType::WinOnGoal)
            .with_param(params::TARGET_TAG, json!("goal"))
            .with_param(params::MAX_SPEED, json!(bounds::VELOCITY_MAX)),
        Rule::new(RuleType::LoseOnLives).with_param(params::LIVES, json!(3)),
        Rule::new(RuleType::Score).with_param(params::POINTS, json!(1)),
    ];
    desc.ui = base_ui(&[("score", "Coins"), ("lives", "Lives")]);
    desc
}

// ---------------------------------------------------------------------------
// Shooter
// ---------------------------------------------------------------------------

const SHOOTER: TemplateDefinition = TemplateDefinition {
    id: "shooter",
    category: Category::Shooter,
    world_mode: WorldMode::TopDown,
    required_entities: &[
        RequiredEntity {
            kind: EntityKind::Player,
            tag: Some("player"),
        },
        RequiredEntity {
            kind: EntityKind::Enemy,
            tag: None,
        },
    ],
    required_controls: ControlScheme::AimShoot,
    required_rules: &[RuleType::Score, RuleType::WinOnScore, RuleType::LoseOnLives],
    build_base: build_shooter,
    apply_modifiers: apply_standard_modifiers,
};

fn build_shooter(seed: u32) -> Description {
    let mut rng = rng_for(seed, STREAM_BASE);
    let size = Vec2::new(800.0, 600.0);
    let title = format!(
        "{} {}",
        pick(&mut rng, &["Last", "Static", "Meteor", "Drift"]),
        pick(&mut rng, &["Stand", "Salvo", "Barrage", "Patrol"])
    );

    let world = World {
        size,
        mode: WorldMode::TopDown,
        physics: PhysicsParams {
            gravity: Vec2::default(),
            friction: 0.94,
            restitution: 1.0,
            time_step: bounds::DEFAULT_TIME_STEP,
        },
        camera: Camera::default(),
    };

    let mut desc = description_shell(
        "shooter",
        seed,
        title,
        "Aim with the pointer, click to fire. Clear every drone.",
        Category::Shooter,
        world,
        ControlScheme::AimShoot,
    );

    desc.entities = boundary_walls(size);
    desc.entities.push(Entity {
        id: "player".to_string(),
        kind: EntityKind::Player,
        position: Vec2::new(size.x * 0.5, size.y - 70.0),
        velocity: Vec2::default(),
        size: Vec2::new(26.0, 26.0),
        rotation: 0.0,
        render: Render::shape(RenderShape::Triangle, "#58c4dd"),
        collider: Collider::solid_circle(),
        tags: vec!["player".to_string(), "ship".to_string()],
    });

    let enemy_count = rng.gen_range(5..=8);
    for i in 0..enemy_count {
        let speed = rng.gen_range(40.0..110.0);
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        desc.entities.push(Entity {
            id: format!("drone_{}", i),
            kind: EntityKind::Enemy,
            position: Vec2::new(
                rng.gen_range(60.0..size.x - 60.0),
                rng.gen_range(60.0..size.y * 0.55),
            ),
            velocity: Vec2::new(angle.cos() * speed, angle.sin() * speed),
            size: Vec2::new(24.0, 24.0),
            rotation: 0.0,
            render: Render::shape(RenderShape::Diamond, "#b678e0"),
            collider: Collider {
                collider_type: crate::schema::capability::ColliderType::Circle,
                is_static: false,
                is_sensor: true,
            },
            tags: vec!["enemy".to_string(), "target".to_string()],
        });
    }

    desc.rules = vec![
        Rule::new(RuleType::Score).with_param(params::POINTS, json!(1)),
        Rule::new(RuleType::WinOnScore).with_param(params::TARGET, json!(enemy_count)),
        Rule::new(RuleType::LoseOnLives).with_param(params::LIVES, json!(3)),
    ];
    desc.ui = base_ui(&[("score", "Hits"), ("lives", "Hull")]);
    desc
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

const PLACEMENT: TemplateDefinition = TemplateDefinition {
    id: "placement",
    category: Category::Placement,
    world_mode: WorldMode::TopDown,
    required_entities: &[RequiredEntity {
        kind: EntityKind::Player,
        tag: Some("player"),
    }],
    required_controls: ControlScheme::ClickPlace,
    required_rules: &[RuleType::Score, RuleType::WinOnScore],
    build_base: build_placement,
    apply_modifiers: apply_standard_modifiers,
};

fn build_placement(seed: u32) -> Description {
    let mut rng = rng_for(seed, STREAM_BASE);
    let size = Vec2::new(800.0, 600.0);
    let title = format!(
        "{} {}",
        pick(&mut rng, &["Quiet", "Tiny", "Walled", "Sunny"]),
        pick(&mut rng, &["Garden", "Plot", "Courtyard", "Meadow"])
    );

    let world = World {
        size,
        mode: WorldMode::TopDown,
        physics: PhysicsParams {
            gravity: Vec2::default(),
            friction: 0.85,
            restitution: 0.0,
            time_step: bounds::DEFAULT_TIME_STEP,
        },
        camera: Camera::default(),
    };

    let mut desc = description_shell(
        "placement",
        seed,
        title,
        "Click to plant. Fill the plot to finish the garden.",
        Category::Placement,
        world,
        ControlScheme::ClickPlace,
    );

    desc.entities = boundary_walls(size);
    desc.entities.push(Entity {
        id: "player".to_string(),
        kind: EntityKind::Player,
        position: Vec2::new(size.x * 0.5, size.y * 0.5),
        velocity: Vec2::default(),
        size: Vec2::new(16.0, 16.0),
        rotation: 0.0,
        render: Render::shape(RenderShape::Circle, "#58c4dd"),
        collider: Collider::solid_circle(),
        tags: vec!["player".to_string(), "cursor".to_string()],
    });

    let plot_count = rng.gen_range(2..=4);
    for i in 0..plot_count {
        desc.entities.push(Entity {
            id: format!("plot_{}", i),
            kind: EntityKind::Goal,
            position: place_within(&mut rng, size, 110.0),
            velocity: Vec2::default(),
            size: Vec2::new(90.0, 70.0),
            rotation: 0.0,
            render: Render::shape(RenderShape::Rect, "#7a5c43"),
            collider: Collider {
                collider_type: crate::schema::capability::ColliderType::Rect,
                is_static: true,
                is_sensor: true,
            },
            tags: vec!["plot".to_string()],
        });
    }

    desc.rules = vec![
        Rule::new(RuleType::Score).with_param(params::POINTS, json!(1)),
        Rule::new(RuleType::WinOnScore).with_param(params::TARGET, json!(8)),
    ];
    desc.ui = base_ui(&[("score", "Planted")]);
    desc
}

// ---------------------------------------------------------------------------
// Arcade (default template)
// ---------------------------------------------------------------------------

const ARCADE: TemplateDefinition = TemplateDefinition {
    id: "arcade",
    category: Category::Arcade,
    world_mode: WorldMode::TopDown,
    required_entities: &[
        RequiredEntity {
            kind: EntityKind::Player,
            tag: Some("player"),
        },
        RequiredEntity {
            kind: EntityKind::Pickup,
            tag: None,
        },
    ],
    required_controls: ControlScheme::KeyboardMove,
    required_rules: &[RuleType::Score, RuleType::WinOnScore],
    build_base: build_arcade,
    apply_modifiers: apply_standard_modifiers,
};

fn build_arcade(seed: u32) -> Description {
    let mut rng = rng_for(seed, STREAM_BASE);
    let size = Vec2::new(800.0, 600.0);
    let title = format!(
        "{} {}",
        pick(&mut rng, &["Token", "Coin", "Prize", "Bonus"]),
        pick(&mut rng, &["Chase", "Rush", "Hunt", "Round"])
    );

    let world = World {
        size,
        mode: WorldMode::TopDown,
        physics: PhysicsParams {
            gravity: Vec2::default(),
            friction: 0.90,
            restitution: 0.4,
            time_step: bounds::DEFAULT_TIME_STEP,
        },
        camera: Camera::default(),
    };

    let mut desc = description_shell(
        "arcade",
        seed,
        title,
        "Collect the tokens before the clock runs out.",
        Category::Arcade,
        world,
        ControlScheme::KeyboardMove,
    );

    desc.entities = boundary_walls(size);
    desc.entities.push(Entity {
        id: "player".to_string(),
        kind: EntityKind::Player,
        position: Vec2::new(size.x * 0.5, size.y * 0.5),
        velocity: Vec2::default(),
        size: Vec2::new(22.0, 22.0),
        rotation: 0.0,
        render: Render::shape(RenderShape::Circle, "#58c4dd"),
        collider: Collider::solid_circle(),
        tags: vec!["player".to_string()],
    });

    let pickup_count = rng.gen_range(5..=8);
    for i in 0..pickup_count {
        desc.entities.push(Entity {
            id: format!("token_{}", i),
            kind: EntityKind::Pickup,
            position: place_within(&mut rng, size, 70.0),
            velocity: Vec2::default(),
            size: Vec2::new(16.0, 16.0),
            rotation: 0.0,
            render: Render::shape(RenderShape::Circle, "#f4d35e"),
            collider: Collider::sensor_circle(),
            tags: vec!["pickup".to_string(), "token".to_string()],
        });
    }

    let hazard_count = rng.gen_range(2..=4);
    for i in 0..hazard_count {
        let speed = rng.gen_range(50.0..120.0);
        let angle = rng.gen_range(0.0..std::f32::consts::TAU);
        desc.entities.push(Entity {
            id: format!("hazard_{}", i),
            kind: EntityKind::Hazard,
            position: place_within(&mut rng, size, 100.0),
            velocity: Vec2::new(angle.cos() * speed, angle.sin() * speed),
            size: Vec2::new(24.0, 24.0),
            rotation: 0.0,
            render: Render::shape(RenderShape::Diamond, "#e8554d"),
            collider: Collider::solid_circle(),
            tags: vec!["hazard".to_string()],
        });
    }

    desc.rules = vec![
        Rule::new(RuleType::Score).with_param(params::POINTS, json!(1)),
        Rule::new(RuleType::WinOnScore).with_param(params::TARGET, json!(5)),
        Rule::new(RuleType::LoseOnLives).with_param(params::LIVES, json!(3)),
        Rule::new(RuleType::LoseOnTimer).with_param(params::SECONDS, json!(60)),
    ];
    desc.ui = base_ui(&[("score", "Tokens"), ("lives", "Lives"), ("timer", "Time")]);
    desc
}

// ---------------------------------------------------------------------------
// Modifier application (shared by all templates)
// ---------------------------------------------------------------------------

/// Theme tag → decor item name and glyph.
const THEME_DECOR: &[(&str, &str, &str)] = &[
    ("space", "star", "✨"),
    ("space", "planet", "🪐"),
    ("neon", "glow", "💠"),
    ("forest", "tree", "🌲"),
    ("forest", "bush", "🌿"),
    ("spooky", "tombstone", "🪦"),
    ("spooky", "pumpkin", "🎃"),
    ("ocean", "coral", "🪸"),
    ("ocean", "shell", "🐚"),
    ("ice", "snowflake", "❄️"),
    ("lava", "ember", "🔥"),
    ("desert", "cactus", "🌵"),
    ("candy", "lollipop", "🍭"),
    ("retro", "cherry", "🍒"),
];

const THEME_ADJECTIVES: &[(&str, &str)] = &[
    ("space", "Cosmic"),
    ("neon", "Neon"),
    ("forest", "Sylvan"),
    ("spooky", "Haunted"),
    ("ocean", "Tidal"),
    ("ice", "Frozen"),
    ("lava", "Molten"),
    ("desert", "Dune"),
    ("candy", "Sugar"),
    ("retro", "Pixel"),
];

/// Nouns the counts table can request, mapped onto entity kinds.
const NOUN_KINDS: &[(&str, EntityKind)] = &[
    ("enemy", EntityKind::Enemy),
    ("enemie", EntityKind::Enemy), // "enemies" singularized
    ("drone", EntityKind::Enemy),
    ("ghost", EntityKind::Hazard),
    ("hazard", EntityKind::Hazard),
    ("spike", EntityKind::Hazard),
    ("bumper", EntityKind::Bumper),
    ("pickup", EntityKind::Pickup),
    ("coin", EntityKind::Pickup),
    ("star", EntityKind::Pickup),
    ("token", EntityKind::Pickup),
    ("wall", EntityKind::Wall),
];

/// Shared modifier pass: grow entity populations toward requested
/// counts (never shrink), tune physics for difficulty and pace, and
/// append decor clusters for each theme tag. Pure in its inputs.
fn apply_standard_modifiers(desc: &Description, intent: &Intent, seed: u32) -> Description {
    let mut out = desc.clone();
    let mut rng = rng_for(seed, STREAM_MODIFIERS);

    retitle_for_theme(&mut out, intent);
    tune_physics(&mut out, intent);
    grow_counts(&mut out, intent, &mut rng);
    append_theme_decor(&mut out, intent, &mut rng);
    out
}

fn retitle_for_theme(desc: &mut Description, intent: &Intent) {
    if let Some(first) = intent.theme_tags.first() {
        if let Some((_, adjective)) = THEME_ADJECTIVES.iter().find(|(tag, _)| tag == first) {
            desc.title = format!("{} {}", adjective, desc.title);
        }
    }
}

fn tune_physics(desc: &mut Description, intent: &Intent) {
    let physics = &mut desc.world.physics;
    match intent.difficulty {
        // Easier games damp harder, so everything is more controllable.
        Difficulty::Easy => physics.friction = (physics.friction - 0.02).max(0.0),
        Difficulty::Medium => {}
        Difficulty::Hard => physics.friction = (physics.friction + 0.01).min(1.0),
    }
    match intent.pace {
        Pace::Slow => {
            physics.gravity.y *= 0.8;
            scale_dynamic_velocities(desc, 0.75);
        }
        Pace::Medium => {}
        Pace::Fast => {
            physics.gravity.y *= 1.2;
            scale_dynamic_velocities(desc, 1.35);
        }
    }
}

fn scale_dynamic_velocities(desc: &mut Description, factor: f32) {
    for entity in &mut desc.entities {
        if !entity.collider.is_static && !entity.has_tag("player") {
            entity.velocity.x *= factor;
            entity.velocity.y *= factor;
        }
    }
}

/// Add entities toward each requested count. Matching is by kind name
/// or tag; existing entities are never removed, so the template
/// minimum always survives.
fn grow_counts(desc: &mut Description, intent: &Intent, rng: &mut StdRng) {
    let mut requests: Vec<(&String, &u32)> = intent.counts.iter().collect();
    requests.sort_unstable_by(|a, b| a.0.cmp(b.0));

    for (noun, target) in requests {
        if intent.constraints.excludes_term(noun) {
            continue;
        }
        // Requests beyond the entity cap would only be truncated again
        // by the normalizer.
        let target = (*target).min(bounds::MAX_ENTITIES as u32);
        let matching = desc
            .entities
            .iter()
            .filter(|e| entity_matches_noun(e, noun))
            .count() as u32;
        if matching >= target {
            continue;
        }

        let prototype = desc
            .entities
            .iter()
            .find(|e| entity_matches_noun(e, noun))
            .cloned();
        let kind = prototype.as_ref().map(|p| p.kind).or_else(|| {
            NOUN_KINDS
                .iter()
                .find(|(name, _)| name == noun)
                .map(|(_, kind)| *kind)
        });
        let Some(kind) = kind else {
            continue;
        };

        for i in matching..target {
            let mut entity = prototype.clone().unwrap_or_else(|| default_for_kind(kind, noun));
            entity.id = format!("{}_{}", noun, i);
            entity.position = place_within(rng, desc.world.size, 70.0);
            if !entity.collider.is_static && entity.velocity.length() > 0.0 {
                let angle = rng.gen_range(0.0..std::f32::consts::TAU);
                let speed = entity.velocity.length();
                entity.velocity = Vec2::new(angle.cos() * speed, angle.sin() * speed);
            }
            if !entity.tags.iter().any(|t| t == noun) {
                entity.tags.push(noun.clone());
            }
            desc.entities.push(entity);
        }
    }
}

fn entity_matches_noun(entity: &Entity, noun: &str) -> bool {
    let kind_name = serde_json::to_value(entity.kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    kind_name == noun || entity.tags.iter().any(|t| t == noun)
}

/// Minimal sensible entity for a kind, used both when a count request
/// names a kind with no prototype in the description and when the
/// repairer re-injects a template-mandated entity.
pub(crate) fn default_for_kind(kind: EntityKind, noun: &str) -> Entity {
    let (render, collider) = match kind {
        EntityKind::Player | EntityKind::Ball => (
            Render::shape(RenderShape::Circle, "#58c4dd"),
            Collider::solid_circle(),
        ),
        EntityKind::Goal | EntityKind::Cup => (
            Render::shape(RenderShape::Circle, "#15181d"),
            Collider::sensor_circle(),
        ),
        EntityKind::Pickup => (
            Render::shape(RenderShape::Circle, "#f4d35e"),
            Collider::sensor_circle(),
        ),
        EntityKind::Hazard => (
            Render::shape(RenderShape::Diamond, "#e8554d"),
            Collider::solid_circle(),
        ),
        EntityKind::Enemy => (
            Render::shape(RenderShape::Diamond, "#b678e0"),
            Collider::solid_circle(),
        ),
        EntityKind::Bumper => (
            Render::shape(RenderShape::Circle, "#e8554d"),
            Collider {
                collider_type: crate::schema::capability::ColliderType::Circle,
                is_static: true,
                is_sensor: false,
            },
        ),
        EntityKind::Wall => (
            Render::shape(RenderShape::Rect, "#3a3f4b"),
            Collider::static_rect(),
        ),
        _ => (Render::default(), Collider::sensor_circle()),
    };
    Entity {
        id: noun.to_string(),
        kind,
        position: Vec2::default(),
        velocity: Vec2::default(),
        size: Vec2::new(22.0, 22.0),
        rotation: 0.0,
        render,
        collider,
        tags: vec![kind_tag(kind).to_string()],
    }
}

pub(crate) fn kind_tag(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Player | EntityKind::Ball => "player",
        EntityKind::Goal | EntityKind::Cup => "goal",
        EntityKind::Pickup => "pickup",
        EntityKind::Hazard => "hazard",
        EntityKind::Enemy | EntityKind::Npc => "enemy",
        EntityKind::Bumper => "bumper",
        EntityKind::Wall => "wall",
        _ => "decor",
    }
}

/// Append a visually tagged decor cluster per theme tag. Decor is
/// sensor-only, carries no gameplay tags, and is therefore incapable
/// of satisfying any win condition.
fn append_theme_decor(desc: &mut Description, intent: &Intent, rng: &mut StdRng) {
    for theme in &intent.theme_tags {
        if intent.constraints.excludes_term(theme) {
            continue;
        }
        let items: Vec<_> = THEME_DECOR
            .iter()
            .filter(|(tag, _, _)| tag == theme)
            .collect();
        if items.is_empty() {
            continue;
        }
        let cluster = rng.gen_range(3..=6);
        for i in 0..cluster {
            let (_, item, glyph) = items[rng.gen_range(0..items.len())];
            if intent.constraints.excludes_term(item) {
                continue;
            }
            desc.entities.push(Entity {
                id: format!("decor_{}_{}", theme, i),
                kind: EntityKind::Decor,
                position: place_within(rng, desc.world.size, 40.0),
                velocity: Vec2::default(),
                size: Vec2::new(24.0, 24.0),
                rotation: 0.0,
                render: Render::emoji(glyph),
                collider: Collider::sensor_circle(),
                tags: vec!["decor".to_string(), theme.clone(), item.to_string()],
            });
        }
        desc.assets.push(Asset {
            id: format!("palette_{}", theme),
            kind: "palette".to_string(),
            value: theme.clone(),
            tags: vec![theme.clone()],
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::intent::extract_intent;

    #[test]
    fn registry_contains_standard_templates() {
        let registry = TemplateRegistry::standard();
        for id in ["mini_golf", "dodge_arena", "runner", "shooter", "placement", "arcade"] {
            assert!(registry.contains(id), "missing {}", id);
        }
    }

    #[test]
    fn unknown_id_falls_back_to_default() {
        let registry = TemplateRegistry::standard();
        assert_eq!(registry.get("quantum_chess").id, "arcade");
    }

    #[test]
    fn build_base_is_deterministic() {
        let registry = TemplateRegistry::standard();
        for id in registry.ids() {
            let template = registry.get(id);
            let a = (template.build_base)(12345);
            let b = (template.build_base)(12345);
            assert_eq!(a, b, "template {} not deterministic", id);
        }
    }

    #[test]
    fn boundary_walls_stay_within_size_bounds() {
        let walls = boundary_walls(Vec2::new(1600.0, 1200.0));
        for w in &walls {
            assert!(w.size.x <= bounds::ENTITY_SIZE_MAX, "{} too wide", w.id);
            assert!(w.size.y <= bounds::ENTITY_SIZE_MAX, "{} too tall", w.id);
            assert!(w.size.x >= bounds::ENTITY_SIZE_MIN);
            assert!(w.size.y >= bounds::ENTITY_SIZE_MIN);
        }
        // The segments jointly cover each full edge.
        let top: f32 = walls
            .iter()
            .filter(|w| w.id.starts_with("wall_top"))
            .map(|w| w.size.x)
            .sum();
        assert!((top - 1600.0).abs() < 1e-3);
        let left: f32 = walls
            .iter()
            .filter(|w| w.id.starts_with("wall_left"))
            .map(|w| w.size.y)
            .sum();
        assert!((left - 1200.0).abs() < 1e-3);
    }

    #[test]
    fn different_seeds_differ() {
        let a = build_mini_golf(1);
        let b = build_mini_golf(2);
        assert!(a.title != b.title || a.entities != b.entities);
    }

    #[test]
    fn every_base_has_player_and_win_rule() {
        let registry = TemplateRegistry::standard();
        for id in registry.ids() {
            let desc = (registry.get(id).build_base)(7);
            assert!(desc.player().is_some(), "template {} lacks player", id);
            assert!(
                desc.rules.iter().any(|r| r.rule_type.is_win()),
                "template {} lacks a win rule",
                id
            );
            assert!(!desc.title.is_empty());
        }
    }

    #[test]
    fn mini_golf_has_putting_setup() {
        let desc = build_mini_golf(99);
        assert_eq!(desc.controls.scheme, ControlScheme::DragLaunch);
        assert!(desc.world.physics.restitution > 0.0);
        assert!(desc.entities.iter().any(|e| e.has_tag("goal")));
        let win = desc
            .rules
            .iter()
            .find(|r| r.rule_type == RuleType::WinOnGoal)
            .unwrap();
        assert!(win.param_f32(params::MAX_SPEED).unwrap() > 0.0);
    }

    #[test]
    fn modifiers_add_toward_counts_never_remove() {
        let registry = TemplateRegistry::standard();
        let template = registry.get("dodge_arena");
        let base = (template.build_base)(5);
        let intent = extract_intent("dodge arena with 12 stars");
        let modified = (template.apply_modifiers)(&base, &intent, 5);
        let stars = |d: &Description| d.entities.iter().filter(|e| e.has_tag("star")).count();
        assert!(stars(&modified) >= 12);
        assert!(modified.entities.len() >= base.entities.len());
    }

    #[test]
    fn modifiers_respect_exclusions_in_counts() {
        let registry = TemplateRegistry::standard();
        let template = registry.get("dodge_arena");
        let base = (template.build_base)(5);
        let intent = extract_intent("dodge arena with 9 ghosts, no ghosts");
        let modified = (template.apply_modifiers)(&base, &intent, 5);
        assert!(!modified.entities.iter().any(|e| e.has_tag("ghost")));
    }

    #[test]
    fn theme_decor_is_appended_and_tagged() {
        let registry = TemplateRegistry::standard();
        let template = registry.get("runner");
        let base = (template.build_base)(11);
        let intent = extract_intent("forest runner");
        let modified = (template.apply_modifiers)(&base, &intent, 11);
        let decor: Vec<_> = modified
            .entities
            .iter()
            .filter(|e| e.kind == EntityKind::Decor)
            .collect();
        assert!(!decor.is_empty());
        for d in &decor {
            assert!(d.has_tag("forest"));
            assert!(!d.has_tag("goal"));
            assert!(d.collider.is_sensor);
        }
    }

    #[test]
    fn modifiers_are_deterministic() {
        let registry = TemplateRegistry::standard();
        let template = registry.get("mini_golf");
        let base = (template.build_base)(42);
        let intent = extract_intent("spooky golf with 4 bumpers");
        let a = (template.apply_modifiers)(&base, &intent, 42);
        let b = (template.apply_modifiers)(&base, &intent, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn theme_adjective_prefixes_title() {
        let registry = TemplateRegistry::standard();
        let template = registry.get("dodge_arena");
        let base = (template.build_base)(3);
        let intent = extract_intent("spooky dodge arena");
        let modified = (template.apply_modifiers)(&base, &intent, 3);
        assert!(modified.title.starts_with("Haunted "));
    }
}
