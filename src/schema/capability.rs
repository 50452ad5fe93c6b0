//! Closed capability enums and the engine capability table.
//!
//! Every enum carries a `#[serde(other)]` `Unknown` catch-all so that
//! parsing an untrusted document never fails on an unrecognized string;
//! the repairer coerces `Unknown` values to something playable and the
//! validator rejects any that remain. When the runtime grows a feature,
//! its variant is added here and to the table in `Capabilities::engine`.

use serde::{Deserialize, Serialize};

/// Broad game family. Drives template routing and theming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Golf,
    Runner,
    Shooter,
    Dodge,
    Placement,
    Platformer,
    Arcade,
    #[serde(other)]
    Unknown,
}

impl Category {
    pub const ALL: &'static [Category] = &[
        Category::Golf,
        Category::Runner,
        Category::Shooter,
        Category::Dodge,
        Category::Placement,
        Category::Platformer,
        Category::Arcade,
    ];
}

/// What role an entity plays in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Enemy,
    Projectile,
    Goal,
    Wall,
    Hazard,
    Pickup,
    Spawner,
    Decor,
    Npc,
    Ball,
    Cup,
    Bumper,
    #[serde(other)]
    Unknown,
}

impl EntityKind {
    pub const ALL: &'static [EntityKind] = &[
        EntityKind::Player,
        EntityKind::Enemy,
        EntityKind::Projectile,
        EntityKind::Goal,
        EntityKind::Wall,
        EntityKind::Hazard,
        EntityKind::Pickup,
        EntityKind::Spawner,
        EntityKind::Decor,
        EntityKind::Npc,
        EntityKind::Ball,
        EntityKind::Cup,
        EntityKind::Bumper,
    ];

    /// Whether this kind matters for play. Decor (and anything not yet
    /// coerced out of `Unknown`) is sacrificed first at the entity cap.
    pub fn is_gameplay(self) -> bool {
        !matches!(self, EntityKind::Decor | EntityKind::Unknown)
    }
}

/// Drawn representation: a colored shape or an emoji glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderType {
    Shape,
    Emoji,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderShape {
    Circle,
    Rect,
    Triangle,
    Diamond,
    Star,
    #[serde(other)]
    Unknown,
}

impl RenderShape {
    pub const ALL: &'static [RenderShape] = &[
        RenderShape::Circle,
        RenderShape::Rect,
        RenderShape::Triangle,
        RenderShape::Diamond,
        RenderShape::Star,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColliderType {
    Rect,
    Circle,
    #[serde(other)]
    Unknown,
}

/// Input scheme the runtime translates raw events through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlScheme {
    DragLaunch,
    KeyboardMove,
    AimShoot,
    ClickPlace,
    #[serde(other)]
    Unknown,
}

impl ControlScheme {
    pub const ALL: &'static [ControlScheme] = &[
        ControlScheme::DragLaunch,
        ControlScheme::KeyboardMove,
        ControlScheme::AimShoot,
        ControlScheme::ClickPlace,
    ];
}

/// Win/lose/score rule families the rule evaluator understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    Score,
    Timer,
    Lives,
    Rounds,
    Checkpoints,
    WinOnGoal,
    WinOnScore,
    LoseOnLives,
    LoseOnTimer,
    #[serde(other)]
    Unknown,
}

impl RuleType {
    pub const ALL: &'static [RuleType] = &[
        RuleType::Score,
        RuleType::Timer,
        RuleType::Lives,
        RuleType::Rounds,
        RuleType::Checkpoints,
        RuleType::WinOnGoal,
        RuleType::WinOnScore,
        RuleType::LoseOnLives,
        RuleType::LoseOnTimer,
    ];

    pub fn is_win(self) -> bool {
        matches!(self, RuleType::WinOnGoal | RuleType::WinOnScore)
    }

    pub fn is_lose(self) -> bool {
        matches!(self, RuleType::LoseOnLives | RuleType::LoseOnTimer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldMode {
    TopDown,
    SideView,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    Fixed,
    Follow,
    #[serde(other)]
    Unknown,
}

/// What the current runtime can actually simulate and draw. The
/// validator's renderer layer checks descriptions against this table,
/// and the repairer uses it to coerce drifted values.
#[derive(Debug, Clone, PartialEq)]
pub struct Capabilities {
    pub entity_kinds: &'static [EntityKind],
    pub render_shapes: &'static [RenderShape],
    pub control_schemes: &'static [ControlScheme],
    pub rule_types: &'static [RuleType],
    pub world_modes: &'static [WorldMode],
    pub camera_modes: &'static [CameraMode],
}

static ENGINE_CAPABILITIES: Capabilities = Capabilities {
    entity_kinds: EntityKind::ALL,
    render_shapes: RenderShape::ALL,
    control_schemes: ControlScheme::ALL,
    rule_types: RuleType::ALL,
    world_modes: &[WorldMode::TopDown, WorldMode::SideView],
    camera_modes: &[CameraMode::Fixed, CameraMode::Follow],
};

impl Capabilities {
    /// The capability table of the built-in runtime.
    pub fn engine() -> &'static Capabilities {
        &ENGINE_CAPABILITIES
    }

    pub fn supports_entity_kind(&self, kind: EntityKind) -> bool {
        self.entity_kinds.contains(&kind)
    }

    pub fn supports_render_shape(&self, shape: RenderShape) -> bool {
        self.render_shapes.contains(&shape)
    }

    pub fn supports_control_scheme(&self, scheme: ControlScheme) -> bool {
        self.control_schemes.contains(&scheme)
    }

    pub fn supports_rule_type(&self, rule_type: RuleType) -> bool {
        self.rule_types.contains(&rule_type)
    }

    pub fn supports_world_mode(&self, mode: WorldMode) -> bool {
        self.world_modes.contains(&mode)
    }

    pub fn supports_camera_mode(&self, mode: CameraMode) -> bool {
        self.camera_modes.contains(&mode)
    }
}
