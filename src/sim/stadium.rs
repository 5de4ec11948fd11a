//! Static stadium catalog
//!
//! Stadiums are visited in order. Each carries its theme, its obstacle
//! catalog, an optional booster, the sub-phase pools that widen the catalog
//! as phase-local score grows, and its difficulty profile.

use serde::{Deserialize, Serialize};

/// How an obstacle in the player's lane can be avoided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Avoidance {
    /// Only by leaving the lane
    LaneOnly,
    /// Duck under it (thrown objects at head height)
    Duck,
    /// Jump over it (things lying on the grass)
    Jump,
}

/// Obstacle behaviour
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum ObstacleKind {
    /// Scrolls straight at the player
    Static,
    /// Waits underground at a fixed depth, then pops up and scrolls
    Mole,
    /// Sweeps across lanes, bouncing at the outer lanes
    Patrol { lane_speed: f32 },
}

/// One entry of a stadium's obstacle catalog
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ObstacleDef {
    pub name: &'static str,
    pub kind: ObstacleKind,
    pub avoid: Avoidance,
    pub width: f32,
    pub height: f32,
    pub color: u32,
    pub detail: u32,
    /// Base points before the combo multiplier
    pub points: u32,
    /// Wider hitbox than the default lane tolerance
    pub lane_tolerance: Option<f32>,
}

/// Booster effects
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoosterEffect {
    /// Speed multiplier above 1
    Speed { multiplier: f32 },
    /// Speed multiplier below 1
    SlowMotion { multiplier: f32 },
    /// Absorbs the next hit
    Shield,
}

impl BoosterEffect {
    /// Multiplier applied to the scroll speed while active
    pub fn speed_multiplier(&self) -> f32 {
        match *self {
            BoosterEffect::Speed { multiplier } | BoosterEffect::SlowMotion { multiplier } => {
                multiplier
            }
            BoosterEffect::Shield => 1.0,
        }
    }

    /// Pickup text shown over the runner
    pub fn label(&self) -> &'static str {
        match self {
            BoosterEffect::Speed { .. } => "¡TURBO!",
            BoosterEffect::SlowMotion { .. } => "CÁMARA LENTA",
            BoosterEffect::Shield => "¡ESCUDO!",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BoosterDef {
    pub name: &'static str,
    pub effect: BoosterEffect,
    pub duration_ms: f32,
    /// Chance per spawn tick once the cooldown has elapsed
    pub spawn_chance: f64,
    /// Frames between booster rolls
    pub cooldown_frames: f32,
    pub color: u32,
}

/// Intra-stadium difficulty tier
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SubPhase {
    /// Phase-local score at which this tier unlocks
    pub score_threshold: u64,
    /// Indices into the stadium's obstacle catalog
    pub pool: &'static [usize],
    pub label: &'static str,
}

/// Three-segment speed curve keyed on cumulative run score
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SpeedCurve {
    pub early_slope: f32,
    pub early_cap: f32,
    pub mid_start: u64,
    pub mid_slope: f32,
    pub mid_cap: f32,
    pub late_start: u64,
    pub late_slope: f32,
    pub late_cap: f32,
}

/// Spawn interval profile (all in frames)
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SpawnProfile {
    /// Baseline band re-rolled on every spawn
    pub baseline_min: f32,
    pub baseline_max: f32,
    /// Multiplier on the speed bias
    pub speed_bias: f32,
    /// Multiplier on the stage-index bias
    pub phase_bias: f32,
    pub floor: f32,
    pub ceiling: f32,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Palette {
    pub sky_top: u32,
    pub sky_horizon: u32,
    pub grass: u32,
    pub grass_dark: u32,
    pub stand: u32,
    pub stand_alt: u32,
    pub accent: u32,
}

/// Static stadium descriptor handed to the renderer every frame
#[derive(Debug, Serialize)]
pub struct Stadium {
    pub name: &'static str,
    pub subtitle: &'static str,
    pub palette: Palette,
    pub obstacles: &'static [ObstacleDef],
    pub booster: Option<BoosterDef>,
    pub sub_phases: &'static [SubPhase],
    pub speed_curve: SpeedCurve,
    pub spawn: SpawnProfile,
}

impl Stadium {
    /// Highest sub-phase unlocked at the given phase-local score
    pub fn sub_phase_for(&self, local_score: u64) -> usize {
        self.sub_phases
            .iter()
            .rposition(|s| local_score >= s.score_threshold)
            .unwrap_or(0)
    }

    /// Obstacle pool for a sub-phase (falls back to the full catalog)
    pub fn pool(&self, sub_phase: usize) -> &'static [usize] {
        match self.sub_phases.get(sub_phase) {
            Some(s) if !s.pool.is_empty() => s.pool,
            _ => ALL_INDICES.get(..self.obstacles.len()).unwrap_or(&ALL_INDICES),
        }
    }
}

static ALL_INDICES: [usize; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

/// Stadium by index, clamped to the last one
pub fn stadium(index: usize) -> &'static Stadium {
    &STADIUMS[index.min(STADIUMS.len() - 1)]
}

pub fn stadium_count() -> usize {
    STADIUMS.len()
}

const fn obstacle(
    name: &'static str,
    kind: ObstacleKind,
    avoid: Avoidance,
    size: (f32, f32),
    color: u32,
    detail: u32,
    points: u32,
) -> ObstacleDef {
    ObstacleDef {
        name,
        kind,
        avoid,
        width: size.0,
        height: size.1,
        color,
        detail,
        points,
        lane_tolerance: None,
    }
}

use Avoidance::*;
use ObstacleKind::*;

static METROPOLITANO_OBSTACLES: [ObstacleDef; 7] = [
    obstacle("Rival caído", Static, Jump, (50.0, 30.0), 0xFFFFFF, 0x0055A4, 10),
    obstacle("Topo", Mole, LaneOnly, (36.0, 28.0), 0x8B6914, 0x6B4F10, 25),
    obstacle("Cono", Static, LaneOnly, (24.0, 40.0), 0xFF6D00, 0xFFFFFF, 15),
    obstacle("Aspersor", Static, Jump, (30.0, 20.0), 0x64B5F6, 0x90CAF9, 15),
    obstacle("Cámara TV", Static, LaneOnly, (44.0, 36.0), 0x333333, 0x5C6BC0, 20),
    obstacle("Balón perdido", Static, Duck, (20.0, 20.0), 0xFFFFFF, 0x121212, 15),
    obstacle(
        "Recogepelotas",
        Patrol { lane_speed: 0.02 },
        LaneOnly,
        (34.0, 46.0),
        0xCB3234,
        0x253166,
        30,
    ),
];

static OLD_TRAFFORD_OBSTACLES: [ObstacleDef; 8] = [
    obstacle("Botella", Static, Duck, (18.0, 28.0), 0x42A5F5, 0xBBDEFB, 15),
    obstacle("Mechero", Static, Duck, (14.0, 20.0), 0xFF9800, 0xFFCC02, 10),
    ObstacleDef {
        lane_tolerance: Some(0.72),
        ..obstacle("Bufanda", Static, Duck, (50.0, 14.0), 0xDA291C, 0xFFE500, 20)
    },
    obstacle("Moneda", Static, Duck, (18.0, 18.0), 0xFFD700, 0xFFF176, 25),
    obstacle("Cerveza", Static, Duck, (22.0, 28.0), 0xFDD835, 0xFFFFFF, 15),
    obstacle("Bengala", Static, LaneOnly, (16.0, 34.0), 0xFF1744, 0xFFEB3B, 20),
    obstacle(
        "Hooligan",
        Patrol { lane_speed: 0.025 },
        LaneOnly,
        (38.0, 48.0),
        0xDA291C,
        0x212121,
        30,
    ),
    obstacle(
        "Steward",
        Patrol { lane_speed: 0.018 },
        LaneOnly,
        (36.0, 48.0),
        0xFFEB3B,
        0x212121,
        25,
    ),
];

static BERNABEU_OBSTACLES: [ObstacleDef; 7] = [
    obstacle(
        "Carterista",
        Patrol { lane_speed: 0.02 },
        LaneOnly,
        (40.0, 44.0),
        0x212121,
        0xE7B784,
        30,
    ),
    obstacle("Cartera tirada", Static, Jump, (28.0, 20.0), 0x8D6E63, 0xA1887F, 15),
    obstacle("Reloj robado", Static, Duck, (22.0, 22.0), 0xFFD54F, 0xFFF8E1, 20),
    obstacle("Cono VIP", Static, LaneOnly, (24.0, 40.0), 0xD4AF37, 0xFFFFFF, 15),
    obstacle("Cámara VAR", Static, LaneOnly, (44.0, 36.0), 0x212121, 0x7C4DFF, 20),
    obstacle(
        "Árbitro",
        Patrol { lane_speed: 0.03 },
        LaneOnly,
        (36.0, 48.0),
        0x121212,
        0xFFD400,
        30,
    ),
    obstacle("Tarjeta roja", Static, Duck, (16.0, 22.0), 0xD50000, 0xFFFFFF, 25),
];

pub static STADIUMS: [Stadium; 3] = [
    Stadium {
        name: "METROPOLITANO",
        subtitle: "Celebra por la banda sin que te paren",
        palette: Palette {
            sky_top: 0x1A3A5C,
            sky_horizon: 0x2D5A7B,
            grass: 0x2E8B47,
            grass_dark: 0x1E6B30,
            stand: 0xCB3234,
            stand_alt: 0x272E61,
            accent: 0xA02020,
        },
        obstacles: &METROPOLITANO_OBSTACLES,
        booster: Some(BoosterDef {
            name: "Espinilleras",
            effect: BoosterEffect::Shield,
            duration_ms: 8000.0,
            spawn_chance: 0.35,
            cooldown_frames: 720.0,
            color: 0x00E5FF,
        }),
        sub_phases: &[
            SubPhase { score_threshold: 0, pool: &[0, 2], label: "Calentamiento" },
            SubPhase { score_threshold: 280, pool: &[0, 1, 2], label: "Aparece el topo" },
            SubPhase { score_threshold: 520, pool: &[0, 1, 2, 3, 4], label: "Cámaras y aspersores" },
            SubPhase { score_threshold: 720, pool: &[0, 1, 2, 3, 4, 5, 6], label: "Campo completo" },
        ],
        speed_curve: SpeedCurve {
            early_slope: 0.0006,
            early_cap: 2.8,
            mid_start: 450,
            mid_slope: 0.0008,
            mid_cap: 3.8,
            late_start: 800,
            late_slope: 0.0006,
            late_cap: 5.0,
        },
        spawn: SpawnProfile {
            baseline_min: 56.0,
            baseline_max: 118.0,
            speed_bias: 0.8,
            phase_bias: 0.0,
            floor: 55.0,
            ceiling: 130.0,
        },
    },
    Stadium {
        name: "OLD TRAFFORD",
        subtitle: "¡Cuidado con lo que te tiran!",
        palette: Palette {
            sky_top: 0x2C2C2C,
            sky_horizon: 0x4A4A4A,
            grass: 0x2D7A3E,
            grass_dark: 0x1A5C2A,
            stand: 0xDA291C,
            stand_alt: 0xFBE122,
            accent: 0xB71C1C,
        },
        obstacles: &OLD_TRAFFORD_OBSTACLES,
        booster: Some(BoosterDef {
            name: "Paraguas",
            effect: BoosterEffect::SlowMotion { multiplier: 0.7 },
            duration_ms: 5000.0,
            spawn_chance: 0.3,
            cooldown_frames: 780.0,
            color: 0x7C4DFF,
        }),
        sub_phases: &[
            SubPhase { score_threshold: 0, pool: &[0, 1], label: "Botellas y mecheros" },
            SubPhase { score_threshold: 260, pool: &[0, 1, 2, 3], label: "Bufandas y monedas" },
            SubPhase { score_threshold: 480, pool: &[0, 1, 2, 3, 4, 5], label: "Lluvia de todo" },
            SubPhase { score_threshold: 680, pool: &[0, 1, 2, 3, 4, 5, 6, 7], label: "Salen los hooligans" },
        ],
        speed_curve: SpeedCurve {
            early_slope: 0.0012,
            early_cap: 3.6,
            mid_start: 400,
            mid_slope: 0.0009,
            mid_cap: 4.8,
            late_start: 750,
            late_slope: 0.0007,
            late_cap: 5.8,
        },
        spawn: SpawnProfile {
            baseline_min: 52.0,
            baseline_max: 110.0,
            speed_bias: 1.1,
            phase_bias: 1.0,
            floor: 48.0,
            ceiling: 110.0,
        },
    },
    Stadium {
        name: "BERNABÉU",
        subtitle: "¡Agarra la cartera!",
        palette: Palette {
            sky_top: 0x1A1A2E,
            sky_horizon: 0x2D2D5E,
            grass: 0x2E8B47,
            grass_dark: 0x1E6B30,
            stand: 0xFFFFFF,
            stand_alt: 0x6A0DAD,
            accent: 0xD4AF37,
        },
        obstacles: &BERNABEU_OBSTACLES,
        booster: Some(BoosterDef {
            name: "Botas de oro",
            effect: BoosterEffect::Speed { multiplier: 1.25 },
            duration_ms: 4500.0,
            spawn_chance: 0.3,
            cooldown_frames: 840.0,
            color: 0xFFD54F,
        }),
        sub_phases: &[
            SubPhase { score_threshold: 0, pool: &[0, 1], label: "Ojo a los carteristas" },
            SubPhase { score_threshold: 240, pool: &[0, 1, 2, 3], label: "Vigila tu reloj" },
            SubPhase { score_threshold: 460, pool: &[0, 1, 2, 3, 4], label: "Cámaras VAR" },
            SubPhase { score_threshold: 660, pool: &[0, 1, 2, 3, 4, 5, 6], label: "Árbitros y final" },
        ],
        speed_curve: SpeedCurve {
            early_slope: 0.0016,
            early_cap: 4.0,
            mid_start: 400,
            mid_slope: 0.0010,
            mid_cap: 5.4,
            late_start: 750,
            late_slope: 0.0008,
            late_cap: 6.3,
        },
        spawn: SpawnProfile {
            baseline_min: 48.0,
            baseline_max: 100.0,
            speed_bias: 1.5,
            phase_bias: 1.8,
            floor: 44.0,
            ceiling: 100.0,
        },
    },
];
