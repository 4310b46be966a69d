//! Homeland AI constants and configuration defaults
//!
//! This module centralizes the magic numbers used by the homeland scheduler.
//! Runtime-tunable values are mirrored in [`crate::config::HomelandConfig`].

// ============================================================================
// TASK PRIORITIES
// ============================================================================

pub const PRIORITY_EXPLORE: i32 = 35;
pub const PRIORITY_EXPLORE_SEA: i32 = 35;
pub const PRIORITY_SETTLE: i32 = 50;
pub const PRIORITY_GARRISON: i32 = 10;
pub const PRIORITY_HEAL: i32 = 30;
pub const PRIORITY_TO_SAFETY: i32 = 30;
pub const PRIORITY_MOBILE_RESERVE: i32 = 15;
pub const PRIORITY_SENTRY: i32 = 20;
pub const PRIORITY_IMPROVE_LAND: i32 = 30;
pub const PRIORITY_IMPROVE_SEA: i32 = 30;
pub const PRIORITY_PATROL: i32 = 0;
pub const PRIORITY_UPGRADE: i32 = 25;
pub const PRIORITY_LOOT_RUINS: i32 = 40;
pub const PRIORITY_REPOSITION_AIR: i32 = 50;
pub const PRIORITY_TRADE_DISPATCH: i32 = 100;

/// Damping applied to the defense and recon flavors before they are added
pub const FLAVOR_DAMPENING: f32 = 0.3;

// ============================================================================
// MATCHER
// ============================================================================

/// Longest trip (in turns) accepted for garrison and ruin moves
pub const DEFENSIVE_MOVE_TURNS: u32 = 4;

/// Raw distance beyond which the first reachable candidate is taken as good enough
pub const ESTIMATE_TURNS_DISTANCE: u32 = 8;

/// Consecutive failed path searches before a target is given up on
pub const MAX_FAILED_PATHS: u32 = 2;

/// A failed path search this far away ends the search immediately
pub const EARLY_OUT_FAILED_PATH_DISTANCE: u32 = 12;

// ============================================================================
// TARGET WEIGHTING
// ============================================================================

/// Weight contributed by each adjacent foreign tile of a sentry point
pub const SENTRY_OUTSIDE_TILE_WEIGHT: i32 = 100;

/// Radius searched for the city a sentry point protects
pub const SENTRY_CITY_RADIUS: u32 = 5;

/// Divisor applied to `threat * population` of the protected city
pub const SENTRY_CITY_THREAT_DIVISOR: i32 = 50;

/// Percentage applied to sentry weight when the protected city is the capital
pub const CAPITAL_THREAT_WEIGHT_PERCENT: i32 = 125;

// ============================================================================
// UNIT THRESHOLDS
// ============================================================================

/// Units seeing further than this are preferred as sentries
pub const HIGH_PRIORITY_SIGHT: u32 = 2;

/// Aircraft with more damage than this stay put
pub const MAX_AIR_REPOSITION_DAMAGE: u32 = 50;

/// Random wander score added on top of the base patrol value
pub const PATROL_RANDOM_SCORE: u32 = 10_000;

/// Patrol bonus for staying inside own territory
pub const PATROL_TERRITORY_BONUS: u32 = 10_000;

/// Explore score bonus for standing on hills (land units)
pub const EXPLORE_HILLS_BONUS: i32 = 50;

/// Explore score bonus for a ship next to land
pub const EXPLORE_COAST_BONUS: i32 = 200;

/// Upper bound of the noise added to exploration path costs
pub const EXPLORE_PATH_NOISE: f32 = 5.0;

/// Base seed of the scheduler RNG so turns are replayable
pub const RNG_BASE_SEED: u64 = 0x40_4D_E1_A4;

// ============================================================================
// MAP
// ============================================================================

/// Defense bonus (percent) for hills and forests
pub const ROUGH_TERRAIN_DEFENSE: i32 = 25;

/// Minimum spacing between a new city and an existing one
pub const MIN_CITY_DISTANCE: u32 = 3;
