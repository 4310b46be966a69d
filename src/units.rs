use bevy::prelude::*;
use bevy_ecs_tilemap::prelude::TilePos;

use crate::map::tiles::BuildKind;

/// Where a unit can move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum UnitDomain {
    Land,
    Sea,
    Air,
}

/// Stacking layer; one civilian and one combat unit may share a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum UnitLayer {
    Civilian,
    Combat,
}

/// Role the unit was built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum UnitTask {
    Unknown,
    Explore,
    ExploreSea,
    Settle,
    Work,
    WorkSea,
    Attack,
    Defense,
    Ranged,
    CityBombard,
    FastAttack,
    Trade,
}

/// Player-chosen automation of a (usually human owned) unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum Automation {
    #[default]
    None,
    Explore,
    Build,
}

/// Order pushed onto a unit's mission queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOrder {
    MoveTo(TilePos),
    Fortify,
    Garrison,
    Skip,
    Found,
    Build { build: BuildKind, target: TilePos },
    EstablishTradeRoute { destination: TilePos },
    Rebase(TilePos),
    Upgrade,
}

/// Snapshot of a unit as seen by the homeland scheduler
#[derive(Debug, Clone)]
pub struct UnitInfo {
    pub entity: Entity,
    pub owner: Entity,
    pub name: String,
    pub position: TilePos,
    pub domain: UnitDomain,
    pub layer: UnitLayer,
    /// Primary task first, secondary tasks after
    pub tasks: Vec<UnitTask>,
    pub automation: Automation,
    pub ranged: bool,
    /// Strength printed on the unit card
    pub base_strength: i32,
    /// Strength after damage and terrain
    pub attack_strength: i32,
    pub defense_strength: i32,
    /// Promotion boosts that cities ignore
    pub attack_modifier: i32,
    pub defense_modifier: i32,
    pub sight: u32,
    pub max_moves: u32,
    pub moves_left: u32,
    pub health: u32,
    pub max_health: u32,
    pub embarked: bool,
    pub under_ranged_attack: bool,
    pub processed: bool,
    pub delayed_death: bool,
    pub under_tactical_control: bool,
    pub in_army: bool,
    /// Fortified or sleeping
    pub waiting: bool,
    pub trading: bool,
    /// Home city of trade units
    pub origin: Option<TilePos>,
    pub head_order: Option<UnitOrder>,
}

impl UnitInfo {
    pub fn new(
        entity: Entity,
        owner: Entity,
        name: impl Into<String>,
        position: TilePos,
        task: UnitTask,
    ) -> Self {
        Self {
            entity,
            owner,
            name: name.into(),
            position,
            domain: UnitDomain::Land,
            layer: UnitLayer::Combat,
            tasks: vec![task],
            automation: Automation::None,
            ranged: false,
            base_strength: 10,
            attack_strength: 10,
            defense_strength: 10,
            attack_modifier: 0,
            defense_modifier: 0,
            sight: 2,
            max_moves: 2,
            moves_left: 2,
            health: 100,
            max_health: 100,
            embarked: false,
            under_ranged_attack: false,
            processed: false,
            delayed_death: false,
            under_tactical_control: false,
            in_army: false,
            waiting: false,
            trading: false,
            origin: None,
            head_order: None,
        }
    }

    /// Civilian on land with no strength, e.g. a settler or builder
    pub fn civilian(
        entity: Entity,
        owner: Entity,
        name: impl Into<String>,
        position: TilePos,
        task: UnitTask,
    ) -> Self {
        Self {
            layer: UnitLayer::Civilian,
            base_strength: 0,
            attack_strength: 0,
            defense_strength: 0,
            ..Self::new(entity, owner, name, position, task)
        }
    }

    pub fn task(&self) -> UnitTask {
        self.tasks.first().copied().unwrap_or(UnitTask::Unknown)
    }

    pub fn has_task(&self, task: UnitTask) -> bool {
        self.tasks.contains(&task)
    }

    pub fn is_combat(&self) -> bool {
        self.layer == UnitLayer::Combat
    }

    pub fn can_attack(&self) -> bool {
        self.is_combat() && self.base_strength > 0
    }

    pub fn can_defend(&self) -> bool {
        self.is_combat() && self.defense_strength > 0 && !self.embarked
    }

    pub fn can_move(&self) -> bool {
        self.moves_left > 0
    }

    pub fn is_automated(&self) -> bool {
        self.automation != Automation::None
    }

    pub fn is_damaged(&self) -> bool {
        self.health < self.max_health
    }

    pub fn damage(&self) -> u32 {
        self.max_health.saturating_sub(self.health)
    }

    /// Tiles a unit may scan when looking for somewhere to go within `turns`
    pub fn search_range(&self, turns: u32) -> u32 {
        turns * self.max_moves.max(1)
    }
}

/// Snapshot of a city as seen by the homeland scheduler
#[derive(Debug, Clone)]
pub struct CityInfo {
    pub entity: Entity,
    pub owner: Entity,
    pub name: String,
    pub position: TilePos,
    pub population: i32,
    pub threat_value: i32,
    pub defense_strength: i32,
    pub is_capital: bool,
    pub last_garrison_turn: Option<u32>,
}

impl CityInfo {
    pub fn new(entity: Entity, owner: Entity, name: impl Into<String>, position: TilePos) -> Self {
        Self {
            entity,
            owner,
            name: name.into(),
            position,
            population: 1,
            threat_value: 0,
            defense_strength: 10,
            is_capital: false,
            last_garrison_turn: None,
        }
    }

    /// True once a garrison has been sent here during `turn`
    pub fn garrisoned_in(&self, turn: u32) -> bool {
        self.last_garrison_turn.is_some_and(|t| t >= turn)
    }
}
