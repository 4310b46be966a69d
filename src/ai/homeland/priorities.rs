use std::cmp::Reverse;

use crate::config::HomelandConfig;
use crate::constants::*;
use crate::faction::{Faction, Flavor};

/// Kind of home-front job, in the order ties are broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskCategory {
    Explore,
    ExploreSea,
    Settle,
    Garrison,
    Heal,
    ToSafety,
    MobileReserve,
    Sentry,
    ImproveLand,
    ImproveSea,
    Patrol,
    Upgrade,
    LootRuins,
    RepositionAir,
    TradeDispatch,
    Unassigned,
    None,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 17] = [
        TaskCategory::Explore,
        TaskCategory::ExploreSea,
        TaskCategory::Settle,
        TaskCategory::Garrison,
        TaskCategory::Heal,
        TaskCategory::ToSafety,
        TaskCategory::MobileReserve,
        TaskCategory::Sentry,
        TaskCategory::ImproveLand,
        TaskCategory::ImproveSea,
        TaskCategory::Patrol,
        TaskCategory::Upgrade,
        TaskCategory::LootRuins,
        TaskCategory::RepositionAir,
        TaskCategory::TradeDispatch,
        TaskCategory::Unassigned,
        TaskCategory::None,
    ];

    pub fn base_priority(self, encourages_garrisons: bool) -> i32 {
        match self {
            TaskCategory::Explore => PRIORITY_EXPLORE,
            TaskCategory::ExploreSea => PRIORITY_EXPLORE_SEA,
            TaskCategory::Settle => PRIORITY_SETTLE,
            // Garrisons must beat sentries when policies encourage them
            TaskCategory::Garrison if encourages_garrisons => PRIORITY_SENTRY + 1,
            TaskCategory::Garrison => PRIORITY_GARRISON,
            TaskCategory::Heal => PRIORITY_HEAL,
            TaskCategory::ToSafety => PRIORITY_TO_SAFETY,
            TaskCategory::MobileReserve => PRIORITY_MOBILE_RESERVE,
            TaskCategory::Sentry => PRIORITY_SENTRY,
            TaskCategory::ImproveLand => PRIORITY_IMPROVE_LAND,
            TaskCategory::ImproveSea => PRIORITY_IMPROVE_SEA,
            TaskCategory::Patrol => PRIORITY_PATROL,
            TaskCategory::Upgrade => PRIORITY_UPGRADE,
            TaskCategory::LootRuins => PRIORITY_LOOT_RUINS,
            TaskCategory::RepositionAir => PRIORITY_REPOSITION_AIR,
            TaskCategory::TradeDispatch => PRIORITY_TRADE_DISPATCH,
            TaskCategory::Unassigned | TaskCategory::None => 0,
        }
    }

    pub fn is_defensive(self) -> bool {
        matches!(
            self,
            TaskCategory::Garrison
                | TaskCategory::Heal
                | TaskCategory::ToSafety
                | TaskCategory::MobileReserve
                | TaskCategory::Sentry
                | TaskCategory::RepositionAir
        )
    }

    fn flavor_bonus(self, faction: &Faction, config: &HomelandConfig) -> i32 {
        let mut bonus = 0;
        if self.is_defensive() {
            bonus += config.dampen(faction.flavor(Flavor::Defense));
        }
        bonus += match self {
            TaskCategory::Explore | TaskCategory::ExploreSea | TaskCategory::LootRuins => {
                config.dampen(faction.flavor(Flavor::Recon))
            }
            TaskCategory::Settle => faction.flavor(Flavor::Expansion),
            TaskCategory::Upgrade => faction.flavor(Flavor::MilitaryTraining),
            TaskCategory::TradeDispatch => faction.flavor(Flavor::Gold),
            _ => 0,
        };
        bonus
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskPriority {
    pub category: TaskCategory,
    pub priority: i32,
}

/// Every category with its priority for this turn, highest first.
///
/// Equal priorities keep the order of [`TaskCategory::ALL`].
pub fn compute_priorities(faction: &Faction, config: &HomelandConfig) -> Vec<TaskPriority> {
    let mut priorities: Vec<TaskPriority> = TaskCategory::ALL
        .into_iter()
        .map(|category| TaskPriority {
            category,
            priority: category.base_priority(faction.encourages_garrisons)
                + category.flavor_bonus(faction, config),
        })
        .collect();
    priorities.sort_by_key(|p| Reverse(p.priority));
    priorities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faction::Personality;
    use crate::test_utils::*;

    fn priority_of(list: &[TaskPriority], category: TaskCategory) -> i32 {
        list.iter()
            .find(|p| p.category == category)
            .map(|p| p.priority)
            .unwrap()
    }

    #[test]
    fn neutral_leader_uses_base_priorities() {
        let [entity] = entities();
        let list = compute_priorities(&ai_faction(entity), &HomelandConfig::default());

        assert_eq!(list.len(), TaskCategory::ALL.len());
        assert_eq!(list[0].category, TaskCategory::TradeDispatch);
        // Settle and air repositioning tie at 50; enumeration order decides
        assert_eq!(list[1].category, TaskCategory::Settle);
        assert_eq!(list[2].category, TaskCategory::RepositionAir);
        assert_eq!(priority_of(&list, TaskCategory::Garrison), 10);
        assert!(list.windows(2).all(|w| w[0].priority >= w[1].priority));
    }

    #[test]
    fn garrison_policy_lifts_garrison_above_sentry() {
        let [entity] = entities();
        let faction = Faction {
            encourages_garrisons: true,
            ..ai_faction(entity)
        };
        let list = compute_priorities(&faction, &HomelandConfig::default());
        assert_eq!(priority_of(&list, TaskCategory::Garrison), 21);

        let garrison = list.iter().position(|p| p.category == TaskCategory::Garrison);
        let sentry = list.iter().position(|p| p.category == TaskCategory::Sentry);
        assert!(garrison < sentry);
    }

    #[test]
    fn flavors_are_added_with_damping() {
        let [entity] = entities();
        let faction = Faction {
            personality: Personality::new()
                .with(Flavor::Defense, 7)
                .with(Flavor::Recon, 10)
                .with(Flavor::Expansion, 4)
                .with(Flavor::Gold, 2)
                .with(Flavor::MilitaryTraining, 5),
            ..ai_faction(entity)
        };
        let list = compute_priorities(&faction, &HomelandConfig::default());

        assert_eq!(priority_of(&list, TaskCategory::Sentry), 22);
        assert_eq!(priority_of(&list, TaskCategory::Heal), 32);
        assert_eq!(priority_of(&list, TaskCategory::Explore), 38);
        assert_eq!(priority_of(&list, TaskCategory::LootRuins), 43);
        assert_eq!(priority_of(&list, TaskCategory::Settle), 54);
        assert_eq!(priority_of(&list, TaskCategory::Upgrade), 30);
        assert_eq!(priority_of(&list, TaskCategory::TradeDispatch), 102);
        assert_eq!(priority_of(&list, TaskCategory::ImproveLand), 30);
    }

    #[test]
    fn priorities_are_deterministic() {
        let [entity] = entities();
        let faction = Faction {
            personality: Personality::new().with(Flavor::Defense, 9),
            ..ai_faction(entity)
        };
        let config = HomelandConfig::default();
        assert_eq!(
            compute_priorities(&faction, &config),
            compute_priorities(&faction, &config)
        );
    }
}
