//! Tiered pairing
//!
//! Reliable slots are paired among themselves first, then unreliable slots
//! among themselves, then whatever is left is paired across the two pools.
//! Every stage stops at the first slot that has no valid partner instead of
//! skipping it: the leftover slots simply wait for the next run.

use crate::matchmaker::slots::SlotPools;
use crate::types::{PlayerId, PlayerRegistry};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Which stage produced a pairing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PairingTier {
    Reliable,
    Unreliable,
    Cross,
}

impl std::fmt::Display for PairingTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PairingTier::Reliable => write!(f, "reliable"),
            PairingTier::Unreliable => write!(f, "unreliable"),
            PairingTier::Cross => write!(f, "cross"),
        }
    }
}

/// Two players to be seated in one game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    pub p1: PlayerId,
    pub p2: PlayerId,
    pub tier: PairingTier,
}

/// Result of pairing both pools
#[derive(Debug, Clone, Default)]
pub struct PairingPlan {
    pub pairings: Vec<Pairing>,
    /// Slots that found no partner this run
    pub leftover: SlotPools,
}

/// Either player's last opponent is the other
pub fn is_rematch(players: &PlayerRegistry, a: &str, b: &str) -> bool {
    let a_faced_b = players.get(a).map_or(false, |p| p.last_faced(b));
    let b_faced_a = players.get(b).map_or(false, |p| p.last_faced(a));
    a_faced_b || b_faced_a
}

fn can_pair(players: &PlayerRegistry, a: &str, b: &str) -> bool {
    a != b && !is_rematch(players, a, b)
}

/// Pair slots within one pool, consuming matched entries
pub fn pair_pool(
    pool: &mut Vec<PlayerId>,
    players: &PlayerRegistry,
    tier: PairingTier,
) -> Vec<Pairing> {
    let mut pairings = Vec::new();

    while pool.len() >= 2 {
        let Some(p1) = pool.pop() else { break };

        match pool.iter().rposition(|candidate| can_pair(players, &p1, candidate)) {
            Some(index) => {
                let p2 = pool.remove(index);
                pairings.push(Pairing { p1, p2, tier });
            }
            None => {
                pool.push(p1);
                break;
            }
        }
    }

    pairings
}

/// Pair leftover reliable slots against leftover unreliable slots
pub fn pair_across_pools(
    reliable: &mut Vec<PlayerId>,
    unreliable: &mut Vec<PlayerId>,
    players: &PlayerRegistry,
) -> Vec<Pairing> {
    let mut pairings = Vec::new();

    while !unreliable.is_empty() {
        let Some(p1) = reliable.pop() else { break };

        match unreliable
            .iter()
            .rposition(|candidate| can_pair(players, &p1, candidate))
        {
            Some(index) => {
                let p2 = unreliable.remove(index);
                pairings.push(Pairing {
                    p1,
                    p2,
                    tier: PairingTier::Cross,
                });
            }
            None => {
                reliable.push(p1);
                break;
            }
        }
    }

    pairings
}

/// Shuffle both pools and run the three pairing stages in order
pub fn plan_pairings<R: Rng + ?Sized>(
    mut pools: SlotPools,
    players: &PlayerRegistry,
    rng: &mut R,
) -> PairingPlan {
    pools.reliable.shuffle(rng);
    pools.unreliable.shuffle(rng);

    let mut pairings = pair_pool(&mut pools.reliable, players, PairingTier::Reliable);
    pairings.extend(pair_pool(
        &mut pools.unreliable,
        players,
        PairingTier::Unreliable,
    ));
    pairings.extend(pair_across_pools(
        &mut pools.reliable,
        &mut pools.unreliable,
        players,
    ));

    PairingPlan {
        pairings,
        leftover: pools,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Player;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ids(raw: &[&str]) -> Vec<PlayerId> {
        raw.iter().map(|id| id.to_string()).collect()
    }

    fn registry(raw: &[&str]) -> PlayerRegistry {
        raw.iter()
            .map(|id| (id.to_string(), Player::new(*id, 1000.0, 3)))
            .collect()
    }

    #[test]
    fn test_pairs_from_the_end() {
        let players = registry(&["a", "b", "c", "d"]);
        let mut pool = ids(&["a", "b", "c", "d"]);

        let pairings = pair_pool(&mut pool, &players, PairingTier::Reliable);
        assert_eq!(pairings.len(), 2);
        assert_eq!((pairings[0].p1.as_str(), pairings[0].p2.as_str()), ("d", "c"));
        assert_eq!((pairings[1].p1.as_str(), pairings[1].p2.as_str()), ("b", "a"));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_skips_self_and_last_opponent() {
        let mut players = registry(&["a", "b", "c"]);
        players.get_mut("b").unwrap().last_opponent = Some("c".to_string());
        let mut pool = ids(&["a", "b", "c", "c"]);

        // c cannot face itself or b, so it takes a; b is then left alone
        let pairings = pair_pool(&mut pool, &players, PairingTier::Reliable);
        assert_eq!(pairings.len(), 1);
        assert_eq!((pairings[0].p1.as_str(), pairings[0].p2.as_str()), ("c", "a"));
        assert_eq!(pool, ids(&["b", "c"]));
    }

    #[test]
    fn test_rematch_is_symmetric() {
        let mut players = registry(&["a", "b"]);
        players.get_mut("a").unwrap().last_opponent = Some("b".to_string());
        assert!(is_rematch(&players, "a", "b"));
        assert!(is_rematch(&players, "b", "a"));
        assert!(!is_rematch(&players, "a", "z"));
    }

    #[test]
    fn test_stops_instead_of_skipping() {
        let mut players = registry(&["a", "b", "c"]);
        players.get_mut("b").unwrap().last_opponent = Some("a".to_string());
        players.get_mut("c").unwrap().last_opponent = Some("a".to_string());

        // the popped "a" has no partner, so "b" and "c" are never tried
        let mut pool = ids(&["b", "c", "a"]);
        assert!(pair_pool(&mut pool, &players, PairingTier::Reliable).is_empty());
        assert_eq!(pool, ids(&["b", "c", "a"]));

        let mut stuck = ids(&["a", "a", "a"]);
        assert!(pair_pool(&mut stuck, &players, PairingTier::Reliable).is_empty());
        assert_eq!(stuck.len(), 3);
    }

    #[test]
    fn test_cross_pool_leftovers() {
        let mut players = registry(&["r1", "u1", "u2"]);
        players.get_mut("u2").unwrap().last_opponent = Some("r1".to_string());
        let mut reliable = ids(&["r1"]);
        let mut unreliable = ids(&["u1", "u2"]);

        let pairings = pair_across_pools(&mut reliable, &mut unreliable, &players);
        assert_eq!(pairings.len(), 1);
        assert_eq!(pairings[0].tier, PairingTier::Cross);
        assert_eq!((pairings[0].p1.as_str(), pairings[0].p2.as_str()), ("r1", "u1"));
        assert!(reliable.is_empty());
        assert_eq!(unreliable, ids(&["u2"]));
    }

    #[test]
    fn test_cross_pool_stops_on_first_failure() {
        let mut players = registry(&["r1", "r2", "u1"]);
        players.get_mut("u1").unwrap().last_opponent = Some("r2".to_string());
        let mut reliable = ids(&["r1", "r2"]);
        let mut unreliable = ids(&["u1"]);

        assert!(pair_across_pools(&mut reliable, &mut unreliable, &players).is_empty());
        assert_eq!(reliable, ids(&["r1", "r2"]));
    }

    #[test]
    fn test_plan_prefers_same_tier() {
        let players = registry(&["r1", "r2", "r3", "u1", "u2", "u3"]);
        let pools = SlotPools {
            reliable: ids(&["r1", "r2", "r3"]),
            unreliable: ids(&["u1", "u2", "u3"]),
        };

        let mut rng = StdRng::seed_from_u64(7);
        let plan = plan_pairings(pools, &players, &mut rng);

        let tiers: Vec<_> = plan.pairings.iter().map(|p| p.tier).collect();
        assert_eq!(
            tiers,
            vec![
                PairingTier::Reliable,
                PairingTier::Unreliable,
                PairingTier::Cross
            ]
        );
        assert!(plan.leftover.is_empty());
        for pairing in &plan.pairings {
            assert_ne!(pairing.p1, pairing.p2);
        }
    }
}
