//! Property tests over arbitrary command sequences.

use std::time::Duration;

use proptest::prelude::*;
use whackamole_core::{Difficulty, EngineSettings, GameEngine, GamePhase};

#[derive(Debug, Clone)]
enum Op {
    Start,
    Pause,
    Resume,
    Reset,
    Advance(u16),
    /// Hit the n-th active mole (modulo board size), if any.
    HitActive(usize),
    /// Hit an id that was never spawned.
    HitStale,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => Just(Op::Start),
        1 => Just(Op::Pause),
        1 => Just(Op::Resume),
        1 => Just(Op::Reset),
        6 => (1u16..2_500).prop_map(Op::Advance),
        3 => (0usize..4).prop_map(Op::HitActive),
        1 => Just(Op::HitStale),
    ]
}

fn difficulty() -> impl Strategy<Value = Difficulty> {
    prop_oneof![
        Just(Difficulty::Easy),
        Just(Difficulty::Medium),
        Just(Difficulty::Hard)
    ]
}

proptest! {
    #[test]
    fn invariants_hold_for_any_command_sequence(
        level in difficulty(),
        grid_size in 1usize..6,
        seed in any::<u64>(),
        freeze in any::<bool>(),
        spawn_on_resume in any::<bool>(),
        ops in prop::collection::vec(op(), 1..80),
    ) {
        let mut engine = GameEngine::with_settings(EngineSettings {
            grid_size,
            countdown_secs: 10,
            difficulty: level,
            seed: Some(seed),
            resume_spawns_immediately: spawn_on_resume,
            freeze_moles_on_pause: freeze,
        });
        let profile = level.profile();
        let mut hits_since_reset = 0u64;

        for op in ops {
            match op {
                Op::Start => engine.start(),
                Op::Pause => engine.pause(),
                Op::Resume => engine.resume(),
                Op::Reset => {
                    engine.reset();
                    hits_since_reset = 0;
                }
                Op::Advance(ms) => engine.advance(Duration::from_millis(u64::from(ms))),
                Op::HitActive(n) => {
                    let moles = engine.state().active_moles;
                    if !moles.is_empty() {
                        engine.register_hit(moles[n % moles.len()].id);
                        hits_since_reset += 1;
                    }
                }
                Op::HitStale => {
                    let before = engine.state();
                    engine.register_hit(whackamole_core::MoleId(u64::MAX));
                    prop_assert_eq!(engine.state(), before);
                }
            }

            let state = engine.state();
            prop_assert!(state.active_moles.len() <= profile.max_concurrent_moles);
            prop_assert!(!state.paused || state.running);
            prop_assert!(state
                .active_moles
                .iter()
                .all(|m| m.position.row < grid_size && m.position.col < grid_size && !m.hit));
            prop_assert_eq!(state.score, hits_since_reset * u64::from(profile.points_per_hit));
            if state.phase == GamePhase::Idle {
                prop_assert_eq!(engine.pending_timers(), 0);
                prop_assert!(state.active_moles.is_empty());
            }
            if state.phase == GamePhase::Ended {
                prop_assert_eq!(engine.pending_timers(), 0);
            }
        }
    }
}
