//! End-to-end session scenarios driven on the engine clock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use whackamole_core::{
    handler, Difficulty, EngineSettings, EventKind, GameEngine, GameEvent, GamePhase, MoleId,
};

fn recorder(engine: &mut GameEngine) -> Arc<Mutex<Vec<GameEvent>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    engine.event_bus_mut().subscribe_all(&handler(move |event| {
        sink.lock().unwrap().push(event.clone());
        Ok(())
    }));
    seen
}

fn spawned_ids(events: &[GameEvent]) -> Vec<MoleId> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::MoleSpawned { mole_id, .. } => Some(*mole_id),
            _ => None,
        })
        .collect()
}

#[test]
fn medium_scenario_on_four_by_four_grid() {
    let mut engine = GameEngine::with_settings(EngineSettings {
        grid_size: 4,
        difficulty: Difficulty::Medium,
        seed: Some(2024),
        ..EngineSettings::default()
    });
    let seen = recorder(&mut engine);

    engine.start();
    {
        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            GameEvent::GameStarted {
                difficulty: Difficulty::Medium
            }
        );
        assert_eq!(events[1].kind(), EventKind::MoleSpawned);
    }

    engine.advance(Duration::from_millis(800));
    let (first, second) = {
        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 3);
        let ids = spawned_ids(&events);
        (ids[0], ids[1])
    };
    assert_ne!(first, second);
    assert_eq!(engine.state().active_moles.len(), 2);

    engine.advance(Duration::from_millis(200));
    {
        let events = seen.lock().unwrap();
        assert_eq!(events[3], GameEvent::TimeTick { time_remaining: 59 });
        assert_eq!(events[4], GameEvent::MoleTimeout { mole_id: first });
    }

    seen.lock().unwrap().clear();
    engine.register_hit(second);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            GameEvent::MoleHit {
                mole_id: second,
                points: 2
            },
            GameEvent::ScoreUpdated { score: 2 },
        ]
    );

    engine.advance(Duration::from_secs(59));
    let events = seen.lock().unwrap();
    assert_eq!(
        events.last(),
        Some(&GameEvent::GameOver {
            final_score: 2,
            difficulty: Difficulty::Medium
        })
    );
    assert_eq!(events.iter().filter(|e| e.kind() == EventKind::GameOver).count(), 1);
    assert_eq!(engine.phase(), GamePhase::Ended);
    assert_eq!(engine.state().time_remaining_secs, 0);
}

#[test]
fn every_hit_scores_points_per_hit() {
    let mut engine = GameEngine::with_settings(EngineSettings {
        difficulty: Difficulty::Hard,
        seed: Some(8),
        countdown_secs: 20,
        ..EngineSettings::default()
    });
    engine.start();

    let mut hits = 0u64;
    while engine.phase() != GamePhase::Ended {
        for mole in engine.state().active_moles {
            engine.register_hit(mole.id);
            hits += 1;
        }
        engine.advance(Duration::from_millis(150));
    }

    assert!(hits > 0);
    let points = u64::from(Difficulty::Hard.profile().points_per_hit);
    assert_eq!(engine.last_metrics().unwrap().final_score, hits * points);
}

#[test]
fn paused_session_resumes_countdown_where_it_stopped() {
    let mut engine = GameEngine::new(4, Difficulty::Easy);
    engine.start();
    engine.advance(Duration::from_millis(2_500));
    assert_eq!(engine.state().time_remaining_secs, 58);

    engine.pause();
    engine.advance(Duration::from_secs(30));
    assert_eq!(engine.state().time_remaining_secs, 58);

    engine.resume();
    engine.advance(Duration::from_secs(1));
    assert_eq!(engine.state().time_remaining_secs, 57);
}

#[test]
fn cleared_bus_stops_delivery_to_stale_subscribers() {
    let mut engine = GameEngine::new(4, Difficulty::Medium);
    let seen = recorder(&mut engine);
    engine.event_bus_mut().clear();

    engine.start();
    engine.advance(Duration::from_secs(5));

    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn snapshot_serializes_for_adapters() {
    let mut engine = GameEngine::with_settings(EngineSettings {
        seed: Some(1),
        ..EngineSettings::default()
    });
    engine.start();
    let json = serde_json::to_value(engine.state()).unwrap();
    assert_eq!(json["difficulty"], "medium");
    assert_eq!(json["phase"], "running");
    assert_eq!(json["grid_size"], 4);
    assert_eq!(json["active_moles"].as_array().unwrap().len(), 1);
}
