use whackamole_core::{Difficulty, DifficultyProfile};

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let profiles: Vec<DifficultyProfile> = Difficulty::ALL.iter().map(|d| d.profile()).collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&profiles)?);
        return Ok(());
    }

    println!(
        "{:<8} {:>10} {:>12} {:>7} {:>10}",
        "level", "spawn_ms", "lifetime_ms", "points", "max_moles"
    );
    for p in &profiles {
        println!(
            "{:<8} {:>10} {:>12} {:>7} {:>10}",
            p.level, p.spawn_interval_ms, p.mole_lifetime_ms, p.points_per_hit, p.max_concurrent_moles
        );
    }
    Ok(())
}
