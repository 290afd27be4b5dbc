use poke_rpg_core::{BiomeId, Command, Event, HexId, HexRejection, WorldGenerationConfig};
use poke_rpg_system_world_generation::generate_world;
use poke_rpg_world::{apply, query, World};
use proptest::prelude::*;

fn generated_world() -> World {
    let config = WorldGenerationConfig::default()
        .with_default_biomes(&[BiomeId::from("verdant-forest"), BiomeId::from("misty-swamp")]);
    World::new(generate_world(&config).tiles)
}

#[test]
fn snapshot_preserves_generation_order() {
    let config = WorldGenerationConfig::default()
        .with_default_biomes(&[BiomeId::from("verdant-forest"), BiomeId::from("misty-swamp")]);
    let generated = generate_world(&config).tiles;
    let world = World::new(generated.clone());

    let snapshot = query::snapshot(&world);
    let expected: Vec<HexId> = generated.iter().map(|hex| hex.id.clone()).collect();
    assert_eq!(snapshot.ids(), expected.as_slice());
    assert!(snapshot.iter().all(|view| !view.explored && !view.cleared));
    for hex in &generated {
        assert_eq!(query::biome(&world, &hex.id), Some(&hex.biome));
    }
}

#[test]
fn explore_command_emits_once() {
    let mut world = generated_world();
    let hex = query::next_unexplored(&world).cloned().expect("world has tiles");

    let mut events = Vec::new();
    apply(&mut world, Command::ExploreHex { hex: hex.clone() }, &mut events);
    apply(&mut world, Command::ExploreHex { hex: hex.clone() }, &mut events);

    assert_eq!(
        events,
        vec![
            Event::HexExplored { hex: hex.clone() },
            Event::HexCommandRejected {
                hex: hex.clone(),
                reason: HexRejection::AlreadyExplored,
            },
        ]
    );
    assert_ne!(query::next_unexplored(&world), Some(&hex));
}

#[test]
fn clearing_unexplored_hex_explores_it_first() {
    let mut world = generated_world();
    let hex = query::next_unexplored(&world).cloned().expect("world has tiles");

    let mut events = Vec::new();
    apply(&mut world, Command::MarkHexCleared { hex: hex.clone() }, &mut events);
    apply(&mut world, Command::MarkHexCleared { hex: hex.clone() }, &mut events);

    assert_eq!(
        events,
        vec![
            Event::HexExplored { hex: hex.clone() },
            Event::HexCleared { hex: hex.clone() },
            Event::HexCommandRejected {
                hex: hex.clone(),
                reason: HexRejection::AlreadyCleared,
            },
        ]
    );
    assert_eq!(query::progress(&world), (1, 1));
}

#[test]
fn unknown_hex_is_rejected_without_mutation() {
    let mut world = generated_world();
    let before = query::snapshot(&world);
    let missing = HexId::from("chunk-9-9-q99-r99");

    let mut events = Vec::new();
    apply(&mut world, Command::ExploreHex { hex: missing.clone() }, &mut events);
    apply(&mut world, Command::MarkHexCleared { hex: missing.clone() }, &mut events);

    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|event| matches!(
        event,
        Event::HexCommandRejected {
            reason: HexRejection::UnknownHex,
            ..
        }
    )));
    assert_eq!(query::snapshot(&world), before);
    assert!(query::tile(&world, &missing).is_none());
    assert!(query::biome(&world, &missing).is_none());
}

proptest! {
    #[test]
    fn flags_are_monotonic(
        commands in prop::collection::vec((any::<bool>(), 0usize..140), 0..200),
    ) {
        let mut world = generated_world();
        let ids: Vec<HexId> = query::snapshot(&world).ids().to_vec();
        let mut events = Vec::new();
        let mut previous = query::snapshot(&world);

        for (clear, index) in commands {
            let hex = ids
                .get(index)
                .cloned()
                .unwrap_or_else(|| HexId::from("missing"));
            let command = if clear {
                Command::MarkHexCleared { hex }
            } else {
                Command::ExploreHex { hex }
            };
            apply(&mut world, command, &mut events);

            let current = query::snapshot(&world);
            for view in current.iter() {
                let before = previous.get(&view.id).expect("ids are stable");
                prop_assert!(!before.explored || view.explored);
                prop_assert!(!before.cleared || view.cleared);
                prop_assert!(!view.cleared || view.explored);
            }
            previous = current;
        }
    }
}
