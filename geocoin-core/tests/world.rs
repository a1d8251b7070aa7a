//! End-to-end world scenarios: spawn decisions, cache lifecycle across
//! teardown, and the coin ownership protocol.

use std::collections::HashMap;

use geocoin_core::cache::{collect_into_inventory, deposit_from_inventory, spawns_cache};
use geocoin_core::{
    Board, Cell, CoinKey, GameConfig, GeoPoint, Geocache, GeocoinError, HashLuck, Inventory, Luck,
    MomentoStore,
};

/// Luck source with pinned rolls for exact spawn layouts; unknown keys get
/// a roll that never spawns anything.
struct ScriptedLuck {
    rolls: HashMap<String, f64>,
}

impl ScriptedLuck {
    fn new(rolls: &[(&str, f64)]) -> Self {
        Self {
            rolls: rolls
                .iter()
                .map(|&(key, roll)| (key.to_string(), roll))
                .collect(),
        }
    }
}

impl Luck for ScriptedLuck {
    fn luck(&self, key: &str) -> f64 {
        self.rolls.get(key).copied().unwrap_or(0.99)
    }
}

fn key(i: i32, j: i32, serial: u32) -> CoinKey {
    CoinKey {
        origin: Cell::new(i, j),
        serial,
    }
}

// ---------------------------------------------------------------------------
// Spawn + collect + close + reopen
// ---------------------------------------------------------------------------

#[test]
fn cache_state_survives_teardown_and_rebuild() {
    let config = GameConfig::default();
    let mut board = Board::new(config.tile_width);
    let mut momentos = MomentoStore::new();
    let mut inventory = Inventory::new();
    // Cell (0,0) spawns (0.05 < 0.1) with exactly 3 coins
    // (floor(0.25 * 10) + 1).
    let luck = ScriptedLuck::new(&[("0,0", 0.05), ("0,0#coins", 0.25)]);

    let origin = GeoPoint::new(0.0, 0.0);
    let visible = board.cells_near(origin, 0);
    assert_eq!(visible.len(), 1);
    let cell_id = visible[0];
    assert!(spawns_cache(board.cell(cell_id), &luck, config.spawn_probability));

    // First visit: fresh generation.
    let mut cache = Geocache::generate(&board, cell_id, &luck, &config);
    assert_eq!(cache.coins().len(), 3);

    // Collect serial 1 into the inventory.
    collect_into_inventory(&mut cache, key(0, 0, 1), &mut inventory).expect("collect");
    assert_eq!(inventory.len(), 1);
    assert!(inventory.coins()[0].collected);
    assert_eq!(inventory.coins()[0].key(), key(0, 0, 1));

    // Player walks away: cache closes into a momento and is dropped.
    let snapshot = cache.serialize();
    assert_eq!(snapshot, "0:0#0X0,0:0#2X0,0:0#1X1");
    momentos.put(cell_id, snapshot);
    drop(cache);

    // Player returns: the momento wins over fresh generation.
    let stored = momentos.get(cell_id).expect("momento");
    let reopened = Geocache::restore(cell_id, stored).expect("restore");
    assert_eq!(reopened.coins().len(), 3);
    assert_eq!(reopened.serialize(), momentos.get(cell_id).expect("momento"));

    let flags: Vec<(u32, bool)> = reopened
        .coins()
        .iter()
        .map(|coin| (coin.serial, coin.collected))
        .collect();
    assert_eq!(flags, vec![(0, false), (2, false), (1, true)]);

    // The taken coin cannot be collected again after the rebuild.
    let mut reopened = reopened;
    let err = reopened.collect(key(0, 0, 1)).expect_err("double collect");
    assert!(matches!(err, GeocoinError::CoinNotFound(_)));
}

#[test]
fn deposit_into_another_cache_resets_the_flag() {
    let config = GameConfig::default();
    let mut board = Board::new(config.tile_width);
    let mut inventory = Inventory::new();
    let luck = ScriptedLuck::new(&[
        ("0,0", 0.0),
        ("0,0#coins", 0.15),
        ("5,5", 0.0),
        ("5,5#coins", 0.05),
    ]);

    let home = board.intern(Cell::new(0, 0));
    let away = board.intern(Cell::new(5, 5));
    let mut home_cache = Geocache::generate(&board, home, &luck, &config);
    let mut away_cache = Geocache::generate(&board, away, &luck, &config);

    collect_into_inventory(&mut home_cache, key(0, 0, 1), &mut inventory).expect("collect");
    deposit_from_inventory(key(0, 0, 1), &mut inventory, &mut away_cache).expect("deposit");

    assert!(inventory.is_empty());
    let deposited = away_cache.coins().last().expect("deposited coin");
    assert_eq!(deposited.key(), key(0, 0, 1));
    assert!(!deposited.collected);

    // The deposited coin travels with the away cache's momento.
    let snapshot = away_cache.serialize();
    let reopened = Geocache::restore(away, &snapshot).expect("restore");
    assert_eq!(reopened.coins().last().expect("coin").key(), key(0, 0, 1));
}

#[test]
fn malformed_momento_falls_back_to_generation() {
    let config = GameConfig::default();
    let mut board = Board::new(config.tile_width);
    let mut momentos = MomentoStore::new();

    let cell_id = board.intern(Cell::new(7, 7));
    momentos.put(cell_id, "garbage".to_string());

    let stored = momentos.get(cell_id).expect("momento");
    let cache = match Geocache::restore(cell_id, stored) {
        Ok(cache) => cache,
        Err(GeocoinError::MalformedSnapshot { .. }) => {
            Geocache::generate(&board, cell_id, &HashLuck, &config)
        }
        Err(other) => panic!("unexpected error: {other}"),
    };

    assert!(!cache.coins().is_empty());
    assert!(cache.coins().iter().all(|coin| !coin.collected));
}

// ---------------------------------------------------------------------------
// Determinism across "sessions"
// ---------------------------------------------------------------------------

#[test]
fn spawn_set_is_identical_across_runs() {
    let config = GameConfig::default();
    let origin = GeoPoint::new(36.9894, -122.0627);

    let spawned = |_run: u32| -> Vec<Cell> {
        let mut board = Board::new(config.tile_width);
        board
            .cells_near(origin, config.visibility_radius)
            .into_iter()
            .map(|id| board.cell(id))
            .filter(|&cell| spawns_cache(cell, &HashLuck, config.spawn_probability))
            .collect()
    };

    let first = spawned(0);
    let second = spawned(1);
    assert_eq!(first, second);
}

#[test]
fn regenerated_world_matches_after_full_restart() {
    let config = GameConfig::default();

    let build = || {
        let mut board = Board::new(config.tile_width);
        let id = board.cell_at(GeoPoint::new(1.0, 2.0));
        Geocache::generate(&board, id, &HashLuck, &config).serialize()
    };

    assert_eq!(build(), build());
}

// ---------------------------------------------------------------------------
// Exclusive ownership over a mixed op sequence
// ---------------------------------------------------------------------------

#[test]
fn every_coin_lives_in_exactly_one_container() {
    let config = GameConfig::default();
    let mut board = Board::new(config.tile_width);
    let mut inventory = Inventory::new();
    let luck = HashLuck;

    let a = board.intern(Cell::new(0, 0));
    let b = board.intern(Cell::new(3, -1));
    let mut cache_a = Geocache::generate(&board, a, &luck, &config);
    let mut cache_b = Geocache::generate(&board, b, &luck, &config);

    let all_keys: Vec<CoinKey> = cache_a
        .coins()
        .iter()
        .chain(cache_b.coins())
        .map(geocoin_core::Coin::key)
        .collect();

    // Shuffle coins around: collect everything from A, deposit half into B,
    // collect one back out of B.
    let a_keys: Vec<CoinKey> = cache_a.coins().iter().map(geocoin_core::Coin::key).collect();
    for &coin_key in &a_keys {
        collect_into_inventory(&mut cache_a, coin_key, &mut inventory).expect("collect");
    }
    for &coin_key in a_keys.iter().step_by(2) {
        deposit_from_inventory(coin_key, &mut inventory, &mut cache_b).expect("deposit");
    }
    if let Some(&back) = a_keys.first() {
        collect_into_inventory(&mut cache_b, back, &mut inventory).expect("re-collect");
    }

    for coin_key in all_keys {
        let in_inventory = usize::from(inventory.contains(coin_key));
        let live_in_a = cache_a.live_coins().filter(|c| c.key() == coin_key).count();
        let live_in_b = cache_b.live_coins().filter(|c| c.key() == coin_key).count();
        assert_eq!(
            in_inventory + live_in_a + live_in_b,
            1,
            "coin {coin_key} must live in exactly one container"
        );
    }
}
