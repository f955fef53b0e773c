//! Runner mechanics, power-up timers, wallet and garden

use anyhow::{bail, Result};

use crossroads_sim::arcade::{
    garden, Decoration, ItemKind, MemoryStore, ObstacleKind, PowerUpKind, Progress,
    ProgressStore, RunState, RunSummary, RunnerGame, RunnerTick, TimerQueue, Wallet,
    GARDEN_HALF_EXTENT, GROUND_HEIGHT, POWER_UP_DURATION_MS,
};

/// A store that refuses to save
struct BrokenStore;

impl ProgressStore for BrokenStore {
    fn load(&mut self) -> Result<Option<Progress>> {
        Ok(None)
    }

    fn save(&mut self, _progress: &Progress) -> Result<()> {
        bail!("disk full")
    }

    fn clear(&mut self) -> Result<()> {
        Ok(())
    }
}

fn wallet_with(coins: u64) -> Wallet {
    let store = MemoryStore {
        saved: Some(Progress {
            coins,
            ..Progress::default()
        }),
        save_count: 0,
    };
    Wallet::open(Box::new(store)).expect("memory store always loads")
}

#[test]
fn test_timer_queue_orders_by_due_time() {
    let mut timers = TimerQueue::new();
    timers.schedule(300, "c");
    timers.schedule(100, "a");
    timers.schedule(200, "b");
    timers.schedule(100, "a2");
    assert_eq!(timers.len(), 4);

    assert!(timers.drain_due(99).is_empty());
    assert_eq!(timers.drain_due(100), vec!["a", "a2"]);
    assert_eq!(timers.drain_due(1000), vec!["b", "c"]);
    assert!(timers.is_empty());
}

#[test]
fn test_timer_queue_cancel() {
    let mut timers = TimerQueue::new();
    let first = timers.schedule(100, 1);
    timers.schedule(200, 2);

    assert!(timers.cancel(first));
    assert!(!timers.cancel(first), "already cancelled");
    assert_eq!(timers.len(), 1);
    assert_eq!(timers.drain_due(500), vec![2]);
    assert!(!timers.cancel(first), "nothing left to cancel");
}

#[test]
fn test_power_up_expires_between_ticks() {
    let mut game = RunnerGame::new_with_seed(1);
    game.start(0);
    game.activate(PowerUpKind::Magnet);
    assert_eq!(game.remaining_ms(PowerUpKind::Magnet), Some(POWER_UP_DURATION_MS));

    game.tick(POWER_UP_DURATION_MS - 1);
    assert!(game.is_active(PowerUpKind::Magnet));
    assert_eq!(game.remaining_ms(PowerUpKind::Magnet), Some(1));

    game.tick(POWER_UP_DURATION_MS);
    assert!(!game.is_active(PowerUpKind::Magnet));
    assert_eq!(game.remaining_ms(PowerUpKind::Magnet), None);
}

#[test]
fn test_power_up_pickup_restarts_timer() {
    let mut game = RunnerGame::new_with_seed(2);
    game.start(0);
    game.activate(PowerUpKind::DoubleCoins);

    game.tick(3000);
    game.activate(PowerUpKind::DoubleCoins);
    assert_eq!(game.remaining_ms(PowerUpKind::DoubleCoins), Some(POWER_UP_DURATION_MS));

    // The first countdown would have ended here
    game.tick(POWER_UP_DURATION_MS);
    assert!(game.is_active(PowerUpKind::DoubleCoins));

    game.tick(3000 + POWER_UP_DURATION_MS);
    assert!(!game.is_active(PowerUpKind::DoubleCoins));
}

#[test]
fn test_power_ups_expire_while_paused() {
    let mut game = RunnerGame::new_with_seed(3);
    game.start(0);
    game.activate(PowerUpKind::Slow);
    game.pause();
    assert_eq!(game.state(), RunState::Paused);

    assert_eq!(game.tick(POWER_UP_DURATION_MS), RunnerTick::Idle);
    assert!(!game.is_active(PowerUpKind::Slow));

    game.resume();
    assert_eq!(game.state(), RunState::Running);
}

#[test]
fn test_lane_changes_are_clamped() {
    let mut game = RunnerGame::new_with_seed(4);
    game.move_left();
    assert_eq!(game.lane(), 0, "ignored before the run starts");

    game.start(0);
    game.move_left();
    game.move_left();
    assert_eq!(game.lane(), -1);
    game.move_right();
    game.move_right();
    game.move_right();
    assert_eq!(game.lane(), 1);
}

#[test]
fn test_jump_rises_and_lands() {
    let mut game = RunnerGame::new_with_seed(5);
    game.start(0);
    game.jump();
    assert!(game.is_airborne());

    let mut peak = GROUND_HEIGHT;
    let mut now = 0;
    for _ in 0..40 {
        now += 16;
        game.tick(now);
        peak = peak.max(game.player_position().y);
    }
    assert!(peak > GROUND_HEIGHT + 1.0);
    assert!(!game.is_airborne());
    assert_eq!(game.player_position().y, GROUND_HEIGHT);
}

#[test]
fn test_obstacle_ends_run() {
    let mut game = RunnerGame::new_with_seed(6);
    game.start(0);
    game.spawn_item(ItemKind::Obstacle(ObstacleKind::Crate), 0);

    let mut now = 0;
    let mut summary = None;
    for _ in 0..1000 {
        now += 16;
        if let RunnerTick::GameOver(result) = game.tick(now) {
            summary = Some(result);
            break;
        }
    }

    let summary = summary.expect("the crate should hit the player");
    assert_eq!(game.state(), RunState::Over);
    assert!(summary.distance > 0);
    assert_eq!(game.tick(now + 16), RunnerTick::Idle);
}

#[test]
fn test_invincible_smashes_obstacles() {
    let mut game = RunnerGame::new_with_seed(7);
    game.start(0);
    game.activate(PowerUpKind::Invincible);
    let barrier = game.spawn_item(ItemKind::Obstacle(ObstacleKind::Barrier), 0);

    // One millisecond per tick keeps the power-up alive
    for now in 1..=400 {
        assert!(!matches!(game.tick(now), RunnerTick::GameOver(_)));
    }
    assert_eq!(game.state(), RunState::Running);
    assert!(game.items().iter().all(|item| item.id != barrier));
}

#[test]
fn test_coin_is_collected_in_lane() {
    let mut game = RunnerGame::new_with_seed(8);
    game.start(0);
    game.activate(PowerUpKind::Invincible);
    game.spawn_item(ItemKind::Coin, 0);

    for now in 1..=400 {
        game.tick(now);
    }
    assert!(game.coins() >= 1);
}

#[test]
fn test_wallet_spend_and_earn() {
    let mut wallet = wallet_with(50);
    assert!(wallet.can_afford(50));
    assert!(!wallet.spend(80));
    assert_eq!(wallet.coins(), 50);
    assert!(wallet.spend(30));
    assert_eq!(wallet.coins(), 20);
    wallet.earn(5);
    assert_eq!(wallet.coins(), 25);
}

#[test]
fn test_record_run_keeps_best_distance() {
    let mut wallet = wallet_with(0);
    wallet.record_run(&RunSummary {
        distance: 900,
        coins: 12,
    });
    wallet.record_run(&RunSummary {
        distance: 400,
        coins: 3,
    });
    assert_eq!(wallet.coins(), 15);
    assert_eq!(wallet.high_score(), 900);
    assert_eq!(wallet.progress().high_score, 900);
}

#[test]
fn test_failed_save_does_not_interrupt_play() {
    let mut wallet = Wallet::open(Box::new(BrokenStore)).expect("load succeeds");
    wallet.earn(10);
    assert_eq!(wallet.coins(), 10);
    wallet.reset().expect("clear succeeds");
    assert_eq!(wallet.coins(), 0);
}

#[test]
fn test_garden_place_and_remove() {
    let mut wallet = wallet_with(200);
    let bench = Decoration::new("bench", 120);

    let index = garden::place(&mut wallet, &bench, 3.0, -4.0).expect("affordable and in bounds");
    assert_eq!(index, 0);
    assert_eq!(wallet.coins(), 80);
    assert_eq!(wallet.progress().garden_items.len(), 1);

    let err = garden::place(&mut wallet, &bench, 0.0, 0.0).unwrap_err();
    assert!(err.to_string().contains("bench"));
    assert_eq!(wallet.coins(), 80);

    let fountain = Decoration::new("fountain", 10);
    assert!(garden::place(&mut wallet, &fountain, GARDEN_HALF_EXTENT + 1.0, 0.0).is_err());
    assert_eq!(wallet.coins(), 80, "rejected placement costs nothing");

    let removed = garden::remove(&mut wallet, 0).expect("item exists");
    assert_eq!(removed.item_id, "bench");
    assert_eq!(wallet.coins(), 80, "no refund");
    assert!(garden::remove(&mut wallet, 0).is_err());
}
