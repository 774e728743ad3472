//! Performance benchmarks for slot construction, pairing and rating

use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ladder_referee::config::LadderConfig;
use ladder_referee::host::{GameState, GameStatus, ScriptedMatchHost};
use ladder_referee::matchmaker::{build_slot_pools, plan_pairings, Matchmaker, MatchPlan};
use ladder_referee::rating::EloCalculator;
use ladder_referee::referee::Referee;
use ladder_referee::types::{ActiveGame, Player, PlayerRegistry, Template};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn create_bench_ladder(size: usize) -> (PlayerRegistry, Vec<ActiveGame>) {
    let now = Utc::now();
    let players: PlayerRegistry = (0..size)
        .map(|i| {
            let mut player = Player::new(format!("player_{}", i), 900.0 + i as f64, (i % 4) as u32);
            player.missed_games = (i % 5) as u32;
            if i > 0 {
                player.last_opponent = Some((i - 1).to_string());
            }
            (i.to_string(), player)
        })
        .collect();

    let games = (0..size / 4)
        .map(|i| ActiveGame {
            game_id: i as u64,
            created_at: now - Duration::days((i % 10) as i64),
            p1_id: (2 * i).to_string(),
            p2_id: (2 * i + 1).to_string(),
            template_id: 1,
        })
        .collect();

    (players, games)
}

fn bench_slot_pools(c: &mut Criterion) {
    let (players, games) = create_bench_ladder(500);
    let config = LadderConfig::default();
    let now = Utc::now();

    c.bench_function("slot_pools_500_players", |b| {
        b.iter(|| black_box(build_slot_pools(&players, &games, &config, now)))
    });
}

fn bench_pairing(c: &mut Criterion) {
    let (players, games) = create_bench_ladder(500);
    let config = LadderConfig::default();
    let pools = build_slot_pools(&players, &games, &config, Utc::now());
    let mut rng = StdRng::seed_from_u64(42);

    c.bench_function("pairing_500_players", |b| {
        b.iter(|| black_box(plan_pairings(pools.clone(), &players, &mut rng)))
    });
}

fn bench_full_plan(c: &mut Criterion) {
    let (players, games) = create_bench_ladder(500);
    let templates = vec![
        Template {
            id: 1,
            name: "Small Earth".to_string(),
        },
        Template {
            id: 2,
            name: "Europe".to_string(),
        },
    ];
    let matchmaker = Matchmaker::new(LadderConfig::default(), "Ladder");
    let mut rng = StdRng::seed_from_u64(7);

    c.bench_function("matchmaker_plan_500_players", |b| {
        b.iter(|| {
            let plan = matchmaker.plan(&players, &games, &templates, Utc::now(), &mut rng);
            match plan {
                MatchPlan::Ready { matches, .. } => black_box(matches.len()),
                MatchPlan::NoTemplates => 0,
            }
        })
    });
}

fn bench_elo(c: &mut Criterion) {
    let calculator = EloCalculator::new(40.0).unwrap();

    c.bench_function("elo_decisive_update", |b| {
        b.iter(|| black_box(calculator.rate_decisive(black_box(1000.0), black_box(1400.0))))
    });
}

fn bench_referee_pass(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let (players, games) = create_bench_ladder(200);
    let host = ScriptedMatchHost::default();
    for game in &games {
        host.set_status(
            game.game_id,
            GameStatus::new(GameState::Finished).with_winner(game.p1_id.clone()),
        );
    }
    let referee = Referee::new(LadderConfig::default()).unwrap();

    c.bench_function("referee_pass_50_games", |b| {
        b.iter(|| {
            rt.block_on(async {
                let outcome = referee
                    .run(&host, players.clone(), games.clone(), Vec::new(), Utc::now())
                    .await;
                black_box(outcome.run.history.len())
            })
        })
    });
}

criterion_group!(
    benches,
    bench_slot_pools,
    bench_pairing,
    bench_full_plan,
    bench_elo,
    bench_referee_pass
);
criterion_main!(benches);
