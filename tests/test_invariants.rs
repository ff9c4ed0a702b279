//! Randomized invariant checks: generated well-formed games must always
//! satisfy the partition, lineup, margin-chaining, possession-conservation,
//! and idempotence properties.

use chrono::NaiveDate;
use hoopflow::segmenter_core::{segment_game, GameMeta, RawPlay};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const HOME: u64 = 100;
const AWAY: u64 = 200;

fn meta(game_id: u64) -> GameMeta {
    GameMeta {
        game_id,
        game_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        home_team_id: HOME,
        away_team_id: AWAY,
    }
}

fn play(period: u32, clock_seconds: u32, event_type: &str) -> RawPlay {
    RawPlay {
        period,
        clock: format!("{}:{:02}", clock_seconds / 60, clock_seconds % 60),
        event_type: event_type.to_string(),
        team_id: None,
        points: None,
        made: None,
        ft_number: None,
        ft_total: None,
        player_in: None,
        player_out: None,
        home_starters: None,
        away_starters: None,
    }
}

struct Roster {
    on_court: Vec<u64>,
    bench: Vec<u64>,
}

/// Generate a structurally valid four-period game with random scoring,
/// rebounds, turnovers, and substitutions.
fn random_game(rng: &mut StdRng) -> Vec<RawPlay> {
    let mut home = Roster {
        on_court: vec![1, 2, 3, 4, 5],
        bench: vec![6, 7, 8, 9, 10],
    };
    let mut away = Roster {
        on_court: vec![21, 22, 23, 24, 25],
        bench: vec![26, 27, 28, 29, 30],
    };

    let mut plays = Vec::new();

    for period in 1..=4u32 {
        let mut start = play(period, 720, "PERIOD_START");
        start.home_starters = Some(home.on_court.clone());
        start.away_starters = Some(away.on_court.clone());
        plays.push(start);

        let mut clock: u32 = 720;
        while clock > 45 {
            clock -= rng.gen_range(10..=40);
            let team = if rng.gen_bool(0.5) { HOME } else { AWAY };
            let other = if team == HOME { AWAY } else { HOME };

            match rng.gen_range(0..8u8) {
                0 | 1 => {
                    let mut p = play(period, clock, "SCORE");
                    p.team_id = Some(team);
                    p.points = Some(if rng.gen_bool(0.3) { 3 } else { 2 });
                    p.made = Some(true);
                    plays.push(p);
                }
                2 => {
                    // Miss and defensive rebound.
                    let mut miss = play(period, clock, "SCORE");
                    miss.team_id = Some(team);
                    miss.points = Some(2);
                    miss.made = Some(false);
                    plays.push(miss);
                    let mut reb = play(period, clock - 1, "REBOUND");
                    reb.team_id = Some(other);
                    plays.push(reb);
                }
                3 => {
                    // Miss, offensive rebound, putback.
                    let mut miss = play(period, clock, "SCORE");
                    miss.team_id = Some(team);
                    miss.points = Some(2);
                    miss.made = Some(false);
                    plays.push(miss);
                    let mut reb = play(period, clock - 1, "REBOUND");
                    reb.team_id = Some(team);
                    plays.push(reb);
                    let mut putback = play(period, clock - 2, "SCORE");
                    putback.team_id = Some(team);
                    putback.points = Some(2);
                    putback.made = Some(true);
                    plays.push(putback);
                }
                4 => {
                    let mut p = play(period, clock, "TURNOVER");
                    p.team_id = Some(team);
                    plays.push(p);
                }
                5 => {
                    // Two-shot free-throw trip.
                    for number in 1..=2u8 {
                        let mut ft = play(period, clock, "SCORE");
                        ft.team_id = Some(team);
                        ft.points = Some(1);
                        ft.made = Some(rng.gen_bool(0.8));
                        ft.ft_number = Some(number);
                        ft.ft_total = Some(2);
                        plays.push(ft);
                    }
                }
                6 => {
                    let roster = if team == HOME { &mut home } else { &mut away };
                    let out_idx = rng.gen_range(0..roster.on_court.len());
                    let in_idx = rng.gen_range(0..roster.bench.len());
                    let player_out = roster.on_court[out_idx];
                    let player_in = roster.bench[in_idx];
                    roster.on_court[out_idx] = player_in;
                    roster.bench[in_idx] = player_out;

                    let mut p = play(period, clock, "SUBSTITUTION");
                    p.team_id = Some(team);
                    p.player_in = Some(player_in);
                    p.player_out = Some(player_out);
                    plays.push(p);
                }
                _ => {
                    let mut p = play(period, clock, "FOUL");
                    p.team_id = Some(team);
                    plays.push(p);
                }
            }
        }

        plays.push(play(period, 0, "PERIOD_END"));
    }

    plays
}

#[test]
fn test_random_games_satisfy_invariants() {
    let mut rng = StdRng::seed_from_u64(20260301);

    for game_id in 0..25u64 {
        let plays = random_game(&mut rng);
        let result = segment_game(&meta(game_id), &plays);

        assert!(!result.is_fatal(), "game {} flagged fatal", game_id);
        assert!(
            result.faults.is_empty(),
            "well-formed game {} produced faults: {:?}",
            game_id,
            result.faults
        );
        assert!(result.stints.len() >= 4, "fewer stints than periods");

        // Partition: contiguous and non-overlapping, spanning the game.
        let first = result.stints.first().unwrap();
        let last = result.stints.last().unwrap();
        assert_eq!((first.period, first.start_clock.as_str()), (1, "12:00"));
        assert_eq!((last.period, last.end_clock.as_str()), (4, "00:00"));
        for pair in result.stints.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            assert_eq!(next.stint_num, prev.stint_num + 1);
            if prev.period == next.period {
                assert_eq!(prev.end_clock, next.start_clock);
            } else {
                assert_eq!(next.period, prev.period + 1);
                assert_eq!(prev.end_clock, "00:00");
                assert_eq!(next.start_clock, "12:00");
            }
            // Margin chaining / score monotonicity.
            assert_eq!(prev.end_margin, next.start_margin);
        }

        // Lineup invariant: exactly five distinct players per side.
        for stint in &result.stints {
            for lineup in [&stint.home_lineup, &stint.away_lineup] {
                assert_eq!(lineup.len(), 5);
                let mut dedup = lineup.clone();
                dedup.dedup();
                assert_eq!(dedup.len(), 5, "duplicate player in lineup");
            }
            assert_eq!(
                stint.end_margin,
                stint.start_margin + stint.home_points as i32 - stint.away_points as i32
            );
        }

        // Possession conservation: every possession-ending event closes
        // exactly one log record.
        let total: u32 = result.stints.iter().map(|s| s.possessions).sum();
        assert_eq!(total as usize, result.possessions.len());

        // Idempotence.
        let rerun = segment_game(&meta(game_id), &plays);
        assert_eq!(result, rerun);
    }
}
