// Integration tests (native) for the `glyphfall` crate.
// These tests avoid wasm-specific functionality and exercise the pure session,
// sampling and damage logic so they can run under `cargo test` on the host.

use glyphfall::screen::damage::DamageGrid;
use glyphfall::screen::game::{
    GameEvent, GamePhase, GameSession, KeyOutcome, MAX_ENEMIES, SPAWN_INTERVAL_MS,
};
use glyphfall::screen::rng::Lcg;
use glyphfall::screen::sampler::{self, Charset, FrameOptions};

/// Play a full session against the public API only: spawn words by advancing
/// the clock, read what spawned, type it down, and confirm the score.
#[test]
fn typed_words_score_and_leave_the_field_empty() {
    let mut session = GameSession::new(60);
    let mut rng = Lcg::new(2024);
    session.start();

    let mut now = 0.0;
    for round in 1..=5u64 {
        now += SPAWN_INTERVAL_MS + 1.0;
        let events = session.tick(now, &mut rng);
        assert!(events.is_empty(), "no word should reach the boundary yet");
        assert_eq!(session.enemies().len(), 1);

        let word = session.enemies()[0].word;
        assert!(glyphfall::WORDS.contains(&word));
        let mut last = KeyOutcome::Ignored;
        for c in word.chars() {
            last = session.type_letter(c);
        }
        assert!(matches!(last, KeyOutcome::Destroyed { word: w, .. } if w == word));
        assert_eq!(session.score(), round);
        assert!(session.enemies().is_empty());
    }
    assert_eq!(session.destroyed_rows(), 0);
}

#[test]
fn in_flight_words_never_exceed_the_cap() {
    let mut session = GameSession::new(60);
    let mut rng = Lcg::new(7);
    session.start();

    // Tick on a fine grid so spawns land on schedule while words fall
    // naturally; the cap must hold at every observation point.
    let mut now = 0.0;
    while now < 60_000.0 {
        now += 100.0;
        session.tick(now, &mut rng);
        assert!(session.enemies().len() <= MAX_ENEMIES);
        if session.phase() == GamePhase::GameOver {
            break;
        }
    }
}

#[test]
fn unanswered_words_grind_the_session_to_game_over() {
    let mut session = GameSession::new(60);
    let mut rng = Lcg::new(99);
    session.start();

    let mut now = 0.0;
    let mut impacts = 0usize;
    let mut finished = None;
    'run: while now < 10_000_000.0 {
        now += 100.0;
        for event in session.tick(now, &mut rng) {
            match event {
                GameEvent::Impact { .. } => impacts += 1,
                GameEvent::GameOver { score } => {
                    finished = Some(score);
                    break 'run;
                }
            }
        }
        assert!(session.destroyed_rows() <= session.total_rows());
        assert_eq!(session.destroyed_rows(), impacts);
    }
    assert_eq!(finished, Some(0));
    assert_eq!(session.destroyed_rows(), 60);
    assert_eq!(session.phase(), GamePhase::GameOver);

    // Restart wipes the whole session.
    session.start();
    assert_eq!(session.phase(), GamePhase::Active);
    assert_eq!(session.score(), 0);
    assert_eq!(session.destroyed_rows(), 0);
    assert!(session.enemies().is_empty());
}

#[test]
fn destroyed_rows_blank_the_sampled_frame_bottom_up() {
    let cols = 10;
    let rows = 6;
    let pixels = vec![255u8; cols * rows * 4];
    let mut damage = DamageGrid::new(cols, rows);
    let mut rng = Lcg::new(3);

    for destroyed in 0..=rows {
        let opts = FrameOptions {
            charset: Charset::Blocks,
            per_cell_color: false,
            glitch: false,
            destroyed_rows: destroyed,
        };
        let text = sampler::render_frame(&pixels, cols, rows, &opts, &mut damage, &mut rng);
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), rows + 1, "trailing newline per row");
        for (i, line) in lines[..rows].iter().enumerate() {
            if i < rows - destroyed {
                assert_eq!(line.chars().count(), cols);
            } else {
                assert!(line.is_empty(), "destroyed row {i} must stay blank");
            }
        }
    }
}

#[test]
fn damage_heals_over_rendered_ticks() {
    let cols = 4;
    let rows = 4;
    let pixels = vec![0u8; cols * rows * 4];
    let mut damage = DamageGrid::new(cols, rows);
    damage.seed_burst(1, 1, 0, 2);
    let mut rng = Lcg::new(11);
    let opts = FrameOptions {
        charset: Charset::Ascii,
        per_cell_color: false,
        glitch: false,
        destroyed_rows: 0,
    };

    sampler::render_frame(&pixels, cols, rows, &opts, &mut damage, &mut rng);
    assert_eq!(damage.get(1, 1), 1);
    sampler::render_frame(&pixels, cols, rows, &opts, &mut damage, &mut rng);
    assert_eq!(damage.get(1, 1), 0);
    // Healed: a dark frame now renders the blank glyph everywhere again.
    let text = sampler::render_frame(&pixels, cols, rows, &opts, &mut damage, &mut rng);
    let blank_row = format!("{}\n", "&nbsp;".repeat(cols));
    assert_eq!(text, blank_row.repeat(rows));
}
