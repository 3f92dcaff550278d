//! Typing-defense session: spawning, falling, keystroke matching and the
//! Idle -> Active -> GameOver state machine. Pure with respect to the
//! browser: time arrives as millisecond stamps, randomness as an `Lcg`, and
//! everything visual is reported back as events for the glue layer.

use super::rng::Lcg;

/// Concurrency cap for in-flight words.
pub const MAX_ENEMIES: usize = 3;
/// Minimum milliseconds between spawn attempts.
pub const SPAWN_INTERVAL_MS: f64 = 2000.0;
/// Fall speed: percent of playfield height per millisecond (30%/s at 60fps).
pub const FALL_PCT_PER_MS: f64 = 0.03;
/// The destruction boundary with zero destroyed rows, as a percent line.
pub const BASE_BOUNDARY_PCT: f64 = 90.0;

const SPAWN_X_MIN_PCT: f64 = 10.0;
const SPAWN_X_SPAN_PCT: f64 = 80.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GamePhase {
    Idle,
    Active,
    GameOver,
}

/// A spawned word descending toward the destruction boundary.
#[derive(Clone, Debug)]
pub struct Enemy {
    pub word: &'static str,
    pub x_pct: f64,
    pub y_pct: f64,
    /// Prefix length currently highlighted as matched.
    pub matched: usize,
}

/// Tick outcomes the glue layer turns into visuals.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// A word crossed the boundary: one more row destroyed at this position.
    Impact { x_pct: f64, y_pct: f64 },
    /// All rows destroyed; the session froze with this final score.
    GameOver { score: u64 },
}

/// Result of feeding one letter into the typed buffer.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyOutcome {
    /// Some word's matched prefix advanced.
    Highlight,
    /// The buffer spelled a word exactly; it was shot down.
    Destroyed {
        word: &'static str,
        x_pct: f64,
        y_pct: f64,
    },
    /// No word matched; buffer and highlights reset.
    Reset,
    /// Ignored input (wrong phase or non-letter).
    Ignored,
}

pub struct GameSession {
    phase: GamePhase,
    total_rows: usize,
    enemies: Vec<Enemy>,
    typed: String,
    score: u64,
    destroyed_rows: usize,
    last_spawn_ms: f64,
    last_tick_ms: Option<f64>,
    words: &'static [&'static str],
}

impl GameSession {
    pub fn new(total_rows: usize) -> Self {
        Self {
            phase: GamePhase::Idle,
            total_rows,
            enemies: Vec::new(),
            typed: String::new(),
            score: 0,
            destroyed_rows: 0,
            last_spawn_ms: 0.0,
            last_tick_ms: None,
            words: crate::WORDS,
        }
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn destroyed_rows(&self) -> usize {
        self.destroyed_rows
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// The percent line enemies must not cross. Rises as rows are destroyed.
    pub fn boundary_pct(&self) -> f64 {
        if self.total_rows == 0 {
            return BASE_BOUNDARY_PCT;
        }
        BASE_BOUNDARY_PCT - (self.destroyed_rows as f64 / self.total_rows as f64) * 100.0
    }

    /// Enter Active with every counter reset. Valid from any phase.
    pub fn start(&mut self) {
        self.phase = GamePhase::Active;
        self.enemies.clear();
        self.typed.clear();
        self.score = 0;
        self.destroyed_rows = 0;
        self.last_spawn_ms = 0.0;
        self.last_tick_ms = None;
    }

    /// Leave Active for Idle. Destroyed rows persist until the next start.
    pub fn stop(&mut self) {
        self.phase = GamePhase::Idle;
        self.enemies.clear();
        self.typed.clear();
    }

    /// Advance one frame. Spawns, moves enemies, and reports boundary hits.
    pub fn tick(&mut self, now_ms: f64, rng: &mut Lcg) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.phase != GamePhase::Active {
            return events;
        }

        let dt = match self.last_tick_ms {
            Some(last) => now_ms - last,
            None => 0.0,
        };
        self.last_tick_ms = Some(now_ms);

        // The spawn clock advances even when the cap blocks a spawn.
        if now_ms - self.last_spawn_ms > SPAWN_INTERVAL_MS {
            if self.enemies.len() < MAX_ENEMIES {
                let word = self.words[rng.index(self.words.len())];
                let x_pct = SPAWN_X_MIN_PCT + rng.next_f64() * SPAWN_X_SPAN_PCT;
                self.enemies.push(Enemy {
                    word,
                    x_pct,
                    y_pct: 0.0,
                    matched: 0,
                });
            }
            self.last_spawn_ms = now_ms;
        }

        let move_amount = FALL_PCT_PER_MS * dt;
        let boundary = self.boundary_pct();
        let mut i = 0;
        while i < self.enemies.len() {
            self.enemies[i].y_pct += move_amount;
            if self.enemies[i].y_pct > boundary {
                let enemy = self.enemies.remove(i);
                self.destroyed_rows += 1;
                self.typed.clear();
                events.push(GameEvent::Impact {
                    x_pct: enemy.x_pct,
                    y_pct: enemy.y_pct,
                });
                if self.destroyed_rows >= self.total_rows {
                    self.phase = GamePhase::GameOver;
                    events.push(GameEvent::GameOver { score: self.score });
                    break;
                }
            } else {
                i += 1;
            }
        }
        events
    }

    /// Feed one letter key. Non-letters are ignored; letters are uppercased
    /// and matched as a prefix against enemies in spawn order.
    pub fn type_letter(&mut self, c: char) -> KeyOutcome {
        if self.phase != GamePhase::Active || !c.is_ascii_alphabetic() {
            return KeyOutcome::Ignored;
        }
        self.typed.push(c.to_ascii_uppercase());

        let target = self
            .enemies
            .iter()
            .position(|e| e.word.starts_with(self.typed.as_str()));
        match target {
            Some(idx) => {
                if self.enemies[idx].word == self.typed {
                    let enemy = self.enemies.remove(idx);
                    self.score += 1;
                    self.typed.clear();
                    KeyOutcome::Destroyed {
                        word: enemy.word,
                        x_pct: enemy.x_pct,
                        y_pct: enemy.y_pct,
                    }
                } else {
                    self.enemies[idx].matched = self.typed.len();
                    KeyOutcome::Highlight
                }
            }
            None => {
                self.typed.clear();
                for enemy in &mut self.enemies {
                    enemy.matched = 0;
                }
                KeyOutcome::Reset
            }
        }
    }

    /// Backspace removes one buffered character without re-matching.
    pub fn backspace(&mut self) {
        if self.phase == GamePhase::Active {
            self.typed.pop();
        }
    }
}
