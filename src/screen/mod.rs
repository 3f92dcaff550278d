//! Browser glue for the ASCII screen: owns the render/game loop, the DOM
//! overlays, the keyboard listener and the boundary to the page's animation
//! decoder. The sampling, damage, game and effect logic live in the
//! submodules and stay free of `web_sys` so they test natively.
//!
//! DOM contract with the page: the decoder draws into `#source-canvas`, the
//! art lands in `#ascii-output`, falling words and effects in `#game-layer`,
//! and `#source-name` (optional) shows the active source. Score and
//! game-over overlays are created here if the page does not provide them.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, window};

pub mod damage;
pub mod fx;
pub mod game;
pub mod rng;
pub mod sampler;

use crate::SOURCES;
use damage::DamageGrid;
use fx::{BeamEffect, ExplosionEffect};
use game::{Enemy, GameEvent, GamePhase, GameSession, KeyOutcome};
use rng::Lcg;
use sampler::{Charset, ColorMode, FrameOptions};

/// Fixed character-grid height; columns follow the source aspect ratio.
pub const ROWS: usize = 60;
/// Width/height of one rendered character cell in the page's monospace font.
const CELL_ASPECT: f64 = 0.6;

const DAMAGE_BURST_RADIUS: usize = 3;
const DAMAGE_BURST_TICKS: u16 = 90;

#[wasm_bindgen]
extern "C" {
    /// Page-provided: point the external decoder at a named source.
    #[wasm_bindgen(js_name = loadAnimation)]
    fn load_animation(name: &str);
    /// Page-provided: whether the decoder is currently playing.
    #[wasm_bindgen(js_name = animationPlaying)]
    fn animation_playing() -> bool;
}

/// Runtime screen state.
struct ScreenState {
    sample_canvas: HtmlCanvasElement,
    sample_ctx: CanvasRenderingContext2d,
    cols: usize,
    source_index: usize,
    charset: Charset,
    color_mode: ColorMode,
    glitch: bool,
    damage: DamageGrid,
    session: GameSession,
    beams: Vec<BeamEffect>,
    explosions: Vec<ExplosionEffect>,
    rng: Lcg,
    loop_running: bool,
}

thread_local! {
    static SCREEN_STATE: std::cell::RefCell<Option<ScreenState>> = std::cell::RefCell::new(None);
}

#[wasm_bindgen]
pub fn start_screen_mode() -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    // Offscreen sampling surface at cell resolution; never attached to the DOM.
    let sample_canvas: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
    let sample_ctx: CanvasRenderingContext2d = sample_canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;

    ensure_overlays(&doc)?;

    let now = win.performance().map(|p| p.now()).unwrap_or(0.0);
    let state = ScreenState {
        sample_canvas,
        sample_ctx,
        cols: 0,
        source_index: 0,
        charset: Charset::Ascii,
        color_mode: ColorMode::Green,
        glitch: false,
        damage: DamageGrid::new(0, ROWS),
        session: GameSession::new(ROWS),
        beams: Vec::new(),
        explosions: Vec::new(),
        rng: Lcg::new(now as u32),
        loop_running: false,
    };
    SCREEN_STATE.with(|cell| cell.replace(Some(state)));

    // Keyboard listener for the typing game
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            SCREEN_STATE.with(|cell| {
                if let Some(state) = cell.borrow_mut().as_mut() {
                    if state.session.phase() != GamePhase::Active {
                        return;
                    }
                    let key = evt.key();
                    if key == "Backspace" {
                        state.session.backspace();
                    } else if key.len() == 1 {
                        let c = key.chars().next().unwrap();
                        if let KeyOutcome::Destroyed { x_pct, y_pct, .. } =
                            state.session.type_letter(c)
                        {
                            state.beams.push(BeamEffect {
                                x_pct,
                                y_pct,
                                start_ms: performance_now(),
                            });
                        }
                    }
                }
            });
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    set_source_label(&doc, SOURCES[0]);
    // The decoder's load callback re-enters via source_loaded(); it must run
    // outside any active borrow of the state cell.
    load_animation(SOURCES[0]);
    Ok(())
}

/// Invoked by the page when the decoder finished loading a source and its
/// canvas carries real dimensions. Derives the character grid and starts the
/// frame loop on first call. A source that never loads never gets here and
/// the screen simply stays idle.
#[wasm_bindgen]
pub fn source_loaded() -> Result<(), JsValue> {
    let doc = window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let source: HtmlCanvasElement = doc
        .get_element_by_id("source-canvas")
        .ok_or_else(|| JsValue::from_str("no source canvas"))?
        .dyn_into()?;
    let (width, height) = (source.width(), source.height());
    let cols = grid_cols(width, height);
    if cols == 0 {
        return Ok(());
    }

    let needs_loop = SCREEN_STATE.with(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            state.cols = cols;
            state.sample_canvas.set_width(cols as u32);
            state.sample_canvas.set_height(ROWS as u32);
            state.damage.resize(cols, ROWS);
            if !state.loop_running {
                state.loop_running = true;
                return true;
            }
        }
        false
    });
    if needs_loop {
        start_screen_loop();
    }
    web_sys::console::log_1(&format!("source ready: {width}x{height} -> {cols} cols").into());
    Ok(())
}

type FrameCallback = std::rc::Rc<std::cell::RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn start_screen_loop() {
    let f: FrameCallback = std::rc::Rc::new(std::cell::RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        SCREEN_STATE.with(|cell| {
            if let Some(state) = cell.borrow_mut().as_mut() {
                screen_tick(state, ts);
            }
        });
        if let Some(w) = window() {
            let _ =
                w.request_animation_frame(f.borrow().as_ref().unwrap().as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(w) = window() {
        let _ = w.request_animation_frame(g.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}

// --- Tick & rendering --------------------------------------------------------

fn screen_tick(state: &mut ScreenState, now: f64) {
    if state.cols > 0 && animation_playing() {
        render_ascii_frame(state);
    }

    for event in state.session.tick(now, &mut state.rng) {
        match event {
            GameEvent::Impact { x_pct, y_pct } => {
                state.explosions.push(ExplosionEffect {
                    x_pct,
                    y_pct,
                    start_ms: now,
                });
                let row = (y_pct / 100.0 * ROWS as f64) as usize;
                let col = (x_pct / 100.0 * state.cols as f64) as usize;
                state.damage.seed_burst(
                    row.min(ROWS - 1),
                    col.min(state.cols.saturating_sub(1)),
                    DAMAGE_BURST_RADIUS,
                    DAMAGE_BURST_TICKS,
                );
            }
            GameEvent::GameOver { score } => show_game_over(score),
        }
    }

    state.beams.retain(|b| now - b.start_ms < fx::BEAM_TTL_MS);
    state
        .explosions
        .retain(|e| now - e.start_ms < fx::EXPLOSION_TTL_MS);

    update_overlays(state);
}

/// Sample the decoded frame down to cell resolution and publish the text.
fn render_ascii_frame(state: &mut ScreenState) {
    let doc = match window().and_then(|w| w.document()) {
        Some(d) => d,
        None => return,
    };
    let source = match doc
        .get_element_by_id("source-canvas")
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
    {
        Some(c) => c,
        None => return,
    };

    let cols = state.cols as f64;
    let rows = ROWS as f64;
    if state
        .sample_ctx
        .draw_image_with_html_canvas_element_and_dw_and_dh(&source, 0.0, 0.0, cols, rows)
        .is_err()
    {
        return;
    }
    let image = match state.sample_ctx.get_image_data(0.0, 0.0, cols, rows) {
        Ok(image) => image,
        Err(_) => return,
    };
    let pixels = image.data();

    let opts = FrameOptions {
        charset: state.charset,
        per_cell_color: state.color_mode.per_cell_color(),
        glitch: state.glitch,
        destroyed_rows: state.session.destroyed_rows(),
    };
    let text = sampler::render_frame(
        &pixels,
        state.cols,
        ROWS,
        &opts,
        &mut state.damage,
        &mut state.rng,
    );
    if let Some(out) = doc.get_element_by_id("ascii-output") {
        out.set_inner_html(&text);
    }
}

fn update_overlays(state: &ScreenState) {
    let doc = match window().and_then(|w| w.document()) {
        Some(d) => d,
        None => return,
    };
    if state.session.phase() == GamePhase::Active {
        if let Some(score_el) = doc.get_element_by_id("score-display") {
            score_el.set_text_content(Some(&format!("SCORE: {}", state.session.score())));
        }
    }
    if let Some(layer) = doc.get_element_by_id("game-layer") {
        if state.session.phase() == GamePhase::Active {
            let width = layer.client_width() as f64;
            let height = layer.client_height() as f64;
            let mut html = enemies_html(state.session.enemies());
            html.push_str(&effects_html(&state.beams, &state.explosions, width, height));
            layer.set_inner_html(&html);
        } else {
            layer.set_inner_html("");
        }
    }
}

fn show_game_over(score: u64) {
    if let Some(doc) = window().and_then(|w| w.document()) {
        if let Some(final_el) = doc.get_element_by_id("final-score") {
            final_el.set_text_content(Some(&score.to_string()));
        }
        if let Some(overlay) = doc.get_element_by_id("game-over-overlay") {
            overlay.set_attribute("style", "display:flex").ok();
        }
    }
}

// --- Page controls -----------------------------------------------------------

#[wasm_bindgen]
pub fn cycle_source() -> String {
    let name = SCREEN_STATE.with(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            state.source_index = (state.source_index + 1) % SOURCES.len();
            SOURCES[state.source_index]
        } else {
            SOURCES[0]
        }
    });
    if let Some(doc) = window().and_then(|w| w.document()) {
        set_source_label(&doc, name);
    }
    load_animation(name);
    display_name(name).to_string()
}

#[wasm_bindgen]
pub fn cycle_charset() -> String {
    SCREEN_STATE.with(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            state.charset = state.charset.next();
            state.charset.label().to_string()
        } else {
            Charset::Ascii.label().to_string()
        }
    })
}

#[wasm_bindgen]
pub fn cycle_color_mode() -> String {
    let mode = SCREEN_STATE.with(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            state.color_mode = state.color_mode.next();
            state.color_mode
        } else {
            ColorMode::Green
        }
    });
    if let Some(body) = window().and_then(|w| w.document()).and_then(|d| d.body()) {
        let classes = body.class_list();
        classes.remove_2("theme-amber", "theme-rgb").ok();
        if let Some(class) = mode.theme_class() {
            classes.add_1(class).ok();
        }
    }
    mode.label().to_string()
}

#[wasm_bindgen]
pub fn toggle_glitch() -> bool {
    let on = SCREEN_STATE.with(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            state.glitch = !state.glitch;
            state.glitch
        } else {
            false
        }
    });
    if let Some(doc) = window().and_then(|w| w.document()) {
        if let Some(out) = doc.get_element_by_id("ascii-output") {
            let classes = out.class_list();
            if on {
                classes.add_1("ascii-glitch").ok();
            } else {
                classes.remove_1("ascii-glitch").ok();
            }
        }
    }
    on
}

/// Start the game from Idle/GameOver, or stop a running one. Returns whether
/// the game is active afterwards.
#[wasm_bindgen]
pub fn toggle_game() -> bool {
    SCREEN_STATE.with(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            match state.session.phase() {
                GamePhase::Active => {
                    state.session.stop();
                    state.beams.clear();
                    state.explosions.clear();
                    set_overlay_display("score-display", "display:none");
                    false
                }
                GamePhase::Idle | GamePhase::GameOver => {
                    begin_run(state);
                    true
                }
            }
        } else {
            false
        }
    })
}

#[wasm_bindgen]
pub fn restart_game() {
    SCREEN_STATE.with(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            begin_run(state);
        }
    });
}

fn begin_run(state: &mut ScreenState) {
    state.session.start();
    state.damage.clear();
    state.beams.clear();
    state.explosions.clear();
    set_overlay_display("game-over-overlay", "display:none");
    set_overlay_display("score-display", "display:inline");
    // The frame loop normally starts with the first loaded source; make sure
    // the game runs even if the player starts before a source ever loads.
    if !state.loop_running {
        state.loop_running = true;
        start_screen_loop();
    }
}

// --- Helpers -----------------------------------------------------------------

fn ensure_overlays(doc: &Document) -> Result<(), JsValue> {
    let body = doc.body().ok_or_else(|| JsValue::from_str("no body"))?;
    if doc.get_element_by_id("score-display").is_none() {
        let div = doc.create_element("div")?;
        div.set_id("score-display");
        div.set_text_content(Some("SCORE: 0"));
        div.set_attribute("style", "display:none").ok();
        body.append_child(&div)?;
    }
    if doc.get_element_by_id("game-over-overlay").is_none() {
        let div = doc.create_element("div")?;
        div.set_id("game-over-overlay");
        div.set_inner_html(
            "<div class=\"game-over-title\">GAME OVER</div>\
             <div>FINAL SCORE: <span id=\"final-score\">0</span></div>",
        );
        div.set_attribute("style", "display:none").ok();
        body.append_child(&div)?;
    }
    Ok(())
}

fn set_overlay_display(id: &str, style: &str) {
    if let Some(doc) = window().and_then(|w| w.document()) {
        if let Some(el) = doc.get_element_by_id(id) {
            el.set_attribute("style", style).ok();
        }
    }
}

fn set_source_label(doc: &Document, file: &str) {
    if let Some(el) = doc.get_element_by_id("source-name") {
        el.set_text_content(Some(display_name(file)));
    }
}

fn display_name(file: &str) -> &str {
    file.split('.').next().unwrap_or(file)
}

fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Character columns for a source of the given pixel size. The cell aspect is
/// compensated so the art keeps the source's proportions on screen.
fn grid_cols(width: u32, height: u32) -> usize {
    if height == 0 {
        return 0;
    }
    let ratio = width as f64 / height as f64;
    (ROWS as f64 * ratio / CELL_ASPECT).floor() as usize
}

fn enemies_html(enemies: &[Enemy]) -> String {
    let mut html = String::new();
    for enemy in enemies {
        let style = format!("left:{:.2}%; top:{:.2}%", enemy.x_pct, enemy.y_pct);
        if enemy.matched > 0 && enemy.matched <= enemy.word.len() {
            let (hit, rest) = enemy.word.split_at(enemy.matched);
            html.push_str(&format!(
                "<div class=\"word-enemy\" style=\"{style}\"><span class=\"word-matched\">{hit}</span>{rest}</div>"
            ));
        } else {
            html.push_str(&format!(
                "<div class=\"word-enemy\" style=\"{style}\">{}</div>",
                enemy.word
            ));
        }
    }
    html
}

fn effects_html(
    beams: &[BeamEffect],
    explosions: &[ExplosionEffect],
    width: f64,
    height: f64,
) -> String {
    let mut html = String::new();
    for beam in beams {
        let (length, angle) = fx::beam_geometry(width, height, beam.x_pct, beam.y_pct);
        html.push_str(&format!(
            "<div class=\"laser-beam\" style=\"left:50%; bottom:0; height:{length:.1}px; transform:rotate({angle:.1}deg)\"></div>"
        ));
    }
    for explosion in explosions {
        html.push_str(&format!(
            "<div class=\"explosion\" style=\"left:{:.2}%; top:{:.2}%\">{}</div>",
            explosion.x_pct,
            explosion.y_pct,
            fx::EXPLOSION_TEXT
        ));
    }
    html
}
