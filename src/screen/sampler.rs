//! Frame-to-text sampling.
//!
//! Everything here operates on a raw RGBA buffer so the mapping logic runs
//! under native `cargo test`; the glue layer is responsible for scaling the
//! decoded frame down to cell resolution and reading the pixels back.

use super::damage::DamageGrid;
use super::rng::Lcg;

/// Probability that a glitched row samples with a horizontal offset.
const GLITCH_ROW_CHANCE: f64 = 0.05;
/// Probability that a glitched cell emits a random glyph.
const GLITCH_CELL_CHANCE: f64 = 0.01;

const ASCII_GLYPHS: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];
const BINARY_GLYPHS: &[char] = &['0', '1'];
const BLOCK_GLYPHS: &[char] = &[' ', '░', '▒', '▓', '█'];
const MATRIX_GLYPHS: &[char] = &[
    'ﾊ', 'ﾐ', 'ﾋ', 'ｰ', 'ｳ', 'ｼ', 'ﾅ', 'ﾓ', 'ﾆ', 'ｻ', 'ﾜ', 'ﾂ', 'ｵ', 'ﾘ', 'ｱ', 'ﾎ',
    'ﾃ', 'ﾏ', 'ｹ', 'ﾒ', 'ｴ', 'ｶ', 'ｷ', 'ﾑ', 'ﾕ', 'ﾗ', 'ｾ', 'ﾈ', 'ｽ', 'ﾀ', 'ﾇ', 'ﾍ',
];

/// Ordered glyph ramp indexed by quantized brightness.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Charset {
    Ascii,
    Binary,
    Blocks,
    Matrix,
}

impl Charset {
    pub fn glyphs(self) -> &'static [char] {
        match self {
            Charset::Ascii => ASCII_GLYPHS,
            Charset::Binary => BINARY_GLYPHS,
            Charset::Blocks => BLOCK_GLYPHS,
            Charset::Matrix => MATRIX_GLYPHS,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Charset::Ascii => "ASCII",
            Charset::Binary => "BINARY",
            Charset::Blocks => "BLOCKS",
            Charset::Matrix => "MATRIX",
        }
    }

    pub fn next(self) -> Charset {
        match self {
            Charset::Ascii => Charset::Binary,
            Charset::Binary => Charset::Blocks,
            Charset::Blocks => Charset::Matrix,
            Charset::Matrix => Charset::Ascii,
        }
    }

    pub const ALL: &'static [Charset] = &[
        Charset::Ascii,
        Charset::Binary,
        Charset::Blocks,
        Charset::Matrix,
    ];
}

/// Presentation color mode. Green and amber are body theme classes owned by
/// the page CSS; only RGB changes what the sampler emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Green,
    Amber,
    Rgb,
}

impl ColorMode {
    pub fn label(self) -> &'static str {
        match self {
            ColorMode::Green => "GREEN",
            ColorMode::Amber => "AMBER",
            ColorMode::Rgb => "RGB",
        }
    }

    pub fn next(self) -> ColorMode {
        match self {
            ColorMode::Green => ColorMode::Amber,
            ColorMode::Amber => ColorMode::Rgb,
            ColorMode::Rgb => ColorMode::Green,
        }
    }

    pub fn theme_class(self) -> Option<&'static str> {
        match self {
            ColorMode::Green => None,
            ColorMode::Amber => Some("theme-amber"),
            ColorMode::Rgb => Some("theme-rgb"),
        }
    }

    pub fn per_cell_color(self) -> bool {
        matches!(self, ColorMode::Rgb)
    }
}

/// Per-tick sampler inputs that the control layer owns.
pub struct FrameOptions {
    pub charset: Charset,
    pub per_cell_color: bool,
    pub glitch: bool,
    pub destroyed_rows: usize,
}

/// Map a brightness sample onto a glyph index. Monotone non-decreasing over
/// [0, 255] and always within `0..len` for a non-empty ramp.
pub fn glyph_index(brightness: u8, len: usize) -> usize {
    (brightness as usize * len / 256).min(len.saturating_sub(1))
}

/// Render one frame's RGBA buffer (`cols * rows * 4` bytes, row-major) into
/// an HTML text block of exactly `rows` lines. Rows at or past the
/// destruction boundary emit as blank lines so the grid keeps its height; a
/// short buffer renders fully blank rather than sampling out of range.
pub fn render_frame(
    pixels: &[u8],
    cols: usize,
    rows: usize,
    opts: &FrameOptions,
    damage: &mut DamageGrid,
    rng: &mut Lcg,
) -> String {
    let glyphs = opts.charset.glyphs();
    let mut out = String::with_capacity(cols * rows * 2 + rows);
    if cols == 0 || glyphs.is_empty() || pixels.len() < cols * rows * 4 {
        out.push_str(&"\n".repeat(rows));
        return out;
    }

    let visible_rows = rows.saturating_sub(opts.destroyed_rows);
    for y in 0..rows {
        if y >= visible_rows {
            out.push('\n');
            continue;
        }

        let mut x_offset: isize = 0;
        if opts.glitch && rng.chance(GLITCH_ROW_CHANCE) {
            x_offset = rng.index(10) as isize - 5;
        }

        for x in 0..cols {
            let sx = (x as isize + x_offset).clamp(0, cols as isize - 1) as usize;
            let offset = (y * cols + sx) * 4;
            let r = pixels[offset];
            let g = pixels[offset + 1];
            let b = pixels[offset + 2];
            let avg = ((r as u16 + g as u16 + b as u16) / 3) as u8;

            let damaged = damage.consume(y, x);
            let mut c = if damaged {
                // Noise: half blank, half a random glyph from the active set.
                if rng.chance(0.5) {
                    ' '
                } else {
                    glyphs[rng.index(glyphs.len())]
                }
            } else {
                glyphs[glyph_index(avg, glyphs.len())]
            };

            if opts.glitch && rng.chance(GLITCH_CELL_CHANCE) {
                c = glyphs[rng.index(glyphs.len())];
            }

            if opts.per_cell_color && !damaged {
                out.push_str(&format!("<span style=\"color: rgb({r},{g},{b})\">"));
                push_glyph(&mut out, c);
                out.push_str("</span>");
            } else {
                push_glyph(&mut out, c);
            }
        }
        out.push('\n');
    }
    out
}

// The output surface is HTML; a bare space would collapse and shift the grid.
fn push_glyph(out: &mut String, c: char) {
    if c == ' ' {
        out.push_str("&nbsp;");
    } else {
        out.push(c);
    }
}
