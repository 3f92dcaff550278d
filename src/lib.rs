//! Glyphfall core crate.
//!
//! Turns an externally decoded animation into a live ASCII-art rendering and
//! overlays a typing-defense minigame: words fall toward the art, a missed
//! word permanently burns away one row. The decoder, the page layout and the
//! CSS themes live on the JS side; `start()` wires everything up and the
//! remaining exports are the page's control buttons.

use wasm_bindgen::prelude::*;

pub mod screen;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// -----------------------------------------------------------------------------
// Shared datasets
// -----------------------------------------------------------------------------

/// Animation sources the page decoder knows how to load, in cycle order.
pub const SOURCES: &[&str] = &["speed.gif", "cat.gif", "soyo.gif", "anon.gif", "mortis.gif"];

/// Falling-word vocabulary. Uppercase A-Z only so keystroke matching can
/// uppercase its input and compare bytes directly.
pub const WORDS: &[&str] = &[
    "HACK", "CODE", "DATA", "BYTE", "NULL", "VOID", "ROOT", "USER", "PASS", "FAIL",
    "SYSTEM", "ERROR", "FATAL", "WARN", "INFO", "DEBUG", "TRACE", "STACK", "HEAP",
    "BUFFER", "LOGIN", "ACCESS", "DENIED", "GRANT", "PROXY", "SHELL", "BASH", "SUDO",
    "GREP", "CURL", "PING", "PONG", "ECHO", "EXIT", "VIM", "NANO", "GIT", "PUSH",
    "PULL", "MERGE", "HEAD", "TAIL", "AWK", "SED", "FIND", "KILL", "PS", "TOP",
    "FREE", "DF", "DU", "LS", "CD", "PWD", "MKDIR", "RM", "CP", "MV", "TOUCH",
    "CAT", "LESS", "MORE", "MAN", "HELP", "CLEAR", "RESET", "ALIAS", "EXPORT",
    "UNSET", "ENV", "SET", "HISTORY", "JOBS", "FG", "BG", "WAIT", "SLEEP", "NICE",
    "RENICE", "KILLALL", "SHUTDOWN", "REBOOT", "HALT", "POWEROFF", "LOGOUT", "WHO",
    "W", "ID", "GROUPS", "USERS", "LAST", "UPTIME", "DATE", "CAL", "BC", "EXPR",
    "TRUE", "FALSE", "YES", "NO", "TEST", "SEQ", "SHUF", "SORT", "UNIQ", "WC",
    "TR", "CUT", "PASTE", "JOIN", "SPLIT", "CSPLIT", "TEE", "XARGS", "TAR", "GZIP",
    "GUNZIP", "BZIP2", "XZ", "ZIP", "UNZIP", "SSH", "SCP", "SFTP", "FTP", "TELNET",
    "NC", "NMAP", "TCPDUMP", "WIRESHARK", "NETSTAT", "SS", "IP", "IFCONFIG", "ROUTE",
    "DIG", "NSLOOKUP", "HOST", "WHOIS", "WGET", "APT", "YUM", "DNF", "PACMAN", "APK",
    "BREW", "NPM", "YARN", "PIP", "GEM", "CARGO", "GO", "RUST", "JAVA", "PYTHON",
    "RUBY", "PERL", "PHP", "HTML", "CSS", "JS", "SQL", "DB", "API", "JSON", "XML",
];

// -----------------------------------------------------------------------------
// Unified entrypoint
// -----------------------------------------------------------------------------

#[wasm_bindgen]
pub fn start() -> Result<(), JsValue> {
    // Wire up overlays, the keyboard listener and the first source load.
    screen::start_screen_mode()
}
