//! # Overview
//!
//! `logging` provides the verbosity flag system shared by the rfuzzy
//! workspace. Output is grouped into *info* flags (user-facing progress and
//! results) and *debug* flags (engine internals), each carrying a small
//! integer level. The command-line layer maps `-v` and `-s` onto a
//! [`VerbosityConfig`]; library crates emit messages through the
//! [`info_log!`] and [`debug_log!`] macros without knowing how verbosity was
//! configured.
//!
//! # Design
//!
//! A process-wide configuration is installed once with [`init`]. Messages
//! whose level exceeds the configured level for their flag are discarded at
//! the call site. Emitted messages go to standard error and are also pushed
//! into a bounded in-memory buffer that tests drain with [`drain_events`],
//! so filtering behaviour can be asserted without capturing file
//! descriptors.
//!
//! # Invariants
//!
//! - [`init`] may be called repeatedly; the latest configuration wins.
//! - The `silent` switch suppresses *error* chatter only; it never filters
//!   result output, which the CLI prints directly.
//! - Macros never panic; a poisoned buffer lock falls back to dropping the
//!   event.

use std::fmt;
use std::sync::{Mutex, OnceLock, RwLock};

/// Categories of user-facing informational output.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum InfoFlag {
    /// Per-file hashing progress.
    Hash,
    /// Match results and score summaries.
    Match,
    /// Directory traversal notices.
    Walk,
    /// Summary statistics.
    Stats,
    /// Everything else.
    Misc,
}

/// Categories of developer-facing debug output.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum DebugFlag {
    /// Digest engine internals (fork/reduce decisions, block-size choice).
    Engine,
    /// Signature and signature-file parsing.
    Parse,
    /// Cluster construction.
    Cluster,
}

/// Per-flag levels for informational output.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InfoLevels {
    /// Level for [`InfoFlag::Hash`].
    pub hash: u8,
    /// Level for [`InfoFlag::Match`].
    pub compare: u8,
    /// Level for [`InfoFlag::Walk`].
    pub walk: u8,
    /// Level for [`InfoFlag::Stats`].
    pub stats: u8,
    /// Level for [`InfoFlag::Misc`].
    pub misc: u8,
}

/// Per-flag levels for debug output.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DebugLevels {
    /// Level for [`DebugFlag::Engine`].
    pub engine: u8,
    /// Level for [`DebugFlag::Parse`].
    pub parse: u8,
    /// Level for [`DebugFlag::Cluster`].
    pub cluster: u8,
}

/// Complete verbosity configuration for one process.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VerbosityConfig {
    /// Suppress error diagnostics (`-s`).
    pub silent: bool,
    /// Info flag levels.
    pub info: InfoLevels,
    /// Debug flag levels.
    pub debug: DebugLevels,
}

impl VerbosityConfig {
    /// Maps a `-v` count onto flag levels.
    ///
    /// Level 0 keeps everything quiet, level 1 enables progress and match
    /// summaries, level 2 adds traversal notices and statistics, level 3
    /// additionally turns on engine and parser debug output.
    #[must_use]
    pub fn from_verbose_level(level: u8) -> Self {
        let mut config = Self::default();
        if level >= 1 {
            config.info.hash = 1;
            config.info.compare = 1;
            config.info.misc = 1;
        }
        if level >= 2 {
            config.info.walk = 1;
            config.info.stats = 1;
            config.info.hash = 2;
        }
        if level >= 3 {
            config.debug.engine = 1;
            config.debug.parse = 1;
            config.debug.cluster = 1;
        }
        config
    }

    /// Returns the configured level for an info flag.
    #[must_use]
    pub const fn info_level(&self, flag: InfoFlag) -> u8 {
        match flag {
            InfoFlag::Hash => self.info.hash,
            InfoFlag::Match => self.info.compare,
            InfoFlag::Walk => self.info.walk,
            InfoFlag::Stats => self.info.stats,
            InfoFlag::Misc => self.info.misc,
        }
    }

    /// Returns the configured level for a debug flag.
    #[must_use]
    pub const fn debug_level(&self, flag: DebugFlag) -> u8 {
        match flag {
            DebugFlag::Engine => self.debug.engine,
            DebugFlag::Parse => self.debug.parse,
            DebugFlag::Cluster => self.debug.cluster,
        }
    }
}

/// One captured log message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogEvent {
    /// Which subsystem produced the event.
    pub kind: EventKind,
    /// The level the message was emitted at.
    pub level: u8,
    /// Rendered message text.
    pub message: String,
}

/// Discriminates captured events by origin.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EventKind {
    /// From [`info_log!`].
    Info(InfoFlag),
    /// From [`debug_log!`].
    Debug(DebugFlag),
    /// From [`error_log!`].
    Error,
}

fn config_cell() -> &'static RwLock<VerbosityConfig> {
    static CONFIG: OnceLock<RwLock<VerbosityConfig>> = OnceLock::new();
    CONFIG.get_or_init(|| RwLock::new(VerbosityConfig::default()))
}

fn event_buffer() -> &'static Mutex<Vec<LogEvent>> {
    static EVENTS: OnceLock<Mutex<Vec<LogEvent>>> = OnceLock::new();
    EVENTS.get_or_init(|| Mutex::new(Vec::new()))
}

/// Installs the process-wide verbosity configuration.
pub fn init(config: VerbosityConfig) {
    if let Ok(mut slot) = config_cell().write() {
        *slot = config;
    }
}

/// Returns a copy of the current configuration.
#[must_use]
pub fn config() -> VerbosityConfig {
    config_cell().read().map(|c| *c).unwrap_or_default()
}

/// Reports whether error diagnostics are suppressed.
#[must_use]
pub fn is_silent() -> bool {
    config().silent
}

/// Removes and returns every captured event.
///
/// Tests call this to assert on filtering behaviour; production code never
/// reads the buffer back.
#[must_use]
pub fn drain_events() -> Vec<LogEvent> {
    event_buffer()
        .lock()
        .map(|mut events| std::mem::take(&mut *events))
        .unwrap_or_default()
}

// Event capture is capped so a long run cannot grow without bound when
// nothing drains the buffer.
const EVENT_BUFFER_CAP: usize = 4096;

#[doc(hidden)]
pub fn emit(kind: EventKind, level: u8, args: fmt::Arguments<'_>) {
    let message = args.to_string();
    #[cfg(feature = "tracing")]
    match kind {
        EventKind::Error => tracing::warn!(target: "rfuzzy", "{message}"),
        _ => tracing::debug!(target: "rfuzzy", "{message}"),
    }
    eprintln!("{message}");
    if let Ok(mut events) = event_buffer().lock() {
        if events.len() < EVENT_BUFFER_CAP {
            events.push(LogEvent {
                kind,
                level,
                message,
            });
        }
    }
}

#[doc(hidden)]
#[must_use]
pub fn info_enabled(flag: InfoFlag, level: u8) -> bool {
    config().info_level(flag) >= level
}

#[doc(hidden)]
#[must_use]
pub fn debug_enabled(flag: DebugFlag, level: u8) -> bool {
    config().debug_level(flag) >= level
}

/// Emits an informational message when the flag's configured level permits.
///
/// ```
/// logging::init(logging::VerbosityConfig::from_verbose_level(1));
/// logging::info_log!(Hash, 1, "hashing {}", "file.bin");
/// ```
#[macro_export]
macro_rules! info_log {
    ($flag:ident, $level:expr, $($arg:tt)*) => {
        if $crate::info_enabled($crate::InfoFlag::$flag, $level) {
            $crate::emit(
                $crate::EventKind::Info($crate::InfoFlag::$flag),
                $level,
                format_args!($($arg)*),
            );
        }
    };
}

/// Emits a debug message when the flag's configured level permits.
#[macro_export]
macro_rules! debug_log {
    ($flag:ident, $level:expr, $($arg:tt)*) => {
        if $crate::debug_enabled($crate::DebugFlag::$flag, $level) {
            $crate::emit(
                $crate::EventKind::Debug($crate::DebugFlag::$flag),
                $level,
                format_args!($($arg)*),
            );
        }
    };
}

/// Emits an error diagnostic unless silent mode is active.
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {
        if !$crate::is_silent() {
            $crate::emit($crate::EventKind::Error, 0, format_args!($($arg)*));
        }
    };
}
