//! Burst detection over bounded event history.
//!
//! Two detectors share one shape: a bounded window plus a threshold.
//! The emoji detector looks at the *contiguous* run of most recent
//! messages — a user who drops one emoji-only message among normal
//! conversation is never punished, only back-to-back bursts are. The
//! sticker detector is a true sliding time window evaluated against the
//! caller's clock, so entries age out naturally.
//!
//! Both detectors are pure: the engine owns history I/O and level
//! snapshotting.

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

/// Detection thresholds, read-only after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpamPolicy {
    /// How many consecutive emoji-only messages trigger enforcement.
    pub spam_threshold: usize,
    /// How many stickers within the window trigger enforcement.
    pub sticker_threshold: usize,
    /// Trailing time window for the sticker counter.
    pub sticker_window: Duration,
}

impl Default for SpamPolicy {
    fn default() -> Self {
        Self {
            spam_threshold: 2,
            sticker_threshold: 3,
            sticker_window: Duration::from_secs(10),
        }
    }
}

/// Whether `text`, after stripping whitespace, consists entirely of emoji
/// code points (and is non-empty).
pub fn is_emoji_only(text: &str) -> bool {
    let mut seen_any = false;
    for c in text.chars() {
        if c.is_whitespace() {
            continue;
        }
        if !is_emoji_char(c) {
            return false;
        }
        seen_any = true;
    }
    seen_any
}

/// Emoji code point ranges recognized by the classifier: emoticons, misc
/// symbols and pictographs, transport, regional indicators, dingbats and
/// the enclosed-character blocks.
fn is_emoji_char(c: char) -> bool {
    let code = c as u32;
    (0x1F600..=0x1F64F).contains(&code)
        || (0x1F300..=0x1F5FF).contains(&code)
        || (0x1F680..=0x1F6FF).contains(&code)
        || (0x1F1E0..=0x1F1FF).contains(&code)
        || (0x2702..=0x27B0).contains(&code)
        || (0x24C2..=0x1F251).contains(&code)
}

/// Whether the most recent message flags form a spam burst.
///
/// `recent_flags` must be ordered newest first, as the history store
/// returns them. The trigger requires at least `threshold` entries and
/// every one of the newest `threshold` flagged — a lifetime spam count
/// never fires this.
pub fn emoji_burst_triggered(recent_flags: &[bool], threshold: usize) -> bool {
    if threshold == 0 || recent_flags.len() < threshold {
        return false;
    }
    recent_flags[..threshold].iter().all(|&flag| flag)
}

/// Whether the sticker timestamps form a burst: at least `threshold`
/// entries inside the trailing `window` ending at `now`.
pub fn sticker_burst_triggered(
    timestamps: &[SystemTime],
    window: Duration,
    threshold: usize,
    now: SystemTime,
) -> bool {
    if threshold == 0 {
        return false;
    }
    let in_window = timestamps
        .iter()
        .filter(|&&at| match now.duration_since(at) {
            Ok(age) => age <= window,
            // Clock skew puts the entry in the future; still counts.
            Err(_) => true,
        })
        .count();
    in_window >= threshold
}
