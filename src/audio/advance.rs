//! Cursor advancement rules for the endless playlist.
//!
//! The playlist wraps around instead of running out: background ambience
//! keeps sounding until someone at the table stops it.

use rand::RngExt;

/// Where the cursor goes when a track finishes on its own.
/// Repeat pins the cursor (and beats random); an empty playlist yields `None`.
pub(crate) fn auto(cursor: usize, len: usize, repeat: bool, random: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if repeat {
        // Clamp in case the playlist shrank under a stale cursor.
        return Some(cursor.min(len - 1));
    }
    Some(step(cursor, len, random))
}

/// Where the cursor goes on an explicit skip. Repeat does not pin manual
/// skips; random still applies.
pub(crate) fn manual(cursor: usize, len: usize, random: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(step(cursor, len, random))
}

fn step(cursor: usize, len: usize, random: bool) -> usize {
    if random {
        rand::rng().random_range(0..len)
    } else {
        (cursor + 1) % len
    }
}
