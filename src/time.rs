//! Wrap-safe microsecond timestamps.
//!
//! Every timestamp handled by the core is a free-running counter value.
//! Comparisons never use `<`/`>` on raw timestamps: elapsed time is
//! computed with wrapping subtraction so the logic stays correct when
//! the counter rolls over.

/// Monotonic microsecond counter value.
pub type Micros = u64;

/// Microseconds elapsed from `since` to `now`, correct across wraparound.
#[inline]
pub const fn elapsed(since: Micros, now: Micros) -> Micros {
    now.wrapping_sub(since)
}

/// `true` once `now` has reached or passed `due`.
///
/// The difference is reinterpreted as signed, so a deadline up to half the
/// counter range in the future is still "not due" after a wrap.
#[inline]
pub const fn is_due(due: Micros, now: Micros) -> bool {
    (now.wrapping_sub(due) as i64) >= 0
}

/// Deadline `delay` microseconds after `now` (wraps with the counter).
#[inline]
pub const fn after(now: Micros, delay: Micros) -> Micros {
    now.wrapping_add(delay)
}

/// Milliseconds to microseconds.
#[inline]
pub const fn ms(value: u64) -> Micros {
    value * 1_000
}
