//! Fixed-point money type.
//!
//! # Motivation
//!
//! All money amounts in this workspace (pump prices, shift revenue) use a
//! 1e-6 (micros) fixed-point representation stored as `i64`.  Using raw
//! `i64` for money is error-prone: it allows accidental arithmetic with
//! unrelated integers (litre counts, meter readings, version numbers)
//! without any compile-time signal.
//!
//! `Micros` wraps the raw `i64` so the type system prevents:
//! - Implicit construction from raw `i64` (no `From<i64>` impl).
//! - Mixing `Micros` with unrelated numeric values in arithmetic.
//!
//! # Scale
//!
//! $1 = 1_000_000 Micros.  All monetary values (prices per litre, revenue,
//! revenue totals) use this scale.  Physical quantities (litres, dip levels,
//! totaliser readings) remain `f64` and are never implicitly convertible.
//!
//! # Arithmetic
//!
//! - `Add`, `Sub`, `Neg`, `AddAssign` are implemented for `Micros op Micros`;
//!   these panic on overflow in debug builds and wrap in release (matching
//!   Rust's standard integer semantics).
//! - `saturating_add` clamps at `i64::MAX` for long-running totals.
//! - [`Micros::mul_litres`] multiplies a per-litre price by a measured
//!   volume, rounding to the nearest micro.  The cast back from `f64`
//!   saturates at the `i64` range, so a corrupt volume cannot wrap revenue
//!   into a nonsense sign.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Neg, Sub};

// ---------------------------------------------------------------------------
// Micros newtype
// ---------------------------------------------------------------------------

/// A fixed-point monetary amount at 1e-6 scale (micros).
///
/// $1 = `Micros(1_000_000)`.
///
/// # Construction
///
/// Use [`Micros::new`] for explicit construction from a raw micros count and
/// [`Micros::from_dollars`] when the source is a decimal dollar amount (for
/// example a pump price read from station config).  There is intentionally
/// no `From<i64>` implementation.
///
/// # Serialization
///
/// Serializes transparently as the raw micros integer, so JSON ledgers and
/// shift sheets carry exact values with no float round-trip.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Micros(i64);

impl Micros {
    /// Zero monetary amount.
    pub const ZERO: Micros = Micros(0);

    /// Maximum representable value.
    pub const MAX: Micros = Micros(i64::MAX);

    /// Minimum representable value.
    pub const MIN: Micros = Micros(i64::MIN);

    /// Construct a `Micros` from a raw `i64`.
    ///
    /// Use only when the raw integer is known to represent a fixed-point
    /// monetary amount at 1e-6 scale.
    #[inline]
    pub const fn new(raw: i64) -> Self {
        Micros(raw)
    }

    /// Extract the underlying raw `i64`.
    #[inline]
    pub const fn raw(self) -> i64 {
        self.0
    }

    /// Convert a decimal dollar amount to micros, rounding to the nearest
    /// micro.  Non-finite input saturates through the cast (NaN becomes 0),
    /// so config validation must reject non-finite prices before this point.
    #[inline]
    pub fn from_dollars(dollars: f64) -> Micros {
        Micros((dollars * 1_000_000.0).round() as i64)
    }

    /// Approximate dollar value for display and report formatting.
    ///
    /// Lossy for amounts beyond 2^53 micros; report layers accept that.
    #[inline]
    pub fn to_dollars(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Saturating addition for long-running totals.
    #[inline]
    pub fn saturating_add(self, rhs: Micros) -> Micros {
        Micros(self.0.saturating_add(rhs.0))
    }

    /// Multiply a per-litre price by a measured volume in litres.
    ///
    /// The product is computed in `f64`, rounded to the nearest micro, and
    /// cast back with saturating semantics at the `i64` range.  `litres` is
    /// a physical quantity, not a Micros value.
    #[inline]
    pub fn mul_litres(self, litres: f64) -> Micros {
        Micros((self.0 as f64 * litres).round() as i64)
    }
}

// ---------------------------------------------------------------------------
// Arithmetic operators (closed over Micros)
// ---------------------------------------------------------------------------

impl Add for Micros {
    type Output = Micros;
    #[inline]
    fn add(self, rhs: Micros) -> Micros {
        Micros(self.0 + rhs.0)
    }
}

impl Sub for Micros {
    type Output = Micros;
    #[inline]
    fn sub(self, rhs: Micros) -> Micros {
        Micros(self.0 - rhs.0)
    }
}

impl Neg for Micros {
    type Output = Micros;
    #[inline]
    fn neg(self) -> Micros {
        Micros(-self.0)
    }
}

impl AddAssign for Micros {
    #[inline]
    fn add_assign(&mut self, rhs: Micros) {
        self.0 += rhs.0;
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl std::fmt::Display for Micros {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dollars = self.0 / 1_000_000;
        let frac = (self.0 % 1_000_000).abs();
        // When |value| < $1 and value is negative, dollars truncates to 0,
        // losing the sign.  Emit "-0" explicitly in that case.
        if self.0 < 0 && dollars == 0 {
            write!(f, "-{dollars}.{frac:06}")
        } else {
            write!(f, "{dollars}.{frac:06}")
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
