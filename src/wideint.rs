// Copyright 2025 Lars Brubaker
// License: MIT
//
// Exact integer kernel for the sweep predicates.
//
// Edge deltas fit in 32 bits; determinants of two deltas need 64 bits and
// the products used to order edges at an arbitrary y need up to 96, so the
// wide cases are carried in i128.

use std::cmp::Ordering;

/// Quotient and remainder of a floored division.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Quorem {
    pub quo: i32,
    pub rem: i32,
}

/// Quotient and remainder of a truncating 128/64 division.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Quorem64 {
    pub quo: i64,
    pub rem: i64,
}

/// Floored division: `quo * b + rem == a` with `rem` zero or carrying the
/// sign of `b`. `b` must be nonzero, and `i32::MIN / -1` is out of range;
/// edge coordinates are clamped well inside both limits.
#[inline]
pub fn floored_divrem(a: i32, b: i32) -> Quorem {
    debug_assert!(b != 0, "floored_divrem by zero");
    debug_assert!(!(a == i32::MIN && b == -1), "floored_divrem overflows");
    let mut qr = Quorem {
        quo: a / b,
        rem: a % b,
    };
    if (a ^ b) < 0 && qr.rem != 0 {
        qr.quo -= 1;
        qr.rem += b;
    }
    qr
}

/// Floored division of the 64-bit product `x * a` by `b`. The quotient must
/// fit in 32 bits.
#[inline]
pub fn floored_muldivrem(x: i32, a: i32, b: i32) -> Quorem {
    debug_assert!(b != 0, "floored_muldivrem by zero");
    let xa = x as i64 * a as i64;
    let b64 = b as i64;
    let mut quo = xa / b64;
    let mut rem = xa % b64;
    if (xa >= 0) != (b >= 0) && rem != 0 {
        quo -= 1;
        rem += b64;
    }
    Quorem {
        quo: quo as i32,
        rem: rem as i32,
    }
}

#[inline]
pub fn int32x32_64_mul(a: i32, b: i32) -> i64 {
    a as i64 * b as i64
}

#[inline]
pub fn int64x32_128_mul(a: i64, b: i32) -> i128 {
    a as i128 * b as i128
}

/// `a*d - b*c` for 32-bit inputs.
#[inline]
pub fn det32_64(a: i32, b: i32, c: i32, d: i32) -> i64 {
    int32x32_64_mul(a, d) - int32x32_64_mul(b, c)
}

/// `a*d - b*c` for 64-bit `a`, `c` and 32-bit `b`, `d`.
#[inline]
pub fn det64x32_128(a: i64, b: i32, c: i64, d: i32) -> i128 {
    int64x32_128_mul(a, d) - int64x32_128_mul(c, b)
}

/// Truncating division of a 96-bit numerator by a 64-bit denominator.
///
/// Returns `None` when `den` is zero or the quotient does not fit in 32 bits;
/// callers treat that as "no representable result".
pub fn int_96by64_32x64_divrem(num: i128, den: i64) -> Option<Quorem64> {
    if den == 0 {
        return None;
    }
    let den = den as i128;
    let quo = num / den;
    if quo > i32::MAX as i128 || quo < i32::MIN as i128 {
        return None;
    }
    Some(Quorem64 {
        quo: quo as i64,
        rem: (num % den) as i64,
    })
}

/// Collapse an ordering to -1, 0 or 1.
#[inline]
pub fn ordering_sign(o: Ordering) -> i32 {
    match o {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}
