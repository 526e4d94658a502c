//! Machine integers, intervals and congruences as persisted by the analyzer.
//!
//! These are consumed as already-computed bounds; no abstract arithmetic is
//! implemented here beyond normalisation and sign casts.

use std::cmp::Ordering;
use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Signedness {
    Signed,
    Unsigned,
}

impl Signedness {
    pub fn as_str(self) -> &'static str {
        match self {
            Signedness::Signed => "signed",
            Signedness::Unsigned => "unsigned",
        }
    }
}

/// Integer type tag, e.g. `s32` or `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntType {
    pub bit_width: u32,
    pub signedness: Signedness,
}

impl IntType {
    pub const MAX_BIT_WIDTH: u32 = 128;

    pub fn parse(tag: &str) -> Result<Self, String> {
        let (signedness, digits) = if let Some(rest) = tag.strip_prefix('s') {
            (Signedness::Signed, rest)
        } else if let Some(rest) = tag.strip_prefix('u') {
            (Signedness::Unsigned, rest)
        } else {
            return Err(format!("invalid integer type '{tag}'"));
        };
        let bit_width: u32 = digits
            .parse()
            .map_err(|_| format!("invalid integer type '{tag}'"))?;
        if bit_width == 0 || bit_width > Self::MAX_BIT_WIDTH {
            return Err(format!("unsupported bit width in '{tag}'"));
        }
        Ok(Self {
            bit_width,
            signedness,
        })
    }

    /// All ones in the low `bit_width` bits.
    fn mask(self) -> u128 {
        u128::MAX >> (128 - self.bit_width)
    }

    fn min_bits(self) -> u128 {
        match self.signedness {
            Signedness::Signed => 1u128 << (self.bit_width - 1),
            Signedness::Unsigned => 0,
        }
    }

    fn max_bits(self) -> u128 {
        match self.signedness {
            Signedness::Signed => (1u128 << (self.bit_width - 1)) - 1,
            Signedness::Unsigned => self.mask(),
        }
    }

    pub fn with_signedness(self, signedness: Signedness) -> Self {
        Self {
            bit_width: self.bit_width,
            signedness,
        }
    }
}

impl fmt::Display for IntType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.signedness {
            Signedness::Signed => 's',
            Signedness::Unsigned => 'u',
        };
        write!(f, "{prefix}{}", self.bit_width)
    }
}

/// A fixed-width integer of up to 128 bits.
///
/// The value is kept as its two's complement bit pattern, masked to the
/// type's width, so `u128` and `s128` values are both representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MachineInt {
    bits: u128,
    ty: IntType,
}

impl MachineInt {
    /// Wraps `n` into the type's range (two's complement).
    pub fn new(n: i128, ty: IntType) -> Self {
        Self::from_bits(n as u128, ty)
    }

    fn from_bits(bits: u128, ty: IntType) -> Self {
        Self {
            bits: bits & ty.mask(),
            ty,
        }
    }

    fn from_bound(bound: Bound, ty: IntType) -> Self {
        match bound {
            Bound::Int(n) => Self::new(n, ty),
            Bound::UInt(n) => Self::from_bits(n, ty),
            Bound::Approx(f) => {
                let (min, max) = (Self::min(ty), Self::max(ty));
                if f <= min.to_f64() {
                    min
                } else if f >= max.to_f64() {
                    max
                } else if f < 0.0 {
                    Self::new(f as i128, ty)
                } else {
                    Self::from_bits(f as u128, ty)
                }
            }
        }
    }

    pub fn min(ty: IntType) -> Self {
        Self {
            bits: ty.min_bits(),
            ty,
        }
    }

    pub fn max(ty: IntType) -> Self {
        Self {
            bits: ty.max_bits(),
            ty,
        }
    }

    /// The value as `i128`, saturating for unsigned values above `i128::MAX`.
    pub fn value(self) -> i128 {
        match self.ty.signedness {
            Signedness::Signed => self.sign_extended(),
            Signedness::Unsigned => i128::try_from(self.bits).unwrap_or(i128::MAX),
        }
    }

    pub fn ty(self) -> IntType {
        self.ty
    }

    pub fn is_min(self) -> bool {
        self.bits == self.ty.min_bits()
    }

    pub fn is_max(self) -> bool {
        self.bits == self.ty.max_bits()
    }

    pub fn sign_cast(self, signedness: Signedness) -> Self {
        Self::from_bits(self.bits, self.ty.with_signedness(signedness))
    }

    fn sign_extended(self) -> i128 {
        let shift = 128 - self.ty.bit_width;
        ((self.bits << shift) as i128) >> shift
    }

    /// Order-preserving key within one type.
    fn ordinal(self) -> u128 {
        match self.ty.signedness {
            Signedness::Signed => (self.sign_extended() as u128) ^ (1u128 << 127),
            Signedness::Unsigned => self.bits,
        }
    }

    fn to_f64(self) -> f64 {
        match self.ty.signedness {
            Signedness::Signed => self.sign_extended() as f64,
            Signedness::Unsigned => self.bits as f64,
        }
    }

    fn to_bound(self) -> Bound {
        match self.ty.signedness {
            Signedness::Signed => Bound::Int(self.sign_extended()),
            Signedness::Unsigned => Bound::UInt(self.bits),
        }
    }

    /// True when the most significant bit is set.
    fn high_bit(self) -> bool {
        (self.bits >> (self.ty.bit_width - 1)) & 1 == 1
    }
}

impl PartialOrd for MachineInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MachineInt {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ty
            .cmp(&other.ty)
            .then_with(|| self.ordinal().cmp(&other.ordinal()))
    }
}

impl fmt::Display for MachineInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ty.signedness {
            Signedness::Signed => write!(f, "{}", self.sign_extended()),
            Signedness::Unsigned => write!(f, "{}", self.bits),
        }
    }
}

/// An interval bound as written in the store.
///
/// Bounds that do not fit a 64-bit JSON number may be written as decimal
/// strings. A JSON number parsed as a float is clamped to the type's range.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Bound {
    Int(i128),
    UInt(u128),
    Approx(f64),
}

impl Serialize for Bound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Bound::Int(n) => match i64::try_from(n) {
                Ok(n) => serializer.serialize_i64(n),
                Err(_) => serializer.collect_str(&n),
            },
            Bound::UInt(n) => match u64::try_from(n) {
                Ok(n) => serializer.serialize_u64(n),
                Err(_) => serializer.collect_str(&n),
            },
            Bound::Approx(f) => serializer.serialize_f64(f),
        }
    }
}

impl<'de> Deserialize<'de> for Bound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BoundVisitor;

        impl<'de> Visitor<'de> for BoundVisitor {
            type Value = Bound;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an integer or a decimal string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Bound, E> {
                Ok(Bound::Int(v.into()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Bound, E> {
                Ok(Bound::UInt(v.into()))
            }

            fn visit_i128<E: de::Error>(self, v: i128) -> Result<Bound, E> {
                Ok(Bound::Int(v))
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<Bound, E> {
                Ok(Bound::UInt(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Bound, E> {
                if v.is_finite() && v.fract() == 0.0 {
                    Ok(Bound::Approx(v))
                } else {
                    Err(E::invalid_value(de::Unexpected::Float(v), &self))
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Bound, E> {
                let parsed = if v.starts_with('-') {
                    v.parse::<i128>().map(Bound::Int).ok()
                } else {
                    v.parse::<u128>().map(Bound::UInt).ok()
                };
                parsed.ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
            }
        }

        deserializer.deserialize_any(BoundVisitor)
    }
}

#[derive(Serialize, Deserialize)]
struct IntervalRepr {
    #[serde(rename = "type")]
    ty: String,
    lb: Bound,
    ub: Bound,
}

/// Closed interval `[lb, ub]` of machine integers of one type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "IntervalRepr", into = "IntervalRepr")]
pub struct Interval {
    lb: MachineInt,
    ub: MachineInt,
}

impl TryFrom<IntervalRepr> for Interval {
    type Error = String;

    fn try_from(repr: IntervalRepr) -> Result<Self, Self::Error> {
        let ty = IntType::parse(&repr.ty)?;
        Ok(Self::new(
            MachineInt::from_bound(repr.lb, ty),
            MachineInt::from_bound(repr.ub, ty),
        ))
    }
}

impl From<Interval> for IntervalRepr {
    fn from(itv: Interval) -> Self {
        Self {
            ty: itv.ty().to_string(),
            lb: itv.lb.to_bound(),
            ub: itv.ub.to_bound(),
        }
    }
}

impl Interval {
    pub fn new(lb: MachineInt, ub: MachineInt) -> Self {
        Self { lb, ub }
    }

    pub fn top(ty: IntType) -> Self {
        Self::new(MachineInt::min(ty), MachineInt::max(ty))
    }

    pub fn lb(&self) -> MachineInt {
        self.lb
    }

    pub fn ub(&self) -> MachineInt {
        self.ub
    }

    pub fn ty(&self) -> IntType {
        self.lb.ty()
    }

    pub fn bit_width(&self) -> u32 {
        self.ty().bit_width
    }

    pub fn is_top(&self) -> bool {
        self.lb.is_min() && self.ub.is_max()
    }

    pub fn is_bottom(&self) -> bool {
        self.lb > self.ub
    }

    pub fn singleton(&self) -> Option<MachineInt> {
        (self.lb == self.ub).then_some(self.lb)
    }

    /// Reinterprets the bounds under another signedness. The result is top
    /// when the interval straddles the sign boundary.
    pub fn sign_cast(&self, signedness: Signedness) -> Self {
        if self.ty().signedness == signedness {
            return *self;
        }
        if self.lb.high_bit() == self.ub.high_bit() {
            let lb = self.lb.sign_cast(signedness);
            let ub = self.ub.sign_cast(signedness);
            if lb <= ub {
                Self::new(lb, ub)
            } else {
                Self::new(ub, lb)
            }
        } else {
            Self::top(self.ty().with_signedness(signedness))
        }
    }

    /// Renders the interval as constraints on `var`.
    pub fn to_constraints(&self, var: &str) -> String {
        if self.is_top() {
            format!("could not bound {var}")
        } else if let Some(n) = self.singleton() {
            format!("{var} = {n}")
        } else if self.lb.is_min() {
            format!("{var} <= {}", self.ub)
        } else if self.ub.is_max() {
            format!("{var} >= {}", self.lb)
        } else {
            format!("{} <= {var} <= {}", self.lb, self.ub)
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_bottom() {
            write!(f, "⊥")
        } else {
            write!(f, "[{}, {}]", self.lb, self.ub)
        }
    }
}

#[derive(Serialize, Deserialize)]
struct CongruenceRepr {
    #[serde(rename = "type")]
    ty: String,
    a: i128,
    b: i128,
}

/// Congruence class `aZ + b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "CongruenceRepr", into = "CongruenceRepr")]
pub struct Congruence {
    ty: IntType,
    a: i128,
    b: i128,
}

impl TryFrom<CongruenceRepr> for Congruence {
    type Error = String;

    fn try_from(repr: CongruenceRepr) -> Result<Self, Self::Error> {
        let ty = IntType::parse(&repr.ty)?;
        if repr.a < 0 {
            return Err(format!("negative congruence modulus {}", repr.a));
        }
        Ok(Self::new(ty, repr.a, repr.b))
    }
}

impl From<Congruence> for CongruenceRepr {
    fn from(c: Congruence) -> Self {
        Self {
            ty: c.ty.to_string(),
            a: c.a,
            b: c.b,
        }
    }
}

impl Congruence {
    pub fn new(ty: IntType, a: i128, b: i128) -> Self {
        let b = if a != 0 { b.rem_euclid(a) } else { b };
        Self { ty, a, b }
    }

    pub fn a(&self) -> i128 {
        self.a
    }

    pub fn b(&self) -> i128 {
        self.b
    }

    pub fn is_top(&self) -> bool {
        self.a == 1
    }
}

impl fmt::Display for Congruence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.a, self.b) {
            (0, b) => write!(f, "{b}"),
            (a, 0) => write!(f, "{a}Z"),
            (a, b) => write!(f, "{a}Z+{b}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s32() -> IntType {
        IntType::parse("s32").unwrap()
    }

    fn u8t() -> IntType {
        IntType::parse("u8").unwrap()
    }

    fn itv(ty: IntType, lb: i128, ub: i128) -> Interval {
        Interval::new(MachineInt::new(lb, ty), MachineInt::new(ub, ty))
    }

    #[test]
    fn int_type_parse_rejects_garbage() {
        assert!(IntType::parse("x32").is_err());
        assert!(IntType::parse("s").is_err());
        assert!(IntType::parse("s0").is_err());
        assert!(IntType::parse("u129").is_err());
        assert_eq!(u8t().to_string(), "u8");
        assert_eq!(IntType::parse("u128").unwrap().bit_width, 128);
    }

    #[test]
    fn machine_int_wraps_into_range() {
        assert_eq!(MachineInt::new(256, u8t()).value(), 0);
        assert_eq!(MachineInt::new(-1, u8t()).value(), 255);
        let s8 = IntType::parse("s8").unwrap();
        assert_eq!(MachineInt::new(128, s8).value(), -128);
        assert_eq!(MachineInt::new(-129, s8).value(), 127);
    }

    #[test]
    fn machine_int_covers_128_bit_types() {
        let u128t = IntType::parse("u128").unwrap();
        let s128 = IntType::parse("s128").unwrap();
        assert_eq!(MachineInt::max(u128t).to_string(), u128::MAX.to_string());
        assert_eq!(MachineInt::max(u128t).value(), i128::MAX);
        assert_eq!(MachineInt::min(s128).value(), i128::MIN);
        assert_eq!(MachineInt::max(s128).value(), i128::MAX);
        assert_eq!(MachineInt::new(-1, u128t).to_string(), u128::MAX.to_string());
        assert!(MachineInt::min(s128) < MachineInt::new(0, s128));
        assert!(MachineInt::new(0, u128t) < MachineInt::max(u128t));
    }

    #[test]
    fn constraints_cover_every_shape() {
        let ty = s32();
        let bounded = |lb: MachineInt, ub: MachineInt| Interval::new(lb, ub).to_constraints("x");
        assert_eq!(Interval::top(ty).to_constraints("x"), "could not bound x");
        assert_eq!(itv(ty, 3, 3).to_constraints("x"), "x = 3");
        assert_eq!(bounded(MachineInt::min(ty), MachineInt::new(10, ty)), "x <= 10");
        assert_eq!(bounded(MachineInt::new(0, ty), MachineInt::max(ty)), "x >= 0");
        assert_eq!(itv(ty, -5, 5).to_constraints("divisor"), "-5 <= divisor <= 5");
    }

    #[test]
    fn sign_cast_keeps_bounds_when_sign_bit_agrees() {
        let s8 = IntType::parse("s8").unwrap();
        let negative = itv(s8, -2, -1).sign_cast(Signedness::Unsigned);
        assert_eq!((negative.lb().value(), negative.ub().value()), (254, 255));
        let straddle = itv(s8, -1, 1).sign_cast(Signedness::Unsigned);
        assert!(straddle.is_top());
    }

    #[test]
    fn sign_cast_of_u128_upper_half_is_negative() {
        let u128t = IntType::parse("u128").unwrap();
        let high = Interval::new(MachineInt::new(-8, u128t), MachineInt::max(u128t));
        let signed = high.sign_cast(Signedness::Signed);
        assert_eq!((signed.lb().value(), signed.ub().value()), (-8, -1));
    }

    #[test]
    fn interval_decodes_from_json() {
        let itv: Interval =
            serde_json::from_str(r#"{"type":"u64","lb":0,"ub":18446744073709551615}"#).unwrap();
        assert!(itv.is_top());
        assert_eq!(itv.bit_width(), 64);
        assert!(serde_json::from_str::<Interval>(r#"{"type":"q1","lb":0,"ub":1}"#).is_err());
        assert!(serde_json::from_str::<Interval>(r#"{"type":"s8","lb":0.5,"ub":1}"#).is_err());
    }

    #[test]
    fn interval_decodes_128_bit_bounds() {
        let small: Interval = serde_json::from_str(r#"{"type":"s128","lb":-5,"ub":5}"#).unwrap();
        assert_eq!(small.to_constraints("x"), "-5 <= x <= 5");

        let top = r#"{"type":"u128","lb":0,"ub":340282366920938463463374607431768211455}"#;
        assert!(serde_json::from_str::<Interval>(top).unwrap().is_top());

        let top = r#"{"type":"s128","lb":-170141183460469231731687303715884105728,"ub":170141183460469231731687303715884105727}"#;
        assert!(serde_json::from_str::<Interval>(top).unwrap().is_top());

        let exact = r#"{"type":"u128","lb":"0","ub":"340282366920938463463374607431768211454"}"#;
        let itv = serde_json::from_str::<Interval>(exact).unwrap();
        assert!(!itv.is_top());
        assert_eq!(itv.to_constraints("x"), "x <= 340282366920938463463374607431768211454");
    }

    #[test]
    fn wide_bounds_serialize_as_strings() {
        let u128t = IntType::parse("u128").unwrap();
        let itv = Interval::top(u128t);
        let json = serde_json::to_value(itv).unwrap();
        assert_eq!(json["lb"], 0);
        assert_eq!(json["ub"], u128::MAX.to_string());
        assert_eq!(serde_json::from_value::<Interval>(json).unwrap(), itv);
    }

    #[test]
    fn congruence_normalises_remainder() {
        let c = Congruence::new(s32(), 4, 6);
        assert_eq!((c.a(), c.b()), (4, 2));
        assert!(Congruence::new(s32(), 1, 0).is_top());
        assert_eq!(Congruence::new(s32(), 0, 7).to_string(), "7");
    }
}
