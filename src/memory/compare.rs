//! Typed comparison semantics for scan and filter passes
//!
//! Operands are decoded under the scan type's width and encoding before
//! comparing, so this is numeric comparison (two's-complement integers,
//! IEEE floats), not a raw memcmp.

use crate::core::types::{OpType, ScanType, ScanValue};
use std::cmp::Ordering;

/// Compares `lhs` (the fresh/current bytes) against `rhs` (the target or
/// remembered bytes) under `op`.
///
/// The four previous-value operators treat `rhs` as the remembered bytes:
/// `Increased` holds when the current value is above the remembered one.
/// Undecodable operands (short slices) never match, except through
/// `NotEqual`/`Changed`, which are the exact negation of their positive
/// counterparts.
pub fn mem_compare(lhs: &[u8], rhs: &[u8], scan_type: ScanType, op: OpType) -> bool {
    let ord = decode_and_order(lhs, rhs, scan_type);
    match op {
        OpType::Equal | OpType::Unchanged => ord == Some(Ordering::Equal),
        OpType::NotEqual | OpType::Changed => ord != Some(Ordering::Equal),
        OpType::GreaterThan | OpType::Increased => ord == Some(Ordering::Greater),
        OpType::LessThan | OpType::Decreased => ord == Some(Ordering::Less),
        OpType::GreaterOrEqual => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
        OpType::LessOrEqual => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
    }
}

/// Compares two already-decoded values of the same scan type
pub fn compare_values(lhs: ScanValue, rhs: ScanValue, op: OpType) -> bool {
    mem_compare(&lhs.to_bytes(), &rhs.to_bytes(), lhs.scan_type(), op)
}

fn decode_and_order(lhs: &[u8], rhs: &[u8], scan_type: ScanType) -> Option<Ordering> {
    let a = ScanValue::from_bytes(lhs, scan_type)?;
    let b = ScanValue::from_bytes(rhs, scan_type)?;
    match (a, b) {
        (ScanValue::I8(x), ScanValue::I8(y)) => Some(x.cmp(&y)),
        (ScanValue::I16(x), ScanValue::I16(y)) => Some(x.cmp(&y)),
        (ScanValue::I32(x), ScanValue::I32(y)) => Some(x.cmp(&y)),
        (ScanValue::F32(x), ScanValue::F32(y)) => x.partial_cmp(&y),
        (ScanValue::F64(x), ScanValue::F64(y)) => x.partial_cmp(&y),
        // from_bytes with one scan type cannot produce mixed variants
        _ => None,
    }
}
