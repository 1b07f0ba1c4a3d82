//! # Trust Scoring
//!
//! Derives the trust indicator from the rolling log. Pure: the same log
//! always yields the same snapshot.

use crate::domain::{ConfirmationReport, Rgb, TrustSnapshot};

/// Indicator color when no rejection was seen.
pub const TRUSTED_COLOR: Rgb = Rgb::from_hex(0x3ea940);

/// Gradient start, used as the rejection ratio approaches 0.
pub const WARNING_COLOR: Rgb = Rgb::from_hex(0xeccc31);

/// Gradient end, reached at rejection ratio 1.
pub const DISTRUSTED_COLOR: Rgb = Rgb::from_hex(0xa94442);

/// Compute the snapshot for a sequence of reports.
///
/// Every report adds one baseline confirmation for the serving node.
pub fn score<'a>(reports: impl IntoIterator<Item = &'a ConfirmationReport>) -> TrustSnapshot {
    let (confirmations, rejections) = reports.into_iter().fold((0, 0), |(c, r), report| {
        (
            c + 1 + report.confirming_nodes().len(),
            r + report.rejecting_nodes().len(),
        )
    });
    let rejection_ratio = rejection_ratio(confirmations, rejections);
    TrustSnapshot {
        confirmations,
        rejections,
        rejection_ratio,
        color: indicator_color(rejection_ratio),
        trusted: rejection_ratio == 0.0,
    }
}

/// `min(1, 2 * rejections / confirmations)`; 0 when there is no data.
pub fn rejection_ratio(confirmations: usize, rejections: usize) -> f64 {
    if confirmations == 0 {
        return 0.0;
    }
    (rejections as f64 * 2.0 / confirmations as f64).min(1.0)
}

/// Indicator color for a rejection ratio in `[0, 1]`.
pub fn indicator_color(ratio: f64) -> Rgb {
    if ratio <= 0.0 {
        return TRUSTED_COLOR;
    }
    let ratio = ratio.min(1.0);
    let mix = |start: u8, end: u8| -> u8 {
        (f64::from(start) * (1.0 - ratio) + f64::from(end) * ratio) as u8
    };
    Rgb {
        r: mix(WARNING_COLOR.r, DISTRUSTED_COLOR.r),
        g: mix(WARNING_COLOR.g, DISTRUSTED_COLOR.g),
        b: mix(WARNING_COLOR.b, DISTRUSTED_COLOR.b),
    }
}
