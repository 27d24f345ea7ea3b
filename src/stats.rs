//! Frequency measures over the ordinals of an index entry

use crate::errors::*;

/// Relative frequency in instances per million positions
pub fn ipm(ordinals: &[u64], size: u64) -> Result<f64> {
    if size == 0 {
        return Err(Error::Domain("ipm of an empty corpus (N = 0)".into()));
    }
    Ok(ordinals.len() as f64 / size as f64 * 1_000_000.0)
}

/// Average reduced frequency
///
/// With `f` hits in a corpus of `N` positions and `v = N / f`, every hit
/// contributes the distance from the previous hit, capped at `v`, and the sum
/// is divided by `v`. The corpus wraps around: the first hit's predecessor is
/// the last hit. Evenly spread hits give `f`, a single tight cluster gives
/// about 1.
///
/// `ordinals` must be strictly increasing and smaller than `size`.
pub fn arf(ordinals: &[u64], size: u64) -> Result<f64> {
    if size == 0 {
        return Err(Error::Domain("arf of an empty corpus (N = 0)".into()));
    }
    let (first, last) = match (ordinals.first(), ordinals.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => return Err(Error::Domain("arf of zero occurrences (f = 0)".into())),
    };
    if last >= size {
        return Err(Error::Domain(format!(
            "occurrence at {} is outside a corpus of {} positions",
            last, size
        )));
    }
    if let Some(pair) = ordinals.windows(2).find(|pair| pair[0] >= pair[1]) {
        return Err(Error::Domain(format!(
            "occurrences must be strictly increasing, found {} then {}",
            pair[0], pair[1]
        )));
    }

    let avg_dist = size as f64 / ordinals.len() as f64;
    // Wrapping around from the last hit; a lone hit is N away from itself
    let wrapped = (first + size - last) as f64;
    let reduced = ordinals
        .windows(2)
        .map(|pair| ((pair[1] - pair[0]) as f64).min(avg_dist))
        .fold(wrapped.min(avg_dist), |acc, d| acc + d);
    Ok(reduced / avg_dist)
}
