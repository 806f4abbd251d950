//! Derivations shared by every exporter.

use privchain_core::catalog::AttackVector;

/// Separator between component and technique in a vector's display name.
const LABEL_SEPARATOR: &str = ": ";

/// Technique part of a vector display name.
///
/// The substring after the first `": "`, or the whole name when the
/// separator is absent.
#[must_use]
pub fn short_label(name: &str) -> &str {
    name.split_once(LABEL_SEPARATOR).map_or(name, |(_, rest)| rest)
}

/// Distinct privilege levels visited by `chain`, in visitation order.
///
/// `chain[0].source_privilege` comes first, then each target not
/// already listed. Empty for an empty chain.
#[must_use]
pub fn visited_levels(chain: &[AttackVector]) -> Vec<&str> {
    let Some(first) = chain.first() else {
        return Vec::new();
    };

    let mut levels = vec![first.source_privilege.as_str()];
    for vector in chain {
        let target = vector.target_privilege.as_str();
        if !levels.contains(&target) {
            levels.push(target);
        }
    }
    levels
}

/// Index of `level` in the visitation order.
///
/// Every source and target in a chain is in its own `visited_levels`,
/// because each source is the previous step's target.
#[must_use]
pub fn node_index(levels: &[&str], level: &str) -> Option<usize> {
    levels.iter().position(|l| *l == level)
}
