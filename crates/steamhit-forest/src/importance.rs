//! Feature importance aggregation across trees.

/// A ranked feature with name, importance score, and rank.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RankedFeature {
    /// Feature name.
    pub name: String,
    /// Normalized importance score (sums to 1.0 across all features).
    pub importance: f64,
    /// 1-based rank (1 = most important).
    pub rank: usize,
}

/// Average per-tree MDI importances and rank them, most important first.
///
/// Ties keep the original column order.
pub(crate) fn aggregate_importances(per_tree: &[Vec<f64>], names: &[String]) -> Vec<RankedFeature> {
    let mut totals = vec![0.0f64; names.len()];
    for tree in per_tree {
        for (total, value) in totals.iter_mut().zip(tree) {
            *total += value;
        }
    }
    let sum: f64 = totals.iter().sum();
    if sum > 0.0 {
        totals.iter_mut().for_each(|v| *v /= sum);
    }

    let mut ranked: Vec<RankedFeature> = names
        .iter()
        .zip(totals)
        .map(|(name, importance)| RankedFeature {
            name: name.clone(),
            importance,
            rank: 0,
        })
        .collect();
    ranked.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    for (i, feature) in ranked.iter_mut().enumerate() {
        feature.rank = i + 1;
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: &[&str]) -> Vec<String> {
        n.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn ranks_descending_and_normalizes() {
        let per_tree = vec![vec![0.2, 0.8, 0.0], vec![0.4, 0.6, 0.0]];
        let ranked = aggregate_importances(&per_tree, &names(&["a", "b", "c"]));
        assert_eq!(ranked[0].name, "b");
        assert_eq!(ranked[0].rank, 1);
        assert!((ranked[0].importance - 0.7).abs() < 1e-12);
        assert_eq!(ranked[2].name, "c");
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn all_zero_stays_zero_in_column_order() {
        let ranked = aggregate_importances(&[vec![0.0, 0.0]], &names(&["a", "b"]));
        assert_eq!(ranked[0].name, "a");
        assert!(ranked.iter().all(|f| f.importance == 0.0));
    }
}
