use maxrate_core::{BruteForceSolver, ClosureSolver, Cluster, ClusterBuilder, FeeRate, ItemSet, ParametricSolver};
use proptest::prelude::*;

/// Items plus candidate edges; an edge `(a, b)` is kept as "the later of the
/// two depends on the earlier", so the result is always acyclic.
fn cluster_strategy(max_items: usize) -> impl Strategy<Value = Cluster> {
    (1..=max_items)
        .prop_flat_map(|items| {
            (
                prop::collection::vec((0u64..500, 1u64..20), items),
                prop::collection::vec((0..items, 0..items), 0..items * 2),
            )
        })
        .prop_map(|(rates, edges)| {
            let mut builder = ClusterBuilder::new(32);
            for (fee, size) in rates {
                builder.item(fee, size);
            }
            for (a, b) in edges {
                if a != b {
                    builder.depends(a.max(b), a.min(b));
                }
            }
            builder.build().unwrap()
        })
}

fn rate_strategy() -> impl Strategy<Value = FeeRate> {
    (any::<u64>(), any::<u64>()).prop_map(|(fee, size)| FeeRate::new(fee, size))
}

proptest! {
    #[test]
    fn compare_is_antisymmetric(a in rate_strategy(), b in rate_strategy()) {
        prop_assert_eq!(a.compare(&b), b.compare(&a).reverse());
    }

    #[test]
    fn scaling_preserves_ratio(fee in 0u64..1_000_000, size in 1u64..1_000_000, k in 1u64..1000) {
        prop_assert!(FeeRate::new(fee, size).is_equivalent(&FeeRate::new(fee * k, size * k)));
    }

    #[test]
    fn feerate_is_additive_over_disjoint_sets(cluster in cluster_strategy(16), mask in any::<u64>()) {
        let n = cluster.len();
        let left = ItemSet::from_mask(n, mask);
        let right = ItemSet::from_indices(n, (0..n).filter(|&i| !left.contains(i)));
        prop_assert!(left.is_disjoint(&right));
        prop_assert_eq!(
            cluster.feerate_of(&left) + cluster.feerate_of(&right),
            cluster.feerate_of(&cluster.full_set())
        );
    }

    #[test]
    fn trivial_sets_are_closures(cluster in cluster_strategy(16)) {
        prop_assert!(cluster.is_closure(&cluster.empty_set()));
        prop_assert!(cluster.is_closure(&cluster.full_set()));
    }

    #[test]
    fn parametric_is_optimal(cluster in cluster_strategy(10)) {
        let exact = BruteForceSolver::new(20).solve(&cluster).unwrap();
        let found = ParametricSolver::default().solve(&cluster).unwrap();
        prop_assert!(found.rate.is_equivalent(&exact.rate));
        prop_assert!(cluster.is_closure(&found.closure));
    }
}
