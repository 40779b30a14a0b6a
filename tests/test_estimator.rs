//! CPT estimation over randomly generated tables.

#[cfg(test)]
mod test_estimator {
    use cardionet::bayesnet::model::estimator::estimate;
    use cardionet::bayesnet::{
        BayesianNetwork, DomainRegistry, EliminationOrdering, FitConfig, NetworkError, Query, Structure,
        UnseenParentPolicy,
    };
    use cardionet::data::Dataset;
    use proptest::prelude::*;

    const A: [&str; 3] = ["x", "y", "z"];
    const B: [&str; 3] = ["p", "q", "r"];
    const C: [&str; 2] = ["no", "yes"];

    fn table(rows: &[(usize, usize, usize)]) -> Dataset {
        let rows: Vec<Vec<String>> = rows
            .iter()
            .map(|&(a, b, c)| vec![A[a].to_string(), B[b].to_string(), C[c].to_string()])
            .collect();
        Dataset::new(vec!["A".into(), "B".into(), "C".into()], rows).unwrap()
    }

    fn collider() -> Structure {
        Structure::from_edges(&[("A", "C"), ("B", "C")]).unwrap()
    }

    proptest! {
        #[test]
        fn columns_sum_to_one(rows in prop::collection::vec((0..3usize, 0..3usize, 0..2usize), 1..60)) {
            let data = table(&rows);
            let structure = collider();
            let domains = DomainRegistry::from_dataset(&data, structure.nodes()).unwrap();
            let cpts = estimate(&structure, &domains, &data, UnseenParentPolicy::Uniform).unwrap();
            prop_assert_eq!(cpts.len(), 3);
            for cpt in &cpts {
                for sum in cpt.conditional_sums().unwrap() {
                    prop_assert!((sum - 1.0).abs() < 1e-9, "column sums to {}", sum);
                }
            }
        }

        #[test]
        fn observed_columns_are_frequencies(rows in prop::collection::vec((0..3usize, 0..3usize, 0..2usize), 1..60)) {
            let data = table(&rows);
            let structure = collider();
            let domains = DomainRegistry::from_dataset(&data, structure.nodes()).unwrap();
            let cpts = estimate(&structure, &domains, &data, UnseenParentPolicy::Uniform).unwrap();
            let c = &cpts[structure.position("C").unwrap()];

            for &(a, b, _) in &rows {
                let parent_count = rows.iter().filter(|r| r.0 == a && r.1 == b).count() as f64;
                let yes_count = rows.iter().filter(|r| r.0 == a && r.1 == b && r.2 == 1).count() as f64;
                let expected = yes_count / parent_count;
                // "yes" may be missing from the domain entirely
                let actual = c.probability_of(&["yes", A[a], B[b]]).unwrap_or(0.0);
                prop_assert!((actual - expected).abs() < 1e-9);
            }
        }

        #[test]
        fn fail_policy_names_the_gap(rows in prop::collection::vec((0..3usize, 0..3usize, 0..2usize), 1..12)) {
            let data = table(&rows);
            let structure = collider();
            let domains = DomainRegistry::from_dataset(&data, structure.nodes()).unwrap();
            let a_states = domains.get("A").unwrap().cardinality();
            let b_states = domains.get("B").unwrap().cardinality();
            let mut seen: Vec<(usize, usize)> = rows.iter().map(|r| (r.0, r.1)).collect();
            seen.sort();
            seen.dedup();

            match estimate(&structure, &domains, &data, UnseenParentPolicy::Fail) {
                Ok(_) => prop_assert_eq!(seen.len(), a_states * b_states),
                Err(NetworkError::UnobservedParentCombination { node, parents }) => {
                    prop_assert!(seen.len() < a_states * b_states);
                    prop_assert_eq!(node, "C");
                    prop_assert_eq!(parents.len(), 2);
                }
                Err(other) => prop_assert!(false, "unexpected error {}", other),
            }
        }
    }

    const NODES: [&str; 3] = ["A", "B", "C"];

    proptest! {
        #[test]
        fn posteriors_are_distributions_under_both_orderings(
            rows in prop::collection::vec((0..3usize, 0..3usize, 0..2usize), 1..40),
            target in 0..3usize,
            second in prop::option::of(0..3usize),
            observed in prop::option::of((0..3usize, 0..3usize)),
        ) {
            let data = table(&rows);
            let network = BayesianNetwork::new(collider()).fit(&data, &FitConfig::default()).unwrap();
            let domains = network.domains().unwrap();

            let mut targets = vec![NODES[target]];
            if let Some(t) = second {
                prop_assume!(t != target);
                targets.push(NODES[t]);
            }
            let mut query = Query::new(targets.iter().copied());
            if let Some((v, s)) = observed {
                prop_assume!(!targets.contains(&NODES[v]));
                let variable = domains.get(NODES[v]).unwrap();
                query = query.given(NODES[v], variable.states()[s % variable.cardinality()].as_str());
            }

            let reverse = network.with_ordering(EliminationOrdering::ReverseTopological).query(&query);
            let greedy = network.with_ordering(EliminationOrdering::MinWeight).query(&query);
            match (reverse, greedy) {
                (Ok(reverse), Ok(greedy)) => {
                    let total: f64 = reverse.values().iter().sum();
                    prop_assert!((total - 1.0).abs() < 1e-9, "sums to {}", total);
                    prop_assert!(reverse.values().iter().all(|p| (0.0..=1.0).contains(p)));
                    prop_assert_eq!(reverse.values().len(), greedy.values().len());
                    for (r, g) in reverse.values().iter().zip(greedy.values()) {
                        prop_assert!((r - g).abs() < 1e-12, "{} vs {}", r, g);
                    }
                }
                (Err(NetworkError::ZeroMass), Err(NetworkError::ZeroMass)) => {}
                (reverse, greedy) => prop_assert!(false, "{:?} / {:?}", reverse.err(), greedy.err()),
            }
        }
    }

    #[test]
    fn test_blank_cells_are_skipped_per_family() {
        let data = Dataset::from_records(
            &["A", "C"],
            &[&["x", "no"], &["x", ""], &["y", "yes"], &["", "yes"]],
        )
        .unwrap();
        let structure = Structure::from_edges(&[("A", "C")]).unwrap();
        let domains = DomainRegistry::from_dataset(&data, structure.nodes()).unwrap();
        let cpts = estimate(&structure, &domains, &data, UnseenParentPolicy::Fail).unwrap();

        // A counts three rows, C given A only the two complete ones
        let a = &cpts[0];
        assert!((a.probability_of(&["x"]).unwrap() - 2.0 / 3.0).abs() < 1e-12);
        let c = &cpts[1];
        assert_eq!(c.probability_of(&["no", "x"]).unwrap(), 1.0);
        assert_eq!(c.probability_of(&["yes", "y"]).unwrap(), 1.0);
    }

    #[test]
    fn test_uniform_fill_for_unseen_parents() {
        let data = Dataset::from_records(&["A", "C"], &[&["x", "no"], &["x", "yes"]]).unwrap();
        let structure = Structure::from_edges(&[("A", "C")]).unwrap();
        let domains = DomainRegistry::declare([
            cardionet::bayesnet::Variable::new("A", vec!["x".into(), "y".into()]).unwrap(),
            cardionet::bayesnet::Variable::new("C", vec!["no".into(), "yes".into(), "maybe".into()]).unwrap(),
        ])
        .unwrap();
        let cpts = estimate(&structure, &domains, &data, UnseenParentPolicy::Uniform).unwrap();
        for state in ["no", "yes", "maybe"] {
            let p = cpts[1].probability_of(&[state, "y"]).unwrap();
            assert!((p - 1.0 / 3.0).abs() < 1e-12);
        }
        assert!(matches!(
            estimate(&structure, &domains, &data, UnseenParentPolicy::Fail),
            Err(NetworkError::UnobservedParentCombination { .. })
        ));
    }
}
