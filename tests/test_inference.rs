#[cfg(test)]
mod test_inference {
    use cardionet::bayesnet::common::interface::ScenarioMaker;
    use cardionet::bayesnet::scenarios::sprinkler::reference_network;
    use cardionet::bayesnet::scenarios::two_node::TwoNode;
    use cardionet::bayesnet::{BayesianNetwork, EliminationOrdering, FitConfig, NetworkError, Query};
    use std::collections::HashMap;

    const EPS: f64 = 1e-9;

    fn two_node_network() -> BayesianNetwork {
        let scenario = TwoNode {};
        let data = scenario.training_data().unwrap().unwrap();
        BayesianNetwork::new(scenario.structure().unwrap())
            .fit(&data, &FitConfig::default())
            .unwrap()
    }

    /// Enumerate the full joint and condition by hand.
    fn brute_force(network: &BayesianNetwork, targets: &[&str], evidence: &[(&str, &str)]) -> Vec<f64> {
        let domains = network.domains().unwrap();
        let nodes: Vec<&str> = network.structure().nodes().collect();
        let cards: Vec<usize> = nodes
            .iter()
            .map(|n| domains.get(n).unwrap().cardinality())
            .collect();
        let target_cards: Vec<usize> = targets
            .iter()
            .map(|t| domains.get(t).unwrap().cardinality())
            .collect();
        let mut out = vec![0.0; target_cards.iter().product()];

        let total: usize = cards.iter().product();
        for mut code in 0..total {
            let mut assignment: HashMap<&str, &str> = HashMap::new();
            for (i, node) in nodes.iter().enumerate().rev() {
                let state = &domains.get(node).unwrap().states()[code % cards[i]];
                code /= cards[i];
                assignment.insert(*node, state.as_str());
            }
            if evidence.iter().any(|(v, s)| assignment[v] != *s) {
                continue;
            }
            let mut p = 1.0;
            for node in &nodes {
                let cpt = network.cpt(node).unwrap();
                let states: Vec<&str> = cpt.variable_names().iter().map(|n| assignment[n]).collect();
                p *= cpt.probability_of(&states).unwrap();
            }
            let mut index = 0;
            for (t, target) in targets.iter().enumerate() {
                let k = domains.get(target).unwrap().state_index(assignment[target]).unwrap();
                index = index * target_cards[t] + k;
            }
            out[index] += p;
        }
        let sum: f64 = out.iter().sum();
        out.iter().map(|v| v / sum).collect()
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < EPS, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_two_node_parameters() {
        let network = two_node_network();
        let b = network.cpt("B").unwrap();
        assert!((b.probability_of(&["0", "0"]).unwrap() - 2.0 / 3.0).abs() < EPS);
        assert!((b.probability_of(&["1", "0"]).unwrap() - 1.0 / 3.0).abs() < EPS);
        assert_eq!(b.probability_of(&["0", "1"]).unwrap(), 0.0);
        assert_eq!(b.probability_of(&["1", "1"]).unwrap(), 1.0);
        assert_close(network.cpt("A").unwrap().values(), &[0.5, 0.5]);
    }

    #[test]
    fn test_two_node_queries() {
        let network = two_node_network();
        let posterior = network.query(&Query::new(["B"]).given("A", "0")).unwrap();
        assert_close(posterior.values(), &[2.0 / 3.0, 1.0 / 3.0]);

        let posterior = network.query(&Query::new(["B"]).given("A", "1")).unwrap();
        assert_close(posterior.values(), &[0.0, 1.0]);

        let posterior = network.query(&Query::new(["A"]).given("B", "1")).unwrap();
        assert_close(posterior.values(), &[0.25, 0.75]);

        assert_close(network.marginal("A").unwrap().values(), &[0.5, 0.5]);

        let posterior = network.marginal("B").unwrap();
        assert_close(posterior.values(), &[1.0 / 3.0, 2.0 / 3.0]);
        assert_eq!(posterior.most_likely().unwrap().0, vec!["1"]);
    }

    #[test]
    fn test_two_node_matches_enumeration() {
        let network = two_node_network();
        let cases: Vec<(Vec<&str>, Vec<(&str, &str)>)> = vec![
            (vec!["A"], vec![]),
            (vec!["B"], vec![]),
            (vec!["A"], vec![("B", "0")]),
            (vec!["A", "B"], vec![]),
            (vec!["B", "A"], vec![]),
        ];
        for (targets, evidence) in &cases {
            let mut query = Query::new(targets.iter().copied());
            for (v, s) in evidence {
                query = query.given(*v, *s);
            }
            let posterior = network.query(&query).unwrap();
            assert_close(posterior.values(), &brute_force(&network, targets, evidence));
        }
    }

    #[test]
    fn test_matches_enumeration() {
        let network = reference_network().unwrap();
        let cases: Vec<(Vec<&str>, Vec<(&str, &str)>)> = vec![
            (vec!["rain"], vec![]),
            (vec!["rain"], vec![("wet_grass", "true")]),
            (vec!["rain"], vec![("wet_grass", "true"), ("sprinkler", "true")]),
            (vec!["cloudy"], vec![("wet_grass", "false")]),
            (vec!["sprinkler", "rain"], vec![("cloudy", "true")]),
            (vec!["wet_grass", "cloudy"], vec![]),
        ];
        for ordering in [EliminationOrdering::ReverseTopological, EliminationOrdering::MinWeight] {
            let network = network.with_ordering(ordering);
            for (targets, evidence) in &cases {
                let mut query = Query::new(targets.iter().copied());
                for (v, s) in evidence {
                    query = query.given(*v, *s);
                }
                let posterior = network.query(&query).unwrap();
                assert_eq!(posterior.targets(), *targets);
                assert_close(posterior.values(), &brute_force(&network, targets, evidence));
            }
        }
    }

    #[test]
    fn test_posteriors_sum_to_one() {
        let network = reference_network().unwrap();
        for node in ["cloudy", "sprinkler", "rain", "wet_grass"] {
            let total: f64 = network.marginal(node).unwrap().values().iter().sum();
            assert!((total - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn test_repeated_queries_are_identical() {
        let network = reference_network().unwrap().with_ordering(EliminationOrdering::MinWeight);
        let query = Query::new(["cloudy", "rain"]).given("wet_grass", "true");
        let first = network.query(&query).unwrap();
        for _ in 0..5 {
            assert_eq!(network.query(&query).unwrap().values(), first.values());
        }
    }

    #[test]
    fn test_deterministic_child() {
        let network = reference_network().unwrap();
        let query = Query::new(["wet_grass"])
            .given("sprinkler", "false")
            .given("rain", "false");
        let posterior = network.query(&query).unwrap();
        assert_eq!(posterior.probability(&["false"]).unwrap(), 1.0);
        assert_eq!(posterior.probability(&["true"]).unwrap(), 0.0);
    }

    #[test]
    fn test_impossible_evidence() {
        let network = reference_network().unwrap();
        let query = Query::new(["cloudy"])
            .given("wet_grass", "true")
            .given("sprinkler", "false")
            .given("rain", "false");
        assert_eq!(network.query(&query).unwrap_err(), NetworkError::ZeroMass);
    }

    #[test]
    fn test_unfitted_network() {
        let network = BayesianNetwork::from_edges(&[("A", "B")]).unwrap();
        assert!(!network.is_fitted());
        assert_eq!(network.marginal("A").unwrap_err(), NetworkError::ModelNotFitted);
        assert_eq!(network.cpt("A").unwrap_err(), NetworkError::ModelNotFitted);

        let data = TwoNode {}.training_data().unwrap().unwrap();
        let fitted = network.fit(&data, &FitConfig::default()).unwrap();
        assert!(fitted.is_fitted());
        assert!(!network.is_fitted());
    }

    #[test]
    fn test_invalid_queries() {
        let network = reference_network().unwrap();
        let empty: [&str; 0] = [];
        assert!(matches!(
            network.query(&Query::new(empty)),
            Err(NetworkError::InvalidQuery(_))
        ));
        assert!(matches!(
            network.query(&Query::new(["rain", "rain"])),
            Err(NetworkError::InvalidQuery(_))
        ));
        assert!(matches!(
            network.query(&Query::new(["rain"]).given("rain", "true")),
            Err(NetworkError::InvalidQuery(_))
        ));
        assert_eq!(
            network.query(&Query::new(["snow"])).unwrap_err(),
            NetworkError::UnknownVariable("snow".to_string())
        );
        assert_eq!(
            network.query(&Query::new(["rain"]).given("fog", "true")).unwrap_err(),
            NetworkError::UnknownVariable("fog".to_string())
        );
        assert!(matches!(
            network.query(&Query::new(["rain"]).given("cloudy", "maybe")),
            Err(NetworkError::UnknownState { .. })
        ));
    }

    #[test]
    fn test_batch_matches_sequential() {
        let network = reference_network().unwrap();
        let queries = vec![
            Query::new(["rain"]).given("wet_grass", "true"),
            Query::new(["snow"]),
            Query::new(["sprinkler", "cloudy"]),
        ];
        let batch = network.query_batch(&queries);
        assert_eq!(batch.len(), queries.len());
        for (query, result) in queries.iter().zip(batch) {
            assert_eq!(result, network.query(query));
        }
    }
}
