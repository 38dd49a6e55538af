//! End-to-end rounds through the public engine API.

use neuro_core::{Engine, EngineConfig, NetworkTopology, NeuroError};

fn rocket_config(seed: u64) -> EngineConfig {
    EngineConfig::new(NetworkTopology::new(3, vec![15], 1), 10).with_seed(seed)
}

#[test]
fn first_generation_matches_topology() {
    let mut engine = Engine::new(rocket_config(1)).unwrap();
    let networks = engine.next_generation().unwrap();

    assert_eq!(networks.len(), 10);
    for net in &networks {
        assert_eq!(net.neuron_counts(), vec![3, 15, 1]);
    }
    assert_eq!(engine.history().len(), 1);
}

#[test]
fn best_network_survives_as_elite() {
    let mut engine = Engine::new(rocket_config(2)).unwrap();
    let mut networks = engine.next_generation().unwrap();

    for (i, net) in networks.iter_mut().enumerate() {
        let out = net.compute(&[0.1, 0.0, 300.0]);
        assert_eq!(out.len(), 1);
        engine.set_score(net, (i * 7 % 10) as f64 + 0.5).unwrap();
    }
    // 7 * 7 % 10 == 9 is the top score, 4 * 7 % 10 == 8 the runner-up
    let best = networks[7].export();
    let runner_up = networks[4].export();

    let next = engine.next_generation().unwrap();
    // 2 elites + 1 reseed + 9 children: the overshoot is deliberate
    assert_eq!(next.len(), 12);
    assert_eq!(next[0].export(), best);
    assert_eq!(next[1].export(), runner_up);
    assert_eq!(next[2].export().neuron_counts, best.neuron_counts);
    assert_ne!(next[2].export().weights, best.weights);
}

#[test]
fn history_stays_bounded_over_many_rounds() {
    let mut engine = Engine::new(rocket_config(3)).unwrap();

    for round in 0..25 {
        let networks = engine.next_generation().unwrap();
        assert!(engine.history().len() <= 2);
        if let Some(previous) = engine.history().previous() {
            assert!(previous.genomes().iter().all(|g| g.network().is_none()));
            assert!(!previous.is_empty());
        }
        let retaining = engine
            .history()
            .iter()
            .filter(|g| g.genomes().iter().any(|genome| genome.network().is_some()))
            .count();
        assert!(retaining <= 1);

        for (i, net) in networks.iter().enumerate() {
            engine.set_score(net, (round * 100 + i) as f64).unwrap();
        }
    }
    assert_eq!(engine.round(), 25);
}

#[test]
fn breeding_before_scoring_fails_without_side_effects() {
    let mut engine = Engine::new(rocket_config(4)).unwrap();
    let networks = engine.next_generation().unwrap();

    for net in networks.iter().take(3) {
        engine.set_score(net, 1.0).unwrap();
    }
    let err = engine.next_generation().unwrap_err();
    assert!(matches!(
        err,
        NeuroError::IncompleteGeneration {
            scored: 3,
            required: 9
        }
    ));
    assert_eq!(engine.round(), 1);

    // the batch stays open for the remaining scores
    for net in networks.iter().skip(3) {
        engine.set_score(net, 2.0).unwrap();
    }
    assert!(engine.next_generation().is_ok());
}

#[test]
fn zero_mutation_children_mix_only_parent_weights() {
    let mut config = rocket_config(5);
    config.mutation_rate = 0.0;
    config.elitism = 0.0;
    config.random_behavior = 0.0;
    let mut engine = Engine::new(config).unwrap();

    let networks = engine.next_generation().unwrap();
    for (i, net) in networks.iter().enumerate() {
        engine.set_score(net, i as f64).unwrap();
    }
    let best = networks[9].export();
    let parents: Vec<_> = networks.iter().map(|n| n.export()).collect();

    let children = engine.next_generation().unwrap();
    assert_eq!(children.len(), 9);
    // the first child is the best genome bred with itself
    assert_eq!(children[0].export(), best);

    for (k, child) in children.iter().enumerate() {
        // child k pairs rank k with rank 0 (the best)
        let other = &parents[9 - k];
        for (idx, w) in child.export().weights.iter().enumerate() {
            assert!(*w == best.weights[idx] || *w == other.weights[idx]);
        }
    }
}
