//! Headless rocket-landing task used as the fitness environment.
//!
//! Each network controls one rocket falling toward the ground. Every tick it
//! sees `[altitude ratio, velocity, fuel]` and its first output decides
//! whether to burn. Landing softly scores high; crashing fast scores low.

use neuro_core::{Engine, Genome, Network, Snapshot};
use tracing::debug;

use crate::config::SimulationConfig;

const LANDING_REWARD: f64 = 500.0;
const THRUST_REWARD: f64 = 5.0;
const VELOCITY_CEILING: f64 = 25.0;
const BURN_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Landed,
    Crashed,
    /// Flew off the top of the field or ran out of ticks
    Escaped,
}

#[derive(Debug, Clone)]
struct Rocket {
    y: f64,
    velocity: f64,
    thrust: f64,
    fuel: u32,
    used_thrust: bool,
}

impl Rocket {
    fn new(sim: &SimulationConfig) -> Self {
        Self {
            y: sim.start_y,
            velocity: 0.0,
            thrust: 0.0,
            fuel: sim.fuel,
            used_thrust: false,
        }
    }

    fn burn(&mut self, sim: &SimulationConfig) {
        self.fuel -= 1;
        self.used_thrust = true;
        self.thrust += sim.thrust_step;
    }

    /// Advance one tick; `Some` once the flight is over.
    fn step(&mut self, sim: &SimulationConfig) -> Option<Outcome> {
        self.velocity += sim.gravity_per_tick() + self.thrust;
        self.y += self.velocity;

        if self.y + 2.0 * sim.rocket_height >= sim.world_height {
            if self.velocity <= sim.landing_velocity {
                Some(Outcome::Landed)
            } else {
                Some(Outcome::Crashed)
            }
        } else if self.y <= 0.0 {
            Some(Outcome::Escaped)
        } else {
            None
        }
    }
}

/// Result of one rocket's flight.
#[derive(Debug, Clone)]
pub struct Flight {
    pub outcome: Outcome,
    pub velocity: f64,
    pub fuel: u32,
    pub used_thrust: bool,
    pub ticks: u32,
}

impl Flight {
    pub fn score(&self) -> f64 {
        let mut score = 0.0;
        if self.outcome == Outcome::Landed {
            score += LANDING_REWARD;
        }
        if self.used_thrust {
            score += THRUST_REWARD;
        }
        let velocity = round2(self.velocity);
        // flying upwards earns nothing
        if velocity > 0.0 {
            score += (VELOCITY_CEILING - velocity).powi(2);
        }
        round2(score)
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Fly one rocket under the control of `network`.
pub fn fly(network: &mut Network, sim: &SimulationConfig) -> Flight {
    let mut rocket = Rocket::new(sim);

    for tick in 1..=sim.max_ticks {
        let inputs = [
            rocket.y / sim.world_height,
            rocket.velocity,
            f64::from(rocket.fuel),
        ];
        let output = network.compute(&inputs);
        // only the first output drives the engine
        let burn = output.first().is_some_and(|&o| o > BURN_THRESHOLD);
        if burn && rocket.fuel > 0 {
            rocket.burn(sim);
        } else {
            rocket.thrust = 0.0;
        }

        if let Some(outcome) = rocket.step(sim) {
            return Flight {
                outcome,
                velocity: rocket.velocity,
                fuel: rocket.fuel,
                used_thrust: rocket.used_thrust,
                ticks: tick,
            };
        }
    }

    Flight {
        outcome: Outcome::Escaped,
        velocity: rocket.velocity,
        fuel: rocket.fuel,
        used_thrust: rocket.used_thrust,
        ticks: sim.max_ticks,
    }
}

/// Size of the cross-round high-score board.
pub const HIGH_SCORE_CAPACITY: usize = 25;

#[derive(Debug, Clone, PartialEq)]
pub struct HighScore {
    pub score: f64,
    pub round: u64,
    pub velocity: f64,
    pub fuel: u32,
}

/// Best flights across every round of a run, best first.
///
/// Also keeps the snapshot of the single best network seen so far, which
/// may come from any round.
#[derive(Debug, Clone)]
pub struct HighScores {
    entries: Vec<HighScore>,
    capacity: usize,
    best_network: Option<Snapshot>,
}

impl HighScores {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity + 1),
            capacity,
            best_network: None,
        }
    }

    /// Insert after existing entries of equal score, dropping the tail past capacity.
    pub fn record(&mut self, entry: HighScore, network: &Network) {
        if self.best().map_or(true, |top| entry.score > top.score) {
            self.best_network = Some(network.export());
        }
        let pos = self
            .entries
            .iter()
            .position(|e| e.score < entry.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(self.capacity);
    }

    pub fn entries(&self) -> &[HighScore] {
        &self.entries
    }

    pub fn best(&self) -> Option<&HighScore> {
        self.entries.first()
    }

    /// Network behind [`HighScores::best`].
    pub fn best_network(&self) -> Option<&Snapshot> {
        self.best_network.as_ref()
    }
}

impl Default for HighScores {
    fn default() -> Self {
        Self::new(HIGH_SCORE_CAPACITY)
    }
}

/// Aggregate results of one evaluated batch.
#[derive(Debug, Clone)]
pub struct RoundSummary {
    pub round: u64,
    pub flown: usize,
    pub landed: usize,
    pub crashed: usize,
    pub best_score: f64,
    pub mean_score: f64,
}

/// Fly every network, report each score back to the engine and record it
/// on the board.
pub fn evaluate(
    engine: &mut Engine,
    networks: &mut [Network],
    sim: &SimulationConfig,
    board: &mut HighScores,
) -> neuro_core::Result<RoundSummary> {
    let round = engine.round();
    let mut landed = 0;
    let mut crashed = 0;

    for network in networks.iter_mut() {
        let flight = fly(network, sim);
        let score = flight.score();
        match flight.outcome {
            Outcome::Landed => landed += 1,
            Outcome::Crashed => crashed += 1,
            Outcome::Escaped => {}
        }

        debug!(
            outcome = ?flight.outcome,
            velocity = flight.velocity,
            fuel = flight.fuel,
            ticks = flight.ticks,
            score,
            "Rocket finished"
        );
        engine.set_score(network, score)?;
        board.record(
            HighScore {
                score,
                round,
                velocity: round2(flight.velocity),
                fuel: flight.fuel,
            },
            network,
        );
    }

    // the current generation holds exactly this batch's scores
    let scored = engine.history().current();
    Ok(RoundSummary {
        round,
        flown: networks.len(),
        landed,
        crashed,
        best_score: scored.and_then(|g| g.best()).map_or(0.0, Genome::score),
        mean_score: scored.and_then(|g| g.mean_score()).unwrap_or(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuro_core::{EngineConfig, NetworkTopology};

    /// Single-layer net whose output is fixed by the bias-free weight on the
    /// fuel input: positive weight burns, negative never burns.
    fn fixed_policy(weight_on_fuel: f64) -> Network {
        Network::from_snapshot(&Snapshot {
            neuron_counts: vec![3, 1],
            weights: vec![0.0, 0.0, weight_on_fuel],
        })
        .unwrap()
    }

    #[test]
    fn free_fall_crashes() {
        let sim = SimulationConfig::default();
        let flight = fly(&mut fixed_policy(-1.0), &sim);

        assert_eq!(flight.outcome, Outcome::Crashed);
        assert!(!flight.used_thrust);
        assert_eq!(flight.fuel, sim.fuel);
        assert!(flight.velocity > sim.landing_velocity);
    }

    #[test]
    fn constant_burn_escapes_upwards() {
        let sim = SimulationConfig::default();
        let flight = fly(&mut fixed_policy(1.0), &sim);

        assert_eq!(flight.outcome, Outcome::Escaped);
        assert!(flight.used_thrust);
        assert!(flight.fuel < sim.fuel);
        // upward velocity is not rewarded
        assert_eq!(flight.score(), THRUST_REWARD);
    }

    #[test]
    fn landing_score_includes_all_rewards() {
        let flight = Flight {
            outcome: Outcome::Landed,
            velocity: 3.004,
            fuel: 10,
            used_thrust: true,
            ticks: 100,
        };
        // 500 + 5 + (25 - 3.0)^2
        assert_eq!(flight.score(), 989.0);
    }

    #[test]
    fn crash_score_only_rewards_velocity() {
        let flight = Flight {
            outcome: Outcome::Crashed,
            velocity: 20.0,
            fuel: 300,
            used_thrust: false,
            ticks: 30,
        };
        assert_eq!(flight.score(), 25.0);
    }

    #[test]
    fn tick_guard_ends_hovering_flights() {
        let sim = SimulationConfig {
            max_ticks: 3,
            ..SimulationConfig::default()
        };
        let flight = fly(&mut fixed_policy(-1.0), &sim);
        assert_eq!(flight.outcome, Outcome::Escaped);
        assert_eq!(flight.ticks, 3);
    }

    #[test]
    fn evaluate_scores_every_network() {
        let config = EngineConfig::new(NetworkTopology::new(3, vec![15], 1), 10).with_seed(12);
        let mut engine = Engine::new(config).unwrap();
        let sim = SimulationConfig::default();
        let mut board = HighScores::default();

        let mut networks = engine.next_generation().unwrap();
        let summary = evaluate(&mut engine, &mut networks, &sim, &mut board).unwrap();

        let current = engine.history().current().unwrap();
        assert_eq!(summary.flown, 10);
        assert_eq!(summary.round, 1);
        assert_eq!(current.len(), 10);
        assert_eq!(Some(summary.mean_score), current.mean_score());
        assert_eq!(summary.best_score, current.best().unwrap().score());
        assert!(summary.best_score >= summary.mean_score);
        assert_eq!(board.entries().len(), 10);
        assert_eq!(board.best().unwrap().score, summary.best_score);
        assert!(engine.next_generation().is_ok());
    }

    fn entry(score: f64, round: u64) -> HighScore {
        HighScore {
            score,
            round,
            velocity: 1.0,
            fuel: 0,
        }
    }

    #[test]
    fn board_is_ranked_and_bounded() {
        let mut board = HighScores::new(3);
        let net = fixed_policy(0.0);
        for (i, score) in [5.0, 9.0, 1.0, 9.0, 7.0].into_iter().enumerate() {
            board.record(entry(score, i as u64), &net);
        }

        let ranked: Vec<(f64, u64)> = board.entries().iter().map(|e| (e.score, e.round)).collect();
        // equal scores keep arrival order
        assert_eq!(ranked, vec![(9.0, 1), (9.0, 3), (7.0, 4)]);
    }

    #[test]
    fn board_keeps_best_network_across_rounds() {
        let mut board = HighScores::default();
        let strong = fixed_policy(0.75);
        let weak = fixed_policy(-0.25);

        board.record(entry(900.0, 1), &strong);
        board.record(entry(300.0, 2), &weak);
        board.record(entry(900.0, 3), &weak);

        assert_eq!(board.best().unwrap().round, 1);
        assert_eq!(board.best_network(), Some(&strong.export()));
    }

    #[test]
    fn best_network_survives_weaker_later_rounds() {
        let config = EngineConfig::new(NetworkTopology::new(3, vec![15], 1), 10).with_seed(31);
        let mut engine = Engine::new(config).unwrap();
        let sim = SimulationConfig::default();
        let mut board = HighScores::default();

        let mut best_seen = f64::NEG_INFINITY;
        for _ in 0..4 {
            let mut networks = engine.next_generation().unwrap();
            let summary = evaluate(&mut engine, &mut networks, &sim, &mut board).unwrap();
            best_seen = best_seen.max(summary.best_score);
        }

        assert_eq!(board.best().unwrap().score, best_seen);
        let mut replay = Network::from_snapshot(board.best_network().unwrap()).unwrap();
        assert_eq!(fly(&mut replay, &sim).score(), best_seen);
    }
}
