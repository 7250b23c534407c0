//! Multinomial-logit journey choice.

use rand::Rng;

use crate::routing::Journey;

/// Utility parameters of the logit model. Travel time enters in hours,
/// transfers as a count; both coefficients are negative for sane models.
#[derive(Debug, Clone, Copy)]
pub struct ChoiceModel {
    pub beta_travel_time: f64,
    pub beta_transfers: f64,
}

impl Default for ChoiceModel {
    fn default() -> Self {
        ChoiceModel {
            beta_travel_time: -0.1,
            beta_transfers: -2.0,
        }
    }
}

impl ChoiceModel {
    pub fn utility(&self, journey: &Journey) -> f64 {
        let travel_time = journey.ovtt() + journey.ivtt();
        self.beta_travel_time * travel_time / 3600.0 + self.beta_transfers * journey.transfers as f64
    }
}

/// Sample an index with probability `exp(u_i) / Σ exp(u_j)`.
pub fn sample_index<R: Rng>(utilities: &[f64], rng: &mut R) -> usize {
    if utilities.len() <= 1 {
        return 0;
    }

    // Shift by the maximum so the exponentials cannot overflow.
    let max = utilities.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let weights: Vec<f64> = utilities.iter().map(|u| (u - max).exp()).collect();
    let total: f64 = weights.iter().sum();

    let draw = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    for (index, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if draw < cumulative {
            return index;
        }
    }
    weights.len() - 1
}
