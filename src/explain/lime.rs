use std::collections::HashMap;

use rand::{rngs::StdRng, seq::index, Rng, SeedableRng};

use super::{
    ridge::weighted_ridge, ClassifierError, ExplainError, Explainer, Explanation, Settings,
    WordWeight,
};

/// Ridge penalty of the local surrogate model
const SURROGATE_ALPHA: f64 = 1.0;

/// Ridge penalty of the model that ranks words by weight
const RANKING_ALPHA: f64 = 0.01;

/// Up to this many words are picked by forward selection, beyond it by ranked weight
const FORWARD_SELECTION_MAX: usize = 6;

/// Explains a text prediction by removing random subsets of its words, scoring the perturbed
/// texts with the classifier and fitting a proximity-weighted linear model on word presence.
#[derive(Clone, Debug, Default)]
pub struct LimeText {
    settings: Settings,
}

impl LimeText {
    /// Create an explainer with the given settings
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Draw the perturbation matrix: row 0 keeps every word, every other row drops a random
    /// non-empty subset of the distinct words
    fn sample(&self, n_features: usize) -> Vec<Vec<bool>> {
        let mut rng = StdRng::seed_from_u64(self.settings.seed);
        let n_samples = self.settings.num_samples.max(1);

        let mut samples = Vec::with_capacity(n_samples);
        samples.push(vec![true; n_features]);

        for _ in 1..n_samples {
            let n_removed = rng.gen_range(1..=n_features);
            let mut active = vec![true; n_features];

            for feature in index::sample(&mut rng, n_features, n_removed).into_iter() {
                active[feature] = false;
            }

            samples.push(active);
        }

        samples
    }

    /// Pick the words the surrogate is fitted on.
    ///
    /// Small selections grow greedily, each time adding the word whose unpenalized fit scores
    /// best. Larger ones keep the words with the largest weight times their value in the
    /// original text, which is always 1, under a lightly penalized fit.
    fn select_features(
        &self,
        x: &[Vec<f64>],
        y: &[f64],
        weights: &[f64],
        n_features: usize,
    ) -> Result<Vec<usize>, ExplainError> {
        let num_features = self.settings.num_features.clamp(1, n_features);

        if num_features <= FORWARD_SELECTION_MAX {
            let mut selected: Vec<usize> = Vec::with_capacity(num_features);

            while selected.len() < num_features {
                let mut best: Option<(usize, f64)> = None;

                for candidate in (0..n_features).filter(|f| !selected.contains(f)) {
                    let columns: Vec<Vec<f64>> = x
                        .iter()
                        .map(|row| {
                            selected
                                .iter()
                                .chain([&candidate])
                                .map(|&feature| row[feature])
                                .collect()
                        })
                        .collect();

                    let Some(fit) = weighted_ridge(&columns, y, weights, 0.0) else {
                        continue;
                    };

                    if best.map_or(true, |(_, score)| fit.score > score) {
                        best = Some((candidate, fit.score));
                    }
                }

                let (feature, _) = best.ok_or(ExplainError::Surrogate)?;
                selected.push(feature);
            }

            return Ok(selected);
        }

        let ranking =
            weighted_ridge(x, y, weights, RANKING_ALPHA).ok_or(ExplainError::Surrogate)?;

        let mut ranked: Vec<usize> = (0..n_features).collect();
        ranked.sort_by(|&a, &b| {
            ranking.coefficients[b]
                .abs()
                .total_cmp(&ranking.coefficients[a].abs())
                .then(a.cmp(&b))
        });
        ranked.truncate(num_features);

        Ok(ranked)
    }

    /// Proximity of a sample to the original text, from the cosine distance between their
    /// word-presence vectors
    fn kernel(&self, n_active: usize, n_features: usize) -> f64 {
        let similarity = if n_active == 0 {
            0.0
        } else {
            (n_active as f64 / n_features as f64).sqrt()
        };

        let distance = (1.0 - similarity) * 100.0;
        let width = f64::from(self.settings.kernel_width);

        (-(distance * distance) / (width * width)).exp().sqrt()
    }
}

impl Explainer for LimeText {
    fn explain<F, E>(
        &self,
        probability_fn: F,
        class_names: &[String],
        text: &str,
        class: usize,
    ) -> Result<Explanation, ExplainError>
    where
        F: Fn(&[String]) -> Result<Vec<Vec<f32>>, E>,
        E: Into<ClassifierError>,
    {
        if class >= class_names.len() {
            return Err(ExplainError::UnknownClass {
                class,
                n_classes: class_names.len(),
            });
        }

        let words: Vec<&str> = text.split_whitespace().collect();

        // Distinct words in order of first appearance
        let mut features: Vec<&str> = Vec::new();
        let mut feature_of: HashMap<&str, usize> = HashMap::new();
        for &word in &words {
            feature_of.entry(word).or_insert_with(|| {
                features.push(word);
                features.len() - 1
            });
        }

        if features.is_empty() {
            return Err(ExplainError::EmptyText);
        }

        let samples = self.sample(features.len());

        let texts: Vec<String> = samples
            .iter()
            .map(|active| {
                words
                    .iter()
                    .filter(|word| active[feature_of[*word]])
                    .copied()
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();

        let probabilities =
            probability_fn(&texts).map_err(|e| ExplainError::Classifier(e.into()))?;

        if probabilities.len() != samples.len()
            || probabilities.iter().any(|row| row.len() != class_names.len())
        {
            return Err(ExplainError::Shape {
                rows: samples.len(),
                cols: class_names.len(),
            });
        }

        let x: Vec<Vec<f64>> = samples
            .iter()
            .map(|active| active.iter().map(|&on| if on { 1.0 } else { 0.0 }).collect())
            .collect();
        let y: Vec<f64> = probabilities
            .iter()
            .map(|row| f64::from(row[class]))
            .collect();
        let weights: Vec<f64> = samples
            .iter()
            .map(|active| self.kernel(active.iter().filter(|&&on| on).count(), features.len()))
            .collect();

        let ranked = self.select_features(&x, &y, &weights, features.len())?;

        let selected_x: Vec<Vec<f64>> = x
            .iter()
            .map(|row| ranked.iter().map(|&feature| row[feature]).collect())
            .collect();
        let local = weighted_ridge(&selected_x, &y, &weights, SURROGATE_ALPHA)
            .ok_or(ExplainError::Surrogate)?;

        let mut weights: Vec<WordWeight> = ranked
            .iter()
            .zip(&local.coefficients)
            .map(|(&feature, &weight)| WordWeight {
                word: features[feature].to_string(),
                weight: weight as f32,
            })
            .collect();
        weights.sort_by(|a, b| b.weight.abs().total_cmp(&a.weight.abs()));

        Ok(Explanation {
            class,
            class_names: class_names.to_vec(),
            weights,
            intercept: local.intercept as f32,
            score: local.score as f32,
            local_prediction: local.predict(&selected_x[0]) as f32,
            probability: probabilities[0][class],
        })
    }
}
