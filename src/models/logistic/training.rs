use burn::{
    module::AutodiffModule,
    nn::loss::CrossEntropyLossConfig,
    optim::{GradientsParams, Optimizer, SgdConfig},
    tensor::{backend::AutodiffBackend, ElementConversion, Int, Tensor},
    LearningRate,
};
use derive_new::new;

use super::{Config, Model};

/// Define configuration struct for fitting
#[derive(burn::config::Config, Debug)]
pub struct FitConfig {
    /// Maximum number of full-batch gradient steps
    #[config(default = 1000)]
    pub max_iter: usize,

    /// Stop once every partial derivative of the objective is smaller than this in magnitude
    #[config(default = 1e-4)]
    pub tolerance: f64,

    /// Inverse regularization strength; smaller values regularize more
    #[config(default = 1.0)]
    pub c: f64,

    /// Step size as a fraction of the largest step that still guarantees descent
    #[config(default = 1.0)]
    pub learning_rate: LearningRate,
}

/// What happened while fitting
#[derive(Clone, Debug, new)]
pub struct FitReport {
    /// Gradient steps actually taken
    pub iterations: usize,

    /// Objective value of the returned model
    pub loss: f64,

    /// Whether the gradient fell below the tolerance before `max_iter`
    pub converged: bool,
}

/// Fit logistic regression on dense features against class ids.
///
/// Minimizes mean cross-entropy plus `||W||^2 / (2 * C * n)` by full-batch gradient descent from
/// zero weights, and returns the fitted model on the inner (non-autodiff) backend.
///
/// The objective is smooth with curvature at most `(max ||x||^2 + 1) / 2 + 2 / (C * n)`, so a
/// step of `learning_rate` over that bound never increases the loss for `learning_rate <= 1`.
/// Fitting stops at a stationary point, when the largest partial derivative drops below
/// `tolerance`.
pub fn fit<B: AutodiffBackend>(
    config: &Config,
    fit_config: &FitConfig,
    features: Tensor<B, 2>,
    targets: Tensor<B, 1, Int>,
    device: &B::Device,
) -> (Model<B::InnerBackend>, FitReport) {
    let [n_samples, _] = features.dims();
    let n_samples = n_samples.max(1) as f64;
    let penalty_scale = 1.0 / (2.0 * fit_config.c * n_samples);

    let max_norm = (features.clone() * features.clone())
        .sum_dim(1)
        .max()
        .into_scalar()
        .elem::<f64>();
    let smoothness = (max_norm + 1.0) / 2.0 + 2.0 / (fit_config.c * n_samples);
    let step = fit_config.learning_rate / smoothness;

    let mut model: Model<B> = config.init(device);
    let mut optim = SgdConfig::new().init();
    let loss_fn = CrossEntropyLossConfig::new().init(device);

    let mut report = FitReport::new(0, f64::INFINITY, false);

    for iteration in 0..=fit_config.max_iter {
        let logits = model.forward(features.clone());
        let loss = loss_fn.forward(logits, targets.clone())
            + model.weight_penalty().mul_scalar(penalty_scale);

        let value = loss.clone().into_scalar().elem::<f64>();

        let grads = loss.backward();
        let gradient = model.max_gradient(&grads);

        log::debug!("iteration {iteration}: loss {value:.6}, max gradient {gradient:.2e}");

        report = FitReport::new(iteration, value, gradient < fit_config.tolerance);

        if report.converged || iteration == fit_config.max_iter {
            break;
        }

        let grads = GradientsParams::from_grads(grads, &model);
        model = optim.step(step, model, grads);
    }

    if !report.converged {
        log::warn!(
            "Stopped after {} iterations without converging (loss {:.6})",
            report.iterations,
            report.loss
        );
    }

    (model.valid(), report)
}

#[cfg(test)]
mod tests {
    use burn::backend::{ndarray::NdArrayDevice, Autodiff, NdArray};
    use pretty_assertions::assert_eq;

    use crate::{pipelines::text_classification::TfidfVectorizer, utils::tensors};

    use super::*;

    type B = Autodiff<NdArray>;

    const ARTICLES: [(&str, usize); 12] = [
        ("senate failed pass budget bill government shutdown looms", 1),
        ("shocking celebrity scandal rocks hollywood fans stunned", 0),
        ("us open tennis results long week matches", 1),
        ("breaking celebrity scandal shocks fans", 0),
        ("senate passed budget bill narrow vote", 1),
        ("doctors hate secret cure shocking scandal hide fans", 0),
        ("senate committee reviews infrastructure bill vote", 1),
        ("aliens endorse celebrity shocking fans breaking scandal", 0),
        ("governor signed state budget legislature vote bill", 1),
        ("breaking celebrity secret exposed fans shocked scandal", 0),
        ("senate debates tax bill vote expected next week", 1),
        ("celebrity miracle diet scandal shocks fans doctors stunned", 0),
    ];

    /// TF-IDF features and class ids for a small news corpus
    fn articles(device: &NdArrayDevice) -> (Config, Tensor<B, 2>, Tensor<B, 1, Int>) {
        let texts: Vec<&str> = ARTICLES.iter().map(|(text, _)| *text).collect();
        let labels: Vec<usize> = ARTICLES.iter().map(|(_, label)| *label).collect();

        let mut vectorizer = TfidfVectorizer::default();
        let rows = vectorizer.fit_transform(&texts).expect("fit");
        let n_features = vectorizer.vocabulary_size();

        (
            Config::new(n_features),
            tensors::densify::<B>(&rows, n_features, device),
            tensors::class_ids::<B>(&labels, device),
        )
    }

    #[test]
    fn test_fit_separable_classes() {
        let device = NdArrayDevice::Cpu;

        let rows = vec![
            vec![(0, 1.0)],
            vec![(0, 0.8), (2, 0.6)],
            vec![(1, 1.0)],
            vec![(1, 0.8), (2, 0.6)],
        ];
        let features = tensors::densify::<B>(&rows, 3, &device);
        let targets = tensors::class_ids::<B>(&[0, 0, 1, 1], &device);

        let (model, report) = fit::<B>(
            &Config::new(3),
            &FitConfig::new(),
            features,
            targets,
            &device,
        );

        assert!(report.iterations > 1);
        assert!(report.loss < std::f64::consts::LN_2);

        let probabilities = tensors::into_rows(model.infer(tensors::densify::<NdArray>(
            &[vec![(0, 1.0)], vec![(1, 1.0)]],
            3,
            &device,
        )));

        assert!(probabilities[0][0] > probabilities[0][1]);
        assert!(probabilities[1][1] > probabilities[1][0]);
    }

    #[test]
    fn test_default_fit_reaches_the_optimum() {
        let device = NdArrayDevice::Cpu;
        let (config, features, targets) = articles(&device);

        let (_, report) = fit::<B>(
            &config,
            &FitConfig::new(),
            features.clone(),
            targets.clone(),
            &device,
        );
        let (_, optimum) = fit::<B>(
            &config,
            &FitConfig::new().with_tolerance(0.0).with_max_iter(2000),
            features,
            targets,
            &device,
        );

        assert!(report.converged);
        assert!(report.iterations < 1000);
        assert!(!optimum.converged);
        assert!(
            (report.loss - optimum.loss).abs() < 1e-4,
            "stopped at {} but the optimum is {}",
            report.loss,
            optimum.loss
        );
    }

    #[test]
    fn test_loss_never_increases() {
        let device = NdArrayDevice::Cpu;
        let (config, features, targets) = articles(&device);

        let losses: Vec<f64> = [5, 10, 20, 25, 26, 27, 30, 60, 120]
            .into_iter()
            .map(|max_iter| {
                let fit_config = FitConfig::new().with_tolerance(0.0).with_max_iter(max_iter);
                let (_, report) =
                    fit::<B>(&config, &fit_config, features.clone(), targets.clone(), &device);

                assert_eq!(report.iterations, max_iter);
                assert!(!report.converged);

                report.loss
            })
            .collect();

        for pair in losses.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-6, "loss rose from {} to {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_early_stop_is_not_convergence() {
        let device = NdArrayDevice::Cpu;
        let (config, features, targets) = articles(&device);

        let (_, report) = fit::<B>(
            &config,
            &FitConfig::new().with_max_iter(3),
            features,
            targets,
            &device,
        );

        assert_eq!(report.iterations, 3);
        assert!(!report.converged);
    }
}
