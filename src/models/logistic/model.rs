use burn::{
    module::Module,
    nn::{Initializer, Linear, LinearConfig},
    tensor::{
        activation::softmax,
        backend::{AutodiffBackend, Backend},
        ElementConversion, Tensor,
    },
};

/// The Model Configuration
#[derive(burn::config::Config, Debug)]
pub struct Config {
    /// Width of the input feature vectors
    pub n_features: usize,

    /// Number of output classes
    #[config(default = 2)]
    pub n_classes: usize,
}

impl Config {
    /// Initialize the model with zeroed weights, so that fitting is deterministic
    pub fn init<B: Backend>(&self, device: &B::Device) -> Model<B> {
        let output = LinearConfig::new(self.n_features, self.n_classes)
            .with_initializer(Initializer::Zeros)
            .init(device);

        Model { output }
    }
}

/// A linear classifier producing one logit per class
#[derive(Module, Debug)]
pub struct Model<B: Backend> {
    /// Weights `[n_features, n_classes]` and per-class bias
    output: Linear<B>,
}

impl<B: Backend> Model<B> {
    /// Defines forward pass, returning `[batch_size, n_classes]` logits
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        self.output.forward(features)
    }

    /// Defines forward pass for inference, returning class probabilities
    pub fn infer(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        softmax(self.forward(features), 1)
    }

    /// The squared L2 norm of the weights. The bias is not penalized.
    ///
    /// With two classes only the difference between the class columns decides the prediction,
    /// so that difference is penalized, matching a binary model with a single weight vector.
    pub fn weight_penalty(&self) -> Tensor<B, 1> {
        let weight = self.output.weight.val();
        let [n_features, n_classes] = weight.dims();

        let effective = if n_classes == 2 {
            weight.clone().slice([0..n_features, 1..2]) - weight.slice([0..n_features, 0..1])
        } else {
            weight
        };

        (effective.clone() * effective).sum()
    }

    /// The input width this model was built for
    pub fn n_features(&self) -> usize {
        self.output.weight.val().dims()[0]
    }
}

impl<B: AutodiffBackend> Model<B> {
    /// The largest absolute partial derivative over every parameter
    pub fn max_gradient(&self, grads: &B::Gradients) -> f64 {
        let weight = self
            .output
            .weight
            .val()
            .grad(grads)
            .map(|grad| grad.abs().max().into_scalar().elem::<f64>());

        let bias = self
            .output
            .bias
            .as_ref()
            .and_then(|bias| bias.val().grad(grads))
            .map(|grad| grad.abs().max().into_scalar().elem::<f64>());

        weight.into_iter().chain(bias).fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use burn::backend::{ndarray::NdArrayDevice, NdArray};
    use pretty_assertions::assert_eq;

    use crate::utils::tensors;

    use super::*;

    #[test]
    fn test_untrained_model_is_uniform() {
        let device = NdArrayDevice::Cpu;
        let model = Config::new(3).init::<NdArray>(&device);

        let features = tensors::densify::<NdArray>(&[vec![(0, 1.0)], vec![(2, 0.5)]], 3, &device);
        let probabilities = tensors::into_rows(model.infer(features));

        assert_eq!(model.n_features(), 3);
        assert_eq!(probabilities, vec![vec![0.5, 0.5], vec![0.5, 0.5]]);
    }

    #[test]
    fn test_binary_penalty_uses_the_column_difference() {
        let device = NdArrayDevice::Cpu;
        let mut model = Config::new(2).init::<NdArray>(&device);

        // Columns (1, 0) and (-1, 2) differ by (-2, 2)
        model.output.weight = model.output.weight.map(|_| {
            Tensor::from_floats([[1.0, -1.0], [0.0, 2.0]], &device)
        });

        let penalty = model.weight_penalty().into_scalar().elem::<f32>();

        assert_eq!(penalty, 8.0);
    }
}
