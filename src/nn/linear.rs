//! Fully connected (dense) layer.

use super::module::Module;
use crate::tensor::Tensor;

/// Linear transformation: `y = x W^T + b`.
///
/// Weight shape is `[out_features, in_features]`, so each row of the weight
/// matrix corresponds to one output channel. Channel pruning removes whole
/// rows.
#[derive(Debug, Clone)]
pub struct Linear {
    weight: Tensor,
    bias: Tensor,
    in_features: usize,
    out_features: usize,
}

impl Linear {
    /// Create a layer with all weights set to zero.
    ///
    /// Initialization schemes are out of scope here; tests and callers set
    /// weights explicitly via [`Linear::with_weight`] or `weight_mut`.
    #[must_use]
    pub fn new(in_features: usize, out_features: usize) -> Self {
        Self {
            weight: Tensor::zeros(&[out_features, in_features]),
            bias: Tensor::zeros(&[out_features]),
            in_features,
            out_features,
        }
    }

    /// Replace the weight matrix.
    ///
    /// # Panics
    ///
    /// Panics if the shape is not `[out_features, in_features]`.
    #[must_use]
    pub fn with_weight(mut self, weight: Tensor) -> Self {
        assert_eq!(
            weight.shape(),
            &[self.out_features, self.in_features],
            "Weight shape {:?} doesn't match layer dims [{}, {}]",
            weight.shape(),
            self.out_features,
            self.in_features
        );
        self.weight = weight;
        self
    }

    /// Replace the bias vector.
    ///
    /// # Panics
    ///
    /// Panics if the shape is not `[out_features]`.
    #[must_use]
    pub fn with_bias(mut self, bias: Tensor) -> Self {
        assert_eq!(bias.shape(), &[self.out_features]);
        self.bias = bias;
        self
    }

    /// Input dimensionality.
    #[must_use]
    pub fn in_features(&self) -> usize {
        self.in_features
    }

    /// Output dimensionality.
    #[must_use]
    pub fn out_features(&self) -> usize {
        self.out_features
    }

    /// The weight matrix.
    #[must_use]
    pub fn weight(&self) -> &Tensor {
        &self.weight
    }

    /// The weight matrix, mutably.
    pub fn weight_mut(&mut self) -> &mut Tensor {
        &mut self.weight
    }

    /// The bias vector.
    #[must_use]
    pub fn bias(&self) -> &Tensor {
        &self.bias
    }
}

impl Module for Linear {
    fn forward(&self, input: &Tensor) -> Tensor {
        let batch = if input.ndim() == 1 {
            1
        } else {
            input.shape()[0]
        };
        let in_f = input.numel() / batch;
        assert_eq!(
            in_f, self.in_features,
            "Input features {} don't match layer in_features {}",
            in_f, self.in_features
        );

        let x = input.data();
        let w = self.weight.data();
        let b = self.bias.data();
        let mut out = vec![0.0f32; batch * self.out_features];
        for bi in 0..batch {
            for o in 0..self.out_features {
                let mut acc = b[o];
                for i in 0..self.in_features {
                    acc += x[bi * self.in_features + i] * w[o * self.in_features + i];
                }
                out[bi * self.out_features + o] = acc;
            }
        }
        Tensor::new(&out, &[batch, self.out_features])
    }

    fn named_parameters(&self) -> Vec<(String, &Tensor)> {
        vec![
            ("weight".to_string(), &self.weight),
            ("bias".to_string(), &self.bias),
        ]
    }

    fn named_parameters_mut(&mut self) -> Vec<(String, &mut Tensor)> {
        vec![
            ("weight".to_string(), &mut self.weight),
            ("bias".to_string(), &mut self.bias),
        ]
    }
}
