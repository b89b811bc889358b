use agri_core::{AgriError, ErrorInfo, RngHandle};
use nalgebra::{DMatrix, DVector};
use rand::Rng;
use serde::{Deserialize, Serialize};

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn glorot(rows: usize, cols: usize, rng: &mut RngHandle) -> DMatrix<f64> {
    let limit = (6.0 / (rows + cols) as f64).sqrt();
    DMatrix::from_fn(rows, cols, |_, _| rng.inner_mut().gen_range(-limit..=limit))
}

/// One gated recurrent layer.
///
/// `z = σ(Wz·x + Uz·h + bz)`, `r = σ(Wr·x + Ur·h + br)`,
/// `n = tanh(Wn·x + bn + r ⊙ (Un·h))`, `h' = (1 − z) ⊙ n + z ⊙ h`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GruLayer {
    w_z: DMatrix<f64>,
    u_z: DMatrix<f64>,
    b_z: DVector<f64>,
    w_r: DMatrix<f64>,
    u_r: DMatrix<f64>,
    b_r: DVector<f64>,
    w_n: DMatrix<f64>,
    u_n: DMatrix<f64>,
    b_n: DVector<f64>,
}

struct StepCache {
    x: DVector<f64>,
    h_prev: DVector<f64>,
    z: DVector<f64>,
    r: DVector<f64>,
    n: DVector<f64>,
    uh_n: DVector<f64>,
    h: DVector<f64>,
}

impl GruLayer {
    fn new(input: usize, hidden: usize, rng: &mut RngHandle) -> Self {
        Self {
            w_z: glorot(hidden, input, rng),
            u_z: glorot(hidden, hidden, rng),
            b_z: DVector::zeros(hidden),
            w_r: glorot(hidden, input, rng),
            u_r: glorot(hidden, hidden, rng),
            b_r: DVector::zeros(hidden),
            w_n: glorot(hidden, input, rng),
            u_n: glorot(hidden, hidden, rng),
            b_n: DVector::zeros(hidden),
        }
    }

    fn zeros_like(&self) -> Self {
        let zm = |m: &DMatrix<f64>| DMatrix::zeros(m.nrows(), m.ncols());
        let zv = |v: &DVector<f64>| DVector::zeros(v.len());
        Self {
            w_z: zm(&self.w_z),
            u_z: zm(&self.u_z),
            b_z: zv(&self.b_z),
            w_r: zm(&self.w_r),
            u_r: zm(&self.u_r),
            b_r: zv(&self.b_r),
            w_n: zm(&self.w_n),
            u_n: zm(&self.u_n),
            b_n: zv(&self.b_n),
        }
    }

    fn hidden(&self) -> usize {
        self.b_z.len()
    }

    fn input(&self) -> usize {
        self.w_z.ncols()
    }

    fn step(&self, x: &DVector<f64>, h_prev: &DVector<f64>) -> StepCache {
        let z = (&self.w_z * x + &self.u_z * h_prev + &self.b_z).map(sigmoid);
        let r = (&self.w_r * x + &self.u_r * h_prev + &self.b_r).map(sigmoid);
        let uh_n = &self.u_n * h_prev;
        let n = (&self.w_n * x + &self.b_n + r.component_mul(&uh_n)).map(f64::tanh);
        let h = z.component_mul(h_prev) + z.map(|v| 1.0 - v).component_mul(&n);
        StepCache {
            x: x.clone(),
            h_prev: h_prev.clone(),
            z,
            r,
            n,
            uh_n,
            h,
        }
    }

    /// Backpropagates through every step; returns the gradient on each input.
    fn backward(
        &self,
        steps: &[StepCache],
        d_outputs: &[DVector<f64>],
        grads: &mut GruLayer,
    ) -> Vec<DVector<f64>> {
        let mut d_inputs = vec![DVector::zeros(self.input()); steps.len()];
        let mut dh_next = DVector::zeros(self.hidden());
        for t in (0..steps.len()).rev() {
            let cache = &steps[t];
            let dh = &d_outputs[t] + &dh_next;

            let dn = dh.component_mul(&cache.z.map(|v| 1.0 - v));
            let dz = dh.component_mul(&(&cache.h_prev - &cache.n));
            let dan = dn.component_mul(&cache.n.map(|v| 1.0 - v * v));
            let daz = dz.component_mul(&cache.z.map(|v| v * (1.0 - v)));
            let dr = dan.component_mul(&cache.uh_n);
            let dar = dr.component_mul(&cache.r.map(|v| v * (1.0 - v)));
            let dan_r = dan.component_mul(&cache.r);

            grads.w_z.ger(1.0, &daz, &cache.x, 1.0);
            grads.u_z.ger(1.0, &daz, &cache.h_prev, 1.0);
            grads.b_z += &daz;
            grads.w_r.ger(1.0, &dar, &cache.x, 1.0);
            grads.u_r.ger(1.0, &dar, &cache.h_prev, 1.0);
            grads.b_r += &dar;
            grads.w_n.ger(1.0, &dan, &cache.x, 1.0);
            grads.u_n.ger(1.0, &dan_r, &cache.h_prev, 1.0);
            grads.b_n += &dan;

            d_inputs[t] =
                self.w_z.tr_mul(&daz) + self.w_r.tr_mul(&dar) + self.w_n.tr_mul(&dan);
            dh_next = dh.component_mul(&cache.z)
                + self.u_z.tr_mul(&daz)
                + self.u_r.tr_mul(&dar)
                + self.u_n.tr_mul(&dan_r);
        }
        d_inputs
    }

    fn params(&self) -> [&[f64]; 9] {
        [
            self.w_z.as_slice(),
            self.u_z.as_slice(),
            self.b_z.as_slice(),
            self.w_r.as_slice(),
            self.u_r.as_slice(),
            self.b_r.as_slice(),
            self.w_n.as_slice(),
            self.u_n.as_slice(),
            self.b_n.as_slice(),
        ]
    }

    fn params_mut(&mut self) -> [&mut [f64]; 9] {
        [
            self.w_z.as_mut_slice(),
            self.u_z.as_mut_slice(),
            self.b_z.as_mut_slice(),
            self.w_r.as_mut_slice(),
            self.u_r.as_mut_slice(),
            self.b_r.as_mut_slice(),
            self.w_n.as_mut_slice(),
            self.u_n.as_mut_slice(),
            self.b_n.as_mut_slice(),
        ]
    }
}

struct LayerTrace {
    steps: Vec<StepCache>,
    masks: Option<Vec<DVector<f64>>>,
}

/// Cached activations of one training forward pass.
pub(crate) struct Trace {
    layers: Vec<LayerTrace>,
    top: DVector<f64>,
    /// Network output for the window.
    pub(crate) output: DVector<f64>,
}

/// Stacked GRU layers followed by a dense projection of the last hidden state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurrentNetwork {
    layers: Vec<GruLayer>,
    head_w: DMatrix<f64>,
    head_b: DVector<f64>,
    dropout: f64,
}

impl RecurrentNetwork {
    /// Builds a freshly initialised network.
    pub fn new(
        input_width: usize,
        hidden_sizes: &[usize],
        outputs: usize,
        dropout: f64,
        rng: &mut RngHandle,
    ) -> Result<Self, AgriError> {
        if input_width == 0 || outputs == 0 || hidden_sizes.is_empty() || hidden_sizes.contains(&0)
        {
            return Err(AgriError::Training(
                ErrorInfo::new("network-shape", "network dimensions must be non-zero")
                    .with_context("input", input_width)
                    .with_context("outputs", outputs)
                    .with_context("layers", hidden_sizes.len()),
            ));
        }
        let mut layers = Vec::with_capacity(hidden_sizes.len());
        let mut width = input_width;
        for &hidden in hidden_sizes {
            layers.push(GruLayer::new(width, hidden, rng));
            width = hidden;
        }
        Ok(Self {
            layers,
            head_w: glorot(outputs, width, rng),
            head_b: DVector::zeros(outputs),
            dropout,
        })
    }

    /// Width of each input step.
    pub fn input_width(&self) -> usize {
        self.layers.first().map(GruLayer::input).unwrap_or(0)
    }

    /// Width of the prediction.
    pub fn output_width(&self) -> usize {
        self.head_b.len()
    }

    /// Predicts the next target vector from a window of input rows.
    pub fn predict(&self, window: &[Vec<f64>]) -> Result<Vec<f64>, AgriError> {
        let width = self.input_width();
        if window.is_empty() {
            return Err(AgriError::Evaluation(ErrorInfo::new(
                "empty-window",
                "cannot predict from an empty window",
            )));
        }
        if let Some(row) = window.iter().find(|row| row.len() != width) {
            return Err(AgriError::Evaluation(
                ErrorInfo::new("window-width", "window row width does not match the network")
                    .with_context("expected", width)
                    .with_context("actual", row.len()),
            ));
        }
        let seq: Vec<DVector<f64>> = window
            .iter()
            .map(|row| DVector::from_column_slice(row))
            .collect();
        Ok(self.forward(&seq, None).output.as_slice().to_vec())
    }

    /// Forward pass; dropout masks are drawn only when `dropout_rng` is set.
    pub(crate) fn forward(
        &self,
        seq: &[DVector<f64>],
        mut dropout_rng: Option<&mut RngHandle>,
    ) -> Trace {
        let mut inputs: Vec<DVector<f64>> = seq.to_vec();
        let mut layers = Vec::with_capacity(self.layers.len());
        for layer in &self.layers {
            let mut h = DVector::zeros(layer.hidden());
            let mut steps = Vec::with_capacity(inputs.len());
            for x in &inputs {
                let cache = layer.step(x, &h);
                h = cache.h.clone();
                steps.push(cache);
            }
            let masks = match dropout_rng.as_mut() {
                Some(rng) if self.dropout > 0.0 => {
                    Some(self.sample_masks(rng, steps.len(), layer.hidden()))
                }
                _ => None,
            };
            inputs = match &masks {
                Some(masks) => steps
                    .iter()
                    .zip(masks)
                    .map(|(cache, mask)| cache.h.component_mul(mask))
                    .collect(),
                None => steps.iter().map(|cache| cache.h.clone()).collect(),
            };
            layers.push(LayerTrace { steps, masks });
        }
        let top = inputs
            .pop()
            .unwrap_or_else(|| DVector::zeros(self.head_w.ncols()));
        let output = &self.head_w * &top + &self.head_b;
        Trace {
            layers,
            top,
            output,
        }
    }

    fn sample_masks(&self, rng: &mut RngHandle, steps: usize, hidden: usize) -> Vec<DVector<f64>> {
        let keep = 1.0 - self.dropout;
        (0..steps)
            .map(|_| {
                DVector::from_fn(hidden, |_, _| {
                    if rng.chance(keep) {
                        1.0 / keep
                    } else {
                        0.0
                    }
                })
            })
            .collect()
    }

    /// Accumulates parameter gradients for `d_output = ∂loss/∂output` into `grads`.
    pub(crate) fn backward(&self, trace: &Trace, d_output: &DVector<f64>, grads: &mut Self) {
        grads.head_w.ger(1.0, d_output, &trace.top, 1.0);
        grads.head_b += d_output;

        let steps = trace.layers.last().map(|l| l.steps.len()).unwrap_or(0);
        let top_hidden = self.head_w.ncols();
        let mut d_outputs = vec![DVector::zeros(top_hidden); steps];
        if let Some(last) = d_outputs.last_mut() {
            *last = self.head_w.tr_mul(d_output);
        }

        for (idx, layer) in self.layers.iter().enumerate().rev() {
            let layer_trace = &trace.layers[idx];
            if let Some(masks) = &layer_trace.masks {
                for (d, mask) in d_outputs.iter_mut().zip(masks) {
                    d.component_mul_assign(mask);
                }
            }
            d_outputs = layer.backward(&layer_trace.steps, &d_outputs, &mut grads.layers[idx]);
        }
    }

    /// Network of the same shape with every parameter set to zero.
    pub(crate) fn zeros_like(&self) -> Self {
        Self {
            layers: self.layers.iter().map(GruLayer::zeros_like).collect(),
            head_w: DMatrix::zeros(self.head_w.nrows(), self.head_w.ncols()),
            head_b: DVector::zeros(self.head_b.len()),
            dropout: self.dropout,
        }
    }

    fn params(&self) -> Vec<&[f64]> {
        let mut out: Vec<&[f64]> = self.layers.iter().flat_map(GruLayer::params).collect();
        out.push(self.head_w.as_slice());
        out.push(self.head_b.as_slice());
        out
    }

    fn params_mut(&mut self) -> Vec<&mut [f64]> {
        let mut out: Vec<&mut [f64]> = self
            .layers
            .iter_mut()
            .flat_map(GruLayer::params_mut)
            .collect();
        out.push(self.head_w.as_mut_slice());
        out.push(self.head_b.as_mut_slice());
        out
    }

    /// Total parameter count.
    pub fn parameter_count(&self) -> usize {
        self.params().iter().map(|p| p.len()).sum()
    }

    /// Rescales gradients so their global L2 norm does not exceed `max_norm`.
    ///
    /// Returns the norm before clipping.
    pub(crate) fn clip_global_norm(&mut self, max_norm: f64) -> f64 {
        let norm = self
            .params()
            .iter()
            .flat_map(|p| p.iter())
            .map(|g| g * g)
            .sum::<f64>()
            .sqrt();
        if max_norm > 0.0 && norm > max_norm {
            let factor = max_norm / norm;
            for slice in self.params_mut() {
                slice.iter_mut().for_each(|g| *g *= factor);
            }
        }
        norm
    }
}

/// Adam optimiser state over the parameters of a [`RecurrentNetwork`].
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    step: i32,
    m: Vec<Vec<f64>>,
    v: Vec<Vec<f64>>,
}

impl Adam {
    /// Creates an optimiser with zeroed moment estimates.
    pub fn new(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            step: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    /// Applies one update of `params` along `grads`.
    pub fn step(&mut self, params: &mut RecurrentNetwork, grads: &RecurrentNetwork) {
        let grads = grads.params();
        if self.m.is_empty() {
            self.m = grads.iter().map(|g| vec![0.0; g.len()]).collect();
            self.v = self.m.clone();
        }
        self.step += 1;
        let bias1 = 1.0 - self.beta1.powi(self.step);
        let bias2 = 1.0 - self.beta2.powi(self.step);
        let rate = self.learning_rate * bias2.sqrt() / bias1;

        for (((param, grad), m), v) in params
            .params_mut()
            .into_iter()
            .zip(grads)
            .zip(self.m.iter_mut())
            .zip(self.v.iter_mut())
        {
            for idx in 0..param.len() {
                let g = grad[idx];
                m[idx] = self.beta1 * m[idx] + (1.0 - self.beta1) * g;
                v[idx] = self.beta2 * v[idx] + (1.0 - self.beta2) * g * g;
                param[idx] -= rate * m[idx] / (v[idx].sqrt() + self.epsilon);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loss(network: &RecurrentNetwork, seq: &[DVector<f64>], target: &DVector<f64>) -> f64 {
        0.5 * (network.forward(seq, None).output - target).norm_squared()
    }

    #[test]
    fn backward_matches_finite_differences() {
        let mut rng = RngHandle::from_seed(11);
        let network = RecurrentNetwork::new(3, &[4, 3], 2, 0.0, &mut rng).unwrap();
        let seq: Vec<DVector<f64>> = (0..5)
            .map(|_| DVector::from_fn(3, |_, _| rng.unit() * 2.0 - 1.0))
            .collect();
        let target = DVector::from_vec(vec![0.3, -0.7]);

        let trace = network.forward(&seq, None);
        let mut grads = network.zeros_like();
        network.backward(&trace, &(&trace.output - &target), &mut grads);
        let analytic: Vec<Vec<f64>> = grads.params().iter().map(|p| p.to_vec()).collect();

        let eps = 1e-6;
        for (slot, expected) in analytic.iter().enumerate() {
            for idx in 0..expected.len() {
                let mut plus = network.clone();
                plus.params_mut()[slot][idx] += eps;
                let mut minus = network.clone();
                minus.params_mut()[slot][idx] -= eps;
                let numeric = (loss(&plus, &seq, &target) - loss(&minus, &seq, &target)) / (2.0 * eps);
                let diff = (numeric - expected[idx]).abs();
                assert!(
                    diff < 1e-6 + 1e-4 * numeric.abs(),
                    "slot {slot} idx {idx}: numeric {numeric} analytic {}",
                    expected[idx]
                );
            }
        }
    }

    #[test]
    fn clipping_bounds_the_global_norm() {
        let mut rng = RngHandle::from_seed(5);
        let network = RecurrentNetwork::new(2, &[3], 1, 0.0, &mut rng).unwrap();
        let mut grads = network.clone();
        let before = grads.clip_global_norm(0.5);
        assert!(before > 0.5);
        let after = grads.clip_global_norm(0.0);
        assert!((after - 0.5).abs() < 1e-9);
    }

    #[test]
    fn inference_ignores_dropout() {
        let mut rng = RngHandle::from_seed(3);
        let network = RecurrentNetwork::new(2, &[4], 1, 0.5, &mut rng).unwrap();
        let window = vec![vec![0.1, 0.2]; 12];
        assert_eq!(network.predict(&window).unwrap(), network.predict(&window).unwrap());
        assert!(network.predict(&[vec![0.1]]).is_err());
    }
}
