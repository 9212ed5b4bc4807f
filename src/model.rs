use crate::error::{PinnError, Result};
use burn::module::{Module, Param};
use burn::prelude::Backend;
use burn::tensor::Tensor;
use burn::tensor::activation::sigmoid;
use burn::tensor::backend::AutodiffBackend;
use rand::Rng;
use rand::rngs::StdRng;

/// 試行解の中身となる 1 隠れ層ネットワーク。
///
/// スカラー入力 x に対して `N(x) = v · σ(w x + u)` を計算します（出力層にバイアスはありません）。
/// 試行解は `Y(x) = x N(x)` で、どのようなパラメータでも `Y(0) = 0` を満たします。
#[derive(Module, Debug)]
pub struct TrialModel<B: Backend> {
    /// 入力から隠れ層への重み（形状 `[1, H]`）
    w: Param<Tensor<B, 2>>,
    /// 隠れ層のバイアス（形状 `[H]`）
    u: Param<Tensor<B, 1>>,
    /// 隠れ層から出力への重み（形状 `[H, 1]`）
    v: Param<Tensor<B, 2>>,
}

impl<B: Backend> TrialModel<B> {
    /// 新しいモデルを初期化します。
    ///
    /// `w` と `v` は Glorot 一様分布 `U(-a, a)`, `a = sqrt(6 / (1 + H))` から、
    /// `u` はゼロで初期化します。乱数は呼び出し側の `rng` からのみ引きます。
    pub fn new(hidden_units: usize, rng: &mut StdRng, device: &B::Device) -> Self {
        let limit = (6.0 / (1.0 + hidden_units as f32)).sqrt();
        let w: Vec<f32> = (0..hidden_units)
            .map(|_| rng.random_range(-limit..limit))
            .collect();
        let v: Vec<f32> = (0..hidden_units)
            .map(|_| rng.random_range(-limit..limit))
            .collect();
        Self::build(&w, &vec![0.0; hidden_units], &v, device)
    }

    /// すべてのパラメータがゼロのモデル。保存済みモデルを読み込む際の器として使います。
    pub fn zeros(hidden_units: usize, device: &B::Device) -> Self {
        let zeros = vec![0.0; hidden_units];
        Self::build(&zeros, &zeros, &zeros, device)
    }

    /// 明示的なパラメータ値からモデルを構築します。
    pub fn from_parameters(w: &[f32], u: &[f32], v: &[f32], device: &B::Device) -> Result<Self> {
        if w.is_empty() {
            return Err(PinnError::InvalidConfig(
                "隠れユニットが 0 個のモデルは構築できません".to_string(),
            ));
        }
        for (what, values) in [("u", u), ("v", v)] {
            if values.len() != w.len() {
                return Err(PinnError::DimensionMismatch {
                    what,
                    expected: w.len(),
                    actual: values.len(),
                });
            }
        }
        Ok(Self::build(w, u, v, device))
    }

    fn build(w: &[f32], u: &[f32], v: &[f32], device: &B::Device) -> Self {
        let h = w.len();
        Self {
            w: Param::from_tensor(Tensor::<B, 1>::from_floats(w, device).reshape([1, h])),
            u: Param::from_tensor(Tensor::<B, 1>::from_floats(u, device)),
            v: Param::from_tensor(Tensor::<B, 1>::from_floats(v, device).reshape([h, 1])),
        }
    }

    /// 隠れ層のユニット数 H
    pub fn hidden_units(&self) -> usize {
        self.u.val().dims()[0]
    }

    /// 隠れ層の活性化前の値 `z = x w + u`（形状 `[nt, H]`）
    pub fn pre_activation(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        x.matmul(self.w.val()) + self.u.val().unsqueeze::<2>()
    }

    /// ネットワーク出力 `N(x)` を計算します（形状 `[nt, 1]`）。
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        sigmoid(self.pre_activation(x)).matmul(self.v.val())
    }

    /// 試行解 `Y(x) = x N(x)`
    pub fn trial(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        x.clone() * self.forward(x)
    }

    pub fn input_weights(&self) -> Tensor<B, 2> {
        self.w.val()
    }

    pub fn output_weights(&self) -> Tensor<B, 2> {
        self.v.val()
    }

    /// パラメータを `[w | u | v]` の順に平坦化したスナップショット（長さ 3H）
    pub fn parameters(&self) -> Vec<f32> {
        let mut flat = tensor_values(self.w.val());
        flat.extend(tensor_values(self.u.val()));
        flat.extend(tensor_values(self.v.val()));
        flat
    }
}

impl<B: AutodiffBackend> TrialModel<B> {
    /// 逆伝播結果から各パラメータの勾配を `[w | u | v]` の順に平坦化して取り出します。
    pub fn parameter_gradients(&self, grads: &B::Gradients) -> Result<Vec<f32>> {
        let mut flat = Vec::with_capacity(3 * self.hidden_units());
        flat.extend(
            self.w
                .val()
                .grad(grads)
                .map(tensor_values)
                .ok_or(PinnError::MissingGradient("w"))?,
        );
        flat.extend(
            self.u
                .val()
                .grad(grads)
                .map(tensor_values)
                .ok_or(PinnError::MissingGradient("u"))?,
        );
        flat.extend(
            self.v
                .val()
                .grad(grads)
                .map(tensor_values)
                .ok_or(PinnError::MissingGradient("v"))?,
        );
        Ok(flat)
    }

    /// 勾配がすべて有限値であることを確認します。
    pub fn ensure_finite_gradients(&self, grads: &B::Gradients, epoch: usize) -> Result<()> {
        let h = self.hidden_units();
        let flat = self.parameter_gradients(grads)?;
        if let Some(index) = flat.iter().position(|g| !g.is_finite()) {
            let parameter = ["w", "u", "v"][index / h];
            return Err(PinnError::NonFiniteGradient { epoch, parameter });
        }
        Ok(())
    }
}

/// テンソルの値を `f32` のベクタとして取り出します。
pub fn tensor_values<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Vec<f32> {
    tensor.into_data().iter::<f32>().collect()
}

/// スカラー列を `[n, 1]` の列テンソルに変換します。
pub fn column<B: Backend>(values: &[f32], device: &B::Device) -> Tensor<B, 2> {
    Tensor::<B, 1>::from_floats(values, device).reshape([values.len(), 1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use burn::backend::NdArray;
    use rand::SeedableRng;

    type TestBackend = NdArray<f32>;

    fn logistic(z: f32) -> f32 {
        1.0 / (1.0 + (-z).exp())
    }

    #[test]
    fn trial_solution_vanishes_at_origin_for_any_parameters() {
        let device = Default::default();
        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let model = TrialModel::<TestBackend>::new(10, &mut rng, &device);
            let y = tensor_values(model.trial(column(&[0.0], &device)));
            assert_eq!(y, vec![0.0]);
        }
    }

    #[test]
    fn forward_matches_hand_computed_network() {
        let device = Default::default();
        let (w, u, v) = ([0.5, -1.0], [0.1, 0.2], [2.0, -0.5]);
        let model = TrialModel::<TestBackend>::from_parameters(&w, &u, &v, &device).unwrap();
        let xs = [0.0_f32, 0.3, 1.0];

        let n = tensor_values(model.forward(column(&xs, &device)));
        let y = tensor_values(model.trial(column(&xs, &device)));
        for (i, &x) in xs.iter().enumerate() {
            let expected: f32 = (0..2).map(|j| v[j] * logistic(w[j] * x + u[j])).sum();
            assert_abs_diff_eq!(n[i], expected, epsilon = 1e-6);
            assert_abs_diff_eq!(y[i], x * expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn snapshot_is_w_then_u_then_v() {
        let device = Default::default();
        let model = TrialModel::<TestBackend>::from_parameters(
            &[1.0, 2.0],
            &[3.0, 4.0],
            &[5.0, 6.0],
            &device,
        )
        .unwrap();
        assert_eq!(model.hidden_units(), 2);
        assert_eq!(model.parameters(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn initialization_is_seeded_and_bounded() {
        let device = Default::default();
        let a = TrialModel::<TestBackend>::new(10, &mut StdRng::seed_from_u64(7), &device);
        let b = TrialModel::<TestBackend>::new(10, &mut StdRng::seed_from_u64(7), &device);
        let c = TrialModel::<TestBackend>::new(10, &mut StdRng::seed_from_u64(8), &device);
        assert_eq!(a.parameters(), b.parameters());
        assert_ne!(a.parameters(), c.parameters());

        let limit = (6.0_f32 / 11.0).sqrt();
        let params = a.parameters();
        assert_eq!(params.len(), 30);
        assert!(params[..10].iter().all(|w| w.abs() <= limit));
        assert!(params[10..20].iter().all(|&u| u == 0.0));
        assert!(params[20..].iter().all(|v| v.abs() <= limit));
    }

    #[test]
    fn mismatched_parameter_lengths_are_rejected() {
        let device = Default::default();
        let result =
            TrialModel::<TestBackend>::from_parameters(&[1.0, 2.0], &[0.0], &[1.0, 1.0], &device);
        assert!(matches!(
            result,
            Err(PinnError::DimensionMismatch {
                what: "u",
                expected: 2,
                actual: 1
            })
        ));
    }
}
