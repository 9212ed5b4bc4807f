use crate::derivative::trial_with_derivative;
use crate::equation::Equation;
use crate::model::TrialModel;
use burn::nn::loss::{MseLoss, Reduction};
use burn::prelude::Backend;
use burn::tensor::Tensor;

/// 物理損失を計算します。
///
/// 試行解 `Y = x N(x)` とその微分を方程式に代入した残差 `G(x)` を、
/// 全コロケーション点について二乗和したものを損失として返します。
/// `dY/dx` は計算グラフ上にあるため、返り値の `backward()` でパラメータ勾配が得られます。
pub fn physics_loss<B: Backend, E: Equation>(
    model: &TrialModel<B>,
    equation: &E,
    x: Tensor<B, 2>,
) -> Tensor<B, 1> {
    let residual = residual(model, equation, x);
    MseLoss::new().forward(residual.clone(), residual.zeros_like(), Reduction::Sum)
}

/// 各コロケーション点での残差 `G(x)`（形状 `[nt, 1]`）
pub fn residual<B: Backend, E: Equation>(
    model: &TrialModel<B>,
    equation: &E,
    x: Tensor<B, 2>,
) -> Tensor<B, 2> {
    let trial = trial_with_derivative(model, x.clone());
    equation.residual(x, trial.y, trial.dy_dx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equation::{CosineDriven, Lagaris02};
    use crate::grid::training_grid;
    use crate::model::{column, tensor_values};
    use approx::assert_abs_diff_eq;
    use burn::backend::{Autodiff, NdArray};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    type TestBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn loss_is_sum_of_squared_residuals() {
        let device = Default::default();
        let model = TrialModel::<TestBackend>::new(10, &mut StdRng::seed_from_u64(0), &device);
        let x = column(&training_grid(11), &device);

        let residuals = tensor_values(residual(&model, &Lagaris02, x.clone()));
        let loss = tensor_values(physics_loss(&model, &Lagaris02, x))[0];
        let expected: f32 = residuals.iter().map(|g| g * g).sum();
        assert!(loss >= 0.0);
        assert_abs_diff_eq!(loss, expected, epsilon = 1e-5);
    }

    #[test]
    fn parameter_gradient_matches_finite_difference_of_loss() {
        // dL/dθ は dY/dx を含む損失の微分（2 階の合成）
        let device = Default::default();
        let w = [0.4_f32, -0.7, 1.1];
        let u = [0.0_f32, 0.3, -0.2];
        let v = [0.9_f32, -0.5, 0.25];
        let x = column::<TestBackend>(&training_grid(7), &device);

        let model = TrialModel::<TestBackend>::from_parameters(&w, &u, &v, &device).unwrap();
        let grads = physics_loss(&model, &CosineDriven, x.clone()).backward();
        let analytic = model.parameter_gradients(&grads).unwrap();

        let loss_at = |w: &[f32], u: &[f32], v: &[f32]| -> f64 {
            let model = TrialModel::<TestBackend>::from_parameters(w, u, v, &device).unwrap();
            tensor_values(physics_loss(&model, &CosineDriven, x.clone()))[0] as f64
        };
        let h = 1e-2_f32;
        for j in 0..3 {
            let (mut w_plus, mut w_minus) = (w, w);
            w_plus[j] += h;
            w_minus[j] -= h;
            let dw = (loss_at(&w_plus, &u, &v) - loss_at(&w_minus, &u, &v)) / (2.0 * h as f64);
            assert_abs_diff_eq!(analytic[j] as f64, dw, epsilon = 1e-2);

            let (mut v_plus, mut v_minus) = (v, v);
            v_plus[j] += h;
            v_minus[j] -= h;
            let dv = (loss_at(&w, &u, &v_plus) - loss_at(&w, &u, &v_minus)) / (2.0 * h as f64);
            assert_abs_diff_eq!(analytic[6 + j] as f64, dv, epsilon = 1e-2);
        }
    }
}
