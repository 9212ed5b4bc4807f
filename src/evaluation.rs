//! 学習済みモデルの評価と、解析解との比較。

use crate::derivative::{TrialDerivative, trial_input_gradient, trial_with_derivative};
use crate::equation::Equation;
use crate::error::{PinnError, Result};
use crate::model::{TrialModel, column, tensor_values};
use burn::prelude::Backend;
use burn::tensor::backend::AutodiffBackend;

/// 解析値と、学習結果との点ごとの誤差（学習値 − 解析値）。
#[derive(Debug, Clone)]
pub struct Comparison {
    pub analytic: Vec<f32>,
    pub error: Vec<f32>,
}

impl Comparison {
    fn new(points: &[f32], trained: &[f32], reference: fn(f64) -> f64) -> Self {
        let analytic: Vec<f32> = points
            .iter()
            .map(|&x| reference(x as f64) as f32)
            .collect();
        let error = trained
            .iter()
            .zip(analytic.iter())
            .map(|(t, a)| t - a)
            .collect();
        Self { analytic, error }
    }

    pub fn max_abs_error(&self) -> f32 {
        self.error.iter().fold(0.0, |acc, e| acc.max(e.abs()))
    }

    pub fn rms_error(&self) -> f32 {
        if self.error.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.error.iter().map(|e| e * e).sum();
        (sum / self.error.len() as f32).sqrt()
    }
}

/// 評価点ごとの試行解 `Yt` と `dYt/dx`。
///
/// 方程式が解析解・解析導関数を持つ場合にのみ、それぞれ独立に比較結果を持ちます。
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub points: Vec<f32>,
    pub solution: Vec<f32>,
    pub derivative: Vec<f32>,
    solution_reference: Option<Comparison>,
    derivative_reference: Option<Comparison>,
}

impl Evaluation {
    pub fn new<E: Equation>(
        equation: &E,
        points: Vec<f32>,
        solution: Vec<f32>,
        derivative: Vec<f32>,
    ) -> Result<Self> {
        for (what, values) in [("solution", &solution), ("derivative", &derivative)] {
            if values.len() != points.len() {
                return Err(PinnError::DimensionMismatch {
                    what,
                    expected: points.len(),
                    actual: values.len(),
                });
            }
        }
        let solution_reference = equation
            .analytic_solution()
            .map(|f| Comparison::new(&points, &solution, f));
        let derivative_reference = equation
            .analytic_derivative()
            .map(|f| Comparison::new(&points, &derivative, f));
        Ok(Self {
            points,
            solution,
            derivative,
            solution_reference,
            derivative_reference,
        })
    }

    fn from_trial<B: Backend, E: Equation>(
        equation: &E,
        points: &[f32],
        trial: TrialDerivative<B>,
    ) -> Result<Self> {
        Self::new(
            equation,
            points.to_vec(),
            tensor_values(trial.y),
            tensor_values(trial.dy_dx),
        )
    }

    /// 解析解との比較。方程式が解析解を持たなければ `MissingOracleCapability`。
    pub fn solution_comparison(&self) -> Result<&Comparison> {
        self.solution_reference
            .as_ref()
            .ok_or(PinnError::MissingOracleCapability("analytic_solution"))
    }

    /// 解析導関数との比較。方程式が解析導関数を持たなければ `MissingOracleCapability`。
    pub fn derivative_comparison(&self) -> Result<&Comparison> {
        self.derivative_reference
            .as_ref()
            .ok_or(PinnError::MissingOracleCapability("analytic_derivative"))
    }
}

/// 学習直後の評価。`dN/dx` は逆伝播で求めます。
pub fn evaluate<B: AutodiffBackend, E: Equation>(
    model: &TrialModel<B>,
    equation: &E,
    points: &[f32],
    device: &B::Device,
) -> Result<Evaluation> {
    let trial = trial_input_gradient(model, column(points, device))?;
    Evaluation::from_trial(equation, points, trial)
}

/// 自動微分を持たないバックエンドでの評価。`dY/dx` は接ベクトルの伝播で求めます。
pub fn evaluate_forward<B: Backend, E: Equation>(
    model: &TrialModel<B>,
    equation: &E,
    points: &[f32],
    device: &B::Device,
) -> Result<Evaluation> {
    let trial = trial_with_derivative(model, column(points, device));
    Evaluation::from_trial(equation, points, trial)
}
