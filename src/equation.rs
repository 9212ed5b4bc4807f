//! 解くべき 1 階常微分方程式の初期値問題。
//!
//! 方程式は残差形式 `G(x, y, dy/dx) = 0` で与えます。試行解 `Y(x) = x N(x)` は
//! 初期条件 `y(0) = 0` を構造的に満たすため、ここに並ぶ方程式はすべて
//! `y(0) = 0` を初期条件とします。

use burn::prelude::Backend;
use burn::tensor::Tensor;

/// 初期値問題の方程式。
///
/// 残差は必須です。解析解とその導関数は方程式によっては存在しないため、
/// それぞれ独立した任意機能として `Option` で公開します。
pub trait Equation {
    /// 出力ファイルやログに使う方程式の名前
    fn name(&self) -> &'static str;

    /// 各コロケーション点での残差を計算します（形状はすべて `[nt, 1]`）。
    fn residual<B: Backend>(
        &self,
        x: Tensor<B, 2>,
        y: Tensor<B, 2>,
        dy_dx: Tensor<B, 2>,
    ) -> Tensor<B, 2>;

    /// 解析解 `y(x)`
    fn analytic_solution(&self) -> Option<fn(f64) -> f64> {
        None
    }

    /// 解析解の導関数 `dy/dx(x)`
    fn analytic_derivative(&self) -> Option<fn(f64) -> f64> {
        None
    }
}

/// Lagaris らの例題 2: `dy/dx + y/5 = exp(-x/5) cos(x)`, `y(0) = 0`。
#[derive(Debug, Clone, Copy, Default)]
pub struct Lagaris02;

fn lagaris02_solution(x: f64) -> f64 {
    (-x / 5.0).exp() * x.sin()
}

fn lagaris02_derivative(x: f64) -> f64 {
    (-x / 5.0).exp() * (x.cos() - x.sin() / 5.0)
}

impl Equation for Lagaris02 {
    fn name(&self) -> &'static str {
        "lagaris_02"
    }

    fn residual<B: Backend>(
        &self,
        x: Tensor<B, 2>,
        y: Tensor<B, 2>,
        dy_dx: Tensor<B, 2>,
    ) -> Tensor<B, 2> {
        let forcing = x.clone().div_scalar(-5.0).exp() * x.cos();
        dy_dx + y.div_scalar(5.0) - forcing
    }

    fn analytic_solution(&self) -> Option<fn(f64) -> f64> {
        Some(lagaris02_solution)
    }

    fn analytic_derivative(&self) -> Option<fn(f64) -> f64> {
        Some(lagaris02_derivative)
    }
}

/// `dy/dx = cos(x)`, `y(0) = 0`。解析解は `sin(x)`。
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineDriven;

impl Equation for CosineDriven {
    fn name(&self) -> &'static str {
        "cosine_driven"
    }

    fn residual<B: Backend>(
        &self,
        x: Tensor<B, 2>,
        _y: Tensor<B, 2>,
        dy_dx: Tensor<B, 2>,
    ) -> Tensor<B, 2> {
        dy_dx - x.cos()
    }

    fn analytic_solution(&self) -> Option<fn(f64) -> f64> {
        Some(f64::sin)
    }

    fn analytic_derivative(&self) -> Option<fn(f64) -> f64> {
        Some(f64::cos)
    }
}

/// リッカチ型 `dy/dx + y^2 = cos(x)`, `y(0) = 0`。
///
/// 初等関数による解析解を持たないため、誤差評価は行われません。
#[derive(Debug, Clone, Copy, Default)]
pub struct RiccatiCosine;

impl Equation for RiccatiCosine {
    fn name(&self) -> &'static str {
        "riccati_cosine"
    }

    fn residual<B: Backend>(
        &self,
        x: Tensor<B, 2>,
        y: Tensor<B, 2>,
        dy_dx: Tensor<B, 2>,
    ) -> Tensor<B, 2> {
        dy_dx + y.clone() * y - x.cos()
    }
}
