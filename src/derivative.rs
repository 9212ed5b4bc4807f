//! 試行解の入力微分。
//!
//! 学習中の `dY/dx` は損失の一部となり、その損失をさらにパラメータで微分する必要があります。
//! burn の自動微分は「勾配の勾配」を直接は扱えない（`x.grad` が返すのは計算グラフから
//! 切り離された内部バックエンドのテンソル）ため、学習用には隠れ層を通して接ベクトルを
//! 通常のテンソル演算で伝播させます。こうして得た `dY/dx` は計算グラフ上にあるので、
//! 損失の `backward()` でパラメータについての厳密な勾配が得られます。
//!
//! 学習後の評価では、`x` に `require_grad` を付けた逆伝播でも `dN/dx` を求めます。

use crate::error::{PinnError, Result};
use crate::model::TrialModel;
use burn::prelude::Backend;
use burn::tensor::Tensor;
use burn::tensor::activation::sigmoid;
use burn::tensor::backend::AutodiffBackend;

/// 試行解と、その入力についての微分。
#[derive(Debug, Clone)]
pub struct TrialDerivative<B: Backend> {
    /// ネットワーク出力 `N(x)`
    pub n: Tensor<B, 2>,
    /// `dN/dx`
    pub dn_dx: Tensor<B, 2>,
    /// 試行解 `Y(x) = x N(x)`
    pub y: Tensor<B, 2>,
    /// `dY/dx = N(x) + x dN/dx`
    pub dy_dx: Tensor<B, 2>,
}

/// 接ベクトルの伝播により `Y` と `dY/dx` を 1 回の順伝播で計算します。
///
/// 結果はすべてパラメータについて微分可能な計算グラフ上にあります。
pub fn trial_with_derivative<B: Backend>(
    model: &TrialModel<B>,
    x: Tensor<B, 2>,
) -> TrialDerivative<B> {
    let s = sigmoid(model.pre_activation(x.clone()));
    // σ'(z) = σ(z)(1 - σ(z))
    let ds = s.clone() * s.clone().neg().add_scalar(1.0);
    let v = model.output_weights();

    let n = s.matmul(v.clone());
    let dn_dx = (ds * model.input_weights()).matmul(v);
    let y = x.clone() * n.clone();
    let dy_dx = n.clone() + x * dn_dx.clone();

    TrialDerivative { n, dn_dx, y, dy_dx }
}

/// 逆伝播で `N` と `dN/dx` を求め、試行解 `Y` と `dY/dx` を組み立てます。
///
/// 返り値は計算グラフから切り離された内部バックエンドのテンソルです。
pub fn trial_input_gradient<B: AutodiffBackend>(
    model: &TrialModel<B>,
    x: Tensor<B, 2>,
) -> Result<TrialDerivative<B::InnerBackend>> {
    let x = x.detach().require_grad();
    let n = model.forward(x.clone());
    let grads = n.clone().sum().backward();
    let dn_dx = x.grad(&grads).ok_or(PinnError::MissingGradient("x"))?;

    let x = x.inner();
    let n = n.inner();
    let y = x.clone() * n.clone();
    let dy_dx = n.clone() + x * dn_dx.clone();
    Ok(TrialDerivative { n, dn_dx, y, dy_dx })
}
