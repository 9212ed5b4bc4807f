//! # 物理情報ニューラルネットワーク (PINN) による常微分方程式の初期値問題ソルバー
//!
//! `burn` フレームワークを使用して、1 階常微分方程式の初期値問題を解く
//! 物理情報ニューラルネットワーク（PINN）の主要なコンポーネントを提供します。
//!
//! 1 隠れ層（シグモイド活性化）のネットワーク `N(x)` から試行解 `Y(x) = x N(x)` を作り、
//! 固定したコロケーション点での方程式の残差の二乗和を Adam で最小化します。

pub mod artifacts;
pub mod cli;
pub mod config;
pub mod derivative;
pub mod equation;
pub mod error;
pub mod evaluation;
pub mod grid;
pub mod history;
pub mod inference;
pub mod model;
pub mod pinn;
pub mod plot;
pub mod training;

pub use config::TrainingConfig;
pub use equation::{CosineDriven, Equation, Lagaris02, RiccatiCosine};
pub use error::{PinnError, Result};
pub use model::TrialModel;
