use crate::config::TrainingConfig;
use crate::equation::Equation;
use crate::error::{PinnError, Result};
use crate::evaluation::{Evaluation, evaluate};
use crate::grid::training_grid;
use crate::history::History;
use crate::model::{TrialModel, column};
use crate::pinn::physics_loss;
use burn::optim::{GradientsParams, Optimizer};
use burn::tensor::ElementConversion;
use burn::tensor::backend::AutodiffBackend;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// 学習 1 回分の結果。
#[derive(Debug)]
pub struct TrainingOutput<B: AutodiffBackend> {
    /// 学習済みモデル
    pub model: TrialModel<B>,
    /// 学習に使ったコロケーション点
    pub points: Vec<f32>,
    /// エポックごとの損失とパラメータ
    pub history: History,
    /// 学習済みモデルをコロケーション点で評価した結果
    pub evaluation: Evaluation,
    /// 学習ループの所要時間
    pub elapsed: Duration,
}

/// [0, 1] の等間隔グリッドをコロケーション点として学習します。
pub fn run<B: AutodiffBackend, E: Equation>(
    config: &TrainingConfig,
    equation: &E,
    device: &B::Device,
) -> Result<TrainingOutput<B>> {
    let points = training_grid(config.collocation_count);
    run_on_points(config, equation, points, device)
}

/// 与えられたコロケーション点で学習します。
///
/// 点集合は学習中に変更されません。損失または勾配が有限値でなくなった時点で
/// 学習を打ち切り、エラーを返します（Adam のモーメントは回復できないため）。
pub fn run_on_points<B: AutodiffBackend, E: Equation>(
    config: &TrainingConfig,
    equation: &E,
    points: Vec<f32>,
    device: &B::Device,
) -> Result<TrainingOutput<B>> {
    config.validate()?;
    if points.len() != config.collocation_count {
        return Err(PinnError::DimensionMismatch {
            what: "collocation points",
            expected: config.collocation_count,
            actual: points.len(),
        });
    }

    // --- 初期化 ---
    let mut rng = StdRng::seed_from_u64(config.seed);
    let x = column::<B>(&points, device);
    let mut model = TrialModel::<B>::new(config.hidden_units, &mut rng, device);
    let mut optim = config.optimizer().init();
    let mut history = History::with_capacity(config.hidden_units, config.epochs);

    info!(
        "学習を開始します ({}) - nt = {}, H = {}, n_epochs = {}, learning_rate = {}",
        equation.name(),
        config.collocation_count,
        config.hidden_units,
        config.epochs,
        config.learning_rate
    );
    let training_start = Instant::now();

    // --- 学習ループ ---
    for epoch in 0..config.epochs {
        let loss = physics_loss(&model, equation, x.clone());
        let loss_value = loss.clone().into_scalar().elem::<f32>();
        if !loss_value.is_finite() {
            return Err(PinnError::NonFiniteLoss {
                epoch,
                loss: loss_value,
            });
        }

        let grads = loss.backward();
        model.ensure_finite_gradients(&grads, epoch)?;

        // 記録するのはこの損失を計算したときのパラメータ
        history.record(loss_value, model.parameters())?;

        let grads = GradientsParams::from_grads(grads, &model);
        model = optim.step(config.learning_rate, model, grads);

        if (epoch + 1) % config.log_interval.max(1) == 0 {
            info!("[Epoch {}] Loss: {:.6}", epoch + 1, loss_value);
        } else {
            debug!("[Epoch {}] Loss: {:.6}", epoch + 1, loss_value);
        }
    }
    let elapsed = training_start.elapsed();
    info!("学習が完了しました。");
    info!("=> 学習時間: {:.2?}", elapsed);

    // --- 評価 ---
    let evaluation = evaluate(&model, equation, &points, device)?;
    if let Ok(solution) = evaluation.solution_comparison() {
        info!(
            "=> 解の誤差: 最大 {:.3e}, RMS {:.3e}",
            solution.max_abs_error(),
            solution.rms_error()
        );
    }
    if let Ok(derivative) = evaluation.derivative_comparison() {
        info!(
            "=> 導関数の誤差: 最大 {:.3e}, RMS {:.3e}",
            derivative.max_abs_error(),
            derivative.rms_error()
        );
    }

    Ok(TrainingOutput {
        model,
        points,
        history,
        evaluation,
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equation::{CosineDriven, Lagaris02};
    use burn::backend::{Autodiff, NdArray};
    use burn::prelude::{Backend, Tensor};

    type TestBackend = Autodiff<NdArray<f32>>;

    fn short_config(epochs: usize) -> TrainingConfig {
        TrainingConfig::new()
            .with_hidden_units(5)
            .with_collocation_count(6)
            .with_epochs(epochs)
    }

    /// 解が発散する方程式（残差が大きすぎて損失が無限大になる）
    struct Overflowing;

    impl Equation for Overflowing {
        fn name(&self) -> &'static str {
            "overflowing"
        }

        fn residual<B: Backend>(
            &self,
            _x: Tensor<B, 2>,
            _y: Tensor<B, 2>,
            dy_dx: Tensor<B, 2>,
        ) -> Tensor<B, 2> {
            dy_dx.add_scalar(1.0e30)
        }
    }

    /// 損失は有限だが、x = 0 で勾配が NaN になる方程式
    struct SquareRootOfSquare;

    impl Equation for SquareRootOfSquare {
        fn name(&self) -> &'static str {
            "square root of square"
        }

        fn residual<B: Backend>(
            &self,
            _x: Tensor<B, 2>,
            y: Tensor<B, 2>,
            _dy_dx: Tensor<B, 2>,
        ) -> Tensor<B, 2> {
            y.clone().mul(y).sqrt()
        }
    }

    #[test]
    fn history_has_one_entry_per_epoch() {
        let device = Default::default();
        let output = run::<TestBackend, _>(&short_config(25), &Lagaris02, &device).unwrap();

        assert_eq!(output.history.len(), 25);
        assert_eq!(output.history.parameters().len(), 25);
        assert!(output.history.parameters().iter().all(|p| p.len() == 15));
        assert!(output.history.losses().iter().all(|&l| l >= 0.0));
        assert_eq!(output.evaluation.points.len(), 6);
    }

    #[test]
    fn first_snapshot_is_the_initial_model() {
        let device = Default::default();
        let config = short_config(3);
        let output = run::<TestBackend, _>(&config, &CosineDriven, &device).unwrap();

        let initial = TrialModel::<TestBackend>::new(
            config.hidden_units,
            &mut StdRng::seed_from_u64(config.seed),
            &device,
        );
        assert_eq!(output.history.parameters()[0], initial.parameters());
        assert_ne!(output.history.parameters()[1], initial.parameters());
    }

    #[test]
    fn non_finite_loss_aborts_training() {
        let device = Default::default();
        let result = run::<TestBackend, _>(&short_config(10), &Overflowing, &device);
        assert!(matches!(
            result,
            Err(PinnError::NonFiniteLoss { epoch: 0, .. })
        ));
    }

    #[test]
    fn non_finite_gradient_aborts_training() {
        let device = Default::default();
        let result = run::<TestBackend, _>(&short_config(10), &SquareRootOfSquare, &device);
        assert!(matches!(
            result,
            Err(PinnError::NonFiniteGradient { epoch: 0, .. })
        ));
    }

    #[test]
    fn collocation_count_must_match_points() {
        let device = Default::default();
        let result = run_on_points::<TestBackend, _>(
            &short_config(1),
            &Lagaris02,
            vec![0.0, 0.5, 1.0],
            &device,
        );
        assert!(matches!(
            result,
            Err(PinnError::DimensionMismatch {
                expected: 6,
                actual: 3,
                ..
            })
        ));
    }

    #[test]
    fn invalid_config_is_rejected_before_training() {
        let device = Default::default();
        let config = short_config(0);
        let result = run::<TestBackend, _>(&config, &Lagaris02, &device);
        assert!(matches!(result, Err(PinnError::InvalidConfig(_))));
    }
}
