use crate::artifacts::load_trained;
use crate::equation::Equation;
use crate::error::Result;
use crate::evaluation::{Evaluation, evaluate_forward};
use crate::grid::training_grid;
use burn::backend::NdArray;
use std::path::Path;
use std::time::Instant;
use tracing::info;

type MyBackend = NdArray<f32>;

/// `infer`サブコマンドを実行します。
///
/// 出力ディレクトリから学習済みモデルを読み込み、[0, 1] の `n_points` 点で
/// 試行解とその導関数を評価します。
pub fn run<E: Equation, P: AsRef<Path>>(
    output_dir: P,
    equation: &E,
    n_points: usize,
) -> Result<Evaluation> {
    let device = Default::default();

    info!("推論を実行します - バックエンド: NdArray (CPU)");
    let inference_start = Instant::now();

    info!(
        "保存済みモデルを '{}' からロード中...",
        output_dir.as_ref().display()
    );
    let (config, model) = load_trained::<MyBackend, _>(output_dir, &device)?;

    let points = training_grid(n_points);
    let evaluation = evaluate_forward(&model, equation, &points, &device)?;
    let inference_duration = inference_start.elapsed();

    info!(
        "推論が完了しました。隠れユニット数: {}, 評価点数: {}",
        config.hidden_units, n_points
    );
    info!("=> 推論時間: {:.2?}", inference_duration);

    Ok(evaluation)
}

/// 評価結果を表形式で標準出力に書き出します。
pub fn print_table(evaluation: &Evaluation) {
    let solution = evaluation.solution_comparison().ok();
    let derivative = evaluation.derivative_comparison().ok();

    let mut header = String::from("x\tYt\tdYt_dx");
    if solution.is_some() {
        header.push_str("\tYa\tY_err");
    }
    if derivative.is_some() {
        header.push_str("\tdYa_dx\tdY_dx_err");
    }
    println!("{}", header);

    for (i, x) in evaluation.points.iter().enumerate() {
        let mut line = format!(
            "{:.4}\t{:.6}\t{:.6}",
            x, evaluation.solution[i], evaluation.derivative[i]
        );
        if let Some(c) = solution {
            line.push_str(&format!("\t{:.6}\t{:.3e}", c.analytic[i], c.error[i]));
        }
        if let Some(c) = derivative {
            line.push_str(&format!("\t{:.6}\t{:.3e}", c.analytic[i], c.error[i]));
        }
        println!("{}", line);
    }
}
