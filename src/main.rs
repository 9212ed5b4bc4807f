//! # 物理情報ニューラルネットワーク (PINN) による初期値問題ソルバー
//!
//! `burn` フレームワークを使用して、1 階常微分方程式の初期値問題
//! （既定は `dy/dx + y/5 = exp(-x/5) cos(x)`, `y(0) = 0`）を解きます。
//!
//! `clap` クレートを利用して、コマンドラインから`train`（学習）と`infer`（推論）の
//! 機能を個別に実行できます。
//!
//! ## 使い方
//!
//! ### 学習
//! ```bash
//! cargo run --release -- train --equation lagaris02 --epochs 1000
//! ```
//!
//! ### 推論
//! ```bash
//! cargo run --release -- infer --equation lagaris02 --points 21
//! ```

use anyhow::Result;
use burn::backend::{Autodiff, NdArray};
use clap::Parser;
use pinn_ivp::artifacts::ArtifactWriter;
use pinn_ivp::cli::{Cli, Commands, EquationKind, InferArgs, TrainArgs};
use pinn_ivp::equation::{CosineDriven, Equation, Lagaris02, RiccatiCosine};
use pinn_ivp::{inference, plot, training};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

type MyBackend = Autodiff<NdArray<f32>>;

/// 実行環境の情報をログに出力します。
fn log_system_information() {
    info!("システム情報:");
    info!(
        "OS: {} ({})",
        std::env::consts::OS,
        std::env::consts::FAMILY
    );
    info!("アーキテクチャ: {}", std::env::consts::ARCH);
    info!(
        "{} バージョン: {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );
}

/// `train`サブコマンドを実行します。
///
/// 学習が最後まで成功した場合にのみ、結果・設定・モデルをファイルに保存します。
fn run_training<E: Equation>(args: &TrainArgs, equation: &E) -> Result<()> {
    let config = args.training_config()?;
    log_system_information();
    info!("バックエンド: NdArray (CPU)");

    let device = Default::default();
    let output = training::run::<MyBackend, _>(&config, equation, &device)?;

    let writer = ArtifactWriter::create(args.output_dir())?;
    for path in writer.write_training(&output)? {
        info!("=> '{}' に保存しました。", path.display());
    }
    let config_path = writer.save_config(&config)?;
    info!("=> 学習設定を '{}' に保存しました。", config_path.display());
    let model_path = writer.save_model(&output.model)?;
    info!("=> モデルを '{}' に保存しました。", model_path.display());

    if !args.no_plot {
        let loss_graph = writer.dir().join("loss_graph.png");
        match plot::plot_loss_history(&loss_graph, output.history.losses()) {
            Ok(()) => info!("=> 損失グラフを '{}' に保存しました。", loss_graph.display()),
            Err(e) => warn!("{}", e),
        }
        let solution_graph = writer.dir().join("solution.png");
        match plot::plot_solution(&solution_graph, &output.evaluation) {
            Ok(()) => info!("=> 解のグラフを '{}' に保存しました。", solution_graph.display()),
            Err(e) => warn!("{}", e),
        }
    }
    Ok(())
}

/// `infer`サブコマンドを実行します。
fn run_inference<E: Equation>(args: &InferArgs, equation: &E) -> Result<()> {
    let evaluation = inference::run(args.output_dir(), equation, args.points)?;
    inference::print_table(&evaluation);
    Ok(())
}

/// プログラムのエントリーポイント。
///
/// コマンドライン引数を解析し、`train`または`infer`の処理に振り分けます。
fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match &cli.command {
        Commands::Train(args) => match args.equation {
            EquationKind::Lagaris02 => run_training(args, &Lagaris02),
            EquationKind::Cosine => run_training(args, &CosineDriven),
            EquationKind::Riccati => run_training(args, &RiccatiCosine),
        },
        Commands::Infer(args) => match args.equation {
            EquationKind::Lagaris02 => run_inference(args, &Lagaris02),
            EquationKind::Cosine => run_inference(args, &CosineDriven),
            EquationKind::Riccati => run_inference(args, &RiccatiCosine),
        },
    }
}
