use crate::config::TrainingConfig;
use crate::error::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// clapでコマンドラインの構造を定義します。
#[derive(Parser, Debug)]
#[command(author, version, about = "Solve a first-order ODE initial-value problem with a PINN built on Burn", long_about = None)]
pub struct Cli {
    /// デバッグログ（エポックごとの損失）を表示します
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 実行するサブコマンドを定義します（train または infer）。
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// PINNモデルを学習し、結果をファイルに保存します
    Train(TrainArgs),
    /// 保存されたPINNモデルを使い、推論を実行します
    Infer(InferArgs),
}

/// 解く方程式。
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquationKind {
    /// dy/dx + y/5 = exp(-x/5) cos(x)
    Lagaris02,
    /// dy/dx = cos(x)
    Cosine,
    /// dy/dx + y^2 = cos(x)（解析解なし）
    Riccati,
}

impl EquationKind {
    /// 出力ディレクトリの既定名
    pub fn default_output_dir(&self) -> PathBuf {
        let name = match self {
            EquationKind::Lagaris02 => "lagaris_02",
            EquationKind::Cosine => "cosine_driven",
            EquationKind::Riccati => "riccati_cosine",
        };
        PathBuf::from(name)
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[arg(long, value_enum, default_value_t = EquationKind::Lagaris02)]
    pub equation: EquationKind,
    /// 学習設定の JSON ファイル（個別のオプションが優先されます）
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// 隠れ層のユニット数 H
    #[arg(long)]
    pub hidden_units: Option<usize>,
    /// コロケーション点の数 nt
    #[arg(long)]
    pub collocation_count: Option<usize>,
    #[arg(long)]
    pub epochs: Option<usize>,
    #[arg(long)]
    pub learning_rate: Option<f64>,
    #[arg(long)]
    pub beta_1: Option<f32>,
    #[arg(long)]
    pub beta_2: Option<f32>,
    #[arg(long)]
    pub epsilon: Option<f32>,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long)]
    pub log_interval: Option<usize>,
    /// 結果の出力先（既定は方程式名のディレクトリ）
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// グラフを出力しません
    #[arg(long)]
    pub no_plot: bool,
}

impl TrainArgs {
    /// 設定ファイルと個別オプションから学習設定を組み立てます。
    pub fn training_config(&self) -> Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => TrainingConfig::from_file(path)?,
            None => TrainingConfig::new(),
        };
        if let Some(hidden_units) = self.hidden_units {
            config.hidden_units = hidden_units;
        }
        if let Some(collocation_count) = self.collocation_count {
            config.collocation_count = collocation_count;
        }
        if let Some(epochs) = self.epochs {
            config.epochs = epochs;
        }
        if let Some(learning_rate) = self.learning_rate {
            config.learning_rate = learning_rate;
        }
        if let Some(beta_1) = self.beta_1 {
            config.beta_1 = beta_1;
        }
        if let Some(beta_2) = self.beta_2 {
            config.beta_2 = beta_2;
        }
        if let Some(epsilon) = self.epsilon {
            config.epsilon = epsilon;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(log_interval) = self.log_interval {
            config.log_interval = log_interval;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.equation.default_output_dir())
    }
}

#[derive(Args, Debug)]
pub struct InferArgs {
    #[arg(long, value_enum, default_value_t = EquationKind::Lagaris02)]
    pub equation: EquationKind,
    /// 学習結果が保存されたディレクトリ（既定は方程式名のディレクトリ）
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// [0, 1] 上の評価点数
    #[arg(long, default_value_t = 11)]
    pub points: usize,
}

impl InferArgs {
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.equation.default_output_dir())
    }
}
