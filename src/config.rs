use crate::error::{self, PinnError};
use burn::config::Config;
use burn::optim::AdamConfig;
use std::path::Path;

/// 学習のハイパーパラメータ。
///
/// 既定値は Lagaris の例題 2 を解くための設定（隠れユニット 10、訓練点 11、
/// 1000 エポック、学習率 0.01、シード 0）です。
#[derive(Config, Debug)]
pub struct TrainingConfig {
    /// 隠れ層のユニット数 H
    #[config(default = 10)]
    pub hidden_units: usize,
    /// コロケーション点の数 nt
    #[config(default = 11)]
    pub collocation_count: usize,
    /// 学習エポック数
    #[config(default = 1000)]
    pub epochs: usize,
    #[config(default = 0.01)]
    pub learning_rate: f64,
    /// Adam の 1 次モーメントの減衰率 β1
    #[config(default = 0.9)]
    pub beta_1: f32,
    /// Adam の 2 次モーメントの減衰率 β2
    #[config(default = 0.999)]
    pub beta_2: f32,
    /// Adam の ε
    #[config(default = 1e-7)]
    pub epsilon: f32,
    /// パラメータ初期化用の乱数シード
    #[config(default = 0)]
    pub seed: u64,
    /// 何エポックごとに損失をログ出力するか
    #[config(default = 100)]
    pub log_interval: usize,
}

impl TrainingConfig {
    /// 学習を開始できる設定かどうかを検査します。
    pub fn validate(&self) -> error::Result<()> {
        if self.hidden_units == 0 {
            return Err(PinnError::InvalidConfig(
                "hidden_units は 1 以上である必要があります".to_string(),
            ));
        }
        if self.collocation_count == 0 {
            return Err(PinnError::InvalidConfig(
                "collocation_count は 1 以上である必要があります".to_string(),
            ));
        }
        if self.epochs == 0 {
            return Err(PinnError::InvalidConfig(
                "epochs は 1 以上である必要があります".to_string(),
            ));
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(PinnError::InvalidConfig(format!(
                "learning_rate は正の有限値である必要があります: {}",
                self.learning_rate
            )));
        }
        for (name, beta) in [("beta_1", self.beta_1), ("beta_2", self.beta_2)] {
            if !(0.0..1.0).contains(&beta) {
                return Err(PinnError::InvalidConfig(format!(
                    "{} は [0, 1) の範囲である必要があります: {}",
                    name, beta
                )));
            }
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 {
            return Err(PinnError::InvalidConfig(format!(
                "epsilon は正の有限値である必要があります: {}",
                self.epsilon
            )));
        }
        Ok(())
    }

    /// burn の Adam の設定を組み立てます。
    pub fn optimizer(&self) -> AdamConfig {
        AdamConfig::new()
            .with_beta_1(self.beta_1)
            .with_beta_2(self.beta_2)
            .with_epsilon(self.epsilon)
    }

    /// JSON ファイルから設定を読み込みます。
    pub fn from_file<P: AsRef<Path>>(path: P) -> error::Result<Self> {
        let config = Self::load(path.as_ref())
            .map_err(|e| PinnError::Config(format!("{}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }
}
