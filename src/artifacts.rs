//! 学習結果のファイル出力。
//!
//! 数値配列は 1 行 1 値（パラメータ履歴は 1 行 1 エポック、空白区切り）のテキストで書き出します。

use crate::config::TrainingConfig;
use crate::error::{PinnError, Result};
use crate::history::History;
use crate::model::TrialModel;
use crate::training::TrainingOutput;
use burn::config::Config;
use burn::module::Module;
use burn::prelude::Backend;
use burn::record::{FullPrecisionSettings, NamedMpkFileRecorder};
use burn::tensor::backend::AutodiffBackend;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// 学習済みモデルのファイル名
pub const MODEL_FILENAME: &str = "model.mpk";
/// 学習設定のファイル名
pub const CONFIG_FILENAME: &str = "config.json";

/// 出力ディレクトリへの書き出しを担当します。
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    /// 出力ディレクトリを（必要なら）作成します。
    pub fn create<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 1 行 1 値で書き出します。
    pub fn write_column(&self, name: &str, values: &[f32]) -> Result<PathBuf> {
        let path = self.dir.join(name);
        let mut out = BufWriter::new(File::create(&path)?);
        for value in values {
            writeln!(out, "{:.18e}", *value as f64)?;
        }
        out.flush()?;
        Ok(path)
    }

    /// 1 行 1 レコード、空白区切りで書き出します。
    pub fn write_table(&self, name: &str, rows: &[Vec<f32>]) -> Result<PathBuf> {
        let path = self.dir.join(name);
        let mut out = BufWriter::new(File::create(&path)?);
        for row in rows {
            let line = row
                .iter()
                .map(|value| format!("{:.18e}", *value as f64))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(out, "{}", line)?;
        }
        out.flush()?;
        Ok(path)
    }

    pub fn write_history(&self, history: &History) -> Result<Vec<PathBuf>> {
        Ok(vec![
            self.write_table("phist.dat", history.parameters())?,
            self.write_column("losses.dat", history.losses())?,
        ])
    }

    /// 学習結果一式を書き出し、作成したファイルのパスを返します。
    ///
    /// 解析解・解析導関数の出力は、方程式がその機能を持つ場合にのみ行います。
    pub fn write_training<B: AutodiffBackend>(
        &self,
        output: &TrainingOutput<B>,
    ) -> Result<Vec<PathBuf>> {
        let evaluation = &output.evaluation;
        let mut written = vec![self.write_column("training_points.dat", &output.points)?];
        written.extend(self.write_history(&output.history)?);
        written.push(self.write_column("Yt.dat", &evaluation.solution)?);
        written.push(self.write_column("dYt_dx.dat", &evaluation.derivative)?);

        match evaluation.solution_comparison() {
            Ok(comparison) => {
                written.push(self.write_column("Ya.dat", &comparison.analytic)?);
                written.push(self.write_column("Y_err.dat", &comparison.error)?);
            }
            Err(e) => info!("{}。Ya.dat と Y_err.dat は出力しません。", e),
        }
        match evaluation.derivative_comparison() {
            Ok(comparison) => {
                written.push(self.write_column("dYa_dx.dat", &comparison.analytic)?);
                written.push(self.write_column("dY_dx_err.dat", &comparison.error)?);
            }
            Err(e) => info!("{}。dYa_dx.dat と dY_dx_err.dat は出力しません。", e),
        }
        Ok(written)
    }

    pub fn save_config(&self, config: &TrainingConfig) -> Result<PathBuf> {
        let path = self.dir.join(CONFIG_FILENAME);
        config.save(&path)?;
        Ok(path)
    }

    pub fn save_model<B: Backend>(&self, model: &TrialModel<B>) -> Result<PathBuf> {
        let path = self.dir.join(MODEL_FILENAME);
        model
            .clone()
            .save_file(path.clone(), &NamedMpkFileRecorder::<FullPrecisionSettings>::new())?;
        Ok(path)
    }
}

/// 出力ディレクトリから学習設定と学習済みモデルを読み込みます。
pub fn load_trained<B: Backend, P: AsRef<Path>>(
    dir: P,
    device: &B::Device,
) -> Result<(TrainingConfig, TrialModel<B>)> {
    let dir = dir.as_ref();
    let config = TrainingConfig::from_file(dir.join(CONFIG_FILENAME))?;

    let model_path = dir.join(MODEL_FILENAME);
    if !model_path.exists() {
        return Err(PinnError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!(
                "モデルファイル '{}' が見つかりません。最初に 'train' コマンドでモデルを学習・保存してください。",
                model_path.display()
            ),
        )));
    }
    let model = TrialModel::<B>::zeros(config.hidden_units, device).load_file(
        model_path,
        &NamedMpkFileRecorder::<FullPrecisionSettings>::new(),
        device,
    )?;
    if model.hidden_units() != config.hidden_units {
        return Err(PinnError::DimensionMismatch {
            what: "hidden units",
            expected: config.hidden_units,
            actual: model.hidden_units(),
        });
    }
    Ok((config, model))
}
