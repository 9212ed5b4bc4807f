//! ライブラリ全体で使うエラー型。

use burn::record::RecorderError;
use thiserror::Error;

/// このクレートの `Result` 型エイリアス。
pub type Result<T> = std::result::Result<T, PinnError>;

/// 学習・評価・保存の各段階で発生するエラー。
#[derive(Error, Debug)]
pub enum PinnError {
    /// 損失が NaN または無限大になった（学習は継続できない）
    #[error("エポック {epoch} で損失が有限値ではありません: {loss}")]
    NonFiniteLoss { epoch: usize, loss: f32 },

    /// 勾配に NaN または無限大が含まれる（学習は継続できない）
    #[error("エポック {epoch} でパラメータ {parameter} の勾配が有限値ではありません")]
    NonFiniteGradient {
        epoch: usize,
        parameter: &'static str,
    },

    /// コロケーション点数やパラメータ形状の不一致
    #[error("{what} の次元が一致しません (期待値: {expected}, 実際: {actual})")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// 方程式が任意の解析解機能を持たない
    #[error("方程式は {0} を提供していません")]
    MissingOracleCapability(&'static str),

    /// 自動微分の結果から勾配を取り出せなかった
    #[error("{0} に対する勾配が計算グラフに存在しません")]
    MissingGradient(&'static str),

    #[error("不正な設定: {0}")]
    InvalidConfig(String),

    #[error("設定ファイルを読み込めません: {0}")]
    Config(String),

    #[error("グラフの描画に失敗しました: {0}")]
    Plot(String),

    #[error("入出力エラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("モデルの保存・読み込みに失敗しました: {0}")]
    Record(#[from] RecorderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_mismatch_message_names_both_sizes() {
        let err = PinnError::DimensionMismatch {
            what: "parameter snapshot",
            expected: 30,
            actual: 29,
        };
        let msg = err.to_string();
        assert!(msg.contains("30"));
        assert!(msg.contains("29"));
    }
}
