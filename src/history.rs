//! 学習履歴（エポックごとの損失とパラメータ）の記録。

use crate::error::{PinnError, Result};
use std::ops::Range;

/// エポックごとの損失と、その損失を計算したときのパラメータのスナップショット。
///
/// どちらも追記のみで、記録済みの値は変更されません。
#[derive(Debug, Clone)]
pub struct History {
    hidden_units: usize,
    losses: Vec<f32>,
    parameters: Vec<Vec<f32>>,
}

impl History {
    pub fn new(hidden_units: usize) -> Self {
        Self::with_capacity(hidden_units, 0)
    }

    pub fn with_capacity(hidden_units: usize, epochs: usize) -> Self {
        Self {
            hidden_units,
            losses: Vec::with_capacity(epochs),
            parameters: Vec::with_capacity(epochs),
        }
    }

    /// 1 エポック分を追記します。スナップショットの長さは 3H でなければなりません。
    pub fn record(&mut self, loss: f32, snapshot: Vec<f32>) -> Result<()> {
        let expected = 3 * self.hidden_units;
        if snapshot.len() != expected {
            return Err(PinnError::DimensionMismatch {
                what: "parameter snapshot",
                expected,
                actual: snapshot.len(),
            });
        }
        self.losses.push(loss);
        self.parameters.push(snapshot);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.losses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.losses.is_empty()
    }

    pub fn losses(&self) -> &[f32] {
        &self.losses
    }

    /// `[w | u | v]` の順に平坦化したパラメータ（エポック数 × 3H）
    pub fn parameters(&self) -> &[Vec<f32>] {
        &self.parameters
    }

    pub fn first_loss(&self) -> Option<f32> {
        self.losses.first().copied()
    }

    pub fn last_loss(&self) -> Option<f32> {
        self.losses.last().copied()
    }

    /// 指定したエポック範囲の平均損失
    pub fn mean_loss(&self, epochs: Range<usize>) -> Option<f32> {
        let window = self.losses.get(epochs)?;
        if window.is_empty() {
            return None;
        }
        Some(window.iter().sum::<f32>() / window.len() as f32)
    }
}
