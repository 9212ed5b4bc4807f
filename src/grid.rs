//! コロケーション点（訓練点）の生成。

/// 区間 [0, 1] を両端を含めて等間隔に分割した `n` 点を返します。
///
/// `n == 1` の場合は初期条件の位置 `x = 0` のみを返します。
pub fn training_grid(n: usize) -> Vec<f32> {
    training_grid_over(n, 0.0, 1.0)
}

/// 区間 [x_min, x_max] を両端を含めて等間隔に分割した `n` 点を返します。
fn training_grid_over(n: usize, x_min: f32, x_max: f32) -> Vec<f32> {
    match n {
        0 => Vec::new(),
        1 => vec![x_min],
        _ => {
            let dx = (x_max - x_min) / (n - 1) as f32;
            (0..n).map(|i| x_min + i as f32 * dx).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn eleven_points_step_by_a_tenth() {
        let grid = training_grid(11);
        assert_eq!(grid.len(), 11);
        assert_eq!(grid[0], 0.0);
        assert_abs_diff_eq!(grid[10], 1.0, epsilon = 1e-6);
        for pair in grid.windows(2) {
            assert_abs_diff_eq!(pair[1] - pair[0], 0.1, epsilon = 1e-6);
        }
    }

    #[test]
    fn degenerate_sizes() {
        assert!(training_grid(0).is_empty());
        assert_eq!(training_grid(1), vec![0.0]);
        assert_eq!(training_grid_over(2, -1.0, 3.0), vec![-1.0, 3.0]);
    }
}
