//! 学習結果のグラフ出力。

use crate::error::{PinnError, Result};
use crate::evaluation::Evaluation;
use plotters::prelude::*;
use std::path::Path;

/// 学習過程の損失をグラフとしてPNGファイルに出力します。
pub fn plot_loss_history<P: AsRef<Path>>(path: P, losses: &[f32]) -> Result<()> {
    draw_loss_history(path.as_ref(), losses).map_err(|e| PinnError::Plot(e.to_string()))
}

/// 学習済みの試行解を、解析解があれば重ねて PNG ファイルに出力します。
pub fn plot_solution<P: AsRef<Path>>(path: P, evaluation: &Evaluation) -> Result<()> {
    draw_solution(path.as_ref(), evaluation).map_err(|e| PinnError::Plot(e.to_string()))
}

fn draw_loss_history(path: &Path, losses: &[f32]) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let log_losses: Vec<f32> = losses
        .iter()
        .map(|&val| val.max(f32::MIN_POSITIVE).log10())
        .collect();
    let max_log_loss = log_losses.iter().copied().fold(f32::MIN, f32::max);
    let min_log_loss = log_losses.iter().copied().fold(f32::MAX, f32::min) - 0.5;
    let (min_log_loss, max_log_loss) = if log_losses.is_empty() {
        (-6.0, 0.0)
    } else {
        (min_log_loss, max_log_loss + 0.5)
    };

    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Loss History", ("sans-serif", 40).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0..losses.len().max(1), min_log_loss..max_log_loss)?;
    chart
        .configure_mesh()
        .y_desc("Loss (log10 scale)")
        .x_desc("Epochs")
        .draw()?;
    chart
        .draw_series(LineSeries::new(
            log_losses.iter().enumerate().map(|(i, &val)| (i, val)),
            &RED,
        ))?
        .label("Physics Loss")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

fn draw_solution(path: &Path, evaluation: &Evaluation) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let analytic = evaluation.solution_comparison().ok().map(|c| c.analytic.as_slice());
    let values = evaluation
        .solution
        .iter()
        .chain(analytic.unwrap_or_default().iter());
    let y_min = values.clone().copied().fold(f32::MAX, f32::min).min(0.0);
    let y_max = values.copied().fold(f32::MIN, f32::max).max(0.0);
    let margin = ((y_max - y_min) * 0.1).max(1e-3);
    let x_min = evaluation.points.first().copied().unwrap_or(0.0);
    let x_max = evaluation.points.last().copied().unwrap_or(1.0).max(x_min + 1e-3);

    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Trial Solution", ("sans-serif", 40).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x_min..x_max, (y_min - margin)..(y_max + margin))?;
    chart.configure_mesh().x_desc("x").y_desc("y").draw()?;

    let trained = evaluation
        .points
        .iter()
        .copied()
        .zip(evaluation.solution.iter().copied());
    chart
        .draw_series(LineSeries::new(trained.clone(), &RED))?
        .label("Trained Yt")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
    chart.draw_series(trained.map(|p| Circle::new(p, 3, RED.filled())))?;

    if let Some(analytic) = analytic {
        chart
            .draw_series(LineSeries::new(
                evaluation.points.iter().copied().zip(analytic.iter().copied()),
                &BLUE,
            ))?
            .label("Analytic Ya")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
    }
    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}
