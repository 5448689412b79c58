use crate::models::DataPoint;

/// Weight of the newest value in the moving average.
pub const TREND_ALPHA: f64 = 0.3;

/// Exponential moving average of a series, same length and timestamps.
/// Series shorter than two points come back unchanged.
pub fn smooth_trend(points: &[DataPoint]) -> Vec<DataPoint> {
    let Some(first) = points.first() else {
        return Vec::new();
    };
    if points.len() < 2 {
        return points.to_vec();
    }

    let mut ema = first.value;
    let mut trend = Vec::with_capacity(points.len());
    trend.push(first.clone());

    for point in &points[1..] {
        // Same as alpha * v + (1 - alpha) * ema, but exact when v == ema.
        ema += TREND_ALPHA * (point.value - ema);
        trend.push(DataPoint {
            value: ema,
            ..point.clone()
        });
    }

    trend
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    pub max: f64,
    pub min: f64,
    pub average: f64,
    pub latest: f64,
}

pub fn summarize(points: &[DataPoint]) -> Option<SeriesSummary> {
    let latest = points.last()?.value;
    let max = points.iter().map(|p| p.value).fold(f64::NEG_INFINITY, f64::max);
    let min = points.iter().map(|p| p.value).fold(f64::INFINITY, f64::min);
    let average = points.iter().map(|p| p.value).sum::<f64>() / points.len() as f64;

    Some(SeriesSummary {
        max,
        min,
        average,
        latest,
    })
}
