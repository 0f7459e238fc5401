//! Progression trend over a dated series (linear regression via linfa)

use chrono::NaiveDate;
use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};

use super::Series;
use crate::model::parse_display_date;

/// Minimum data points required for a fit
const MIN_DATA_POINTS: usize = 3;

/// Least-squares line through a series: value against days since the first point
#[derive(Debug, Clone)]
pub struct ProgressTrend {
    slope: f64,
    intercept: f64,
    r2_score: f64,
    data_points: usize,
    first_date: NaiveDate,
    last_date: NaiveDate,
}

impl ProgressTrend {
    /// Fit a trend. Points with unparseable dates are skipped.
    pub fn fit(series: &Series<f64>) -> Option<Self> {
        let points: Vec<(NaiveDate, f64)> = series
            .iter()
            .filter_map(|(value, date)| Some((parse_display_date(date)?, *value)))
            .collect();

        if points.len() < MIN_DATA_POINTS {
            return None;
        }

        let first_date = points.iter().map(|(d, _)| *d).min()?;
        let last_date = points.iter().map(|(d, _)| *d).max()?;
        if first_date == last_date {
            return None;
        }

        let x_data: Vec<f64> = points
            .iter()
            .map(|(d, _)| (*d - first_date).num_days() as f64)
            .collect();
        let y_data: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
        let n_samples = x_data.len();

        let records = Array2::from_shape_vec((n_samples, 1), x_data).ok()?;
        let targets = Array1::from_vec(y_data);
        let dataset = Dataset::new(records, targets);

        let model = LinearRegression::default().fit(&dataset).ok()?;
        let slope = model.params()[0];
        let intercept = model.intercept();

        let predictions = model.predict(&dataset);
        let r2_score = predictions.r2(&dataset).unwrap_or(0.0);

        Some(Self {
            slope,
            intercept,
            r2_score,
            data_points: n_samples,
            first_date,
            last_date,
        })
    }

    /// Change in value per day
    pub fn daily_progress(&self) -> f64 {
        self.slope
    }

    pub fn r2_score(&self) -> f64 {
        self.r2_score
    }

    pub fn data_points(&self) -> usize {
        self.data_points
    }

    /// Predicted value `days` after the most recent point
    pub fn predict(&self, days: i64) -> f64 {
        let x = (self.last_date - self.first_date).num_days() + days;
        self.slope * x as f64 + self.intercept
    }

    /// One-line summary for terminal output
    pub fn summary(&self) -> String {
        format!(
            "{:+.2} lbs/week over {} sessions (r² {:.2})",
            self.slope * 7.0,
            self.data_points,
            self.r2_score
        )
    }
}
