/// A fitted weighted ridge regression
#[derive(Clone, Debug, PartialEq)]
pub struct RidgeFit {
    /// One coefficient per column
    pub coefficients: Vec<f64>,

    /// The unpenalized intercept
    pub intercept: f64,

    /// Weighted R^2 on the training rows
    pub score: f64,
}

impl RidgeFit {
    /// Predict one row
    pub fn predict(&self, row: &[f64]) -> f64 {
        self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, x)| c * x)
                .sum::<f64>()
    }
}

/// Fit `y ~ x` by ridge regression with per-row weights and an unpenalized intercept.
///
/// Returns `None` when the weights sum to zero, the shapes disagree or the normal equations are
/// singular.
pub fn weighted_ridge(x: &[Vec<f64>], y: &[f64], weights: &[f64], alpha: f64) -> Option<RidgeFit> {
    let n_rows = x.len();

    if n_rows == 0 || y.len() != n_rows || weights.len() != n_rows {
        return None;
    }

    let n_cols = x[0].len();
    if x.iter().any(|row| row.len() != n_cols) {
        return None;
    }

    let total_weight: f64 = weights.iter().sum();
    if total_weight <= 0.0 {
        return None;
    }

    let x_mean: Vec<f64> = (0..n_cols)
        .map(|j| x.iter().zip(weights).map(|(row, w)| w * row[j]).sum::<f64>() / total_weight)
        .collect();
    let y_mean = y.iter().zip(weights).map(|(v, w)| w * v).sum::<f64>() / total_weight;

    // Normal equations on weighted, centered data
    let mut gram = vec![vec![0.0; n_cols]; n_cols];
    let mut rhs = vec![0.0; n_cols];

    for ((row, &target), &w) in x.iter().zip(y).zip(weights) {
        let centered: Vec<f64> = row.iter().zip(&x_mean).map(|(v, m)| v - m).collect();
        let target = target - y_mean;

        for j in 0..n_cols {
            rhs[j] += w * centered[j] * target;

            for k in j..n_cols {
                gram[j][k] += w * centered[j] * centered[k];
            }
        }
    }

    for j in 0..n_cols {
        gram[j][j] += alpha;

        for k in 0..j {
            gram[j][k] = gram[k][j];
        }
    }

    let coefficients = solve(gram, rhs)?;
    let intercept = y_mean
        - coefficients
            .iter()
            .zip(&x_mean)
            .map(|(c, m)| c * m)
            .sum::<f64>();

    let mut fit = RidgeFit {
        coefficients,
        intercept,
        score: 0.0,
    };

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for ((row, &target), &w) in x.iter().zip(y).zip(weights) {
        ss_res += w * (target - fit.predict(row)).powi(2);
        ss_tot += w * (target - y_mean).powi(2);
    }

    fit.score = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else if ss_res == 0.0 {
        1.0
    } else {
        0.0
    };

    Some(fit)
}

/// Solve `a * x = b` by Gaussian elimination with partial pivoting
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Option<Vec<f64>> {
    let n = b.len();

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;

        if a[pivot][col].abs() < 1e-12 {
            return None;
        }

        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];

            if factor == 0.0 {
                continue;
            }

            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }

    Some(x)
}
