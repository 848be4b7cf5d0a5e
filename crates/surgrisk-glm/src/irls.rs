//! Iteratively reweighted least squares for the logit link.

use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, info, instrument, warn};

use crate::config::LogisticConfig;
use crate::error::GlmError;
use crate::fit::{Coefficient, LogisticFit, sigmoid};
use crate::linalg::{cholesky, cholesky_inverse, cholesky_solve};

/// Step halvings attempted before accepting a non-improving Newton step.
const MAX_HALVINGS: usize = 30;

const INTERCEPT_NAME: &str = "(Intercept)";

/// `ln(1 + e^z)` without overflow.
fn softplus(z: f64) -> f64 {
    z.max(0.0) + (-z.abs()).exp().ln_1p()
}

fn linear_predictor(row: &[f64], beta: &[f64]) -> f64 {
    row.iter().zip(beta).map(|(x, b)| x * b).sum()
}

/// Binomial deviance `-2 * log-likelihood` for 0/1 outcomes.
fn deviance(design: &[Vec<f64>], y: &[f64], beta: &[f64]) -> f64 {
    -2.0 * design
        .iter()
        .zip(y)
        .map(|(row, &yi)| {
            let eta = linear_predictor(row, beta);
            yi * eta - softplus(eta)
        })
        .sum::<f64>()
}

/// Fisher information `X^T W X` and score `X^T (y - mu)` at `beta`.
fn information_and_score(design: &[Vec<f64>], y: &[f64], beta: &[f64]) -> (Vec<Vec<f64>>, Vec<f64>) {
    let p = beta.len();
    let mut info = vec![vec![0.0f64; p]; p];
    let mut score = vec![0.0f64; p];
    for (row, &yi) in design.iter().zip(y) {
        let mu = sigmoid(linear_predictor(row, beta));
        let w = mu * (1.0 - mu);
        let resid = yi - mu;
        for j in 0..p {
            score[j] += row[j] * resid;
            let wx = w * row[j];
            for k in 0..=j {
                info[j][k] += wx * row[k];
            }
        }
    }
    for j in 0..p {
        for k in (j + 1)..p {
            info[j][k] = info[k][j];
        }
    }
    (info, score)
}

fn validate(
    config: &LogisticConfig,
    features: &[Vec<f64>],
    labels: &[bool],
    feature_names: &[String],
) -> Result<(), GlmError> {
    if config.max_iter == 0 {
        return Err(GlmError::InvalidMaxIter { max_iter: 0 });
    }
    if !(config.tol.is_finite() && config.tol > 0.0) {
        return Err(GlmError::InvalidTolerance { tol: config.tol });
    }
    if !(config.confidence_level > 0.0 && config.confidence_level < 1.0) {
        return Err(GlmError::InvalidConfidenceLevel {
            level: config.confidence_level,
        });
    }

    if features.is_empty() {
        return Err(GlmError::EmptyDataset);
    }
    let n_samples = features.len();
    let n_features = features[0].len();
    if n_features == 0 {
        return Err(GlmError::ZeroFeatures);
    }
    if labels.len() != n_samples {
        return Err(GlmError::LabelCountMismatch {
            n_samples,
            n_labels: labels.len(),
        });
    }
    if feature_names.len() != n_features {
        return Err(GlmError::FeatureNameMismatch {
            n_features,
            n_names: feature_names.len(),
        });
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(GlmError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(GlmError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
    }

    let n_positive = labels.iter().filter(|&&l| l).count();
    if n_positive == 0 || n_positive == n_samples {
        return Err(GlmError::SingleClass {
            label: n_positive == n_samples,
            n_samples,
        });
    }
    Ok(())
}

/// Fit the model and assemble the coefficient table.
#[instrument(skip_all, fields(n_samples = features.len(), max_iter = config.max_iter))]
pub(crate) fn fit(
    config: &LogisticConfig,
    features: &[Vec<f64>],
    labels: &[bool],
    feature_names: &[String],
) -> Result<LogisticFit, GlmError> {
    validate(config, features, labels, feature_names)?;

    let n_samples = features.len();
    let n_features = features[0].len();
    let n_positive = labels.iter().filter(|&&l| l).count();

    // Column 0 of the design is the intercept.
    let design: Vec<Vec<f64>> = features
        .iter()
        .map(|row| std::iter::once(1.0).chain(row.iter().copied()).collect())
        .collect();
    let y: Vec<f64> = labels.iter().map(|&l| f64::from(u8::from(l))).collect();

    let mut beta = vec![0.0f64; n_features + 1];
    let mut dev = deviance(&design, &y, &beta);
    let mut iterations = 0;
    let mut converged = false;

    debug!(n_samples, n_features, n_positive, "fitting logistic regression");

    for iteration in 1..=config.max_iter {
        iterations = iteration;
        let (info, score) = information_and_score(&design, &y, &beta);
        let l = cholesky(&info).ok_or(GlmError::SingularInformation { iteration })?;
        let step = cholesky_solve(&l, &score);

        let mut scale = 1.0;
        let mut candidate: Vec<f64>;
        let mut candidate_dev;
        let mut halvings = 0;
        loop {
            candidate = beta.iter().zip(&step).map(|(b, s)| b + scale * s).collect();
            candidate_dev = deviance(&design, &y, &candidate);
            if candidate_dev <= dev * (1.0 + 1e-10) || halvings == MAX_HALVINGS {
                break;
            }
            scale *= 0.5;
            halvings += 1;
        }

        let change = (candidate_dev - dev).abs() / (candidate_dev.abs() + 0.1);
        beta = candidate;
        dev = candidate_dev;
        debug!(iteration, deviance = dev, step_scale = scale, "irls step");

        if change < config.tol {
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(
            iterations,
            deviance = dev,
            "logistic regression did not converge; estimates may be unstable"
        );
    }

    let (info, _) = information_and_score(&design, &y, &beta);
    let l = cholesky(&info).ok_or(GlmError::SingularInformation { iteration: 0 })?;
    let covariance = cholesky_inverse(&l);

    let normal = Normal::new(0.0, 1.0).map_err(|e| GlmError::Distribution {
        reason: e.to_string(),
    })?;
    let z_crit = normal.inverse_cdf(1.0 - (1.0 - config.confidence_level) / 2.0);

    let row = |idx: usize, name: &str| -> Coefficient {
        let estimate = beta[idx];
        let std_error = covariance[idx][idx].max(0.0).sqrt();
        let z_value = estimate / std_error;
        Coefficient {
            name: name.to_string(),
            estimate,
            std_error,
            z_value,
            p_value: 2.0 * normal.cdf(-z_value.abs()),
            odds_ratio: estimate.exp(),
            ci_lower: (estimate - z_crit * std_error).exp(),
            ci_upper: (estimate + z_crit * std_error).exp(),
        }
    };

    let intercept = row(0, INTERCEPT_NAME);
    let coefficients: Vec<Coefficient> = feature_names
        .iter()
        .enumerate()
        .map(|(j, name)| row(j + 1, name))
        .collect();

    let n = n_samples as f64;
    let p_bar = n_positive as f64 / n;
    let null_deviance =
        -2.0 * (n_positive as f64 * p_bar.ln() + (n - n_positive as f64) * (1.0 - p_bar).ln());

    info!(
        iterations,
        converged,
        deviance = dev,
        null_deviance,
        "logistic regression fitted"
    );

    Ok(LogisticFit {
        intercept,
        coefficients,
        confidence_level: config.confidence_level,
        iterations,
        converged,
        log_likelihood: -dev / 2.0,
        null_deviance,
        deviance: dev,
        n_samples,
    })
}
