//! Sample-size planning for a two-sample t-test.
//!
//! Power is computed from the noncentral t distribution and the required
//! group size is found by bisection on `n`. The noncentral CDF follows
//! Lenth's series (AS 243) over the regularized incomplete beta function.

use serde::{Deserialize, Serialize};
use statrs::{
    distribution::{ContinuousCDF, StudentsT},
    function::{
        beta::beta_reg,
        erf::{erfc, erfc_inv},
        gamma::ln_gamma,
    },
};
use std::f64::consts::{PI, SQRT_2};
use tracing::debug;

use crate::error::{Result, SurveyError};

/// Which tail(s) the test rejects in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alternative {
    TwoSided,
    Larger,
    Smaller,
}

/// Parameters of an independent two-sample t-test power analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerParams {
    /// Standardized effect size (Cohen's d).
    pub effect_size: f64,
    pub alpha: f64,
    /// Target power, 1 - β.
    pub power: f64,
    /// Size of the second group relative to the first.
    pub ratio: f64,
    pub alternative: Alternative,
}

impl Default for PowerParams {
    fn default() -> Self {
        Self {
            effect_size: 0.8,
            alpha: 0.05,
            power: 0.8,
            ratio: 1.0,
            alternative: Alternative::TwoSided,
        }
    }
}

impl PowerParams {
    fn validate(&self) -> Result<()> {
        let in_unit = |v: f64| v > 0.0 && v < 1.0;
        if !(self.effect_size.is_finite() && self.effect_size != 0.0) {
            return Err(SurveyError::InvalidParameter(format!(
                "effect size must be finite and non-zero, got {}",
                self.effect_size
            )));
        }
        if !in_unit(self.alpha) || !in_unit(self.power) {
            return Err(SurveyError::InvalidParameter(format!(
                "alpha and power must lie in (0, 1), got {} and {}",
                self.alpha, self.power
            )));
        }
        if !(self.ratio.is_finite() && self.ratio > 0.0) {
            return Err(SurveyError::InvalidParameter(format!(
                "ratio must be positive, got {}",
                self.ratio
            )));
        }
        Ok(())
    }
}

const ITRMAX: usize = 1_000;
const ERRMAX: f64 = 1e-12;

/// Above this many degrees of freedom the t quantile is taken from the normal.
const NORMAL_DF: f64 = 1e5;
/// Largest first-group size the solver will try.
pub const MAX_NOBS: f64 = 1e6;

/// Quantile `p` of Student's t with `df` degrees of freedom.
pub fn t_quantile(df: f64, p: f64) -> Result<f64> {
    if df > NORMAL_DF {
        return Ok(-SQRT_2 * erfc_inv(2.0 * p));
    }
    let t = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| SurveyError::InvalidParameter(format!("t distribution: {}", e)))?;
    Ok(t.inverse_cdf(p))
}

/// CDF of the noncentral t distribution, P(T <= t) with `df` degrees of freedom
/// and noncentrality `delta`.
pub fn noncentral_t_cdf(t: f64, df: f64, delta: f64) -> f64 {
    if t.is_infinite() {
        return if t > 0.0 { 1.0 } else { 0.0 };
    }
    let (tt, del, negdel) = if t < 0.0 {
        (-t, -delta, true)
    } else {
        (t, delta, false)
    };

    let mut tnc = 0.0;
    let x = tt * tt / (tt * tt + df);
    if x > 0.0 {
        let lambda = del * del;
        let mut p = 0.5 * (-0.5 * lambda).exp();
        let mut q = (2.0 / PI).sqrt() * p * del;
        let mut s = 0.5 - p;
        let mut a = 0.5;
        let b = 0.5 * df;
        let rxb = (1.0 - x).powf(b);
        let albeta = 0.5 * PI.ln() + ln_gamma(b) - ln_gamma(0.5 + b);
        let mut xodd = beta_reg(a, b, x);
        let mut godd = 2.0 * rxb * (a * x.ln() - albeta).exp();
        let mut xeven = 1.0 - rxb;
        let mut geven = b * x * rxb;
        tnc = p * xodd + q * xeven;

        let mut en = 1.0;
        for _ in 0..ITRMAX {
            a += 1.0;
            xodd -= godd;
            xeven -= geven;
            godd *= x * (a + b - 1.0) / a;
            geven *= x * (a + b - 0.5) / (a + 0.5);
            p *= lambda / (2.0 * en);
            q *= lambda / (2.0 * en + 1.0);
            s -= p;
            en += 1.0;
            tnc += p * xodd + q * xeven;
            if 2.0 * s * (xodd - godd) <= ERRMAX {
                break;
            }
        }
    }

    // upper normal tail at del
    tnc += 0.5 * erfc(del / SQRT_2);
    let tnc = if negdel { 1.0 - tnc } else { tnc };
    tnc.clamp(0.0, 1.0)
}

/// Power of the test for `nobs1` observations in the first group.
pub fn power(params: &PowerParams, nobs1: f64) -> Result<f64> {
    let nobs2 = nobs1 * params.ratio;
    let df = nobs1 + nobs2 - 2.0;
    if !(df > 0.0) {
        return Err(SurveyError::InvalidParameter(format!(
            "degrees of freedom must be positive, got {}",
            df
        )));
    }
    let nc = params.effect_size * (nobs1 * nobs2 / (nobs1 + nobs2)).sqrt();

    let sf = |crit: f64| 1.0 - noncentral_t_cdf(crit, df, nc);
    let cdf = |crit: f64| noncentral_t_cdf(crit, df, nc);

    let value = match params.alternative {
        Alternative::TwoSided => {
            let crit = t_quantile(df, 1.0 - params.alpha / 2.0)?;
            sf(crit) + cdf(-crit)
        }
        Alternative::Larger => sf(t_quantile(df, 1.0 - params.alpha)?),
        Alternative::Smaller => cdf(t_quantile(df, params.alpha)?),
    };
    Ok(value)
}

/// Smallest (fractional) first-group size reaching the target power.
#[tracing::instrument(level = "debug")]
pub fn solve_sample_size(params: &PowerParams) -> Result<f64> {
    params.validate()?;

    // df = n1 (1 + ratio) - 2 must stay positive
    let mut lo = f64::max(2.0, 2.0 / (1.0 + params.ratio) + 0.5);
    let gap = |n: f64| power(params, n).map(|p| p - params.power);

    if gap(lo)? >= 0.0 {
        return Ok(lo);
    }

    // grow the bracket until the target power is reached
    let mut hi = lo * 2.0;
    while gap(hi)? < 0.0 {
        if hi >= MAX_NOBS {
            return Err(SurveyError::InvalidParameter(format!(
                "target power {} not reachable below n = {}",
                params.power, MAX_NOBS
            )));
        }
        lo = hi;
        hi = (hi * 2.0).min(MAX_NOBS);
    }
    debug!(lo, hi, "bracketed sample size");

    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        if gap(mid)? < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < 1e-9 {
            break;
        }
    }
    let n = 0.5 * (lo + hi);
    debug!(n, "solved sample size");
    Ok(n)
}
