//! Classical hypothesis tests used by the significance stage.

use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

use crate::math::stats::{mean, sample_variance, sum_sq_dev};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnovaOutcome {
    pub f_stat: f64,
    pub df_between: f64,
    pub df_within: f64,
    pub p_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTestOutcome {
    pub t_stat: f64,
    pub df: f64,
    pub p_value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TestError {
    TooFewGroups(usize),
    EmptyGroup,
    NoResidualFreedom,
    Degenerate,
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewGroups(k) => write!(f, "need at least 2 groups, got {}", k),
            Self::EmptyGroup => write!(f, "group without observations"),
            Self::NoResidualFreedom => write!(f, "no residual degrees of freedom"),
            Self::Degenerate => write!(f, "zero variance and no difference between groups"),
        }
    }
}

pub fn significance_symbol(p_value: f64) -> &'static str {
    if p_value < 0.001 {
        "***"
    } else if p_value < 0.01 {
        "**"
    } else if p_value < 0.05 {
        "*"
    } else {
        "ns"
    }
}

/// One-way ANOVA omnibus F-test.
pub fn one_way_anova(groups: &[&[f64]]) -> Result<AnovaOutcome, TestError> {
    let k = groups.len();
    if k < 2 {
        return Err(TestError::TooFewGroups(k));
    }
    if groups.iter().any(|g| g.is_empty()) {
        return Err(TestError::EmptyGroup);
    }
    let n: usize = groups.iter().map(|g| g.len()).sum();
    if n <= k {
        return Err(TestError::NoResidualFreedom);
    }

    let all: Vec<f64> = groups.iter().flat_map(|g| g.iter().copied()).collect();
    let grand = mean(&all).ok_or(TestError::EmptyGroup)?;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for g in groups {
        let m = mean(g).ok_or(TestError::EmptyGroup)?;
        ss_between += g.len() as f64 * (m - grand) * (m - grand);
        ss_within += sum_sq_dev(g).ok_or(TestError::EmptyGroup)?;
    }

    let df_between = (k - 1) as f64;
    let df_within = (n - k) as f64;

    if ss_within == 0.0 {
        if ss_between > 0.0 {
            return Ok(AnovaOutcome {
                f_stat: f64::INFINITY,
                df_between,
                df_within,
                p_value: 0.0,
            });
        }
        return Err(TestError::Degenerate);
    }

    let f_stat = (ss_between / df_between) / (ss_within / df_within);
    let dist = FisherSnedecor::new(df_between, df_within).map_err(|_| TestError::Degenerate)?;
    Ok(AnovaOutcome {
        f_stat,
        df_between,
        df_within,
        p_value: dist.sf(f_stat),
    })
}

/// Two-sample, two-sided t-test of `b` against `a`.
///
/// `welch = false` pools variances (Student); `welch = true` uses the
/// Welch-Satterthwaite degrees of freedom.
pub fn two_sample_t_test(a: &[f64], b: &[f64], welch: bool) -> Result<TTestOutcome, TestError> {
    if a.is_empty() || b.is_empty() {
        return Err(TestError::EmptyGroup);
    }
    let na = a.len() as f64;
    let nb = b.len() as f64;
    let ma = mean(a).ok_or(TestError::EmptyGroup)?;
    let mb = mean(b).ok_or(TestError::EmptyGroup)?;
    let diff = mb - ma;

    let (se, df) = if welch {
        let va = sample_variance(a).ok_or(TestError::NoResidualFreedom)?;
        let vb = sample_variance(b).ok_or(TestError::NoResidualFreedom)?;
        let qa = va / na;
        let qb = vb / nb;
        let se = (qa + qb).sqrt();
        let denom = qa * qa / (na - 1.0) + qb * qb / (nb - 1.0);
        let df = if denom > 0.0 {
            (qa + qb) * (qa + qb) / denom
        } else {
            na + nb - 2.0
        };
        (se, df)
    } else {
        let df = na + nb - 2.0;
        if df < 1.0 {
            return Err(TestError::NoResidualFreedom);
        }
        let ss = sum_sq_dev(a).ok_or(TestError::EmptyGroup)?
            + sum_sq_dev(b).ok_or(TestError::EmptyGroup)?;
        let pooled = ss / df;
        ((pooled * (1.0 / na + 1.0 / nb)).sqrt(), df)
    };

    if se == 0.0 {
        if diff != 0.0 {
            return Ok(TTestOutcome {
                t_stat: diff.signum() * f64::INFINITY,
                df,
                p_value: 0.0,
            });
        }
        return Err(TestError::Degenerate);
    }

    let t_stat = diff / se;
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|_| TestError::Degenerate)?;
    let p_value = (2.0 * dist.sf(t_stat.abs())).min(1.0);
    Ok(TTestOutcome {
        t_stat,
        df,
        p_value,
    })
}
