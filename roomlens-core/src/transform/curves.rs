//! Built-in transform curves
//!
//! Each curve is a pure `f64 -> f64` function. Curves shape a raw feature
//! value before it is clamped to `[0, 1]` and interpolated into the
//! feature's output range.
//!
//! | curve         | parameters                          | shape                                   |
//! |---------------|-------------------------------------|-----------------------------------------|
//! | `identity`    |                                     | passthrough                             |
//! | `clamp01`     |                                     | clamp to `[0, 1]`                       |
//! | `log10_clamp` | `floor_db = -60`                    | amplitude to dB, `floor_db`..0 → 0..1   |
//! | `softclip`    | `threshold = 0.8`, `slope = 4`      | linear below threshold, eased above     |
//! | `inverse_exp` | `centers = [1.0]`, `k = 1`          | mean closeness score below each center  |

use crate::errors::ArgumentError;
use crate::mapping::clamp01;

use super::parser::{Literal, TransformCall};

/// Default floor for `log10_clamp`, in dB
pub const DEFAULT_FLOOR_DB: f64 = -60.0;

/// Default knee for `softclip`
pub const DEFAULT_SOFTCLIP_THRESHOLD: f64 = 0.8;

/// Default exponent for `softclip`
pub const DEFAULT_SOFTCLIP_SLOPE: f64 = 4.0;

/// Smallest rate `inverse_exp` will use
pub const MIN_INVERSE_EXP_K: f64 = 1e-6;

/// A constructed transform curve
#[derive(Debug, Clone, PartialEq)]
pub enum Curve {
    /// Returns input unchanged
    Identity,
    /// Clamps input to `[0, 1]`
    Clamp01,
    /// Linear amplitude to normalized decibels
    Log10Clamp {
        /// Level that maps to 0
        floor_db: f64,
    },
    /// Passthrough below `threshold`, compressed above
    SoftClip {
        /// Knee, already clamped to `[0, 1]`
        threshold: f64,
        /// Exponent applied to the excess, at least 1
        slope: f64,
    },
    /// Average of per-center exponential closeness scores
    InverseExp {
        /// Positive centers
        centers: Vec<f64>,
        /// Rate, strictly positive
        k: f64,
    },
}

impl Curve {
    /// Evaluate the curve
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            Self::Identity => x,
            Self::Clamp01 => clamp01(x),
            Self::Log10Clamp { floor_db } => log10_clamp(x, *floor_db),
            Self::SoftClip { threshold, slope } => softclip(x, *threshold, *slope),
            Self::InverseExp { centers, k } => inverse_exp(x, centers, *k),
        }
    }

    /// Registered name of this curve
    pub fn name(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Clamp01 => "clamp01",
            Self::Log10Clamp { .. } => "log10_clamp",
            Self::SoftClip { .. } => "softclip",
            Self::InverseExp { .. } => "inverse_exp",
        }
    }
}

fn log10_clamp(x: f64, floor_db: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let db = 20.0 * x.log10();
    clamp01((db - floor_db) / -floor_db)
}

fn softclip(x: f64, threshold: f64, slope: f64) -> f64 {
    let x = clamp01(x);
    if threshold >= 1.0 || x <= threshold {
        return x;
    }
    let excess = (x - threshold) / (1.0 - threshold);
    threshold + (1.0 - threshold) * excess.powf(slope)
}

fn inverse_exp(x: f64, centers: &[f64], k: f64) -> f64 {
    let total: f64 = centers
        .iter()
        .map(|&center| {
            if x >= center {
                0.0
            } else {
                1.0 - (-k * (center - x) / center).exp()
            }
        })
        .sum();
    clamp01(total / centers.len() as f64)
}

/// Signature of a curve factory
pub type CurveFactory = fn(&TransformCall) -> Result<Curve, ArgumentError>;

/// Registered curve factories
pub static REGISTRY: &[(&str, CurveFactory)] = &[
    ("identity", build_identity),
    ("clamp01", build_clamp01),
    ("log10_clamp", build_log10_clamp),
    ("softclip", build_softclip),
    ("inverse_exp", build_inverse_exp),
];

/// Factory for a curve name
pub fn factory(name: &str) -> Option<CurveFactory> {
    REGISTRY
        .iter()
        .find(|(registered, _)| *registered == name)
        .map(|(_, factory)| *factory)
}

/// Registered curve names
pub fn names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|(name, _)| *name)
}

/// Bind call arguments to parameter names the way a keyword-aware call would
fn bind<'a>(
    call: &'a TransformCall,
    params: &[&'static str],
) -> Result<Vec<Option<&'a Literal>>, ArgumentError> {
    if call.args.len() > params.len() {
        return Err(ArgumentError::TooManyPositional {
            max: params.len(),
            given: call.args.len(),
        });
    }

    let mut bound: Vec<Option<&Literal>> = vec![None; params.len()];
    for (slot, value) in bound.iter_mut().zip(&call.args) {
        *slot = Some(value);
    }

    for (keyword, value) in &call.kwargs {
        let index = params
            .iter()
            .position(|p| *p == keyword.as_str())
            .ok_or_else(|| ArgumentError::UnexpectedKeyword(keyword.clone()))?;
        if bound[index].is_some() {
            return Err(ArgumentError::Duplicate(keyword.clone()));
        }
        bound[index] = Some(value);
    }

    Ok(bound)
}

fn number(
    value: Option<&Literal>,
    param: &'static str,
    default: f64,
) -> Result<f64, ArgumentError> {
    match value {
        None => Ok(default),
        Some(Literal::Number(n)) => Ok(*n),
        Some(_) => Err(ArgumentError::WrongType {
            param,
            expected: "a number",
        }),
    }
}

fn build_identity(call: &TransformCall) -> Result<Curve, ArgumentError> {
    bind(call, &[])?;
    Ok(Curve::Identity)
}

fn build_clamp01(call: &TransformCall) -> Result<Curve, ArgumentError> {
    bind(call, &[])?;
    Ok(Curve::Clamp01)
}

fn build_log10_clamp(call: &TransformCall) -> Result<Curve, ArgumentError> {
    let args = bind(call, &["floor_db"])?;
    let floor_db = number(args[0], "floor_db", DEFAULT_FLOOR_DB)?;
    if floor_db.is_nan() || floor_db >= 0.0 {
        return Err(ArgumentError::OutOfDomain {
            param: "floor_db",
            reason: "must be below 0 dB",
        });
    }
    Ok(Curve::Log10Clamp { floor_db })
}

fn build_softclip(call: &TransformCall) -> Result<Curve, ArgumentError> {
    let args = bind(call, &["threshold", "slope"])?;
    let threshold = number(args[0], "threshold", DEFAULT_SOFTCLIP_THRESHOLD)?;
    let slope = number(args[1], "slope", DEFAULT_SOFTCLIP_SLOPE)?;
    Ok(Curve::SoftClip {
        threshold: clamp01(threshold),
        slope: slope.max(1.0),
    })
}

fn build_inverse_exp(call: &TransformCall) -> Result<Curve, ArgumentError> {
    let args = bind(call, &["centers", "k"])?;

    let mut centers = match args[0] {
        None => Vec::new(),
        Some(Literal::Number(n)) => vec![*n],
        Some(Literal::List(items)) => items
            .iter()
            .map(|item| {
                item.as_f64().ok_or(ArgumentError::WrongType {
                    param: "centers",
                    expected: "a list of numbers",
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(Literal::Str(_)) => {
            return Err(ArgumentError::WrongType {
                param: "centers",
                expected: "a list of numbers",
            })
        }
    };
    if centers.iter().any(|c| c.is_nan() || *c <= 0.0) {
        return Err(ArgumentError::OutOfDomain {
            param: "centers",
            reason: "must all be positive",
        });
    }
    if centers.is_empty() {
        centers.push(1.0);
    }

    let k = number(args[1], "k", 1.0)?;
    let k = if k > 0.0 { k } else { MIN_INVERSE_EXP_K };

    Ok(Curve::InverseExp { centers, k })
}
