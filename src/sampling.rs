//! Sample domains and the integer distributions drawn from them.
//!
//! A benchmark samples two independent input dimensions (ambient-context
//! depth and object count), each described by a [`Domain`]: an inclusive
//! integer range plus a [`Distribution`]. The logarithmic distribution
//! exists so the small end of a range, where fixed overheads dominate, is
//! sampled as densely as the large end.

use std::fmt;

use rand::rngs::ThreadRng;
use rand::Rng;

/// How samples are spread across a domain's range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distribution {
    /// Uniform over the integer range.
    Linear,
    /// Uniform over the logarithm of the range, concentrating samples
    /// toward the minimum with a long tail toward the maximum.
    Logarithmic,
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distribution::Linear => f.write_str("linear"),
            Distribution::Logarithmic => f.write_str("logarithmic"),
        }
    }
}

/// An inclusive integer range paired with a sampling distribution.
///
/// Invariants: `min <= max`, and `min > 0` when the distribution is
/// logarithmic (zero has no logarithm). Both are enforced by
/// [`merge_str`](Self::merge_str).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    /// Inclusive lower bound.
    pub min: usize,
    /// Inclusive upper bound.
    pub max: usize,
    /// Sampling distribution.
    pub distribution: Distribution,
}

/// Error produced when a domain string cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainError {
    input: String,
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid domain \"{}\"", self.input)
    }
}

impl std::error::Error for DomainError {}

impl Domain {
    /// Creates a linear domain over `[min, max]`.
    pub const fn linear(min: usize, max: usize) -> Self {
        Self {
            min,
            max,
            distribution: Distribution::Linear,
        }
    }

    /// Applies a `MIN:MAX:DISTRIBUTION` string on top of the current
    /// settings.
    ///
    /// Up to three colon-separated fields; an empty (or omitted) field keeps
    /// the existing value. Fails on non-integer bounds, more than three
    /// fields, an unknown distribution name, `max < min`, or a logarithmic
    /// domain whose minimum is zero. On failure `self` is left unchanged.
    pub fn merge_str(&mut self, s: &str) -> Result<(), DomainError> {
        let err = || DomainError {
            input: s.to_owned(),
        };

        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() > 3 {
            return Err(err());
        }

        let mut updated = *self;

        if let Some(field) = fields.first().filter(|f| !f.is_empty()) {
            updated.min = field.parse().map_err(|_| err())?;
        }
        if let Some(field) = fields.get(1).filter(|f| !f.is_empty()) {
            updated.max = field.parse().map_err(|_| err())?;
        }
        if let Some(field) = fields.get(2).filter(|f| !f.is_empty()) {
            updated.distribution = match *field {
                "linear" => Distribution::Linear,
                "logarithmic" => Distribution::Logarithmic,
                _ => return Err(err()),
            };
        }

        if updated.max < updated.min {
            return Err(err());
        }
        if updated.distribution == Distribution::Logarithmic && updated.min == 0 {
            return Err(err());
        }

        *self = updated;
        Ok(())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.min, self.max, self.distribution)
    }
}

enum Impl {
    /// `min == max` for either distribution.
    Constant(usize),
    Linear { min: usize, max: usize },
    Logarithmic { ln_min: f64, ln_max: f64 },
}

/// Draws independent integer samples from a [`Domain`].
pub struct Generator {
    shape: Impl,
    rng: ThreadRng,
}

impl Generator {
    /// Builds a generator for `domain`.
    ///
    /// Expects the domain invariants to hold; a logarithmic domain with a
    /// zero minimum is a caller contract violation.
    pub fn new(domain: &Domain) -> Self {
        let shape = if domain.min == domain.max {
            Impl::Constant(domain.min)
        } else {
            match domain.distribution {
                Distribution::Linear => Impl::Linear {
                    min: domain.min,
                    max: domain.max,
                },
                Distribution::Logarithmic => {
                    assert!(domain.min > 0, "logarithmic domain with zero minimum");
                    Impl::Logarithmic {
                        ln_min: (domain.min as f64).ln(),
                        ln_max: (domain.max as f64).ln(),
                    }
                }
            }
        };
        Self {
            shape,
            rng: rand::thread_rng(),
        }
    }

    /// Returns one sample.
    pub fn generate(&mut self) -> usize {
        match self.shape {
            Impl::Constant(value) => value,
            Impl::Linear { min, max } => self.rng.gen_range(min..=max),
            Impl::Logarithmic { ln_min, ln_max } => {
                self.rng.gen_range(ln_min..=ln_max).exp().round() as usize
            }
        }
    }
}
