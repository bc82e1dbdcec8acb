//! Numeric kernel (C9): the fourteen uncertainty-aware number systems.
//!
//! Each variant is its own module, one file per topic, in the style of
//! `tools/stdlib/math.rs`: a validated struct, a `new` constructor,
//! arithmetic where the variant defines it, and a sampler where sampling is
//! meaningful. Constructors return a plain `Result<Self, String>` — the
//! runtime attaches a span and wraps the reason in
//! [`crate::error::Error::NumericDomainError`] at the call site, so this
//! module stays independent of spans and diagnostics.

pub mod affine;
pub mod bayesian;
pub mod beta;
pub mod dempster_shafer;
pub mod fuzzy;
pub mod hyperreal;
pub mod imprecise;
pub mod lottery;
pub mod normal;
pub mod padic_adv;
pub mod padic_prob;
pub mod risk;
pub mod surreal_adv;
pub mod surreal_fuzzy;

use crate::prng::PrngState;

/// Closed set of the fourteen uncertainty variants. Dispatch is on the tag,
/// not on open-ended inheritance — the variant set is fixed per the design
/// notes.
#[derive(Debug, Clone, PartialEq)]
pub enum Uncertainty {
    Normal(normal::DistNormal),
    Beta(beta::DistBeta),
    Affine(affine::Affine),
    FuzzyTriangular(fuzzy::FuzzyTriangular),
    SurrealFuzzy(surreal_fuzzy::SurrealFuzzy),
    Bayesian(bayesian::Bayesian),
    Risk(risk::Risk),
    PAdicProb(padic_prob::PAdicProb),
    Lottery(lottery::Lottery),
    Hyperreal(hyperreal::Hyperreal),
    SurrealAdv(surreal_adv::SurrealAdv),
    PAdicAdv(padic_adv::PAdicAdv),
    Imprecise(imprecise::Imprecise),
    DempsterShafer(dempster_shafer::DempsterShafer),
}

/// Outcome of sampling an uncertainty variant: either a scalar draw or a
/// label (for variants whose domain is a set of symbolic outcomes).
#[derive(Debug, Clone, PartialEq)]
pub enum Sample {
    Scalar(f64),
    Label(String),
    LabelSet(Vec<String>),
}

impl Uncertainty {
    pub fn tag(&self) -> &'static str {
        match self {
            Uncertainty::Normal(_) => "DistNormal",
            Uncertainty::Beta(_) => "DistBeta",
            Uncertainty::Affine(_) => "Affine",
            Uncertainty::FuzzyTriangular(_) => "FuzzyTriangular",
            Uncertainty::SurrealFuzzy(_) => "SurrealFuzzy",
            Uncertainty::Bayesian(_) => "Bayesian",
            Uncertainty::Risk(_) => "Risk",
            Uncertainty::PAdicProb(_) => "pAdicProb",
            Uncertainty::Lottery(_) => "Lottery",
            Uncertainty::Hyperreal(_) => "Hyperreal",
            Uncertainty::SurrealAdv(_) => "SurrealAdv",
            Uncertainty::PAdicAdv(_) => "pAdicAdv",
            Uncertainty::Imprecise(_) => "Imprecise",
            Uncertainty::DempsterShafer(_) => "DempsterShafer",
        }
    }

    /// Draws from the variant. Variants with no inherent
    /// randomness (p-adic numbers, hyperreals, surreals) return their
    /// canonical real/label value and do not consume PRNG state — the only
    /// operations that advance entropy are the ones that genuinely draw.
    pub fn sample(&self, prng: PrngState) -> (Sample, PrngState) {
        match self {
            Uncertainty::Normal(d) => {
                let (v, next) = d.sample(prng);
                (Sample::Scalar(v), next)
            }
            Uncertainty::Beta(d) => {
                let (v, next) = d.sample(prng);
                (Sample::Scalar(v), next)
            }
            Uncertainty::Affine(d) => {
                let (v, next) = d.sample(prng);
                (Sample::Scalar(v), next)
            }
            Uncertainty::FuzzyTriangular(d) => {
                let (v, next) = d.sample(prng);
                (Sample::Scalar(v), next)
            }
            Uncertainty::SurrealFuzzy(d) => {
                let (v, next) = d.sample(prng);
                (Sample::Scalar(v), next)
            }
            Uncertainty::Bayesian(d) => {
                let (v, next) = d.sample(prng);
                (Sample::Scalar(v), next)
            }
            Uncertainty::Risk(d) => {
                let (v, next) = d.sample(prng);
                (Sample::Scalar(v), next)
            }
            Uncertainty::PAdicProb(d) => (Sample::Scalar(d.to_real()), prng),
            Uncertainty::Lottery(d) => {
                let (label, next) = d.sample(prng);
                (Sample::Label(label), next)
            }
            Uncertainty::Hyperreal(d) => (Sample::Scalar(d.standard_part()), prng),
            Uncertainty::SurrealAdv(d) => (Sample::Scalar(d.to_real(d.default_depth())), prng),
            Uncertainty::PAdicAdv(d) => (Sample::Scalar(d.to_real()), prng),
            Uncertainty::Imprecise(d) => {
                let (v, next) = d.sample(prng);
                (Sample::Scalar(v), next)
            }
            Uncertainty::DempsterShafer(d) => {
                let (labels, next) = d.sample(prng);
                (Sample::LabelSet(labels), next)
            }
        }
    }
}
