//! DempsterShafer: (focal-elements, masses), masses non-negative and
//! summing to 1 (within tolerance). Belief functions generalize probability
//! to sets of hypotheses ("focal elements"); Dempster's rule of combination
//! merges two independent bodies of evidence.

use crate::prng::PrngState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const MASS_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DempsterShafer {
    pub focal_elements: Vec<Vec<String>>,
    pub masses: Vec<f64>,
}

fn as_set(labels: &[String]) -> BTreeSet<&str> {
    labels.iter().map(|s| s.as_str()).collect()
}

fn intersects(a: &[String], b: &[String]) -> bool {
    let sb = as_set(b);
    a.iter().any(|l| sb.contains(l.as_str()))
}

fn is_subset(a: &[String], b: &[String]) -> bool {
    let sb = as_set(b);
    a.iter().all(|l| sb.contains(l.as_str()))
}

fn intersection(a: &[String], b: &[String]) -> Vec<String> {
    let sb = as_set(b);
    a.iter().filter(|l| sb.contains(l.as_str())).cloned().collect()
}

fn normalize_key(labels: &[String]) -> Vec<String> {
    let mut v: Vec<String> = labels.to_vec();
    v.sort();
    v.dedup();
    v
}

impl DempsterShafer {
    pub fn new(focal_elements: Vec<Vec<String>>, masses: Vec<f64>) -> Result<Self, String> {
        if focal_elements.len() != masses.len() {
            return Err(format!(
                "DempsterShafer requires equal-length focal elements and masses, got {} and {}",
                focal_elements.len(),
                masses.len()
            ));
        }
        if focal_elements.is_empty() {
            return Err("DempsterShafer requires at least one focal element".to_string());
        }
        if masses.iter().any(|&m| m < 0.0) {
            return Err("DempsterShafer masses must be non-negative".to_string());
        }
        let total: f64 = masses.iter().sum();
        if (total - 1.0).abs() > MASS_TOLERANCE {
            return Err(format!(
                "DempsterShafer masses must sum to 1 (within {:e}), got {}",
                MASS_TOLERANCE, total
            ));
        }
        Ok(DempsterShafer {
            focal_elements,
            masses,
        })
    }

    /// `bel(H) = Σ m(F)` over focal elements `F ⊆ H`.
    pub fn belief(&self, hypothesis: &[String]) -> f64 {
        self.focal_elements
            .iter()
            .zip(&self.masses)
            .filter(|(f, _)| is_subset(f, hypothesis))
            .map(|(_, m)| m)
            .sum()
    }

    /// `pl(H) = Σ m(F)` over focal elements `F` with `F ∩ H ≠ ∅`.
    pub fn plausibility(&self, hypothesis: &[String]) -> f64 {
        self.focal_elements
            .iter()
            .zip(&self.masses)
            .filter(|(f, _)| intersects(f, hypothesis))
            .map(|(_, m)| m)
            .sum()
    }

    /// Dempster's rule: intersects focal sets pairwise, multiplies masses,
    /// and renormalizes over the non-empty intersections. Fails if every
    /// pairwise intersection is empty (total conflict, zero normalizer).
    pub fn combine(&self, other: &DempsterShafer) -> Result<DempsterShafer, String> {
        let mut merged: Vec<(Vec<String>, f64)> = Vec::new();
        for (f1, m1) in self.focal_elements.iter().zip(&self.masses) {
            for (f2, m2) in other.focal_elements.iter().zip(&other.masses) {
                let inter = intersection(f1, f2);
                if inter.is_empty() {
                    continue;
                }
                let key = normalize_key(&inter);
                let mass = m1 * m2;
                if let Some(entry) = merged.iter_mut().find(|(k, _)| *k == key) {
                    entry.1 += mass;
                } else {
                    merged.push((key, mass));
                }
            }
        }
        let total: f64 = merged.iter().map(|(_, m)| m).sum();
        if total <= MASS_TOLERANCE {
            return Err(
                "Dempster-Shafer combination has total conflict (masses do not overlap)".to_string(),
            );
        }
        let focal_elements = merged.iter().map(|(k, _)| k.clone()).collect();
        let masses = merged.iter().map(|(_, m)| m / total).collect();
        DempsterShafer::new(focal_elements, masses)
    }

    /// Draws a focal element with probability proportional to its mass,
    /// returning its label set.
    pub fn sample(&self, prng: PrngState) -> (Vec<String>, PrngState) {
        let (u, next) = prng.next_f64();
        let total: f64 = self.masses.iter().sum();
        let target = u * total;
        let mut acc = 0.0;
        for (f, &m) in self.focal_elements.iter().zip(&self.masses) {
            acc += m;
            if target < acc {
                return (f.clone(), next);
            }
        }
        (self.focal_elements.last().unwrap().clone(), next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn rejects_masses_not_summing_to_one() {
        let f = vec![labels(&["a"]), labels(&["b"])];
        assert!(DempsterShafer::new(f, vec![0.3, 0.3]).is_err());
    }

    #[test]
    fn belief_sums_subsets() {
        let ds = DempsterShafer::new(
            vec![labels(&["a"]), labels(&["a", "b"]), labels(&["b"])],
            vec![0.3, 0.5, 0.2],
        )
        .unwrap();
        assert!((ds.belief(&labels(&["a", "b"])) - 1.0).abs() < 1e-12);
        assert!((ds.belief(&labels(&["a"])) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn plausibility_sums_intersecting_sets() {
        let ds = DempsterShafer::new(
            vec![labels(&["a"]), labels(&["a", "b"]), labels(&["b"])],
            vec![0.3, 0.5, 0.2],
        )
        .unwrap();
        assert!((ds.plausibility(&labels(&["a"])) - 0.8).abs() < 1e-12);
    }

    #[test]
    fn combine_renormalizes_over_intersections() {
        let a = DempsterShafer::new(vec![labels(&["a"]), labels(&["b"])], vec![0.6, 0.4]).unwrap();
        let b = DempsterShafer::new(vec![labels(&["a"]), labels(&["b"])], vec![0.5, 0.5]).unwrap();
        let combined = a.combine(&b).unwrap();
        let sum: f64 = combined.masses.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn combine_fails_on_total_conflict() {
        let a = DempsterShafer::new(vec![labels(&["a"])], vec![1.0]).unwrap();
        let b = DempsterShafer::new(vec![labels(&["b"])], vec![1.0]).unwrap();
        assert!(a.combine(&b).is_err());
    }
}
