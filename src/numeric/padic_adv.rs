//! pAdicAdv: (prime, digits, valuation). A p-adic integer/number in digit
//! form: `digits[i]` is the coefficient of `prime^(valuation + i)`. Addition
//! aligns both operands by valuation, carries mod the prime, then
//! normalizes away any leading (low-order) zero digits produced by the
//! carry chain.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PAdicAdv {
    pub prime: u32,
    pub digits: Vec<u32>,
    pub valuation: i32,
}

fn is_prime(n: u32) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3u32;
    while d.saturating_mul(d) <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

impl PAdicAdv {
    pub fn new(prime: u32, digits: Vec<u32>, valuation: i32) -> Result<Self, String> {
        if !is_prime(prime) {
            return Err(format!("pAdicAdv requires a prime base, got {}", prime));
        }
        if let Some(&bad) = digits.iter().find(|&&d| d >= prime) {
            return Err(format!(
                "pAdicAdv digit {} out of range for prime {}",
                bad, prime
            ));
        }
        Ok(PAdicAdv {
            prime,
            digits,
            valuation,
        })
    }

    /// Σ dᵢ · primeⁱ⁺ᵛᵃˡᵘᵃᵗⁱᵒⁿ, the finite window of the expansion given.
    pub fn to_real(&self) -> f64 {
        let base = self.prime as f64;
        self.digits
            .iter()
            .enumerate()
            .map(|(i, &d)| d as f64 * base.powi(self.valuation + i as i32))
            .sum()
    }

    fn aligned_digits(&self, base_valuation: i32, length: usize) -> Vec<u32> {
        let offset = (self.valuation - base_valuation).max(0) as usize;
        let mut out = vec![0u32; length];
        for (i, &d) in self.digits.iter().enumerate() {
            let idx = offset + i;
            if idx < length {
                out[idx] = d;
            }
        }
        out
    }

    /// Aligns by valuation, adds with carry mod `prime`, then strips any
    /// leading zero digits the carry chain leaves behind (bumping the
    /// valuation to compensate).
    pub fn add(&self, other: &PAdicAdv) -> Result<PAdicAdv, String> {
        if self.prime != other.prime {
            return Err(format!(
                "cannot add pAdicAdv values with different primes ({} vs {})",
                self.prime, other.prime
            ));
        }
        let base_valuation = self.valuation.min(other.valuation);
        let self_end = self.valuation + self.digits.len() as i32;
        let other_end = other.valuation + other.digits.len() as i32;
        let end = self_end.max(other_end);
        let length = (end - base_valuation).max(0) as usize + 2;

        let a = self.aligned_digits(base_valuation, length);
        let b = other.aligned_digits(base_valuation, length);
        let mut result = vec![0u32; length];
        let mut carry = 0u32;
        for i in 0..length {
            let sum = a[i] + b[i] + carry;
            result[i] = sum % self.prime;
            carry = sum / self.prime;
        }

        let mut valuation = base_valuation;
        let mut start = 0;
        while start + 1 < result.len() && result[start] == 0 {
            start += 1;
            valuation += 1;
        }
        PAdicAdv::new(self.prime, result[start..].to_vec(), valuation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_prime_base() {
        assert!(PAdicAdv::new(4, vec![1, 2], 0).is_err());
    }

    #[test]
    fn rejects_out_of_range_digit() {
        assert!(PAdicAdv::new(5, vec![0, 5], 0).is_err());
    }

    #[test]
    fn to_real_weights_digits_by_valuation() {
        let p = PAdicAdv::new(5, vec![2, 0, 1], 0).unwrap();
        assert!((p.to_real() - (2.0 + 0.0 * 5.0 + 1.0 * 25.0)).abs() < 1e-9);
    }

    #[test]
    fn add_carries_mod_prime() {
        // base 5: 4 + 1 = 10 = 0*5^0 + 2*5^1
        let a = PAdicAdv::new(5, vec![4], 0).unwrap();
        let b = PAdicAdv::new(5, vec![1], 0).unwrap();
        let sum = a.add(&b).unwrap();
        assert_eq!(sum.to_real(), 10.0);
    }

    #[test]
    fn add_aligns_by_valuation() {
        let a = PAdicAdv::new(3, vec![1], 0).unwrap(); // 1 * 3^0 = 1
        let b = PAdicAdv::new(3, vec![1], 1).unwrap(); // 1 * 3^1 = 3
        let sum = a.add(&b).unwrap();
        assert_eq!(sum.to_real(), 4.0);
    }

    #[test]
    fn add_rejects_mismatched_primes() {
        let a = PAdicAdv::new(3, vec![1], 0).unwrap();
        let b = PAdicAdv::new(5, vec![1], 0).unwrap();
        assert!(a.add(&b).is_err());
    }
}
