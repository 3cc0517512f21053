//! Six-digit redemption codes.

use std::fmt;

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

pub const CODE_MIN: u32 = 100_000;
pub const CODE_MAX: u32 = 999_999;

/// A code shown to the user while a redemption runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RedemptionCode(u32);

impl RedemptionCode {
    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RedemptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06}", self.0)
    }
}

impl From<RedemptionCode> for String {
    fn from(code: RedemptionCode) -> Self {
        code.to_string()
    }
}

impl TryFrom<String> for RedemptionCode {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let n: u32 = s.parse().map_err(|_| format!("not a number: {s}"))?;
        if (CODE_MIN..=CODE_MAX).contains(&n) {
            Ok(Self(n))
        } else {
            Err(format!("code out of range: {s}"))
        }
    }
}

/// Uniform source of codes.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    rng: Mcg128Xsl64,
}

impl CodeGenerator {
    pub fn from_entropy() -> Self {
        Self {
            rng: Mcg128Xsl64::from_entropy(),
        }
    }

    /// Deterministic sequence, for tests and `code --seed`.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mcg128Xsl64::seed_from_u64(seed),
        }
    }

    pub fn next_code(&mut self) -> RedemptionCode {
        RedemptionCode(self.rng.gen_range(CODE_MIN..=CODE_MAX))
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl Iterator for CodeGenerator {
    type Item = RedemptionCode;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_thousand_codes_are_six_digits() {
        let mut gen = CodeGenerator::from_entropy();
        for _ in 0..10_000 {
            let code = gen.next_code();
            assert!((CODE_MIN..=CODE_MAX).contains(&code.value()));
            assert_eq!(code.to_string().len(), 6);
        }
    }

    #[test]
    fn seeded_generators_repeat() {
        let a: Vec<_> = CodeGenerator::seeded(7).take(5).collect();
        let b: Vec<_> = CodeGenerator::seeded(7).take(5).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn serializes_as_string() {
        let code = RedemptionCode::try_from("123456".to_string()).unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"123456\"");
        assert!(RedemptionCode::try_from("012345".to_string()).is_err());
        assert!(RedemptionCode::try_from("abc".to_string()).is_err());
    }
}
