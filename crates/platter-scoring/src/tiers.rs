//! Tier labels and cutoffs.

use crate::error::{Result, ScoreError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Merchant tier, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    /// Top brands: fee cuts to grow volume
    Gold,
    /// Next band: small fee cuts
    Silver,
    /// Everyone else
    Bronze,
}

impl Tier {
    /// All tiers, best first.
    pub const ALL: [Self; 3] = [Self::Gold, Self::Silver, Self::Bronze];

    /// Display name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Gold => "Gold",
            Self::Silver => "Silver",
            Self::Bronze => "Bronze",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// How ranks map to tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TierCutoffs {
    /// Top `gold_pct` percent are Gold, the next `silver_pct` percent Silver.
    ///
    /// Cutoff ranks are `ceil(n × pct / 100)`.
    Percentile {
        /// Percent of brands in Gold (default: 5)
        gold_pct: f64,
        /// Percent of brands in Silver (default: 20)
        silver_pct: f64,
    },
    /// Ranks `1..=gold` are Gold, `gold+1..=silver` Silver.
    Rank {
        /// Last Gold rank
        gold: usize,
        /// Last Silver rank
        silver: usize,
    },
}

impl Default for TierCutoffs {
    fn default() -> Self {
        Self::Percentile {
            gold_pct: 5.0,
            silver_pct: 20.0,
        }
    }
}

impl TierCutoffs {
    /// Check the cutoffs are usable.
    ///
    /// # Errors
    ///
    /// Percentages must be finite, non-negative and sum to at most 100;
    /// rank cutoffs must satisfy `gold <= silver`.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Percentile {
                gold_pct,
                silver_pct,
            } => {
                let ok = gold_pct.is_finite()
                    && silver_pct.is_finite()
                    && gold_pct >= 0.0
                    && silver_pct >= 0.0
                    && gold_pct + silver_pct <= 100.0;
                if !ok {
                    return Err(ScoreError::InvalidCutoffs(format!(
                        "gold {gold_pct}% + silver {silver_pct}% must be within 0..=100"
                    )));
                }
            }
            Self::Rank { gold, silver } => {
                if gold > silver {
                    return Err(ScoreError::InvalidCutoffs(format!(
                        "gold rank {gold} is after silver rank {silver}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Last Gold rank and last Silver rank for `n` brands.
    pub fn boundaries(&self, n: usize) -> (usize, usize) {
        match *self {
            Self::Percentile {
                gold_pct,
                silver_pct,
            } => {
                let cut = |pct: f64| ((n as f64) * pct / 100.0).ceil() as usize;
                (cut(gold_pct), cut(gold_pct + silver_pct).min(n))
            }
            Self::Rank { gold, silver } => (gold, silver),
        }
    }

    /// Tier for a 1-based rank among `n` brands.
    pub fn assign(&self, rank: usize, n: usize) -> Tier {
        let (gold, silver) = self.boundaries(n);
        if rank <= gold {
            Tier::Gold
        } else if rank <= silver {
            Tier::Silver
        } else {
            Tier::Bronze
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(200, (10, 50))]
    #[case(20, (1, 5))]
    #[case(7, (1, 2))]
    #[case(1, (1, 1))]
    #[case(0, (0, 0))]
    fn test_default_boundaries(#[case] n: usize, #[case] want: (usize, usize)) {
        assert_eq!(TierCutoffs::default().boundaries(n), want);
    }

    #[test]
    fn test_every_rank_gets_one_tier() {
        let cutoffs = TierCutoffs::default();
        let n = 200;
        let tiers: Vec<Tier> = (1..=n).map(|r| cutoffs.assign(r, n)).collect();
        assert_eq!(tiers.iter().filter(|t| **t == Tier::Gold).count(), 10);
        assert_eq!(tiers.iter().filter(|t| **t == Tier::Silver).count(), 40);
        assert_eq!(tiers.iter().filter(|t| **t == Tier::Bronze).count(), 150);
    }

    #[test]
    fn test_rank_cutoffs() {
        let cutoffs = TierCutoffs::Rank { gold: 2, silver: 3 };
        assert_eq!(cutoffs.assign(2, 10), Tier::Gold);
        assert_eq!(cutoffs.assign(3, 10), Tier::Silver);
        assert_eq!(cutoffs.assign(4, 10), Tier::Bronze);
    }

    #[test]
    fn test_validate() {
        assert!(TierCutoffs::default().validate().is_ok());
        assert!(
            TierCutoffs::Percentile {
                gold_pct: 60.0,
                silver_pct: 50.0
            }
            .validate()
            .is_err()
        );
        assert!(TierCutoffs::Rank { gold: 5, silver: 2 }.validate().is_err());
    }

    #[test]
    fn test_tier_order() {
        assert!(Tier::Gold < Tier::Silver);
        assert_eq!(Tier::Bronze.to_string(), "Bronze");
    }
}
