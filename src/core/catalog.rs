//! The catalog of investable funds.
use crate::core::error::{Result, WalletError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FundCategory {
    /// Voluntary pension fund
    Fpv,
    /// Collective investment fund
    Fic,
    /// Equity fund
    Fdo,
}

impl Display for FundCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                FundCategory::Fpv => "FPV",
                FundCategory::Fic => "FIC",
                FundCategory::Fdo => "FDO",
            }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                RiskTier::Low => "Low",
                RiskTier::Medium => "Medium",
                RiskTier::High => "High",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fund {
    pub id: String,
    pub name: String,
    pub category: FundCategory,
    pub minimum_amount: Decimal,
    /// Annual yield in percent.
    pub annual_yield: Decimal,
    pub description: String,
    pub risk: RiskTier,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// Category selector where `All` is the sentinel for "no filtering".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(FundCategory),
}

/// The funds offered when the configuration does not override them.
pub fn default_funds() -> Vec<Fund> {
    vec![
        Fund {
            id: "1".to_string(),
            name: "FPV_BTG_PACTUAL_RECAUDADORA".to_string(),
            category: FundCategory::Fpv,
            minimum_amount: dec!(75000),
            annual_yield: dec!(8.5),
            description: "Voluntary pension fund with stable returns and low risk".to_string(),
            risk: RiskTier::Low,
            available: true,
        },
        Fund {
            id: "2".to_string(),
            name: "FPV_BTG_PACTUAL_ECOPETROL".to_string(),
            category: FundCategory::Fpv,
            minimum_amount: dec!(125000),
            annual_yield: dec!(12.3),
            description: "Investment fund focused on the energy sector".to_string(),
            risk: RiskTier::Medium,
            available: true,
        },
        Fund {
            id: "3".to_string(),
            name: "DEUDAPRIVADA".to_string(),
            category: FundCategory::Fic,
            minimum_amount: dec!(50000),
            annual_yield: dec!(7.8),
            description: "Collective investment fund in private debt".to_string(),
            risk: RiskTier::Low,
            available: true,
        },
        Fund {
            id: "4".to_string(),
            name: "FDO-ACCIONES".to_string(),
            category: FundCategory::Fdo,
            minimum_amount: dec!(250000),
            annual_yield: dec!(15.2),
            description: "Equity fund with high growth potential".to_string(),
            risk: RiskTier::High,
            available: true,
        },
        Fund {
            id: "5".to_string(),
            name: "FPV_BTG_PACTUAL_DINAMICA".to_string(),
            category: FundCategory::Fpv,
            minimum_amount: dec!(100000),
            annual_yield: dec!(10.5),
            description: "Pension fund with dynamic asset management".to_string(),
            risk: RiskTier::Medium,
            available: true,
        },
    ]
}

/// Read-only view over the seeded fund list.
#[derive(Debug, Clone)]
pub struct FundCatalog {
    funds: Vec<Fund>,
}

impl Default for FundCatalog {
    fn default() -> Self {
        Self::new(default_funds())
    }
}

impl FundCatalog {
    pub fn new(funds: Vec<Fund>) -> Self {
        Self { funds }
    }

    pub fn list(&self) -> &[Fund] {
        &self.funds
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Fund> {
        self.funds.iter().find(|f| f.id == id)
    }

    /// Funds whose name or description contains `term`, ignoring case.
    pub fn search(&self, term: &str) -> Vec<&Fund> {
        let term = term.to_lowercase();
        self.funds
            .iter()
            .filter(|f| matches_term(f, &term))
            .collect()
    }

    pub fn filter_by_category(&self, filter: CategoryFilter) -> Vec<&Fund> {
        match filter {
            CategoryFilter::All => self.funds.iter().collect(),
            CategoryFilter::Only(category) => {
                self.funds.iter().filter(|f| f.category == category).collect()
            }
        }
    }

    /// Applies the category filter, then narrows by `term` unless it is blank.
    pub fn browse(&self, filter: CategoryFilter, term: Option<&str>) -> Vec<&Fund> {
        let funds = self.filter_by_category(filter);
        match term.map(str::trim).filter(|t| !t.is_empty()) {
            Some(term) => {
                let term = term.to_lowercase();
                funds.into_iter().filter(|f| matches_term(f, &term)).collect()
            }
            None => funds,
        }
    }

    pub fn validate_minimum(&self, fund_id: &str, amount: Decimal) -> Result<()> {
        let fund = self
            .get_by_id(fund_id)
            .ok_or_else(|| WalletError::FundNotFound(fund_id.to_string()))?;

        if amount < fund.minimum_amount {
            debug!(
                "Amount {} below minimum {} for fund {}",
                amount, fund.minimum_amount, fund.id
            );
            return Err(WalletError::AmountBelowMinimum {
                minimum: fund.minimum_amount,
            });
        }
        Ok(())
    }
}

fn matches_term(fund: &Fund, lowercase_term: &str) -> bool {
    fund.name.to_lowercase().contains(lowercase_term)
        || fund.description.to_lowercase().contains(lowercase_term)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(funds: &[&Fund]) -> Vec<String> {
        funds.iter().map(|f| f.id.clone()).collect()
    }

    #[test]
    fn test_list_and_get_by_id() {
        let catalog = FundCatalog::default();
        assert_eq!(catalog.list().len(), 5);

        let fund = catalog.get_by_id("4").unwrap();
        assert_eq!(fund.name, "FDO-ACCIONES");
        assert_eq!(fund.minimum_amount, dec!(250000));
        assert_eq!(fund.risk, RiskTier::High);

        assert!(catalog.get_by_id("99").is_none());
    }

    #[test]
    fn test_search_is_case_insensitive_over_name_and_description() {
        let catalog = FundCatalog::default();

        assert_eq!(ids(&catalog.search("pactual")), vec!["1", "2", "5"]);
        // Matches only the description of fund 3
        assert_eq!(ids(&catalog.search("PRIVATE DEBT")), vec!["3"]);
        assert!(catalog.search("crypto").is_empty());
    }

    #[test]
    fn test_filter_by_category() {
        let catalog = FundCatalog::default();

        assert_eq!(catalog.filter_by_category(CategoryFilter::All).len(), 5);
        assert_eq!(
            ids(&catalog.filter_by_category(CategoryFilter::Only(FundCategory::Fpv))),
            vec!["1", "2", "5"]
        );
        assert_eq!(
            ids(&catalog.filter_by_category(CategoryFilter::Only(FundCategory::Fdo))),
            vec!["4"]
        );
    }

    #[test]
    fn test_browse_combines_category_and_term() {
        let catalog = FundCatalog::default();

        let funds = catalog.browse(CategoryFilter::Only(FundCategory::Fpv), Some("energy"));
        assert_eq!(ids(&funds), vec!["2"]);

        // Blank term means no narrowing
        assert_eq!(catalog.browse(CategoryFilter::All, Some("   ")).len(), 5);
        assert_eq!(catalog.browse(CategoryFilter::All, None).len(), 5);

        // Term matching a fund outside the category yields nothing
        assert!(
            catalog
                .browse(CategoryFilter::Only(FundCategory::Fic), Some("energy"))
                .is_empty()
        );
    }

    #[test]
    fn test_validate_minimum() {
        let catalog = FundCatalog::default();

        assert!(catalog.validate_minimum("1", dec!(75000)).is_ok());
        assert!(catalog.validate_minimum("1", dec!(100000)).is_ok());

        match catalog.validate_minimum("1", dec!(74999.99)) {
            Err(WalletError::AmountBelowMinimum { minimum }) => {
                assert_eq!(minimum, dec!(75000))
            }
            other => panic!("Expected AmountBelowMinimum, got {other:?}"),
        }

        assert!(matches!(
            catalog.validate_minimum("42", dec!(100000)),
            Err(WalletError::FundNotFound(id)) if id == "42"
        ));
    }

    #[test]
    fn test_fund_deserialization_defaults_available() {
        let yaml = r#"
id: "9"
name: "CUSTOM"
category: FIC
minimum_amount: 1000
annual_yield: 4.2
description: "Custom fund"
risk: medium
"#;
        let fund: Fund = serde_yaml::from_str(yaml).unwrap();
        assert!(fund.available);
        assert_eq!(fund.category, FundCategory::Fic);
        assert_eq!(fund.risk, RiskTier::Medium);
        assert_eq!(fund.minimum_amount, dec!(1000));
    }
}
