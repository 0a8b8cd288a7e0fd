//! Catalog enums

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Product category; also the first path segment of `GET /products/{category}/{id}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Beverages,
    Snacks,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Beverages => "beverages",
            ProductCategory::Snacks => "snacks",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beverages" => Ok(ProductCategory::Beverages),
            "snacks" => Ok(ProductCategory::Snacks),
            other => Err(format!("unknown category: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse() {
        assert_eq!(
            "Beverages".parse::<ProductCategory>().unwrap(),
            ProductCategory::Beverages
        );
        assert_eq!(" snacks ".parse::<ProductCategory>().unwrap(), ProductCategory::Snacks);
        assert!("pastries".parse::<ProductCategory>().is_err());
    }
}
