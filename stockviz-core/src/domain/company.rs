//! Company: one row of the S&P 500 constituent table.

use serde::{Deserialize, Serialize};

/// Constituent metadata keyed by ticker symbol.
///
/// Serde names follow the constituent CSV headers; columns not listed here
/// (including an unnamed leading index column) are ignored on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Security", default)]
    pub security: String,
    #[serde(rename = "GICS Sector")]
    pub sector: String,
    #[serde(rename = "GICS Sub-Industry", default)]
    pub sub_industry: Option<String>,
    #[serde(rename = "Headquarters Location", default)]
    pub headquarters: Option<String>,
    #[serde(rename = "Date added", default)]
    pub date_added: Option<String>,
    #[serde(rename = "CIK", default)]
    pub cik: Option<String>,
    #[serde(rename = "Founded", default)]
    pub founded: Option<String>,
}

impl CompanyInfo {
    pub fn new(
        symbol: impl Into<String>,
        security: impl Into<String>,
        sector: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            security: security.into(),
            sector: sector.into(),
            sub_industry: None,
            headquarters: None,
            date_added: None,
            cik: None,
            founded: None,
        }
    }
}
