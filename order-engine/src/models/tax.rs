//! GST tax type and rate split.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether GST is charged as CGST+SGST (same state) or IGST (different states).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaxType {
    #[default]
    Intra,
    Inter,
}

impl TaxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxType::Intra => "INTRA",
            TaxType::Inter => "INTER",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "INTER" => TaxType::Inter,
            _ => TaxType::Intra,
        }
    }

    /// Derive the tax type from the two parties' state codes.
    ///
    /// Returns `None` while either code is unknown.
    pub fn from_state_codes(first: Option<&str>, second: Option<&str>) -> Option<Self> {
        let first = normalize_state_code(first?)?;
        let second = normalize_state_code(second?)?;
        if first == second {
            Some(TaxType::Intra)
        } else {
            Some(TaxType::Inter)
        }
    }
}

impl std::fmt::Display for TaxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric codes compare by value ("7" == "07"); others case-insensitively.
fn normalize_state_code(code: &str) -> Option<String> {
    let code = code.trim();
    if code.is_empty() {
        return None;
    }
    match code.parse::<u32>() {
        Ok(n) => Some(n.to_string()),
        Err(_) => Some(code.to_ascii_uppercase()),
    }
}

/// Per-line GST percentages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GstSplit {
    pub cgst_percent: Decimal,
    pub sgst_percent: Decimal,
    pub igst_percent: Decimal,
}

impl GstSplit {
    /// INTRA halves the rate into CGST and SGST; INTER puts it all in IGST.
    pub fn for_rate(gst_percentage: Decimal, tax_type: TaxType) -> Self {
        match tax_type {
            TaxType::Intra => {
                let half = gst_percentage / Decimal::TWO;
                Self {
                    cgst_percent: half,
                    sgst_percent: half,
                    igst_percent: Decimal::ZERO,
                }
            }
            TaxType::Inter => Self {
                cgst_percent: Decimal::ZERO,
                sgst_percent: Decimal::ZERO,
                igst_percent: gst_percentage,
            },
        }
    }
}

/// Outcome of choosing an order's tax type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxTypeResolution {
    pub tax_type: TaxType,
    /// What the state codes imply, if both are known.
    pub derived: Option<TaxType>,
    pub warning: Option<String>,
}

/// Pick the tax type for an order.
///
/// The state codes decide when both are known. A manual choice is honoured
/// but produces a warning when it contradicts them. With neither, INTRA is
/// assumed and a warning asks for the missing state.
pub fn resolve_tax_type(
    party_state: Option<&str>,
    delivery_state: Option<&str>,
    manual: Option<TaxType>,
) -> TaxTypeResolution {
    let derived = TaxType::from_state_codes(party_state, delivery_state);
    match (derived, manual) {
        (Some(derived_type), Some(chosen)) if derived_type != chosen => TaxTypeResolution {
            tax_type: chosen,
            derived,
            warning: Some(format!(
                "Tax type set to {} although the state codes indicate {}",
                chosen, derived_type
            )),
        },
        (Some(derived_type), _) => TaxTypeResolution {
            tax_type: derived_type,
            derived,
            warning: None,
        },
        (None, Some(chosen)) => TaxTypeResolution {
            tax_type: chosen,
            derived,
            warning: None,
        },
        (None, None) => TaxTypeResolution {
            tax_type: TaxType::Intra,
            derived,
            warning: Some("State code missing; assuming INTRA state tax".to_string()),
        },
    }
}
