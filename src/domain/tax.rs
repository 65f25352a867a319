use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Flat rate used by the client-side preview, in percent.
pub const DEFAULT_PREVIEW_RATE: u32 = 10;

/// Client-side estimate of tax withheld from a gross amount.
///
/// This is an approximation shown to the user before submitting. The backend
/// and the contract compute the authoritative figure; the two are not
/// reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxPreview {
    pub gross: Decimal,
    pub rate_percent: Decimal,
    pub tax: Decimal,
    pub net: Decimal,
}

impl TaxPreview {
    pub fn zero(rate_percent: Decimal) -> Self {
        Self {
            gross: Decimal::ZERO,
            rate_percent,
            tax: Decimal::ZERO,
            net: Decimal::ZERO,
        }
    }

    /// `tax = gross * rate / 100`, `net = gross - tax`. Negative gross is
    /// treated as missing, and a product past `Decimal::MAX` yields zeros.
    pub fn estimate(gross: Decimal, rate_percent: Decimal) -> Self {
        if gross <= Decimal::ZERO {
            return Self::zero(rate_percent);
        }
        let split = gross
            .checked_mul(rate_percent)
            .and_then(|t| t.checked_div(Decimal::ONE_HUNDRED))
            .and_then(|tax| gross.checked_sub(tax).map(|net| (tax, net)));
        match split {
            Some((tax, net)) => Self {
                gross,
                rate_percent,
                tax,
                net,
            },
            None => Self::zero(rate_percent),
        }
    }

    /// Preview from raw form input. Missing or non-numeric input yields zeros.
    pub fn from_input(input: Option<&str>, rate_percent: Decimal) -> Self {
        match input.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => match Decimal::from_str(raw) {
                Ok(gross) => Self::estimate(gross, rate_percent),
                Err(_) => Self::zero(rate_percent),
            },
            None => Self::zero(rate_percent),
        }
    }

    pub fn disclaimer(&self) -> String {
        format!(
            "Estimated at a flat {}%. Final tax is computed by the payroll backend.",
            self.rate_percent.normalize()
        )
    }
}

/// Simple-interest yield estimate with the flat tax split applied to the
/// return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldPreview {
    pub principal: Decimal,
    pub apy_percent: Decimal,
    pub months: Decimal,
    pub tax: TaxPreview,
}

impl YieldPreview {
    /// `gross = principal * apy / 100 * months / 12`. Any input that is zero,
    /// negative, or too large to multiply out yields a zero return.
    pub fn estimate(
        principal: Decimal,
        apy_percent: Decimal,
        months: Decimal,
        rate_percent: Decimal,
    ) -> Self {
        let gross = if [principal, apy_percent, months]
            .iter()
            .any(|v| *v <= Decimal::ZERO)
        {
            Decimal::ZERO
        } else {
            principal
                .checked_mul(apy_percent)
                .and_then(|v| v.checked_mul(months))
                .and_then(|v| v.checked_div(Decimal::from(1200)))
                .unwrap_or(Decimal::ZERO)
        };
        Self {
            principal,
            apy_percent,
            months,
            tax: TaxPreview::estimate(gross, rate_percent),
        }
    }

    /// Preview from raw form fields. Missing or non-numeric fields count as
    /// zero.
    pub fn from_input(
        principal: Option<&str>,
        apy_percent: Option<&str>,
        months: Option<&str>,
        rate_percent: Decimal,
    ) -> Self {
        let field = |raw: Option<&str>| {
            raw.map(str::trim)
                .and_then(|s| Decimal::from_str(s).ok())
                .unwrap_or(Decimal::ZERO)
        };
        Self::estimate(
            field(principal),
            field(apy_percent),
            field(months),
            rate_percent,
        )
    }

    pub fn gross(&self) -> Decimal {
        self.tax.gross
    }

    pub fn net(&self) -> Decimal {
        self.tax.net
    }
}

/// The per-employee tax settings the backend stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EmployeeTaxSettings {
    pub use_custom_tax: bool,
    pub custom_tax_rate: Option<Decimal>,
}

/// Mirror of the backend's rate selection rule, used to label which rate
/// applies to an employee. Never used to correct a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxPolicy {
    pub fallback_rate: Decimal,
}

/// Which rule produced the effective rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateOrigin {
    EmployeeOverride,
    CompanyDefault,
    Fallback,
}

impl TaxPolicy {
    pub fn new(fallback_rate: Decimal) -> Self {
        Self { fallback_rate }
    }

    /// Custom employee rate when enabled and non-zero, else the company
    /// default, else the configured fallback.
    pub fn effective_rate(
        &self,
        employee: &EmployeeTaxSettings,
        company_default: Option<Decimal>,
    ) -> (Decimal, RateOrigin) {
        if employee.use_custom_tax {
            if let Some(rate) = employee.custom_tax_rate.filter(|r| !r.is_zero()) {
                return (rate, RateOrigin::EmployeeOverride);
            }
        }
        match company_default {
            Some(rate) => (rate, RateOrigin::CompanyDefault),
            None => (self.fallback_rate, RateOrigin::Fallback),
        }
    }
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self::new(Decimal::from(DEFAULT_PREVIEW_RATE))
    }
}
