use crate::domain::{
    ContractError, Employee, EmployeeTaxSettings, LedgerTransaction, NewTransaction, PayrollError,
    RateOrigin, Reading, TaxPolicy, TokenAmount, Treasury, WalletHandle, rate_from_monthly,
};
use crate::port::{EmployerApi, PayrollContract};
use alloy_primitives::{Address, B256, U256};
use rust_decimal::Decimal;
use std::sync::Arc;

/// The off-chain treasury record and the contract balance, side by side.
#[derive(Debug, Clone, PartialEq)]
pub struct TreasuryOverview {
    pub ledger: Treasury,
    pub onchain: Reading<TokenAmount>,
}

/// Employer-side operations: stream control on the contract, salary
/// records on the backend. The two are never combined into one figure.
pub struct EmployerConsole {
    api: Arc<dyn EmployerApi>,
    contract: Arc<dyn PayrollContract>,
    tax_policy: TaxPolicy,
}

impl EmployerConsole {
    pub fn new(
        api: Arc<dyn EmployerApi>,
        contract: Arc<dyn PayrollContract>,
        tax_policy: TaxPolicy,
    ) -> Self {
        Self {
            api,
            contract,
            tax_policy,
        }
    }

    /// Stream `monthly_salary` tokens per 30-day month to `employee`.
    pub async fn start_stream(
        &self,
        wallet: &WalletHandle,
        employee: Address,
        monthly_salary: TokenAmount,
    ) -> Result<(B256, U256), PayrollError> {
        let rate = rate_from_monthly(monthly_salary);
        if rate.is_zero() {
            return Err(ContractError::InvalidArgument(format!(
                "monthly salary {monthly_salary} is below one wei per second"
            ))
            .into());
        }
        let hash = self.contract.start_stream(wallet, employee, rate).await?;
        tracing::info!("Stream started for {} at {} wei/s", employee, rate);
        Ok((hash, rate))
    }

    pub async fn stop_stream(
        &self,
        wallet: &WalletHandle,
        employee: Address,
    ) -> Result<B256, PayrollError> {
        let hash = self.contract.stop_stream(wallet, employee).await?;
        tracing::info!("Stream stopped for {}", employee);
        Ok(hash)
    }

    pub async fn emergency_withdraw(&self, wallet: &WalletHandle) -> Result<B256, PayrollError> {
        let hash = self.contract.emergency_withdraw(wallet).await?;
        tracing::warn!("Emergency withdrawal executed: {}", hash);
        Ok(hash)
    }

    /// The backend treasury is required; the contract balance may be unknown.
    pub async fn treasury_overview(&self) -> Result<TreasuryOverview, PayrollError> {
        let (ledger, onchain) =
            tokio::join!(self.api.treasury(), self.contract.treasury_balance());
        if let Err(e) = &onchain {
            tracing::warn!("getTreasuryBalance failed: {}", e);
        }
        Ok(TreasuryOverview {
            ledger: ledger?,
            onchain: Reading::from(onchain),
        })
    }

    /// The rate the backend will withhold for `employee`, and why.
    pub async fn effective_tax_rate(
        &self,
        employee: &Employee,
    ) -> Result<(Decimal, RateOrigin), PayrollError> {
        let company = self.api.company_tax().await?;
        let settings = EmployeeTaxSettings {
            use_custom_tax: employee.use_custom_tax,
            custom_tax_rate: employee.custom_tax_rate,
        };
        Ok(self
            .tax_policy
            .effective_rate(&settings, Some(company.default_tax_rate)))
    }

    pub async fn record_salary(
        &self,
        employee_id: u64,
        amount: Decimal,
        description: &str,
    ) -> Result<LedgerTransaction, PayrollError> {
        let tx = self
            .api
            .create_transaction(&NewTransaction {
                employee_id,
                amount,
                description: description.to_string(),
            })
            .await?;
        tracing::info!(
            "Recorded salary for employee {}: net {} tax {}",
            employee_id,
            tx.amount,
            tx.tax_amount
        );
        Ok(tx)
    }
}
