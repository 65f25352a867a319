use crate::domain::{
    AccessToken, ActiveStreams, ApiError, BlockchainConfig, Bonus, CompanyTax, Employee,
    EmployeeTaxUpdate, LedgerTransaction, MonthlySummary, NewBonus, NewEmployee, NewTaxSlab,
    NewTransaction, Profile, StreamToggle, TaxSlab, TopEarner, TotalPayout, TotalTax, Treasury,
};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Self-service endpoints used by the employee portal.
///
/// Every call is a single request/response; a failure leaves nothing
/// half-applied on the client side.
#[async_trait]
pub trait EmployeeApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AccessToken, ApiError>;

    async fn my_profile(&self) -> Result<Profile, ApiError>;

    async fn my_transactions(&self) -> Result<Vec<LedgerTransaction>, ApiError>;

    async fn blockchain_config(&self) -> Result<BlockchainConfig, ApiError>;
}

/// Employer dashboard endpoints.
#[async_trait]
pub trait EmployerApi: Send + Sync {
    async fn list_employees(&self) -> Result<Vec<Employee>, ApiError>;

    async fn employee(&self, id: u64) -> Result<Employee, ApiError>;

    async fn create_employee(&self, employee: &NewEmployee) -> Result<Employee, ApiError>;

    async fn employee_transactions(&self, id: u64) -> Result<Vec<LedgerTransaction>, ApiError>;

    async fn link_wallet(&self, id: u64, wallet_address: &str) -> Result<(), ApiError>;

    async fn set_employee_tax(&self, id: u64, update: &EmployeeTaxUpdate) -> Result<(), ApiError>;

    async fn start_stream(&self, id: u64) -> Result<StreamToggle, ApiError>;

    async fn pause_stream(&self, id: u64) -> Result<StreamToggle, ApiError>;

    /// Record a salary payment. The backend withholds tax and stores the net.
    async fn create_transaction(&self, tx: &NewTransaction) -> Result<LedgerTransaction, ApiError>;

    async fn give_bonus(&self, bonus: &NewBonus) -> Result<Bonus, ApiError>;

    async fn treasury(&self) -> Result<Treasury, ApiError>;

    async fn deposit_treasury(&self, amount: Decimal) -> Result<Treasury, ApiError>;

    async fn withdraw_treasury(&self, amount: Decimal) -> Result<Treasury, ApiError>;

    async fn total_payout(&self) -> Result<TotalPayout, ApiError>;

    async fn total_tax(&self) -> Result<TotalTax, ApiError>;

    async fn active_streams(&self) -> Result<ActiveStreams, ApiError>;

    async fn top_earners(&self) -> Result<Vec<TopEarner>, ApiError>;

    async fn monthly_summary(&self) -> Result<Vec<MonthlySummary>, ApiError>;

    async fn company_tax(&self) -> Result<CompanyTax, ApiError>;

    async fn update_company_tax(&self, rate: Decimal) -> Result<CompanyTax, ApiError>;

    async fn tax_slabs(&self) -> Result<Vec<TaxSlab>, ApiError>;

    async fn create_tax_slab(&self, slab: &NewTaxSlab) -> Result<TaxSlab, ApiError>;

    async fn delete_tax_slab(&self, id: u64) -> Result<(), ApiError>;
}
