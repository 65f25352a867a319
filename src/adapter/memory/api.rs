use crate::domain::{
    AccessToken, ActiveStreams, ApiError, BlockchainConfig, Bonus, CompanyTax, Employee,
    EmployeeSummary, EmployeeTaxSettings, EmployeeTaxUpdate, LedgerTransaction, MonthlySummary,
    NewBonus, NewEmployee, NewTaxSlab, NewTransaction, Profile, StreamToggle, TaxPolicy, TaxSlab,
    TopEarner, TotalPayout, TotalTax, Treasury, ledger_total,
};
use crate::port::{EmployeeApi, EmployerApi};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

struct ApiData {
    employees: Vec<Employee>,
    wallets: HashMap<u64, String>,
    transactions: Vec<LedgerTransaction>,
    bonuses: Vec<Bonus>,
    treasury: Treasury,
    company_tax: Option<Decimal>,
    slabs: Vec<TaxSlab>,
    config: BlockchainConfig,
    credentials: HashMap<String, String>,
    session: Option<String>,
    next_id: u64,
}

impl ApiData {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn employee_mut(&mut self, id: u64) -> Result<&mut Employee, ApiError> {
        self.employees
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| not_found("Employee not found"))
    }

    fn employee_by_email(&self, email: &str) -> Option<&Employee> {
        self.employees
            .iter()
            .find(|e| e.email.eq_ignore_ascii_case(email))
    }

    fn with_transactions(&self, employee: &Employee) -> Employee {
        Employee {
            wallet_address: self.wallets.get(&employee.id).cloned(),
            transactions: self
                .transactions
                .iter()
                .filter(|t| t.employee_id == employee.id)
                .cloned()
                .collect(),
            ..employee.clone()
        }
    }
}

fn not_found(detail: &str) -> ApiError {
    ApiError::Rejected {
        status: 404,
        detail: detail.to_string(),
    }
}

fn bad_request(detail: &str) -> ApiError {
    ApiError::Rejected {
        status: 400,
        detail: detail.to_string(),
    }
}

/// In-memory payroll backend.
///
/// Serves both the employee and the employer endpoints from one store so a
/// test can seed data as HR and read it back as the employee. Salary
/// transactions apply the same rate selection as the real service.
pub struct InMemoryPayrollApi {
    data: Arc<RwLock<ApiData>>,
    tax_policy: TaxPolicy,
    clock: Box<dyn Fn() -> DateTime<Utc> + Send + Sync>,
    fail_profile: AtomicBool,
    fail_transactions: AtomicBool,
    fail_config: AtomicBool,
}

impl Default for InMemoryPayrollApi {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPayrollApi {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    pub fn with_clock(clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        Self {
            data: Arc::new(RwLock::new(ApiData {
                employees: Vec::new(),
                wallets: HashMap::new(),
                transactions: Vec::new(),
                bonuses: Vec::new(),
                treasury: Treasury {
                    id: 1,
                    total_balance: Decimal::ZERO,
                    onchain_balance: Decimal::ZERO,
                    last_tx_hash: None,
                    last_synced_at: None,
                },
                company_tax: None,
                slabs: Vec::new(),
                config: BlockchainConfig {
                    contract_address: String::new(),
                    abi: Vec::new(),
                    hela_rpc_url: None,
                },
                credentials: HashMap::new(),
                session: None,
                next_id: 0,
            })),
            tax_policy: TaxPolicy::default(),
            clock: Box::new(clock),
            fail_profile: AtomicBool::new(false),
            fail_transactions: AtomicBool::new(false),
            fail_config: AtomicBool::new(false),
        }
    }

    /// Register a login; the account may or may not belong to an employee.
    pub async fn add_user(&self, email: &str, password: &str) {
        let mut data = self.data.write().await;
        data.credentials
            .insert(email.to_lowercase(), password.to_string());
    }

    /// Act as `email` without going through `login`.
    pub async fn sign_in_as(&self, email: &str) {
        self.data.write().await.session = Some(email.to_lowercase());
    }

    pub async fn set_contract_address(&self, address: &str) {
        self.data.write().await.config.contract_address = address.to_string();
    }

    /// Insert a ledger row as-is, bypassing tax withholding.
    pub async fn seed_transaction(&self, tx: LedgerTransaction) {
        self.data.write().await.transactions.push(tx);
    }

    pub fn set_fail_profile(&self, fail: bool) {
        self.fail_profile.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_transactions(&self, fail: bool) {
        self.fail_transactions.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_config(&self, fail: bool) {
        self.fail_config.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool) -> Result<(), ApiError> {
        if flag.load(Ordering::SeqCst) {
            Err(ApiError::Transport("connection reset".to_string()))
        } else {
            Ok(())
        }
    }

    async fn current_user(&self) -> Result<String, ApiError> {
        self.data
            .read()
            .await
            .session
            .clone()
            .ok_or(ApiError::Unauthorized)
    }

    async fn current_employee(&self) -> Result<Option<Employee>, ApiError> {
        let email = self.current_user().await?;
        Ok(self.data.read().await.employee_by_email(&email).cloned())
    }
}

#[async_trait]
impl EmployeeApi for InMemoryPayrollApi {
    async fn login(&self, email: &str, password: &str) -> Result<AccessToken, ApiError> {
        let mut data = self.data.write().await;
        let key = email.to_lowercase();
        let valid = data
            .credentials
            .get(&key)
            .is_some_and(|stored| stored == password);
        if !valid {
            return Err(ApiError::InvalidCredentials);
        }
        data.session = Some(key.clone());
        Ok(AccessToken {
            access_token: format!("token-{key}"),
            token_type: "bearer".to_string(),
        })
    }

    async fn my_profile(&self) -> Result<Profile, ApiError> {
        Self::check(&self.fail_profile)?;
        let email = self.current_user().await?;
        let data = self.data.read().await;
        let employee = data.employee_by_email(&email);

        let total_earned = employee
            .map(|e| {
                data.transactions
                    .iter()
                    .filter(|t| t.employee_id == e.id)
                    .map(|t| t.amount)
                    .sum::<Decimal>()
            })
            .unwrap_or(Decimal::ZERO);

        Ok(Profile {
            email: email.clone(),
            role: employee
                .map(|e| e.role.clone())
                .unwrap_or_else(|| "employer".to_string()),
            employee: employee.map(|e| EmployeeSummary {
                id: e.id,
                name: e.name.clone(),
                email: e.email.clone(),
                role: e.role.clone(),
                is_streaming: e.is_streaming,
                wallet_address: data.wallets.get(&e.id).cloned(),
            }),
            total_earned,
        })
    }

    async fn my_transactions(&self) -> Result<Vec<LedgerTransaction>, ApiError> {
        Self::check(&self.fail_transactions)?;
        let Some(employee) = self.current_employee().await? else {
            return Ok(Vec::new());
        };
        let data = self.data.read().await;
        let mut txs: Vec<LedgerTransaction> = data
            .transactions
            .iter()
            .filter(|t| t.employee_id == employee.id)
            .cloned()
            .collect();
        txs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(txs)
    }

    async fn blockchain_config(&self) -> Result<BlockchainConfig, ApiError> {
        Self::check(&self.fail_config)?;
        Ok(self.data.read().await.config.clone())
    }
}

#[async_trait]
impl EmployerApi for InMemoryPayrollApi {
    async fn list_employees(&self) -> Result<Vec<Employee>, ApiError> {
        let data = self.data.read().await;
        Ok(data
            .employees
            .iter()
            .map(|e| data.with_transactions(e))
            .collect())
    }

    async fn employee(&self, id: u64) -> Result<Employee, ApiError> {
        let data = self.data.read().await;
        data.employees
            .iter()
            .find(|e| e.id == id)
            .map(|e| data.with_transactions(e))
            .ok_or_else(|| not_found("Employee not found"))
    }

    async fn create_employee(&self, employee: &NewEmployee) -> Result<Employee, ApiError> {
        let mut data = self.data.write().await;
        if data.employee_by_email(&employee.email).is_some() {
            return Err(bad_request("Email already registered"));
        }
        let id = data.allocate_id();
        let created = Employee {
            id,
            name: employee.name.clone(),
            email: employee.email.clone(),
            role: employee.role.clone(),
            is_streaming: false,
            use_custom_tax: false,
            custom_tax_rate: None,
            wallet_address: None,
            transactions: Vec::new(),
        };
        data.employees.push(created.clone());
        Ok(created)
    }

    async fn employee_transactions(&self, id: u64) -> Result<Vec<LedgerTransaction>, ApiError> {
        Ok(self.employee(id).await?.transactions)
    }

    async fn link_wallet(&self, id: u64, wallet_address: &str) -> Result<(), ApiError> {
        let mut data = self.data.write().await;
        data.employee_mut(id)?;
        data.wallets.insert(id, wallet_address.to_string());
        Ok(())
    }

    async fn set_employee_tax(&self, id: u64, update: &EmployeeTaxUpdate) -> Result<(), ApiError> {
        let mut data = self.data.write().await;
        let employee = data.employee_mut(id)?;
        employee.use_custom_tax = update.use_custom_tax;
        employee.custom_tax_rate = update.custom_tax_rate.filter(|_| update.use_custom_tax);
        Ok(())
    }

    async fn start_stream(&self, id: u64) -> Result<StreamToggle, ApiError> {
        let mut data = self.data.write().await;
        let employee = data.employee_mut(id)?;
        employee.is_streaming = true;
        Ok(StreamToggle {
            success: true,
            employee_id: id,
            is_streaming: true,
        })
    }

    async fn pause_stream(&self, id: u64) -> Result<StreamToggle, ApiError> {
        let mut data = self.data.write().await;
        let employee = data.employee_mut(id)?;
        employee.is_streaming = false;
        Ok(StreamToggle {
            success: true,
            employee_id: id,
            is_streaming: false,
        })
    }

    async fn create_transaction(&self, tx: &NewTransaction) -> Result<LedgerTransaction, ApiError> {
        if tx.amount <= Decimal::ZERO {
            return Err(bad_request("Amount must be positive"));
        }
        let now = (self.clock)();
        let mut data = self.data.write().await;
        let employee = data.employee_mut(tx.employee_id)?;
        let settings = EmployeeTaxSettings {
            use_custom_tax: employee.use_custom_tax,
            custom_tax_rate: employee.custom_tax_rate,
        };
        let (rate, _) = self.tax_policy.effective_rate(&settings, data.company_tax);
        let tax = (tx.amount * rate / Decimal::ONE_HUNDRED).round_dp(2);

        let id = data.allocate_id();
        let recorded = LedgerTransaction {
            id,
            employee_id: tx.employee_id,
            amount: tx.amount - tax,
            tax_amount: tax,
            description: tx.description.clone(),
            timestamp: now,
        };
        data.transactions.push(recorded.clone());
        Ok(recorded)
    }

    async fn give_bonus(&self, bonus: &NewBonus) -> Result<Bonus, ApiError> {
        if bonus.amount <= Decimal::ZERO {
            return Err(bad_request("Amount must be positive"));
        }
        let now = (self.clock)();
        let mut data = self.data.write().await;
        data.employee_mut(bonus.employee_id)?;
        let id = data.allocate_id();
        let created = Bonus {
            id,
            employee_id: bonus.employee_id,
            amount: bonus.amount,
            reason: bonus.reason.clone(),
            created_at: now,
        };
        data.bonuses.push(created.clone());
        Ok(created)
    }

    async fn treasury(&self) -> Result<Treasury, ApiError> {
        Ok(self.data.read().await.treasury.clone())
    }

    async fn deposit_treasury(&self, amount: Decimal) -> Result<Treasury, ApiError> {
        if amount <= Decimal::ZERO {
            return Err(bad_request("Amount must be positive"));
        }
        let mut data = self.data.write().await;
        data.treasury.total_balance += amount;
        Ok(data.treasury.clone())
    }

    async fn withdraw_treasury(&self, amount: Decimal) -> Result<Treasury, ApiError> {
        if amount <= Decimal::ZERO {
            return Err(bad_request("Amount must be positive"));
        }
        let mut data = self.data.write().await;
        if data.treasury.total_balance < amount {
            return Err(bad_request("Insufficient treasury balance"));
        }
        data.treasury.total_balance -= amount;
        Ok(data.treasury.clone())
    }

    async fn total_payout(&self) -> Result<TotalPayout, ApiError> {
        Ok(TotalPayout {
            total_paid_net: ledger_total(&self.data.read().await.transactions),
        })
    }

    async fn total_tax(&self) -> Result<TotalTax, ApiError> {
        let data = self.data.read().await;
        Ok(TotalTax {
            total_tax_collected: data.transactions.iter().map(|t| t.tax_amount).sum(),
        })
    }

    async fn active_streams(&self) -> Result<ActiveStreams, ApiError> {
        let data = self.data.read().await;
        Ok(ActiveStreams {
            active_streams: data.employees.iter().filter(|e| e.is_streaming).count() as u64,
        })
    }

    async fn top_earners(&self) -> Result<Vec<TopEarner>, ApiError> {
        let data = self.data.read().await;
        let mut earners: Vec<TopEarner> = data
            .employees
            .iter()
            .map(|e| TopEarner {
                name: e.name.clone(),
                total_net: data
                    .transactions
                    .iter()
                    .filter(|t| t.employee_id == e.id)
                    .map(|t| t.amount)
                    .sum(),
            })
            .collect();
        earners.sort_by(|a, b| b.total_net.cmp(&a.total_net));
        earners.truncate(5);
        Ok(earners)
    }

    async fn monthly_summary(&self) -> Result<Vec<MonthlySummary>, ApiError> {
        let data = self.data.read().await;
        let mut months: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
        for tx in &data.transactions {
            let entry = months
                .entry(tx.timestamp.format("%Y-%m").to_string())
                .or_default();
            entry.0 += tx.amount;
            entry.1 += tx.tax_amount;
        }
        Ok(months
            .into_iter()
            .map(|(month, (net, tax))| MonthlySummary {
                month,
                income: net + tax,
                tax,
                net,
            })
            .collect())
    }

    async fn company_tax(&self) -> Result<CompanyTax, ApiError> {
        let data = self.data.read().await;
        Ok(CompanyTax {
            default_tax_rate: data.company_tax.unwrap_or(self.tax_policy.fallback_rate),
        })
    }

    async fn update_company_tax(&self, rate: Decimal) -> Result<CompanyTax, ApiError> {
        if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
            return Err(bad_request("Tax rate must be between 0 and 100"));
        }
        self.data.write().await.company_tax = Some(rate);
        Ok(CompanyTax {
            default_tax_rate: rate,
        })
    }

    async fn tax_slabs(&self) -> Result<Vec<TaxSlab>, ApiError> {
        let mut slabs = self.data.read().await.slabs.clone();
        slabs.sort_by(|a, b| a.min_income.cmp(&b.min_income));
        Ok(slabs)
    }

    async fn create_tax_slab(&self, slab: &NewTaxSlab) -> Result<TaxSlab, ApiError> {
        let mut data = self.data.write().await;
        let id = data.allocate_id();
        let created = TaxSlab {
            id,
            min_income: slab.min_income,
            max_income: slab.max_income,
            tax_rate: slab.tax_rate,
        };
        data.slabs.push(created.clone());
        Ok(created)
    }

    async fn delete_tax_slab(&self, id: u64) -> Result<(), ApiError> {
        let mut data = self.data.write().await;
        let before = data.slabs.len();
        data.slabs.retain(|s| s.id != id);
        if data.slabs.len() == before {
            return Err(not_found("Tax slab not found"));
        }
        Ok(())
    }
}
