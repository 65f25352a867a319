use super::TokenStore;
use crate::domain::{
    AccessToken, ActiveStreams, ApiError, ApiErrorBody, BlockchainConfig, Bonus, CompanyTax,
    Employee, EmployeeTaxUpdate, LedgerTransaction, MonthlySummary, NewBonus, NewEmployee,
    NewTaxSlab, NewTransaction, Profile, StreamToggle, TaxSlab, TopEarner, TotalPayout, TotalTax,
    Treasury, TreasuryAction, WalletLink,
};
use crate::port::{EmployeeApi, EmployerApi};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// JSON-over-HTTPS client for the payroll backend.
///
/// A `401` clears the token store and surfaces `ApiError::Unauthorized`; the
/// caller decides where to send the user next.
pub struct HttpPayrollClient {
    client: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenStore>,
}

impl HttpPayrollClient {
    pub fn new(
        base_url: impl Into<String>,
        tokens: Arc<TokenStore>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut request = self.client.request(method.clone(), self.url(path));
        if let Some(token) = self.tokens.get().await {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        tracing::debug!("{} {}", method, path);

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("{method} {path}: {e}")))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.tokens.clear().await;
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let detail = response
                .json::<ApiErrorBody>()
                .await
                .map(|b| b.detail)
                .unwrap_or_else(|_| "Request failed".to_string());
            tracing::warn!("{} {} rejected with {}: {}", method, path, status, detail);
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        Ok(response)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let response = self.send(method, path, body).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(format!("{path}: {e}")))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request(Method::GET, path, None).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        self.request(Method::POST, path, Some(to_value(body)?)).await
    }

    /// For endpoints whose response body carries nothing the caller needs.
    async fn execute(&self, method: Method, path: &str, body: Option<Value>) -> Result<(), ApiError> {
        self.send(method, path, body).await.map(|_| ())
    }
}

fn to_value<B: Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(format!("cannot encode body: {e}")))
}

#[async_trait]
impl EmployeeApi for HttpPayrollClient {
    async fn login(&self, email: &str, password: &str) -> Result<AccessToken, ApiError> {
        let response = self
            .client
            .post(self.url("/api/login"))
            .form(&[("username", email), ("password", password)])
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("POST /api/login: {e}")))?;

        if !response.status().is_success() {
            return Err(ApiError::InvalidCredentials);
        }

        let token: AccessToken = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("/api/login: {e}")))?;
        self.tokens.set(token.access_token.clone()).await;
        tracing::info!("Logged in as {}", email);
        Ok(token)
    }

    async fn my_profile(&self) -> Result<Profile, ApiError> {
        self.get("/api/me/profile").await
    }

    async fn my_transactions(&self) -> Result<Vec<LedgerTransaction>, ApiError> {
        self.get("/api/me/transactions").await
    }

    async fn blockchain_config(&self) -> Result<BlockchainConfig, ApiError> {
        self.get("/api/blockchain/config").await
    }
}

#[async_trait]
impl EmployerApi for HttpPayrollClient {
    async fn list_employees(&self) -> Result<Vec<Employee>, ApiError> {
        self.get("/api/employees/").await
    }

    async fn employee(&self, id: u64) -> Result<Employee, ApiError> {
        self.get(&format!("/api/employees/{id}")).await
    }

    async fn create_employee(&self, employee: &NewEmployee) -> Result<Employee, ApiError> {
        self.post("/api/employees/", employee).await
    }

    async fn employee_transactions(&self, id: u64) -> Result<Vec<LedgerTransaction>, ApiError> {
        self.get(&format!("/api/employees/{id}/transactions")).await
    }

    async fn link_wallet(&self, id: u64, wallet_address: &str) -> Result<(), ApiError> {
        let body = to_value(&WalletLink {
            wallet_address: wallet_address.to_string(),
        })?;
        self.execute(Method::PUT, &format!("/api/employees/{id}/wallet"), Some(body))
            .await
    }

    async fn set_employee_tax(&self, id: u64, update: &EmployeeTaxUpdate) -> Result<(), ApiError> {
        // Backend expects an explicit null rate when the override is off.
        let body = to_value(&EmployeeTaxUpdate {
            use_custom_tax: update.use_custom_tax,
            custom_tax_rate: update.custom_tax_rate.filter(|_| update.use_custom_tax),
        })?;
        self.execute(Method::PUT, &format!("/api/employees/{id}/tax"), Some(body))
            .await
    }

    async fn start_stream(&self, id: u64) -> Result<StreamToggle, ApiError> {
        self.request(Method::POST, &format!("/api/stream/start/{id}"), None)
            .await
    }

    async fn pause_stream(&self, id: u64) -> Result<StreamToggle, ApiError> {
        self.request(Method::POST, &format!("/api/stream/pause/{id}"), None)
            .await
    }

    async fn create_transaction(&self, tx: &NewTransaction) -> Result<LedgerTransaction, ApiError> {
        self.post("/api/transactions/", tx).await
    }

    async fn give_bonus(&self, bonus: &NewBonus) -> Result<Bonus, ApiError> {
        self.post(&format!("/api/bonuses/{}", bonus.employee_id), bonus)
            .await
    }

    async fn treasury(&self) -> Result<Treasury, ApiError> {
        self.get("/api/treasury").await
    }

    async fn deposit_treasury(&self, amount: Decimal) -> Result<Treasury, ApiError> {
        self.post("/api/treasury/deposit", &TreasuryAction { amount })
            .await
    }

    async fn withdraw_treasury(&self, amount: Decimal) -> Result<Treasury, ApiError> {
        self.post("/api/treasury/withdraw", &TreasuryAction { amount })
            .await
    }

    async fn total_payout(&self) -> Result<TotalPayout, ApiError> {
        self.get("/api/dashboard/total-payout").await
    }

    async fn total_tax(&self) -> Result<TotalTax, ApiError> {
        self.get("/api/dashboard/total-tax").await
    }

    async fn active_streams(&self) -> Result<ActiveStreams, ApiError> {
        self.get("/api/dashboard/active-streams").await
    }

    async fn top_earners(&self) -> Result<Vec<TopEarner>, ApiError> {
        self.get("/api/dashboard/top-earners").await
    }

    async fn monthly_summary(&self) -> Result<Vec<MonthlySummary>, ApiError> {
        self.get("/api/dashboard/monthly-summary").await
    }

    async fn company_tax(&self) -> Result<CompanyTax, ApiError> {
        self.get("/api/settings/company-tax").await
    }

    async fn update_company_tax(&self, rate: Decimal) -> Result<CompanyTax, ApiError> {
        self.post(
            "/api/settings/company-tax",
            &CompanyTax {
                default_tax_rate: rate,
            },
        )
        .await
    }

    async fn tax_slabs(&self) -> Result<Vec<TaxSlab>, ApiError> {
        self.get("/api/settings/tax-slabs").await
    }

    async fn create_tax_slab(&self, slab: &NewTaxSlab) -> Result<TaxSlab, ApiError> {
        self.post("/api/settings/tax-slabs", slab).await
    }

    async fn delete_tax_slab(&self, id: u64) -> Result<(), ApiError> {
        self.execute(Method::DELETE, &format!("/api/settings/tax-slabs/{id}"), None)
            .await
    }
}
