//! Operations shared by the catalog and serverless facades.
//!
//! Both facades talk to the same gateway; they differ only in the
//! pre-filter keyword attached to function and job listings.

use std::sync::Arc;

use qfc_adapter_serverless::ServerlessGateway;
use qfc_core::{
    Account, AccountStore, CatalogError, CatalogResult, Credentials, FunctionQuery, Gateway,
    JobId, JobQuery,
};

use crate::function::Function;
use crate::job::Job;

#[derive(Clone)]
pub(crate) struct Client {
    gateway: Arc<dyn Gateway>,
    filter: &'static str,
}

impl Client {
    pub(crate) fn new(gateway: Arc<dyn Gateway>, filter: &'static str) -> Self {
        Self { gateway, filter }
    }

    /// Resolve credentials and open a verified gateway connection.
    pub(crate) async fn connect(
        token: Option<&str>,
        name: Option<&str>,
        store: &AccountStore,
        filter: &'static str,
    ) -> CatalogResult<Self> {
        let credentials = Credentials::resolve(token, name, store)?;
        Self::connect_with(&credentials, filter).await
    }

    pub(crate) async fn connect_with(
        credentials: &Credentials,
        filter: &'static str,
    ) -> CatalogResult<Self> {
        let gateway = ServerlessGateway::connect(credentials).await?;
        Ok(Self::new(Arc::new(gateway), filter))
    }

    pub(crate) fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    pub(crate) async fn list(&self) -> CatalogResult<Vec<Function>> {
        let functions = self
            .gateway
            .list_functions(&FunctionQuery::filtered(self.filter))
            .await?;
        Ok(functions
            .into_iter()
            .map(|info| Function::new(info, self.gateway.clone()))
            .collect())
    }

    pub(crate) async fn load(
        &self,
        title: &str,
        provider: Option<&str>,
    ) -> CatalogResult<Option<Function>> {
        let function = self.gateway.get_function(title, provider).await?;
        if function.is_none() {
            tracing::debug!("function {title} not found");
        }
        Ok(function.map(|info| Function::new(info, self.gateway.clone())))
    }

    /// List jobs, overriding any caller-supplied filter.
    pub(crate) async fn jobs(&self, mut query: JobQuery) -> CatalogResult<Vec<Job>> {
        if let Some(previous) = query.filter.as_deref().filter(|f| *f != self.filter) {
            tracing::debug!("replacing job filter '{previous}' with '{}'", self.filter);
        }
        query.filter = Some(self.filter.to_string());

        let jobs = self.gateway.list_jobs(&query).await?;
        Ok(jobs
            .into_iter()
            .map(|info| Job::from_info(info, self.gateway.clone()))
            .collect())
    }

    pub(crate) async fn job(&self, job_id: JobId) -> CatalogResult<Option<Job>> {
        let info = self.gateway.get_job(&job_id).await?;
        Ok(info.map(|info| Job::from_info(info, self.gateway.clone())))
    }
}

/// Save `token` (or `QISKIT_IBM_TOKEN`) to `store`.
pub(crate) fn save_account(
    store: &AccountStore,
    token: Option<&str>,
    name: Option<&str>,
    overwrite: bool,
) -> CatalogResult<String> {
    let token = match token {
        Some(token) => token.to_string(),
        None => std::env::var(qfc_core::account::TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or(CatalogError::MissingToken)?,
    };
    let mut account = Account::new(token);
    if let Some(instance) = std::env::var(qfc_core::account::INSTANCE_ENV)
        .ok()
        .filter(|i| !i.trim().is_empty())
    {
        account = account.with_instance(instance);
    }
    store.save(name, account, overwrite)
}
