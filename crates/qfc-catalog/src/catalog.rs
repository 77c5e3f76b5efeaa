//! Catalog facade.

use std::fmt;
use std::sync::Arc;

use qfc_core::{AccountStore, CatalogResult, Credentials, Gateway, JobId, JobQuery};

use crate::client::{self, Client};
use crate::function::Function;
use crate::job::Job;

/// Pre-filter keyword selecting catalog functions and jobs.
pub const CATALOG_FILTER: &str = "catalog";

/// Client for the Qiskit Functions catalog.
///
/// # Example
///
/// ```ignore
/// use qfc_catalog::QiskitFunctionsCatalog;
/// use serde_json::json;
///
/// let catalog = QiskitFunctionsCatalog::new(Some("my-token"), None).await?;
/// let function = catalog.load("hamsim", Some("ibm")).await?.expect("function exists");
/// let job = function.run(&json!({"circuit": qasm}), None).await?;
/// println!("{}", job.result().await?);
/// ```
#[derive(Clone)]
pub struct QiskitFunctionsCatalog {
    client: Client,
}

impl QiskitFunctionsCatalog {
    /// Connect using an explicit token or a saved account.
    ///
    /// With `token`, `name` is ignored. Otherwise the token comes from the
    /// named saved account, `QISKIT_IBM_TOKEN`, or the default account.
    pub async fn new(token: Option<&str>, name: Option<&str>) -> CatalogResult<Self> {
        Self::with_store(token, name, &AccountStore::new()?).await
    }

    /// Like [`QiskitFunctionsCatalog::new`] but reading accounts from `store`.
    pub async fn with_store(
        token: Option<&str>,
        name: Option<&str>,
        store: &AccountStore,
    ) -> CatalogResult<Self> {
        Ok(Self {
            client: Client::connect(token, name, store, CATALOG_FILTER).await?,
        })
    }

    /// Connect with already resolved credentials.
    pub async fn connect(credentials: &Credentials) -> CatalogResult<Self> {
        Ok(Self {
            client: Client::connect_with(credentials, CATALOG_FILTER).await?,
        })
    }

    /// Build over any gateway implementation.
    pub fn with_gateway(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            client: Client::new(gateway, CATALOG_FILTER),
        }
    }

    /// The gateway this catalog talks to.
    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        self.client.gateway()
    }

    /// List catalog functions in gateway order.
    pub async fn list(&self) -> CatalogResult<Vec<Function>> {
        self.client.list().await
    }

    /// Load a function by title. `None` when the gateway does not know it.
    pub async fn load(&self, title: &str, provider: Option<&str>) -> CatalogResult<Option<Function>> {
        self.client.load(title, provider).await
    }

    /// List catalog jobs. The query's `filter` is always set to `catalog`.
    pub async fn jobs(&self, query: JobQuery) -> CatalogResult<Vec<Job>> {
        self.client.jobs(query).await
    }

    /// Look up a job. `None` when the gateway does not know it.
    pub async fn get_job_by_id(&self, job_id: impl Into<JobId>) -> CatalogResult<Option<Job>> {
        self.client.job(job_id.into()).await
    }

    /// Save a token to the default account file.
    ///
    /// Without `token`, `QISKIT_IBM_TOKEN` is saved. Returns the account name.
    pub fn save_account(
        token: Option<&str>,
        name: Option<&str>,
        overwrite: bool,
    ) -> CatalogResult<String> {
        client::save_account(&AccountStore::new()?, token, name, overwrite)
    }

    /// Save a token to `store`.
    pub fn save_account_to(
        store: &AccountStore,
        token: Option<&str>,
        name: Option<&str>,
        overwrite: bool,
    ) -> CatalogResult<String> {
        client::save_account(store, token, name, overwrite)
    }
}

impl fmt::Display for QiskitFunctionsCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<QiskitFunctionsCatalog>")
    }
}

impl fmt::Debug for QiskitFunctionsCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QiskitFunctionsCatalog")
            .field("host", &self.gateway().host())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingGateway;
    use qfc_core::{CatalogError, JobInfo, JobStatus, QiskitFunction};

    fn catalog(gateway: &Arc<RecordingGateway>) -> QiskitFunctionsCatalog {
        QiskitFunctionsCatalog::with_gateway(gateway.clone())
    }

    #[tokio::test]
    async fn test_list_sends_catalog_filter() {
        let gateway = Arc::new(RecordingGateway::with_functions(vec![
            QiskitFunction::new("b-func"),
            QiskitFunction::new("a-func"),
        ]));

        let functions = catalog(&gateway).list().await.unwrap();
        let titles: Vec<_> = functions.iter().map(Function::title).collect();
        assert_eq!(titles, ["b-func", "a-func"]);

        let queries = gateway.function_queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].filter.as_deref(), Some("catalog"));
    }

    #[tokio::test]
    async fn test_jobs_forces_filter_and_keeps_limit() {
        let mut gateway = RecordingGateway::default();
        gateway.listed_jobs = vec![JobInfo::new("j1", JobStatus::Done)];
        let gateway = Arc::new(gateway);

        let jobs = catalog(&gateway)
            .jobs(JobQuery::new().with_limit(10))
            .await
            .unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id().as_str(), "j1");

        let queries = gateway.job_queries.lock().unwrap();
        assert_eq!(
            queries[0],
            JobQuery::new().with_filter("catalog").with_limit(10)
        );
    }

    #[tokio::test]
    async fn test_jobs_overrides_caller_filter() {
        let gateway = Arc::new(RecordingGateway::default());
        catalog(&gateway)
            .jobs(JobQuery::new().with_filter("serverless").with_offset(5))
            .await
            .unwrap();

        let queries = gateway.job_queries.lock().unwrap();
        assert_eq!(queries[0].filter.as_deref(), Some("catalog"));
        assert_eq!(queries[0].offset, Some(5));
    }

    #[tokio::test]
    async fn test_load_known_and_unknown() {
        let gateway = Arc::new(RecordingGateway::with_functions(vec![
            QiskitFunction::new("hamsim").with_provider("ibm"),
        ]));
        let catalog = catalog(&gateway);

        let function = catalog.load("hamsim", Some("ibm")).await.unwrap().unwrap();
        assert_eq!(function.provider(), Some("ibm"));
        assert!(catalog.load("missing", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_job_by_id() {
        let gateway = Arc::new(RecordingGateway::with_job_script(vec![JobInfo::new(
            "j1",
            JobStatus::Running(None),
        )]));
        let catalog = catalog(&gateway);

        let job = catalog.get_job_by_id("j1").await.unwrap().unwrap();
        assert_eq!(job.info().status, JobStatus::Running(None));
        assert!(catalog.get_job_by_id("other").await.unwrap().is_none());
    }

    #[test]
    fn test_save_account_to_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::at(dir.path().join("qiskit-ibm.json"));

        let name =
            QiskitFunctionsCatalog::save_account_to(&store, Some("tok-1"), Some("work"), false)
                .unwrap();
        assert_eq!(name, "work");
        assert_eq!(store.get(Some("work")).unwrap().unwrap().token, "tok-1");

        let err =
            QiskitFunctionsCatalog::save_account_to(&store, Some("tok-2"), Some("work"), false)
                .unwrap_err();
        assert!(matches!(err, CatalogError::AccountExists(name) if name == "work"));

        QiskitFunctionsCatalog::save_account_to(&store, Some("tok-2"), Some("work"), true).unwrap();
        assert_eq!(store.get(Some("work")).unwrap().unwrap().token, "tok-2");
    }

    #[test]
    fn test_display_and_debug() {
        let gateway = Arc::new(RecordingGateway::default());
        let catalog = catalog(&gateway);
        assert_eq!(catalog.to_string(), "<QiskitFunctionsCatalog>");
        assert!(format!("{catalog:?}").contains("memory://gateway"));
    }
}
