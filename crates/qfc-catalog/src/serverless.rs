//! Serverless facade: the user's own functions and their files.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use qfc_core::{
    AccountStore, CatalogError, CatalogResult, Credentials, FileScope, FunctionUpload, Gateway,
    JobId, JobQuery,
};

use crate::client::{self, Client};
use crate::function::Function;
use crate::job::Job;

/// Pre-filter keyword selecting serverless functions and jobs.
pub const SERVERLESS_FILTER: &str = "serverless";

/// Default directory for downloads.
pub const DEFAULT_DOWNLOAD_LOCATION: &str = "./";

/// Client for functions uploaded to Qiskit Serverless.
#[derive(Clone)]
pub struct QiskitServerless {
    client: Client,
}

impl QiskitServerless {
    /// Connect using an explicit token or a saved account.
    ///
    /// Resolution follows [`QiskitFunctionsCatalog::new`](crate::QiskitFunctionsCatalog::new).
    pub async fn new(token: Option<&str>, name: Option<&str>) -> CatalogResult<Self> {
        Self::with_store(token, name, &AccountStore::new()?).await
    }

    /// Like [`QiskitServerless::new`] but reading accounts from `store`.
    pub async fn with_store(
        token: Option<&str>,
        name: Option<&str>,
        store: &AccountStore,
    ) -> CatalogResult<Self> {
        Ok(Self {
            client: Client::connect(token, name, store, SERVERLESS_FILTER).await?,
        })
    }

    /// Connect with already resolved credentials.
    pub async fn connect(credentials: &Credentials) -> CatalogResult<Self> {
        Ok(Self {
            client: Client::connect_with(credentials, SERVERLESS_FILTER).await?,
        })
    }

    /// Build over any gateway implementation.
    pub fn with_gateway(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            client: Client::new(gateway, SERVERLESS_FILTER),
        }
    }

    /// The gateway this client talks to.
    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        self.client.gateway()
    }

    /// Upload a function and return a runnable handle to it.
    pub async fn upload(&self, upload: &FunctionUpload) -> CatalogResult<Function> {
        upload.validate()?;
        let info = self.gateway().upload_function(upload).await?;
        Ok(Function::new(info, self.gateway().clone()))
    }

    /// Load a function by title. `None` when the gateway does not know it.
    pub async fn load(&self, title: &str, provider: Option<&str>) -> CatalogResult<Option<Function>> {
        self.client.load(title, provider).await
    }

    /// List serverless functions in gateway order.
    pub async fn list(&self) -> CatalogResult<Vec<Function>> {
        self.client.list().await
    }

    /// List serverless jobs. The query's `filter` is always set to `serverless`.
    pub async fn jobs(&self, query: JobQuery) -> CatalogResult<Vec<Job>> {
        self.client.jobs(query).await
    }

    /// Look up a job. `None` when the gateway does not know it.
    pub async fn job(&self, job_id: impl Into<JobId>) -> CatalogResult<Option<Job>> {
        self.client.job(job_id.into()).await
    }

    /// Look up a job.
    #[deprecated(note = "use `QiskitServerless::job` instead")]
    pub async fn get_job_by_id(&self, job_id: impl Into<JobId>) -> CatalogResult<Option<Job>> {
        self.job(job_id).await
    }

    /// Files in the user's folder for `function`.
    pub async fn files(&self, function: &Function) -> CatalogResult<Vec<String>> {
        self.gateway()
            .list_files(FileScope::User, function.info())
            .await
    }

    /// Files in the provider's folder for `function`.
    pub async fn provider_files(&self, function: &Function) -> CatalogResult<Vec<String>> {
        self.gateway()
            .list_files(FileScope::Provider, function.info())
            .await
    }

    /// Download `file` from the user's folder.
    ///
    /// The file is written to `download_location` under `target_name`,
    /// or under its remote name when no target name is given.
    pub async fn file_download(
        &self,
        file: &str,
        function: &Function,
        target_name: Option<&str>,
        download_location: impl AsRef<Path>,
    ) -> CatalogResult<PathBuf> {
        self.download(FileScope::User, file, function, target_name, download_location.as_ref())
            .await
    }

    /// Download `file` from the provider's folder.
    pub async fn provider_file_download(
        &self,
        file: &str,
        function: &Function,
        target_name: Option<&str>,
        download_location: impl AsRef<Path>,
    ) -> CatalogResult<PathBuf> {
        self.download(
            FileScope::Provider,
            file,
            function,
            target_name,
            download_location.as_ref(),
        )
        .await
    }

    /// Delete `file` from the user's folder.
    pub async fn file_delete(&self, file: &str, function: &Function) -> CatalogResult<String> {
        self.gateway()
            .delete_file(FileScope::User, file, function.info())
            .await
    }

    /// Delete `file` from the provider's folder.
    pub async fn provider_file_delete(
        &self,
        file: &str,
        function: &Function,
    ) -> CatalogResult<String> {
        self.gateway()
            .delete_file(FileScope::Provider, file, function.info())
            .await
    }

    /// Upload a local file into the user's folder.
    pub async fn file_upload(
        &self,
        path: impl AsRef<Path>,
        function: &Function,
    ) -> CatalogResult<String> {
        self.gateway()
            .upload_file(FileScope::User, path.as_ref(), function.info())
            .await
    }

    /// Upload a local file into the provider's folder.
    pub async fn provider_file_upload(
        &self,
        path: impl AsRef<Path>,
        function: &Function,
    ) -> CatalogResult<String> {
        self.gateway()
            .upload_file(FileScope::Provider, path.as_ref(), function.info())
            .await
    }

    /// Save a token to the default account file.
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

    async fn download(
        &self,
        scope: FileScope,
        file: &str,
        function: &Function,
        target_name: Option<&str>,
        download_location: &Path,
    ) -> CatalogResult<PathBuf> {
        let destination = download_location.join(local_name(file, target_name)?);
        self.gateway()
            .download_file(scope, file, function.info(), &destination)
            .await
    }
}

/// Local file name for a download: the target name, else the last
/// component of the remote name.
fn local_name<'a>(file: &'a str, target_name: Option<&'a str>) -> CatalogResult<&'a str> {
    let name = target_name.unwrap_or(file);
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| CatalogError::InvalidArguments(format!("'{name}' is not a file name")))
}

impl fmt::Display for QiskitServerless {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<QiskitServerless>")
    }
}

impl fmt::Debug for QiskitServerless {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QiskitServerless")
            .field("host", &self.gateway().host())
            .finish()
    }
}
