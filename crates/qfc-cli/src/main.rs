//! Qiskit Functions catalog command-line interface.
//!
//! ```text
//! qfc account save <TOKEN>          # store credentials in ~/.qiskit/qiskit-ibm.json
//! qfc list                          # functions in the catalog
//! qfc run hamsim --provider ibm --args '{"circuit": "..."}' --wait
//! qfc jobs --limit 10
//! qfc --serverless files my-func    # serverless mode: own functions and files
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::{Connection, error_chain};
use commands::{account, files, functions, jobs, version};

/// qfc - run Qiskit Functions from the command line
#[derive(Parser)]
#[command(name = "qfc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// API token (overrides saved accounts and QISKIT_IBM_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Saved account to use
    #[arg(long, global = true)]
    account: Option<String>,

    /// Work with your own serverless functions instead of the catalog
    #[arg(long, global = true)]
    serverless: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage saved accounts
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// List available functions
    List,

    /// Show details of a function
    Show {
        /// Function title
        title: String,

        /// Function provider
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// Run a function
    Run {
        /// Function title
        title: String,

        /// Function provider
        #[arg(short, long)]
        provider: Option<String>,

        /// Arguments as a JSON object
        #[arg(short, long, conflicts_with = "args_file")]
        args: Option<String>,

        /// Read arguments from a JSON file
        #[arg(long)]
        args_file: Option<PathBuf>,

        /// Number of workers
        #[arg(long)]
        workers: Option<u32>,

        /// Wait for the job and print its result
        #[arg(short, long)]
        wait: bool,

        /// Timeout in seconds when waiting
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Upload a function (serverless)
    Publish {
        /// Function title
        title: String,

        /// Container image
        #[arg(long, conflicts_with_all = ["entrypoint", "artifact"])]
        image: Option<String>,

        /// Entrypoint script inside the artifact
        #[arg(long, requires = "artifact")]
        entrypoint: Option<String>,

        /// Archive with the function sources
        #[arg(long)]
        artifact: Option<PathBuf>,

        /// Provider to publish under
        #[arg(short, long)]
        provider: Option<String>,

        /// Description
        #[arg(short, long)]
        description: Option<String>,

        /// Python requirement (repeatable)
        #[arg(long = "dependency")]
        dependencies: Vec<String>,

        /// Environment variable as KEY=VALUE (repeatable)
        #[arg(long = "env")]
        env_vars: Vec<String>,
    },

    /// List recent jobs
    Jobs {
        /// Maximum number of jobs
        #[arg(short, long, default_value = "10")]
        limit: u32,

        /// Number of jobs to skip
        #[arg(long)]
        offset: Option<u32>,

        /// Only jobs with this gateway status (e.g. SUCCEEDED)
        #[arg(short, long)]
        status: Option<String>,

        /// Only jobs of this function
        #[arg(short, long)]
        function: Option<String>,
    },

    /// Show the status of a job
    Status {
        /// Job ID
        job_id: String,
    },

    /// Print the logs of a job
    Logs {
        /// Job ID
        job_id: String,
    },

    /// Wait for a job and print its result
    Result {
        /// Job ID
        job_id: String,

        /// Timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Seconds between status polls
        #[arg(long, default_value = "5")]
        cadence: u64,
    },

    /// Stop a running job
    Stop {
        /// Job ID
        job_id: String,
    },

    /// List files of a function (serverless)
    Files {
        /// Function title
        title: String,

        #[command(flatten)]
        scope: files::ScopeArgs,
    },

    /// Download a file of a function (serverless)
    Download {
        /// Remote file name
        file: String,

        /// Function title
        title: String,

        #[command(flatten)]
        scope: files::ScopeArgs,

        /// Local file name (defaults to the remote name)
        #[arg(long)]
        target_name: Option<String>,

        /// Directory to download into
        #[arg(short, long, default_value = "./")]
        location: PathBuf,
    },

    /// Delete a file of a function (serverless)
    Delete {
        /// Remote file name
        file: String,

        /// Function title
        title: String,

        #[command(flatten)]
        scope: files::ScopeArgs,
    },

    /// Upload a local file to a function (serverless)
    Upload {
        /// Local file
        path: PathBuf,

        /// Function title
        title: String,

        #[command(flatten)]
        scope: files::ScopeArgs,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum AccountAction {
    /// Save a token
    Save {
        /// API token
        token: String,

        /// Account name
        #[arg(short, long)]
        name: Option<String>,

        /// Channel (ibm_quantum_platform, ibm_cloud, ibm_quantum)
        #[arg(long)]
        channel: Option<String>,

        /// Service instance (CRN)
        #[arg(long)]
        instance: Option<String>,

        /// Use this account when no name is given
        #[arg(long)]
        set_default: bool,

        /// Replace an existing account with the same name
        #[arg(long)]
        overwrite: bool,
    },

    /// List saved accounts
    List,

    /// Delete a saved account
    Delete {
        /// Account name
        name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let conn = Connection {
        token: cli.token,
        account: cli.account,
        serverless: cli.serverless,
    };

    // Execute command
    let result = match cli.command {
        Commands::Account { action } => match action {
            AccountAction::Save {
                token,
                name,
                channel,
                instance,
                set_default,
                overwrite,
            } => account::execute_save(
                &token,
                name.as_deref(),
                channel.as_deref(),
                instance.as_deref(),
                set_default,
                overwrite,
            ),
            AccountAction::List => account::execute_list(),
            AccountAction::Delete { name } => account::execute_delete(&name),
        },

        Commands::List => functions::execute_list(&conn).await,

        Commands::Show { title, provider } => {
            functions::execute_show(&conn, &title, provider.as_deref()).await
        }

        Commands::Run {
            title,
            provider,
            args,
            args_file,
            workers,
            wait,
            timeout,
        } => {
            functions::execute_run(
                &conn,
                &title,
                provider.as_deref(),
                args.as_deref(),
                args_file.as_deref(),
                workers,
                wait,
                timeout,
            )
            .await
        }

        Commands::Publish {
            title,
            image,
            entrypoint,
            artifact,
            provider,
            description,
            dependencies,
            env_vars,
        } => {
            functions::execute_publish(
                &conn,
                functions::PublishArgs {
                    title,
                    image,
                    entrypoint,
                    artifact,
                    provider,
                    description,
                    dependencies,
                    env_vars,
                },
            )
            .await
        }

        Commands::Jobs {
            limit,
            offset,
            status,
            function,
        } => jobs::execute_list(&conn, limit, offset, status, function).await,

        Commands::Status { job_id } => jobs::execute_status(&conn, &job_id).await,

        Commands::Logs { job_id } => jobs::execute_logs(&conn, &job_id).await,

        Commands::Result {
            job_id,
            timeout,
            cadence,
        } => jobs::execute_result(&conn, &job_id, timeout, cadence).await,

        Commands::Stop { job_id } => jobs::execute_stop(&conn, &job_id).await,

        Commands::Files { title, scope } => files::execute_list(&conn, &title, &scope).await,

        Commands::Download {
            file,
            title,
            scope,
            target_name,
            location,
        } => {
            files::execute_download(
                &conn,
                &file,
                &title,
                &scope,
                target_name.as_deref(),
                &location,
            )
            .await
        }

        Commands::Delete { file, title, scope } => {
            files::execute_delete(&conn, &file, &title, &scope).await
        }

        Commands::Upload { path, title, scope } => {
            files::execute_upload(&conn, &path, &title, &scope).await
        }

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), error_chain(&e));
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_token_flag_does_not_read_environment() {
        let command = Cli::command();
        let token = command
            .get_arguments()
            .find(|arg| arg.get_id() == "token")
            .unwrap();
        assert!(token.get_env().is_none());
    }

    #[test]
    fn test_account_flag_leaves_token_unset() {
        let cli = Cli::try_parse_from(["qfc", "--account", "work", "list"]).unwrap();
        assert_eq!(cli.account.as_deref(), Some("work"));
        assert!(cli.token.is_none());
    }
}
