//! cmdbinv
//!
//! Ansible dynamic inventory backed by a BMC Remedy CMDB. Logs in, fetches
//! every server CI in one search, groups the hosts by the configured fields
//! and prints the inventory as JSON on stdout. Logs go to stderr.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use cmdbinv_client::http::DEFAULT_FORM;
use cmdbinv_client::{ClientOptions, Credentials, RemedyClient, fetch_records, with_session};
use cmdbinv_core::{
    FieldOverrides, Inventory, InventoryBuilder, InventoryConfig, MissingFieldPolicy, QuerySpec,
};
use color_eyre::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod emit;

use emit::Mode;

/// Ansible dynamic inventory from a BMC Remedy CMDB
#[derive(Parser, Debug)]
#[command(name = "cmdbinv", version, about)]
struct Args {
    /// Remedy host name, or base URL including the scheme
    #[arg(long, env = "REMEDY_INSTANCE")]
    instance: String,

    /// Remedy account name
    #[arg(long, env = "REMEDY_USERNAME")]
    username: String,

    /// Remedy account password
    #[arg(long, env = "REMEDY_PASSWORD", hide_env_values = true)]
    password: String,

    /// Comma-separated fields whose values name groups
    #[arg(long, env = "REMEDY_GROUPS")]
    groups: Option<String>,

    /// Comma-separated fields copied into host variables
    #[arg(long, env = "REMEDY_HOSTVARS")]
    hostvars: Option<String>,

    /// Only include servers whose Expansion contains this value
    #[arg(long, env = "REMEDY_OS")]
    os: Option<String>,

    /// Form to search
    #[arg(long, env = "REMEDY_FORM", default_value = DEFAULT_FORM)]
    form: String,

    /// Skip TLS certificate verification
    #[arg(long, env = "REMEDY_INSECURE")]
    insecure: bool,

    /// HTTP request timeout in seconds
    #[arg(long, env = "REMEDY_TIMEOUT_SECS", default_value = "30")]
    timeout_secs: u64,

    /// What to do with records lacking a configured field (fail, null)
    #[arg(long, env = "REMEDY_MISSING_FIELDS", default_value = "fail")]
    missing_fields: MissingFieldPolicy,

    /// Inventory defaults file (TOML)
    #[arg(short, long, env = "REMEDY_CONFIG")]
    config: Option<PathBuf>,

    /// Print the whole inventory (default)
    #[arg(long, conflicts_with = "host")]
    list: bool,

    /// Print the variables of a single host
    #[arg(long)]
    host: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, env = "REMEDY_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

impl Args {
    fn credentials(&self) -> Result<Credentials> {
        if self.username.trim().is_empty() {
            eyre::bail!("REMEDY_USERNAME is empty");
        }
        if self.password.is_empty() {
            eyre::bail!("REMEDY_PASSWORD is empty");
        }
        Ok(Credentials::new(self.username.trim(), self.password.clone()))
    }

    fn overrides(&self) -> FieldOverrides {
        FieldOverrides {
            groups: self.groups.clone(),
            host_vars: self.hostvars.clone(),
        }
    }

    fn client_options(&self) -> ClientOptions {
        ClientOptions {
            timeout: Duration::from_secs(self.timeout_secs),
            insecure: self.insecure,
        }
    }

    fn mode(&self) -> Mode {
        match (&self.host, self.list) {
            (Some(host), false) => Mode::Host(host.clone()),
            _ => Mode::List,
        }
    }
}

/// Log in, fetch, build. The session is released before returning.
async fn run(args: &Args) -> Result<Inventory> {
    let credentials = args.credentials()?;
    let defaults = config::load_default(args.config.as_deref())?;
    let config = InventoryConfig::resolve(&defaults, &args.overrides())
        .with_missing_fields(args.missing_fields);
    let query = QuerySpec::build(&config, args.os.as_deref());

    let client = RemedyClient::with_client(&args.instance, args.client_options().build()?)?
        .with_form(args.form.clone());

    info!(
        instance = %args.instance,
        groups = config.group_fields.len(),
        host_vars = config.host_var_fields.len(),
        "building inventory"
    );

    let api = &client;
    let config = &config;
    let inventory = with_session(api, &credentials, |token| async move {
        let records = fetch_records(api, &token, &query).await?;
        let inventory = InventoryBuilder::new(config).build(&records)?;
        Ok::<_, eyre::Report>(inventory)
    })
    .await?;

    info!(
        hosts = inventory.host_count(),
        groups = inventory.group_count(),
        "inventory ready"
    );

    Ok(inventory)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    // stdout carries the inventory, so logs go to stderr
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let inventory = run(&args).await?;
    let output = emit::render(&inventory, &args.mode(), args.pretty)?;
    println!("{output}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use clap::CommandFactory;
    use mockito::Matcher;
    use serde_json::{Value, json};

    /// Parse arguments with an explicit defaults file, so no search path is read
    fn args(url: &str, config: &Path, extra: &[&str]) -> Args {
        let config = config.to_str().unwrap();
        let mut argv = vec![
            "cmdbinv",
            "--instance",
            url,
            "--username",
            "svc",
            "--password",
            "pw",
            "--config",
            config,
        ];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    /// Empty defaults file: every key keeps its built-in value
    fn builtin_config() -> tempfile::NamedTempFile {
        tempfile::NamedTempFile::new().unwrap()
    }

    #[test]
    fn test_credentials_required() {
        let command = Args::command();
        for (id, env) in [("username", "REMEDY_USERNAME"), ("password", "REMEDY_PASSWORD")] {
            let arg = command
                .get_arguments()
                .find(|arg| arg.get_id() == id)
                .unwrap();
            assert!(arg.is_required_set(), "{id} must be required");
            assert_eq!(arg.get_env(), Some(std::ffi::OsStr::new(env)));
        }
    }

    #[test]
    fn test_blank_username_rejected() {
        let args = Args::try_parse_from([
            "cmdbinv",
            "--instance",
            "remedy.example.com",
            "--username",
            " ",
            "--password",
            "pw",
        ])
        .unwrap();
        assert!(args.credentials().is_err());
    }

    #[test]
    fn test_mode_and_options() {
        let args = args(
            "remedy.example.com",
            Path::new("unused.toml"),
            &["--host", "web01", "--missing-fields", "null", "--timeout-secs", "5"],
        );
        assert_eq!(args.mode(), Mode::Host("web01".to_string()));
        assert_eq!(args.missing_fields, MissingFieldPolicy::Null);
        assert_eq!(args.client_options().timeout, Duration::from_secs(5));

        let result = Args::try_parse_from([
            "cmdbinv",
            "--instance",
            "x",
            "--username",
            "u",
            "--password",
            "p",
            "--list",
            "--host",
            "web01",
        ]);
        assert!(result.is_err());

        let args = self::args("x", Path::new("unused.toml"), &["--list"]);
        assert!(args.list);
        assert_eq!(args.mode(), Mode::List);
    }

    #[tokio::test]
    async fn test_run_end_to_end() {
        let mut server = mockito::Server::new_async().await;
        let login = server
            .mock("POST", "/api/jwt/login")
            .with_status(200)
            .with_body("tok")
            .create_async()
            .await;
        let search = server
            .mock("GET", "/api/arsys/v1.0/entry/AST:ComputerSystem")
            .match_header("authorization", "AR-JWT tok")
            .match_query(Matcher::UrlEncoded(
                "q".into(),
                "'Item' = \"Server\" AND 'Expansion' LIKE \"%Windows%\"".into(),
            ))
            .with_status(200)
            .with_body(
                json!({
                    "entries": [
                        { "values": { "Name": "win01", "Expansion": "Windows", "PrimaryIP": "10.0.0.7" } },
                        { "values": { "Name": "win02", "Expansion": "Windows", "PrimaryIP": null } }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;
        let logout = server
            .mock("POST", "/api/jwt/logout")
            .match_header("authorization", "AR-JWT tok")
            .with_status(204)
            .create_async()
            .await;

        let url = server.url();
        let config = builtin_config();
        let args = args(
            &url,
            config.path(),
            &[
                "--groups",
                "Expansion",
                "--hostvars",
                "PrimaryIP",
                "--os",
                "Windows",
            ],
        );
        let inventory = run(&args).await.unwrap();
        let output: Value =
            serde_json::from_str(&emit::render(&inventory, &Mode::List, false).unwrap()).unwrap();

        assert_eq!(output["all"]["hosts"], json!(["win01", "win02"]));
        assert_eq!(output["Windows"]["hosts"], json!(["win01", "win02"]));
        assert_eq!(output["Windows"]["vars"]["ansible_connection"], "winrm");
        assert_eq!(output["Windows"]["children"], json!([]));
        assert_eq!(
            output["_meta"]["hostvars"]["win02"],
            json!({ "PrimaryIP": null, "Name": "win02" })
        );

        login.assert_async().await;
        search.assert_async().await;
        logout.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_login_never_fetches() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/jwt/login")
            .with_status(401)
            .create_async()
            .await;
        let search = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let logout = server
            .mock("POST", "/api/jwt/logout")
            .expect(0)
            .create_async()
            .await;

        let url = server.url();
        let config = builtin_config();
        let err = run(&args(&url, config.path(), &[])).await.unwrap_err();

        assert!(err.to_string().contains("authentication failed"));
        search.assert_async().await;
        logout.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_field_aborts_and_logs_out() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/jwt/login")
            .with_status(200)
            .with_body("tok")
            .create_async()
            .await;
        server
            .mock("GET", "/api/arsys/v1.0/entry/AST:ComputerSystem")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"entries":[{"values":{"Name":"web01"}}]}"#)
            .create_async()
            .await;
        let logout = server
            .mock("POST", "/api/jwt/logout")
            .with_status(204)
            .create_async()
            .await;

        let url = server.url();
        let config = builtin_config();
        let err = run(&args(&url, config.path(), &[])).await.unwrap_err();

        assert!(err.to_string().contains("missing field"));
        logout.assert_async().await;
    }
}
