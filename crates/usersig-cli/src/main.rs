use std::fs;
use std::path::PathBuf;

use anyhow::{Context, ensure};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use usersig_auth::{Api, Clock, PrivilegeMap};
use usersig_core::{
    CONFIG_FILE, ConfigRequest, ConfigResponse, EnvSecretStore, IssueDefaults, IssuerConfig,
    default_config_dir, issue_config_response, load_config_from_dir, write_default_config_file,
};

#[derive(Debug, Parser)]
#[command(name = "usersig", about = "Issue UserSig and PrivateMapKey tokens")]
struct Cli {
    #[arg(long, global = true)]
    json: bool,

    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write a default usersig.toml
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Issue a UserSig
    UserSig {
        /// Identifier to sign for (default from config)
        #[arg(long)]
        userid: Option<String>,
        /// Validity in seconds (default from config)
        #[arg(long)]
        expire: Option<u64>,
    },
    /// Issue a PrivateMapKey for one room
    PrivateMapKey {
        #[arg(long)]
        userid: String,
        #[arg(long, default_value_t = 300)]
        expire: u64,
        #[command(flatten)]
        room: RoomArgs,
        /// Privilege bits, 255 grants everything
        #[arg(long, default_value_t = 255)]
        privilege: u32,
    },
    /// Answer a /config request body with {sdkappid, userSig}
    Config {
        /// JSON request body, e.g. '{"userid":"alice","expire":3600}'
        #[arg(long, default_value = "{}")]
        body: String,
    },
}

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
struct RoomArgs {
    /// Numeric room id
    #[arg(long)]
    room_id: Option<u32>,
    /// String room id
    #[arg(long)]
    room_code: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("usersig=info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg_dir = cli.config_dir.clone().unwrap_or_else(default_config_dir);

    if let Commands::Init { force } = cli.command {
        let path = cfg_dir.join(CONFIG_FILE);
        if force && path.exists() {
            fs::remove_file(&path)?;
        }
        let written = write_default_config_file(&cfg_dir)?;
        let text = if written { "Init complete" } else { "Config already present" };
        return pout(
            cli.json,
            serde_json::json!({"written": written, "config": path}),
            text,
        );
    }

    let config = load_config(&cfg_dir)?;
    let api = config.build_api(&EnvSecretStore).with_context(|| {
        format!(
            "secret for sdkappid {} not available; export {}",
            config.sdkappid, config.secret_ref
        )
    })?;

    match cli.command {
        Commands::Init { .. } => unreachable!(),
        Commands::UserSig { userid, expire } => {
            let userid = userid.unwrap_or_else(|| config.defaults.userid.clone());
            let expire = expire.unwrap_or(config.defaults.expire);
            ensure!(!userid.is_empty(), "--userid must not be empty");
            let sig = api.issue_user_sig(&userid, expire)?;
            print_token(cli.json, &api, &userid, expire, &sig)?;
        }
        Commands::PrivateMapKey {
            userid,
            expire,
            room,
            privilege,
        } => {
            ensure!(!userid.is_empty(), "--userid must not be empty");
            let privilege = PrivilegeMap::from_bits(privilege);
            let key = match (room.room_id, room.room_code) {
                (Some(id), _) => api.issue_private_map_key(&userid, expire, id, privilege)?,
                (None, Some(code)) => {
                    api.issue_private_map_key_with_room_code(&userid, expire, &code, privilege)?
                }
                (None, None) => anyhow::bail!("one of --room-id or --room-code is required"),
            };
            print_token(cli.json, &api, &userid, expire, &key)?;
        }
        Commands::Config { body } => {
            let response = answer_config(&api, &body, &config.defaults)?;
            // Plain mode prints the compact body as it would go on the wire.
            pout(
                cli.json,
                serde_json::to_value(&response)?,
                &serde_json::to_string(&response)?,
            )?;
        }
    }

    Ok(())
}

/// Config file if present, else `SDKAPPID`/`SECRET` from the environment.
fn load_config(dir: &std::path::Path) -> anyhow::Result<IssuerConfig> {
    match load_config_from_dir(dir) {
        Ok(cfg) => Ok(cfg),
        Err(usersig_core::ConfigError::NotFound(_)) => {
            tracing::debug!(dir = %dir.display(), "no config file, using environment");
            IssuerConfig::from_env().with_context(|| {
                format!(
                    "no {CONFIG_FILE} in {} and no usable environment; run `usersig init`",
                    dir.display()
                )
            })
        }
        Err(e) => Err(e.into()),
    }
}

fn answer_config<C: Clock>(
    api: &Api<C>,
    body: &str,
    defaults: &IssueDefaults,
) -> anyhow::Result<ConfigResponse> {
    let request: ConfigRequest =
        serde_json::from_str(body).context("request body is not valid JSON")?;
    Ok(issue_config_response(api, &request, defaults)?)
}

fn print_token(json: bool, api: &Api, userid: &str, expire: u64, token: &str) -> anyhow::Result<()> {
    pout(
        json,
        serde_json::json!({
            "sdkappid": api.sdkappid(),
            "userid": userid,
            "expire": expire,
            "token": token,
        }),
        token,
    )
}

pub fn pout(json_mode: bool, value: serde_json::Value, text: &str) -> anyhow::Result<()> {
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{text}");
    }
    Ok(())
}
