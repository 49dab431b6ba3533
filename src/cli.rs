// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::config::{parse_duration, Config, WaitConfig};
use crate::constants::wait::{DEFAULT_APPLICATION_TIMEOUT_SECS, DEFAULT_RESOURCE_TIMEOUT_SECS};
use crate::create::{CreateApplication, CreatePostgres, CreateProject, GitConfig};
use crate::error::{Result, TideError};
use crate::get::GetPostgres;
use crate::kubernetes::ApiClient;
use crate::types::application::ApplicationSize;
use crate::update::UpdateApplication;
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::time::Duration;

/// tidectl - manage applications and services on a tide control plane
#[derive(Parser, Debug)]
#[command(name = "tidectl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Project to operate in
    #[arg(long, global = true, env = "TIDE_PROJECT")]
    pub project: Option<String>,

    /// Organization owning the projects
    #[arg(long, global = true, env = "TIDE_ORGANIZATION")]
    pub organization: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a resource
    #[command(subcommand)]
    Create(CreateCommand),
    /// Update an existing resource
    #[command(subcommand)]
    Update(UpdateCommand),
    /// Show resources
    #[command(subcommand)]
    Get(GetCommand),
}

#[derive(Subcommand, Debug)]
pub enum CreateCommand {
    Application(CreateApplicationArgs),
    Project(CreateProjectArgs),
    Postgres(CreatePostgresArgs),
}

#[derive(Subcommand, Debug)]
pub enum UpdateCommand {
    Application(UpdateApplicationArgs),
}

#[derive(Subcommand, Debug)]
pub enum GetCommand {
    Postgres(GetPostgresArgs),
}

#[derive(Args, Debug, Clone)]
pub struct WaitArgs {
    /// Wait until the resource is ready
    #[arg(long)]
    pub wait: bool,

    /// Give up waiting after this long (e.g. 90s, 15m, 1h)
    #[arg(long, value_parser = parse_duration)]
    pub wait_timeout: Option<Duration>,
}

impl WaitArgs {
    fn config(&self, default_timeout_secs: u64) -> WaitConfig {
        let timeout = self
            .wait_timeout
            .unwrap_or(Duration::from_secs(default_timeout_secs));
        WaitConfig::new(self.wait, timeout)
    }
}

#[derive(Args, Debug)]
pub struct CreateApplicationArgs {
    pub name: String,

    #[arg(long)]
    pub git_url: String,
    #[arg(long, default_value = "main")]
    pub git_revision: String,
    #[arg(long)]
    pub git_sub_path: Option<String>,
    #[arg(long)]
    pub git_username: Option<String>,
    #[arg(long)]
    pub git_password: Option<String>,
    /// Path to a private key used to clone over SSH
    #[arg(long)]
    pub git_ssh_private_key_file: Option<std::path::PathBuf>,

    #[arg(long = "host")]
    pub hosts: Vec<String>,
    #[arg(long)]
    pub size: Option<ApplicationSize>,
    #[arg(long)]
    pub port: Option<i32>,
    #[arg(long)]
    pub replicas: Option<i32>,
    /// Environment variable as KEY=VALUE, repeatable
    #[arg(long, value_parser = parse_env_var)]
    pub env: Vec<(String, String)>,

    #[command(flatten)]
    pub wait: WaitArgs,
}

#[derive(Args, Debug)]
pub struct CreateProjectArgs {
    pub name: String,
    #[arg(long)]
    pub display_name: Option<String>,
    #[command(flatten)]
    pub wait: WaitArgs,
}

#[derive(Args, Debug)]
pub struct CreatePostgresArgs {
    pub name: String,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub machine_type: Option<String>,
    #[arg(long)]
    pub version: Option<String>,
    #[command(flatten)]
    pub wait: WaitArgs,
}

#[derive(Args, Debug)]
pub struct UpdateApplicationArgs {
    pub name: String,

    #[arg(long)]
    pub git_url: Option<String>,
    #[arg(long)]
    pub git_revision: Option<String>,
    #[arg(long)]
    pub git_sub_path: Option<String>,
    /// Replaces all hosts when given
    #[arg(long = "host")]
    pub hosts: Vec<String>,
    #[arg(long)]
    pub size: Option<ApplicationSize>,
    #[arg(long)]
    pub port: Option<i32>,
    #[arg(long)]
    pub replicas: Option<i32>,
    #[arg(long, value_parser = parse_env_var)]
    pub env: Vec<(String, String)>,
    /// Name of an environment variable to remove, repeatable
    #[arg(long)]
    pub delete_env: Vec<String>,

    #[command(flatten)]
    pub wait: WaitArgs,
}

#[derive(Args, Debug)]
pub struct GetPostgresArgs {
    /// Show a single instance
    pub name: Option<String>,
    #[arg(long, conflicts_with = "print_user")]
    pub print_password: bool,
    #[arg(long)]
    pub print_user: bool,
}

fn parse_env_var(s: &str) -> Result<(String, String)> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(TideError::InvalidArgument(format!(
            "invalid environment variable '{}', expected KEY=VALUE",
            s
        ))),
    }
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::from_env();
        if let Some(project) = &self.project {
            config.project = project.clone();
        }
        if let Some(organization) = &self.organization {
            config.organization = Some(organization.clone());
        }
        config
    }

    /// Run the CLI command
    pub async fn run(self) -> Result<()> {
        let config = self.config();
        let client = ApiClient::from_config(&config).await?;

        match self.command {
            Commands::Create(CreateCommand::Application(args)) => {
                let ssh_private_key = match &args.git_ssh_private_key_file {
                    Some(path) => Some(tokio::fs::read_to_string(path).await?),
                    None => None,
                };
                CreateApplication {
                    name: args.name,
                    git: GitConfig {
                        url: args.git_url,
                        sub_path: args.git_sub_path,
                        revision: args.git_revision,
                        username: args.git_username,
                        password: args.git_password,
                        ssh_private_key,
                    },
                    hosts: args.hosts,
                    size: args.size,
                    port: args.port,
                    replicas: args.replicas,
                    env: args.env.into_iter().collect(),
                    wait: args.wait.config(DEFAULT_APPLICATION_TIMEOUT_SECS),
                }
                .run(&client)
                .await?;
            }
            Commands::Create(CreateCommand::Project(args)) => {
                CreateProject {
                    name: args.name,
                    display_name: args.display_name,
                    wait: args.wait.config(DEFAULT_RESOURCE_TIMEOUT_SECS),
                }
                .run(&client)
                .await?;
            }
            Commands::Create(CreateCommand::Postgres(args)) => {
                CreatePostgres {
                    name: args.name,
                    location: args.location,
                    machine_type: args.machine_type,
                    version: args.version,
                    wait: args.wait.config(DEFAULT_RESOURCE_TIMEOUT_SECS),
                }
                .run(&client)
                .await?;
            }
            Commands::Update(UpdateCommand::Application(args)) => {
                UpdateApplication {
                    name: args.name,
                    git_url: args.git_url,
                    git_sub_path: args.git_sub_path,
                    git_revision: args.git_revision,
                    hosts: (!args.hosts.is_empty()).then_some(args.hosts),
                    size: args.size,
                    port: args.port,
                    replicas: args.replicas,
                    env: args.env.into_iter().collect::<BTreeMap<_, _>>(),
                    delete_env: args.delete_env,
                    wait: Some(args.wait.config(DEFAULT_APPLICATION_TIMEOUT_SECS)),
                }
                .run(&client)
                .await?;
            }
            Commands::Get(GetCommand::Postgres(args)) => {
                GetPostgres {
                    name: args.name,
                    print_password: args.print_password,
                    print_user: args.print_user,
                }
                .run(&client, &mut std::io::stdout().lock())
                .await?;
            }
        }
        Ok(())
    }
}
