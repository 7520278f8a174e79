// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use grasshopper_dispatch::config::{load_config, BackendConfig};
use grasshopper_dispatch::dispatcher::Connection;
use grasshopper_dispatch::graph::{
    create_parametric_definition, edit_script_component, invoke_plugin,
};
use grasshopper_dispatch::protocol::{ExecutionResult, NodeId, Parameters};

const USAGE: &str = "Usage: grasshopper-dispatch [--config <file>] <command>

Commands:
  exec <script> [key=value ...]                       Execute a script file
  workflow <description> [key=value ...] [--save <path>]  Build and run a parametric definition
  read <file.3dm>                                     Summarize a model file
  plugin <plugin> <component> [key=value ...]         Invoke a plugin component
  edit <script-id> <code-file> [--file <definition>]  Replace a script component's code";

enum Command {
    Exec { script: PathBuf, parameters: Parameters },
    Workflow { description: String, parameters: Parameters, save: Option<PathBuf> },
    Read { file: PathBuf },
    Plugin { plugin: String, component: String, inputs: Parameters },
    Edit { id: String, code: PathBuf, file: Option<PathBuf> },
}

/// `key=value` with the value parsed as JSON when possible.
fn parse_binding(arg: &str) -> Result<(String, Value)> {
    let Some((key, raw)) = arg.split_once('=') else {
        bail!("Expected key=value, got '{}'", arg);
    };
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

fn parse_bindings(args: &[String]) -> Result<Parameters> {
    args.iter().map(|a| parse_binding(a)).collect()
}

fn parse_command(args: &[String]) -> Result<Command> {
    match args {
        [cmd, script, rest @ ..] if cmd == "exec" => Ok(Command::Exec {
            script: PathBuf::from(script),
            parameters: parse_bindings(rest)?,
        }),
        [cmd, description, rest @ ..] if cmd == "workflow" => {
            let mut save = None;
            let mut bindings = Vec::new();
            let mut rest = rest.iter();
            while let Some(arg) = rest.next() {
                if arg == "--save" {
                    save = Some(PathBuf::from(rest.next().context("--save requires a path")?));
                } else {
                    bindings.push(arg.clone());
                }
            }
            Ok(Command::Workflow {
                description: description.clone(),
                parameters: parse_bindings(&bindings)?,
                save,
            })
        }
        [cmd, file] if cmd == "read" => Ok(Command::Read {
            file: PathBuf::from(file),
        }),
        [cmd, plugin, component, rest @ ..] if cmd == "plugin" => Ok(Command::Plugin {
            plugin: plugin.clone(),
            component: component.clone(),
            inputs: parse_bindings(rest)?,
        }),
        [cmd, id, code, rest @ ..] if cmd == "edit" => {
            let file = match rest {
                [] => None,
                [flag, path] if flag == "--file" => Some(PathBuf::from(path)),
                _ => bail!("{}", USAGE),
            };
            Ok(Command::Edit {
                id: id.clone(),
                code: PathBuf::from(code),
                file,
            })
        }
        _ => bail!("{}", USAGE),
    }
}

fn load_backend_config(config_path: Option<&Path>) -> Result<BackendConfig> {
    let config = match config_path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?
            .apply_env(|key| env::var(key).ok())?,
        None => BackendConfig::from_env()?,
    };
    Ok(config)
}

async fn run(connection: &Connection, command: Command) -> Result<ExecutionResult> {
    let envelope = match command {
        Command::Exec { script, parameters } => {
            let code = std::fs::read_to_string(&script)
                .with_context(|| format!("Failed to read script {}", script.display()))?;
            connection.execute_code(&code, parameters).await
        }
        Command::Workflow {
            description,
            parameters,
            save,
        } => create_parametric_definition(connection, &description, &parameters, save.as_deref()).await,
        Command::Read { file } => connection.read_file(&file).await,
        Command::Plugin {
            plugin,
            component,
            inputs,
        } => invoke_plugin(connection, &plugin, &component, &inputs, None).await,
        Command::Edit { id, code, file } => {
            let code = std::fs::read_to_string(&code)
                .with_context(|| format!("Failed to read script {}", code.display()))?;
            edit_script_component(connection, file.as_deref(), &NodeId::from(id), &code).await
        }
    };
    Ok(envelope)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,grasshopper_dispatch=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let config_path = match args.iter().position(|a| a == "--config") {
        Some(i) if i + 1 < args.len() => {
            let path = PathBuf::from(args.remove(i + 1));
            args.remove(i);
            Some(path)
        }
        Some(_) => bail!("--config requires a file\n\n{}", USAGE),
        None => None,
    };

    let command = parse_command(&args)?;
    let config = load_backend_config(config_path.as_deref())?;

    let mut connection = Connection::new(config);
    connection
        .initialize()
        .context("Failed to initialize the geometry backend")?;

    let envelope = run(&connection, command).await;
    connection.close().await;
    let envelope = envelope?;

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    if envelope.is_error() {
        std::process::exit(1);
    }
    Ok(())
}
