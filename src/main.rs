//! Main binary for the editkit CLI

use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use editkit::{create_tool_registry_with_config, EditorConfig, ToolArgs, Workspace};
use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so tool output on stdout stays clean
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("editkit=warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    // Tool names and descriptions don't depend on the workspace, so a
    // throwaway registry is enough to build the subcommands
    let probe = create_tool_registry_with_config(
        Workspace::from_current_dir()?,
        EditorConfig::default(),
    );
    let tool_info: Vec<(&'static str, &'static str)> = probe
        .list_tools()
        .into_iter()
        .filter_map(|name| {
            probe.get_tool(&name).map(|tool| {
                let name_static: &'static str = Box::leak(name.into_boxed_str());
                let desc_static: &'static str =
                    Box::leak(tool.description().to_string().into_boxed_str());
                (name_static, desc_static)
            })
        })
        .collect();

    let mut app = Command::new("editkit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("File viewing, editing and patching tools for coding agents")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("root")
                .long("root")
                .value_name("DIR")
                .help("Workspace root; paths outside it are rejected (default: current directory)")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Config file (default: config/editkit.toml under the root, if present)")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
                .action(ArgAction::Set),
        );

    for (tool_name, description) in &tool_info {
        app = app.subcommand(
            Command::new(*tool_name).about(*description).arg(
                Arg::new("args")
                    .help("Tool arguments: positional, --key=value or --json=<object>")
                    .num_args(0..)
                    .value_name("ARGS")
                    .allow_hyphen_values(true)
                    .trailing_var_arg(true),
            ),
        );
    }

    let matches = app.get_matches();

    let workspace = match matches.get_one::<PathBuf>("root") {
        Some(root) => Workspace::new(root)
            .with_context(|| format!("Invalid workspace root {}", root.display()))?,
        None => Workspace::from_current_dir()?,
    };
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => EditorConfig::from_file(path)?,
        None => EditorConfig::discover(workspace.root()),
    };
    let mut registry = create_tool_registry_with_config(workspace, config);

    let Some((tool_name, sub_matches)) = matches.subcommand() else {
        eprintln!("No tool specified");
        std::process::exit(1);
    };

    let args: Vec<String> = sub_matches
        .get_many::<String>("args")
        .unwrap_or_default()
        .cloned()
        .collect();
    let tool_args = build_tool_args(tool_name, args)?;

    match registry.execute_tool(tool_name, &tool_args) {
        Ok(result) => {
            println!("{}", result.message);
            if !result.success {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Turn raw CLI words into tool arguments. `apply_patch -` reads the
/// document from stdin.
fn build_tool_args(tool_name: &str, args: Vec<String>) -> anyhow::Result<ToolArgs> {
    if tool_name == "apply_patch" && args.len() == 1 && args[0] == "-" {
        let mut document = String::new();
        std::io::stdin()
            .read_to_string(&mut document)
            .context("Failed to read patch from stdin")?;
        let named = HashMap::from([("patch".to_string(), document)]);
        return Ok(ToolArgs::with_named_args(Vec::new(), named));
    }

    let words: Vec<&str> = args.iter().map(String::as_str).collect();
    Ok(ToolArgs::from_args(&words))
}
