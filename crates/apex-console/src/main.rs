//! `apex-console` command-line entry point

use anyhow::Context;
use apex_client::{ApiClient, EnvToken};
use apex_console::{commands, logging, ConsoleConfig};
use apex_core::SessionUser;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

fn cli() -> Command {
    Command::new("apex-console")
        .version(apex_console::VERSION)
        .about("Inspect and edit Apex incidents")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML file with [api] and [session] sections"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("tabs")
                .about("Show permissions and tabs for a team")
                .arg(Arg::new("team").long("team").required(true).help("Team label"))
                .arg(
                    Arg::new("read-only")
                        .long("read-only")
                        .action(ArgAction::SetTrue)
                        .help("Resolve for view mode"),
                ),
        )
        .subcommand(
            Command::new("show")
                .about("Open an incident and print the enriched record")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(value_parser!(i64))
                        .help("Incident id"),
                )
                .arg(
                    Arg::new("team")
                        .long("team")
                        .default_value("End User")
                        .help("Team label"),
                )
                .arg(
                    Arg::new("edit")
                        .long("edit")
                        .action(ArgAction::SetTrue)
                        .help("Open in edit mode instead of view mode"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("save")
                .about("Update fields of an incident")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(value_parser!(i64))
                        .help("Incident id"),
                )
                .arg(Arg::new("team").long("team").required(true).help("Team label"))
                .arg(
                    Arg::new("user-id")
                        .long("user-id")
                        .required(true)
                        .value_parser(value_parser!(i64))
                        .help("Current user id"),
                )
                .arg(
                    Arg::new("set")
                        .long("set")
                        .action(ArgAction::Append)
                        .value_name("KEY=VALUE")
                        .help("Field to change; repeatable"),
                ),
        )
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();
    logging::init_tracing(matches.get_flag("json-logs"));

    match run(&matches).await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(matches: &ArgMatches) -> anyhow::Result<ExitCode> {
    let config = ConsoleConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    match matches.subcommand() {
        Some(("tabs", args)) => {
            let team = required::<String>(args, "team")?;
            print!("{}", commands::tabs(&team, args.get_flag("read-only")));
            Ok(ExitCode::SUCCESS)
        }
        Some(("show", args)) => {
            let api = client(&config)?;
            let output = commands::show(
                api,
                config.session.clone(),
                required::<i64>(args, "id")?,
                &required::<String>(args, "team")?,
                args.get_flag("edit"),
                args.get_flag("json"),
            )
            .await?;
            println!("{output}");
            Ok(ExitCode::SUCCESS)
        }
        Some(("save", args)) => {
            let assignments = args
                .get_many::<String>("set")
                .into_iter()
                .flatten()
                .map(|raw| commands::parse_assignment(raw))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let user = SessionUser::new(Some(required::<i64>(args, "user-id")?), required::<String>(args, "team")?);

            let api = client(&config)?;
            let saved = commands::save(
                api,
                config.session.clone(),
                required::<i64>(args, "id")?,
                user,
                &assignments,
            )
            .await?;
            Ok(if saved { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        _ => anyhow::bail!("unknown command"),
    }
}

fn client(config: &ConsoleConfig) -> anyhow::Result<ApiClient> {
    ApiClient::from_config(&config.api, Arc::new(EnvToken::default())).context("failed to create API client")
}

fn required<T: Clone + Send + Sync + 'static>(args: &ArgMatches, name: &str) -> anyhow::Result<T> {
    args.get_one::<T>(name)
        .cloned()
        .with_context(|| format!("missing --{name}"))
}
