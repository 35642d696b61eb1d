//! `survey-render`: render survey submissions from the command line

mod commands;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use survey_display::DisplayConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "SURVEY_LOG";

fn cli() -> Command {
    let submission = Arg::new("submission")
        .long("submission")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Submission JSON file");
    let compact = Arg::new("compact")
        .long("compact")
        .action(ArgAction::SetTrue)
        .help("Print JSON on one line");

    Command::new("survey-render")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render survey submissions into display trees")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("render")
                .about("Print the display tree of a submission as JSON")
                .arg(
                    Arg::new("asset")
                        .long("asset")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Asset JSON file (survey, choices, analysis form)"),
                )
                .arg(submission.clone())
                .arg(
                    Arg::new("translation")
                        .long("translation")
                        .value_parser(value_parser!(usize))
                        .help("Label translation index, overrides the config file"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML display configuration"),
                )
                .arg(
                    Arg::new("no-supplemental")
                        .long("no-supplemental")
                        .action(ArgAction::SetTrue)
                        .help("Leave out supplemental entries"),
                )
                .arg(compact.clone()),
        )
        .subcommand(
            Command::new("supplemental")
                .about("Print whether a submission has usable supplemental content")
                .arg(submission.clone())
                .arg(
                    Arg::new("path")
                        .long("path")
                        .help("Print the content at this _supplementalDetails/... path instead"),
                ),
        )
        .subcommand(
            Command::new("repeat-answers")
                .about("Print every answer to a question across repeat instances")
                .arg(submission)
                .arg(
                    Arg::new("path")
                        .long("path")
                        .required(true)
                        .help("Full slash-delimited question path"),
                )
                .arg(compact),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn path_arg<'a>(args: &'a ArgMatches, id: &str) -> Result<&'a Path> {
    args.get_one::<PathBuf>(id)
        .map(PathBuf::as_path)
        .with_context(|| format!("missing --{id}"))
}

fn display_config(args: &ArgMatches) -> Result<DisplayConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => commands::parse_config(&read(path)?)
            .with_context(|| format!("in {}", path.display()))?,
        None => DisplayConfig::default(),
    };
    if let Some(index) = args.get_one::<usize>("translation") {
        config = config.with_translation_index(*index);
    }
    if args.get_flag("no-supplemental") {
        config = config.with_supplemental(false);
    }
    Ok(config)
}

fn run(matches: &ArgMatches) -> Result<String> {
    match matches.subcommand() {
        Some(("render", args)) => {
            let config = display_config(args)?;
            tracing::debug!(?config, "display configuration");
            commands::render(
                &read(path_arg(args, "asset")?)?,
                &read(path_arg(args, "submission")?)?,
                config,
                args.get_flag("compact"),
            )
        }
        Some(("supplemental", args)) => commands::supplemental(
            &read(path_arg(args, "submission")?)?,
            args.get_one::<String>("path").map(String::as_str),
        ),
        Some(("repeat-answers", args)) => {
            let path = args
                .get_one::<String>("path")
                .context("missing --path")?;
            commands::repeat_answers(
                &read(path_arg(args, "submission")?)?,
                path,
                args.get_flag("compact"),
            )
        }
        _ => anyhow::bail!("unknown command"),
    }
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    let output = run(&matches)?;
    println!("{output}");
    Ok(())
}
