use crate::bayesnet::inference::{EliminationOrdering, FitConfig};
use crate::bayesnet::model::estimator::UnseenParentPolicy;
use crate::bayesnet::model::factor::Evidence;
use anyhow::{Context, Result, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command, builder::EnumValueParser};
use env_logger::{Builder, Env};
use serde::Deserialize;
use std::io::Write;

/// Everything the user chose on the command line, as plain data.
#[derive(Deserialize, Clone, Debug)]
pub struct CommandLineOptions {
    pub scenario_name: String,
    pub data_path: Option<String>,
    pub discretize: bool,
    pub unseen_parents: UnseenParentPolicy,
    pub ordering: EliminationOrdering,
    pub targets: Vec<String>,
    pub evidence: Evidence,
    pub print_cpts: bool,
    pub save_model: Option<String>,
    pub load_model: Option<String>,
}

impl CommandLineOptions {
    pub fn fit_config(&self) -> FitConfig {
        FitConfig {
            unseen_parents: self.unseen_parents,
            ordering: self.ordering,
        }
    }
}

/// `LEVEL [file:line] message`, filtered by `RUST_LOG` with `info` as default.
pub fn init_logging() {
    // try_init: unit tests and binaries may both reach this more than once
    let _ = Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let file = record.file().unwrap_or("unknown");
            let line = record.line().unwrap_or(0);
            writeln!(
                buf,
                "{} [{}:{}] {}",
                record.level(),
                file,
                line,
                record.args()
            )
        })
        .try_init();
}

pub fn build_command() -> Command {
    Command::new("CARDIONET")
        .version("1.0")
        .about("Discrete Bayesian network fitting and exact inference for clinical variables.")
        .arg(
            Arg::new("scenario_name")
                .long("scenario_name")
                .value_name("STRING")
                .help("Network definition to use")
                .default_value("heart_disease"),
        )
        .arg(
            Arg::new("data")
                .long("data")
                .value_name("FILE")
                .help("CSV training table (header row, one column per variable)"),
        )
        .arg(
            Arg::new("discretize")
                .long("discretize")
                .help("Bin the scenario's numeric columns before fitting")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("unseen_parents")
                .long("unseen_parents")
                .value_parser(EnumValueParser::<UnseenParentPolicy>::new())
                .help("Parent assignments with no training rows: 'uniform' or 'fail'")
                .default_value("uniform"),
        )
        .arg(
            Arg::new("ordering")
                .long("ordering")
                .value_parser(EnumValueParser::<EliminationOrdering>::new())
                .help("Elimination order: 'reverse-topological' or 'min-weight'")
                .default_value("reverse-topological"),
        )
        .arg(
            Arg::new("target")
                .long("target")
                .value_name("VARIABLE")
                .help("Query target (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("evidence")
                .long("evidence")
                .value_name("VARIABLE=STATE")
                .help("Observed state (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("print_cpts")
                .long("print_cpts")
                .help("Print every fitted CPT")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("save_model")
                .long("save_model")
                .value_name("FILE")
                .help("Write the fitted model as JSON"),
        )
        .arg(
            Arg::new("load_model")
                .long("load_model")
                .value_name("FILE")
                .help("Skip fitting and load a model written by --save_model"),
        )
}

pub fn options_from_matches(matches: &ArgMatches) -> Result<CommandLineOptions> {
    let scenario_name = matches
        .get_one::<String>("scenario_name")
        .cloned()
        .unwrap_or_else(|| "heart_disease".to_string());
    let unseen_parents = matches
        .get_one::<UnseenParentPolicy>("unseen_parents")
        .copied()
        .unwrap_or(UnseenParentPolicy::Uniform);
    let ordering = matches
        .get_one::<EliminationOrdering>("ordering")
        .copied()
        .unwrap_or_default();
    let targets = matches
        .get_many::<String>("target")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    let mut evidence = Evidence::new();
    for pair in matches.get_many::<String>("evidence").into_iter().flatten() {
        let (name, state) = parse_evidence(pair)?;
        evidence.insert(name, state);
    }

    Ok(CommandLineOptions {
        scenario_name,
        data_path: matches.get_one::<String>("data").cloned(),
        discretize: matches.get_flag("discretize"),
        unseen_parents,
        ordering,
        targets,
        evidence,
        print_cpts: matches.get_flag("print_cpts"),
        save_model: matches.get_one::<String>("save_model").cloned(),
        load_model: matches.get_one::<String>("load_model").cloned(),
    })
}

/// Split `name=state`.
pub fn parse_evidence(pair: &str) -> Result<(String, String)> {
    let (name, state) = pair
        .split_once('=')
        .ok_or_else(|| anyhow!("evidence '{}' is not of the form VARIABLE=STATE", pair))?;
    let (name, state) = (name.trim(), state.trim());
    if name.is_empty() || state.is_empty() {
        return Err(anyhow!("evidence '{}' has an empty side", pair));
    }
    Ok((name.to_string(), state.to_string()))
}

pub fn parse_configuration_options() -> Result<CommandLineOptions> {
    init_logging();
    let matches = build_command().get_matches();
    options_from_matches(&matches).context("invalid command line")
}
