use anyhow::{Result, anyhow};
use cardionet::bayesnet::common::interface::ScenarioMaker;
use cardionet::bayesnet::common::setup::{CommandLineOptions, parse_configuration_options};
use cardionet::bayesnet::scenarios::factory::ScenarioMakerFactory;
use cardionet::bayesnet::{BayesianNetwork, Query};
use cardionet::data::{Dataset, discretize};
use cardionet::report::{render_cpt, render_posterior};
use cardionet::{print_blue, print_green, print_red, print_yellow};
use log::info;

fn training_data(options: &CommandLineOptions, scenario: &dyn ScenarioMaker) -> Result<Dataset> {
    match &options.data_path {
        Some(path) => {
            let raw = Dataset::from_csv_path(path)?;
            if options.discretize {
                discretize(&raw, &scenario.categorical_columns(), &scenario.bins()?)
            } else {
                Ok(raw)
            }
        }
        None => scenario.training_data()?.ok_or_else(|| {
            anyhow!(
                "scenario '{}' has no bundled data; pass --data",
                scenario.name()
            )
        }),
    }
}

fn main() -> Result<()> {
    let options = parse_configuration_options()?;
    let scenario = ScenarioMakerFactory::new_shared(&options.scenario_name)
        .map_err(|e| anyhow!("{}", e))?;
    info!("Scenario: {}", scenario.name());

    let network = match &options.load_model {
        Some(path) => BayesianNetwork::from_file(path)
            .map_err(|e| anyhow!("cannot load {}: {}", path, e))?
            .with_ordering(options.ordering),
        None => {
            let data = training_data(&options, scenario.as_ref())?;
            info!("Training on {} rows", data.len());
            BayesianNetwork::new(scenario.structure()?).fit(&data, &options.fit_config())?
        }
    };

    if options.print_cpts {
        print_blue!("CPTs for {}", scenario.name());
        for (_, cpt) in network.cpts()? {
            print!("{}", render_cpt(cpt)?);
        }
    }

    if let Some(path) = &options.save_model {
        network
            .save_to_file(path)
            .map_err(|e| anyhow!("cannot save {}: {}", path, e))?;
        print_green!("Saved model to {}", path);
    }

    if !options.targets.is_empty() {
        let query = Query::new(options.targets.iter().cloned()).with_evidence(options.evidence.clone());
        let posterior = network.query(&query)?;
        print_yellow!("{}", query);
        print!("{}", render_posterior(&posterior));
        return Ok(());
    }

    let canned = scenario.queries();
    let queries: Vec<Query> = canned.iter().map(|c| c.query.clone()).collect();
    for (canned, result) in canned.iter().zip(network.query_batch(&queries)) {
        match result {
            Ok(posterior) => {
                let states: Vec<&str> = canned.reported.iter().map(String::as_str).collect();
                let headline = posterior.probability(&states)?;
                print_green!("{}: {:.4}", canned.description, headline);
                print!("{}", render_posterior(&posterior));
            }
            Err(e) => print_red!("{}: {}", canned.description, e),
        }
    }
    Ok(())
}
