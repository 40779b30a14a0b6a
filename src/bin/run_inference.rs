use cardionet::bayesnet::common::interface::ScenarioMaker;
use cardionet::bayesnet::common::setup::init_logging;
use cardionet::bayesnet::scenarios::heart_disease::HeartDisease;
use cardionet::bayesnet::{BayesianNetwork, FitConfig};
use cardionet::data::{Dataset, discretize};
use cardionet::{print_green, print_red};
use std::env;
use std::error::Error;

/// Fit the heart-disease network on a raw Cleveland CSV and answer its four
/// standard questions.
fn main() -> Result<(), Box<dyn Error>> {
    init_logging();
    let path = env::args()
        .nth(1)
        .ok_or("usage: run_inference <heart.csv>")?;

    let scenario = HeartDisease {};
    let raw = Dataset::from_csv_path(&path)?;
    let data = discretize(&raw, &scenario.categorical_columns(), &scenario.bins()?)?;
    println!("Discretized {} rows into {} columns", data.len(), data.columns().len());

    let network = BayesianNetwork::new(scenario.structure()?).fit(&data, &FitConfig::default())?;

    for canned in scenario.queries() {
        match network.query(&canned.query) {
            Ok(posterior) => {
                let states: Vec<&str> = canned.reported.iter().map(String::as_str).collect();
                print_green!("{}: {:.4}", canned.description, posterior.probability(&states)?);
            }
            Err(e) => print_red!("{}: {}", canned.description, e),
        }
    }
    Ok(())
}
