use std::{error::Error, rc::Rc};

use crate::bayesnet::common::interface::ScenarioMaker;

use super::{heart_disease::HeartDisease, sprinkler::Sprinkler, two_node::TwoNode};

pub struct ScenarioMakerFactory;

impl ScenarioMakerFactory {
    pub fn new_shared(name: &str) -> Result<Rc<dyn ScenarioMaker>, Box<dyn Error>> {
        match name {
            "heart_disease" => Ok(Rc::new(HeartDisease {})),
            "two_node" => Ok(Rc::new(TwoNode {})),
            "sprinkler" => Ok(Rc::new(Sprinkler::default())),
            _ => Err(format!("Unknown scenario '{}'", name).into()),
        }
    }

    pub fn names() -> [&'static str; 3] {
        ["heart_disease", "two_node", "sprinkler"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_name_resolves() {
        for name in ScenarioMakerFactory::names() {
            let scenario = ScenarioMakerFactory::new_shared(name).unwrap();
            assert_eq!(scenario.name(), name);
            assert!(scenario.structure().is_ok());
        }
        assert!(ScenarioMakerFactory::new_shared("dating_simple").is_err());
    }
}
