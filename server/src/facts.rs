//! Random penguin facts served on `PENGU` requests.

use rand::Rng;
use thiserror::Error;

/// Built-in fact list, loaded once at startup.
///
/// SOURCE: https://www.factretriever.com/penguin-facts
pub const FACTS: &[&str] = &[
    "Penguins are one of about 40 species of flightless birds.",
    "Most scientists agree that there are 17 species of penguins. Of the 17 species, 13 are either threatened or endangered, with some on the brink of extinction.",
    "Generally, penguins are not sexually dimorphic, meaning male and female penguins look alike.",
    "Penguins swallow pebbles and stones as well as their food.",
    "Penguins do not have teeth. Instead they use their beak to grab and hold wiggling prey.",
    "Penguins spend several hours a day preening or caring for their feathers.",
    "The penguin with the highest number of species is the Macaroni Penguin, with approximately 11,654,000 pairs.",
    "Penguins molt, or lose their feathers, once a year. They always molt on land or ice and until they grow new waterproof coats, they are unable to go into the water. Molting may take weeks, and most penguins lose about half their body weight during this time.",
    "Penguins are highly social birds. Even at sea, penguins usually swim and feed in groups. Some penguin colonies on Antarctica are huge and can contain 20 million or more penguins at various times during the year.",
    "Penguins’ eyes work better under water than they do in air. Many scientists believe penguins are extremely short-sighted on land.",
    "The Galapagos Penguin lives farther north than any other penguin and is the only penguin that might venture into the Northern Hemisphere.",
    "Larger penguins usually live in cooler regions. Smaller penguins are typically found in more temperate and tropical climates.",
    "Some prehistoric penguins were very large, growing nearly as tall and heavy as a human.",
    "Penguins can control the blood flow to their extremities in order to reduce the amount of blood that gets cold, but not enough so that their extremities freeze.",
    "Penguins can drink salt water because they have a special gland, the supraorbital gland, that filters salt from the bloodstream.",
    "Most penguins are found in South Africa, New Zealand, Chili, Antarctica, Argentina, and Australia.",
    "Penguins mate, nest, and raise their chicks in a place called a 'rookery'.",
    "Penguins typically are not afraid of humans.",
];

/// A fact provider needs at least one fact to pick from.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("fact list cannot be empty")]
pub struct EmptyFactList;

/// Immutable, ordered fact list with uniform random selection.
#[derive(Debug, Clone)]
pub struct FactProvider {
    facts: Vec<String>,
}

impl FactProvider {
    /// Builds a provider from the given facts. An empty list is a
    /// configuration error, never expected with the built-in list.
    pub fn new(facts: Vec<String>) -> Result<Self, EmptyFactList> {
        if facts.is_empty() {
            return Err(EmptyFactList);
        }
        Ok(Self { facts })
    }

    /// One fact chosen by uniform random index.
    pub fn random(&self) -> &str {
        let index = rand::thread_rng().gen_range(0..self.facts.len());
        &self.facts[index]
    }

    /// Number of facts available.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Always false: providers refuse empty lists at construction.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl Default for FactProvider {
    fn default() -> Self {
        Self {
            facts: FACTS.iter().map(|fact| fact.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn builtin_list_is_non_empty() {
        let provider = FactProvider::default();
        assert_eq!(provider.len(), FACTS.len());
        assert!(!provider.is_empty());
    }

    #[test]
    fn empty_list_is_refused() {
        assert_eq!(FactProvider::new(Vec::new()).unwrap_err(), EmptyFactList);
    }

    #[test]
    fn random_returns_a_known_fact_verbatim() {
        let provider = FactProvider::default();
        for _ in 0..100 {
            assert!(FACTS.contains(&provider.random()));
        }
    }

    #[test]
    fn every_fact_is_reachable() {
        let provider = FactProvider::new(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
        ])
        .unwrap();

        let mut seen = HashSet::new();
        for _ in 0..1000 {
            seen.insert(provider.random().to_string());
        }
        assert_eq!(seen.len(), 3, "every fact should have nonzero probability");
    }
}
