//! Name collision strategies

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a colliding generated name is rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NamingCollisionStrategy {
    /// `{name}{suffix}`
    #[default]
    TypeSuffix,
    /// `{suffix}{name}`
    TypePrefix,
    /// `{name}_`
    TrailingUnderscore,
    /// `_{name}`
    LeadingUnderscore,
    /// `{suffix}_{name}`
    UnderscoreDelimit,
}

impl FromStr for NamingCollisionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "typesuffix" | "suffix" => Ok(NamingCollisionStrategy::TypeSuffix),
            "typeprefix" | "prefix" => Ok(NamingCollisionStrategy::TypePrefix),
            "trailingunderscore" => Ok(NamingCollisionStrategy::TrailingUnderscore),
            "leadingunderscore" => Ok(NamingCollisionStrategy::LeadingUnderscore),
            "underscoredelimit" => Ok(NamingCollisionStrategy::UnderscoreDelimit),
            _ => Err(format!("Unknown naming collision strategy: {}", s)),
        }
    }
}

impl fmt::Display for NamingCollisionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NamingCollisionStrategy::TypeSuffix => "TypeSuffix",
            NamingCollisionStrategy::TypePrefix => "TypePrefix",
            NamingCollisionStrategy::TrailingUnderscore => "TrailingUnderscore",
            NamingCollisionStrategy::LeadingUnderscore => "LeadingUnderscore",
            NamingCollisionStrategy::UnderscoreDelimit => "UnderscoreDelimit",
        };
        f.write_str(name)
    }
}

/// Rewrites names until they no longer collide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCollisionResolver {
    pub strategy: NamingCollisionStrategy,
    /// Affix used by the type-based strategies
    pub suffix: String,
}

impl Default for NameCollisionResolver {
    fn default() -> Self {
        Self::new(NamingCollisionStrategy::default(), "Dao")
    }
}

/// Rewrites before falling back to a numeric suffix
const MAX_ATTEMPTS: usize = 16;

impl NameCollisionResolver {
    pub fn new(strategy: NamingCollisionStrategy, suffix: &str) -> Self {
        Self {
            strategy,
            suffix: suffix.to_string(),
        }
    }

    fn rewrite(&self, name: &str) -> String {
        match self.strategy {
            NamingCollisionStrategy::TypeSuffix => format!("{}{}", name, self.suffix),
            NamingCollisionStrategy::TypePrefix => format!("{}{}", self.suffix, name),
            NamingCollisionStrategy::TrailingUnderscore => format!("{}_", name),
            NamingCollisionStrategy::LeadingUnderscore => format!("_{}", name),
            NamingCollisionStrategy::UnderscoreDelimit => format!("{}_{}", self.suffix, name),
        }
    }

    /// Returns `name` if it is free, otherwise the first free rewrite of it.
    pub fn resolve(&self, name: &str, is_taken: impl Fn(&str) -> bool) -> String {
        if !is_taken(name) {
            return name.to_string();
        }
        let mut candidate = name.to_string();
        for _ in 0..MAX_ATTEMPTS {
            candidate = self.rewrite(&candidate);
            if !is_taken(&candidate) {
                return candidate;
            }
        }
        let mut counter = 1;
        loop {
            let numbered = format!("{}{}", candidate, counter);
            if !is_taken(&numbered) {
                return numbered;
            }
            counter += 1;
        }
    }
}
