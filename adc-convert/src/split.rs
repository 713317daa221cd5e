//! Dataset splitting
//!
//! Writers route each record into a named split (train/test/...) through a
//! [`Splitter`]. The ratio splitter is deterministic: the same sequence of
//! items always produces the same assignment.

use std::collections::HashMap;

use adc_common::{Error, Result};
use regex::Regex;

/// Chooses the split for the next item
pub trait Splitter {
    /// Split name for `item` (usually the audio name)
    fn next(&mut self, item: Option<&str>) -> String;
}

/// Ratio-based splitter with optional grouping
#[derive(Debug)]
pub struct RatioSplitter {
    names: Vec<String>,
    ratios: Vec<u32>,
    counts: Vec<u64>,
    group: Option<Regex>,
    assigned: HashMap<String, usize>,
}

impl RatioSplitter {
    /// Create a splitter.
    ///
    /// `names` and `ratios` must be of equal length, ratios positive and
    /// summing to 100. A `group` regex must have exactly one capture group;
    /// items with the same captured value end up in the same split.
    pub fn new(names: Vec<String>, ratios: Vec<u32>, group: Option<&str>) -> Result<Self> {
        if names.is_empty() {
            return Err(Error::Config("No split names provided".to_string()));
        }
        if names.len() != ratios.len() {
            return Err(Error::Config(format!(
                "Number of split names and ratios differ: {} != {}",
                names.len(),
                ratios.len()
            )));
        }
        if ratios.iter().any(|r| *r == 0) {
            return Err(Error::Config("Split ratios must be positive".to_string()));
        }
        let total: u32 = ratios.iter().sum();
        if total != 100 {
            return Err(Error::Config(format!(
                "Split ratios must sum up to 100, but got: {}",
                total
            )));
        }

        let group = match group {
            Some(pattern) => {
                let re = Regex::new(pattern)
                    .map_err(|e| Error::Config(format!("Invalid split group regex: {}", e)))?;
                if re.captures_len() != 2 {
                    return Err(Error::Config(format!(
                        "Split group regex must have exactly one group: {}",
                        pattern
                    )));
                }
                Some(re)
            }
            None => None,
        };

        Ok(Self {
            counts: vec![0; names.len()],
            names,
            ratios,
            group,
            assigned: HashMap::new(),
        })
    }

    /// Advance the schedule: pick the split furthest below its ratio
    fn schedule(&mut self) -> usize {
        let total: u64 = self.counts.iter().sum::<u64>() + 1;
        let mut best = 0;
        let mut best_deficit = i64::MIN;
        for (i, (ratio, count)) in self.ratios.iter().zip(&self.counts).enumerate() {
            let deficit = (*ratio as i64) * (total as i64) - 100 * (*count as i64);
            if deficit > best_deficit {
                best = i;
                best_deficit = deficit;
            }
        }
        self.counts[best] += 1;
        best
    }
}

impl Splitter for RatioSplitter {
    fn next(&mut self, item: Option<&str>) -> String {
        let key = match (&self.group, item) {
            (Some(re), Some(item)) => re
                .captures(item)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().to_string()),
            _ => None,
        };

        let index = match key {
            Some(key) => match self.assigned.get(&key) {
                Some(index) => *index,
                None => {
                    let index = self.schedule();
                    self.assigned.insert(key, index);
                    index
                }
            },
            None => self.schedule(),
        };

        self.names[index].clone()
    }
}
