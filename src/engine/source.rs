//! Item sources for the CLI: positional values, a generated count, or a file with one value per line.

use anyhow::{Context, Result, bail};
use std::path::PathBuf;

use super::arg_parser::Cli;
use crate::utils::config::PipelineDefaults;

/// Lazily produced items, ready to hand to the source thread.
pub type ItemIter = Box<dyn Iterator<Item = String> + Send>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Values(Vec<String>),
    Count(usize),
    File(PathBuf),
}

impl Source {
    /// Pick the source from CLI args. At most one may be given; none means `--count 7`.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let given = [!cli.values.is_empty(), cli.count.is_some(), cli.input.is_some()]
            .iter()
            .filter(|g| **g)
            .count();
        if given > 1 {
            bail!("give positional VALUES, --count, or --input, not more than one");
        }
        Ok(if let Some(n) = cli.count {
            Source::Count(n)
        } else if let Some(path) = &cli.input {
            Source::File(path.clone())
        } else if !cli.values.is_empty() {
            Source::Values(cli.values.clone())
        } else {
            Source::Count(PipelineDefaults::DEFAULT_COUNT)
        })
    }

    pub fn into_items(self) -> Result<ItemIter> {
        Ok(match self {
            Source::Values(values) => Box::new(values.into_iter()),
            Source::Count(n) => Box::new(count_items(n)),
            Source::File(path) => {
                let text = std::fs::read_to_string(&path)
                    .with_context(|| format!("read input {}", path.display()))?;
                let lines: Vec<String> = text
                    .lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(String::from)
                    .collect();
                Box::new(lines.into_iter())
            }
        })
    }
}

/// `0..n` as decimal strings.
pub fn count_items(n: usize) -> impl Iterator<Item = String> + Send {
    (0..n).map(|i| i.to_string())
}
