use colored::Colorize;
use std::{fmt::Display, path::PathBuf, thread::available_parallelism, time::Duration};

use crate::{
    cli_args::ExtractArgs,
    ingest::pipeline::{wikipedia::DEFAULT_EXCLUDED_PREFIXES, ExtractSettings},
};

use super::{error::at_least_one, ConfigError};

#[derive(Debug)]
pub(crate) struct Config {
    pub(crate) wiki_xml: PathBuf,
    pub(crate) output_directory: PathBuf,
    pub(crate) settings: ExtractSettings,
}

impl TryFrom<ExtractArgs> for Config {
    type Error = ConfigError;

    fn try_from(value: ExtractArgs) -> Result<Self, Self::Error> {
        if !value.wiki_xml.is_file() {
            return Err(ConfigError::MissingArchive(value.wiki_xml));
        }
        let workers = match value.workers {
            Some(workers) => at_least_one(workers, "workers")?,
            None => available_parallelism().map(usize::from).unwrap_or(1),
        };
        let excluded_prefixes = if value.exclude_prefixes.is_empty() {
            DEFAULT_EXCLUDED_PREFIXES
                .iter()
                .map(|prefix| prefix.to_string())
                .collect()
        } else {
            value.exclude_prefixes
        };

        Ok(Config {
            wiki_xml: value.wiki_xml,
            output_directory: value.output_directory,
            settings: ExtractSettings {
                workers,
                page_timeout: Duration::from_secs(value.page_timeout_secs.max(1)),
                filename_cap: at_least_one(value.filename_cap, "filename cap")?,
                limit: value.limit,
                excluded_prefixes,
            },
        })
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Config {
            wiki_xml,
            output_directory,
            settings,
        } = self;

        let wiki_xml = wiki_xml.display().to_string().bright_blue();
        let output_directory = output_directory.display().to_string().bright_blue();
        let limit = settings
            .limit
            .map(|limit| format!("{limit} articles"))
            .unwrap_or_else(|| String::from("none"));

        write!(
            f,
            "Extract running.\n\tUsing wikivoyage xml dump at {wiki_xml}.\n\tWriting articles to {output_directory}.\n\t{} workers, {}s per page, limit {limit}.",
            settings.workers,
            settings.page_timeout.as_secs(),
        )
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;

    fn args(wiki_xml: PathBuf) -> ExtractArgs {
        ExtractArgs {
            wiki_xml,
            output_directory: PathBuf::from("kb"),
            limit: None,
            workers: None,
            page_timeout_secs: 60,
            filename_cap: 100,
            exclude_prefixes: vec![],
        }
    }

    #[test]
    fn missing_archive_is_a_config_error() {
        let result = Config::try_from(args(PathBuf::from("/nonexistent/dump.xml.bz2")));
        assert!(matches!(result, Err(ConfigError::MissingArchive(_))));
    }

    #[test]
    fn defaults_to_builtin_exclusions() {
        let dir = tempfile::tempdir().unwrap();
        let dump = dir.path().join("dump.xml");
        fs::write(&dump, "<mediawiki/>").unwrap();

        let config = Config::try_from(args(dump)).unwrap();
        assert_eq!(
            config.settings.excluded_prefixes.len(),
            DEFAULT_EXCLUDED_PREFIXES.len()
        );
        assert!(config.settings.workers >= 1);
    }

    #[test]
    fn zero_workers_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let dump = dir.path().join("dump.xml");
        fs::write(&dump, "<mediawiki/>").unwrap();

        let mut args = args(dump);
        args.workers = Some(0);
        assert!(matches!(
            Config::try_from(args),
            Err(ConfigError::InvalidCount("workers"))
        ));
    }
}
