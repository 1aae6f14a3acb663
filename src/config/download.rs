use colored::Colorize;
use std::{fmt::Display, path::PathBuf};
use url::Url;

use crate::cli_args::DownloadArgs;

#[derive(Debug)]
pub(crate) struct Config {
    pub(crate) url: Url,
    pub(crate) output: PathBuf,
}

impl From<DownloadArgs> for Config {
    fn from(value: DownloadArgs) -> Self {
        Config {
            url: value.url,
            output: value.output,
        }
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Config { url, output } = self;
        let url = url.as_str().blue();
        let output = output.display().to_string().bright_blue();
        write!(f, "Download running.\n\tFetching {url}.\n\tWriting to {output}.")
    }
}
