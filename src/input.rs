//! Provides a means to read, parse and hold configuration options for runs.
use anyhow::Context;
use clap::Parser;
use serde_derive::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "subprobe",
    version = env!("CARGO_PKG_VERSION"),
    max_term_width = 120,
    help_template = "{bin} {version}\n{about}\n\nUSAGE:\n    {usage}\n\nOPTIONS:\n{options}",
    after_help = "EXAMPLES:\n    \
        subprobe -w subdomains.txt -v\n    \
        subprobe -w subdomains1.txt subdomains2.txt -v\n    \
        subprobe -w subdomains.txt -f example.com -p\n    \
        subprobe -w subdomains.txt -e -f example.com -v\n    \
        subprobe -w subdomains.txt -c\n    \
        subprobe -w subdomains1.txt subdomains2.txt -g"
)]
#[allow(clippy::struct_excessive_bools)]
/// Checks which subdomains of a wordlist answer over HTTP and, optionally,
/// which common service ports they expose.
pub struct Opts {
    /// One or two wordlist files, one subdomain per line. With two files
    /// their union is checked (see --difference).
    #[arg(short, long, num_args = 1..=2, required = true)]
    pub wordlist: Vec<PathBuf>,

    /// Print every result as it arrives instead of a progress bar.
    #[arg(short, long)]
    pub verbose: bool,

    /// Only check subdomains ending with this domain.
    #[arg(short, long, value_name = "DOMAIN")]
    pub filter: Option<String>,

    /// Drop blank lines and save the cleaned wordlist next to the reports.
    #[arg(short, long)]
    pub eliminate: bool,

    /// Remove duplicate subdomains, save the corrected wordlist and exit.
    #[arg(short, long)]
    pub correct: bool,

    /// Save the combination of two wordlists without duplicates and exit.
    #[arg(short, long)]
    pub generate: bool,

    /// With two wordlists, use the entries of the first that are missing
    /// from the second instead of their union.
    #[arg(short, long)]
    pub difference: bool,

    /// Check common service ports on every accessible subdomain.
    #[arg(short, long)]
    pub ports: bool,

    /// Directory in which the run folder is created.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Also write the results as JSON.
    #[arg(long)]
    pub json: bool,

    /// Accessible mode. Turns off features which negatively affect screen readers.
    #[arg(long)]
    pub accessible: bool,

    /// Hide the banner
    #[arg(long)]
    pub no_banner: bool,

    /// Whether to ignore the configuration file or not.
    #[arg(short, long)]
    pub no_config: bool,

    /// Custom path to config file
    #[arg(long, value_parser)]
    pub config_path: Option<PathBuf>,
}

#[cfg(not(tarpaulin_include))]
impl Opts {
    pub fn read() -> Self {
        Self::parse()
    }

    /// Reads the configuration file and merges it into the command line
    /// options. With `--no-config` the file is not touched at all, so a
    /// broken config cannot stop a run that asked to ignore it.
    pub fn load_config(&mut self) -> anyhow::Result<()> {
        if self.no_config {
            return Ok(());
        }
        let config = Config::read(self.config_path.clone())?;
        self.merge(&config);
        Ok(())
    }

    /// Merges the values found within the user configuration file into the
    /// command line options.
    pub fn merge(&mut self, config: &Config) {
        if !self.no_config {
            self.merge_flags(config);
            self.merge_optional(config);
        }
    }

    /// Flags can only be switched on by the config file, never off.
    fn merge_flags(&mut self, config: &Config) {
        macro_rules! merge_flags {
            ($($field: ident),+) => {
                $(
                    if let Some(true) = config.$field {
                        self.$field = true;
                    }
                )+
            }
        }

        merge_flags!(verbose, ports, accessible, json);
    }

    fn merge_optional(&mut self, config: &Config) {
        if self.filter.is_none() {
            self.filter.clone_from(&config.filter);
        }

        if let Some(dir) = &config.output_dir {
            if self.output_dir == PathBuf::from(".") {
                self.output_dir.clone_from(dir);
            }
        }
    }
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            wordlist: vec![],
            verbose: false,
            filter: None,
            eliminate: false,
            correct: false,
            generate: false,
            difference: false,
            ports: false,
            output_dir: PathBuf::from("."),
            json: false,
            accessible: false,
            no_banner: false,
            no_config: true,
            config_path: None,
        }
    }
}

/// Struct used to deserialize the options specified within our config file.
/// These will be further merged with our command line arguments in order to
/// generate the final Opts struct.
#[cfg(not(tarpaulin_include))]
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    verbose: Option<bool>,
    ports: Option<bool>,
    accessible: Option<bool>,
    json: Option<bool>,
    filter: Option<String>,
    output_dir: Option<PathBuf>,
}

#[cfg(not(tarpaulin_include))]
impl Config {
    /// Reads the configuration file with TOML format and parses it into a
    /// Config struct. A missing file yields the empty configuration.
    ///
    /// # Format
    ///
    /// verbose = false
    /// ports = true
    /// accessible = false
    /// json = true
    /// filter = "example.com"
    /// output_dir = "/tmp/subprobe"
    ///
    pub fn read(custom_config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let Some(config_path) = custom_config_path.or_else(default_config_path) else {
            return Ok(Self::default());
        };
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Could not read config '{}'", config_path.display()))?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Found {e} in {}", config_path.display()))
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Constructs default path to config toml
pub fn default_config_path() -> Option<PathBuf> {
    let mut config_path = dirs::home_dir()?;
    config_path.push(".subprobe.toml");
    Some(config_path)
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use parameterized::parameterized;
    use std::path::PathBuf;

    use super::{Config, Opts};

    #[test]
    fn verify_cli() {
        Opts::command().debug_assert();
    }

    #[parameterized(input = {
        vec!["subprobe", "-w", "a.txt"],
        vec!["subprobe", "--wordlist", "a.txt", "b.txt"],
        vec!["subprobe", "-w", "a.txt", "b.txt", "-g"],
        vec!["subprobe", "-w", "a.txt", "-p", "-v"],
    }, files = {
        1, 2, 2, 1,
    })]
    fn parse_wordlists(input: Vec<&str>, files: usize) {
        let opts = Opts::parse_from(input);
        assert_eq!(opts.wordlist.len(), files);
    }

    #[test]
    fn rejects_three_wordlists() {
        assert!(Opts::try_parse_from(["subprobe", "-w", "a", "b", "c"]).is_err());
    }

    #[test]
    fn wordlist_is_required() {
        assert!(Opts::try_parse_from(["subprobe", "-v"]).is_err());
    }

    #[test]
    fn parse_all_flags() {
        let opts = Opts::parse_from([
            "subprobe", "-w", "a.txt", "-f", "example.com", "-e", "-p", "-o", "out", "--json",
        ]);

        assert_eq!(opts.filter.as_deref(), Some("example.com"));
        assert!(opts.eliminate);
        assert!(opts.ports);
        assert!(opts.json);
        assert!(!opts.correct);
        assert_eq!(opts.output_dir, PathBuf::from("out"));
    }

    #[test]
    fn opts_no_merge_when_config_is_ignored() {
        let mut opts = Opts::default();
        let config = Config::parse("ports = true\nfilter = \"example.com\"").unwrap();

        opts.merge(&config);

        assert!(!opts.ports);
        assert_eq!(opts.filter, None);
    }

    #[test]
    fn opts_merge_config_values() {
        let mut opts = Opts {
            no_config: false,
            ..Opts::default()
        };
        let config = Config::parse(
            "verbose = true\nports = true\njson = false\nfilter = \"example.com\"\noutput_dir = \"runs\"",
        )
        .unwrap();

        opts.merge(&config);

        assert!(opts.verbose);
        assert!(opts.ports);
        assert!(!opts.json);
        assert_eq!(opts.filter.as_deref(), Some("example.com"));
        assert_eq!(opts.output_dir, PathBuf::from("runs"));
    }

    #[test]
    fn command_line_wins_over_config() {
        let mut opts = Opts {
            no_config: false,
            filter: Some("cli.org".to_owned()),
            output_dir: PathBuf::from("cli-out"),
            ..Opts::default()
        };
        let config = Config::parse("filter = \"example.com\"\noutput_dir = \"runs\"").unwrap();

        opts.merge(&config);

        assert_eq!(opts.filter.as_deref(), Some("cli.org"));
        assert_eq!(opts.output_dir, PathBuf::from("cli-out"));
    }

    #[test]
    fn invalid_config_is_an_error() {
        assert!(Config::parse("ports = \"yes please\"").is_err());
    }

    #[test]
    fn missing_config_file_is_empty() {
        let config = Config::read(Some(PathBuf::from("fixtures/no_such_config.toml"))).unwrap();
        let mut opts = Opts {
            no_config: false,
            ..Opts::default()
        };
        opts.merge(&config);
        assert!(!opts.ports);
    }

    fn malformed_config_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"ports = [not toml").unwrap();
        file
    }

    #[test]
    fn no_config_skips_a_broken_config_file() {
        let file = malformed_config_file();
        let mut opts = Opts {
            config_path: Some(file.path().to_path_buf()),
            ..Opts::default()
        };

        opts.load_config().unwrap();

        assert!(!opts.ports);
    }

    #[test]
    fn broken_config_file_is_reported_with_its_path() {
        let file = malformed_config_file();
        let mut opts = Opts {
            no_config: false,
            config_path: Some(file.path().to_path_buf()),
            ..Opts::default()
        };

        let err = opts.load_config().unwrap_err();

        assert!(format!("{err:#}").contains(&file.path().display().to_string()));
    }

    #[test]
    fn config_file_is_loaded_and_merged() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"ports = true\nfilter = \"example.com\"").unwrap();
        let mut opts = Opts {
            no_config: false,
            config_path: Some(file.path().to_path_buf()),
            ..Opts::default()
        };

        opts.load_config().unwrap();

        assert!(opts.ports);
        assert_eq!(opts.filter.as_deref(), Some("example.com"));
    }
}
