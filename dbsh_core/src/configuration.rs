use anyhow::{Result, bail};
use config::{Config, FileFormat};
use dirs::home_dir;
use indicatif::ProgressStyle;
use num_format::Locale;
use rustyline::{ColorMode, EditMode};
use std::env;
use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing::{debug, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub(crate) static DEFAULT_CONFIG: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/resources/dbsh.toml"));

/// A builder for creating a [Configuration] instance.
#[derive(Clone, Debug, Default)]
pub struct ConfigurationBuilder {
    configuration: Configuration,
}

impl ConfigurationBuilder {
    pub fn new<S: Into<String>>(program_name: S, version: S) -> Self {
        let mut configuration = Configuration::default();
        configuration.program_name = program_name.into();
        configuration.version = version.into();

        Self { configuration }
    }

    /// Initialize configuration from the configuration file.  The configuration file is located
    /// in the user's home directory in a hidden directory named after the program name
    /// (e.g. `~/.dbsh-mongo`) or in the current working directory if the home directory is not
    /// available.  The configuration file is named after the program name with a `.toml`
    /// extension (e.g. `dbsh-mongo.toml`).
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be created or contains invalid values
    pub fn with_config(self) -> Result<Self> {
        let home_dir = home_dir().unwrap_or_else(|| env::current_dir().unwrap_or_default());
        let config_dir = home_dir.join(format!(".{}", &self.configuration.program_name));
        self.with_config_dir(config_dir)
    }

    /// Initialize configuration from the configuration file in `config_dir`; the file is
    /// created with the default configuration if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file cannot be created or contains invalid values
    pub fn with_config_dir<P: Into<PathBuf>>(mut self, config_dir: P) -> Result<Self> {
        let config_dir = config_dir.into();
        self.configuration.config_dir = Some(config_dir.clone());
        let config_file = ConfigFile::new(&self.configuration.program_name, &config_dir)?;
        config_file.load_configuration(&mut self.configuration)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_bail_on_error(mut self, bail_on_error: bool) -> Self {
        self.configuration.bail_on_error = bail_on_error;
        self
    }

    #[must_use]
    pub fn with_log_level(mut self, log_level: LevelFilter) -> Self {
        self.configuration.log_level = log_level;
        self
    }

    #[must_use]
    pub fn with_log_dir<P: Into<PathBuf>>(mut self, log_dir: P) -> Self {
        self.configuration.log_dir = Some(log_dir.into());
        self
    }

    #[must_use]
    pub fn with_log_rotation(mut self, log_rotation: Rotation) -> Self {
        self.configuration.log_rotation = log_rotation;
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.configuration.locale = locale;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.configuration.color = color;
        self
    }

    #[must_use]
    pub fn with_edit_mode(mut self, edit_mode: EditMode) -> Self {
        self.configuration.edit_mode = edit_mode;
        self
    }

    #[must_use]
    pub fn with_history(mut self, history: bool) -> Self {
        self.configuration.history = history;
        self
    }

    #[must_use]
    pub fn with_history_file<P: Into<PathBuf>>(mut self, history_file: P) -> Self {
        self.configuration.history_file = Some(history_file.into());
        self
    }

    #[must_use]
    pub fn with_history_limit(mut self, history_limit: usize) -> Self {
        self.configuration.history_limit = history_limit;
        self
    }

    #[must_use]
    pub fn with_history_ignore_dups(mut self, history_ignore_dups: bool) -> Self {
        self.configuration.history_ignore_dups = history_ignore_dups;
        self
    }

    #[must_use]
    pub fn with_results_format<S: Into<String>>(mut self, results_format: S) -> Self {
        self.configuration.results_format = results_format.into();
        self
    }

    #[must_use]
    pub fn with_results_pretty(mut self, results_pretty: bool) -> Self {
        self.configuration.results_pretty = results_pretty;
        self
    }

    #[must_use]
    pub fn with_results_header(mut self, results_header: bool) -> Self {
        self.configuration.results_header = results_header;
        self
    }

    #[must_use]
    pub fn with_results_footer(mut self, results_footer: bool) -> Self {
        self.configuration.results_footer = results_footer;
        self
    }

    #[must_use]
    pub fn with_results_timer(mut self, results_timer: bool) -> Self {
        self.configuration.results_timer = results_timer;
        self
    }

    #[must_use]
    pub fn with_results_limit(mut self, results_limit: usize) -> Self {
        self.configuration.results_limit = results_limit;
        self
    }

    /// Build a [Configuration] instance and install the tracing subscriber.  Only the first
    /// configuration built in a process installs the subscriber.
    ///
    /// # Errors
    ///
    /// Returns an error if the log file appender cannot be created
    pub fn build(self) -> Result<Configuration> {
        let configuration = &self.configuration;
        let progress_style =
            ProgressStyle::with_template("{span_child_prefix}{spinner} {span_name}")?;
        let indicatif_layer = IndicatifLayer::new().with_progress_style(progress_style);
        let registry = tracing_subscriber::registry().with(indicatif_layer);

        let initialized = if let Some(level) = configuration.log_level.into_level() {
            let log_dir = configuration.log_dir.clone().unwrap_or_default();
            let file_appender = RollingFileAppender::builder()
                .rotation(configuration.log_rotation.clone())
                .filename_prefix(&configuration.program_name)
                .build(log_dir)?
                .with_max_level(level);

            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(file_appender),
                )
                .try_init()
        } else {
            registry.try_init()
        };

        if let Err(error) = initialized {
            debug!("Tracing subscriber already initialized: {error}");
        }

        Ok(self.configuration)
    }
}

/// The configuration for the application.
#[derive(Clone, Debug)]
pub struct Configuration {
    pub program_name: String,
    pub version: String,
    pub config_dir: Option<PathBuf>,
    pub bail_on_error: bool,
    pub log_level: LevelFilter,
    pub log_dir: Option<PathBuf>,
    pub log_rotation: Rotation,
    pub locale: Locale,
    pub color: bool,
    pub edit_mode: EditMode,
    pub history: bool,
    pub history_file: Option<PathBuf>,
    pub history_limit: usize,
    pub history_ignore_dups: bool,
    pub results_format: String,
    pub results_pretty: bool,
    pub results_header: bool,
    pub results_footer: bool,
    pub results_timer: bool,
    pub results_limit: usize,
}

impl Configuration {
    /// The line editor color mode for the color setting
    #[must_use]
    pub fn color_mode(&self) -> ColorMode {
        if self.color {
            ColorMode::Enabled
        } else {
            ColorMode::Disabled
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            program_name: String::new(),
            version: String::new(),
            config_dir: None,
            bail_on_error: false,
            log_level: LevelFilter::OFF,
            log_dir: None,
            log_rotation: Rotation::DAILY,
            locale: Locale::en,
            color: true,
            edit_mode: EditMode::Emacs,
            history: false,
            history_file: None,
            history_limit: 1000,
            history_ignore_dups: true,
            results_format: "unicode".to_string(),
            results_pretty: false,
            results_header: true,
            results_footer: true,
            results_timer: true,
            results_limit: 100,
        }
    }
}

/// The configuration file for the application.
#[derive(Clone, Debug)]
struct ConfigFile {
    program_name: String,
    config_dir: PathBuf,
    config: Config,
}

impl ConfigFile {
    fn new<S: Into<String>, P: Into<PathBuf>>(
        program_name: S,
        config_dir: P,
    ) -> Result<ConfigFile> {
        let program_name = program_name.into();
        let config_dir = config_dir.into();

        create_dir_all(&config_dir)?;
        let configuration_file = config_dir.join(format!("{program_name}.toml"));

        // Create the configuration file if it does not exist
        if let Ok(mut file) = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&configuration_file)
        {
            file.write_all(DEFAULT_CONFIG.as_bytes())?;
        }

        let conf_file = configuration_file.to_string_lossy().to_string();
        debug!("Configuration file: {conf_file}");

        let prefix = program_name.to_uppercase().replace('-', "_");
        debug!("Configuration environment prefix: {prefix}");

        let config = Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(config::File::new(&conf_file, FileFormat::Toml))
            .add_source(config::Environment::with_prefix(prefix.as_str()).separator("_"))
            .build()?;

        Ok(Self {
            program_name,
            config_dir,
            config,
        })
    }

    fn load_configuration(&self, configuration: &mut Configuration) -> Result<()> {
        let config = &self.config;
        let config_dir = &self.config_dir;

        if let Ok(bail_on_error) = config.get::<bool>("general.bail_on_error") {
            configuration.bail_on_error = bail_on_error;
        }

        if let Ok(log_level) = config.get::<String>("log.level") {
            configuration.log_level = LevelFilter::from_str(log_level.as_str())?;
        }

        configuration.log_dir = Some(config_dir.join("logs"));

        configuration.log_rotation = match config.get::<String>("log.rotation")?.as_str() {
            "minutely" => Rotation::MINUTELY,
            "hourly" => Rotation::HOURLY,
            "daily" => Rotation::DAILY,
            "never" => Rotation::NEVER,
            rotation => bail!("Invalid log.rotation: {rotation}"),
        };

        configuration.locale = get_locale(config);

        configuration.edit_mode = match config.get::<String>("shell.edit_mode")?.as_str() {
            "emacs" => EditMode::Emacs,
            "vi" => EditMode::Vi,
            mode => bail!("Invalid shell.edit_mode: {mode}"),
        };
        if let Ok(color) = config.get::<bool>("shell.color") {
            configuration.color = color;
        }

        if let Ok(history) = config.get("shell.history.enabled") {
            configuration.history = history;
        }
        let history_file = config_dir.join(format!("{}.history", &self.program_name));
        configuration.history_file = Some(history_file);
        if let Ok(history_limit) = config.get("shell.history.limit") {
            configuration.history_limit = history_limit;
        }
        if let Ok(history_ignore_dups) = config.get("shell.history.ignore_dups") {
            configuration.history_ignore_dups = history_ignore_dups;
        }

        configuration.results_format = match config.get::<String>("results.format")?.as_str() {
            format @ ("ascii" | "csv" | "json" | "unicode") => format.to_string(),
            format => bail!("Invalid results.format: {format}"),
        };
        if let Ok(results_pretty) = config.get::<bool>("results.pretty") {
            configuration.results_pretty = results_pretty;
        }
        if let Ok(results_header) = config.get::<bool>("results.header") {
            configuration.results_header = results_header;
        }
        if let Ok(results_footer) = config.get::<bool>("results.footer") {
            configuration.results_footer = results_footer;
        }
        if let Ok(results_timer) = config.get::<bool>("results.timer") {
            configuration.results_timer = results_timer;
        }
        if let Ok(results_limit) = config.get::<usize>("results.limit") {
            configuration.results_limit = results_limit;
        }

        Ok(())
    }
}

fn get_locale(config: &Config) -> Locale {
    let locale = config
        .get::<String>("global.locale")
        .unwrap_or_else(|_| String::from("en"));
    let parts: Vec<&str> = locale
        .split(|c: char| !c.is_alphanumeric())
        .filter(|&s| !s.is_empty())
        .collect();

    for i in (0..parts.len()).rev() {
        let locale = parts[0..=i].join("-");
        if let Ok(locale) = Locale::from_str(locale.as_str()) {
            return locale;
        }
    }

    warn!("Invalid locale: {locale}; defaulting to \"en\"");
    Locale::en
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config_with_locale(locale: &str) -> Result<Config> {
        let toml = format!("[global]\nlocale = \"{locale}\"\n");
        let config = Config::builder()
            .add_source(config::File::from_str(&toml, FileFormat::Toml))
            .build()?;
        Ok(config)
    }

    #[test]
    fn test_configuration_builder() -> Result<()> {
        let log_dir = ".dbsh/logs";
        let history_file = ".dbsh/history.txt";

        let configuration = ConfigurationBuilder::new("test", "1.2.3")
            .with_bail_on_error(true)
            .with_log_level(LevelFilter::OFF)
            .with_log_dir(log_dir)
            .with_log_rotation(Rotation::MINUTELY)
            .with_locale(Locale::es)
            .with_color(false)
            .with_edit_mode(EditMode::Vi)
            .with_history(true)
            .with_history_file(history_file)
            .with_history_limit(42)
            .with_history_ignore_dups(false)
            .with_results_format("ascii")
            .with_results_pretty(true)
            .with_results_header(false)
            .with_results_footer(false)
            .with_results_timer(false)
            .with_results_limit(7)
            .build()?;

        assert_eq!(configuration.program_name, "test");
        assert_eq!(configuration.version, "1.2.3");
        assert!(configuration.bail_on_error);
        assert_eq!(configuration.log_level, LevelFilter::OFF);
        assert_eq!(
            configuration.log_dir.clone().unwrap_or_default().to_string_lossy(),
            log_dir
        );
        assert_eq!(configuration.log_rotation, Rotation::MINUTELY);
        assert_eq!(configuration.locale, Locale::es);
        assert_eq!(configuration.color_mode(), ColorMode::Disabled);
        assert_eq!(configuration.edit_mode, EditMode::Vi);
        assert!(configuration.history);
        assert_eq!(
            configuration
                .history_file
                .clone()
                .unwrap_or_default()
                .to_string_lossy(),
            history_file
        );
        assert_eq!(configuration.history_limit, 42);
        assert!(!configuration.history_ignore_dups);
        assert_eq!(configuration.results_format, "ascii");
        assert!(configuration.results_pretty);
        assert!(!configuration.results_header);
        assert!(!configuration.results_footer);
        assert!(!configuration.results_timer);
        assert_eq!(configuration.results_limit, 7);
        Ok(())
    }

    #[test]
    fn test_default_configuration() {
        let configuration = Configuration::default();
        assert!(configuration.program_name.is_empty());
        assert!(configuration.version.is_empty());
        assert_eq!(configuration.config_dir, None);
        assert!(!configuration.bail_on_error);
        assert_eq!(configuration.log_level, LevelFilter::OFF);
        assert_eq!(configuration.log_rotation, Rotation::DAILY);
        assert_eq!(configuration.locale, Locale::en);
        assert_eq!(configuration.color_mode(), ColorMode::Enabled);
        assert_eq!(configuration.edit_mode, EditMode::Emacs);
        assert!(!configuration.history);
        assert_eq!(configuration.history_limit, 1000);
        assert!(configuration.history_ignore_dups);
        assert_eq!(configuration.results_format, "unicode");
        assert!(!configuration.results_pretty);
        assert_eq!(configuration.results_limit, 100);
    }

    #[test]
    fn test_with_config_dir() -> Result<()> {
        let directory = tempfile::tempdir()?;
        let config_dir = directory.path().join(".dbsh-config-test");

        let builder =
            ConfigurationBuilder::new("dbsh-config-test", "1.2.3").with_config_dir(&config_dir)?;
        let configuration = builder.configuration;

        let config_file = config_dir.join("dbsh-config-test.toml");
        assert_eq!(fs::read_to_string(config_file)?, DEFAULT_CONFIG);
        assert_eq!(configuration.config_dir, Some(config_dir.clone()));
        assert_eq!(configuration.log_level, LevelFilter::INFO);
        assert_eq!(configuration.log_dir, Some(config_dir.join("logs")));
        assert_eq!(
            configuration.history_file,
            Some(config_dir.join("dbsh-config-test.history"))
        );
        assert!(configuration.history);
        assert_eq!(configuration.results_format, "unicode");
        assert_eq!(configuration.results_limit, 100);
        Ok(())
    }

    #[test]
    fn test_with_config_dir_invalid_format() -> Result<()> {
        let directory = tempfile::tempdir()?;
        let config_dir = directory.path().to_path_buf();
        fs::write(
            config_dir.join("dbsh-format-test.toml"),
            "[results]\nformat = \"xml\"\n",
        )?;

        let result = ConfigurationBuilder::new("dbsh-format-test", "1.2.3")
            .with_config_dir(config_dir);
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_get_locale_language() -> Result<()> {
        let config = config_with_locale("de-US.foo")?;
        assert_eq!(get_locale(&config), Locale::de);
        Ok(())
    }

    #[test]
    fn test_get_locale_language_and_country() -> Result<()> {
        let config = config_with_locale("en_GB.foo")?;
        assert_eq!(get_locale(&config), Locale::en_GB);
        Ok(())
    }

    #[test]
    fn test_get_locale_default() -> Result<()> {
        let config = config_with_locale("foo")?;
        assert_eq!(get_locale(&config), Locale::en);

        let config = Config::builder().build()?;
        assert_eq!(get_locale(&config), Locale::en);
        Ok(())
    }
}
