use anyhow::{Context, Result, bail};
use log::debug;
use platform_dirs::AppDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

const APP_NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Config {
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(skip)]
    pub data_dir: PathBuf,

    #[serde(skip)]
    pub is_first_run: bool,

    #[serde(skip)]
    pub app_name: String,

    // Completed filter changes, kept across restarts
    #[serde(default, rename = "filterCount")]
    pub filter_count: u32,

    #[serde(default)]
    pub share: Share,

    #[serde(default)]
    pub review: Review,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
pub struct Share {
    // Empty means `<data dir>/shared`
    #[serde(default)]
    pub save_dir: String,

    #[serde(default)]
    #[derivative(Default(value = "false"))]
    pub open_after_share: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Review {
    // Opened in the browser when feedback is requested
    #[serde(default)]
    pub url: String,
}

impl Config {
    /// Resolves the config location, creates the app directories and loads
    /// the file. `config_path` overrides the platform location.
    pub fn init(&mut self, config_path: Option<PathBuf>) -> Result<()> {
        self.app_name = APP_NAME.to_string();

        match config_path {
            Some(path) => {
                self.data_dir = path
                    .parent()
                    .map(|dir| dir.join("data"))
                    .unwrap_or_else(|| PathBuf::from("data"));
                self.config_path = path;
            }
            None => {
                let app_dirs = AppDirs::new(Some(&self.app_name), true)
                    .with_context(|| "no home directory for app dirs")?;
                self.data_dir = app_dirs.data_dir.clone();
                self.config_path = app_dirs.config_dir.join(format!("{}.toml", self.app_name));
            }
        }

        self.crate_dirs()?;
        self.load().with_context(|| "load config file failed")?;
        debug!("{:?}", self);
        Ok(())
    }

    fn crate_dirs(&mut self) -> Result<()> {
        if let Some(dir) = self.config_path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }

    /// Loads configuration from file, or writes the defaults if there is none
    /// or it cannot be parsed. An unreadable file is kept as `.bak`.
    fn load(&mut self) -> Result<()> {
        match fs::read_to_string(&self.config_path) {
            Ok(text) => match toml::from_str::<Config>(&text) {
                Ok(mut c) => {
                    c.config_path = self.config_path.clone();
                    c.data_dir = self.data_dir.clone();
                    c.is_first_run = self.is_first_run;
                    c.app_name = self.app_name.clone();
                    *self = c;

                    Ok(())
                }
                Err(e) => {
                    log::warn!("parse {} failed: {e}", self.config_path.display());
                    self.is_first_run = true;

                    if let Some(bak_file) = self.config_path.as_os_str().to_str() {
                        _ = fs::copy(&self.config_path, format!("{bak_file}.bak"));
                    }

                    self.save()
                }
            },
            Err(_) => {
                self.is_first_run = true;
                self.save()
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        match toml::to_string_pretty(self) {
            Ok(text) => Ok(fs::write(&self.config_path, text)
                .with_context(|| "save config failed".to_string())?),
            Err(e) => bail!(format!("convert config to toml format failed. {e:?}")),
        }
    }

    pub fn share_dir(&self) -> PathBuf {
        if self.share.save_dir.trim().is_empty() {
            self.data_dir.join("shared")
        } else {
            PathBuf::from(self.share.save_dir.trim())
        }
    }
}

/// Loads the configuration once at startup.
pub fn init(config_path: Option<PathBuf>) -> Result<Config> {
    let mut config = Config::default();
    config.init(config_path)?;
    Ok(config)
}
