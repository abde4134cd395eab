pub mod config;

pub use config::{
    ClientOptions, EnvSettings, SessionConfig, Settings, SettingsSource, StaticConfig,
};
