use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct DispatchSettings {
    /// Leading segment of every dispatch identifier this engine issues.
    pub identifier_prefix: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct EngineSettings {
    pub dispatch: DispatchSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            dispatch: DispatchSettings {
                identifier_prefix: "tickler".to_owned(),
            },
        }
    }
}

impl EngineSettings {
    /// Layered load: built-in defaults, then an optional `tickler` config
    /// file, then `TICKLER_*` environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("dispatch.identifier_prefix", "tickler")?
            .add_source(File::with_name("tickler").required(false))
            .add_source(Environment::with_prefix("TICKLER").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_without_sources_yields_the_defaults() {
        let settings = EngineSettings::load().unwrap();

        assert_eq!(settings.dispatch.identifier_prefix, "tickler");
    }
}
