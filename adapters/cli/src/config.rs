//! Session settings assembled from a TOML file and command-line overrides.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use fog_forage_world::SessionConfig;

/// Values supplied on the command line that take precedence over the file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Overrides {
    pub(crate) seed: Option<u64>,
    pub(crate) world_size: Option<u32>,
}

/// Builds the session configuration, starting from defaults when no file is given.
pub(crate) fn load(path: Option<&Path>, overrides: Overrides) -> Result<SessionConfig> {
    let mut config = match path {
        Some(path) => {
            let contents = fs::read_to_string(path).with_context(|| {
                format!("failed to read session config at {}", path.display())
            })?;
            parse(&contents)
                .with_context(|| format!("invalid session config in {}", path.display()))?
        }
        None => SessionConfig::default(),
    };

    if let Some(seed) = overrides.seed {
        config.seed = Some(seed);
    }
    if let Some(world_size) = overrides.world_size {
        config.generation.world_size = world_size;
    }
    Ok(config)
}

fn parse(contents: &str) -> Result<SessionConfig> {
    let config: SessionConfig =
        toml::from_str(contents).context("failed to parse session config toml contents")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = parse(
            r#"
            starting_energy = 30
            seed = 7

            [generation]
            world_size = 20
            "#,
        )
        .expect("config parses");

        assert_eq!(config.starting_energy, 30);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.generation.world_size, 20);
        assert_eq!(config.max_energy, SessionConfig::default().max_energy);
        assert_eq!(
            config.generation.item_density,
            SessionConfig::default().generation.item_density
        );
    }

    #[test]
    fn unknown_value_types_are_rejected() {
        assert!(parse("visible_grid = \"wide\"").is_err());
    }

    #[test]
    fn overrides_win_over_defaults() {
        let config = load(
            None,
            Overrides {
                seed: Some(99),
                world_size: Some(16),
            },
        )
        .expect("defaults load");

        assert_eq!(config.seed, Some(99));
        assert_eq!(config.generation.world_size, 16);
    }
}
