use anyhow::{ensure, Context};
use avara_lvl::{rsrc::ResourceType, ConvertOptions};
use avara_utils::{mac_roman, AnyResult, Fixed};
use serde::{de::Error, Deserialize, Deserializer};
use std::{fs, path::Path};

/// Contents of a `--config` file. Every field is optional.
///
/// ```toml
/// wall_height = 3
/// base_height = 0.5
/// author = "Jane Doe"
/// resource_type = "PICT"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertSettings {
    /// Height of walls, until a level sets its own `wallHeight`
    #[serde(deserialize_with = "decimal")]
    pub wall_height: Fixed,
    /// Floor level, until a level sets its own `baseHeight`
    #[serde(deserialize_with = "decimal")]
    pub base_height: Fixed,
    /// Author of levels with no `designer`
    pub author: Option<String>,
    /// Type of the resources levels are stored in
    pub resource_type: String,
}

impl Default for ConvertSettings {
    fn default() -> Self {
        Self {
            wall_height: ConvertOptions::DEFAULT_WALL_HEIGHT,
            base_height: Fixed::ZERO,
            author: None,
            resource_type: ResourceType::PICT.to_string(),
        }
    }
}

impl ConvertSettings {
    pub fn load(path: &Path) -> AnyResult<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("couldn't read settings from {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid settings in {}", path.display()))
    }

    pub fn parse(text: &str) -> AnyResult<Self> {
        let settings = toml::from_str::<Self>(text)?;
        settings.resource_type()?;
        Ok(settings)
    }

    pub fn resource_type(&self) -> AnyResult<ResourceType> {
        let encoded = mac_roman::encode(&self.resource_type);
        ensure!(
            encoded.len() == 4,
            "resource type `{}` isn't 4 characters long",
            self.resource_type
        );
        Ok(ResourceType([encoded[0], encoded[1], encoded[2], encoded[3]]))
    }

    pub fn options(&self, name: &str) -> ConvertOptions {
        ConvertOptions {
            name: name.to_string(),
            author: self.author.clone(),
            wall_height: self.wall_height,
            base_height: self.base_height,
        }
    }
}

/// Accepts both integers and floats, TOML keeps them apart. Either has to fit a [`Fixed`].
fn decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fixed, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Integer(i64),
        Float(f64),
    }

    let fixed = match Number::deserialize(deserializer)? {
        Number::Integer(value) => Fixed::checked_from_int(value),
        Number::Float(value) if value.abs() <= Fixed::MAX.to_f64() => Some(Fixed::snap(value)),
        Number::Float(_) => None,
    };
    fixed.ok_or_else(|| {
        D::Error::custom(format!("height out of range, the limit is {}", Fixed::MAX))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_the_default() {
        assert_eq!(ConvertSettings::parse("").unwrap(), ConvertSettings::default());
    }

    #[test]
    fn full_file() {
        let settings = ConvertSettings::parse(
            r#"
            wall_height = 4
            base_height = 0.125
            author = "Jane"
            resource_type = "LEVL"
            "#,
        )
        .unwrap();

        assert_eq!(settings.wall_height, Fixed::from_int(4));
        assert_eq!(settings.base_height, Fixed::from_hundredths(13));
        assert_eq!(settings.resource_type().unwrap(), ResourceType::from_str("LEVL"));

        let options = settings.options("Level");
        assert_eq!(options.name, "Level");
        assert_eq!(options.author.as_deref(), Some("Jane"));
    }

    #[test]
    fn invalid_files() {
        assert!(ConvertSettings::parse("wall_height = \"tall\"").is_err());
        assert!(ConvertSettings::parse("resource_type = \"PICTURE\"").is_err());
        assert!(ConvertSettings::parse("colour = 1").is_err());
        assert!(ConvertSettings::parse("wall_height = 9000000000000000000").is_err());
        assert!(ConvertSettings::parse("base_height = 1e300").is_err());
        assert!(ConvertSettings::parse("base_height = nan").is_err());
    }
}
