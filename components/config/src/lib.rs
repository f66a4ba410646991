pub extern crate paste;
pub extern crate serde;
pub extern crate tracing;

use std::path::Path;

pub mod probe;
pub mod util;

#[macro_export]
macro_rules! section {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {$(
            $(#[$field_meta:meta])*
            $field_vis:vis $field_name:ident : $field_ty:ty = $field_default:expr
                $(=> $field_env:literal
                    $(| $func:path
                        $([  $($param:expr),* ])?
                    )?
                )?
        ),*$(,)?}

        $(impl Extra { $($extra:tt)+ })?
    ) => { $crate::paste::paste! {
        #[derive(Debug, Clone, $crate::serde::Deserialize)]
        $(#[$meta])*
        #[serde(deny_unknown_fields)]
        $vis struct $name {$(
            $(#[$field_meta])*
            $(
                #[doc = ""]
                #[doc = "**Overridden by the `" $field_env "` environment variable.**"]
            )?
            $field_vis $field_name: $field_ty,
        )*}

        impl Default for $name {
            #[inline]
            fn default() -> Self {
                $name {$(
                    $field_name: $field_default,
                )*}
            }
        }

        impl $crate::ConfigExtra for $name {
            $($($extra)+)?
        }

        impl $crate::Configuration for $name {
            fn configure(&mut self) {
                $($(
                    if let Ok(value) = std::env::var($field_env) {
                        $crate::tracing::debug!("Applying environment overwrite for {}.{}=>{}", stringify!($name), stringify!($field_name), $field_env);
                        self.$field_name = ($($func(&value $( $(,$param)* )? ),)? value , ).0.into();
                    }
                )?)*

                $crate::ConfigExtra::configure(self);
            }
        }
    }};
}

#[macro_export]
macro_rules! config {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {$(
            $(#[$field_meta:meta])*
            $field:ident: $field_ty:ty
        ),*$(,)?}
    ) => {
        $(#[$meta])*
        #[derive(Default, Debug, Clone, $crate::serde::Deserialize)]
        #[serde(deny_unknown_fields)]
        #[cfg_attr(not(feature = "strict"), serde(default))]
        $vis struct $name {
            $($(#[$field_meta])* pub $field: $field_ty,)*
        }

        impl $crate::Configuration for $name {
            fn configure(&mut self) {
                $($crate::Configuration::configure(&mut self.$field);)*
            }
        }
    };
}

pub trait ConfigExtra: Configuration {
    fn configure(&mut self) {}
}

pub trait Configuration: serde::de::DeserializeOwned {
    /// Applies any environmental overrides and adjustments
    fn configure(&mut self);
}

config! {
    /// Root configuration for embed checking
    pub struct EmbedCheckConfig {
        /// Image link probing
        probe: probe::Probe,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO Error: {0}")]
    IOError(#[from] std::io::Error),

    #[error("TOML Parse Error: {0}")]
    TomlDeError(#[from] toml::de::Error),

    #[error("JSON Error: {0}")]
    JsonError(#[from] serde_json::Error),
}

enum Format {
    TOML,
    JSON,
}

fn get_format(path: &Path) -> Format {
    match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Format::JSON,
        _ => Format::TOML,
    }
}

/// Parses a configuration from text in the given format, then applies environment overrides.
fn parse<C: Configuration>(text: &str, format: Format) -> Result<C, ConfigError> {
    let mut config: C = match format {
        Format::TOML => toml::from_str(text)?,
        Format::JSON => serde_json::from_str(text)?,
    };

    config.configure();

    Ok(config)
}

/// Parses a TOML configuration and applies environment overrides.
pub fn from_toml<C: Configuration>(text: &str) -> Result<C, ConfigError> {
    parse(text, Format::TOML)
}

/// Loads a configuration file, choosing JSON or TOML by extension (TOML if unknown),
/// then applies environment overrides.
pub async fn load<C: Configuration>(path: impl AsRef<Path>) -> Result<C, ConfigError> {
    let path = path.as_ref();

    tracing::debug!("Loading configuration from {}", path.display());

    let file = tokio::fs::read_to_string(path).await?;

    parse(&file, get_format(path))
}
