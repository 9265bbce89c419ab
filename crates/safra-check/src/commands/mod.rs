//! Command implementations.

use safra_check_core::config::{Config, Locale};
use safra_check_core::parse::ParserMode;
use safra_check_core::upload::UploadOptions;

pub mod check;
pub mod info;
pub mod inspect;
#[cfg(feature = "mcp")]
pub mod serve;
pub mod template;

/// Pipeline options from config, with command-line overrides applied.
pub fn upload_options(config: &Config, strict: bool, locale: Option<Locale>) -> UploadOptions {
    let mut options = UploadOptions::from_config(config);
    if strict {
        options = options.with_parser(ParserMode::Rfc4180);
    }
    if let Some(locale) = locale {
        options.rules.locale = locale;
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let config = Config {
            locale: Locale::En,
            ..Config::default()
        };
        let options = upload_options(&config, true, Some(Locale::PtBr));
        assert_eq!(options.parser, ParserMode::Rfc4180);
        assert_eq!(options.locale(), Locale::PtBr);
    }

    #[test]
    fn config_applies_without_flags() {
        let config = Config {
            parser: Some(ParserMode::Rfc4180),
            max_file_bytes: Some(10),
            ..Config::default()
        };
        let options = upload_options(&config, false, None);
        assert_eq!(options.parser, ParserMode::Rfc4180);
        assert_eq!(options.max_file_bytes, 10);
        assert_eq!(options.locale(), Locale::En);
    }
}
