use crate::cli::ReaderArgs;
use crate::error::{CliError, Result};
use seamm_util::core::io::include::{DEFAULT_HISTORY, DEFAULT_INCLUDE_KEYWORD};
use seamm_util::{IncludeReader, IncludeReaderBuilder, SchemeResolver};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialIncludeConfig {
    keyword: Option<String>,
    enabled: Option<bool>,
    history: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialReaderConfig {
    include: Option<PartialIncludeConfig>,
    uri_schemes: Option<BTreeMap<String, PathBuf>>,
}

/// Fully merged reader settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ReaderConfig {
    pub include: Option<String>,
    pub history: usize,
    pub uri_schemes: BTreeMap<String, PathBuf>,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            include: Some(DEFAULT_INCLUDE_KEYWORD.to_string()),
            history: DEFAULT_HISTORY,
            uri_schemes: BTreeMap::new(),
        }
    }
}

impl PartialReaderConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;

        // Relative scheme directories are relative to the config file.
        if let (Some(schemes), Some(base)) = (config.uri_schemes.as_mut(), path.parent()) {
            for dir in schemes.values_mut() {
                if dir.is_relative() {
                    *dir = base.join(&*dir);
                }
            }
        }
        Ok(config)
    }

    /// Applies command-line flags over the file values, then the defaults.
    pub fn merge_with_cli(self, args: &ReaderArgs) -> Result<ReaderConfig> {
        let defaults = ReaderConfig::default();
        let file_include = self.include.unwrap_or_default();

        let include = if args.no_include {
            None
        } else if let Some(keyword) = &args.include {
            Some(keyword.clone())
        } else if file_include.enabled == Some(false) {
            None
        } else {
            file_include.keyword.or(defaults.include)
        };

        let history = args
            .history
            .or(file_include.history)
            .unwrap_or(defaults.history);

        let mut uri_schemes = self.uri_schemes.unwrap_or_default();
        for pair in &args.uri_schemes {
            let (scheme, dir) = parse_scheme_pair(pair)?;
            uri_schemes.insert(scheme, dir);
        }

        Ok(ReaderConfig {
            include,
            history,
            uri_schemes,
        })
    }
}

fn parse_scheme_pair(pair: &str) -> Result<(String, PathBuf)> {
    let (scheme, dir) = pair.split_once('=').ok_or_else(|| {
        CliError::Argument(format!(
            "Invalid --uri format: '{}'. Expected SCHEME=DIR.",
            pair
        ))
    })?;
    let scheme = scheme.trim().trim_end_matches(':');
    if scheme.is_empty() || dir.is_empty() {
        return Err(CliError::Argument(format!(
            "Invalid --uri format: '{}'. Both SCHEME and DIR are required.",
            pair
        )));
    }
    Ok((scheme.to_string(), PathBuf::from(dir)))
}

impl ReaderConfig {
    /// Loads the optional config file named in `args` and merges the flags.
    pub fn resolve(args: &ReaderArgs) -> Result<Self> {
        let partial = match &args.config {
            Some(path) => PartialReaderConfig::from_file(path)?,
            None => PartialReaderConfig::default(),
        };
        partial.merge_with_cli(args)
    }

    pub fn reader_builder(&self, input: &Path) -> IncludeReaderBuilder {
        let resolver = self
            .uri_schemes
            .iter()
            .fold(SchemeResolver::new(), |resolver, (scheme, dir)| {
                resolver.with_scheme(scheme.clone(), dir.clone())
            });
        IncludeReader::builder(input)
            .include_keyword(self.include.clone())
            .history(self.history)
            .resolver(resolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("seamm.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let config = ReaderConfig::resolve(&ReaderArgs::default()).unwrap();
        assert_eq!(config, ReaderConfig::default());
        assert_eq!(config.include.as_deref(), Some("#include"));
        assert_eq!(config.history, 10);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            r#"
            [include]
            keyword = "include"
            history = 4

            [uri-schemes]
            data = "data"
            abs = "/opt/seamm"
            "#,
        );
        let args = ReaderArgs {
            config: Some(path),
            ..Default::default()
        };
        let config = ReaderConfig::resolve(&args).unwrap();
        assert_eq!(config.include.as_deref(), Some("include"));
        assert_eq!(config.history, 4);
        assert_eq!(config.uri_schemes["data"], dir.path().join("data"));
        assert_eq!(config.uri_schemes["abs"], PathBuf::from("/opt/seamm"));
    }

    #[test]
    fn cli_flags_override_file_values() {
        let dir = tempdir().unwrap();
        let path = write_config(
            dir.path(),
            "[include]\nkeyword = \"include\"\nhistory = 4\n[uri-schemes]\ndata = \"/a\"\n",
        );
        let args = ReaderArgs {
            config: Some(path),
            include: Some("@inc".to_string()),
            history: Some(20),
            uri_schemes: vec!["data=/b".to_string(), "local:=/c".to_string()],
            ..Default::default()
        };
        let config = ReaderConfig::resolve(&args).unwrap();
        assert_eq!(config.include.as_deref(), Some("@inc"));
        assert_eq!(config.history, 20);
        assert_eq!(config.uri_schemes["data"], PathBuf::from("/b"));
        assert_eq!(config.uri_schemes["local"], PathBuf::from("/c"));
    }

    #[test]
    fn includes_can_be_disabled_from_file_or_flag() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), "[include]\nenabled = false\n");
        let args = ReaderArgs {
            config: Some(path.clone()),
            ..Default::default()
        };
        assert_eq!(ReaderConfig::resolve(&args).unwrap().include, None);

        let args = ReaderArgs {
            config: Some(path),
            include: Some("include".to_string()),
            ..Default::default()
        };
        assert_eq!(
            ReaderConfig::resolve(&args).unwrap().include.as_deref(),
            Some("include")
        );

        let args = ReaderArgs {
            no_include: true,
            ..Default::default()
        };
        assert_eq!(ReaderConfig::resolve(&args).unwrap().include, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_config(dir.path(), "[include]\nkeywrd = \"include\"\n");
        let args = ReaderArgs {
            config: Some(path),
            ..Default::default()
        };
        assert!(matches!(
            ReaderConfig::resolve(&args),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn malformed_uri_flags_are_rejected() {
        for bad in ["data", "=dir", "data="] {
            let args = ReaderArgs {
                uri_schemes: vec![bad.to_string()],
                ..Default::default()
            };
            assert!(matches!(
                ReaderConfig::resolve(&args),
                Err(CliError::Argument(_))
            ));
        }
    }

    #[test]
    fn reader_builder_uses_the_merged_settings() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("part.txt"), "part\n").unwrap();
        fs::write(dir.path().join("main.txt"), "main\n@inc lib:part.txt\n").unwrap();

        let config = ReaderConfig {
            include: Some("@inc".to_string()),
            history: 3,
            uri_schemes: BTreeMap::from([("lib".to_string(), dir.path().to_path_buf())]),
        };
        let mut reader = config
            .reader_builder(&dir.path().join("main.txt"))
            .build()
            .unwrap();
        assert_eq!(reader.history(), 3);
        reader.open().unwrap();
        let lines: Vec<String> = reader.by_ref().collect::<std::result::Result<_, _>>().unwrap();
        assert_eq!(lines, ["main", "part"]);
    }
}
