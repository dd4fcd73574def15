use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The reference is well-formed but its target cannot be located.
    ///
    /// An include marked `missing_ok` treats this as "contributes no lines".
    #[error("Could not locate '{reference}'")]
    NotFound { reference: String },
    #[error("Invalid reference '{reference}': {reason}")]
    Invalid { reference: String, reason: String },
}

/// Maps the raw reference token of an include directive (or the root path
/// handed to a reader) to a file-system path.
///
/// A relative result is interpreted relative to the directory of the file
/// containing the directive; an absolute result is used as is.
pub trait UriResolver {
    fn resolve(&self, reference: &str) -> Result<PathBuf, ResolveError>;
}

impl<F> UriResolver for F
where
    F: Fn(&str) -> Result<PathBuf, ResolveError>,
{
    fn resolve(&self, reference: &str) -> Result<PathBuf, ResolveError> {
        self(reference)
    }
}

/// Treats every reference as a literal path.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl UriResolver for IdentityResolver {
    fn resolve(&self, reference: &str) -> Result<PathBuf, ResolveError> {
        if reference.is_empty() {
            return Err(ResolveError::Invalid {
                reference: reference.to_string(),
                reason: "empty path".to_string(),
            });
        }
        Ok(PathBuf::from(reference))
    }
}

/// Resolves `scheme:rest` references against per-scheme base directories.
///
/// With schemes registered as `data -> /opt/seamm/data`, the reference
/// `data:forcefields/pcff.frc` resolves to `/opt/seamm/data/forcefields/pcff.frc`.
/// References without a registered scheme are treated as literal paths. In
/// strict mode a scheme reference whose target does not exist is reported as
/// [`ResolveError::NotFound`], so `missing_ok` includes can skip it.
#[derive(Debug, Clone, Default)]
pub struct SchemeResolver {
    schemes: BTreeMap<String, PathBuf>,
    strict: bool,
}

impl SchemeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>, base: impl Into<PathBuf>) -> Self {
        self.schemes.insert(scheme.into(), base.into());
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn schemes(&self) -> impl Iterator<Item = (&str, &PathBuf)> {
        self.schemes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Splits `reference` into a scheme and the remainder.
    ///
    /// Single-letter schemes are rejected so that `C:\data` stays a path.
    fn split_scheme(reference: &str) -> Option<(&str, &str)> {
        let (scheme, rest) = reference.split_once(':')?;
        let valid = scheme.len() > 1
            && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.' | '_'));
        valid.then_some((scheme, rest))
    }
}

impl UriResolver for SchemeResolver {
    fn resolve(&self, reference: &str) -> Result<PathBuf, ResolveError> {
        let Some((scheme, rest)) = Self::split_scheme(reference) else {
            return IdentityResolver.resolve(reference);
        };
        let Some(base) = self.schemes.get(scheme) else {
            return IdentityResolver.resolve(reference);
        };
        let rest = rest.trim_start_matches('/');
        if rest.is_empty() {
            return Err(ResolveError::Invalid {
                reference: reference.to_string(),
                reason: format!("no path after '{}:'", scheme),
            });
        }
        let path = base.join(rest);
        if self.strict && !path.exists() {
            return Err(ResolveError::NotFound {
                reference: reference.to_string(),
            });
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn identity_resolver_returns_the_reference() {
        assert_eq!(
            IdentityResolver.resolve("sub/file.txt"),
            Ok(PathBuf::from("sub/file.txt"))
        );
        assert!(matches!(
            IdentityResolver.resolve(""),
            Err(ResolveError::Invalid { .. })
        ));
    }

    #[test]
    fn closures_can_be_used_as_resolvers() {
        let resolver = |reference: &str| -> Result<PathBuf, ResolveError> {
            Err(ResolveError::NotFound {
                reference: reference.to_string(),
            })
        };
        assert_eq!(
            resolver.resolve("x"),
            Err(ResolveError::NotFound {
                reference: "x".to_string()
            })
        );
    }

    #[test]
    fn scheme_resolver_maps_registered_schemes() {
        let resolver = SchemeResolver::new().with_scheme("data", "/opt/data");
        assert_eq!(
            resolver.resolve("data:file1.txt"),
            Ok(PathBuf::from("/opt/data/file1.txt"))
        );
        assert_eq!(
            resolver.resolve("data:/nested/file1.txt"),
            Ok(PathBuf::from("/opt/data/nested/file1.txt"))
        );
    }

    #[test]
    fn scheme_resolver_falls_back_to_literal_paths() {
        let resolver = SchemeResolver::new().with_scheme("data", "/opt/data");
        assert_eq!(
            resolver.resolve("local:file.txt"),
            Ok(PathBuf::from("local:file.txt"))
        );
        assert_eq!(
            resolver.resolve("C:\\inputs\\a.txt"),
            Ok(PathBuf::from("C:\\inputs\\a.txt"))
        );
        assert_eq!(resolver.resolve("plain.txt"), Ok(PathBuf::from("plain.txt")));
    }

    #[test]
    fn scheme_resolver_rejects_empty_remainder() {
        let resolver = SchemeResolver::new().with_scheme("data", "/opt/data");
        assert!(matches!(
            resolver.resolve("data:"),
            Err(ResolveError::Invalid { .. })
        ));
    }

    #[test]
    fn strict_scheme_resolver_reports_missing_targets() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("present.txt"), "x\n").unwrap();
        let resolver = SchemeResolver::new()
            .with_scheme("data", dir.path())
            .strict(true);

        assert_eq!(
            resolver.resolve("data:present.txt"),
            Ok(dir.path().join("present.txt"))
        );
        assert_eq!(
            resolver.resolve("data:absent.txt"),
            Err(ResolveError::NotFound {
                reference: "data:absent.txt".to_string()
            })
        );
    }
}
