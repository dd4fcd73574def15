use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// The on-disk encoding of a text file.
///
/// Every file opened through this crate is read as text; the compression only
/// decides which decoder sits between the file handle and the line reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Compression {
    /// Plain, uncompressed text.
    #[default]
    Text,
    /// gzip-compressed text (`.gz`).
    Gzip,
    /// bzip2-compressed text (`.bz2`).
    Bzip2,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid compression: '{0}'. Expected 'text', 'gzip' or 'bzip2'.")]
pub struct UnknownCompression(pub String);

impl Compression {
    /// Determines the compression from the last extension of `path`.
    ///
    /// `.gz` selects gzip and `.bz2` selects bzip2 (ignoring ASCII case);
    /// anything else is plain text.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("gz") => Compression::Gzip,
            Some(ext) if ext.eq_ignore_ascii_case("bz2") => Compression::Bzip2,
            _ => Compression::Text,
        }
    }

    /// Opens `path` as a buffered text stream, decompressing on the fly.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(self, path: P) -> io::Result<Box<dyn BufRead>> {
        let file = File::open(path)?;
        let reader: Box<dyn BufRead> = match self {
            Compression::Text => Box::new(BufReader::new(file)),
            Compression::Gzip => Box::new(BufReader::new(MultiGzDecoder::new(file))),
            Compression::Bzip2 => Box::new(BufReader::new(MultiBzDecoder::new(file))),
        };
        Ok(reader)
    }

    /// The file name suffix this compression is detected by, with its dot.
    pub fn suffix(self) -> Option<&'static str> {
        match self {
            Compression::Text => None,
            Compression::Gzip => Some(".gz"),
            Compression::Bzip2 => Some(".bz2"),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compression::Text => "text",
            Compression::Gzip => "gzip",
            Compression::Bzip2 => "bzip2",
        };
        f.write_str(name)
    }
}

impl FromStr for Compression {
    type Err = UnknownCompression;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Compression::Text),
            "gzip" | "gz" => Ok(Compression::Gzip),
            "bzip2" | "bz2" => Ok(Compression::Bzip2),
            _ => Err(UnknownCompression(s.to_string())),
        }
    }
}

/// Returns the extension of a file name, ignoring a trailing `.gz` or `.bz2`.
///
/// The result includes the leading dot, or is empty when the (uncompressed)
/// name has no extension. This lets callers branch on content type without
/// caring whether the file is compressed.
///
/// ```
/// use seamm_util::core::io::compression::logical_extension;
///
/// assert_eq!(logical_extension("data.mol.gz"), ".mol");
/// assert_eq!(logical_extension("plain.pdb"), ".pdb");
/// assert_eq!(logical_extension("archive.tar.bz2"), ".tar");
/// ```
pub fn logical_extension<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    // `from_path` matched the suffix, so it is ASCII and safe to cut off.
    let logical = match Compression::from_path(path).suffix() {
        Some(suffix) => &name[..name.len() - suffix.len()],
        None => &name[..],
    };
    Path::new(logical)
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use tempfile::tempdir;

    #[test]
    fn from_path_detects_compression_by_extension() {
        assert_eq!(Compression::from_path("a/b/file.txt.gz"), Compression::Gzip);
        assert_eq!(Compression::from_path("file.BZ2"), Compression::Bzip2);
        assert_eq!(Compression::from_path("file.txt"), Compression::Text);
        assert_eq!(Compression::from_path("gz"), Compression::Text);
        assert_eq!(Compression::from_path("noext"), Compression::Text);
    }

    #[test]
    fn suffix_matches_detection() {
        for compression in [Compression::Gzip, Compression::Bzip2] {
            let suffix = compression.suffix().unwrap();
            assert_eq!(Compression::from_path(format!("file{}", suffix)), compression);
        }
        assert_eq!(Compression::Text.suffix(), None);
    }

    #[test]
    fn logical_extension_strips_one_compression_suffix() {
        assert_eq!(logical_extension("data.mol.gz"), ".mol");
        assert_eq!(logical_extension("plain.pdb"), ".pdb");
        assert_eq!(logical_extension("archive.tar.bz2"), ".tar");
        assert_eq!(logical_extension("/some/dir/structure.sdf.GZ"), ".sdf");
    }

    #[test]
    fn logical_extension_is_empty_without_a_real_extension() {
        assert_eq!(logical_extension("README"), "");
        assert_eq!(logical_extension("README.gz"), "");
        assert_eq!(logical_extension(".bashrc"), "");
    }

    #[test]
    fn compression_parses_from_names_and_aliases() {
        assert_eq!("text".parse::<Compression>(), Ok(Compression::Text));
        assert_eq!("GZIP".parse::<Compression>(), Ok(Compression::Gzip));
        assert_eq!("bz2".parse::<Compression>(), Ok(Compression::Bzip2));
        assert_eq!(
            "zstd".parse::<Compression>(),
            Err(UnknownCompression("zstd".to_string()))
        );
        assert_eq!(Compression::Bzip2.to_string(), "bzip2");
    }

    #[test]
    fn open_decompresses_gzip_and_bzip2_transparently() {
        let dir = tempdir().unwrap();
        let content = "line 1\nline 2\n";

        let gz_path = dir.path().join("sample.txt.gz");
        let mut gz = flate2::write::GzEncoder::new(
            std::fs::File::create(&gz_path).unwrap(),
            flate2::Compression::default(),
        );
        gz.write_all(content.as_bytes()).unwrap();
        gz.finish().unwrap();

        let bz_path = dir.path().join("sample.txt.bz2");
        let mut bz = bzip2::write::BzEncoder::new(
            std::fs::File::create(&bz_path).unwrap(),
            bzip2::Compression::default(),
        );
        bz.write_all(content.as_bytes()).unwrap();
        bz.finish().unwrap();

        for path in [&gz_path, &bz_path] {
            let mut text = String::new();
            Compression::from_path(path)
                .open(path)
                .unwrap()
                .read_to_string(&mut text)
                .unwrap();
            assert_eq!(text, content);
        }
    }

    #[test]
    fn open_reports_missing_files() {
        let dir = tempdir().unwrap();
        let result = Compression::Text.open(dir.path().join("missing.txt"));
        assert_eq!(result.err().map(|e| e.kind()), Some(io::ErrorKind::NotFound));
    }
}
