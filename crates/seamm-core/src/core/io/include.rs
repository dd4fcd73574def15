use super::compression::Compression;
use super::error::{ConfigError, IncludeError};
use super::logger::{ReaderLogger, TracingLogger};
use super::resolver::{IdentityResolver, ResolveError, UriResolver};
use crate::core::utils::paths::absolutize;
use std::collections::VecDeque;
use std::fmt;
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_INCLUDE_KEYWORD: &str = "#include";
pub const DEFAULT_HISTORY: usize = 10;

const MISSING_OK: &str = "missing_ok";

/// How the reader opens its files. Only text reading exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    #[default]
    Text,
}

impl FromStr for ReadMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" | "rt" | "tr" | "text" => Ok(ReadMode::Text),
            other => Err(ConfigError::UnsupportedMode(other.to_string())),
        }
    }
}

/// A file opened during a session, together with the token that named it.
///
/// The root file is recorded with an empty reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedFile {
    pub reference: String,
    pub path: PathBuf,
}

struct Frame {
    path: PathBuf,
    compression: Compression,
    stream: Option<Box<dyn BufRead>>,
    lineno: usize,
}

impl Frame {
    fn open(path: PathBuf, compression: Compression) -> Result<Self, IncludeError> {
        let stream = compression
            .open(&path)
            .map_err(|source| open_error(&path, source))?;
        Ok(Self {
            path,
            compression,
            stream: Some(stream),
            lineno: 0,
        })
    }

    /// Reads one physical line, `None` at end of file. The terminator is
    /// stripped unless `keep_ending` is set.
    ///
    /// A line that is not valid UTF-8 is still counted before the error is
    /// returned, so the next line keeps its true number.
    fn read_line(&mut self, keep_ending: bool) -> Result<Option<String>, IncludeError> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(None);
        };
        let mut buf = Vec::new();
        let n = stream
            .read_until(b'\n', &mut buf)
            .map_err(|source| IncludeError::Read {
                path: self.path.clone(),
                line: self.lineno + 1,
                source,
            })?;
        if n == 0 {
            return Ok(None);
        }
        self.lineno += 1;
        if !keep_ending && buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        String::from_utf8(buf)
            .map(Some)
            .map_err(|e| IncludeError::Read {
                path: self.path.clone(),
                line: self.lineno,
                source: io::Error::new(io::ErrorKind::InvalidData, e),
            })
    }

    /// Releases the stream. Returns false if it was already released.
    fn close(&mut self) -> bool {
        self.stream.take().is_some()
    }
}

fn open_error(path: &Path, source: io::Error) -> IncludeError {
    if source.kind() == io::ErrorKind::NotFound {
        IncludeError::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        IncludeError::Open {
            path: path.to_path_buf(),
            source,
        }
    }
}

struct Directive {
    reference: String,
    missing_ok: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Configured,
    Open,
    Closed,
}

pub struct IncludeReaderBuilder {
    path: PathBuf,
    mode: ReadMode,
    include: Option<String>,
    history: usize,
    resolver: Box<dyn UriResolver>,
    logger: Box<dyn ReaderLogger>,
    working_dir: Option<PathBuf>,
    keep_line_endings: bool,
}

impl IncludeReaderBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: ReadMode::Text,
            include: Some(DEFAULT_INCLUDE_KEYWORD.to_string()),
            history: DEFAULT_HISTORY,
            resolver: Box::new(IdentityResolver),
            logger: Box::new(TracingLogger),
            working_dir: None,
            keep_line_endings: false,
        }
    }

    pub fn mode(mut self, mode: ReadMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the token that starts an include directive.
    pub fn include(mut self, keyword: impl Into<String>) -> Self {
        self.include = Some(keyword.into());
        self
    }

    /// Turns include processing off; directive lines are returned verbatim.
    pub fn no_include(mut self) -> Self {
        self.include = None;
        self
    }

    pub fn include_keyword(mut self, keyword: Option<String>) -> Self {
        self.include = keyword;
        self
    }

    pub fn history(mut self, lines: usize) -> Self {
        self.history = lines;
        self
    }

    pub fn resolver(mut self, resolver: impl UriResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn logger(mut self, logger: impl ReaderLogger + 'static) -> Self {
        self.logger = Box::new(logger);
        self
    }

    /// Directory against which a relative root path is anchored. Defaults to
    /// the process working directory at the time [`build`](Self::build) runs.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Returns each line with its `\n` or `\r\n` terminator, so the
    /// flattened document can be reproduced byte for byte. Off by default.
    pub fn keep_line_endings(mut self, keep: bool) -> Self {
        self.keep_line_endings = keep;
        self
    }

    /// Validates the settings and resolves the root path. Opens nothing.
    ///
    /// # Errors
    ///
    /// Returns [`IncludeError::Config`] for an empty history or an unusable
    /// include keyword, and [`IncludeError::Resolve`] if the resolver rejects
    /// the root path.
    pub fn build(self) -> Result<IncludeReader, IncludeError> {
        if self.history == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "history",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        if let Some(keyword) = &self.include {
            if keyword.is_empty() || keyword.contains(char::is_whitespace) {
                return Err(ConfigError::InvalidParameter {
                    name: "include",
                    reason: format!("'{}' is not a single token", keyword),
                }
                .into());
            }
        }

        let cwd = match self.working_dir {
            Some(dir) => dir,
            None => std::env::current_dir().map_err(|source| IncludeError::Open {
                path: PathBuf::from("."),
                source,
            })?,
        };
        let reference = self.path.to_string_lossy().into_owned();
        let resolved = self
            .resolver
            .resolve(&reference)
            .map_err(|source| IncludeError::Resolve {
                reference: reference.clone(),
                source,
            })?;
        let root = absolutize(&resolved, &cwd);

        Ok(IncludeReader {
            root,
            root_reference: reference,
            mode: self.mode,
            include: self.include,
            history: self.history,
            keep_line_endings: self.keep_line_endings,
            resolver: self.resolver,
            logger: self.logger,
            cwd,
            frames: Vec::new(),
            visited: Vec::new(),
            recent: VecDeque::with_capacity(self.history),
            depth: 0,
            total_lines: 0,
            state: State::Configured,
        })
    }
}

/// A line reader that splices `#include`d files into the text of the file
/// that references them.
///
/// The reader keeps a stack of open files: a directive pushes the named file,
/// end of file pops it and reading resumes in the includer. Each file is
/// opened at most once per session, so cyclic or repeated includes are
/// skipped. `.gz` and `.bz2` files are decompressed transparently, and the
/// last few lines produced can be pushed back with [`push`](Self::push).
///
/// ```no_run
/// use seamm_util::core::io::include::IncludeReader;
///
/// let mut reader = IncludeReader::builder("input.dat").include("include").build()?;
/// reader.scoped(|reader| {
///     while let Some(line) = reader.next_line()? {
///         println!("{}:{} {}", reader.path().unwrap().display(), reader.lineno(), line);
///     }
///     Ok::<_, seamm_util::core::io::error::IncludeError>(())
/// })?;
/// # Ok::<_, seamm_util::core::io::error::IncludeError>(())
/// ```
pub struct IncludeReader {
    root: PathBuf,
    root_reference: String,
    mode: ReadMode,
    include: Option<String>,
    history: usize,
    keep_line_endings: bool,
    resolver: Box<dyn UriResolver>,
    logger: Box<dyn ReaderLogger>,
    cwd: PathBuf,
    frames: Vec<Frame>,
    visited: Vec<VisitedFile>,
    /// Most recent line first.
    recent: VecDeque<String>,
    depth: usize,
    total_lines: usize,
    state: State,
}

impl IncludeReader {
    pub fn builder(path: impl Into<PathBuf>) -> IncludeReaderBuilder {
        IncludeReaderBuilder::new(path)
    }

    /// A reader with the default keyword (`#include`) and history.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, IncludeError> {
        IncludeReaderBuilder::new(path).build()
    }

    /// Opens the root file. A reader that was closed starts over from the
    /// beginning.
    ///
    /// # Errors
    ///
    /// [`IncludeError::NotFound`] if the root file does not exist,
    /// [`IncludeError::Open`] if it cannot be opened and
    /// [`IncludeError::AlreadyOpen`] if the reader is open already.
    pub fn open(&mut self) -> Result<(), IncludeError> {
        if self.state == State::Open {
            return Err(IncludeError::AlreadyOpen);
        }
        self.logger.debug("opening reader");
        self.frames.clear();
        self.visited.clear();
        self.recent.clear();
        self.depth = 0;
        self.total_lines = 0;

        let path = fs::canonicalize(&self.root).map_err(|source| open_error(&self.root, source))?;
        let frame = Frame::open(path.clone(), Compression::from_path(&self.root))?;
        self.logger.debug(&format!("   opened {}", path.display()));
        self.visited.push(VisitedFile {
            reference: String::new(),
            path,
        });
        self.frames.push(frame);
        self.state = State::Open;
        Ok(())
    }

    /// Closes every open file, innermost first. Safe to call repeatedly.
    pub fn close(&mut self) {
        if self.state != State::Open && self.frames.is_empty() {
            return;
        }
        self.logger.debug("closing reader");
        while let Some(mut frame) = self.frames.pop() {
            if frame.close() {
                self.logger
                    .debug(&format!("   closed {}", frame.path.display()));
            }
        }
        self.state = State::Closed;
        self.logger.debug("   closed all files");
    }

    /// Opens the reader, hands it to `f` and closes it again whatever `f`
    /// returns.
    pub fn scoped<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<IncludeError>,
    {
        self.open()?;
        let result = f(self);
        self.close();
        result
    }

    /// Produces the next line of the flattened document, or `None` once the
    /// root file is exhausted. The terminator is stripped unless the reader
    /// was built with [`keep_line_endings`](IncludeReaderBuilder::keep_line_endings).
    ///
    /// Lines pushed back with [`push`](Self::push) are served first.
    ///
    /// # Errors
    ///
    /// [`IncludeError::NotOpen`] outside of an open session; otherwise any
    /// read, resolution or not-found error met while following includes.
    pub fn next_line(&mut self) -> Result<Option<String>, IncludeError> {
        if self.state != State::Open {
            return Err(IncludeError::NotOpen);
        }
        if self.depth > 0 {
            self.depth -= 1;
            return Ok(self.recent.get(self.depth).cloned());
        }

        loop {
            let Some(line) = self.read_physical()? else {
                return Ok(None);
            };
            match self.parse_directive(&line)? {
                Some(directive) => self.follow(directive)?,
                None => {
                    self.logger.trace(&line);
                    if self.recent.len() == self.history {
                        self.recent.pop_back();
                    }
                    self.recent.push_front(line.clone());
                    return Ok(Some(line));
                }
            }
        }
    }

    /// Re-serves the last `n` lines, in their original order, before reading
    /// on.
    ///
    /// # Errors
    ///
    /// [`IncludeError::HistoryExceeded`] if fewer than `n` produced lines are
    /// still retained; nothing changes in that case.
    pub fn push(&mut self, n: usize) -> Result<(), IncludeError> {
        let available = self.recent.len() - self.depth;
        if n > available {
            return Err(IncludeError::HistoryExceeded {
                requested: n,
                available,
            });
        }
        self.depth += n;
        Ok(())
    }

    /// The include chain as `path:lineno`, innermost file first.
    pub fn stack(&self) -> Vec<String> {
        self.frames
            .iter()
            .rev()
            .map(|frame| format!("{}:{}", frame.path.display(), frame.lineno))
            .collect()
    }

    /// The file currently being read.
    pub fn path(&self) -> Option<&Path> {
        self.frames.last().map(|frame| frame.path.as_path())
    }

    /// The line number within [`path`](Self::path), counting directive lines.
    pub fn lineno(&self) -> usize {
        self.frames.last().map_or(0, |frame| frame.lineno)
    }

    /// Physical lines read from all files in this session.
    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    /// Lines pushed back and not yet re-served.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn visited(&self) -> &[VisitedFile] {
        &self.visited
    }

    pub fn current_compression(&self) -> Option<Compression> {
        self.frames.last().map(|frame| frame.compression)
    }

    /// The root path as resolved at construction.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mode(&self) -> ReadMode {
        self.mode
    }

    pub fn include_keyword(&self) -> Option<&str> {
        self.include.as_deref()
    }

    pub fn history(&self) -> usize {
        self.history
    }

    pub fn keeps_line_endings(&self) -> bool {
        self.keep_line_endings
    }

    pub fn is_open(&self) -> bool {
        self.state == State::Open
    }

    /// Reads the next physical line, dropping exhausted files off the stack.
    fn read_physical(&mut self) -> Result<Option<String>, IncludeError> {
        loop {
            let Some(frame) = self.frames.last_mut() else {
                return Ok(None);
            };
            let before = frame.lineno;
            let line = frame.read_line(self.keep_line_endings);
            self.total_lines += frame.lineno - before;
            if let Some(line) = line? {
                return Ok(Some(line));
            }
            if let Some(mut frame) = self.frames.pop() {
                frame.close();
                self.logger.info(&format!(
                    "   read {} lines from {}",
                    frame.lineno,
                    frame.path.display()
                ));
            }
        }
    }

    fn parse_directive(&self, line: &str) -> Result<Option<Directive>, IncludeError> {
        let Some(keyword) = self.include.as_deref() else {
            return Ok(None);
        };
        let mut words = line.split_whitespace();
        if words.next() != Some(keyword) {
            return Ok(None);
        }
        let Some(reference) = words.next() else {
            return Err(IncludeError::MissingReference {
                path: self.path().map(Path::to_path_buf).unwrap_or_default(),
                line: self.lineno(),
            });
        };

        let modifier = words.next();
        let missing_ok = modifier.is_some_and(|word| word.eq_ignore_ascii_case(MISSING_OK));
        let ignored: Vec<&str> = modifier
            .filter(|_| !missing_ok)
            .into_iter()
            .chain(words)
            .collect();
        if !ignored.is_empty() {
            self.logger.warn(&format!(
                "ignoring '{}' after include of '{}' at {}",
                ignored.join(" "),
                reference,
                self.stack().first().map(String::as_str).unwrap_or("?")
            ));
        }

        Ok(Some(Directive {
            reference: reference.to_string(),
            missing_ok,
        }))
    }

    /// Pushes the file named by `directive` unless it is missing (and
    /// tolerated) or was opened before.
    fn follow(&mut self, directive: Directive) -> Result<(), IncludeError> {
        let Directive {
            reference,
            missing_ok,
        } = directive;
        self.logger
            .debug(&format!("   opening include file {}", reference));

        let resolved = match self.resolver.resolve(&reference) {
            Ok(path) => path,
            Err(ResolveError::NotFound { .. }) if missing_ok => {
                self.logger.debug("   URI handler did not find the file");
                return Ok(());
            }
            Err(source) => return Err(IncludeError::Resolve { reference, source }),
        };

        let base = self
            .path()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.cwd.clone());
        let path = absolutize(&resolved, &base);
        if !path.exists() {
            if missing_ok {
                self.logger
                    .debug(&format!("   {} is missing, skipping", path.display()));
                return Ok(());
            }
            return Err(IncludeError::NotFound { path });
        }

        let canonical = fs::canonicalize(&path).map_err(|source| open_error(&path, source))?;
        if self.visited.iter().any(|file| file.path == canonical) {
            self.logger.debug(&format!(
                "   {} was already included, skipping",
                canonical.display()
            ));
            return Ok(());
        }

        let frame = Frame::open(canonical.clone(), Compression::from_path(&path))?;
        self.logger.debug("   opened it");
        self.visited.push(VisitedFile {
            reference,
            path: canonical,
        });
        self.frames.push(frame);
        Ok(())
    }
}

impl Iterator for IncludeReader {
    type Item = Result<String, IncludeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

impl Drop for IncludeReader {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for IncludeReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncludeReader")
            .field("root", &self.root)
            .field("root_reference", &self.root_reference)
            .field("include", &self.include)
            .field("history", &self.history)
            .field("state", &self.state)
            .field("stack", &self.stack())
            .field("depth", &self.depth)
            .field("total_lines", &self.total_lines)
            .finish()
    }
}
