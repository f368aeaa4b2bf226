use std::fmt::{Debug, Display};
use std::path::PathBuf;

use thiserror::Error;

use crate::rules::RuleTableError;

pub type Result<T> = std::result::Result<T, ViaStackError>;

pub struct ViaStackError {
    pub(crate) source: ErrorSource,
    pub(crate) context: Vec<ErrorContext>,
}

impl ViaStackError {
    pub fn source(&self) -> &ErrorSource {
        &self.source
    }

    pub fn context(&self) -> &[ErrorContext] {
        &self.context
    }
}

impl std::error::Error for ViaStackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl Display for ViaStackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.source)?;
        for item in self.context.iter() {
            write!(f, "\n\twhile {}", item)?;
        }
        Ok(())
    }
}

impl Debug for ViaStackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.source)?;
        if !self.context.is_empty() {
            writeln!(f, "\nError occurred:")?;
            for (i, item) in self.context.iter().enumerate() {
                writeln!(f, "\t{}: {:?}", i, item)?;
            }
        }
        Ok(())
    }
}

impl<T> From<T> for ViaStackError
where
    T: Into<ErrorSource>,
{
    fn from(value: T) -> Self {
        Self {
            source: value.into(),
            context: Vec::new(),
        }
    }
}

impl ViaStackError {
    pub fn with_context(mut self, ctx: impl Into<ErrorContext>) -> Self {
        self.context.push(ctx.into());
        self
    }
}

#[inline]
pub fn with_err_context<T, E, C>(result: std::result::Result<T, E>, ctx: C) -> Result<T>
where
    C: FnOnce() -> ErrorContext,
    E: Into<ViaStackError>,
{
    result.map_err(|err| err.into().with_context(ctx()))
}

#[derive(Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorContext {
    Pack { via_layer: usize },
    Emit { name: String },
    LoadRules(PathBuf),
    CreateDir(PathBuf),
    CreateFile(PathBuf),
    ReadFile(PathBuf),
    Task(String),
}

impl Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ErrorContext::*;
        match self {
            Pack { via_layer } => write!(f, "packing via layer {via_layer}"),
            Emit { name } => write!(f, "emitting artifact {name}"),
            LoadRules(path) => write!(f, "loading rule table {path:?}"),
            CreateDir(path) => write!(f, "creating directory {path:?}"),
            CreateFile(path) => write!(f, "creating file {path:?}"),
            ReadFile(path) => write!(f, "reading file {path:?}"),
            Task(task) => write!(f, "{task}"),
        }
    }
}

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ErrorSource {
    #[error("start layer M{start} must be lower than end layer M{end}")]
    InvalidLayerRange { start: usize, end: usize },

    #[error("invalid via dimensions: {0}")]
    InvalidDimensions(String),

    #[error("no rules for layer {0}")]
    UnknownLayer(usize),

    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("invalid rule table: {0}")]
    RuleTable(#[from] RuleTableError),

    #[error("already exists: {0:?}")]
    AlreadyExists(PathBuf),

    #[error("missing required file: {0:?}")]
    MissingFile(PathBuf),

    #[error("external tool failed: {0}")]
    ToolFailed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("error parsing TOML: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("error parsing CSV: {0}")]
    CsvParsing(#[from] csv::Error),

    #[error("error writing JSON: {0}")]
    Json(#[from] serde_json::Error),
}
