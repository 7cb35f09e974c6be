use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Project file not found. Looked in:\n\
        - current directory: liftflow.local.kdl, .liftflow.local.kdl, liftflow.kdl, .liftflow.kdl\n\
        - ./.liftflow/ directory\n\
        - ~/.config/liftflow/liftflow.kdl\n\
        Set LIFTFLOW_CONFIG_PATH or pass --config to point at a file directly"
    )]
    ProjectFileNotFound,

    #[error("Project file does not exist: {0}")]
    ExplicitPathMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
