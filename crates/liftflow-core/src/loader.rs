//! Project loading: parse then validate

use crate::error::Result;
use crate::model::Project;
use crate::parser::parse_kdl_file;
use crate::validate::validate_project;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Load and validate the project file at `path`
#[instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load_project<P: AsRef<Path>>(path: P) -> Result<Project> {
    debug!("Parsing project file");
    let project = parse_kdl_file(path.as_ref())?;

    debug!("Validating project");
    validate_project(&project)?;

    info!(
        project = %project.name,
        fleets = project.fleets.len(),
        aliases = project.aliases.len(),
        "Project loaded"
    );
    Ok(project)
}
