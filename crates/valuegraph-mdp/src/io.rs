use std::{fs, path::Path};

use crate::{CompiledMdp, MdpError, MdpSpec};

/// Parse a model description from YAML text without validating it.
pub fn parse_yaml(yaml: &str) -> Result<MdpSpec, MdpError> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Load a model description from YAML on disk without validating it.
pub fn load_yaml(path: impl AsRef<Path>) -> Result<MdpSpec, MdpError> {
    let yaml = fs::read_to_string(path)?;
    parse_yaml(&yaml)
}

/// Load, validate and compile a model from a YAML file.
pub fn compile_yaml(path: impl AsRef<Path>) -> Result<CompiledMdp, MdpError> {
    load_yaml(path)?.compile()
}
