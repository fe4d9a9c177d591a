use crate::configuration::Configuration;
use anyhow::Result;
use std::io;

/// Get the full version of the program (e.g. "dbsh-mongo/0.1.0 Linux/6.8.0/x86_64").
#[must_use]
pub fn full_version(configuration: &Configuration) -> String {
    let program_name = &configuration.program_name;
    let version = &configuration.version;
    let info = os_info::get();
    let os = format!("{}", info.os_type()).replace(' ', "-");
    let os_version = info.version();
    let architecture = info.architecture().unwrap_or("unknown");

    format!("{program_name}/{version} {os}/{os_version}/{architecture}")
}

/// Write the full version to the provided output.
///
/// # Errors
///
/// Returns an error if the output cannot be written
pub fn execute(configuration: &Configuration, output: &mut dyn io::Write) -> Result<()> {
    let version = full_version(configuration);
    writeln!(output, "{version}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_PROGRAM_NAME: &str = "test-program";
    const TEST_VERSION: &str = "1.2.3";

    fn configuration() -> Configuration {
        Configuration {
            program_name: TEST_PROGRAM_NAME.to_string(),
            version: TEST_VERSION.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_version() {
        let version_prefix = format!("{TEST_PROGRAM_NAME}/{TEST_VERSION} ");
        let version = full_version(&configuration());
        assert!(version.starts_with(version_prefix.as_str()));
    }

    #[test]
    fn test_execute() -> Result<()> {
        let mut output = Vec::new();
        execute(&configuration(), &mut output)?;
        let version = String::from_utf8(output)?;
        assert!(version.starts_with(&format!("{TEST_PROGRAM_NAME}/{TEST_VERSION}")));
        assert!(version.ends_with('\n'));
        Ok(())
    }
}
