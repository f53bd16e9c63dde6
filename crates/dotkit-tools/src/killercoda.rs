//! Add a step to a Killercoda scenario.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use dotkit_core::{DotkitError, Result, atomic_write};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub title: String,
    pub text: String,
    pub background: String,
}

/// Pretty-print with four-space indentation, the way the scenario editor
/// writes `index.json`.
fn to_index_json(value: &Value) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| DotkitError::InvalidInput(e.to_string()))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Append step N+1 to `<dir>/index.json`: back the index up to
/// `index_backup.json`, create `stepN/stepN.md` and an executable
/// `stepN/background.sh`, then rewrite the index.
pub fn add_step(dir: &Path, title: &str) -> Result<Step> {
    let index = dir.join("index.json");
    if !index.is_file() {
        return Err(DotkitError::NotFound(format!(
            "{} must be present in the directory",
            index.display()
        )));
    }
    std::fs::copy(&index, dir.join("index_backup.json"))?;

    let mut data: Value = serde_json::from_str(&std::fs::read_to_string(&index)?)?;
    let steps = data
        .pointer_mut("/details/steps")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| DotkitError::InvalidInput("index.json has no details.steps list".into()))?;

    let n = steps.len() + 1;
    let step_dir = format!("step{n}");
    let step = Step {
        title: title.to_string(),
        text: format!("{step_dir}/step{n}.md"),
        background: format!("{step_dir}/background.sh"),
    };

    std::fs::create_dir(dir.join(&step_dir))?;
    std::fs::write(dir.join(&step.text), "")?;
    let background: PathBuf = dir.join(&step.background);
    std::fs::write(&background, "")?;
    make_executable(&background)?;

    steps.push(serde_json::to_value(&step)?);
    atomic_write(&index, &to_index_json(&data)?)?;
    info!(step = n, title, "killercoda step added");
    Ok(step)
}
