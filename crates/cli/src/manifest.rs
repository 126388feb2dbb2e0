use anyhow::{Context, Result, bail};
use argot::Command;
use argot_schema::{ArgSchema, CommandSchema, FlagSchema, Manifest, OptionSchema};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MANIFEST_NAME: &str = "argot.json";

#[derive(Debug, Clone)]
pub struct LoadedManifest {
    pub path: PathBuf,
    pub manifest: Manifest,
    pub command: Command,
}

/// Read, decode and build the command tree of a manifest.
pub fn load_manifest(manifest_path: &Path) -> Result<LoadedManifest> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let path = resolve_against(&cwd, manifest_path);

    if !path.exists() {
        bail!("manifest not found: {}", path.display());
    }

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("failed to read manifest: {}", path.display()))?;
    let manifest = Manifest::from_json(&contents)
        .with_context(|| format!("failed to parse manifest: {}", path.display()))?;
    let command = manifest
        .command
        .to_command()
        .with_context(|| format!("invalid command tree in manifest: {}", path.display()))?;

    tracing::debug!(path = %path.display(), command = command.name(), "loaded manifest");
    Ok(LoadedManifest {
        path,
        manifest,
        command,
    })
}

pub fn write_default_manifest(project_dir: &Path, name: Option<&str>, overwrite: bool) -> Result<PathBuf> {
    let dest = project_dir.join(DEFAULT_MANIFEST_NAME);
    if dest.exists() && !overwrite {
        bail!("{} already exists in {}", DEFAULT_MANIFEST_NAME, project_dir.display());
    }

    let name = name
        .map(str::to_string)
        .or_else(|| guess_project_name(project_dir))
        .unwrap_or_else(|| "my-cli".to_string());
    let manifest = Manifest::new(starter_command(&name));

    let mut out = manifest.to_json_pretty().context("failed to serialize manifest")?;
    out.push('\n');

    let tmp = dest.with_extension("tmp");
    fs::write(&tmp, out.as_bytes())
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    if overwrite && dest.exists() {
        fs::remove_file(&dest).with_context(|| format!("failed to remove {}", dest.display()))?;
    }
    fs::rename(&tmp, &dest)
        .with_context(|| format!("failed to move {} into place", dest.display()))?;
    Ok(dest)
}

fn starter_command(name: &str) -> CommandSchema {
    CommandSchema {
        name: name.to_string(),
        help: format!("The {name} command-line interface"),
        version: "0.1.0".to_string(),
        flags: vec![FlagSchema {
            short: Some("v".to_string()),
            long: Some("verbose".to_string()),
            help: "Print more output".to_string(),
            global: true,
        }],
        subcommands: vec![CommandSchema {
            name: "greet".to_string(),
            aliases: vec!["g".to_string()],
            help: "Print a greeting".to_string(),
            args: vec![ArgSchema {
                name: "name".to_string(),
                help: "Who to greet".to_string(),
                required: true,
                ..Default::default()
            }],
            options: vec![OptionSchema {
                short: Some("c".to_string()),
                long: Some("count".to_string()),
                help: "How many times to greet".to_string(),
                argument: Some(ArgSchema {
                    name: "count".to_string(),
                    value_type: Some("uint".to_string()),
                    default_value: Some("1".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            }],
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// The directory's own name, else the current directory's name.
fn guess_project_name(project_dir: &Path) -> Option<String> {
    let usable = |dir: &Path| {
        dir.file_name()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty() && *s != "." && *s != "..")
            .map(str::to_string)
    };
    usable(project_dir).or_else(|| usable(std::env::current_dir().ok()?.as_path()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_manifest_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_default_manifest(dir.path(), Some("demo"), false).unwrap();
        assert_eq!(path.file_name().unwrap(), DEFAULT_MANIFEST_NAME);

        let loaded = load_manifest(&path).unwrap();
        assert_eq!(loaded.command.name(), "demo");
        assert_eq!(loaded.manifest.command.subcommands[0].name, "greet");

        let m = argot::parse(&loaded.command, &["g", "world", "-c", "2"]).unwrap();
        assert_eq!(m.get_arg_value("name"), Ok("world"));
        assert_eq!(m.get_option_value("count"), Ok("2"));
    }

    #[test]
    fn refuses_to_overwrite_without_flag() {
        let dir = tempfile::tempdir().unwrap();
        write_default_manifest(dir.path(), Some("demo"), false).unwrap();
        assert!(write_default_manifest(dir.path(), Some("demo"), false).is_err());
        assert!(write_default_manifest(dir.path(), Some("other"), true).is_ok());
        let loaded = load_manifest(&dir.path().join(DEFAULT_MANIFEST_NAME)).unwrap();
        assert_eq!(loaded.command.name(), "other");
    }

    #[test]
    fn name_defaults_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("tool");
        fs::create_dir_all(&project).unwrap();
        write_default_manifest(&project, None, false).unwrap();
        let loaded = load_manifest(&project.join(DEFAULT_MANIFEST_NAME)).unwrap();
        assert_eq!(loaded.command.name(), "tool");
    }

    #[test]
    fn missing_manifest_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_manifest(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("manifest not found"));
    }
}
