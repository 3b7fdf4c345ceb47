use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context as _};
use colored::Colorize;
use sig_delta::{
    render_json, render_text, ApiComparator, ApiDelta, CompareConfig, Compatibility, DeltaSummary,
    ExceptionHierarchy,
};
use sig_store::{load_snapshot, FsSnapshotStore, SnapshotStore};
use sig_types::ApiSnapshot;
use tracing::info;

use crate::cli::*;

const DEFAULT_STORE: &str = ".sigdiff/snapshots";

pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;
    let ctx = Session {
        format: cli.format,
        config,
        store: cli.store,
    };
    match cli.command {
        Command::Compare(args) => cmd_compare(&ctx, args),
        Command::Summary(args) => cmd_summary(&ctx, args),
        Command::Digest(args) => cmd_digest(&ctx, args).map(|_| ExitCode::SUCCESS),
        Command::Store(args) => cmd_store(&ctx, args).map(|_| ExitCode::SUCCESS),
        Command::Config => cmd_config(&ctx).map(|_| ExitCode::SUCCESS),
    }
}

struct Session {
    format: OutputFormat,
    config: CompareConfig,
    store: Option<PathBuf>,
}

impl Session {
    /// Resolve a snapshot argument: a store label with `--store`, a file path otherwise.
    fn snapshot(&self, arg: &str) -> anyhow::Result<ApiSnapshot> {
        match &self.store {
            Some(dir) => {
                let store = FsSnapshotStore::open(dir)?;
                Ok(store.get(arg)?)
            }
            None => load_snapshot(Path::new(arg))
                .with_context(|| format!("cannot load snapshot {arg}")),
        }
    }

    fn open_store(&self) -> anyhow::Result<FsSnapshotStore> {
        let dir = self.store.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_STORE));
        FsSnapshotStore::open(&dir)
            .with_context(|| format!("cannot open snapshot store {}", dir.display()))
    }

    /// Compare two snapshots; added exceptions are classified against the
    /// new snapshot's class hierarchy.
    fn compare(&self, args: &CompareArgs) -> anyhow::Result<(ApiDelta, DeltaSummary)> {
        let from = self.snapshot(&args.from)?;
        let to = self.snapshot(&args.to)?;
        let config = apply_filters(self.config.clone(), &args.filter);
        let delta = ApiComparator::new(config).compare(&from, &to)?;
        let exceptions = ExceptionHierarchy::from_snapshot(&to);
        let summary = DeltaSummary::with_hierarchy(&delta, &exceptions);
        Ok((delta, summary))
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CompareConfig> {
    let Some(path) = path else {
        return Ok(CompareConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read config {}", path.display()))?;
    let config = CompareConfig::from_toml_str(&text)
        .with_context(|| format!("invalid config {}", path.display()))?;
    info!(path = %path.display(), "loaded comparison config");
    Ok(config)
}

/// Command-line flags override the loaded config.
fn apply_filters(mut config: CompareConfig, filter: &FilterArgs) -> CompareConfig {
    if let Some(min) = filter.min_visibility {
        config.min_visibility = min;
    }
    if filter.ignore_annotations {
        config.ignore_annotations = true;
    }
    config
        .ignored_packages
        .extend(filter.ignore_packages.iter().cloned());
    config
}

fn cmd_compare(ctx: &Session, args: CompareArgs) -> anyhow::Result<ExitCode> {
    let (delta, summary) = ctx.compare(&args)?;
    match ctx.format {
        OutputFormat::Text => {
            for line in render_text(&delta).lines() {
                println!("{}", paint(line));
            }
        }
        OutputFormat::Json => println!("{}", render_json(&delta)?),
    }
    Ok(exit_code(&summary, args.fail_on_breaking))
}

fn cmd_summary(ctx: &Session, args: CompareArgs) -> anyhow::Result<ExitCode> {
    let (delta, summary) = ctx.compare(&args)?;
    match ctx.format {
        OutputFormat::Text => {
            println!("{} -> {}", delta.from_label.bold(), delta.to_label.bold());
            let label = match summary.compatibility {
                Compatibility::Identical => "identical".green(),
                Compatibility::Compatible => "compatible".yellow(),
                Compatibility::Breaking => "breaking".red().bold(),
            };
            println!("Compatibility: {label}");
            for (name, counts) in [
                ("packages", summary.packages),
                ("classes", summary.classes),
                ("fields", summary.fields),
                ("constructors", summary.constructors),
                ("methods", summary.methods),
            ] {
                println!("  {:<13} {}", name, counts);
            }
            if !summary.breaking.is_empty() {
                println!("\n{}", "Breaking changes:".red().bold());
                for change in &summary.breaking {
                    println!("  {} {}", change.path.cyan(), change.reason);
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
    }
    Ok(exit_code(&summary, args.fail_on_breaking))
}

fn cmd_digest(ctx: &Session, args: DigestArgs) -> anyhow::Result<()> {
    let snapshot = load_snapshot(&args.file)
        .with_context(|| format!("cannot load snapshot {}", args.file.display()))?;
    let digest = snapshot.digest()?;
    match ctx.format {
        OutputFormat::Text => println!("{}  {}", digest.to_hex(), snapshot.label().bold()),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "label": snapshot.label(), "digest": digest.to_hex() })
        ),
    }
    Ok(())
}

fn cmd_store(ctx: &Session, args: StoreArgs) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    match args.action {
        StoreAction::Add { file } => {
            let snapshot = load_snapshot(&file)
                .with_context(|| format!("cannot load snapshot {}", file.display()))?;
            let digest = store.write(&snapshot)?;
            println!("{} Stored {} ({})", "✓".green().bold(), snapshot.label().yellow(), digest.to_string().cyan());
        }
        StoreAction::List => {
            let labels = store.labels()?;
            match ctx.format {
                OutputFormat::Text if labels.is_empty() => println!("No stored snapshots."),
                OutputFormat::Text => {
                    for label in &labels {
                        println!("{label}");
                    }
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&labels)?),
            }
        }
        StoreAction::Remove { label } => {
            if !store.delete(&label)? {
                bail!("no stored snapshot labelled {label}");
            }
            println!("Removed {}", label.yellow());
        }
    }
    Ok(())
}

fn cmd_config(ctx: &Session) -> anyhow::Result<()> {
    match ctx.format {
        OutputFormat::Text => print!("{}", ctx.config.to_toml_string()?),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ctx.config)?),
    }
    Ok(())
}

fn should_fail(summary: &DeltaSummary, fail_on_breaking: bool) -> bool {
    fail_on_breaking && summary.is_breaking()
}

fn exit_code(summary: &DeltaSummary, fail_on_breaking: bool) -> ExitCode {
    if should_fail(summary, fail_on_breaking) {
        eprintln!("{} {} breaking change(s)", "error:".red().bold(), summary.breaking.len());
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

/// Color a text-report line by its change marker.
fn paint(line: &str) -> String {
    match line.trim_start().chars().next() {
        Some('+') => line.green().to_string(),
        Some('-') => line.red().to_string(),
        Some('~') => line.yellow().to_string(),
        _ => line.bold().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sig_types::{ClassDecl, ClassKind, Method, Modifier, Package, TypeRef, Visibility};
    use tempfile::TempDir;

    fn snapshot(version: &str, classes: &[&str]) -> ApiSnapshot {
        let mut package = Package::new("android.app");
        for name in classes {
            package = package.with_class(
                ClassDecl::new(*name, ClassKind::Class).with_modifiers(&[Modifier::Public]),
            );
        }
        ApiSnapshot::new("android", version).with_package(package)
    }

    fn write_json(dir: &Path, snap: &ApiSnapshot) -> String {
        let path = dir.join(format!("{}.json", snap.label()));
        fs::write(&path, serde_json::to_string(snap).unwrap()).unwrap();
        path.display().to_string()
    }

    fn compare_args(from: String, to: String) -> CompareArgs {
        CompareArgs {
            from,
            to,
            filter: FilterArgs::default(),
            fail_on_breaking: true,
        }
    }

    fn session(store: Option<PathBuf>) -> Session {
        Session {
            format: OutputFormat::Json,
            config: CompareConfig::default(),
            store,
        }
    }

    #[test]
    fn flags_override_config() {
        let filter = FilterArgs {
            min_visibility: Some(Visibility::Public),
            ignore_annotations: true,
            ignore_packages: vec!["dalvik".into()],
        };
        let config = apply_filters(CompareConfig::default(), &filter);
        assert_eq!(config.min_visibility, Visibility::Public);
        assert!(config.ignore_annotations);
        assert!(config.is_package_ignored("dalvik.system"));

        let untouched = apply_filters(CompareConfig::default(), &FilterArgs::default());
        assert_eq!(untouched, CompareConfig::default());
    }

    #[test]
    fn config_file_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sigdiff.toml");
        fs::write(&path, "min_visibility = \"public\"\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.min_visibility, Visibility::Public);
        assert_eq!(load_config(None).unwrap(), CompareConfig::default());
    }

    #[test]
    fn bad_config_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sigdiff.toml");
        fs::write(&path, "min_visibility = 3\n").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("invalid config"));
    }

    #[test]
    fn compare_files() {
        let dir = TempDir::new().unwrap();
        let old = write_json(dir.path(), &snapshot("1", &["Activity"]));
        let new = write_json(dir.path(), &snapshot("2", &["Activity", "Fragment"]));
        let (delta, summary) = session(None).compare(&compare_args(old, new)).unwrap();
        assert!(delta.class("android.app", "Fragment").unwrap().delta.is_added());
        assert_eq!(summary.compatibility, Compatibility::Compatible);
    }

    #[test]
    fn compare_store_labels() {
        let dir = TempDir::new().unwrap();
        let store = FsSnapshotStore::open(dir.path()).unwrap();
        store.write(&snapshot("1", &["Activity", "Fragment"])).unwrap();
        store.write(&snapshot("2", &["Activity"])).unwrap();

        let ctx = session(Some(dir.path().to_path_buf()));
        let args = compare_args("android-1".into(), "android-2".into());
        let (_, summary) = ctx.compare(&args).unwrap();
        assert!(summary.is_breaking());
        assert!(should_fail(&summary, true));
        assert!(!should_fail(&summary, false));
    }

    #[test]
    fn unchecked_exception_from_new_snapshot_does_not_fail() {
        let dir = TempDir::new().unwrap();
        let error_class = ClassDecl::new("AndroidRuntimeException", ClassKind::Class)
            .with_modifiers(&[Modifier::Public])
            .with_superclass(TypeRef::parse("java.lang.RuntimeException").unwrap());
        let activity = |throws: Option<&str>| {
            let mut finish = Method::new("finish", TypeRef::parse("void").unwrap())
                .with_modifiers(&[Modifier::Public]);
            finish.exceptions.extend(throws.map(|t| TypeRef::parse(t).unwrap()));
            ClassDecl::new("Activity", ClassKind::Class)
                .with_modifiers(&[Modifier::Public])
                .with_method(finish)
        };
        let snap = |version: &str, activity: ClassDecl| {
            ApiSnapshot::new("android", version).with_package(
                Package::new("android.app")
                    .with_class(error_class.clone())
                    .with_class(activity),
            )
        };
        let old = write_json(dir.path(), &snap("1", activity(None)));
        let new = write_json(
            dir.path(),
            &snap("2", activity(Some("android.app.AndroidRuntimeException"))),
        );
        let (_, summary) = session(None).compare(&compare_args(old, new)).unwrap();
        assert_eq!(summary.compatibility, Compatibility::Compatible);
        assert!(!should_fail(&summary, true));
    }

    #[test]
    fn missing_label_is_an_error() {
        let dir = TempDir::new().unwrap();
        let ctx = session(Some(dir.path().to_path_buf()));
        assert!(ctx.snapshot("android-99").is_err());
    }

    #[test]
    fn paint_keeps_text() {
        colored::control::set_override(false);
        assert_eq!(paint("    + field FOO"), "    + field FOO");
        assert_eq!(paint("API delta a -> b"), "API delta a -> b");
    }
}
