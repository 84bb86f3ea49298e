use anyhow::{Context, Result};
use clap::Parser;
use class_map::cache::{CacheStore, Invalidation};
use class_map::cli::{Cli, Commands, OutputFormat};
use class_map::config::scan_config_from_cli;
use class_map::{RebuildError, Registry, Resolution, Resolver};
use serde::Serialize;
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = scan_config_from_cli(&cli)?;
    let format = cli.format;

    match cli.command.clone().unwrap_or(Commands::Rebuild) {
        Commands::Rebuild => {
            let report = rebuild(Registry::empty(config)).context("Unable to write class map cache")?;
            emit(format, &report, || {
                format!(
                    "New class map cache generated at {} ({} classes)\n",
                    report.cache_location, report.classes
                )
            })?;
        }
        Commands::Resolve { class_name } => {
            let registry = Registry::open(config)?;
            let mut resolver = Resolver::new(registry);
            let resolution: Resolution = resolver.resolve(&class_name)?;
            emit(format, &resolution, || {
                format!("{}\t{}\n", resolution.class_name, resolution.path.display())
            })?;
        }
        Commands::List => {
            let registry = Registry::open(config)?;
            let map = registry.class_map();
            emit(format, map, || {
                map.iter()
                    .map(|(name, path)| format!("{name}\t{}\n", path.display()))
                    .collect()
            })?;
        }
        Commands::Stats => {
            let stats = stats(&CacheStore::new(config.cache_location()), config.root());
            emit(format, &stats, || {
                let mut out = String::new();
                out.push_str(&format!("root: {}\n", stats.root));
                out.push_str(&format!("cache_location: {}\n", stats.cache_location));
                out.push_str(&format!("cache_present: {}\n", stats.cache_present));
                match (&stats.classes, &stats.cache_error) {
                    (Some(n), _) => out.push_str(&format!("classes: {n}\n")),
                    (None, Some(err)) => out.push_str(&format!("classes: unavailable ({err})\n")),
                    (None, None) => out.push_str("classes: unavailable\n"),
                }
                out
            })?;
        }
        Commands::Clear => {
            let registry = Registry::empty(config);
            let result = registry.invalidate_cache()?;
            let output = ClearResult {
                cache_location: registry.cache_location().display().to_string(),
                result,
            };
            emit(format, &output, || {
                let verb = match output.result {
                    Invalidation::Removed => "Removed",
                    Invalidation::Absent => "No cache at",
                };
                format!("{verb} {}\n", output.cache_location)
            })?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if verbose { "debug" } else { "warn" };
        EnvFilter::new(level)
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[derive(Debug, Serialize)]
struct RebuildReport {
    cache_location: String,
    classes: usize,
    duration_ms: u64,
}

#[derive(Debug, Serialize)]
struct CacheStats {
    root: String,
    cache_location: String,
    cache_present: bool,
    classes: Option<usize>,
    cache_error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ClearResult {
    cache_location: String,
    result: Invalidation,
}

fn rebuild(mut registry: Registry) -> Result<RebuildReport> {
    if !registry.config().rebuild_permitted() {
        return Err(RebuildError::Disabled.into());
    }
    let start = Instant::now();
    registry.invalidate_cache()?;
    let classes = registry.rebuild()?.len();
    Ok(RebuildReport {
        cache_location: registry.cache_location().display().to_string(),
        classes,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

fn stats(store: &CacheStore, root: &Path) -> CacheStats {
    let cache_present = store.exists();
    let (classes, cache_error) = match store.load() {
        Ok(map) => (Some(map.len()), None),
        Err(_) if !cache_present => (None, None),
        Err(err) => (None, Some(err.to_string())),
    };
    CacheStats {
        root: root.display().to_string(),
        cache_location: store.location().display().to_string(),
        cache_present,
        classes,
        cache_error,
    }
}

fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
        OutputFormat::Text => text(),
    };
    print!("{content}");
    if !content.ends_with('\n') {
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn stats_reports_missing_cache_without_scanning() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let root = std::env::temp_dir().join(format!("class_map_main_stats_{nanos}"));
        let store = CacheStore::new(root.join(".classmapcache"));

        let stats = stats(&store, &root);
        assert!(!stats.cache_present);
        assert_eq!(stats.classes, None);
        assert_eq!(stats.cache_error, None);
    }

    #[test]
    fn stats_reports_why_a_cache_is_unusable() -> Result<()> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let root = std::env::temp_dir().join(format!("class_map_main_corrupt_{nanos}"));
        std::fs::create_dir_all(&root)?;
        let store = CacheStore::new(root.join(".classmapcache"));
        std::fs::write(store.location(), "not a class map")?;

        let stats = stats(&store, &root);
        assert!(stats.cache_present);
        assert_eq!(stats.classes, None);
        assert!(stats.cache_error.is_some_and(|e| e.contains("corrupt")));

        let _ = std::fs::remove_dir_all(root);
        Ok(())
    }

    #[test]
    fn disabled_rebuild_keeps_the_existing_cache() -> Result<()> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let root = std::env::temp_dir().join(format!("class_map_main_keep_{nanos}"));
        std::fs::create_dir_all(&root)?;
        std::fs::write(root.join("A.php"), "<?php class Alpha {}")?;
        let config = class_map::ScanConfig::builder(&root).build()?;
        Registry::open(config.clone())?;
        let before = std::fs::read(config.cache_location())?;

        let disabled = class_map::ScanConfig::builder(&root).rebuild_permitted(false).build()?;
        assert!(rebuild(Registry::empty(disabled)).is_err());
        assert_eq!(std::fs::read(config.cache_location())?, before);

        let _ = std::fs::remove_dir_all(root);
        Ok(())
    }
}
