use serde_json::Value;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(name: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "class_map_it_{}_{}_{}",
        std::process::id(),
        nanos,
        name
    ))
}

fn write_file(path: &std::path::Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn run(args: &[&str]) -> anyhow::Result<std::process::Output> {
    let bin = env!("CARGO_BIN_EXE_class-map");
    Ok(Command::new(bin)
        .args(args)
        .env_remove("CLASS_MAP_ROOT")
        .env_remove("RUST_LOG")
        .output()?)
}

fn run_json(args: &[&str]) -> anyhow::Result<Value> {
    let out = run(args)?;
    if !out.status.success() {
        return Err(anyhow::anyhow!(
            "command failed: status={:?}, stderr={}",
            out.status.code(),
            String::from_utf8_lossy(&out.stderr)
        ));
    }
    Ok(serde_json::from_slice(&out.stdout)?)
}

#[test]
fn rebuild_resolve_and_clear_flow() -> anyhow::Result<()> {
    let root = temp_dir("flow");
    write_file(&root.join("app/A.src"), "<?php\nclass Alpha {}\n")?;
    write_file(&root.join("app/B.src"), "<?php\nclass Beta extends Alpha {}\n")?;
    write_file(&root.join("notes/C.txt"), "class Gamma {}\n")?;
    let root_arg = root.to_string_lossy().to_string();

    let rebuilt = run_json(&["--root", &root_arg, "--ext", "src", "rebuild"])?;
    assert_eq!(rebuilt["classes"], Value::from(2));
    let cache = root.join(".classmapcache");
    assert_eq!(
        rebuilt["cache_location"],
        Value::String(cache.to_string_lossy().to_string())
    );
    assert!(cache.is_file());

    let listed = run_json(&["--root", &root_arg, "--ext", "src", "list"])?;
    assert_eq!(
        listed["Alpha"],
        Value::String(root.join("app/A.src").to_string_lossy().to_string())
    );
    assert!(listed.get("Gamma").is_none());

    write_file(&root.join("app/D.src"), "<?php\nclass Delta {}\n")?;
    let resolved = run_json(&["--root", &root_arg, "--ext", "src", "resolve", "Delta"])?;
    assert_eq!(resolved["how"], Value::String("loaded_after_rebuild".to_string()));

    let stats = run_json(&["--root", &root_arg, "--ext", "src", "stats"])?;
    assert_eq!(stats["cache_present"], Value::Bool(true));
    assert_eq!(stats["classes"], Value::from(3));

    let cleared = run_json(&["--root", &root_arg, "clear"])?;
    assert_eq!(cleared["result"], Value::String("removed".to_string()));
    assert!(!cache.exists());

    let cleared_again = run_json(&["--root", &root_arg, "clear"])?;
    assert_eq!(cleared_again["result"], Value::String("absent".to_string()));

    let _ = std::fs::remove_dir_all(root);
    Ok(())
}

#[test]
fn rebuild_is_the_default_command() -> anyhow::Result<()> {
    let root = temp_dir("default");
    write_file(&root.join("Model.php"), "<?php\nclass Model {}\n")?;
    let root_arg = root.to_string_lossy().to_string();

    let out = run(&["--root", &root_arg, "-f", "text"])?;
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("New class map cache generated at "));
    assert!(stdout.contains("(1 classes)"));

    let _ = std::fs::remove_dir_all(root);
    Ok(())
}

#[test]
fn failures_exit_non_zero() -> anyhow::Result<()> {
    let root = temp_dir("failures");
    write_file(&root.join("A.src"), "class Alpha {}\n")?;
    let root_arg = root.to_string_lossy().to_string();

    run_json(&["--root", &root_arg, "--ext", "src", "rebuild"])?;
    let cache = root.join(".classmapcache");
    let seeded = std::fs::read(&cache)?;

    let out = run(&["--root", &root_arg, "--ext", "src", "--no-rebuild"])?;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Unable to write class map cache"));
    assert_eq!(std::fs::read(&cache)?, seeded);

    write_file(&root.join("D.src"), "class Delta {}\n")?;
    let out = run(&["--root", &root_arg, "--ext", "src", "--no-rebuild", "resolve", "Delta"])?;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("rebuilding is disabled"));
    assert_eq!(std::fs::read(&cache)?, seeded);

    let out = run(&["--root", &root_arg, "--ext", "src", "resolve", " Alpha"])?;
    assert!(!out.status.success());

    let out = run(&["--root", &root_arg, "--ext", "src", "resolve", "Nowhere"])?;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("not found even after rebuilding"));

    let missing = root.join("does-not-exist").to_string_lossy().to_string();
    let out = run(&["--root", &missing, "rebuild"])?;
    assert!(!out.status.success());

    let _ = std::fs::remove_dir_all(root);
    Ok(())
}
