use std::path::Path;

use clap::Parser;
use tempdir::TempDir;
use viagen::{generate, magic_shell_script, Args, Outcome};
use viastack::error::ErrorSource;

fn args(dest: &Path, extra: &[&str]) -> Args {
    let dest = dest.to_string_lossy().to_string();
    let mut argv = vec!["viagen", "-s", "1", "-e", "3", "-W", "200", "-H", "60", "--dest"];
    argv.push(&dest);
    argv.extend_from_slice(extra);
    Args::parse_from(argv)
}

#[test]
fn test_dry_run_does_not_write() {
    let dir = TempDir::new("viagen").unwrap();
    let dest = dir.path().join("out");
    let outcome = generate(&args(&dest, &["--dry-run"])).unwrap();

    assert!(matches!(outcome, Outcome::Printed(_)));
    assert_eq!(outcome.artifact().file_name(), "viaM1M3W200H60.mag");
    assert!(!dest.exists());
}

#[test]
fn test_writes_once() {
    let dir = TempDir::new("viagen").unwrap();
    let args = args(dir.path(), &["--encoding", "script"]);

    let outcome = generate(&args).unwrap();
    let Outcome::Written { artifact, path } = outcome else {
        panic!("expected the artifact to be written");
    };
    assert_eq!(path, dir.path().join("viaM1M3W200H60.tcl"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), artifact.contents());

    let err = generate(&args).unwrap_err();
    assert!(matches!(err.source(), ErrorSource::AlreadyExists(p) if *p == path));
}

#[test]
fn test_rejects_bad_input() {
    let dir = TempDir::new("viagen").unwrap();

    let mut bad_width = args(dir.path(), &[]);
    bad_width.width = "abc".to_string();
    let err = generate(&bad_width).unwrap_err();
    assert!(matches!(err.source(), ErrorSource::InvalidDimensions(_)));

    let err = generate(&args(dir.path(), &["--encoding", "gds"])).unwrap_err();
    assert!(matches!(err.source(), ErrorSource::UnsupportedEncoding(e) if e == "gds"));

    let mut reversed = args(dir.path(), &[]);
    reversed.start = 3;
    reversed.end = 1;
    let err = generate(&reversed).unwrap_err();
    assert!(matches!(
        err.source(),
        ErrorSource::InvalidLayerRange { start: 3, end: 1 }
    ));

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_run_magic_preconditions() {
    let dir = TempDir::new("viagen").unwrap();

    let err = generate(&args(dir.path(), &["--run-magic"])).unwrap_err();
    assert!(matches!(err.source(), ErrorSource::InvalidArgs(_)));

    let magicrc = dir.path().join("missing.magicrc");
    let magicrc = magicrc.to_string_lossy();
    let err = generate(&args(
        dir.path(),
        &["--run-magic", "--encoding", "script", "--magicrc", &magicrc],
    ))
    .unwrap_err();
    assert!(matches!(err.source(), ErrorSource::MissingFile(_)));
}

#[test]
fn test_magic_shell_script() {
    let dir = TempDir::new("viagen").unwrap();
    let outcome = generate(&args(dir.path(), &["--dry-run", "--encoding", "script"])).unwrap();
    let artifact = outcome.artifact();

    let script = magic_shell_script(
        artifact,
        Path::new("/out/viaM1M3W200H60.mag"),
        Path::new("magic"),
        Path::new("/pdk/.magicrc"),
    );
    assert_eq!(script[0], "#!/bin/sh");
    assert_eq!(script[1], "magic -dnull -noconsole -rcfile /pdk/.magicrc << EOF");
    assert_eq!(&script[2..2 + artifact.body.len()], artifact.body.as_slice());
    assert_eq!(
        &script[script.len() - 3..],
        ["save /out/viaM1M3W200H60.mag", "quit -noprompt", "EOF"]
    );
}

#[test]
fn test_custom_rules() {
    let dir = TempDir::new("viagen").unwrap();
    let rules = dir.path().join("rules.toml");
    std::fs::write(
        &rules,
        "[[rules]]\nvia = 1\nsize = 10\npitch = 20\nborder = 2\n",
    )
    .unwrap();
    let rules = rules.to_string_lossy();

    let mut args = args(dir.path(), &["--dry-run", "--rules", &rules]);
    args.end = 2;
    args.width = "10".to_string();
    args.height = "10".to_string();
    let outcome = generate(&args).unwrap();
    // Two vias need 2 * 10 + 20 + 2 * 2 = 44.
    assert_eq!(outcome.artifact().name, "viaM1M2W14H44");

    args.end = 3;
    let err = generate(&args).unwrap_err();
    assert!(matches!(err.source(), ErrorSource::UnknownLayer(3)));
}
