use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// A command isolated from the caller's allow-list, identity and configuration files.
fn certgen(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("certgen");
    cmd.current_dir(dir)
        .env_remove("ALLOWED_USERS")
        .env_remove("CERTGEN_USER")
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir);
    cmd
}

#[test]
fn test_unlisted_user_is_denied() {
    let dir = tempdir().unwrap();
    certgen(dir.path())
        .args(["--user", "eve@acme.test", "--allowed-users", "alice@acme.test"])
        .args(["--name", "Bharti Kumari", "--course", "ADCA|12/06/2024|31/12/2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Access Denied"));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_missing_user_fails() {
    let dir = tempdir().unwrap();
    certgen(dir.path())
        .args(["--allowed-users", "alice@acme.test", "--sample", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CERTGEN_USER"));
}

#[test]
fn test_allow_list_from_environment() {
    let dir = tempdir().unwrap();
    certgen(dir.path())
        .env("ALLOWED_USERS", " Alice@Acme.test , ops@acme.test")
        .env("CERTGEN_USER", "alice@acme.test")
        .args(["--sample", "1", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome, alice@acme.test"))
        .stdout(predicate::str::contains("Dry-run complete"));
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = tempdir().unwrap();
    certgen(dir.path())
        .args(["--user", "alice@acme.test", "--allowed-users", "alice@acme.test"])
        .args(["--display-name", "Alice", "--sample", "0", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Welcome, Alice"))
        .stdout(predicate::str::contains("logo"));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_exports_every_requested_format() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out");
    certgen(dir.path())
        .args(["--user", "alice@acme.test", "--allowed-users", "alice@acme.test"])
        .args(["--kind", "internship", "--name", "Asha  Singh", "--department", "Web Development"])
        .args(["--start", "01/02/2025", "--end", "30/04/2025"])
        .args(["-f", "pdf", "-f", "png", "-f", "jpg", "-o"])
        .arg(&out)
        .assert()
        .success();

    let pdf = fs::read(out.join("certificate-Asha-Singh.pdf")).unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    let png = fs::read(out.join("certificate-Asha-Singh.png")).unwrap();
    assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
    let jpg = fs::read(out.join("certificate-Asha-Singh.jpg")).unwrap();
    assert!(jpg.starts_with(&[0xFF, 0xD8]));
}

#[test]
fn test_request_file_and_local_config() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("certgen.toml"),
        "[access]\nallowed_users = [\"hr@acme.test\"]\n\n[assets]\nlogo = \"\"\nsignature_font = \"\"\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("request.toml"),
        "kind = \"experience\"\nname = \"Ravi Verma\"\ndesignation = \"Software Engineer\"\n\
         start = \"01/01/2023\"\nend = \"31/12/2024\"\n",
    )
    .unwrap();

    certgen(dir.path())
        .args(["--user", "hr@acme.test", "--request", "request.toml", "-f", "pdf", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(dir.path().join("certificate-Ravi-Verma.pdf").exists());
}

#[test]
fn test_missing_required_field_is_reported() {
    let dir = tempdir().unwrap();
    certgen(dir.path())
        .args(["--user", "alice@acme.test", "--allowed-users", "alice@acme.test"])
        .args(["--kind", "experience", "--name", "Ravi Verma"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Designation"));
}

#[test]
fn test_get_default_configuration_parses_back() {
    let dir = tempdir().unwrap();
    let output = certgen(dir.path())
        .arg("--get-default-configuration")
        .output()
        .unwrap();
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    let parsed = certgen::config::parse_config_string(&text);
    assert_eq!(parsed, certgen::config::CertgenConfig::default());
}

#[test]
fn test_list_designs() {
    let dir = tempdir().unwrap();
    certgen(dir.path())
        .arg("--list-designs")
        .assert()
        .success()
        .stdout(predicate::str::contains("classic").and(predicate::str::contains("modern")));
}
