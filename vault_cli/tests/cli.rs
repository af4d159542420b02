use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use vault_test_utils::MockVaultServer;

const VAULT_ENV: &[&str] = &[
    "VAULT_ADDR",
    "VAULT_TOKEN",
    "VAULT_NAMESPACE",
    "VAULT_CLIENT_TIMEOUT",
    "VAULT_CACERT",
    "VAULT_CAPATH",
    "VAULT_CLIENT_CERT",
    "VAULT_CLIENT_KEY",
    "VAULT_SKIP_VERIFY",
    "VAULT_LOG",
    "RUST_LOG",
];

/// `vault` with an empty home directory and no inherited Vault settings
fn vault(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("vault").unwrap();
    for var in VAULT_ENV {
        cmd.env_remove(var);
    }
    cmd.env("HOME", home.path())
        .env("VAULT_CONFIG_PATH", home.path().join("config.toml"))
        .env("NO_COLOR", "1");
    cmd
}

fn unused_address() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    format!("http://{}", listener.local_addr().unwrap())
}

#[test]
fn test_version() {
    let home = TempDir::new().unwrap();
    vault(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_rotate_help_lists_connection_flags() {
    let home = TempDir::new().unwrap();
    vault(&home)
        .args(["rotate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--address"))
        .stdout(predicate::str::contains("--tls-skip-verify"));
}

#[test]
fn test_positional_argument_is_a_usage_error() {
    let home = TempDir::new().unwrap();
    vault(&home)
        .args(["rotate", "extra"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr("Too many arguments (expected 0, got 1)\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_flag_is_a_usage_error_without_requests() {
    let server = MockVaultServer::start().await.unwrap();
    server.accept_rotation();
    server.report_key_status(3, "2024-06-01T09:30:00Z");

    let home = TempDir::new().unwrap();
    let mut cmd = vault(&home);
    cmd.args([
        "rotate",
        "--address",
        &server.address(),
        "--token",
        "s.e2e",
        "--bogus",
    ]);

    tokio::task::spawn_blocking(move || {
        cmd.assert()
            .code(1)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("--bogus"));
    })
    .await
    .unwrap();

    assert!(server.requests().is_empty());
}

#[test]
fn test_token_unusable_as_header_is_a_configuration_error() {
    let home = TempDir::new().unwrap();
    vault(&home)
        .args([
            "rotate",
            "--address",
            &unused_address(),
            "--token",
            "s.bad\u{1}token",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("token contains characters"))
        .stderr(predicate::str::contains("Error rotating key").not());
}

#[test]
fn test_error_line_is_plain_when_stderr_is_redirected() {
    let home = TempDir::new().unwrap();
    vault(&home)
        .env_remove("NO_COLOR")
        .env("CLICOLOR_FORCE", "1")
        .env("TERM", "xterm-256color")
        .args(["rotate", "--address", &unused_address(), "--token", "s.test"])
        .assert()
        .code(2)
        .stderr(predicate::str::starts_with("Error rotating key: "))
        .stderr(predicate::str::contains("\u{1b}").not());
}

#[test]
fn test_unreachable_server_is_a_runtime_error() {
    let home = TempDir::new().unwrap();
    vault(&home)
        .args(["rotate", "--address", &unused_address(), "--token", "s.test"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::starts_with("Error rotating key: "));
}

#[test]
fn test_missing_token_is_a_runtime_error() {
    let home = TempDir::new().unwrap();
    vault(&home)
        .args(["rotate", "--address", &unused_address()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No Vault token found"))
        .stderr(predicate::str::contains("Error rotating key").not());
}

#[test]
fn test_invalid_address_is_a_runtime_error() {
    let home = TempDir::new().unwrap();
    vault(&home)
        .args(["rotate", "--address", "vault.example.com", "--token", "s.test"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid Vault address"));
}

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();
    vault(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rotate"))
        .stdout(predicate::str::contains("--tls-skip-verify"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rotate_against_server() {
    let server = MockVaultServer::start().await.unwrap();
    server.accept_rotation();
    server.report_key_status(4, "2024-06-01T09:30:00Z");

    let home = TempDir::new().unwrap();
    let mut cmd = vault(&home);
    cmd.args(["rotate", "--address", &server.address(), "--token", "s.e2e"]);

    tokio::task::spawn_blocking(move || {
        cmd.assert()
            .success()
            .stdout(predicate::str::starts_with("Success! Rotated key\n\n"))
            .stdout(predicate::str::contains("Key Term"))
            .stdout(predicate::str::contains("4"))
            .stdout(predicate::str::contains("2024-06-01T09:30:00Z"));
    })
    .await
    .unwrap();

    let requests = server.requests();
    let calls: Vec<(&str, &str)> = requests
        .iter()
        .map(|r| (r.method.as_str(), r.path.as_str()))
        .collect();
    assert_eq!(
        calls,
        vec![("PUT", "/v1/sys/rotate"), ("GET", "/v1/sys/key-status")]
    );
    assert!(requests.iter().all(|r| r.header("x-vault-token") == Some("s.e2e")));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_token_and_address_from_environment() {
    let server = MockVaultServer::start().await.unwrap();
    server.accept_rotation();
    server.report_key_status(9, "2024-06-01T09:30:00Z");

    let home = TempDir::new().unwrap();
    let mut cmd = vault(&home);
    cmd.arg("rotate")
        .env("VAULT_ADDR", server.address())
        .env("VAULT_TOKEN", "s.env")
        .env("VAULT_NAMESPACE", "team-a");

    tokio::task::spawn_blocking(move || {
        cmd.assert().success();
    })
    .await
    .unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].header("x-vault-token"), Some("s.env"));
    assert_eq!(requests[0].header("x-vault-namespace"), Some("team-a"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_token_file_fallback() {
    let server = MockVaultServer::start().await.unwrap();
    server.accept_rotation();
    server.report_key_status(2, "2024-06-01T09:30:00Z");

    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join(".vault-token"), "s.from-file\n").unwrap();
    let mut cmd = vault(&home);
    cmd.args(["rotate", "--address", &server.address()]);

    tokio::task::spawn_blocking(move || {
        cmd.assert().success();
    })
    .await
    .unwrap();

    assert_eq!(
        server.requests()[0].header("x-vault-token"),
        Some("s.from-file")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rotate_rejected_by_server() {
    let server = MockVaultServer::start().await.unwrap();
    server.respond(
        "PUT",
        "/v1/sys/rotate",
        403,
        r#"{"errors": ["permission denied"]}"#,
    );

    let home = TempDir::new().unwrap();
    let mut cmd = vault(&home);
    cmd.args(["rotate", "--address", &server.address(), "--token", "s.e2e"]);

    tokio::task::spawn_blocking(move || {
        cmd.assert()
            .code(2)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::starts_with("Error rotating key: "))
            .stderr(predicate::str::contains("permission denied"));
    })
    .await
    .unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/v1/sys/rotate");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_key_status_failure_after_rotation() {
    let server = MockVaultServer::start().await.unwrap();
    server.accept_rotation();
    server.respond(
        "GET",
        "/v1/sys/key-status",
        500,
        r#"{"errors": ["internal error"]}"#,
    );

    let home = TempDir::new().unwrap();
    let mut cmd = vault(&home);
    cmd.args(["rotate", "--address", &server.address(), "--token", "s.e2e"]);

    tokio::task::spawn_blocking(move || {
        cmd.assert()
            .code(2)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::starts_with("Error reading key status: "))
            .stderr(predicate::str::contains("key was rotated"));
    })
    .await
    .unwrap();

    let rotations = server
        .requests()
        .iter()
        .filter(|r| r.path == "/v1/sys/rotate")
        .count();
    assert_eq!(rotations, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_config_file_supplies_connection_settings() {
    let server = MockVaultServer::start().await.unwrap();
    server.accept_rotation();
    server.report_key_status(5, "2024-06-01T09:30:00Z");

    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("config.toml"),
        format!(
            "[client]\naddress = \"{}\"\ntoken = \"s.config\"\n",
            server.address()
        ),
    )
    .unwrap();
    let mut cmd = vault(&home);
    cmd.arg("rotate");

    tokio::task::spawn_blocking(move || {
        cmd.assert().success();
    })
    .await
    .unwrap();

    assert_eq!(
        server.requests()[0].header("x-vault-token"),
        Some("s.config")
    );
}
