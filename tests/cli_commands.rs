#![expect(clippy::expect_used, reason = "test assertions")]

//! End-to-end tests of the command handlers over a temporary data directory.

use std::time::Duration;

use anyhow::Result;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use cli_defs::Cli;
use rstest::{fixture, rstest};
use tempfile::TempDir;
use tokio::io::{AsyncBufRead, AsyncWriteExt, BufReader};
use turnstile::app::dispatch;

struct Workspace {
    _tmp: TempDir,
    dir: Utf8PathBuf,
}

impl Workspace {
    fn data_dir(&self) -> Utf8PathBuf { self.dir.join("store") }

    async fn run_with_reader<R>(&self, args: &[&str], delay_ms: &str, input: &mut R) -> Result<String>
    where
        R: AsyncBufRead + Unpin,
    {
        let data_dir = self.data_dir();
        let mut argv = vec!["turnstile", "--data-dir", data_dir.as_str(), "--verify-delay-ms", delay_ms];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv)?;
        let mut out = Vec::new();
        dispatch(cli, input, &mut out).await?;
        Ok(String::from_utf8(out)?)
    }

    async fn run_with_input(&self, args: &[&str], input: &str) -> Result<String> {
        let mut reader = input.as_bytes();
        self.run_with_reader(args, "0", &mut reader).await
    }

    async fn run(&self, args: &[&str]) -> Result<String> { self.run_with_input(args, "").await }

    fn path(&self, name: &str) -> Utf8PathBuf { self.dir.join(name) }
}

#[fixture]
fn ws() -> Workspace {
    let tmp = tempfile::tempdir().expect("tempdir");
    let dir = Utf8Path::from_path(tmp.path()).expect("utf8 temp path").to_owned();
    Workspace { _tmp: tmp, dir }
}

#[rstest]
#[tokio::test]
async fn operator_verifies_and_sees_recent(ws: Workspace) {
    ws.run(&["login", "operator"]).await.expect("login");

    let allowed = ws.run(&["verify", "u001"]).await.expect("verify");
    assert_eq!(allowed.trim(), "ALLOWED Ana (U001, Student)");

    let denied = ws.run(&["verify", "ZZZZ"]).await.expect("verify");
    assert_eq!(denied.trim(), "DENIED Unknown user (ZZZZ)");

    let recent = ws.run(&["recent", "--limit", "2"]).await.expect("recent");
    let lines: Vec<_> = recent.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.first().is_some_and(|l| l.contains("ZZZZ") && l.ends_with("Denied")));
    assert!(lines.get(1).is_some_and(|l| l.contains("U001") && l.ends_with("Allowed")));
}

#[rstest]
#[tokio::test]
async fn empty_code_is_recorded_as_unknown(ws: Workspace) {
    ws.run(&["login", "operator"]).await.expect("login");
    let out = ws.run(&["verify", "   "]).await.expect("verify");
    assert_eq!(out.trim(), "DENIED Unknown user (UNKNOWN)");
}

#[rstest]
#[tokio::test]
async fn console_reads_codes_until_quit(ws: Workspace) {
    ws.run(&["login", "operator"]).await.expect("login");
    let out = ws
        .run_with_input(&["console"], "\nu001\n\nquit\nU003\n")
        .await
        .expect("console");
    let outcomes: Vec<_> = out.lines().skip(1).collect();
    assert_eq!(outcomes, ["ALLOWED Ana (U001, Student)"]);
}

#[rstest]
#[tokio::test]
async fn console_rejects_codes_while_waiting(ws: Workspace) {
    ws.run(&["login", "operator"]).await.expect("login");
    let (mut writer, reader) = tokio::io::duplex(64);
    let mut input = BufReader::new(reader);
    let typing = async move {
        writer.write_all(b"U001\n").await.expect("type first code");
        tokio::time::sleep(Duration::from_millis(100)).await;
        writer.write_all(b"U002\n").await.expect("type second code");
    };

    let (out, ()) = tokio::join!(ws.run_with_reader(&["console"], "400", &mut input), typing);
    let transcript = out.expect("console");
    let outcomes: Vec<_> = transcript.lines().skip(1).collect();
    assert_eq!(
        outcomes,
        [
            "a verification is already in progress; try again",
            "ALLOWED Ana (U001, Student)"
        ]
    );

    let recent = ws.run(&["recent", "--limit", "2"]).await.expect("recent");
    assert!(!recent.lines().any(|l| l.contains("U002") && l.ends_with("Denied")), "{recent}");
}

#[rstest]
#[case(&["verify", "U001"], "requires an operator session")]
#[case(&["users", "list"], "requires an admin session")]
#[case(&["reports"], "requires an admin session")]
#[tokio::test]
async fn commands_are_role_gated(ws: Workspace, #[case] args: &[&str], #[case] message: &str) {
    let anonymous = ws.run(args).await.expect_err("no session");
    assert!(anonymous.to_string().contains(message), "{anonymous}");

    let other = if message.contains("admin") { "operator" } else { "admin" };
    ws.run(&["login", other]).await.expect("login");
    let wrong_role = ws.run(args).await.expect_err("wrong role");
    assert!(wrong_role.to_string().contains(message), "{wrong_role}");
}

#[rstest]
#[tokio::test]
async fn whoami_follows_login_and_logout(ws: Workspace) {
    assert_eq!(ws.run(&["whoami"]).await.expect("whoami").trim(), "not logged in");
    ws.run(&["login", "admin"]).await.expect("login");
    assert_eq!(
        ws.run(&["whoami"]).await.expect("whoami").trim(),
        "Administrator (admin.utb, admin)"
    );
    ws.run(&["logout"]).await.expect("logout");
    assert_eq!(ws.run(&["whoami"]).await.expect("whoami").trim(), "not logged in");
}

#[rstest]
#[case("/", "redirect /admin")]
#[case("/admin", "redirect /admin/users")]
#[case("/admin/reports", "render admin Reports")]
#[case("/operator", "redirect /login")]
#[tokio::test]
async fn route_uses_stored_session(ws: Workspace, #[case] path: &str, #[case] expected: &str) {
    ws.run(&["login", "admin"]).await.expect("login");
    assert_eq!(ws.run(&["route", path]).await.expect("route").trim(), expected);
}

#[rstest]
#[tokio::test]
async fn admin_manages_users(ws: Workspace) {
    ws.run(&["login", "admin"]).await.expect("login");

    let added = ws
        .run(&["users", "add", "N1", "Nora Díaz", "--role", "teacher"])
        .await
        .expect("add");
    assert_eq!(added.trim(), "added Nora Díaz (N1)");

    let duplicate = ws.run(&["users", "add", "n1", "Other"]).await.expect_err("duplicate");
    assert!(duplicate.to_string().contains("already exists"), "{duplicate}");

    let blank = ws.run(&["users", "add", "N2", "  "]).await.expect_err("blank name");
    assert!(blank.to_string().contains("name must not be empty"), "{blank}");

    ws.run(&["users", "edit", "n1", "--status", "inactive"])
        .await
        .expect("edit");
    let edited = ws.run(&["users", "list"]).await.expect("list");
    let first = edited.lines().next().expect("a row");
    assert!(first.starts_with("N1"));
    assert!(first.contains("Teacher") && first.contains("Inactive"));
    assert!(edited.trim_end().ends_with("9 users"));

    ws.run(&["users", "remove", "N1", "--yes"]).await.expect("remove");
    let remaining = ws.run(&["users", "list"]).await.expect("list");
    assert!(!remaining.lines().any(|l| l.starts_with("N1 ")));
}

#[rstest]
#[case("n\n", true)]
#[case("", true)]
#[case("yes\n", false)]
#[tokio::test]
async fn remove_asks_for_confirmation(ws: Workspace, #[case] answer: &str, #[case] kept: bool) {
    ws.run(&["login", "admin"]).await.expect("login");
    let out = ws
        .run_with_input(&["users", "remove", "U003"], answer)
        .await
        .expect("remove");
    assert!(out.starts_with("remove María Gómez (U003)? [y/N]"));
    let list = ws.run(&["users", "list"]).await.expect("list");
    assert_eq!(list.lines().any(|l| l.starts_with("U003")), kept);
}

#[rstest]
#[tokio::test]
async fn accesses_filter_and_export(ws: Workspace) {
    ws.run(&["login", "admin"]).await.expect("login");
    let export = ws.path("accesses.csv");
    let out = ws
        .run(&[
            "accesses",
            "--query",
            "ana",
            "--result",
            "allowed",
            "--from",
            "2025-10-19",
            "--to",
            "2025-10-20",
            "--export",
            export.as_str(),
        ])
        .await
        .expect("accesses");
    assert!(out.contains("2 of 10 records"), "{out}");

    let csv = std::fs::read_to_string(&export).expect("read export");
    assert_eq!(
        csv,
        "\"User ID\",\"Name\",\"Role\",\"Date\",\"Result\"\n\
         \"U001\",\"Ana\",\"Student\",\"2025-10-20 12:15:00\",\"Allowed\"\n\
         \"U001\",\"Ana\",\"Student\",\"2025-10-20 07:30:00\",\"Allowed\""
    );
}

#[rstest]
#[tokio::test]
async fn accesses_rejects_malformed_dates(ws: Workspace) {
    ws.run(&["login", "admin"]).await.expect("login");
    let err = ws
        .run(&["accesses", "--from", "20/10/2025"])
        .await
        .expect_err("bad date");
    assert!(format!("{err:#}").contains("--from"), "{err:#}");
}

#[rstest]
#[tokio::test]
async fn reports_summarise_and_export(ws: Workspace) {
    ws.run(&["login", "admin"]).await.expect("login");
    let export = ws.path("report_summary.csv");
    let out = ws
        .run(&["reports", "--export", export.as_str()])
        .await
        .expect("reports");
    assert!(out.contains("Allowed 7  Denied 3  Total 10"), "{out}");
    assert!(out.contains("1. Ana (3)"), "{out}");
    assert!(out.contains("2025-10-21  3"), "{out}");
    assert!(out.contains("2025-10-18  2"), "{out}");

    let csv = std::fs::read_to_string(&export).expect("read export");
    assert_eq!(csv, "\"Type\",\"Value\"\n\"Allowed\",\"7\"\n\"Denied\",\"3\"");
}

#[rstest]
#[tokio::test]
async fn settings_are_validated_and_persisted(ws: Workspace) {
    ws.run(&["login", "admin"]).await.expect("login");
    let defaults = ws.run(&["settings", "show"]).await.expect("show");
    assert!(defaults.contains("manual override: off"));
    assert!(defaults.contains("allowed window: 07:00 - 19:00"));

    let err = ws
        .run(&["settings", "set", "--start", "7am"])
        .await
        .expect_err("invalid time");
    assert!(err.to_string().contains("start"), "{err}");

    ws.run(&["settings", "set", "--manual-override", "true", "--end", "21:30"])
        .await
        .expect("set");
    let changed = ws.run(&["settings", "show"]).await.expect("show");
    assert!(changed.contains("manual override: on"));
    assert!(changed.contains("allowed window: 07:00 - 21:30"));

    let raw = std::fs::read_to_string(ws.data_dir().join("st_end_time")).expect("raw key");
    assert_eq!(raw, "21:30");
}
