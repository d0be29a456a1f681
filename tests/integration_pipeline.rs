//! Integration tests running pipelines against real processes.
//!
//! These rely only on a POSIX shell and `tar`, so they are Unix-only.

#![cfg(unix)]

use install_pipeline::recipes::untar;
use install_pipeline::{
    always_succeed, attempt, attempt_commands, exec, install, on, pipe, remove, Branches, Chain,
    CommandLine, InstallContext, InstallError, MemorySink, Platform, RunnerOptions,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const MISSING_TOOL: &str = "install-pipeline-no-such-tool";

fn context(root: &Path, sink: Arc<MemorySink>) -> InstallContext {
    InstallContext::builder(root)
        .platform(Platform::Unix)
        .sink(sink)
        .echo_commands(false)
        .build()
}

fn sh(script: &str) -> install_pipeline::BoxedInstaller {
    exec("sh", ["-c", script])
}

#[tokio::test]
async fn test_pipe_streams_output_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(MemorySink::new());
    let ctx = context(dir.path(), sink.clone());

    let installer = pipe(vec![
        sh("echo one"),
        sh("echo two; echo warn >&2"),
        sh("echo three"),
    ]);
    assert!(install(&installer, &ctx).await.is_ok());

    assert_eq!(sink.stdout_text(), "one\ntwo\nthree\n");
    assert_eq!(sink.stderr_text(), "warn\n");
}

#[tokio::test]
async fn test_pipe_stops_after_failing_process() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(MemorySink::new());
    let ctx = context(dir.path(), sink.clone());

    let installer = pipe(vec![sh("echo before"), sh("exit 3"), sh("echo after")]);
    let result = install(&installer, &ctx).await;

    assert_eq!(
        result,
        Err(InstallError::NonZeroExit {
            program: "sh".to_string(),
            code: 3
        })
    );
    assert!(sink.contains("before"));
    assert!(!sink.contains("after"));
}

#[tokio::test]
async fn test_processes_run_in_context_root() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(MemorySink::new());
    let ctx = context(dir.path(), sink.clone());

    assert!(install(&sh("touch marker"), &ctx).await.is_ok());
    assert!(dir.path().join("marker").exists());
}

#[tokio::test]
async fn test_attempt_falls_back_from_missing_tool() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(MemorySink::new());
    let ctx = context(dir.path(), sink.clone());

    let installer = attempt_commands([
        CommandLine::new(MISSING_TOOL, ["--version"]),
        CommandLine::new("sh", ["-c", "echo fallback"]),
    ]);
    assert!(install(&installer, &ctx).await.is_ok());
    assert!(sink.stderr_text().contains("command not found"));
    assert_eq!(sink.stdout_text(), "fallback\n");
}

#[tokio::test]
async fn test_attempt_reports_tool_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(dir.path(), Arc::new(MemorySink::new()));

    let result = attempt(vec![ctx.command(MISSING_TOOL, ["x"])]).await;
    match result {
        Err(InstallError::AllCandidatesFailed { attempted, last }) => {
            assert_eq!(attempted, 1);
            assert!(last.unwrap().is_tool_unavailable());
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_chain_with_real_processes() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(MemorySink::new());
    let ctx = context(dir.path(), sink.clone());

    let mut chain = Chain::new(&ctx);
    chain
        .run("sh", ["-c", "echo a > file"])
        .run("sh", ["-c", "cat file"])
        .run("false", Vec::<String>::new())
        .run("sh", ["-c", "echo unreachable"]);

    assert!(chain.execute().await.is_err());
    assert_eq!(sink.stdout_text(), "a\n");
}

#[tokio::test]
async fn test_always_succeed_cleanup_of_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.zip"), b"PK").unwrap();
    let sink = Arc::new(MemorySink::new());
    let ctx = context(dir.path(), sink.clone());

    let installer = pipe(vec![
        always_succeed(remove("a.zip")),
        always_succeed(remove("a.zip")),
        sh("echo done"),
    ]);
    assert!(install(&installer, &ctx).await.is_ok());
    assert!(!dir.path().join("a.zip").exists());
    assert!(sink.stderr_text().contains("remove failed"));
    assert!(sink.contains("done"));
}

#[tokio::test]
async fn test_on_skips_unix_only_step_on_windows() {
    let dir = tempfile::tempdir().unwrap();
    let sink = Arc::new(MemorySink::new());
    let ctx = InstallContext::builder(dir.path())
        .platform(Platform::Windows)
        .sink(sink.clone())
        .build();

    let installer = on(Branches::new().unix(sh("touch chmodded")));
    assert!(install(&installer, &ctx).await.is_ok());
    assert!(!dir.path().join("chmodded").exists());
    assert!(sink.lines().is_empty());
}

#[tokio::test]
async fn test_untar_extracts_and_deletes_archive() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("payload.txt"), b"hello").unwrap();
    let ctx = context(dir.path(), Arc::new(MemorySink::new()));

    let installer = pipe(vec![
        exec("tar", ["-cf", "payload.tar", "payload.txt"]),
        remove("payload.txt"),
        untar("payload.tar", "dest"),
    ]);
    assert!(install(&installer, &ctx).await.is_ok());

    assert_eq!(
        std::fs::read_to_string(dir.path().join("dest/payload.txt")).unwrap(),
        "hello"
    );
    assert!(!dir.path().join("payload.tar").exists());
}

#[tokio::test]
async fn test_untar_deletes_archive_even_when_extraction_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("broken.tar"), b"not a tarball").unwrap();
    let ctx = context(dir.path(), Arc::new(MemorySink::new()));

    let result = install(&untar("broken.tar", "dest"), &ctx).await;
    assert!(matches!(result, Err(InstallError::NonZeroExit { .. })));
    assert!(!dir.path().join("broken.tar").exists());
}

#[tokio::test]
async fn test_runner_timeout_kills_process() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = InstallContext::builder(dir.path())
        .platform(Platform::Unix)
        .sink(Arc::new(MemorySink::new()))
        .runner_options(RunnerOptions::with_timeout(Duration::from_millis(200)))
        .build();

    let result = install(&sh("sleep 5"), &ctx).await;
    assert!(matches!(result, Err(InstallError::Timeout { .. })));
}
