//! Common installer recipes built from the combinators.
//!
//! These cover the usual building blocks of a tool installation: fetching
//! a file with whichever downloader is present, unpacking archives with
//! whichever extractor is present, checking out a revision from git, and
//! marking a binary executable.

use crate::installer::{
    always_succeed, attempt_commands, chain_commands, create_dir, exec, finally,
    first_successful, on, pipe, remove, when, BoxedInstaller, Branches,
};
use crate::process::CommandLine;

/// Download `url` to `dest` (relative to the context root).
///
/// Unix tries `wget`, then `curl`. Windows tries PowerShell's
/// `Invoke-WebRequest`, then `curl.exe`.
pub fn download(url: &str, dest: &str) -> BoxedInstaller {
    let powershell = format!(
        "$ProgressPreference = 'SilentlyContinue'; Invoke-WebRequest -Uri {} -OutFile {}",
        powershell_quote(url),
        powershell_quote(dest)
    );
    when(Branches::exhaustive(
        attempt_commands([
            CommandLine::new("wget", ["-q", "-O", dest, url]),
            CommandLine::new("curl", ["-fsSL", "-o", dest, url]),
        ]),
        attempt_commands([
            CommandLine::new("powershell", ["-NoProfile", "-Command", powershell.as_str()]),
            CommandLine::new("curl.exe", ["-fsSL", "-o", dest, url]),
        ]),
    ))
}

/// Single-quote `value` as a PowerShell string literal.
fn powershell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Extract with 7-Zip.
pub fn sevenzip_extract(archive: &str, dest: &str) -> BoxedInstaller {
    let out = format!("-o{}", dest);
    exec("7z", ["x", "-y", out.as_str(), archive])
}

/// Extract with PeaZip.
pub fn peazip_extract(archive: &str, dest: &str) -> BoxedInstaller {
    exec("peazip", ["-ext2folder", archive, dest])
}

/// Extract with the WinZip command line add-on.
pub fn winzip_extract(archive: &str, dest: &str) -> BoxedInstaller {
    exec("wzunzip", ["-d", "-o", archive, dest])
}

/// Extract the zip `archive` into `dest`, then delete the archive.
///
/// Windows has no canonical extractor, so 7-Zip, PeaZip and WinZip are
/// tried in that order. The archive is deleted whether or not extraction
/// succeeded, and a failed delete does not fail the recipe.
pub fn unzip(archive: &str, dest: &str) -> BoxedInstaller {
    let extract = when(Branches::exhaustive(
        attempt_commands([
            CommandLine::new("unzip", ["-o", "-q", archive, "-d", dest]),
            CommandLine::new("bsdtar", ["-xf", archive, "-C", dest]),
        ]),
        first_successful([
            sevenzip_extract(archive, dest),
            peazip_extract(archive, dest),
            winzip_extract(archive, dest),
        ]),
    ));
    finally(pipe([create_dir(dest), extract]), always_succeed(remove(archive)))
}

/// Extract a tarball (any compression `tar` detects) into `dest`, then
/// delete it.
pub fn untar(archive: &str, dest: &str) -> BoxedInstaller {
    finally(
        pipe([create_dir(dest), exec("tar", ["-xf", archive, "-C", dest])]),
        always_succeed(remove(archive)),
    )
}

/// Clone `repo` into `dir` and check out `rev`.
///
/// Runs clone, fetch of the requested ref, and checkout as one chain: a
/// failed fetch stops before checkout and nothing is re-cloned.
pub fn git_checkout(repo: &str, rev: &str, dir: &str) -> BoxedInstaller {
    chain_commands([
        CommandLine::new("git", ["clone", "--quiet", repo, dir]),
        CommandLine::new("git", ["-C", dir, "fetch", "--quiet", "origin", rev]),
        CommandLine::new("git", ["-C", dir, "checkout", "--quiet", "FETCH_HEAD"]),
    ])
}

/// Set the executable bit on `path`. No-op where there is no such bit.
pub fn make_executable(path: &str) -> BoxedInstaller {
    on(Branches::new().unix(exec("chmod", ["+x", path])))
}

/// Download `url`, unpack it into `dest` and delete the archive.
pub fn fetch_zip(url: &str, archive: &str, dest: &str) -> BoxedInstaller {
    pipe([download(url, archive), unzip(archive, dest)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::installer::Installer;
    use crate::test_support::ScriptedRunner;
    use crate::{InstallContext, MemorySink, Platform};
    use std::sync::Arc;

    fn context(platform: Platform, runner: Arc<ScriptedRunner>, sink: Arc<MemorySink>) -> InstallContext {
        context_at(std::path::Path::new("/work"), platform, runner, sink)
    }

    fn context_at(
        root: &std::path::Path,
        platform: Platform,
        runner: Arc<ScriptedRunner>,
        sink: Arc<MemorySink>,
    ) -> InstallContext {
        InstallContext::builder(root)
            .platform(platform)
            .runner(runner)
            .sink(sink)
            .build()
    }

    #[tokio::test]
    async fn test_download_falls_back_to_curl() {
        let runner = Arc::new(ScriptedRunner::new().missing("wget").silent());
        let sink = Arc::new(MemorySink::new());
        let ctx = context(Platform::Unix, runner.clone(), sink.clone());

        assert!(download("http://x/f.zip", "a.zip").install(&ctx).await.is_ok());
        assert_eq!(
            runner.invocations(),
            vec![
                "wget -q -O a.zip http://x/f.zip",
                "curl -fsSL -o a.zip http://x/f.zip"
            ]
        );
        assert!(sink.stdout_text().contains("$ curl -fsSL -o a.zip http://x/f.zip"));
        assert!(sink.stderr_text().contains("wget: command not found"));
    }

    #[tokio::test]
    async fn test_download_quotes_powershell_arguments() {
        let runner = Arc::new(ScriptedRunner::new().silent());
        let ctx = context(Platform::Windows, runner.clone(), Arc::new(MemorySink::new()));

        let url = "http://x/it's.zip'; Remove-Item build; '";
        assert!(download(url, "o'brien.zip").install(&ctx).await.is_ok());

        let invocations = runner.invocations();
        assert_eq!(invocations.len(), 1);
        assert!(invocations[0]
            .contains("-Uri 'http://x/it''s.zip''; Remove-Item build; ''' -OutFile 'o''brien.zip'"));
    }

    #[test]
    fn test_powershell_quote() {
        assert_eq!(powershell_quote("plain"), "'plain'");
        assert_eq!(powershell_quote("it's"), "'it''s'");
    }

    #[tokio::test]
    async fn test_fetch_zip_falls_back_to_curl_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.zip"), b"PK").unwrap();
        let runner = Arc::new(ScriptedRunner::new().missing("wget"));
        let sink = Arc::new(MemorySink::new());
        let ctx = InstallContext::builder(dir.path())
            .platform(Platform::Unix)
            .runner(runner.clone())
            .sink(sink.clone())
            .echo_commands(false)
            .build();

        let result = fetch_zip("http://x/f.zip", "a.zip", "dest").install(&ctx).await;

        assert!(result.is_ok());
        assert_eq!(
            sink.stdout_text(),
            "curl -fsSL -o a.zip http://x/f.zip\nunzip -o -q a.zip -d dest\n"
        );
        assert!(!sink.stdout_text().contains("wget"));
        assert!(sink.stderr_text().contains("wget: command not found"));
        assert!(dir.path().join("dest").is_dir());
        assert!(!dir.path().join("a.zip").exists());
    }

    #[tokio::test]
    async fn test_fetch_zip_removes_archive_when_extraction_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.zip"), b"truncated").unwrap();
        let runner = Arc::new(
            ScriptedRunner::new()
                .missing("wget")
                .exit("unzip", 9)
                .missing("bsdtar")
                .silent(),
        );
        let ctx = context_at(dir.path(), Platform::Unix, runner.clone(), Arc::new(MemorySink::new()));

        let result = fetch_zip("http://x/f.zip", "a.zip", "dest").install(&ctx).await;

        assert!(matches!(
            result,
            Err(crate::InstallError::AllCandidatesFailed { attempted: 2, .. })
        ));
        assert_eq!(
            runner.invocations(),
            vec![
                "wget -q -O a.zip http://x/f.zip",
                "curl -fsSL -o a.zip http://x/f.zip",
                "unzip -o -q a.zip -d dest",
                "bsdtar -xf a.zip -C dest"
            ]
        );
        assert!(!dir.path().join("a.zip").exists());
    }

    #[tokio::test]
    async fn test_windows_unzip_uses_first_available_extractor() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.zip"), b"PK").unwrap();
        let runner = Arc::new(ScriptedRunner::new().missing("7z").silent());
        let ctx = context_at(dir.path(), Platform::Windows, runner.clone(), Arc::new(MemorySink::new()));

        assert!(unzip("a.zip", "dest").install(&ctx).await.is_ok());
        assert!(dir.path().join("dest").is_dir());
        assert!(!dir.path().join("a.zip").exists());
        assert_eq!(
            runner.invocations(),
            vec!["7z x -y -odest a.zip", "peazip -ext2folder a.zip dest"]
        );
    }

    #[tokio::test]
    async fn test_unzip_deletes_archive_after_failed_extraction() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.zip"), b"not a zip").unwrap();
        let runner = Arc::new(ScriptedRunner::new().exit("unzip", 9).missing("bsdtar").silent());
        let ctx = context_at(dir.path(), Platform::Unix, runner, Arc::new(MemorySink::new()));

        assert!(unzip("a.zip", "dest").install(&ctx).await.is_err());
        assert!(!dir.path().join("a.zip").exists());
    }

    #[tokio::test]
    async fn test_git_checkout_stops_after_failed_fetch() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .exit_for("git -C src fetch --quiet origin v9.9.9", 128)
                .silent(),
        );
        let ctx = context(Platform::Unix, runner.clone(), Arc::new(MemorySink::new()));

        let result = git_checkout("https://example.com/r.git", "v9.9.9", "src")
            .install(&ctx)
            .await;
        assert!(result.is_err());
        assert_eq!(runner.invocations().len(), 2);
    }

    #[tokio::test]
    async fn test_make_executable_is_noop_on_windows() {
        let runner = Arc::new(ScriptedRunner::new().silent());
        let ctx = context(Platform::Windows, runner.clone(), Arc::new(MemorySink::new()));
        assert!(make_executable("bin/tool").install(&ctx).await.is_ok());
        assert!(runner.invocations().is_empty());

        let ctx = context(Platform::Unix, runner.clone(), Arc::new(MemorySink::new()));
        assert!(make_executable("bin/tool").install(&ctx).await.is_ok());
        assert_eq!(runner.invocations(), vec!["chmod +x bin/tool"]);
    }
}
