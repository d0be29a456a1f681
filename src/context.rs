//! Per-installation execution context.

use crate::process::{CommandLine, Job, ProcessRunner, SystemRunner};
use crate::{ConsoleSink, Platform, RunnerOptions, Sink};
use semver::Version;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

struct ContextInner {
    root: PathBuf,
    version: Option<String>,
    platform: Platform,
    sink: Arc<dyn Sink>,
    runner: Arc<dyn ProcessRunner>,
    echo_commands: bool,
}

/// Shared, read-only state for one installation run.
///
/// Every step of a pipeline receives the same context: the root working
/// directory, the requested version, the platform tag, the output sink and
/// the process runner. None of these can change after the context is built.
/// Cloning is cheap and yields a handle to the same state, never a
/// divergent copy.
///
/// # Example
///
/// ```rust
/// use install_pipeline::{InstallContext, MemorySink, Platform};
/// use std::sync::Arc;
///
/// let sink = Arc::new(MemorySink::new());
/// let ctx = InstallContext::builder("/opt/tools/node")
///     .version("20.11.1")
///     .platform(Platform::Unix)
///     .sink(sink)
///     .build();
///
/// assert_eq!(ctx.version(), Some("20.11.1"));
/// assert_eq!(ctx.resolve("node.tar.gz"), std::path::Path::new("/opt/tools/node/node.tar.gz"));
/// ```
#[derive(Clone)]
pub struct InstallContext {
    inner: Arc<ContextInner>,
}

impl InstallContext {
    /// Start building a context rooted at `root`.
    pub fn builder(root: impl Into<PathBuf>) -> ContextBuilder {
        ContextBuilder::new(root)
    }

    /// Root working directory. Every process runs here.
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// The requested version, if any.
    pub fn version(&self) -> Option<&str> {
        self.inner.version.as_deref()
    }

    /// The requested version parsed as semver.
    ///
    /// A leading `v` is ignored. Returns `None` when no version was
    /// requested or it is not valid semver (e.g. a branch name).
    pub fn parsed_version(&self) -> Option<Version> {
        let raw = self.version()?;
        Version::parse(raw.trim().trim_start_matches('v')).ok()
    }

    /// Platform the pipeline dispatches on.
    pub fn platform(&self) -> Platform {
        self.inner.platform
    }

    /// Output sink shared by every step.
    pub fn sink(&self) -> &dyn Sink {
        self.inner.sink.as_ref()
    }

    /// Process runner used for every command.
    pub fn runner(&self) -> &Arc<dyn ProcessRunner> {
        &self.inner.runner
    }

    /// Resolve `path` against the root directory. Absolute paths are
    /// returned unchanged.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.inner.root.join(path)
    }

    /// Describe a command to run in this context. Nothing is spawned until
    /// [`Job::run`] is called.
    pub fn command<P, I, S>(&self, program: P, args: I) -> Job
    where
        P: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.job(CommandLine::new(program, args))
    }

    /// Bind a prepared command line to this context.
    pub fn job(&self, command: CommandLine) -> Job {
        Job::new(
            command,
            self.inner.root.clone(),
            Arc::clone(&self.inner.runner),
            Arc::clone(&self.inner.sink),
            self.inner.echo_commands,
        )
    }
}

impl fmt::Debug for InstallContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstallContext")
            .field("root", &self.inner.root)
            .field("version", &self.inner.version)
            .field("platform", &self.inner.platform)
            .finish_non_exhaustive()
    }
}

/// Builder for [`InstallContext`].
///
/// Defaults: platform from [`Platform::current()`], output to
/// [`ConsoleSink`], processes spawned by a [`SystemRunner`] with default
/// [`RunnerOptions`], command lines echoed to the sink.
pub struct ContextBuilder {
    root: PathBuf,
    version: Option<String>,
    platform: Platform,
    sink: Arc<dyn Sink>,
    runner: Arc<dyn ProcessRunner>,
    echo_commands: bool,
}

impl ContextBuilder {
    fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            version: None,
            platform: Platform::current(),
            sink: Arc::new(ConsoleSink),
            runner: Arc::new(SystemRunner::default()),
            echo_commands: true,
        }
    }

    /// Set the requested version.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Override the platform tag (useful for tests and dry runs).
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Set the output sink.
    pub fn sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sink = sink;
        self
    }

    /// Use a custom process runner.
    pub fn runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Use a [`SystemRunner`] configured with `options`.
    pub fn runner_options(self, options: RunnerOptions) -> Self {
        self.runner(Arc::new(SystemRunner::new(options)))
    }

    /// Whether each command line is written to the sink (as `$ cmd args`)
    /// before it runs.
    pub fn echo_commands(mut self, echo: bool) -> Self {
        self.echo_commands = echo;
        self
    }

    /// Finish building.
    pub fn build(self) -> InstallContext {
        tracing::debug!(root = %self.root.display(), version = ?self.version, platform = %self.platform, "Creating install context");
        InstallContext {
            inner: Arc::new(ContextInner {
                root: self.root,
                version: self.version,
                platform: self.platform,
                sink: self.sink,
                runner: self.runner,
                echo_commands: self.echo_commands,
            }),
        }
    }
}
