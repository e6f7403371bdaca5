//! The handle through which every fetch strategy is invoked.

use crate::cancellation::CancellationToken;
use crate::errors::{Error, Result};
use crate::git::{ClientConfig, HttpTransport, Transport};
use crate::progress::ProgressReporter;
use std::sync::Arc;

/// Bundles the immutable client configuration with the transport, the
/// cancellation token and an optional progress reporter.
///
/// The fetch operations themselves live next to their strategies:
/// [`Fetcher::fetch_tree_recursive`], [`Fetcher::fetch_archive_subtree`],
/// [`Fetcher::fetch_release_asset`] and [`Fetcher::fetch_mod`].
///
/// # Examples
/// ```no_run
/// use modfetch::{ClientConfig, Fetcher};
/// use std::path::Path;
///
/// # fn main() -> modfetch::Result<()> {
/// let fetcher = Fetcher::new(ClientConfig::default())?;
/// let fetched = fetcher.fetch_archive_subtree(
///     "https://github.com/owner/repo/tree/main/data/mods/Example",
///     Path::new("mods/Example"),
/// )?;
/// println!("{} files below {}", fetched.files.len(), fetched.prefix);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
    token: CancellationToken,
    progress: Option<Arc<dyn ProgressReporter>>,
}

impl Fetcher {
    /// Creates a fetcher talking HTTP through `reqwest`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a fetcher over an arbitrary transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            config,
            token: CancellationToken::new(),
            progress: None,
        }
    }

    /// Uses `token` to abort long-running operations.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Reports per-file progress of tree walks to `progress`.
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// The configuration this fetcher was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub(crate) fn progress(&self) -> Option<&dyn ProgressReporter> {
        self.progress.as_deref()
    }

    /// Fails with [`Error::Interrupted`] once the token has been cancelled.
    pub(crate) fn check_cancelled(&self) -> Result<()> {
        if self.token.is_cancelled() {
            Err(Error::Interrupted)
        } else {
            Ok(())
        }
    }
}
