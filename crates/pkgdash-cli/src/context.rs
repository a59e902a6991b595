//! CLI context for shared state across commands.

use crate::output::{OutputMode, Spinner, Theme};
use pkgdash_client::{ApiClient, LoadingCoordinator, MessageSink};
use pkgdash_config::{BACKEND_URL_KEY, BackendConfig, ConfigStore, FileStore, MemoryStore};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Global CLI context shared across all commands
#[derive(Debug)]
pub struct Context {
    /// Output mode (normal, quiet, verbose, json)
    pub output_mode: OutputMode,
    /// Theme for output styling
    pub theme: Theme,
    /// Backend client; reads the base address on every request
    pub client: ApiClient,
    /// One loading state for every request the command makes
    pub loading: LoadingCoordinator,
    /// Whether the backend address came from `--backend`
    pub backend_override: bool,
    spinner: Arc<Spinner>,
    /// Start time for profiling
    pub start_time: Instant,
}

impl Context {
    /// Create a new context from CLI arguments
    pub fn new(args: &ContextArgs) -> anyhow::Result<Self> {
        let output_mode = if args.json {
            OutputMode::Json
        } else {
            match args.verbosity {
                0 if args.quiet => OutputMode::Quiet,
                0 => OutputMode::Normal,
                _ => OutputMode::Verbose,
            }
        };

        let force_ansi = args.no_ansi.then_some(false);
        crate::output::init(force_ansi, args.quiet || args.json);

        let store: Arc<dyn ConfigStore> = match &args.backend {
            Some(url) => Arc::new(MemoryStore::with_value(BACKEND_URL_KEY, url.trim())),
            None => Arc::new(FileStore::default_location()?),
        };
        debug!(store = ?store, "configuration store selected");

        let client = ApiClient::new(BackendConfig::new(store))?;
        let spinner = Arc::new(Spinner::new("Fetching", output_mode.shows_progress()));
        let loading = LoadingCoordinator::new(spinner.clone());

        Ok(Self {
            output_mode,
            theme: Theme::from_env(),
            client,
            loading,
            backend_override: args.backend.is_some(),
            spinner,
            start_time: Instant::now(),
        })
    }

    /// Backend address configuration.
    pub fn backend(&self) -> &BackendConfig {
        self.client.backend()
    }

    pub fn sink(&self) -> &dyn MessageSink {
        self.spinner.as_ref()
    }

    /// Run a backend call with the shared spinner. Failures are reported
    /// through the spinner's message sink and come back as `None`.
    pub async fn load<T, F>(&self, operation: F) -> Option<T>
    where
        F: Future<Output = pkgdash_client::Result<T>>,
    {
        pkgdash_client::fetch(operation, self.sink(), &self.loading).await
    }

    pub fn is_json(&self) -> bool {
        self.output_mode.is_json()
    }

    pub fn is_verbose(&self) -> bool {
        self.output_mode.is_verbose()
    }
}

/// Arguments that affect context creation
#[derive(Debug, Clone, Default)]
pub struct ContextArgs {
    /// Verbosity level (0 = normal, 1+ = verbose)
    pub verbosity: u8,
    /// Quiet mode
    pub quiet: bool,
    /// Disable ANSI colors
    pub no_ansi: bool,
    /// Print payloads as JSON
    pub json: bool,
    /// Backend address for this invocation only
    pub backend: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkgdash_config::UrlSource;

    fn args(backend: &str) -> ContextArgs {
        ContextArgs {
            backend: Some(backend.to_string()),
            no_ansi: true,
            ..ContextArgs::default()
        }
    }

    #[test]
    fn backend_flag_overrides_store() {
        let ctx = Context::new(&args(" http://pkgdash.test:9000 ")).unwrap();
        let (url, source) = ctx.backend().resolve().unwrap();
        assert_eq!(url, "http://pkgdash.test:9000");
        assert_eq!(source, UrlSource::Store);
        assert!(ctx.backend_override);
    }

    #[test]
    fn output_modes() {
        let json = Context::new(&ContextArgs {
            json: true,
            verbosity: 2,
            ..args("http://localhost:1")
        })
        .unwrap();
        assert!(json.is_json());

        let verbose = Context::new(&ContextArgs {
            verbosity: 1,
            ..args("http://localhost:1")
        })
        .unwrap();
        assert!(verbose.is_verbose());

        let quiet = Context::new(&ContextArgs {
            quiet: true,
            ..args("http://localhost:1")
        })
        .unwrap();
        assert_eq!(quiet.output_mode, OutputMode::Quiet);
    }

    #[tokio::test]
    async fn load_absorbs_failures() {
        let ctx = Context::new(&args("http://127.0.0.1:1")).unwrap();
        let out = ctx.load(ctx.client.packages().distros()).await;
        assert!(out.is_none());
        assert!(!ctx.loading.is_active());
    }
}
