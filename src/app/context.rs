use std::sync::Arc;

use crate::app::error::Result;
use crate::config::Config;
use crate::fetcher::DataFetcher;
use crate::mutation::MutationCoordinator;
use crate::normalizer::Normalizer;
use crate::remote::http::HttpService;
use crate::remote::{MutationService, RemoteService};
use crate::session::{LocalIdentity, SessionStore};

/// Everything a view needs, built once at startup and passed down.
pub struct AppContext {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub service: Arc<dyn RemoteService>,
    pub fetcher: DataFetcher,
    pub normalizer: Normalizer,
    pub mutations: Arc<MutationCoordinator>,
}

impl AppContext {
    /// Connects to the configured service, signed in when the config
    /// carries a static identity.
    pub async fn new(config: Config) -> Result<Self> {
        let identity = Arc::new(LocalIdentity::with_session(config.identity.session()));
        let session = SessionStore::start(identity).await;
        let http = Arc::new(HttpService::new(&config.service, session.clone())?);

        Ok(Self::assemble(config, session, http.clone(), http))
    }

    pub fn assemble(
        config: Config,
        session: Arc<SessionStore>,
        service: Arc<dyn RemoteService>,
        mutations: Arc<dyn MutationService>,
    ) -> Self {
        let normalizer = Normalizer::new();
        let fetcher = DataFetcher::new(service.clone(), normalizer.clone());
        let mutations = Arc::new(MutationCoordinator::new(session.clone(), mutations));

        Self {
            config,
            session,
            service,
            fetcher,
            normalizer,
            mutations,
        }
    }
}
