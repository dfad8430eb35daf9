use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Response};
use serde_json::{json, Value};
use url::Url;

use crate::app::{PulseError, Result};
use crate::config::ServiceConfig;
use crate::domain::SavedRelation;
use crate::remote::{into_records, MutationService, Query, RemoteService, SAVED_PULSES};
use crate::session::SessionStore;

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// PostgREST client for the query and mutation interfaces.
///
/// Requests carry the signed-in session's bearer token when there is one,
/// the anonymous key otherwise.
pub struct HttpService {
    client: Client,
    base_url: Url,
    anon_key: String,
    session: Arc<SessionStore>,
}

impl HttpService {
    pub fn new(config: &ServiceConfig, session: Arc<SessionStore>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("pulsewire/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let mut base_url = Url::parse(&config.url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            anon_key: config.anon_key.clone(),
            session,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(&format!("rest/v1/{}", path))?)
    }

    pub(crate) fn query_url(&self, query: &Query) -> Result<Url> {
        let mut url = self.endpoint(&query.collection)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", &query.select);
            for filter in &query.filters {
                pairs.append_pair(&filter.field, &format!("eq.{}", filter.value));
            }
            if let Some(order) = &query.order {
                let direction = if order.ascending { "asc" } else { "desc" };
                pairs.append_pair("order", &format!("{}.{}", order.field, direction));
            }
            if let Some(page) = &query.page {
                pairs.append_pair("offset", &page.offset.to_string());
                pairs.append_pair("limit", &page.limit.to_string());
            }
        }
        Ok(url)
    }

    fn relation_url(&self, relation: &SavedRelation) -> Result<Url> {
        let mut url = self.endpoint(SAVED_PULSES)?;
        url.query_pairs_mut()
            .append_pair("user_id", &format!("eq.{}", relation.user_id))
            .append_pair("pulse_id", &format!("eq.{}", relation.pulse_id));
        Ok(url)
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Ok(value) = HeaderValue::from_str(&self.anon_key) {
            headers.insert("apikey", value);
        }

        let token = self
            .session
            .current()
            .map(|s| s.access_token)
            .unwrap_or_else(|| self.anon_key.clone());
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
            headers.insert(AUTHORIZATION, value);
        }

        headers
    }

    async fn read_records(response: Response) -> Result<Vec<Value>> {
        let response = Self::check(response).await?;
        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(Vec::new());
        }
        let value: Value = serde_json::from_slice(&body)?;
        Ok(into_records(value))
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(PulseError::remote(status.as_u16(), message))
    }
}

#[async_trait]
impl RemoteService for HttpService {
    async fn query(&self, query: &Query) -> Result<Vec<Value>> {
        let url = self.query_url(query)?;
        let mut request = self.client.get(url).headers(self.headers());
        if query.single {
            request = request.header(ACCEPT, SINGLE_OBJECT);
        }

        tracing::debug!("Querying {}", query.collection);
        Self::read_records(request.send().await?).await
    }

    async fn call(&self, procedure: &str, args: &Value) -> Result<Vec<Value>> {
        let url = self.endpoint(&format!("rpc/{}", procedure))?;
        let response = self
            .client
            .post(url)
            .headers(self.headers())
            .json(args)
            .send()
            .await?;

        tracing::debug!("Called procedure {}", procedure);
        Self::read_records(response).await
    }
}

#[async_trait]
impl MutationService for HttpService {
    async fn insert_relation(&self, relation: &SavedRelation) -> Result<()> {
        let url = self.endpoint(SAVED_PULSES)?;
        let response = self
            .client
            .post(url)
            .headers(self.headers())
            .header("Prefer", "return=minimal")
            .json(&json!({
                "user_id": relation.user_id,
                "pulse_id": relation.pulse_id,
            }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn delete_relation(&self, relation: &SavedRelation) -> Result<()> {
        let url = self.relation_url(relation)?;
        let response = self
            .client
            .delete(url)
            .headers(self.headers())
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Session;
    use crate::remote::{Page, PULSES};
    use crate::session::LocalIdentity;

    fn config(url: &str) -> ServiceConfig {
        ServiceConfig {
            url: url.into(),
            anon_key: "anon".into(),
            timeout_secs: 5,
        }
    }

    async fn store(session: Option<Session>) -> Arc<SessionStore> {
        SessionStore::start(Arc::new(LocalIdentity::with_session(session))).await
    }

    #[tokio::test]
    async fn test_query_url_encodes_filters_order_and_page() {
        let service = HttpService::new(&config("https://db.example.com"), store(None).await).unwrap();
        let query = Query::table(PULSES)
            .select("*")
            .eq("slug", "ai weekly")
            .order_desc("published_date")
            .page(Page::new(1, 10));

        let url = service.query_url(&query).unwrap();

        assert_eq!(url.path(), "/rest/v1/pulses");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("slug".into(), "eq.ai weekly".into())));
        assert!(pairs.contains(&("order".into(), "published_date.desc".into())));
        assert!(pairs.contains(&("offset".into(), "10".into())));
        assert!(pairs.contains(&("limit".into(), "10".into())));
    }

    #[tokio::test]
    async fn test_base_path_is_preserved() {
        let service =
            HttpService::new(&config("https://example.com/supabase"), store(None).await).unwrap();
        let url = service.query_url(&Query::table(PULSES)).unwrap();
        assert_eq!(url.path(), "/supabase/rest/v1/pulses");
    }

    #[tokio::test]
    async fn test_bearer_prefers_session_token() {
        let anon = HttpService::new(&config("https://db.example.com"), store(None).await).unwrap();
        assert_eq!(anon.headers()[AUTHORIZATION], "Bearer anon");

        let signed_in = HttpService::new(
            &config("https://db.example.com"),
            store(Some(Session::new("u1", "user-token", "a@example.com"))).await,
        )
        .unwrap();
        assert_eq!(signed_in.headers()[AUTHORIZATION], "Bearer user-token");
        assert_eq!(signed_in.headers()["apikey"], "anon");
    }

    #[tokio::test]
    async fn test_invalid_base_url() {
        let result = HttpService::new(&config("not a url"), store(None).await);
        assert!(matches!(result, Err(PulseError::InvalidUrl(_))));
    }
}
