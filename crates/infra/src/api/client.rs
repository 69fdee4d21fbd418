//! Gateway API client
//!
//! Implements [`GatewayPort`] over the account's gateway endpoints. Calls
//! that read or mutate list contents go through the shared rate gate;
//! inventory reads and rule calls are retried but not gated.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use blockgate_common::resilience::{MinIntervalGate, RetryConfig};
use blockgate_core::GatewayPort;
use blockgate_domain::constants::{MAX_LIST_ITEMS, NOT_FOUND_RETRY_ATTEMPTS};
use blockgate_domain::{ApiConfig, Domain, ListItems, ListPatch, ResourceList, Rule};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::errors::ApiError;
use super::stale::stale_removal;
use super::types::{
    describe_errors, CreateListBody, Envelope, ItemRecord, ListRecord, PatchListBody, RuleBody, RuleRecord,
};
use crate::http::{HttpClient, HttpRequest, HttpResponse, RateLimited, Retrying, Transport};

type Result<T> = blockgate_domain::Result<T>;

/// Typed client for lists and rules of one gateway account
pub struct GatewayClient {
    endpoint: String,
    api_token: String,
    gated: Retrying<RateLimited<Arc<HttpClient>>>,
    inventory: Retrying<Arc<HttpClient>>,
}

impl GatewayClient {
    /// Build a client for the account described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the base URL is not a valid URL or the
    /// HTTP client cannot be created.
    pub fn new(config: &ApiConfig, retry: RetryConfig, gate: Arc<MinIntervalGate>) -> std::result::Result<Self, ApiError> {
        let base = Url::parse(&config.base_url)
            .map_err(|err| ApiError::Config(format!("invalid api base url {:?}: {err}", config.base_url)))?;
        let endpoint =
            format!("{}/accounts/{}/gateway", base.as_str().trim_end_matches('/'), config.account_id.trim());

        let http = Arc::new(HttpClient::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?);

        Ok(Self {
            endpoint,
            api_token: config.api_token.clone(),
            gated: Retrying::new(RateLimited::new(Arc::clone(&http), gate), retry.clone()),
            inventory: Retrying::new(http, retry),
        })
    }

    fn request(&self, method: Method, path: &str) -> std::result::Result<HttpRequest, ApiError> {
        let url = Url::parse(&format!("{}{}", self.endpoint, path))
            .map_err(|err| ApiError::Config(format!("invalid endpoint {path:?}: {err}")))?;
        HttpRequest::new(method, url).bearer_auth(&self.api_token)
    }

    fn request_with<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> std::result::Result<HttpRequest, ApiError> {
        self.request(method, path)?.json(body)
    }

    async fn patch_list(&self, list_id: &str, patch: &ListPatch) -> std::result::Result<ResourceList, ApiError> {
        let request = self.request_with(Method::PATCH, &format!("/lists/{list_id}"), &PatchListBody::new(patch))?;
        let response = self.gated.send(&request).await?;
        required::<ListRecord>(&response).map(ResourceList::from)
    }
}

/// Unwrap the envelope, treating `success: false` as a client error.
fn decode<T: DeserializeOwned>(response: &HttpResponse) -> std::result::Result<Option<T>, ApiError> {
    let envelope: Envelope<T> = response.json()?;
    if !envelope.success {
        return Err(ApiError::Client { status: response.status.as_u16(), message: describe_errors(&envelope.errors) });
    }
    Ok(envelope.result)
}

/// Take `value` out of the patch's removals; false if it was not pending.
fn drop_removal(patch: &mut ListPatch, value: &str) -> bool {
    let before = patch.remove.len() + patch.remove_invalid.len();
    let domain = Domain::parse(value);
    patch.remove.retain(|pending| Some(pending) != domain.as_ref());
    patch.remove_invalid.retain(|pending| pending != value);
    patch.remove.len() + patch.remove_invalid.len() != before
}

fn required<T: DeserializeOwned>(response: &HttpResponse) -> std::result::Result<T, ApiError> {
    decode(response)?.ok_or_else(|| ApiError::Decode(format!("missing result from {}", response.url)))
}

#[async_trait]
impl GatewayPort for GatewayClient {
    #[instrument(skip(self))]
    async fn list_all(&self, prefix: &str) -> Result<Vec<ResourceList>> {
        let response = self.inventory.send(&self.request(Method::GET, "/lists")?).await?;
        let lists: Vec<ResourceList> = decode::<Vec<ListRecord>>(&response)?
            .unwrap_or_default()
            .into_iter()
            .filter(|record| record.name.starts_with(prefix))
            .map(ResourceList::from)
            .collect();
        debug!(count = lists.len(), "fetched lists");
        Ok(lists)
    }

    #[instrument(skip(self))]
    async fn list_items(&self, list_id: &str) -> Result<ListItems> {
        let path = format!("/lists/{list_id}/items?limit={MAX_LIST_ITEMS}");
        let response = self.gated.send(&self.request(Method::GET, &path)?).await?;
        let mut items = ListItems::default();
        for record in decode::<Vec<ItemRecord>>(&response)?.unwrap_or_default() {
            match Domain::parse(&record.value) {
                Some(domain) => items.domains.push(domain),
                None => {
                    debug!(value = %record.value, "remote list holds a value that is not a domain");
                    items.invalid.push(record.value);
                }
            }
        }
        debug!(count = items.len(), invalid = items.invalid.len(), "fetched list items");
        Ok(items)
    }

    #[instrument(skip(self, items), fields(items = items.len()))]
    async fn create_list(&self, name: &str, items: &[Domain]) -> Result<ResourceList> {
        let request = self.request_with(Method::POST, "/lists", &CreateListBody::new(name, items))?;
        let response = self.gated.send(&request).await?;
        let list = ResourceList::from(required::<ListRecord>(&response)?);
        info!(id = %list.id, "created list");
        Ok(list)
    }

    #[instrument(skip(self, patch), fields(remove = patch.remove.len() + patch.remove_invalid.len(), append = patch.append.len()))]
    async fn update_list(&self, list_id: &str, patch: &ListPatch) -> Result<ResourceList> {
        let mut pending = patch.clone();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let err = match self.patch_list(list_id, &pending).await {
                Ok(list) => {
                    info!(count = list.count, "updated list");
                    return Ok(list);
                }
                Err(err) => err,
            };

            if attempt >= NOT_FOUND_RETRY_ATTEMPTS {
                return Err(err.into());
            }
            let Some(missing) = stale_removal(&err) else {
                return Err(err.into());
            };
            if !drop_removal(&mut pending, &missing) {
                return Err(err.into());
            }
            warn!(value = %missing, attempt, "item already absent from list, retrying without it");
        }
    }

    #[instrument(skip(self))]
    async fn delete_list(&self, list_id: &str) -> Result<()> {
        let response = self.gated.send(&self.request(Method::DELETE, &format!("/lists/{list_id}"))?).await?;
        decode::<serde_json::Value>(&response)?;
        info!("deleted list");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_rules(&self, prefix: &str) -> Result<Vec<Rule>> {
        let response = self.inventory.send(&self.request(Method::GET, "/rules")?).await?;
        let rules: Vec<Rule> = decode::<Vec<RuleRecord>>(&response)?
            .unwrap_or_default()
            .into_iter()
            .filter(|record| record.name.starts_with(prefix))
            .map(Rule::from)
            .collect();
        debug!(count = rules.len(), "fetched rules");
        Ok(rules)
    }

    #[instrument(skip(self, list_ids), fields(lists = list_ids.len()))]
    async fn create_rule(&self, name: &str, list_ids: &[String]) -> Result<Rule> {
        let request = self.request_with(Method::POST, "/rules", &RuleBody::new(name, list_ids))?;
        let response = self.inventory.send(&request).await?;
        let rule = Rule::from(required::<RuleRecord>(&response)?);
        info!(id = %rule.id, "created rule");
        Ok(rule)
    }

    #[instrument(skip(self, list_ids), fields(lists = list_ids.len()))]
    async fn update_rule(&self, rule_id: &str, name: &str, list_ids: &[String]) -> Result<Rule> {
        let request = self.request_with(Method::PUT, &format!("/rules/{rule_id}"), &RuleBody::new(name, list_ids))?;
        let response = self.inventory.send(&request).await?;
        let rule = Rule::from(required::<RuleRecord>(&response)?);
        if rule.list_id_set() != list_ids.iter().map(String::as_str).collect::<BTreeSet<_>>() {
            warn!(id = %rule.id, "rule returned by the gateway references a different list set");
        }
        info!("updated rule");
        Ok(rule)
    }

    #[instrument(skip(self))]
    async fn delete_rule(&self, rule_id: &str) -> Result<()> {
        let response = self.inventory.send(&self.request(Method::DELETE, &format!("/rules/{rule_id}"))?).await?;
        decode::<serde_json::Value>(&response)?;
        info!("deleted rule");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use blockgate_domain::SyncError;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(server: &MockServer) -> ApiConfig {
        ApiConfig {
            base_url: format!("{}/client/v4", server.uri()),
            account_id: "acc".to_string(),
            api_token: "test-token".to_string(),
            timeout_secs: 5,
        }
    }

    fn client(server: &MockServer) -> GatewayClient {
        let retry = RetryConfig::builder()
            .max_attempts(3)
            .fixed_backoff(Duration::from_millis(5))
            .no_jitter()
            .build()
            .unwrap();
        GatewayClient::new(&config(server), retry, Arc::new(MinIntervalGate::unlimited())).unwrap()
    }

    fn ok(result: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({"success": true, "errors": [], "result": result}))
    }

    fn domains(values: &[&str]) -> Vec<Domain> {
        values.iter().map(|v| Domain::parse(v).unwrap()).collect()
    }

    fn patch(remove: &[&str], invalid: &[&str], append: &[&str]) -> ListPatch {
        ListPatch {
            remove: domains(remove),
            remove_invalid: invalid.iter().map(|v| (*v).to_owned()).collect(),
            append: domains(append),
        }
    }

    const LISTS: &str = "/client/v4/accounts/acc/gateway/lists";

    #[tokio::test]
    async fn list_all_filters_by_prefix_and_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(LISTS))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ok(json!([
                {"id": "l1", "name": "[Blockgate] - 001", "count": 3},
                {"id": "x", "name": "Someone else's list", "count": 10},
                {"id": "l2", "name": "[Blockgate] - 002"}
            ])))
            .mount(&server)
            .await;

        let lists = client(&server).list_all("[Blockgate]").await.unwrap();

        assert_eq!(lists.len(), 2);
        assert_eq!(lists[0], ResourceList { id: "l1".into(), name: "[Blockgate] - 001".into(), count: 3 });
        assert_eq!(lists[1].count, 0);
    }

    #[tokio::test]
    async fn list_all_with_null_result_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET")).and(path(LISTS)).respond_with(ok(json!(null))).mount(&server).await;

        assert!(client(&server).list_all("[Blockgate]").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_items_requests_full_page_and_keeps_invalid_values() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{LISTS}/l1/items")))
            .and(query_param("limit", "1000"))
            .respond_with(ok(json!([{"value": "a.com"}, {"value": "not valid!"}, {"value": "B.com"}])))
            .mount(&server)
            .await;

        let items = client(&server).list_items("l1").await.unwrap();

        assert_eq!(items.domains, domains(&["a.com", "b.com"]));
        assert_eq!(items.invalid, ["not valid!"]);
        assert_eq!(items.len(), 3);
    }

    #[tokio::test]
    async fn update_list_sends_invalid_values_for_removal() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{LISTS}/l1")))
            .and(body_json(json!({"remove": ["legacy_entry!"], "append": [{"value": "new.com"}]})))
            .respond_with(ok(json!({"id": "l1", "name": "[Blockgate] - 001", "count": 1000})))
            .expect(1)
            .mount(&server)
            .await;

        let list = client(&server)
            .update_list("l1", &patch(&[], &["legacy_entry!"], &["new.com"]))
            .await
            .unwrap();

        assert_eq!(list.count, 1000);
    }

    #[tokio::test]
    async fn update_list_drops_invalid_value_already_removed() {
        let server = MockServer::start().await;
        let list_path = format!("{LISTS}/l1");
        Mock::given(method("PATCH"))
            .and(path(list_path.as_str()))
            .and(body_json(json!({"remove": ["old.com", "legacy_entry!"], "append": []})))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "success": false,
                "errors": [{"code": 1003, "message": "item to be removed, legacy_entry!, not found in list"}],
                "result": null
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path(list_path.as_str()))
            .and(body_json(json!({"remove": ["old.com"], "append": []})))
            .respond_with(ok(json!({"id": "l1", "name": "[Blockgate] - 001", "count": 4})))
            .expect(1)
            .mount(&server)
            .await;

        let list = client(&server).update_list("l1", &patch(&["old.com"], &["legacy_entry!"], &[])).await.unwrap();

        assert_eq!(list.count, 4);
    }

    #[tokio::test]
    async fn create_list_posts_items() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(LISTS))
            .and(body_json(json!({
                "name": "[Blockgate] - 001",
                "description": "Ads & Tracking Domains",
                "type": "DOMAIN",
                "items": [{"value": "a.com"}]
            })))
            .respond_with(ok(json!({"id": "new", "name": "[Blockgate] - 001", "count": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let list = client(&server).create_list("[Blockgate] - 001", &domains(&["a.com"])).await.unwrap();

        assert_eq!(list.id, "new");
        assert_eq!(list.count, 1);
    }

    #[tokio::test]
    async fn unsuccessful_envelope_is_a_client_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(LISTS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "errors": [{"code": 7003, "message": "no such account"}],
                "result": null
            })))
            .mount(&server)
            .await;

        let err = client(&server).create_list("[Blockgate] - 001", &[]).await.unwrap_err();

        match err {
            SyncError::Client { status, message } => {
                assert_eq!(status, 200);
                assert!(message.contains("no such account"));
            }
            other => panic!("expected client error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_list_drops_items_already_removed() {
        let server = MockServer::start().await;
        let list_path = format!("{LISTS}/l1");
        Mock::given(method("PATCH"))
            .and(path(list_path.as_str()))
            .and(body_json(json!({"remove": ["gone.com", "old.com"], "append": [{"value": "new.com"}]})))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "success": false,
                "errors": [{"code": 1003, "message": "item to be removed, gone.com, not found in list"}],
                "result": null
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path(list_path.as_str()))
            .and(body_json(json!({"remove": ["old.com"], "append": [{"value": "new.com"}]})))
            .respond_with(ok(json!({"id": "l1", "name": "[Blockgate] - 001", "count": 5})))
            .expect(1)
            .mount(&server)
            .await;

        let list = client(&server)
            .update_list("l1", &patch(&["gone.com", "old.com"], &[], &["new.com"]))
            .await
            .unwrap();

        assert_eq!(list.count, 5);
    }

    #[tokio::test]
    async fn update_list_propagates_not_found_for_foreign_domain() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{LISTS}/l1")))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "success": false,
                "errors": [{"code": 1003, "message": "item to be removed, elsewhere.com, not found in list"}],
                "result": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).update_list("l1", &patch(&["old.com"], &[], &[])).await.unwrap_err();

        assert!(matches!(err, SyncError::Client { status: 400, .. }));
    }

    #[tokio::test]
    async fn update_list_gives_up_after_bounded_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path(format!("{LISTS}/l1")))
            .respond_with(|req: &wiremock::Request| {
                let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
                let first = body["remove"][0].as_str().unwrap_or("none").to_string();
                ResponseTemplate::new(400).set_body_json(json!({
                    "success": false,
                    "errors": [{"code": 1003, "message": format!("item to be removed, {first}, not found in list")}],
                    "result": null
                }))
            })
            .expect(3)
            .mount(&server)
            .await;

        let err = client(&server)
            .update_list("l1", &patch(&["a.com", "b.com", "c.com", "d.com"], &[], &[]))
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Client { status: 400, .. }));
    }

    #[tokio::test]
    async fn server_errors_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("{LISTS}/l1")))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{LISTS}/l1")))
            .respond_with(ok(json!(null)))
            .mount(&server)
            .await;

        client(&server).delete_list("l1").await.unwrap();
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/client/v4/accounts/acc/gateway/rules/r1"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server).delete_rule("r1").await.unwrap_err();

        assert_eq!(err, SyncError::Client { status: 403, message: "forbidden".into() });
    }

    #[tokio::test]
    async fn rules_round_trip_list_references() {
        let server = MockServer::start().await;
        let traffic = "any(dns.domains[*] in $l1) or any(dns.domains[*] in $l2)";
        Mock::given(method("GET"))
            .and(path("/client/v4/accounts/acc/gateway/rules"))
            .respond_with(ok(json!([
                {"id": "r1", "name": "[Blockgate] Block Ads", "traffic": traffic},
                {"id": "r2", "name": "Other rule", "traffic": ""}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/client/v4/accounts/acc/gateway/rules/r1"))
            .and(body_json(json!({
                "name": "[Blockgate] Block Ads",
                "description": "Block Ads & Tracking",
                "action": "block",
                "traffic": traffic,
                "enabled": true
            })))
            .respond_with(ok(json!({"id": "r1", "name": "[Blockgate] Block Ads", "traffic": traffic})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let rules = client.list_rules("[Blockgate]").await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].list_ids, vec!["l1".to_string(), "l2".to_string()]);

        let updated = client.update_rule("r1", "[Blockgate] Block Ads", &rules[0].list_ids).await.unwrap();
        assert_eq!(updated, rules[0]);
    }

    #[test]
    fn invalid_base_url_is_a_config_error() {
        let config = ApiConfig { base_url: "not a url".into(), ..ApiConfig::default() };
        let result = GatewayClient::new(&config, RetryConfig::strict(), Arc::new(MinIntervalGate::unlimited()));
        assert!(matches!(result, Err(ApiError::Config(_))));
    }
}
