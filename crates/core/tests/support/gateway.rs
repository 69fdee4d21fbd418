//! In-memory `GatewayPort`
//!
//! Models the remote store closely enough for reconciliation tests: lists are
//! bounded, the account has a list ceiling, rules reference lists by id. Every
//! call is logged so tests can assert on the exact traffic.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use blockgate_core::GatewayPort;
use blockgate_domain::{Domain, DomainSet, ListItems, ListPatch, ResourceList, Result as DomainResult, Rule, SyncError};
use parking_lot::Mutex;
use uuid::Uuid;

/// Remote limit on lists per account
pub const ACCOUNT_LIST_LIMIT: usize = 300;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListAll,
    ListItems(String),
    CreateList { name: String, items: usize },
    UpdateList { id: String, remove: Vec<Domain>, remove_invalid: Vec<String>, append: Vec<Domain> },
    DeleteList(String),
    ListRules,
    CreateRule { list_ids: Vec<String> },
    UpdateRule { id: String, list_ids: Vec<String> },
    DeleteRule(String),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Call::ListAll | Call::ListItems(_) | Call::ListRules)
    }
}

#[derive(Debug, Clone)]
pub struct StoredList {
    pub name: String,
    pub items: DomainSet,
    /// Values stored before validation; not valid domains
    pub invalid: BTreeSet<String>,
}

impl StoredList {
    pub fn len(&self) -> usize {
        self.items.len() + self.invalid.len()
    }
}

#[derive(Default)]
struct State {
    lists: BTreeMap<String, StoredList>,
    rules: BTreeMap<String, Rule>,
    calls: Vec<Call>,
    failing_deletes: BTreeSet<String>,
    failing_updates: BTreeSet<String>,
}

pub struct FakeGateway {
    state: Mutex<State>,
    max_items: usize,
}

impl Default for FakeGateway {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl FakeGateway {
    pub fn new(max_items: usize) -> Self {
        Self { state: Mutex::new(State::default()), max_items }
    }

    /// Seed a list without logging a call.
    pub fn seed_list(&self, name: &str, items: &DomainSet) -> String {
        let id = new_id();
        self.state.lock().lists.insert(
            id.clone(),
            StoredList { name: name.to_owned(), items: items.clone(), invalid: BTreeSet::new() },
        );
        id
    }

    /// Add raw values that are not valid domains to a seeded list.
    pub fn seed_invalid(&self, list_id: &str, values: &[&str]) {
        if let Some(list) = self.state.lock().lists.get_mut(list_id) {
            list.invalid.extend(values.iter().map(|value| (*value).to_owned()));
        }
    }

    /// Seed a rule without logging a call.
    pub fn seed_rule(&self, name: &str, list_ids: &[String]) -> String {
        let id = new_id();
        let rule = Rule { id: id.clone(), name: name.to_owned(), list_ids: list_ids.to_vec() };
        self.state.lock().rules.insert(id.clone(), rule);
        id
    }

    pub fn fail_delete(&self, id: &str) {
        self.state.lock().failing_deletes.insert(id.to_owned());
    }

    pub fn fail_update(&self, id: &str) {
        self.state.lock().failing_updates.insert(id.to_owned());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn lists(&self) -> BTreeMap<String, StoredList> {
        self.state.lock().lists.clone()
    }

    pub fn list_by_name(&self, name: &str) -> Option<(String, StoredList)> {
        self.lists().into_iter().find(|(_, list)| list.name == name)
    }

    pub fn rules(&self) -> Vec<Rule> {
        self.state.lock().rules.values().cloned().collect()
    }

    /// The single rule named `name`, if any.
    pub fn rule(&self, name: &str) -> Option<Rule> {
        self.rules().into_iter().find(|rule| rule.name == name)
    }

    fn log(&self, call: Call) {
        self.state.lock().calls.push(call);
    }
}

fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn not_found(what: &str, id: &str) -> SyncError {
    SyncError::Client { status: 404, message: format!("{what} {id} not found") }
}

fn metadata(id: &str, list: &StoredList) -> ResourceList {
    ResourceList { id: id.to_owned(), name: list.name.clone(), count: list.len() }
}

#[async_trait]
impl GatewayPort for FakeGateway {
    async fn list_all(&self, prefix: &str) -> DomainResult<Vec<ResourceList>> {
        self.log(Call::ListAll);
        let state = self.state.lock();
        Ok(state
            .lists
            .iter()
            .filter(|(_, list)| list.name.starts_with(prefix))
            .map(|(id, list)| metadata(id, list))
            .collect())
    }

    async fn list_items(&self, list_id: &str) -> DomainResult<ListItems> {
        self.log(Call::ListItems(list_id.to_owned()));
        let state = self.state.lock();
        let list = state.lists.get(list_id).ok_or_else(|| not_found("list", list_id))?;
        Ok(ListItems { domains: list.items.iter().cloned().collect(), invalid: list.invalid.iter().cloned().collect() })
    }

    async fn create_list(&self, name: &str, items: &[Domain]) -> DomainResult<ResourceList> {
        self.log(Call::CreateList { name: name.to_owned(), items: items.len() });
        let mut state = self.state.lock();
        if items.len() > self.max_items {
            return Err(SyncError::Client { status: 400, message: "too many items".into() });
        }
        if state.lists.len() >= ACCOUNT_LIST_LIMIT {
            return Err(SyncError::Client { status: 400, message: "list limit reached".into() });
        }
        let id = new_id();
        let list = StoredList { name: name.to_owned(), items: items.iter().cloned().collect(), invalid: BTreeSet::new() };
        let meta = metadata(&id, &list);
        state.lists.insert(id, list);
        Ok(meta)
    }

    async fn update_list(&self, list_id: &str, patch: &ListPatch) -> DomainResult<ResourceList> {
        self.log(Call::UpdateList {
            id: list_id.to_owned(),
            remove: patch.remove.clone(),
            remove_invalid: patch.remove_invalid.clone(),
            append: patch.append.clone(),
        });
        let max_items = self.max_items;
        let mut state = self.state.lock();
        if state.failing_updates.contains(list_id) {
            return Err(SyncError::Server { status: 503, message: "unavailable".into() });
        }
        let list = state.lists.get_mut(list_id).ok_or_else(|| not_found("list", list_id))?;
        let mut next = list.clone();
        for domain in &patch.remove {
            next.items.remove(domain);
        }
        for value in &patch.remove_invalid {
            next.invalid.remove(value);
        }
        next.items.extend(patch.append.iter().cloned());
        if next.len() > max_items {
            return Err(SyncError::Client { status: 400, message: "too many items".into() });
        }
        *list = next;
        Ok(metadata(list_id, list))
    }

    async fn delete_list(&self, list_id: &str) -> DomainResult<()> {
        self.log(Call::DeleteList(list_id.to_owned()));
        let mut state = self.state.lock();
        if state.failing_deletes.contains(list_id) {
            return Err(SyncError::Server { status: 500, message: "delete failed".into() });
        }
        let in_use = state.rules.values().any(|rule| rule.references(list_id));
        if in_use {
            return Err(SyncError::Client { status: 400, message: "list is referenced by a rule".into() });
        }
        state.lists.remove(list_id).map(|_| ()).ok_or_else(|| not_found("list", list_id))
    }

    async fn list_rules(&self, prefix: &str) -> DomainResult<Vec<Rule>> {
        self.log(Call::ListRules);
        let state = self.state.lock();
        Ok(state.rules.values().filter(|rule| rule.name.starts_with(prefix)).cloned().collect())
    }

    async fn create_rule(&self, name: &str, list_ids: &[String]) -> DomainResult<Rule> {
        self.log(Call::CreateRule { list_ids: list_ids.to_vec() });
        let mut state = self.state.lock();
        if let Some(missing) = list_ids.iter().find(|id| !state.lists.contains_key(*id)) {
            return Err(not_found("list", missing));
        }
        let rule = Rule { id: new_id(), name: name.to_owned(), list_ids: list_ids.to_vec() };
        state.rules.insert(rule.id.clone(), rule.clone());
        Ok(rule)
    }

    async fn update_rule(&self, rule_id: &str, name: &str, list_ids: &[String]) -> DomainResult<Rule> {
        self.log(Call::UpdateRule { id: rule_id.to_owned(), list_ids: list_ids.to_vec() });
        let mut state = self.state.lock();
        if let Some(missing) = list_ids.iter().find(|id| !state.lists.contains_key(*id)) {
            return Err(not_found("list", missing));
        }
        let rule = state.rules.get_mut(rule_id).ok_or_else(|| not_found("rule", rule_id))?;
        rule.name = name.to_owned();
        rule.list_ids = list_ids.to_vec();
        Ok(rule.clone())
    }

    async fn delete_rule(&self, rule_id: &str) -> DomainResult<()> {
        self.log(Call::DeleteRule(rule_id.to_owned()));
        let mut state = self.state.lock();
        if state.failing_deletes.contains(rule_id) {
            return Err(SyncError::Server { status: 500, message: "delete failed".into() });
        }
        state.rules.remove(rule_id).map(|_| ()).ok_or_else(|| not_found("rule", rule_id))
    }
}
