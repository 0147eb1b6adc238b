//! The per-entity CRUD store registry.
//!
//! One registry holds a `CrudStore` per entity, the shared error channel
//! and the declarative cross-store refresh rules. Actions call the mock API
//! and update the local caches on success; failures report to the notifier
//! and leave local state untouched.
//!
//! Reorder follows a two-phase contract: the list is reordered locally
//! right away for responsiveness, but the authoritative order values are
//! the ones the move call returns. On failure the pre-optimistic snapshot
//! is restored before the error is reported.

use std::collections::HashMap;
use std::rc::Rc;

use serde_json::{json, Value};

use crate::api::{ApiRequest, ApiResponse, ApiServer};
use crate::client::store::CrudStore;
use crate::client::toast::{Language, Notifier, ToastChannel, ToastKey};
use crate::db::reorder::{self, OrderPatch, Position};
use crate::db::{row_id, Row};
use crate::schema::{EntityKind, LOAD_ORDER};

/// Which successful action on a store fires a refresh rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Create,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy)]
struct RefreshRule {
    source: EntityKind,
    mutation: Mutation,
    target: EntityKind,
}

pub struct StoreRegistry {
    api: ApiServer,
    notifier: Rc<dyn Notifier>,
    stores: HashMap<EntityKind, CrudStore>,
    refresh_rules: Vec<RefreshRule>,
}

impl StoreRegistry {
    pub fn new(api: ApiServer, notifier: Rc<dyn Notifier>) -> Self {
        let stores = LOAD_ORDER
            .iter()
            .map(|kind| (*kind, CrudStore::new()))
            .collect();
        Self {
            api,
            notifier,
            stores,
            refresh_rules: Vec::new(),
        }
    }

    /// The demo's wiring: a role rename is visible wherever an employee row
    /// shows its role, so employee writes refresh the roles list.
    pub fn with_demo_wiring(api: ApiServer, notifier: Rc<dyn Notifier>) -> Self {
        let mut registry = Self::new(api, notifier);
        registry.on_mutation(EntityKind::Employee, Mutation::Create, EntityKind::Role);
        registry.on_mutation(EntityKind::Employee, Mutation::Update, EntityKind::Role);
        registry
    }

    /// The full demo composition: the demo's refresh rules with a localized
    /// toast channel as the failure sink. The channel is returned alongside
    /// the registry so the shell can render the standing toast and switch
    /// its language.
    pub fn with_toasts(api: ApiServer, language: Language) -> (Self, Rc<ToastChannel>) {
        let toasts = Rc::new(ToastChannel::new(language));
        let registry = Self::with_demo_wiring(api, toasts.clone());
        (registry, toasts)
    }

    /// Declare that a successful `mutation` on `source` refreshes the
    /// `target` store's list. Set up once at composition time.
    pub fn on_mutation(&mut self, source: EntityKind, mutation: Mutation, target: EntityKind) {
        self.refresh_rules.push(RefreshRule {
            source,
            mutation,
            target,
        });
    }

    pub fn store(&self, kind: EntityKind) -> &CrudStore {
        // Every kind is populated in new().
        &self.stores[&kind]
    }

    #[cfg(test)]
    pub(crate) fn api_mut(&mut self) -> &mut ApiServer {
        &mut self.api
    }

    fn store_mut(&mut self, kind: EntityKind) -> &mut CrudStore {
        self.stores.entry(kind).or_default()
    }

    fn base_path(kind: EntityKind) -> String {
        format!("/api/{}", kind.api_segment())
    }

    fn report_failure(&self, response: &ApiResponse) {
        let key = if response.status == 404 {
            ToastKey::NotFound
        } else {
            ToastKey::ActionFailed
        };
        self.notifier.report(key);
    }

    fn rows_from(body: Option<Value>) -> Vec<Row> {
        match body {
            Some(Value::Array(values)) => values
                .into_iter()
                .filter_map(|v| match v {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn run_refresh_rules(&mut self, source: EntityKind, mutation: Mutation) {
        let targets: Vec<EntityKind> = self
            .refresh_rules
            .iter()
            .filter(|rule| rule.source == source && rule.mutation == mutation)
            .map(|rule| rule.target)
            .collect();
        for target in targets {
            self.get_list(target);
        }
    }

    /// Fetch and replace the full local list and record cache.
    pub fn get_list(&mut self, kind: EntityKind) -> bool {
        self.store_mut(kind).is_loading.get_list = true;
        let response = self.api.dispatch(&ApiRequest::get(Self::base_path(kind)));
        self.store_mut(kind).is_loading.get_list = false;

        if !response.is_success() {
            self.report_failure(&response);
            return false;
        }
        let rows = Self::rows_from(response.body);
        self.store_mut(kind).replace_list(rows);
        true
    }

    /// Create a row from flat input; on success the response row is
    /// appended to the cache and refresh rules fire.
    pub fn create(&mut self, kind: EntityKind, input: Row) -> Option<Row> {
        self.store_mut(kind).is_loading.create = true;
        let response = self
            .api
            .dispatch(&ApiRequest::post(Self::base_path(kind), Value::Object(input)));
        self.store_mut(kind).is_loading.create = false;

        if !response.is_success() {
            self.report_failure(&response);
            return None;
        }
        let row = match response.body {
            Some(Value::Object(map)) => map,
            _ => return None,
        };
        self.store_mut(kind).upsert(row.clone());
        self.run_refresh_rules(kind, Mutation::Create);
        Some(row)
    }

    /// Update the row identified by `input["id"]` with the remaining flat
    /// fields.
    pub fn update(&mut self, kind: EntityKind, input: Row) -> Option<Row> {
        let Some(id) = row_id(&input) else {
            self.notifier.report(ToastKey::ActionFailed);
            return None;
        };

        self.store_mut(kind).is_loading.update = true;
        let response = self.api.dispatch(&ApiRequest::patch(
            format!("{}/{}", Self::base_path(kind), id),
            Value::Object(input),
        ));
        self.store_mut(kind).is_loading.update = false;

        if !response.is_success() {
            self.report_failure(&response);
            return None;
        }
        let row = match response.body {
            Some(Value::Object(map)) => map,
            _ => return None,
        };
        self.store_mut(kind).upsert(row.clone());
        self.run_refresh_rules(kind, Mutation::Update);
        Some(row)
    }

    /// Delete a row, tracking which id is in flight for the per-row
    /// spinner.
    pub fn delete(&mut self, kind: EntityKind, id: u64) -> bool {
        self.store_mut(kind).delete_id = Some(id);
        let response = self
            .api
            .dispatch(&ApiRequest::delete(format!("{}/{}", Self::base_path(kind), id)));
        self.store_mut(kind).delete_id = None;

        if !response.is_success() {
            self.report_failure(&response);
            return false;
        }
        self.store_mut(kind).remove(id);
        self.run_refresh_rules(kind, Mutation::Delete);
        true
    }

    /// Move `item_id` above or below `target_id`.
    ///
    /// The local list is patched optimistically with the same reorder
    /// computation the server runs; the server's `{id, order}` pairs then
    /// overwrite the preview. Any failure rolls the store back to the
    /// pre-optimistic snapshot before reporting.
    pub fn move_row(
        &mut self,
        kind: EntityKind,
        item_id: u64,
        target_id: u64,
        position: Position,
    ) -> bool {
        let preview = match reorder::reorder(
            kind,
            &self.store(kind).list,
            item_id,
            target_id,
            position,
        ) {
            Ok(patches) => patches,
            Err(_) => {
                self.notifier.report(ToastKey::NotFound);
                return false;
            }
        };

        let snapshot = self.store(kind).clone();
        {
            let store = self.store_mut(kind);
            store.is_loading.moving = true;
            store.patch_orders(&preview);
        }

        let response = self.api.dispatch(&ApiRequest::put(
            format!("{}/{}/move", Self::base_path(kind), item_id),
            json!({ "target": { "id": target_id }, "position": position }),
        ));
        self.store_mut(kind).is_loading.moving = false;

        if !response.is_success() {
            let mut restored = snapshot;
            restored.is_loading.moving = false;
            self.stores.insert(kind, restored);
            self.report_failure(&response);
            return false;
        }

        let confirmed: Vec<OrderPatch> = response
            .body
            .and_then(|body| serde_json::from_value(body).ok())
            .unwrap_or(preview);
        self.store_mut(kind).patch_orders(&confirmed);
        true
    }
}
