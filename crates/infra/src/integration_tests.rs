//! Gateway pipeline tests.
//!
//! authorize → validate → store → hooks, against an in-memory store that
//! counts writes per table. Hooks run inline so their effects are visible when
//! the gateway call returns.
//!
//! Verifies:
//! - denied or invalid operations never write
//! - ownership applies to READ_WRITE only
//! - every successful mutation appends exactly one audit entry
//! - hook failures never fail the mutation
//! - tenant isolation

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate, Utc};
    use uuid::Uuid;

    use condohub_auth::{
        Actor, AuthzError, Membership, Module, NotificationMap, PermissionLevel, PermissionMap, Role, UserAccount,
    };
    use condohub_core::{DomainError, EnterpriseId, UserId};
    use condohub_documents::{DocumentFilter, DocumentPatch, NewDocument};
    use condohub_equipment::{EquipmentPatch, NewCategory, NewEquipment, NewMaintenance};
    use condohub_events::{AuditAction, DispatchMode, HookList};
    use condohub_structural::{IssuePatch, IssueStatus, NewIssue};
    use condohub_suppliers::{NewSupplier, SupplierFilter, SupplierPatch};
    use condohub_tasks::{NewTask, TaskPatch, TaskStatus};
    use condohub_water::NewReading;

    use crate::audit::{AuditFilter, AuditLogger};
    use crate::enterprise::{Enterprise, EnterpriseSettings};
    use crate::gateways::admin::NewMember;
    use crate::gateways::{GatewayError, Gateways};
    use crate::identity::IdentityService;
    use crate::notify::{NotificationDispatcher, RecordingNotificationSink};
    use crate::store::{InMemoryTableClient, Query, Row, StoreError, TableClient};
    use crate::tables::Tables;

    /// In-memory client that counts writes and can refuse reads or writes
    /// on one table.
    #[derive(Default)]
    struct CountingClient {
        inner: InMemoryTableClient,
        writes: Mutex<HashMap<String, usize>>,
        failing_table: Option<&'static str>,
        unreadable_table: Option<&'static str>,
    }

    impl CountingClient {
        fn failing(table: &'static str) -> Self {
            Self {
                failing_table: Some(table),
                ..Self::default()
            }
        }

        fn unreadable(table: &'static str) -> Self {
            Self {
                unreadable_table: Some(table),
                ..Self::default()
            }
        }

        fn record_write(&self, table: &str) -> Result<(), StoreError> {
            if self.failing_table == Some(table) {
                return Err(StoreError::Backend(format!("writes to {table} are disabled")));
            }
            *self.writes.lock().unwrap().entry(table.to_string()).or_default() += 1;
            Ok(())
        }

        fn total_writes(&self) -> usize {
            self.writes.lock().unwrap().values().sum()
        }
    }

    #[async_trait]
    impl TableClient for CountingClient {
        async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, StoreError> {
            if self.unreadable_table == Some(table) {
                return Err(StoreError::Backend(format!("reads from {table} are disabled")));
            }
            self.inner.select(table, query).await
        }

        async fn insert(&self, table: &str, row: Row) -> Result<(), StoreError> {
            self.record_write(table)?;
            self.inner.insert(table, row).await
        }

        async fn update(&self, table: &str, row: Row) -> Result<(), StoreError> {
            self.record_write(table)?;
            self.inner.update(table, row).await
        }

        async fn delete(&self, table: &str, key: Uuid) -> Result<(), StoreError> {
            self.record_write(table)?;
            self.inner.delete(table, key).await
        }
    }

    struct World {
        client: Arc<CountingClient>,
        tables: Tables,
        gateways: Gateways,
        sink: Arc<RecordingNotificationSink>,
        enterprise: Enterprise,
    }

    async fn world_with(client: CountingClient) -> World {
        let client = Arc::new(client);
        let tables = Tables::new(client.clone());
        let identity = Arc::new(IdentityService::new(&tables, None, Duration::hours(1)));
        let sink = Arc::new(RecordingNotificationSink::new());
        let hooks = HookList::new(DispatchMode::Inline)
            .with(Arc::new(AuditLogger::new(client.clone())))
            .with(Arc::new(NotificationDispatcher::new(client.clone(), sink.clone())));
        let gateways = Gateways::new(&tables, identity, hooks);

        let enterprise = Enterprise::create("Residencial Aurora", None, Utc::now()).unwrap();
        client
            .inner
            .insert(
                "enterprises",
                Row {
                    key: *enterprise.id.as_uuid(),
                    enterprise_id: Some(enterprise.id),
                    data: serde_json::to_value(&enterprise).unwrap(),
                },
            )
            .await
            .unwrap();

        World {
            client,
            tables,
            gateways,
            sink,
            enterprise,
        }
    }

    async fn world() -> World {
        world_with(CountingClient::default()).await
    }

    impl World {
        async fn set_water_limit(&self, limit: f64) {
            let mut e = self.enterprise.clone();
            e.settings = EnterpriseSettings {
                water_limit: Some(limit),
                ..Default::default()
            };
            self.tables.enterprises.update(&e).await.unwrap();
        }

        /// Account + membership in `enterprise`.
        async fn member_of(
            &self,
            enterprise: EnterpriseId,
            email: &str,
            role: Role,
            grants: &[(Module, PermissionLevel)],
            opt_in: &[Module],
        ) -> Actor {
            let user = UserAccount {
                id: UserId::new(),
                email: email.to_string(),
                display_name: email.to_string(),
                password_hash: String::new(),
                created_at: Utc::now(),
            };
            self.tables.users.insert(&user).await.unwrap();
            let permissions: PermissionMap = grants.iter().copied().collect();
            let notifications: NotificationMap = opt_in.iter().map(|m| (*m, true)).collect();
            let membership = Membership::provision(user.id, enterprise, role, permissions, notifications, Utc::now());
            self.tables.memberships.insert(&membership).await.unwrap();
            Actor::new(user.id, email, membership).unwrap()
        }

        async fn member(&self, email: &str, grants: &[(Module, PermissionLevel)]) -> Actor {
            self.member_of(self.enterprise.id, email, Role::Staff, grants, &[]).await
        }

        async fn admin(&self) -> Actor {
            self.member_of(self.enterprise.id, "admin@aurora.test", Role::Admin, &[], &[])
                .await
        }

        async fn audit_count(&self, admin: &Actor) -> usize {
            self.gateways
                .admin
                .audit_logs(admin, &AuditFilter::default())
                .await
                .unwrap()
                .len()
        }
    }

    fn task(title: &str, assignee: Option<UserId>) -> NewTask {
        NewTask {
            title: title.to_string(),
            assignee,
            ..Default::default()
        }
    }

    fn reading(unit: &str, value: f64, previous: Option<f64>) -> NewReading {
        NewReading {
            unit: unit.to_string(),
            reading: value,
            previous_reading: previous,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn read_write_cannot_update_someone_elses_task_and_nothing_is_written() {
        let w = world().await;
        let admin = w.admin().await;
        let staff = w.member("staff@aurora.test", &[(Module::Tasks, PermissionLevel::ReadWrite)]).await;
        let other = w.member("other@aurora.test", &[(Module::Tasks, PermissionLevel::ReadWrite)]).await;
        let t = w
            .gateways
            .tasks
            .create(&admin, task("Fix pump", Some(other.user_id())))
            .await
            .unwrap();

        let before = w.client.total_writes();
        let err = w
            .gateways
            .tasks
            .update(
                &staff,
                t.id,
                TaskPatch {
                    status: Some(TaskStatus::Completed),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GatewayError::Forbidden(AuthzError::NotOwner { module: Module::Tasks })
        ));
        assert_eq!(w.client.total_writes(), before);
    }

    #[tokio::test]
    async fn read_write_updates_own_task_and_full_access_updates_any() {
        let w = world().await;
        let admin = w.admin().await;
        let staff = w.member("staff@aurora.test", &[(Module::Tasks, PermissionLevel::ReadWrite)]).await;
        let manager = w.member("manager@aurora.test", &[(Module::Tasks, PermissionLevel::FullAccess)]).await;
        let t = w
            .gateways
            .tasks
            .create(&admin, task("Fix pump", Some(staff.user_id())))
            .await
            .unwrap();

        let done = TaskPatch {
            status: Some(TaskStatus::Completed),
            ..Default::default()
        };
        let updated = w.gateways.tasks.update(&staff, t.id, done.clone()).await.unwrap();
        assert_eq!(updated.status, TaskStatus::Completed);

        let unassigned = w.gateways.tasks.create(&admin, task("Paint hall", None)).await.unwrap();
        assert!(w.gateways.tasks.update(&manager, unassigned.id, done).await.is_ok());
    }

    #[tokio::test]
    async fn structural_ownership_matches_tasks() {
        let w = world().await;
        let reporter = w
            .member("reporter@aurora.test", &[(Module::Structural, PermissionLevel::ReadWrite)])
            .await;
        let neighbour = w
            .member("neighbour@aurora.test", &[(Module::Structural, PermissionLevel::ReadWrite)])
            .await;
        let admin = w.admin().await;

        let issue = w
            .gateways
            .structural
            .create(
                &reporter,
                NewIssue {
                    title: "Crack in garage wall".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .issue;

        let resolve = IssuePatch {
            status: Some(IssueStatus::Resolved),
            ..Default::default()
        };
        assert!(matches!(
            w.gateways.structural.update(&neighbour, issue.id, resolve.clone()).await,
            Err(GatewayError::Forbidden(AuthzError::NotOwner { .. }))
        ));
        assert!(w.gateways.structural.update(&reporter, issue.id, resolve.clone()).await.is_ok());
        assert!(w.gateways.structural.update(&admin, issue.id, resolve).await.is_ok());
    }

    #[tokio::test]
    async fn delete_requires_full_access() {
        let w = world().await;
        let admin = w.admin().await;
        let staff = w.member("staff@aurora.test", &[(Module::Tasks, PermissionLevel::ReadWrite)]).await;
        let t = w
            .gateways
            .tasks
            .create(&admin, task("Fix pump", Some(staff.user_id())))
            .await
            .unwrap();

        assert!(matches!(
            w.gateways.tasks.delete(&staff, t.id).await,
            Err(GatewayError::Forbidden(AuthzError::InsufficientLevel { .. }))
        ));
        w.gateways.tasks.delete(&admin, t.id).await.unwrap();
    }

    #[tokio::test]
    async fn hidden_module_is_rejected() {
        let w = world().await;
        let resident = w.member("resident@aurora.test", &[(Module::Water, PermissionLevel::ReadOnly)]).await;

        assert!(matches!(
            w.gateways.suppliers.list(&resident, &Default::default()).await,
            Err(GatewayError::Forbidden(AuthzError::ModuleHidden(Module::Suppliers)))
        ));
    }

    #[tokio::test]
    async fn consumption_over_limit_notifies_water_subscribers() {
        let w = world().await;
        w.set_water_limit(15.0).await;
        let admin = w.admin().await;
        w.member_of(
            w.enterprise.id,
            "watcher@aurora.test",
            Role::Staff,
            &[(Module::Water, PermissionLevel::ReadOnly)],
            &[Module::Water],
        )
        .await;

        let r = w
            .gateways
            .water
            .create(&admin, reading("A-101", 120.0, Some(100.0)))
            .await
            .unwrap();

        assert_eq!(r.consumption(), 20.0);
        let sent = w.sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].email, "watcher@aurora.test");
    }

    #[tokio::test]
    async fn consumption_under_limit_stays_quiet() {
        let w = world().await;
        w.set_water_limit(25.0).await;
        let admin = w.admin().await;
        w.member_of(
            w.enterprise.id,
            "watcher@aurora.test",
            Role::Staff,
            &[(Module::Water, PermissionLevel::ReadOnly)],
            &[Module::Water],
        )
        .await;

        w.gateways
            .water
            .create(&admin, reading("A-101", 120.0, Some(100.0)))
            .await
            .unwrap();

        assert!(w.sink.sent().is_empty());
    }

    #[tokio::test]
    async fn previous_reading_is_inferred_from_the_unit_history() {
        let w = world().await;
        let admin = w.admin().await;

        w.gateways.water.create(&admin, reading("B-2", 50.0, None)).await.unwrap();
        let second = w.gateways.water.create(&admin, reading("B-2", 58.5, None)).await.unwrap();
        assert_eq!(second.previous_reading, 50.0);
        assert_eq!(second.consumption(), 8.5);

        let before = w.client.total_writes();
        let err = w
            .gateways
            .water
            .create(&admin, reading("B-2", 40.0, None))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Domain(DomainError::Validation(_))));
        assert_eq!(w.client.total_writes(), before);
    }

    #[tokio::test]
    async fn deleting_a_membership_removes_exactly_that_pairing() {
        let w = world().await;
        let admin = w.admin().await;
        let other_enterprise = EnterpriseId::new();

        let staff = w.member("staff@aurora.test", &[(Module::Tasks, PermissionLevel::ReadOnly)]).await;
        let elsewhere = Membership::provision(
            staff.user_id(),
            other_enterprise,
            Role::Resident,
            PermissionMap::new(),
            NotificationMap::new(),
            Utc::now(),
        );
        w.tables.memberships.insert(&elsewhere).await.unwrap();
        let colleague = w.member("colleague@aurora.test", &[]).await;

        w.gateways
            .admin
            .delete_membership(&admin, staff.user_id())
            .await
            .unwrap();

        let remaining = w.tables.memberships.find(&Query::all()).await.unwrap();
        assert!(!remaining.iter().any(|m| m.id == staff.membership().id));
        assert!(remaining.iter().any(|m| m.id == elsewhere.id));
        assert!(remaining.iter().any(|m| m.id == colleague.membership().id));
        assert!(remaining.iter().any(|m| m.id == admin.membership().id));
        assert_eq!(remaining.len(), 3);
    }

    #[tokio::test]
    async fn every_successful_mutation_appends_one_audit_entry() {
        let w = world().await;
        let admin = w.admin().await;

        let t = w.gateways.tasks.create(&admin, task("Fix pump", None)).await.unwrap();
        w.gateways
            .tasks
            .update(
                &admin,
                t.id,
                TaskPatch {
                    title: Some("Fix main pump".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        w.gateways.tasks.delete(&admin, t.id).await.unwrap();

        let entries = w
            .gateways
            .admin
            .audit_logs(&admin, &AuditFilter::default())
            .await
            .unwrap();
        let actions: Vec<AuditAction> = entries.iter().map(|e| e.action).collect();
        assert_eq!(actions.len(), 3);
        for expected in [AuditAction::CreateTask, AuditAction::UpdateTask, AuditAction::DeleteTask] {
            assert!(actions.contains(&expected));
        }
        assert!(entries.iter().all(|e| e.user_email == "admin@aurora.test"));
    }

    #[tokio::test]
    async fn validation_failure_writes_nothing_and_is_not_audited() {
        let w = world().await;
        let admin = w.admin().await;
        let before = w.client.total_writes();

        let err = w.gateways.tasks.create(&admin, task("   ", None)).await.unwrap_err();

        assert!(matches!(err, GatewayError::Domain(DomainError::Validation(_))));
        assert_eq!(w.client.total_writes(), before);
        assert_eq!(w.audit_count(&admin).await, 0);
    }

    #[tokio::test]
    async fn failing_audit_hook_does_not_fail_the_mutation() {
        let w = world_with(CountingClient::failing("audit_logs")).await;
        let admin = w.admin().await;

        let t = w.gateways.tasks.create(&admin, task("Fix pump", None)).await.unwrap();

        assert_eq!(w.gateways.tasks.get(&admin, t.id).await.unwrap(), t);
        assert_eq!(w.audit_count(&admin).await, 0);
    }

    #[tokio::test]
    async fn records_of_another_enterprise_are_not_found() {
        let w = world().await;
        let admin = w.admin().await;
        let foreign = w
            .member_of(
                EnterpriseId::new(),
                "foreign@elsewhere.test",
                Role::Admin,
                &[],
                &[],
            )
            .await;
        let t = w.gateways.tasks.create(&admin, task("Fix pump", None)).await.unwrap();

        assert!(matches!(
            w.gateways.tasks.get(&foreign, t.id).await,
            Err(GatewayError::Store(StoreError::NotFound { .. }))
        ));
        assert!(w.gateways.tasks.list(&foreign, &Default::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn equipment_delete_also_removes_its_history() {
        let w = world().await;
        let admin = w.admin().await;
        let pump = w
            .gateways
            .equipment
            .create(
                &admin,
                NewEquipment {
                    name: "Booster pump".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        for description in ["Seal replaced", "Bearing check"] {
            w.gateways
                .equipment
                .add_maintenance(
                    &admin,
                    pump.id,
                    NewMaintenance {
                        description: description.into(),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();
        }
        assert_eq!(w.gateways.equipment.history(&admin, pump.id).await.unwrap().len(), 2);

        w.gateways.equipment.delete(&admin, pump.id).await.unwrap();

        let left = w
            .tables
            .maintenance
            .list(w.enterprise.id)
            .await
            .unwrap();
        assert!(left.is_empty());
    }

    #[tokio::test]
    async fn category_rules_are_enforced() {
        let w = world().await;
        let admin = w.admin().await;
        let editor = w
            .member("editor@aurora.test", &[(Module::Equipment, PermissionLevel::ReadWrite)])
            .await;

        let new_category = NewCategory {
            name: "Elevators".into(),
            attributes: vec!["capacity".into()],
        };
        assert!(matches!(
            w.gateways.equipment.create_category(&editor, new_category.clone()).await,
            Err(GatewayError::Forbidden(_))
        ));

        let category = w
            .gateways
            .equipment
            .create_category(&admin, new_category.clone())
            .await
            .unwrap();
        assert!(matches!(
            w.gateways.equipment.create_category(&admin, new_category).await,
            Err(GatewayError::Domain(DomainError::Conflict(_)))
        ));

        let lift = w
            .gateways
            .equipment
            .create(
                &editor,
                NewEquipment {
                    name: "Lift A".into(),
                    category_id: Some(category.id),
                    attributes: [("capacity".to_string(), "8".to_string())].into_iter().collect(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let undeclared = EquipmentPatch {
            attributes: Some([("colour".to_string(), "red".to_string())].into_iter().collect()),
            ..Default::default()
        };
        assert!(matches!(
            w.gateways.equipment.update(&editor, lift.id, undeclared).await,
            Err(GatewayError::Domain(DomainError::Validation(_)))
        ));

        assert!(matches!(
            w.gateways.equipment.delete_category(&admin, category.id).await,
            Err(GatewayError::Domain(DomainError::Conflict(_)))
        ));
    }

    #[tokio::test]
    async fn structural_alert_reaches_opted_in_admins() {
        let w = world().await;
        let reporter = w
            .member("reporter@aurora.test", &[(Module::Structural, PermissionLevel::ReadWrite)])
            .await;
        w.member_of(
            w.enterprise.id,
            "boss@aurora.test",
            Role::Admin,
            &[],
            &[Module::Structural],
        )
        .await;

        let detail = w
            .gateways
            .structural
            .create(
                &reporter,
                NewIssue {
                    title: "Water leak in basement".into(),
                    notify_admin: true,
                    photos: vec!["https://cdn.test/leak-1.jpg".into(), "https://cdn.test/leak-2.jpg".into()],
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(detail.photos.len(), 2);
        let sent = w.sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].email, "boss@aurora.test");
    }

    #[tokio::test]
    async fn admin_adds_an_existing_account_to_the_enterprise() {
        let w = world().await;
        let admin = w.admin().await;
        let outsider = w
            .member_of(EnterpriseId::new(), "shared@aurora.test", Role::Staff, &[], &[])
            .await;

        let member = w
            .gateways
            .admin
            .create_member(
                &admin,
                NewMember {
                    email: "Shared@Aurora.test".into(),
                    display_name: None,
                    password: None,
                    role: Role::Admin,
                    permissions: PermissionMap::new(),
                    notifications: NotificationMap::new(),
                },
            )
            .await
            .unwrap();

        assert_eq!(member.membership.user_id, outsider.user_id());
        assert_eq!(
            member.membership.permissions.get(Module::Water),
            Some(PermissionLevel::FullAccess)
        );

        let again = w
            .gateways
            .admin
            .create_member(
                &admin,
                NewMember {
                    email: "shared@aurora.test".into(),
                    display_name: None,
                    password: None,
                    role: Role::Staff,
                    permissions: PermissionMap::new(),
                    notifications: NotificationMap::new(),
                },
            )
            .await;
        assert!(matches!(again, Err(GatewayError::Domain(DomainError::Conflict(_)))));
    }

    #[tokio::test]
    async fn structural_delete_survives_an_unreadable_photo_table() {
        let w = world_with(CountingClient::unreadable("issue_photos")).await;
        let admin = w.admin().await;
        let issue = w
            .gateways
            .structural
            .create(
                &admin,
                NewIssue {
                    title: "Loose railing".into(),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .issue;

        w.gateways.structural.delete(&admin, issue.id).await.unwrap();

        assert!(matches!(
            w.gateways.structural.get(&admin, issue.id).await,
            Err(GatewayError::Store(StoreError::NotFound { .. }))
        ));
        let deletions = w
            .gateways
            .admin
            .audit_logs(
                &admin,
                &AuditFilter {
                    action: Some(AuditAction::DeleteIssue),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(deletions.len(), 1);
    }

    fn document(title: &str, category: &str, expires_on: Option<NaiveDate>) -> NewDocument {
        NewDocument {
            title: title.to_string(),
            category: Some(category.to_string()),
            file_url: format!("https://files.test/{}.pdf", title.to_lowercase().replace(' ', "-")),
            expires_on,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn documents_lifecycle_is_audited() {
        let w = world().await;
        let admin = w.admin().await;

        let doc = w
            .gateways
            .documents
            .create(&admin, document("Elevator permit", "permits", None))
            .await
            .unwrap();
        assert_eq!(doc.file_name, "elevator-permit.pdf");
        assert_eq!(doc.uploaded_by, admin.user_id());

        let updated = w
            .gateways
            .documents
            .update(
                &admin,
                doc.id,
                DocumentPatch {
                    title: Some("Elevator operating permit".into()),
                    description: Some(Some("Renewed yearly".into())),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Elevator operating permit");
        assert_eq!(w.gateways.documents.get(&admin, doc.id).await.unwrap(), updated);

        let permits = w
            .gateways
            .documents
            .list(
                &admin,
                &DocumentFilter {
                    category: Some("permits".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(permits.len(), 1);

        w.gateways.documents.delete(&admin, doc.id).await.unwrap();
        assert!(matches!(
            w.gateways.documents.get(&admin, doc.id).await,
            Err(GatewayError::Store(StoreError::NotFound { .. }))
        ));

        let entries = w
            .gateways
            .admin
            .audit_logs(&admin, &AuditFilter::default())
            .await
            .unwrap();
        let actions: Vec<AuditAction> = entries.iter().map(|e| e.action).collect();
        assert_eq!(actions.len(), 3);
        for expected in [
            AuditAction::UploadDocument,
            AuditAction::UpdateDocument,
            AuditAction::DeleteDocument,
        ] {
            assert!(actions.contains(&expected));
        }
    }

    #[tokio::test]
    async fn expiring_documents_include_lapsed_ones_soonest_first() {
        let w = world().await;
        let admin = w.admin().await;
        let today = Utc::now().date_naive();

        for (title, expires_on) in [
            ("Insurance policy", Some(today + Duration::days(10))),
            ("Fire inspection", Some(today - Duration::days(5))),
            ("Boiler certificate", Some(today + Duration::days(90))),
            ("House rules", None),
        ] {
            w.gateways
                .documents
                .create(&admin, document(title, "compliance", expires_on))
                .await
                .unwrap();
        }

        let expiring = w.gateways.documents.expiring(&admin, 30).await.unwrap();
        let titles: Vec<&str> = expiring.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, ["Fire inspection", "Insurance policy"]);
    }

    fn supplier(name: &str, service_type: &str) -> NewSupplier {
        NewSupplier {
            name: name.to_string(),
            service_type: Some(service_type.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn suppliers_are_sorted_filtered_and_shared_for_editing() {
        let w = world().await;
        let admin = w.admin().await;
        let staff = w
            .member("staff@aurora.test", &[(Module::Suppliers, PermissionLevel::ReadWrite)])
            .await;

        let lifts = w
            .gateways
            .suppliers
            .create(&admin, supplier("Zenith Lifts", "Elevator"))
            .await
            .unwrap();
        w.gateways
            .suppliers
            .create(&staff, supplier("bright gardens", "Landscaping"))
            .await
            .unwrap();
        w.gateways
            .suppliers
            .create(&admin, supplier("Acme Cleaning", "Cleaning"))
            .await
            .unwrap();

        let all = w.gateways.suppliers.list(&staff, &SupplierFilter::default()).await.unwrap();
        let names: Vec<&str> = all.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Acme Cleaning", "bright gardens", "Zenith Lifts"]);

        let elevator = w
            .gateways
            .suppliers
            .list(
                &staff,
                &SupplierFilter {
                    service_type: Some("elevator".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(elevator.len(), 1);
        assert_eq!(elevator[0].id, lifts.id);

        let searched = w
            .gateways
            .suppliers
            .list(
                &staff,
                &SupplierFilter {
                    search: Some("GARDEN".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(searched.len(), 1);

        // Not owner-scoped: READ_WRITE edits a supplier someone else added.
        let rated = w
            .gateways
            .suppliers
            .update(
                &staff,
                lifts.id,
                SupplierPatch {
                    rating: Some(Some(4)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(rated.rating, Some(4));
        assert_eq!(w.gateways.suppliers.get(&admin, lifts.id).await.unwrap().rating, Some(4));

        assert!(matches!(
            w.gateways.suppliers.delete(&staff, lifts.id).await,
            Err(GatewayError::Forbidden(AuthzError::InsufficientLevel { .. }))
        ));
        w.gateways.suppliers.delete(&admin, lifts.id).await.unwrap();
        assert_eq!(
            w.gateways.suppliers.list(&admin, &SupplierFilter::default()).await.unwrap().len(),
            2
        );

        let entries = w
            .gateways
            .admin
            .audit_logs(&admin, &AuditFilter::default())
            .await
            .unwrap();
        let count = |action| entries.iter().filter(|e| e.action == action).count();
        assert_eq!(count(AuditAction::CreateSupplier), 3);
        assert_eq!(count(AuditAction::UpdateSupplier), 1);
        assert_eq!(count(AuditAction::DeleteSupplier), 1);
    }

    #[tokio::test]
    async fn assignee_is_notified_on_create_and_update() {
        let w = world().await;
        let admin = w.admin().await;
        let assignee = w
            .member_of(
                w.enterprise.id,
                "ana@aurora.test",
                Role::Staff,
                &[(Module::Tasks, PermissionLevel::ReadWrite)],
                &[Module::Tasks],
            )
            .await;

        let t = w
            .gateways
            .tasks
            .create(
                &admin,
                NewTask {
                    notify_assignee: true,
                    ..task("Fix pump", Some(assignee.user_id()))
                },
            )
            .await
            .unwrap();

        w.gateways
            .tasks
            .update(
                &admin,
                t.id,
                TaskPatch {
                    title: Some("Fix main pump".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let sent = w.sink.sent();
        let subjects: Vec<&str> = sent.iter().map(|n| n.subject.as_str()).collect();
        assert_eq!(subjects, ["New task: Fix pump", "Task updated: Fix main pump"]);
        assert!(sent.iter().all(|n| n.recipient == assignee.user_id() && n.email == "ana@aurora.test"));
    }

    #[tokio::test]
    async fn assignee_without_opt_in_is_not_notified() {
        let w = world().await;
        let admin = w.admin().await;
        let assignee = w.member("quiet@aurora.test", &[(Module::Tasks, PermissionLevel::ReadWrite)]).await;

        w.gateways
            .tasks
            .create(
                &admin,
                NewTask {
                    notify_assignee: true,
                    ..task("Paint hallway", Some(assignee.user_id()))
                },
            )
            .await
            .unwrap();

        assert!(w.sink.sent().is_empty());
    }
}
