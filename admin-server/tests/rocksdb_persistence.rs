//! Rules and the seeded admin must survive a database reopen.
//! Run: cargo test -p admin-server --test rocksdb_persistence

use rust_decimal::Decimal;

use admin_server::db::DbService;
use admin_server::db::models::{TaxRuleCreate, TaxType};
use admin_server::db::repository::{AdminUserRepository, TaxRuleRepository};

#[tokio::test]
async fn rules_and_seed_survive_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().to_string_lossy().to_string();

    {
        let db = DbService::new(&dir).await.unwrap();
        db.seed_default_admin("root", "change-me").await.unwrap();

        TaxRuleRepository::new(db.db.clone())
            .create(TaxRuleCreate {
                name: "GST".to_string(),
                code: "gst".to_string(),
                description: None,
                display_label: None,
                tax_type: TaxType::Gst,
                rate: Decimal::from(18),
                base: None,
                inclusive: None,
                apply_after_discount: None,
                priority: None,
                condition: None,
                enabled: None,
            })
            .await
            .unwrap();
    }

    let db = DbService::new(&dir).await.unwrap();

    let rules = TaxRuleRepository::new(db.db.clone()).find_all().await.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].code, "gst");

    // Seeding again must not create a second admin
    db.seed_default_admin("root", "change-me").await.unwrap();
    let users = AdminUserRepository::new(db.db.clone());
    assert_eq!(users.count().await.unwrap(), 1);
    let admin = users.find_by_username("root").await.unwrap().unwrap();
    assert!(admin.verify_password("change-me"));
}
