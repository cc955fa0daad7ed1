//! End-to-end flow against an in-memory database: configure rules through
//! the repositories, snapshot through the cache, evaluate a quote.
//! Run: cargo test -p admin-server --test engine_flow

use rust_decimal::Decimal;

use admin_server::db::DbService;
use admin_server::db::models::{
    ChargeRuleCreate, ChargeType, InsurancePlanCreate, PaymentSettingsUpdate, TaxRuleCreate,
    TaxType,
};
use admin_server::db::repository::{
    ChargeRuleRepository, InsurancePlanRepository, PaymentSettingsRepository, RepoError,
    TaxRuleRepository,
};
use admin_server::pricing::{NoSurcharge, OrderContext, RuleKind, SnapshotCache, evaluate};

fn tax_create(code: &str, rate: i64) -> TaxRuleCreate {
    TaxRuleCreate {
        name: format!("Tax {}", code),
        code: code.to_string(),
        description: None,
        display_label: None,
        tax_type: TaxType::Gst,
        rate: Decimal::from(rate),
        base: None,
        inclusive: None,
        apply_after_discount: None,
        priority: None,
        condition: None,
        enabled: None,
    }
}

fn charge_create(code: &str, amount: i64, taxable: bool) -> ChargeRuleCreate {
    ChargeRuleCreate {
        name: format!("Charge {}", code),
        code: code.to_string(),
        description: None,
        charge_type: ChargeType::Fixed,
        amount: Some(Decimal::from(amount)),
        percent: None,
        tiers: None,
        apply_to: None,
        payment_methods: None,
        condition: None,
        taxable: Some(taxable),
        is_refundable: None,
        apply_after_discount: None,
        priority: None,
        enabled: None,
    }
}

#[tokio::test]
async fn quote_reflects_configured_rules() {
    let db = DbService::memory().await.unwrap();
    let cache = SnapshotCache::new();

    TaxRuleRepository::new(db.db.clone())
        .create(tax_create("gst", 18))
        .await
        .unwrap();
    ChargeRuleRepository::new(db.db.clone())
        .create(charge_create("handling", 50, true))
        .await
        .unwrap();

    let ctx = OrderContext {
        subtotal: Decimal::from(1000),
        ..Default::default()
    };

    let snapshot = cache.snapshot(&db).await.unwrap();
    let breakdown = evaluate(&ctx, &snapshot, &NoSurcharge).unwrap();

    assert_eq!(breakdown.subtotal, Decimal::from(1000));
    assert_eq!(breakdown.charges_total, Decimal::from(50));
    // 18% of 1050: the handling charge is taxable
    assert_eq!(breakdown.taxes_total, Decimal::new(18900, 2));
    assert_eq!(breakdown.grand_total, Decimal::new(123900, 2));
}

#[tokio::test]
async fn cache_invalidation_picks_up_new_rules() {
    let db = DbService::memory().await.unwrap();
    let cache = SnapshotCache::new();

    let repo = TaxRuleRepository::new(db.db.clone());
    repo.create(tax_create("gst", 18)).await.unwrap();

    let first = cache.snapshot(&db).await.unwrap();
    assert_eq!(first.taxes.len(), 1);

    repo.create(tax_create("cess", 1)).await.unwrap();

    // Stale until invalidated
    let stale = cache.snapshot(&db).await.unwrap();
    assert_eq!(stale.taxes.len(), 1);

    cache.invalidate(RuleKind::Tax);
    let fresh = cache.snapshot(&db).await.unwrap();
    assert_eq!(fresh.taxes.len(), 2);
}

#[tokio::test]
async fn duplicate_rule_codes_rejected() {
    let db = DbService::memory().await.unwrap();
    let repo = TaxRuleRepository::new(db.db.clone());

    repo.create(tax_create("gst", 18)).await.unwrap();
    let err = repo.create(tax_create("gst", 12)).await.unwrap_err();
    assert!(matches!(err, RepoError::Duplicate(_)));
}

#[tokio::test]
async fn disabled_rules_left_out_of_snapshot() {
    let db = DbService::memory().await.unwrap();
    let cache = SnapshotCache::new();

    let repo = TaxRuleRepository::new(db.db.clone());
    let rule = repo.create(tax_create("gst", 18)).await.unwrap();
    let id = rule.id.as_ref().unwrap().to_string();

    repo.set_enabled(&id, false).await.unwrap();
    cache.invalidate(RuleKind::Tax);

    let snapshot = cache.snapshot(&db).await.unwrap();
    assert!(snapshot.taxes.is_empty());
}

#[tokio::test]
async fn optional_plan_applies_only_when_selected() {
    let db = DbService::memory().await.unwrap();
    let cache = SnapshotCache::new();

    InsurancePlanRepository::new(db.db.clone())
        .create(InsurancePlanCreate {
            name: "Standard cover".to_string(),
            code: "standard".to_string(),
            description: None,
            min_order_value: Decimal::from(500),
            max_order_value: None,
            premium_percent: Decimal::from(2),
            min_premium: Decimal::from(20),
            max_premium: Some(Decimal::from(200)),
            coverage_percentage: None,
            claim_processing_days: None,
            mandatory: None,
            condition: None,
            priority: None,
            enabled: None,
        })
        .await
        .unwrap();

    let snapshot = cache.snapshot(&db).await.unwrap();

    // Nothing selected: the optional plan stays out of the quote
    let ctx = OrderContext {
        subtotal: Decimal::from(1000),
        ..Default::default()
    };
    let breakdown = evaluate(&ctx, &snapshot, &NoSurcharge).unwrap();
    assert!(breakdown.insurance.is_none());
    assert_eq!(breakdown.grand_total, Decimal::from(1000));

    // Selecting it applies it
    let ctx = OrderContext {
        subtotal: Decimal::from(1000),
        selected_plan: Some("standard".to_string()),
        ..Default::default()
    };
    let breakdown = evaluate(&ctx, &snapshot, &NoSurcharge).unwrap();

    let insurance = breakdown.insurance.expect("selected plan should apply");
    assert_eq!(insurance.code, "standard");
    assert!(!insurance.auto_applied);
    // 2% of 1000
    assert_eq!(insurance.premium, Decimal::new(2000, 2));
    assert_eq!(breakdown.grand_total, Decimal::new(102000, 2));
}

#[tokio::test]
async fn payment_settings_upsert_roundtrip() {
    let db = DbService::memory().await.unwrap();
    let repo = PaymentSettingsRepository::new(db.db.clone());

    // Absent record falls back to defaults
    let initial = repo.get().await.unwrap();
    assert!(initial.cod_enabled);
    assert!(initial.online_enabled);

    let updated = repo
        .update(PaymentSettingsUpdate {
            cod_enabled: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(!updated.cod_enabled);

    // Second read comes from the stored record
    let reread = repo.get().await.unwrap();
    assert!(!reread.cod_enabled);
    assert!(reread.online_enabled);
}

#[tokio::test]
async fn reorder_changes_evaluation_order() {
    let db = DbService::memory().await.unwrap();
    let repo = ChargeRuleRepository::new(db.db.clone());

    let a = repo.create(charge_create("a", 10, false)).await.unwrap();
    let b = repo.create(charge_create("b", 20, false)).await.unwrap();

    repo.reorder(vec![
        admin_server::db::repository::ReorderItem {
            id: a.id.as_ref().unwrap().to_string(),
            priority: 2,
        },
        admin_server::db::repository::ReorderItem {
            id: b.id.as_ref().unwrap().to_string(),
            priority: 1,
        },
    ])
    .await
    .unwrap();

    let cache = SnapshotCache::new();
    let snapshot = cache.snapshot(&db).await.unwrap();
    let codes: Vec<&str> = snapshot.charges.iter().map(|c| c.code.as_str()).collect();
    assert_eq!(codes, vec!["b", "a"]);
}
