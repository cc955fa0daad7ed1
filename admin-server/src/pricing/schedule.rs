//! Surcharge schedules
//!
//! A schedule decides the percentage uplift applied to an insurance premium
//! after clamping. The strategy is injected so deployments can price risk
//! differently without touching the engine.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::db::models::InsurancePlan;
use crate::pricing::context::OrderContext;

/// Premium uplift strategy
pub trait SurchargeSchedule: Send + Sync {
    /// Percentage added to the clamped premium (5 means +5%)
    fn uplift_percent(&self, plan: &InsurancePlan, ctx: &OrderContext) -> Decimal;
}

/// No uplift ever
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSurcharge;

impl SurchargeSchedule for NoSurcharge {
    fn uplift_percent(&self, _plan: &InsurancePlan, _ctx: &OrderContext) -> Decimal {
        Decimal::ZERO
    }
}

/// Flat percentages per risk factor, summed when several apply
#[derive(Debug, Clone, Default)]
pub struct FlatSchedule {
    pub remote_percent: Decimal,
    pub fragile_percent: Decimal,
    pub electronics_percent: Decimal,
    /// Extra percentage per delivery zone code
    pub zone_percents: HashMap<String, Decimal>,
}

impl SurchargeSchedule for FlatSchedule {
    fn uplift_percent(&self, _plan: &InsurancePlan, ctx: &OrderContext) -> Decimal {
        let mut uplift = Decimal::ZERO;
        if ctx.is_remote {
            uplift += self.remote_percent;
        }
        if ctx.has_fragile_items {
            uplift += self.fragile_percent;
        }
        if ctx.has_electronics {
            uplift += self.electronics_percent;
        }
        if let Some(zone) = &ctx.zone
            && let Some(percent) = self.zone_percents.get(zone)
        {
            uplift += *percent;
        }
        uplift
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::insurance_plan::InsurancePlanCreate;

    fn make_plan() -> InsurancePlan {
        InsurancePlanCreate {
            name: "cover".to_string(),
            code: "cover".to_string(),
            description: None,
            min_order_value: Decimal::ZERO,
            max_order_value: None,
            premium_percent: Decimal::from(1),
            min_premium: Decimal::ZERO,
            max_premium: None,
            coverage_percentage: None,
            claim_processing_days: None,
            mandatory: None,
            condition: None,
            priority: None,
            enabled: None,
        }
        .into()
    }

    #[test]
    fn flat_schedule_sums_applicable_factors() {
        let schedule = FlatSchedule {
            remote_percent: Decimal::from(10),
            fragile_percent: Decimal::from(5),
            electronics_percent: Decimal::from(3),
            ..Default::default()
        };
        let plan = make_plan();
        let mut ctx = OrderContext::default();
        assert_eq!(schedule.uplift_percent(&plan, &ctx), Decimal::ZERO);

        ctx.is_remote = true;
        ctx.has_fragile_items = true;
        assert_eq!(schedule.uplift_percent(&plan, &ctx), Decimal::from(15));
    }

    #[test]
    fn zone_uplift_matches_zone_code() {
        let schedule = FlatSchedule {
            zone_percents: HashMap::from([
                ("island".to_string(), Decimal::from(8)),
                ("north_east".to_string(), Decimal::from(4)),
            ]),
            ..Default::default()
        };
        let plan = make_plan();

        let mut ctx = OrderContext {
            zone: Some("island".to_string()),
            ..Default::default()
        };
        assert_eq!(schedule.uplift_percent(&plan, &ctx), Decimal::from(8));

        ctx.zone = Some("metro".to_string());
        assert_eq!(schedule.uplift_percent(&plan, &ctx), Decimal::ZERO);

        ctx.zone = None;
        assert_eq!(schedule.uplift_percent(&plan, &ctx), Decimal::ZERO);
    }
}
