// ==========================================
// 快递报表导入系统 - 看板服务
// ==========================================
// 职责: 按 DashboardContext 读取已落库数据并计算看板视图
// 架构: 看板服务 → Repository（只读）→ 统计函数（纯计算）
// ==========================================

use crate::analytics::context::{DashboardContext, Page};
use crate::analytics::delivery_stats::{
    self, CourierDeliveryStats, DailyDeliveryStats, DeliveryPeriodStats, DepartmentStats,
};
use crate::analytics::pickup_stats::{
    self, CountryDirection, CountryStats, CourierPickupStats, PickupPeriodStats, StatusField,
    StatusShare,
};
use crate::config::IngestConfig;
use crate::domain::delivery::CanonicalDeliveryRecord;
use crate::domain::pickup::AggregatedPickupRecord;
use crate::importer::pickup_aggregator::PickupAggregator;
use crate::repository::{ReportImportRepository, RepositoryResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// 排行榜默认条数
pub const DEFAULT_TOP_COURIERS: usize = 10;

// ==========================================
// 看板视图
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryDashboard {
    pub period: DeliveryPeriodStats,
    pub daily_trend: Vec<DailyDeliveryStats>,
    pub top_couriers: Vec<CourierDeliveryStats>,
    pub departments: Vec<DepartmentStats>,
    pub insights: Vec<String>,
    pub records: Page<CanonicalDeliveryRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupDashboard {
    pub period: PickupPeriodStats,
    pub top_couriers: Vec<CourierPickupStats>,
    pub status_distribution: Vec<StatusShare>,
    pub countries: Vec<CountryStats>,
    pub records: Page<AggregatedPickupRecord>,
}

// ==========================================
// DashboardService
// ==========================================
pub struct DashboardService<R>
where
    R: ReportImportRepository,
{
    repo: R,
    aggregator: PickupAggregator,
    top_couriers: usize,
}

impl<R> DashboardService<R>
where
    R: ReportImportRepository,
{
    pub fn new(repo: R, config: &IngestConfig) -> Self {
        Self {
            repo,
            aggregator: PickupAggregator::new(config.success_statuses.clone(), false),
            top_couriers: DEFAULT_TOP_COURIERS,
        }
    }

    pub fn with_top_couriers(mut self, limit: usize) -> Self {
        self.top_couriers = limit;
        self
    }

    /// 配送看板
    #[instrument(skip(self, ctx))]
    pub async fn delivery_dashboard(&self, ctx: &DashboardContext) -> RepositoryResult<DeliveryDashboard> {
        let records: Vec<CanonicalDeliveryRecord> = self
            .repo
            .list_delivery_records(ctx.filter.date_range())
            .await?
            .into_iter()
            .filter(|r| ctx.filter.matches_delivery(r))
            .collect();
        debug!(records = records.len(), "配送记录筛选完成");

        let period = delivery_stats::period_stats(&records);
        let top_couriers = delivery_stats::courier_ranking(&records, self.top_couriers);
        let departments = delivery_stats::department_stats(&records);
        let insights = delivery_stats::insights(&period, &top_couriers, &departments);

        Ok(DeliveryDashboard {
            daily_trend: delivery_stats::daily_stats(&records),
            records: ctx.paginate(&records),
            period,
            top_couriers,
            departments,
            insights,
        })
    }

    /// 揽收看板
    #[instrument(skip(self, ctx))]
    pub async fn pickup_dashboard(&self, ctx: &DashboardContext) -> RepositoryResult<PickupDashboard> {
        let range = ctx.filter.date_range();
        let raws: Vec<_> = self
            .repo
            .list_pickup_records(range)
            .await?
            .into_iter()
            .filter(|r| ctx.filter.matches_pickup(r))
            .collect();
        let summaries: Vec<_> = self
            .repo
            .list_pickup_summaries(range)
            .await?
            .into_iter()
            .filter(|s| ctx.filter.matches_summary(s))
            .collect();
        debug!(raw = raws.len(), summaries = summaries.len(), "揽收记录筛选完成");

        Ok(PickupDashboard {
            period: pickup_stats::period_stats(&raws, &self.aggregator),
            top_couriers: pickup_stats::courier_ranking(&summaries, self.top_couriers),
            status_distribution: pickup_stats::status_distribution(&raws, StatusField::Shipment),
            countries: pickup_stats::country_stats(&raws, CountryDirection::Recipient),
            records: ctx.paginate(&summaries),
        })
    }
}
