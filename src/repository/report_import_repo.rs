// ==========================================
// 快递报表导入系统 - 报表导入 Repository Trait
// ==========================================
// 职责: 定义导入相关数据访问接口（不包含业务逻辑）
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::delivery::CanonicalDeliveryRecord;
use crate::domain::import::ImportLog;
use crate::domain::pickup::{AggregatedPickupRecord, CanonicalPickupRecord};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use chrono::NaiveDate;

/// 日期区间（闭区间，None 表示不限）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

// ==========================================
// ReportImportRepository Trait
// ==========================================
// 实现者: ReportImportRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait ReportImportRepository: Send + Sync {
    // ===== 导入日志 =====

    /// 创建导入日志（通常为 processing 状态）
    async fn create_import_log(&self, log: &ImportLog) -> RepositoryResult<()>;

    /// 更新导入日志（状态、计数、错误、耗时）
    async fn update_import_log(&self, log: &ImportLog) -> RepositoryResult<()>;

    /// 按批次 ID 查询导入日志
    async fn get_import_log(&self, batch_id: &str) -> RepositoryResult<Option<ImportLog>>;

    /// 最近的导入日志（按导入时间倒序）
    async fn list_recent_import_logs(&self, limit: usize) -> RepositoryResult<Vec<ImportLog>>;

    // ===== 批量写入（事务化）=====

    /// 批量插入配送日报
    ///
    /// # 返回
    /// - Ok(usize): 插入条数
    /// - Err: 数据库错误（整个事务回滚）
    async fn insert_delivery_records(
        &self,
        batch_id: &str,
        records: &[CanonicalDeliveryRecord],
    ) -> RepositoryResult<usize>;

    /// 批量插入揽收明细与日汇总（同一事务）
    ///
    /// # 返回
    /// - Ok(usize): 插入的日汇总条数
    async fn insert_pickup_records(
        &self,
        batch_id: &str,
        raw_records: &[CanonicalPickupRecord],
        summaries: &[AggregatedPickupRecord],
    ) -> RepositoryResult<usize>;

    /// 删除批次（日志及其全部记录）
    async fn delete_batch(&self, batch_id: &str) -> RepositoryResult<usize>;

    // ===== 查询 =====

    async fn list_delivery_records(
        &self,
        range: DateRange,
    ) -> RepositoryResult<Vec<CanonicalDeliveryRecord>>;

    /// 揽收明细（按执行日期优先、其次创建日期过滤）
    async fn list_pickup_records(
        &self,
        range: DateRange,
    ) -> RepositoryResult<Vec<CanonicalPickupRecord>>;

    async fn list_pickup_summaries(
        &self,
        range: DateRange,
    ) -> RepositoryResult<Vec<AggregatedPickupRecord>>;

    async fn count_delivery_records(&self) -> RepositoryResult<usize>;

    async fn count_pickup_records(&self) -> RepositoryResult<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_contains() {
        let d = |day| NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
        let range = DateRange::new(Some(d(10)), Some(d(20)));
        assert!(range.contains(d(10)));
        assert!(range.contains(d(20)));
        assert!(!range.contains(d(21)));
        assert!(DateRange::default().contains(d(1)));
    }
}
