// ==========================================
// 快递报表导入系统 - 统计分析层
// ==========================================
// 职责: 看板上下文、配送/揽收统计、看板服务
// 红线: 统计函数为纯计算，不访问数据库
// ==========================================

pub mod context;
pub mod dashboard;
pub mod delivery_stats;
pub mod pickup_stats;

pub use context::{DashboardContext, DashboardFilter, Page};
pub use dashboard::{DashboardService, DeliveryDashboard, PickupDashboard};
pub use delivery_stats::{DeliveryPeriodStats, PeriodComparison};
pub use pickup_stats::{CountryDirection, PickupPeriodStats, StatusField};
