//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_service;
mod inquiry_lifecycle_service;
mod role_admin_service;
mod status_analytics;
mod status_history_service;

pub use authorization_service::{AuthorizationGuard, CustomerAccess, PermissionCheck};
pub use inquiry_lifecycle_service::{
    InquiryLifecycleService, InquiryRepository, TransitionInquiryInput,
};
pub use role_admin_service::{CreateRoleInput, RoleAdminService, RoleRepository};
pub use status_analytics::{
    ActionableInquiries, ActionableOrders, ActionablePolicy, StatusBadge, StatusStatistics,
    actionable_inquiries, actionable_orders, calculate_status_distribution,
    filter_inquiries_by_statuses, filter_orders_by_statuses, format_status_for_display,
    generate_inquiry_status_statistics, generate_order_status_statistics, inquiry_status_badge,
    order_status_badge, sort_orders_by_status_priority,
};
pub use status_history_service::{
    DateRange, NewStatusChange, StatusHistoryLedger, StatusHistoryQuery, StatusHistoryRepository,
    StatusTimelineEntry,
};
