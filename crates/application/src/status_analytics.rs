use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use fabriq_domain::{EntityType, Inquiry, InquiryStatus, Order, OrderStatus};

/// Display attributes for one status value.
///
/// `priority` is a display sort weight only; it is unrelated to the order of
/// the transition graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
    /// Human-readable status label.
    pub label: &'static str,
    /// Foreground color class.
    pub color: &'static str,
    /// Background color class.
    pub bg_color: &'static str,
    /// Display sort weight, lower sorts first.
    pub priority: u8,
}

/// Returns the fixed badge for an order status.
#[must_use]
pub fn order_status_badge(status: OrderStatus) -> StatusBadge {
    match status {
        OrderStatus::Requested => StatusBadge {
            label: "Requested",
            color: "text-amber-800",
            bg_color: "bg-amber-100",
            priority: 1,
        },
        OrderStatus::Quoted => StatusBadge {
            label: "Quoted",
            color: "text-sky-800",
            bg_color: "bg-sky-100",
            priority: 2,
        },
        OrderStatus::Confirmed => StatusBadge {
            label: "Confirmed",
            color: "text-blue-800",
            bg_color: "bg-blue-100",
            priority: 3,
        },
        OrderStatus::InProduction => StatusBadge {
            label: "In Production",
            color: "text-indigo-800",
            bg_color: "bg-indigo-100",
            priority: 4,
        },
        OrderStatus::Completed => StatusBadge {
            label: "Completed",
            color: "text-teal-800",
            bg_color: "bg-teal-100",
            priority: 5,
        },
        OrderStatus::Shipped => StatusBadge {
            label: "Shipped",
            color: "text-cyan-800",
            bg_color: "bg-cyan-100",
            priority: 6,
        },
        OrderStatus::Delivered => StatusBadge {
            label: "Delivered",
            color: "text-green-800",
            bg_color: "bg-green-100",
            priority: 7,
        },
        OrderStatus::Canceled => StatusBadge {
            label: "Canceled",
            color: "text-gray-600",
            bg_color: "bg-gray-100",
            priority: 8,
        },
    }
}

/// Returns the fixed badge for an inquiry status.
#[must_use]
pub fn inquiry_status_badge(status: InquiryStatus) -> StatusBadge {
    match status {
        InquiryStatus::New => StatusBadge {
            label: "New",
            color: "text-amber-800",
            bg_color: "bg-amber-100",
            priority: 1,
        },
        InquiryStatus::Accepted => StatusBadge {
            label: "Accepted",
            color: "text-blue-800",
            bg_color: "bg-blue-100",
            priority: 2,
        },
        InquiryStatus::InProgress => StatusBadge {
            label: "In Progress",
            color: "text-indigo-800",
            bg_color: "bg-indigo-100",
            priority: 3,
        },
        InquiryStatus::Closed => StatusBadge {
            label: "Closed",
            color: "text-green-800",
            bg_color: "bg-green-100",
            priority: 4,
        },
        InquiryStatus::Rejected => StatusBadge {
            label: "Rejected",
            color: "text-gray-600",
            bg_color: "bg-gray-100",
            priority: 5,
        },
    }
}

/// Status counts computed over a set of entity snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusStatistics {
    /// Kind of entity the counts describe.
    pub entity_type: EntityType,
    /// Count per status slug.
    pub status_counts: BTreeMap<String, u64>,
    /// Total number of counted entities.
    pub total_count: u64,
    /// When the counts were computed.
    pub computed_at: DateTime<Utc>,
}

/// Counts orders per derived status.
///
/// Always derives the status per order instead of reading a stored field, so
/// the counts cannot drift from the timestamps.
#[must_use]
pub fn generate_order_status_statistics(orders: &[Order]) -> StatusStatistics {
    let mut status_counts = BTreeMap::new();
    for order in orders {
        *status_counts
            .entry(order.status().as_str().to_owned())
            .or_insert(0) += 1;
    }

    StatusStatistics {
        entity_type: EntityType::Order,
        status_counts,
        total_count: orders.len() as u64,
        computed_at: Utc::now(),
    }
}

/// Counts inquiries per stored status.
#[must_use]
pub fn generate_inquiry_status_statistics(inquiries: &[Inquiry]) -> StatusStatistics {
    let mut status_counts = BTreeMap::new();
    for inquiry in inquiries {
        *status_counts
            .entry(inquiry.status.as_str().to_owned())
            .or_insert(0) += 1;
    }

    StatusStatistics {
        entity_type: EntityType::Inquiry,
        status_counts,
        total_count: inquiries.len() as u64,
        computed_at: Utc::now(),
    }
}

/// Keeps the orders whose derived status is in `statuses`, preserving input order.
#[must_use]
pub fn filter_orders_by_statuses(orders: &[Order], statuses: &[OrderStatus]) -> Vec<Order> {
    orders
        .iter()
        .filter(|order| statuses.contains(&order.status()))
        .cloned()
        .collect()
}

/// Keeps the inquiries whose status is in `statuses`, preserving input order.
#[must_use]
pub fn filter_inquiries_by_statuses(
    inquiries: &[Inquiry],
    statuses: &[InquiryStatus],
) -> Vec<Inquiry> {
    inquiries
        .iter()
        .filter(|inquiry| statuses.contains(&inquiry.status))
        .cloned()
        .collect()
}

/// Sorts orders by badge display priority. Stable: ties keep input order.
#[must_use]
pub fn sort_orders_by_status_priority(orders: &[Order]) -> Vec<Order> {
    let mut sorted = orders.to_vec();
    sorted.sort_by_key(|order| order_status_badge(order.status()).priority);
    sorted
}

/// Time windows driving the actionable-item classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionablePolicy {
    /// How long an issued quotation stays valid.
    pub quotation_valid_for: Duration,
    /// Age past which an open inquiry counts as stale.
    pub inquiry_stale_after: Duration,
}

impl Default for ActionablePolicy {
    fn default() -> Self {
        Self {
            quotation_valid_for: Duration::days(30),
            inquiry_stale_after: Duration::days(7),
        }
    }
}

/// Orders needing operator attention, bucketed by the required action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionableOrders {
    /// Requested orders with no quotation issued yet.
    pub needs_quotation: Vec<Order>,
    /// Quoted orders awaiting confirmation inside the validity window.
    pub needs_confirmation: Vec<Order>,
    /// Quoted orders past the validity window that were never confirmed.
    pub expired_quotations: Vec<Order>,
}

/// Classifies orders into actionable buckets.
#[must_use]
pub fn actionable_orders(
    orders: &[Order],
    policy: &ActionablePolicy,
    now: DateTime<Utc>,
) -> ActionableOrders {
    let mut buckets = ActionableOrders::default();
    for order in orders {
        match order.status() {
            OrderStatus::Requested => buckets.needs_quotation.push(order.clone()),
            OrderStatus::Quoted => {
                let expired = order
                    .quoted_at
                    .is_some_and(|quoted_at| now > quoted_at + policy.quotation_valid_for);
                if expired {
                    buckets.expired_quotations.push(order.clone());
                } else {
                    buckets.needs_confirmation.push(order.clone());
                }
            }
            _ => {}
        }
    }

    buckets
}

/// Inquiries needing operator attention, bucketed by the required action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionableInquiries {
    /// Fresh inquiries awaiting review.
    pub needs_review: Vec<Inquiry>,
    /// Inquiries currently being handled.
    pub in_progress: Vec<Inquiry>,
    /// Open inquiries older than the SLA threshold.
    pub stale: Vec<Inquiry>,
}

/// Classifies inquiries into actionable buckets.
///
/// `stale` overlaps the other buckets: an old unreviewed inquiry appears in
/// both `needs_review` and `stale`.
#[must_use]
pub fn actionable_inquiries(
    inquiries: &[Inquiry],
    policy: &ActionablePolicy,
    now: DateTime<Utc>,
) -> ActionableInquiries {
    let mut buckets = ActionableInquiries::default();
    for inquiry in inquiries {
        match inquiry.status {
            InquiryStatus::New => buckets.needs_review.push(inquiry.clone()),
            InquiryStatus::Accepted | InquiryStatus::InProgress => {
                buckets.in_progress.push(inquiry.clone());
            }
            InquiryStatus::Rejected | InquiryStatus::Closed => {}
        }

        if !inquiry.status.is_terminal() && inquiry.created_at < now - policy.inquiry_stale_after {
            buckets.stale.push(inquiry.clone());
        }
    }

    buckets
}

/// Converts status counts into percentage-of-total per status.
///
/// A zero total yields an all-zero distribution instead of dividing by zero.
#[must_use]
pub fn calculate_status_distribution(stats: &StatusStatistics) -> BTreeMap<String, f64> {
    stats
        .status_counts
        .iter()
        .map(|(status, count)| {
            let percentage = if stats.total_count == 0 {
                0.0
            } else {
                (*count as f64) * 100.0 / (stats.total_count as f64)
            };
            (status.clone(), percentage)
        })
        .collect()
}

/// Humanizes a snake_case or lowercase status slug into Title Case.
#[must_use]
pub fn format_status_for_display(slug: &str) -> String {
    slug.split('_')
        .filter(|token| !token.is_empty())
        .map(|token| {
            let mut chars = token.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use fabriq_domain::{Inquiry, InquiryStatus, Order, OrderStatus};

    use super::{
        ActionablePolicy, actionable_inquiries, actionable_orders, calculate_status_distribution,
        filter_inquiries_by_statuses, filter_orders_by_statuses, format_status_for_display,
        generate_inquiry_status_statistics, generate_order_status_statistics,
        inquiry_status_badge, order_status_badge, sort_orders_by_status_priority,
    };

    fn order(id: &str) -> Order {
        Order::new(id, Utc::now() - Duration::days(10))
    }

    fn quoted_order(id: &str, quoted_days_ago: i64) -> Order {
        let mut order = order(id);
        order.quoted_at = Some(Utc::now() - Duration::days(quoted_days_ago));
        order
    }

    fn inquiry(id: &str, status: InquiryStatus, age_days: i64) -> Inquiry {
        let mut inquiry = Inquiry::new(id, Utc::now() - Duration::days(age_days));
        inquiry.status = status;
        inquiry
    }

    #[test]
    fn badges_carry_distinct_priorities() {
        let priorities: std::collections::BTreeSet<u8> = OrderStatus::all()
            .iter()
            .map(|status| order_status_badge(*status).priority)
            .collect();
        assert_eq!(priorities.len(), OrderStatus::all().len());

        assert_eq!(inquiry_status_badge(InquiryStatus::InProgress).label, "In Progress");
    }

    #[test]
    fn order_statistics_derive_status_per_order() {
        let mut shipped = order("order-2");
        shipped.shipped_at = Some(Utc::now() - Duration::days(1));

        let stats =
            generate_order_status_statistics(&[order("order-1"), shipped, order("order-3")]);
        assert_eq!(stats.total_count, 3);
        assert_eq!(stats.status_counts.get("requested"), Some(&2));
        assert_eq!(stats.status_counts.get("shipped"), Some(&1));
    }

    #[test]
    fn inquiry_statistics_count_stored_statuses() {
        let stats = generate_inquiry_status_statistics(&[
            inquiry("inquiry-1", InquiryStatus::New, 1),
            inquiry("inquiry-2", InquiryStatus::New, 2),
            inquiry("inquiry-3", InquiryStatus::Closed, 3),
        ]);
        assert_eq!(stats.total_count, 3);
        assert_eq!(stats.status_counts.get("new"), Some(&2));
        assert_eq!(stats.status_counts.get("closed"), Some(&1));
    }

    #[test]
    fn filters_preserve_input_order() {
        let orders = [
            quoted_order("order-1", 1),
            order("order-2"),
            quoted_order("order-3", 2),
        ];

        let quoted = filter_orders_by_statuses(&orders, &[OrderStatus::Quoted]);
        assert_eq!(quoted.len(), 2);
        assert_eq!(quoted[0].id, "order-1");
        assert_eq!(quoted[1].id, "order-3");

        let inquiries = [
            inquiry("inquiry-1", InquiryStatus::New, 1),
            inquiry("inquiry-2", InquiryStatus::Closed, 1),
        ];
        let open = filter_inquiries_by_statuses(&inquiries, &[InquiryStatus::New]);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, "inquiry-1");
    }

    #[test]
    fn priority_sort_is_stable() {
        let mut delivered = order("order-1");
        delivered.delivered_at = Some(Utc::now());

        let sorted = sort_orders_by_status_priority(&[
            delivered,
            order("order-2"),
            order("order-3"),
        ]);
        assert_eq!(sorted[0].id, "order-2");
        assert_eq!(sorted[1].id, "order-3");
        assert_eq!(sorted[2].id, "order-1");
    }

    #[test]
    fn actionable_orders_split_by_quotation_age() {
        let mut confirmed = quoted_order("order-4", 2);
        confirmed.confirmed_at = Some(Utc::now() - Duration::days(1));

        let buckets = actionable_orders(
            &[
                order("order-1"),
                quoted_order("order-2", 3),
                quoted_order("order-3", 45),
                confirmed,
            ],
            &ActionablePolicy::default(),
            Utc::now(),
        );

        assert_eq!(buckets.needs_quotation.len(), 1);
        assert_eq!(buckets.needs_quotation[0].id, "order-1");
        assert_eq!(buckets.needs_confirmation.len(), 1);
        assert_eq!(buckets.needs_confirmation[0].id, "order-2");
        assert_eq!(buckets.expired_quotations.len(), 1);
        assert_eq!(buckets.expired_quotations[0].id, "order-3");
    }

    #[test]
    fn actionable_inquiries_include_stale_overlap() {
        let buckets = actionable_inquiries(
            &[
                inquiry("inquiry-1", InquiryStatus::New, 10),
                inquiry("inquiry-2", InquiryStatus::InProgress, 1),
                inquiry("inquiry-3", InquiryStatus::Rejected, 30),
            ],
            &ActionablePolicy::default(),
            Utc::now(),
        );

        assert_eq!(buckets.needs_review.len(), 1);
        assert_eq!(buckets.in_progress.len(), 1);
        assert_eq!(buckets.stale.len(), 1);
        assert_eq!(buckets.stale[0].id, "inquiry-1");
    }

    #[test]
    fn distribution_is_zero_safe() {
        let stats = generate_order_status_statistics(&[]);
        let distribution = calculate_status_distribution(&stats);
        assert!(distribution.values().all(|value| value.is_finite()));

        let stats = generate_inquiry_status_statistics(&[
            inquiry("inquiry-1", InquiryStatus::New, 1),
            inquiry("inquiry-2", InquiryStatus::New, 1),
            inquiry("inquiry-3", InquiryStatus::Closed, 1),
        ]);
        let distribution = calculate_status_distribution(&stats);
        assert!(
            distribution
                .get("new")
                .is_some_and(|value| (*value - 66.666).abs() < 0.01)
        );
        assert!(
            distribution
                .get("closed")
                .is_some_and(|value| (*value - 33.333).abs() < 0.01)
        );
    }

    #[test]
    fn display_formatting_title_cases_slugs() {
        assert_eq!(format_status_for_display("in_production"), "In Production");
        assert_eq!(format_status_for_display("new"), "New");
        assert_eq!(format_status_for_display("requested"), "Requested");
        assert_eq!(format_status_for_display(""), "");
    }
}
