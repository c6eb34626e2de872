//! Derives the displayed issue and delivery lists.
//!
//! A non-blank free-text query replaces the field filters instead of being
//! ANDed onto them. Tab exclusion still applies to issues.

use std::collections::HashSet;

use chrono::NaiveDate;
use shared::{
    domain::{DeliveryStatus, IssueStatus, Priority},
    records::{Delivery, Issue},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IssueTab {
    #[default]
    Active,
    History,
}

impl IssueTab {
    pub fn includes(self, status: IssueStatus) -> bool {
        match self {
            IssueTab::Active => status != IssueStatus::Done,
            IssueTab::History => status == IssueStatus::Done,
        }
    }

    /// Status choices the filter panel offers on this tab.
    pub fn status_options(self) -> Vec<IssueStatus> {
        IssueStatus::ALL
            .into_iter()
            .filter(|status| self.includes(*status))
            .collect()
    }
}

/// `None` on a field means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    pub status: Option<IssueStatus>,
    pub priority: Option<Priority>,
    pub assignee: Option<String>,
    pub deadline_until: Option<NaiveDate>,
}

impl IssueFilter {
    pub fn active_count(&self) -> usize {
        [
            self.status.is_some(),
            self.priority.is_some(),
            self.assignee.is_some(),
            self.deadline_until.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    fn matches(&self, issue: &Issue) -> bool {
        self.status.map_or(true, |status| issue.status == status)
            && self.priority.map_or(true, |priority| issue.priority == priority)
            && self
                .assignee
                .as_deref()
                .map_or(true, |assignee| issue.assignee == assignee)
            && self
                .deadline_until
                .map_or(true, |until| issue.deadline <= until)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryFilter {
    pub material: Option<String>,
    pub invoice_number: Option<String>,
    pub date: Option<NaiveDate>,
    pub status: Option<DeliveryStatus>,
}

impl DeliveryFilter {
    pub fn active_count(&self) -> usize {
        [
            self.material.is_some(),
            self.invoice_number.is_some(),
            self.date.is_some(),
            self.status.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    fn matches(&self, delivery: &Delivery) -> bool {
        self.material
            .as_deref()
            .map_or(true, |material| contains_ci(&delivery.material, material))
            && self.invoice_number.as_deref().map_or(true, |invoice| {
                delivery
                    .invoice_number
                    .as_deref()
                    .is_some_and(|number| contains_ci(number, invoice))
            })
            && self
                .date
                .map_or(true, |date| delivery.expected_date.date() == date)
            && self.status.map_or(true, |status| delivery.status == status)
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn search_term(query: Option<&str>) -> Option<&str> {
    query.map(str::trim).filter(|q| !q.is_empty())
}

pub fn filter_issues<'a>(
    issues: &'a [Issue],
    tab: IssueTab,
    filter: &IssueFilter,
    query: Option<&str>,
) -> Vec<&'a Issue> {
    let query = search_term(query);
    let mut visible: Vec<&Issue> = issues
        .iter()
        .filter(|issue| tab.includes(issue.status))
        .filter(|issue| match query {
            Some(q) => contains_ci(&issue.title, q) || contains_ci(&issue.assignee, q),
            None => filter.matches(issue),
        })
        .collect();
    // Stable: equal priority and deadline keep store order.
    visible.sort_by(|a, b| {
        b.priority
            .rank()
            .cmp(&a.priority.rank())
            .then_with(|| a.deadline.cmp(&b.deadline))
    });
    visible
}

pub fn filter_deliveries<'a>(
    deliveries: &'a [Delivery],
    filter: &DeliveryFilter,
    query: Option<&str>,
) -> Vec<&'a Delivery> {
    let query = search_term(query);
    let mut visible: Vec<&Delivery> = deliveries
        .iter()
        .filter(|delivery| match query {
            Some(q) => contains_ci(&delivery.material, q) || contains_ci(&delivery.supplier, q),
            None => filter.matches(delivery),
        })
        .collect();
    visible.sort_by_key(|delivery| delivery.expected_date);
    visible
}

/// Issues waiting for an engineering decision, in store order.
pub fn pending_approvals(issues: &[Issue]) -> Vec<&Issue> {
    issues
        .iter()
        .filter(|issue| issue.status == IssueStatus::WaitingApproval)
        .collect()
}

/// Distinct assignees in first-seen order, for the assignee filter.
pub fn unique_assignees(issues: &[Issue]) -> Vec<&str> {
    let mut seen = HashSet::new();
    issues
        .iter()
        .map(|issue| issue.assignee.as_str())
        .filter(|assignee| seen.insert(*assignee))
        .collect()
}

#[cfg(test)]
#[path = "tests/filters_tests.rs"]
mod tests;
