//! Dashboard counts derived from the member company list.

use crate::models::Company;

/// Member counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DashboardStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

impl DashboardStats {
    /// Companies with no recognised renew status count toward the total only.
    pub fn from_companies(companies: &[Company]) -> Self {
        let active = companies.iter().filter(|c| c.is_active()).count();
        let inactive = companies
            .iter()
            .filter(|c| matches!(c.renew_status(), Some(crate::models::RenewStatus::Inactive)))
            .count();
        Self {
            total: companies.len(),
            active,
            inactive,
        }
    }
}
