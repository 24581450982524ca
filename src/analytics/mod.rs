use serde::Serialize;

use crate::model::{Company, PolicyKind, SeverityCounts};

pub const DEFAULT_TOP_COMPANIES: usize = 8;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PolicyTotals {
    pub terms: usize,
    pub cookie: usize,
    pub privacy: usize,
}

impl PolicyTotals {
    pub fn get(&self, kind: PolicyKind) -> usize {
        match kind {
            PolicyKind::Terms => self.terms,
            PolicyKind::Cookie => self.cookie,
            PolicyKind::Privacy => self.privacy,
        }
    }

    fn add(&mut self, kind: PolicyKind, count: usize) {
        match kind {
            PolicyKind::Terms => self.terms += count,
            PolicyKind::Cookie => self.cookie += count,
            PolicyKind::Privacy => self.privacy += count,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CompanyRiskBreakdown {
    pub id: String,
    pub name: String,
    pub category: String,
    pub counts: SeverityCounts,
    pub total: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryAverage {
    pub category: String,
    pub companies: usize,
    pub total_risks: usize,
    pub average: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Analytics {
    pub total_companies: usize,
    pub total_risks: usize,
    pub severity: SeverityCounts,
    pub by_policy: PolicyTotals,
    // Total descending; ties keep store order.
    pub by_company: Vec<CompanyRiskBreakdown>,
    // First appearance order.
    pub by_category: Vec<CategoryAverage>,
}

impl Analytics {
    pub fn is_empty(&self) -> bool {
        self.total_companies == 0
    }

    pub fn top_companies(&self, n: usize) -> &[CompanyRiskBreakdown] {
        &self.by_company[..n.min(self.by_company.len())]
    }

    pub fn category(&self, name: &str) -> Option<&CategoryAverage> {
        self.by_category.iter().find(|c| c.category == name)
    }
}

pub fn aggregate(companies: &[Company]) -> Analytics {
    let mut analytics = Analytics {
        total_companies: companies.len(),
        ..Default::default()
    };

    for company in companies {
        let counts = company.severity_counts();
        let total = counts.total();
        analytics.severity.merge(&counts);
        analytics.total_risks += total;
        for kind in PolicyKind::ALL {
            analytics.by_policy.add(kind, company.risks(kind).len());
        }
        analytics.by_company.push(CompanyRiskBreakdown {
            id: company.id.clone(),
            name: company.name.clone(),
            category: company.category.clone(),
            counts,
            total,
        });

        match analytics
            .by_category
            .iter_mut()
            .find(|c| c.category == company.category)
        {
            Some(entry) => {
                entry.companies += 1;
                entry.total_risks += total;
            }
            None => analytics.by_category.push(CategoryAverage {
                category: company.category.clone(),
                companies: 1,
                total_risks: total,
                average: 0.0,
            }),
        }
    }

    for entry in analytics.by_category.iter_mut() {
        entry.average = entry.total_risks as f64 / entry.companies as f64;
    }
    analytics.by_company.sort_by(|a, b| b.total.cmp(&a.total));
    analytics
}
