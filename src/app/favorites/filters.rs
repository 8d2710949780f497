use serde::{Deserialize, Serialize};

use super::types::FavoriteKind;

/// Blank strings are treated as unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<FavoriteKind>,
    pub year: Option<String>,
    pub budget_min: Option<String>,
    pub budget_max: Option<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && non_empty(&self.search).is_none()
            && non_empty(&self.year).is_none()
            && self.budget_range().is_none()
    }

    /// The budget bounds, only when both ends are set.
    pub fn budget_range(&self) -> Option<(&str, &str)> {
        match (non_empty(&self.budget_min), non_empty(&self.budget_max)) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        }
    }

    fn push_params(&self, params: &mut Vec<(&'static str, String)>) {
        if let Some(kind) = self.kind {
            params.push(("type", kind.as_str().to_string()));
        }
        if let Some(year) = non_empty(&self.year) {
            params.push(("year", year.to_string()));
        }
        if let Some(search) = non_empty(&self.search) {
            params.push(("search", search.to_string()));
        }
        if let Some((min, max)) = self.budget_range() {
            params.push(("budgetMin", min.to_string()));
            params.push(("budgetMax", max.to_string()));
        }
    }
}

/// `page` is one-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
    pub filters: FilterCriteria,
}

impl PageQuery {
    pub fn for_index(page_index: u32, limit: u32, filters: &FilterCriteria) -> Self {
        Self {
            page: page_index + 1,
            limit,
            filters: filters.clone(),
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        self.filters.push_params(&mut params);
        params
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.trim().is_empty())
}
