//! Sort/filter state of a list view.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::utils::url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ascending",
            SortOrder::Descending => "descending",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ascending" | "asc" => Ok(SortOrder::Ascending),
            "descending" | "desc" => Ok(SortOrder::Descending),
            _ => Err(()),
        }
    }
}

/// The `(orderBy, sortOrder, page)` triple owned by a list controller.
///
/// `page` is zero-based; URLs carry it one-based.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListState {
    pub order_by: Option<String>,
    pub sort_order: SortOrder,
    pub page: usize,
}

impl ListState {
    /// Read the state from a location path.
    pub fn from_location(location: &str) -> Self {
        Self {
            order_by: url::parse_order_by(location),
            sort_order: url::parse_sort_order(location).unwrap_or_default(),
            page: url::parse_page_number(location)
                .map(|p| p - 1)
                .unwrap_or(0),
        }
    }

    /// Location of this state under `resource_path`.
    pub fn to_location(&self, resource_path: &str) -> String {
        url::append_list_segments(
            resource_path,
            self.order_by.as_deref(),
            self.sort_order,
            self.page + 1,
        )
    }

    /// Query parameters for the collection endpoint.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("page", self.page.to_string())];
        if let Some(order_by) = &self.order_by {
            params.push(("orderBy", order_by.clone()));
        }
        params.push(("sort", self.sort_order.to_string()));
        params
    }

    /// Apply a sort control change. Sorting always restarts at the first page.
    pub fn set_sort(&mut self, order_by: Option<String>, sort_order: SortOrder) {
        self.order_by = order_by;
        self.sort_order = sort_order;
        self.page = 0;
    }
}
