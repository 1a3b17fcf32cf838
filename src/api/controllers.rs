use axum::Router;
use serde::Deserialize;
use crate::services::{ListParams, SortOrder};
use crate::utils::normalize_query;

pub mod ping;
pub mod terms;
pub mod records;
pub mod car_designs;
pub mod plugins;
pub mod admin;

/// Every route of the site, all under `/api`.
pub fn router() -> Router {
    ping::router()
        .merge(terms::router())
        .merge(records::router())
        .merge(car_designs::router())
        .merge(plugins::router())
        .merge(admin::router())
}

/// Reads a number the lenient way query strings are usually read: leading
/// digits count, anything else means "not given".
pub(crate) fn parse_number(value: Option<&str>) -> Option<usize> {
    let digits: String = value?.trim().chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok().filter(|x| *x > 0)
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct ListQuery {
    sort: Option<String>,
    limit: Option<String>,
    page: Option<String>,
    search: Option<String>,
}

impl ListQuery {
    pub(crate) fn into_params(self, client_id: String) -> ListParams {
        ListParams {
            sort: SortOrder::parse(self.sort.as_deref()),
            limit: parse_number(self.limit.as_deref()),
            page: parse_number(self.page.as_deref()),
            search: normalize_query(self.search.as_deref()),
            client_id: Some(client_id),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct LimitQuery {
    limit: Option<String>,
}

impl LimitQuery {
    pub(crate) fn limit(&self) -> Option<usize> {
        parse_number(self.limit.as_deref())
    }
}

#[derive(serde::Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LikeCount {
    pub like_count: u64,
}
