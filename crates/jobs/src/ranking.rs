use storage::dto::common::{PaginatedResponse, PaginationParams};
use storage::dto::ranking::CodelinkRankingEntry;
use storage::models::Uid;

use crate::context::JobContext;
use crate::error::{JobError, Result};
use crate::points::hidden_types;

/// One page of the domain's codelink ranking, highest point first.
pub async fn list_codelink_ranking(
    ctx: &JobContext,
    domain_id: &str,
    page: u32,
) -> Result<PaginatedResponse<CodelinkRankingEntry>> {
    let pagination = PaginationParams::new(page, ctx.settings.ranking_page_size);
    pagination.validate().map_err(JobError::Config)?;

    let (domain_users, total) = ctx.store.list_ranking_page(domain_id, &pagination).await?;
    let uids: Vec<Uid> = domain_users.iter().map(|d| d.uid).collect();
    let users = ctx.store.find_users(&uids).await?;
    let hidden = hidden_types();

    let entries = domain_users
        .into_iter()
        .map(|mut d| {
            d.point_info.retain(|name, _| !hidden.contains(&name.as_str()));
            CodelinkRankingEntry {
                uid: d.uid,
                uname: users.get(&d.uid).map(|u| u.uname.clone()).unwrap_or_else(|| format!("#{}", d.uid)),
                point: d.point,
                codelink_rank: d.codelink_rank,
                point_info: d.point_info,
            }
        })
        .collect();

    Ok(PaginatedResponse::new(entries, pagination.page, pagination.page_size, total))
}
