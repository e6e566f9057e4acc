use anyhow::{Context, Result};
use jobs::JobSettings;
use std::str::FromStr;
use storage::models::Uid;

/// Job settings from `CODELINK_*` variables, defaults for anything unset.
pub fn settings_from_env() -> Result<JobSettings> {
    let defaults = JobSettings::default();

    let rank_excluded_uids = match std::env::var("CODELINK_RANK_EXCLUDED_UIDS") {
        Ok(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<Uid>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("CODELINK_RANK_EXCLUDED_UIDS must be a comma separated list of user ids")?,
        Err(_) => defaults.rank_excluded_uids,
    };

    Ok(JobSettings {
        rank_excluded_uids,
        rank_uid_cutoff: parse_or("CODELINK_RANK_UID_CUTOFF", defaults.rank_uid_cutoff)?,
        ranking_page_size: parse_or("CODELINK_RANKING_PAGE_SIZE", defaults.ranking_page_size)?,
        match_group_size: parse_or("CODELINK_MATCH_GROUP_SIZE", defaults.match_group_size)?,
        template_problems: parse_or("CODELINK_TEMPLATE_PROBLEMS", defaults.template_problems)?,
    })
}

fn parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number", name)),
        Err(_) => Ok(default),
    }
}
