use storage::dto::matches::CreateMatchesRequest;
use storage::models::{Contest, NewContest, Uid};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::context::JobContext;
use crate::error::{JobError, Result};

/// Splits a group into point-sorted matches and creates one rated contest
/// per match from a template. Returns the contests that were created.
pub async fn run_create_matches(ctx: &JobContext, request: &CreateMatchesRequest) -> Result<Vec<Contest>> {
    request.validate()?;
    let domain_id = request.domain_id.as_str();
    let group_size = ctx.settings.match_group_size;
    if group_size == 0 {
        return Err(JobError::Config("match group size must be positive".to_string()));
    }

    ctx.message(format!("Fetching template contest with ID: {}", request.template_tid));
    let template_id = Uuid::parse_str(&request.template_tid)
        .map_err(|e| JobError::Config(format!("invalid template contest ID '{}': {}", request.template_tid, e)))?;
    let template = ctx
        .store
        .find_contest(domain_id, template_id)
        .await?
        .ok_or_else(|| JobError::NotFound(format!("Template contest with ID '{}' not found.", request.template_tid)))?;

    if template.pids.len() != ctx.settings.template_problems {
        warn!(problems = template.pids.len(), "unexpected template problem count");
        ctx.message(format!(
            "Warning: Template contest does not have exactly {} problems (found {}).",
            ctx.settings.template_problems,
            template.pids.len()
        ));
    }
    ctx.message(format!("Using \"{}\" as template.", template.title));

    ctx.message(format!("Fetching user IDs from group '{}'...", request.group_name));
    let group = match ctx.store.find_group(domain_id, &request.group_name).await? {
        Some(group) if !group.uids.is_empty() => group,
        _ => {
            ctx.message(format!("Group '{}' not found or has no members.", request.group_name));
            return Ok(Vec::new());
        }
    };

    ctx.message(format!(
        "Fetching and sorting points for {} users in the group...",
        group.uids.len()
    ));
    let mut members = ctx.store.list_with_point(domain_id, &group.uids).await?;
    members.sort_by(|a, b| b.1.cmp(&a.1));
    ctx.message(format!(
        "Found {} users with points. Starting to create matches.",
        members.len()
    ));

    let uids: Vec<Uid> = members.iter().map(|(uid, _)| *uid).collect();
    let users = ctx.store.find_users(&uids).await?;

    let mut created = Vec::new();
    for (i, chunk) in uids.chunks(group_size).enumerate() {
        ctx.cancel.check()?;
        let number = i + 1;

        if chunk.len() < group_size {
            ctx.message(format!(
                "Warning: Not enough users for a complete match (only {} users).",
                chunk.len()
            ));
        }

        let names: Vec<String> = chunk
            .iter()
            .map(|uid| users.get(uid).map(|u| u.uname.clone()).unwrap_or_else(|| uid.to_string()))
            .collect();
        ctx.message(format!("Creating match #{} for users: {}", number, names.join(", ")));

        let contest = NewContest::from_template(
            &template,
            format!("{} - Group {}", template.title, number),
            chunk.iter().map(|uid| uid.to_string()).collect(),
        );
        match ctx.store.create_contest(&contest).await {
            Ok(contest) => {
                info!(contest = %contest.contest_id, "match created");
                ctx.message(format!(
                    "Successfully created contest #{} with ID: {}",
                    number, contest.contest_id
                ));
                created.push(contest);
            }
            Err(e) => {
                warn!(error = %e, "match creation failed");
                ctx.message(format!("Failed to create contest #{}. Error: {}", number, e));
            }
        }
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::CollectingReporter;
    use crate::store::memory::MemoryStore;
    use crate::store::memory::tests::{contest, user};
    use std::sync::Arc;
    use storage::models::{DomainUser, Group, PRIV_USER_PROFILE};

    /// Group "finals" with members 20..=29 holding `100 - uid` points and
    /// member 30 without a point.
    fn setup() -> (Arc<MemoryStore>, Contest) {
        let store = MemoryStore::new();
        store.add_domain("system");
        for uid in 20..=30 {
            store.add_user(user(uid, &format!("user{}", uid), PRIV_USER_PROFILE));
            store.add_domain_user(DomainUser {
                point: (uid < 30).then_some(100 - uid),
                ..DomainUser::new("system", uid)
            });
        }
        store.add_group(Group {
            domain_id: "system".to_string(),
            name: "finals".to_string(),
            uids: (20..=30).rev().collect(),
        });

        let mut template = contest("system", "Final", 0);
        template.pids = (1..=7).collect();
        template.rated = false;
        store.add_contest(template.clone());
        (Arc::new(store), template)
    }

    fn request(template: &Contest, group: &str) -> CreateMatchesRequest {
        CreateMatchesRequest {
            domain_id: "system".to_string(),
            group_name: group.to_string(),
            template_tid: template.contest_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_matches_follow_point_order() {
        let (store, template) = setup();
        let reporter = Arc::new(CollectingReporter::default());
        let ctx = JobContext::new(store.clone(), reporter.clone());

        let created = run_create_matches(&ctx, &request(&template, "finals")).await.unwrap();

        let titles: Vec<&str> = created.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Final - Group 1", "Final - Group 2", "Final - Group 3"]);
        assert_eq!(created[0].assign, vec!["20", "21", "22", "23"]);
        assert_eq!(created[2].assign, vec!["28", "29"]);
        assert!(created.iter().all(|c| c.rated && c.pids == template.pids && c.begin_at == template.begin_at));
        assert_eq!(store.contests("system").len(), 4);

        let messages = reporter.messages();
        assert!(messages.contains(&"Found 10 users with points. Starting to create matches.".to_string()));
        assert!(messages.contains(&"Creating match #1 for users: user20, user21, user22, user23".to_string()));
        assert!(messages.contains(&"Warning: Not enough users for a complete match (only 2 users).".to_string()));
        assert!(!messages.iter().any(|m| m.starts_with("Warning: Template")));
    }

    #[tokio::test]
    async fn test_failed_match_is_reported_and_skipped() {
        let (store, template) = setup();
        store.reject_contest("Final - Group 2");
        let reporter = Arc::new(CollectingReporter::default());
        let ctx = JobContext::new(store.clone(), reporter.clone());

        let created = run_create_matches(&ctx, &request(&template, "finals")).await.unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(created[1].title, "Final - Group 3");
        assert!(reporter.messages().iter().any(|m| m.starts_with("Failed to create contest #2.")));
    }

    #[tokio::test]
    async fn test_missing_arguments_are_fatal() {
        let (store, template) = setup();
        let ctx = JobContext::new(store.clone(), Arc::new(CollectingReporter::default()));
        let mut bad = request(&template, "finals");
        bad.group_name.clear();

        let result = run_create_matches(&ctx, &bad).await;
        assert!(matches!(result, Err(JobError::InvalidArguments(_))));
        assert_eq!(store.contests("system").len(), 1);
    }

    #[tokio::test]
    async fn test_missing_template_is_not_found() {
        let (store, _) = setup();
        let ctx = JobContext::new(store.clone(), Arc::new(CollectingReporter::default()));
        let ghost = contest("system", "Ghost", 0);

        let result = run_create_matches(&ctx, &request(&ghost, "finals")).await;
        assert!(matches!(result, Err(JobError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_unknown_group_creates_nothing() {
        let (store, mut template) = setup();
        template.pids.truncate(5);
        template.contest_id = Uuid::now_v7();
        store.add_contest(template.clone());
        let reporter = Arc::new(CollectingReporter::default());
        let ctx = JobContext::new(store.clone(), reporter.clone());

        let created = run_create_matches(&ctx, &request(&template, "nobody")).await.unwrap();

        assert!(created.is_empty());
        let messages = reporter.messages();
        assert!(messages.contains(&"Warning: Template contest does not have exactly 7 problems (found 5).".to_string()));
        assert!(messages.contains(&"Group 'nobody' not found or has no members.".to_string()));
    }
}
