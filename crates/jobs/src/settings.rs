use storage::models::Uid;

/// Tuning knobs shared by the batch jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSettings {
    /// Reserved system identifiers left out of the codelink rank
    pub rank_excluded_uids: Vec<Uid>,
    /// Identifiers at or below this value are left out of the codelink rank
    pub rank_uid_cutoff: Uid,
    pub ranking_page_size: u32,
    pub match_group_size: usize,
    /// Problem count a match template is expected to have
    pub template_problems: usize,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            rank_excluded_uids: vec![0, 1],
            rank_uid_cutoff: -1000,
            ranking_page_size: 100,
            match_group_size: 4,
            template_problems: 7,
        }
    }
}

impl JobSettings {
    /// Whether `uid` takes part in the codelink rank.
    pub fn is_rank_candidate(&self, uid: Uid) -> bool {
        !self.rank_excluded_uids.contains(&uid) && uid > self.rank_uid_cutoff
    }
}
