use job_matcher::config::MatchWeights;
use job_matcher::matching::{
    rank, score, JobPosting, PostingDetails, PostingId, ResumeProfile, ScoreResult,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

const SKILLS: [&str; 8] = ["python", "sql", "go", "rust", "aws", "kubernetes", "react", "java"];

fn skill_set() -> impl Strategy<Value = BTreeSet<String>> {
    proptest::sample::subsequence(SKILLS.to_vec(), 0..=SKILLS.len())
        .prop_map(|skills| skills.into_iter().map(str::to_string).collect())
}

/// Non-negative weights normalised to sum to 1.0.
fn weights() -> impl Strategy<Value = MatchWeights> {
    (1u32..100, 0u32..100, 0u32..100, 0u32..100).prop_map(|(r, p, t, e)| {
        let total = f64::from(r + p + t + e);
        MatchWeights::new(
            f64::from(r) / total,
            f64::from(p) / total,
            f64::from(t) / total,
        )
        .with_experience(f64::from(e) / total)
    })
}

fn posting(
    id: String,
    title: String,
    required: BTreeSet<String>,
    preferred: BTreeSet<String>,
    years_required: Option<u32>,
) -> JobPosting {
    JobPosting {
        id: PostingId(id),
        title,
        description: String::new(),
        required_skills: required,
        preferred_skills: preferred,
        years_required,
        details: PostingDetails::default(),
    }
}

fn posting_strategy() -> impl Strategy<Value = JobPosting> {
    (
        "[a-z0-9]{1,6}",
        "[A-Za-z ]{0,24}",
        skill_set(),
        skill_set(),
        proptest::option::of(0u32..15),
    )
        .prop_map(|(id, title, required, preferred, years)| {
            posting(id, title, required, preferred, years)
        })
}

fn resume_strategy() -> impl Strategy<Value = ResumeProfile> {
    (skill_set(), "[A-Za-z ]{0,16}", 0u32..20)
        .prop_map(|(skills, title, years)| ResumeProfile::new(skills, [title], years))
}

proptest! {
    #[test]
    fn score_stays_within_bounds(
        resume in resume_strategy(),
        posting in posting_strategy(),
        weights in weights(),
    ) {
        weights.validate().expect("generated weights are valid");
        let result = score(&resume, &posting, &weights);
        prop_assert!((0.0..=100.0).contains(&result.score), "score {}", result.score);
    }

    #[test]
    fn scoring_is_idempotent(
        resume in resume_strategy(),
        posting in posting_strategy(),
        weights in weights(),
    ) {
        prop_assert_eq!(score(&resume, &posting, &weights), score(&resume, &posting, &weights));
    }

    #[test]
    fn no_required_skills_means_full_required_ratio(
        resume in resume_strategy(),
        preferred in skill_set(),
    ) {
        let posting = posting("p".to_string(), "Engineer".to_string(), BTreeSet::new(), preferred, None);
        let result = score(&resume, &posting, &MatchWeights::default());
        prop_assert_eq!(result.sub_scores.required_ratio, 1.0);
    }

    #[test]
    fn matched_and_missing_partition_required_skills(
        resume in resume_strategy(),
        posting in posting_strategy(),
    ) {
        let result = score(&resume, &posting, &MatchWeights::default());
        let mut combined: Vec<String> = result.matched_required.clone();
        combined.extend(result.missing_required.iter().cloned());
        combined.sort();
        prop_assert_eq!(combined, posting.required_skills.iter().cloned().collect::<Vec<_>>());
    }

    #[test]
    fn ranking_is_ordered_and_total(
        entries in proptest::collection::vec(("[a-z]{1,4}", 0u32..5), 0..40),
    ) {
        let results: Vec<ScoreResult> = entries
            .iter()
            .map(|(id, bucket)| {
                let mut posting = posting(id.clone(), String::new(), BTreeSet::new(), BTreeSet::new(), None);
                posting.required_skills.insert("python".to_string());
                let resume = ResumeProfile::new(Vec::<&str>::new(), Vec::<&str>::new(), 0);
                let mut result = score(&resume, &posting, &MatchWeights::default());
                result.score = f64::from(*bucket) * 25.0;
                result
            })
            .collect();

        let mut reversed = results.clone();
        reversed.reverse();

        let ranked = rank(results);
        for pair in ranked.windows(2) {
            let (first, second) = (&pair[0], &pair[1]);
            prop_assert!(
                first.score > second.score
                    || (first.score == second.score && first.posting_id <= second.posting_id)
            );
        }

        let ids = |results: &[ScoreResult]| {
            results.iter().map(|r| (r.posting_id.clone(), r.score.to_bits())).collect::<Vec<_>>()
        };
        prop_assert_eq!(ids(&ranked), ids(&rank(reversed)));
    }
}
