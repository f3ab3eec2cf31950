//! Parallel batch orchestration — ranks every batch concurrently and forwards
//! each outcome to the response stream the moment its batch settles.
//!
//! Flow: spawn one task per batch → each task turns success, error, timeout or
//! panic into a [`BatchOutcome`] → a single forwarding loop drains the task set
//! in completion order and pushes outcomes into the sink channel → once every
//! task has settled the sink is dropped, which ends the stream.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio::task::{self, JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::models::screening::{JobDescription, RankedCandidate};
use crate::screening::partition::Batch;
use crate::screening::ranker::{RankingError, ResumeRanker};

/// The settled result of one batch. Consumed exactly once by the stream writer.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    Success {
        batch_index: usize,
        candidates: Vec<RankedCandidate>,
    },
    Failure {
        batch_index: usize,
        /// Resumes of the failed batch, so the caller knows what to resubmit.
        resume_names: Vec<String>,
        message: String,
    },
}

#[cfg(test)]
impl BatchOutcome {
    pub fn batch_index(&self) -> usize {
        match self {
            BatchOutcome::Success { batch_index, .. } | BatchOutcome::Failure { batch_index, .. } => {
                *batch_index
            }
        }
    }
}

/// Tally of one orchestration run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub batches: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Batches that succeeded with zero candidates and were not emitted.
    pub suppressed: usize,
    /// True when the consumer went away and remaining batches were cancelled.
    pub aborted: bool,
}

/// Batch identity of every task still running, keyed by task id.
type Pending = HashMap<task::Id, (usize, Vec<String>)>;

struct Settled {
    batch_index: usize,
    resume_names: Vec<String>,
    result: Result<Vec<RankedCandidate>, RankingError>,
}

/// Runs a [`ResumeRanker`] over many batches at once.
#[derive(Clone)]
pub struct BatchOrchestrator {
    ranker: Arc<dyn ResumeRanker>,
    batch_timeout: Duration,
}

impl BatchOrchestrator {
    pub fn new(ranker: Arc<dyn ResumeRanker>, batch_timeout: Duration) -> Self {
        Self {
            ranker,
            batch_timeout,
        }
    }

    /// Ranks all `batches` concurrently and sends each outcome into `sink`.
    ///
    /// Returns only after every batch has settled (or, if the receiving side
    /// of `sink` is dropped, after the remaining batches have been cancelled).
    /// Dropping `sink` on return is the end-of-stream signal.
    pub async fn run(
        &self,
        job: Arc<JobDescription>,
        batches: Vec<Batch>,
        sink: mpsc::Sender<BatchOutcome>,
    ) -> RunSummary {
        let mut summary = RunSummary {
            batches: batches.len(),
            ..RunSummary::default()
        };
        let mut tasks = JoinSet::new();
        let mut pending = Pending::with_capacity(batches.len());

        for batch in batches {
            let identity = (batch.index, batch.resume_names());
            let ranker = Arc::clone(&self.ranker);
            let job = Arc::clone(&job);
            let timeout = self.batch_timeout;
            let handle =
                tasks.spawn(async move { settle_batch(ranker.as_ref(), &job, batch, timeout).await });
            pending.insert(handle.id(), identity);
        }

        loop {
            let joined = tokio::select! {
                biased;
                joined = tasks.join_next_with_id() => joined,
                _ = sink.closed() => {
                    summary.aborted = true;
                    break;
                }
            };

            let Some(joined) = joined else {
                break;
            };
            let Some(settled) = match_to_batch(joined, &mut pending) else {
                continue;
            };

            let Some(outcome) = into_outcome(settled, &mut summary) else {
                continue;
            };

            if sink.send(outcome).await.is_err() {
                summary.aborted = true;
                break;
            }
        }

        if summary.aborted {
            warn!(
                pending = tasks.len(),
                "Response stream closed by client, cancelling remaining batches"
            );
            tasks.shutdown().await;
        }

        info!(
            batches = summary.batches,
            succeeded = summary.succeeded,
            failed = summary.failed,
            suppressed = summary.suppressed,
            aborted = summary.aborted,
            "Ranking run finished"
        );

        summary
    }
}

async fn settle_batch(
    ranker: &dyn ResumeRanker,
    job: &JobDescription,
    batch: Batch,
    timeout: Duration,
) -> Settled {
    let ranking = tokio::time::timeout(timeout, ranker.rank(job, &batch.resumes));
    let result = match AssertUnwindSafe(ranking).catch_unwind().await {
        Ok(Ok(result)) => result,
        Ok(Err(_elapsed)) => Err(RankingError::Timeout(timeout)),
        Err(panic) => Err(RankingError::Task(panic_message(&*panic))),
    };

    Settled {
        batch_index: batch.index,
        resume_names: batch.resume_names(),
        result,
    }
}

/// Pairs a joined task with its batch. A task that died before settling
/// (aborted, or panicked outside the ranking future) fails its batch.
fn match_to_batch(
    joined: Result<(task::Id, Settled), JoinError>,
    pending: &mut Pending,
) -> Option<Settled> {
    match joined {
        Ok((id, settled)) => {
            pending.remove(&id);
            Some(settled)
        }
        Err(e) => {
            let Some((batch_index, resume_names)) = pending.remove(&e.id()) else {
                error!("Unknown batch task ended without an outcome: {e}");
                return None;
            };
            error!(batch = batch_index, "Batch task ended without an outcome: {e}");
            Some(Settled {
                batch_index,
                resume_names,
                result: Err(RankingError::Task(e.to_string())),
            })
        }
    }
}

fn into_outcome(settled: Settled, summary: &mut RunSummary) -> Option<BatchOutcome> {
    let Settled {
        batch_index,
        resume_names,
        result,
    } = settled;

    match result {
        Ok(candidates) if candidates.is_empty() => {
            debug!(batch = batch_index, "Batch ranked with no candidates, not emitting");
            summary.suppressed += 1;
            None
        }
        Ok(candidates) => {
            info!(
                batch = batch_index,
                candidates = candidates.len(),
                "Batch ranked"
            );
            summary.succeeded += 1;
            Some(BatchOutcome::Success {
                batch_index,
                candidates,
            })
        }
        Err(e) => {
            warn!(batch = batch_index, resumes = resume_names.len(), "Batch ranking failed: {e}");
            summary.failed += 1;
            Some(BatchOutcome::Failure {
                batch_index,
                resume_names,
                message: e.to_string(),
            })
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "ranking panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::num::NonZeroUsize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::models::screening::Resume;
    use crate::screening::partition::partition;

    /// What the scripted ranker does for a batch, keyed by the batch's first resume id.
    #[derive(Clone)]
    enum Script {
        Rank { delay_ms: u64 },
        Empty,
        Fail(&'static str),
        Panic,
        Hang,
    }

    struct ScriptedRanker {
        scripts: HashMap<String, Script>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedRanker {
        fn new(scripts: &[(&str, Script)]) -> Arc<Self> {
            Arc::new(Self {
                scripts: scripts
                    .iter()
                    .map(|(id, s)| (id.to_string(), s.clone()))
                    .collect(),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ResumeRanker for ScriptedRanker {
        async fn rank(
            &self,
            _job: &JobDescription,
            batch: &[Resume],
        ) -> Result<Vec<RankedCandidate>, RankingError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            let script = self
                .scripts
                .get(&batch[0].id)
                .cloned()
                .unwrap_or(Script::Rank { delay_ms: 10 });

            let result = match script {
                Script::Rank { delay_ms } => {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    Ok(batch.iter().map(candidate_for).collect())
                }
                Script::Empty => Ok(vec![]),
                Script::Fail(msg) => Err(RankingError::Task(msg.to_string())),
                Script::Panic => panic!("model exploded"),
                Script::Hang => std::future::pending().await,
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    fn candidate_for(resume: &Resume) -> RankedCandidate {
        RankedCandidate {
            id: resume.id.clone(),
            name: format!("Candidate {}", resume.id),
            match_score: 70.0,
            ats_score: 60.0,
            key_skills: vec!["Rust".to_string()],
            feedback: "Good fit".to_string(),
            resume_name: resume.name.clone(),
            resume_content: resume.content.clone(),
        }
    }

    fn resumes(n: usize) -> Vec<Resume> {
        (0..n)
            .map(|i| Resume {
                id: format!("r{i}"),
                name: format!("r{i}.txt"),
                content: "data:text/plain,cv".to_string(),
            })
            .collect()
    }

    fn job() -> Arc<JobDescription> {
        Arc::new(JobDescription {
            name: "Platform Engineer".to_string(),
            content: "data:text/plain,Rust".to_string(),
        })
    }

    fn batches(n: usize, size: usize) -> Vec<Batch> {
        partition(resumes(n), NonZeroUsize::new(size).unwrap())
    }

    async fn collect(
        ranker: Arc<ScriptedRanker>,
        timeout: Duration,
        batches: Vec<Batch>,
    ) -> (Vec<BatchOutcome>, RunSummary) {
        let orchestrator = BatchOrchestrator::new(ranker, timeout);
        let (tx, mut rx) = mpsc::channel(2);
        let run = tokio::spawn(async move { orchestrator.run(job(), batches, tx).await });

        let mut outcomes = Vec::new();
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
        }
        (outcomes, run.await.unwrap())
    }

    fn successes(outcomes: &[BatchOutcome]) -> Vec<(usize, Vec<RankedCandidate>)> {
        let mut found: Vec<_> = outcomes
            .iter()
            .filter_map(|o| match o {
                BatchOutcome::Success {
                    batch_index,
                    candidates,
                } => Some((*batch_index, candidates.clone())),
                BatchOutcome::Failure { .. } => None,
            })
            .collect();
        found.sort_by_key(|(i, _)| *i);
        found
    }

    #[tokio::test]
    async fn test_all_batches_succeed_25_resumes() {
        let ranker = ScriptedRanker::new(&[]);
        let (outcomes, summary) = collect(ranker, Duration::from_secs(5), batches(25, 10)).await;

        assert_eq!(outcomes.len(), 3);
        let total: usize = successes(&outcomes).iter().map(|(_, c)| c.len()).sum();
        assert_eq!(total, 25);
        assert_eq!(
            summary,
            RunSummary {
                batches: 3,
                succeeded: 3,
                ..RunSummary::default()
            }
        );
    }

    #[tokio::test]
    async fn test_failed_batch_does_not_disturb_siblings() {
        let baseline = collect(ScriptedRanker::new(&[]), Duration::from_secs(5), batches(30, 10))
            .await
            .0;

        let ranker = ScriptedRanker::new(&[("r10", Script::Fail("upstream 529"))]);
        let (outcomes, summary) = collect(ranker, Duration::from_secs(5), batches(30, 10)).await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);

        let failure = outcomes
            .iter()
            .find(|o| matches!(o, BatchOutcome::Failure { .. }))
            .unwrap();
        assert_eq!(
            failure,
            &BatchOutcome::Failure {
                batch_index: 1,
                resume_names: (10..20).map(|i| format!("r{i}.txt")).collect(),
                message: "ranking task failed: upstream 529".to_string(),
            }
        );

        let expected: Vec<_> = successes(&baseline)
            .into_iter()
            .filter(|(i, _)| *i != 1)
            .collect();
        assert_eq!(successes(&outcomes), expected);
    }

    #[tokio::test]
    async fn test_single_batch_failure_yields_one_record() {
        let ranker = ScriptedRanker::new(&[("r0", Script::Fail("quota exceeded"))]);
        let (outcomes, summary) = collect(ranker, Duration::from_secs(5), batches(5, 10)).await;

        assert_eq!(outcomes.len(), 1);
        assert!(matches!(
            &outcomes[0],
            BatchOutcome::Failure { batch_index: 0, message, .. } if message.contains("quota exceeded")
        ));
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_empty_batches_are_suppressed() {
        let ranker = ScriptedRanker::new(&[("r0", Script::Empty), ("r20", Script::Fail("boom"))]);
        let (outcomes, summary) = collect(ranker, Duration::from_secs(5), batches(30, 10)).await;

        // one non-empty success + one failure
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|o| o.batch_index() != 0));
        assert_eq!(summary.suppressed, 1);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_zero_batches_close_immediately() {
        let ranker = ScriptedRanker::new(&[]);
        let (outcomes, summary) = collect(ranker, Duration::from_secs(5), vec![]).await;
        assert!(outcomes.is_empty());
        assert_eq!(summary, RunSummary::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_outcomes_arrive_in_completion_order() {
        let ranker = ScriptedRanker::new(&[
            ("r0", Script::Rank { delay_ms: 300 }),
            ("r1", Script::Rank { delay_ms: 100 }),
            ("r2", Script::Rank { delay_ms: 200 }),
        ]);
        let (outcomes, _) = collect(ranker, Duration::from_secs(5), batches(3, 1)).await;

        let order: Vec<usize> = outcomes.iter().map(BatchOutcome::batch_index).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_batches_are_in_flight_together() {
        let scripts: Vec<(String, Script)> = (0..6)
            .map(|i| (format!("r{i}"), Script::Rank { delay_ms: 500 }))
            .collect();
        let scripts: Vec<(&str, Script)> =
            scripts.iter().map(|(k, s)| (k.as_str(), s.clone())).collect();
        let ranker = ScriptedRanker::new(&scripts);

        let (outcomes, _) =
            collect(Arc::clone(&ranker), Duration::from_secs(5), batches(6, 1)).await;

        assert_eq!(outcomes.len(), 6);
        assert_eq!(ranker.max_in_flight.load(Ordering::SeqCst), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_batch_times_out_as_failure() {
        let ranker = ScriptedRanker::new(&[("r1", Script::Hang)]);
        let (outcomes, summary) = collect(ranker, Duration::from_secs(30), batches(2, 1)).await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(
            outcomes[1],
            BatchOutcome::Failure {
                batch_index: 1,
                resume_names: vec!["r1.txt".to_string()],
                message: "ranking timed out after 30s".to_string(),
            }
        );
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_panicking_ranker_becomes_failure() {
        let ranker = ScriptedRanker::new(&[("r0", Script::Panic)]);
        let (outcomes, summary) = collect(ranker, Duration::from_secs(5), batches(2, 1)).await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().any(|o| matches!(
            o,
            BatchOutcome::Failure { batch_index: 0, message, .. } if message.contains("model exploded")
        )));
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded, 1);
    }

    #[tokio::test]
    async fn test_task_lost_before_settling_fails_its_batch() {
        let mut tasks: JoinSet<Settled> = JoinSet::new();
        let handle = tasks.spawn(std::future::pending::<Settled>());
        let mut pending = Pending::from([(handle.id(), (4, vec!["r40.txt".to_string()]))]);
        tasks.abort_all();

        let joined = tasks.join_next_with_id().await.unwrap();
        let settled = match_to_batch(joined, &mut pending).unwrap();
        let mut summary = RunSummary::default();

        assert!(matches!(
            into_outcome(settled, &mut summary),
            Some(BatchOutcome::Failure { batch_index: 4, ref resume_names, ref message })
                if resume_names == &vec!["r40.txt".to_string()]
                    && message.starts_with("ranking task failed")
        ));
        assert_eq!(summary.failed, 1);
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn test_dropped_receiver_cancels_remaining_batches() {
        let ranker = ScriptedRanker::new(&[("r0", Script::Hang), ("r1", Script::Hang)]);
        let orchestrator = BatchOrchestrator::new(ranker, Duration::from_secs(3600));
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let summary = orchestrator.run(job(), batches(2, 1), tx).await;
        assert!(summary.aborted);
        assert_eq!(summary.succeeded + summary.failed, 0);
    }
}
