//! Per-learner study sessions over the shared content and store.
//!
//! Each learner owns one ledger, one review scheduler and one assessment
//! session. Sessions are opened lazily and every call locks only the
//! learner it touches. Sessions left idle are evicted by a periodic sweep;
//! the ledger and reviews reload from the store on next use, the assessment
//! starts over.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{broadcast, Mutex};
use tokio::time::MissedTickBehavior;

use crate::config::StudyConfig;
use crate::constants::{LEDGER_EVENT_CAPACITY, SESSION_SWEEP_SECS};
use crate::content::Content;
use crate::store::operations::responses::SledLedgerStorage;
use crate::store::operations::review_states::SledReviewStorage;
use crate::store::{Store, StoreError};
use crate::study::assessment::{AssessmentError, AssessmentSession, ProgressOverview};
use crate::study::ledger::{LedgerState, ResponseLedger};
use crate::study::mastery;
use crate::study::recommend::{self, DiagnosticsReport};
use crate::study::scheduler::{self, QueueEntry, QueueStats, ReviewScheduler};
use crate::study::selector::{self, SelectionRule};
use crate::study::types::{
    Difficulty, LearningObjective, MasterySnapshot, PerformanceSummary, Question, QuestionChoice,
    ResponseRecord, ReviewAction, ReviewState,
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
    #[error("unknown flashcard: {0}")]
    UnknownCard(String),
    #[error("the question bank is empty")]
    EmptyBank,
}

/// Published after every ledger mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEvent {
    pub learner_id: String,
    pub response_count: usize,
    pub latest: Option<ResponseRecord>,
}

/// A question as presented before it is answered: no answer key, no rationale.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub id: String,
    pub prompt: String,
    pub choices: Vec<QuestionChoice>,
    pub topic: String,
    pub difficulty: Difficulty,
    pub learning_objective: LearningObjective,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id.clone(),
            prompt: question.prompt.clone(),
            choices: question.choices.clone(),
            topic: question.topic.clone(),
            difficulty: question.difficulty,
            learning_objective: question.learning_objective.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentView {
    pub question: Option<QuestionView>,
    pub answered: bool,
    pub selected_choice_id: Option<String>,
    pub last_response: Option<ResponseRecord>,
    pub target_difficulty: Difficulty,
    pub remaining_questions: usize,
    pub progress: ProgressOverview,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub record: ResponseRecord,
    pub correct: bool,
    pub correct_choice_id: String,
    pub rationale: Option<String>,
    pub progress: ProgressOverview,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextQuestion {
    pub question: QuestionView,
    pub rule: SelectionRule,
    pub target_difficulty: Difficulty,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryReport {
    pub response_count: usize,
    pub by_topic: IndexMap<String, PerformanceSummary>,
    pub by_difficulty: IndexMap<Difficulty, PerformanceSummary>,
    pub by_learning_objective: IndexMap<String, PerformanceSummary>,
    pub strongest_topic: Option<String>,
    pub toughest_difficulty: Option<Difficulty>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewQueueView<'a> {
    pub stats: QueueStats,
    pub entries: Vec<QueueEntry<'a>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextReview<'a> {
    pub card: Option<QueueEntry<'a>>,
    pub stats: QueueStats,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeOutcome {
    pub key: String,
    pub action: ReviewAction,
    pub review: ReviewState,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetOutcome {
    pub cleared: usize,
}

struct LearnerSession {
    ledger: ResponseLedger<SledLedgerStorage>,
    reviews: ReviewScheduler<SledReviewStorage>,
    assessment: AssessmentSession,
}

struct SessionSlot {
    session: Arc<Mutex<LearnerSession>>,
    last_used: Instant,
}

pub struct StudyEngine {
    store: Arc<Store>,
    content: Arc<Content>,
    settings: StudyConfig,
    sessions: Mutex<HashMap<String, SessionSlot>>,
    events: broadcast::Sender<LedgerEvent>,
}

impl StudyEngine {
    pub fn new(store: Arc<Store>, content: Arc<Content>, settings: StudyConfig) -> Self {
        let (events, _) = broadcast::channel(LEDGER_EVENT_CAPACITY);
        Self {
            store,
            content,
            settings,
            sessions: Mutex::new(HashMap::new()),
            events,
        }
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn settings(&self) -> &StudyConfig {
        &self.settings
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.len()
    }

    fn bank(&self) -> &[Question] {
        &self.content.bank.questions
    }

    fn open_session(&self, learner_id: &str) -> Result<LearnerSession, EngineError> {
        let mut ledger = ResponseLedger::open(self.store.ledger_storage(learner_id)?);
        let events = self.events.clone();
        let owner = learner_id.to_string();
        ledger.subscribe(Box::new(move |state: &LedgerState| {
            // No receivers is the normal case when nobody follows the stream.
            let _ = events.send(LedgerEvent {
                learner_id: owner.clone(),
                response_count: state.responses.len(),
                latest: state.responses.last().cloned(),
            });
        }));

        let reviews = ReviewScheduler::open(self.store.review_storage(learner_id)?);
        let assessment = AssessmentSession::start(self.bank(), &mut rand::thread_rng());

        tracing::debug!(
            learner_id,
            responses = ledger.len(),
            reviews = reviews.states().len(),
            "Learner session opened"
        );
        Ok(LearnerSession {
            ledger,
            reviews,
            assessment,
        })
    }

    async fn session(&self, learner_id: &str) -> Result<Arc<Mutex<LearnerSession>>, EngineError> {
        let mut sessions = self.sessions.lock().await;
        let now = Instant::now();
        if let Some(slot) = sessions.get_mut(learner_id) {
            slot.last_used = now;
            return Ok(slot.session.clone());
        }
        let session = Arc::new(Mutex::new(self.open_session(learner_id)?));
        sessions.insert(
            learner_id.to_string(),
            SessionSlot {
                session: session.clone(),
                last_used: now,
            },
        );
        Ok(session)
    }

    /// Drops sessions untouched for at least `max_idle`. A session still held
    /// by an in-flight request is kept. Returns how many were dropped.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, slot| {
            slot.last_used.elapsed() < max_idle || Arc::strong_count(&slot.session) > 1
        });

        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(evicted, remaining = sessions.len(), "Idle learner sessions evicted");
        }
        evicted
    }

    async fn records(&self, learner_id: &str) -> Result<Vec<ResponseRecord>, EngineError> {
        let session = self.session(learner_id).await?;
        let guard = session.lock().await;
        Ok(guard.ledger.records().to_vec())
    }

    fn assessment_view(&self, session: &LearnerSession) -> AssessmentView {
        let bank = self.bank();
        let assessment = &session.assessment;
        let snapshot = mastery::snapshot(session.ledger.records());
        AssessmentView {
            question: assessment.current(bank).map(QuestionView::from),
            answered: assessment.has_answered(),
            selected_choice_id: assessment.selected_choice_id().map(str::to_string),
            last_response: assessment.last_response().cloned(),
            target_difficulty: selector::target_difficulty(assessment.last_response()),
            remaining_questions: bank
                .iter()
                .filter(|question| !assessment.asked().contains(&question.id))
                .count(),
            progress: assessment.progress(&snapshot),
        }
    }

    pub async fn assessment(&self, learner_id: &str) -> Result<AssessmentView, EngineError> {
        let session = self.session(learner_id).await?;
        let guard = session.lock().await;
        Ok(self.assessment_view(&guard))
    }

    pub async fn answer(
        &self,
        learner_id: &str,
        choice_id: &str,
    ) -> Result<AnswerOutcome, EngineError> {
        let session = self.session(learner_id).await?;
        let mut guard = session.lock().await;
        let LearnerSession {
            ledger, assessment, ..
        } = &mut *guard;

        let record = assessment.answer(self.bank(), ledger, choice_id)?;
        let question = assessment
            .current(self.bank())
            .ok_or(AssessmentError::NoCurrentQuestion)?;
        let progress = assessment.progress(&mastery::snapshot(ledger.records()));

        tracing::info!(
            learner_id,
            question_id = %record.question_id,
            correct = record.correct,
            responses = ledger.len(),
            "Response recorded"
        );

        Ok(AnswerOutcome {
            correct: record.correct,
            correct_choice_id: question.answer_id.clone(),
            rationale: question.rationale.clone(),
            record,
            progress,
        })
    }

    pub async fn next_question(&self, learner_id: &str) -> Result<NextQuestion, EngineError> {
        let session = self.session(learner_id).await?;
        let mut guard = session.lock().await;
        let assessment = &mut guard.assessment;

        let target_difficulty = selector::target_difficulty(assessment.last_response());
        let (question, rule) = assessment
            .advance(self.bank())
            .ok_or(EngineError::EmptyBank)?;

        tracing::debug!(learner_id, question_id = %question.id, ?rule, "Next question selected");
        Ok(NextQuestion {
            question: QuestionView::from(question),
            rule,
            target_difficulty,
        })
    }

    /// The ledger as it stands now, in the shape of a `LedgerEvent`.
    pub async fn current_event(&self, learner_id: &str) -> Result<LedgerEvent, EngineError> {
        let session = self.session(learner_id).await?;
        let guard = session.lock().await;
        Ok(LedgerEvent {
            learner_id: learner_id.to_string(),
            response_count: guard.ledger.len(),
            latest: guard.ledger.records().last().cloned(),
        })
    }

    pub async fn recent(
        &self,
        learner_id: &str,
        limit: usize,
    ) -> Result<Vec<ResponseRecord>, EngineError> {
        let session = self.session(learner_id).await?;
        let guard = session.lock().await;
        Ok(guard.ledger.recent(limit))
    }

    /// Clears the ledger and the asked-set. The question on screen stays.
    pub async fn reset(&self, learner_id: &str) -> Result<ResetOutcome, EngineError> {
        let session = self.session(learner_id).await?;
        let mut guard = session.lock().await;
        let cleared = guard.ledger.len();
        guard.ledger.reset();
        guard.assessment.reset();
        tracing::info!(learner_id, cleared, "Response ledger reset");
        Ok(ResetOutcome { cleared })
    }

    pub async fn snapshot(&self, learner_id: &str) -> Result<MasterySnapshot, EngineError> {
        Ok(mastery::snapshot(&self.records(learner_id).await?))
    }

    pub async fn mastery(&self, learner_id: &str) -> Result<MasteryReport, EngineError> {
        let records = self.records(learner_id).await?;
        let snapshot = mastery::snapshot(&records);
        Ok(MasteryReport {
            response_count: records.len(),
            strongest_topic: mastery::strongest_topic(&snapshot).map(str::to_string),
            toughest_difficulty: mastery::toughest_difficulty(&snapshot),
            by_topic: snapshot.by_topic,
            by_difficulty: snapshot.by_difficulty,
            by_learning_objective: snapshot.by_learning_objective,
        })
    }

    pub async fn diagnostics(&self, learner_id: &str) -> Result<DiagnosticsReport<'_>, EngineError> {
        let records = self.records(learner_id).await?;
        let snapshot = mastery::snapshot(&records);
        let recommendation_settings = self.settings.recommendation_settings();

        Ok(DiagnosticsReport {
            recommendations: recommend::recommendation_queue(
                self.bank(),
                &records,
                &snapshot.by_topic,
                &recommendation_settings,
            ),
            strengths: recommend::strength_highlights(&snapshot.by_topic, &recommendation_settings),
            areas_to_improve: recommend::areas_to_improve(&snapshot.by_difficulty),
            objective_signals: recommend::objective_signals(
                &snapshot.by_learning_objective,
                &self.content.bank.metadata.learning_objectives,
            ),
        })
    }

    pub async fn review_queue(
        &self,
        learner_id: &str,
        limit: usize,
    ) -> Result<ReviewQueueView<'_>, EngineError> {
        let session = self.session(learner_id).await?;
        let guard = session.lock().await;
        let now = Utc::now().timestamp_millis();

        let mut entries = guard.reviews.queue(self.content.flashcards(), now);
        let stats = scheduler::queue_stats(&entries, now);
        entries.truncate(limit);
        Ok(ReviewQueueView { stats, entries })
    }

    pub async fn next_review(&self, learner_id: &str) -> Result<NextReview<'_>, EngineError> {
        let session = self.session(learner_id).await?;
        let guard = session.lock().await;
        let now = Utc::now().timestamp_millis();

        let entries = guard.reviews.queue(self.content.flashcards(), now);
        Ok(NextReview {
            card: scheduler::select_next(&entries, now).cloned(),
            stats: scheduler::queue_stats(&entries, now),
        })
    }

    pub async fn grade(
        &self,
        learner_id: &str,
        key: &str,
        action: ReviewAction,
    ) -> Result<GradeOutcome, EngineError> {
        if !self.content.has_card_key(key) {
            return Err(EngineError::UnknownCard(key.to_string()));
        }

        let session = self.session(learner_id).await?;
        let mut guard = session.lock().await;
        let review = guard.reviews.grade(key, action);

        tracing::info!(learner_id, key, ?action, interval = review.interval, "Flashcard graded");
        Ok(GradeOutcome {
            key: key.to_string(),
            action,
            review,
        })
    }
}

/// Evicts idle sessions every `SESSION_SWEEP_SECS` until shutdown.
pub async fn sweep_idle_sessions(
    engine: Arc<StudyEngine>,
    max_idle: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(SESSION_SWEEP_SECS));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::debug!(max_idle_secs = max_idle.as_secs(), "Session sweeper started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                engine.evict_idle(max_idle).await;
            }
            _ = shutdown_rx.recv() => {
                tracing::debug!("Session sweeper stopped");
                break;
            }
        }
    }
}
