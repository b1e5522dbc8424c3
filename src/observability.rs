use biometrics::{Collector, Counter, Moments};

pub(crate) static SESSIONS_STARTED: Counter = Counter::new("exam_chat.session.started");
pub(crate) static ANSWERS_ACCEPTED: Counter = Counter::new("exam_chat.session.answers_accepted");
pub(crate) static ANSWERS_REJECTED: Counter = Counter::new("exam_chat.session.answers_rejected");
pub(crate) static QUESTIONS_REVEALED: Counter =
    Counter::new("exam_chat.session.questions_revealed");
pub(crate) static SESSIONS_COMPLETED: Counter = Counter::new("exam_chat.session.completed");

pub(crate) static REVEALS_SCHEDULED: Counter = Counter::new("exam_chat.driver.reveals_scheduled");
pub(crate) static REVEALS_CANCELLED: Counter = Counter::new("exam_chat.driver.reveals_cancelled");
pub(crate) static REVEAL_LATENCY: Moments = Moments::new("exam_chat.driver.reveal_latency_seconds");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&SESSIONS_STARTED);
    collector.register_counter(&ANSWERS_ACCEPTED);
    collector.register_counter(&ANSWERS_REJECTED);
    collector.register_counter(&QUESTIONS_REVEALED);
    collector.register_counter(&SESSIONS_COMPLETED);

    collector.register_counter(&REVEALS_SCHEDULED);
    collector.register_counter(&REVEALS_CANCELLED);
    collector.register_moments(&REVEAL_LATENCY);
}
