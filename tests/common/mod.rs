use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use minutes_analytics::{Oracle, Transcript, Utterance};

/// Three-utterance budget sync used across the suite
#[allow(dead_code)]
pub fn budget_sync() -> Transcript {
    Transcript::new(vec![
        Utterance::new("We need to finalize the Q4 budget by Friday.")
            .spoken_by("A")
            .at(0.0, 10.0),
        Utterance::new("I agree, I will draft the numbers.")
            .spoken_by("B")
            .at(10.0, 20.0),
        Utterance::new("Great, let's review Monday.")
            .spoken_by("A")
            .at(20.0, 25.0),
    ])
}

/// Two interleaved discussion threads, enough sentences to cluster
#[allow(dead_code)]
pub fn hiring_and_budget() -> Transcript {
    Transcript::new(vec![
        Utterance::new("The hiring pipeline is slow.").spoken_by("Ana").at(0.0, 12.0),
        Utterance::new("Budget forecast looks tight.").spoken_by("Ben").at(12.0, 20.0),
        Utterance::new("Hiring pipeline needs recruiters.").spoken_by("Ana").at(20.0, 31.0),
        Utterance::new("The budget forecast needs cuts.").spoken_by("Ben").at(31.0, 40.0),
        Utterance::new("Recruiters for the hiring pipeline cost money.")
            .spoken_by("Ana")
            .at(40.0, 52.0),
        Utterance::new("Forecast the budget again next quarter.")
            .spoken_by("Ben")
            .at(52.0, 60.0),
    ])
}

/// One speaker, several utterances
#[allow(dead_code)]
pub fn monologue() -> Transcript {
    Transcript::new(vec![
        Utterance::new("Welcome to the quarterly update.").spoken_by("Cara"),
        Utterance::new("Revenue grew in every region.").spoken_by("Cara"),
        Utterance::new("Churn stayed flat compared to last quarter.").spoken_by("Cara"),
    ])
}

/// Answers topic prompts and suggestion prompts with canned JSON
#[allow(dead_code)]
pub struct ScriptedOracle {
    pub topics: String,
    pub suggestions: String,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedOracle {
    pub fn new(topics: &str, suggestions: &str) -> Self {
        Self {
            topics: topics.to_string(),
            suggestions: suggestions.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn query(&self, prompt: &str, _timeout: Duration) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if prompt.contains("discussion topics") {
            Ok(self.topics.clone())
        } else {
            Ok(self.suggestions.clone())
        }
    }
}

/// Never answers within any reasonable timeout
#[allow(dead_code)]
pub struct SlowOracle;

#[async_trait]
impl Oracle for SlowOracle {
    fn name(&self) -> &str {
        "slow"
    }

    async fn query(&self, _prompt: &str, _timeout: Duration) -> anyhow::Result<String> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok("{}".to_string())
    }
}

/// Blows up inside the analyzer that calls it
#[allow(dead_code)]
pub struct PanickingOracle;

#[async_trait]
impl Oracle for PanickingOracle {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn query(&self, _prompt: &str, _timeout: Duration) -> anyhow::Result<String> {
        panic!("oracle backend bug");
    }
}

/// Hangs forever and records when its pending query is dropped
#[allow(dead_code)]
pub struct HangingOracle {
    pub started: Arc<AtomicBool>,
    pub dropped: Arc<AtomicBool>,
}

#[allow(dead_code)]
impl HangingOracle {
    pub fn new() -> Self {
        Self {
            started: Arc::new(AtomicBool::new(false)),
            dropped: Arc::new(AtomicBool::new(false)),
        }
    }
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Oracle for HangingOracle {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn query(&self, _prompt: &str, _timeout: Duration) -> anyhow::Result<String> {
        let _guard = DropFlag(Arc::clone(&self.dropped));
        self.started.store(true, Ordering::SeqCst);
        std::future::pending::<()>().await;
        unreachable!()
    }
}
