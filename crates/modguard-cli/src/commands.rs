//! Subcommand implementations

use crate::config::AppConfig;
use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusHandle;
use modguard_core::AnalysisResult;
use modguard_engine::{Analysis, DecisionEngine, FeedRunner, MockFeed, ModerationQueue, QueueEvent};
use modguard_policy::{render_context, KnowledgeBase, PolicyRetriever};
use modguard_training::{load_csv_file, TrainingOutcome, TrainingStore};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

pub async fn analyze(
    config: &AppConfig,
    texts: &[String],
    json: bool,
    id: Option<&str>,
) -> Result<()> {
    let engine = DecisionEngine::from_config(&config.engine, &config.classifier)?;

    let mut analyses = Vec::with_capacity(texts.len());
    for (n, text) in texts.iter().enumerate() {
        let correlation_id = match id {
            Some(id) if texts.len() > 1 => Some(format!("{id}-{}", n + 1)),
            Some(id) => Some(id.to_string()),
            None => None,
        };
        analyses.push(engine.evaluate(text, correlation_id.as_deref()).await);
    }

    if json {
        let results: Vec<&AnalysisResult> = analyses.iter().map(|a| &a.result).collect();
        let out = match results.as_slice() {
            [single] => serde_json::to_string_pretty(single)?,
            all => serde_json::to_string_pretty(all)?,
        };
        println!("{out}");
        return Ok(());
    }

    for (text, analysis) in texts.iter().zip(&analyses) {
        print_analysis(text, analysis);
    }
    Ok(())
}

fn print_analysis(text: &str, analysis: &Analysis) {
    let result = &analysis.result;
    println!("Text: {text}");
    println!(
        "Decision: {} ({} path, {}us)",
        result.decision.as_str().to_uppercase(),
        analysis.path.as_str(),
        analysis.latency_us
    );
    if let Some(reason) = &analysis.fallback_reason {
        println!("Fallback: {reason}");
    }
    println!("Reasoning: {}", result.reasoning);

    println!("Categories:");
    for category in &result.categories {
        println!(
            "  {:<20} {:.2}  {}",
            category.name, category.score, category.explanation
        );
    }

    if !result.detected_topics.is_empty() {
        println!("Topics: {}", result.detected_topics.join(", "));
    }

    if !result.policy_references.is_empty() {
        println!("Policies:");
        for policy in &result.policy_references {
            println!(
                "  {} ({:.0}%)",
                policy.policy_name,
                policy.relevance * 100.0
            );
        }
    }

    if let Some(actions) = &result.suggested_actions {
        println!("Suggested actions:");
        for action in actions {
            println!("  - {action}");
        }
    }
    println!();
}

pub fn policies(config: &AppConfig, query: Option<&str>, limit: usize) -> Result<()> {
    let knowledge_base = match &config.engine.policies {
        Some(path) => KnowledgeBase::from_file(path)
            .with_context(|| format!("loading policies from {}", path.display()))?,
        None => KnowledgeBase::builtin(),
    };

    match query {
        Some(query) => {
            let retriever = PolicyRetriever::new(knowledge_base)?;
            println!("{}", render_context(&retriever.retrieve(query, limit)));
        }
        None => {
            for policy in knowledge_base.policies() {
                println!("{} - {}", policy.id, policy.name);
                println!("  {}", policy.description);
                println!("  Keywords: {}", policy.keywords.join(", "));
            }
        }
    }
    Ok(())
}

pub async fn train(config: &AppConfig, csv: Option<&str>, samples: bool) -> Result<()> {
    let store = TrainingStore::new(config.training.clone());

    if samples {
        let added = store.load_samples();
        info!(added, "Sample examples loaded");
    }
    if let Some(path) = csv {
        let examples = load_csv_file(path).with_context(|| format!("importing {path}"))?;
        let added = store.add_examples(examples);
        info!(added, path, "CSV examples imported");
    }

    let counts = store.label_counts();
    println!(
        "Examples: {} (approved {}, flagged {}, rejected {})",
        counts.total(),
        counts.approved,
        counts.flagged,
        counts.rejected
    );

    let handle = store.train()?;
    let mut progress = handle.progress();

    let cancel_store = store.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling training");
            cancel_store.cancel_training();
        }
    });

    while progress.changed().await.is_ok() {
        let current = *progress.borrow_and_update();
        if !current.in_progress {
            break;
        }
        println!("Training... {}%", current.progress_percent);
    }

    let outcome = handle.wait().await;
    interrupt.abort();

    match outcome? {
        TrainingOutcome::Completed { examples } => {
            println!("Training complete on {examples} examples")
        }
        TrainingOutcome::Cancelled { reached_percent } => {
            println!("Training cancelled at {reached_percent}%")
        }
    }
    Ok(())
}

pub async fn feed(config: &AppConfig, metrics: Option<PrometheusHandle>) -> Result<()> {
    let engine = Arc::new(DecisionEngine::from_config(&config.engine, &config.classifier)?);
    let queue = Arc::new(ModerationQueue::new(Arc::clone(&engine)));

    let store = config
        .feed
        .context_training
        .then(|| TrainingStore::new(config.training.clone()));

    let source = MockFeed::new(&config.feed);
    println!("Replaying {} items", source.remaining());

    let printer = tokio::spawn(print_events(queue.subscribe()));

    let summary = FeedRunner::new(Arc::clone(&queue))
        .with_config(&config.feed, store.clone())
        .spawn(source)
        .stop_on(async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        })
        .await?;

    let stats = queue.stats();
    // closes the event channel once the runner has released its handle
    drop(queue);
    printer.await?;

    println!();
    println!(
        "Processed {}{}: approved {}, flagged {}, rejected {}",
        summary.processed,
        if summary.stopped { " (stopped)" } else { "" },
        stats.approved,
        stats.flagged,
        stats.rejected
    );

    let snapshot = engine.metrics().snapshot();
    println!(
        "Average latency {}us, fallback rate {:.1}%",
        snapshot.avg_latency_us(),
        snapshot.fallback_rate() * 100.0
    );

    if let Some(store) = store {
        let counts = store.label_counts();
        println!(
            "Training store: {} examples (approved {}, flagged {}, rejected {})",
            counts.total(),
            counts.approved,
            counts.flagged,
            counts.rejected
        );
    }

    if let Some(handle) = metrics {
        println!();
        print!("{}", handle.render());
    }
    Ok(())
}

async fn print_events(mut events: broadcast::Receiver<QueueEvent>) {
    loop {
        match events.recv().await {
            Ok(QueueEvent::Added(item)) => println!(
                "[{:<8}] @{}: {}",
                item.status.to_string().to_uppercase(),
                item.source.handle,
                item.content
            ),
            Ok(_) => {}
            Err(broadcast::error::RecvError::Lagged(missed)) => {
                warn!(missed, "Event printer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
