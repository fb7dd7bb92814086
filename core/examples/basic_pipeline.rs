// pipewright/examples/basic_pipeline.rs

use pipewright::{Entry, Pipeline, PipelineError, PipelineResult, StepContext};
use serde_json::json;
use tracing::info;

// 1. Define the request context the pipeline runs against
#[derive(Debug, Default)]
struct Order {
  id: u32,
  quantity: u32,
}

#[tokio::main]
async fn main() -> Result<(), PipelineError> {
  tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

  info!("--- Basic Pipeline Example ---");

  // 2. Create a pipeline and append steps. Each step may append one entry to
  //    the results by returning `Some(entry)`.
  let pipeline = Pipeline::<Order>::create("orders");

  pipeline
    .use_step("price", |ctx: StepContext<Order>| async move {
      let order = ctx.results.context();
      let total = order.quantity * 250;
      info!("Priced order {}: {} cents", order.id, total);
      Ok(Some(Entry::Value(json!({ "total": total }))))
    })
    .use_step("tax", |ctx: StepContext<Order>| async move {
      // Entry 1 is the value the previous step produced.
      let total = match ctx.results.entry(1) {
        Some(Entry::Value(value)) => value["total"].as_u64().unwrap_or(0),
        _ => return Err(PipelineError::from("price missing")),
      };
      let with_tax = total + total / 5;
      info!("With tax: {} cents", with_tax);
      Ok(Some(Entry::Value(json!({ "with_tax": with_tax }))))
    })
    .use_step("log", |ctx: StepContext<Order>| async move {
      info!("Accumulated {} results", ctx.results.len());
      Ok(None)
    });

  // 3. Log every step as it is entered
  pipeline.on_step(|event, _results| {
    info!("{}: entering {} ({})", event.pipeline, event.step_name, event.step_index);
  });

  // 4. Run it once
  let result = pipeline.run(Order { id: 7, quantity: 4 }).await?;
  match result {
    PipelineResult::Completed => info!("Pipeline completed successfully!"),
    PipelineResult::Stopped => info!("Pipeline was stopped early."),
  }

  // 5. Inspect the results
  if let Some(results) = pipeline.results() {
    for (i, entry) in results.entries().iter().enumerate() {
      info!("- entry {}: {:?}", i + 1, entry);
    }
    assert_eq!(results.len(), 3);
  }

  Ok(())
}
