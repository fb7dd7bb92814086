use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pipewright::{
  Entry, FileRequest, FileServer, HostApp, Pipeline, PipelineFactory, PipelineOptions, RequestContext,
  ResponseHandle, StaticRequest, StepContext,
};
use serde_json::json;
use std::sync::Arc;
use tokio::runtime::Runtime; // To run async code within Criterion

// --- Common Benchmark Context ---
#[derive(Clone, Debug, Default)]
struct NullResponse;

impl ResponseHandle for NullResponse {
  fn send_error(&self, _status: u16, _body: &str) {}
}

#[derive(Debug, Default)]
struct BenchContext {
  res: Option<NullResponse>,
}

impl RequestContext for BenchContext {
  type Response = NullResponse;

  fn response(&self) -> Option<&NullResponse> {
    self.res.as_ref()
  }
}

/// Only serves paths under `/hit`.
struct PrefixFileServer;

#[async_trait]
impl FileServer<NullResponse> for PrefixFileServer {
  async fn serve_file(&self, request: FileRequest<NullResponse>) -> anyhow::Result<()> {
    if request.path.starts_with("/hit") {
      Ok(())
    } else {
      anyhow::bail!("not here")
    }
  }
}

// --- Helper: build an unwired pipeline with `num_steps` value steps ---
fn raw_pipeline(num_steps: usize) -> Pipeline<BenchContext> {
  let pipeline = Pipeline::<BenchContext>::create("bench");
  for i in 0..num_steps {
    pipeline.use_step(format!("step_{}", i), move |_ctx: StepContext<BenchContext>| async move {
      Ok(Some(Entry::Value(json!(i))))
    });
  }
  pipeline
}

// --- Benchmark Functions ---

fn bench_raw_pipeline(c: &mut Criterion) {
  let mut group = c.benchmark_group("RawPipeline");
  let rt = Runtime::new().unwrap();

  for num_steps in [1usize, 5, 10, 50].iter() {
    group.throughput(Throughput::Elements(*num_steps as u64));
    group.bench_with_input(BenchmarkId::from_parameter(num_steps), num_steps, |b, &n| {
      // Pipelines are single-use, so each iteration builds its own.
      b.to_async(&rt).iter_batched(
        || raw_pipeline(n),
        |pipeline| async move { pipeline.run(BenchContext::default()).await.unwrap() },
        criterion::BatchSize::SmallInput,
      );
    });
  }
  group.finish();
}

fn bench_wired_generic_pipeline(c: &mut Criterion) {
  let mut group = c.benchmark_group("WiredGenericPipeline");
  let rt = Runtime::new().unwrap();
  let factory = Arc::new(PipelineFactory::attach(
    HostApp::<NullResponse>::new("bench"),
    PipelineOptions::default(),
  )
  .unwrap());

  for num_steps in [1usize, 10].iter() {
    let factory = Arc::clone(&factory);
    group.throughput(Throughput::Elements(*num_steps as u64 + 1));
    group.bench_with_input(BenchmarkId::from_parameter(num_steps), num_steps, |b, &n| {
      b.to_async(&rt).iter_batched(
        || {
          let pipeline = factory.pipelines().generic::<BenchContext>("work");
          for i in 0..n {
            pipeline.use_step(format!("step_{}", i), |_ctx: StepContext<BenchContext>| async move { Ok(None) });
          }
          pipeline
        },
        |pipeline| async move {
          pipeline
            .run(BenchContext {
              res: Some(NullResponse),
            })
            .await
            .unwrap()
        },
        criterion::BatchSize::SmallInput,
      );
    });
  }
  group.finish();
}

fn bench_static_location_probing(c: &mut Criterion) {
  let mut group = c.benchmark_group("StaticLocationProbing");
  let rt = Runtime::new().unwrap();
  let factory = Arc::new(PipelineFactory::attach(
    HostApp::<NullResponse>::new("bench").with_file_server(Arc::new(PrefixFileServer)),
    PipelineOptions::default(),
  )
  .unwrap());

  for num_locations in [1usize, 5, 20].iter() {
    // Every location misses except the last one.
    let mut locations: Vec<String> = (1..*num_locations).map(|i| format!("/miss{}", i)).collect();
    locations.push("/hit".to_string());
    let factory = Arc::clone(&factory);

    group.throughput(Throughput::Elements(*num_locations as u64));
    group.bench_with_input(
      BenchmarkId::from_parameter(num_locations),
      &locations,
      |b, locations| {
        b.to_async(&rt).iter_batched(
          || factory.pipelines().static_files().unwrap(),
          |pipeline| {
            let request = StaticRequest::new("/app.js", locations.clone(), NullResponse);
            async move { pipeline.run(request).await.unwrap() }
          },
          criterion::BatchSize::SmallInput,
        );
      },
    );
  }
  group.finish();
}

criterion_group!(
  benches,
  bench_raw_pipeline,
  bench_wired_generic_pipeline,
  bench_static_location_probing
);
criterion_main!(benches);
