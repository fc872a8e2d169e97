use std::hint::black_box;
use std::io::Write;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use session_replay::{AgentType, build_timeline, parser_for};
use tempfile::NamedTempFile;

/// Generate a synthetic Claude session file with N conversation turns
fn generate_session_file(num_turns: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();

    for i in 0..num_turns {
        let base = i as i64 * 4_000;
        let user = format!(
            r#"{{"type":"user","uuid":"u-{i}","timestamp":{},"sessionId":"550e8400-e29b-41d4-a716-446655440000","message":{{"role":"user","content":[{{"type":"text","text":"Prompt {i}"}}]}}}}"#,
            base
        );
        let assistant = format!(
            r#"{{"type":"assistant","uuid":"a-{i}","timestamp":{},"message":{{"role":"assistant","content":[{{"type":"thinking","thinking":"Considering prompt {i}"}},{{"type":"tool_use","id":"t-{i}","name":"Bash","input":{{"command":"ls"}}}}]}}}}"#,
            base + 1_000
        );
        let result = format!(
            r#"{{"type":"user","uuid":"r-{i}","timestamp":{},"message":{{"role":"user","content":[{{"type":"tool_result","tool_use_id":"t-{i}","content":"src\ntests"}}]}}}}"#,
            base + 2_000
        );
        writeln!(file, "{user}\n{assistant}\n{result}").unwrap();
    }

    file.flush().unwrap();
    file
}

fn bench_build_timeline(c: &mut Criterion) {
    let parser = parser_for(AgentType::Claude);
    let mut group = c.benchmark_group("build_timeline");

    for size in [100, 1_000, 10_000].iter() {
        let file = generate_session_file(*size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let parsed = parser.parse_file(black_box(file.path())).unwrap();
                build_timeline(parser, &parsed)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build_timeline);
criterion_main!(benches);
