use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;
use rampart_core::cache::{RoleCache, RoleCacheKey};
use rampart_core::config::CacheConfig;
use rampart_core::context::{resolve, AuthorizationContext, ContextValue};
use rampart_core::roles::RoleSet;
use tokio::runtime::Runtime;

fn roles() -> RoleSet {
    ["admin", "editor"].iter().map(|r| r.to_string()).collect()
}

fn benchmark_key_digest(c: &mut Criterion) {
    let context = resolve(&ContextValue::Instance { type_name: "Post".into(), id: Some("12345".into()) })
        .expect("context");
    let key = RoleCacheKey::new("user-42", context);

    c.bench_function("role_cache_key_digest", |b| b.iter(|| black_box(key.digest())));
}

fn benchmark_concurrent_hits(c: &mut Criterion) {
    let runtime = Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("role_cache_concurrent_hits");
    let operations_per_task = 1000;

    for tasks in [1usize, 4, 16] {
        let cache = RoleCache::new(CacheConfig::default());
        runtime.block_on(async {
            for principal in 0..tasks {
                let key = RoleCacheKey::new(principal.to_string(), AuthorizationContext::GLOBAL);
                cache.fetch(&key, || async { Ok(roles()) }).await.expect("warm");
            }
        });

        group.throughput(Throughput::Elements((tasks * operations_per_task) as u64));
        group.bench_with_input(BenchmarkId::new("scc_backed", tasks), &tasks, |b, &tasks| {
            b.iter(|| {
                runtime.block_on(async {
                    let handles: Vec<_> = (0..tasks)
                        .map(|principal| {
                            let cache = cache.clone();
                            tokio::spawn(async move {
                                let key = RoleCacheKey::new(principal.to_string(), AuthorizationContext::GLOBAL);
                                for _ in 0..operations_per_task {
                                    let hit = cache.fetch(&key, || async { Ok(RoleSet::new()) }).await;
                                    black_box(hit.expect("fetch"));
                                }
                            })
                        })
                        .collect();
                    for handle in handles {
                        handle.await.expect("task");
                    }
                })
            })
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_key_digest, benchmark_concurrent_hits);
criterion_main!(benches);
