use super::*;
use rozgar_model::{
    DataSource, DistrictDataset, DistrictId, DistrictRecord, SampleDataFile,
};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tempfile::{tempdir, TempDir};

fn mk_dataset(name: &str, people: u64) -> DistrictDataset {
    DistrictDataset {
        district: name.to_string(),
        district_marathi: format!("{name}-mr"),
        total_people_benefited: people,
        total_person_days: people * 20,
        total_wages_paid: people * 500,
        last_updated: "2024-12-01".to_string(),
        monthly_data: vec![],
        historical_data: None,
    }
}

fn mk_record(id: &str, name: &str) -> DistrictRecord {
    DistrictRecord {
        id: DistrictId::parse(id).expect("district id"),
        name: name.to_string(),
        name_marathi: format!("{name}-mr"),
        lat: None,
        lng: None,
    }
}

fn sample_store(entries: Vec<(&str, &str, Option<DistrictDataset>)>) -> SampleStore {
    let mut file = SampleDataFile::default();
    for (id, name, dataset) in entries {
        file.districts.push(mk_record(id, name));
        if let Some(d) = dataset {
            file.data.insert(id.to_string(), d);
        }
    }
    SampleStore::from_file(file)
}

fn mk_service(
    tmp: &TempDir,
    upstream: Arc<FakeSource>,
    sample: SampleStore,
) -> Arc<RetrievalService> {
    let ttl = Duration::from_secs(3600);
    RetrievalService::new(
        MemoryCache::new(ttl),
        DiskCache::open(tmp.path(), ttl),
        upstream,
        sample,
    )
}

fn disk_entry(tmp: &TempDir, id: &str) -> DiskCacheEntry {
    let bytes = std::fs::read(tmp.path().join(format!("{id}.json"))).expect("disk entry file");
    serde_json::from_slice(&bytes).expect("disk entry parse")
}

fn seed_disk_entry(tmp: &TempDir, id: &str, dataset: &DistrictDataset, source: DataSource) {
    let cache = DiskCache::open(tmp.path(), Duration::from_secs(3600));
    cache.save(&DistrictId::parse(id).expect("id"), dataset, source);
}

#[tokio::test]
async fn memory_tier_wins_over_every_lower_tier() {
    let tmp = tempdir().expect("tempdir");
    let id = DistrictId::parse("pune").expect("id");
    let upstream = Arc::new(FakeSource::default());
    upstream
        .datasets
        .lock()
        .await
        .insert(id.clone(), mk_dataset("FromUpstream", 3));

    let sample = sample_store(vec![("pune", "Pune", Some(mk_dataset("FromSample", 4)))]);
    let service = mk_service(&tmp, upstream.clone(), sample);

    // Warm the memory tier through a disk hit, then change every lower tier.
    seed_disk_entry(&tmp, "pune", &mk_dataset("FromDisk", 2), DataSource::Cache);
    let first = service.district_data(&id).await.expect("disk hit");
    assert_eq!(first.district, "FromDisk");

    seed_disk_entry(&tmp, "pune", &mk_dataset("DiskRewritten", 9), DataSource::Cache);
    let second = service.district_data(&id).await.expect("memory hit");
    assert_eq!(second.district, "FromDisk", "memory tier must win");
    assert_eq!(upstream.fetch_calls.load(Ordering::Relaxed), 0);
    assert_eq!(service.metrics.memory_hits.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn disk_hit_backfills_memory() {
    let tmp = tempdir().expect("tempdir");
    let id = DistrictId::parse("nagpur").expect("id");
    let service = mk_service(
        &tmp,
        Arc::new(FakeSource::default()),
        sample_store(vec![("nagpur", "Nagpur", None)]),
    );

    seed_disk_entry(&tmp, "nagpur", &mk_dataset("FromDisk", 7), DataSource::Api);
    let first = service.district_data(&id).await.expect("disk hit");
    assert_eq!(first.district, "FromDisk");

    // Remove the file: a second lookup can only succeed from memory.
    std::fs::remove_file(tmp.path().join("nagpur.json")).expect("remove disk entry");
    let second = service.district_data(&id).await.expect("memory hit");
    assert_eq!(second, first);
    assert_eq!(service.metrics.disk_hits.load(Ordering::Relaxed), 1);
    assert_eq!(service.metrics.memory_hits.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn upstream_hit_backfills_both_caches_tagged_api() {
    let tmp = tempdir().expect("tempdir");
    let id = DistrictId::parse("pune").expect("id");
    let upstream = Arc::new(FakeSource::default());
    upstream
        .datasets
        .lock()
        .await
        .insert(id.clone(), mk_dataset("FromUpstream", 3));

    let service = mk_service(
        &tmp,
        upstream.clone(),
        sample_store(vec![("pune", "Pune", None)]),
    );

    let dataset = service.district_data(&id).await.expect("upstream hit");
    assert_eq!(dataset.district, "FromUpstream");
    assert_eq!(upstream.fetch_calls.load(Ordering::Relaxed), 1);

    let persisted = disk_entry(&tmp, "pune");
    assert_eq!(persisted.source, DataSource::Api);
    assert_eq!(persisted.data, dataset);

    // Second call within the window is served from memory: no new I/O.
    std::fs::remove_file(tmp.path().join("pune.json")).expect("remove disk entry");
    let again = service.district_data(&id).await.expect("memory hit");
    assert_eq!(again, dataset);
    assert_eq!(upstream.fetch_calls.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn sample_only_district_populates_caches_tagged_sample() {
    let tmp = tempdir().expect("tempdir");
    let id = DistrictId::parse("pune").expect("id");
    let upstream = Arc::new(FakeSource {
        enabled: false,
        ..FakeSource::default()
    });
    let service = mk_service(
        &tmp,
        upstream.clone(),
        sample_store(vec![("pune", "Pune", Some(mk_dataset("Pune", 5)))]),
    );

    let first = service.district_data(&id).await.expect("sample hit");
    assert_eq!(first.district, "Pune");
    assert_eq!(disk_entry(&tmp, "pune").source, DataSource::Sample);

    let second = service.district_data(&id).await.expect("memory hit");
    assert_eq!(second, first);
    assert_eq!(upstream.fetch_calls.load(Ordering::Relaxed), 0);
    assert_eq!(service.metrics.sample_hits.load(Ordering::Relaxed), 1);
    assert_eq!(service.metrics.memory_hits.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn disabled_upstream_is_never_invoked() {
    let tmp = tempdir().expect("tempdir");
    let id = DistrictId::parse("pune").expect("id");
    let upstream = Arc::new(FakeSource {
        enabled: false,
        ..FakeSource::default()
    });
    upstream
        .datasets
        .lock()
        .await
        .insert(id.clone(), mk_dataset("FromUpstream", 3));

    let service = mk_service(
        &tmp,
        upstream.clone(),
        sample_store(vec![("pune", "Pune", Some(mk_dataset("FromSample", 4)))]),
    );

    let dataset = service.district_data(&id).await.expect("sample hit");
    assert_eq!(dataset.district, "FromSample");
    assert_eq!(
        upstream.fetch_calls.load(Ordering::Relaxed),
        0,
        "disabled tier must never see a fetch"
    );
}

#[tokio::test]
async fn upstream_failure_falls_through_to_sample() {
    let tmp = tempdir().expect("tempdir");
    let id = DistrictId::parse("pune").expect("id");
    let upstream = Arc::new(FakeSource {
        fail_with: Some("simulated outage".to_string()),
        ..FakeSource::default()
    });
    let service = mk_service(
        &tmp,
        upstream.clone(),
        sample_store(vec![("pune", "Pune", Some(mk_dataset("FromSample", 4)))]),
    );

    let dataset = service.district_data(&id).await.expect("sample fallback");
    assert_eq!(dataset.district, "FromSample");
    assert_eq!(upstream.fetch_calls.load(Ordering::Relaxed), 1);
    assert_eq!(service.metrics.upstream_failures.load(Ordering::Relaxed), 1);
    assert_eq!(disk_entry(&tmp, "pune").source, DataSource::Sample);
}

#[tokio::test]
async fn district_absent_everywhere_is_an_explicit_miss() {
    let tmp = tempdir().expect("tempdir");
    let service = mk_service(
        &tmp,
        Arc::new(FakeSource::default()),
        sample_store(vec![("pune", "Pune", None)]),
    );
    let id = DistrictId::parse("unknown-id").expect("id");
    assert!(service.district_data(&id).await.is_none());
    assert_eq!(service.metrics.misses.load(Ordering::Relaxed), 1);
}

#[tokio::test]
async fn district_unknown_to_bundle_skips_upstream() {
    // The upstream filter key is the bundled display name; without it the
    // remote tier cannot be queried at all.
    let tmp = tempdir().expect("tempdir");
    let upstream = Arc::new(FakeSource::default());
    let service = mk_service(&tmp, upstream.clone(), sample_store(vec![]));
    let id = DistrictId::parse("pune").expect("id");
    assert!(service.district_data(&id).await.is_none());
    assert_eq!(upstream.fetch_calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn districts_is_a_sample_store_passthrough() {
    let tmp = tempdir().expect("tempdir");
    let service = mk_service(
        &tmp,
        Arc::new(FakeSource::default()),
        sample_store(vec![("pune", "Pune", None), ("nagpur", "Nagpur", None)]),
    );
    let ids: Vec<&str> = service.districts().iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["pune", "nagpur"]);
}
